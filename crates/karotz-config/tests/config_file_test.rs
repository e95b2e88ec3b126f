// Loading and saving profile files on disk.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use karotz_config::{
    Config, Profile, load_config_from, profile_to_device_config, save_config_to,
};
use karotz_core::Resource;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn reads_profiles_and_partial_endpoint_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
default_profile = "kitchen"

[defaults]
timeout = 4

[profiles.kitchen]
host = "192.168.1.201"
port = 8080
events = true
resources = ["info", "leds"]

[profiles.kitchen.endpoints]
leds = "/api/leds"
"#,
    )
    .unwrap();

    let config = load_config_from(&path).unwrap();
    assert_eq!(config.active_profile_name(None), "kitchen");
    assert_eq!(config.defaults.output, "table");

    let profile = config.profile("kitchen").unwrap();
    let device = profile_to_device_config(profile, &config.defaults).unwrap();
    assert_eq!(device.port, 8080);
    assert_eq!(device.timeout.as_secs(), 4);
    assert!(device.events_enabled);
    assert_eq!(device.resources, vec![Resource::Info, Resource::Leds]);
    assert_eq!(device.endpoints.leds, "/api/leds");
    assert_eq!(device.endpoints.ears, "/cgi-bin/ears");
}

#[test]
fn saved_config_loads_back_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.profiles.insert(
        "default".into(),
        Profile {
            poll_interval: Some(15),
            ..Profile::new("karotz.lan")
        },
    );
    save_config_to(&path, &config).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("host = \"karotz.lan\""));
    assert!(!written.contains("endpoints"));

    assert_eq!(load_config_from(&path).unwrap(), config);
}
