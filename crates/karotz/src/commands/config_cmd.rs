//! Config subcommand handlers.

use karotz_config::Profile;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::Ctx;
use crate::error::CliError;
use crate::output;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init {
            device,
            name,
            device_port,
            events,
            force,
        } => {
            let path = karotz_config::config_path();
            let mut cfg = karotz_config::load_config()?;

            if cfg.profiles.contains_key(&name) && !force {
                return Err(CliError::Validation {
                    field: "name".into(),
                    reason: format!("profile '{name}' already exists (use --force to replace it)"),
                });
            }

            let profile = Profile {
                port: device_port,
                events: events.then_some(true),
                ..Profile::new(device)
            };
            // Catch a bad host or port before writing anything.
            karotz_config::profile_to_device_config(&profile, &cfg.defaults)?;

            cfg.profiles.insert(name.clone(), profile);
            cfg.default_profile = Some(name.clone());
            karotz_config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!("✓ Profile '{name}' written to {}", path.display());
                eprintln!("  Test it: karotz status");
            }
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = karotz_config::load_config()?;
            let ctx = Ctx::resolve(global, &cfg);
            let out = match ctx.format {
                OutputFormat::Table | OutputFormat::Plain => toml::to_string_pretty(&cfg)
                    .map_err(|e| CliError::Render(e.to_string()))?,
                format => {
                    output::render_single(format, &cfg, |_| String::new(), |_| String::new())?
                }
            };
            output::print_output(out.trim_end(), ctx.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&karotz_config::config_path().display().to_string(), false);
            Ok(())
        }
    }
}
