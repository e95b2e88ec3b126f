use std::fs;
use std::path::{Path, PathBuf};

use clap::CommandFactory;

// cli.rs only needs clap, clap_complete and humantime, all of which are
// build-dependencies too.
#[path = "src/cli.rs"]
mod cli;

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let out_dir: PathBuf = std::env::var_os("OUT_DIR")
        .expect("OUT_DIR not set by Cargo")
        .into();
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("failed to create man output directory");

    render_page(&cli::Cli::command(), &man_dir);
}

/// Write `<name>.1` for `cmd`, then one page per visible subcommand named
/// `<parent>-<sub>.1`.
fn render_page(cmd: &clap::Command, dir: &Path) {
    let name = cmd.get_name().to_owned();
    let target = dir.join(format!("{name}.1"));

    let mut page = Vec::new();
    clap_mangen::Man::new(cmd.clone())
        .render(&mut page)
        .unwrap_or_else(|e| panic!("rendering man page for `{name}` failed: {e}"));
    fs::write(&target, page)
        .unwrap_or_else(|e| panic!("writing {} failed: {e}", target.display()));

    for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
        let qualified = sub.clone().name(format!("{name}-{}", sub.get_name()));
        render_page(&qualified, dir);
    }
}
