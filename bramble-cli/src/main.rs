mod cmd;

use anyhow::Result;
use clap::Command;
use log::LevelFilter;

fn main() -> Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;

    let matches = make_app().get_matches();

    match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args),
        Some(("serve", args)) => cmd::serve::execute(args),
        _ => unreachable!("subcommand is required"),
    }
}

fn make_app() -> Command {
    Command::new("bramble")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build and preview a markdown personal site")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::serve::make_subcommand())
}
