use anyhow::Result;
use bramble_core::{SiteBuilder, SitePaths};
use clap::{Arg, ArgMatches, Command};

use super::arg_value;

pub fn make_subcommand() -> Command {
    Command::new("build")
        .about("Build the site from markdown pages and layouts")
        .arg(
            Arg::new("assets")
                .short('a')
                .long("assets")
                .value_name("DIR")
                .help("Assets directory containing pages, icons and static files")
                .default_value("assets"),
        )
        .arg(
            Arg::new("layout")
                .short('l')
                .long("layout")
                .value_name("DIR")
                .help("Directory containing the base layout and components")
                .default_value("assets/layout"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Site configuration file")
                .default_value("configs/config.yml"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for the generated site")
                .default_value("build"),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let assets = arg_value(args, "assets", "assets");
    let layout = arg_value(args, "layout", "assets/layout");
    let config = arg_value(args, "config", "configs/config.yml");
    let output = arg_value(args, "output", "build");

    let builder = SiteBuilder::new(SitePaths::new(assets, layout, config, output))?;
    let count = builder.build()?;

    println!("Built {} pages into {}", count, output);

    Ok(())
}
