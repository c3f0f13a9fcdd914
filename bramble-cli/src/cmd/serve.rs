use std::path::PathBuf;

use anyhow::{bail, Result};
use bramble_server::{StaticServer, StaticServerConfig};
use clap::{Arg, ArgMatches, Command};

use super::arg_value;

pub fn make_subcommand() -> Command {
    Command::new("serve")
        .alias("server")
        .about("Serve a previously built site over HTTP")
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Directory containing the built site")
                .default_value("build"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to serve on")
                .default_value("8080"),
        )
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to")
                .default_value("127.0.0.1"),
        )
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    let root = arg_value(args, "output", "build");
    let host = arg_value(args, "host", "127.0.0.1");
    let port = arg_value(args, "port", "8080");
    let Ok(port) = port.parse::<u16>() else {
        bail!("Invalid port: {port}");
    };

    let server = StaticServer::new(StaticServerConfig {
        host: host.to_string(),
        port,
        root: PathBuf::from(root),
    });

    server.run()
}
