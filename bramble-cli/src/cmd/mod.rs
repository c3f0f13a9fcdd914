pub mod build;
pub mod serve;

use clap::ArgMatches;

// Every arg declares a default value, so the lookup always succeeds.
fn arg_value<'a>(args: &'a ArgMatches, name: &str, default: &'a str) -> &'a str {
    args.get_one::<String>(name)
        .map(String::as_str)
        .unwrap_or(default)
}
