use std::env;
use std::net::SocketAddr;
use std::process;

use getopts::Options;
use lesson_slots::FallbackPolicy;

pub const ADDR_VAR: &str = "LESSON_SLOTS_ADDR";

#[derive(Debug)]
pub struct Args {
    pub address: SocketAddr,
    pub policy: FallbackPolicy,
}

fn opts() -> Options {
    let mut opts = Options::new();
    opts.optflag(
        "h",
        "help",
        concat!("Print the help output of ", env!("CARGO_PKG_NAME")),
    );
    opts.optopt(
        "a",
        "address",
        "Socket address (IP and port) to listen on [Default: $LESSON_SLOTS_ADDR or 127.0.0.1:8080]",
        "SOCKET_ADDRESS",
    );
    opts.optflag(
        "s",
        "strict",
        "Reject unknown timezones instead of treating them as UTC [Default: false]",
    );
    opts
}

fn default_address() -> SocketAddr {
    let Ok(address) = env::var(ADDR_VAR).map_or_else(
        |_| Ok(SocketAddr::from(([127, 0, 0, 1], 8080))),
        |value| value.parse(),
    ) else {
        eprintln!("Failed to parse `{ADDR_VAR}` environment variable");
        process::exit(1);
    };

    address
}

pub fn parse(args: Vec<String>) -> Args {
    let opts = opts();

    let matches = match opts.parse(args) {
        Ok(matches) => matches,
        Err(fail) => {
            eprintln!("{fail}");
            process::exit(1);
        }
    };

    if matches.opt_present("help") {
        println!("{}", opts.usage(&opts.short_usage(env!("CARGO_PKG_NAME"))));
        process::exit(0);
    }

    let address = match matches.opt_get::<SocketAddr>("address") {
        Ok(Some(address)) => address,
        Ok(None) => default_address(),
        Err(err) => {
            eprintln!("Provided value for option 'address' is invalid: {err}");
            process::exit(1);
        }
    };

    let policy = if matches.opt_present("strict") {
        FallbackPolicy::Strict
    } else {
        FallbackPolicy::Utc
    };

    Args { address, policy }
}
