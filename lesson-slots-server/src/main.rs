mod cli;
mod routes;

use std::{env, io};

use log::info;
use tokio::{net::TcpListener, signal};

use routes::Config;

fn setup_logging() {
    if env::var("LOG").is_err() {
        env::set_var("LOG", "lesson_slots=info,lesson_slots_server=info");
    }

    pretty_env_logger::init_custom_env("LOG");
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        eprintln!("Failed to listen for shutdown signal: {err}");
    }
    info!("Shutting down");
}

#[tokio::main]
async fn main() -> io::Result<()> {
    let args = cli::parse(env::args().skip(1).collect());

    setup_logging();

    let router = routes::router(Config {
        policy: args.policy,
    });

    let listener = TcpListener::bind(args.address).await?;
    info!(
        "Listening at http://{} with {:?} timezone fallback",
        args.address, args.policy
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}
