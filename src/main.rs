use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use pocketledger::{build_router, create_app_state, graceful_shutdown};

/// A personal budgeting service with a JSON REST API.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Config {
    /// The path to the SQLite database file. The file is created if it does
    /// not exist.
    #[arg(long, default_value = "pocketledger.db")]
    db_path: PathBuf,

    /// The address to bind to.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    address: IpAddr,

    /// The port to listen on.
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();

    let db_connection =
        Connection::open(&config.db_path).expect("Could not open the database file.");
    let state = create_app_state(db_connection).expect("Could not initialize the database.");

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let address = SocketAddr::new(config.address, config.port);
    tracing::info!("HTTP server listening on {address}");

    axum_server::bind(address)
        .handle(handle)
        .serve(build_router(state).into_make_service())
        .await
        .expect("Server error.");
}
