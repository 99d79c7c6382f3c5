use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use infinite_life::config::Config;
use infinite_life::logging;
use infinite_life::server;
use infinite_life::world::World;
use infinite_life::world::WorldHandle;

/// Runs the shared Game of Life world and streams it, one generation per drawn frame, to every
/// connected viewer.
#[derive(Parser)]
struct Args {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen address, overrides `server.addr`
    #[arg(long)]
    addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logging::init_stderr();

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    let server = config.server;
    let addr = args.addr.unwrap_or(server.addr);

    let world = World::seeded(server.grid_size, server.density, server.seed);
    info!(
        side = server.grid_size,
        density = server.density,
        population = world.grid().population(),
        "seeded world"
    );

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    server::serve(listener, WorldHandle::spawn(world)).await?;

    Ok(())
}
