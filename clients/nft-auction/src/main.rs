use eyre::WrapErr;
use nft_auction::{
    connection::{initialize, ConnectionConfig, ConnectionState},
    panel::AuctionPanel,
    rpc::StarknetBackend,
    ui,
};
use std::{fs::File, sync::Arc};
use tracing::error;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "nft-auction.log";

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // The terminal belongs to the UI, logs go to a file
    let log = File::create(LOG_FILE).wrap_err_with(|| format!("cannot create {}", LOG_FILE))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_writer(Arc::new(log))
        .with_ansi(false)
        .with_env_filter(filter)
        .init();

    let (connection, input_mode) = match ConnectionConfig::from_env() {
        Ok(config) => (initialize(&StarknetBackend, &config), config.input_mode),
        Err(err) => {
            error!(%err, "invalid configuration");
            (ConnectionState::Failed(err), Default::default())
        }
    };

    let (panel, notices) = AuctionPanel::new(connection, input_mode);
    ui::run(Arc::new(panel), notices)
        .await
        .wrap_err("terminal UI failed")?;

    Ok(())
}
