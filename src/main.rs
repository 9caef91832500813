mod api;
mod blockchain;
mod config;
mod error;
mod node;
mod storage;
mod transaction;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::{error, info};

use api::AppState;
use blockchain::Blockchain;
use config::NodeConfig;
use node::{HttpPeerClient, PeerSet};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let cfg = NodeConfig::from_env();

    let (blockchain, peers) = match cfg.data_file.as_deref().map(storage::load) {
        Some(Ok(Some(snapshot))) => storage::restore(snapshot, cfg.difficulty)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?,
        Some(Err(e)) => {
            error!("STORAGE - cannot read state: {e}");
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, e));
        }
        Some(Ok(None)) | None => (Blockchain::new(cfg.difficulty), PeerSet::new()),
    };

    let client = HttpPeerClient::new(cfg.peer_timeout).map_err(std::io::Error::other)?;
    let state = web::Data::new(
        AppState::new(blockchain, peers, client).with_own_address(cfg.node_address.clone()),
    );

    info!(
        "⛓️ Starting ledger node at http://{}:{} (difficulty={}, chain length={})",
        cfg.host,
        cfg.port,
        cfg.difficulty,
        state.get_chain().length
    );

    let server_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(server_state.clone())
            .configure(api::init_routes)
    })
    .bind((cfg.host.as_str(), cfg.port))?
    .run()
    .await?;

    // graceful shutdown (SIGINT/SIGTERM) lands here
    state.shutdown();
    if let Some(path) = cfg.data_file.as_deref() {
        if let Err(e) = storage::save(path, &state.get_chain()) {
            error!("STORAGE - failed to save state: {e}");
        }
    }
    Ok(())
}
