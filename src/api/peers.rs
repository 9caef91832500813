use actix_web::{HttpRequest, HttpResponse, post, web};
use log::info;
use serde_json::Value;

use super::models::{AppState, RegisterRequest, RegisterWithResponse};
use crate::blockchain::Block;
use crate::error::LedgerError;

/// Add a peer; answer with our chain so the newcomer can bootstrap.
#[post("/register_node/")]
pub async fn register_node(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, LedgerError> {
    let address = body.node_address.as_deref().unwrap_or_default();
    let snapshot = state.register_peer(address)?;
    Ok(HttpResponse::Ok().json(snapshot))
}

/// Join the network through an existing node, taking over its chain and peers.
#[post("/register_with/")]
pub async fn register_with(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, LedgerError> {
    let remote = body.node_address.as_deref().unwrap_or_default();
    if remote.trim().is_empty() {
        return Err(LedgerError::invalid_input("node_address is required"));
    }
    let request_address = {
        let info = req.connection_info();
        format!("{}://{}", info.scheme(), info.host())
    };

    let length = state.register_with(remote, &request_address).await?;
    info!("POST register_with - joined via {remote}, chain length {length}");
    Ok(HttpResponse::Ok().json(RegisterWithResponse {
        length,
        peers: state.get_chain().peers,
    }))
}

/// Accept a block mined elsewhere. The body is the block's full field set;
/// its `hash` is the claimed proof and is checked, never trusted.
#[post("/add_block/")]
pub async fn add_block(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<HttpResponse, LedgerError> {
    let mut block: Block = serde_json::from_value(body.into_inner())
        .map_err(|e| LedgerError::invalid_input(format!("malformed block: {e}")))?;
    let proof = std::mem::take(&mut block.hash);
    let index = block.index;

    state.receive_block(block, &proof)?;
    Ok(HttpResponse::Created().body(format!("Block #{index} added to the chain")))
}
