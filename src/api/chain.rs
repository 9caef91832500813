use actix_web::{HttpResponse, Responder, get, web};
use log::info;

use super::models::{AppState, ConsensusResponse, MineResponse, ValidateResponse};
use crate::blockchain::MineOutcome;
use crate::error::LedgerError;

/// Get the full chain together with the known peers.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(state.get_chain())
}

/// Validate the whole local chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let (valid, length, difficulty) = state.validate();
    HttpResponse::Ok().json(ValidateResponse {
        valid,
        length,
        difficulty,
    })
}

/// Mine the pending pool into one block, reconcile with peers and, if our
/// chain is still the longest, announce the block.
#[get("/mine/")]
pub async fn mine_block(state: web::Data<AppState>) -> Result<HttpResponse, LedgerError> {
    let report = state.mine_and_announce().await?;
    let length = state.get_chain().length;

    let (mined_count, mined_index) = match report.outcome {
        MineOutcome::Mined { count, index } => (count, Some(index)),
        MineOutcome::NoOp => (0, None),
    };
    if let Some(index) = mined_index {
        info!(
            "MINER - block #{index} with {mined_count} txs (replaced={}, announced_to={})",
            report.resolution.replaced(),
            report.announced_to
        );
    }

    Ok(HttpResponse::Ok().json(MineResponse {
        mined_count,
        mined_index,
        chain_replaced: report.resolution.replaced(),
        announced_to: report.announced_to,
        length,
    }))
}

/// Run a consensus pass against every known peer.
#[get("/consensus/")]
pub async fn run_consensus(state: web::Data<AppState>) -> impl Responder {
    let resolution = state.resolve().await;
    HttpResponse::Ok().json(ConsensusResponse {
        replaced: resolution.replaced(),
        length: state.get_chain().length,
    })
}
