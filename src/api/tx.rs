use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::models::{AppState, NewTxRequest, NewTxResponse, PendingResponse};
use crate::error::LedgerError;

fn submit(state: &AppState, body: &NewTxRequest) -> Result<HttpResponse, LedgerError> {
    let author = body.author.as_deref().unwrap_or_default();
    let content = body.content.as_deref().unwrap_or_default();
    let tx = state.submit_transaction(author, content).inspect_err(|e| {
        warn!("POST new_transaction - rejected: {e}");
    })?;
    info!(
        "POST new_transaction - accepted from {} ({} pending)",
        tx.author,
        state.pending().len()
    );
    Ok(HttpResponse::Created().json(NewTxResponse {
        accepted: true,
        transaction: tx,
    }))
}

/// Submit a new transaction as JSON `{author, content}`.
#[post("/new_transaction/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> Result<HttpResponse, LedgerError> {
    submit(&state, &body)
}

/// Same as `new_transaction`, for HTML form posts.
#[post("/submit/")]
pub async fn post_submit_form(
    state: web::Data<AppState>,
    body: web::Form<NewTxRequest>,
) -> Result<HttpResponse, LedgerError> {
    submit(&state, &body)
}

/// List the pending pool.
#[get("/pending_tx/")]
pub async fn get_pending(state: web::Data<AppState>) -> impl Responder {
    let transactions = state.pending();
    HttpResponse::Ok().json(PendingResponse {
        size: transactions.len(),
        transactions,
    })
}
