mod chain;
mod health;
pub mod models;
mod peers;
mod tx;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(tx::post_transaction)
            .service(tx::post_submit_form)
            .service(tx::get_pending)
            .service(chain::get_chain)
            .service(chain::validate_chain)
            .service(chain::mine_block)
            .service(chain::run_consensus)
            .service(peers::register_node)
            .service(peers::register_with)
            .service(peers::add_block),
    );
}
