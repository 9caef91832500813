pub mod model;

pub use model::{Transaction, now_secs};
