pub mod ledger;
pub mod model_api;
pub mod run_log;

pub use ledger::Ledger;
pub use model_api::{ModelApi, ModelInfo};
pub use run_log::{AttemptRecord, RunLog};
