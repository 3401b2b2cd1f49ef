pub mod admin;
pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod remote;
pub mod state;
pub mod storage;
pub mod store;
pub mod ui;
pub mod vote;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::FileRecord;
pub use store::StateStore;
