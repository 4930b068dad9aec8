pub mod app;
pub mod config;
pub mod export;
pub mod logging;
pub mod state;
pub mod utils;

pub use app::AppError;
pub use config::AppConfig;
pub use state::Session;
