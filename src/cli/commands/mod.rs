//! CLI command implementations.

mod config;
mod doctor;
mod download;
mod generate;
mod status;

pub use config::run_config;
pub use doctor::run_doctor;
pub use download::run_download;
pub use generate::{run_generate, GenerateArgs};
pub use status::run_status;
