//! Application command handlers for intervue.
//!
//! This module organizes command handling into separate submodules, each responsible for a specific
//! application command.
//!
//! # Commands
//! - `apply`: The full application flow (profile, recorded answers, upload)
//! - `questions`: Print the interview question set
//! - `config`: Open configuration file in user's preferred editor
//! - `list_devices`: List available capture devices
//! - `logs`: Display recent log entries

pub mod apply;
pub mod config;
pub mod list_devices;
pub mod logs;
pub mod questions;

pub use apply::handle_apply;
pub use config::handle_config;
pub use list_devices::handle_list_devices;
pub use logs::handle_logs;
pub use questions::handle_questions;
