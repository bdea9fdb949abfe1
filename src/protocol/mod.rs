//! Command protocol
//!
//! Line-oriented command parsing, dispatch, and response formatting for
//! the storage service.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::{Command, CommandResult, CommandStatus, parse_command};
pub use handlers::{handle_command, handle_download, handle_upload};
