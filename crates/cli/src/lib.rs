//! Operator CLI for pairlink session directories.
//!
//! Every command prints one JSON envelope on stdout:
//!
//! ```json
//! { "ok": true, "command": "session inspect", "data": { ... } }
//! { "ok": false, "command": "session clear", "error": { "code": "SESSION_BUSY", "message": "..." } }
//! ```

pub mod cli;
pub mod commands;
pub mod context;
pub mod error;
pub mod logging;
pub mod output;
