//! Runtime plumbing for the connection manager.
//!
//! * [`socket`]: the capability boundary to the external session library
//! * [`timer`]: cancelable one-shot deferred tasks
//! * [`lease`]: single-owner lease over a session directory
//! * [`fake`]: in-memory socket used by tests

pub mod error;
pub mod fake;
pub mod lease;
pub mod socket;
pub mod timer;

pub use error::SocketError;
pub use lease::{LeaseError, SessionLease};
pub use socket::{SessionSocket, SocketConfig, SocketEvents, SocketFactory, SocketParts};
pub use timer::TimerSlot;
