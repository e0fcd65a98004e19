//! Wire types for the remote session socket.
//!
//! This crate contains the serde-serializable shapes the connection manager
//! receives from, and hands to, the external multi-device session library.
//! These types represent the "protocol layer": the shapes of data as they
//! cross the socket boundary.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! * Pure data: no behavior beyond (de)serialization and small predicates
//! * Transport-agnostic: nothing here knows how the socket is implemented
//! * Stable: changes only when the socket library's event contract changes
//!
//! Lifecycle decisions built on top of these types live in `pairlink`.

pub mod address;
pub mod credentials;
pub mod event;
pub mod message;

pub use address::*;
pub use credentials::*;
pub use event::*;
pub use message::*;
