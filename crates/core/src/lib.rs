//! Connection lifecycle and resilience manager for a multi-device messaging session.
//!
//! The crate owns one authoritative [`ConnectionState`] for a single session and
//! drives it from the events of an external session socket:
//!
//! * pairing challenges are rendered, retained, and expired ([`pairing`])
//! * closes are decoded into a [`DisconnectReason`] and mapped onto exactly one
//!   [`RecoveryPlan`] ([`disconnect`])
//! * retries use bounded exponential backoff with jitter ([`reconnect`])
//! * credentials that cannot be trusted are cleared before they are used
//!   ([`session`], [`store`])
//! * qualifying inbound messages are forwarded to one registered handler ([`ingress`])
//!
//! All transitions run through a pure transition table ([`machine`]) and are
//! serialized by [`ConnectionManager`].
//!
//! # Example
//!
//! ```ignore
//! use pairlink::{ConnectionManager, ManagerConfig};
//!
//! let manager = ConnectionManager::builder(ManagerConfig::default())
//!     .socket_factory(factory)
//!     .build()?;
//! manager.set_message_handler(|message: InboundMessage| async move {
//!     println!("{:?}", message.text());
//!     Ok(())
//! });
//! manager.initialize().await?;
//! ```

pub mod address;
pub mod config;
pub mod disconnect;
pub mod error;
pub mod ingress;
pub mod machine;
pub mod manager;
pub mod pairing;
pub mod reconnect;
pub mod session;
pub mod status;
pub mod store;

pub use address::normalize_destination;
pub use config::ManagerConfig;
pub use disconnect::{DisconnectReason, RecoveryPlan, classify};
pub use error::{Error, Result};
pub use ingress::{DispatchSummary, MessageDispatcher, MessageHandler};
pub use machine::{ConnectionState, Effect, Input, Machine, ReconnectDelay};
pub use manager::{ConnectionManager, ConnectionManagerBuilder};
pub use pairing::{Base64Renderer, ChallengeRenderer, PairingChallenge, PairingController};
pub use reconnect::{BackoffPolicy, ReconnectScheduler, Scheduled};
pub use session::{SessionPathResolver, SessionValidator, SessionVerdict, ValidationReport};
pub use status::{DetailedStatus, LastDisconnect};
pub use store::{ClearOutcome, CredentialStore, FileCredentialStore, StoreError};

pub use pairlink_protocol::{CloseInfo, Credentials, InboundMessage, Jid, SentMessage, UpsertKind};
pub use pairlink_runtime::{SessionSocket, SocketConfig, SocketError, SocketFactory, SocketParts};
