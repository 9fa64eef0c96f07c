//! Aegis Crypto-Object Kernel
//!
//! The trusted-kernel side of a GlobalPlatform-style cryptographic
//! subsystem: typed key objects, attribute validation, a byte-exact
//! serialization format, and an operation state machine, all decoupled
//! from actual cryptography behind an injected [`CryptoProvider`].
//!
//! ```text
//! caller memory (untrusted)
//!        │  copy-in / copy-out through UserMemory
//!        ▼
//! svc verbs ── validate ──► Session { CrypObj, OpState }
//!        │                        │
//!        │                        ▼
//!        └────────────────► CryptoProvider (injected)
//! ```
//!
//! # Security
//!
//! Boundary discipline:
//! - Every caller buffer is access-checked and snapshotted before use;
//!   no verb holds references into caller memory across a computation
//! - Length cells are read once and rewritten with the required size on
//!   [`TeeError::ShortBuffer`], so callers can retry
//!
//! Key hygiene:
//! - Secret containers ([`attr::SecretKey`], [`attr::Mpi`]) zeroize on
//!   drop and on explicit clear
//! - Non-public attributes of non-extractable objects are never read out
//! - Objects bound to a live operation state are busy: they cannot be
//!   closed, reset, or rebound until the state is freed
//!
//! [`CryptoProvider`]: provider::CryptoProvider
//! [`TeeError::ShortBuffer`]: error::TeeError::ShortBuffer

#![forbid(unsafe_code)]

pub mod attr;
pub mod boundary;
pub mod error;
pub mod ids;
pub mod material;
pub mod object;
pub mod provider;
pub mod registry;
pub mod session;
pub mod state;
pub mod svc;

pub use error::{ErrorClass, TeeError, TeeResult};
pub use ids::{Algorithm, AttributeId, EccCurve, Mode, ObjectType, OpClass};
pub use provider::CryptoProvider;
pub use session::{ObjHandle, Session, StateHandle};
