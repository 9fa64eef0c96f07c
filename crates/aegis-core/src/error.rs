//! Error taxonomy for the crypto subsystem.
//!
//! Every fault that can cross the syscall boundary maps to exactly one
//! [`TeeError`] variant. [`ErrorClass`] groups the variants into the five
//! coarse families used for logging and triage.

use thiserror::Error;

/// Subsystem-wide result alias.
pub type TeeResult<T> = Result<T, TeeError>;

/// Faults reported across the syscall boundary.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TeeError {
    /// A handle, identifier, length, or argument combination is invalid.
    #[error("bad parameters")]
    BadParameters,

    /// Supplied data exceeds what the target object can hold.
    #[error("excess data")]
    ExcessData,

    /// A handle, attribute, or table entry does not exist (or must be
    /// reported as nonexistent, e.g. a busy object being closed).
    #[error("item not found")]
    ItemNotFound,

    /// An output buffer is too small; `required` is the size the caller
    /// must provide on retry. The size has also been written back through
    /// the caller's length pointer where the operation defines one.
    #[error("short buffer: {required} bytes required")]
    ShortBuffer {
        /// Size needed to complete the request.
        required: usize,
    },

    /// The installed provider does not implement the requested primitive.
    #[error("not implemented")]
    NotImplemented,

    /// The request names an algorithm, size, or curve outside the
    /// supported set.
    #[error("not supported")]
    NotSupported,

    /// A bounded internal pool was exhausted.
    #[error("out of memory")]
    OutOfMemory,

    /// The operation is invalid in the object's or state's current phase.
    #[error("bad state")]
    BadState,

    /// The request is structurally malformed for the target type.
    #[error("bad format")]
    BadFormat,

    /// Stored object content failed validation during deserialization.
    #[error("corrupt object")]
    CorruptObject,

    /// The caller lacks the rights the operation requires.
    #[error("access denied")]
    AccessDenied,

    /// A security invariant was violated; the caller must be treated as
    /// hostile.
    #[error("security violation")]
    Security,

    /// Authenticated decryption failed tag verification.
    #[error("MAC invalid")]
    MacInvalid,

    /// Signature verification failed.
    #[error("signature invalid")]
    SignatureInvalid,

    /// An unclassified internal fault.
    #[error("generic fault")]
    Generic,
}

/// Coarse fault families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Caller-supplied arguments failed validation.
    Validation,
    /// The deployment lacks a required capability.
    Capability,
    /// A resource limit was hit.
    Resource,
    /// The request arrived in the wrong lifecycle phase.
    State,
    /// A security boundary was violated or a cryptographic check failed.
    Security,
    /// Internal fault with no better classification.
    Internal,
}

impl TeeError {
    /// Classifies this error into its coarse family.
    pub fn class(self) -> ErrorClass {
        match self {
            Self::BadParameters
            | Self::ExcessData
            | Self::ItemNotFound
            | Self::ShortBuffer { .. }
            | Self::BadFormat => ErrorClass::Validation,
            Self::NotImplemented | Self::NotSupported => ErrorClass::Capability,
            Self::OutOfMemory => ErrorClass::Resource,
            Self::BadState => ErrorClass::State,
            Self::CorruptObject
            | Self::AccessDenied
            | Self::Security
            | Self::MacInvalid
            | Self::SignatureInvalid => ErrorClass::Security,
            Self::Generic => ErrorClass::Internal,
        }
    }

    /// True for faults that indicate a hostile or compromised caller
    /// rather than an ordinary usage error.
    pub fn is_security(self) -> bool {
        self.class() == ErrorClass::Security
    }
}
