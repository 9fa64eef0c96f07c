//! Operation states.
//!
//! A state binds an algorithm, a direction, and (for keyed classes) key
//! objects, plus the provider context driving the stream. Bound objects
//! carry a busy lease for the state's lifetime; the lease is released
//! when the state is freed.

use crate::error::{TeeError, TeeResult};
use crate::ids::{Algorithm, Mode};
use crate::provider::{AeCtx, CipherCtx, DigestCtx, MacCtx};
use crate::session::ObjHandle;

/// Provider context of an operation state, tagged by class.
pub enum OpCtx {
    /// Keyless classes and the asymmetric/derive classes.
    None,
    /// Digest stream.
    Digest(Box<dyn DigestCtx>),
    /// MAC stream.
    Mac(Box<dyn MacCtx>),
    /// Symmetric-cipher stream.
    Cipher(Box<dyn CipherCtx>),
    /// AEAD stream.
    AuthEnc(Box<dyn AeCtx>),
}

impl OpCtx {
    /// Duplicates the context. Pairing is checked by the caller; two
    /// states with equal algorithm and mode always carry the same
    /// variant.
    pub fn try_clone(&self) -> OpCtx {
        match self {
            Self::None => Self::None,
            Self::Digest(c) => Self::Digest(c.box_clone()),
            Self::Mac(c) => Self::Mac(c.box_clone()),
            Self::Cipher(c) => Self::Cipher(c.box_clone()),
            Self::AuthEnc(c) => Self::AuthEnc(c.box_clone()),
        }
    }

    /// True when both contexts carry the same class.
    pub fn same_class(&self, other: &OpCtx) -> bool {
        matches!(
            (self, other),
            (Self::None, Self::None)
                | (Self::Digest(_), Self::Digest(_))
                | (Self::Mac(_), Self::Mac(_))
                | (Self::Cipher(_), Self::Cipher(_))
                | (Self::AuthEnc(_), Self::AuthEnc(_))
        )
    }

    /// Runs the stream-teardown hook where the class has one.
    pub fn finalize(&mut self) {
        match self {
            Self::Cipher(c) => c.finalize(),
            Self::AuthEnc(c) => c.finalize(),
            _ => {}
        }
    }
}

impl core::fmt::Debug for OpCtx {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::Digest(_) => "Digest",
            Self::Mac(_) => "Mac",
            Self::Cipher(_) => "Cipher",
            Self::AuthEnc(_) => "AuthEnc",
        };
        f.write_str(name)
    }
}

/// One operation state.
#[derive(Debug)]
pub struct OpState {
    /// Bound algorithm.
    pub algo: Algorithm,
    /// Bound direction.
    pub mode: Mode,
    /// First key object, if the class is keyed.
    pub key1: Option<ObjHandle>,
    /// Second key object, for two-key ciphers.
    pub key2: Option<ObjHandle>,
    /// Provider context.
    pub ctx: OpCtx,
    /// Set once the stream owes the provider a teardown call.
    pub finalize_pending: bool,
}

impl OpState {
    /// A state with no context and no keys bound.
    pub fn new(algo: Algorithm, mode: Mode) -> Self {
        Self {
            algo,
            mode,
            key1: None,
            key2: None,
            ctx: OpCtx::None,
            finalize_pending: false,
        }
    }

    /// Copies another state's stream position into this one. Algorithm
    /// and mode must match; a context-class mismatch between matching
    /// states cannot happen and is reported as a state fault.
    pub fn copy_stream_from(&mut self, src: &OpState) -> TeeResult<()> {
        if self.algo != src.algo || self.mode != src.mode {
            return Err(TeeError::BadParameters);
        }
        if !self.ctx.same_class(&src.ctx) {
            return Err(TeeError::BadState);
        }
        self.ctx = src.ctx.try_clone();
        self.finalize_pending = src.finalize_pending;
        Ok(())
    }
}
