//! AES-GCM context.
//!
//! The underlying implementation is one-shot, so the context buffers
//! associated data and payload and runs the whole computation at the
//! final call. Decrypted plaintext is only released after the tag
//! verifies.

use aegis_core::error::{TeeError, TeeResult};
use aegis_core::ids::{Algorithm, Mode};
use aegis_core::provider::AeCtx;
use aes::Aes192;
use aes_gcm::aead::consts::U12;
use aes_gcm::aead::AeadInPlace;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm, KeyInit, Nonce, Tag};
use zeroize::Zeroize;

type Aes192Gcm = AesGcm<Aes192, U12>;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

#[derive(Clone)]
enum GcmKey {
    A128(Box<Aes128Gcm>),
    A192(Box<Aes192Gcm>),
    A256(Box<Aes256Gcm>),
}

#[derive(Clone)]
pub(crate) struct GcmCtx {
    key: Option<GcmKey>,
    nonce: [u8; NONCE_LEN],
    aad: Vec<u8>,
    buf: Vec<u8>,
}

impl GcmCtx {
    fn new() -> Self {
        Self {
            key: None,
            nonce: [0; NONCE_LEN],
            aad: Vec::new(),
            buf: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.key = None;
        self.aad.zeroize();
        self.buf.zeroize();
        self.aad.clear();
        self.buf.clear();
    }
}

impl AeCtx for GcmCtx {
    fn init(
        &mut self,
        _mode: Mode,
        key: &[u8],
        nonce: &[u8],
        tag_len: usize,
        _aad_len: usize,
        _payload_len: usize,
    ) -> TeeResult<()> {
        if nonce.len() != NONCE_LEN || tag_len != TAG_LEN {
            return Err(TeeError::NotSupported);
        }
        let bad = |_| TeeError::BadParameters;
        let keyed = match key.len() {
            16 => GcmKey::A128(Box::new(Aes128Gcm::new_from_slice(key).map_err(bad)?)),
            24 => GcmKey::A192(Box::new(Aes192Gcm::new_from_slice(key).map_err(bad)?)),
            32 => GcmKey::A256(Box::new(Aes256Gcm::new_from_slice(key).map_err(bad)?)),
            _ => return Err(TeeError::BadParameters),
        };
        self.reset();
        self.key = Some(keyed);
        self.nonce.copy_from_slice(nonce);
        Ok(())
    }

    fn update_aad(&mut self, aad: &[u8]) -> TeeResult<()> {
        if self.key.is_none() {
            return Err(TeeError::BadState);
        }
        if !self.buf.is_empty() {
            return Err(TeeError::BadState);
        }
        self.aad.extend_from_slice(aad);
        Ok(())
    }

    fn update_payload(&mut self, src: &[u8]) -> TeeResult<Vec<u8>> {
        if self.key.is_none() {
            return Err(TeeError::BadState);
        }
        self.buf.extend_from_slice(src);
        Ok(Vec::new())
    }

    fn enc_final(&mut self, src: &[u8]) -> TeeResult<(Vec<u8>, Vec<u8>)> {
        let key = self.key.take().ok_or(TeeError::BadState)?;
        self.buf.extend_from_slice(src);
        let nonce = Nonce::from_slice(&self.nonce);
        let tag = match &key {
            GcmKey::A128(k) => k.encrypt_in_place_detached(nonce, &self.aad, &mut self.buf),
            GcmKey::A192(k) => k.encrypt_in_place_detached(nonce, &self.aad, &mut self.buf),
            GcmKey::A256(k) => k.encrypt_in_place_detached(nonce, &self.aad, &mut self.buf),
        }
        .map_err(|_| TeeError::Generic)?;
        let out = std::mem::take(&mut self.buf);
        self.aad.zeroize();
        self.aad.clear();
        Ok((out, tag.to_vec()))
    }

    fn dec_final(&mut self, src: &[u8], tag: &[u8]) -> TeeResult<Vec<u8>> {
        let key = self.key.take().ok_or(TeeError::BadState)?;
        if tag.len() != TAG_LEN {
            return Err(TeeError::MacInvalid);
        }
        self.buf.extend_from_slice(src);
        let nonce = Nonce::from_slice(&self.nonce);
        let tag = Tag::from_slice(tag);
        let res = match &key {
            GcmKey::A128(k) => k.decrypt_in_place_detached(nonce, &self.aad, &mut self.buf, tag),
            GcmKey::A192(k) => k.decrypt_in_place_detached(nonce, &self.aad, &mut self.buf, tag),
            GcmKey::A256(k) => k.decrypt_in_place_detached(nonce, &self.aad, &mut self.buf, tag),
        };
        if res.is_err() {
            self.reset();
            return Err(TeeError::MacInvalid);
        }
        let out = std::mem::take(&mut self.buf);
        self.aad.zeroize();
        self.aad.clear();
        Ok(out)
    }

    fn finalize(&mut self) {
        self.reset();
    }

    fn box_clone(&self) -> Box<dyn AeCtx> {
        Box::new(self.clone())
    }
}

pub(crate) fn authenc_alloc(algo: Algorithm) -> TeeResult<Box<dyn AeCtx>> {
    match algo {
        Algorithm::AES_GCM => Ok(Box::new(GcmCtx::new())),
        Algorithm::AES_CCM => Err(TeeError::NotImplemented),
        _ => Err(TeeError::BadParameters),
    }
}
