//! Digest and HMAC contexts over the SHA families.

use aegis_core::error::{TeeError, TeeResult};
use aegis_core::ids::{Algorithm, OpClass};
use aegis_core::provider::{DigestCtx, MacCtx};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

/// The hash families this provider carries. MD5 is deliberately absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HashAlg {
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlg {
    /// Maps a digest-class algorithm id (or anything carrying the hash
    /// family in its main-algorithm byte) to a supported hash.
    pub(crate) fn from_algorithm(algo: Algorithm) -> TeeResult<Self> {
        match algo.main_alg() {
            Algorithm::MAIN_SHA1 => Ok(Self::Sha1),
            Algorithm::MAIN_SHA224 => Ok(Self::Sha224),
            Algorithm::MAIN_SHA256 => Ok(Self::Sha256),
            Algorithm::MAIN_SHA384 => Ok(Self::Sha384),
            Algorithm::MAIN_SHA512 => Ok(Self::Sha512),
            _ => Err(TeeError::NotImplemented),
        }
    }

    pub(crate) fn size(self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha224 => 28,
            Self::Sha256 => 32,
            Self::Sha384 => 48,
            Self::Sha512 => 64,
        }
    }

    /// One-shot hash.
    pub(crate) fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha1 => Sha1::digest(data).to_vec(),
            Self::Sha224 => Sha224::digest(data).to_vec(),
            Self::Sha256 => Sha256::digest(data).to_vec(),
            Self::Sha384 => Sha384::digest(data).to_vec(),
            Self::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

#[derive(Clone)]
enum ShaState {
    Sha1(Sha1),
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

#[derive(Clone)]
pub(crate) struct ShaCtx {
    state: ShaState,
}

impl ShaCtx {
    fn new(alg: HashAlg) -> Self {
        let state = match alg {
            HashAlg::Sha1 => ShaState::Sha1(Sha1::new()),
            HashAlg::Sha224 => ShaState::Sha224(Sha224::new()),
            HashAlg::Sha256 => ShaState::Sha256(Sha256::new()),
            HashAlg::Sha384 => ShaState::Sha384(Sha384::new()),
            HashAlg::Sha512 => ShaState::Sha512(Sha512::new()),
        };
        Self { state }
    }
}

impl DigestCtx for ShaCtx {
    fn init(&mut self) {
        match &mut self.state {
            ShaState::Sha1(d) => Digest::reset(d),
            ShaState::Sha224(d) => Digest::reset(d),
            ShaState::Sha256(d) => Digest::reset(d),
            ShaState::Sha384(d) => Digest::reset(d),
            ShaState::Sha512(d) => Digest::reset(d),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match &mut self.state {
            ShaState::Sha1(d) => d.update(data),
            ShaState::Sha224(d) => d.update(data),
            ShaState::Sha256(d) => d.update(data),
            ShaState::Sha384(d) => d.update(data),
            ShaState::Sha512(d) => d.update(data),
        }
    }

    fn finalize(&mut self) -> Vec<u8> {
        match &mut self.state {
            ShaState::Sha1(d) => d.finalize_reset().to_vec(),
            ShaState::Sha224(d) => d.finalize_reset().to_vec(),
            ShaState::Sha256(d) => d.finalize_reset().to_vec(),
            ShaState::Sha384(d) => d.finalize_reset().to_vec(),
            ShaState::Sha512(d) => d.finalize_reset().to_vec(),
        }
    }

    fn box_clone(&self) -> Box<dyn DigestCtx> {
        Box::new(self.clone())
    }
}

#[derive(Clone)]
enum HmacState {
    Sha1(Hmac<Sha1>),
    Sha224(Hmac<Sha224>),
    Sha256(Hmac<Sha256>),
    Sha384(Hmac<Sha384>),
    Sha512(Hmac<Sha512>),
}

/// Keyed lazily: the kernel hands the key at stream init, not at
/// context allocation.
#[derive(Clone)]
pub(crate) struct HmacCtx {
    alg: HashAlg,
    state: Option<HmacState>,
}

impl HmacCtx {
    fn new(alg: HashAlg) -> Self {
        Self { alg, state: None }
    }
}

impl MacCtx for HmacCtx {
    fn init(&mut self, key: &[u8]) -> TeeResult<()> {
        let bad = |_| TeeError::BadParameters;
        let state = match self.alg {
            HashAlg::Sha1 => HmacState::Sha1(Hmac::new_from_slice(key).map_err(bad)?),
            HashAlg::Sha224 => HmacState::Sha224(Hmac::new_from_slice(key).map_err(bad)?),
            HashAlg::Sha256 => HmacState::Sha256(Hmac::new_from_slice(key).map_err(bad)?),
            HashAlg::Sha384 => HmacState::Sha384(Hmac::new_from_slice(key).map_err(bad)?),
            HashAlg::Sha512 => HmacState::Sha512(Hmac::new_from_slice(key).map_err(bad)?),
        };
        self.state = Some(state);
        Ok(())
    }

    fn update(&mut self, data: &[u8]) -> TeeResult<()> {
        match self.state.as_mut().ok_or(TeeError::BadState)? {
            HmacState::Sha1(m) => m.update(data),
            HmacState::Sha224(m) => m.update(data),
            HmacState::Sha256(m) => m.update(data),
            HmacState::Sha384(m) => m.update(data),
            HmacState::Sha512(m) => m.update(data),
        }
        Ok(())
    }

    fn finalize(&mut self) -> TeeResult<Vec<u8>> {
        let tag = match self.state.as_mut().ok_or(TeeError::BadState)? {
            HmacState::Sha1(m) => m.finalize_reset().into_bytes().to_vec(),
            HmacState::Sha224(m) => m.finalize_reset().into_bytes().to_vec(),
            HmacState::Sha256(m) => m.finalize_reset().into_bytes().to_vec(),
            HmacState::Sha384(m) => m.finalize_reset().into_bytes().to_vec(),
            HmacState::Sha512(m) => m.finalize_reset().into_bytes().to_vec(),
        };
        Ok(tag)
    }

    fn box_clone(&self) -> Box<dyn MacCtx> {
        Box::new(self.clone())
    }
}

pub(crate) fn digest_alloc(algo: Algorithm) -> TeeResult<Box<dyn DigestCtx>> {
    if algo.class() != Some(OpClass::Digest) {
        return Err(TeeError::BadParameters);
    }
    Ok(Box::new(ShaCtx::new(HashAlg::from_algorithm(algo)?)))
}

pub(crate) fn mac_alloc(algo: Algorithm) -> TeeResult<Box<dyn MacCtx>> {
    if algo.class() != Some(OpClass::Mac) {
        return Err(TeeError::BadParameters);
    }
    match algo {
        Algorithm::AES_CMAC | Algorithm::AES_CBC_MAC_NOPAD => Err(TeeError::NotImplemented),
        _ => Ok(Box::new(HmacCtx::new(HashAlg::from_algorithm(algo)?))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_answer() {
        let mut ctx = digest_alloc(Algorithm::SHA256).unwrap();
        ctx.update(b"abc");
        assert_eq!(
            hex::encode(ctx.finalize()),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn digest_context_resets_after_finalize() {
        let mut ctx = digest_alloc(Algorithm::SHA1).unwrap();
        ctx.update(b"abc");
        let first = ctx.finalize();
        ctx.update(b"abc");
        assert_eq!(ctx.finalize(), first);
    }

    #[test]
    fn hmac_sha256_rfc4231_case_2() {
        let mut ctx = mac_alloc(Algorithm::HMAC_SHA256).unwrap();
        ctx.init(b"Jefe").unwrap();
        ctx.update(b"what do ya want for nothing?").unwrap();
        assert_eq!(
            hex::encode(ctx.finalize().unwrap()),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn hmac_before_keying_is_bad_state() {
        let mut ctx = mac_alloc(Algorithm::HMAC_SHA1).unwrap();
        assert!(matches!(ctx.update(b"x"), Err(TeeError::BadState)));
    }

    #[test]
    fn md5_is_not_carried() {
        assert!(matches!(
            digest_alloc(Algorithm::MD5),
            Err(TeeError::NotImplemented)
        ));
    }
}
