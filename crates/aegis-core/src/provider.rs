//! Injected cryptographic capability.
//!
//! The policy layer never computes cryptography itself; it calls a
//! [`CryptoProvider`]. Every entry has a default body returning
//! [`TeeError::NotImplemented`], so a provider implements exactly the
//! primitives its deployment carries and everything else degrades to a
//! capability error at the syscall that first needs it.
//!
//! Streaming primitives hand out boxed contexts. A context must be
//! cloneable so operation states can be duplicated mid-stream.

use crate::attr::Mpi;
use crate::error::{TeeError, TeeResult};
use crate::ids::{Algorithm, Mode};
use crate::material::{
    DhKeypair, DsaKeypair, DsaPublicView, EccKeypair, EccPublicView, RsaKeypair, RsaPublicView,
};

/// Streaming digest context.
pub trait DigestCtx: Send {
    /// Resets to a fresh digest stream.
    fn init(&mut self);
    /// Absorbs data.
    fn update(&mut self, data: &[u8]);
    /// Produces the digest and leaves the context reusable after `init`.
    fn finalize(&mut self) -> Vec<u8>;
    /// Duplicates the mid-stream state.
    fn box_clone(&self) -> Box<dyn DigestCtx>;
}

/// Streaming MAC context.
pub trait MacCtx: Send {
    /// Starts a MAC stream over `key`.
    fn init(&mut self, key: &[u8]) -> TeeResult<()>;
    /// Absorbs data; fails before `init`.
    fn update(&mut self, data: &[u8]) -> TeeResult<()>;
    /// Produces the tag.
    fn finalize(&mut self) -> TeeResult<Vec<u8>>;
    /// Duplicates the mid-stream state.
    fn box_clone(&self) -> Box<dyn MacCtx>;
}

/// Streaming symmetric-cipher context.
pub trait CipherCtx: Send {
    /// Starts a cipher stream. `key2` is present only for two-key
    /// algorithms.
    fn init(
        &mut self,
        mode: Mode,
        key1: &[u8],
        key2: Option<&[u8]>,
        iv: &[u8],
    ) -> TeeResult<()>;
    /// Transforms `src`, returning produced bytes. `last_block` marks the
    /// final chunk of the stream.
    fn update(&mut self, last_block: bool, src: &[u8]) -> TeeResult<Vec<u8>>;
    /// Releases per-stream resources; safe to call once after the last
    /// update.
    fn finalize(&mut self);
    /// Duplicates the mid-stream state.
    fn box_clone(&self) -> Box<dyn CipherCtx>;
}

/// Streaming authenticated-encryption context.
pub trait AeCtx: Send {
    /// Starts an AEAD stream.
    fn init(
        &mut self,
        mode: Mode,
        key: &[u8],
        nonce: &[u8],
        tag_len: usize,
        aad_len: usize,
        payload_len: usize,
    ) -> TeeResult<()>;
    /// Absorbs associated data; only valid before payload data.
    fn update_aad(&mut self, aad: &[u8]) -> TeeResult<()>;
    /// Absorbs payload, returning any bytes the implementation can emit
    /// early (an implementation may buffer and return nothing).
    fn update_payload(&mut self, src: &[u8]) -> TeeResult<Vec<u8>>;
    /// Finishes encryption: returns remaining ciphertext and the tag.
    fn enc_final(&mut self, src: &[u8]) -> TeeResult<(Vec<u8>, Vec<u8>)>;
    /// Finishes decryption against `tag`: returns remaining plaintext or
    /// [`TeeError::MacInvalid`].
    fn dec_final(&mut self, src: &[u8], tag: &[u8]) -> TeeResult<Vec<u8>>;
    /// Releases per-stream resources.
    fn finalize(&mut self);
    /// Duplicates the mid-stream state.
    fn box_clone(&self) -> Box<dyn AeCtx>;
}

/// The capability table a deployment injects.
#[allow(unused_variables)]
pub trait CryptoProvider: Send + Sync {
    /// Allocates a digest context for `algo`.
    fn digest_alloc(&self, algo: Algorithm) -> TeeResult<Box<dyn DigestCtx>> {
        Err(TeeError::NotImplemented)
    }

    /// Allocates a MAC context for `algo`.
    fn mac_alloc(&self, algo: Algorithm) -> TeeResult<Box<dyn MacCtx>> {
        Err(TeeError::NotImplemented)
    }

    /// Allocates a symmetric-cipher context for `algo`.
    fn cipher_alloc(&self, algo: Algorithm) -> TeeResult<Box<dyn CipherCtx>> {
        Err(TeeError::NotImplemented)
    }

    /// Allocates an AEAD context for `algo`.
    fn authenc_alloc(&self, algo: Algorithm) -> TeeResult<Box<dyn AeCtx>> {
        Err(TeeError::NotImplemented)
    }

    /// Fills `out` with cryptographically secure random bytes.
    fn rng_read(&self, out: &mut [u8]) -> TeeResult<()> {
        Err(TeeError::NotImplemented)
    }

    /// Generates an RSA key pair of `bits` modulus bits. `key.e` holds
    /// the requested public exponent on entry.
    fn rsa_gen_keypair(&self, key: &mut RsaKeypair, bits: usize) -> TeeResult<()> {
        Err(TeeError::NotImplemented)
    }

    /// Generates a DSA key pair; domain parameters are populated on
    /// entry.
    fn dsa_gen_keypair(&self, key: &mut DsaKeypair, bits: usize) -> TeeResult<()> {
        Err(TeeError::NotImplemented)
    }

    /// Generates a Diffie-Hellman key pair; `p`, `g`, and optionally `q`
    /// and `x_bits` are populated on entry. Must set `x`, `y`, and the
    /// effective `x_bits`.
    fn dh_gen_keypair(&self, key: &mut DhKeypair) -> TeeResult<()> {
        Err(TeeError::NotImplemented)
    }

    /// Generates an elliptic-curve key pair; `curve` is populated on
    /// entry.
    fn ecc_gen_keypair(&self, key: &mut EccKeypair) -> TeeResult<()> {
        Err(TeeError::NotImplemented)
    }

    /// Raw RSA public-key operation.
    fn rsanopad_encrypt(&self, key: RsaPublicView<'_>, src: &[u8]) -> TeeResult<Vec<u8>> {
        Err(TeeError::NotImplemented)
    }

    /// Raw RSA private-key operation.
    fn rsanopad_decrypt(&self, key: &RsaKeypair, src: &[u8]) -> TeeResult<Vec<u8>> {
        Err(TeeError::NotImplemented)
    }

    /// RSA encryption with the padding scheme `algo` selects. `label` is
    /// the OAEP label, empty otherwise.
    fn rsaes_encrypt(
        &self,
        algo: Algorithm,
        key: RsaPublicView<'_>,
        label: &[u8],
        src: &[u8],
    ) -> TeeResult<Vec<u8>> {
        Err(TeeError::NotImplemented)
    }

    /// RSA decryption with the padding scheme `algo` selects.
    fn rsaes_decrypt(
        &self,
        algo: Algorithm,
        key: &RsaKeypair,
        label: &[u8],
        src: &[u8],
    ) -> TeeResult<Vec<u8>> {
        Err(TeeError::NotImplemented)
    }

    /// RSA signature over a precomputed digest. `salt_len` only matters
    /// for PSS schemes.
    fn rsassa_sign(
        &self,
        algo: Algorithm,
        key: &RsaKeypair,
        salt_len: usize,
        digest: &[u8],
    ) -> TeeResult<Vec<u8>> {
        Err(TeeError::NotImplemented)
    }

    /// RSA signature verification over a precomputed digest.
    fn rsassa_verify(
        &self,
        algo: Algorithm,
        key: RsaPublicView<'_>,
        salt_len: usize,
        digest: &[u8],
        sig: &[u8],
    ) -> TeeResult<()> {
        Err(TeeError::NotImplemented)
    }

    /// DSA signature over a precomputed digest.
    fn dsa_sign(&self, algo: Algorithm, key: &DsaKeypair, digest: &[u8]) -> TeeResult<Vec<u8>> {
        Err(TeeError::NotImplemented)
    }

    /// DSA signature verification.
    fn dsa_verify(
        &self,
        algo: Algorithm,
        key: DsaPublicView<'_>,
        digest: &[u8],
        sig: &[u8],
    ) -> TeeResult<()> {
        Err(TeeError::NotImplemented)
    }

    /// ECDSA signature over a precomputed digest; raw `r || s` output.
    fn ecc_sign(&self, algo: Algorithm, key: &EccKeypair, digest: &[u8]) -> TeeResult<Vec<u8>> {
        Err(TeeError::NotImplemented)
    }

    /// ECDSA signature verification of raw `r || s`.
    fn ecc_verify(
        &self,
        algo: Algorithm,
        key: EccPublicView<'_>,
        digest: &[u8],
        sig: &[u8],
    ) -> TeeResult<()> {
        Err(TeeError::NotImplemented)
    }

    /// Diffie-Hellman shared secret against a peer public value.
    fn dh_shared_secret(&self, key: &DhKeypair, peer_public: &Mpi) -> TeeResult<Vec<u8>> {
        Err(TeeError::NotImplemented)
    }

    /// ECDH shared secret against a peer public point.
    fn ecc_shared_secret(
        &self,
        key: &EccKeypair,
        peer: EccPublicView<'_>,
    ) -> TeeResult<Vec<u8>> {
        Err(TeeError::NotImplemented)
    }

    /// HKDF extract-and-expand keyed by `hash`.
    #[cfg(feature = "hkdf")]
    fn hkdf(
        &self,
        hash: Algorithm,
        ikm: &[u8],
        salt: &[u8],
        info: &[u8],
        okm_len: usize,
    ) -> TeeResult<Vec<u8>> {
        Err(TeeError::NotImplemented)
    }

    /// NIST SP 800-56A concatenation KDF keyed by `hash`.
    #[cfg(feature = "concat-kdf")]
    fn concat_kdf(
        &self,
        hash: Algorithm,
        z: &[u8],
        other_info: &[u8],
        dkm_len: usize,
    ) -> TeeResult<Vec<u8>> {
        Err(TeeError::NotImplemented)
    }

    /// PBKDF2 keyed by `hash`.
    #[cfg(feature = "pbkdf2")]
    fn pbkdf2(
        &self,
        hash: Algorithm,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        dkm_len: usize,
    ) -> TeeResult<Vec<u8>> {
        Err(TeeError::NotImplemented)
    }
}
