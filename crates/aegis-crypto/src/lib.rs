//! Aegis Software Crypto Provider
//!
//! A pure-software [`CryptoProvider`] for the aegis object kernel, built
//! on the RustCrypto stack (SHA/HMAC/AES/GCM/P-256) with big-integer
//! RSA, DSA, and finite-field Diffie-Hellman.
//!
//! Deliberate capability gaps, which surface as
//! [`TeeError::NotImplemented`] at the syscall that first needs them:
//! MD5, DES/3DES, AES-CTS/XTS/CCM, CMAC and CBC-MAC, and DSA domain
//! parameter generation.
//!
//! # Security
//!
//! - GCM buffers and withholds plaintext until the tag verifies
//! - RSA key generation uses Miller-Rabin with 25 rounds over
//!   OS-provided randomness
//! - P-256 is the only supported curve; everything else is refused
//!   rather than approximated
//!
//! [`TeeError::NotImplemented`]: aegis_core::TeeError::NotImplemented

#![forbid(unsafe_code)]

use aegis_core::attr::Mpi;
use aegis_core::error::{TeeError, TeeResult};
use aegis_core::ids::Algorithm;
use aegis_core::material::{
    DhKeypair, DsaKeypair, DsaPublicView, EccKeypair, EccPublicView, RsaKeypair, RsaPublicView,
};
use aegis_core::provider::{AeCtx, CipherCtx, CryptoProvider, DigestCtx, MacCtx};
use rand::rngs::OsRng;
use rand::RngCore;

mod asymm;
mod authenc;
mod cipher;
mod digest;
mod kdf;

#[cfg(any(feature = "hkdf", feature = "concat-kdf", feature = "pbkdf2"))]
use digest::HashAlg;

/// The software capability table.
#[derive(Debug, Default, Clone, Copy)]
pub struct SoftCrypto;

impl SoftCrypto {
    /// A fresh provider. Stateless; one instance can serve any number of
    /// sessions.
    pub fn new() -> Self {
        Self
    }
}

impl CryptoProvider for SoftCrypto {
    fn digest_alloc(&self, algo: Algorithm) -> TeeResult<Box<dyn DigestCtx>> {
        digest::digest_alloc(algo)
    }

    fn mac_alloc(&self, algo: Algorithm) -> TeeResult<Box<dyn MacCtx>> {
        digest::mac_alloc(algo)
    }

    fn cipher_alloc(&self, algo: Algorithm) -> TeeResult<Box<dyn CipherCtx>> {
        cipher::cipher_alloc(algo)
    }

    fn authenc_alloc(&self, algo: Algorithm) -> TeeResult<Box<dyn AeCtx>> {
        authenc::authenc_alloc(algo)
    }

    fn rng_read(&self, out: &mut [u8]) -> TeeResult<()> {
        OsRng.try_fill_bytes(out).map_err(|_| TeeError::Generic)
    }

    fn rsa_gen_keypair(&self, key: &mut RsaKeypair, bits: usize) -> TeeResult<()> {
        asymm::rsa_gen_keypair(key, bits)
    }

    fn dh_gen_keypair(&self, key: &mut DhKeypair) -> TeeResult<()> {
        asymm::dh_gen_keypair(key)
    }

    fn ecc_gen_keypair(&self, key: &mut EccKeypair) -> TeeResult<()> {
        asymm::ecc_gen_keypair(key)
    }

    fn rsanopad_encrypt(&self, key: RsaPublicView<'_>, src: &[u8]) -> TeeResult<Vec<u8>> {
        asymm::rsanopad_encrypt(key, src)
    }

    fn rsanopad_decrypt(&self, key: &RsaKeypair, src: &[u8]) -> TeeResult<Vec<u8>> {
        asymm::rsanopad_decrypt(key, src)
    }

    fn rsaes_encrypt(
        &self,
        algo: Algorithm,
        key: RsaPublicView<'_>,
        label: &[u8],
        src: &[u8],
    ) -> TeeResult<Vec<u8>> {
        asymm::rsaes_encrypt(algo, key, label, src)
    }

    fn rsaes_decrypt(
        &self,
        algo: Algorithm,
        key: &RsaKeypair,
        label: &[u8],
        src: &[u8],
    ) -> TeeResult<Vec<u8>> {
        asymm::rsaes_decrypt(algo, key, label, src)
    }

    fn rsassa_sign(
        &self,
        algo: Algorithm,
        key: &RsaKeypair,
        salt_len: usize,
        digest: &[u8],
    ) -> TeeResult<Vec<u8>> {
        asymm::rsassa_sign(algo, key, salt_len, digest)
    }

    fn rsassa_verify(
        &self,
        algo: Algorithm,
        key: RsaPublicView<'_>,
        salt_len: usize,
        digest: &[u8],
        sig: &[u8],
    ) -> TeeResult<()> {
        asymm::rsassa_verify(algo, key, salt_len, digest, sig)
    }

    fn dsa_sign(&self, _algo: Algorithm, key: &DsaKeypair, digest: &[u8]) -> TeeResult<Vec<u8>> {
        asymm::dsa_sign(key, digest)
    }

    fn dsa_verify(
        &self,
        _algo: Algorithm,
        key: DsaPublicView<'_>,
        digest: &[u8],
        sig: &[u8],
    ) -> TeeResult<()> {
        asymm::dsa_verify(key, digest, sig)
    }

    fn ecc_sign(&self, _algo: Algorithm, key: &EccKeypair, digest: &[u8]) -> TeeResult<Vec<u8>> {
        asymm::ecc_sign(key, digest)
    }

    fn ecc_verify(
        &self,
        _algo: Algorithm,
        key: EccPublicView<'_>,
        digest: &[u8],
        sig: &[u8],
    ) -> TeeResult<()> {
        asymm::ecc_verify(key, digest, sig)
    }

    fn dh_shared_secret(&self, key: &DhKeypair, peer_public: &Mpi) -> TeeResult<Vec<u8>> {
        asymm::dh_shared_secret(key, peer_public)
    }

    fn ecc_shared_secret(
        &self,
        key: &EccKeypair,
        peer: EccPublicView<'_>,
    ) -> TeeResult<Vec<u8>> {
        asymm::ecc_shared_secret(key, peer)
    }

    #[cfg(feature = "hkdf")]
    fn hkdf(
        &self,
        hash: Algorithm,
        ikm: &[u8],
        salt: &[u8],
        info: &[u8],
        okm_len: usize,
    ) -> TeeResult<Vec<u8>> {
        kdf::hkdf(HashAlg::from_algorithm(hash)?, ikm, salt, info, okm_len)
    }

    #[cfg(feature = "concat-kdf")]
    fn concat_kdf(
        &self,
        hash: Algorithm,
        z: &[u8],
        other_info: &[u8],
        dkm_len: usize,
    ) -> TeeResult<Vec<u8>> {
        kdf::concat_kdf(HashAlg::from_algorithm(hash)?, z, other_info, dkm_len)
    }

    #[cfg(feature = "pbkdf2")]
    fn pbkdf2(
        &self,
        hash: Algorithm,
        password: &[u8],
        salt: &[u8],
        iterations: u32,
        dkm_len: usize,
    ) -> TeeResult<Vec<u8>> {
        kdf::pbkdf2(
            HashAlg::from_algorithm(hash)?,
            password,
            salt,
            iterations,
            dkm_len,
        )
    }
}
