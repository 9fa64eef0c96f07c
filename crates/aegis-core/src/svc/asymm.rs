//! Asymmetric cipher and signature verbs.
//!
//! These are single-shot: no streaming context, the bound key object is
//! consulted on every call. Signature verbs operate over precomputed
//! digests; hashing the message is the caller's business.

use crate::boundary::{
    copy_in_attrs, Attribute, UserMemory, UserPtr, MEM_READ, MEM_WRITE,
};
use crate::error::{TeeError, TeeResult};
use crate::ids::{Algorithm, AttributeId, Mode, OpClass};
use crate::provider::CryptoProvider;
use crate::session::{Session, StateHandle};

fn find_ref<'a>(params: &'a [Attribute], id: AttributeId) -> TeeResult<Option<&'a [u8]>> {
    match params.iter().find(|p| p.id == id) {
        Some(p) => Ok(Some(p.as_ref_bytes()?)),
        None => Ok(None),
    }
}

fn find_value(params: &[Attribute], id: AttributeId) -> TeeResult<Option<u32>> {
    match params.iter().find(|p| p.id == id) {
        Some(p) => Ok(Some(p.as_value_a()?)),
        None => Ok(None),
    }
}

fn is_rsaes(algo: Algorithm) -> bool {
    algo.main_alg() == Algorithm::MAIN_RSA
        && algo.class() == Some(OpClass::AsymCipher)
        && algo != Algorithm::RSA_NOPAD
}

fn is_rsassa(algo: Algorithm) -> bool {
    algo.main_alg() == Algorithm::MAIN_RSA && algo.class() == Some(OpClass::AsymSig)
}

/// Runs an asymmetric encrypt, decrypt, or sign operation.
///
/// `params` carries per-call attributes: the OAEP label and the PSS salt
/// length. For signatures `src` is the digest to sign and the salt
/// length defaults to the digest length.
#[allow(clippy::too_many_arguments)]
pub fn asymm_operate(
    sess: &Session,
    mem: &mut dyn UserMemory,
    provider: &dyn CryptoProvider,
    h: StateHandle,
    params_ptr: UserPtr,
    param_count: u32,
    src: UserPtr,
    src_len: usize,
    dst: UserPtr,
    dst_len: UserPtr,
) -> TeeResult<()> {
    let params = copy_in_attrs(mem, params_ptr, param_count)?;
    mem.check_access(MEM_READ, src, src_len)?;
    let cap = mem.read_u64(dst_len)? as usize;
    mem.check_access(MEM_WRITE, dst, cap)?;
    let data = mem.read_bytes(src, src_len)?;

    let st = sess.state(h)?;
    let algo = st.algo;
    let mode = st.mode;
    match algo.class() {
        Some(OpClass::AsymCipher) if matches!(mode, Mode::Encrypt | Mode::Decrypt) => {}
        Some(OpClass::AsymSig) if mode == Mode::Sign => {}
        _ => return Err(TeeError::BadParameters),
    }
    let key = &sess.obj(st.key1.ok_or(TeeError::BadState)?)?.material;

    let out = match algo {
        Algorithm::RSA_NOPAD => {
            if mode == Mode::Encrypt {
                let k = key.rsa_public().ok_or(TeeError::BadState)?;
                provider.rsanopad_encrypt(k, &data)?
            } else {
                let k = key.rsa_keypair().ok_or(TeeError::BadState)?;
                provider.rsanopad_decrypt(k, &data)?
            }
        }
        _ if is_rsaes(algo) => {
            let label = find_ref(&params, AttributeId::RSA_OAEP_LABEL)?.unwrap_or(&[]);
            if mode == Mode::Encrypt {
                let k = key.rsa_public().ok_or(TeeError::BadState)?;
                provider.rsaes_encrypt(algo, k, label, &data)?
            } else {
                let k = key.rsa_keypair().ok_or(TeeError::BadState)?;
                provider.rsaes_decrypt(algo, k, label, &data)?
            }
        }
        _ if is_rsassa(algo) => {
            let salt_len = find_value(&params, AttributeId::RSA_PSS_SALT_LENGTH)?
                .map_or(data.len(), |v| v as usize);
            let k = key.rsa_keypair().ok_or(TeeError::BadState)?;
            provider.rsassa_sign(algo, k, salt_len, &data)?
        }
        Algorithm::DSA_SHA1 | Algorithm::DSA_SHA224 | Algorithm::DSA_SHA256 => {
            let k = key.dsa_keypair().ok_or(TeeError::BadState)?;
            provider.dsa_sign(algo, k, &data)?
        }
        _ if algo.main_alg() == Algorithm::MAIN_ECC => {
            let k = key.ecc_keypair().ok_or(TeeError::BadState)?;
            provider.ecc_sign(algo, k, &data)?
        }
        _ => return Err(TeeError::NotSupported),
    };

    if out.len() > cap {
        mem.write_u64(dst_len, out.len() as u64)?;
        return Err(TeeError::ShortBuffer { required: out.len() });
    }
    mem.write_bytes(dst, &out)?;
    mem.write_u64(dst_len, out.len() as u64)
}

/// Verifies a signature over a precomputed digest.
#[allow(clippy::too_many_arguments)]
pub fn asymm_verify(
    sess: &Session,
    mem: &dyn UserMemory,
    provider: &dyn CryptoProvider,
    h: StateHandle,
    params_ptr: UserPtr,
    param_count: u32,
    data: UserPtr,
    data_len: usize,
    sig: UserPtr,
    sig_len: usize,
) -> TeeResult<()> {
    let params = copy_in_attrs(mem, params_ptr, param_count)?;
    mem.check_access(MEM_READ, data, data_len)?;
    mem.check_access(MEM_READ, sig, sig_len)?;
    let digest = mem.read_bytes(data, data_len)?;
    let sig_bytes = mem.read_bytes(sig, sig_len)?;

    let st = sess.state(h)?;
    let algo = st.algo;
    if st.mode != Mode::Verify || algo.class() != Some(OpClass::AsymSig) {
        return Err(TeeError::BadParameters);
    }
    let key = &sess.obj(st.key1.ok_or(TeeError::BadState)?)?.material;

    match algo.main_alg() {
        Algorithm::MAIN_RSA => {
            let hash_size = algo.digest_hash().digest_size().ok_or(TeeError::BadParameters)?;
            if digest.len() != hash_size {
                return Err(TeeError::BadParameters);
            }
            let salt_len = find_value(&params, AttributeId::RSA_PSS_SALT_LENGTH)?
                .map_or(hash_size, |v| v as usize);
            let k = key.rsa_public().ok_or(TeeError::BadState)?;
            provider.rsassa_verify(algo, k, salt_len, &digest, &sig_bytes)
        }
        Algorithm::MAIN_DSA => {
            let hash_size = algo.digest_hash().digest_size().ok_or(TeeError::BadParameters)?;
            if digest.len() != hash_size {
                return Err(TeeError::BadParameters);
            }
            let k = key.dsa_public().ok_or(TeeError::BadState)?;
            provider.dsa_verify(algo, k, &digest, &sig_bytes)
        }
        Algorithm::MAIN_ECC => {
            let k = key.ecc_public().ok_or(TeeError::BadState)?;
            provider.ecc_verify(algo, k, &digest, &sig_bytes)
        }
        _ => Err(TeeError::NotSupported),
    }
}
