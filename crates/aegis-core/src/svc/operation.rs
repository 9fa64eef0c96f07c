//! Operation-state verbs: allocate, copy, free.

use tracing::debug;

use crate::error::{TeeError, TeeResult};
use crate::ids::{usage, Algorithm, Mode, ObjectType, OpClass};
use crate::object::CrypObj;
use crate::provider::CryptoProvider;
use crate::session::{ObjHandle, Session, StateHandle};
use crate::state::{OpCtx, OpState};

fn usage_for_mode(mode: Mode) -> u32 {
    match mode {
        Mode::Encrypt => usage::ENCRYPT,
        Mode::Decrypt => usage::DECRYPT,
        Mode::Sign => usage::SIGN,
        Mode::Verify => usage::VERIFY,
        Mode::Mac => usage::MAC,
        Mode::Derive => usage::DERIVE,
        Mode::Digest => 0,
    }
}

/// Checks that a key object's type and usage rights fit an algorithm and
/// direction.
fn check_key_type(o: &CrypObj, algo: Algorithm, mode: Mode) -> TeeResult<()> {
    let need = usage_for_mode(mode);
    if o.info.usage & need != need {
        return Err(TeeError::BadParameters);
    }

    let t = o.info.object_type;
    let ok = match algo.main_alg() {
        Algorithm::MAIN_AES => t == ObjectType::AES,
        Algorithm::MAIN_DES => t == ObjectType::DES,
        Algorithm::MAIN_DES3 => t == ObjectType::DES3,
        Algorithm::MAIN_MD5 => t == ObjectType::HMAC_MD5 || t == ObjectType::GENERIC_SECRET,
        Algorithm::MAIN_SHA1 => t == ObjectType::HMAC_SHA1 || t == ObjectType::GENERIC_SECRET,
        Algorithm::MAIN_SHA224 => t == ObjectType::HMAC_SHA224 || t == ObjectType::GENERIC_SECRET,
        Algorithm::MAIN_SHA256 => t == ObjectType::HMAC_SHA256 || t == ObjectType::GENERIC_SECRET,
        Algorithm::MAIN_SHA384 => t == ObjectType::HMAC_SHA384 || t == ObjectType::GENERIC_SECRET,
        Algorithm::MAIN_SHA512 => t == ObjectType::HMAC_SHA512 || t == ObjectType::GENERIC_SECRET,
        Algorithm::MAIN_RSA => {
            t == ObjectType::RSA_KEYPAIR
                || (matches!(mode, Mode::Encrypt | Mode::Verify)
                    && t == ObjectType::RSA_PUBLIC_KEY)
        }
        Algorithm::MAIN_DSA => {
            t == ObjectType::DSA_KEYPAIR
                || (mode == Mode::Verify && t == ObjectType::DSA_PUBLIC_KEY)
        }
        Algorithm::MAIN_DH => t == ObjectType::DH_KEYPAIR,
        Algorithm::MAIN_ECC => {
            if algo.class() == Some(OpClass::Derive) {
                t == ObjectType::ECDH_KEYPAIR
            } else {
                t == ObjectType::ECDSA_KEYPAIR
                    || (mode == Mode::Verify && t == ObjectType::ECDSA_PUBLIC_KEY)
            }
        }
        Algorithm::MAIN_HKDF => t == ObjectType::HKDF_IKM || t == ObjectType::GENERIC_SECRET,
        Algorithm::MAIN_CONCAT_KDF => {
            t == ObjectType::CONCAT_KDF_Z || t == ObjectType::GENERIC_SECRET
        }
        Algorithm::MAIN_PBKDF2 => {
            t == ObjectType::PBKDF2_PASSWORD || t == ObjectType::GENERIC_SECRET
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(TeeError::BadParameters)
    }
}

/// Allocates an operation state binding `algo`, `mode`, and the class's
/// key objects. Bound objects become busy until the state is freed.
pub fn state_alloc(
    sess: &mut Session,
    provider: &dyn CryptoProvider,
    algo_raw: u32,
    mode_raw: u32,
    key1: u64,
    key2: u64,
) -> TeeResult<StateHandle> {
    let algo = Algorithm(algo_raw);
    let mode = Mode::from_raw(mode_raw).ok_or(TeeError::BadParameters)?;
    let class = algo.class().ok_or(TeeError::NotSupported)?;
    let k1 = (key1 != 0).then_some(ObjHandle(key1));
    let k2 = (key2 != 0).then_some(ObjHandle(key2));

    // Key-count policy per class: two keys only for XTS, none for
    // digests, exactly one otherwise.
    let key_count_ok = match class {
        OpClass::Cipher => {
            if algo == Algorithm::AES_XTS {
                k1.is_some() && k2.is_some()
            } else {
                k1.is_some() && k2.is_none()
            }
        }
        OpClass::Mac
        | OpClass::AuthEnc
        | OpClass::AsymCipher
        | OpClass::AsymSig
        | OpClass::Derive => k1.is_some() && k2.is_none(),
        OpClass::Digest => k1.is_none() && k2.is_none(),
    };
    if !key_count_ok {
        return Err(TeeError::BadParameters);
    }

    for kh in [k1, k2].into_iter().flatten() {
        let o = sess.obj(kh)?;
        if !o.info.is_initialized() {
            return Err(TeeError::BadParameters);
        }
        if o.busy {
            return Err(TeeError::BadParameters);
        }
        check_key_type(o, algo, mode)?;
    }

    let ctx = match class {
        OpClass::Digest => OpCtx::Digest(provider.digest_alloc(algo)?),
        OpClass::Mac => OpCtx::Mac(provider.mac_alloc(algo)?),
        OpClass::Cipher => OpCtx::Cipher(provider.cipher_alloc(algo)?),
        OpClass::AuthEnc => OpCtx::AuthEnc(provider.authenc_alloc(algo)?),
        OpClass::AsymCipher | OpClass::AsymSig | OpClass::Derive => OpCtx::None,
    };

    let mut st = OpState::new(algo, mode);
    st.key1 = k1;
    st.key2 = k2;
    st.ctx = ctx;
    let h = sess.add_state(st);
    for kh in [k1, k2].into_iter().flatten() {
        sess.obj_mut(kh)?.busy = true;
    }
    debug!(state = h.0, algo = algo_raw, mode = mode_raw, "allocated operation state");
    Ok(h)
}

/// Copies the stream position of `src` into `dst`. Both states keep
/// their own key bindings; algorithm and mode must match.
pub fn state_copy(sess: &mut Session, dst: StateHandle, src: StateHandle) -> TeeResult<()> {
    let (dst_st, src_st) = sess.state_pair_mut(dst, src)?;
    dst_st.copy_stream_from(src_st)
}

/// Frees a state, running any owed stream teardown and releasing busy
/// leases.
pub fn state_free(sess: &mut Session, h: StateHandle) -> TeeResult<()> {
    sess.free_state(h)
}
