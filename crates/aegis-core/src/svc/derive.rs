//! Key-derivation verbs.
//!
//! Derivation reads the bound key object, mixes in per-call parameters,
//! and installs the result as secret material in an uninitialized
//! destination object. The destination's allocation-time capacity bounds
//! every output length; nothing is truncated to fit.

use zeroize::Zeroize;

use crate::attr::Mpi;
use crate::boundary::{copy_in_attrs, Attribute, UserMemory, UserPtr};
use crate::error::{TeeError, TeeResult};
use crate::ids::{handle_flags, Algorithm, AttributeId, Mode};
use crate::material::EccPublicView;
use crate::provider::CryptoProvider;
use crate::session::{ObjHandle, Session, StateHandle};
use tracing::debug;

#[cfg(any(feature = "hkdf", feature = "concat-kdf", feature = "pbkdf2"))]
struct KdfParams<'a> {
    salt: &'a [u8],
    info: &'a [u8],
    iterations: Option<u32>,
    out_len: Option<usize>,
}

#[cfg(any(feature = "hkdf", feature = "concat-kdf", feature = "pbkdf2"))]
fn parse_kdf_params<'a>(
    params: &'a [Attribute],
    salt_id: Option<AttributeId>,
    info_id: Option<AttributeId>,
    iter_id: Option<AttributeId>,
    len_id: AttributeId,
) -> TeeResult<KdfParams<'a>> {
    let mut out = KdfParams {
        salt: &[],
        info: &[],
        iterations: None,
        out_len: None,
    };
    for p in params {
        if Some(p.id) == salt_id {
            out.salt = p.as_ref_bytes()?;
        } else if Some(p.id) == info_id {
            out.info = p.as_ref_bytes()?;
        } else if Some(p.id) == iter_id {
            out.iterations = Some(p.as_value_a()?);
        } else if p.id == len_id {
            out.out_len = Some(p.as_value_a()? as usize);
        } else {
            return Err(TeeError::BadParameters);
        }
    }
    Ok(out)
}

/// Derives key material into the uninitialized object `derived`.
pub fn derive_key(
    sess: &mut Session,
    mem: &dyn UserMemory,
    provider: &dyn CryptoProvider,
    h: StateHandle,
    params_ptr: UserPtr,
    param_count: u32,
    derived: ObjHandle,
) -> TeeResult<()> {
    let params = copy_in_attrs(mem, params_ptr, param_count)?;
    let (algo, mode, kh) = {
        let st = sess.state(h)?;
        (st.algo, st.mode, st.key1.ok_or(TeeError::BadState)?)
    };
    if mode != Mode::Derive {
        return Err(TeeError::BadParameters);
    }
    let (dst_o, key_o) = sess.obj_pair_mut(derived, kh)?;
    if dst_o.info.is_persistent() || dst_o.info.is_initialized() {
        return Err(TeeError::BadParameters);
    }
    let cap = dst_o
        .material
        .secret()
        .ok_or(TeeError::BadState)?
        .capacity();

    let mut secret = match algo.main_alg() {
        Algorithm::MAIN_DH => {
            if params.len() != 1 || params[0].id != AttributeId::DH_PUBLIC_VALUE {
                return Err(TeeError::BadParameters);
            }
            let peer = Mpi::from_be_bytes(params[0].as_ref_bytes()?);
            let km = key_o.material.dh_keypair().ok_or(TeeError::BadState)?;
            provider.dh_shared_secret(km, &peer)?
        }
        Algorithm::MAIN_ECC => {
            if params.len() != 2
                || params[0].id != AttributeId::ECC_PUBLIC_VALUE_X
                || params[1].id != AttributeId::ECC_PUBLIC_VALUE_Y
            {
                return Err(TeeError::BadParameters);
            }
            let x = Mpi::from_be_bytes(params[0].as_ref_bytes()?);
            let y = Mpi::from_be_bytes(params[1].as_ref_bytes()?);
            let km = key_o.material.ecc_keypair().ok_or(TeeError::BadState)?;
            let peer = EccPublicView {
                x: &x,
                y: &y,
                curve: km.curve,
            };
            provider.ecc_shared_secret(km, peer)?
        }
        #[cfg(feature = "hkdf")]
        Algorithm::MAIN_HKDF => {
            let p = parse_kdf_params(
                &params,
                Some(AttributeId::HKDF_SALT),
                Some(AttributeId::HKDF_INFO),
                None,
                AttributeId::HKDF_OKM_LENGTH,
            )?;
            let okm_len = p.out_len.ok_or(TeeError::BadParameters)?;
            if okm_len > cap {
                return Err(TeeError::BadParameters);
            }
            let ikm = key_o.material.secret().ok_or(TeeError::BadState)?;
            provider.hkdf(algo.digest_hash(), ikm.bytes(), p.salt, p.info, okm_len)?
        }
        #[cfg(feature = "concat-kdf")]
        Algorithm::MAIN_CONCAT_KDF => {
            let p = parse_kdf_params(
                &params,
                None,
                Some(AttributeId::CONCAT_KDF_OTHER_INFO),
                None,
                AttributeId::CONCAT_KDF_DKM_LENGTH,
            )?;
            let dkm_len = p.out_len.ok_or(TeeError::BadParameters)?;
            if dkm_len > cap {
                return Err(TeeError::BadParameters);
            }
            let z = key_o.material.secret().ok_or(TeeError::BadState)?;
            provider.concat_kdf(algo.digest_hash(), z.bytes(), p.info, dkm_len)?
        }
        #[cfg(feature = "pbkdf2")]
        Algorithm::MAIN_PBKDF2 => {
            let p = parse_kdf_params(
                &params,
                Some(AttributeId::PBKDF2_SALT),
                None,
                Some(AttributeId::PBKDF2_ITERATION_COUNT),
                AttributeId::PBKDF2_DKM_LENGTH,
            )?;
            let dkm_len = p.out_len.ok_or(TeeError::BadParameters)?;
            let iterations = p.iterations.ok_or(TeeError::BadParameters)?;
            if dkm_len > cap {
                return Err(TeeError::BadParameters);
            }
            let password = key_o.material.secret().ok_or(TeeError::BadState)?;
            provider.pbkdf2(
                algo.digest_hash(),
                password.bytes(),
                p.salt,
                iterations,
                dkm_len,
            )?
        }
        _ => return Err(TeeError::NotSupported),
    };

    if secret.len() > cap {
        secret.zeroize();
        return Err(TeeError::BadParameters);
    }
    let props = dst_o.props()?;
    let sk = dst_o.material.secret_mut().ok_or(TeeError::BadState)?;
    let res = sk.set(&secret);
    let len = secret.len();
    secret.zeroize();
    res?;
    dst_o.have_attrs = props.all_attrs_mask();
    dst_o.info.object_size = (len * 8) as u32;
    dst_o.info.handle_flags |= handle_flags::INITIALIZED;
    debug!(state = h.0, derived = derived.0, bytes = len, "derived key");
    Ok(())
}
