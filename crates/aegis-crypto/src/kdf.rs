//! Key-derivation functions.

#[cfg(any(feature = "hkdf", feature = "concat-kdf", feature = "pbkdf2"))]
use aegis_core::error::{TeeError, TeeResult};

#[cfg(any(feature = "hkdf", feature = "concat-kdf", feature = "pbkdf2"))]
use crate::digest::HashAlg;

#[cfg(feature = "hkdf")]
pub(crate) fn hkdf(
    alg: HashAlg,
    ikm: &[u8],
    salt: &[u8],
    info: &[u8],
    okm_len: usize,
) -> TeeResult<Vec<u8>> {
    use hkdf::Hkdf;
    use sha1::Sha1;
    use sha2::{Sha224, Sha256, Sha384, Sha512};

    let salt = (!salt.is_empty()).then_some(salt);
    let mut okm = vec![0u8; okm_len];
    let res = match alg {
        HashAlg::Sha1 => Hkdf::<Sha1>::new(salt, ikm).expand(info, &mut okm),
        HashAlg::Sha224 => Hkdf::<Sha224>::new(salt, ikm).expand(info, &mut okm),
        HashAlg::Sha256 => Hkdf::<Sha256>::new(salt, ikm).expand(info, &mut okm),
        HashAlg::Sha384 => Hkdf::<Sha384>::new(salt, ikm).expand(info, &mut okm),
        HashAlg::Sha512 => Hkdf::<Sha512>::new(salt, ikm).expand(info, &mut okm),
    };
    res.map_err(|_| TeeError::BadParameters)?;
    Ok(okm)
}

/// NIST SP 800-56A single-step concatenation KDF: iterated
/// `H(counter_be || z || other_info)`.
#[cfg(feature = "concat-kdf")]
pub(crate) fn concat_kdf(
    alg: HashAlg,
    z: &[u8],
    other_info: &[u8],
    dkm_len: usize,
) -> TeeResult<Vec<u8>> {
    if dkm_len == 0 {
        return Err(TeeError::BadParameters);
    }
    let mut out = Vec::with_capacity(dkm_len + alg.size());
    let mut counter: u32 = 1;
    while out.len() < dkm_len {
        let mut block = counter.to_be_bytes().to_vec();
        block.extend_from_slice(z);
        block.extend_from_slice(other_info);
        out.extend_from_slice(&alg.digest(&block));
        counter = counter.checked_add(1).ok_or(TeeError::BadParameters)?;
    }
    out.truncate(dkm_len);
    Ok(out)
}

#[cfg(feature = "pbkdf2")]
pub(crate) fn pbkdf2(
    alg: HashAlg,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    dkm_len: usize,
) -> TeeResult<Vec<u8>> {
    use pbkdf2::pbkdf2_hmac;
    use sha1::Sha1;
    use sha2::{Sha224, Sha256, Sha384, Sha512};

    if iterations == 0 || dkm_len == 0 {
        return Err(TeeError::BadParameters);
    }
    let mut out = vec![0u8; dkm_len];
    match alg {
        HashAlg::Sha1 => pbkdf2_hmac::<Sha1>(password, salt, iterations, &mut out),
        HashAlg::Sha224 => pbkdf2_hmac::<Sha224>(password, salt, iterations, &mut out),
        HashAlg::Sha256 => pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out),
        HashAlg::Sha384 => pbkdf2_hmac::<Sha384>(password, salt, iterations, &mut out),
        HashAlg::Sha512 => pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut out),
    }
    Ok(out)
}
