//! Asymmetric primitives.
//!
//! RSA and DSA run on big-integer arithmetic with the padding schemes
//! implemented here; elliptic-curve operations go through the P-256
//! implementation. Raw RSA results are minimal big-endian, without
//! leading zeros.

use aegis_core::attr::Mpi;
use aegis_core::error::{TeeError, TeeResult};
use aegis_core::ids::{Algorithm, EccCurve};
use aegis_core::material::{
    DhKeypair, DsaKeypair, DsaPublicView, EccKeypair, EccPublicView, RsaKeypair, RsaPublicView,
};
use num_bigint::{BigInt, BigUint, RandBigInt, Sign};
use num_integer::Integer;
use num_traits::{One, Zero};
use p256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use p256::elliptic_curve::generic_array::GenericArray;
use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::EncodedPoint;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::digest::HashAlg;

fn int(m: &Mpi) -> BigUint {
    BigUint::from_bytes_be(m.as_be_bytes())
}

fn os2ip(b: &[u8]) -> BigUint {
    BigUint::from_bytes_be(b)
}

/// Left-pads to exactly `len` bytes.
fn i2osp(x: &BigUint, len: usize) -> TeeResult<Vec<u8>> {
    let raw = x.to_bytes_be();
    if raw.len() > len {
        return Err(TeeError::BadParameters);
    }
    let mut out = vec![0u8; len - raw.len()];
    out.extend_from_slice(&raw);
    Ok(out)
}

fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    let a = BigInt::from(a.clone());
    let m = BigInt::from(m.clone());
    let e = a.extended_gcd(&m);
    if !e.gcd.is_one() {
        return None;
    }
    let mut x = e.x % &m;
    if x.sign() == Sign::Minus {
        x += &m;
    }
    x.to_biguint()
}

fn mgf1(alg: HashAlg, seed: &[u8], len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len + alg.size());
    let mut counter: u32 = 0;
    while out.len() < len {
        let mut block = seed.to_vec();
        block.extend_from_slice(&counter.to_be_bytes());
        out.extend_from_slice(&alg.digest(&block));
        counter += 1;
    }
    out.truncate(len);
    out
}

/// Hash family an OAEP algorithm id names for its MGF, bits 20..24.
fn mgf_hash(algo: Algorithm) -> TeeResult<HashAlg> {
    HashAlg::from_algorithm(Algorithm(0x5000_0000 | ((algo.0 >> 20) & 0xF)))
}

fn sig_hash(algo: Algorithm) -> TeeResult<HashAlg> {
    HashAlg::from_algorithm(algo.digest_hash())
}

fn is_pss(algo: Algorithm) -> bool {
    (algo.0 >> 8) & 0xF == 9
}

fn is_oaep(algo: Algorithm) -> bool {
    (algo.0 >> 8) & 0xF == 2
}

// ---------------------------------------------------------------- RSA

pub(crate) fn rsanopad_encrypt(key: RsaPublicView<'_>, src: &[u8]) -> TeeResult<Vec<u8>> {
    let n = int(key.n);
    let m = os2ip(src);
    if m >= n {
        return Err(TeeError::BadParameters);
    }
    Ok(m.modpow(&int(key.e), &n).to_bytes_be())
}

pub(crate) fn rsanopad_decrypt(key: &RsaKeypair, src: &[u8]) -> TeeResult<Vec<u8>> {
    let n = int(&key.n);
    let c = os2ip(src);
    if c >= n {
        return Err(TeeError::BadParameters);
    }
    Ok(c.modpow(&int(&key.d), &n).to_bytes_be())
}

pub(crate) fn rsaes_encrypt(
    algo: Algorithm,
    key: RsaPublicView<'_>,
    label: &[u8],
    src: &[u8],
) -> TeeResult<Vec<u8>> {
    let n = int(key.n);
    let k = (n.bits() as usize).div_ceil(8);
    let em = if is_oaep(algo) {
        oaep_encode(mgf_hash(algo)?, k, label, src)?
    } else {
        eme_pkcs1_encode(k, src)?
    };
    let c = os2ip(&em).modpow(&int(key.e), &n);
    i2osp(&c, k)
}

pub(crate) fn rsaes_decrypt(
    algo: Algorithm,
    key: &RsaKeypair,
    label: &[u8],
    src: &[u8],
) -> TeeResult<Vec<u8>> {
    let n = int(&key.n);
    let k = (n.bits() as usize).div_ceil(8);
    if src.len() != k {
        return Err(TeeError::BadParameters);
    }
    let c = os2ip(src);
    if c >= n {
        return Err(TeeError::BadParameters);
    }
    let em = i2osp(&c.modpow(&int(&key.d), &n), k)?;
    if is_oaep(algo) {
        oaep_decode(mgf_hash(algo)?, &em, label)
    } else {
        eme_pkcs1_decode(&em)
    }
}

fn eme_pkcs1_encode(k: usize, msg: &[u8]) -> TeeResult<Vec<u8>> {
    if msg.len() + 11 > k {
        return Err(TeeError::BadParameters);
    }
    let mut em = vec![0x00, 0x02];
    let ps_len = k - msg.len() - 3;
    let mut ps = vec![0u8; ps_len];
    OsRng
        .try_fill_bytes(&mut ps)
        .map_err(|_| TeeError::Generic)?;
    for b in &mut ps {
        while *b == 0 {
            let mut one = [0u8; 1];
            OsRng
                .try_fill_bytes(&mut one)
                .map_err(|_| TeeError::Generic)?;
            *b = one[0];
        }
    }
    em.extend_from_slice(&ps);
    em.push(0x00);
    em.extend_from_slice(msg);
    Ok(em)
}

fn eme_pkcs1_decode(em: &[u8]) -> TeeResult<Vec<u8>> {
    if em.len() < 11 || em[0] != 0x00 || em[1] != 0x02 {
        return Err(TeeError::BadParameters);
    }
    let sep = em[2..]
        .iter()
        .position(|&b| b == 0)
        .ok_or(TeeError::BadParameters)?;
    if sep < 8 {
        return Err(TeeError::BadParameters);
    }
    Ok(em[2 + sep + 1..].to_vec())
}

fn oaep_encode(alg: HashAlg, k: usize, label: &[u8], msg: &[u8]) -> TeeResult<Vec<u8>> {
    let h = alg.size();
    if k < 2 * h + 2 || msg.len() > k - 2 * h - 2 {
        return Err(TeeError::BadParameters);
    }
    let l_hash = alg.digest(label);
    let mut db = l_hash;
    db.resize(k - h - 1 - msg.len() - 1, 0);
    db.push(0x01);
    db.extend_from_slice(msg);

    let mut seed = vec![0u8; h];
    OsRng
        .try_fill_bytes(&mut seed)
        .map_err(|_| TeeError::Generic)?;
    let db_mask = mgf1(alg, &seed, k - h - 1);
    for (b, m) in db.iter_mut().zip(&db_mask) {
        *b ^= m;
    }
    let seed_mask = mgf1(alg, &db, h);
    for (b, m) in seed.iter_mut().zip(&seed_mask) {
        *b ^= m;
    }
    let mut em = vec![0x00];
    em.extend_from_slice(&seed);
    em.extend_from_slice(&db);
    Ok(em)
}

fn oaep_decode(alg: HashAlg, em: &[u8], label: &[u8]) -> TeeResult<Vec<u8>> {
    let h = alg.size();
    let k = em.len();
    if k < 2 * h + 2 || em[0] != 0x00 {
        return Err(TeeError::BadParameters);
    }
    let mut seed = em[1..1 + h].to_vec();
    let mut db = em[1 + h..].to_vec();
    let seed_mask = mgf1(alg, &db, h);
    for (b, m) in seed.iter_mut().zip(&seed_mask) {
        *b ^= m;
    }
    let db_mask = mgf1(alg, &seed, k - h - 1);
    for (b, m) in db.iter_mut().zip(&db_mask) {
        *b ^= m;
    }
    if db[..h] != alg.digest(label)[..] {
        return Err(TeeError::BadParameters);
    }
    let rest = &db[h..];
    let one = rest
        .iter()
        .position(|&b| b != 0)
        .ok_or(TeeError::BadParameters)?;
    if rest[one] != 0x01 {
        return Err(TeeError::BadParameters);
    }
    Ok(rest[one + 1..].to_vec())
}

fn digest_info_prefix(alg: HashAlg) -> &'static [u8] {
    match alg {
        HashAlg::Sha1 => &[
            0x30, 0x21, 0x30, 0x09, 0x06, 0x05, 0x2b, 0x0e, 0x03, 0x02, 0x1a, 0x05, 0x00, 0x04,
            0x14,
        ],
        HashAlg::Sha224 => &[
            0x30, 0x2d, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
            0x04, 0x05, 0x00, 0x04, 0x1c,
        ],
        HashAlg::Sha256 => &[
            0x30, 0x31, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
            0x01, 0x05, 0x00, 0x04, 0x20,
        ],
        HashAlg::Sha384 => &[
            0x30, 0x41, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
            0x02, 0x05, 0x00, 0x04, 0x30,
        ],
        HashAlg::Sha512 => &[
            0x30, 0x51, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
            0x03, 0x05, 0x00, 0x04, 0x40,
        ],
    }
}

fn emsa_pkcs1_encode(alg: HashAlg, k: usize, digest: &[u8]) -> TeeResult<Vec<u8>> {
    if digest.len() != alg.size() {
        return Err(TeeError::BadParameters);
    }
    let prefix = digest_info_prefix(alg);
    let t_len = prefix.len() + digest.len();
    if k < t_len + 11 {
        return Err(TeeError::BadParameters);
    }
    let mut em = vec![0x00, 0x01];
    em.resize(k - t_len - 1, 0xFF);
    em.push(0x00);
    em.extend_from_slice(prefix);
    em.extend_from_slice(digest);
    Ok(em)
}

fn emsa_pss_encode(
    alg: HashAlg,
    em_bits: usize,
    salt_len: usize,
    digest: &[u8],
) -> TeeResult<Vec<u8>> {
    let h = alg.size();
    let em_len = em_bits.div_ceil(8);
    if digest.len() != h || em_len < h + salt_len + 2 {
        return Err(TeeError::BadParameters);
    }
    let mut salt = vec![0u8; salt_len];
    OsRng
        .try_fill_bytes(&mut salt)
        .map_err(|_| TeeError::Generic)?;
    let mut m_prime = vec![0u8; 8];
    m_prime.extend_from_slice(digest);
    m_prime.extend_from_slice(&salt);
    let hash = alg.digest(&m_prime);

    let mut db = vec![0u8; em_len - salt_len - h - 2];
    db.push(0x01);
    db.extend_from_slice(&salt);
    let mask = mgf1(alg, &hash, em_len - h - 1);
    for (b, m) in db.iter_mut().zip(&mask) {
        *b ^= m;
    }
    db[0] &= 0xFF >> (8 * em_len - em_bits);

    let mut em = db;
    em.extend_from_slice(&hash);
    em.push(0xbc);
    Ok(em)
}

fn emsa_pss_verify(
    alg: HashAlg,
    em_bits: usize,
    salt_len: usize,
    digest: &[u8],
    em: &[u8],
) -> TeeResult<()> {
    let h = alg.size();
    let em_len = em_bits.div_ceil(8);
    if digest.len() != h || em.len() != em_len || em_len < h + salt_len + 2 {
        return Err(TeeError::SignatureInvalid);
    }
    if em[em_len - 1] != 0xbc {
        return Err(TeeError::SignatureInvalid);
    }
    let mut masked_db = em[..em_len - h - 1].to_vec();
    let hash = &em[em_len - h - 1..em_len - 1];
    let top_mask = 0xFFu8 >> (8 * em_len - em_bits);
    if masked_db[0] & !top_mask != 0 {
        return Err(TeeError::SignatureInvalid);
    }
    let mask = mgf1(alg, hash, em_len - h - 1);
    for (b, m) in masked_db.iter_mut().zip(&mask) {
        *b ^= m;
    }
    masked_db[0] &= top_mask;
    let pad_len = em_len - h - salt_len - 2;
    if masked_db[..pad_len].iter().any(|&b| b != 0) || masked_db[pad_len] != 0x01 {
        return Err(TeeError::SignatureInvalid);
    }
    let salt = &masked_db[pad_len + 1..];

    let mut m_prime = vec![0u8; 8];
    m_prime.extend_from_slice(digest);
    m_prime.extend_from_slice(salt);
    if alg.digest(&m_prime) != hash {
        return Err(TeeError::SignatureInvalid);
    }
    Ok(())
}

pub(crate) fn rsassa_sign(
    algo: Algorithm,
    key: &RsaKeypair,
    salt_len: usize,
    digest: &[u8],
) -> TeeResult<Vec<u8>> {
    let alg = sig_hash(algo)?;
    let n = int(&key.n);
    let k = (n.bits() as usize).div_ceil(8);
    let em = if is_pss(algo) {
        emsa_pss_encode(alg, n.bits() as usize - 1, salt_len, digest)?
    } else {
        emsa_pkcs1_encode(alg, k, digest)?
    };
    let s = os2ip(&em).modpow(&int(&key.d), &n);
    i2osp(&s, k)
}

pub(crate) fn rsassa_verify(
    algo: Algorithm,
    key: RsaPublicView<'_>,
    salt_len: usize,
    digest: &[u8],
    sig: &[u8],
) -> TeeResult<()> {
    let alg = sig_hash(algo)?;
    let n = int(key.n);
    let k = (n.bits() as usize).div_ceil(8);
    if sig.len() != k {
        return Err(TeeError::SignatureInvalid);
    }
    let s = os2ip(sig);
    if s >= n {
        return Err(TeeError::SignatureInvalid);
    }
    let m = s.modpow(&int(key.e), &n);
    if is_pss(algo) {
        let em_bits = n.bits() as usize - 1;
        let em = i2osp(&m, em_bits.div_ceil(8)).map_err(|_| TeeError::SignatureInvalid)?;
        emsa_pss_verify(alg, em_bits, salt_len, digest, &em)
    } else {
        let expected = emsa_pkcs1_encode(alg, k, digest)?;
        let em = i2osp(&m, k).map_err(|_| TeeError::SignatureInvalid)?;
        if em == expected {
            Ok(())
        } else {
            Err(TeeError::SignatureInvalid)
        }
    }
}

// Good enough for the modulus sizes the registry admits.
const MILLER_RABIN_ROUNDS: usize = 25;

const SMALL_PRIMES: [u32; 46] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211,
];

fn is_probable_prime(n: &BigUint) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    for p in SMALL_PRIMES {
        let p = BigUint::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }
    if n.is_even() {
        return false;
    }

    let n_minus_1 = n - 1u32;
    let s = n_minus_1.trailing_zeros().unwrap_or(0);
    let d = &n_minus_1 >> s;
    let mut rng = OsRng;
    'witness: for _ in 0..MILLER_RABIN_ROUNDS {
        let a = rng.gen_biguint_range(&two, &n_minus_1);
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_1 {
            continue;
        }
        for _ in 1..s {
            x = x.modpow(&two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}

fn gen_prime(bits: u64) -> BigUint {
    let mut rng = OsRng;
    loop {
        let mut c = rng.gen_biguint(bits);
        c.set_bit(bits - 1, true);
        c.set_bit(bits - 2, true);
        c.set_bit(0, true);
        if is_probable_prime(&c) {
            return c;
        }
    }
}

pub(crate) fn rsa_gen_keypair(key: &mut RsaKeypair, bits: usize) -> TeeResult<()> {
    let e = int(&key.e);
    if e < BigUint::from(3u32) || e.is_even() {
        return Err(TeeError::BadParameters);
    }
    let (p, q, n, d) = loop {
        let p = gen_prime(bits as u64 / 2);
        let q = gen_prime(bits as u64 - bits as u64 / 2);
        if p == q {
            continue;
        }
        let n = &p * &q;
        if n.bits() != bits as u64 {
            continue;
        }
        let phi = (&p - 1u32) * (&q - 1u32);
        let Some(d) = mod_inverse(&e, &phi) else {
            continue;
        };
        break (p, q, n, d);
    };
    let dp = &d % (&p - 1u32);
    let dq = &d % (&q - 1u32);
    let qp = mod_inverse(&q, &p).ok_or(TeeError::Generic)?;

    key.n.assign_be(&n.to_bytes_be());
    key.d.assign_be(&d.to_bytes_be());
    key.p.assign_be(&p.to_bytes_be());
    key.q.assign_be(&q.to_bytes_be());
    key.dp.assign_be(&dp.to_bytes_be());
    key.dq.assign_be(&dq.to_bytes_be());
    key.qp.assign_be(&qp.to_bytes_be());
    Ok(())
}

// ---------------------------------------------------------------- DSA

fn dsa_truncated(digest: &[u8], q: &BigUint) -> BigUint {
    let mut z = BigUint::from_bytes_be(digest);
    let dbits = digest.len() as u64 * 8;
    if dbits > q.bits() {
        z >>= dbits - q.bits();
    }
    z
}

pub(crate) fn dsa_sign(key: &DsaKeypair, digest: &[u8]) -> TeeResult<Vec<u8>> {
    let p = int(&key.p);
    let q = int(&key.q);
    let g = int(&key.g);
    let x = int(&key.x);
    if q.is_zero() || p.is_zero() {
        return Err(TeeError::BadParameters);
    }
    let z = dsa_truncated(digest, &q);
    let qlen = (q.bits() as usize).div_ceil(8);
    let one = BigUint::one();
    let mut rng = OsRng;
    loop {
        let k = rng.gen_biguint_range(&one, &q);
        let r = g.modpow(&k, &p) % &q;
        if r.is_zero() {
            continue;
        }
        let Some(kinv) = mod_inverse(&k, &q) else {
            continue;
        };
        let s = (kinv * (&z + &x * &r)) % &q;
        if s.is_zero() {
            continue;
        }
        let mut out = i2osp(&r, qlen)?;
        out.extend(i2osp(&s, qlen)?);
        return Ok(out);
    }
}

pub(crate) fn dsa_verify(key: DsaPublicView<'_>, digest: &[u8], sig: &[u8]) -> TeeResult<()> {
    let p = int(key.p);
    let q = int(key.q);
    let g = int(key.g);
    let y = int(key.y);
    let qlen = (q.bits() as usize).div_ceil(8);
    if sig.len() != 2 * qlen {
        return Err(TeeError::SignatureInvalid);
    }
    let r = os2ip(&sig[..qlen]);
    let s = os2ip(&sig[qlen..]);
    if r.is_zero() || s.is_zero() || r >= q || s >= q {
        return Err(TeeError::SignatureInvalid);
    }
    let w = mod_inverse(&s, &q).ok_or(TeeError::SignatureInvalid)?;
    let z = dsa_truncated(digest, &q);
    let u1 = (&z * &w) % &q;
    let u2 = (&r * &w) % &q;
    let v = (g.modpow(&u1, &p) * y.modpow(&u2, &p)) % &p % &q;
    if v == r {
        Ok(())
    } else {
        Err(TeeError::SignatureInvalid)
    }
}

// ----------------------------------------------------------------- DH

pub(crate) fn dh_gen_keypair(key: &mut DhKeypair) -> TeeResult<()> {
    let p = int(&key.p);
    let g = int(&key.g);
    if p < BigUint::from(5u32) || g < BigUint::from(2u32) {
        return Err(TeeError::BadParameters);
    }
    let q = int(&key.q);
    let one = BigUint::one();
    let mut rng = OsRng;
    let x = if key.x_bits != 0 {
        loop {
            let c = rng.gen_biguint(u64::from(key.x_bits));
            if c > one {
                break c;
            }
        }
    } else if !q.is_zero() {
        rng.gen_biguint_range(&one, &q)
    } else {
        rng.gen_biguint_range(&BigUint::from(2u32), &(&p - 2u32))
    };
    let y = g.modpow(&x, &p);
    key.x.assign_be(&x.to_bytes_be());
    key.y.assign_be(&y.to_bytes_be());
    key.x_bits = x.bits() as u32;
    Ok(())
}

pub(crate) fn dh_shared_secret(key: &DhKeypair, peer_public: &Mpi) -> TeeResult<Vec<u8>> {
    let p = int(&key.p);
    let x = int(&key.x);
    let peer = int(peer_public);
    // Reject the degenerate subgroup elements 0, 1, and p-1.
    if peer < BigUint::from(2u32) || peer >= &p - 1u32 {
        return Err(TeeError::BadParameters);
    }
    Ok(peer.modpow(&x, &p).to_bytes_be())
}

// ---------------------------------------------------------------- ECC

fn fixed32(m: &Mpi) -> TeeResult<[u8; 32]> {
    let b = m.as_be_bytes();
    if b.len() > 32 {
        return Err(TeeError::BadParameters);
    }
    let mut out = [0u8; 32];
    out[32 - b.len()..].copy_from_slice(b);
    Ok(out)
}

fn check_p256(curve: u32) -> TeeResult<()> {
    if EccCurve(curve) == EccCurve::NIST_P256 {
        Ok(())
    } else {
        Err(TeeError::NotSupported)
    }
}

fn p256_point(x: &Mpi, y: &Mpi) -> TeeResult<EncodedPoint> {
    let x = fixed32(x)?;
    let y = fixed32(y)?;
    Ok(EncodedPoint::from_affine_coordinates(
        GenericArray::from_slice(&x),
        GenericArray::from_slice(&y),
        false,
    ))
}

pub(crate) fn ecc_gen_keypair(key: &mut EccKeypair) -> TeeResult<()> {
    check_p256(key.curve)?;
    let secret = p256::SecretKey::random(&mut OsRng);
    let point = secret.public_key().to_encoded_point(false);
    let x = point.x().ok_or(TeeError::Generic)?;
    let y = point.y().ok_or(TeeError::Generic)?;
    key.d.assign_be(&secret.to_bytes());
    key.x.assign_be(x);
    key.y.assign_be(y);
    Ok(())
}

pub(crate) fn ecc_sign(key: &EccKeypair, digest: &[u8]) -> TeeResult<Vec<u8>> {
    check_p256(key.curve)?;
    let d = fixed32(&key.d)?;
    let sk = SigningKey::from_slice(&d).map_err(|_| TeeError::BadParameters)?;
    let sig: Signature = sk
        .sign_prehash(digest)
        .map_err(|_| TeeError::BadParameters)?;
    Ok(sig.to_bytes().to_vec())
}

pub(crate) fn ecc_verify(key: EccPublicView<'_>, digest: &[u8], sig: &[u8]) -> TeeResult<()> {
    check_p256(key.curve)?;
    let point = p256_point(key.x, key.y)?;
    let vk = VerifyingKey::from_encoded_point(&point).map_err(|_| TeeError::BadParameters)?;
    let sig = Signature::from_slice(sig).map_err(|_| TeeError::SignatureInvalid)?;
    vk.verify_prehash(digest, &sig)
        .map_err(|_| TeeError::SignatureInvalid)
}

pub(crate) fn ecc_shared_secret(key: &EccKeypair, peer: EccPublicView<'_>) -> TeeResult<Vec<u8>> {
    check_p256(key.curve)?;
    check_p256(peer.curve)?;
    let d = fixed32(&key.d)?;
    let secret = p256::SecretKey::from_slice(&d).map_err(|_| TeeError::BadParameters)?;
    let point = p256_point(peer.x, peer.y)?;
    let public: p256::PublicKey =
        Option::from(p256::PublicKey::from_encoded_point(&point)).ok_or(TeeError::BadParameters)?;
    let shared = p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
    Ok(shared.raw_secret_bytes().to_vec())
}
