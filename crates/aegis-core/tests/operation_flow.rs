//! End-to-end tests for operation states over the software provider.
//!
//! These tests verify critical invariants:
//! - Streaming digest/MAC/cipher verbs reproduce published test vectors
//! - Output buffers follow two-phase size negotiation
//! - Keys bound to a state are leased: unclosable and unbindable until
//!   the state is freed
//! - Signature and derivation verbs reject tampered or malformed input

use aegis_core::boundary::{LinearMemory, UserMemory, UserPtr, ATTR_RECORD_SIZE};
use aegis_core::ids::usage;
use aegis_core::svc;
use aegis_core::{
    Algorithm, AttributeId, EccCurve, ObjHandle, ObjectType, Session, StateHandle, TeeError,
};
use aegis_crypto::SoftCrypto;

const ENCRYPT: u32 = 0;
const DECRYPT: u32 = 1;
const SIGN: u32 = 2;
const VERIFY: u32 = 3;
const MAC: u32 = 4;
const DIGEST: u32 = 5;
const DERIVE: u32 = 6;

const BASE: u64 = 0x10_0000;
const ATTRS_AT: u64 = BASE + 0x100;
const DATA_AT: u64 = BASE + 0x2000;
const OUT_AT: u64 = BASE + 0x4000;
const LEN_AT: u64 = BASE + 0x6000;
const TAG_AT: u64 = BASE + 0x6100;
const TAG_LEN_AT: u64 = BASE + 0x6180;
const IV_AT: u64 = BASE + 0x6200;

fn arena() -> LinearMemory {
    LinearMemory::new(BASE, 0x8000)
}

/// Attribute payload for [`put_attrs`].
enum Arg<'a> {
    Bytes(&'a [u8]),
    Value(u32),
}

fn put_attrs(mem: &mut LinearMemory, attrs: &[(AttributeId, Arg<'_>)]) -> (UserPtr, u32) {
    let mut rec_at = ATTRS_AT;
    let mut buf_at = ATTRS_AT + 0x800;
    for (id, arg) in attrs {
        let (w0, w1) = match arg {
            Arg::Value(v) => (u64::from(*v), 0u64),
            Arg::Bytes(b) => {
                mem.write_bytes(UserPtr(buf_at), b).expect("buffer write should succeed");
                let ptr = buf_at;
                buf_at += b.len().max(1) as u64;
                (ptr, b.len() as u64)
            }
        };
        let mut rec = Vec::with_capacity(ATTR_RECORD_SIZE);
        rec.extend_from_slice(&id.0.to_le_bytes());
        rec.extend_from_slice(&0u32.to_le_bytes());
        rec.extend_from_slice(&w0.to_le_bytes());
        rec.extend_from_slice(&w1.to_le_bytes());
        mem.write_bytes(UserPtr(rec_at), &rec).expect("record write should succeed");
        rec_at += ATTR_RECORD_SIZE as u64;
    }
    (UserPtr(ATTRS_AT), attrs.len() as u32)
}

fn read_attr(
    sess: &Session,
    mem: &mut LinearMemory,
    h: ObjHandle,
    id: AttributeId,
    cap: usize,
) -> Result<Vec<u8>, TeeError> {
    mem.write_u64(UserPtr(LEN_AT), cap as u64).expect("length cell write should succeed");
    svc::obj_get_attr(sess, mem, h, id.0, UserPtr(OUT_AT), UserPtr(LEN_AT))?;
    let n = mem.read_u64(UserPtr(LEN_AT)).expect("length cell read should succeed") as usize;
    mem.read_bytes(UserPtr(OUT_AT), n)
}

/// Allocates and populates a one-attribute secret object.
fn secret_obj(
    sess: &mut Session,
    mem: &mut LinearMemory,
    obj_type: ObjectType,
    max_bits: u64,
    attr: AttributeId,
    value: &[u8],
) -> ObjHandle {
    let h = svc::obj_alloc(sess, obj_type.0, max_bits).expect("alloc should succeed");
    let (ptr, n) = put_attrs(mem, &[(attr, Arg::Bytes(value))]);
    svc::obj_populate(sess, &*mem, h, ptr, n).expect("populate should succeed");
    h
}

fn aes_key(sess: &mut Session, mem: &mut LinearMemory, key: &[u8]) -> ObjHandle {
    secret_obj(sess, mem, ObjectType::AES, 256, AttributeId::SECRET_VALUE, key)
}

/// Generates an elliptic-curve key pair on P-256.
fn p256_keypair(sess: &mut Session, mem: &mut LinearMemory, obj_type: ObjectType) -> ObjHandle {
    let provider = SoftCrypto::new();
    let h = svc::obj_alloc(sess, obj_type.0, 256).expect("alloc should succeed");
    let (ptr, n) = put_attrs(mem, &[(AttributeId::ECC_CURVE, Arg::Value(EccCurve::NIST_P256.0))]);
    svc::obj_generate_key(sess, &*mem, &provider, h, 256, ptr, n)
        .expect("P-256 generation should succeed");
    h
}

/// Runs `hash_final` with `chunk` and an output capacity of `cap`.
fn finish_hash(
    sess: &mut Session,
    mem: &mut LinearMemory,
    st: StateHandle,
    chunk: &[u8],
    cap: usize,
) -> Result<Vec<u8>, TeeError> {
    mem.write_bytes(UserPtr(DATA_AT), chunk).expect("chunk write should succeed");
    mem.write_u64(UserPtr(LEN_AT), cap as u64).expect("length cell write should succeed");
    svc::hash_final(sess, mem, st, UserPtr(DATA_AT), chunk.len(), UserPtr(OUT_AT), UserPtr(LEN_AT))?;
    let n = mem.read_u64(UserPtr(LEN_AT)).expect("length cell read should succeed") as usize;
    mem.read_bytes(UserPtr(OUT_AT), n)
}

/// Runs a cipher update or final pass with capacity `cap`.
fn cipher_pass(
    sess: &mut Session,
    mem: &mut LinearMemory,
    st: StateHandle,
    last: bool,
    src: &[u8],
    cap: usize,
) -> Result<Vec<u8>, TeeError> {
    mem.write_bytes(UserPtr(DATA_AT), src).expect("source write should succeed");
    mem.write_u64(UserPtr(LEN_AT), cap as u64).expect("length cell write should succeed");
    let run = if last { svc::cipher_final } else { svc::cipher_update };
    run(sess, mem, st, UserPtr(DATA_AT), src.len(), UserPtr(OUT_AT), UserPtr(LEN_AT))?;
    let n = mem.read_u64(UserPtr(LEN_AT)).expect("length cell read should succeed") as usize;
    mem.read_bytes(UserPtr(OUT_AT), n)
}

/// Single-shot asymmetric operation (encrypt, decrypt, or sign).
fn asymm_run(
    sess: &Session,
    mem: &mut LinearMemory,
    st: StateHandle,
    params: &[(AttributeId, Arg<'_>)],
    src: &[u8],
    cap: usize,
) -> Result<Vec<u8>, TeeError> {
    let provider = SoftCrypto::new();
    let (pptr, pn) = put_attrs(mem, params);
    mem.write_bytes(UserPtr(DATA_AT), src).expect("source write should succeed");
    mem.write_u64(UserPtr(LEN_AT), cap as u64).expect("length cell write should succeed");
    svc::asymm_operate(
        sess,
        mem,
        &provider,
        st,
        pptr,
        pn,
        UserPtr(DATA_AT),
        src.len(),
        UserPtr(OUT_AT),
        UserPtr(LEN_AT),
    )?;
    let n = mem.read_u64(UserPtr(LEN_AT)).expect("length cell read should succeed") as usize;
    mem.read_bytes(UserPtr(OUT_AT), n)
}

/// INVARIANT: The streaming digest path reproduces SHA-256("abc").
#[test]
fn sha256_stream_produces_known_digest() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    let st = svc::state_alloc(&mut sess, &provider, Algorithm::SHA256.0, DIGEST, 0, 0)
        .expect("digest state should allocate");
    svc::hash_init(&mut sess, st).expect("init should succeed");

    mem.write_bytes(UserPtr(DATA_AT), b"ab").expect("chunk write should succeed");
    svc::hash_update(&mut sess, &mem, st, UserPtr(DATA_AT), 2).expect("update should succeed");
    let digest = finish_hash(&mut sess, &mut mem, st, b"c", 32).expect("final should succeed");
    assert_eq!(
        digest,
        hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
            .expect("vector decodes")
    );
    svc::state_free(&mut sess, st).expect("free should succeed");
}

/// INVARIANT: A short digest buffer reports the required size without
/// consuming the trailing chunk; a retry with the same chunk succeeds.
#[test]
fn final_negotiates_size_without_consuming_the_chunk() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    let st = svc::state_alloc(&mut sess, &provider, Algorithm::SHA256.0, DIGEST, 0, 0)
        .expect("digest state should allocate");
    svc::hash_init(&mut sess, st).expect("init should succeed");

    let err = finish_hash(&mut sess, &mut mem, st, b"abc", 0);
    assert_eq!(err, Err(TeeError::ShortBuffer { required: 32 }));
    assert_eq!(
        mem.read_u64(UserPtr(LEN_AT)).expect("length cell read should succeed"),
        32,
        "required size should be written back"
    );

    // If the first call had absorbed the chunk, this would digest
    // "abcabc" and mismatch.
    let digest = finish_hash(&mut sess, &mut mem, st, b"abc", 32).expect("retry should succeed");
    assert_eq!(
        digest,
        hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
            .expect("vector decodes")
    );
}

/// INVARIANT: The keyed MAC path reproduces RFC 4231 test case 2.
#[test]
fn hmac_sha256_matches_rfc4231() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    let key = secret_obj(
        &mut sess,
        &mut mem,
        ObjectType::GENERIC_SECRET,
        512,
        AttributeId::SECRET_VALUE,
        b"Jefe",
    );
    let st = svc::state_alloc(&mut sess, &provider, Algorithm::HMAC_SHA256.0, MAC, key.0, 0)
        .expect("MAC state should allocate");
    svc::hash_init(&mut sess, st).expect("keyed init should succeed");

    let tag = finish_hash(&mut sess, &mut mem, st, b"what do ya want for nothing?", 32)
        .expect("final should succeed");
    assert_eq!(
        tag,
        hex::decode("5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843")
            .expect("vector decodes")
    );
}

/// INVARIANT: CBC encryption reproduces NIST SP 800-38A F.2.1.
#[test]
fn aes_cbc_matches_nist_vector() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    let key_bytes = hex::decode("2b7e151628aed2a6abf7158809cf4f3c").expect("vector decodes");
    let key = aes_key(&mut sess, &mut mem, &key_bytes);
    let st = svc::state_alloc(&mut sess, &provider, Algorithm::AES_CBC_NOPAD.0, ENCRYPT, key.0, 0)
        .expect("cipher state should allocate");

    let iv = hex::decode("000102030405060708090a0b0c0d0e0f").expect("vector decodes");
    mem.write_bytes(UserPtr(IV_AT), &iv).expect("IV write should succeed");
    svc::cipher_init(&mut sess, &mem, st, UserPtr(IV_AT), iv.len()).expect("init should succeed");

    let pt = hex::decode("6bc1bee22e409f96e93d7e117393172a").expect("vector decodes");
    let ct = cipher_pass(&mut sess, &mut mem, st, true, &pt, 16).expect("final should succeed");
    assert_eq!(
        ct,
        hex::decode("7649abac8119b246cee98e9b12e9197d").expect("vector decodes")
    );
}

/// INVARIANT: CTR handles chunk boundaries off the block size and the
/// decrypt direction restores the plaintext.
#[test]
fn aes_ctr_roundtrips_unaligned_stream() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    let key = aes_key(&mut sess, &mut mem, &[0x42; 16]);
    let iv = [0xA5; 16];
    let msg = b"seventeen bytes!!";

    mem.write_bytes(UserPtr(IV_AT), &iv).expect("IV write should succeed");
    let enc = svc::state_alloc(&mut sess, &provider, Algorithm::AES_CTR.0, ENCRYPT, key.0, 0)
        .expect("encrypt state should allocate");
    svc::cipher_init(&mut sess, &mem, enc, UserPtr(IV_AT), 16).expect("init should succeed");
    let mut ct = cipher_pass(&mut sess, &mut mem, enc, false, &msg[..5], 5)
        .expect("update should succeed");
    ct.extend(cipher_pass(&mut sess, &mut mem, enc, true, &msg[5..], 12)
        .expect("final should succeed"));
    assert_eq!(ct.len(), msg.len());
    assert_ne!(ct.as_slice(), &msg[..]);
    svc::state_free(&mut sess, enc).expect("free should release the key");

    let dec = svc::state_alloc(&mut sess, &provider, Algorithm::AES_CTR.0, DECRYPT, key.0, 0)
        .expect("decrypt state should allocate");
    svc::cipher_init(&mut sess, &mem, dec, UserPtr(IV_AT), 16).expect("init should succeed");
    let pt = cipher_pass(&mut sess, &mut mem, dec, true, &ct, ct.len())
        .expect("final should succeed");
    assert_eq!(pt.as_slice(), &msg[..]);
}

/// INVARIANT: A cipher output shorter than the input length rejects and
/// writes the required size back.
#[test]
fn cipher_output_capacity_is_checked() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    let key = aes_key(&mut sess, &mut mem, &[0x42; 16]);
    let st = svc::state_alloc(&mut sess, &provider, Algorithm::AES_CTR.0, ENCRYPT, key.0, 0)
        .expect("state should allocate");
    mem.write_bytes(UserPtr(IV_AT), &[0; 16]).expect("IV write should succeed");
    svc::cipher_init(&mut sess, &mem, st, UserPtr(IV_AT), 16).expect("init should succeed");

    let err = cipher_pass(&mut sess, &mut mem, st, false, &[1; 20], 10);
    assert_eq!(err, Err(TeeError::ShortBuffer { required: 20 }));
    assert_eq!(
        mem.read_u64(UserPtr(LEN_AT)).expect("length cell read should succeed"),
        20
    );
}

fn gcm_encrypt(
    sess: &mut Session,
    mem: &mut LinearMemory,
    key: ObjHandle,
    aad: &[u8],
    pt: &[u8],
) -> (Vec<u8>, Vec<u8>) {
    let provider = SoftCrypto::new();
    let st = svc::state_alloc(sess, &provider, Algorithm::AES_GCM.0, ENCRYPT, key.0, 0)
        .expect("encrypt state should allocate");
    mem.write_bytes(UserPtr(IV_AT), &[0x11; 12]).expect("nonce write should succeed");
    svc::ae_init(sess, &*mem, st, UserPtr(IV_AT), 12, 128, aad.len(), pt.len())
        .expect("init should succeed");
    mem.write_bytes(UserPtr(DATA_AT), aad).expect("AAD write should succeed");
    svc::ae_update_aad(sess, &*mem, st, UserPtr(DATA_AT), aad.len())
        .expect("AAD update should succeed");

    mem.write_bytes(UserPtr(DATA_AT), pt).expect("payload write should succeed");
    mem.write_u64(UserPtr(LEN_AT), 64).expect("length cell write should succeed");
    mem.write_u64(UserPtr(TAG_LEN_AT), 16).expect("tag cell write should succeed");
    svc::ae_enc_final(
        sess,
        mem,
        st,
        UserPtr(DATA_AT),
        pt.len(),
        UserPtr(OUT_AT),
        UserPtr(LEN_AT),
        UserPtr(TAG_AT),
        UserPtr(TAG_LEN_AT),
    )
    .expect("encrypt final should succeed");
    svc::state_free(sess, st).expect("free should succeed");

    let n = mem.read_u64(UserPtr(LEN_AT)).expect("length cell read should succeed") as usize;
    let ct = mem.read_bytes(UserPtr(OUT_AT), n).expect("ciphertext read should succeed");
    let tag = mem.read_bytes(UserPtr(TAG_AT), 16).expect("tag read should succeed");
    (ct, tag)
}

fn gcm_decrypt(
    sess: &mut Session,
    mem: &mut LinearMemory,
    key: ObjHandle,
    aad: &[u8],
    ct: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, TeeError> {
    let provider = SoftCrypto::new();
    let st = svc::state_alloc(sess, &provider, Algorithm::AES_GCM.0, DECRYPT, key.0, 0)
        .expect("decrypt state should allocate");
    mem.write_bytes(UserPtr(IV_AT), &[0x11; 12]).expect("nonce write should succeed");
    svc::ae_init(sess, &*mem, st, UserPtr(IV_AT), 12, 128, aad.len(), ct.len())
        .expect("init should succeed");
    mem.write_bytes(UserPtr(DATA_AT), aad).expect("AAD write should succeed");
    svc::ae_update_aad(sess, &*mem, st, UserPtr(DATA_AT), aad.len())
        .expect("AAD update should succeed");

    mem.write_bytes(UserPtr(DATA_AT), ct).expect("ciphertext write should succeed");
    mem.write_bytes(UserPtr(TAG_AT), tag).expect("tag write should succeed");
    mem.write_u64(UserPtr(LEN_AT), 64).expect("length cell write should succeed");
    let res = svc::ae_dec_final(
        sess,
        mem,
        st,
        UserPtr(DATA_AT),
        ct.len(),
        UserPtr(OUT_AT),
        UserPtr(LEN_AT),
        UserPtr(TAG_AT),
        tag.len(),
    );
    svc::state_free(sess, st).expect("free should succeed");
    res?;
    let n = mem.read_u64(UserPtr(LEN_AT)).expect("length cell read should succeed") as usize;
    mem.read_bytes(UserPtr(OUT_AT), n)
}

/// INVARIANT: GCM roundtrips payload and associated data.
#[test]
fn gcm_roundtrips_with_aad() {
    let mut sess = Session::new();
    let mut mem = arena();
    let key = aes_key(&mut sess, &mut mem, &[0x42; 16]);
    let aad = b"header";
    let msg = b"confidential payload";

    let (ct, tag) = gcm_encrypt(&mut sess, &mut mem, key, aad, msg);
    assert_eq!(ct.len(), msg.len());
    let pt = gcm_decrypt(&mut sess, &mut mem, key, aad, &ct, &tag)
        .expect("authentic ciphertext should decrypt");
    assert_eq!(pt.as_slice(), &msg[..]);
}

/// INVARIANT: A flipped tag bit makes decryption fail closed.
#[test]
fn gcm_rejects_tampered_tag() {
    let mut sess = Session::new();
    let mut mem = arena();
    let key = aes_key(&mut sess, &mut mem, &[0x42; 16]);
    let (ct, mut tag) = gcm_encrypt(&mut sess, &mut mem, key, b"header", b"payload");
    tag[0] ^= 1;
    assert_eq!(
        gcm_decrypt(&mut sess, &mut mem, key, b"header", &ct, &tag),
        Err(TeeError::MacInvalid)
    );
}

/// INVARIANT: A key bound to a state cannot be closed, reset, or bound
/// again until the state is freed.
#[test]
fn bound_keys_are_leased() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    let key = aes_key(&mut sess, &mut mem, &[0x42; 16]);
    let st = svc::state_alloc(&mut sess, &provider, Algorithm::AES_CBC_NOPAD.0, ENCRYPT, key.0, 0)
        .expect("state should allocate");

    assert_eq!(svc::obj_close(&mut sess, key), Err(TeeError::ItemNotFound));
    assert_eq!(svc::obj_reset(&mut sess, key), Err(TeeError::BadState));
    assert_eq!(
        svc::state_alloc(&mut sess, &provider, Algorithm::AES_CTR.0, ENCRYPT, key.0, 0),
        Err(TeeError::BadParameters)
    );

    svc::state_free(&mut sess, st).expect("free should succeed");
    svc::obj_close(&mut sess, key).expect("close should succeed after the lease drops");
}

/// INVARIANT: XTS is the only two-key cipher; the provider gap surfaces
/// only after key policy passes.
#[test]
fn xts_key_count_policy() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    let k1 = aes_key(&mut sess, &mut mem, &[1; 16]);
    let k2 = aes_key(&mut sess, &mut mem, &[2; 16]);

    assert_eq!(
        svc::state_alloc(&mut sess, &provider, Algorithm::AES_XTS.0, ENCRYPT, k1.0, 0),
        Err(TeeError::BadParameters),
        "XTS requires two keys"
    );
    assert_eq!(
        svc::state_alloc(&mut sess, &provider, Algorithm::AES_XTS.0, ENCRYPT, k1.0, k2.0),
        Err(TeeError::NotImplemented),
        "software provider does not carry XTS"
    );

    // The failed allocations must not leave a lease behind.
    let st = svc::state_alloc(&mut sess, &provider, Algorithm::AES_CTR.0, ENCRYPT, k1.0, 0)
        .expect("key should still be bindable");
    svc::state_free(&mut sess, st).expect("free should succeed");
}

/// INVARIANT: Key type and usage rights gate state allocation.
#[test]
fn key_type_and_usage_gate_state_alloc() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();

    let hmac = secret_obj(
        &mut sess,
        &mut mem,
        ObjectType::HMAC_SHA256,
        256,
        AttributeId::SECRET_VALUE,
        &[7; 32],
    );
    assert_eq!(
        svc::state_alloc(&mut sess, &provider, Algorithm::AES_CBC_NOPAD.0, ENCRYPT, hmac.0, 0),
        Err(TeeError::BadParameters),
        "HMAC key must not drive a block cipher"
    );

    assert_eq!(
        svc::state_alloc(&mut sess, &provider, Algorithm::SHA256.0, DIGEST, hmac.0, 0),
        Err(TeeError::BadParameters),
        "digests take no key"
    );

    let aes = aes_key(&mut sess, &mut mem, &[1; 16]);
    svc::obj_restrict_usage(&mut sess, aes, !usage::ENCRYPT).expect("restrict should succeed");
    assert_eq!(
        svc::state_alloc(&mut sess, &provider, Algorithm::AES_CBC_NOPAD.0, ENCRYPT, aes.0, 0),
        Err(TeeError::BadParameters),
        "missing ENCRYPT right must reject"
    );
    svc::state_alloc(&mut sess, &provider, Algorithm::AES_CBC_NOPAD.0, DECRYPT, aes.0, 0)
        .expect("remaining rights should still bind");
}

/// INVARIANT: state_copy forks the stream position; both branches
/// finish independently with identical results.
#[test]
fn digest_fork_via_state_copy() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    let a = svc::state_alloc(&mut sess, &provider, Algorithm::SHA256.0, DIGEST, 0, 0)
        .expect("state should allocate");
    svc::hash_init(&mut sess, a).expect("init should succeed");
    mem.write_bytes(UserPtr(DATA_AT), b"ab").expect("chunk write should succeed");
    svc::hash_update(&mut sess, &mem, a, UserPtr(DATA_AT), 2).expect("update should succeed");

    let b = svc::state_alloc(&mut sess, &provider, Algorithm::SHA256.0, DIGEST, 0, 0)
        .expect("state should allocate");
    svc::state_copy(&mut sess, b, a).expect("copy should succeed");

    let da = finish_hash(&mut sess, &mut mem, a, b"c", 32).expect("final should succeed");
    let db = finish_hash(&mut sess, &mut mem, b, b"c", 32).expect("final should succeed");
    assert_eq!(da, db);
    assert_eq!(
        da,
        hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
            .expect("vector decodes")
    );
}

/// INVARIANT: state_copy rejects mismatched algorithm or mode.
#[test]
fn state_copy_requires_matching_algorithm() {
    let mut sess = Session::new();
    let provider = SoftCrypto::new();
    let a = svc::state_alloc(&mut sess, &provider, Algorithm::SHA256.0, DIGEST, 0, 0)
        .expect("state should allocate");
    let b = svc::state_alloc(&mut sess, &provider, Algorithm::SHA1.0, DIGEST, 0, 0)
        .expect("state should allocate");
    assert_eq!(svc::state_copy(&mut sess, b, a), Err(TeeError::BadParameters));
}

/// INVARIANT: PKCS#1 v1.5 signatures roundtrip through the svc layer,
/// the output negotiates its size, and tampering fails verification.
#[test]
fn rsassa_pkcs1_sign_verify_roundtrip() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    let kp = svc::obj_alloc(&mut sess, ObjectType::RSA_KEYPAIR.0, 512)
        .expect("alloc should succeed");
    svc::obj_generate_key(&mut sess, &mem, &provider, kp, 512, UserPtr::NULL, 0)
        .expect("RSA generation should succeed");

    let digest =
        hex::decode("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
            .expect("vector decodes");
    let signer = svc::state_alloc(
        &mut sess,
        &provider,
        Algorithm::RSASSA_PKCS1_V1_5_SHA256.0,
        SIGN,
        kp.0,
        0,
    )
    .expect("sign state should allocate");

    let err = asymm_run(&sess, &mut mem, signer, &[], &digest, 8);
    assert_eq!(err, Err(TeeError::ShortBuffer { required: 64 }));
    let sig = asymm_run(&sess, &mut mem, signer, &[], &digest, 64)
        .expect("signing should succeed at the advertised size");
    assert_eq!(sig.len(), 64);
    svc::state_free(&mut sess, signer).expect("free should succeed");

    let verifier = svc::state_alloc(
        &mut sess,
        &provider,
        Algorithm::RSASSA_PKCS1_V1_5_SHA256.0,
        VERIFY,
        kp.0,
        0,
    )
    .expect("verify state should allocate");
    mem.write_bytes(UserPtr(DATA_AT), &digest).expect("digest write should succeed");
    mem.write_bytes(UserPtr(OUT_AT), &sig).expect("signature write should succeed");
    svc::asymm_verify(
        &sess,
        &mem,
        &provider,
        verifier,
        UserPtr::NULL,
        0,
        UserPtr(DATA_AT),
        digest.len(),
        UserPtr(OUT_AT),
        sig.len(),
    )
    .expect("genuine signature should verify");

    let mut bad = sig.clone();
    bad[0] ^= 1;
    mem.write_bytes(UserPtr(OUT_AT), &bad).expect("signature write should succeed");
    assert_eq!(
        svc::asymm_verify(
            &sess,
            &mem,
            &provider,
            verifier,
            UserPtr::NULL,
            0,
            UserPtr(DATA_AT),
            digest.len(),
            UserPtr(OUT_AT),
            bad.len(),
        ),
        Err(TeeError::SignatureInvalid)
    );
}

/// INVARIANT: A signature-class algorithm the dispatch does not know is
/// a capability miss, not a validation failure.
#[test]
fn unknown_signature_algorithm_is_unsupported() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    let kp = svc::obj_alloc(&mut sess, ObjectType::DSA_KEYPAIR.0, 512)
        .expect("alloc should succeed");
    let (ptr, n) = put_attrs(
        &mut mem,
        &[
            (AttributeId::DSA_PRIME, Arg::Bytes(&[0x01, 0x1B])),
            (AttributeId::DSA_SUBPRIME, Arg::Bytes(&[47])),
            (AttributeId::DSA_BASE, Arg::Bytes(&[64])),
            (AttributeId::DSA_PRIVATE_VALUE, Arg::Bytes(&[5])),
            (AttributeId::DSA_PUBLIC_VALUE, Arg::Bytes(&[204])),
        ],
    );
    svc::obj_populate(&mut sess, &mem, kp, ptr, n).expect("populate should succeed");

    // DSA family, signature class, but a hash variant nobody defines.
    let st = svc::state_alloc(&mut sess, &provider, 0x7000_8131, SIGN, kp.0, 0)
        .expect("key policy passes on the family alone");
    assert_eq!(
        asymm_run(&sess, &mut mem, st, &[], &[0xAB; 20], 16),
        Err(TeeError::NotSupported)
    );
}

/// INVARIANT: DSA signing and verification work over populated group
/// parameters, end to end.
#[test]
fn dsa_sign_verify_in_toy_group() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    // p = 283, q = 47, g = 64, x = 5, y = g^x mod p = 204.
    let kp = svc::obj_alloc(&mut sess, ObjectType::DSA_KEYPAIR.0, 512)
        .expect("alloc should succeed");
    let (ptr, n) = put_attrs(
        &mut mem,
        &[
            (AttributeId::DSA_PRIME, Arg::Bytes(&[0x01, 0x1B])),
            (AttributeId::DSA_SUBPRIME, Arg::Bytes(&[47])),
            (AttributeId::DSA_BASE, Arg::Bytes(&[64])),
            (AttributeId::DSA_PRIVATE_VALUE, Arg::Bytes(&[5])),
            (AttributeId::DSA_PUBLIC_VALUE, Arg::Bytes(&[204])),
        ],
    );
    svc::obj_populate(&mut sess, &mem, kp, ptr, n).expect("populate should succeed");

    let digest = [0xAB; 20];
    let signer = svc::state_alloc(&mut sess, &provider, Algorithm::DSA_SHA1.0, SIGN, kp.0, 0)
        .expect("sign state should allocate");
    let sig = asymm_run(&sess, &mut mem, signer, &[], &digest, 16)
        .expect("signing should succeed");
    assert_eq!(sig.len(), 2, "r and s are each one byte for a 47-bit subgroup");
    svc::state_free(&mut sess, signer).expect("free should succeed");

    let verifier = svc::state_alloc(&mut sess, &provider, Algorithm::DSA_SHA1.0, VERIFY, kp.0, 0)
        .expect("verify state should allocate");
    mem.write_bytes(UserPtr(DATA_AT), &digest).expect("digest write should succeed");
    mem.write_bytes(UserPtr(OUT_AT), &sig).expect("signature write should succeed");
    svc::asymm_verify(
        &sess,
        &mem,
        &provider,
        verifier,
        UserPtr::NULL,
        0,
        UserPtr(DATA_AT),
        digest.len(),
        UserPtr(OUT_AT),
        sig.len(),
    )
    .expect("genuine signature should verify");

    let other = [0xCD; 20];
    mem.write_bytes(UserPtr(DATA_AT), &other).expect("digest write should succeed");
    assert_eq!(
        svc::asymm_verify(
            &sess,
            &mem,
            &provider,
            verifier,
            UserPtr::NULL,
            0,
            UserPtr(DATA_AT),
            other.len(),
            UserPtr(OUT_AT),
            sig.len(),
        ),
        Err(TeeError::SignatureInvalid)
    );
}

/// INVARIANT: ECDSA P-256 signatures roundtrip over a generated key.
#[test]
fn ecdsa_p256_sign_verify_roundtrip() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    let kp = p256_keypair(&mut sess, &mut mem, ObjectType::ECDSA_KEYPAIR);

    let digest = [0x5C; 32];
    let signer = svc::state_alloc(&mut sess, &provider, Algorithm::ECDSA_P256.0, SIGN, kp.0, 0)
        .expect("sign state should allocate");
    let sig = asymm_run(&sess, &mut mem, signer, &[], &digest, 64)
        .expect("signing should succeed");
    assert_eq!(sig.len(), 64);
    svc::state_free(&mut sess, signer).expect("free should succeed");

    let verifier = svc::state_alloc(&mut sess, &provider, Algorithm::ECDSA_P256.0, VERIFY, kp.0, 0)
        .expect("verify state should allocate");
    mem.write_bytes(UserPtr(DATA_AT), &digest).expect("digest write should succeed");
    mem.write_bytes(UserPtr(OUT_AT), &sig).expect("signature write should succeed");
    svc::asymm_verify(
        &sess,
        &mem,
        &provider,
        verifier,
        UserPtr::NULL,
        0,
        UserPtr(DATA_AT),
        digest.len(),
        UserPtr(OUT_AT),
        sig.len(),
    )
    .expect("genuine signature should verify");

    let bad = [0x5D; 32];
    mem.write_bytes(UserPtr(DATA_AT), &bad).expect("digest write should succeed");
    assert_eq!(
        svc::asymm_verify(
            &sess,
            &mem,
            &provider,
            verifier,
            UserPtr::NULL,
            0,
            UserPtr(DATA_AT),
            bad.len(),
            UserPtr(OUT_AT),
            sig.len(),
        ),
        Err(TeeError::SignatureInvalid)
    );
}

/// Shared-secret derivation from `local` against `peer`'s public point.
fn ecdh_derive(
    sess: &mut Session,
    mem: &mut LinearMemory,
    local: ObjHandle,
    peer: ObjHandle,
) -> Vec<u8> {
    let provider = SoftCrypto::new();
    let px = read_attr(sess, mem, peer, AttributeId::ECC_PUBLIC_VALUE_X, 32)
        .expect("peer X should read");
    let py = read_attr(sess, mem, peer, AttributeId::ECC_PUBLIC_VALUE_Y, 32)
        .expect("peer Y should read");

    let st = svc::state_alloc(
        sess,
        &provider,
        Algorithm::ECDH_DERIVE_SHARED_SECRET.0,
        DERIVE,
        local.0,
        0,
    )
    .expect("derive state should allocate");
    let out = svc::obj_alloc(sess, ObjectType::GENERIC_SECRET.0, 512)
        .expect("destination alloc should succeed");
    let (ptr, n) = put_attrs(
        mem,
        &[
            (AttributeId::ECC_PUBLIC_VALUE_X, Arg::Bytes(&px)),
            (AttributeId::ECC_PUBLIC_VALUE_Y, Arg::Bytes(&py)),
        ],
    );
    svc::derive_key(sess, &*mem, &provider, st, ptr, n, out).expect("derive should succeed");
    svc::state_free(sess, st).expect("free should succeed");

    read_attr(sess, mem, out, AttributeId::SECRET_VALUE, 32)
        .expect("derived secret should read back")
}

/// INVARIANT: Both sides of an ECDH exchange derive the same secret.
#[test]
fn ecdh_derivation_agrees_both_ways() {
    let mut sess = Session::new();
    let mut mem = arena();
    let a = p256_keypair(&mut sess, &mut mem, ObjectType::ECDH_KEYPAIR);
    let b = p256_keypair(&mut sess, &mut mem, ObjectType::ECDH_KEYPAIR);

    let ab = ecdh_derive(&mut sess, &mut mem, a, b);
    let ba = ecdh_derive(&mut sess, &mut mem, b, a);
    assert_eq!(ab, ba);
    assert_eq!(ab.len(), 32);
}

/// INVARIANT: DH derivation over populated group values computes
/// peer^x mod p.
#[test]
fn dh_derivation_in_toy_group() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    // p = 23, g = 5, x = 6, y = 5^6 mod 23 = 8; peer public 19 = 5^15.
    let kp = svc::obj_alloc(&mut sess, ObjectType::DH_KEYPAIR.0, 512)
        .expect("alloc should succeed");
    let (ptr, n) = put_attrs(
        &mut mem,
        &[
            (AttributeId::DH_PRIME, Arg::Bytes(&[23])),
            (AttributeId::DH_BASE, Arg::Bytes(&[5])),
            (AttributeId::DH_PUBLIC_VALUE, Arg::Bytes(&[8])),
            (AttributeId::DH_PRIVATE_VALUE, Arg::Bytes(&[6])),
        ],
    );
    svc::obj_populate(&mut sess, &mem, kp, ptr, n).expect("populate should succeed");

    let st = svc::state_alloc(
        &mut sess,
        &provider,
        Algorithm::DH_DERIVE_SHARED_SECRET.0,
        DERIVE,
        kp.0,
        0,
    )
    .expect("derive state should allocate");
    let out = svc::obj_alloc(&mut sess, ObjectType::GENERIC_SECRET.0, 512)
        .expect("destination alloc should succeed");
    let (ptr, n) = put_attrs(&mut mem, &[(AttributeId::DH_PUBLIC_VALUE, Arg::Bytes(&[19]))]);
    svc::derive_key(&mut sess, &mem, &provider, st, ptr, n, out)
        .expect("derive should succeed");

    // 19^6 mod 23 = 2.
    let secret = read_attr(&sess, &mut mem, out, AttributeId::SECRET_VALUE, 8)
        .expect("derived secret should read back");
    assert_eq!(secret, vec![2]);
}

/// INVARIANT: HKDF through the derive verb reproduces RFC 5869 case 1.
#[cfg(feature = "hkdf")]
#[test]
fn hkdf_matches_rfc5869_case_1() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    let ikm = secret_obj(
        &mut sess,
        &mut mem,
        ObjectType::HKDF_IKM,
        512,
        AttributeId::HKDF_IKM,
        &[0x0B; 22],
    );
    let st = svc::state_alloc(
        &mut sess,
        &provider,
        Algorithm::HKDF_SHA256_DERIVE_KEY.0,
        DERIVE,
        ikm.0,
        0,
    )
    .expect("derive state should allocate");
    let out = svc::obj_alloc(&mut sess, ObjectType::GENERIC_SECRET.0, 512)
        .expect("destination alloc should succeed");

    let salt = hex::decode("000102030405060708090a0b0c").expect("vector decodes");
    let info = hex::decode("f0f1f2f3f4f5f6f7f8f9").expect("vector decodes");
    let (ptr, n) = put_attrs(
        &mut mem,
        &[
            (AttributeId::HKDF_SALT, Arg::Bytes(&salt)),
            (AttributeId::HKDF_INFO, Arg::Bytes(&info)),
            (AttributeId::HKDF_OKM_LENGTH, Arg::Value(42)),
        ],
    );
    svc::derive_key(&mut sess, &mem, &provider, st, ptr, n, out)
        .expect("derive should succeed");

    let okm = read_attr(&sess, &mut mem, out, AttributeId::SECRET_VALUE, 42)
        .expect("derived key should read back");
    assert_eq!(
        okm,
        hex::decode(
            "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf34007208d5b887185865"
        )
        .expect("vector decodes")
    );
}

/// INVARIANT: PBKDF2 through the derive verb reproduces RFC 6070 case 1.
#[cfg(feature = "pbkdf2")]
#[test]
fn pbkdf2_matches_rfc6070_case_1() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    let password = secret_obj(
        &mut sess,
        &mut mem,
        ObjectType::PBKDF2_PASSWORD,
        512,
        AttributeId::PBKDF2_PASSWORD,
        b"password",
    );
    let st = svc::state_alloc(
        &mut sess,
        &provider,
        Algorithm::PBKDF2_HMAC_SHA1_DERIVE_KEY.0,
        DERIVE,
        password.0,
        0,
    )
    .expect("derive state should allocate");
    let out = svc::obj_alloc(&mut sess, ObjectType::GENERIC_SECRET.0, 512)
        .expect("destination alloc should succeed");
    let (ptr, n) = put_attrs(
        &mut mem,
        &[
            (AttributeId::PBKDF2_SALT, Arg::Bytes(b"salt")),
            (AttributeId::PBKDF2_ITERATION_COUNT, Arg::Value(1)),
            (AttributeId::PBKDF2_DKM_LENGTH, Arg::Value(20)),
        ],
    );
    svc::derive_key(&mut sess, &mem, &provider, st, ptr, n, out)
        .expect("derive should succeed");

    let dkm = read_attr(&sess, &mut mem, out, AttributeId::SECRET_VALUE, 20)
        .expect("derived key should read back");
    assert_eq!(
        dkm,
        hex::decode("0c60c80f961f0e71f3a9b524af6012062fe037a6").expect("vector decodes")
    );
}

/// INVARIANT: Derivation validates the requested output length before
/// computing anything.
#[cfg(feature = "hkdf")]
#[test]
fn derive_length_validation() {
    let mut sess = Session::new();
    let mut mem = arena();
    let provider = SoftCrypto::new();
    let ikm = secret_obj(
        &mut sess,
        &mut mem,
        ObjectType::HKDF_IKM,
        512,
        AttributeId::HKDF_IKM,
        &[0x0B; 22],
    );
    let st = svc::state_alloc(
        &mut sess,
        &provider,
        Algorithm::HKDF_SHA256_DERIVE_KEY.0,
        DERIVE,
        ikm.0,
        0,
    )
    .expect("derive state should allocate");
    let out = svc::obj_alloc(&mut sess, ObjectType::GENERIC_SECRET.0, 512)
        .expect("destination alloc should succeed");

    let (ptr, n) = put_attrs(&mut mem, &[(AttributeId::HKDF_SALT, Arg::Bytes(b"s"))]);
    assert_eq!(
        svc::derive_key(&mut sess, &mem, &provider, st, ptr, n, out),
        Err(TeeError::BadParameters),
        "missing output length must reject"
    );

    let (ptr, n) = put_attrs(&mut mem, &[(AttributeId::HKDF_OKM_LENGTH, Arg::Value(600))]);
    assert_eq!(
        svc::derive_key(&mut sess, &mem, &provider, st, ptr, n, out),
        Err(TeeError::BadParameters),
        "output beyond destination capacity must reject"
    );
}

/// INVARIANT: Random generation fills exactly the caller's span and is
/// denied on revoked memory.
#[test]
fn random_fills_caller_buffer() {
    let mut mem = arena();
    let provider = SoftCrypto::new();
    svc::random_number_generate(&mut mem, &provider, UserPtr(OUT_AT), 16)
        .expect("random fill should succeed");
    let got = mem.read_bytes(UserPtr(OUT_AT), 16).expect("read should succeed");
    assert_ne!(got, vec![0u8; 16], "16 random bytes should not all be zero");

    mem.revoke(UserPtr(DATA_AT), 16);
    assert_eq!(
        svc::random_number_generate(&mut mem, &provider, UserPtr(DATA_AT), 16),
        Err(TeeError::AccessDenied)
    );
}
