//! AES cipher contexts: ECB, CBC, and CTR.
//!
//! Block modes carry no padding, so every chunk fed mid-stream must be
//! block aligned. CTR accepts arbitrary chunk sizes.

use aegis_core::error::{TeeError, TeeResult};
use aegis_core::ids::{Algorithm, Mode};
use aegis_core::provider::CipherCtx;
use aes::{Aes128, Aes192, Aes256};
use cipher::generic_array::GenericArray;
use cipher::{BlockDecryptMut, BlockEncryptMut, KeyInit, KeyIvInit, StreamCipher};

const BLOCK: usize = 16;

type Ctr128<C> = ctr::Ctr128BE<C>;

#[derive(Clone)]
enum State {
    EcbEnc128(ecb::Encryptor<Aes128>),
    EcbEnc192(ecb::Encryptor<Aes192>),
    EcbEnc256(ecb::Encryptor<Aes256>),
    EcbDec128(ecb::Decryptor<Aes128>),
    EcbDec192(ecb::Decryptor<Aes192>),
    EcbDec256(ecb::Decryptor<Aes256>),
    CbcEnc128(cbc::Encryptor<Aes128>),
    CbcEnc192(cbc::Encryptor<Aes192>),
    CbcEnc256(cbc::Encryptor<Aes256>),
    CbcDec128(cbc::Decryptor<Aes128>),
    CbcDec192(cbc::Decryptor<Aes192>),
    CbcDec256(cbc::Decryptor<Aes256>),
    Ctr128(Ctr128<Aes128>),
    Ctr192(Ctr128<Aes192>),
    Ctr256(Ctr128<Aes256>),
}

#[derive(Clone)]
pub(crate) struct AesCipherCtx {
    algo: Algorithm,
    state: Option<State>,
}

impl AesCipherCtx {
    fn new(algo: Algorithm) -> Self {
        Self { algo, state: None }
    }
}

fn keyed<M: KeyInit>(key: &[u8]) -> TeeResult<M> {
    M::new_from_slice(key).map_err(|_| TeeError::BadParameters)
}

fn keyed_iv<M: KeyIvInit>(key: &[u8], iv: &[u8]) -> TeeResult<M> {
    M::new_from_slices(key, iv).map_err(|_| TeeError::BadParameters)
}

fn encrypt_blocks<C: BlockEncryptMut>(c: &mut C, buf: &mut [u8]) {
    for chunk in buf.chunks_exact_mut(BLOCK) {
        c.encrypt_block_mut(GenericArray::from_mut_slice(chunk));
    }
}

fn decrypt_blocks<C: BlockDecryptMut>(c: &mut C, buf: &mut [u8]) {
    for chunk in buf.chunks_exact_mut(BLOCK) {
        c.decrypt_block_mut(GenericArray::from_mut_slice(chunk));
    }
}

impl CipherCtx for AesCipherCtx {
    fn init(&mut self, mode: Mode, key1: &[u8], _key2: Option<&[u8]>, iv: &[u8]) -> TeeResult<()> {
        let enc = mode == Mode::Encrypt;
        let state = match (self.algo, key1.len()) {
            (Algorithm::AES_ECB_NOPAD, 16) if enc => State::EcbEnc128(keyed(key1)?),
            (Algorithm::AES_ECB_NOPAD, 24) if enc => State::EcbEnc192(keyed(key1)?),
            (Algorithm::AES_ECB_NOPAD, 32) if enc => State::EcbEnc256(keyed(key1)?),
            (Algorithm::AES_ECB_NOPAD, 16) => State::EcbDec128(keyed(key1)?),
            (Algorithm::AES_ECB_NOPAD, 24) => State::EcbDec192(keyed(key1)?),
            (Algorithm::AES_ECB_NOPAD, 32) => State::EcbDec256(keyed(key1)?),
            (Algorithm::AES_CBC_NOPAD, 16) if enc => State::CbcEnc128(keyed_iv(key1, iv)?),
            (Algorithm::AES_CBC_NOPAD, 24) if enc => State::CbcEnc192(keyed_iv(key1, iv)?),
            (Algorithm::AES_CBC_NOPAD, 32) if enc => State::CbcEnc256(keyed_iv(key1, iv)?),
            (Algorithm::AES_CBC_NOPAD, 16) => State::CbcDec128(keyed_iv(key1, iv)?),
            (Algorithm::AES_CBC_NOPAD, 24) => State::CbcDec192(keyed_iv(key1, iv)?),
            (Algorithm::AES_CBC_NOPAD, 32) => State::CbcDec256(keyed_iv(key1, iv)?),
            (Algorithm::AES_CTR, 16) => State::Ctr128(keyed_iv(key1, iv)?),
            (Algorithm::AES_CTR, 24) => State::Ctr192(keyed_iv(key1, iv)?),
            (Algorithm::AES_CTR, 32) => State::Ctr256(keyed_iv(key1, iv)?),
            _ => return Err(TeeError::BadParameters),
        };
        self.state = Some(state);
        Ok(())
    }

    fn update(&mut self, _last_block: bool, src: &[u8]) -> TeeResult<Vec<u8>> {
        let state = self.state.as_mut().ok_or(TeeError::BadState)?;
        let mut buf = src.to_vec();
        let is_stream = matches!(state, State::Ctr128(_) | State::Ctr192(_) | State::Ctr256(_));
        if !is_stream && buf.len() % BLOCK != 0 {
            return Err(TeeError::BadParameters);
        }
        match state {
            State::Ctr128(c) => c.apply_keystream(&mut buf),
            State::Ctr192(c) => c.apply_keystream(&mut buf),
            State::Ctr256(c) => c.apply_keystream(&mut buf),
            State::EcbEnc128(c) => encrypt_blocks(c, &mut buf),
            State::EcbEnc192(c) => encrypt_blocks(c, &mut buf),
            State::EcbEnc256(c) => encrypt_blocks(c, &mut buf),
            State::EcbDec128(c) => decrypt_blocks(c, &mut buf),
            State::EcbDec192(c) => decrypt_blocks(c, &mut buf),
            State::EcbDec256(c) => decrypt_blocks(c, &mut buf),
            State::CbcEnc128(c) => encrypt_blocks(c, &mut buf),
            State::CbcEnc192(c) => encrypt_blocks(c, &mut buf),
            State::CbcEnc256(c) => encrypt_blocks(c, &mut buf),
            State::CbcDec128(c) => decrypt_blocks(c, &mut buf),
            State::CbcDec192(c) => decrypt_blocks(c, &mut buf),
            State::CbcDec256(c) => decrypt_blocks(c, &mut buf),
        }
        Ok(buf)
    }

    fn finalize(&mut self) {
        self.state = None;
    }

    fn box_clone(&self) -> Box<dyn CipherCtx> {
        Box::new(self.clone())
    }
}

pub(crate) fn cipher_alloc(algo: Algorithm) -> TeeResult<Box<dyn CipherCtx>> {
    match algo {
        Algorithm::AES_ECB_NOPAD | Algorithm::AES_CBC_NOPAD | Algorithm::AES_CTR => {
            Ok(Box::new(AesCipherCtx::new(algo)))
        }
        Algorithm::AES_CTS
        | Algorithm::AES_XTS
        | Algorithm::DES_ECB_NOPAD
        | Algorithm::DES_CBC_NOPAD
        | Algorithm::DES3_ECB_NOPAD
        | Algorithm::DES3_CBC_NOPAD => Err(TeeError::NotImplemented),
        _ => Err(TeeError::BadParameters),
    }
}
