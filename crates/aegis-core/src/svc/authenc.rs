//! Authenticated-encryption verbs.
//!
//! Tag lengths cross the boundary in bits; the provider speaks bytes.
//! Decryption never releases plaintext before the tag checks out, so
//! `ae_dec_final` is the only verb that can fail [`TeeError::MacInvalid`].

use crate::boundary::{UserMemory, UserPtr, MEM_READ, MEM_WRITE};
use crate::error::{TeeError, TeeResult};
use crate::ids::Mode;
use crate::session::{Session, StateHandle};
use crate::state::OpCtx;

/// Starts an AEAD stream. `tag_len` is in bits and must be byte-aligned.
pub fn ae_init(
    sess: &mut Session,
    mem: &dyn UserMemory,
    h: StateHandle,
    nonce: UserPtr,
    nonce_len: usize,
    tag_len: usize,
    aad_len: usize,
    payload_len: usize,
) -> TeeResult<()> {
    if tag_len % 8 != 0 {
        return Err(TeeError::NotSupported);
    }
    mem.check_access(MEM_READ, nonce, nonce_len)?;
    let nonce_bytes = mem.read_bytes(nonce, nonce_len)?;

    let kh = sess.state(h)?.key1.ok_or(TeeError::BadState)?;
    let (st, ob) = sess.state_and_obj(h, kh)?;
    let mode = st.mode;
    let OpCtx::AuthEnc(ctx) = &mut st.ctx else {
        return Err(TeeError::BadParameters);
    };
    let sk = ob.material.secret().ok_or(TeeError::BadState)?;
    ctx.init(
        mode,
        sk.bytes(),
        &nonce_bytes,
        tag_len / 8,
        aad_len,
        payload_len,
    )?;
    st.finalize_pending = true;
    Ok(())
}

/// Absorbs associated data.
pub fn ae_update_aad(
    sess: &mut Session,
    mem: &dyn UserMemory,
    h: StateHandle,
    aad: UserPtr,
    aad_len: usize,
) -> TeeResult<()> {
    mem.check_access(MEM_READ, aad, aad_len)?;
    if aad_len == 0 {
        return Ok(());
    }
    let data = mem.read_bytes(aad, aad_len)?;
    match &mut sess.state_mut(h)?.ctx {
        OpCtx::AuthEnc(ctx) => ctx.update_aad(&data),
        _ => Err(TeeError::BadParameters),
    }
}

/// Transforms a payload chunk mid-stream. A buffering implementation may
/// emit nothing and hold the chunk for the final verb.
pub fn ae_update(
    sess: &mut Session,
    mem: &mut dyn UserMemory,
    h: StateHandle,
    src: UserPtr,
    src_len: usize,
    dst: UserPtr,
    dst_len: UserPtr,
) -> TeeResult<()> {
    mem.check_access(MEM_READ, src, src_len)?;
    let cap = if dst_len.is_null() {
        0
    } else {
        mem.read_u64(dst_len)? as usize
    };
    mem.check_access(MEM_WRITE, dst, cap)?;
    if src_len > cap {
        if !dst_len.is_null() {
            mem.write_u64(dst_len, src_len as u64)?;
        }
        return Err(TeeError::ShortBuffer { required: src_len });
    }

    let data = if src_len != 0 {
        mem.read_bytes(src, src_len)?
    } else {
        Vec::new()
    };
    let out = match &mut sess.state_mut(h)?.ctx {
        OpCtx::AuthEnc(ctx) => ctx.update_payload(&data)?,
        _ => return Err(TeeError::BadParameters),
    };
    mem.write_bytes(dst, &out)?;
    if !dst_len.is_null() {
        mem.write_u64(dst_len, out.len() as u64)?;
    }
    Ok(())
}

/// Finishes encryption: writes remaining ciphertext and the tag, each
/// with its own size negotiation.
pub fn ae_enc_final(
    sess: &mut Session,
    mem: &mut dyn UserMemory,
    h: StateHandle,
    src: UserPtr,
    src_len: usize,
    dst: UserPtr,
    dst_len: UserPtr,
    tag: UserPtr,
    tag_len: UserPtr,
) -> TeeResult<()> {
    mem.check_access(MEM_READ, src, src_len)?;
    let dst_cap = mem.read_u64(dst_len)? as usize;
    let tag_cap = mem.read_u64(tag_len)? as usize;

    let data = if src_len != 0 {
        mem.read_bytes(src, src_len)?
    } else {
        Vec::new()
    };
    let st = sess.state_mut(h)?;
    if st.mode != Mode::Encrypt {
        return Err(TeeError::BadParameters);
    }
    let (out, tag_bytes) = match &mut st.ctx {
        OpCtx::AuthEnc(ctx) => ctx.enc_final(&data)?,
        _ => return Err(TeeError::BadParameters),
    };
    st.ctx.finalize();
    st.finalize_pending = false;

    if out.len() > dst_cap {
        mem.write_u64(dst_len, out.len() as u64)?;
        return Err(TeeError::ShortBuffer { required: out.len() });
    }
    if tag_bytes.len() > tag_cap {
        mem.write_u64(tag_len, tag_bytes.len() as u64)?;
        return Err(TeeError::ShortBuffer {
            required: tag_bytes.len(),
        });
    }
    mem.write_bytes(dst, &out)?;
    mem.write_u64(dst_len, out.len() as u64)?;
    mem.write_bytes(tag, &tag_bytes)?;
    mem.write_u64(tag_len, tag_bytes.len() as u64)
}

/// Finishes decryption against the caller's expected tag.
pub fn ae_dec_final(
    sess: &mut Session,
    mem: &mut dyn UserMemory,
    h: StateHandle,
    src: UserPtr,
    src_len: usize,
    dst: UserPtr,
    dst_len: UserPtr,
    tag: UserPtr,
    tag_len: usize,
) -> TeeResult<()> {
    mem.check_access(MEM_READ, src, src_len)?;
    mem.check_access(MEM_READ, tag, tag_len)?;
    let dst_cap = mem.read_u64(dst_len)? as usize;
    let tag_bytes = mem.read_bytes(tag, tag_len)?;

    let data = if src_len != 0 {
        mem.read_bytes(src, src_len)?
    } else {
        Vec::new()
    };
    let st = sess.state_mut(h)?;
    if st.mode != Mode::Decrypt {
        return Err(TeeError::BadParameters);
    }
    let out = match &mut st.ctx {
        OpCtx::AuthEnc(ctx) => ctx.dec_final(&data, &tag_bytes)?,
        _ => return Err(TeeError::BadParameters),
    };
    st.ctx.finalize();
    st.finalize_pending = false;

    if out.len() > dst_cap {
        mem.write_u64(dst_len, out.len() as u64)?;
        return Err(TeeError::ShortBuffer { required: out.len() });
    }
    mem.write_bytes(dst, &out)?;
    mem.write_u64(dst_len, out.len() as u64)
}
