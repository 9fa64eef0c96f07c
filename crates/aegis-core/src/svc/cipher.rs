//! Symmetric-cipher verbs.
//!
//! An initialized cipher state owes the provider a teardown until its
//! final update runs; freeing the state early settles that debt.

use zeroize::Zeroize;

use crate::boundary::{UserMemory, UserPtr, MEM_READ, MEM_WRITE};
use crate::error::{TeeError, TeeResult};
use crate::ids::Mode;
use crate::session::{Session, StateHandle};
use crate::state::OpCtx;

/// Starts a cipher stream with `iv` (empty for ECB and single-block
/// modes).
pub fn cipher_init(
    sess: &mut Session,
    mem: &dyn UserMemory,
    h: StateHandle,
    iv: UserPtr,
    iv_len: usize,
) -> TeeResult<()> {
    mem.check_access(MEM_READ, iv, iv_len)?;
    let iv_bytes = if iv_len != 0 {
        mem.read_bytes(iv, iv_len)?
    } else {
        Vec::new()
    };

    let st = sess.state(h)?;
    if !matches!(st.mode, Mode::Encrypt | Mode::Decrypt) {
        return Err(TeeError::BadParameters);
    }
    let mode = st.mode;
    let k1 = st.key1.ok_or(TeeError::BadState)?;
    let k2 = st.key2;

    // Snapshot key bytes so the context borrow does not overlap the
    // object map.
    let mut key1 = sess
        .obj(k1)?
        .material
        .secret()
        .ok_or(TeeError::BadState)?
        .bytes()
        .to_vec();
    let mut key2 = match k2 {
        Some(kh) => Some(
            sess.obj(kh)?
                .material
                .secret()
                .ok_or(TeeError::BadState)?
                .bytes()
                .to_vec(),
        ),
        None => None,
    };

    let st = sess.state_mut(h)?;
    let res = match &mut st.ctx {
        OpCtx::Cipher(ctx) => ctx.init(mode, &key1, key2.as_deref(), &iv_bytes),
        _ => Err(TeeError::BadParameters),
    };
    key1.zeroize();
    if let Some(k) = key2.as_mut() {
        k.zeroize();
    }
    res?;
    st.finalize_pending = true;
    Ok(())
}

fn cipher_data(
    sess: &mut Session,
    mem: &mut dyn UserMemory,
    h: StateHandle,
    last_block: bool,
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
    let st = sess.state_mut(h)?;
    let out = match &mut st.ctx {
        OpCtx::Cipher(ctx) => ctx.update(last_block, &data)?,
        _ => return Err(TeeError::BadParameters),
    };
    if last_block {
        st.ctx.finalize();
        st.finalize_pending = false;
    }
    mem.write_bytes(dst, &out)?;
    if !dst_len.is_null() {
        mem.write_u64(dst_len, out.len() as u64)?;
    }
    Ok(())
}

/// Transforms a chunk mid-stream.
pub fn cipher_update(
    sess: &mut Session,
    mem: &mut dyn UserMemory,
    h: StateHandle,
    src: UserPtr,
    src_len: usize,
    dst: UserPtr,
    dst_len: UserPtr,
) -> TeeResult<()> {
    cipher_data(sess, mem, h, false, src, src_len, dst, dst_len)
}

/// Transforms the final chunk and settles the stream.
pub fn cipher_final(
    sess: &mut Session,
    mem: &mut dyn UserMemory,
    h: StateHandle,
    src: UserPtr,
    src_len: usize,
    dst: UserPtr,
    dst_len: UserPtr,
) -> TeeResult<()> {
    cipher_data(sess, mem, h, true, src, src_len, dst, dst_len)
}
