//! Digest and MAC verbs.
//!
//! Both classes stream through the same three verbs; the state's context
//! variant decides which capability runs. The final verb carries the
//! two-phase size negotiation: a too-small output buffer reports the
//! required size without consuming the trailing chunk, so the caller can
//! retry with the same arguments.

use crate::boundary::{UserMemory, UserPtr, MEM_READ};
use crate::error::{TeeError, TeeResult};
use crate::session::{Session, StateHandle};
use crate::state::OpCtx;

/// Starts (or restarts) a digest or MAC stream. MAC streams are keyed
/// from the state's bound key object.
pub fn hash_init(sess: &mut Session, h: StateHandle) -> TeeResult<()> {
    let key = sess.state(h)?.key1;
    match key {
        None => match &mut sess.state_mut(h)?.ctx {
            OpCtx::Digest(ctx) => {
                ctx.init();
                Ok(())
            }
            _ => Err(TeeError::BadParameters),
        },
        Some(kh) => {
            let (st, ob) = sess.state_and_obj(h, kh)?;
            let OpCtx::Mac(ctx) = &mut st.ctx else {
                return Err(TeeError::BadParameters);
            };
            let sk = ob.material.secret().ok_or(TeeError::BadState)?;
            ctx.init(sk.bytes())
        }
    }
}

/// Absorbs a chunk of caller data into the stream.
pub fn hash_update(
    sess: &mut Session,
    mem: &dyn UserMemory,
    h: StateHandle,
    chunk: UserPtr,
    chunk_len: usize,
) -> TeeResult<()> {
    mem.check_access(MEM_READ, chunk, chunk_len)?;
    if chunk_len == 0 {
        return Ok(());
    }
    let data = mem.read_bytes(chunk, chunk_len)?;
    match &mut sess.state_mut(h)?.ctx {
        OpCtx::Digest(ctx) => {
            ctx.update(&data);
            Ok(())
        }
        OpCtx::Mac(ctx) => ctx.update(&data),
        _ => Err(TeeError::BadParameters),
    }
}

/// Absorbs a final chunk and writes the digest or tag.
///
/// `hash_len` is read as the output capacity and rewritten with the
/// required size. When the capacity is too small nothing is absorbed and
/// [`TeeError::ShortBuffer`] reports the size to retry with.
pub fn hash_final(
    sess: &mut Session,
    mem: &mut dyn UserMemory,
    h: StateHandle,
    chunk: UserPtr,
    chunk_len: usize,
    hash: UserPtr,
    hash_len: UserPtr,
) -> TeeResult<()> {
    mem.check_access(MEM_READ, chunk, chunk_len)?;
    let cap = mem.read_u64(hash_len)? as usize;

    let st = sess.state(h)?;
    let size = match &st.ctx {
        OpCtx::Digest(_) => st.algo.digest_size(),
        OpCtx::Mac(_) => st.algo.mac_size(),
        _ => None,
    }
    .ok_or(TeeError::BadParameters)?;
    if cap < size {
        mem.write_u64(hash_len, size as u64)?;
        return Err(TeeError::ShortBuffer { required: size });
    }

    let data = if chunk_len != 0 {
        mem.read_bytes(chunk, chunk_len)?
    } else {
        Vec::new()
    };
    let out = match &mut sess.state_mut(h)?.ctx {
        OpCtx::Digest(ctx) => {
            if !data.is_empty() {
                ctx.update(&data);
            }
            ctx.finalize()
        }
        OpCtx::Mac(ctx) => {
            if !data.is_empty() {
                ctx.update(&data)?;
            }
            ctx.finalize()?
        }
        _ => return Err(TeeError::BadParameters),
    };
    mem.write_bytes(hash, &out)?;
    mem.write_u64(hash_len, out.len() as u64)
}
