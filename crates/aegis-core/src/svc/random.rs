//! Random-number verb.

use crate::boundary::{UserMemory, UserPtr, MEM_WRITE};
use crate::error::TeeResult;
use crate::provider::CryptoProvider;

/// Fills `buf` with `len` bytes from the provider's generator.
pub fn random_number_generate(
    mem: &mut dyn UserMemory,
    provider: &dyn CryptoProvider,
    buf: UserPtr,
    len: usize,
) -> TeeResult<()> {
    mem.check_access(MEM_WRITE, buf, len)?;
    if len == 0 {
        return Ok(());
    }
    let mut out = vec![0u8; len];
    provider.rng_read(&mut out)?;
    mem.write_bytes(buf, &out)
}
