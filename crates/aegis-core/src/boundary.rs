//! Untrusted-memory boundary.
//!
//! Every pointer/length pair a trusted application hands to a syscall is
//! validated and copied through [`UserMemory`] before any other layer sees
//! the data. In-memory ABI values (lengths, scalar pairs, packed attribute
//! records) are little-endian; nothing in this module interprets payload
//! bytes.
//!
//! # Security
//!
//! Access checks and copies are distinct steps on purpose: a check
//! followed by a kernel-side snapshot means later stages never alias
//! memory the caller can still mutate.

use crate::error::{TeeError, TeeResult};
use crate::ids::AttributeId;

/// Read access right.
pub const MEM_READ: u32 = 0x1;
/// Write access right.
pub const MEM_WRITE: u32 = 0x2;
/// Permit buffers shared with other owners.
pub const MEM_ANY_OWNER: u32 = 0x4;

/// Size of one packed attribute record at the boundary.
pub const ATTR_RECORD_SIZE: usize = 24;

/// Address in the calling application's space. Never dereferenced
/// directly; only meaningful to a [`UserMemory`] implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserPtr(pub u64);

impl UserPtr {
    /// The null address.
    pub const NULL: Self = Self(0);

    /// True for the null address.
    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Access to the calling application's address space.
///
/// Implementations decide what "accessible" means; the syscall layer only
/// promises to check before every read or write and to copy through this
/// trait rather than hold references into caller memory.
pub trait UserMemory {
    /// Verifies the caller may access `[ptr, ptr + len)` with `flags`
    /// rights. A zero `len` with a null `ptr` is acceptable.
    fn check_access(&self, flags: u32, ptr: UserPtr, len: usize) -> TeeResult<()>;

    /// Copies `len` bytes out of caller memory.
    fn read_bytes(&self, ptr: UserPtr, len: usize) -> TeeResult<Vec<u8>>;

    /// Copies bytes into caller memory.
    fn write_bytes(&mut self, ptr: UserPtr, bytes: &[u8]) -> TeeResult<()>;

    /// Reads a little-endian u64, the ABI type of every length cell.
    fn read_u64(&self, ptr: UserPtr) -> TeeResult<u64> {
        let raw = self.read_bytes(ptr, 8)?;
        let arr: [u8; 8] = raw.try_into().map_err(|_| TeeError::AccessDenied)?;
        Ok(u64::from_le_bytes(arr))
    }

    /// Writes a little-endian u64 length cell.
    fn write_u64(&mut self, ptr: UserPtr, value: u64) -> TeeResult<()> {
        self.write_bytes(ptr, &value.to_le_bytes())
    }
}

/// Attribute content after copy-in: either a scalar word pair or a
/// kernel-side snapshot of a referenced buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrContent {
    /// Scalar pair; only `a` is meaningful for every current attribute.
    Value {
        /// First word.
        a: u32,
        /// Second word, reserved.
        b: u32,
    },
    /// Snapshot of a caller-referenced byte buffer.
    Ref(Vec<u8>),
}

/// One attribute after copy-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute identifier.
    pub id: AttributeId,
    /// Copied content.
    pub content: AttrContent,
}

impl Attribute {
    /// Reference content bytes, or an error for scalar content.
    pub fn as_ref_bytes(&self) -> TeeResult<&[u8]> {
        match &self.content {
            AttrContent::Ref(b) => Ok(b),
            AttrContent::Value { .. } => Err(TeeError::BadParameters),
        }
    }

    /// Scalar `a` word, or an error for reference content.
    pub fn as_value_a(&self) -> TeeResult<u32> {
        match &self.content {
            AttrContent::Value { a, .. } => Ok(*a),
            AttrContent::Ref(_) => Err(TeeError::BadParameters),
        }
    }
}

/// Copies in a packed attribute array.
///
/// Each record is [`ATTR_RECORD_SIZE`] bytes: id u32, reserved u32, then
/// two u64 words that hold either the scalar pair or a (pointer, length)
/// reference. The record array and every referenced buffer get an access
/// check; referenced buffers are snapshotted into kernel memory.
pub fn copy_in_attrs(
    mem: &dyn UserMemory,
    ptr: UserPtr,
    count: u32,
) -> TeeResult<Vec<Attribute>> {
    if count == 0 {
        return Ok(Vec::new());
    }
    if ptr.is_null() {
        return Err(TeeError::BadParameters);
    }
    let total = ATTR_RECORD_SIZE
        .checked_mul(count as usize)
        .ok_or(TeeError::BadParameters)?;
    mem.check_access(MEM_READ | MEM_ANY_OWNER, ptr, total)?;
    let raw = mem.read_bytes(ptr, total)?;

    let mut attrs = Vec::with_capacity(count as usize);
    for rec in raw.chunks_exact(ATTR_RECORD_SIZE) {
        let id = AttributeId(u32::from_le_bytes([rec[0], rec[1], rec[2], rec[3]]));
        let w0 = u64::from_le_bytes([
            rec[8], rec[9], rec[10], rec[11], rec[12], rec[13], rec[14], rec[15],
        ]);
        let w1 = u64::from_le_bytes([
            rec[16], rec[17], rec[18], rec[19], rec[20], rec[21], rec[22], rec[23],
        ]);
        let content = if id.is_value() {
            AttrContent::Value {
                a: w0 as u32,
                b: w1 as u32,
            }
        } else {
            let buf_ptr = UserPtr(w0);
            let buf_len = w1 as usize;
            mem.check_access(MEM_READ | MEM_ANY_OWNER, buf_ptr, buf_len)?;
            AttrContent::Ref(mem.read_bytes(buf_ptr, buf_len)?)
        };
        attrs.push(Attribute { id, content });
    }
    Ok(attrs)
}

/// Flat byte arena standing in for a TA address space. Production
/// deployments implement [`UserMemory`] over real page tables; this
/// implementation backs the test suites and exercises the revocation
/// paths.
#[derive(Debug)]
pub struct LinearMemory {
    base: u64,
    bytes: Vec<u8>,
    revoked: Vec<(u64, u64)>,
}

impl LinearMemory {
    /// A `size`-byte space starting at `base`. `base` must be nonzero so
    /// the null address stays invalid.
    pub fn new(base: u64, size: usize) -> Self {
        debug_assert!(base != 0);
        Self {
            base,
            bytes: vec![0; size],
            revoked: Vec::new(),
        }
    }

    /// Marks `[ptr, ptr + len)` inaccessible, modeling an unmapped or
    /// foreign-owned range.
    pub fn revoke(&mut self, ptr: UserPtr, len: usize) {
        self.revoked.push((ptr.0, ptr.0 + len as u64));
    }

    fn span(&self, ptr: UserPtr, len: usize) -> TeeResult<(usize, usize)> {
        let end = ptr.0.checked_add(len as u64).ok_or(TeeError::AccessDenied)?;
        let limit = self.base + self.bytes.len() as u64;
        if ptr.0 < self.base || end > limit {
            return Err(TeeError::AccessDenied);
        }
        for &(lo, hi) in &self.revoked {
            if ptr.0 < hi && end > lo {
                return Err(TeeError::AccessDenied);
            }
        }
        let off = (ptr.0 - self.base) as usize;
        Ok((off, off + len))
    }
}

impl UserMemory for LinearMemory {
    fn check_access(&self, _flags: u32, ptr: UserPtr, len: usize) -> TeeResult<()> {
        if len == 0 {
            return Ok(());
        }
        if ptr.is_null() {
            return Err(TeeError::AccessDenied);
        }
        self.span(ptr, len).map(|_| ())
    }

    fn read_bytes(&self, ptr: UserPtr, len: usize) -> TeeResult<Vec<u8>> {
        if len == 0 {
            return Ok(Vec::new());
        }
        if ptr.is_null() {
            return Err(TeeError::AccessDenied);
        }
        let (lo, hi) = self.span(ptr, len)?;
        Ok(self.bytes[lo..hi].to_vec())
    }

    fn write_bytes(&mut self, ptr: UserPtr, bytes: &[u8]) -> TeeResult<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        if ptr.is_null() {
            return Err(TeeError::AccessDenied);
        }
        let (lo, hi) = self.span(ptr, bytes.len())?;
        self.bytes[lo..hi].copy_from_slice(bytes);
        Ok(())
    }
}
