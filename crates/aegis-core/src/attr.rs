//! Attribute content types and the per-strategy codec.
//!
//! Three content strategies exist: secret bytes ([`SecretKey`]),
//! big-integer magnitudes ([`Mpi`]), and 32-bit scalars. The
//! [`AttrRef`]/[`AttrMut`] views dispatch the codec verbs (user copy-in,
//! user copy-out, binary serialization, object copy, clear, release) over
//! whichever strategy an attribute uses.
//!
//! The binary form is byte-exact: a big-endian u32 length prefix followed
//! by content bytes for buffers, and a single big-endian u32 word for
//! scalars. Payload endianness inside a buffer is the attribute's own
//! affair (big-integer attributes store big-endian magnitudes).
//!
//! # Security
//!
//! Secret and big-integer buffers are wiped on clear, release, and drop.

use zeroize::Zeroize;

use crate::boundary::{AttrContent, UserMemory, UserPtr};
use crate::error::{TeeError, TeeResult};

/// Secret bytes in a fixed-capacity buffer.
///
/// Capacity is set once from the owning type's registry entry; the live
/// length tracks the last stored value. Clearing wipes and zeroes the
/// length but never shrinks the buffer, so a cleared key can be refilled
/// without reallocation.
pub struct SecretKey {
    key_size: usize,
    buf: Vec<u8>,
}

impl SecretKey {
    /// An empty secret able to hold up to `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            key_size: 0,
            buf: vec![0; capacity],
        }
    }

    /// Maximum storable size in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Live content size in bytes.
    pub fn len(&self) -> usize {
        self.key_size
    }

    /// True when no content is stored.
    pub fn is_empty(&self) -> bool {
        self.key_size == 0
    }

    /// Live content.
    pub fn bytes(&self) -> &[u8] {
        &self.buf[..self.key_size]
    }

    /// Replaces the content. Oversized input is a security fault: the
    /// caller was validated against the type's limits before reaching
    /// this point, so a mismatch means a bypassed check.
    pub fn set(&mut self, data: &[u8]) -> TeeResult<()> {
        if data.len() > self.capacity() {
            return Err(TeeError::Security);
        }
        // Wipe through the slice: zeroizing the Vec itself would also
        // truncate it and lose the fixed capacity.
        self.buf.as_mut_slice().zeroize();
        self.buf[..data.len()].copy_from_slice(data);
        self.key_size = data.len();
        Ok(())
    }

    /// Wipes the content. Idempotent.
    pub fn clear(&mut self) {
        self.buf.as_mut_slice().zeroize();
        self.key_size = 0;
    }

    /// Copies content from another secret. Fails when the source does not
    /// fit, which cannot happen between objects of the same type.
    pub fn copy_from(&mut self, src: &SecretKey) -> TeeResult<()> {
        if src.len() > self.capacity() {
            return Err(TeeError::BadState);
        }
        self.buf.as_mut_slice().zeroize();
        self.buf[..src.len()].copy_from_slice(src.bytes());
        self.key_size = src.len();
        Ok(())
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.buf.zeroize();
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.bytes() == other.bytes()
    }
}

impl Eq for SecretKey {}

impl core::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SecretKey({}/{} bytes)", self.key_size, self.buf.len())
    }
}

/// Big-integer magnitude, stored big-endian with no leading zero bytes.
/// An empty magnitude is the value zero.
#[derive(Default, PartialEq, Eq)]
pub struct Mpi {
    bytes: Vec<u8>,
}

impl Mpi {
    /// The value zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds from big-endian bytes, normalizing leading zeros away.
    pub fn from_be_bytes(data: &[u8]) -> Self {
        let mut mpi = Self::new();
        mpi.assign_be(data);
        mpi
    }

    /// Replaces the value from big-endian bytes.
    pub fn assign_be(&mut self, data: &[u8]) {
        self.bytes.zeroize();
        let start = data.iter().position(|&b| b != 0).unwrap_or(data.len());
        self.bytes.clear();
        self.bytes.extend_from_slice(&data[start..]);
    }

    /// Normalized big-endian magnitude; empty for zero.
    pub fn as_be_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Magnitude size in bytes.
    pub fn num_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// Magnitude size in bits.
    pub fn num_bits(&self) -> usize {
        match self.bytes.first() {
            None => 0,
            Some(&top) => (self.bytes.len() - 1) * 8 + (8 - top.leading_zeros() as usize),
        }
    }

    /// True for the value zero.
    pub fn is_zero(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The value as a u32 when it fits.
    pub fn to_u32(&self) -> Option<u32> {
        if self.bytes.len() > 4 {
            return None;
        }
        let mut v = 0u32;
        for &b in &self.bytes {
            v = (v << 8) | u32::from(b);
        }
        Some(v)
    }

    /// Copies the value from another magnitude.
    pub fn copy_from(&mut self, src: &Mpi) {
        self.assign_be(src.as_be_bytes());
    }

    /// Resets to zero, wiping content but keeping the allocation.
    pub fn clear(&mut self) {
        self.bytes.zeroize();
        self.bytes.clear();
    }

    /// Resets to zero and releases the allocation.
    pub fn free(&mut self) {
        self.bytes.zeroize();
        self.bytes = Vec::new();
    }
}

impl Drop for Mpi {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl core::fmt::Debug for Mpi {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Mpi({} bits)", self.num_bits())
    }
}

pub(crate) fn put_u32(out: &mut Vec<u8>, v: u32) {
    out.extend_from_slice(&v.to_be_bytes());
}

/// Cursor over a serialized attribute blob.
pub struct BinReader<'a> {
    data: &'a [u8],
    offs: usize,
}

impl<'a> BinReader<'a> {
    /// Cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offs: 0 }
    }

    /// Reads a big-endian u32; truncation means a corrupt blob.
    pub fn take_u32(&mut self) -> TeeResult<u32> {
        let raw = self.take_bytes(4)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    /// Reads `len` raw bytes; truncation means a corrupt blob.
    pub fn take_bytes(&mut self, len: usize) -> TeeResult<&'a [u8]> {
        let end = self.offs.checked_add(len).ok_or(TeeError::CorruptObject)?;
        if end > self.data.len() {
            return Err(TeeError::CorruptObject);
        }
        let out = &self.data[self.offs..end];
        self.offs = end;
        Ok(out)
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offs
    }
}

/// Read-only view of one attribute's content.
pub enum AttrRef<'a> {
    /// Secret-byte content.
    Secret(&'a SecretKey),
    /// Big-integer content.
    Bignum(&'a Mpi),
    /// Scalar content.
    Value(&'a u32),
}

/// Mutable view of one attribute's content.
pub enum AttrMut<'a> {
    /// Secret-byte content.
    Secret(&'a mut SecretKey),
    /// Big-integer content.
    Bignum(&'a mut Mpi),
    /// Scalar content.
    Value(&'a mut u32),
}

impl AttrRef<'_> {
    /// Bytes a caller buffer must provide to receive this attribute.
    pub fn required_size(&self) -> usize {
        match self {
            Self::Secret(k) => k.len(),
            Self::Bignum(n) => n.num_bytes(),
            Self::Value(_) => 8,
        }
    }

    /// Two-phase copy-out: the required size is always written back
    /// through `size_ptr`; content follows only when the advertised
    /// capacity suffices.
    pub fn to_user(
        &self,
        mem: &mut dyn UserMemory,
        buffer: UserPtr,
        size_ptr: UserPtr,
    ) -> TeeResult<()> {
        let capacity = mem.read_u64(size_ptr)? as usize;
        let required = self.required_size();
        mem.write_u64(size_ptr, required as u64)?;
        if capacity < required {
            return Err(TeeError::ShortBuffer { required });
        }
        match self {
            Self::Secret(k) => mem.write_bytes(buffer, k.bytes()),
            Self::Bignum(n) => mem.write_bytes(buffer, n.as_be_bytes()),
            Self::Value(v) => {
                let mut out = [0u8; 8];
                out[..4].copy_from_slice(&v.to_le_bytes());
                mem.write_bytes(buffer, &out)
            }
        }
    }

    /// Appends the serialized form.
    pub fn to_binary(&self, out: &mut Vec<u8>) {
        match self {
            Self::Secret(k) => {
                put_u32(out, k.len() as u32);
                out.extend_from_slice(k.bytes());
            }
            Self::Bignum(n) => {
                put_u32(out, n.num_bytes() as u32);
                out.extend_from_slice(n.as_be_bytes());
            }
            Self::Value(v) => put_u32(out, **v),
        }
    }
}

impl AttrMut<'_> {
    /// Stores copied-in caller content. The content shape must match the
    /// strategy; the boundary layer guarantees that for well-formed ids.
    pub fn from_user(&mut self, content: &AttrContent) -> TeeResult<()> {
        match (self, content) {
            (Self::Secret(k), AttrContent::Ref(b)) => k.set(b),
            (Self::Bignum(n), AttrContent::Ref(b)) => {
                n.assign_be(b);
                Ok(())
            }
            (Self::Value(v), AttrContent::Value { a, .. }) => {
                **v = *a;
                Ok(())
            }
            _ => Err(TeeError::BadParameters),
        }
    }

    /// Reads the serialized form back in. `capacity` is the destination
    /// bound in bytes for big-integer content; a declared length past it
    /// marks the blob corrupt. Secrets carry their own capacity.
    pub fn from_binary(&mut self, r: &mut BinReader<'_>, capacity: usize) -> TeeResult<()> {
        match self {
            Self::Secret(k) => {
                let len = r.take_u32()? as usize;
                let raw = r.take_bytes(len)?;
                if len > k.capacity() {
                    return Err(TeeError::Security);
                }
                k.set(raw)
            }
            Self::Bignum(n) => {
                let len = r.take_u32()? as usize;
                if len > capacity {
                    return Err(TeeError::CorruptObject);
                }
                let raw = r.take_bytes(len)?;
                n.assign_be(raw);
                Ok(())
            }
            Self::Value(v) => {
                **v = r.take_u32()?;
                Ok(())
            }
        }
    }

    /// Copies content from the same attribute of another object. Strategy
    /// mismatch between type-compatible objects is unreachable and
    /// reported as a state fault.
    pub fn from_obj(&mut self, src: &AttrRef<'_>) -> TeeResult<()> {
        match (self, src) {
            (Self::Secret(dst), AttrRef::Secret(s)) => dst.copy_from(s),
            (Self::Bignum(dst), AttrRef::Bignum(s)) => {
                dst.copy_from(s);
                Ok(())
            }
            (Self::Value(dst), AttrRef::Value(s)) => {
                **dst = **s;
                Ok(())
            }
            _ => Err(TeeError::BadState),
        }
    }

    /// Wipes the content.
    pub fn clear(&mut self) {
        match self {
            Self::Secret(k) => k.clear(),
            Self::Bignum(n) => n.clear(),
            Self::Value(v) => **v = 0,
        }
    }

    /// Releases the content. For secrets and scalars this is the same as
    /// clearing; big integers additionally drop their allocation.
    pub fn free(&mut self) {
        match self {
            Self::Secret(k) => k.clear(),
            Self::Bignum(n) => n.free(),
            Self::Value(v) => **v = 0,
        }
    }
}
