//! Transient crypto objects.
//!
//! A [`CrypObj`] goes through a one-shot `set_type`, then gains key
//! material by populate, generate, derive, or copy. Whole-object
//! attribute walks (serialize, deserialize, copy) live here; per-verb
//! policy sits in the syscall layer.

use crate::attr::BinReader;
use crate::error::{TeeError, TeeResult};
use crate::ids::{handle_flags, usage, ObjectType};
use crate::material::KeyMaterial;
use crate::registry::{find_type_props, TypeProps};

/// Caller-visible object metadata.
#[derive(Debug, Clone, Copy)]
pub struct ObjectInfo {
    /// Allocated type.
    pub object_type: ObjectType,
    /// Current key size in bits; zero until material is installed.
    pub object_size: u32,
    /// Size ceiling fixed at allocation, in bits.
    pub max_object_size: u32,
    /// Usage rights; shrink-only.
    pub usage: u32,
    /// Handle flags.
    pub handle_flags: u32,
}

impl Default for ObjectInfo {
    fn default() -> Self {
        Self {
            object_type: ObjectType(0),
            object_size: 0,
            max_object_size: 0,
            usage: usage::DEFAULT,
            handle_flags: 0,
        }
    }
}

impl ObjectInfo {
    /// True when the object holds usable key material.
    pub fn is_initialized(&self) -> bool {
        self.handle_flags & handle_flags::INITIALIZED != 0
    }

    /// True for storage-backed objects.
    pub fn is_persistent(&self) -> bool {
        self.handle_flags & handle_flags::PERSISTENT != 0
    }

    /// Boundary encoding: seven little-endian u32 words (type, size, max
    /// size, usage, data size, data position, flags).
    pub fn to_bytes(&self) -> [u8; 28] {
        let mut out = [0u8; 28];
        let words = [
            self.object_type.0,
            self.object_size,
            self.max_object_size,
            self.usage,
            0,
            0,
            self.handle_flags,
        ];
        for (i, w) in words.iter().enumerate() {
            out[i * 4..i * 4 + 4].copy_from_slice(&w.to_le_bytes());
        }
        out
    }
}

/// One transient object.
#[derive(Debug, Default)]
pub struct CrypObj {
    /// Caller-visible metadata.
    pub info: ObjectInfo,
    /// Bitmask over registry slots currently holding a value.
    pub have_attrs: u32,
    /// Lease flag; set while an operation state holds this object's key.
    pub busy: bool,
    /// Key material storage.
    pub material: KeyMaterial,
}

impl CrypObj {
    /// A fresh untyped object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry entry for the object's type.
    pub fn props(&self) -> TeeResult<&'static TypeProps> {
        find_type_props(self.info.object_type).ok_or(TeeError::NotSupported)
    }

    /// One-shot type assignment. Allocates material sized by the
    /// registry entry and resets metadata. Fails once material exists.
    pub fn set_type(&mut self, obj_type: ObjectType, max_key_size: usize) -> TeeResult<()> {
        if !matches!(self.material, KeyMaterial::None) {
            return Err(TeeError::BadState);
        }
        let props = find_type_props(obj_type).ok_or(TeeError::NotSupported)?;
        if obj_type == ObjectType::DATA {
            if max_key_size != 0 {
                return Err(TeeError::NotSupported);
            }
        } else {
            if props.quanta == 0 || max_key_size % props.quanta as usize != 0 {
                return Err(TeeError::NotSupported);
            }
            if max_key_size < props.min_size as usize || max_key_size > props.max_size as usize {
                return Err(TeeError::NotSupported);
            }
        }
        self.material = KeyMaterial::for_type(props);
        self.info = ObjectInfo {
            object_type: obj_type,
            object_size: 0,
            max_object_size: max_key_size as u32,
            usage: usage::DEFAULT,
            handle_flags: 0,
        };
        self.have_attrs = 0;
        Ok(())
    }

    /// Wipes every attribute slot in place. Idempotent.
    pub fn attr_clear(&mut self) {
        let Ok(props) = self.props() else { return };
        for descr in props.attrs {
            if let Some(mut a) = self.material.attr_mut(descr.id) {
                a.clear();
            }
        }
        self.have_attrs = 0;
    }

    /// Releases every attribute slot, dropping what can be dropped.
    pub fn attr_free(&mut self) {
        let Ok(props) = self.props() else { return };
        for descr in props.attrs {
            if let Some(mut a) = self.material.attr_mut(descr.id) {
                a.free();
            }
        }
        self.have_attrs = 0;
    }

    /// Serializes every attribute slot in registry order.
    pub fn attr_to_binary(&self) -> TeeResult<Vec<u8>> {
        let mut out = Vec::new();
        let Ok(props) = self.props() else {
            return Ok(out);
        };
        for descr in props.attrs {
            let a = self
                .material
                .attr_ref(descr.id)
                .ok_or(TeeError::BadState)?;
            a.to_binary(&mut out);
        }
        Ok(out)
    }

    /// Restores every attribute slot from a serialized blob. The blob
    /// must carry all slots in registry order; trailing bytes are
    /// ignored for forward compatibility.
    pub fn attr_from_binary(&mut self, data: &[u8]) -> TeeResult<()> {
        let props = self.props()?;
        // Big-integer lengths in the blob are bounded by what this object
        // was allocated to hold.
        let capacity = (self.info.max_object_size as usize).div_ceil(8);
        let mut r = BinReader::new(data);
        for descr in props.attrs {
            let mut a = self
                .material
                .attr_mut(descr.id)
                .ok_or(TeeError::BadState)?;
            a.from_binary(&mut r, capacity)?;
        }
        self.have_attrs = props.all_attrs_mask();
        Ok(())
    }

    /// Copies attributes from another object. Same-type copies take every
    /// slot; cross-type copies are limited to extracting the public key
    /// of a matching key pair.
    pub fn attr_copy_from(&mut self, src: &CrypObj) -> TeeResult<()> {
        let dst_type = self.info.object_type;
        let src_type = src.info.object_type;
        if dst_type == src_type {
            let props = self.props()?;
            for descr in props.attrs {
                let src_attr = src.material.attr_ref(descr.id).ok_or(TeeError::BadState)?;
                self.material
                    .attr_mut(descr.id)
                    .ok_or(TeeError::BadState)?
                    .from_obj(&src_attr)?;
            }
            self.have_attrs = src.have_attrs;
            return Ok(());
        }

        let allowed = matches!(
            (dst_type, src_type),
            (ObjectType::RSA_PUBLIC_KEY, ObjectType::RSA_KEYPAIR)
                | (ObjectType::DSA_PUBLIC_KEY, ObjectType::DSA_KEYPAIR)
                | (ObjectType::ECDSA_PUBLIC_KEY, ObjectType::ECDSA_KEYPAIR)
                | (ObjectType::ECDH_PUBLIC_KEY, ObjectType::ECDH_KEYPAIR)
        );
        if !allowed {
            return Err(TeeError::BadParameters);
        }
        let props = self.props()?;
        for descr in props.attrs {
            let src_attr = src
                .material
                .attr_ref(descr.id)
                .ok_or(TeeError::BadParameters)?;
            self.material
                .attr_mut(descr.id)
                .ok_or(TeeError::BadState)?
                .from_obj(&src_attr)?;
        }
        self.have_attrs = props.all_attrs_mask();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::AttrContent;
    use crate::ids::AttributeId;

    fn rsa_keypair_obj() -> CrypObj {
        let mut o = CrypObj::new();
        o.set_type(ObjectType::RSA_KEYPAIR, 512).unwrap();
        for (id, bytes) in [
            (AttributeId::RSA_MODULUS, vec![0xC7; 64]),
            (AttributeId::RSA_PUBLIC_EXPONENT, vec![0x01, 0x00, 0x01]),
            (AttributeId::RSA_PRIVATE_EXPONENT, vec![0x3D; 64]),
        ] {
            o.material
                .attr_mut(id)
                .unwrap()
                .from_user(&AttrContent::Ref(bytes))
                .unwrap();
        }
        o.have_attrs = 0b111;
        o.info.object_size = 512;
        o.info.handle_flags |= handle_flags::INITIALIZED;
        o
    }

    #[test]
    fn set_type_is_one_shot() {
        let mut o = CrypObj::new();
        o.set_type(ObjectType::AES, 128).unwrap();
        assert_eq!(
            o.set_type(ObjectType::AES, 128),
            Err(TeeError::BadState)
        );
    }

    #[test]
    fn set_type_enforces_size_bounds() {
        let mut o = CrypObj::new();
        assert_eq!(o.set_type(ObjectType::AES, 96), Err(TeeError::NotSupported));
        assert_eq!(o.set_type(ObjectType::AES, 130), Err(TeeError::NotSupported));
        assert_eq!(o.set_type(ObjectType::AES, 320), Err(TeeError::NotSupported));
        assert_eq!(
            o.set_type(ObjectType(0x7777_7777), 128),
            Err(TeeError::NotSupported)
        );
        assert!(o.set_type(ObjectType::AES, 256).is_ok());
    }

    #[test]
    fn data_objects_require_zero_max_size() {
        let mut o = CrypObj::new();
        assert_eq!(
            o.set_type(ObjectType::DATA, 8),
            Err(TeeError::NotSupported)
        );
        assert!(o.set_type(ObjectType::DATA, 0).is_ok());
        assert!(o.attr_to_binary().unwrap().is_empty());
    }

    #[test]
    fn set_type_resets_usage_and_flags() {
        let mut o = CrypObj::new();
        o.set_type(ObjectType::HMAC_SHA256, 256).unwrap();
        assert_eq!(o.info.usage, usage::DEFAULT);
        assert_eq!(o.info.object_size, 0);
        assert!(!o.info.is_initialized());
    }

    #[test]
    fn binary_walk_round_trips_every_slot() {
        let o = rsa_keypair_obj();
        let blob = o.attr_to_binary().unwrap();

        let mut restored = CrypObj::new();
        restored.set_type(ObjectType::RSA_KEYPAIR, 512).unwrap();
        restored.attr_from_binary(&blob).unwrap();
        assert_eq!(
            restored.attr_to_binary().unwrap(),
            blob,
            "serialized form must be stable across a round trip"
        );
        assert_eq!(
            restored.have_attrs,
            restored.props().unwrap().all_attrs_mask()
        );
    }

    #[test]
    fn truncated_blob_is_corrupt() {
        let o = rsa_keypair_obj();
        let blob = o.attr_to_binary().unwrap();
        let mut restored = CrypObj::new();
        restored.set_type(ObjectType::RSA_KEYPAIR, 512).unwrap();
        assert_eq!(
            restored.attr_from_binary(&blob[..blob.len() - 1]),
            Err(TeeError::CorruptObject)
        );
    }

    #[test]
    fn oversize_bignum_in_blob_is_corrupt() {
        // A 256-bit public key can hold a 32-byte modulus at most; a blob
        // declaring a 4096-byte one must not restore.
        let mut blob = Vec::new();
        blob.extend_from_slice(&4096u32.to_be_bytes());
        blob.extend_from_slice(&[0xAB; 4096]);
        blob.extend_from_slice(&3u32.to_be_bytes());
        blob.extend_from_slice(&[0x01, 0x00, 0x01]);

        let mut restored = CrypObj::new();
        restored.set_type(ObjectType::RSA_PUBLIC_KEY, 256).unwrap();
        assert_eq!(
            restored.attr_from_binary(&blob),
            Err(TeeError::CorruptObject)
        );
        assert!(restored.material.rsa_public().unwrap().n.is_zero());
    }

    #[test]
    fn keypair_exports_public_half() {
        let src = rsa_keypair_obj();
        let mut dst = CrypObj::new();
        dst.set_type(ObjectType::RSA_PUBLIC_KEY, 512).unwrap();
        dst.attr_copy_from(&src).unwrap();
        let view = dst.material.rsa_public().unwrap();
        assert_eq!(view.n.num_bytes(), 64);
        assert_eq!(view.e.as_be_bytes(), &[0x01, 0x00, 0x01]);
        assert_eq!(dst.have_attrs, 0b11);
    }

    #[test]
    fn cross_family_copy_is_rejected() {
        let src = rsa_keypair_obj();
        let mut dst = CrypObj::new();
        dst.set_type(ObjectType::DSA_PUBLIC_KEY, 512).unwrap();
        assert_eq!(dst.attr_copy_from(&src), Err(TeeError::BadParameters));

        let mut aes = CrypObj::new();
        aes.set_type(ObjectType::AES, 128).unwrap();
        assert_eq!(aes.attr_copy_from(&src), Err(TeeError::BadParameters));
    }

    #[test]
    fn clear_wipes_without_dropping_capacity() {
        let mut o = CrypObj::new();
        o.set_type(ObjectType::AES, 256).unwrap();
        o.material
            .attr_mut(AttributeId::SECRET_VALUE)
            .unwrap()
            .from_user(&AttrContent::Ref(vec![0x5A; 32]))
            .unwrap();
        o.have_attrs = 1;
        o.attr_clear();
        assert_eq!(o.have_attrs, 0);
        let k = o.material.secret().unwrap();
        assert!(k.is_empty());
        assert_eq!(k.capacity(), 32);
    }

    #[test]
    fn object_info_encoding_is_seven_words() {
        let o = rsa_keypair_obj();
        let raw = o.info.to_bytes();
        assert_eq!(&raw[..4], &ObjectType::RSA_KEYPAIR.0.to_le_bytes());
        assert_eq!(&raw[4..8], &512u32.to_le_bytes());
        assert_eq!(&raw[24..28], &handle_flags::INITIALIZED.to_le_bytes());
    }
}
