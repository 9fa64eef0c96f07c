//! Object lifecycle verbs.

use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::attr::Mpi;
use crate::boundary::{copy_in_attrs, AttrContent, Attribute, UserMemory, UserPtr};
use crate::error::{TeeError, TeeResult};
use crate::ids::{handle_flags, usage, AttributeId, EccCurve, ObjectType};
use crate::object::CrypObj;
use crate::provider::CryptoProvider;
use crate::registry::{
    ecc_adjusted_max_size, TypeProps, ATTR_GEN_KEY_REQ, ATTR_OPTIONAL_GROUP, ATTR_REQUIRED,
    ATTR_SIZE_INDICATOR,
};
use crate::session::{ObjHandle, Session};

/// Which verb an attribute list is being validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttrCheckMode {
    /// Populating a transient object.
    Populate,
    /// Supplying generation parameters.
    GenerateKey,
}

fn check_rsa_public_exponent(bytes: &[u8]) -> TeeResult<()> {
    let e = Mpi::from_be_bytes(bytes);
    if e.num_bytes() > 4 {
        return Err(TeeError::BadParameters);
    }
    match e.to_u32() {
        Some(v) if v >= 65537 && v % 2 == 1 => Ok(()),
        _ => Err(TeeError::BadParameters),
    }
}

fn x_bits_absent(a: &Attribute) -> bool {
    // A zero exponent-size hint behaves as if the attribute was never
    // supplied, so serialization and generation agree on the have-bits.
    a.id == AttributeId::DH_X_BITS && matches!(a.content, AttrContent::Value { a: 0, .. })
}

/// Validates an attribute list against a type's registry entry. Unknown
/// ids, duplicates, missing required attributes, and a partially supplied
/// optional group all fail as [`TeeError::ItemNotFound`]; malformed
/// attribute content fails as [`TeeError::BadParameters`].
pub(crate) fn check_attrs(
    mode: AttrCheckMode,
    props: &TypeProps,
    attrs: &[Attribute],
) -> TeeResult<()> {
    let mut have = 0u32;
    for a in attrs {
        if x_bits_absent(a) {
            continue;
        }
        let idx = props.attr_idx(a.id).ok_or(TeeError::ItemNotFound)?;
        let bit = 1u32 << idx;
        if have & bit != 0 {
            return Err(TeeError::ItemNotFound);
        }
        have |= bit;
        if a.id == AttributeId::RSA_PUBLIC_EXPONENT {
            check_rsa_public_exponent(a.as_ref_bytes()?)?;
        }
    }

    let mut required = 0u32;
    let mut group = 0u32;
    for (idx, d) in props.attrs.iter().enumerate() {
        let bit = 1u32 << idx;
        match mode {
            AttrCheckMode::Populate => {
                if d.flags & ATTR_REQUIRED != 0 {
                    required |= bit;
                }
                if d.flags & ATTR_OPTIONAL_GROUP != 0 {
                    group |= bit;
                }
            }
            AttrCheckMode::GenerateKey => {
                if d.flags & ATTR_GEN_KEY_REQ != 0 {
                    required |= bit;
                }
            }
        }
    }
    if have & required != required {
        return Err(TeeError::ItemNotFound);
    }
    if mode == AttrCheckMode::Populate && group != 0 {
        let g = have & group;
        if g != 0 && g != group {
            return Err(TeeError::ItemNotFound);
        }
    }
    Ok(())
}

fn curve_bits(curve: u32) -> TeeResult<usize> {
    match EccCurve(curve) {
        EccCurve::NIST_P192 => Ok(192),
        EccCurve::NIST_P224 => Ok(224),
        EccCurve::NIST_P256 => Ok(256),
        EccCurve::NIST_P384 => Ok(384),
        EccCurve::NIST_P521 => Ok(521),
        _ => Err(TeeError::NotSupported),
    }
}

/// Stores a checked attribute list into an object. Reference content is
/// bounded by the allocation-time size ceiling; size-indicating
/// attributes accumulate the reported object size.
pub(crate) fn populate_obj_attrs(
    o: &mut CrypObj,
    props: &TypeProps,
    attrs: &[Attribute],
) -> TeeResult<()> {
    let max_bits = if o.info.object_type.is_ecc() {
        ecc_adjusted_max_size(o.info.max_object_size as usize)?
    } else {
        o.info.max_object_size as usize
    };
    let mut obj_size_bits = 0usize;
    for a in attrs {
        if x_bits_absent(a) {
            continue;
        }
        let idx = props.attr_idx(a.id).ok_or(TeeError::ItemNotFound)?;
        if let AttrContent::Ref(b) = &a.content {
            if b.len() * 8 > max_bits {
                warn!(attr = a.id.0, len = b.len(), "attribute exceeds object capacity");
                return Err(TeeError::ExcessData);
            }
        }
        o.material
            .attr_mut(a.id)
            .ok_or(TeeError::BadState)?
            .from_user(&a.content)?;
        o.have_attrs |= 1u32 << idx;
        if props.attrs[idx].flags & ATTR_SIZE_INDICATOR != 0 {
            if let AttrContent::Ref(b) = &a.content {
                obj_size_bits += b.len() * 8;
            }
        }
        if a.id == AttributeId::ECC_CURVE {
            obj_size_bits = curve_bits(a.as_value_a()?)?;
        }
    }
    o.info.object_size = obj_size_bits as u32;
    Ok(())
}

/// Allocates a transient object of `obj_type` able to hold keys up to
/// `max_key_size` bits.
pub fn obj_alloc(sess: &mut Session, obj_type: u32, max_key_size: u64) -> TeeResult<ObjHandle> {
    let t = ObjectType(obj_type);
    if t == ObjectType::DATA {
        return Err(TeeError::NotSupported);
    }
    let mut o = CrypObj::new();
    o.set_type(t, max_key_size as usize)?;
    let h = sess.add_obj(o);
    debug!(handle = h.0, obj_type, max_key_size, "allocated transient object");
    Ok(h)
}

/// Closes an object. A busy object must not be closeable, and its handle
/// is reported as unknown.
pub fn obj_close(sess: &mut Session, h: ObjHandle) -> TeeResult<()> {
    if sess.obj(h)?.busy {
        return Err(TeeError::ItemNotFound);
    }
    let mut o = sess.remove_obj(h)?;
    o.attr_free();
    debug!(handle = h.0, "closed object");
    Ok(())
}

/// Resets a transient object to its freshly allocated state.
pub fn obj_reset(sess: &mut Session, h: ObjHandle) -> TeeResult<()> {
    let o = sess.obj_mut(h)?;
    if o.busy {
        return Err(TeeError::BadState);
    }
    if o.info.is_persistent() {
        return Err(TeeError::BadParameters);
    }
    o.attr_clear();
    o.info.object_size = 0;
    o.info.usage = usage::DEFAULT;
    o.info.handle_flags &= !handle_flags::INITIALIZED;
    Ok(())
}

/// Writes the object's metadata to caller memory.
pub fn obj_get_info(
    sess: &Session,
    mem: &mut dyn UserMemory,
    h: ObjHandle,
    info_ptr: UserPtr,
) -> TeeResult<()> {
    let o = sess.obj(h)?;
    mem.write_bytes(info_ptr, &o.info.to_bytes())
}

/// Clears usage bits; rights only ever shrink.
pub fn obj_restrict_usage(sess: &mut Session, h: ObjHandle, usage_mask: u32) -> TeeResult<()> {
    let o = sess.obj_mut(h)?;
    o.info.usage &= usage_mask;
    Ok(())
}

/// Reads out a single attribute with two-phase size negotiation.
pub fn obj_get_attr(
    sess: &Session,
    mem: &mut dyn UserMemory,
    h: ObjHandle,
    attr_id: u32,
    buffer: UserPtr,
    size_ptr: UserPtr,
) -> TeeResult<()> {
    let o = sess.obj(h)?;
    if !o.info.is_initialized() {
        return Err(TeeError::BadParameters);
    }
    let id = AttributeId(attr_id);
    if !id.is_public() && o.info.usage & usage::EXTRACTABLE == 0 {
        warn!(handle = h.0, attr = attr_id, "refusing non-extractable attribute read");
        return Err(TeeError::AccessDenied);
    }
    let props = o.props()?;
    let idx = props.attr_idx(id).ok_or(TeeError::ItemNotFound)?;
    if o.have_attrs & (1u32 << idx) == 0 {
        return Err(TeeError::ItemNotFound);
    }
    let attr = o.material.attr_ref(id).ok_or(TeeError::BadState)?;
    attr.to_user(mem, buffer, size_ptr)
}

/// Populates an uninitialized transient object from caller attributes.
pub fn obj_populate(
    sess: &mut Session,
    mem: &dyn UserMemory,
    h: ObjHandle,
    attrs_ptr: UserPtr,
    attr_count: u32,
) -> TeeResult<()> {
    let attrs = copy_in_attrs(mem, attrs_ptr, attr_count)?;
    let o = sess.obj_mut(h)?;
    if o.info.is_persistent() || o.info.is_initialized() {
        return Err(TeeError::BadParameters);
    }
    let props = o.props()?;
    check_attrs(AttrCheckMode::Populate, props, &attrs)?;
    populate_obj_attrs(o, props, &attrs)?;
    o.info.handle_flags |= handle_flags::INITIALIZED;
    debug!(handle = h.0, attrs = attrs.len(), "populated object");
    Ok(())
}

/// Copies attributes from `src` into the uninitialized object `dst`.
/// Cross-type copies are restricted to public-key extraction.
pub fn obj_copy(sess: &mut Session, dst: ObjHandle, src: ObjHandle) -> TeeResult<()> {
    let (dst_o, src_o) = sess.obj_pair_mut(dst, src)?;
    if !src_o.info.is_initialized() {
        return Err(TeeError::BadParameters);
    }
    if dst_o.info.is_persistent() || dst_o.info.is_initialized() {
        return Err(TeeError::BadParameters);
    }
    dst_o.attr_copy_from(src_o)?;
    dst_o.info.object_size = src_o.info.object_size;
    dst_o.info.usage &= src_o.info.usage;
    dst_o.info.handle_flags |= handle_flags::INITIALIZED;
    debug!(dst = dst.0, src = src.0, "copied object attributes");
    Ok(())
}

fn generate_secret(
    o: &mut CrypObj,
    props: &TypeProps,
    provider: &dyn CryptoProvider,
    key_size: usize,
) -> TeeResult<()> {
    let byte_size = key_size / 8;
    let sk = o.material.secret_mut().ok_or(TeeError::BadState)?;
    if byte_size > sk.capacity() {
        return Err(TeeError::ExcessData);
    }
    let mut buf = vec![0u8; byte_size];
    provider.rng_read(&mut buf)?;
    let res = sk.set(&buf);
    buf.zeroize();
    res?;
    o.have_attrs = props.all_attrs_mask();
    Ok(())
}

/// Generates key material into an uninitialized transient object.
pub fn obj_generate_key(
    sess: &mut Session,
    mem: &dyn UserMemory,
    provider: &dyn CryptoProvider,
    h: ObjHandle,
    key_size: u64,
    params_ptr: UserPtr,
    param_count: u32,
) -> TeeResult<()> {
    let params = copy_in_attrs(mem, params_ptr, param_count)?;
    let o = sess.obj_mut(h)?;
    if o.info.is_persistent() || o.info.is_initialized() {
        return Err(TeeError::BadParameters);
    }
    let props = o.props()?;
    let key_size = key_size as usize;
    if props.quanta == 0 || key_size % props.quanta as usize != 0 {
        return Err(TeeError::NotSupported);
    }
    if key_size < props.min_size as usize || key_size > props.max_size as usize {
        return Err(TeeError::NotSupported);
    }
    if key_size > o.info.max_object_size as usize {
        return Err(TeeError::NotSupported);
    }
    check_attrs(AttrCheckMode::GenerateKey, props, &params)?;

    match o.info.object_type {
        ObjectType::RSA_KEYPAIR => {
            populate_obj_attrs(o, props, &params)?;
            let km = o.material.rsa_keypair_mut().ok_or(TeeError::BadState)?;
            if km.e.is_zero() {
                km.e.assign_be(&65537u32.to_be_bytes());
            }
            provider.rsa_gen_keypair(km, key_size)?;
            o.have_attrs = props.all_attrs_mask();
        }
        ObjectType::DSA_KEYPAIR => {
            populate_obj_attrs(o, props, &params)?;
            let km = o.material.dsa_keypair_mut().ok_or(TeeError::BadState)?;
            provider.dsa_gen_keypair(km, key_size)?;
            o.have_attrs = props.all_attrs_mask();
        }
        ObjectType::DH_KEYPAIR => {
            populate_obj_attrs(o, props, &params)?;
            let km = o.material.dh_keypair_mut().ok_or(TeeError::BadState)?;
            provider.dh_gen_keypair(km)?;
            for id in [
                AttributeId::DH_PUBLIC_VALUE,
                AttributeId::DH_PRIVATE_VALUE,
                AttributeId::DH_X_BITS,
            ] {
                if let Some(idx) = props.attr_idx(id) {
                    o.have_attrs |= 1u32 << idx;
                }
            }
        }
        ObjectType::ECDSA_KEYPAIR | ObjectType::ECDH_KEYPAIR => {
            populate_obj_attrs(o, props, &params)?;
            let km = o.material.ecc_keypair_mut().ok_or(TeeError::BadState)?;
            provider.ecc_gen_keypair(km)?;
            o.have_attrs = props.all_attrs_mask();
        }
        _ if o.material.secret().is_some() => {
            generate_secret(o, props, provider, key_size)?;
        }
        _ => return Err(TeeError::BadFormat),
    }

    o.info.object_size = key_size as u32;
    o.info.handle_flags |= handle_flags::INITIALIZED;
    debug!(handle = h.0, key_size, "generated key");
    Ok(())
}
