//! Static object-type registry.
//!
//! One [`TypeProps`] entry per allocatable type: size quantum and bounds
//! in bits, secret-buffer capacity in bytes, and the ordered attribute
//! descriptor list. Descriptor order is the wire contract for the binary
//! attribute format; changing it breaks stored objects.

use crate::ids::{AttributeId, ObjectType};

/// Attribute must be supplied on populate.
pub const ATTR_REQUIRED: u16 = 0x1;
/// Attribute belongs to the all-or-nothing optional group.
pub const ATTR_OPTIONAL_GROUP: u16 = 0x2;
/// Attribute's byte length defines the object size.
pub const ATTR_SIZE_INDICATOR: u16 = 0x4;
/// Attribute may be supplied to key generation.
pub const ATTR_GEN_KEY_OPT: u16 = 0x8;
/// Attribute must be supplied to key generation.
pub const ATTR_GEN_KEY_REQ: u16 = 0x10;

/// Content strategy of one attribute slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    /// Secret bytes in a fixed-capacity buffer.
    Secret,
    /// Big-integer magnitude.
    Bignum,
    /// 32-bit scalar.
    Value,
}

/// One attribute slot of an object type.
#[derive(Debug, Clone, Copy)]
pub struct AttrDescr {
    /// Attribute identifier.
    pub id: AttributeId,
    /// `ATTR_*` flag bits.
    pub flags: u16,
    /// Content strategy.
    pub kind: AttrKind,
}

/// Registry entry for one object type.
#[derive(Debug, Clone, Copy)]
pub struct TypeProps {
    /// Object type this entry describes.
    pub obj_type: ObjectType,
    /// Key sizes must be a multiple of this many bits.
    pub quanta: u16,
    /// Minimum key size in bits.
    pub min_size: u16,
    /// Maximum key size in bits.
    pub max_size: u16,
    /// Secret-buffer capacity in bytes; zero for big-integer types.
    pub alloc_size: usize,
    /// Ordered attribute slots; the order is the serialization contract.
    pub attrs: &'static [AttrDescr],
}

impl TypeProps {
    /// Slot index of `id`, if the type carries that attribute.
    pub fn attr_idx(&self, id: AttributeId) -> Option<usize> {
        self.attrs.iter().position(|a| a.id == id)
    }

    /// Have-bit mask covering every slot.
    pub fn all_attrs_mask(&self) -> u32 {
        if self.attrs.is_empty() {
            0
        } else {
            (1u32 << self.attrs.len()) - 1
        }
    }
}

const fn attr(id: AttributeId, flags: u16, kind: AttrKind) -> AttrDescr {
    AttrDescr { id, flags, kind }
}

static SECRET_VALUE_ATTRS: &[AttrDescr] = &[attr(
    AttributeId::SECRET_VALUE,
    ATTR_REQUIRED | ATTR_SIZE_INDICATOR,
    AttrKind::Secret,
)];

static RSA_PUBLIC_KEY_ATTRS: &[AttrDescr] = &[
    attr(
        AttributeId::RSA_MODULUS,
        ATTR_REQUIRED | ATTR_SIZE_INDICATOR,
        AttrKind::Bignum,
    ),
    attr(AttributeId::RSA_PUBLIC_EXPONENT, ATTR_REQUIRED, AttrKind::Bignum),
];

static RSA_KEYPAIR_ATTRS: &[AttrDescr] = &[
    attr(
        AttributeId::RSA_MODULUS,
        ATTR_REQUIRED | ATTR_SIZE_INDICATOR,
        AttrKind::Bignum,
    ),
    attr(
        AttributeId::RSA_PUBLIC_EXPONENT,
        ATTR_REQUIRED | ATTR_GEN_KEY_OPT,
        AttrKind::Bignum,
    ),
    attr(AttributeId::RSA_PRIVATE_EXPONENT, ATTR_REQUIRED, AttrKind::Bignum),
    attr(AttributeId::RSA_PRIME1, ATTR_OPTIONAL_GROUP, AttrKind::Bignum),
    attr(AttributeId::RSA_PRIME2, ATTR_OPTIONAL_GROUP, AttrKind::Bignum),
    attr(AttributeId::RSA_EXPONENT1, ATTR_OPTIONAL_GROUP, AttrKind::Bignum),
    attr(AttributeId::RSA_EXPONENT2, ATTR_OPTIONAL_GROUP, AttrKind::Bignum),
    attr(AttributeId::RSA_COEFFICIENT, ATTR_OPTIONAL_GROUP, AttrKind::Bignum),
];

static DSA_PUBLIC_KEY_ATTRS: &[AttrDescr] = &[
    attr(
        AttributeId::DSA_PRIME,
        ATTR_REQUIRED | ATTR_SIZE_INDICATOR,
        AttrKind::Bignum,
    ),
    attr(AttributeId::DSA_SUBPRIME, ATTR_REQUIRED, AttrKind::Bignum),
    attr(AttributeId::DSA_BASE, ATTR_REQUIRED, AttrKind::Bignum),
    attr(AttributeId::DSA_PUBLIC_VALUE, ATTR_REQUIRED, AttrKind::Bignum),
];

static DSA_KEYPAIR_ATTRS: &[AttrDescr] = &[
    attr(
        AttributeId::DSA_PRIME,
        ATTR_REQUIRED | ATTR_SIZE_INDICATOR | ATTR_GEN_KEY_REQ,
        AttrKind::Bignum,
    ),
    attr(
        AttributeId::DSA_SUBPRIME,
        ATTR_REQUIRED | ATTR_GEN_KEY_REQ,
        AttrKind::Bignum,
    ),
    attr(
        AttributeId::DSA_BASE,
        ATTR_REQUIRED | ATTR_GEN_KEY_REQ,
        AttrKind::Bignum,
    ),
    attr(AttributeId::DSA_PRIVATE_VALUE, ATTR_REQUIRED, AttrKind::Bignum),
    attr(AttributeId::DSA_PUBLIC_VALUE, ATTR_REQUIRED, AttrKind::Bignum),
];

static DH_KEYPAIR_ATTRS: &[AttrDescr] = &[
    attr(
        AttributeId::DH_PRIME,
        ATTR_REQUIRED | ATTR_SIZE_INDICATOR | ATTR_GEN_KEY_REQ,
        AttrKind::Bignum,
    ),
    attr(
        AttributeId::DH_BASE,
        ATTR_REQUIRED | ATTR_GEN_KEY_REQ,
        AttrKind::Bignum,
    ),
    attr(AttributeId::DH_PUBLIC_VALUE, ATTR_REQUIRED, AttrKind::Bignum),
    attr(AttributeId::DH_PRIVATE_VALUE, ATTR_REQUIRED, AttrKind::Bignum),
    attr(AttributeId::DH_SUBPRIME, ATTR_GEN_KEY_OPT, AttrKind::Bignum),
    attr(AttributeId::DH_X_BITS, ATTR_GEN_KEY_OPT, AttrKind::Value),
];

static ECC_PUBLIC_KEY_ATTRS: &[AttrDescr] = &[
    attr(AttributeId::ECC_PUBLIC_VALUE_X, ATTR_REQUIRED, AttrKind::Bignum),
    attr(AttributeId::ECC_PUBLIC_VALUE_Y, ATTR_REQUIRED, AttrKind::Bignum),
    attr(AttributeId::ECC_CURVE, ATTR_REQUIRED, AttrKind::Value),
];

static ECC_KEYPAIR_ATTRS: &[AttrDescr] = &[
    attr(AttributeId::ECC_PRIVATE_VALUE, ATTR_REQUIRED, AttrKind::Bignum),
    attr(AttributeId::ECC_PUBLIC_VALUE_X, ATTR_REQUIRED, AttrKind::Bignum),
    attr(AttributeId::ECC_PUBLIC_VALUE_Y, ATTR_REQUIRED, AttrKind::Bignum),
    attr(AttributeId::ECC_CURVE, ATTR_REQUIRED, AttrKind::Value),
];

#[cfg(feature = "hkdf")]
static HKDF_IKM_ATTRS: &[AttrDescr] = &[attr(
    AttributeId::HKDF_IKM,
    ATTR_REQUIRED | ATTR_SIZE_INDICATOR,
    AttrKind::Secret,
)];

#[cfg(feature = "concat-kdf")]
static CONCAT_KDF_Z_ATTRS: &[AttrDescr] = &[attr(
    AttributeId::CONCAT_KDF_Z,
    ATTR_REQUIRED | ATTR_SIZE_INDICATOR,
    AttrKind::Secret,
)];

#[cfg(feature = "pbkdf2")]
static PBKDF2_PASSWORD_ATTRS: &[AttrDescr] = &[attr(
    AttributeId::PBKDF2_PASSWORD,
    ATTR_REQUIRED | ATTR_SIZE_INDICATOR,
    AttrKind::Secret,
)];

const fn props(
    obj_type: ObjectType,
    quanta: u16,
    min_size: u16,
    max_size: u16,
    alloc_size: usize,
    attrs: &'static [AttrDescr],
) -> TypeProps {
    TypeProps {
        obj_type,
        quanta,
        min_size,
        max_size,
        alloc_size,
        attrs,
    }
}

static OBJ_TYPE_PROPS: &[TypeProps] = &[
    props(ObjectType::AES, 64, 128, 256, 32, SECRET_VALUE_ATTRS),
    props(ObjectType::DES, 64, 64, 64, 8, SECRET_VALUE_ATTRS),
    props(ObjectType::DES3, 64, 128, 192, 24, SECRET_VALUE_ATTRS),
    props(ObjectType::HMAC_MD5, 8, 64, 512, 64, SECRET_VALUE_ATTRS),
    props(ObjectType::HMAC_SHA1, 8, 80, 512, 64, SECRET_VALUE_ATTRS),
    props(ObjectType::HMAC_SHA224, 8, 112, 512, 64, SECRET_VALUE_ATTRS),
    props(ObjectType::HMAC_SHA256, 8, 192, 1024, 128, SECRET_VALUE_ATTRS),
    props(ObjectType::HMAC_SHA384, 8, 256, 1024, 128, SECRET_VALUE_ATTRS),
    props(ObjectType::HMAC_SHA512, 8, 256, 1024, 128, SECRET_VALUE_ATTRS),
    props(ObjectType::GENERIC_SECRET, 8, 0, 4096, 512, SECRET_VALUE_ATTRS),
    props(ObjectType::RSA_PUBLIC_KEY, 1, 256, 2048, 0, RSA_PUBLIC_KEY_ATTRS),
    props(ObjectType::RSA_KEYPAIR, 1, 256, 2048, 0, RSA_KEYPAIR_ATTRS),
    props(ObjectType::DSA_PUBLIC_KEY, 64, 512, 3072, 0, DSA_PUBLIC_KEY_ATTRS),
    props(ObjectType::DSA_KEYPAIR, 64, 512, 3072, 0, DSA_KEYPAIR_ATTRS),
    props(ObjectType::DH_KEYPAIR, 1, 256, 2048, 0, DH_KEYPAIR_ATTRS),
    props(ObjectType::ECDSA_PUBLIC_KEY, 1, 192, 521, 0, ECC_PUBLIC_KEY_ATTRS),
    props(ObjectType::ECDSA_KEYPAIR, 1, 192, 521, 0, ECC_KEYPAIR_ATTRS),
    props(ObjectType::ECDH_PUBLIC_KEY, 1, 192, 521, 0, ECC_PUBLIC_KEY_ATTRS),
    props(ObjectType::ECDH_KEYPAIR, 1, 192, 521, 0, ECC_KEYPAIR_ATTRS),
    props(ObjectType::DATA, 1, 0, 0, 0, &[]),
    #[cfg(feature = "hkdf")]
    props(ObjectType::HKDF_IKM, 8, 0, 4096, 512, HKDF_IKM_ATTRS),
    #[cfg(feature = "concat-kdf")]
    props(ObjectType::CONCAT_KDF_Z, 8, 0, 4096, 512, CONCAT_KDF_Z_ATTRS),
    #[cfg(feature = "pbkdf2")]
    props(ObjectType::PBKDF2_PASSWORD, 8, 0, 4096, 512, PBKDF2_PASSWORD_ATTRS),
];

/// Registry lookup; `None` for unknown types.
pub fn find_type_props(obj_type: ObjectType) -> Option<&'static TypeProps> {
    OBJ_TYPE_PROPS.iter().find(|p| p.obj_type == obj_type)
}

/// Populate-time size bound for elliptic-curve types.
///
/// Curve encodings pad coordinates past the nominal size, so the bound a
/// populate check uses is looser than the allocation-time maximum. Any
/// size outside the supported curve set is rejected.
pub fn ecc_adjusted_max_size(max_bits: usize) -> crate::error::TeeResult<usize> {
    match max_bits {
        192 => Ok(223),
        224 => Ok(255),
        256 => Ok(383),
        384 => Ok(511),
        521 => Ok(4096),
        _ => Err(crate::error::TeeError::NotSupported),
    }
}
