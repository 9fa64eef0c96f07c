//! Key material behind an object.
//!
//! [`KeyMaterial`] is a tagged union over the per-family key layouts.
//! Attribute access goes through [`KeyMaterial::attr_ref`] and
//! [`KeyMaterial::attr_mut`], which map attribute ids onto named fields;
//! the registry's slot order stays the serialization contract, this type
//! only owns storage.

use crate::attr::{AttrMut, AttrRef, Mpi, SecretKey};
use crate::ids::{AttributeId, ObjectType};
use crate::registry::TypeProps;

/// RSA public key.
#[derive(Debug, Default)]
pub struct RsaPublic {
    /// Modulus n.
    pub n: Mpi,
    /// Public exponent e.
    pub e: Mpi,
}

/// RSA key pair with optional CRT components.
#[derive(Debug, Default)]
pub struct RsaKeypair {
    /// Modulus n.
    pub n: Mpi,
    /// Public exponent e.
    pub e: Mpi,
    /// Private exponent d.
    pub d: Mpi,
    /// Prime p.
    pub p: Mpi,
    /// Prime q.
    pub q: Mpi,
    /// d mod (p-1).
    pub dp: Mpi,
    /// d mod (q-1).
    pub dq: Mpi,
    /// q^-1 mod p.
    pub qp: Mpi,
}

/// DSA public key.
#[derive(Debug, Default)]
pub struct DsaPublic {
    /// Prime modulus p.
    pub p: Mpi,
    /// Subprime q.
    pub q: Mpi,
    /// Generator g.
    pub g: Mpi,
    /// Public value y.
    pub y: Mpi,
}

/// DSA key pair.
#[derive(Debug, Default)]
pub struct DsaKeypair {
    /// Prime modulus p.
    pub p: Mpi,
    /// Subprime q.
    pub q: Mpi,
    /// Generator g.
    pub g: Mpi,
    /// Private value x.
    pub x: Mpi,
    /// Public value y.
    pub y: Mpi,
}

/// Diffie-Hellman key pair with optional subprime and exponent-size
/// hints.
#[derive(Debug, Default)]
pub struct DhKeypair {
    /// Prime modulus p.
    pub p: Mpi,
    /// Generator g.
    pub g: Mpi,
    /// Public value y.
    pub y: Mpi,
    /// Private value x.
    pub x: Mpi,
    /// Optional subprime q.
    pub q: Mpi,
    /// Private-exponent bit length; zero means unconstrained.
    pub x_bits: u32,
}

/// Elliptic-curve public key.
#[derive(Debug, Default)]
pub struct EccPublic {
    /// Affine x coordinate.
    pub x: Mpi,
    /// Affine y coordinate.
    pub y: Mpi,
    /// Curve selector.
    pub curve: u32,
}

/// Elliptic-curve key pair.
#[derive(Debug, Default)]
pub struct EccKeypair {
    /// Private scalar d.
    pub d: Mpi,
    /// Affine x coordinate.
    pub x: Mpi,
    /// Affine y coordinate.
    pub y: Mpi,
    /// Curve selector.
    pub curve: u32,
}

/// Borrowed elliptic-curve public key, valid for both public-key and
/// key-pair material.
#[derive(Debug, Clone, Copy)]
pub struct EccPublicView<'a> {
    /// Affine x coordinate.
    pub x: &'a Mpi,
    /// Affine y coordinate.
    pub y: &'a Mpi,
    /// Curve selector.
    pub curve: u32,
}

/// Borrowed RSA public key, valid for both public-key and key-pair
/// material.
#[derive(Debug, Clone, Copy)]
pub struct RsaPublicView<'a> {
    /// Modulus n.
    pub n: &'a Mpi,
    /// Public exponent e.
    pub e: &'a Mpi,
}

/// Borrowed DSA public key.
#[derive(Debug, Clone, Copy)]
pub struct DsaPublicView<'a> {
    /// Prime modulus p.
    pub p: &'a Mpi,
    /// Subprime q.
    pub q: &'a Mpi,
    /// Generator g.
    pub g: &'a Mpi,
    /// Public value y.
    pub y: &'a Mpi,
}

/// Storage for one object's key material.
#[derive(Debug, Default)]
pub enum KeyMaterial {
    /// No material; the untyped or data-only state.
    #[default]
    None,
    /// Secret bytes.
    Secret(SecretKey),
    /// RSA public key.
    RsaPublic(RsaPublic),
    /// RSA key pair.
    RsaKeypair(RsaKeypair),
    /// DSA public key.
    DsaPublic(DsaPublic),
    /// DSA key pair.
    DsaKeypair(DsaKeypair),
    /// Diffie-Hellman key pair.
    DhKeypair(DhKeypair),
    /// Elliptic-curve public key.
    EccPublic(EccPublic),
    /// Elliptic-curve key pair.
    EccKeypair(EccKeypair),
}

impl KeyMaterial {
    /// Fresh material for a registry entry.
    pub fn for_type(props: &TypeProps) -> Self {
        match props.obj_type {
            ObjectType::RSA_PUBLIC_KEY => Self::RsaPublic(RsaPublic::default()),
            ObjectType::RSA_KEYPAIR => Self::RsaKeypair(RsaKeypair::default()),
            ObjectType::DSA_PUBLIC_KEY => Self::DsaPublic(DsaPublic::default()),
            ObjectType::DSA_KEYPAIR => Self::DsaKeypair(DsaKeypair::default()),
            ObjectType::DH_KEYPAIR => Self::DhKeypair(DhKeypair::default()),
            ObjectType::ECDSA_PUBLIC_KEY | ObjectType::ECDH_PUBLIC_KEY => {
                Self::EccPublic(EccPublic::default())
            }
            ObjectType::ECDSA_KEYPAIR | ObjectType::ECDH_KEYPAIR => {
                Self::EccKeypair(EccKeypair::default())
            }
            ObjectType::DATA => Self::None,
            _ => Self::Secret(SecretKey::with_capacity(props.alloc_size)),
        }
    }

    /// Read-only view of the attribute with `id`, if this material
    /// carries it.
    pub fn attr_ref(&self, id: AttributeId) -> Option<AttrRef<'_>> {
        match self {
            Self::None => None,
            Self::Secret(k) => match id {
                AttributeId::SECRET_VALUE
                | AttributeId::HKDF_IKM
                | AttributeId::CONCAT_KDF_Z
                | AttributeId::PBKDF2_PASSWORD => Some(AttrRef::Secret(k)),
                _ => None,
            },
            Self::RsaPublic(k) => match id {
                AttributeId::RSA_MODULUS => Some(AttrRef::Bignum(&k.n)),
                AttributeId::RSA_PUBLIC_EXPONENT => Some(AttrRef::Bignum(&k.e)),
                _ => None,
            },
            Self::RsaKeypair(k) => match id {
                AttributeId::RSA_MODULUS => Some(AttrRef::Bignum(&k.n)),
                AttributeId::RSA_PUBLIC_EXPONENT => Some(AttrRef::Bignum(&k.e)),
                AttributeId::RSA_PRIVATE_EXPONENT => Some(AttrRef::Bignum(&k.d)),
                AttributeId::RSA_PRIME1 => Some(AttrRef::Bignum(&k.p)),
                AttributeId::RSA_PRIME2 => Some(AttrRef::Bignum(&k.q)),
                AttributeId::RSA_EXPONENT1 => Some(AttrRef::Bignum(&k.dp)),
                AttributeId::RSA_EXPONENT2 => Some(AttrRef::Bignum(&k.dq)),
                AttributeId::RSA_COEFFICIENT => Some(AttrRef::Bignum(&k.qp)),
                _ => None,
            },
            Self::DsaPublic(k) => match id {
                AttributeId::DSA_PRIME => Some(AttrRef::Bignum(&k.p)),
                AttributeId::DSA_SUBPRIME => Some(AttrRef::Bignum(&k.q)),
                AttributeId::DSA_BASE => Some(AttrRef::Bignum(&k.g)),
                AttributeId::DSA_PUBLIC_VALUE => Some(AttrRef::Bignum(&k.y)),
                _ => None,
            },
            Self::DsaKeypair(k) => match id {
                AttributeId::DSA_PRIME => Some(AttrRef::Bignum(&k.p)),
                AttributeId::DSA_SUBPRIME => Some(AttrRef::Bignum(&k.q)),
                AttributeId::DSA_BASE => Some(AttrRef::Bignum(&k.g)),
                AttributeId::DSA_PRIVATE_VALUE => Some(AttrRef::Bignum(&k.x)),
                AttributeId::DSA_PUBLIC_VALUE => Some(AttrRef::Bignum(&k.y)),
                _ => None,
            },
            Self::DhKeypair(k) => match id {
                AttributeId::DH_PRIME => Some(AttrRef::Bignum(&k.p)),
                AttributeId::DH_BASE => Some(AttrRef::Bignum(&k.g)),
                AttributeId::DH_PUBLIC_VALUE => Some(AttrRef::Bignum(&k.y)),
                AttributeId::DH_PRIVATE_VALUE => Some(AttrRef::Bignum(&k.x)),
                AttributeId::DH_SUBPRIME => Some(AttrRef::Bignum(&k.q)),
                AttributeId::DH_X_BITS => Some(AttrRef::Value(&k.x_bits)),
                _ => None,
            },
            Self::EccPublic(k) => match id {
                AttributeId::ECC_PUBLIC_VALUE_X => Some(AttrRef::Bignum(&k.x)),
                AttributeId::ECC_PUBLIC_VALUE_Y => Some(AttrRef::Bignum(&k.y)),
                AttributeId::ECC_CURVE => Some(AttrRef::Value(&k.curve)),
                _ => None,
            },
            Self::EccKeypair(k) => match id {
                AttributeId::ECC_PRIVATE_VALUE => Some(AttrRef::Bignum(&k.d)),
                AttributeId::ECC_PUBLIC_VALUE_X => Some(AttrRef::Bignum(&k.x)),
                AttributeId::ECC_PUBLIC_VALUE_Y => Some(AttrRef::Bignum(&k.y)),
                AttributeId::ECC_CURVE => Some(AttrRef::Value(&k.curve)),
                _ => None,
            },
        }
    }

    /// Mutable view of the attribute with `id`, if this material carries
    /// it.
    pub fn attr_mut(&mut self, id: AttributeId) -> Option<AttrMut<'_>> {
        match self {
            Self::None => None,
            Self::Secret(k) => match id {
                AttributeId::SECRET_VALUE
                | AttributeId::HKDF_IKM
                | AttributeId::CONCAT_KDF_Z
                | AttributeId::PBKDF2_PASSWORD => Some(AttrMut::Secret(k)),
                _ => None,
            },
            Self::RsaPublic(k) => match id {
                AttributeId::RSA_MODULUS => Some(AttrMut::Bignum(&mut k.n)),
                AttributeId::RSA_PUBLIC_EXPONENT => Some(AttrMut::Bignum(&mut k.e)),
                _ => None,
            },
            Self::RsaKeypair(k) => match id {
                AttributeId::RSA_MODULUS => Some(AttrMut::Bignum(&mut k.n)),
                AttributeId::RSA_PUBLIC_EXPONENT => Some(AttrMut::Bignum(&mut k.e)),
                AttributeId::RSA_PRIVATE_EXPONENT => Some(AttrMut::Bignum(&mut k.d)),
                AttributeId::RSA_PRIME1 => Some(AttrMut::Bignum(&mut k.p)),
                AttributeId::RSA_PRIME2 => Some(AttrMut::Bignum(&mut k.q)),
                AttributeId::RSA_EXPONENT1 => Some(AttrMut::Bignum(&mut k.dp)),
                AttributeId::RSA_EXPONENT2 => Some(AttrMut::Bignum(&mut k.dq)),
                AttributeId::RSA_COEFFICIENT => Some(AttrMut::Bignum(&mut k.qp)),
                _ => None,
            },
            Self::DsaPublic(k) => match id {
                AttributeId::DSA_PRIME => Some(AttrMut::Bignum(&mut k.p)),
                AttributeId::DSA_SUBPRIME => Some(AttrMut::Bignum(&mut k.q)),
                AttributeId::DSA_BASE => Some(AttrMut::Bignum(&mut k.g)),
                AttributeId::DSA_PUBLIC_VALUE => Some(AttrMut::Bignum(&mut k.y)),
                _ => None,
            },
            Self::DsaKeypair(k) => match id {
                AttributeId::DSA_PRIME => Some(AttrMut::Bignum(&mut k.p)),
                AttributeId::DSA_SUBPRIME => Some(AttrMut::Bignum(&mut k.q)),
                AttributeId::DSA_BASE => Some(AttrMut::Bignum(&mut k.g)),
                AttributeId::DSA_PRIVATE_VALUE => Some(AttrMut::Bignum(&mut k.x)),
                AttributeId::DSA_PUBLIC_VALUE => Some(AttrMut::Bignum(&mut k.y)),
                _ => None,
            },
            Self::DhKeypair(k) => match id {
                AttributeId::DH_PRIME => Some(AttrMut::Bignum(&mut k.p)),
                AttributeId::DH_BASE => Some(AttrMut::Bignum(&mut k.g)),
                AttributeId::DH_PUBLIC_VALUE => Some(AttrMut::Bignum(&mut k.y)),
                AttributeId::DH_PRIVATE_VALUE => Some(AttrMut::Bignum(&mut k.x)),
                AttributeId::DH_SUBPRIME => Some(AttrMut::Bignum(&mut k.q)),
                AttributeId::DH_X_BITS => Some(AttrMut::Value(&mut k.x_bits)),
                _ => None,
            },
            Self::EccPublic(k) => match id {
                AttributeId::ECC_PUBLIC_VALUE_X => Some(AttrMut::Bignum(&mut k.x)),
                AttributeId::ECC_PUBLIC_VALUE_Y => Some(AttrMut::Bignum(&mut k.y)),
                AttributeId::ECC_CURVE => Some(AttrMut::Value(&mut k.curve)),
                _ => None,
            },
            Self::EccKeypair(k) => match id {
                AttributeId::ECC_PRIVATE_VALUE => Some(AttrMut::Bignum(&mut k.d)),
                AttributeId::ECC_PUBLIC_VALUE_X => Some(AttrMut::Bignum(&mut k.x)),
                AttributeId::ECC_PUBLIC_VALUE_Y => Some(AttrMut::Bignum(&mut k.y)),
                AttributeId::ECC_CURVE => Some(AttrMut::Value(&mut k.curve)),
                _ => None,
            },
        }
    }

    /// Secret bytes, when this is secret material.
    pub fn secret(&self) -> Option<&SecretKey> {
        match self {
            Self::Secret(k) => Some(k),
            _ => None,
        }
    }

    /// Mutable secret bytes.
    pub fn secret_mut(&mut self) -> Option<&mut SecretKey> {
        match self {
            Self::Secret(k) => Some(k),
            _ => None,
        }
    }

    /// RSA public half, for either RSA form.
    pub fn rsa_public(&self) -> Option<RsaPublicView<'_>> {
        match self {
            Self::RsaPublic(k) => Some(RsaPublicView { n: &k.n, e: &k.e }),
            Self::RsaKeypair(k) => Some(RsaPublicView { n: &k.n, e: &k.e }),
            _ => None,
        }
    }

    /// Full RSA key pair.
    pub fn rsa_keypair(&self) -> Option<&RsaKeypair> {
        match self {
            Self::RsaKeypair(k) => Some(k),
            _ => None,
        }
    }

    /// Mutable RSA key pair.
    pub fn rsa_keypair_mut(&mut self) -> Option<&mut RsaKeypair> {
        match self {
            Self::RsaKeypair(k) => Some(k),
            _ => None,
        }
    }

    /// DSA public half, for either DSA form.
    pub fn dsa_public(&self) -> Option<DsaPublicView<'_>> {
        match self {
            Self::DsaPublic(k) => Some(DsaPublicView {
                p: &k.p,
                q: &k.q,
                g: &k.g,
                y: &k.y,
            }),
            Self::DsaKeypair(k) => Some(DsaPublicView {
                p: &k.p,
                q: &k.q,
                g: &k.g,
                y: &k.y,
            }),
            _ => None,
        }
    }

    /// Full DSA key pair.
    pub fn dsa_keypair(&self) -> Option<&DsaKeypair> {
        match self {
            Self::DsaKeypair(k) => Some(k),
            _ => None,
        }
    }

    /// Mutable DSA key pair.
    pub fn dsa_keypair_mut(&mut self) -> Option<&mut DsaKeypair> {
        match self {
            Self::DsaKeypair(k) => Some(k),
            _ => None,
        }
    }

    /// Diffie-Hellman key pair.
    pub fn dh_keypair(&self) -> Option<&DhKeypair> {
        match self {
            Self::DhKeypair(k) => Some(k),
            _ => None,
        }
    }

    /// Mutable Diffie-Hellman key pair.
    pub fn dh_keypair_mut(&mut self) -> Option<&mut DhKeypair> {
        match self {
            Self::DhKeypair(k) => Some(k),
            _ => None,
        }
    }

    /// Elliptic-curve public half, for either ECC form.
    pub fn ecc_public(&self) -> Option<EccPublicView<'_>> {
        match self {
            Self::EccPublic(k) => Some(EccPublicView {
                x: &k.x,
                y: &k.y,
                curve: k.curve,
            }),
            Self::EccKeypair(k) => Some(EccPublicView {
                x: &k.x,
                y: &k.y,
                curve: k.curve,
            }),
            _ => None,
        }
    }

    /// Elliptic-curve key pair.
    pub fn ecc_keypair(&self) -> Option<&EccKeypair> {
        match self {
            Self::EccKeypair(k) => Some(k),
            _ => None,
        }
    }

    /// Mutable elliptic-curve key pair.
    pub fn ecc_keypair_mut(&mut self) -> Option<&mut EccKeypair> {
        match self {
            Self::EccKeypair(k) => Some(k),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::AttrContent;
    use crate::registry::find_type_props;

    #[test]
    fn material_matches_type_family() {
        let aes = find_type_props(ObjectType::AES).unwrap();
        assert!(matches!(KeyMaterial::for_type(aes), KeyMaterial::Secret(_)));
        let rsa = find_type_props(ObjectType::RSA_KEYPAIR).unwrap();
        assert!(matches!(
            KeyMaterial::for_type(rsa),
            KeyMaterial::RsaKeypair(_)
        ));
        let data = find_type_props(ObjectType::DATA).unwrap();
        assert!(matches!(KeyMaterial::for_type(data), KeyMaterial::None));
    }

    #[test]
    fn secret_capacity_comes_from_registry() {
        let aes = find_type_props(ObjectType::AES).unwrap();
        let m = KeyMaterial::for_type(aes);
        assert_eq!(m.secret().unwrap().capacity(), 32);
    }

    #[test]
    fn attr_lookup_routes_to_named_fields() {
        let props = find_type_props(ObjectType::DH_KEYPAIR).unwrap();
        let mut m = KeyMaterial::for_type(props);
        m.attr_mut(AttributeId::DH_PRIME)
            .unwrap()
            .from_user(&AttrContent::Ref(vec![0x17]))
            .unwrap();
        m.attr_mut(AttributeId::DH_X_BITS)
            .unwrap()
            .from_user(&AttrContent::Value { a: 128, b: 0 })
            .unwrap();
        assert_eq!(m.dh_keypair().unwrap().p.as_be_bytes(), &[0x17]);
        assert_eq!(m.dh_keypair().unwrap().x_bits, 128);
        assert!(m.attr_ref(AttributeId::SECRET_VALUE).is_none());
    }

    #[test]
    fn public_views_cover_both_forms() {
        let pair = find_type_props(ObjectType::ECDSA_KEYPAIR).unwrap();
        let mut m = KeyMaterial::for_type(pair);
        if let Some(k) = m.ecc_keypair_mut() {
            k.curve = crate::ids::EccCurve::NIST_P256.0;
            k.x.assign_be(&[1]);
            k.y.assign_be(&[2]);
        }
        let view = m.ecc_public().unwrap();
        assert_eq!(view.curve, crate::ids::EccCurve::NIST_P256.0);
        assert_eq!(view.x.as_be_bytes(), &[1]);
    }
}
