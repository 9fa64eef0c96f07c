//! Identifier space: object types, attribute ids, algorithms, curves.
//!
//! All identifiers are 32-bit values with structure packed into the bits:
//! attribute ids carry content-strategy and protection bits, algorithm ids
//! carry an operation-class nibble, a hash nibble, and a main-algorithm
//! byte. The accessors here are the only place that bit layout is decoded.

/// Object type identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectType(pub u32);

impl ObjectType {
    /// AES secret key.
    pub const AES: Self = Self(0xA000_0010);
    /// Single DES secret key.
    pub const DES: Self = Self(0xA000_0011);
    /// Triple DES secret key.
    pub const DES3: Self = Self(0xA000_0013);
    /// HMAC-MD5 secret key.
    pub const HMAC_MD5: Self = Self(0xA000_0001);
    /// HMAC-SHA1 secret key.
    pub const HMAC_SHA1: Self = Self(0xA000_0002);
    /// HMAC-SHA224 secret key.
    pub const HMAC_SHA224: Self = Self(0xA000_0003);
    /// HMAC-SHA256 secret key.
    pub const HMAC_SHA256: Self = Self(0xA000_0004);
    /// HMAC-SHA384 secret key.
    pub const HMAC_SHA384: Self = Self(0xA000_0005);
    /// HMAC-SHA512 secret key.
    pub const HMAC_SHA512: Self = Self(0xA000_0006);
    /// Untyped secret bytes.
    pub const GENERIC_SECRET: Self = Self(0xA000_0000);
    /// RSA public key.
    pub const RSA_PUBLIC_KEY: Self = Self(0xA000_0030);
    /// RSA key pair.
    pub const RSA_KEYPAIR: Self = Self(0xA100_0030);
    /// DSA public key.
    pub const DSA_PUBLIC_KEY: Self = Self(0xA000_0031);
    /// DSA key pair.
    pub const DSA_KEYPAIR: Self = Self(0xA100_0031);
    /// Diffie-Hellman key pair.
    pub const DH_KEYPAIR: Self = Self(0xA100_0032);
    /// ECDSA public key.
    pub const ECDSA_PUBLIC_KEY: Self = Self(0xA000_0041);
    /// ECDSA key pair.
    pub const ECDSA_KEYPAIR: Self = Self(0xA100_0041);
    /// ECDH public key.
    pub const ECDH_PUBLIC_KEY: Self = Self(0xA000_0042);
    /// ECDH key pair.
    pub const ECDH_KEYPAIR: Self = Self(0xA100_0042);
    /// Pure data object; carries no attributes.
    pub const DATA: Self = Self(0xA000_00BF);
    /// HKDF input keying material.
    pub const HKDF_IKM: Self = Self(0xA100_00C0);
    /// Concatenation KDF shared secret.
    pub const CONCAT_KDF_Z: Self = Self(0xA100_00C1);
    /// PBKDF2 password.
    pub const PBKDF2_PASSWORD: Self = Self(0xA100_00C2);

    /// True for the elliptic-curve key types, whose size limits follow
    /// curve order rather than byte quanta.
    pub fn is_ecc(self) -> bool {
        matches!(
            self,
            Self::ECDSA_PUBLIC_KEY | Self::ECDSA_KEYPAIR | Self::ECDH_PUBLIC_KEY | Self::ECDH_KEYPAIR
        )
    }
}

/// Attribute identifier.
///
/// Bit 29 selects scalar-value content (versus a byte-buffer reference),
/// bit 28 marks the attribute as public (extractable without the
/// extractable usage right).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttributeId(pub u32);

impl AttributeId {
    /// Scalar-value content bit.
    pub const FLAG_VALUE: u32 = 0x2000_0000;
    /// Public (always-extractable) bit.
    pub const FLAG_PUBLIC: u32 = 0x1000_0000;

    /// Raw secret bytes.
    pub const SECRET_VALUE: Self = Self(0xC000_0000);
    /// RSA modulus n.
    pub const RSA_MODULUS: Self = Self(0xD000_0130);
    /// RSA public exponent e.
    pub const RSA_PUBLIC_EXPONENT: Self = Self(0xD000_0230);
    /// RSA private exponent d.
    pub const RSA_PRIVATE_EXPONENT: Self = Self(0xC000_0330);
    /// RSA prime p.
    pub const RSA_PRIME1: Self = Self(0xC000_0430);
    /// RSA prime q.
    pub const RSA_PRIME2: Self = Self(0xC000_0530);
    /// RSA CRT exponent d mod (p-1).
    pub const RSA_EXPONENT1: Self = Self(0xC000_0630);
    /// RSA CRT exponent d mod (q-1).
    pub const RSA_EXPONENT2: Self = Self(0xC000_0730);
    /// RSA CRT coefficient q^-1 mod p.
    pub const RSA_COEFFICIENT: Self = Self(0xC000_0830);
    /// OAEP label.
    pub const RSA_OAEP_LABEL: Self = Self(0xD000_0930);
    /// PSS salt length.
    pub const RSA_PSS_SALT_LENGTH: Self = Self(0xF000_0A30);
    /// DSA prime p.
    pub const DSA_PRIME: Self = Self(0xD000_1031);
    /// DSA subprime q.
    pub const DSA_SUBPRIME: Self = Self(0xD000_1131);
    /// DSA base g.
    pub const DSA_BASE: Self = Self(0xD000_1231);
    /// DSA public value y.
    pub const DSA_PUBLIC_VALUE: Self = Self(0xD000_0131);
    /// DSA private value x.
    pub const DSA_PRIVATE_VALUE: Self = Self(0xC000_0231);
    /// DH prime p.
    pub const DH_PRIME: Self = Self(0xD000_1032);
    /// DH subprime q.
    pub const DH_SUBPRIME: Self = Self(0xD000_1132);
    /// DH base g.
    pub const DH_BASE: Self = Self(0xD000_1232);
    /// DH private-exponent bit length.
    pub const DH_X_BITS: Self = Self(0xF000_1332);
    /// DH public value y.
    pub const DH_PUBLIC_VALUE: Self = Self(0xD000_0132);
    /// DH private value x.
    pub const DH_PRIVATE_VALUE: Self = Self(0xC000_0232);
    /// ECC public point x coordinate.
    pub const ECC_PUBLIC_VALUE_X: Self = Self(0xD000_0141);
    /// ECC public point y coordinate.
    pub const ECC_PUBLIC_VALUE_Y: Self = Self(0xD000_0241);
    /// ECC private scalar d.
    pub const ECC_PRIVATE_VALUE: Self = Self(0xC000_0341);
    /// ECC curve selector.
    pub const ECC_CURVE: Self = Self(0xF000_0441);
    /// HKDF input keying material.
    pub const HKDF_IKM: Self = Self(0xC000_01C0);
    /// HKDF salt.
    pub const HKDF_SALT: Self = Self(0xD000_02C0);
    /// HKDF context info.
    pub const HKDF_INFO: Self = Self(0xD000_03C0);
    /// HKDF output length in bytes.
    pub const HKDF_OKM_LENGTH: Self = Self(0xF000_04C0);
    /// Concatenation KDF shared secret z.
    pub const CONCAT_KDF_Z: Self = Self(0xC000_01C1);
    /// Concatenation KDF other-info.
    pub const CONCAT_KDF_OTHER_INFO: Self = Self(0xD000_02C1);
    /// Concatenation KDF output length in bytes.
    pub const CONCAT_KDF_DKM_LENGTH: Self = Self(0xF000_03C1);
    /// PBKDF2 password.
    pub const PBKDF2_PASSWORD: Self = Self(0xC000_01C2);
    /// PBKDF2 salt.
    pub const PBKDF2_SALT: Self = Self(0xD000_02C2);
    /// PBKDF2 iteration count.
    pub const PBKDF2_ITERATION_COUNT: Self = Self(0xF000_03C2);
    /// PBKDF2 output length in bytes.
    pub const PBKDF2_DKM_LENGTH: Self = Self(0xF000_04C2);

    /// True when the attribute content is a pair of 32-bit words rather
    /// than a byte buffer.
    pub fn is_value(self) -> bool {
        self.0 & Self::FLAG_VALUE != 0
    }

    /// True when the attribute may be read out regardless of the
    /// extractable usage right.
    pub fn is_public(self) -> bool {
        self.0 & Self::FLAG_PUBLIC != 0
    }
}

/// Operation class, packed into the top nibble of an algorithm id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpClass {
    /// Symmetric cipher.
    Cipher,
    /// Message authentication code.
    Mac,
    /// Authenticated encryption.
    AuthEnc,
    /// Digest.
    Digest,
    /// Asymmetric cipher.
    AsymCipher,
    /// Asymmetric signature.
    AsymSig,
    /// Key derivation.
    Derive,
}

/// Algorithm identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Algorithm(pub u32);

impl Algorithm {
    /// AES-ECB without padding.
    pub const AES_ECB_NOPAD: Self = Self(0x1000_0010);
    /// AES-CBC without padding.
    pub const AES_CBC_NOPAD: Self = Self(0x1000_0110);
    /// AES-CTR.
    pub const AES_CTR: Self = Self(0x1000_0210);
    /// AES-CTS.
    pub const AES_CTS: Self = Self(0x1000_0310);
    /// AES-XTS.
    pub const AES_XTS: Self = Self(0x1000_0410);
    /// AES-CCM.
    pub const AES_CCM: Self = Self(0x4000_0710);
    /// AES-GCM.
    pub const AES_GCM: Self = Self(0x4000_0810);
    /// DES-ECB without padding.
    pub const DES_ECB_NOPAD: Self = Self(0x1000_0011);
    /// DES-CBC without padding.
    pub const DES_CBC_NOPAD: Self = Self(0x1000_0111);
    /// 3DES-ECB without padding.
    pub const DES3_ECB_NOPAD: Self = Self(0x1000_0013);
    /// 3DES-CBC without padding.
    pub const DES3_CBC_NOPAD: Self = Self(0x1000_0113);
    /// MD5 digest.
    pub const MD5: Self = Self(0x5000_0001);
    /// SHA-1 digest.
    pub const SHA1: Self = Self(0x5000_0002);
    /// SHA-224 digest.
    pub const SHA224: Self = Self(0x5000_0003);
    /// SHA-256 digest.
    pub const SHA256: Self = Self(0x5000_0004);
    /// SHA-384 digest.
    pub const SHA384: Self = Self(0x5000_0005);
    /// SHA-512 digest.
    pub const SHA512: Self = Self(0x5000_0006);
    /// HMAC-MD5.
    pub const HMAC_MD5: Self = Self(0x3000_0001);
    /// HMAC-SHA1.
    pub const HMAC_SHA1: Self = Self(0x3000_0002);
    /// HMAC-SHA224.
    pub const HMAC_SHA224: Self = Self(0x3000_0003);
    /// HMAC-SHA256.
    pub const HMAC_SHA256: Self = Self(0x3000_0004);
    /// HMAC-SHA384.
    pub const HMAC_SHA384: Self = Self(0x3000_0005);
    /// HMAC-SHA512.
    pub const HMAC_SHA512: Self = Self(0x3000_0006);
    /// AES-CMAC.
    pub const AES_CMAC: Self = Self(0x3000_0610);
    /// AES-CBC-MAC without padding.
    pub const AES_CBC_MAC_NOPAD: Self = Self(0x3000_0110);
    /// Raw RSA exponentiation.
    pub const RSA_NOPAD: Self = Self(0x6000_0030);
    /// RSAES-PKCS1-v1_5 encryption.
    pub const RSAES_PKCS1_V1_5: Self = Self(0x6000_0130);
    /// RSAES-OAEP with MGF1-SHA1.
    pub const RSAES_PKCS1_OAEP_MGF1_SHA1: Self = Self(0x6021_0230);
    /// RSAES-OAEP with MGF1-SHA224.
    pub const RSAES_PKCS1_OAEP_MGF1_SHA224: Self = Self(0x6031_0230);
    /// RSAES-OAEP with MGF1-SHA256.
    pub const RSAES_PKCS1_OAEP_MGF1_SHA256: Self = Self(0x6041_0230);
    /// RSAES-OAEP with MGF1-SHA384.
    pub const RSAES_PKCS1_OAEP_MGF1_SHA384: Self = Self(0x6051_0230);
    /// RSAES-OAEP with MGF1-SHA512.
    pub const RSAES_PKCS1_OAEP_MGF1_SHA512: Self = Self(0x6061_0230);
    /// RSASSA-PKCS1-v1_5 over MD5.
    pub const RSASSA_PKCS1_V1_5_MD5: Self = Self(0x7000_1830);
    /// RSASSA-PKCS1-v1_5 over SHA-1.
    pub const RSASSA_PKCS1_V1_5_SHA1: Self = Self(0x7000_2830);
    /// RSASSA-PKCS1-v1_5 over SHA-224.
    pub const RSASSA_PKCS1_V1_5_SHA224: Self = Self(0x7000_3830);
    /// RSASSA-PKCS1-v1_5 over SHA-256.
    pub const RSASSA_PKCS1_V1_5_SHA256: Self = Self(0x7000_4830);
    /// RSASSA-PKCS1-v1_5 over SHA-384.
    pub const RSASSA_PKCS1_V1_5_SHA384: Self = Self(0x7000_5830);
    /// RSASSA-PKCS1-v1_5 over SHA-512.
    pub const RSASSA_PKCS1_V1_5_SHA512: Self = Self(0x7000_6830);
    /// RSASSA-PSS with MGF1-SHA1.
    pub const RSASSA_PKCS1_PSS_MGF1_SHA1: Self = Self(0x7021_2930);
    /// RSASSA-PSS with MGF1-SHA224.
    pub const RSASSA_PKCS1_PSS_MGF1_SHA224: Self = Self(0x7031_3930);
    /// RSASSA-PSS with MGF1-SHA256.
    pub const RSASSA_PKCS1_PSS_MGF1_SHA256: Self = Self(0x7041_4930);
    /// RSASSA-PSS with MGF1-SHA384.
    pub const RSASSA_PKCS1_PSS_MGF1_SHA384: Self = Self(0x7051_5930);
    /// RSASSA-PSS with MGF1-SHA512.
    pub const RSASSA_PKCS1_PSS_MGF1_SHA512: Self = Self(0x7061_6930);
    /// DSA over SHA-1.
    pub const DSA_SHA1: Self = Self(0x7000_2131);
    /// DSA over SHA-224.
    pub const DSA_SHA224: Self = Self(0x7000_3131);
    /// DSA over SHA-256.
    pub const DSA_SHA256: Self = Self(0x7000_4131);
    /// ECDSA on P-192.
    pub const ECDSA_P192: Self = Self(0x7000_1042);
    /// ECDSA on P-224.
    pub const ECDSA_P224: Self = Self(0x7000_2042);
    /// ECDSA on P-256.
    pub const ECDSA_P256: Self = Self(0x7000_3042);
    /// ECDSA on P-384.
    pub const ECDSA_P384: Self = Self(0x7000_4042);
    /// ECDSA on P-521.
    pub const ECDSA_P521: Self = Self(0x7000_5042);
    /// Diffie-Hellman shared-secret derivation.
    pub const DH_DERIVE_SHARED_SECRET: Self = Self(0x8000_0032);
    /// ECDH shared-secret derivation.
    pub const ECDH_DERIVE_SHARED_SECRET: Self = Self(0x8000_0042);
    /// HKDF with HMAC-MD5.
    pub const HKDF_MD5_DERIVE_KEY: Self = Self(0x8000_10C0);
    /// HKDF with HMAC-SHA1.
    pub const HKDF_SHA1_DERIVE_KEY: Self = Self(0x8000_20C0);
    /// HKDF with HMAC-SHA224.
    pub const HKDF_SHA224_DERIVE_KEY: Self = Self(0x8000_30C0);
    /// HKDF with HMAC-SHA256.
    pub const HKDF_SHA256_DERIVE_KEY: Self = Self(0x8000_40C0);
    /// HKDF with HMAC-SHA384.
    pub const HKDF_SHA384_DERIVE_KEY: Self = Self(0x8000_50C0);
    /// HKDF with HMAC-SHA512.
    pub const HKDF_SHA512_DERIVE_KEY: Self = Self(0x8000_60C0);
    /// Concatenation KDF with SHA-1.
    pub const CONCAT_KDF_SHA1_DERIVE_KEY: Self = Self(0x8000_20C1);
    /// Concatenation KDF with SHA-224.
    pub const CONCAT_KDF_SHA224_DERIVE_KEY: Self = Self(0x8000_30C1);
    /// Concatenation KDF with SHA-256.
    pub const CONCAT_KDF_SHA256_DERIVE_KEY: Self = Self(0x8000_40C1);
    /// Concatenation KDF with SHA-384.
    pub const CONCAT_KDF_SHA384_DERIVE_KEY: Self = Self(0x8000_50C1);
    /// Concatenation KDF with SHA-512.
    pub const CONCAT_KDF_SHA512_DERIVE_KEY: Self = Self(0x8000_60C1);
    /// PBKDF2 with HMAC-SHA1.
    pub const PBKDF2_HMAC_SHA1_DERIVE_KEY: Self = Self(0x8000_20C2);
    /// PBKDF2 with HMAC-SHA224.
    pub const PBKDF2_HMAC_SHA224_DERIVE_KEY: Self = Self(0x8000_30C2);
    /// PBKDF2 with HMAC-SHA256.
    pub const PBKDF2_HMAC_SHA256_DERIVE_KEY: Self = Self(0x8000_40C2);
    /// PBKDF2 with HMAC-SHA384.
    pub const PBKDF2_HMAC_SHA384_DERIVE_KEY: Self = Self(0x8000_50C2);
    /// PBKDF2 with HMAC-SHA512.
    pub const PBKDF2_HMAC_SHA512_DERIVE_KEY: Self = Self(0x8000_60C2);

    /// Main-algorithm byte for AES.
    pub const MAIN_AES: u32 = 0x10;
    /// Main-algorithm byte for DES.
    pub const MAIN_DES: u32 = 0x11;
    /// Main-algorithm byte for triple DES.
    pub const MAIN_DES3: u32 = 0x13;
    /// Main-algorithm byte for RSA.
    pub const MAIN_RSA: u32 = 0x30;
    /// Main-algorithm byte for DSA.
    pub const MAIN_DSA: u32 = 0x31;
    /// Main-algorithm byte for Diffie-Hellman.
    pub const MAIN_DH: u32 = 0x32;
    /// Main-algorithm byte for elliptic-curve algorithms.
    pub const MAIN_ECC: u32 = 0x42;
    /// Main-algorithm byte for HKDF.
    pub const MAIN_HKDF: u32 = 0xC0;
    /// Main-algorithm byte for the concatenation KDF.
    pub const MAIN_CONCAT_KDF: u32 = 0xC1;
    /// Main-algorithm byte for PBKDF2.
    pub const MAIN_PBKDF2: u32 = 0xC2;
    /// Main-algorithm byte for MD5.
    pub const MAIN_MD5: u32 = 0x01;
    /// Main-algorithm byte for SHA-1.
    pub const MAIN_SHA1: u32 = 0x02;
    /// Main-algorithm byte for SHA-224.
    pub const MAIN_SHA224: u32 = 0x03;
    /// Main-algorithm byte for SHA-256.
    pub const MAIN_SHA256: u32 = 0x04;
    /// Main-algorithm byte for SHA-384.
    pub const MAIN_SHA384: u32 = 0x05;
    /// Main-algorithm byte for SHA-512.
    pub const MAIN_SHA512: u32 = 0x06;

    /// Operation class from the top nibble.
    pub fn class(self) -> Option<OpClass> {
        match self.0 >> 28 {
            0x1 => Some(OpClass::Cipher),
            0x3 => Some(OpClass::Mac),
            0x4 => Some(OpClass::AuthEnc),
            0x5 => Some(OpClass::Digest),
            0x6 => Some(OpClass::AsymCipher),
            0x7 => Some(OpClass::AsymSig),
            0x8 => Some(OpClass::Derive),
            _ => None,
        }
    }

    /// Main-algorithm byte (low 8 bits).
    pub fn main_alg(self) -> u32 {
        self.0 & 0xFF
    }

    /// Digest algorithm packed into bits 12..16, as a standalone digest
    /// algorithm id. Only meaningful for RSA/DSA signature and
    /// KDF-family ids, which encode their hash there.
    pub fn digest_hash(self) -> Self {
        Self(0x5000_0000 | ((self.0 >> 12) & 0xF))
    }

    /// Output size in bytes for digest-class algorithms, or for the hash
    /// underlying an HMAC algorithm.
    pub fn digest_size(self) -> Option<usize> {
        match self.main_alg() {
            Self::MAIN_MD5 => Some(16),
            Self::MAIN_SHA1 => Some(20),
            Self::MAIN_SHA224 => Some(28),
            Self::MAIN_SHA256 => Some(32),
            Self::MAIN_SHA384 => Some(48),
            Self::MAIN_SHA512 => Some(64),
            _ => None,
        }
    }

    /// Output size in bytes for MAC-class algorithms.
    pub fn mac_size(self) -> Option<usize> {
        match self {
            Self::AES_CMAC | Self::AES_CBC_MAC_NOPAD => Some(16),
            _ => self.digest_size(),
        }
    }
}

/// Operation direction bound at state allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Symmetric or asymmetric encryption.
    Encrypt,
    /// Symmetric or asymmetric decryption.
    Decrypt,
    /// Signature generation.
    Sign,
    /// Signature verification.
    Verify,
    /// MAC computation.
    Mac,
    /// Digest computation.
    Digest,
    /// Key derivation.
    Derive,
}

impl Mode {
    /// Decodes the boundary representation.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Encrypt),
            1 => Some(Self::Decrypt),
            2 => Some(Self::Sign),
            3 => Some(Self::Verify),
            4 => Some(Self::Mac),
            5 => Some(Self::Digest),
            6 => Some(Self::Derive),
            _ => None,
        }
    }
}

/// Elliptic curve selector carried in the `ECC_CURVE` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EccCurve(pub u32);

impl EccCurve {
    /// NIST P-192.
    pub const NIST_P192: Self = Self(1);
    /// NIST P-224.
    pub const NIST_P224: Self = Self(2);
    /// NIST P-256.
    pub const NIST_P256: Self = Self(3);
    /// NIST P-384.
    pub const NIST_P384: Self = Self(4);
    /// NIST P-521.
    pub const NIST_P521: Self = Self(5);
}

/// Object usage rights.
pub mod usage {
    /// Key material may be read out or serialized.
    pub const EXTRACTABLE: u32 = 0x0000_0001;
    /// Key may encrypt.
    pub const ENCRYPT: u32 = 0x0000_0002;
    /// Key may decrypt.
    pub const DECRYPT: u32 = 0x0000_0004;
    /// Key may compute MACs.
    pub const MAC: u32 = 0x0000_0008;
    /// Key may sign.
    pub const SIGN: u32 = 0x0000_0010;
    /// Key may verify.
    pub const VERIFY: u32 = 0x0000_0020;
    /// Key may derive other keys.
    pub const DERIVE: u32 = 0x0000_0040;
    /// All rights granted; the starting point for monotonic restriction.
    pub const DEFAULT: u32 = 0xFFFF_FFFF;
}

/// Object handle flags.
pub mod handle_flags {
    /// Object is backed by persistent storage.
    pub const PERSISTENT: u32 = 0x0001_0000;
    /// Object holds usable key material.
    pub const INITIALIZED: u32 = 0x0002_0000;
}
