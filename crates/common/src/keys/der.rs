//! Hand-built DER framing for rewrapping bare private keys into PKCS#8.
//!
//! Only the outer `PrivateKeyInfo` shell is produced here:
//!
//! ```text
//! SEQUENCE {
//!     INTEGER 0,
//!     AlgorithmIdentifier,      -- fixed bytes per key family
//!     OCTET STRING { <bare key bytes, untouched> }
//! }
//! ```
//!
//! The bare SEC1 / PKCS#1 bytes are never inspected.

const TAG_SEQUENCE: u8 = 0x30;
const TAG_OCTET_STRING: u8 = 0x04;

/// `INTEGER 0`, the PKCS#8 version field.
const PKCS8_VERSION_ZERO: [u8; 3] = [0x02, 0x01, 0x00];

/// `AlgorithmIdentifier { id-ecPublicKey, prime256v1 }`.
///
/// OIDs 1.2.840.10045.2.1 and 1.2.840.10045.3.1.7.
pub const EC_P256_ALGORITHM_IDENTIFIER: [u8; 21] = [
    0x30, 0x13, // SEQUENCE, 19 bytes
    0x06, 0x07, 0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x02, 0x01, // OID id-ecPublicKey
    0x06, 0x08, 0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x03, 0x01, 0x07, // OID prime256v1
];

/// `AlgorithmIdentifier { rsaEncryption, NULL }`.
///
/// OID 1.2.840.113549.1.1.1.
pub const RSA_ALGORITHM_IDENTIFIER: [u8; 15] = [
    0x30, 0x0D, // SEQUENCE, 13 bytes
    0x06, 0x09, 0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x01, // OID rsaEncryption
    0x05, 0x00, // NULL
];

/// Appends a DER length: short form below 128, long form otherwise.
pub fn encode_length(out: &mut Vec<u8>, length: usize) {
    if length < 0x80 {
        out.push(length as u8);
        return;
    }

    let bytes = length.to_be_bytes();
    let leading_zeros = bytes.iter().take_while(|b| **b == 0).count();
    let significant = &bytes[leading_zeros..];

    out.push(0x80 | significant.len() as u8);
    out.extend_from_slice(significant);
}

fn tagged(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(content.len() + 6);
    out.push(tag);
    encode_length(&mut out, content.len());
    out.extend_from_slice(content);
    out
}

#[must_use]
pub fn octet_string(content: &[u8]) -> Vec<u8> {
    tagged(TAG_OCTET_STRING, content)
}

/// Concatenates already-encoded elements under a SEQUENCE header.
#[must_use]
pub fn sequence(elements: &[&[u8]]) -> Vec<u8> {
    tagged(TAG_SEQUENCE, &elements.concat())
}

fn private_key_info(algorithm_identifier: &[u8], bare_key: &[u8]) -> Vec<u8> {
    let wrapped_key = octet_string(bare_key);
    sequence(&[
        PKCS8_VERSION_ZERO.as_slice(),
        algorithm_identifier,
        wrapped_key.as_slice(),
    ])
}

/// Wraps a SEC1 `ECPrivateKey` for P-256 into a PKCS#8 `PrivateKeyInfo`.
#[must_use]
pub fn wrap_sec1_ec(sec1: &[u8]) -> Vec<u8> {
    private_key_info(&EC_P256_ALGORITHM_IDENTIFIER, sec1)
}

/// Wraps a PKCS#1 `RSAPrivateKey` into a PKCS#8 `PrivateKeyInfo`.
#[must_use]
pub fn wrap_pkcs1_rsa(pkcs1: &[u8]) -> Vec<u8> {
    private_key_info(&RSA_ALGORITHM_IDENTIFIER, pkcs1)
}
