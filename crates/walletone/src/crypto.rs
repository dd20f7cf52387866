//! Utilities for cryptographic algorithms
use base64::Engine;
use error_stack::ResultExt;
use masking::{PeekInterface, Secret};
use serde::Deserialize;
use strum::{Display, EnumString};

use crate::{
    consts::fields,
    encoding::encode_cp1251,
    errors::{CryptoError, CustomResult},
    types::Field,
};

/// Trait for generating a digest of a message
pub trait GenerateDigest {
    /// takes a message and creates a digest for it
    fn generate_digest(&self, message: &[u8]) -> CustomResult<Vec<u8>, CryptoError>;
}

/// MD5 hash function
#[derive(Debug)]
pub struct Md5;

impl GenerateDigest for Md5 {
    fn generate_digest(&self, message: &[u8]) -> CustomResult<Vec<u8>, CryptoError> {
        let digest = md5::compute(message);
        Ok(digest.as_ref().to_vec())
    }
}

/// Secure Hash Algorithm 1
#[derive(Debug)]
pub struct Sha1;

impl GenerateDigest for Sha1 {
    fn generate_digest(&self, message: &[u8]) -> CustomResult<Vec<u8>, CryptoError> {
        let digest = ring::digest::digest(&ring::digest::SHA1_FOR_LEGACY_USE_ONLY, message);
        Ok(digest.as_ref().to_vec())
    }
}

/// Digest the merchant selected for form signatures in the W1 merchant settings.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SignatureAlgorithm {
    #[default]
    Md5,
    Sha1,
}

impl SignatureAlgorithm {
    fn digest(self) -> &'static dyn GenerateDigest {
        match self {
            Self::Md5 => &Md5,
            Self::Sha1 => &Sha1,
        }
    }
}

/// Bytes the signature is computed over: every value in list order, then the signing key, all
/// in cp1251.
pub fn signature_payload(fields: &[Field], sign_key: &Secret<String>) -> Vec<u8> {
    let mut payload = fields
        .iter()
        .map(|field| field.value.to_string())
        .collect::<String>();
    payload.push_str(sign_key.peek());
    encode_cp1251(&payload)
}

/// Base64 digest of [`signature_payload`], the value of `WMI_SIGNATURE`.
pub fn generate_signature_from_list(
    fields: &[Field],
    sign_key: &Secret<String>,
    algorithm: SignatureAlgorithm,
) -> CustomResult<String, CryptoError> {
    let digest = algorithm
        .digest()
        .generate_digest(&signature_payload(fields, sign_key))
        .change_context(CryptoError::MessageSigningFailed)
        .attach_printable_lazy(|| {
            format!("Unable to sign {} form fields with {algorithm}", fields.len())
        })?;

    Ok(base64::engine::general_purpose::STANDARD.encode(digest))
}

/// Checks a signed list: the last field has to be `WMI_SIGNATURE` and match the signature of all
/// fields before it.
pub fn verify_signature(
    signed_fields: &[Field],
    sign_key: &Secret<String>,
    algorithm: SignatureAlgorithm,
) -> CustomResult<bool, CryptoError> {
    let Some((signature, fields)) = signed_fields.split_last() else {
        return Ok(false);
    };
    if signature.key != fields::SIGNATURE {
        return Ok(false);
    }

    let expected = generate_signature_from_list(fields, sign_key, algorithm)
        .change_context(CryptoError::SignatureVerificationFailed)?;

    Ok(signature.value.to_string() == expected)
}
