//! Credentials and request signing.
//!
//! Every call carries `apiKey` plus a signature field `s`: the HMAC-SHA256 (keyed by the
//! secret key) of all other parameters concatenated as `key` + `value` in ascending key
//! order, hex encoded in lowercase.

use hmac::{Hmac, Mac as _};
use secrecy::{ExposeSecret as _, SecretString};
use sha2::Sha256;

use crate::Result;
use crate::error::Error;
use crate::params::Params;

/// Parameter name carrying the api key.
pub const API_KEY_FIELD: &str = "apiKey";
/// Parameter name carrying the request signature.
pub const SIGNATURE_FIELD: &str = "s";

type HmacSha256 = Hmac<Sha256>;

/// Gateway api key and secret. The secret never shows up in `Debug` output.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Credentials {
    pub api_key: String,
    pub secret_key: SecretString,
}

impl Credentials {
    pub fn new<K: Into<String>, S: Into<String>>(api_key: K, secret_key: S) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: SecretString::from(secret_key.into()),
        }
    }

    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Fails when either half is empty.
    pub(crate) fn ensure_complete(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::validation("missing api key"));
        }
        if self.secret_key.expose_secret().is_empty() {
            return Err(Error::validation("missing secret key"));
        }
        Ok(())
    }

    /// Returns the request parameters with `apiKey` injected and `s` appended.
    ///
    /// A caller supplied `apiKey` is replaced and a caller supplied `s` is dropped before signing.
    pub(crate) fn sign_params(&self, params: &Params) -> Result<Params> {
        let mut signed = params.clone();
        signed.remove(SIGNATURE_FIELD);
        signed.insert(API_KEY_FIELD, self.api_key.as_str());

        let signature = sign(&signed, &self.secret_key)?;
        signed.insert(SIGNATURE_FIELD, signature);
        Ok(signed)
    }
}

/// Builds the string the signature is computed over.
pub(crate) fn to_sign(params: &Params) -> String {
    params
        .iter()
        .fold(String::new(), |mut acc, (key, value)| {
            acc.push_str(key);
            acc.push_str(value);
            acc
        })
}

/// Computes the signature of `params` with `secret`.
pub(crate) fn sign(params: &Params, secret: &SecretString) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
        .map_err(|e| Error::validation(format!("invalid secret key: {e}")))?;
    mac.update(to_sign(params).as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}
