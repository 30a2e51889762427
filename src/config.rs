use secrecy::{ExposeSecret as _, SecretString};
use url::Url;

use crate::Result;
use crate::auth::Credentials;
use crate::error::Error;

/// Sandbox endpoint, used unless told otherwise.
pub const SANDBOX_API_URL: &str = "https://sandbox.flow.cl/api";
/// Production endpoint.
pub const PRODUCTION_API_URL: &str = "https://www.flow.cl/api";

/// Client configuration.
///
/// Credentials are optional here: a client built without them can still be given keys later
/// through [`crate::Client::set_keys`], and only fails once a signed call is attempted.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: Url,
    pub api_key: Option<String>,
    pub secret_key: Option<SecretString>,
}

impl Config {
    #[must_use]
    pub fn new(api_url: Url) -> Self {
        Self {
            api_url: normalize(api_url),
            api_key: None,
            secret_key: None,
        }
    }

    pub fn sandbox() -> Result<Self> {
        Ok(Self::new(Url::parse(SANDBOX_API_URL)?))
    }

    pub fn production() -> Result<Self> {
        Ok(Self::new(Url::parse(PRODUCTION_API_URL)?))
    }

    /// Builds a configuration from plain string values, e.g. read from an app-level settings file.
    ///
    /// Empty keys are treated as absent.
    pub fn from_raw(api_url: &str, api_key: &str, secret_key: &str) -> Result<Self> {
        let api_url = Url::parse(api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(Error::validation(format!(
                "api url `{api_url}` cannot be used as a base url"
            )));
        }

        let mut config = Self::new(api_url);
        if !api_key.is_empty() {
            config.api_key = Some(api_key.to_owned());
        }
        if !secret_key.is_empty() {
            config.secret_key = Some(SecretString::from(secret_key.to_owned()));
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    #[must_use]
    pub fn with_secret_key<S: Into<String>>(mut self, secret_key: S) -> Self {
        self.secret_key = Some(SecretString::from(secret_key.into()));
        self
    }

    /// Credentials resolved from this configuration; missing halves become empty strings.
    pub(crate) fn credentials(&self) -> Credentials {
        Credentials::new(
            self.api_key.clone().unwrap_or_default(),
            self.secret_key
                .as_ref()
                .map(|s| s.expose_secret().to_owned())
                .unwrap_or_default(),
        )
    }

    /// `<api_url>/<service>`.
    pub(crate) fn endpoint(&self, service: &str) -> Result<Url> {
        Ok(self.api_url.join(service.trim_start_matches('/'))?)
    }
}

/// Guarantees a single trailing slash so that joining keeps the last path segment.
fn normalize(mut url: Url) -> Url {
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    url
}
