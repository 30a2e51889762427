use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::Value;

use crate::Result;
use crate::auth::Credentials;
use crate::config::Config;
use crate::error::Error;
use crate::params::Params;
use crate::serde_helpers;
use crate::transport::{HttpRequest, ReqwestTransport, Transport};
use crate::types::{
    ApiErrorBody, CreatePaymentRequest, PaymentCreated, PaymentStatus, RequestMethod,
    first_missing_field,
};

const PAYMENT_CREATE: &str = "payment/create";
const PAYMENT_GET_STATUS: &str = "payment/getStatus";

/// Statuses whose body is handed back to the caller. 400 and 401 carry the gateway's
/// `{code, message}` error document.
const ACCEPTED_STATUSES: [StatusCode; 3] = [
    StatusCode::OK,
    StatusCode::BAD_REQUEST,
    StatusCode::UNAUTHORIZED,
];

/// Signing client for the Flow REST API.
///
/// Every call injects `apiKey`, signs the parameters and dispatches them to
/// `<api_url>/<service>`. Nothing is cached or retried.
#[derive(Clone, Debug)]
pub struct Client {
    config: Config,
    credentials: Credentials,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Creates a client using the credentials held by `config`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_transport(config, ReqwestTransport::default())
    }

    /// Creates a client with a custom HTTP client (timeouts, proxies, TLS settings).
    #[must_use]
    pub fn with_client(config: Config, client: reqwest::Client) -> Self {
        Self::with_transport(config, ReqwestTransport::new(client))
    }

    /// Creates a client dispatching through `transport`.
    #[must_use]
    pub fn with_transport<T: Transport + 'static>(config: Config, transport: T) -> Self {
        let credentials = config.credentials();
        Self {
            config,
            credentials,
            transport: Arc::new(transport),
        }
    }

    /// Creates a client whose keys override the ones in `config`.
    ///
    /// A `None` or empty override falls back to the configured value.
    #[must_use]
    pub fn with_keys(config: Config, api_key: Option<&str>, secret_key: Option<&str>) -> Self {
        Self::new(config).with_key_overrides(api_key, secret_key)
    }

    /// Overrides the configured keys of an already built client, e.g. one from
    /// [`Client::with_transport`].
    ///
    /// A `None` or empty override falls back to the value in the client's [`Config`].
    #[must_use]
    pub fn with_key_overrides(mut self, api_key: Option<&str>, secret_key: Option<&str>) -> Self {
        let fallback = self.config.credentials();
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .map_or(fallback.api_key, str::to_owned);
        let credentials = match secret_key.filter(|s| !s.is_empty()) {
            Some(secret_key) => Credentials::new(api_key, secret_key),
            None => Credentials {
                api_key,
                secret_key: fallback.secret_key,
            },
        };
        self.credentials = credentials;
        self
    }

    /// Replaces the credentials used by every subsequent call. Nothing is validated here.
    pub fn set_keys<K: Into<String>, S: Into<String>>(&mut self, api_key: K, secret_key: S) {
        self.credentials = Credentials::new(api_key, secret_key);
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Signs `params` and calls `service`, returning the decoded JSON body.
    ///
    /// Responses with status 200, 400 and 401 are decoded and returned as is; any other status
    /// fails with [`crate::error::Kind::Status`].
    pub async fn send(
        &self,
        service: &str,
        params: &Params,
        method: RequestMethod,
    ) -> Result<Value> {
        self.credentials.ensure_complete()?;

        let url = self.config.endpoint(service)?;
        let path = url.path().to_owned();
        let signed = self.credentials.sign_params(params)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(%method, %path, params = signed.len(), "dispatching gateway call");

        let response = self
            .transport
            .execute(HttpRequest::new(method, url, signed))
            .await
            .inspect_err(|_e| {
                #[cfg(feature = "tracing")]
                tracing::warn!(%method, %path, error = %_e, "gateway transport failed");
            })?;

        if !ACCEPTED_STATUSES.contains(&response.status) {
            let body = response.text();
            #[cfg(feature = "tracing")]
            tracing::warn!(
                status = %response.status,
                %method,
                %path,
                %body,
                "unexpected gateway status"
            );
            return Err(Error::status(
                response.status,
                method.as_reqwest(),
                path,
                body,
            ));
        }

        serde_json::from_slice::<Value>(&response.body).map_err(|e| {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                status = %response.status,
                %method,
                %path,
                error = %e,
                "gateway body is not JSON"
            );
            Error::from(e)
        })
    }

    /// Creates a payment order and returns where to redirect the payer.
    ///
    /// `commerceOrder`, `subject`, `amount`, `email`, `urlConfirmation` and `urlReturn` must be
    /// present and non-empty; the first one missing is reported before anything is sent.
    pub async fn payment_create(&self, params: &Params) -> Result<PaymentCreated> {
        if let Some(field) = first_missing_field(params) {
            return Err(Error::missing_field(field));
        }

        let response = self.send(PAYMENT_CREATE, params, RequestMethod::Post).await?;

        PaymentCreated::from_response(&response).map_err(|e| {
            match ApiErrorBody::detect(&response) {
                Some(api) => Error::validation(format!(
                    "response carries no url / token (gateway error {}: {})",
                    api.code, api.message
                )),
                None => e,
            }
        })
    }

    /// Typed variant of [`Client::payment_create`].
    pub async fn create_payment(&self, request: &CreatePaymentRequest) -> Result<PaymentCreated> {
        self.payment_create(&request.to_params()).await
    }

    /// Fetches the raw status document of the payment identified by `token`.
    pub async fn payment_get_status(&self, token: &str) -> Result<Value> {
        if token.is_empty() {
            return Err(Error::missing_field("token"));
        }

        let params = Params::new().with("token", token);
        self.send(PAYMENT_GET_STATUS, &params, RequestMethod::Get)
            .await
    }

    /// Typed variant of [`Client::payment_get_status`].
    ///
    /// A gateway error document fails with [`crate::error::Kind::Api`].
    pub async fn payment_status(&self, token: &str) -> Result<PaymentStatus> {
        let document = self.payment_get_status(token).await?;
        if let Some(api) = ApiErrorBody::detect(&document) {
            return Err(Error::api(api.code, api.message));
        }

        serde_helpers::from_value(document)
    }
}
