//! HTTP dispatch.
//!
//! [`Transport`] is the seam between signing and the network. [`ReqwestTransport`] is the
//! default; tests and callers with their own HTTP stack can plug in anything else.

use std::fmt;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::Result;
use crate::params::Params;
use crate::types::RequestMethod;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A signed call, ready to go on the wire.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: RequestMethod,
    pub url: Url,
    /// Full parameter set, `apiKey` and `s` included.
    pub params: Params,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: RequestMethod, url: Url, params: Params) -> Self {
        Self {
            method,
            url,
            params,
        }
    }
}

/// Raw response: status plus undecoded body.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn new<B: Into<Vec<u8>>>(status: StatusCode, body: B) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body as text, invalid UTF-8 replaced.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Executes a signed request.
///
/// Implementations report connection level failures as [`crate::error::Kind::Transport`] and
/// must not interpret the status code.
#[async_trait]
pub trait Transport: fmt::Debug + Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// [`Transport`] backed by a [`reqwest::Client`].
///
/// GET puts every parameter in the query string. POST sends them as a form encoded body.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    fn build(&self, request: HttpRequest) -> Result<reqwest::RequestBuilder> {
        let builder = match request.method {
            RequestMethod::Get => self.client.get(request.url).query(&request.params),
            RequestMethod::Post => {
                let body = serde_html_form::to_string(&request.params)?;
                self.client
                    .post(request.url)
                    .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                    .body(body)
            }
        };
        Ok(builder)
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.build(request)?.send().await?;

        let status = response.status();
        let body = response.bytes().await?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
