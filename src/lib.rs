//! Client SDK for the [Flow](https://www.flow.cl) payment gateway REST API.
//!
//! Every call is signed: the parameters (including the injected `apiKey`) are concatenated as
//! `key` + `value` in ascending key order and signed with HMAC-SHA256 using the secret key.
//! The lowercase hex digest travels as the `s` parameter.
//!
//! ```no_run
//! use flow_client_sdk::{Client, Config, Params};
//!
//! # async fn run() -> flow_client_sdk::Result<()> {
//! let config = Config::sandbox()?
//!     .with_api_key("my-api-key")
//!     .with_secret_key("my-secret-key");
//! let client = Client::new(config);
//!
//! let params = Params::new()
//!     .with("commerceOrder", "order-1")
//!     .with("subject", "Game console")
//!     .with("amount", 12_000_i64)
//!     .with("email", "payer@example.com")
//!     .with("urlConfirmation", "https://shop.example/confirm")
//!     .with("urlReturn", "https://shop.example/return");
//! let created = client.payment_create(&params).await?;
//! println!("redirect the payer to {}", created.redirect);
//!
//! let status = client.payment_get_status(&created.token).await?;
//! println!("{status}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `tracing`: logs dispatched calls, unexpected statuses and undecodable bodies, and reports
//!   unknown fields in typed responses.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod params;
mod serde_helpers;
pub mod transport;
pub mod types;

pub use auth::Credentials;
pub use client::Client;
pub use config::{Config, PRODUCTION_API_URL, SANDBOX_API_URL};
pub use error::{Error, Kind};
pub use params::{ParamValue, Params};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use types::{
    CreatePaymentRequest, PaymentCreated, PaymentData, PaymentState, PaymentStatus, PendingInfo,
    RequestMethod,
};

pub type Result<T> = std::result::Result<T, Error>;
