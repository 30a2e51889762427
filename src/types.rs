use std::convert::Infallible;
use std::str::FromStr;

use bon::Builder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};
use strum_macros::Display;

use crate::Result;
use crate::error::Error;
use crate::params::Params;

/// HTTP method used to reach a service.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum RequestMethod {
    #[default]
    Get,
    Post,
}

impl RequestMethod {
    /// Parses a method name. `GET` (any case) is a GET; anything else is a POST.
    #[must_use]
    pub fn parse(value: &str) -> RequestMethod {
        if value.trim().eq_ignore_ascii_case("GET") {
            RequestMethod::Get
        } else {
            RequestMethod::Post
        }
    }

    #[must_use]
    pub const fn as_reqwest(self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
        }
    }
}

impl FromStr for RequestMethod {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(RequestMethod::parse(s))
    }
}

/// Fields `payment/create` refuses to run without, in the order they are checked.
pub const PAYMENT_CREATE_REQUIRED: [&str; 6] = [
    "commerceOrder",
    "subject",
    "amount",
    "email",
    "urlConfirmation",
    "urlReturn",
];

/// Typed input for `payment/create`.
#[non_exhaustive]
#[derive(Clone, Debug, Builder)]
pub struct CreatePaymentRequest {
    /// Merchant side order id.
    #[builder(into)]
    pub commerce_order: String,
    #[builder(into)]
    pub subject: String,
    pub amount: Decimal,
    /// Payer email.
    #[builder(into)]
    pub email: String,
    /// Callback the gateway POSTs the token to once the payment settles.
    #[builder(into)]
    pub url_confirmation: String,
    /// Where the payer is sent after paying.
    #[builder(into)]
    pub url_return: String,
    /// Defaults to CLP on the gateway side.
    #[builder(into)]
    pub currency: Option<String>,
    /// Payment media id, 9 means all media.
    pub payment_method: Option<u32>,
    /// JSON object passed through to the status document.
    #[builder(into)]
    pub optional: Option<String>,
    /// Seconds until the payment order expires.
    pub timeout: Option<u32>,
    #[builder(into)]
    pub merchant_id: Option<String>,
    #[builder(into)]
    pub payment_currency: Option<String>,
}

impl CreatePaymentRequest {
    #[must_use]
    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params
            .insert("commerceOrder", &self.commerce_order)
            .insert("subject", &self.subject)
            .insert("amount", self.amount)
            .insert("email", &self.email)
            .insert("urlConfirmation", &self.url_confirmation)
            .insert("urlReturn", &self.url_return);

        if let Some(currency) = &self.currency {
            params.insert("currency", currency);
        }
        if let Some(payment_method) = self.payment_method {
            params.insert("paymentMethod", payment_method);
        }
        if let Some(optional) = &self.optional {
            params.insert("optional", optional);
        }
        if let Some(timeout) = self.timeout {
            params.insert("timeout", timeout);
        }
        if let Some(merchant_id) = &self.merchant_id {
            params.insert("merchantId", merchant_id);
        }
        if let Some(payment_currency) = &self.payment_currency {
            params.insert("payment_currency", payment_currency);
        }
        params
    }
}

impl From<&CreatePaymentRequest> for Params {
    fn from(request: &CreatePaymentRequest) -> Self {
        request.to_params()
    }
}

/// Returns the first required `payment/create` field that is missing, empty or `0`.
pub(crate) fn first_missing_field(params: &Params) -> Option<&'static str> {
    PAYMENT_CREATE_REQUIRED
        .into_iter()
        .find(|field| params.is_blank(field))
}

/// Outcome of `payment/create`: where to send the payer.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaymentCreated {
    pub url: String,
    pub token: String,
    /// `url?token=token`, ready to redirect the payer to.
    pub redirect: String,
    #[serde(rename = "flowOrder", skip_serializing_if = "Option::is_none")]
    pub flow_order: Option<i64>,
}

impl PaymentCreated {
    /// Extracts `url` and `token` from a `payment/create` response.
    pub(crate) fn from_response(response: &serde_json::Value) -> Result<Self> {
        let url = non_empty_str(response, "url");
        let token = non_empty_str(response, "token");
        let (Some(url), Some(token)) = (url, token) else {
            return Err(Error::validation("response carries no url / token"));
        };

        Ok(Self {
            redirect: format!("{url}?token={token}"),
            url: url.to_owned(),
            token: token.to_owned(),
            flow_order: response.get("flowOrder").and_then(serde_json::Value::as_i64),
        })
    }
}

fn non_empty_str<'v>(value: &'v serde_json::Value, key: &str) -> Option<&'v str> {
    value
        .get(key)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Gateway payment status code.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Display, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum PaymentState {
    Pending = 1,
    Paid = 2,
    Rejected = 3,
    Cancelled = 4,
}

/// Status document returned by `payment/getStatus`.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    pub flow_order: i64,
    pub commerce_order: String,
    /// `YYYY-MM-DD hh:mm:ss`, gateway local time.
    pub request_date: Option<String>,
    pub status: PaymentState,
    pub subject: Option<String>,
    pub currency: Option<String>,
    pub amount: Decimal,
    pub payer: Option<String>,
    pub optional: Option<serde_json::Value>,
    #[serde(rename = "pending_info")]
    pub pending_info: Option<PendingInfo>,
    pub payment_data: Option<PaymentData>,
    pub merchant_id: Option<String>,
}

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingInfo {
    pub media: Option<String>,
    pub date: Option<String>,
}

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentData {
    pub date: Option<String>,
    pub media: Option<String>,
    pub conversion_date: Option<String>,
    pub conversion_rate: Option<Decimal>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub fee: Option<Decimal>,
    pub balance: Option<Decimal>,
    pub transfer_date: Option<String>,
}

/// `{code, message}` document the gateway answers with on 400 and 401.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub code: i64,
    pub message: String,
}

impl ApiErrorBody {
    pub(crate) fn detect(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        if !(object.contains_key("code") && object.contains_key("message")) {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}
