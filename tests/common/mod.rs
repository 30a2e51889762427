#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use flow_client_sdk::error::Error;
use flow_client_sdk::{Client, Config, HttpRequest, HttpResponse, Result, Transport};
use hmac::{Hmac, Mac as _};
use reqwest::StatusCode;
use sha2::Sha256;

pub const API_KEY: &str = "k1";
pub const SECRET_KEY: &str = "s3cret";

#[derive(Clone, Debug)]
enum Reply {
    Respond(HttpResponse),
    Fail(String),
}

/// Transport stub that records every request and answers with a canned reply.
#[derive(Clone, Debug)]
pub struct RecordingTransport {
    calls: Arc<Mutex<Vec<HttpRequest>>>,
    reply: Reply,
}

impl RecordingTransport {
    pub fn respond(status: u16, body: &str) -> Self {
        let status = StatusCode::from_u16(status).expect("valid status");
        Self {
            calls: Arc::default(),
            reply: Reply::Respond(HttpResponse::new(status, body.as_bytes().to_vec())),
        }
    }

    pub fn fail(message: &str) -> Self {
        Self {
            calls: Arc::default(),
            reply: Reply::Fail(message.to_owned()),
        }
    }

    pub fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.calls.lock().expect("calls lock").push(request);
        match &self.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::Fail(message) => Err(Error::transport(message.clone())),
        }
    }
}

pub fn config() -> Config {
    Config::sandbox()
        .expect("sandbox url")
        .with_api_key(API_KEY)
        .with_secret_key(SECRET_KEY)
}

/// Client wired to `transport`; the returned transport handle shares its call log.
pub fn client_with(transport: &RecordingTransport) -> Client {
    Client::with_transport(config(), transport.clone())
}

pub fn hmac_hex(secret: &str, message: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("any key length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
