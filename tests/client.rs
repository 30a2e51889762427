mod common;

use flow_client_sdk::error::{Kind, Status, Validation};
use flow_client_sdk::types::PAYMENT_CREATE_REQUIRED;
use flow_client_sdk::{Client, Config, CreatePaymentRequest, Params, PaymentState, RequestMethod};
use rust_decimal_macros::dec;
use serde_json::json;

use common::{API_KEY, RecordingTransport, SECRET_KEY, client_with, config, hmac_hex};

fn payment_params() -> Params {
    Params::new()
        .with("commerceOrder", "order-1")
        .with("subject", "Game console")
        .with("amount", 12_000_i64)
        .with("email", "payer@example.com")
        .with("urlConfirmation", "https://shop.example/confirm")
        .with("urlReturn", "https://shop.example/return")
}

fn validation_reason(err: &flow_client_sdk::Error) -> String {
    err.downcast_ref::<Validation>()
        .map(|v| v.reason.clone())
        .unwrap_or_default()
}

#[tokio::test]
async fn payment_create_rejects_each_missing_field_without_sending() {
    for field in PAYMENT_CREATE_REQUIRED {
        for empty in [false, true] {
            let transport = RecordingTransport::respond(200, "{}");
            let client = client_with(&transport);

            let mut params = payment_params();
            if empty {
                params.insert(field, "");
            } else {
                params.remove(field);
            }

            let err = client.payment_create(&params).await.unwrap_err();

            assert_eq!(err.kind(), Kind::Validation, "field {field}");
            assert!(
                validation_reason(&err).contains(field),
                "error should name {field}: {err}"
            );
            assert_eq!(transport.call_count(), 0, "no call for missing {field}");
        }
    }
}

#[tokio::test]
async fn payment_create_rejects_zero_amount_without_sending() {
    let transport = RecordingTransport::respond(200, "{}");
    let client = client_with(&transport);

    let zero_amounts = [
        payment_params().with("amount", "0"),
        payment_params().with("amount", 0_i64),
        payment_params().with("amount", dec!(0.00)),
    ];
    for params in zero_amounts {
        let err = client.payment_create(&params).await.unwrap_err();

        assert_eq!(err.kind(), Kind::Validation);
        assert!(
            validation_reason(&err).contains("amount"),
            "error should name amount: {err}"
        );
    }
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn payment_create_reports_first_missing_field_in_fixed_order() {
    let transport = RecordingTransport::respond(200, "{}");
    let client = client_with(&transport);

    let err = client
        .payment_create(&Params::new().with("email", "payer@example.com"))
        .await
        .unwrap_err();

    assert!(
        validation_reason(&err).contains("commerceOrder"),
        "commerceOrder is checked first: {err}"
    );
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn payment_create_end_to_end() -> anyhow::Result<()> {
    let transport =
        RecordingTransport::respond(200, r#"{"url": "https://pay.example/x", "token": "tok123"}"#);
    let client = client_with(&transport);

    let created = client.payment_create(&payment_params()).await?;

    assert_eq!(created.url, "https://pay.example/x");
    assert_eq!(created.token, "tok123");
    assert_eq!(created.redirect, "https://pay.example/x?token=tok123");

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.method, RequestMethod::Post);
    assert_eq!(call.url.as_str(), "https://sandbox.flow.cl/api/payment/create");
    assert_eq!(call.params.get("apiKey"), Some(API_KEY));
    assert_eq!(call.params.get("amount"), Some("12000"));
    Ok(())
}

#[tokio::test]
async fn payment_create_requires_url_and_token_in_response() {
    let transport = RecordingTransport::respond(400, r#"{"code": 108, "message": "Invalid amount"}"#);
    let client = client_with(&transport);

    let err = client.payment_create(&payment_params()).await.unwrap_err();

    assert_eq!(err.kind(), Kind::Validation);
    assert!(
        validation_reason(&err).contains("Invalid amount"),
        "gateway message is surfaced: {err}"
    );
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn create_payment_sends_typed_request() -> anyhow::Result<()> {
    let transport =
        RecordingTransport::respond(200, r#"{"url": "https://pay.example/x", "token": "t", "flowOrder": 7}"#);
    let client = client_with(&transport);
    let request = CreatePaymentRequest::builder()
        .commerce_order("order-2")
        .subject("Ticket")
        .amount(dec!(1990.50))
        .email("payer@example.com")
        .url_confirmation("https://shop.example/confirm")
        .url_return("https://shop.example/return")
        .currency("CLP")
        .build();

    let created = client.create_payment(&request).await?;

    assert_eq!(created.flow_order, Some(7));
    let calls = transport.calls();
    assert_eq!(calls[0].params.get("amount"), Some("1990.5"));
    assert_eq!(calls[0].params.get("currency"), Some("CLP"));
    Ok(())
}

#[tokio::test]
async fn signature_matches_fixed_vector() -> anyhow::Result<()> {
    let transport = RecordingTransport::respond(200, "{}");
    let client = client_with(&transport);

    client
        .send("any/service", &Params::new().with("foo", "bar"), RequestMethod::Get)
        .await?;

    let calls = transport.calls();
    let expected = hmac_hex(SECRET_KEY, "apiKeyk1foobar");
    assert_eq!(calls[0].params.get("s"), Some(expected.as_str()));
    Ok(())
}

#[tokio::test]
async fn signature_is_independent_of_insertion_order() -> anyhow::Result<()> {
    let transport = RecordingTransport::respond(200, "{}");
    let client = client_with(&transport);
    let forward = Params::new().with("a", "1").with("b", "2").with("c", "3");
    let backward = Params::new().with("c", "3").with("b", "2").with("a", "1");

    client.send("svc", &forward, RequestMethod::Post).await?;
    client.send("svc", &backward, RequestMethod::Post).await?;

    let calls = transport.calls();
    assert_eq!(calls[0].params.get("s"), calls[1].params.get("s"));
    Ok(())
}

#[tokio::test]
async fn caller_api_key_and_signature_are_replaced() -> anyhow::Result<()> {
    let transport = RecordingTransport::respond(200, "{}");
    let client = client_with(&transport);
    let params = Params::new()
        .with("foo", "bar")
        .with("apiKey", "intruder")
        .with("s", "forged");

    client.send("svc", &params, RequestMethod::Get).await?;

    let calls = transport.calls();
    assert_eq!(calls[0].params.get("apiKey"), Some(API_KEY));
    let expected = hmac_hex(SECRET_KEY, "apiKeyk1foobar");
    assert_eq!(calls[0].params.get("s"), Some(expected.as_str()));
    Ok(())
}

#[tokio::test]
async fn send_rejects_unexpected_status() {
    let transport = RecordingTransport::respond(500, "Internal Server Error");
    let client = client_with(&transport);

    let err = client
        .send("payment/getStatus", &Params::new().with("token", "t"), RequestMethod::Get)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Kind::Status);
    let status = err.downcast_ref::<Status>().expect("status source");
    assert_eq!(status.status_code.as_u16(), 500);
    assert_eq!(status.path, "/api/payment/getStatus");
}

#[tokio::test]
async fn send_accepts_400_and_401_bodies() -> anyhow::Result<()> {
    for code in [400, 401] {
        let transport = RecordingTransport::respond(code, r#"{"code": 1605, "message": "bad"}"#);
        let client = client_with(&transport);

        let body = client
            .send("payment/getStatus", &Params::new(), RequestMethod::Get)
            .await?;

        assert_eq!(body, json!({"code": 1605, "message": "bad"}), "status {code}");
    }
    Ok(())
}

#[tokio::test]
async fn send_flags_malformed_json() {
    let transport = RecordingTransport::respond(200, "<html>maintenance</html>");
    let client = client_with(&transport);

    let err = client
        .send("payment/getStatus", &Params::new(), RequestMethod::Get)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Kind::Decode);
}

#[tokio::test]
async fn send_propagates_transport_failure() {
    let transport = RecordingTransport::fail("connection refused");
    let client = client_with(&transport);

    let err = client
        .send("payment/getStatus", &Params::new(), RequestMethod::Get)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Kind::Transport);
    assert!(err.to_string().contains("connection refused"), "{err}");
}

#[tokio::test]
async fn missing_credentials_fail_before_sending() -> anyhow::Result<()> {
    let transport = RecordingTransport::respond(200, "{}");
    let client = Client::with_transport(Config::sandbox()?, transport.clone());

    let err = client
        .send("svc", &Params::new(), RequestMethod::Get)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), Kind::Validation);
    assert_eq!(transport.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn set_keys_applies_to_later_calls() -> anyhow::Result<()> {
    let transport = RecordingTransport::respond(200, "{}");
    let mut client = Client::with_transport(Config::sandbox()?, transport.clone());

    client.set_keys("k2", "other");
    client
        .send("svc", &Params::new().with("foo", "bar"), RequestMethod::Get)
        .await?;

    let calls = transport.calls();
    assert_eq!(calls[0].params.get("apiKey"), Some("k2"));
    let expected = hmac_hex("other", "apiKeyk2foobar");
    assert_eq!(calls[0].params.get("s"), Some(expected.as_str()));
    Ok(())
}

#[test]
fn with_keys_falls_back_per_field() {
    let client = Client::with_keys(config(), Some("override"), None);
    assert_eq!(client.credentials().api_key(), "override");

    let client = Client::with_keys(config(), Some(""), Some("new-secret"));
    assert_eq!(client.credentials().api_key(), API_KEY);
}

#[tokio::test]
async fn key_overrides_sign_with_the_resolved_secret() -> anyhow::Result<()> {
    let foo = Params::new().with("foo", "bar");

    let transport = RecordingTransport::respond(200, "{}");
    let client = Client::with_transport(config(), transport.clone())
        .with_key_overrides(Some("override"), None);
    client.send("svc", &foo, RequestMethod::Get).await?;

    let calls = transport.calls();
    assert_eq!(calls[0].params.get("apiKey"), Some("override"));
    let expected = hmac_hex(SECRET_KEY, "apiKeyoverridefoobar");
    assert_eq!(
        calls[0].params.get("s"),
        Some(expected.as_str()),
        "absent secret falls back to the configured one"
    );

    let transport = RecordingTransport::respond(200, "{}");
    let client = Client::with_transport(config(), transport.clone())
        .with_key_overrides(Some(""), Some("new-secret"));
    client.send("svc", &foo, RequestMethod::Get).await?;

    let calls = transport.calls();
    assert_eq!(calls[0].params.get("apiKey"), Some(API_KEY));
    let expected = hmac_hex("new-secret", "apiKeyk1foobar");
    assert_eq!(
        calls[0].params.get("s"),
        Some(expected.as_str()),
        "given secret is used for signing"
    );
    Ok(())
}

#[tokio::test]
async fn payment_get_status_rejects_empty_token() {
    let transport = RecordingTransport::respond(200, "{}");
    let client = client_with(&transport);

    let err = client.payment_get_status("").await.unwrap_err();

    assert_eq!(err.kind(), Kind::Validation);
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn payment_get_status_returns_raw_document() -> anyhow::Result<()> {
    let document = json!({"flowOrder": 1, "commerceOrder": "o", "status": 1, "amount": 500, "extra": true});
    let transport = RecordingTransport::respond(200, &document.to_string());
    let client = client_with(&transport);

    let status = client.payment_get_status("tok123").await?;

    assert_eq!(status, document);
    let calls = transport.calls();
    assert_eq!(calls[0].method, RequestMethod::Get);
    assert_eq!(calls[0].params.get("token"), Some("tok123"));
    Ok(())
}

#[tokio::test]
async fn payment_status_decodes_document() -> anyhow::Result<()> {
    let document = json!({"flowOrder": 1, "commerceOrder": "o", "status": 4, "amount": 500});
    let transport = RecordingTransport::respond(200, &document.to_string());
    let client = client_with(&transport);

    let status = client.payment_status("tok123").await?;

    assert_eq!(status.status, PaymentState::Cancelled);
    assert_eq!(status.amount, dec!(500));
    Ok(())
}

#[tokio::test]
async fn payment_status_surfaces_gateway_errors() {
    let transport = RecordingTransport::respond(401, r#"{"code": 105, "message": "No services available"}"#);
    let client = client_with(&transport);

    let err = client.payment_status("tok123").await.unwrap_err();

    assert_eq!(err.kind(), Kind::Api);
    let api = err
        .downcast_ref::<flow_client_sdk::error::ApiError>()
        .expect("api source");
    assert_eq!(api.code, 105);
}
