mod common;

use common::{SIGN_KEY, jsb_config};
use paypipe::domain::event::EventKind;
use paypipe::domain::radar::Response;
use paypipe::error::ResponseErrorCode;
use paypipe::infrastructure::in_memory::{InMemoryEventSink, InMemoryTransport};
use paypipe::infrastructure::jsb::{self, JsbGateway};
use paypipe::{Params, PayError, Payload, Provider};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use url::form_urlencoded;

fn provider(transport: Arc<InMemoryTransport>) -> (Provider<JsbGateway>, Arc<InMemoryEventSink>) {
    let gateway = JsbGateway::new(jsb_config("https://gateway.example.com/pay"));
    let registry = Arc::new(gateway.registry());
    let events = Arc::new(InMemoryEventSink::new());
    let provider = Provider::builder(gateway, registry)
        .transport(transport)
        .events(events.clone())
        .build();
    (provider, events)
}

/// Form body signed the way the gateway signs its answers.
fn signed_body(fields: &[(&str, &str)]) -> String {
    let payload: Payload = fields.iter().copied().collect();
    let signature = jsb::sign(&jsb::sign_content(&payload), SIGN_KEY).unwrap();

    let mut body = form_urlencoded::Serializer::new(String::new());
    for (key, value) in fields {
        body.append_pair(key, value);
    }
    body.append_pair("signType", jsb::SIGN_TYPE);
    body.append_pair("signData", &signature);
    body.finish()
}

fn scan_params() -> Params {
    [("outTradeNo", "T-100"), ("totalFee", "12.5"), ("_tenant", "a")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
        .collect()
}

#[test]
fn test_scan_round_trip() {
    let transport = Arc::new(InMemoryTransport::new());
    transport.push_response(Response::new(
        200,
        signed_body(&[
            ("respCode", "000000"),
            ("respMsg", "success"),
            ("payUrl", "https://qr.example.com/T-100"),
        ]),
    ));
    let (provider, events) = provider(transport.clone());

    let destination = provider.call(jsb::SCAN, scan_params()).unwrap().unwrap();

    let collection = destination.as_collection().unwrap();
    assert_eq!(
        collection.get_str("payUrl").as_deref(),
        Some("https://qr.example.com/T-100")
    );

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.as_str(), "https://gateway.example.com/pay");
    let sent: Vec<(String, String)> = form_urlencoded::parse(requests[0].body.as_bytes())
        .into_owned()
        .collect();
    let fields: HashMap<_, _> = sent.iter().cloned().collect();
    assert_eq!(sent[0].0, "partnerId");
    assert_eq!(fields["service"], "atPay");
    assert_eq!(Decimal::from_str(&fields["totalFee"]).unwrap(), dec!(12.50));
    assert!(!fields.contains_key("_tenant"));

    let signed: Payload = sent.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    assert_eq!(fields["signType"], jsb::SIGN_TYPE);
    assert!(jsb::verify(&jsb::sign_content(&signed), SIGN_KEY, &fields["signData"]).unwrap());

    assert_eq!(
        events.kinds(),
        vec![
            EventKind::MethodCalled,
            EventKind::PayStarted,
            EventKind::ApiRequesting,
            EventKind::ApiRequested,
            EventKind::PayFinished,
        ]
    );
}

#[test]
fn test_query_gets_common_plugins_merged() {
    let transport = Arc::new(InMemoryTransport::new());
    let (provider, _) = provider(transport);

    let plan = provider.plan(jsb::QUERY, &Params::new()).unwrap();

    assert_eq!(
        plan,
        vec![
            jsb::START,
            jsb::PAY_QUERY,
            jsb::ADD_PAYLOAD_SIGN,
            jsb::ADD_RADAR,
            jsb::VERIFY_SIGNATURE,
            jsb::RESPONSE,
            jsb::PARSER,
        ]
    );
}

#[test]
fn test_tampered_response_fails_signature_check() {
    let transport = Arc::new(InMemoryTransport::new());
    let body = signed_body(&[("respCode", "000000"), ("respMsg", "success")])
        .replace("success", "tampered");
    transport.push_response(Response::new(200, body));
    let (provider, events) = provider(transport);

    let result = provider.call(jsb::SCAN, scan_params());

    assert!(matches!(
        result,
        Err(PayError::InvalidResponse {
            code: ResponseErrorCode::ResponseSignature,
            ..
        })
    ));
    assert!(!events.kinds().contains(&EventKind::PayFinished));
}

#[test]
fn test_business_failure_carries_gateway_message() {
    let transport = Arc::new(InMemoryTransport::new());
    transport.push_response(Response::new(
        200,
        signed_body(&[("respCode", "100001"), ("respMsg", "duplicate order")]),
    ));
    let (provider, _) = provider(transport);

    match provider.call(jsb::SCAN, scan_params()) {
        Err(PayError::InvalidResponse { code, message }) => {
            assert_eq!(code, ResponseErrorCode::ResponseBusiness);
            assert_eq!(message, "[100001] duplicate order");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_http_error_status_is_reported() {
    let transport = Arc::new(InMemoryTransport::new());
    transport.push_response(Response::new(502, "bad gateway"));
    let (provider, _) = provider(transport);

    let result = provider.call(jsb::SCAN, scan_params());

    assert!(matches!(
        result,
        Err(PayError::InvalidResponse {
            code: ResponseErrorCode::ResponseStatus,
            ..
        })
    ));
}

#[test]
fn test_missing_business_param_stops_before_request() {
    let transport = Arc::new(InMemoryTransport::new());
    let (provider, _) = provider(transport.clone());

    let result = provider.call(jsb::REFUND, scan_params());

    assert!(matches!(result, Err(PayError::InvalidParams { .. })));
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn test_sub_cent_amount_is_never_sent() {
    let transport = Arc::new(InMemoryTransport::new());
    let (provider, _) = provider(transport.clone());
    let params: Params = [("outTradeNo", "T-1"), ("totalFee", "0.004")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), serde_json::Value::from(v)))
        .collect();

    let result = provider.call(jsb::SCAN, params);

    match result {
        Err(PayError::InvalidParams { message, .. }) => assert!(message.contains("totalFee")),
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(transport.request_count(), 0);
}
