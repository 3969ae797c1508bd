use super::{
    ADD_PAYLOAD_SIGN, ADD_RADAR, PARSER, PAY_QUERY, PAY_REFUND, PAY_SCAN, RESPONSE, START,
    SIGN_TYPE, VERIFY_SIGNATURE, sign, sign_content, verify,
};
use crate::config::JsbConfig;
use crate::domain::envelope::{Destination, Envelope, Payload, value_to_string};
use crate::domain::plugin::{Next, Plugin};
use crate::domain::radar::{Method, Radar};
use crate::error::{ParamsErrorCode, PayError, ResponseErrorCode, Result};
use chrono::Local;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use url::form_urlencoded;

const SUCCESS_CODE: &str = "000000";

fn require(envelope: &Envelope, key: &str) -> Result<String> {
    envelope
        .payload()
        .get_str(key)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            PayError::invalid_params(ParamsErrorCode::MissingParam, format!("[{key}] is required"))
        })
}

/// Parses an amount and renders it with two decimals, e.g. `"1"` → `"1.00"`.
/// Amounts finer than a cent are rejected rather than rounded.
fn normalize_amount(key: &str, raw: &str) -> Result<String> {
    let amount = Decimal::from_str(raw.trim())
        .ok()
        .map(|amount| amount.normalize())
        .filter(|amount| *amount > Decimal::ZERO && amount.scale() <= 2)
        .ok_or_else(|| {
            PayError::invalid_params(
                ParamsErrorCode::MissingParam,
                format!(
                    "[{key}] must be a positive amount with at most two decimals, got [{raw}]"
                ),
            )
        })?;

    Ok(format!("{amount:.2}"))
}

/// Seeds the payload with the merchant fields and the caller's business
/// params. Params whose key starts with `_` are options for the plugins and
/// never go over the wire.
pub struct StartPlugin {
    config: Arc<JsbConfig>,
}

impl StartPlugin {
    pub fn new(config: Arc<JsbConfig>) -> Self {
        Self { config }
    }
}

impl Plugin for StartPlugin {
    fn name(&self) -> &str {
        START
    }

    fn assembly(&self, mut envelope: Envelope, next: Next<'_>) -> Result<Envelope> {
        let now = Local::now();
        let business: Vec<(String, serde_json::Value)> = envelope
            .params()
            .iter()
            .filter(|(key, _)| !key.starts_with('_'))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let payload = envelope.payload_mut();
        payload.set("partnerId", self.config.partner_id.as_str());
        payload.set("publicKeyCode", self.config.public_key_code.as_str());
        payload.set("version", "v1.0.0");
        payload.set("charset", "utf-8");
        payload.set("msgId", uuid::Uuid::new_v4().simple().to_string());
        payload.set("createData", now.format("%Y%m%d").to_string());
        payload.set("createTime", now.format("%H%M%S").to_string());
        payload.merge(business);

        next(envelope)
    }
}

/// Scan-to-pay order creation.
pub struct ScanPayPlugin;

impl Plugin for ScanPayPlugin {
    fn name(&self) -> &str {
        PAY_SCAN
    }

    fn assembly(&self, mut envelope: Envelope, next: Next<'_>) -> Result<Envelope> {
        require(&envelope, "outTradeNo")?;
        let total_fee = normalize_amount("totalFee", &require(&envelope, "totalFee")?)?;

        let payload = envelope.payload_mut();
        payload.set("service", "atPay");
        payload.set("totalFee", total_fee);

        next(envelope)
    }
}

/// Order status lookup.
pub struct QueryPlugin;

impl Plugin for QueryPlugin {
    fn name(&self) -> &str {
        PAY_QUERY
    }

    fn assembly(&self, mut envelope: Envelope, next: Next<'_>) -> Result<Envelope> {
        require(&envelope, "outTradeNo")?;
        envelope.payload_mut().set("service", "payCheck");

        next(envelope)
    }
}

/// Full or partial refund of a paid order.
pub struct RefundPlugin;

impl Plugin for RefundPlugin {
    fn name(&self) -> &str {
        PAY_REFUND
    }

    fn assembly(&self, mut envelope: Envelope, next: Next<'_>) -> Result<Envelope> {
        require(&envelope, "outTradeNo")?;
        require(&envelope, "outRefundNo")?;
        let refund_amt = normalize_amount("refundAmt", &require(&envelope, "refundAmt")?)?;

        let payload = envelope.payload_mut();
        payload.set("service", "payRefund");
        payload.set("refundAmt", refund_amt);

        next(envelope)
    }
}

pub struct AddPayloadSignPlugin {
    config: Arc<JsbConfig>,
}

impl AddPayloadSignPlugin {
    pub fn new(config: Arc<JsbConfig>) -> Self {
        Self { config }
    }
}

impl Plugin for AddPayloadSignPlugin {
    fn name(&self) -> &str {
        ADD_PAYLOAD_SIGN
    }

    fn assembly(&self, mut envelope: Envelope, next: Next<'_>) -> Result<Envelope> {
        let signature = sign(&sign_content(envelope.payload()), &self.config.sign_key)?;

        let payload = envelope.payload_mut();
        payload.set("signType", SIGN_TYPE);
        payload.set("signData", signature);

        next(envelope)
    }
}

pub struct AddRadarPlugin {
    config: Arc<JsbConfig>,
}

impl AddRadarPlugin {
    pub fn new(config: Arc<JsbConfig>) -> Self {
        Self { config }
    }
}

impl Plugin for AddRadarPlugin {
    fn name(&self) -> &str {
        ADD_RADAR
    }

    fn assembly(&self, mut envelope: Envelope, next: Next<'_>) -> Result<Envelope> {
        let mut body = form_urlencoded::Serializer::new(String::new());
        for (key, value) in envelope.payload().iter() {
            body.append_pair(key, &value_to_string(value));
        }

        let radar = Radar::new(Method::Post, self.config.endpoint.clone())
            .header("Content-Type", "application/x-www-form-urlencoded;charset=utf-8")
            .body(body.finish());
        envelope.set_radar(radar);

        next(envelope)
    }
}

/// Checks the signature of the unpacked response.
pub struct VerifySignaturePlugin {
    config: Arc<JsbConfig>,
}

impl VerifySignaturePlugin {
    pub fn new(config: Arc<JsbConfig>) -> Self {
        Self { config }
    }
}

impl Plugin for VerifySignaturePlugin {
    fn name(&self) -> &str {
        VERIFY_SIGNATURE
    }

    fn assembly(&self, envelope: Envelope, next: Next<'_>) -> Result<Envelope> {
        let envelope = next(envelope)?;

        let Some(collection) = envelope.destination().and_then(Destination::as_collection) else {
            return Ok(envelope);
        };

        let received = collection.get_str("signData").unwrap_or_default();
        if !verify(&sign_content(collection), &self.config.sign_key, &received)? {
            return Err(PayError::invalid_response(
                ResponseErrorCode::ResponseSignature,
                format!("signature [{received}] does not match the response content"),
            ));
        }

        Ok(envelope)
    }
}

/// Rejects non-2xx answers and business failures reported in `respCode`.
pub struct ResponsePlugin;

impl Plugin for ResponsePlugin {
    fn name(&self) -> &str {
        RESPONSE
    }

    fn assembly(&self, envelope: Envelope, next: Next<'_>) -> Result<Envelope> {
        let envelope = next(envelope)?;

        if let Some(origin) = envelope.destination_origin()
            && !origin.is_success()
        {
            return Err(PayError::invalid_response(
                ResponseErrorCode::ResponseStatus,
                format!("gateway answered HTTP {}: {}", origin.status, origin.body),
            ));
        }

        if let Some(collection) = envelope.destination().and_then(Destination::as_collection) {
            let code = collection.get_str("respCode").unwrap_or_default();
            if code != SUCCESS_CODE {
                let message = collection.get_str("respMsg").unwrap_or_default();
                return Err(PayError::invalid_response(
                    ResponseErrorCode::ResponseBusiness,
                    format!("[{code}] {message}"),
                ));
            }
        }

        Ok(envelope)
    }
}

/// Unpacks a successful form-encoded response into a collection.
pub struct ParserPlugin;

impl Plugin for ParserPlugin {
    fn name(&self) -> &str {
        PARSER
    }

    fn assembly(&self, envelope: Envelope, next: Next<'_>) -> Result<Envelope> {
        let mut envelope = next(envelope)?;

        if envelope
            .destination_origin()
            .is_some_and(|origin| !origin.is_success())
        {
            return Ok(envelope);
        }

        envelope.transform_destination(|destination| match destination {
            Destination::Response(response) => {
                if !response.body.contains('=') {
                    return Err(PayError::invalid_response(
                        ResponseErrorCode::ResponseParse,
                        format!("response body is not form-encoded: [{}]", response.body),
                    ));
                }
                let collection: Payload = form_urlencoded::parse(response.body.trim().as_bytes())
                    .map(|(key, value)| (key.into_owned(), value.into_owned()))
                    .collect();
                Ok(Destination::Collection(collection))
            }
            collection => Ok(collection),
        })?;

        Ok(envelope)
    }
}
