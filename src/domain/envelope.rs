use crate::domain::radar::{Radar, Response};
use crate::error::{PayError, ResponseErrorCode, Result};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};

/// Business parameters supplied by the caller.
pub type Params = Map<String, Value>;

/// Insertion-ordered key/value collection.
///
/// Signing steps hash the fields in the order they were written, so the
/// order is part of the value. Overwriting an existing key keeps its original
/// position, and removing one keeps the others in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    entries: Vec<(String, Value)>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns the value rendered as a string, the way it goes over the wire.
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).map(value_to_string)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Writes every pair of `other` in order, overwriting existing keys.
    pub fn merge<I, K, V>(&mut self, other: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (key, value) in other {
            self.set(key, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Payload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Payload::new();
        payload.merge(iter);
        payload
    }
}

impl Serialize for Payload {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Renders a JSON scalar the way gateways expect it in form fields.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// What a pipeline run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Destination {
    /// The untouched transport response.
    Response(Response),
    /// A response already unpacked by a plugin.
    Collection(Payload),
}

impl Destination {
    pub fn as_response(&self) -> Option<&Response> {
        match self {
            Destination::Response(response) => Some(response),
            Destination::Collection(_) => None,
        }
    }

    pub fn as_collection(&self) -> Option<&Payload> {
        match self {
            Destination::Collection(collection) => Some(collection),
            Destination::Response(_) => None,
        }
    }
}

/// The mutable carrier threaded through one pipeline run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    params: Params,
    payload: Payload,
    radar: Option<Radar>,
    destination: Option<Destination>,
    destination_origin: Option<Response>,
}

impl Envelope {
    pub fn new(params: Params) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Looks up a parameter and renders it as a string.
    pub fn param_str(&self, key: &str) -> Option<String> {
        self.params.get(key).map(value_to_string)
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }

    pub fn set_payload(&mut self, payload: Payload) {
        self.payload = payload;
    }

    pub fn radar(&self) -> Option<&Radar> {
        self.radar.as_ref()
    }

    pub fn set_radar(&mut self, radar: Radar) {
        self.radar = Some(radar);
    }

    pub fn clear_radar(&mut self) -> Option<Radar> {
        self.radar.take()
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    pub fn destination_origin(&self) -> Option<&Response> {
        self.destination_origin.as_ref()
    }

    /// Sets the result of this run. A run has exactly one destination; a
    /// second call is a plugin bug and is rejected.
    pub fn set_destination(&mut self, destination: Destination) -> Result<()> {
        if self.destination.is_some() {
            return Err(PayError::invalid_response(
                ResponseErrorCode::DestinationAlreadySet,
                "a destination was already produced for this call",
            ));
        }
        if let Destination::Response(response) = &destination {
            self.destination_origin = Some(response.clone());
        }
        self.destination = Some(destination);
        Ok(())
    }

    /// Rewrites the existing destination in place, e.g. to unpack a raw
    /// response. Does nothing when no destination was produced.
    pub fn transform_destination<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(Destination) -> Result<Destination>,
    {
        if let Some(destination) = self.destination.take() {
            self.destination = Some(f(destination)?);
        }
        Ok(())
    }

    pub fn into_destination(self) -> Option<Destination> {
        self.destination
    }

    /// Snapshot for logs and lifecycle events.
    pub fn to_diagnostic(&self) -> Value {
        json!({
            "params": self.params,
            "payload": serde_json::to_value(&self.payload).unwrap_or(Value::Null),
            "radar": serde_json::to_value(&self.radar).unwrap_or(Value::Null),
            "destination": serde_json::to_value(&self.destination).unwrap_or(Value::Null),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::radar::Method;
    use url::Url;

    #[test]
    fn test_payload_keeps_insertion_order() {
        let mut payload = Payload::new();
        payload.set("b", "2");
        payload.set("a", "1");
        payload.set("c", 3);
        payload.set("b", "two");

        let keys: Vec<&str> = payload.keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(payload.get_str("b").as_deref(), Some("two"));
        assert_eq!(payload.get_str("c").as_deref(), Some("3"));
    }

    #[test]
    fn test_payload_remove() {
        let mut payload: Payload = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(payload.remove("a"), Some(Value::from("1")));
        assert_eq!(payload.remove("a"), None);
        assert_eq!(payload.len(), 1);
    }

    #[test]
    fn test_payload_serializes_in_order() {
        let payload: Payload = [("z", "1"), ("a", "2")].into_iter().collect();
        let json = serde_json::to_string(&payload).unwrap();
        assert_eq!(json, r#"{"z":"1","a":"2"}"#);
    }

    #[test]
    fn test_new_envelope_is_empty() {
        let envelope = Envelope::default();
        assert!(envelope.payload().is_empty());
        assert!(envelope.radar().is_none());
        assert!(envelope.destination().is_none());
    }

    #[test]
    fn test_destination_is_write_once() {
        let mut envelope = Envelope::default();
        envelope
            .set_destination(Destination::Response(Response::new(200, "ok")))
            .unwrap();

        let second = envelope.set_destination(Destination::Collection(Payload::new()));
        assert!(matches!(
            second,
            Err(PayError::InvalidResponse {
                code: ResponseErrorCode::DestinationAlreadySet,
                ..
            })
        ));
        assert!(envelope.destination().unwrap().as_response().is_some());
    }

    #[test]
    fn test_transform_destination_keeps_origin() {
        let mut envelope = Envelope::default();
        envelope
            .set_destination(Destination::Response(Response::new(200, "a=1")))
            .unwrap();

        envelope
            .transform_destination(|_| {
                Ok(Destination::Collection([("a", "1")].into_iter().collect()))
            })
            .unwrap();

        assert!(envelope.destination().unwrap().as_collection().is_some());
        assert_eq!(envelope.destination_origin().unwrap().body, "a=1");
    }

    #[test]
    fn test_diagnostic_never_fails() {
        let mut params = Params::new();
        params.insert("out_trade_no".to_string(), Value::from("T-1"));
        let mut envelope = Envelope::new(params);
        envelope.payload_mut().set("amount", "1.00");
        envelope.set_radar(Radar::new(
            Method::Post,
            Url::parse("https://gateway.example.com").unwrap(),
        ));

        let diagnostic = envelope.to_diagnostic();
        assert_eq!(diagnostic["params"]["out_trade_no"], "T-1");
        assert_eq!(diagnostic["payload"]["amount"], "1.00");
        assert_eq!(diagnostic["radar"]["method"], "POST");
        assert!(diagnostic["destination"].is_null());
    }

    #[test]
    fn test_diagnostic_keeps_payload_order() {
        let mut envelope = Envelope::default();
        for key in ["service", "amount", "charset", "body"] {
            envelope.payload_mut().set(key, "x");
        }

        let diagnostic = envelope.to_diagnostic();
        let keys: Vec<&str> = diagnostic["payload"]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["service", "amount", "charset", "body"]);
        assert_eq!(
            serde_json::to_string(envelope.payload()).unwrap(),
            r#"{"service":"x","amount":"x","charset":"x","body":"x"}"#
        );
    }
}
