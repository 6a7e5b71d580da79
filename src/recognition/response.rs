//! # Recognition Responses
//!
//! Parsing of the endpoint's JSON envelope and classification of a raw
//! response into exactly one scan outcome.
//!
//! ## Wire Format
//!
//! ```json
//! { "ok": true,
//!   "items": [ { "name": "Felis catus", "name_ja": "ネコ", "confidence": 0.92 } ],
//!   "error": null }
//! ```
//!
//! ## Classification Order
//!
//! 1. Redirect status (301/302/303/307/308) → `LoginRequired`
//! 2. Body is not a JSON object envelope → `Rejected` (generic) for non-2xx,
//!    `MalformedResponse` for 2xx
//! 3. Non-2xx status or `ok == false` → `Rejected` with the server's `error`
//! 4. Otherwise → the items, in server order

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ScanError, ScanResult};

/// One recognized entity, read-only to the client.
///
/// `confidence` is a fraction in `[0, 1]` when present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassificationItem {
    pub name: String,
    pub localized_name: Option<String>,
    pub confidence: Option<f64>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

impl ClassificationItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_localized_name(mut self, localized: impl Into<String>) -> Self {
        self.localized_name = Some(localized.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_quantity(mut self, quantity: f64, unit: Option<&str>) -> Self {
        self.quantity = Some(quantity);
        self.unit = unit.map(str::to_string);
        self
    }

    /// Build an item from one raw `items[]` entry. Non-objects yield `None`.
    fn from_value(value: &Value) -> Option<Self> {
        let fields = value.as_object()?;
        Some(Self {
            name: lenient_text(fields.get("name")).unwrap_or_default(),
            localized_name: lenient_text(fields.get("name_ja")),
            confidence: lenient_number(fields.get("confidence")),
            quantity: lenient_number(fields.get("quantity")),
            unit: lenient_text(fields.get("unit")),
        })
    }
}

/// Numbers and numeric strings become `f64`; anything else is absent.
fn lenient_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

/// Strings (trimmed, non-empty) and numbers become text; anything else is absent.
fn lenient_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    items: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// The parsed JSON envelope returned by the recognition endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionResponse {
    pub ok: bool,
    pub items: Vec<ClassificationItem>,
    pub error: Option<String>,
}

impl RecognitionResponse {
    /// Parse a response body.
    ///
    /// # Errors
    ///
    /// `ScanError::MalformedResponse` if the body is not JSON, is not an
    /// object, has a non-boolean `ok`, or has a non-array `items`.
    pub fn parse(body: &[u8]) -> ScanResult<Self> {
        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Err(ScanError::malformed("response root is not an object"));
        }
        let envelope: Envelope = serde_json::from_value(value)?;

        let items = match envelope.items {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(entries)) => entries
                .iter()
                .filter_map(ClassificationItem::from_value)
                .collect(),
            Some(_) => return Err(ScanError::malformed("'items' is not an array")),
        };
        let error = match envelope.error {
            Some(Value::String(message)) => Some(message),
            _ => None,
        };

        Ok(Self {
            ok: envelope.ok,
            items,
            error,
        })
    }
}

/// Raw HTTP exchange result, before interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointResponse {
    pub status: u16,
    /// `Location` header, if any; only meaningful for redirects.
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl EndpointResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            location: None,
            body: body.into(),
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 301, 302, 303, 307 and 308; other 3xx codes carry no login redirect.
    pub fn is_redirect(&self) -> bool {
        matches!(self.status, 301 | 302 | 303 | 307 | 308)
    }
}

/// Interpret a raw response as either the recognized items or a scan error.
pub fn classify_response(response: &EndpointResponse) -> ScanResult<Vec<ClassificationItem>> {
    if response.is_redirect() {
        return Err(ScanError::login_required(
            response.status,
            response.location.clone(),
        ));
    }

    let parsed = match RecognitionResponse::parse(&response.body) {
        Ok(parsed) => parsed,
        Err(_) if !response.is_success() => {
            return Err(ScanError::rejected(Some(response.status), None));
        }
        Err(e) => return Err(e.with_operation("parse recognition response")),
    };

    if !response.is_success() || !parsed.ok {
        return Err(ScanError::rejected(Some(response.status), parsed.error));
    }

    Ok(parsed.items)
}
