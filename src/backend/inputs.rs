//! Request extractor exposing typed accessors over the four input buckets.
//!
//! Every accessor reads the raw value of one field and hands it to the
//! engine; nothing here validates on its own. Repeated header and query
//! keys are collected into an array.

use std::collections::btree_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::{header::CONTENT_TYPE, HeaderMap, StatusCode};
use log::{debug, warn};
use regex::Regex;

use crate::consts::MAX_BODY_BYTES;
use crate::sanitize::{
    default_sanitizer, ConfigError, FieldErrors, FieldMap, Map, Param, Sanitizer, TypeSpec, Value,
};

/// Largest body the extractor buffers, installed as a request extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimit(pub usize);

impl Default for BodyLimit {
    fn default() -> Self {
        BodyLimit(MAX_BODY_BYTES)
    }
}

/// Raw request input plus the engine used to sanitize it.
///
/// The engine is the `Arc<Sanitizer>` request extension when one is
/// installed, the [`default_sanitizer`] otherwise.
pub struct RequestInputs {
    sanitizer: Sanitizer,
    headers: Map,
    query: Map,
    body: Value,
    params: Map,
}

#[async_trait::async_trait]
impl<S> FromRequest<S> for RequestInputs
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let sanitizer = parts
            .extensions
            .get::<Arc<Sanitizer>>()
            .map(|engine| engine.as_ref().clone())
            .unwrap_or_else(|| default_sanitizer().clone());
        let limit = parts
            .extensions
            .get::<BodyLimit>()
            .copied()
            .unwrap_or_default();

        let path = Path::<HashMap<String, String>>::from_request_parts(&mut parts, state).await;
        let params = match path {
            Ok(Path(params)) => collect_pairs(params),
            Err(rejection) => {
                debug!("No usable path parameters: {}", rejection);
                Map::new()
            }
        };
        let headers = header_map(&parts.headers);
        let query = parts.uri.query().map(form_map).unwrap_or_default();

        let bytes = axum::body::to_bytes(body, limit.0).await.map_err(|_| {
            warn!("Rejected request body over {} bytes", limit.0);
            (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large".to_string())
        })?;
        let body = parse_body(&parts.headers, &bytes)?;

        Ok(RequestInputs {
            sanitizer,
            headers,
            query,
            body,
            params,
        })
    }
}

impl RequestInputs {
    /// Header names are lower-case
    pub fn headers(&self) -> BucketView<'_> {
        self.view(Some(&self.headers))
    }

    /// Query string parameters, percent-decoded
    pub fn query(&self) -> BucketView<'_> {
        self.view(Some(&self.query))
    }

    /// Fields of the body; empty unless the body is an object
    pub fn body(&self) -> BucketView<'_> {
        self.view(self.body.as_object())
    }

    /// Path parameters of the matched route; empty when they could not be
    /// decoded
    pub fn params(&self) -> BucketView<'_> {
        self.view(Some(&self.params))
    }

    /// The whole body through the `json` sanitizer
    pub fn body_json(&self) -> Result<Value, ConfigError> {
        self.sanitizer.value(self.body.clone(), &TypeSpec::named("json"))
    }

    /// The body's fields through the object validator
    pub fn body_object(
        &self,
        fields: &FieldMap,
        errors: Option<&mut FieldErrors>,
    ) -> Result<Map, ConfigError> {
        let empty = Map::new();
        let record = self.body.as_object().unwrap_or(&empty);
        self.sanitizer.object(record, fields, errors)
    }

    /// The engine behind every accessor
    pub fn sanitizer(&self) -> &Sanitizer {
        &self.sanitizer
    }

    fn view<'a>(&'a self, fields: Option<&'a Map>) -> BucketView<'a> {
        BucketView {
            sanitizer: &self.sanitizer,
            fields,
        }
    }
}

/// Typed accessors over one bucket
pub struct BucketView<'a> {
    sanitizer: &'a Sanitizer,
    fields: Option<&'a Map>,
}

impl BucketView<'_> {
    /// The unsanitized value, `Undefined` when absent
    pub fn raw(&self, name: &str) -> Value {
        self.fields
            .and_then(|fields| fields.get(name))
            .cloned()
            .unwrap_or_default()
    }

    /// The field as an integer, NaN when it has no leading digits
    pub fn int(&self, name: &str) -> Result<Value, ConfigError> {
        self.get(name, &TypeSpec::named("int"))
    }

    /// The field as a decimal number.
    ///
    /// # Arguments
    /// * `name` - The field to read
    /// * `precision` - Digits to round to; `None` keeps the parsed number
    ///
    /// # Returns
    /// * `Ok(Number)` with the parsed value, NaN if it is not numeric
    /// * `Ok(Null)` if `precision` is above the supported bound
    pub fn float(&self, name: &str, precision: Option<u32>) -> Result<Value, ConfigError> {
        let spec = match precision {
            Some(digits) => TypeSpec::with_arg("flo", digits),
            None => TypeSpec::named("flo"),
        };
        self.get(name, &spec)
    }

    /// The field when it is a well-formed email address, `Null` otherwise
    pub fn email(&self, name: &str) -> Result<Value, ConfigError> {
        self.get(name, &TypeSpec::named("email"))
    }

    /// The field stringified and trimmed
    pub fn string(&self, name: &str) -> Result<Value, ConfigError> {
        self.get(name, &TypeSpec::named("str"))
    }

    /// The field when `pattern` matches it, `Null` otherwise
    pub fn pattern(&self, name: &str, pattern: &Regex) -> Result<Value, ConfigError> {
        self.get(name, &TypeSpec::Pattern(pattern.clone()))
    }

    /// Every element of the field as `type_name`, forwarding `extra` as the
    /// sanitizer argument. A single value counts as a one-element array.
    pub fn array(
        &self,
        name: &str,
        extra: Option<Param>,
        type_name: &str,
    ) -> Result<Value, ConfigError> {
        let spec = match extra {
            Some(arg) => TypeSpec::with_arg(type_name, arg),
            None => TypeSpec::named(type_name),
        };
        self.sanitizer.array(self.raw(name), &spec)
    }

    /// The field when it equals one of `candidates`.
    ///
    /// # Arguments
    /// * `name` - The field to read
    /// * `candidates` - The accepted values, compared exactly
    ///
    /// # Returns
    /// * `Ok(value)` if the value is a candidate
    /// * `Ok(Null)` otherwise
    pub fn one_of<I, T>(&self, name: &str, candidates: I) -> Result<Value, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        let candidates: Vec<Value> = candidates.into_iter().map(Into::into).collect();
        self.get(name, &TypeSpec::with_arg("oneOf", candidates))
    }

    fn get(&self, name: &str, spec: &TypeSpec) -> Result<Value, ConfigError> {
        self.sanitizer.value(self.raw(name), spec)
    }
}

/// Folds key/value pairs into a map, turning repeated keys into arrays
fn collect_pairs<I, K, V>(pairs: I) -> Map
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut map = Map::new();
    for (key, value) in pairs {
        let value = Value::String(value.into());
        match map.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::Array(items) => items.push(value),
                first => {
                    let previous = std::mem::take(first);
                    *first = Value::Array(vec![previous, value]);
                }
            },
        }
    }
    map
}

fn header_map(headers: &HeaderMap) -> Map {
    collect_pairs(headers.iter().filter_map(|(name, value)| {
        value
            .to_str()
            .ok()
            .map(|text| (name.as_str().to_string(), text.to_string()))
    }))
}

fn form_map(encoded: &str) -> Map {
    collect_pairs(url::form_urlencoded::parse(encoded.as_bytes()))
}

/// JSON and url-encoded forms become structured values; anything else is
/// kept as text. An empty body is an empty object.
fn parse_body(headers: &HeaderMap, bytes: &[u8]) -> Result<Value, (StatusCode, String)> {
    if bytes.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if content_type.starts_with("application/json") {
        let json: serde_json::Value = serde_json::from_slice(bytes).map_err(|e| {
            debug!("Malformed JSON body: {}", e);
            (StatusCode::BAD_REQUEST, "Malformed JSON body".to_string())
        })?;
        return Ok(Value::from(json));
    }

    if content_type.starts_with("application/x-www-form-urlencoded") {
        return Ok(Value::Object(collect_pairs(url::form_urlencoded::parse(bytes))));
    }

    Ok(Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
