//! Demo routes, one per kind of accessor.

use axum::{response::Result, Json};
use http::StatusCode;
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::backend::inputs::RequestInputs;
use crate::sanitize::{ConfigError, FieldErrors, FieldMap, Map, Value};

pub const CONFIG_ERROR: &str = "Sanitizer misconfigured";
pub const INVALID_JSON: &str = "Body is not a JSON object or array";

/// Three upper-case letters, e.g. a currency code
static CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("Failed to compile code regex"));

static SIGNUP_FIELDS: Lazy<FieldMap> = Lazy::new(|| {
    FieldMap::new()
        .field("user_id", "i")
        .field("email", "email")
        .field("password", "str")
        .field("website", ("url", "http"))
        .field("phone", "tel")
        .field("newsletter", "bool")
});

#[derive(Serialize, Debug)]
pub struct ItemView {
    pub id: Value,
    pub page: Value,
    pub tags: Value,
    pub sort: Value,
    pub agent: Value,
}

#[derive(Serialize, Debug)]
pub struct SearchView {
    pub price: Value,
    pub code: Value,
    pub contact: Value,
}

fn config_failure(error: ConfigError) -> (StatusCode, &'static str) {
    warn!("Configuration error while sanitizing: {}", error);
    (StatusCode::INTERNAL_SERVER_ERROR, CONFIG_ERROR)
}

fn invalid_fields(errors: &FieldErrors) -> (StatusCode, String) {
    let fields: Vec<&str> = errors.fields().collect();
    (StatusCode::BAD_REQUEST, format!("Invalid fields: {}", fields.join(", ")))
}

/// Path, query and header accessors
pub async fn show_item(inputs: RequestInputs) -> Result<Json<ItemView>> {
    let query = inputs.query();

    Ok(Json(ItemView {
        id: inputs.params().int("id").map_err(config_failure)?,
        page: query.int("page").map_err(config_failure)?,
        tags: query.array("tag", None, "str").map_err(config_failure)?,
        sort: query.one_of("sort", ["asc", "desc"]).map_err(config_failure)?,
        agent: inputs.headers().string("user-agent").map_err(config_failure)?,
    }))
}

/// Float precision, pattern and email accessors on the query
pub async fn search(inputs: RequestInputs) -> Result<Json<SearchView>> {
    let query = inputs.query();

    Ok(Json(SearchView {
        price: query.float("price", Some(2)).map_err(config_failure)?,
        code: query.pattern("code", &CODE_PATTERN).map_err(config_failure)?,
        contact: query.email("contact").map_err(config_failure)?,
    }))
}

/// The object validator over the body; any flagged field rejects the request
pub async fn signup(inputs: RequestInputs) -> Result<Json<Value>> {
    let mut errors = FieldErrors::new();
    let user: Map = inputs
        .body_object(&SIGNUP_FIELDS, Some(&mut errors))
        .map_err(config_failure)?;

    if !errors.is_empty() {
        return Err(invalid_fields(&errors).into());
    }

    info!("Accepted signup with {} fields", user.len());
    Ok(Json(Value::Object(user)))
}

/// The whole body as a JSON document
pub async fn echo_json(inputs: RequestInputs) -> Result<Json<Value>> {
    match inputs.body_json().map_err(config_failure)? {
        Value::Null => Err((StatusCode::BAD_REQUEST, INVALID_JSON).into()),
        json => Ok(Json(json)),
    }
}
