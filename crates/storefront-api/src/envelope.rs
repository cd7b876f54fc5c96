// Response envelope normalization
//
// The backend wraps payloads inconsistently across endpoints and releases:
// `{ data: { <key>: ... } }`, `{ data: ... }`, or `{ <key>: ... }`. Every
// endpoint module funnels its body through one of these functions so a
// contract change is a one-place fix. Nothing here falls back to treating
// the whole body as the entity; an unknown shape is an error.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;

/// Extract the payload stored under `key`, trying each known envelope in order:
///
/// 1. `{ "data": { key: payload } }`
/// 2. `{ "data": payload }`
/// 3. `{ key: payload }`
///
/// The first shape that is present (and non-null) wins; if it does not
/// decode as `T`, or no shape is present, the result is
/// [`Error::UnexpectedShape`].
pub fn extract<T: DeserializeOwned>(body: &Value, key: &'static str) -> Result<T, Error> {
    let candidate = body
        .get("data")
        .and_then(|data| data.get(key))
        .filter(|v| !v.is_null())
        .or_else(|| body.get("data").filter(|v| !v.is_null()))
        .or_else(|| body.get(key).filter(|v| !v.is_null()));

    decode(candidate, key, body)
}

/// Extract a keyless payload (e.g. a paginated page): `{ "data": payload }`
/// first, then the body itself. `entity` names the payload in errors.
pub fn extract_root<T: DeserializeOwned>(body: &Value, entity: &'static str) -> Result<T, Error> {
    let candidate = body
        .get("data")
        .filter(|v| !v.is_null())
        .or(Some(body).filter(|v| v.is_object()));

    decode(candidate, entity, body)
}

/// Best human-readable message in an error body: `message`, then
/// `error` (string or `{ message }`). `None` when the body isn't JSON
/// or carries neither.
pub fn error_message(raw: &str) -> Option<String> {
    let body: Value = serde_json::from_str(raw).ok()?;
    let pick = |v: &Value| v.as_str().filter(|s| !s.trim().is_empty()).map(String::from);

    body.get("message")
        .and_then(pick)
        .or_else(|| body.get("error").and_then(pick))
        .or_else(|| {
            body.get("error")
                .and_then(|e| e.get("message"))
                .and_then(pick)
        })
}

fn decode<T: DeserializeOwned>(
    candidate: Option<&Value>,
    entity: &'static str,
    body: &Value,
) -> Result<T, Error> {
    let shape_error = || Error::UnexpectedShape {
        entity,
        body: body.to_string(),
    };
    let value = candidate.ok_or_else(shape_error)?;
    T::deserialize(value).map_err(|e| {
        tracing::debug!(entity, error = %e, "payload did not decode");
        shape_error()
    })
}
