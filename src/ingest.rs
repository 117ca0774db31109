//! Turns a raw request body into a [`Payload`].
//!
//! A body is decoded as JSON only when the declared content type says it is
//! JSON (`application/json` or any `application/*+json`). Everything else, and
//! JSON that fails to parse, is handled by the active [`PayloadPolicy`].

use crate::error::{IngestError, Result};
use crate::types::{Payload, PayloadPolicy};
use tracing::warn;

/// True for `application/json` and `application/*+json`, ignoring parameters and case.
pub fn is_json_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

pub fn decode_body(
    content_type: Option<&str>,
    body: &[u8],
    policy: PayloadPolicy,
) -> Result<Payload> {
    let declared_json = content_type.is_some_and(is_json_content_type);

    if declared_json && !body.is_empty() {
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(value) => return Ok(Payload::Json(value)),
            Err(e) => {
                warn!(error = %e, "Body declared as JSON failed to parse");
                if policy == PayloadPolicy::Reject {
                    return Err(IngestError::InvalidPayload(format!(
                        "Request body is not valid JSON: {e}"
                    )));
                }
            }
        }
    }

    match policy {
        PayloadPolicy::AcceptAsText => {
            Ok(Payload::Text(String::from_utf8_lossy(body).into_owned()))
        }
        PayloadPolicy::Reject if body.is_empty() => Err(IngestError::InvalidPayload(
            "Missing JSON body.".to_string(),
        )),
        PayloadPolicy::Reject => Err(IngestError::InvalidPayload(
            "Request body must be JSON (Content-Type: application/json).".to_string(),
        )),
    }
}
