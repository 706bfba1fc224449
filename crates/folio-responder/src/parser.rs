//! Structured suffix parsing
//!
//! The model is asked to end every reply with [`LEAD_MARKER`] followed by a
//! JSON object. That suffix is untrusted model output: anything missing or
//! malformed degrades to "no lead detected" and the visitor sees the whole
//! raw text. Nothing here ever fails the turn.

use folio_domain::LeadClaim;
use serde::Deserialize;
use tracing::{debug, warn};

/// Separator between the visible reply and the JSON payload
pub const LEAD_MARKER: &str = "<<<LEAD_DATA>>>";

/// Model output split into visible reply and lead claim
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    /// Text shown to the visitor
    pub reply_text: String,
    /// Claimed lead judgment; `LeadClaim::none()` when the suffix was unusable
    pub lead: LeadClaim,
    /// Whether a well-formed suffix was found
    pub suffix_found: bool,
}

#[derive(Deserialize)]
struct LeadPayload {
    #[serde(default)]
    lead_detected: bool,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    project_details: Option<String>,
    #[serde(default)]
    budget: Option<String>,
}

impl From<LeadPayload> for LeadClaim {
    fn from(payload: LeadPayload) -> Self {
        let confidence = payload
            .confidence
            .filter(|c| c.is_finite())
            .unwrap_or(if payload.lead_detected { 1.0 } else { 0.0 })
            .clamp(0.0, 1.0);

        LeadClaim {
            detected: payload.lead_detected,
            confidence,
            name: clean(payload.name),
            email: clean(payload.email),
            phone: clean(payload.phone),
            website: clean(payload.website),
            project_details: clean(payload.project_details),
            budget: clean(payload.budget),
        }
    }
}

/// Split raw model output into the visitor reply and the lead claim
pub fn parse_reply(raw: &str) -> ParsedReply {
    let Some(marker_at) = raw.rfind(LEAD_MARKER) else {
        debug!("Model reply has no lead suffix");
        return degraded(raw);
    };

    let visible = raw[..marker_at].trim();
    let payload = extract_json(&raw[marker_at + LEAD_MARKER.len()..]);

    let mut stream = serde_json::Deserializer::from_str(payload).into_iter::<LeadPayload>();
    match stream.next() {
        Some(Ok(payload)) => ParsedReply {
            reply_text: visible.to_string(),
            lead: payload.into(),
            suffix_found: true,
        },
        Some(Err(e)) => {
            warn!("Malformed lead suffix, treating as no lead: {}", e);
            degraded(raw)
        }
        None => {
            warn!("Empty lead suffix, treating as no lead");
            degraded(raw)
        }
    }
}

fn degraded(raw: &str) -> ParsedReply {
    ParsedReply {
        reply_text: raw.trim().to_string(),
        lead: LeadClaim::none(),
        suffix_found: false,
    }
}

/// Strip a markdown code fence around the payload, if any
fn extract_json(suffix: &str) -> &str {
    let trimmed = suffix.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the fence's language tag line
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().trim_end_matches("```").trim()
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}
