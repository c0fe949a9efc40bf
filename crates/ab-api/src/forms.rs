//! Request schemas. Every body route accepts JSON or a url-encoded form.
//!
//! Fields default to empty so that missing input reaches the core's
//! validation and comes back as a `ValidationError` with a useful message.

use ab_core::AppError;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct NewThreadForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub delete_password: String,
}

#[derive(Debug, Deserialize)]
pub struct NewReplyForm {
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub delete_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ThreadTarget {
    #[serde(default, alias = "report_id")]
    pub thread_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteThreadForm {
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub delete_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ReplyTarget {
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub reply_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteReplyForm {
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub reply_id: String,
    #[serde(default)]
    pub delete_password: String,
}

/// `?thread_id=` on `GET /api/replies/{board}`.
#[derive(Debug, Deserialize)]
pub struct ThreadQuery {
    #[serde(default)]
    pub thread_id: String,
}

/// An id that does not parse cannot name a stored record, so it is reported
/// as not found rather than as malformed.
pub fn parse_id(kind: &'static str, raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::NotFound(kind, raw.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_id_is_not_found() {
        let err = parse_id("thread", "5f1b2c").unwrap_err();
        assert!(matches!(err, AppError::NotFound("thread", raw) if raw == "5f1b2c"));
    }

    #[test]
    fn report_id_is_accepted_for_thread_id() {
        let target: ThreadTarget = serde_json::from_str(r#"{"report_id":"abc"}"#).unwrap();
        assert_eq!(target.thread_id, "abc");
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let form: NewThreadForm = serde_json::from_str("{}").unwrap();
        assert!(form.text.is_empty());
        assert!(form.delete_password.is_empty());
    }
}
