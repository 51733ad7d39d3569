//! Request/response bodies for the learning backend

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::model::{parse_learning_path, AnalyticsSnapshot, Step};
use crate::parse::parse_or_default;

/// `POST /login` and `POST /signup` body
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// `POST /login` and `POST /signup` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    /// Present only when authentication succeeded
    #[serde(default, deserialize_with = "opt_id")]
    pub user_id: Option<String>,
}

/// `POST /submit-user-data` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "lenient_learning_path")]
    pub learning_path: Vec<Step>,
}

/// `POST /update-progress/{id}` body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub step_index: usize,
    pub difficulty_rating: u8,
    pub comprehension_score: f64,
    pub notes: String,
    pub time_spent: u32,
}

/// `POST /update-progress/{id}` response
#[derive(Debug, Clone, Default)]
pub struct ProgressUpdateResponse {
    pub message: Option<String>,
    pub analytics: Option<AnalyticsSnapshot>,
}

impl ProgressUpdateResponse {
    /// Read a success body. The update is already accepted at this point, so
    /// an empty, non-JSON, or oddly shaped body only loses the extras.
    pub fn from_body(text: &str) -> Self {
        let body = match serde_json::from_str::<Value>(text) {
            Ok(body) => body,
            Err(e) => {
                if !text.trim().is_empty() {
                    tracing::warn!(error = %e, "Unreadable progress update response");
                }
                Value::Null
            }
        };

        Self {
            message: body.get("message").and_then(Value::as_str).map(str::to_string),
            analytics: parse_or_default(body.get("analytics"), "analytics"),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RecommendationsResponse {
    #[serde(default)]
    pub recommendations: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// User ids arrive as numbers or strings depending on the backend version
fn opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_learning_path<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Step>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(parse_learning_path(value.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_response_ids() {
        let numeric: AuthResponse =
            serde_json::from_value(json!({"message": "Login successful", "user_id": 12})).unwrap();
        assert_eq!(numeric.user_id.as_deref(), Some("12"));

        let failed: AuthResponse =
            serde_json::from_value(json!({"message": "Invalid credentials"})).unwrap();
        assert_eq!(failed.user_id, None);
    }

    #[test]
    fn test_submit_response_accepts_encoded_path() {
        let resp: SubmitResponse = serde_json::from_value(json!({
            "message": "User data submitted successfully",
            "learning_path": "[{\"title\": \"Python Basics\"}]"
        }))
        .unwrap();
        assert_eq!(resp.learning_path.len(), 1);

        let broken: SubmitResponse =
            serde_json::from_value(json!({"message": "ok", "learning_path": "{oops"})).unwrap();
        assert!(broken.learning_path.is_empty());
    }

    #[test]
    fn test_progress_update_body() {
        let body = ProgressUpdate {
            step_index: 2,
            difficulty_rating: 4,
            comprehension_score: 85.0,
            notes: "easy".to_string(),
            time_spent: 30,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"step_index": 2, "difficulty_rating": 4, "comprehension_score": 85.0,
                   "notes": "easy", "time_spent": 30})
        );
    }

    #[test]
    fn test_progress_update_response_is_lenient() {
        let full = ProgressUpdateResponse::from_body(
            r#"{"message": "Progress updated", "analytics": {"overall_stats": {"current_streak": 2}}}"#,
        );
        assert_eq!(full.message.as_deref(), Some("Progress updated"));
        assert_eq!(full.analytics.unwrap().overall_stats.current_streak, Some(2));

        let reshaped = ProgressUpdateResponse::from_body(
            r#"{"message": "ok", "analytics": {"daily_analytics": [{"day": "2024-05-01"}]}}"#,
        );
        assert_eq!(reshaped.message.as_deref(), Some("ok"));
        assert!(reshaped.analytics.is_none());

        let empty = ProgressUpdateResponse::from_body("");
        assert!(empty.message.is_none());
        assert!(empty.analytics.is_none());
    }
}
