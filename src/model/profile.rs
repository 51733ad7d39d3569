//! Learner profile and learning path steps

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use super::progress::{merge_progress, ProgressMap};
use crate::parse::parse_or_default;

/// Links attached to a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Resources {
    /// Named links, e.g. `primary`, `video_course`, `practice`
    Named(BTreeMap<String, String>),
    List(Vec<String>),
}

impl Default for Resources {
    fn default() -> Self {
        Resources::Named(BTreeMap::new())
    }
}

impl Resources {
    pub fn links(&self) -> Vec<(Option<&str>, &str)> {
        match self {
            Resources::Named(map) => map.iter().map(|(k, v)| (Some(k.as_str()), v.as_str())).collect(),
            Resources::List(list) => list.iter().map(|v| (None, v.as_str())).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Resources::Named(map) => map.is_empty(),
            Resources::List(list) => list.is_empty(),
        }
    }
}

/// Hands-on project suggested by a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub difficulty: Option<String>,
}

/// One unit of a learning path, identified by its position in the path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub title: String,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "objectives")]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub resources: Resources,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub skills_gained: Vec<String>,
}

impl Step {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            duration: None,
            description: String::new(),
            learning_objectives: Vec::new(),
            resources: Resources::default(),
            projects: Vec::new(),
            prerequisites: Vec::new(),
            skills_gained: Vec::new(),
        }
    }

    /// Builder method: add a skill gained by completing this step
    pub fn skill(mut self, skill: impl Into<String>) -> Self {
        self.skills_gained.push(skill.into());
        self
    }
}

/// Parse a learning path delivered as a JSON array or a JSON-encoded string.
/// Anything unparseable yields an empty path.
pub fn parse_learning_path(value: Option<&Value>) -> Vec<Step> {
    parse_or_default(value, "learning_path")
}

/// Read-only copy of the learner's profile, normalized at fetch time
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UserProfile {
    pub id: Option<String>,
    pub email: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub education: Option<String>,
    pub goal: Option<String>,
    pub learning_path: Vec<Step>,
    /// Basic and detailed progress merged
    pub progress: ProgressMap,
    /// Any other attributes the backend returns
    pub attributes: BTreeMap<String, Value>,
}

impl UserProfile {
    /// Normalize a `GET /user/{id}` body.
    ///
    /// Never fails: each field of uncertain shape falls back to its default.
    pub fn from_value(value: Value) -> Self {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                tracing::warn!(kind = %json_kind(&other), "User profile is not an object");
                Map::new()
            }
        };

        let learning_path = parse_learning_path(fields.remove("learning_path").as_ref());
        let basic: ProgressMap = parse_or_default(fields.remove("progress").as_ref(), "progress");
        let detailed: ProgressMap =
            parse_or_default(fields.remove("detailed_progress").as_ref(), "detailed_progress");

        let mut text = |key: &str| fields.remove(key).and_then(scalar_to_string);
        let id = text("id").or_else(|| text("user_id"));
        let email = text("email");
        let age = text("age");
        let gender = text("gender");
        let education = text("education");
        let goal = text("goal");

        Self {
            id,
            email,
            age,
            gender,
            education,
            goal,
            learning_path,
            progress: merge_progress(&basic, &detailed),
            attributes: fields.into_iter().collect(),
        }
    }

    pub fn step(&self, index: usize) -> Option<&Step> {
        self.learning_path.get(index)
    }

    /// Percentage of learning path steps completed, 0-100
    pub fn completion_percent(&self) -> f64 {
        if self.learning_path.is_empty() {
            return 0.0;
        }
        let done = (0..self.learning_path.len())
            .filter(|i| self.progress.is_completed(*i))
            .count();
        done as f64 / self.learning_path.len() as f64 * 100.0
    }
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_learning_path_string_and_array_agree() {
        let encoded = parse_learning_path(Some(&json!(r#"[{"title":"A"}]"#)));
        let native = parse_learning_path(Some(&json!([{"title": "A"}])));

        assert_eq!(encoded.len(), 1);
        assert_eq!(encoded, native);
        assert_eq!(encoded[0].title, "A");
        assert!(encoded[0].skills_gained.is_empty());
    }

    #[test]
    fn test_learning_path_missing_or_invalid_is_empty() {
        assert!(parse_learning_path(None).is_empty());
        assert!(parse_learning_path(Some(&json!("[{\"title\":"))).is_empty());
        assert!(parse_learning_path(Some(&json!(42))).is_empty());
    }

    #[test]
    fn test_step_fields() {
        let steps = parse_learning_path(Some(&json!([{
            "title": "Python Basics",
            "duration": "1 week",
            "learning_objectives": ["Understand syntax"],
            "resources": {"primary": "https://www.learnpython.org/"},
            "projects": [{"title": "Data Analysis Script", "difficulty": "beginner"}],
            "skills_gained": ["Python Programming", "File Handling"]
        }, {
            "title": "Git",
            "resources": ["https://git-scm.com/book"]
        }])));

        assert_eq!(steps[0].duration.as_deref(), Some("1 week"));
        assert_eq!(steps[0].resources.links(), vec![(Some("primary"), "https://www.learnpython.org/")]);
        assert_eq!(steps[0].projects[0].difficulty.as_deref(), Some("beginner"));
        assert_eq!(steps[0].skills_gained.len(), 2);
        assert_eq!(steps[1].resources.links(), vec![(None, "https://git-scm.com/book")]);
    }

    #[test]
    fn test_profile_normalization() {
        let profile = UserProfile::from_value(json!({
            "id": 7,
            "email": "ada@example.com",
            "age": 31,
            "goal": "Become a Data Scientist",
            "learning_path": r#"[{"title":"A"},{"title":"B"},{"title":"C"}]"#,
            "progress": "{\"0\": true, \"1\": false}",
            "detailed_progress": {"1": {"comprehension_score": 60}},
            "preferred_pace": "fast"
        }));

        assert_eq!(profile.id.as_deref(), Some("7"));
        assert_eq!(profile.age.as_deref(), Some("31"));
        assert_eq!(profile.learning_path.len(), 3);
        assert!(profile.progress.is_completed(0));
        assert!(profile.progress.is_completed(1));
        assert!(!profile.progress.is_completed(2));
        assert_eq!(profile.attributes.get("preferred_pace"), Some(&json!("fast")));
        assert!((profile.completion_percent() - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_profile_with_garbage_fields_still_loads() {
        let profile = UserProfile::from_value(json!({
            "learning_path": "not json",
            "progress": [1, 2, 3],
        }));
        assert!(profile.learning_path.is_empty());
        assert!(profile.progress.is_empty());
        assert_eq!(profile.completion_percent(), 0.0);
    }

    #[test]
    fn test_fractional_time_spent_counts_as_completed() {
        let profile = UserProfile::from_value(json!({
            "learning_path": [{"title": "A"}, {"title": "B"}, {"title": "C"}],
            "progress": {},
            "detailed_progress": {"2": {"completed": true, "comprehension_score": 80, "time_spent": 12.5}}
        }));
        assert!(profile.progress.is_completed(2));
        assert_eq!(profile.progress.get(2).unwrap().comprehension_score(), 80.0);
    }
}
