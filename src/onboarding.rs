//! Onboarding questionnaire
//!
//! The form collected before a learning path is generated. The backend
//! rejects submissions missing any of the four core answers, so they are
//! checked locally first.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OnboardingForm {
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub education: String,
    /// Learning goal, e.g. "Become a Data Scientist"
    #[serde(default)]
    pub goal: String,
    /// Optional preference answers (pace, interests, ...)
    #[serde(flatten)]
    pub preferences: BTreeMap<String, Value>,
}

impl OnboardingForm {
    pub fn new(
        age: impl Into<String>,
        gender: impl Into<String>,
        education: impl Into<String>,
        goal: impl Into<String>,
    ) -> Self {
        Self {
            age: age.into(),
            gender: gender.into(),
            education: education.into(),
            goal: goal.into(),
            preferences: BTreeMap::new(),
        }
    }

    /// Builder method: add a preference answer
    pub fn preference(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.preferences.insert(key.into(), value.into());
        self
    }

    pub fn validate(&self) -> Result<(), OnboardingError> {
        let missing: Vec<&'static str> = [
            ("age", &self.age),
            ("gender", &self.gender),
            ("education", &self.education),
            ("goal", &self.goal),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(OnboardingError::MissingFields(missing))
        }
    }
}

/// `POST /submit-user-data` body: the form plus the owner
#[derive(Debug, Serialize)]
pub struct OnboardingSubmission<'a> {
    #[serde(flatten)]
    pub form: &'a OnboardingForm,
    pub user_id: &'a str,
}

#[derive(Error, Debug, PartialEq)]
pub enum OnboardingError {
    #[error("Missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}
