//! # Learnpath
//!
//! Client for the learning path backend. Assembles the learner dashboard
//! from several REST sources into one consistent view model.
//!
//! ## Features
//!
//! - **Concurrent loading**: profile, analytics, recommendations and insights
//!   are fetched together; only the profile is required
//! - **Progress merging**: basic and detailed progress reconciled into one map
//! - **Skill levels**: 2-5 star levels derived from comprehension scores
//! - **Recommendations**: split into next-step, review and skill-booster sections
//! - **Step completion**: optimistic local update after the server accepts it
//!
//! ## Modules
//!
//! - [`client`]: REST client for the backend
//! - [`model`]: typed data model and the progress merger
//! - [`dashboard`]: fetcher, view state, skills, view model
//! - [`session`]: persisted login state
//! - [`onboarding`]: onboarding questionnaire
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use learnpath::{ApiClient, Dashboard};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::with_base_url("http://localhost:5000")?;
//!     let mut dashboard = Dashboard::new(client, "42");
//!
//!     dashboard.load().await?;
//!
//!     let view = dashboard.view();
//!     println!("{}/{} steps completed", view.completed_steps, view.total_steps());
//!     for skill in &view.skills {
//!         println!("{}: {} stars", skill.skill, skill.level);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod dashboard;
pub mod model;
pub mod onboarding;
pub mod parse;
pub mod session;
pub mod telemetry;

pub use client::{
    ApiClient, AuthResponse, ClientError, ClientResult, Credentials, LearningApi, ProgressUpdate,
    ProgressUpdateResponse, SubmitResponse,
};

pub use config::{
    generate_default_config, ApiConfig, Config, ConfigError, DashboardConfig, Environment,
    LoggingConfig, RecommendationsEndpoint, SessionConfig,
};

pub use dashboard::{
    aggregate_skills, level_for_score, AssessmentInput, Dashboard, DashboardError,
    DashboardFetcher, DashboardResult, DashboardSnapshot, DashboardState, DashboardView,
    LoadPhase, SkillLevel, SkillPolicy, SkillReport, SourceUpdate, StepView,
};

pub use model::{
    classify, merge_progress, parse_learning_path, AnalyticsSnapshot, DetailedProgress, Insights,
    ProgressEntry, ProgressMap, Recommendation, RecommendationBuckets, Step, UserProfile,
};

pub use onboarding::{OnboardingError, OnboardingForm};

pub use session::{Session, SessionError, SessionStore};
