//! Learnpath data model
//!
//! Typed views of what the backend sends:
//!
//! - **profile**: learner profile and learning path steps
//! - **progress**: per-step completion records and the progress merger
//! - **recommendation**: tagged recommendations and their classifier
//! - **analytics**: aggregate stats, daily series, and insights
//!
//! Server data of uncertain shape is normalized into these types once, at
//! the fetch boundary.

pub mod analytics;
pub mod profile;
pub mod progress;
pub mod recommendation;

pub use analytics::{AnalyticsSnapshot, DailyAnalytics, Insights, OverallStats, SkillScore};
pub use profile::{parse_learning_path, Project, Resources, Step, UserProfile};
pub use progress::{merge_progress, DetailedProgress, ProgressEntry, ProgressMap};
pub use recommendation::{
    classify, parse_recommendations, NextStepContext, Recommendation, RecommendationBuckets,
    ReviewContext, SkillBoosterContext,
};
