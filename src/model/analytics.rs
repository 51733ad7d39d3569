//! Learning analytics and insights

use serde::{Deserialize, Serialize};

/// Aggregate statistics. Every field is optional so a partial payload
/// only updates what it carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    #[serde(default)]
    pub current_streak: Option<u32>,
    /// Minutes
    #[serde(default)]
    pub total_time_spent: Option<f64>,
    #[serde(default)]
    pub average_comprehension: Option<f64>,
    #[serde(default)]
    pub total_steps_completed: Option<u32>,
}

impl OverallStats {
    /// Overwrite the fields `update` carries, keep the rest
    pub fn merge(&mut self, update: &OverallStats) {
        if update.current_streak.is_some() {
            self.current_streak = update.current_streak;
        }
        if update.total_time_spent.is_some() {
            self.total_time_spent = update.total_time_spent;
        }
        if update.average_comprehension.is_some() {
            self.average_comprehension = update.average_comprehension;
        }
        if update.total_steps_completed.is_some() {
            self.total_steps_completed = update.total_steps_completed;
        }
    }
}

/// One day of the activity series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAnalytics {
    /// ISO date, e.g. `2024-05-01`
    pub date: String,
    #[serde(default)]
    pub time_spent: Option<f64>,
    #[serde(default)]
    pub steps_completed: Option<u32>,
    #[serde(default)]
    pub average_comprehension: Option<f64>,
}

/// `GET /analytics/{id}` body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    #[serde(default)]
    pub overall_stats: OverallStats,
    #[serde(default)]
    pub daily_analytics: Vec<DailyAnalytics>,
}

impl AnalyticsSnapshot {
    /// Fold a newer snapshot into this one.
    ///
    /// Stats present in `update` overwrite; absent stats keep their value.
    /// Daily entries are upserted by date and kept in date order.
    pub fn merge(&mut self, update: &AnalyticsSnapshot) {
        self.overall_stats.merge(&update.overall_stats);

        for day in &update.daily_analytics {
            match self.daily_analytics.iter_mut().find(|d| d.date == day.date) {
                Some(existing) => *existing = day.clone(),
                None => self.daily_analytics.push(day.clone()),
            }
        }
        self.daily_analytics.sort_by(|a, b| a.date.cmp(&b.date));
    }
}

/// A skill and its accumulated comprehension score, sent as `[name, score]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillScore(pub String, pub f64);

/// `GET /insights/{id}` body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    #[serde(default)]
    pub top_performing_skills: Vec<SkillScore>,
    /// Steps completed per week
    #[serde(default)]
    pub learning_velocity: Option<f64>,
    /// Average minutes per step
    #[serde(default)]
    pub avg_completion_time: Option<f64>,
    #[serde(default)]
    pub total_steps_completed: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_is_additive() {
        let mut state: AnalyticsSnapshot = serde_json::from_value(json!({
            "overall_stats": {"current_streak": 3, "total_time_spent": 120, "average_comprehension": 71.5},
            "daily_analytics": [
                {"date": "2024-05-02", "time_spent": 60},
                {"date": "2024-05-01", "time_spent": 60}
            ]
        }))
        .unwrap();
        state.merge(&AnalyticsSnapshot::default());

        let update: AnalyticsSnapshot = serde_json::from_value(json!({
            "overall_stats": {"current_streak": 4, "total_steps_completed": 5},
            "daily_analytics": [
                {"date": "2024-05-02", "time_spent": 90, "steps_completed": 2},
                {"date": "2024-05-03", "time_spent": 15}
            ]
        }))
        .unwrap();
        state.merge(&update);

        assert_eq!(state.overall_stats.current_streak, Some(4));
        assert_eq!(state.overall_stats.total_time_spent, Some(120.0));
        assert_eq!(state.overall_stats.average_comprehension, Some(71.5));
        assert_eq!(state.overall_stats.total_steps_completed, Some(5));

        let dates: Vec<&str> = state.daily_analytics.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-05-01", "2024-05-02", "2024-05-03"]);
        assert_eq!(state.daily_analytics[1].time_spent, Some(90.0));
    }

    #[test]
    fn test_insights_tuple_pairs() {
        let insights: Insights = serde_json::from_value(json!({
            "top_performing_skills": [["Python Programming", 255.0], ["SQL", 180]],
            "learning_velocity": 2.5
        }))
        .unwrap();

        assert_eq!(insights.top_performing_skills[0], SkillScore("Python Programming".into(), 255.0));
        assert_eq!(insights.top_performing_skills[1].1, 180.0);
        assert_eq!(insights.learning_velocity, Some(2.5));
        assert_eq!(insights.total_steps_completed, None);
    }
}
