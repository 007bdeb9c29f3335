use std::collections::BTreeMap;

use serde::Serialize;

use crate::iso_timestamp::IsoTimestamp;

/// `GET /api/stats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub overview: Overview,
    pub category_stats: BTreeMap<String, BucketStats>,
    pub priority_stats: BTreeMap<String, BucketStats>,
    pub daily_trends: Vec<DailyTrend>,
    pub weekly_trends: Vec<WeeklyTrend>,
    pub insights: Insights,
    pub timestamp: IsoTimestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_tasks: u64,
    pub completed_tasks: u64,
    pub pending_tasks: u64,
    pub overdue_tasks: u64,
    pub today_tasks: u64,
    pub week_tasks: u64,
    pub completion_rate: f64,
}

/// Totals for one category or priority value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTrend {
    /// `YYYY-MM-DD`
    pub date: String,
    /// `Mon`..`Sun`
    pub day: String,
    pub created: u64,
    pub completed: u64,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTrend {
    pub week: String,
    pub start_date: String,
    pub created: u64,
    pub completed: u64,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub most_productive_category: Option<String>,
    pub least_productive_category: Option<String>,
    pub average_tasks_per_day: f64,
    pub streak: u32,
    pub productivity_score: f64,
}

/// `GET /api/analytics/productivity`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityResponse {
    pub weekly_trends: Vec<WeeklyTrend>,
    pub timestamp: IsoTimestamp,
}
