//! Statistics over the task collection.
//!
//! Every figure is a `count` or `group_totals` call against the store; this
//! module only picks the time windows and turns counts into rates and
//! insights. Windows are computed from the injected clock in local naive time.

use std::{collections::BTreeMap, sync::Arc};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use crate::{
    clock::Clock,
    iso_timestamp::{IsoTimestamp, TimeRange},
    stats_response::{
        BucketStats, DailyTrend, Insights, Overview, ProductivityResponse, StatsResponse,
        WeeklyTrend,
    },
    task_store::{GroupField, StoreError, TaskFilter, TaskStore},
};

const TREND_DAYS: i64 = 7;
const TREND_WEEKS: i64 = 4;
const LAST_MICROSECOND_OF_DAY: i64 = 86_399_999_999;

#[derive(Debug, Error)]
#[error("failed to compute {metric}: {source}")]
pub struct AnalyticsError {
    pub metric: &'static str,
    #[source]
    pub source: StoreError,
}

#[derive(Clone)]
pub struct AnalyticsEngine {
    store: Arc<dyn TaskStore>,
    clock: Arc<dyn Clock>,
}

impl AnalyticsEngine {
    pub fn new(store: Arc<dyn TaskStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn count(&self, metric: &'static str, filter: TaskFilter) -> Result<u64, AnalyticsError> {
        self.store
            .count(&filter)
            .map_err(|source| AnalyticsError { metric, source })
    }

    fn buckets(
        &self,
        metric: &'static str,
        field: GroupField,
    ) -> Result<BTreeMap<String, BucketStats>, AnalyticsError> {
        let groups = self
            .store
            .group_totals(field)
            .map_err(|source| AnalyticsError { metric, source })?;
        Ok(groups
            .into_iter()
            .map(|group| {
                let stats = BucketStats {
                    total: group.total,
                    completed: group.completed,
                    pending: group.total.saturating_sub(group.completed),
                    completion_rate: round1(percentage(group.completed, group.total)),
                };
                (group.key, stats)
            })
            .collect())
    }

    pub fn stats(&self) -> Result<StatsResponse, AnalyticsError> {
        let now = self.clock.now();
        let today = now.date();

        let overview = self.overview(now)?;
        let category_stats = self.buckets("category breakdown", GroupField::Category)?;
        let priority_stats = self.buckets("priority breakdown", GroupField::Priority)?;
        let daily_trends = self.daily_trends(today)?;
        let weekly_trends = self.weekly_trends(today)?;

        let insights = Insights {
            most_productive_category: pick_category(&category_stats, |candidate, best| {
                candidate > best
            }),
            least_productive_category: pick_category(&category_stats, |candidate, best| {
                candidate < best
            }),
            average_tasks_per_day: round1(overview.total_tasks as f64 / TREND_DAYS as f64),
            streak: streak(&daily_trends),
            productivity_score: productivity_score(overview.completion_rate, overview.overdue_tasks),
        };

        Ok(StatsResponse {
            overview,
            category_stats,
            priority_stats,
            daily_trends,
            weekly_trends,
            insights,
            timestamp: IsoTimestamp::from_naive(now),
        })
    }

    pub fn productivity(&self) -> Result<ProductivityResponse, AnalyticsError> {
        let now = self.clock.now();
        Ok(ProductivityResponse {
            weekly_trends: self.weekly_trends(now.date())?,
            timestamp: IsoTimestamp::from_naive(now),
        })
    }

    fn overview(&self, now: NaiveDateTime) -> Result<Overview, AnalyticsError> {
        let today = now.date();
        let total = self.count("total tasks", TaskFilter::all())?;
        let completed = self.count("completed tasks", TaskFilter::all().completed(true))?;
        let overdue = self.count(
            "overdue tasks",
            TaskFilter::all().completed(false).due_within(TimeRange::before(now)),
        )?;
        let due_today = self.count("today's tasks", TaskFilter::all().due_within(day_window(today)))?;
        let due_this_week =
            self.count("this week's tasks", TaskFilter::all().due_within(week_window(today)))?;

        Ok(Overview {
            total_tasks: total,
            completed_tasks: completed,
            pending_tasks: total.saturating_sub(completed),
            overdue_tasks: overdue,
            today_tasks: due_today,
            week_tasks: due_this_week,
            completion_rate: round1(percentage(completed, total)),
        })
    }

    /// Tasks created on each of the last seven days, oldest first.
    fn daily_trends(&self, today: NaiveDate) -> Result<Vec<DailyTrend>, AnalyticsError> {
        (0..TREND_DAYS)
            .rev()
            .map(|days_ago| {
                let date = today - Duration::days(days_ago);
                let created_that_day = TaskFilter::all().created_within(day_window(date));
                let created = self.count("daily trend", created_that_day.clone())?;
                let completed = self.count("daily trend", created_that_day.completed(true))?;
                Ok::<_, AnalyticsError>(DailyTrend {
                    date: date.format("%Y-%m-%d").to_string(),
                    day: date.format("%a").to_string(),
                    created,
                    completed,
                    completion_rate: percentage(completed, created),
                })
            })
            .collect()
    }

    /// Tasks created in each of the last four Monday-aligned weeks, oldest
    /// first. The current week is "Week 4".
    fn weekly_trends(&self, today: NaiveDate) -> Result<Vec<WeeklyTrend>, AnalyticsError> {
        let this_monday = monday_of(today);
        (0..TREND_WEEKS)
            .map(|slot| {
                let weeks_ago = TREND_WEEKS - 1 - slot;
                let start = start_of_day(this_monday - Duration::weeks(weeks_ago));
                let end = start + Duration::days(6) + Duration::seconds(86_399);
                let created_that_week = TaskFilter::all().created_within(TimeRange::inclusive(start, end));

                let created = self.count("weekly trend", created_that_week.clone())?;
                let completed = self.count("weekly trend", created_that_week.completed(true))?;
                Ok::<_, AnalyticsError>(WeeklyTrend {
                    week: format!("Week {}", slot + 1),
                    start_date: start.format("%Y-%m-%d").to_string(),
                    created,
                    completed,
                    completion_rate: round1(percentage(completed, created)),
                })
            })
            .collect()
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn day_window(date: NaiveDate) -> TimeRange {
    let start = start_of_day(date);
    TimeRange::inclusive(start, start + Duration::microseconds(LAST_MICROSECOND_OF_DAY))
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Monday 00:00:00 through Sunday 23:59:59.999999 of the week holding `date`.
fn week_window(date: NaiveDate) -> TimeRange {
    let start = start_of_day(monday_of(date));
    let end = start + Duration::days(6) + Duration::microseconds(LAST_MICROSECOND_OF_DAY);
    TimeRange::inclusive(start, end)
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// One decimal place, exact halves to the even neighbour (12.25 -> 12.2).
fn round1(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

/// The category whose completed count wins under `better`. Ties keep the
/// earliest key.
fn pick_category(
    stats: &BTreeMap<String, BucketStats>,
    better: impl Fn(u64, u64) -> bool,
) -> Option<String> {
    let mut best: Option<(&String, u64)> = None;
    for (key, bucket) in stats {
        match best {
            Some((_, score)) if !better(bucket.completed, score) => {}
            _ => best = Some((key, bucket.completed)),
        }
    }
    best.map(|(key, _)| key.clone())
}

/// Consecutive days, ending today, with at least one completed task.
fn streak(daily: &[DailyTrend]) -> u32 {
    daily.iter().rev().take_while(|day| day.completed > 0).count() as u32
}

fn productivity_score(completion_rate: f64, overdue: u64) -> f64 {
    if overdue == 0 {
        round1(completion_rate + 10.0)
    } else {
        round1(completion_rate - 2.0 * overdue as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::FixedClock,
        data_context::DataContext,
        in_memory::InMemoryTaskStore,
        task::TaskDocument,
        task_category::TaskCategory,
        task_priority::TaskPriority,
        task_store::IndexField,
    };
    use rstest::rstest;
    use std::ops::RangeBounds;

    /// Wednesday 2025-01-08, noon.
    fn wednesday_noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 8).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn engine(store: Arc<dyn TaskStore>) -> AnalyticsEngine {
        AnalyticsEngine::new(store, Arc::new(FixedClock(wednesday_noon())))
    }

    fn add(
        store: &dyn TaskStore,
        created: &str,
        due: &str,
        category: TaskCategory,
        priority: TaskPriority,
        completed: bool,
    ) {
        store
            .insert_one(
                None,
                TaskDocument {
                    title: format!("task created {created}"),
                    due_date: IsoTimestamp::new(due),
                    priority,
                    category,
                    completed,
                    created_at: IsoTimestamp::new(created),
                    updated_at: Some(IsoTimestamp::new(created)),
                    user_id: None,
                    notification_id: None,
                },
            )
            .unwrap();
    }

    fn seed(store: &dyn TaskStore) {
        add(store, "2025-01-08T09:00:00", "2025-01-08T18:00:00", TaskCategory::Work, TaskPriority::High, true);
        add(store, "2025-01-07T10:00:00", "2025-01-07T10:00:00", TaskCategory::Personal, TaskPriority::Low, false);
        add(store, "2025-01-06T08:00:00", "2025-01-12T20:00:00", TaskCategory::Work, TaskPriority::Medium, true);
        add(store, "2024-12-20T08:00:00", "2025-01-20T00:00:00", TaskCategory::Study, TaskPriority::Low, false);
    }

    fn seeded() -> Arc<dyn TaskStore> {
        let store = Arc::new(InMemoryTaskStore::new());
        seed(store.as_ref());
        store
    }

    #[test]
    fn empty_collection_reports_zeroes() {
        let stats = engine(Arc::new(InMemoryTaskStore::new())).stats().unwrap();

        assert_eq!(stats.overview.total_tasks, 0);
        assert_eq!(stats.overview.completion_rate, 0.0);
        assert!(stats.category_stats.is_empty());
        assert_eq!(stats.daily_trends.len(), 7);
        assert!(stats.daily_trends.iter().all(|d| d.completion_rate == 0.0));
        assert_eq!(stats.weekly_trends.len(), 4);
        assert_eq!(stats.insights.most_productive_category, None);
        assert_eq!(stats.insights.least_productive_category, None);
        assert_eq!(stats.insights.streak, 0);
        assert_eq!(stats.insights.productivity_score, 10.0);
        assert_eq!(stats.timestamp.as_str(), "2025-01-08T12:00:00");
    }

    #[test]
    fn overview_counts() {
        let overview = engine(seeded()).stats().unwrap().overview;

        assert_eq!(
            overview,
            Overview {
                total_tasks: 4,
                completed_tasks: 2,
                pending_tasks: 2,
                overdue_tasks: 1,
                today_tasks: 1,
                week_tasks: 3,
                completion_rate: 50.0,
            }
        );
        assert_eq!(overview.total_tasks, overview.completed_tasks + overview.pending_tasks);
    }

    #[test]
    fn breakdowns_balance() {
        let stats = engine(seeded()).stats().unwrap();

        let work = &stats.category_stats["work"];
        assert_eq!((work.total, work.completed, work.pending), (2, 2, 0));
        assert_eq!(work.completion_rate, 100.0);
        assert_eq!(stats.category_stats["personal"].completion_rate, 0.0);
        assert_eq!(stats.priority_stats["low"].total, 2);

        for bucket in stats.category_stats.values().chain(stats.priority_stats.values()) {
            assert_eq!(bucket.total, bucket.completed + bucket.pending);
        }
    }

    #[test]
    fn daily_trends_run_oldest_first() {
        let daily = engine(seeded()).stats().unwrap().daily_trends;

        let dates: Vec<_> = daily.iter().map(|d| d.date.as_str()).collect();
        assert_eq!(
            dates,
            ["2025-01-02", "2025-01-03", "2025-01-04", "2025-01-05", "2025-01-06", "2025-01-07", "2025-01-08"]
        );
        assert_eq!(daily[6].day, "Wed");
        assert_eq!((daily[4].created, daily[4].completed), (1, 1));
        assert_eq!(daily[4].completion_rate, 100.0);
        assert_eq!((daily[5].created, daily[5].completed), (1, 0));
    }

    #[test]
    fn weekly_trends_end_with_current_week() {
        let weekly = engine(seeded()).productivity().unwrap().weekly_trends;

        let labels: Vec<_> = weekly.iter().map(|w| (w.week.as_str(), w.start_date.as_str())).collect();
        assert_eq!(
            labels,
            [
                ("Week 1", "2024-12-16"),
                ("Week 2", "2024-12-23"),
                ("Week 3", "2024-12-30"),
                ("Week 4", "2025-01-06"),
            ]
        );
        assert_eq!((weekly[3].created, weekly[3].completed), (3, 2));
        assert_eq!(weekly[3].completion_rate, 66.7);
        assert_eq!((weekly[0].created, weekly[0].completed), (1, 0));
    }

    #[test]
    fn insights_from_seeded_tasks() {
        let insights = engine(seeded()).stats().unwrap().insights;

        assert_eq!(insights.most_productive_category.as_deref(), Some("work"));
        assert_eq!(insights.least_productive_category.as_deref(), Some("personal"));
        assert_eq!(insights.average_tasks_per_day, 0.6);
        assert_eq!(insights.streak, 1);
        assert_eq!(insights.productivity_score, 48.0);
    }

    #[rstest]
    #[case(75.0, 0, 85.0)]
    #[case(50.0, 3, 44.0)]
    #[case(0.0, 4, -8.0)]
    #[case(33.3, 0, 43.3)]
    fn productivity_score_cases(#[case] rate: f64, #[case] overdue: u64, #[case] expected: f64) {
        assert_eq!(productivity_score(rate, overdue), expected);
    }

    #[rstest]
    #[case(1, 3, 33.3)]
    #[case(2, 3, 66.7)]
    #[case(0, 0, 0.0)]
    #[case(5, 5, 100.0)]
    #[case(1, 400, 0.2)]
    #[case(49, 400, 12.2)]
    fn rounded_rates(#[case] part: u64, #[case] whole: u64, #[case] expected: f64) {
        assert_eq!(round1(percentage(part, whole)), expected);
    }

    #[test]
    fn week_window_spans_monday_to_sunday() {
        let window = week_window(NaiveDate::from_ymd_opt(2025, 1, 12).unwrap());
        assert!(window.contains(&IsoTimestamp::new("2025-01-06T00:00:00")));
        assert!(window.contains(&IsoTimestamp::new("2025-01-12T23:59:59.999999")));
        assert!(!window.contains(&IsoTimestamp::new("2025-01-13T00:00:00")));
        assert!(!window.contains(&IsoTimestamp::new("2025-01-05T23:59:59")));
    }

    #[test]
    fn ties_keep_first_category() {
        let bucket = |completed| BucketStats { total: 2, completed, pending: 2 - completed, completion_rate: 0.0 };
        let stats = BTreeMap::from([
            ("personal".to_string(), bucket(1)),
            ("study".to_string(), bucket(1)),
            ("work".to_string(), bucket(1)),
        ]);
        assert_eq!(pick_category(&stats, |a, b| a > b).as_deref(), Some("personal"));
        assert_eq!(pick_category(&stats, |a, b| a < b).as_deref(), Some("personal"));
    }

    #[test]
    fn indexed_redb_store_matches_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let context = DataContext::open(dir.path().join("stats.redb")).unwrap();
        context.ensure_indexes(&IndexField::ALL).unwrap();
        seed(&context);
        let redb = engine(Arc::new(context));

        let memory = engine(seeded());
        let stats = redb.stats().unwrap();
        assert_eq!(stats, memory.stats().unwrap());
        assert_eq!(stats.overview.week_tasks, 3);
        assert_eq!((stats.daily_trends[4].created, stats.daily_trends[4].completed), (1, 1));
        assert_eq!(redb.productivity().unwrap(), memory.productivity().unwrap());
    }

    #[test]
    fn offline_store_surfaces_metric() {
        let store = Arc::new(InMemoryTaskStore::new());
        store.set_offline(true);
        let err = engine(store).stats().unwrap_err();
        assert_eq!(err.metric, "total tasks");
    }
}
