use chrono::{Duration, NaiveDate};
use pulse_core::{Category, DayTrend, Overview, SiteStat, WeeklyTrend};

use crate::TrackingStore;

const TREND_DAYS: i64 = 7;

impl TrackingStore {
    /// Global totals across every domain. Unknown time is folded into the
    /// neutral bucket; the score is the productive share of all tracked
    /// time, rounded to a whole percent.
    pub fn overview(&self) -> Overview {
        let mut totals = Overview::default();
        for site in self.summary.values() {
            totals.productive += site.productive;
            totals.unproductive += site.unproductive;
            totals.neutral += site.neutral + site.unknown;
            totals.total += site.total;
        }
        if totals.total > 0 {
            totals.productivity_score =
                ((totals.productive as f64 / totals.total as f64) * 100.0).round() as u32;
        }
        totals
    }

    /// Per-site table, most time first. The sort is stable, so domains with
    /// equal totals keep the summary map's order.
    pub fn leaderboard(&self) -> Vec<SiteStat> {
        let mut sites: Vec<SiteStat> = self
            .summary
            .values()
            .map(|site| SiteStat {
                domain: site.domain.clone(),
                time: site.total,
                category: site.category,
                productive: site.productive,
                unproductive: site.unproductive,
            })
            .collect();
        sites.sort_by(|a, b| b.time.cmp(&a.time));
        sites
    }

    /// Productive/unproductive seconds for each of the seven calendar days
    /// ending on `today`, oldest first. Rescans the full session log on
    /// every call; fine at this dataset's scale.
    pub fn weekly_trend(&self, today: NaiveDate) -> WeeklyTrend {
        let mut days = Vec::with_capacity(TREND_DAYS as usize);
        for offset in (0..TREND_DAYS).rev() {
            let date = (today - Duration::days(offset)).format("%Y-%m-%d").to_string();
            let mut day = DayTrend {
                date,
                productive: 0,
                unproductive: 0,
            };
            for session in &self.sessions {
                if session.timestamp.starts_with(&day.date) {
                    match session.category {
                        Category::Productive => day.productive += session.time_spent,
                        Category::Unproductive => day.unproductive += session.time_spent,
                        Category::Neutral | Category::Unknown => {}
                    }
                }
            }
            days.push(day);
        }
        WeeklyTrend { days }
    }
}
