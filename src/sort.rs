use crate::types::Workout;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    RecentFirst,
    RecentLast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Distance,
    Duration,
}

/// The choices offered by the list's sort selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Date(DateOrder),
    Metric(Metric),
}

impl SortKey {
    /// Reorders `workouts` in place. Stable, so equal keys keep their
    /// current relative order.
    pub fn apply(self, workouts: &mut [Workout]) {
        match self {
            Self::Date(order) => sort_by_date(workouts, order),
            Self::Metric(metric) => sort_by_metric(workouts, metric),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "recentfirst" => Ok(Self::Date(DateOrder::RecentFirst)),
            "recentlast" => Ok(Self::Date(DateOrder::RecentLast)),
            "distance" => Ok(Self::Metric(Metric::Distance)),
            "duration" => Ok(Self::Metric(Metric::Duration)),
            _ => Err(format!(
                "unknown sort order {s:?} (expected recent-first, recent-last, distance or duration)"
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Date(DateOrder::RecentFirst) => "recent-first",
            Self::Date(DateOrder::RecentLast) => "recent-last",
            Self::Metric(Metric::Distance) => "distance",
            Self::Metric(Metric::Duration) => "duration",
        })
    }
}

pub fn sort_by_date(workouts: &mut [Workout], order: DateOrder) {
    match order {
        DateOrder::RecentFirst => workouts.sort_by(|a, b| b.created_at().cmp(&a.created_at())),
        DateOrder::RecentLast => workouts.sort_by_key(Workout::created_at),
    }
}

/// Ascending by the chosen metric.
pub fn sort_by_metric(workouts: &mut [Workout], metric: Metric) {
    let value = match metric {
        Metric::Distance => Workout::distance_km,
        Metric::Duration => Workout::duration_min,
    };
    workouts.sort_by(|a, b| value(a).total_cmp(&value(b)));
}
