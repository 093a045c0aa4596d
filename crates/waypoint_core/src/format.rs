use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::state::RouteRow;

/// Conversion factor applied when displaying kilometre distances in miles.
pub const KM_TO_MILES: f64 = 0.621_371;

/// Display unit for route distances. The server always reports kilometres;
/// conversion happens only at the formatting boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceUnit {
    #[default]
    Miles,
    Kilometres,
}

impl DistanceUnit {
    pub fn convert(self, km: f64) -> f64 {
        match self {
            DistanceUnit::Miles => km * KM_TO_MILES,
            DistanceUnit::Kilometres => km,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            DistanceUnit::Miles => "mi",
            DistanceUnit::Kilometres => "km",
        }
    }
}

/// Format a kilometre distance for display in the given unit, two decimals.
pub fn format_distance(km: f64, unit: DistanceUnit) -> String {
    format!("{:.2}", unit.convert(km))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Start,
    End,
    Distance,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Explicit sort configuration for the route table. Passed into the
/// comparator rather than read from ambient state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            column: SortColumn::Date,
            direction: SortDirection::Descending,
        }
    }
}

impl SortConfig {
    /// Selecting the active column flips its direction; selecting a new
    /// column starts ascending.
    pub fn toggled(self, column: SortColumn) -> Self {
        if self.column == column {
            Self {
                column,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                column,
                direction: SortDirection::Ascending,
            }
        }
    }
}

/// Order two route rows under the given sort configuration.
pub fn compare_routes(a: &RouteRow, b: &RouteRow, sort: SortConfig) -> Ordering {
    let ordering = match sort.column {
        SortColumn::Start => a.start.cmp(&b.start),
        SortColumn::End => a.end.cmp(&b.end),
        SortColumn::Distance => a
            .distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal),
        SortColumn::Date => compare_dates(&a.date, &b.date),
    };
    match sort.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

// Dates arrive as either "YYYY-MM-DD" or "YYYY-MM-DD HH:MM:SS"; rows that
// fail to parse fall back to lexicographic order.
fn compare_dates(a: &str, b: &str) -> Ordering {
    match (parse_date(a), parse_date(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

fn parse_date(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}
