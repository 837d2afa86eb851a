//! Filter - Time-based selection of points.

use chrono::{DateTime, Utc};

use crate::types::{FilterKind, Point};

/// Whether `point` passes `kind` at `now`.
pub fn matches(kind: FilterKind, point: &Point, now: DateTime<Utc>) -> bool {
    match kind {
        FilterKind::Everything => true,
        FilterKind::Future => point.date_from > now,
        FilterKind::Present => point.date_from <= now && now <= point.date_to,
        FilterKind::Past => point.date_to < now,
    }
}

/// Points passing `kind`, in input order.
pub fn filter(points: &[Point], kind: FilterKind, now: DateTime<Utc>) -> Vec<Point> {
    points
        .iter()
        .filter(|point| matches(kind, point, now))
        .cloned()
        .collect()
}

/// Whether selecting `kind` would show anything.
pub fn has_points(points: &[Point], kind: FilterKind, now: DateTime<Utc>) -> bool {
    points.iter().any(|point| matches(kind, point, now))
}
