//! Sort - Ordering of the visible list.
//!
//! Sorts are stable, so points comparing equal keep their store order.

use std::cmp::Reverse;

use crate::types::{Point, SortKind};

/// Sort a copy of `points` by `kind`. Disabled keys fall back to day order.
pub fn sort(points: &[Point], kind: SortKind) -> Vec<Point> {
    let mut sorted = points.to_vec();
    match kind {
        SortKind::Time => sorted.sort_by_key(|point| Reverse(point.duration())),
        SortKind::Price => sorted.sort_by_key(|point| Reverse(point.base_price)),
        SortKind::Day | SortKind::Event | SortKind::Offers => {
            sorted.sort_by_key(|point| point.date_from)
        }
    }
    sorted
}
