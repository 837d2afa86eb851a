//! Format - Human readable strings for views.

use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::model::Catalog;
use crate::types::Point;

/// Separator between the ends of a range, as printed.
pub const RANGE_SEPARATOR: &str = " — ";

pub fn short_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d").to_string()
}

pub fn clock_time(date: DateTime<Utc>) -> String {
    date.format("%H:%M").to_string()
}

/// Machine readable minute-precision timestamp.
pub fn datetime_attr(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M").to_string()
}

pub fn date_attr(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `01D 02H 03M`. Leading zero units are dropped, minutes always shown.
pub fn duration(span: Duration) -> String {
    let span = span.max(Duration::zero());
    let days = span.num_days();
    let hours = span.num_hours() % 24;
    let minutes = span.num_minutes() % 60;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{days:02}D "));
    }
    if days > 0 || hours > 0 {
        out.push_str(&format!("{hours:02}H "));
    }
    out.push_str(&format!("{minutes:02}M"));
    out
}

/// Route title over day-sorted points. Consecutive repeats collapse, and
/// routes longer than `limit` show only their ends.
pub fn route_title(catalog: &Catalog, points: &[Point], limit: usize) -> Result<String> {
    let mut names: Vec<&str> = Vec::new();
    for point in points {
        let name = catalog.destination_by_id(&point.destination)?.name.as_str();
        if names.last() != Some(&name) {
            names.push(name);
        }
    }
    if names.len() > limit {
        if let (Some(first), Some(last)) = (names.first(), names.last()) {
            return Ok(format!("{first}{RANGE_SEPARATOR}...{RANGE_SEPARATOR}{last}"));
        }
    }
    Ok(names.join(RANGE_SEPARATOR))
}

/// Date span from the first start to the last end, joined by [`RANGE_SEPARATOR`].
pub fn trip_dates(points: &[Point]) -> Option<String> {
    let start = points.iter().map(|point| point.date_from).min()?;
    let end = points.iter().map(|point| point.date_to).max()?;
    Some(format!("{}{RANGE_SEPARATOR}{}", short_date(start), short_date(end)))
}

/// Base prices plus the price of every selected offer.
pub fn total_cost(catalog: &Catalog, points: &[Point]) -> Result<u64> {
    let mut total = 0u64;
    for point in points {
        total += u64::from(point.base_price);
        total += catalog
            .filtered_offers(point.kind, &point.offers)?
            .iter()
            .map(|offer| u64::from(offer.price))
            .sum::<u64>();
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::fixtures::catalog;
    use crate::model::points::fixtures::{at, point, three_points};
    use crate::utils::sort;
    use crate::types::SortKind;

    #[test]
    fn test_duration_units() {
        assert_eq!(duration(Duration::minutes(45)), "45M");
        assert_eq!(duration(Duration::minutes(150)), "02H 30M");
        assert_eq!(duration(Duration::minutes(24 * 60 + 3)), "01D 00H 03M");
        assert_eq!(duration(Duration::minutes(-5)), "00M");
    }

    #[test]
    fn test_route_title_collapses_long_routes() {
        let catalog = catalog();
        let points = sort(&three_points(), SortKind::Day);
        assert_eq!(
            route_title(&catalog, &points, 3).expect("known destinations"),
            "Amsterdam — Geneva — Chamonix"
        );
        assert_eq!(
            route_title(&catalog, &points, 2).expect("known destinations"),
            "Amsterdam — ... — Chamonix"
        );
    }

    #[test]
    fn test_route_title_unknown_destination() {
        let points = vec![point("x", "atlantis", at(1, 1), at(1, 2), 1)];
        assert!(route_title(&catalog(), &points, 3).is_err());
    }

    #[test]
    fn test_trip_dates_and_cost() {
        let points = three_points();
        assert_eq!(trip_dates(&points).as_deref(), Some("Mar 2 — Mar 9"));
        assert_eq!(trip_dates(&[]), None);
        // 600 base + 3 x luggage(30)
        assert_eq!(total_cost(&catalog(), &points), Ok(690));
    }
}
