//! Core types for trip-board.
//!
//! These types define the foundation everything builds on: the entities held
//! by the store, the severity tag carried by every mutation and the sort/filter
//! keys the list is read through.

use std::fmt;

use bitflags::bitflags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }
    };
}

string_id!(
    /// Opaque point identifier, unique within the store.
    PointId
);
string_id!(
    /// Reference into the destination catalog.
    DestinationId
);
string_id!(
    /// Reference into a point type's offer list.
    OfferId
);

// =============================================================================
// Point Type
// =============================================================================

/// Fixed set of point (trip event) types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointType {
    Taxi,
    Bus,
    Train,
    Ship,
    Drive,
    Flight,
    CheckIn,
    Sightseeing,
    Restaurant,
}

impl PointType {
    pub const ALL: [PointType; 9] = [
        PointType::Taxi,
        PointType::Bus,
        PointType::Train,
        PointType::Ship,
        PointType::Drive,
        PointType::Flight,
        PointType::CheckIn,
        PointType::Sightseeing,
        PointType::Restaurant,
    ];

    /// Machine name, used in roles and icon paths.
    pub const fn as_str(self) -> &'static str {
        match self {
            PointType::Taxi => "taxi",
            PointType::Bus => "bus",
            PointType::Train => "train",
            PointType::Ship => "ship",
            PointType::Drive => "drive",
            PointType::Flight => "flight",
            PointType::CheckIn => "check-in",
            PointType::Sightseeing => "sightseeing",
            PointType::Restaurant => "restaurant",
        }
    }

    /// Capitalized label shown next to the type radio.
    pub fn label(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for PointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Entities
// =============================================================================

/// A schedulable trip event. Owned by the store; views only hold copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub id: PointId,
    #[serde(rename = "type")]
    pub kind: PointType,
    pub destination: DestinationId,
    #[serde(default)]
    pub offers: Vec<OfferId>,
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    pub base_price: u32,
    #[serde(default)]
    pub is_favorite: bool,
}

impl Point {
    /// Time spent at the point. Inverted ranges count as zero.
    pub fn duration(&self) -> chrono::Duration {
        (self.date_to - self.date_from).max(chrono::Duration::zero())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picture {
    pub src: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub id: DestinationId,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub pictures: Vec<Picture>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    pub title: String,
    pub price: u32,
}

/// Offers available for one point type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferGroup {
    #[serde(rename = "type")]
    pub kind: PointType,
    pub offers: Vec<Offer>,
}

// =============================================================================
// Severity
// =============================================================================

/// Classification of a store mutation, chosen by the caller.
///
/// The variants are nested: each one implies at least the re-render work of
/// the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// A single entity changed without structural effect.
    Patch,
    /// A single entity changed and the aggregate header is affected.
    Minor,
    /// The visible list changed structurally (add/remove).
    Medium,
    /// Filter or sort context reset, full rebuild required.
    Major,
}

bitflags! {
    /// Parts of the screen a notification must rebuild.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderScope: u8 {
        const ITEM = 1 << 0;
        const HEADER = 1 << 1;
        const LIST = 1 << 2;
        const SORT = 1 << 3;
    }
}

impl Severity {
    pub const fn scope(self) -> RenderScope {
        match self {
            Severity::Patch => RenderScope::ITEM,
            Severity::Minor => RenderScope::ITEM.union(RenderScope::HEADER),
            Severity::Medium => RenderScope::LIST,
            Severity::Major => RenderScope::LIST.union(RenderScope::SORT),
        }
    }
}

/// Mutation requested by a view through its presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    AddPoint,
    UpdatePoint,
    DeletePoint,
}

// =============================================================================
// Sort & Filter keys
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKind {
    /// Chronological by start time.
    #[default]
    Day,
    Event,
    /// Longest duration first.
    Time,
    Offers,
    /// Most expensive first.
    Price,
}

impl SortKind {
    pub const ALL: [SortKind; 5] = [
        SortKind::Day,
        SortKind::Event,
        SortKind::Time,
        SortKind::Offers,
        SortKind::Price,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            SortKind::Day => "day",
            SortKind::Event => "event",
            SortKind::Time => "time",
            SortKind::Offers => "offers",
            SortKind::Price => "price",
        }
    }

    /// Event and offers are shown in the sort bar but cannot be selected.
    pub const fn is_enabled(self) -> bool {
        !matches!(self, SortKind::Event | SortKind::Offers)
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    #[default]
    Everything,
    Future,
    Present,
    Past,
}

impl FilterKind {
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Everything,
        FilterKind::Future,
        FilterKind::Present,
        FilterKind::Past,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            FilterKind::Everything => "everything",
            FilterKind::Future => "future",
            FilterKind::Present => "present",
            FilterKind::Past => "past",
        }
    }

    /// Placeholder shown when the filtered list is empty.
    pub const fn empty_message(self) -> &'static str {
        match self {
            FilterKind::Everything => "Click New Event to create your first point",
            FilterKind::Future => "There are no future events now",
            FilterKind::Present => "There are no present events now",
            FilterKind::Past => "There are no past events now",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}
