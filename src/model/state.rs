use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::trip::Trip;

/// Trips by id, in insertion order. Values are shared between successive
/// states so that untouched trips keep their identity.
pub type TripMap = IndexMap<String, Arc<Trip>>;

/// Which view of the active trip is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    #[default]
    Overview,
    Itinerary,
    Bookings,
    Budget,
    Todo,
    Cities,
    Packing,
    Concert,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Itinerary => "Itinerary",
            Tab::Bookings => "Bookings",
            Tab::Budget => "Budget",
            Tab::Todo => "To-Do",
            Tab::Cities => "Cities",
            Tab::Packing => "Packing",
            Tab::Concert => "Concert",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Success,
    Info,
    Warning,
    Error,
}

/// Transient notification
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Toast {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
    pub visible: bool,
}

/// Everything the reducer owns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub trips: TripMap,
    pub active_trip_id: Option<String>,
    pub active_tab: Tab,
    pub sidebar_open: bool,
    pub dark_mode: bool,
    pub toast: Toast,
}

impl AppState {
    /// Empty state with the given theme preference
    pub fn with_dark_mode(dark_mode: bool) -> Self {
        AppState {
            dark_mode,
            ..Default::default()
        }
    }

    pub fn active_trip(&self) -> Option<&Arc<Trip>> {
        self.active_trip_id
            .as_deref()
            .and_then(|id| self.trips.get(id))
    }

    /// Trips ordered by start date; undated trips go last, in map order.
    pub fn sorted_trips(&self) -> Vec<&Arc<Trip>> {
        let mut trips: Vec<&Arc<Trip>> = self.trips.values().collect();
        trips.sort_by(|a, b| match (a.start_date, b.start_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        trips
    }

    /// Owned copy of the trips map for serialization
    pub fn trips_snapshot(&self) -> IndexMap<String, Trip> {
        self.trips
            .iter()
            .map(|(id, trip)| (id.clone(), Trip::clone(trip)))
            .collect()
    }
}
