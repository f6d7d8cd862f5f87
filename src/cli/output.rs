use chrono::NaiveDate;
use serde::Serialize;

use crate::model::profile::Profile;
use crate::model::state::AppState;
use crate::model::trip::Trip;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummaryJson {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub readiness: u8,
    pub route: Vec<String>,
}

pub fn trip_summary_json(trip: &Trip, active: bool) -> TripSummaryJson {
    TripSummaryJson {
        id: trip.id.clone(),
        name: trip.name.clone(),
        emoji: trip.emoji.clone(),
        active,
        start_date: trip.start_date,
        end_date: trip.end_date,
        readiness: trip.readiness(),
        route: trip.destinations.iter().map(|d| d.city.clone()).collect(),
    }
}

pub fn trip_list_json(state: &AppState) -> Vec<TripSummaryJson> {
    state
        .sorted_trips()
        .into_iter()
        .map(|t| trip_summary_json(t, state.active_trip_id.as_deref() == Some(t.id.as_str())))
        .collect()
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

fn format_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    match (start, end) {
        (Some(s), Some(e)) => format!("{} → {}", s, e),
        (Some(s), None) => format!("from {}", s),
        (None, Some(e)) => format!("until {}", e),
        (None, None) => "no dates".to_string(),
    }
}

/// One-line trip summary; `[*]` marks the active trip
pub fn format_trip_line(trip: &Trip, active: bool) -> String {
    format!(
        "[{}] {} {}  {}  {}%  ({})",
        if active { '*' } else { ' ' },
        trip.emoji,
        trip.name,
        format_dates(trip.start_date, trip.end_date),
        trip.readiness(),
        trip.id
    )
}

/// All trips, soonest first
pub fn format_trip_list(state: &AppState) -> Vec<String> {
    if state.trips.is_empty() {
        return vec!["No trips".to_string()];
    }
    state
        .sorted_trips()
        .into_iter()
        .map(|t| format_trip_line(t, state.active_trip_id.as_deref() == Some(t.id.as_str())))
        .collect()
}

/// Full trip view
pub fn format_trip_detail(trip: &Trip, profiles: &[Profile]) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("{} {}", trip.emoji, trip.name));
    lines.push(format!("id: {}", trip.id));
    lines.push(format!("dates: {}", format_dates(trip.start_date, trip.end_date)));

    let mut travelers: Vec<String> = trip
        .traveler_ids
        .iter()
        .map(|id| match profiles.iter().find(|p| &p.id == id) {
            Some(p) => p.name.clone(),
            None => format!("unknown traveler ({})", id),
        })
        .collect();
    if travelers.is_empty() {
        travelers.push(trip.travelers.to_string());
    }
    lines.push(format!("travelers: {}", travelers.join(", ")));

    if !trip.destinations.is_empty() {
        let route: Vec<String> = trip
            .destinations
            .iter()
            .map(|d| format!("{} {}", d.flag, d.city))
            .collect();
        lines.push(format!("route: {}", route.join(" → ")));
    }

    if !trip.itinerary.is_empty() {
        lines.push(String::new());
        lines.push("Itinerary".to_string());
        for day in &trip.itinerary {
            let date = day.date.map(|d| format!(" {}", d)).unwrap_or_default();
            lines.push(format!(
                "  Day {}{} {} {}",
                day.day_number, date, day.emoji, day.location
            ));
            for a in &day.activities {
                let time = if a.time.is_empty() {
                    String::new()
                } else {
                    format!("{} ", a.time)
                };
                lines.push(format!("    {}{} {}", time, a.emoji, a.name));
            }
        }
    }

    if !trip.bookings.is_empty() {
        lines.push(String::new());
        lines.push("Bookings".to_string());
        for b in &trip.bookings {
            lines.push(format!("  [{}] {}", b.status.label(), b.name));
        }
    }

    if !trip.budget.is_empty() {
        lines.push(String::new());
        lines.push(format!(
            "Budget: {:.2} of {:.2} {} spent",
            trip.total_spent(),
            trip.total_budget(),
            trip.currency
        ));
    }

    let todos_done = trip.todos.iter().filter(|t| t.done).count();
    let packed = trip.packing_list.iter().filter(|p| p.packed).count();
    lines.push(String::new());
    lines.push(format!("todos: {}/{}", todos_done, trip.todos.len()));
    lines.push(format!("packing: {}/{}", packed, trip.packing_list.len()));
    lines.push(format!("readiness: {}%", trip.readiness()));

    if !trip.notes.is_empty() {
        lines.push(String::new());
        lines.push(trip.notes.clone());
    }
    lines
}

pub fn format_profile_line(profile: &Profile) -> String {
    format!("{}  {}", profile.id, profile.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::trip::{Destination, Todo};
    use insta::assert_snapshot;
    use std::sync::Arc;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_trip_list_formatting() {
        let mut kyoto = Trip::new("a", "Kyoto");
        kyoto.emoji = "⛩️".into();
        kyoto.start_date = date(2025, 4, 1);
        kyoto.end_date = date(2025, 4, 5);
        kyoto.todos = vec![
            Todo {
                id: "t1".into(),
                done: true,
                ..Default::default()
            },
            Todo {
                id: "t2".into(),
                ..Default::default()
            },
        ];
        let someday = Trip::new("b", "Someday");
        let mut lisbon = Trip::new("c", "Lisbon");
        lisbon.start_date = date(2024, 10, 12);

        let mut state = AppState::default();
        for trip in [kyoto, someday, lisbon] {
            state.trips.insert(trip.id.clone(), Arc::new(trip));
        }
        state.active_trip_id = Some("a".into());

        let output = format_trip_list(&state).join("\n");
        assert_snapshot!(output, @r"
        [ ] ✈️ Lisbon  from 2024-10-12  0%  (c)
        [*] ⛩️ Kyoto  2025-04-01 → 2025-04-05  18%  (a)
        [ ] ✈️ Someday  no dates  0%  (b)
        ");
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(format_trip_list(&AppState::default()), vec!["No trips"]);
    }

    #[test]
    fn test_detail_marks_unknown_travelers() {
        let mut trip = Trip::new("a", "Kyoto");
        trip.traveler_ids = vec!["p1".into(), "gone".into()];
        trip.destinations.push(Destination {
            city: "Kyoto".into(),
            country: "Japan".into(),
            flag: "🇯🇵".into(),
            ..Default::default()
        });
        let profiles = vec![Profile {
            id: "p1".into(),
            name: "Ana".into(),
            photo: None,
        }];
        let lines = format_trip_detail(&trip, &profiles);
        assert!(lines.contains(&"travelers: Ana, unknown traveler (gone)".to_string()));
        assert!(lines.contains(&"route: 🇯🇵 Kyoto".to_string()));
    }
}
