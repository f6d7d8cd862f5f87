//! Multi-step reducer scenarios run through the public API.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tripsync::model::state::{AppState, Tab};
use tripsync::model::trip::{BookingStatus, Destination, Trip};
use tripsync::ops::action::{CityPatch, NewBooking, NewBudgetCategory, NewCity, NewDay, NewSpending};
use tripsync::ops::{Action, reduce};

fn run(state: &AppState, actions: Vec<Action>) -> AppState {
    actions
        .into_iter()
        .fold(state.clone(), |acc, action| reduce(&acc, action))
}

fn active(state: &AppState) -> &Trip {
    state.active_trip().expect("an active trip")
}

#[test]
fn add_trip_plan_then_delete() {
    let state = run(
        &AppState::default(),
        vec![
            Action::AddTrip(Box::new(Trip::new("t1", "Lisbon"))),
            Action::SetTab(Tab::Itinerary),
            Action::AddDay(NewDay {
                location: "Alfama".into(),
                ..Default::default()
            }),
            Action::AddBooking(NewBooking {
                name: "Hotel".into(),
                ..Default::default()
            }),
        ],
    );

    let trip = active(&state);
    assert_eq!(trip.itinerary.len(), 1);
    assert_eq!(trip.itinerary[0].day_number, 1);
    assert_eq!(trip.bookings.len(), 1);
    assert_eq!(trip.bookings[0].status, BookingStatus::NotStarted);
    assert_eq!(state.active_tab, Tab::Itinerary);

    let state = reduce(&state, Action::DeleteTrip("t1".into()));
    assert!(state.trips.is_empty());
    assert_eq!(state.active_trip_id, None);
    assert_eq!(state.active_tab, Tab::Overview);
}

#[test]
fn day_numbers_follow_position() {
    let mut state = reduce(
        &AppState::default(),
        Action::AddTrip(Box::new(Trip::new("t1", "Roadtrip"))),
    );
    for stop in ["A", "B", "C", "D", "E"] {
        state = reduce(
            &state,
            Action::AddDay(NewDay {
                location: stop.into(),
                ..Default::default()
            }),
        );
    }
    let third = active(&state).itinerary[2].id.clone();
    let state = run(
        &state,
        vec![
            Action::ReorderDays { from: 4, to: 0 },
            Action::RemoveDay(third),
            Action::ReorderDays { from: 0, to: 99 },
        ],
    );

    let days = &active(&state).itinerary;
    let locations: Vec<&str> = days.iter().map(|d| d.location.as_str()).collect();
    assert_eq!(locations, vec!["A", "B", "D", "E"]);
    let numbers: Vec<usize> = days.iter().map(|d| d.day_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4]);
}

#[test]
fn out_of_range_reorder_is_a_noop() {
    let state = run(
        &AppState::default(),
        vec![
            Action::AddTrip(Box::new(Trip::new("t1", "Trip"))),
            Action::AddDay(NewDay::default()),
        ],
    );
    let next = reduce(&state, Action::ReorderDays { from: 5, to: 0 });
    assert!(Arc::ptr_eq(&state.trips["t1"], &next.trips["t1"]));
}

#[test]
fn spending_tracks_category_total() {
    let state = run(
        &AppState::default(),
        vec![
            Action::AddTrip(Box::new(Trip::new("t1", "Trip"))),
            Action::AddBudgetCategory(NewBudgetCategory {
                name: "Food".into(),
                emoji: "🍜".into(),
            }),
            Action::AddSpending(NewSpending {
                description: "Ramen".into(),
                amount: 12.0,
                category: "Food".into(),
                date: None,
            }),
            Action::AddSpending(NewSpending {
                description: "Sushi".into(),
                amount: 30.0,
                category: "Food".into(),
                date: None,
            }),
        ],
    );
    assert_eq!(active(&state).budget[0].actual, 42.0);

    let sushi = active(&state).spending_log[1].id.clone();
    let state = reduce(&state, Action::DeleteSpending(sushi));
    assert_eq!(active(&state).budget[0].actual, 12.0);
}

#[test]
fn city_rename_cascades_to_route() {
    let state = run(
        &AppState::default(),
        vec![
            Action::AddTrip(Box::new(Trip::new("t1", "Europe"))),
            Action::AddCity(NewCity {
                city: "Porto".into(),
                country: "Portugal".into(),
                flag: "🇵🇹".into(),
                ..Default::default()
            }),
            Action::AddCity(NewCity {
                city: "Madrid".into(),
                country: "Spain".into(),
                flag: "🇪🇸".into(),
                ..Default::default()
            }),
        ],
    );
    let porto = active(&state).cities[0].id.clone();
    let state = reduce(
        &state,
        Action::UpdateCity {
            id: porto.clone(),
            updates: CityPatch {
                city: Some("Lisbon".into()),
                ..Default::default()
            },
        },
    );
    assert_eq!(
        active(&state).destinations,
        vec![
            Destination {
                city: "Lisbon".into(),
                country: "Portugal".into(),
                flag: "🇵🇹".into(),
                ..Default::default()
            },
            Destination {
                city: "Madrid".into(),
                country: "Spain".into(),
                flag: "🇪🇸".into(),
                ..Default::default()
            },
        ]
    );

    let state = reduce(&state, Action::DeleteCity(porto));
    assert_eq!(active(&state).destinations.len(), 1);
    assert_eq!(active(&state).destinations[0].city, "Madrid");
}

#[test]
fn duplicate_round_trip() {
    let state = run(
        &AppState::default(),
        vec![
            Action::AddTrip(Box::new(Trip::new("t1", "Berlin"))),
            Action::AddDay(NewDay {
                location: "Mitte".into(),
                ..Default::default()
            }),
            Action::UpdateNotes("Museum island on Monday is closed".into()),
        ],
    );
    let original = Trip::clone(active(&state));

    let state = reduce(&state, Action::DuplicateTrip("t1".into()));
    let copy = Trip::clone(active(&state));
    assert_ne!(copy.id, original.id);
    assert_eq!(copy.name, "Berlin (Copy)");

    // Same content apart from identity
    let normalized = Trip {
        id: original.id.clone(),
        name: original.name.clone(),
        created_at: original.created_at,
        ..copy
    };
    assert_eq!(normalized, original);
    // The source is untouched
    assert_eq!(*state.trips["t1"], original);
}

#[test]
fn cycling_status_three_times_returns_to_start() {
    let state = run(
        &AppState::default(),
        vec![
            Action::AddTrip(Box::new(Trip::new("t1", "Trip"))),
            Action::AddBooking(NewBooking {
                name: "Train".into(),
                status: BookingStatus::Booked,
                ..Default::default()
            }),
        ],
    );
    let id = active(&state).bookings[0].id.clone();
    let after = run(
        &state,
        vec![
            Action::CycleBookingStatus(id.clone()),
            Action::CycleBookingStatus(id.clone()),
            Action::CycleBookingStatus(id),
        ],
    );
    assert_eq!(active(&after), active(&state));
}

#[test]
fn actions_parse_from_wire_json() {
    let state = reduce(
        &AppState::default(),
        Action::AddTrip(Box::new(Trip::new("t1", "Trip"))),
    );
    let action: Action = serde_json::from_str(
        r#"{"type":"ADD_TODO","payload":{"text":"Book museum tickets","priority":true,"dueDate":"2025-05-01"}}"#,
    )
    .unwrap();
    let state = reduce(&state, action);
    let todo = &active(&state).todos[0];
    assert_eq!(todo.text, "Book museum tickets");
    assert!(todo.priority.is_high());
    assert_eq!(todo.due_date.map(|d| d.to_string()).as_deref(), Some("2025-05-01"));
}
