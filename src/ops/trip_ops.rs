use chrono::Utc;

use crate::model::new_id;
use crate::model::trip::Trip;
use crate::ops::action::TripPatch;

/// Deep copy of a trip under a fresh id, named "<name> (Copy)".
///
/// Nested entity ids are kept; they only need to be unique within a trip.
pub fn duplicate(source: &Trip) -> Trip {
    Trip {
        id: new_id(),
        name: format!("{} (Copy)", source.name),
        created_at: Some(Utc::now()),
        ..source.clone()
    }
}

pub fn rename(trip: &mut Trip, name: &str) {
    trip.name = name.to_string();
}

pub fn update_trip(trip: &mut Trip, patch: &TripPatch) {
    patch.apply(trip);
}

pub fn update_notes(trip: &mut Trip, notes: &str) {
    trip.notes = notes.to_string();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::trip::Todo;

    #[test]
    fn test_duplicate_copies_content_under_new_id() {
        let mut trip = Trip::new("t1", "Japan");
        trip.todos.push(Todo {
            id: "td1".into(),
            text: "Get JR pass".into(),
            ..Default::default()
        });
        trip.notes = "bring cash".into();

        let copy = duplicate(&trip);
        assert_ne!(copy.id, trip.id);
        assert_eq!(copy.name, "Japan (Copy)");
        assert_eq!(copy.todos, trip.todos);
        assert_eq!(copy.notes, trip.notes);
        assert!(copy.created_at.is_some());
    }

    #[test]
    fn test_rename_and_notes() {
        let mut trip = Trip::new("t1", "Japan");
        rename(&mut trip, "Nippon");
        update_notes(&mut trip, "hello");
        assert_eq!(trip.name, "Nippon");
        assert_eq!(trip.notes, "hello");
    }

    #[test]
    fn test_update_trip_patches_only_given_fields() {
        let mut trip = Trip::new("t1", "Japan");
        let patch = TripPatch {
            travelers: Some(3),
            currency: Some("JPY".into()),
            ..Default::default()
        };
        update_trip(&mut trip, &patch);
        assert_eq!(trip.travelers, 3);
        assert_eq!(trip.currency, "JPY");
        assert_eq!(trip.name, "Japan");
    }
}
