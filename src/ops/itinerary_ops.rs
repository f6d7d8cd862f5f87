use crate::model::new_id;
use crate::model::trip::{DEFAULT_DAY_EMOJI, Day, Trip};
use crate::ops::action::{ActivityPatch, DayPatch, NewActivity, NewDay};
use crate::ops::{TripOpError, move_item};

// ---------------------------------------------------------------------------
// Days
// ---------------------------------------------------------------------------

/// Append a day. Returns the new day's id.
pub fn add_day(trip: &mut Trip, new_day: NewDay) -> String {
    let id = new_id();
    let emoji = new_day
        .emoji
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| DEFAULT_DAY_EMOJI.to_string());
    trip.itinerary.push(Day {
        id: id.clone(),
        day_number: trip.itinerary.len() + 1,
        date: new_day.date,
        location: new_day.location,
        emoji,
        notes: new_day.notes,
        ..Default::default()
    });
    id
}

pub fn remove_day(trip: &mut Trip, day_id: &str) -> Result<(), TripOpError> {
    let before = trip.itinerary.len();
    trip.itinerary.retain(|d| d.id != day_id);
    if trip.itinerary.len() == before {
        return Err(TripOpError::not_found("day", day_id));
    }
    renumber_days(trip);
    Ok(())
}

pub fn update_day(trip: &mut Trip, day_id: &str, patch: &DayPatch) -> Result<(), TripOpError> {
    let day = find_day_mut(trip, day_id)?;
    patch.apply(day);
    Ok(())
}

pub fn reorder_days(trip: &mut Trip, from: usize, to: usize) -> Result<(), TripOpError> {
    move_item(&mut trip.itinerary, from, to)?;
    renumber_days(trip);
    Ok(())
}

/// Rewrite `day_number` from list position (1-based).
pub fn renumber_days(trip: &mut Trip) {
    for (i, day) in trip.itinerary.iter_mut().enumerate() {
        day.day_number = i + 1;
    }
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

/// Append an activity to a day. Returns the new activity's id.
pub fn add_activity(
    trip: &mut Trip,
    day_id: &str,
    activity: NewActivity,
) -> Result<String, TripOpError> {
    let day = find_day_mut(trip, day_id)?;
    let id = new_id();
    day.activities.push(activity.into_activity(id.clone()));
    Ok(id)
}

pub fn update_activity(
    trip: &mut Trip,
    day_id: &str,
    activity_id: &str,
    patch: &ActivityPatch,
) -> Result<(), TripOpError> {
    let day = find_day_mut(trip, day_id)?;
    let activity = day
        .activities
        .iter_mut()
        .find(|a| a.id == activity_id)
        .ok_or_else(|| TripOpError::not_found("activity", activity_id))?;
    patch.apply(activity);
    Ok(())
}

pub fn delete_activity(trip: &mut Trip, day_id: &str, activity_id: &str) -> Result<(), TripOpError> {
    let day = find_day_mut(trip, day_id)?;
    let before = day.activities.len();
    day.activities.retain(|a| a.id != activity_id);
    if day.activities.len() == before {
        return Err(TripOpError::not_found("activity", activity_id));
    }
    Ok(())
}

/// Activities carry no ordinal, so this is a plain move.
pub fn reorder_activities(
    trip: &mut Trip,
    day_id: &str,
    from: usize,
    to: usize,
) -> Result<(), TripOpError> {
    let day = find_day_mut(trip, day_id)?;
    move_item(&mut day.activities, from, to)
}

fn find_day_mut<'a>(trip: &'a mut Trip, day_id: &str) -> Result<&'a mut Day, TripOpError> {
    trip.itinerary
        .iter_mut()
        .find(|d| d.id == day_id)
        .ok_or_else(|| TripOpError::not_found("day", day_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn trip_with_days(n: usize) -> Trip {
        let mut trip = Trip::new("t1", "Test");
        for i in 0..n {
            add_day(
                &mut trip,
                NewDay {
                    location: format!("Stop {}", i + 1),
                    ..Default::default()
                },
            );
        }
        trip
    }

    fn assert_numbered(trip: &Trip) {
        for (i, day) in trip.itinerary.iter().enumerate() {
            assert_eq!(day.day_number, i + 1, "day at index {} misnumbered", i);
        }
    }

    fn locations(trip: &Trip) -> Vec<&str> {
        trip.itinerary.iter().map(|d| d.location.as_str()).collect()
    }

    #[test]
    fn test_add_day_defaults() {
        let mut trip = Trip::new("t1", "Test");
        let id = add_day(
            &mut trip,
            NewDay {
                date: NaiveDate::from_ymd_opt(2025, 6, 1),
                ..Default::default()
            },
        );
        let day = &trip.itinerary[0];
        assert_eq!(day.id, id);
        assert_eq!(day.day_number, 1);
        assert_eq!(day.emoji, DEFAULT_DAY_EMOJI);
        assert!(day.activities.is_empty());
    }

    #[test]
    fn test_remove_day_renumbers() {
        let mut trip = trip_with_days(4);
        let second = trip.itinerary[1].id.clone();
        remove_day(&mut trip, &second).unwrap();
        assert_eq!(locations(&trip), vec!["Stop 1", "Stop 3", "Stop 4"]);
        assert_numbered(&trip);
    }

    #[test]
    fn test_remove_unknown_day() {
        let mut trip = trip_with_days(2);
        assert!(remove_day(&mut trip, "nope").is_err());
        assert_eq!(trip.itinerary.len(), 2);
    }

    #[test]
    fn test_reorder_days_renumbers() {
        let mut trip = trip_with_days(3);
        reorder_days(&mut trip, 2, 0).unwrap();
        assert_eq!(locations(&trip), vec!["Stop 3", "Stop 1", "Stop 2"]);
        assert_numbered(&trip);
    }

    #[test]
    fn test_update_day() {
        let mut trip = trip_with_days(1);
        let id = trip.itinerary[0].id.clone();
        let patch = DayPatch {
            location: Some("Kyoto".into()),
            ..Default::default()
        };
        update_day(&mut trip, &id, &patch).unwrap();
        assert_eq!(trip.itinerary[0].location, "Kyoto");
        assert_eq!(trip.itinerary[0].day_number, 1);
    }

    #[test]
    fn test_activity_crud_and_reorder() {
        let mut trip = trip_with_days(1);
        let day_id = trip.itinerary[0].id.clone();
        let a = add_activity(
            &mut trip,
            &day_id,
            NewActivity {
                name: "Temple".into(),
                ..Default::default()
            },
        )
        .unwrap();
        let b = add_activity(
            &mut trip,
            &day_id,
            NewActivity {
                name: "Market".into(),
                ..Default::default()
            },
        )
        .unwrap();

        reorder_activities(&mut trip, &day_id, 1, 0).unwrap();
        let names: Vec<&str> = trip.itinerary[0]
            .activities
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["Market", "Temple"]);

        let patch = ActivityPatch {
            time: Some("14:00".into()),
            ..Default::default()
        };
        update_activity(&mut trip, &day_id, &a, &patch).unwrap();
        delete_activity(&mut trip, &day_id, &b).unwrap();
        assert_eq!(trip.itinerary[0].activities.len(), 1);
        assert_eq!(trip.itinerary[0].activities[0].time, "14:00");
    }

    #[test]
    fn test_activity_on_missing_day() {
        let mut trip = trip_with_days(1);
        let err = add_activity(&mut trip, "ghost", NewActivity::default()).unwrap_err();
        assert_eq!(err, TripOpError::not_found("day", "ghost"));
    }
}
