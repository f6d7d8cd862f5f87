//! The state transition function.
//!
//! `reduce` never mutates its input. The trips map is cloned shallowly (a map
//! of `Arc`s) and only the trip an action touches is rebuilt, so every other
//! trip in the returned state is `Arc::ptr_eq` to the one in the input.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::model::state::{AppState, Tab, Toast, TripMap};
use crate::model::trip::Trip;
use crate::ops::action::Action;
use crate::ops::{
    TripOpError, booking_ops, budget_ops, checklist_ops, city_ops, itinerary_ops, trip_ops,
};

/// Apply one action and return the resulting state.
pub fn reduce(state: &AppState, action: Action) -> AppState {
    let mut next = state.clone();
    let kind = action.kind();
    let active = state.active_trip_id.as_deref();

    match action {
        // --- Trip lifecycle ---
        Action::AddTrip(trip) => {
            let id = trip.id.clone();
            next.trips.insert(id.clone(), Arc::new(*trip));
            next.active_trip_id = Some(id);
            next.active_tab = Tab::Overview;
        }
        Action::DeleteTrip(id) => {
            if next.trips.shift_remove(&id).is_none() {
                debug!(action = kind, id = %id, "no such trip");
            }
            // Selection always moves to the first remaining trip
            next.active_trip_id = next.trips.keys().next().cloned();
            next.active_tab = Tab::Overview;
        }
        Action::DuplicateTrip(id) => {
            let Some(source) = state.trips.get(&id) else {
                debug!(action = kind, id = %id, "no such trip");
                return next;
            };
            let copy = trip_ops::duplicate(source);
            let copy_id = copy.id.clone();
            next.trips.insert(copy_id.clone(), Arc::new(copy));
            next.active_trip_id = Some(copy_id);
        }
        Action::RenameTrip { id, name } => {
            update_trip(&mut next.trips, Some(id.as_str()), kind, |t| {
                trip_ops::rename(t, &name);
                Ok(())
            });
        }
        Action::UpdateTrip(patch) => update_trip(&mut next.trips, active, kind, |t| {
            trip_ops::update_trip(t, &patch);
            Ok(())
        }),
        Action::UpdateNotes(notes) => update_trip(&mut next.trips, active, kind, |t| {
            trip_ops::update_notes(t, &notes);
            Ok(())
        }),

        // --- Navigation / UI ---
        Action::SetActiveTrip(id) => {
            next.active_trip_id = Some(id);
            next.active_tab = Tab::Overview;
        }
        Action::SetTab(tab) => next.active_tab = tab,
        Action::SetSidebar(open) => next.sidebar_open = open,
        Action::ToggleSidebar => next.sidebar_open = !state.sidebar_open,
        Action::ToggleDarkMode => next.dark_mode = !state.dark_mode,
        Action::ShowToast { message, kind } => {
            next.toast = Toast {
                message,
                kind,
                visible: true,
            };
        }
        Action::HideToast => next.toast.visible = false,

        // --- Itinerary ---
        Action::AddDay(day) => update_trip(&mut next.trips, active, kind, |t| {
            itinerary_ops::add_day(t, day);
            Ok(())
        }),
        Action::RemoveDay(day_id) => update_trip(&mut next.trips, active, kind, |t| {
            itinerary_ops::remove_day(t, &day_id)
        }),
        Action::UpdateDay { day_id, updates } => {
            update_trip(&mut next.trips, active, kind, |t| {
                itinerary_ops::update_day(t, &day_id, &updates)
            })
        }
        Action::ReorderDays { from, to } => update_trip(&mut next.trips, active, kind, |t| {
            itinerary_ops::reorder_days(t, from, to)
        }),
        Action::AddActivity { day_id, activity } => {
            update_trip(&mut next.trips, active, kind, |t| {
                itinerary_ops::add_activity(t, &day_id, activity).map(|_| ())
            })
        }
        Action::UpdateActivity {
            day_id,
            activity_id,
            updates,
        } => update_trip(&mut next.trips, active, kind, |t| {
            itinerary_ops::update_activity(t, &day_id, &activity_id, &updates)
        }),
        Action::DeleteActivity {
            day_id,
            activity_id,
        } => update_trip(&mut next.trips, active, kind, |t| {
            itinerary_ops::delete_activity(t, &day_id, &activity_id)
        }),
        Action::ReorderActivities { day_id, from, to } => {
            update_trip(&mut next.trips, active, kind, |t| {
                itinerary_ops::reorder_activities(t, &day_id, from, to)
            })
        }

        // --- Bookings ---
        Action::AddBooking(booking) => update_trip(&mut next.trips, active, kind, |t| {
            booking_ops::add_booking(t, booking);
            Ok(())
        }),
        Action::UpdateBooking { id, updates } => {
            update_trip(&mut next.trips, active, kind, |t| {
                booking_ops::update_booking(t, &id, &updates)
            })
        }
        Action::DeleteBooking(id) => update_trip(&mut next.trips, active, kind, |t| {
            booking_ops::delete_booking(t, &id)
        }),
        Action::CycleBookingStatus(id) => update_trip(&mut next.trips, active, kind, |t| {
            booking_ops::cycle_status(t, &id).map(|_| ())
        }),
        Action::SetBookingStatus { id, status } => {
            update_trip(&mut next.trips, active, kind, |t| {
                booking_ops::set_status(t, &id, status)
            })
        }

        // --- Budget ---
        Action::AddBudgetCategory(category) => update_trip(&mut next.trips, active, kind, |t| {
            budget_ops::add_category(t, category);
            Ok(())
        }),
        Action::UpdateBudgetCategory { id, updates } => {
            update_trip(&mut next.trips, active, kind, |t| {
                budget_ops::update_category(t, &id, &updates)
            })
        }
        Action::DeleteBudgetCategory(id) => update_trip(&mut next.trips, active, kind, |t| {
            budget_ops::delete_category(t, &id)
        }),
        Action::AddSpending(spending) => update_trip(&mut next.trips, active, kind, |t| {
            budget_ops::add_spending(t, spending);
            Ok(())
        }),
        Action::DeleteSpending(id) => update_trip(&mut next.trips, active, kind, |t| {
            budget_ops::delete_spending(t, &id)
        }),

        // --- Todos ---
        Action::AddTodo(todo) => update_trip(&mut next.trips, active, kind, |t| {
            checklist_ops::add_todo(t, todo);
            Ok(())
        }),
        Action::ToggleTodo(id) => update_trip(&mut next.trips, active, kind, |t| {
            checklist_ops::toggle_todo(t, &id)
        }),
        Action::UpdateTodo { id, updates } => update_trip(&mut next.trips, active, kind, |t| {
            checklist_ops::update_todo(t, &id, &updates)
        }),
        Action::DeleteTodo(id) => update_trip(&mut next.trips, active, kind, |t| {
            checklist_ops::delete_todo(t, &id)
        }),

        // --- Packing ---
        Action::AddPackingItem(item) => update_trip(&mut next.trips, active, kind, |t| {
            checklist_ops::add_packing_item(t, item);
            Ok(())
        }),
        Action::TogglePackingItem(id) => update_trip(&mut next.trips, active, kind, |t| {
            checklist_ops::toggle_packing_item(t, &id)
        }),
        Action::UpdatePackingItem { id, updates } => {
            update_trip(&mut next.trips, active, kind, |t| {
                checklist_ops::update_packing_item(t, &id, &updates)
            })
        }
        Action::DeletePackingItem(id) => update_trip(&mut next.trips, active, kind, |t| {
            checklist_ops::delete_packing_item(t, &id)
        }),
        Action::ResetPacking => update_trip(&mut next.trips, active, kind, |t| {
            checklist_ops::reset_packing(t);
            Ok(())
        }),

        // --- Cities ---
        Action::AddCity(city) => update_trip(&mut next.trips, active, kind, |t| {
            city_ops::add_city(t, city);
            Ok(())
        }),
        Action::UpdateCity { id, updates } => update_trip(&mut next.trips, active, kind, |t| {
            city_ops::update_city(t, &id, &updates)
        }),
        Action::DeleteCity(id) => update_trip(&mut next.trips, active, kind, |t| {
            city_ops::delete_city(t, &id)
        }),

        // --- Remote intake ---
        Action::SetTripsFromRemote(trips) => {
            next.trips = adopt_remote(&state.trips, trips);
            let keep = active.filter(|id| next.trips.contains_key(*id));
            next.active_trip_id = keep
                .map(str::to_string)
                .or_else(|| next.trips.keys().next().cloned());
        }
    }

    next
}

/// Rebuild the trip `id` through `op`.
///
/// The trip is cloned, edited, and only swapped in when the result differs.
/// A missing trip, a failed op, or an op that changed nothing leaves the
/// original `Arc` in place.
fn update_trip<F>(trips: &mut TripMap, id: Option<&str>, kind: &'static str, op: F)
where
    F: FnOnce(&mut Trip) -> Result<(), TripOpError>,
{
    let Some(id) = id else {
        debug!(action = kind, "no active trip");
        return;
    };
    let Some(current) = trips.get(id) else {
        debug!(action = kind, id, "no such trip");
        return;
    };

    let mut edited = Trip::clone(current);
    if let Err(e) = op(&mut edited) {
        debug!(action = kind, id, error = %e, "action left trip unchanged");
        return;
    }
    if edited != **current {
        trips.insert(id.to_string(), Arc::new(edited));
    }
}

/// Turn an incoming trips map into a `TripMap`, reusing the existing `Arc`
/// for every trip whose content is unchanged.
fn adopt_remote(previous: &TripMap, incoming: IndexMap<String, Trip>) -> TripMap {
    incoming
        .into_iter()
        .map(|(id, trip)| {
            let shared = match previous.get(&id) {
                Some(prev) if **prev == trip => Arc::clone(prev),
                _ => Arc::new(trip),
            };
            (id, shared)
        })
        .collect()
}
