//! City records and the route waypoints that mirror them.
//!
//! The cascade is one-way: city → destinations. Destinations are matched by
//! the city's name as it was *before* the update, so the old name is read
//! out before the patch is applied.

use crate::model::new_id;
use crate::model::trip::{City, Destination, Trip};
use crate::ops::TripOpError;
use crate::ops::action::{CityPatch, NewCity};

/// Add a city record and a matching waypoint at the end of the route.
/// Returns the city id.
pub fn add_city(trip: &mut Trip, city: NewCity) -> String {
    let id = new_id();
    let city = city.into_city(id.clone());
    trip.destinations.push(city.destination());
    trip.cities.push(city);
    id
}

/// Patch a city. When `city`, `country` or `flag` changed, every waypoint
/// named like the old city takes the new values.
pub fn update_city(trip: &mut Trip, id: &str, patch: &CityPatch) -> Result<(), TripOpError> {
    let city = find_city_mut(trip, id)?;
    let before = city.destination();
    patch.apply(city);
    let after = city.destination();

    if before != after {
        cascade_identity(trip, &before.city, &after);
    }
    Ok(())
}

/// Remove a city record and every waypoint carrying its name.
pub fn delete_city(trip: &mut Trip, id: &str) -> Result<(), TripOpError> {
    let pos = trip
        .cities
        .iter()
        .position(|c| c.id == id)
        .ok_or_else(|| TripOpError::not_found("city", id))?;
    let removed = trip.cities.remove(pos);
    trip.destinations.retain(|d| d.city != removed.city);
    Ok(())
}

fn cascade_identity(trip: &mut Trip, old_name: &str, identity: &Destination) {
    for dest in trip.destinations.iter_mut().filter(|d| d.city == old_name) {
        dest.set_identity(identity);
    }
}

fn find_city_mut<'a>(trip: &'a mut Trip, id: &str) -> Result<&'a mut City, TripOpError> {
    trip.cities
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| TripOpError::not_found("city", id))
}
