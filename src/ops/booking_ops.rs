use crate::model::new_id;
use crate::model::trip::{Booking, BookingStatus, Trip};
use crate::ops::TripOpError;
use crate::ops::action::{BookingPatch, NewBooking};

/// Add a booking at the top of the list (newest first). Returns its id.
pub fn add_booking(trip: &mut Trip, booking: NewBooking) -> String {
    let id = new_id();
    trip.bookings.insert(0, booking.into_booking(id.clone()));
    id
}

pub fn update_booking(trip: &mut Trip, id: &str, patch: &BookingPatch) -> Result<(), TripOpError> {
    patch.apply(find_booking_mut(trip, id)?);
    Ok(())
}

pub fn delete_booking(trip: &mut Trip, id: &str) -> Result<(), TripOpError> {
    let before = trip.bookings.len();
    trip.bookings.retain(|b| b.id != id);
    if trip.bookings.len() == before {
        return Err(TripOpError::not_found("booking", id));
    }
    Ok(())
}

/// Advance the status one step: not started → in progress → booked → not started
pub fn cycle_status(trip: &mut Trip, id: &str) -> Result<BookingStatus, TripOpError> {
    let booking = find_booking_mut(trip, id)?;
    booking.status = booking.status.next();
    Ok(booking.status)
}

pub fn set_status(trip: &mut Trip, id: &str, status: BookingStatus) -> Result<(), TripOpError> {
    find_booking_mut(trip, id)?.status = status;
    Ok(())
}

fn find_booking_mut<'a>(trip: &'a mut Trip, id: &str) -> Result<&'a mut Booking, TripOpError> {
    trip.bookings
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or_else(|| TripOpError::not_found("booking", id))
}
