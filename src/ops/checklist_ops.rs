//! Todos and the packing list.

use crate::model::new_id;
use crate::model::trip::{PackingItem, Todo, Trip};
use crate::ops::TripOpError;
use crate::ops::action::{NewPackingItem, NewTodo, PackingItemPatch, TodoPatch};

// ---------------------------------------------------------------------------
// Todos
// ---------------------------------------------------------------------------

pub fn add_todo(trip: &mut Trip, todo: NewTodo) -> String {
    let id = new_id();
    trip.todos.push(todo.into_todo(id.clone()));
    id
}

pub fn toggle_todo(trip: &mut Trip, id: &str) -> Result<(), TripOpError> {
    let todo = find_todo_mut(trip, id)?;
    todo.done = !todo.done;
    Ok(())
}

pub fn update_todo(trip: &mut Trip, id: &str, patch: &TodoPatch) -> Result<(), TripOpError> {
    patch.apply(find_todo_mut(trip, id)?);
    Ok(())
}

pub fn delete_todo(trip: &mut Trip, id: &str) -> Result<(), TripOpError> {
    let before = trip.todos.len();
    trip.todos.retain(|t| t.id != id);
    if trip.todos.len() == before {
        return Err(TripOpError::not_found("todo", id));
    }
    Ok(())
}

fn find_todo_mut<'a>(trip: &'a mut Trip, id: &str) -> Result<&'a mut Todo, TripOpError> {
    trip.todos
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| TripOpError::not_found("todo", id))
}

// ---------------------------------------------------------------------------
// Packing
// ---------------------------------------------------------------------------

pub fn add_packing_item(trip: &mut Trip, item: NewPackingItem) -> String {
    let id = new_id();
    trip.packing_list.push(item.into_item(id.clone()));
    id
}

pub fn toggle_packing_item(trip: &mut Trip, id: &str) -> Result<(), TripOpError> {
    let item = find_item_mut(trip, id)?;
    item.packed = !item.packed;
    Ok(())
}

pub fn update_packing_item(
    trip: &mut Trip,
    id: &str,
    patch: &PackingItemPatch,
) -> Result<(), TripOpError> {
    patch.apply(find_item_mut(trip, id)?);
    Ok(())
}

pub fn delete_packing_item(trip: &mut Trip, id: &str) -> Result<(), TripOpError> {
    let before = trip.packing_list.len();
    trip.packing_list.retain(|p| p.id != id);
    if trip.packing_list.len() == before {
        return Err(TripOpError::not_found("packing item", id));
    }
    Ok(())
}

/// Unpack everything; nothing is removed.
pub fn reset_packing(trip: &mut Trip) {
    for item in &mut trip.packing_list {
        item.packed = false;
    }
}

fn find_item_mut<'a>(trip: &'a mut Trip, id: &str) -> Result<&'a mut PackingItem, TripOpError> {
    trip.packing_list
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| TripOpError::not_found("packing item", id))
}
