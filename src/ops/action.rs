//! Actions accepted by the reducer, their payloads and patches.
//!
//! The wire form is `{"type": "ADD_DAY", "payload": {...}}`. Payload field
//! names are camelCase like the trip documents themselves.

use chrono::{NaiveDate, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::dates;
use crate::model::state::{Tab, ToastKind};
use crate::model::trip::{
    Activity, Booking, BookingCategory, BookingStatus, BudgetCategory, City, DEFAULT_ITEM_EMOJI,
    DEFAULT_LIST_SECTION, Day, PackingItem, SpendingEntry, Todo, TodoPriority, Trip,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    // --- Trip lifecycle ---
    AddTrip(Box<Trip>),
    DeleteTrip(String),
    DuplicateTrip(String),
    RenameTrip {
        id: String,
        name: String,
    },
    UpdateTrip(TripPatch),
    UpdateNotes(String),

    // --- Navigation / UI ---
    SetActiveTrip(String),
    SetTab(Tab),
    SetSidebar(bool),
    ToggleSidebar,
    ToggleDarkMode,
    ShowToast {
        message: String,
        #[serde(default, rename = "type")]
        kind: ToastKind,
    },
    HideToast,

    // --- Itinerary ---
    AddDay(NewDay),
    RemoveDay(String),
    #[serde(rename_all = "camelCase")]
    UpdateDay {
        day_id: String,
        updates: DayPatch,
    },
    ReorderDays {
        from: usize,
        to: usize,
    },
    #[serde(rename_all = "camelCase")]
    AddActivity {
        day_id: String,
        activity: NewActivity,
    },
    #[serde(rename_all = "camelCase")]
    UpdateActivity {
        day_id: String,
        activity_id: String,
        updates: ActivityPatch,
    },
    #[serde(rename_all = "camelCase")]
    DeleteActivity {
        day_id: String,
        activity_id: String,
    },
    #[serde(rename_all = "camelCase")]
    ReorderActivities {
        day_id: String,
        from: usize,
        to: usize,
    },

    // --- Bookings ---
    AddBooking(NewBooking),
    UpdateBooking {
        id: String,
        updates: BookingPatch,
    },
    DeleteBooking(String),
    CycleBookingStatus(String),
    SetBookingStatus {
        id: String,
        status: BookingStatus,
    },

    // --- Budget ---
    AddBudgetCategory(NewBudgetCategory),
    UpdateBudgetCategory {
        id: String,
        updates: BudgetCategoryPatch,
    },
    DeleteBudgetCategory(String),
    AddSpending(NewSpending),
    DeleteSpending(String),

    // --- Todos ---
    AddTodo(NewTodo),
    ToggleTodo(String),
    UpdateTodo {
        id: String,
        updates: TodoPatch,
    },
    DeleteTodo(String),

    // --- Packing ---
    AddPackingItem(NewPackingItem),
    TogglePackingItem(String),
    UpdatePackingItem {
        id: String,
        updates: PackingItemPatch,
    },
    DeletePackingItem(String),
    ResetPacking,

    // --- Cities ---
    AddCity(NewCity),
    UpdateCity {
        id: String,
        updates: CityPatch,
    },
    DeleteCity(String),

    /// Wholesale replacement of the trips map. Only the sync engine sends this.
    SetTripsFromRemote(IndexMap<String, Trip>),
}

impl Action {
    /// The wire tag, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Action::AddTrip(_) => "ADD_TRIP",
            Action::DeleteTrip(_) => "DELETE_TRIP",
            Action::DuplicateTrip(_) => "DUPLICATE_TRIP",
            Action::RenameTrip { .. } => "RENAME_TRIP",
            Action::UpdateTrip(_) => "UPDATE_TRIP",
            Action::UpdateNotes(_) => "UPDATE_NOTES",
            Action::SetActiveTrip(_) => "SET_ACTIVE_TRIP",
            Action::SetTab(_) => "SET_TAB",
            Action::SetSidebar(_) => "SET_SIDEBAR",
            Action::ToggleSidebar => "TOGGLE_SIDEBAR",
            Action::ToggleDarkMode => "TOGGLE_DARK_MODE",
            Action::ShowToast { .. } => "SHOW_TOAST",
            Action::HideToast => "HIDE_TOAST",
            Action::AddDay(_) => "ADD_DAY",
            Action::RemoveDay(_) => "REMOVE_DAY",
            Action::UpdateDay { .. } => "UPDATE_DAY",
            Action::ReorderDays { .. } => "REORDER_DAYS",
            Action::AddActivity { .. } => "ADD_ACTIVITY",
            Action::UpdateActivity { .. } => "UPDATE_ACTIVITY",
            Action::DeleteActivity { .. } => "DELETE_ACTIVITY",
            Action::ReorderActivities { .. } => "REORDER_ACTIVITIES",
            Action::AddBooking(_) => "ADD_BOOKING",
            Action::UpdateBooking { .. } => "UPDATE_BOOKING",
            Action::DeleteBooking(_) => "DELETE_BOOKING",
            Action::CycleBookingStatus(_) => "CYCLE_BOOKING_STATUS",
            Action::SetBookingStatus { .. } => "SET_BOOKING_STATUS",
            Action::AddBudgetCategory(_) => "ADD_BUDGET_CATEGORY",
            Action::UpdateBudgetCategory { .. } => "UPDATE_BUDGET_CATEGORY",
            Action::DeleteBudgetCategory(_) => "DELETE_BUDGET_CATEGORY",
            Action::AddSpending(_) => "ADD_SPENDING",
            Action::DeleteSpending(_) => "DELETE_SPENDING",
            Action::AddTodo(_) => "ADD_TODO",
            Action::ToggleTodo(_) => "TOGGLE_TODO",
            Action::UpdateTodo { .. } => "UPDATE_TODO",
            Action::DeleteTodo(_) => "DELETE_TODO",
            Action::AddPackingItem(_) => "ADD_PACKING_ITEM",
            Action::TogglePackingItem(_) => "TOGGLE_PACKING_ITEM",
            Action::UpdatePackingItem { .. } => "UPDATE_PACKING_ITEM",
            Action::DeletePackingItem(_) => "DELETE_PACKING_ITEM",
            Action::ResetPacking => "RESET_PACKING",
            Action::AddCity(_) => "ADD_CITY",
            Action::UpdateCity { .. } => "UPDATE_CITY",
            Action::DeleteCity(_) => "DELETE_CITY",
            Action::SetTripsFromRemote(_) => "SET_TRIPS_FROM_REMOTE",
        }
    }
}

// ---------------------------------------------------------------------------
// Payloads for "add" actions
// ---------------------------------------------------------------------------

fn or_default(value: String, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewDay {
    #[serde(deserialize_with = "dates::optional")]
    pub date: Option<NaiveDate>,
    pub location: String,
    pub emoji: Option<String>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewActivity {
    pub name: String,
    pub emoji: String,
    pub time: String,
    pub notes: String,
}

impl NewActivity {
    pub fn into_activity(self, id: String) -> Activity {
        Activity {
            id,
            name: self.name,
            emoji: or_default(self.emoji, DEFAULT_ITEM_EMOJI),
            time: self.time,
            notes: self.notes,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewBooking {
    pub name: String,
    pub category: BookingCategory,
    pub status: BookingStatus,
    pub priority: bool,
    pub confirmation_number: String,
    pub amount_paid: f64,
    #[serde(deserialize_with = "dates::optional")]
    pub book_by_date: Option<NaiveDate>,
}

impl NewBooking {
    pub fn into_booking(self, id: String) -> Booking {
        Booking {
            id,
            name: self.name,
            category: self.category,
            status: self.status,
            priority: self.priority,
            confirmation_number: self.confirmation_number,
            amount_paid: self.amount_paid,
            book_by_date: self.book_by_date,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewBudgetCategory {
    pub name: String,
    pub emoji: String,
}

impl NewBudgetCategory {
    pub fn into_category(self, id: String) -> BudgetCategory {
        BudgetCategory {
            id,
            name: or_default(self.name, "New Category"),
            emoji: or_default(self.emoji, DEFAULT_ITEM_EMOJI),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewSpending {
    pub description: String,
    pub amount: f64,
    pub category: String,
    #[serde(deserialize_with = "dates::optional")]
    pub date: Option<NaiveDate>,
}

impl NewSpending {
    /// Undated entries are dated today (UTC).
    pub fn into_entry(self, id: String) -> SpendingEntry {
        SpendingEntry {
            id,
            description: self.description,
            amount: self.amount,
            category: self.category,
            date: self.date.or_else(|| Some(Utc::now().date_naive())),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewTodo {
    pub text: String,
    pub category: String,
    pub priority: TodoPriority,
    #[serde(deserialize_with = "dates::optional")]
    pub due_date: Option<NaiveDate>,
}

impl NewTodo {
    pub fn into_todo(self, id: String) -> Todo {
        Todo {
            id,
            text: self.text,
            category: or_default(self.category, DEFAULT_LIST_SECTION),
            done: false,
            priority: self.priority,
            due_date: self.due_date,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewPackingItem {
    pub name: String,
    pub section: String,
}

impl NewPackingItem {
    pub fn into_item(self, id: String) -> PackingItem {
        PackingItem {
            id,
            name: self.name,
            section: or_default(self.section, DEFAULT_LIST_SECTION),
            packed: false,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewCity {
    pub city: String,
    pub country: String,
    pub flag: String,
    pub highlights: String,
    pub must_do: String,
    pub weather: String,
    pub currency_tip: String,
    pub notes: String,
}

impl NewCity {
    pub fn into_city(self, id: String) -> City {
        City {
            id,
            city: self.city,
            country: self.country,
            flag: self.flag,
            highlights: self.highlights,
            must_do: self.must_do,
            weather: self.weather,
            currency_tip: self.currency_tip,
            notes: self.notes,
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Patches. Absent fields leave the target untouched.
// ---------------------------------------------------------------------------

fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *slot = v.clone();
    }
}

/// Top-level scalar fields of a trip
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TripPatch {
    pub name: Option<String>,
    pub emoji: Option<String>,
    pub travelers: Option<u32>,
    pub traveler_ids: Option<Vec<String>>,
    #[serde(deserialize_with = "dates::patch", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(deserialize_with = "dates::patch", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Option<NaiveDate>>,
    pub currency: Option<String>,
}

impl TripPatch {
    pub fn apply(&self, trip: &mut Trip) {
        set(&mut trip.name, &self.name);
        set(&mut trip.emoji, &self.emoji);
        set(&mut trip.travelers, &self.travelers);
        set(&mut trip.traveler_ids, &self.traveler_ids);
        set(&mut trip.start_date, &self.start_date);
        set(&mut trip.end_date, &self.end_date);
        set(&mut trip.currency, &self.currency);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DayPatch {
    #[serde(deserialize_with = "dates::patch", skip_serializing_if = "Option::is_none")]
    pub date: Option<Option<NaiveDate>>,
    pub location: Option<String>,
    pub emoji: Option<String>,
    pub notes: Option<String>,
}

impl DayPatch {
    pub fn apply(&self, day: &mut Day) {
        set(&mut day.date, &self.date);
        set(&mut day.location, &self.location);
        set(&mut day.emoji, &self.emoji);
        set(&mut day.notes, &self.notes);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityPatch {
    pub name: Option<String>,
    pub emoji: Option<String>,
    pub time: Option<String>,
    pub notes: Option<String>,
}

impl ActivityPatch {
    pub fn apply(&self, activity: &mut Activity) {
        set(&mut activity.name, &self.name);
        set(&mut activity.emoji, &self.emoji);
        set(&mut activity.time, &self.time);
        set(&mut activity.notes, &self.notes);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookingPatch {
    pub name: Option<String>,
    pub category: Option<BookingCategory>,
    pub status: Option<BookingStatus>,
    pub priority: Option<bool>,
    pub confirmation_number: Option<String>,
    pub amount_paid: Option<f64>,
    #[serde(deserialize_with = "dates::patch", skip_serializing_if = "Option::is_none")]
    pub book_by_date: Option<Option<NaiveDate>>,
}

impl BookingPatch {
    pub fn apply(&self, booking: &mut Booking) {
        set(&mut booking.name, &self.name);
        set(&mut booking.category, &self.category);
        set(&mut booking.status, &self.status);
        set(&mut booking.priority, &self.priority);
        set(&mut booking.confirmation_number, &self.confirmation_number);
        set(&mut booking.amount_paid, &self.amount_paid);
        set(&mut booking.book_by_date, &self.book_by_date);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetCategoryPatch {
    pub name: Option<String>,
    pub emoji: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Manual override of the running total
    pub actual: Option<f64>,
}

impl BudgetCategoryPatch {
    pub fn apply(&self, category: &mut BudgetCategory) {
        set(&mut category.name, &self.name);
        set(&mut category.emoji, &self.emoji);
        set(&mut category.min, &self.min);
        set(&mut category.max, &self.max);
        set(&mut category.actual, &self.actual);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TodoPatch {
    pub text: Option<String>,
    pub category: Option<String>,
    pub done: Option<bool>,
    pub priority: Option<TodoPriority>,
    #[serde(deserialize_with = "dates::patch", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
}

impl TodoPatch {
    pub fn apply(&self, todo: &mut Todo) {
        set(&mut todo.text, &self.text);
        set(&mut todo.category, &self.category);
        set(&mut todo.done, &self.done);
        set(&mut todo.priority, &self.priority);
        set(&mut todo.due_date, &self.due_date);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingItemPatch {
    pub name: Option<String>,
    pub section: Option<String>,
    pub packed: Option<bool>,
}

impl PackingItemPatch {
    pub fn apply(&self, item: &mut PackingItem) {
        set(&mut item.name, &self.name);
        set(&mut item.section, &self.section);
        set(&mut item.packed, &self.packed);
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CityPatch {
    pub city: Option<String>,
    pub country: Option<String>,
    pub flag: Option<String>,
    pub highlights: Option<String>,
    pub must_do: Option<String>,
    pub weather: Option<String>,
    pub currency_tip: Option<String>,
    pub notes: Option<String>,
}

impl CityPatch {
    pub fn apply(&self, city: &mut City) {
        set(&mut city.city, &self.city);
        set(&mut city.country, &self.country);
        set(&mut city.flag, &self.flag);
        set(&mut city.highlights, &self.highlights);
        set(&mut city.must_do, &self.must_do);
        set(&mut city.weather, &self.weather);
        set(&mut city.currency_tip, &self.currency_tip);
        set(&mut city.notes, &self.notes);
    }
}
