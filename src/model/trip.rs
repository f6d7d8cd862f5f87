use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::dates;

pub const DEFAULT_CURRENCY: &str = "PHP";
pub const DEFAULT_TRIP_EMOJI: &str = "✈️";
pub const DEFAULT_DAY_EMOJI: &str = "📍";
pub const DEFAULT_ITEM_EMOJI: &str = "📌";
pub const DEFAULT_LIST_SECTION: &str = "Misc";

/// Readiness weights in percent points: bookings, todos, packing.
const READINESS_WEIGHTS: [f64; 3] = [40.0, 35.0, 25.0];

/// Keys a record does not model. Kept so that writing a document back does
/// not drop fields other clients put there.
pub type Extra = Map<String, Value>;

/// A planned journey and everything hanging off it.
///
/// This is the document shape shared with the remote store and the local
/// cache, so field names are camelCase on the wire and every field has a
/// default: documents written by older clients may omit any of them. Unknown
/// keys land in `extra` and are written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub travelers: u32,
    /// Profile ids. Weak references: a deleted profile leaves its id behind.
    pub traveler_ids: Vec<String>,
    #[serde(deserialize_with = "dates::optional")]
    pub start_date: Option<NaiveDate>,
    #[serde(deserialize_with = "dates::optional")]
    pub end_date: Option<NaiveDate>,
    pub currency: String,
    /// Ordered route waypoints, denormalized from `cities`.
    pub destinations: Vec<Destination>,
    pub cities: Vec<City>,
    pub itinerary: Vec<Day>,
    pub bookings: Vec<Booking>,
    pub budget: Vec<BudgetCategory>,
    pub spending_log: Vec<SpendingEntry>,
    pub todos: Vec<Todo>,
    pub packing_list: Vec<PackingItem>,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for Trip {
    fn default() -> Self {
        Trip {
            id: String::new(),
            name: String::new(),
            emoji: DEFAULT_TRIP_EMOJI.to_string(),
            travelers: 1,
            traveler_ids: Vec::new(),
            start_date: None,
            end_date: None,
            currency: DEFAULT_CURRENCY.to_string(),
            destinations: Vec::new(),
            cities: Vec::new(),
            itinerary: Vec::new(),
            bookings: Vec::new(),
            budget: Vec::new(),
            spending_log: Vec::new(),
            todos: Vec::new(),
            packing_list: Vec::new(),
            notes: String::new(),
            created_at: None,
            extra: Extra::new(),
        }
    }
}

impl Trip {
    /// Create an empty trip with the given id and name
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Trip {
            id: id.into(),
            name: name.into(),
            created_at: Some(Utc::now()),
            ..Default::default()
        }
    }

    /// Readiness score in percent: weighted completion of bookings (booked),
    /// todos (done) and packing (packed). An empty list counts as not started.
    pub fn readiness(&self) -> u8 {
        let ratios = [
            completion(&self.bookings, |b| b.status == BookingStatus::Booked),
            completion(&self.todos, |t| t.done),
            completion(&self.packing_list, |p| p.packed),
        ];
        let score: f64 = ratios
            .iter()
            .zip(READINESS_WEIGHTS)
            .map(|(ratio, weight)| ratio * weight)
            .sum();
        score.round().clamp(0.0, 100.0) as u8
    }

    pub fn total_budget(&self) -> f64 {
        self.budget.iter().map(|c| c.max).sum()
    }

    pub fn total_spent(&self) -> f64 {
        self.budget.iter().map(|c| c.actual).sum()
    }

    /// Traveler ids that do not resolve to any of `profile_ids`.
    ///
    /// Deleting a profile never rewrites trips; callers use this to render
    /// the leftover ids as "unknown traveler".
    pub fn dangling_traveler_ids<'a>(&'a self, profile_ids: &[&str]) -> Vec<&'a str> {
        self.traveler_ids
            .iter()
            .map(String::as_str)
            .filter(|id| !profile_ids.contains(id))
            .collect()
    }
}

fn completion<T>(items: &[T], is_complete: impl Fn(&T) -> bool) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    let done = items.iter().filter(|item| is_complete(item)).count();
    done as f64 / items.len() as f64
}

/// One stop on the route.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Destination {
    pub city: String,
    pub country: String,
    pub flag: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Destination {
    /// Take over another waypoint's city, country and flag.
    pub fn set_identity(&mut self, identity: &Destination) {
        self.city = identity.city.clone();
        self.country = identity.country.clone();
        self.flag = identity.flag.clone();
    }
}

/// Per-city notes. `city`/`country`/`flag` are mirrored onto the matching
/// destinations.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct City {
    pub id: String,
    pub city: String,
    pub country: String,
    pub flag: String,
    pub highlights: String,
    pub must_do: String,
    pub weather: String,
    pub currency_tip: String,
    pub notes: String,
    #[serde(flatten)]
    pub extra: Extra,
}

impl City {
    pub fn destination(&self) -> Destination {
        Destination {
            city: self.city.clone(),
            country: self.country.clone(),
            flag: self.flag.clone(),
            extra: Extra::new(),
        }
    }
}

/// An itinerary day. `day_number` is always the 1-based position in the
/// itinerary and is rewritten whenever the list changes shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Day {
    pub id: String,
    pub day_number: usize,
    #[serde(deserialize_with = "dates::optional")]
    pub date: Option<NaiveDate>,
    pub location: String,
    pub emoji: String,
    pub notes: String,
    pub activities: Vec<Activity>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl Default for Day {
    fn default() -> Self {
        Day {
            id: String::new(),
            day_number: 0,
            date: None,
            location: String::new(),
            emoji: DEFAULT_DAY_EMOJI.to_string(),
            notes: String::new(),
            activities: Vec::new(),
            extra: Extra::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Activity {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub time: String,
    pub notes: String,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingCategory {
    Flight,
    Hotel,
    Experience,
    Concert,
    Transport,
    #[default]
    Custom,
}

/// Booking progress. Cycling wraps: not started → in progress → booked → not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    NotStarted,
    InProgress,
    Booked,
}

impl BookingStatus {
    pub fn next(self) -> BookingStatus {
        match self {
            BookingStatus::NotStarted => BookingStatus::InProgress,
            BookingStatus::InProgress => BookingStatus::Booked,
            BookingStatus::Booked => BookingStatus::NotStarted,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BookingStatus::NotStarted => "Not Started",
            BookingStatus::InProgress => "In Progress",
            BookingStatus::Booked => "Booked",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub name: String,
    pub category: BookingCategory,
    pub status: BookingStatus,
    pub priority: bool,
    pub confirmation_number: String,
    pub amount_paid: f64,
    #[serde(deserialize_with = "dates::optional")]
    pub book_by_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A budget line. `actual` is the running total of the spending entries
/// whose `category` equals this category's `name`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetCategory {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub min: f64,
    pub max: f64,
    pub actual: f64,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpendingEntry {
    pub id: String,
    pub description: String,
    pub amount: f64,
    /// Name of the budget category this entry counts against.
    pub category: String,
    #[serde(deserialize_with = "dates::optional")]
    pub date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub text: String,
    pub category: String,
    pub done: bool,
    pub priority: TodoPriority,
    #[serde(deserialize_with = "dates::optional")]
    pub due_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Written as `"normal"` / `"high"`. Older documents store a bool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoPriority {
    #[default]
    Normal,
    High,
}

impl TodoPriority {
    pub fn is_high(self) -> bool {
        self == TodoPriority::High
    }
}

impl<'de> Deserialize<'de> for TodoPriority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Label(String),
        }

        let priority = match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Flag(true)) => TodoPriority::High,
            Some(Raw::Label(label)) if label.eq_ignore_ascii_case("high") => TodoPriority::High,
            _ => TodoPriority::Normal,
        };
        Ok(priority)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingItem {
    pub id: String,
    pub name: String,
    pub section: String,
    pub packed: bool,
    #[serde(flatten)]
    pub extra: Extra,
}
