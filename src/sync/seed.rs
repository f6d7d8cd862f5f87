//! The example trip written to an empty collection on first run.

use chrono::NaiveDate;

use crate::model::trip::{
    Activity, Booking, BookingCategory, BookingStatus, BudgetCategory, City, Day, PackingItem,
    Todo, TodoPriority, Trip,
};

pub const EXAMPLE_TRIP_ID: &str = "example-trip";

fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn city(id: &str, name: &str, country: &str, flag: &str, highlights: &str) -> City {
    City {
        id: id.into(),
        city: name.into(),
        country: country.into(),
        flag: flag.into(),
        highlights: highlights.into(),
        ..Default::default()
    }
}

fn activity(id: &str, emoji: &str, name: &str, time: &str) -> Activity {
    Activity {
        id: id.into(),
        name: name.into(),
        emoji: emoji.into(),
        time: time.into(),
        ..Default::default()
    }
}

fn budget(id: &str, emoji: &str, name: &str, min: f64, max: f64) -> BudgetCategory {
    BudgetCategory {
        id: id.into(),
        name: name.into(),
        emoji: emoji.into(),
        min,
        max,
        ..Default::default()
    }
}

fn packing(id: &str, section: &str, name: &str) -> PackingItem {
    PackingItem {
        id: id.into(),
        name: name.into(),
        section: section.into(),
        ..Default::default()
    }
}

/// A small but complete trip touching every section.
pub fn example_trip() -> Trip {
    let cities = vec![
        city("c-tokyo", "Tokyo", "Japan", "🇯🇵", "Shibuya crossing, Tsukiji outer market"),
        city("c-kyoto", "Kyoto", "Japan", "🇯🇵", "Fushimi Inari, Arashiyama bamboo grove"),
    ];

    Trip {
        id: EXAMPLE_TRIP_ID.into(),
        name: "Japan in Spring".into(),
        emoji: "🌸".into(),
        travelers: 2,
        start_date: date(2026, 4, 2),
        end_date: date(2026, 4, 5),
        currency: "JPY".into(),
        destinations: cities.iter().map(City::destination).collect(),
        cities,
        itinerary: vec![
            Day {
                id: "d-1".into(),
                day_number: 1,
                date: date(2026, 4, 2),
                location: "Tokyo".into(),
                emoji: "🗼".into(),
                activities: vec![
                    activity("a-1", "🛬", "Arrive at Haneda", "09:30"),
                    activity("a-2", "🍣", "Dinner in Ginza", "19:00"),
                ],
                ..Default::default()
            },
            Day {
                id: "d-2".into(),
                day_number: 2,
                date: date(2026, 4, 3),
                location: "Tokyo".into(),
                emoji: "🌸".into(),
                notes: "Cherry blossoms should be at peak".into(),
                activities: vec![activity("a-3", "🌳", "Hanami in Ueno Park", "10:00")],
                ..Default::default()
            },
            Day {
                id: "d-3".into(),
                day_number: 3,
                date: date(2026, 4, 4),
                location: "Kyoto".into(),
                emoji: "⛩️".into(),
                activities: vec![
                    activity("a-4", "🚄", "Shinkansen to Kyoto", "08:00"),
                    activity("a-5", "⛩️", "Fushimi Inari", "14:00"),
                ],
                ..Default::default()
            },
        ],
        bookings: vec![
            Booking {
                id: "b-1".into(),
                name: "Round-trip flights".into(),
                category: BookingCategory::Flight,
                status: BookingStatus::Booked,
                priority: true,
                confirmation_number: "JL4821".into(),
                amount_paid: 84_000.0,
                ..Default::default()
            },
            Booking {
                id: "b-2".into(),
                name: "Kyoto ryokan".into(),
                category: BookingCategory::Hotel,
                status: BookingStatus::InProgress,
                book_by_date: date(2026, 2, 15),
                ..Default::default()
            },
        ],
        budget: vec![
            budget("bc-1", "🏨", "Accommodation", 40_000.0, 60_000.0),
            budget("bc-2", "🍜", "Food", 15_000.0, 25_000.0),
            budget("bc-3", "🚆", "Transport", 10_000.0, 15_000.0),
        ],
        todos: vec![
            Todo {
                id: "td-1".into(),
                text: "Buy JR Pass".into(),
                category: "Transport".into(),
                priority: TodoPriority::High,
                due_date: date(2026, 3, 1),
                ..Default::default()
            },
            Todo {
                id: "td-2".into(),
                text: "Get travel insurance".into(),
                category: "Admin".into(),
                ..Default::default()
            },
        ],
        packing_list: vec![
            packing("p-1", "Documents", "Passport"),
            packing("p-2", "Tech", "Universal adapter"),
            packing("p-3", "Clothes", "Light jacket"),
        ],
        notes: "Carry cash: many small shops do not take cards.".into(),
        ..Default::default()
    }
}
