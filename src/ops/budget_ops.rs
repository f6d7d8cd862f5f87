//! Budget categories and the spending log.
//!
//! `BudgetCategory::actual` is kept equal to the sum of the spending entries
//! whose `category` string equals the category's `name`. Every spending
//! add/delete adjusts the matching total in the same operation.

use crate::model::new_id;
use crate::model::trip::{BudgetCategory, Trip};
use crate::ops::TripOpError;
use crate::ops::action::{BudgetCategoryPatch, NewBudgetCategory, NewSpending};

/// Add a category with zeroed min/max/actual. Returns its id.
pub fn add_category(trip: &mut Trip, category: NewBudgetCategory) -> String {
    let id = new_id();
    trip.budget.push(category.into_category(id.clone()));
    id
}

/// Patch a category. Renaming does not re-link spending entries: entries
/// keep the old name and stop counting towards this category.
pub fn update_category(
    trip: &mut Trip,
    id: &str,
    patch: &BudgetCategoryPatch,
) -> Result<(), TripOpError> {
    let category = trip
        .budget
        .iter_mut()
        .find(|c| c.id == id)
        .ok_or_else(|| TripOpError::not_found("budget category", id))?;
    patch.apply(category);
    Ok(())
}

pub fn delete_category(trip: &mut Trip, id: &str) -> Result<(), TripOpError> {
    let before = trip.budget.len();
    trip.budget.retain(|c| c.id != id);
    if trip.budget.len() == before {
        return Err(TripOpError::not_found("budget category", id));
    }
    Ok(())
}

/// Append a spending entry and add its amount to the matching category.
/// Returns the entry id.
pub fn add_spending(trip: &mut Trip, spending: NewSpending) -> String {
    let id = new_id();
    let entry = spending.into_entry(id.clone());
    if let Some(category) = find_by_name_mut(&mut trip.budget, &entry.category) {
        category.actual += entry.amount;
    }
    trip.spending_log.push(entry);
    id
}

/// Remove a spending entry and subtract its amount from the matching
/// category, never going below zero.
pub fn delete_spending(trip: &mut Trip, id: &str) -> Result<(), TripOpError> {
    let pos = trip
        .spending_log
        .iter()
        .position(|e| e.id == id)
        .ok_or_else(|| TripOpError::not_found("spending entry", id))?;
    let entry = trip.spending_log.remove(pos);
    if let Some(category) = find_by_name_mut(&mut trip.budget, &entry.category) {
        category.actual = (category.actual - entry.amount).max(0.0);
    }
    Ok(())
}

fn find_by_name_mut<'a>(budget: &'a mut [BudgetCategory], name: &str) -> Option<&'a mut BudgetCategory> {
    budget.iter_mut().find(|c| c.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip_with_food_budget() -> Trip {
        let mut trip = Trip::new("t1", "Test");
        add_category(
            &mut trip,
            NewBudgetCategory {
                name: "Food".into(),
                emoji: "🍜".into(),
            },
        );
        add_category(
            &mut trip,
            NewBudgetCategory {
                name: "Transport".into(),
                emoji: "🚕".into(),
            },
        );
        trip
    }

    fn spend(category: &str, amount: f64) -> NewSpending {
        NewSpending {
            description: "thing".into(),
            amount,
            category: category.into(),
            date: None,
        }
    }

    #[test]
    fn test_new_category_is_zeroed() {
        let trip = trip_with_food_budget();
        let food = &trip.budget[0];
        assert_eq!((food.min, food.max, food.actual), (0.0, 0.0, 0.0));
    }

    #[test]
    fn test_add_spending_increments_matching_category_only() {
        let mut trip = trip_with_food_budget();
        add_spending(&mut trip, spend("Food", 12.5));
        add_spending(&mut trip, spend("Food", 7.5));
        assert_eq!(trip.budget[0].actual, 20.0);
        assert_eq!(trip.budget[1].actual, 0.0);
        assert_eq!(trip.spending_log.len(), 2);
    }

    #[test]
    fn test_delete_spending_restores_total() {
        let mut trip = trip_with_food_budget();
        add_spending(&mut trip, spend("Food", 10.0));
        let id = add_spending(&mut trip, spend("Food", 4.0));
        delete_spending(&mut trip, &id).unwrap();
        assert_eq!(trip.budget[0].actual, 10.0);
        assert_eq!(trip.spending_log.len(), 1);
    }

    #[test]
    fn test_delete_spending_floors_at_zero() {
        let mut trip = trip_with_food_budget();
        let id = add_spending(&mut trip, spend("Food", 30.0));
        let patch = BudgetCategoryPatch {
            actual: Some(5.0),
            ..Default::default()
        };
        let food_id = trip.budget[0].id.clone();
        update_category(&mut trip, &food_id, &patch).unwrap();
        delete_spending(&mut trip, &id).unwrap();
        assert_eq!(trip.budget[0].actual, 0.0);
    }

    #[test]
    fn test_spending_without_category_is_logged_only() {
        let mut trip = trip_with_food_budget();
        add_spending(&mut trip, spend("Souvenirs", 9.0));
        assert_eq!(trip.spending_log.len(), 1);
        assert_eq!(trip.total_spent(), 0.0);
    }

    #[test]
    fn test_delete_category() {
        let mut trip = trip_with_food_budget();
        let id = trip.budget[1].id.clone();
        delete_category(&mut trip, &id).unwrap();
        assert_eq!(trip.budget.len(), 1);
        assert!(delete_category(&mut trip, &id).is_err());
    }
}
