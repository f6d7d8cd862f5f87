pub mod action;
pub mod booking_ops;
pub mod budget_ops;
pub mod checklist_ops;
pub mod city_ops;
pub mod itinerary_ops;
pub mod reducer;
pub mod trip_ops;

pub use action::Action;
pub use reducer::reduce;

/// Error type for trip-scoped operations.
///
/// The reducer treats every error as "leave the trip unchanged"; the variants
/// exist so the reason shows up in logs and tests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TripOpError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("invalid position: {0}")]
    InvalidPosition(String),
}

impl TripOpError {
    pub(crate) fn not_found(kind: &'static str, id: &str) -> Self {
        TripOpError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

/// Move the element at `from` so it ends up at index `to`.
///
/// `to` past the end lands the element last. An out-of-range `from` is an
/// error and leaves the list untouched.
pub(crate) fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), TripOpError> {
    if from >= items.len() {
        return Err(TripOpError::InvalidPosition(format!(
            "index {} out of range for {} items",
            from,
            items.len()
        )));
    }
    let item = items.remove(from);
    let to = to.min(items.len());
    items.insert(to, item);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_item_forward_and_back() {
        let mut v = vec!['a', 'b', 'c', 'd'];
        move_item(&mut v, 0, 2).unwrap();
        assert_eq!(v, vec!['b', 'c', 'a', 'd']);
        move_item(&mut v, 3, 0).unwrap();
        assert_eq!(v, vec!['d', 'b', 'c', 'a']);
    }

    #[test]
    fn move_item_clamps_destination() {
        let mut v = vec![1, 2, 3];
        move_item(&mut v, 0, 99).unwrap();
        assert_eq!(v, vec![2, 3, 1]);
    }

    #[test]
    fn move_item_rejects_bad_source() {
        let mut v = vec![1, 2, 3];
        assert!(matches!(
            move_item(&mut v, 3, 0),
            Err(TripOpError::InvalidPosition(_))
        ));
        assert_eq!(v, vec![1, 2, 3]);
    }
}
