pub mod dates;
pub mod profile;
pub mod state;
pub mod trip;

pub use profile::*;
pub use state::*;
pub use trip::*;

/// Generate a fresh id for a trip or any nested entity
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
