pub mod config_io;
pub mod dir_store;

pub use dir_store::{DirStore, atomic_write};
