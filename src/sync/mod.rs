pub mod cache;
pub mod engine;
pub mod memory;
pub mod remote;
pub mod seed;

pub use cache::{FileCache, LocalCache, MemoryCache};
pub use engine::{SyncEngine, SyncMode, SyncOptions, ThemePort};
pub use memory::MemoryStore;
pub use remote::{RemoteError, RemoteStore, Snapshot, Subscription};
