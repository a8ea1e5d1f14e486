//! Persistence layer: scoped JSON state in libSQL or memory.

pub mod libsql_backend;
pub mod memory;
pub mod migrations;
pub mod state;
pub mod traits;

pub use libsql_backend::LibSqlBackend;
pub use memory::MemoryStore;
pub use state::{BotState, CachedState, StateScope};
pub use traits::Database;
