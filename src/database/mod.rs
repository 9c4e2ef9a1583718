pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryPuzzleStore;
pub use postgres::PgPuzzleStore;
pub use repository::PgPrincipalStore;
pub use store::{PuzzleStore, StoreError, StoreResult};
