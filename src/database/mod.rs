pub mod executor;
pub mod manager;

pub use executor::QueryExecutor;
pub use manager::{DatabaseError, DatabaseManager};
