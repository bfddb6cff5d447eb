pub mod memory;
pub mod pool;
pub mod postgres;
pub mod store;

pub use memory::InMemoryStore;
pub use postgres::PgStore;
pub use store::EntityStore;
