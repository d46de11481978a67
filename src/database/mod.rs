pub mod gateway;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;

pub use gateway::{Gateway, Session};
pub use manager::{connect, DatabaseError};
pub use memory::MemoryGateway;
pub use postgres::PgGateway;
