pub mod memory;
pub mod pool;
pub mod postgres;
pub mod repository;

pub use memory::InMemoryMatchRepository;
pub use postgres::PgMatchRepository;
pub use repository::MatchRepository;
