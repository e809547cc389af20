pub mod card_repo;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod strategy_repo;

pub use card_repo::{Card, CardRepo};
pub use error::RepoError;
pub use memory::MemoryRepo;
pub use postgres::PgRepo;
pub use strategy_repo::{Attachment, Strategy, StrategyRepo};
