pub mod health;
pub mod strategies;
pub mod threads;
