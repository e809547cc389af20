pub mod strategies;
pub mod threads;
