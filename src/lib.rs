pub mod api;
pub mod cli;
pub mod errors;
pub mod generator;
pub mod interpreter;
pub mod sink;
pub mod stream;
mod transactions;
pub mod volume;
