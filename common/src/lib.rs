pub mod clients;
pub mod error;
pub mod utils;
