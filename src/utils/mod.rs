pub mod board;
pub mod client;
pub mod query;
pub mod report;
