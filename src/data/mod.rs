pub mod columns;
pub mod datetime;
pub mod loader;
pub mod parser;
