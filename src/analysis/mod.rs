pub mod aggregate;
pub mod prediction;
