pub mod analysis;
pub mod api;
pub mod config;
pub mod factors;
pub mod git;
pub mod patterns;
pub mod reporters;
pub mod state;
pub mod types;
