// --- File: crates/ridebook_availability/src/lib.rs ---
// Declare modules within this crate
pub mod doc;
pub mod handlers;
pub mod logic;
#[cfg(test)]
mod logic_proptest;
pub mod routes;

// Re-export for main backend
pub use logic::AvailabilityEngine;
pub use routes::routes;
