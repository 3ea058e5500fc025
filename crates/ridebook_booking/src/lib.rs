// --- File: crates/ridebook_booking/src/lib.rs ---
// Declare modules within this crate
pub mod doc;
pub mod handlers;
pub mod logic;
pub mod mapping;
pub mod models;
pub mod routes;
pub mod validation;
#[cfg(test)]
mod validation_proptest;

// Re-export for main backend
pub use logic::BookingOrchestrator;
pub use models::{BookingConfirmation, BookingResult, NormalizedBooking, ValidationResult};
pub use routes::routes;
pub use validation::{normalize, normalize_phone_e164, validate};
