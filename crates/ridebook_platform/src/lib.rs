// --- File: crates/ridebook_platform/src/lib.rs ---

pub mod client;
pub mod error;
pub mod models;
pub mod normalize;
pub mod service;
pub mod strategy;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use client::RestPlatformClient;
pub use error::PlatformError;
pub use models::*;
pub use service::{BoxFuture, SchedulingPlatform};
