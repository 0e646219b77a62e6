//! # ABM Common Library
//!
//! Booking back-office logic shared by the ABM binaries:
//! - Pricing matrix with event-type / country / combination overrides
//! - Artist availability: blocked dates and range selection
//! - Seed (mock) data and catalogs
//! - Configuration loading
//! - Domain events
//! - Calendar-day helpers

pub mod availability;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod pricing;
pub mod seed;
pub mod time;

pub use availability::{AvailabilityCalendar, BlockOutcome, BlockedDateSet, SelectOutcome};
pub use error::{Error, Result};
pub use pricing::{PriceTier, PricingMatrix, PricingRule, RuleKey};
