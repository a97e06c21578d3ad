//! Read-only access to the SELECT usage group API.

pub mod client;
pub mod model;

pub use client::{DEFAULT_BASE_URL, SelectClient};
pub use model::{Ownership, UsageGroup, UsageGroupInventory, UsageGroupSet};
