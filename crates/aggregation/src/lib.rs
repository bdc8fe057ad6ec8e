//! # Aggregation Layer
//!
//! This crate turns a filtered slice of order records into the derived views
//! the dashboard displays: daily order/revenue trends, category rating
//! extremes, per-state metrics, payment-type mix, and deduplicated customer
//! counts for the choropleth map.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   files, HTTP, or widgets. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `AggregationEngine` is a stateless
//!   calculator. Every operation takes an already-filtered record slice and
//!   returns a freshly-computed view. Calls are independent and can run in
//!   any order.
//! - **Empty input is not an error:** group-by views come back empty and
//!   scalar means come back as `None`; nothing in this crate raises on an
//!   empty slice.
//!
//! ## Public API
//!
//! - `AggregationEngine`: the calculator with one method per derived view.
//! - The view structs in `views`: the typed rows each method produces.

pub mod engine;
pub mod views;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AggregationEngine;
pub use views::{
    CategoryRating, CategoryVolume, DailyOrders, PaymentTypeCount, RegionCount, StateRating,
    StateRevenue, StateCustomerCount, Summary,
};
