//! # Trends
//!
//! Sales records and the trend aggregation behind the sales chart.
//!
//! ## Records
//! - Sale: `saleDate` (`YYYY-MM-DD`), `saleCount`, optional `category`, anything else kept as-is
//! - Product: integer `id` plus arbitrary fields
//! - Both are stored wrapped, `{ "sales": [...] }` and `{ "products": [...] }`
//!
//! ## Aggregation
//! 1. Keep sales of the requested category (case-insensitive), if any
//! 2. Parse the sale date. Under `all` an unparseable date is kept as its own raw label,
//!    every other filter drops the record
//! 3. Keep sales inside the same period as `now` unless the filter is `all`
//! 4. Sum counts under a label derived from the filter, labels in first-seen order
//! 5. Emit labels, sums and one palette color per label
//!
//! Weeks start on the day given by [`WeekStart`], Sunday unless configured otherwise.
//!
//! ## Notes
//! - A missing or non-numeric `saleCount` decodes as `0`.
//! - Output is deterministic for a fixed input and `now`.

pub mod aggregate;
pub mod error;
pub mod models;
pub mod period;

pub use aggregate::{Aggregation, TrendQuery, aggregate};
pub use error::TrendError;
pub use models::{Dataset, Product, ProductsCollection, Sale, SalesCollection, TrendSeries};
pub use period::{TrendFilter, WeekStart, parse_sale_timestamp};
