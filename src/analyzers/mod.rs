//! Feedback aggregation.
//!
//! Pure functions over a [`FeedbackTable`](crate::record::FeedbackTable):
//! issue listing, per-issue filtering, rating distribution, and the split
//! between written feedback and rating-only rows.

pub mod aggregate;
pub mod types;
pub mod utility;
