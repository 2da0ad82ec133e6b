//! Command and query handlers, grouped by bounded context.

pub mod promo;
