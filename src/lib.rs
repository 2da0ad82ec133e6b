//! Promo Engine - Redemption and consistency engine for subscription promo codes
//!
//! This crate implements the rules, invariants, and atomic operations behind
//! promo code redemption (bonus days and percentage discounts) and the
//! exactly-once consumption of an activated discount by a completed payment.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
