//! Application layer: orchestrates domain logic across the ports.

pub mod handlers;
