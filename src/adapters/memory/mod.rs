//! In-memory adapters, primarily for tests and local wiring.

mod store;

pub use store::InMemoryPromoStore;
