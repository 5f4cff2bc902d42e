//! Test fixtures for courier-routes.
//!
//! Provides realistic delivery stops in Shanghai and a builder for pings.

pub mod shanghai_locations;

pub use shanghai_locations::*;
