#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Security primitives shared by the registry token service and its plugins.
//!
//! - [`SecurityContext`] - authenticated subject of one token request
//! - [`constants`] - default realm and well-known client role names

pub mod constants;
pub mod context;

pub use constants::roles;
pub use context::{SecurityContext, SecurityContextBuilder};
