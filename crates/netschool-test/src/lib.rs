//! Test helpers shared by the netschool crates.

mod api;
pub mod portal;

pub use api::start_api_mock;
