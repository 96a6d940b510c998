//! Output generation.
//!
//! - [`json`]: writes the normalized [`crate::models::ResultSet`] to one or
//!   more `posts.json` destinations

pub mod json;
