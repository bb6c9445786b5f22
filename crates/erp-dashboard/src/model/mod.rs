//! Records served by the dashboard API, with their create and update payloads.
//!
//! Field names follow the API's camelCase JSON.

pub mod department;
pub mod product;
pub mod role;
pub mod unit;

pub use department::*;
pub use product::*;
pub use role::*;
pub use unit::*;
