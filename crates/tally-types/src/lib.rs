//! Shared types for the Tally calculator service.

mod api;
mod record;
mod session;
mod value;

pub use api::*;
pub use record::*;
pub use session::*;
pub use value::*;
