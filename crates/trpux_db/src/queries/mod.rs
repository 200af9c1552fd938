//! Database query functions.
//!
//! Organized by domain:
//! - `server`: Servers and their arguments
//! - `source`: Discovered sources
//! - `card`: Card types, source types and their compatibility

mod card;
mod server;
mod source;

pub use card::*;
pub use server::*;
pub use source::*;
