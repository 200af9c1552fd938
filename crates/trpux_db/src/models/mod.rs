//! Database models.
//!
//! These structs map to catalog tables via sqlx. `Source` and `Compatibility`
//! are assembled from joins so callers always see their relations loaded.

mod card;
mod server;
mod source;

pub use card::{CardType, Compatibility, SourceType};
pub use server::{NewServer, NewServerArgument, Server, ServerArgument};
pub use source::{NewSource, Source};

pub(crate) use source::SourceRow;
