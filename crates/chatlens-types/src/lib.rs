//! Shared types for the chatlens query engine.

mod conversation;
mod filter;
mod search;

pub use conversation::*;
pub use filter::*;
pub use search::*;
