//! Action primitives - the executable side of a reasoning decision
//!
//! This crate turns an [`Action`](tabpilot_core_types::Action) into a page-side
//! operation:
//! - 7 kinds: navigate, click, type, scroll, back, answer, done
//! - `answer`/`done` end the run without touching the page
//! - unknown kinds are rejected locally with [`ActionError::UnsupportedAction`]

pub mod errors;
mod executor;
pub mod types;

pub use errors::*;
pub use executor::*;
pub use types::*;

pub use browser_host::{PageOperation, ScrollDirection};
