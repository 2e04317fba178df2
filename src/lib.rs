//! Best-effort recovery of JSON values from messy LLM/agent output.
//!
//! Text that is supposed to contain JSON but arrives wrapped in prose or
//! markdown, truncated, or written with Python/JS literal conventions goes
//! in; the closest structured value comes out. Purely synchronous, no I/O,
//! and no panics on malformed input.

pub mod error;
pub mod options;

mod engine;
mod extract;
mod normalize;
mod pipeline;
mod repair;
mod scan;
mod unwrap;

pub use engine::{recover, recover_value};
pub use error::RecoverError;
pub use options::RecoverOptions;
