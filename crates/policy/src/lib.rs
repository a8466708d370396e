//! Tool-choice policy.
//!
//! Core principle: **Whether and which tools the model may select is an
//! explicit contract, checked on both sides of the model call.** A
//! [`ToolChoice`] produces the directive sent alongside the tool manifest
//! and validates the model's response against the same contract afterwards.

mod choice;
mod error;

pub use choice::{Directive, ToolChoice};
pub use error::{Error, Result, Violation};
