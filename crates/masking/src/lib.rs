#![forbid(unsafe_code)]
#![warn(missing_docs)]

//!
//! Wrapper types for credentials (merchant signing keys, API tokens) which keep them out of
//! `Debug` output and logs, and wipe them from memory on drop.
//!

pub use zeroize::{self, Zeroize as ZeroizableSecret};

mod abs;
mod secret;
mod strategy;

pub use abs::PeekInterface;
pub use secret::Secret;
pub use strategy::{Strategy, WithType, WithoutType};

#[cfg(feature = "serde")]
mod serde;

