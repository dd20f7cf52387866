#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]

//!
//! Environment of the WalletOne integration: logger, basic config, its environment awareness.
//!

pub mod env;
pub mod logger;

#[doc(inline)]
pub use logger::*;
pub use once_cell;
pub use tracing;
pub use tracing::instrument;

#[doc(inline)]
pub use self::env::*;
