#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]

//!
//! WalletOne payment gateway integration.
//!
//! [`form`] builds the signed field list of the hosted payment page, [`open_api`] queries wallet
//! balances over the gateway's Open API.
//!

pub mod configs;
pub mod consts;
pub mod crypto;
pub mod encoding;
pub mod entities;
pub mod errors;
pub mod form;
pub mod interfaces;
pub mod open_api;
pub mod telemetry;
pub mod types;
pub mod utils;

pub use self::{
    configs::Settings,
    entities::{Balance, BalanceResponse},
    form::FormOptions,
    open_api::OpenApiClient,
    types::{Field, FieldList, FieldValue},
};
