#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_field_names,
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

pub mod cache;
pub mod catalog;
pub mod config;
pub mod delivery;
pub mod eligibility;
pub mod error;
pub mod ledger;
pub mod net;
pub mod platform;
pub mod prefs;
pub mod presenter;
pub mod version;

pub use config::Config;
pub use delivery::{DeliveryCoordinator, RunOptions, RunReport};
pub use error::{HeraldError, Result};
