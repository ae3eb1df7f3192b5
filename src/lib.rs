#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::uninlined_format_args, // ?...
    clippy::single_match_else,
    clippy::collapsible_if,
    clippy::redundant_field_names,
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::match_same_arms,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod error;
pub mod hash;
pub mod object;
pub mod storage;
pub mod repository;
pub mod index;
pub mod tree;
pub mod ignore;
pub mod config;
pub mod stage;
pub mod status;
pub mod checkout;
pub mod commit;
pub mod log;
pub mod branch;
pub mod restore;
pub mod cat_file;
pub mod util;
