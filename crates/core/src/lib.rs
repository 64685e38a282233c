//! Domain logic for the Thesia thesis-project management platform.
//!
//! Everything in this crate is pure: no I/O, no database, no HTTP. The
//! `db` and `api` crates execute what is decided here.

pub mod error;
pub mod lifecycle;
pub mod observation;
pub mod proposal;
pub mod roles;
pub mod types;
