//! Catering Engine library crate.
//!
//! This crate exposes the event profit/cost allocation engine, the
//! report snapshot store and the API components as reusable modules.
//! External applications may depend on the `catering_engine` crate and
//! call into `engine::compute` directly or embed the API via
//! `api::build_router`.

pub mod api;
pub mod breakeven;
pub mod engine;
pub mod models;
pub mod settings;
pub mod snapshot;
pub mod tax;
pub mod validation;
