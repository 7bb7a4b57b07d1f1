//! Scientists, planets and the missions that connect them.
//!
//! [`db::Database`] is the entity store, [`validation`] holds the field rules
//! it runs before every write, and [`api::create_router`] exposes both over
//! HTTP.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod seed;
pub mod validation;
