//! Core types and trait definitions for the Gloss annotation service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod annotate;
pub mod annotation;
pub mod assign;
pub mod completion;
pub mod convert;
pub mod entry;
pub mod factory;
pub mod interval;
pub mod reference;
pub mod stats;
pub mod store;
pub mod text;
pub mod user;
