//! Domains module containing business logic organized by bounded contexts.
//!
//! The host currently serves a single domain: tools.

pub mod tools;
