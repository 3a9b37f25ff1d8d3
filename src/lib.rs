//! Customer sign-up form core
//!
//! Field bindings, validators, the form tree and the reactive rules of a
//! single customer sign-up form, free of any UI framework. A UI layer feeds
//! [`controller::FormEvent`]s in and reads values, errors and the email
//! message back out.

pub mod command;
pub mod config;
pub mod controller;
pub mod sink;
pub mod state;
