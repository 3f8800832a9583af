//! HTTP handlers for the record API

pub mod admin;
pub mod consume;
pub mod produce;
pub mod stream;
