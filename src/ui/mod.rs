//! UI module - shared widgets and helpers

pub mod components;
