//! Utility helpers shared by domain types

pub mod domain;
