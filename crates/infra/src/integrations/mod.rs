//! External service integrations

pub mod consinco;
