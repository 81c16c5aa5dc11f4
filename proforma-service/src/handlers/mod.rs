//! HTTP handlers for proforma-service.

pub mod articles;
pub mod clients;
pub mod dashboard;
pub mod health;
pub mod proformas;
pub mod settings;
