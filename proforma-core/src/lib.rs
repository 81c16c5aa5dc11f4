//! proforma-core: shared infrastructure for the proforma invoicing service.
pub mod config;
pub mod error;
pub mod observability;
