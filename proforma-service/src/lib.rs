//! proforma-service: small-business invoicing over a pluggable store.
//!
//! Manages clients, a catalog of billable articles and proforma invoices
//! composed of line items with per-line discounts, tax and totals, and
//! renders any proforma to a printable HTML document.

pub mod config;
pub mod draft;
pub mod handlers;
pub mod models;
pub mod render;
pub mod services;
pub mod startup;
pub mod store;
