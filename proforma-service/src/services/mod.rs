//! Application services for proforma-service.

pub mod metrics;
pub mod numbering;
pub mod proformas;

pub use metrics::{get_metrics, init_metrics};
pub use numbering::next_invoice_number;
pub use proformas::ProformaService;
