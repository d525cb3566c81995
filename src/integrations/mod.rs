//! Remote API integrations.

pub mod client {
    pub use crate::client::*;
}

pub mod reports {
    pub use crate::reports::{Report, ReportDefinition, ReportDownloader};
}
