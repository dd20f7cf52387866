//!
//! Error tracking seam of the Open API client.
//!

use std::sync::Arc;

use error_stack::Report;
use router_env::logger;

use crate::errors::OpenApiError;

/// Receives the failures worth a look by a human: unexpected responses, unreadable bodies and
/// transport errors other than timeouts.
pub trait ErrorNotifier: Send + Sync {
    fn notify(&self, report: &Report<OpenApiError>);
}

/// Writes reports to the log at `error` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNotifier;

impl ErrorNotifier for LoggingNotifier {
    fn notify(&self, report: &Report<OpenApiError>) {
        logger::error!(error = ?report, "Open API request failed");
    }
}

impl<T> ErrorNotifier for Arc<T>
where
    T: ErrorNotifier + ?Sized,
{
    fn notify(&self, report: &Report<OpenApiError>) {
        (**self).notify(report);
    }
}
