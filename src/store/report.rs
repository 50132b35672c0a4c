pub trait Reporter {
    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn error(&self, message: &str);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn info(&self, message: &str) {
        tracing::info!(target: "archlink", "{message}");
    }

    fn warning(&self, message: &str) {
        tracing::warn!(target: "archlink", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "archlink", "{message}");
    }
}
