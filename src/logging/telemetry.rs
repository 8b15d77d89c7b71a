//! Error reporting hooks
//!
//! The session forwards every line it writes as a breadcrumb and escalates
//! errors as captured messages. The concrete crash reporter lives in the host
//! application; this module only defines the seam.

/// A fire-and-forget telemetry sink
pub trait ErrorReporter: Send {
    /// Set the user identity attached to later reports
    fn set_user(&mut self, username: &str);

    /// Record a breadcrumb (level is "debug", "info", "error" or "fatal")
    fn add_breadcrumb(&mut self, message: &str, level: &str);

    /// Report a standalone, non-fatal message
    fn capture_message(&mut self, message: &str);
}

/// Reporter that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn set_user(&mut self, _username: &str) {}

    fn add_breadcrumb(&mut self, _message: &str, _level: &str) {}

    fn capture_message(&mut self, _message: &str) {}
}

/// Reporter that forwards into `tracing`, for hosts without a crash reporter
#[derive(Debug, Default, Clone)]
pub struct TracingReporter {
    username: Option<String>,
}

impl TracingReporter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ErrorReporter for TracingReporter {
    fn set_user(&mut self, username: &str) {
        self.username = Some(username.to_string());
    }

    fn add_breadcrumb(&mut self, message: &str, level: &str) {
        tracing::trace!(breadcrumb_level = level, "{}", message.trim_end());
    }

    fn capture_message(&mut self, message: &str) {
        tracing::warn!(user = self.username.as_deref().unwrap_or("unknown"), "{}", message);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::ErrorReporter;

    /// Everything a `RecordingReporter` has seen
    #[derive(Debug, Default)]
    pub struct Recorded {
        pub user: Option<String>,
        pub breadcrumbs: Vec<(String, String)>,
        pub captured: Vec<String>,
    }

    /// Reporter that records calls into shared state for assertions
    #[derive(Debug, Default, Clone)]
    pub struct RecordingReporter {
        pub recorded: Arc<Mutex<Recorded>>,
    }

    impl ErrorReporter for RecordingReporter {
        fn set_user(&mut self, username: &str) {
            self.recorded.lock().unwrap().user = Some(username.to_string());
        }

        fn add_breadcrumb(&mut self, message: &str, level: &str) {
            self.recorded
                .lock()
                .unwrap()
                .breadcrumbs
                .push((message.to_string(), level.to_string()));
        }

        fn capture_message(&mut self, message: &str) {
            self.recorded
                .lock()
                .unwrap()
                .captured
                .push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_reporter_keeps_user() {
        let mut reporter = TracingReporter::new();
        reporter.set_user("pc_alice");
        reporter.add_breadcrumb("[0 +0.0000] DEBUG: hi\n", "debug");
        reporter.capture_message("Reporting non-critical ERROR: boom");
        assert_eq!(reporter.username.as_deref(), Some("pc_alice"));
    }
}
