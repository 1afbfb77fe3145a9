use std::error::Error;
use std::sync::Arc;
use std::thread;

/// Shared handle to a log destination, injected into engine types.
pub type Logger = Arc<dyn LogDestination>;

/// Somewhere log lines can be sent.
///
/// Implementations must accept arbitrary text and must never panic or
/// report failure back to the caller. Only [`log_tagged`](Self::log_tagged)
/// is required; the untagged forms use [`context_tag`] as the tag.
pub trait LogDestination: Send + Sync {
    /// Log a message under the given tag.
    fn log_tagged(&self, tag: &str, message: &str);

    /// Log a message with an attached error under the given tag.
    fn log_tagged_error(&self, tag: &str, message: &str, error: &dyn Error) {
        self.log_tagged(tag, &format!("{message}: {error}"));
    }

    /// Log a message under the current thread's tag.
    fn log(&self, message: &str) {
        self.log_tagged(&context_tag(), message);
    }

    /// Log a message with an attached error under the current thread's tag.
    fn log_error(&self, message: &str, error: &dyn Error) {
        self.log_tagged_error(&context_tag(), message, error);
    }
}

/// The default tag: the name of the calling thread.
pub fn context_tag() -> String {
    thread::current().name().unwrap_or("unnamed").to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        lines: Mutex<Vec<(String, String)>>,
    }

    impl LogDestination for Recorder {
        fn log_tagged(&self, tag: &str, message: &str) {
            self.lines
                .lock()
                .unwrap()
                .push((tag.to_string(), message.to_string()));
        }
    }

    #[test]
    fn untagged_log_uses_thread_name() {
        let recorder = Recorder::default();
        std::thread::scope(|scope| {
            std::thread::Builder::new()
                .name("worker-7".into())
                .spawn_scoped(scope, || recorder.log("hello"))
                .unwrap()
                .join()
                .unwrap();
        });
        let lines = recorder.lines.lock().unwrap();
        assert_eq!(lines[0], ("worker-7".to_string(), "hello".to_string()));
    }

    #[test]
    fn default_error_form_appends_error_text() {
        let recorder = Recorder::default();
        let err = std::io::Error::other("disk on fire");
        recorder.log_tagged_error("io", "write failed", &err);
        let lines = recorder.lines.lock().unwrap();
        assert_eq!(lines[0].1, "write failed: disk on fire");
    }
}
