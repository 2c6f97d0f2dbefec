//! Helpers shared by unit tests.

use std::io;
use std::sync::{Arc, Mutex};

use crate::store::Store;

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut inner) = self.0.lock() {
            inner.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return what it logged at INFO and above.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    capture_logs_at(tracing::Level::INFO, f)
}

/// Like [`capture_logs`], down to `level`.
pub fn capture_logs_at<T>(level: tracing::Level, f: impl FnOnce() -> T) -> (T, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(level)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, buffer.contents())
}

/// Fresh store in its own temp dir; keep the `TempDir` alive for the test.
pub fn temp_store(name: &str) -> (tempfile::TempDir, Arc<Store>) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(name);
    let store = Store::open(path.to_str().expect("db path")).expect("open store");
    (dir, Arc::new(store))
}
