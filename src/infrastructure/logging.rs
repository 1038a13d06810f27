//! Structured logging
//!
//! Builds the process logger on top of `tracing-subscriber`:
//!
//! - JSON lines (default) or plain text output
//! - minimum level `debug` unless `RUST_LOG` says otherwise
//! - a log file opened in append/create mode, falling back to stderr with a
//!   warning when the file cannot be opened
//!
//! Two field sources end up on every request-scoped entry. Handlers attach
//! `request-id`, `endpoint` and `method` directly on each call, and the
//! correlation middleware wraps the request in a [`RequestHook`] span that
//! contributes a constant marker plus its own request/user/method fields.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{info, warn, Dispatch};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Marker field injected on every request-scoped entry.
pub const HOOK_MARKER_FIELD: &str = "custom_field";
/// Value of [`HOOK_MARKER_FIELD`].
pub const HOOK_MARKER_VALUE: &str = "custom_value";
/// Name of the span opened by [`RequestHook::span`].
pub const HOOK_SPAN_NAME: &str = "request_hook";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line (default).
    #[default]
    Json,
    /// Human-readable text.
    Text,
}

/// `[logging]` section of the application config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level filter directive (e.g. "debug", "info,sea_orm=warn").
    pub level: String,
    pub format: LogFormat,
    /// Log file path. `None` or an empty path writes to stderr.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Json,
            file: Some(PathBuf::from("app.log")),
        }
    }
}

impl LoggingConfig {
    /// Same config without a file sink.
    pub fn stderr(mut self) -> Self {
        self.file = None;
        self
    }
}

// ── Writers ────────────────────────────────────────────────────

/// Cloneable writer that serializes concurrent writes through a mutex.
///
/// Used for the log file and by tests to capture output in memory.
#[derive(Debug)]
pub struct SharedWriter<W> {
    inner: Arc<Mutex<W>>,
}

impl<W> SharedWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    /// Lock the underlying writer. A poisoned lock is recovered since the
    /// writer holds no invariant a panicking logger could break.
    pub fn lock(&self) -> MutexGuard<'_, W> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W> Clone for SharedWriter<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Guard returned by [`SharedWriter`] for a single log entry.
pub struct SharedWriterGuard<'a, W>(MutexGuard<'a, W>);

impl<W: Write> Write for SharedWriterGuard<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl<'a, W: Write + 'a> MakeWriter<'a> for SharedWriter<W> {
    type Writer = SharedWriterGuard<'a, W>;

    fn make_writer(&'a self) -> Self::Writer {
        SharedWriterGuard(self.lock())
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

// ── Subscriber construction ────────────────────────────────────

/// Build the logging pipeline over an arbitrary writer without installing it.
pub fn build_dispatch<M>(config: &LoggingConfig, writer: M) -> Dispatch
where
    M: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter = EnvFilter::new(&config.level);
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_span_list(true)
                .with_writer(writer);
            Dispatch::new(registry.with(layer))
        }
        LogFormat::Text => {
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            Dispatch::new(registry.with(layer))
        }
    }
}

/// The configured log file could not be opened.
#[derive(Debug)]
pub struct FileFallback {
    pub path: PathBuf,
    pub error: io::Error,
}

/// Open the configured log file, if any.
///
/// `Ok(None)` means no file is configured and stderr is the sink.
pub fn open_file_sink(config: &LoggingConfig) -> Result<Option<SharedWriter<File>>, FileFallback> {
    let Some(path) = config.file.as_ref().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(None);
    };
    match open_log_file(path) {
        Ok(file) => Ok(Some(SharedWriter::new(file))),
        Err(error) => Err(FileFallback {
            path: path.clone(),
            error,
        }),
    }
}

/// Build the pipeline over `writer`. When the file sink failed, the first
/// entry written is a warning naming the file.
pub fn build_dispatch_with_fallback<M>(
    config: &LoggingConfig,
    writer: M,
    fallback: Option<&FileFallback>,
) -> Dispatch
where
    M: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let dispatch = build_dispatch(config, writer);
    if let Some(fallback) = fallback {
        tracing::dispatcher::with_default(&dispatch, || {
            warn!(
                file = %fallback.path.display(),
                error = %fallback.error,
                "Failed to log to file, using default stderr"
            );
        });
    }
    dispatch
}

/// Handle to the installed process logger.
///
/// Created once by [`init`] and kept alive for the process lifetime;
/// [`LogHandle::shutdown`] flushes the sink.
pub struct LogHandle {
    dispatch: Dispatch,
    file: Option<SharedWriter<File>>,
}

impl LogHandle {
    /// Flush and sync the log file.
    pub fn shutdown(self) {
        tracing::dispatcher::with_default(&self.dispatch, || info!("Logger shutting down"));
        if let Some(file) = self.file {
            let mut file = file.lock();
            if let Err(e) = file.flush().and_then(|_| file.sync_all()) {
                // The sink itself failed; stderr is the only place left.
                let _ = writeln!(io::stderr(), "failed to flush log file: {}", e);
            }
        }
    }
}

/// Initialize the process logger and install it as the global default.
///
/// Failure to open the log file is not fatal: output goes to stderr and a
/// warning naming the file is the first entry emitted.
pub fn init(config: &LoggingConfig) -> LogHandle {
    let mut effective = config.clone();
    if let Ok(directive) = std::env::var("RUST_LOG") {
        effective.level = directive;
    }

    let (file, dispatch) = match open_file_sink(config) {
        Ok(Some(writer)) => {
            let dispatch = build_dispatch(&effective, writer.clone());
            (Some(writer), dispatch)
        }
        Ok(None) => (None, build_dispatch(&effective, io::stderr)),
        Err(fallback) => (
            None,
            build_dispatch_with_fallback(&effective, io::stderr, Some(&fallback)),
        ),
    };

    if tracing::dispatcher::set_global_default(dispatch.clone()).is_err() {
        warn!("Global logger already installed; keeping the existing one");
    }

    LogHandle { dispatch, file }
}

// ── Per-request hook ───────────────────────────────────────────

/// Per-request log decorator.
///
/// Constructed fresh from the request by the correlation middleware and
/// discarded when the request completes. Its span fields appear on every
/// entry logged while the request is in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestHook {
    pub request_id: String,
    /// Always empty: the service has no authentication.
    pub user_id: String,
    pub method: String,
}

impl RequestHook {
    pub fn new(request_id: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            user_id: String::new(),
            method: method.into(),
        }
    }

    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "request_hook",
            custom_field = HOOK_MARKER_VALUE,
            request_id = %self.request_id,
            user_id = %self.user_id,
            method = %self.method,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{debug, error, trace};

    fn capture(config: &LoggingConfig) -> (Dispatch, SharedWriter<Vec<u8>>) {
        let buf = SharedWriter::new(Vec::new());
        (build_dispatch(config, buf.clone()), buf)
    }

    fn lines(buf: &SharedWriter<Vec<u8>>) -> Vec<serde_json::Value> {
        let raw = String::from_utf8(buf.lock().clone()).unwrap();
        raw.lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("app.log")));
        assert!(config.stderr().file.is_none());
    }

    #[test]
    fn format_parses_from_toml() {
        let config: LoggingConfig = toml::from_str("format = \"text\"\nlevel = \"info\"").unwrap();
        assert_eq!(config.format, LogFormat::Text);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn json_entries_carry_call_site_fields() {
        let (dispatch, buf) = capture(&LoggingConfig::default());

        tracing::dispatcher::with_default(&dispatch, || {
            error!("request-id" = "abc", endpoint = "/api/v1/users", method = "GET", "boom");
        });

        let entries = lines(&buf);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["level"], "ERROR");
        assert_eq!(entries[0]["message"], "boom");
        assert_eq!(entries[0]["request-id"], "abc");
        assert_eq!(entries[0]["endpoint"], "/api/v1/users");
        assert_eq!(entries[0]["method"], "GET");
    }

    #[test]
    fn debug_passes_and_trace_is_filtered() {
        let (dispatch, buf) = capture(&LoggingConfig::default());

        tracing::dispatcher::with_default(&dispatch, || {
            trace!("dropped");
            debug!("kept");
        });

        let entries = lines(&buf);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["message"], "kept");
    }

    #[test]
    fn hook_span_decorates_every_entry() {
        let (dispatch, buf) = capture(&LoggingConfig::default());
        let hook = RequestHook::new("req-1", "POST");

        tracing::dispatcher::with_default(&dispatch, || {
            let _entered = hook.span().entered();
            info!("first");
            debug!("second");
        });

        let entries = lines(&buf);
        assert_eq!(entries.len(), 2);
        for entry in entries {
            assert!(entry.get("span").is_none());
            let span = &entry["spans"][0];
            assert_eq!(span["name"], HOOK_SPAN_NAME);
            assert_eq!(span[HOOK_MARKER_FIELD], HOOK_MARKER_VALUE);
            assert_eq!(span["request_id"], "req-1");
            assert_eq!(span["user_id"], "");
            assert_eq!(span["method"], "POST");
        }
    }

    #[test]
    fn writes_to_log_file_in_append_mode() {
        let path = std::env::temp_dir().join(format!("users-service-{}.log", uuid::Uuid::new_v4()));
        std::fs::write(&path, "existing\n").unwrap();

        let file = SharedWriter::new(open_log_file(&path).unwrap());
        let dispatch = build_dispatch(&LoggingConfig::default(), file);
        tracing::dispatcher::with_default(&dispatch, || info!("appended"));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("existing\n"));
        assert!(contents.contains("appended"));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn unopenable_file_falls_back_with_a_warning() {
        let path = std::env::temp_dir()
            .join(uuid::Uuid::new_v4().to_string())
            .join("missing-dir")
            .join("app.log");
        let config = LoggingConfig {
            file: Some(path.clone()),
            ..LoggingConfig::default()
        };

        let fallback = open_file_sink(&config).unwrap_err();
        assert_eq!(fallback.path, path);

        let buf = SharedWriter::new(Vec::new());
        let dispatch = build_dispatch_with_fallback(&config, buf.clone(), Some(&fallback));
        tracing::dispatcher::with_default(&dispatch, || info!("still logging"));

        let entries = lines(&buf);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["level"], "WARN");
        assert_eq!(entries[0]["message"], "Failed to log to file, using default stderr");
        assert_eq!(entries[0]["file"], path.display().to_string());
        assert!(entries[0]["error"].is_string());
        assert_eq!(entries[1]["message"], "still logging");
    }

    #[test]
    fn sink_selection_follows_config() {
        assert!(open_file_sink(&LoggingConfig::default().stderr()).unwrap().is_none());

        let empty = LoggingConfig {
            file: Some(PathBuf::new()),
            ..LoggingConfig::default()
        };
        assert!(open_file_sink(&empty).unwrap().is_none());

        let path = std::env::temp_dir().join(format!("users-service-{}.log", uuid::Uuid::new_v4()));
        let config = LoggingConfig {
            file: Some(path.clone()),
            ..LoggingConfig::default()
        };
        assert!(open_file_sink(&config).unwrap().is_some());
        assert!(path.exists());
        let _ = std::fs::remove_file(path);
    }
}
