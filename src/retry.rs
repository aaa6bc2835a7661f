//! Sheet retrieval with retries.
//!
//! Fetching a sheet is the storage layer's job, and only that layer retries. The
//! [`SheetSource`] trait is the seam; [`RetryingSource`] wraps any source with bounded
//! exponential backoff, jitter and a cancellation token. The chart pipeline itself never
//! retries.

use rand::Rng;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::csv_reader::read_csv;
use crate::data::{select_sheet, workbook_from_json, Sheet};
use crate::error::ChartError;

/// Anything that can hand out a sheet by id
pub trait SheetSource {
    fn fetch(&self, id: &str) -> Result<Sheet, ChartError>;
}

/// Backoff schedule: attempt once, then up to `max_retries` more times, sleeping
/// `base_delay * 2^n` (capped at `max_delay`) plus up to `jitter` between attempts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 2000,
            max_delay_ms: 16_000,
            jitter_ms: 250,
        }
    }
}

impl RetryPolicy {
    /// No retries: a single attempt
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Delay before retry number `retry` (0-based), without jitter
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u64.checked_shl(retry).unwrap_or(u64::MAX);
        let ms = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        Duration::from_millis(ms)
    }

    fn delay_with_jitter(&self, retry: u32) -> Duration {
        let jitter = if self.jitter_ms > 0 {
            rand::thread_rng().gen_range(0..=self.jitter_ms)
        } else {
            0
        };
        self.backoff(retry) + Duration::from_millis(jitter)
    }
}

/// Shared flag a caller flips to stop further retries
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Retry `op` according to `policy`, calling `sleep` between attempts.
///
/// Only errors that report themselves retryable are retried; anything else is returned
/// at once. The final error is returned once retries are exhausted. A cancelled token stops
/// before the next attempt.
pub fn retry_with_policy<T>(
    policy: &RetryPolicy,
    token: &CancellationToken,
    mut op: impl FnMut(u32) -> Result<T, ChartError>,
    mut sleep: impl FnMut(Duration),
) -> Result<T, ChartError> {
    let mut attempt = 0;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err)
                if !err.is_retryable()
                    || attempt >= policy.max_retries
                    || token.is_cancelled() =>
            {
                return Err(err)
            }
            Err(err) => {
                let delay = policy.delay_with_jitter(attempt);
                warn!(
                    attempt = attempt + 1,
                    max = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "sheet fetch failed, retrying"
                );
                sleep(delay);
                if token.is_cancelled() {
                    return Err(err);
                }
                attempt += 1;
            }
        }
    }
}

/// Wraps a source with the retry policy
pub struct RetryingSource<S> {
    inner: S,
    policy: RetryPolicy,
    token: CancellationToken,
}

impl<S: SheetSource> RetryingSource<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            token: CancellationToken::new(),
        }
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl<S: SheetSource> SheetSource for RetryingSource<S> {
    fn fetch(&self, id: &str) -> Result<Sheet, ChartError> {
        retry_with_policy(
            &self.policy,
            &self.token,
            |_| self.inner.fetch(id),
            std::thread::sleep,
        )
    }
}

/// Input encoding of a file or stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Json,
}

impl InputFormat {
    /// Guess from the file extension, defaulting to CSV
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Csv,
        }
    }
}

/// Reads sheets from local files: ids are paths relative to `root`
#[derive(Debug, Clone)]
pub struct FileSource {
    root: PathBuf,
    format: Option<InputFormat>,
    sheet_name: Option<String>,
}

impl FileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            format: None,
            sheet_name: None,
        }
    }

    /// Force a format instead of guessing from the extension
    pub fn with_format(mut self, format: Option<InputFormat>) -> Self {
        self.format = format;
        self
    }

    /// Pick a workbook tab by name when the file holds several sheets
    pub fn with_sheet(mut self, name: Option<String>) -> Self {
        self.sheet_name = name;
        self
    }
}

impl SheetSource for FileSource {
    fn fetch(&self, id: &str) -> Result<Sheet, ChartError> {
        let path = self.root.join(id);
        let bytes = fs::read(&path).map_err(|e| read_error(id, &e))?;
        let format = self.format.unwrap_or_else(|| InputFormat::from_path(&path));
        // Bad content or an unknown sheet name reads the same on every attempt
        parse_sheet(&bytes, format, id, self.sheet_name.as_deref())
            .map_err(|e| ChartError::upstream_permanent(id, format!("{:#}", e)))
    }
}

fn read_error(id: &str, err: &io::Error) -> ChartError {
    match err.kind() {
        io::ErrorKind::NotFound
        | io::ErrorKind::PermissionDenied
        | io::ErrorKind::InvalidInput
        | io::ErrorKind::InvalidData
        | io::ErrorKind::Unsupported => ChartError::upstream_permanent(id, err.to_string()),
        _ => ChartError::upstream(id, err.to_string()),
    }
}

/// Decode raw bytes as a sheet in the given format
pub fn parse_sheet(
    bytes: &[u8],
    format: InputFormat,
    name: &str,
    sheet_name: Option<&str>,
) -> anyhow::Result<Sheet> {
    match format {
        InputFormat::Csv => read_csv(bytes, name),
        InputFormat::Json => {
            let value: serde_json::Value = serde_json::from_slice(bytes)?;
            let mut sheet = select_sheet(workbook_from_json(&value)?, sheet_name)?;
            if sheet.name.is_empty() {
                sheet.name = name.to_string();
            }
            Ok(sheet)
        }
    }
}
