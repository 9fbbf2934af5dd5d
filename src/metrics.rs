//! Opt-in timing and count diagnostics on stderr.
//!
//! Set `CRITICA_METRICS=1` (or `true`) to enable. Output lines look like
//! `[metrics] parse_diff: 1.2ms`.

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Environment variable that switches metrics on.
pub const METRICS_ENV: &str = "CRITICA_METRICS";

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Read [`METRICS_ENV`] and enable or disable output. Call once at startup.
pub fn init() {
    set_enabled(env_flag(std::env::var(METRICS_ENV).ok().as_deref()));
}

/// Force metrics on or off.
pub fn set_enabled(on: bool) {
    ENABLED.store(on, Ordering::Relaxed);
}

/// Whether metrics are being reported.
#[inline]
pub fn enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

fn env_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Scope timer; reports elapsed time when dropped.
///
/// ```
/// let _t = critica::metrics::Timer::start("load");
/// ```
#[must_use = "the timer reports when dropped"]
pub struct Timer {
    label: &'static str,
    started: Instant,
}

impl Timer {
    /// Returns `None` when metrics are off so the disabled path costs nothing.
    #[inline]
    pub fn start(label: &'static str) -> Option<Self> {
        enabled().then(|| Self {
            label,
            started: Instant::now(),
        })
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        emit(self.label, format_args!("{:?}", self.started.elapsed()));
    }
}

/// Report a single value, e.g. a file or row count.
pub fn record(label: &str, value: impl Display) {
    if enabled() {
        emit(label, value);
    }
}

fn emit(label: &str, value: impl Display) {
    eprintln!("[metrics] {label}: {value}");
}
