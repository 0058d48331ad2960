// omnibox_suggestions — Omnibox suggestion sessions and dropdown rendering
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Timing log for dropdown build passes and view construction.
//!
//! Gated behind `--features perf`. Without the feature every timer is `None`
//! and the calls compile away.
//!
//! ```bash
//! cargo run --features perf -- --perf-log perf.jsonl
//! # {"run":"...","pass":12,"ts_ms":1739599900793,"fn":"dropdown::build","ms":0.412}
//! ```

#[cfg(feature = "perf")]
mod enabled {
    use serde_json::json;
    use std::cell::{Cell, RefCell};
    use std::fs::{File, OpenOptions};
    use std::io::{BufWriter, Write};
    use std::path::Path;
    use std::time::{Instant, SystemTime, UNIX_EPOCH};

    /// Flush the writer every this many build passes.
    const FLUSH_EVERY: u64 = 64;

    thread_local! {
        pub(super) static SINK: RefCell<Option<Sink>> = const { RefCell::new(None) };
        static PASS: Cell<u64> = const { Cell::new(0) };
    }

    pub(super) struct Sink {
        writer: BufWriter<File>,
        run_id: String,
    }

    fn unix_ms() -> u128 {
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_millis())
    }

    pub(super) fn is_open() -> bool {
        SINK.with(|sink| sink.borrow().is_some())
    }

    pub(super) fn write_entry(name: &'static str, ms: f64, extra: Option<(&'static str, usize)>) {
        SINK.with(|sink| {
            let mut sink = sink.borrow_mut();
            let Some(sink) = sink.as_mut() else {
                return;
            };
            let mut entry = json!({
                "run": sink.run_id,
                "pass": PASS.with(Cell::get),
                "ts_ms": unix_ms(),
                "fn": name,
                "ms": (ms * 1000.0).round() / 1000.0,
            });
            if let Some((key, value)) = extra {
                entry[key] = json!(value);
            }
            let _ = writeln!(sink.writer, "{entry}");
        });
    }

    /// Owns the thread's perf sink. Dropping it flushes and closes the log.
    pub struct PerfLogger {
        _private: (),
    }

    impl PerfLogger {
        /// Returns `None` if the file cannot be opened.
        pub fn open(path: &Path, append: bool) -> Option<Self> {
            let mut options = OpenOptions::new();
            options.create(true).write(true);
            if append {
                options.append(true);
            } else {
                options.truncate(true);
            }
            let mut writer = BufWriter::new(options.open(path).ok()?);
            let run_id = uuid::Uuid::new_v4().to_string();
            let start = json!({
                "event": "run_start",
                "run": run_id,
                "ts_ms": unix_ms(),
                "pid": std::process::id(),
                "version": env!("CARGO_PKG_VERSION"),
            });
            let _ = writeln!(writer, "{start}");
            let _ = writer.flush();
            SINK.with(|sink| *sink.borrow_mut() = Some(Sink { writer, run_id }));
            PASS.with(|pass| pass.set(0));
            Some(Self { _private: () })
        }
    }

    impl Drop for PerfLogger {
        fn drop(&mut self) {
            SINK.with(|sink| {
                if let Some(mut sink) = sink.borrow_mut().take() {
                    let _ = sink.writer.flush();
                }
            });
        }
    }

    pub(super) fn next_pass() {
        let pass = PASS.with(|p| {
            p.set(p.get() + 1);
            p.get()
        });
        if pass % FLUSH_EVERY == 0 {
            SINK.with(|sink| {
                if let Some(sink) = sink.borrow_mut().as_mut() {
                    let _ = sink.writer.flush();
                }
            });
        }
    }

    pub struct Timer {
        pub(super) name: &'static str,
        pub(super) start: Instant,
        pub(super) extra: Option<(&'static str, usize)>,
    }

    impl Drop for Timer {
        fn drop(&mut self) {
            write_entry(self.name, self.start.elapsed().as_secs_f64() * 1000.0, self.extra);
        }
    }
}

#[cfg(not(feature = "perf"))]
mod disabled {
    use std::path::Path;

    pub struct PerfLogger;
    pub struct Timer;

    impl PerfLogger {
        #[inline]
        pub fn open(_path: &Path, _append: bool) -> Option<Self> {
            None
        }
    }
}

#[cfg(feature = "perf")]
pub use enabled::{PerfLogger, Timer};

#[cfg(not(feature = "perf"))]
pub use disabled::{PerfLogger, Timer};

/// Start a timer that logs on drop. `None` unless a logger is open.
#[cfg(feature = "perf")]
#[must_use]
#[inline]
pub fn start(name: &'static str) -> Option<Timer> {
    enabled::is_open().then(|| Timer { name, start: std::time::Instant::now(), extra: None })
}

/// Like [`start`], with one numeric field (suggestion count, tile count).
#[cfg(feature = "perf")]
#[must_use]
#[inline]
pub fn start_with(
    name: &'static str,
    extra_name: &'static str,
    extra_val: usize,
) -> Option<Timer> {
    enabled::is_open().then(|| Timer {
        name,
        start: std::time::Instant::now(),
        extra: Some((extra_name, extra_val)),
    })
}

/// Advance the build-pass counter stamped on every entry.
#[cfg(feature = "perf")]
#[inline]
pub fn next_pass() {
    enabled::next_pass();
}

/// Zero-length marker entry.
#[cfg(feature = "perf")]
#[inline]
pub fn mark(name: &'static str) {
    enabled::write_entry(name, 0.0, None);
}

#[cfg(not(feature = "perf"))]
#[must_use]
#[inline]
pub fn start(_name: &'static str) -> Option<Timer> {
    None
}

#[cfg(not(feature = "perf"))]
#[must_use]
#[inline]
pub fn start_with(
    _name: &'static str,
    _extra_name: &'static str,
    _extra_val: usize,
) -> Option<Timer> {
    None
}

#[cfg(not(feature = "perf"))]
#[inline]
pub fn next_pass() {}

#[cfg(not(feature = "perf"))]
#[inline]
pub fn mark(_name: &'static str) {}
