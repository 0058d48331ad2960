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

pub mod app;
pub mod cache;
pub mod config;
pub mod dropdown;
pub mod engine;
pub mod error;
pub mod model;
pub mod perf;
pub mod pool;
pub mod selection;
pub mod session;
pub mod surface;
pub mod ui;

use clap::Parser;
use model::PageClass;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "omnibox-demo", about = "Terminal playground for omnibox suggestion sessions")]
pub struct Cli {
    /// JSON config file (defaults apply when missing)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Page class the omnibox is attached to
    #[arg(long, value_enum, default_value_t = PageClass::SearchWidget)]
    pub page_class: PageClass,

    /// Directory for cached zero-prefix results (defaults to the platform cache dir)
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Simulated engine latency per response, in milliseconds
    #[arg(long, default_value_t = 120)]
    pub engine_delay_ms: u64,

    /// Delay before the engine becomes available, in milliseconds
    #[arg(long, default_value_t = 400)]
    pub engine_startup_ms: u64,

    /// Write tracing diagnostics to a file (disabled when omitted)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Tracing filter directives (example: `info,omnibox_suggestions::session=debug`).
    /// Falls back to `RUST_LOG` when omitted.
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,

    /// Append to the log file instead of truncating it
    #[arg(long)]
    pub log_append: bool,

    /// Write JSON-lines timing data (requires `--features perf`)
    #[arg(long, value_name = "PATH")]
    pub perf_log: Option<PathBuf>,

    /// Append to the perf log instead of truncating it
    #[arg(long)]
    pub perf_log_append: bool,
}
