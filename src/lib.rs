//! critica - a side-by-side terminal viewer for git diffs.
//!
//! Parses `git diff` output, pairs deleted and added lines, marks the changed
//! span inside each pair and renders the result either once to stdout or in
//! an interactive ratatui interface.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use critica::prelude::*;
//!
//! let text = diff_for_mode(std::path::Path::new("."), DiffMode::All)?;
//! let files = parse_diff(&text)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]

pub mod cli;
pub mod core;
pub mod highlight;
pub mod metrics;
pub mod prelude;
pub mod theme;
pub mod ui;
