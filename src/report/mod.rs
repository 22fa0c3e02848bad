//! Report renderers for grouped license records.
//!
//! - [`text`] — the attribution file written to `--output` (or stdout).
//! - [`terminal`] — colored summary box and group table; respects `--verbose` / `--quiet`.

pub mod terminal;
pub mod text;
