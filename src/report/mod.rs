//! Report renderers for license listings and audits.
//!
//! - [`terminal`] — colored tables with a summary box; respects `--quiet`.
//! - [`json`] — machine-readable output; audits emit violations only.

pub mod json;
pub mod terminal;
