//! SPDX identifier helpers.
//!
//! - [`spdx`] — identifier cleanup, compound-expression splitting and
//!   normalization of common non-SPDX strings.
//! - [`identify`] — best-effort SPDX identifier for a LICENSE file's text.

pub mod identify;
pub mod spdx;
