//! `license-builder` — collect third-party license attributions from vendored
//! source trees and consolidate them into one report.
//!
//! # Flow
//! 1. Scan project trees for LICENSE files and SPDX headers ([`scanner`]).
//! 2. Fill in full license texts for SPDX identifiers ([`registry`]).
//! 3. Group equivalent records ([`engine::group`]).
//! 4. Render the attribution report ([`report`]).

pub mod config;
pub mod engine;
pub mod error;
pub mod license;
pub mod models;
pub mod registry;
pub mod report;
pub mod scanner;
