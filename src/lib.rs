//! # QED Intake
//!
//! Intake pipeline for the QED knowledge base: pulls a web article through
//! a Reader API, writes a templated Markdown analysis note, files it in the
//! README index and the TODO review queue, and commits the result.
//!
//! ## Pipeline
//!
//! ```text
//! ┌────────────┐   ┌──────────┐   ┌───────────┐   ┌───────────┐   ┌─────┐
//! │ Reader API │──▶│ Validate │──▶│ Classify  │──▶│ Analysis  │──▶│ Git │
//! │  (HTTP)    │   │  length  │   │ keywords  │   │ + indexes │   │     │
//! └────────────┘   └──────────┘   └───────────┘   └───────────┘   └─────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! qed init                                   # analysis dir + index headings
//! qed intake https://example.com/post high   # one article
//! qed batch reading-list.txt                 # one per line, 3s apart
//! qed stats
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`reader`] | Reader API client |
//! | [`classify`] | Keyword heuristics, titles and slugs |
//! | [`analysis`] | Analysis file rendering |
//! | [`index`] | Index and TODO maintenance |
//! | [`intake`] | Single-URL pipeline |
//! | [`batch`] | URL-list runner |
//! | [`git`] | Staging and committing |

pub mod analysis;
pub mod batch;
pub mod check;
pub mod classify;
pub mod config;
pub mod error;
pub mod git;
pub mod index;
pub mod intake;
pub mod models;
pub mod progress;
pub mod reader;
pub mod stats;
pub mod workspace;
