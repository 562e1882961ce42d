//! Localization mod packaging library.
//!
//! This crate builds and publishes the localization core-mod package for
//! the game launcher: it fetches a font archive from the latest release
//! of the font repository and a translation archive from the translation
//! platform, curates both into the canonical mod layout, packs the
//! result with a launcher manifest, and publishes the archive to object
//! storage together with a distribution descriptor. It is used by the
//! `locmod-packager` binary and can be consumed programmatically for
//! testing or custom packaging workflows.
//!
//! # Modules
//!
//! - [`archive`] - Zip creation and verbatim tree copies
//! - [`assemble`] - Core mod staging and assembly
//! - [`config`] - Run configuration record and loading
//! - [`curate`] - Filter rules and selective archive extraction
//! - [`digest`] - Content fingerprint for published packages
//! - [`download`] - Release-asset and translation-export fetching
//! - [`error`] - Semantic top-level error type
//! - [`manifest`] - Launcher manifest generation
//! - [`output`] - Progress output helpers
//! - [`package`] - Final package archive creation
//! - [`pipeline`] - End-to-end run orchestration
//! - [`publish`] - Object-storage upload and distribution descriptor

pub mod archive;
pub mod assemble;
pub mod config;
pub mod curate;
pub mod digest;
pub mod download;
pub mod error;
pub mod manifest;
pub mod output;
pub mod package;
pub mod pipeline;
pub mod publish;
