/// State management module
///
/// This module handles all mutable and persisted guide state:
/// - Capture session: captured frames and start heading (session.rs)
/// - Orientation samples and change filtering (orientation.rs)
/// - Upload manifest for the stitching backend (manifest.rs)
/// - User settings (config.rs)

pub mod config;
pub mod manifest;
pub mod orientation;
pub mod session;
