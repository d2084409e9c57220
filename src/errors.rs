//! Error Types
//!
//! This module defines the error types used throughout the avatar stage.
//!
//! # Overview
//!
//! The main error type [`AvatarError`] covers all failure modes including:
//! - Asset fetching (file system and HTTP)
//! - glTF parsing and buffer resolution
//! - Clip and avatar availability
//! - Settings validation and host message decoding
//!
//! Load failures never reach the host application: the stage logs them where
//! the load result is applied. The error type exists so that every layer
//! below that boundary can propagate with `?`.

use thiserror::Error;

/// The main error type for the avatar stage.
#[derive(Error, Debug)]
pub enum AvatarError {
    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// The animation file contains no animation.
    #[error("No animation found in {0}")]
    NoAnimation(String),

    /// An operation needed an avatar but none is loaded.
    #[error("No avatar loaded")]
    AvatarMissing,

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // HTTP & Network Errors
    // ========================================================================
    /// Transport-level HTTP failure (DNS, TLS, connection reset...).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    /// HTTP response error with status code.
    #[error("HTTP response error: status {status} ({url})")]
    HttpResponseError {
        /// HTTP status code
        status: u16,
        /// Requested URL
        url: String,
    },

    // ========================================================================
    // Format & Parsing Errors
    // ========================================================================
    /// glTF parsing or loading error.
    #[error("glTF error: {0}")]
    GltfError(String),

    /// Data URI parsing error.
    #[error("Data URI error: {0}")]
    DataUriError(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Base64 decoding error.
    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    // ========================================================================
    // Async & Configuration Errors
    // ========================================================================
    /// Task join error (when async tasks fail to complete).
    #[error("Task join error: {0}")]
    TaskJoinError(String),

    /// Settings rejected by validation.
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
}

impl From<gltf::Error> for AvatarError {
    fn from(err: gltf::Error) -> Self {
        AvatarError::GltfError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AvatarError {
    fn from(err: tokio::task::JoinError) -> Self {
        AvatarError::TaskJoinError(err.to_string())
    }
}

/// Alias for `Result<T, AvatarError>`.
pub type Result<T> = std::result::Result<T, AvatarError>;
