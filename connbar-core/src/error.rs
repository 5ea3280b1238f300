//! Error types for ConnBar
//!
//! This module defines the error types used throughout the crate, covering
//! configuration files, the profile store and the external RDP launcher.

use std::path::PathBuf;
use thiserror::Error;

use crate::session::HostPlatform;

/// Top-level error type for ConnBar operations
#[derive(Debug, Error)]
pub enum ConnBarError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Profile store errors
    #[error("Profile store error: {0}")]
    Store(#[from] StoreError),

    /// External client launch errors
    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    /// Protocol handler errors
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to configuration file operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration file
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {reason}")]
    Validation {
        /// The field that failed validation
        field: String,
        /// The reason for validation failure
        reason: String,
    },

    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    /// Failed to write configuration file
    #[error("Failed to write configuration: {0}")]
    Write(String),

    /// Failed to serialize configuration
    #[error("Failed to serialize configuration: {0}")]
    Serialize(String),

    /// Failed to deserialize configuration
    #[error("Failed to deserialize configuration: {0}")]
    Deserialize(String),
}

/// Errors raised by the profile store
#[derive(Debug, Error)]
pub enum StoreError {
    /// No profile matched the given identifier or snapshot
    #[error("Profile not found: {0}")]
    NotFound(String),

    /// Builtin profiles can never be removed
    #[error("Profile '{0}' is builtin and cannot be deleted")]
    Builtin(String),

    /// The draft could not be saved
    #[error("Invalid profile: {0}")]
    Invalid(String),

    /// The profile failed protocol validation
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Persistence failed
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised by protocol handlers
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The profile options are unusable for this protocol
    #[error("Invalid protocol configuration: {0}")]
    InvalidConfig(String),

    /// No handler is registered for the profile type
    #[error("Unsupported protocol: {0}")]
    Unsupported(String),
}

/// Errors raised by the external RDP launcher
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The external client does not run on this host
    #[error("RDP is only supported on Windows (mstsc.exe), current platform: {0}")]
    UnsupportedPlatform(HostPlatform),

    /// The normalized host was empty
    #[error("Invalid host: the RDP profile has no host")]
    InvalidHost,

    /// The profile is not an RDP profile
    #[error("Profile '{0}' is not an RDP profile")]
    NotRdp(String),

    /// The connection descriptor could not be written
    #[error("Failed to write connection descriptor: {0}")]
    DescriptorWrite(String),

    /// The external client could not be started
    #[error("Failed to launch RDP client: {0}")]
    SpawnFailed(String),
}

/// Result type alias for ConnBar operations
pub type Result<T> = std::result::Result<T, ConnBarError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for profile store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result type alias for protocol operations
pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;

/// Result type alias for launcher operations
pub type LaunchResult<T> = std::result::Result<T, LaunchError>;
