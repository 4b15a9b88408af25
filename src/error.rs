use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the flow table.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlowError {
    /// A decoded record lacks one of the fields needed to place it in a flow.
    #[error("malformed packet: missing or invalid `{field}`")]
    MalformedPacket { field: &'static str },

    #[error("flow table is empty")]
    EmptyTable,
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("failed to open capture {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: pcap::Error,
    },

    #[error("failed to apply display filter `{filter}`: {source}")]
    Filter {
        filter: String,
        #[source]
        source: pcap::Error,
    },

    #[error("failed to read capture record: {0}")]
    Read(#[source] pcap::Error),

    #[error("unsupported link type {0}")]
    UnsupportedLinktype(i32),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("`{0}` is not configured")]
    MissingField(&'static str),

    #[error("invalid client ip `{0}`")]
    InvalidClientIp(String),
}
