use std::fs;
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::render::ViewKind;

/// Values read from a TOML config file. Everything is optional so command
/// line flags can fill in the rest.
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub pcap_path: Option<PathBuf>,
    pub client_ip: Option<String>,
    pub display_filter: Option<String>,
    pub view: Option<ViewKind>,
}

impl FileConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Fills unset fields from `other`; values already set win.
    pub fn or(self, other: FileConfig) -> FileConfig {
        FileConfig {
            pcap_path: self.pcap_path.or(other.pcap_path),
            client_ip: self.client_ip.or(other.client_ip),
            display_filter: self.display_filter.or(other.display_filter),
            view: self.view.or(other.view),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub pcap_path: PathBuf,
    pub client_ip: IpAddr,
    pub display_filter: String,
    pub view: ViewKind,
}

impl Config {
    pub fn resolve(file: FileConfig) -> Result<Self, ConfigError> {
        let pcap_path = file.pcap_path.ok_or(ConfigError::MissingField("pcap_path"))?;
        let raw_ip = file.client_ip.ok_or(ConfigError::MissingField("client_ip"))?;
        let client_ip = raw_ip
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidClientIp(raw_ip.clone()))?;

        Ok(Self {
            pcap_path,
            client_ip,
            display_filter: file.display_filter.unwrap_or_default(),
            view: file.view.unwrap_or_default(),
        })
    }

    /// BPF expression handed to the reader: the client ip equality filter,
    /// narrowed by the configured display filter when there is one.
    pub fn capture_filter(&self) -> String {
        let host = format!("host {}", self.client_ip);
        match self.display_filter.trim() {
            "" => host,
            extra => format!("{host} and ({extra})"),
        }
    }

    /// Label used for chart titles, e.g. `10.0.0.1 on office-trace`.
    pub fn title(&self) -> String {
        let stem = self
            .pcap_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        format!("{} on {}", self.client_ip, stem)
    }
}
