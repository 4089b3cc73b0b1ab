//! Server configuration
//!
//! Mirrors the configuration surface spelled out for the core: everything
//! a session or backend needs to know that isn't discovered at runtime.
//! Loading and merging configuration *files* is explicitly out of scope
//! (an external collaborator's job); this module provides just enough of
//! a loader to make the binary runnable from a single TOML file.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NntpError, Result};

/// Whether the server accepts `POST`/`IHAVE` or is serving archived content only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServerType {
    /// Posting is accepted (subject to auth gating)
    ReadWrite,
    /// `POST` always replies `440`
    ReadOnly,
}

impl ServerType {
    /// Greeting/MODE READER status code for this server type
    pub fn greeting_code(self) -> u16 {
        match self {
            ServerType::ReadWrite => crate::response::codes::READY_POSTING_ALLOWED,
            ServerType::ReadOnly => crate::response::codes::READY_NO_POSTING,
        }
    }
}

/// Configuration for one hierarchy-prefix → backend mapping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyConfig {
    /// Backend module name (currently only `"maildir"` is implemented)
    pub backend: String,
    /// Backend-specific options (e.g. `maildir_path` override for this hierarchy)
    #[serde(default)]
    pub options: HashMap<String, String>,
}

/// NNTP server configuration
///
/// Contains the fields the session engine and backend router consume at
/// startup. Construct directly, or load from a TOML file with
/// [`ServerConfig::from_file`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Hostname used in the greeting and synthesized `Path`/`Xref` headers
    pub nntp_hostname: String,

    /// TCP port to listen on
    #[serde(default = "default_port")]
    pub nntp_port: u16,

    /// Read-only or read-write
    pub server_type: ServerType,

    /// Whether `AUTHINFO` gating is enabled
    #[serde(default)]
    pub nntp_auth: bool,

    /// Identifier of the authentication backend; required when `nntp_auth` is set
    #[serde(default)]
    pub auth_backend: Option<String>,

    /// Soft cap on concurrent connections (advisory; `None` means unbounded)
    #[serde(default)]
    pub max_connections: Option<usize>,

    /// Default backend module name for the reserved `papercut` hierarchy
    pub storage_backend: String,

    /// Additional hierarchy-prefix → backend mappings
    #[serde(default)]
    pub hierarchies: HashMap<String, HierarchyConfig>,

    /// Root directory for the mail-directory backend
    pub maildir_path: String,

    /// Path to the append-only event log
    pub log_file: String,
}

fn default_port() -> u16 {
    119
}

/// The hierarchy name reserved for the default/global backend
pub const GLOBAL_HIERARCHY: &str = "papercut";

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| NntpError::Config(format!("invalid config file: {e}")))
    }

    /// Validate the configuration, matching the fatal startup checks in the
    /// specification: auth enabled without a backend, an illegal hierarchy
    /// name colliding with the reserved global prefix, or no backend
    /// configured at all.
    pub fn validate(&self) -> Result<()> {
        if self.nntp_auth && self.auth_backend.is_none() {
            return Err(NntpError::Config(
                "nntp_auth is enabled but no auth_backend is configured".into(),
            ));
        }
        if self.storage_backend.is_empty() && self.hierarchies.is_empty() {
            return Err(NntpError::Config("no backend configured for any hierarchy".into()));
        }
        for hierarchy in self.hierarchies.keys() {
            if hierarchy == GLOBAL_HIERARCHY {
                return Err(NntpError::Config(format!(
                    "hierarchy name '{GLOBAL_HIERARCHY}' is reserved for the global backend"
                )));
            }
        }
        Ok(())
    }
}
