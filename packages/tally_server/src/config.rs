use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use tally_core::{DEFAULT_SUPERSOURCE_OUTPUT, InputId, Monitor, RuleTable, TallyStatus};

// =============================================================================
// File config (figment-deserialized from defaults / tally.toml / env vars)
// =============================================================================
//
// Three equivalent ways to configure:
//
//   tally.toml:      [switcher]
//                    input_id = 3
//
//   env var:         TALLY_SWITCHER__INPUT_ID=3   (double underscore = nesting)
//
//   PORT=9000        plain PORT is honored for the listening port
//
// CLI flags are applied on top by `main`.

pub const DEFAULT_CONFIG_FILE: &str = "tally.toml";

/// Top-level tunable configuration, deserialized by figment.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub switcher: SwitcherFileConfig,
    #[serde(default)]
    pub server: ServerFileConfig,
    /// Per-status overrides of the rule table (lives under `[display.<status>]`).
    #[serde(default)]
    pub display: BTreeMap<TallyStatus, DisplayOverride>,
}

/// Switcher-side settings (lives under `[switcher]` in tally.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SwitcherFileConfig {
    /// Switcher network address, informational (the bridge connects to it)
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_input_id")]
    pub input_id: u16,
    #[serde(default = "default_supersource_output")]
    pub supersource_output: u16,
    /// Event feed: a file path, or "-" for stdin
    #[serde(default = "default_feed")]
    pub feed: String,
    /// Serve `unknown` instead of the last status while disconnected
    #[serde(default)]
    pub unknown_on_disconnect: bool,
}

impl Default for SwitcherFileConfig {
    fn default() -> Self {
        Self {
            address: None,
            input_id: default_input_id(),
            supersource_output: default_supersource_output(),
            feed: default_feed(),
            unknown_on_disconnect: false,
        }
    }
}

/// HTTP server settings (lives under `[server]` in tally.toml).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerFileConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Prebuilt frontend bundle served as the router fallback; an empty
    /// path turns static serving off
    #[serde(default = "default_static_dir")]
    pub static_dir: Option<PathBuf>,
}

fn default_static_dir() -> Option<PathBuf> {
    Some(PathBuf::from("../tally-frontend/dist"))
}

impl Default for ServerFileConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DisplayOverride {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

fn default_input_id() -> u16 {
    1
}
fn default_supersource_output() -> u16 {
    DEFAULT_SUPERSOURCE_OUTPUT.0
}
fn default_feed() -> String {
    "-".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8081
}

/// Build a figment that layers: defaults → tally.toml → TALLY_* env vars → PORT.
///
/// A missing config file is not an error; every value has a default.
pub fn load_config(config_path: &Path) -> figment::Figment {
    use figment::{
        Figment,
        providers::{Env, Format, Serialized, Toml},
    };

    Figment::from(Serialized::defaults(FileConfig::default()))
        .merge(Toml::file(config_path))
        .merge(Env::prefixed("TALLY_").split("__"))
        .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
}

// =============================================================================
// Runtime config (derived from FileConfig, used throughout the server)
// =============================================================================

#[derive(Clone, Debug)]
pub struct TallyConfig {
    pub monitor: Monitor,
    pub feed: FeedSource,
    pub unknown_on_disconnect: bool,
    pub switcher_address: Option<String>,
    pub bind_addr: SocketAddr,
    pub static_dir: Option<PathBuf>,
    pub rules: RuleTable,
}

/// Where switcher events are read from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeedSource {
    Stdin,
    File(PathBuf),
}

impl FeedSource {
    pub fn parse(s: &str) -> Self {
        if s == "-" {
            FeedSource::Stdin
        } else {
            FeedSource::File(PathBuf::from(s))
        }
    }
}

impl TallyConfig {
    pub fn from_file(fc: &FileConfig) -> Result<Self> {
        let monitor = Monitor::new(InputId(fc.switcher.input_id))
            .with_supersource_output(InputId(fc.switcher.supersource_output));

        let mut rules = RuleTable::default();
        for (status, o) in &fc.display {
            rules = rules
                .with_override(*status, o.color.as_deref(), o.text.as_deref())
                .context("Invalid [display] override")?;
        }

        let bind_addr = format!("{}:{}", fc.server.host, fc.server.port)
            .parse::<SocketAddr>()
            .with_context(|| {
                format!(
                    "Invalid listen address: {}:{}",
                    fc.server.host, fc.server.port
                )
            })?;

        Ok(Self {
            monitor,
            feed: FeedSource::parse(&fc.switcher.feed),
            unknown_on_disconnect: fc.switcher.unknown_on_disconnect,
            switcher_address: fc.switcher.address.clone(),
            bind_addr,
            static_dir: fc
                .server
                .static_dir
                .clone()
                .filter(|dir| !dir.as_os_str().is_empty()),
            rules,
        })
    }
}
