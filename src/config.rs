use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

/// Process-wide configuration, read-only after startup.
///
/// Loaded once in `main` and handed to each component as `Arc<Config>`;
/// nothing reads configuration through ambient state.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log at debug level (peer resets, parser rejections, ...).
    #[serde(default)]
    pub debug: bool,

    /// Root directory for static files.
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,

    /// Directory holding executable CGI scripts. A relative path is
    /// resolved under `static_dir`.
    #[serde(default = "default_cgi_dir")]
    pub cgi_dir: PathBuf,

    /// Serve an HTML listing for directories instead of the index file.
    #[serde(default)]
    pub show_dir: bool,

    /// Index filename looked up when a directory is requested.
    #[serde(default = "default_index")]
    pub index: String,
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_cgi_dir() -> PathBuf {
    PathBuf::from("cgi-bin")
}

fn default_index() -> String {
    "index.html".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            debug: false,
            static_dir: default_static_dir(),
            cgi_dir: default_cgi_dir(),
            show_dir: false,
            index: default_index(),
        }
    }
}

impl Config {
    /// Loads configuration from the YAML file named by the first CLI
    /// argument or the `MINNOW_CONFIG` env var. Built-in defaults apply
    /// when neither names a file.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::args()
            .nth(1)
            .or_else(|| std::env::var("MINNOW_CONFIG").ok());

        let mut cfg = match path {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        cfg.resolve_roots();
        Ok(cfg)
    }

    /// Parses a YAML config file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let cfg = serde_yaml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(cfg)
    }

    /// Resolves the static and CGI roots to absolute paths. A relative
    /// CGI dir is anchored under the static root, so the executable-script
    /// prefix check in the router compares canonical paths.
    pub fn resolve_roots(&mut self) {
        if let Ok(root) = std::fs::canonicalize(&self.static_dir) {
            self.static_dir = root;
        }
        if self.cgi_dir.is_relative() {
            self.cgi_dir = self.static_dir.join(&self.cgi_dir);
        }
        if let Ok(root) = std::fs::canonicalize(&self.cgi_dir) {
            self.cgi_dir = root;
        }
    }

    /// Address handed to `TcpListener::bind`.
    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
