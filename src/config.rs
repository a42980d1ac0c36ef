use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use serfig::collectors::{from_file, from_self};
use serfig::parsers::Toml;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::evict_policy::PolicyKind;
use crate::trace;
use crate::Key;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[clap(author, version, about, long_about = None)]
#[serde(default)]
pub struct Config {
    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE")]
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Trace file, one key per line or CSV
    #[arg(long, value_name = "FILE")]
    pub trace: Option<PathBuf>,

    /// Zero-based CSV column holding the key
    #[arg(long, default_value_t = 0)]
    pub key_column: usize,

    /// Treat the first trace line as a header
    #[arg(long)]
    pub has_headers: bool,

    /// Keys to replay, comma separated (e.g. A,B,C)
    #[arg(long, value_delimiter = ',')]
    pub keys: Vec<String>,

    /// Read keys from stdin until RUN
    #[arg(short, long)]
    pub interactive: bool,

    /// Maximum number of resident keys (0 is treated as 1)
    #[arg(short, long, default_value_t = 4)]
    pub capacity: usize,

    /// Eviction policies to run (LRU, FIFO, LFU); unknown names run as LRU
    #[arg(long, value_delimiter = ',', default_values = ["LRU", "FIFO", "LFU"])]
    pub policies: Vec<String>,

    /// Also compute miss ratio curves for capacities 1..=MAX
    #[arg(long, value_name = "MAX")]
    pub sweep: Option<usize>,

    /// Where to draw the miss ratio curves (PNG)
    #[arg(long, value_name = "FILE")]
    pub plot: Option<PathBuf>,

    /// Where to write the miss ratio curves (CSV)
    #[arg(long, value_name = "FILE")]
    pub csv: Option<PathBuf>,

    /// Log every access
    #[arg(short, long)]
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_file: None,
            trace: None,
            key_column: 0,
            has_headers: false,
            keys: Vec::new(),
            interactive: false,
            capacity: 4,
            policies: default_policies(),
            sweep: None,
            plot: None,
            csv: None,
            verbose: false,
        }
    }
}

fn default_policies() -> Vec<String> {
    PolicyKind::ALL.iter().map(|k| k.to_string()).collect()
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let mut config: Config =
            toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.config_file = Some(path.to_path_buf());
        Ok(config)
    }

    /// Layers the config file (if any) under the command line arguments.
    pub fn load(arg_conf: Self) -> Result<Self> {
        let mut builder: serfig::Builder<Self> = serfig::Builder::default();

        let config_file = arg_conf.config_file.clone();
        if let Some(path) = &config_file {
            let path_str = path
                .to_str()
                .ok_or_else(|| Error::Config(format!("non UTF-8 path {}", path.display())))?;
            builder = builder.collect(from_file(Toml, path_str));
        }

        builder = builder.collect(from_self(arg_conf));

        let mut config = builder
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.config_file = config_file;
        Ok(config)
    }

    /// Resolves policy names, replacing unknown ones with LRU.
    pub fn policy_kinds(&self) -> Vec<PolicyKind> {
        if self.policies.is_empty() {
            return vec![PolicyKind::Lru];
        }
        self.policies
            .iter()
            .map(|name| PolicyKind::from_name_or_default(name))
            .collect()
    }

    /// True when keys will come from the interactive prompt.
    pub fn reads_interactively(&self) -> bool {
        self.interactive && self.trace.is_none() && self.keys.is_empty()
    }

    /// Key sequence to replay: trace file, then `--keys`, then the prompt,
    /// else the demo sequence.
    pub fn load_keys(&self) -> Result<Vec<Key>> {
        let keys = if let Some(path) = &self.trace {
            info!("reading trace {}", path.display());
            trace::load_keys(path, self.key_column, self.has_headers)?
        } else if !self.keys.is_empty() {
            self.keys
                .iter()
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect()
        } else if self.interactive {
            trace::read_interactive(io::stdin().lock(), io::stdout())?
        } else {
            debug!("no key source given, using the demo sequence");
            trace::demo_sequence()
        };

        if keys.is_empty() {
            return Err(Error::NoKeys);
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_run_all_policies_at_capacity_four() {
        let config = Config::parse_from(["cache_sim"]);
        assert_eq!(config.capacity, 4);
        assert_eq!(config.policy_kinds(), PolicyKind::ALL.to_vec());
        assert_eq!(config.load_keys().unwrap(), trace::demo_sequence());
    }

    #[test]
    fn cli_lists_are_comma_separated() {
        let config = Config::parse_from([
            "cache_sim",
            "--keys",
            "x,y, z",
            "--policies",
            "fifo,nope",
            "-c",
            "2",
        ]);
        assert_eq!(config.load_keys().unwrap(), vec!["x", "y", "z"]);
        assert_eq!(
            config.policy_kinds(),
            vec![PolicyKind::Fifo, PolicyKind::Lru]
        );
        assert_eq!(config.capacity, 2);
    }

    #[test]
    fn blank_keys_are_an_error() {
        let config = Config {
            keys: vec![" ".to_string()],
            ..Config::default()
        };
        assert!(matches!(config.load_keys(), Err(Error::NoKeys)));
    }

    #[test]
    fn trace_file_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trace.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "p\nq\np").unwrap();

        let config = Config {
            trace: Some(path),
            keys: vec!["ignored".to_string()],
            ..Config::default()
        };
        assert_eq!(config.load_keys().unwrap(), vec!["p", "q", "p"]);
    }

    #[test]
    fn missing_trace_file_names_the_path() {
        let config = Config {
            trace: Some(PathBuf::from("/nonexistent/trace.csv")),
            ..Config::default()
        };
        let err = config.load_keys().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/trace.csv"));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.toml");
        std::fs::write(&path, "capacity = 8\npolicies = [\"LFU\"]\nsweep = 16\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.capacity, 8);
        assert_eq!(config.policy_kinds(), vec![PolicyKind::Lfu]);
        assert_eq!(config.sweep, Some(16));
        assert_eq!(config.config_file.as_deref(), Some(path.as_path()));
        assert!(!config.verbose);
    }

    #[test]
    fn config_file_fills_in_cli_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.toml");
        std::fs::write(&path, "capacity = 8\n").unwrap();
        let path_arg = path.to_str().unwrap();

        let config = Config::load(Config::parse_from(["cache_sim", "--config-file", path_arg]))
            .unwrap();
        assert_eq!(config.capacity, 8);
        assert_eq!(config.config_file.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn cli_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.toml");
        std::fs::write(&path, "capacity = 8\n").unwrap();
        let path_arg = path.to_str().unwrap();

        let config = Config::load(Config::parse_from([
            "cache_sim",
            "--config-file",
            path_arg,
            "-c",
            "2",
        ]))
        .unwrap();
        assert_eq!(config.capacity, 2);
    }

    #[test]
    fn interactive_only_without_other_sources() {
        let prompt = Config::parse_from(["cache_sim", "-i"]);
        assert!(prompt.reads_interactively());

        let with_keys = Config::parse_from(["cache_sim", "-i", "--keys", "a"]);
        assert!(!with_keys.reads_interactively());

        let with_trace = Config::parse_from(["cache_sim", "-i", "--trace", "t.csv"]);
        assert!(!with_trace.reads_interactively());

        assert!(!Config::default().reads_interactively());
    }

    #[test]
    fn bad_toml_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "capacity = \"many\"\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(Error::Config(_))));
    }
}
