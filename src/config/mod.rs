use std::{
    collections::HashMap,
    env,
    fs,
    io::{BufRead, BufReader},
    path::PathBuf,
};

use directories::BaseDirs;

#[derive(Debug, Clone)]
pub struct Config {
    inner: HashMap<String, String>,
    pub config_path: PathBuf,
}

impl Config {
    pub fn load() -> Self {
        let mut map = default_map();
        let config_path = default_config_path();

        // Read .sasstatrc if exists
        if config_path.exists() {
            if let Ok(file) = fs::File::open(&config_path) {
                for (k, v) in parse_rc(BufReader::new(file)) {
                    map.insert(k, v);
                }
            }
        }

        // Overlay environment variables (take precedence)
        for (k, v) in env::vars() {
            if is_config_key(&k) {
                map.insert(k, v);
            }
        }

        Self { inner: map, config_path }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        // ENV first
        if let Ok(v) = env::var(key) {
            return Some(v);
        }
        self.inner.get(key).cloned()
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).map(PathBuf::from)
    }

    /// Directory holding `libname_gen.sas`.
    pub fn macro_path(&self) -> PathBuf {
        self.get_path("SASSTAT_MACRO_PATH").unwrap_or_else(|| PathBuf::from("."))
    }
}

/// `KEY=VALUE` lines; blank lines and `#` comments are skipped.
fn parse_rc<R: BufRead>(reader: R) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for line in reader.lines().map_while(|l| l.ok()) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            out.push((k.trim().to_string(), v.trim().to_string()));
        }
    }
    out
}

fn is_config_key(k: &str) -> bool {
    // Accept known keys or SASSTAT_*/SAS_* for forward-compat
    const KEYS: &[&str] = &["DEFAULT_COLOR"];

    KEYS.contains(&k) || k.starts_with("SASSTAT_") || k.starts_with("SAS_")
}

fn default_config_path() -> PathBuf {
    let base = BaseDirs::new()
        .map(|b| b.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("~/.config"));
    base.join("sasstat").join(".sasstatrc")
}

fn default_map() -> HashMap<String, String> {
    let mut m = HashMap::new();

    m.insert("SAS_EXECUTABLE".into(), "sas".into());
    m.insert("SAS_OPTIONS".into(), "-nodms -nonews -nosyntaxcheck".into());
    m.insert("SASSTAT_MACRO_PATH".into(), ".".into());
    m.insert("SASSTAT_LOG".into(), "warn".into());
    m.insert("DEFAULT_COLOR".into(), "cyan".into());

    // Bools as strings
    m.insert("SASSTAT_EXPLAIN_ONLY".into(), "false".into());

    m
}
