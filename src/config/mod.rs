use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(alias = "root", alias = "site")]
    pub source: Option<String>,
    pub manifest: Option<String>,
    pub concurrency: Option<usize>,
    pub timeout: Option<u64>,
    pub page_size: Option<usize>,
    pub view: Option<String>,
    pub sort: Option<String>,
    pub sort_dir: Option<String>,
    #[serde(alias = "category_field")]
    pub filter_field: Option<String>,
    pub debounce_ms: Option<u64>,
    pub missing_label: Option<String>,
    pub untitled_label: Option<String>,
    pub source_placeholder: Option<String>,
    pub no_color: Option<bool>,
    pub output_format: Option<String>,
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .or_else(|| {
            let drive = env::var_os("HOMEDRIVE")?;
            let path = env::var_os("HOMEPATH")?;
            Some(PathBuf::from(drive).join(path))
        })
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(home_dir()?.join(".incident-browser").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

/// An empty document is an empty config.
pub fn parse_config(contents: &str) -> Result<ConfigFile, serde_yaml::Error> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents)
}

fn default_config_yaml() -> String {
    r##"# incident-browser config
#
# Location (default):
#   ~/.incident-browser/config.yml

# Site root holding manifest.json (URL or directory)
# source: https://example.org/incidentes/
# manifest: manifest.json

# Loading
concurrency: 12
timeout: 10

# Browsing
page_size: 20
view: table
sort: date
sort_dir: desc
# Field the category filter compares against: region, country or category
filter_field: region
debounce_ms: 150

# Labels used when a record omits a field
missing_label: "N/A"
untitled_label: "(Untitled)"
source_placeholder: "#"

# Output
no_color: false
output_format: text
"##
    .to_string()
}

pub fn ensure_default_config_file(path: &PathBuf) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    let contents = default_config_yaml();
    std::fs::write(path, contents)
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_yaml_parses() {
        let cfg = parse_config(&default_config_yaml()).unwrap();
        assert_eq!(cfg.page_size, Some(20));
        assert_eq!(cfg.sort.as_deref(), Some("date"));
        assert_eq!(cfg.filter_field.as_deref(), Some("region"));
        assert_eq!(cfg.source, None);
        assert_eq!(cfg.source_placeholder.as_deref(), Some("#"));
        assert_eq!(cfg.output_format.as_deref(), Some("text"));
    }

    #[test]
    fn aliases_and_empty_documents() {
        let cfg = parse_config("site: ./public\ncategory_field: country\n").unwrap();
        assert_eq!(cfg.source.as_deref(), Some("./public"));
        assert_eq!(cfg.filter_field.as_deref(), Some("country"));
        assert_eq!(parse_config("  \n").unwrap(), ConfigFile::default());
    }

    #[test]
    fn missing_file_handling() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yml");
        assert_eq!(load_config(&path, true).unwrap(), ConfigFile::default());
        assert!(load_config(&path, false).is_err());
    }

    #[test]
    fn ensure_default_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yml");
        ensure_default_config_file(&path).unwrap();
        std::fs::write(&path, "page_size: 50\n").unwrap();
        ensure_default_config_file(&path).unwrap();
        assert_eq!(load_config(&path, false).unwrap().page_size, Some(50));
    }

    #[test]
    fn tilde_expands_to_home() {
        let dir = tempfile::tempdir().unwrap();
        env::set_var("HOME", dir.path());
        let home = dir.path().to_path_buf();
        assert_eq!(expand_tilde("~/sites/incidentes"), home.join("sites/incidentes"));
        assert_eq!(expand_tilde("relative/dir"), PathBuf::from("relative/dir"));
        assert_eq!(expand_tilde("/abs/~/dir"), PathBuf::from("/abs/~/dir"));
    }
}
