//! Persistence of the session to a JSON document

use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::form::row::{ParameterRow, RowKind};
use crate::form::tab::TabPage;
use crate::session::Session;

/// Default configuration file name, resolved against the current directory
pub const CONFIG_FILE: &str = "cmdtab.json";

/// Appended to the configuration path to locate the template document
const EXAMPLE_SUFFIX: &str = ".example";

/// Errors that can occur while reading or writing the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unable to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unable to parse JSON config file {path}: {source}")]
    Json {
        source: serde_json::Error,
        path: PathBuf,
    },
    #[error("Unable to serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Config file already exists: {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),
}

fn default_row_kind() -> String {
    RowKind::default().tag().to_string()
}

fn default_tab_name() -> String {
    "Tab".to_string()
}

/// Deserialize a field, replacing `null` or a value of the wrong type with the
/// type's default so one bad field never discards the document.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(value.clone()).unwrap_or_else(|e| {
        warn!("Ignoring invalid config value {value}: {e}");
        T::default()
    }))
}

fn lenient_row_kind<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient::<_, Option<String>>(deserializer)?.unwrap_or_else(default_row_kind))
}

fn lenient_tab_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient::<_, Option<String>>(deserializer)?.unwrap_or_else(default_tab_name))
}

/// Configuration for a single parameter row
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ConfigRow {
    #[serde(
        rename = "type",
        default = "default_row_kind",
        deserialize_with = "lenient_row_kind"
    )]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient")]
    pub key: String,
    #[serde(default, deserialize_with = "lenient")]
    pub value: String,
    #[serde(default, deserialize_with = "lenient")]
    pub options: Vec<String>,
}

impl From<ConfigRow> for ParameterRow {
    fn from(config: ConfigRow) -> Self {
        let kind = RowKind::from_tag(&config.kind).unwrap_or_else(|| {
            warn!(
                "Unknown row type '{}', using '{}'",
                config.kind,
                RowKind::default().tag()
            );
            RowKind::default()
        });
        ParameterRow {
            kind,
            key: config.key,
            value: config.value,
            options: config.options,
        }
    }
}

impl From<&ParameterRow> for ConfigRow {
    fn from(row: &ParameterRow) -> Self {
        ConfigRow {
            kind: row.kind.tag().to_string(),
            key: row.key.clone(),
            value: row.value.clone(),
            options: row.options.clone(),
        }
    }
}

/// Contents of a tab page
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ConfigTabBody {
    #[serde(deserialize_with = "lenient")]
    pub work_dir: String,
    #[serde(deserialize_with = "lenient")]
    pub main_cmd: String,
    #[serde(deserialize_with = "lenient")]
    pub rows: Vec<ConfigRow>,
}

/// A named tab page
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ConfigTab {
    #[serde(default = "default_tab_name", deserialize_with = "lenient_tab_name")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub config: ConfigTabBody,
}

impl From<ConfigTab> for TabPage {
    fn from(config: ConfigTab) -> Self {
        TabPage {
            name: config.name,
            work_dir: config.config.work_dir,
            main_cmd: config.config.main_cmd,
            rows: config.config.rows.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&TabPage> for ConfigTab {
    fn from(tab: &TabPage) -> Self {
        ConfigTab {
            name: tab.name.clone(),
            config: ConfigTabBody {
                work_dir: tab.work_dir.clone(),
                main_cmd: tab.main_cmd.clone(),
                rows: tab.rows.iter().map(Into::into).collect(),
            },
        }
    }
}

/// Root configuration document
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    #[serde(deserialize_with = "lenient")]
    pub tabs: Vec<ConfigTab>,
    /// Anything but an integer reads as `None`
    #[serde(deserialize_with = "lenient")]
    pub last_selected_tab: Option<i64>,
}

impl From<Config> for Session {
    fn from(config: Config) -> Self {
        let selected = config
            .last_selected_tab
            .and_then(|index| usize::try_from(index).ok());
        Session::from_tabs(config.tabs.into_iter().map(Into::into).collect(), selected)
    }
}

impl From<&Session> for Config {
    fn from(session: &Session) -> Self {
        Config {
            tabs: session.tabs().iter().map(Into::into).collect(),
            last_selected_tab: i64::try_from(session.selected()).ok(),
        }
    }
}

impl Config {
    /// Loads and parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read, or
    /// `ConfigError::Json` if parsing fails.
    pub fn from_file(file: &Path) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(file).map_err(|source| ConfigError::Read {
            path: file.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
            source,
            path: file.to_path_buf(),
        })
    }

    /// Render as indented JSON, non-ASCII text kept verbatim.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Serialize` if serialization fails.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Where a loaded session came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    Primary(PathBuf),
    Example(PathBuf),
    /// Nothing usable on disk; a fresh default session
    Default,
}

/// Result of a tolerant load: always a usable session, plus the error that forced
/// a fallback, if any.
#[derive(Debug)]
pub struct LoadOutcome {
    pub session: Session,
    pub source: LoadSource,
    pub error: Option<ConfigError>,
}

/// Reads and writes the session at a fixed path, with a template fallback
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    example: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(CONFIG_FILE)
    }
}

impl ConfigStore {
    /// A store writing to `path`, falling back to `<path>.example` on load.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut example = path.clone().into_os_string();
        example.push(EXAMPLE_SUFFIX);
        Self {
            path,
            example: PathBuf::from(example),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn example_path(&self) -> &Path {
        &self.example
    }

    /// Directory holding the configuration file.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// Read a session from `path`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` or `ConfigError::Json` on failure.
    pub fn read(path: &Path) -> Result<Session, ConfigError> {
        debug!("Reading session from {}", path.display());
        Config::from_file(path).map(Session::from)
    }

    /// Write the whole session to the configuration path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Write` if the file cannot be written.
    pub fn save(&self, session: &Session) -> Result<(), ConfigError> {
        let json = Config::from(session).to_json()?;
        std::fs::write(&self.path, json).map_err(|source| ConfigError::Write {
            path: self.path.clone(),
            source,
        })?;
        info!("Configuration saved to {}", self.path.display());
        Ok(())
    }

    /// Load the session: configuration file, then the example file, then a single
    /// default tab. An unreadable file is reported and replaced by the default.
    #[must_use]
    pub fn load(&self) -> LoadOutcome {
        let (path, source) = if self.path.exists() {
            (&self.path, LoadSource::Primary(self.path.clone()))
        } else if self.example.exists() {
            (&self.example, LoadSource::Example(self.example.clone()))
        } else {
            info!(
                "No config found at {}, starting with a default tab",
                self.path.display()
            );
            return LoadOutcome {
                session: Session::new(),
                source: LoadSource::Default,
                error: None,
            };
        };

        match Self::read(path) {
            Ok(session) => {
                info!(
                    "Loaded {} tab(s) from {}",
                    session.len(),
                    path.display()
                );
                LoadOutcome {
                    session,
                    source,
                    error: None,
                }
            }
            Err(e) => {
                error!("Failed to load config: {e}");
                LoadOutcome {
                    session: Session::new(),
                    source: LoadSource::Default,
                    error: Some(e),
                }
            }
        }
    }

    /// Read the example file, if there is one.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` or `ConfigError::Json` if the file exists but
    /// cannot be loaded.
    pub fn load_example(&self) -> Result<Option<Session>, ConfigError> {
        if !self.example.exists() {
            return Ok(None);
        }
        Self::read(&self.example).map(Some)
    }

    /// Write `session` to the configuration path unless a file is already there.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::AlreadyExists` when the file exists and `force` is not
    /// set, or `ConfigError::Write` on write failure.
    pub fn init(&self, session: &Session, force: bool) -> Result<(), ConfigError> {
        if self.path.exists() && !force {
            return Err(ConfigError::AlreadyExists(self.path.clone()));
        }
        self.save(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"tabs": [{"config": {"rows": [{"key": "-v"}, {"type": "文本", "value": "hi"}]}}]}"#,
        )
        .unwrap();
        let session = Session::from(config);
        let tab = session.current();
        assert_eq!(tab.name, "Tab");
        assert_eq!(tab.work_dir, "");
        assert_eq!(tab.main_cmd, "");
        assert_eq!(tab.rows[0], ParameterRow::new(RowKind::Toggle, "-v", ""));
        assert_eq!(tab.rows[1], ParameterRow::new(RowKind::Text, "", "hi"));
    }

    #[test]
    fn test_unknown_row_type_falls_back_to_toggle() {
        let row = ParameterRow::from(ConfigRow {
            kind: "slider".to_string(),
            key: "-x".to_string(),
            value: "1".to_string(),
            options: vec![],
        });
        assert_eq!(row.kind, RowKind::Toggle);
        assert_eq!(row.key, "-x");
    }

    #[test]
    fn test_tab_without_rows_stays_empty() {
        let config: Config =
            serde_json::from_str(r#"{"tabs": [{"name": "bare", "config": {"main_cmd": "ls"}}]}"#)
                .unwrap();
        let session = Session::from(config);
        assert!(session.current().rows.is_empty());
        assert_eq!(session.current().main_cmd, "ls");
    }

    #[test]
    fn test_empty_document_yields_default_tab() {
        let session = Session::from(serde_json::from_str::<Config>("{}").unwrap());
        assert_eq!(session, Session::new());
    }

    #[test]
    fn test_negative_selection_is_ignored() {
        let config: Config = serde_json::from_str(
            r#"{"tabs": [{"name": "a"}, {"name": "b"}], "last_selected_tab": -1}"#,
        )
        .unwrap();
        assert_eq!(Session::from(config).selected(), 0);
    }

    #[test]
    fn test_non_integer_selection_keeps_tabs() {
        for selection in ["null", r#""1""#, "1.5", "[1]"] {
            let config: Config = serde_json::from_str(&format!(
                r#"{{"tabs": [{{"name": "a"}}, {{"name": "b"}}], "last_selected_tab": {selection}}}"#
            ))
            .unwrap();
            let session = Session::from(config);
            let names: Vec<&str> = session.tabs().iter().map(|t| t.name.as_str()).collect();
            assert_eq!(names, vec!["a", "b"], "selection {selection}");
            assert_eq!(session.selected(), 0, "selection {selection}");
        }
    }

    #[test]
    fn test_null_fields_take_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"tabs": [
                {"name": "a", "config": {"work_dir": null, "main_cmd": "ls", "rows": [
                    {"type": "开关", "key": null, "value": "-l"},
                    {"type": null, "key": "-o", "value": null, "options": null}
                ]}},
                {"name": null, "config": null}
            ]}"#,
        )
        .unwrap();
        let session = Session::from(config);
        let tab = session.current();
        assert_eq!(tab.name, "a");
        assert_eq!(tab.work_dir, "");
        assert_eq!(tab.main_cmd, "ls");
        assert_eq!(tab.rows[0], ParameterRow::new(RowKind::Toggle, "", "-l"));
        assert_eq!(tab.rows[1], ParameterRow::new(RowKind::Toggle, "-o", ""));
        assert_eq!(session.tabs()[1].name, "Tab");
        assert!(session.tabs()[1].rows.is_empty());
    }

    #[test]
    fn test_mistyped_fields_take_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"tabs": [{"name": 3, "config": {"main_cmd": ["ls"], "rows": [
                {"type": "文件", "key": 42, "value": "a.txt", "options": "x"}
            ]}}], "last_selected_tab": 0}"#,
        )
        .unwrap();
        let tab = Session::from(config).current().clone();
        assert_eq!(tab.name, "Tab");
        assert_eq!(tab.main_cmd, "");
        assert_eq!(tab.rows, vec![ParameterRow::new(RowKind::File, "", "a.txt")]);
    }

    #[test]
    fn test_json_layout() {
        let tab = TabPage {
            main_cmd: "bash qwen".to_string(),
            rows: vec![
                ParameterRow::new(RowKind::Toggle, "-m", "qwen-max-latest")
                    .with_options(["qwen-max-latest"]),
                ParameterRow::new(RowKind::Directory, "-o", "out"),
            ],
            ..TabPage::empty("A")
        };
        let json = Config::from(&Session::from_tabs(vec![tab], None))
            .to_json()
            .unwrap();
        insta::assert_snapshot!(json, @r#"
        {
          "tabs": [
            {
              "name": "A",
              "config": {
                "work_dir": "",
                "main_cmd": "bash qwen",
                "rows": [
                  {
                    "type": "开关",
                    "key": "-m",
                    "value": "qwen-max-latest",
                    "options": [
                      "qwen-max-latest"
                    ]
                  },
                  {
                    "type": "目录",
                    "key": "-o",
                    "value": "out",
                    "options": []
                  }
                ]
              }
            }
          ],
          "last_selected_tab": 0
        }
        "#);
    }

    #[test]
    fn test_example_path_and_base_dir() {
        let store = ConfigStore::new("/etc/cmdtab/cmdtab.json");
        assert_eq!(
            store.example_path(),
            Path::new("/etc/cmdtab/cmdtab.json.example")
        );
        assert_eq!(store.base_dir(), Path::new("/etc/cmdtab"));
        assert_eq!(ConfigStore::default().base_dir(), Path::new("."));
    }
}
