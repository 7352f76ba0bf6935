//! Settings and address resolution.
//!
//! Settings come from a JSON file whose every field is optional. The
//! sender and test addresses are then looked up in three tiers, first
//! non-empty value wins:
//!
//! 1. the process environment (`HANDIN_SENDER`, `HANDIN_TEST_ADDRESS`)
//! 2. the settings file (`sender`, `test_address`)
//! 3. defaults compiled in from `HANDIN_DEFAULT_SENDER` and
//!    `HANDIN_DEFAULT_TEST_ADDRESS` at build time

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::filter::{DEFAULT_EXCLUDED_SUFFIXES, DEFAULT_HIDDEN_MARKER, PathFilter};

/// Environment variable overriding the sender address.
pub const SENDER_ENV: &str = "HANDIN_SENDER";

/// Environment variable overriding the test address.
pub const TEST_ADDRESS_ENV: &str = "HANDIN_TEST_ADDRESS";

/// Environment variable naming the settings file.
pub const CONFIG_ENV: &str = "HANDIN_CONFIG";

const COMPILED_SENDER: Option<&str> = option_env!("HANDIN_DEFAULT_SENDER");
const COMPILED_TEST_ADDRESS: Option<&str> = option_env!("HANDIN_DEFAULT_TEST_ADDRESS");

/// Puzzle names accepted out of the box.
pub const DEFAULT_PUZZLES: &[&str] = &[
    "breathalyzer",
    "dancebattle",
    "facebull",
    "fridgemadness",
    "gattaca",
    "hoppity",
    "liarliar",
    "meepmeep",
    "peaktraffic",
    "smallworld",
    "sophie",
    "usrbincrash",
];

/// Address real submissions go to.
pub const DEFAULT_SUBMISSION_ADDRESS: &str = "1051962371@fb.com";

/// Name of the optional library folder inside a solution directory.
pub const DEFAULT_LIBRARY_DIR: &str = "lib";

/// Connection security for the SMTP session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    /// Plain TCP, no encryption.
    None,
    /// Implicit TLS from the first byte.
    Tls,
    /// Plain TCP upgraded with STARTTLS.
    #[default]
    StartTls,
}

/// Outgoing server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Connection security.
    pub security: Security,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            security: Security::StartTls,
        }
    }
}

/// Data-driven configuration for a submission run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Recognized puzzle names.
    pub puzzles: BTreeSet<String>,
    /// File name suffixes left out of the library archive.
    pub excluded_suffixes: Vec<String>,
    /// Leading character of hidden files.
    pub hidden_marker: char,
    /// Library folder name inside a solution directory.
    pub library_dir: String,
    /// Where real submissions are sent.
    pub submission_address: String,
    /// Sender address, below the environment in priority.
    pub sender: Option<String>,
    /// Test address, below the environment in priority.
    pub test_address: Option<String>,
    /// Outgoing server.
    pub smtp: SmtpSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            puzzles: DEFAULT_PUZZLES.iter().map(|s| (*s).to_string()).collect(),
            excluded_suffixes: DEFAULT_EXCLUDED_SUFFIXES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            hidden_marker: DEFAULT_HIDDEN_MARKER,
            library_dir: DEFAULT_LIBRARY_DIR.to_string(),
            submission_address: DEFAULT_SUBMISSION_ADDRESS.to_string(),
            sender: None,
            test_address: None,
            smtp: SmtpSettings::default(),
        }
    }
}

impl Settings {
    /// Returns `<config dir>/handin/config.json`, if the platform has a
    /// config directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("handin").join("config.json"))
    }

    /// Loads settings.
    ///
    /// An explicit path must exist. Without one the default path is tried,
    /// and a missing default file yields [`Settings::default`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigFile`] if the file cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No settings file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reads settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigFile`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| config_error(path, &e))?;
        let settings = Self::from_json(&text).map_err(|e| Error::ConfigFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Parses settings from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the parser error for malformed JSON or unknown keys.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Builds the archive filter these settings describe.
    #[must_use]
    pub fn path_filter(&self) -> PathFilter {
        PathFilter::new(self.excluded_suffixes.iter().cloned(), self.hidden_marker)
    }
}

fn config_error(path: &Path, err: &io::Error) -> Error {
    let message = if err.kind() == io::ErrorKind::NotFound {
        "file not found".to_string()
    } else {
        err.to_string()
    };
    Error::ConfigFile {
        path: path.to_path_buf(),
        message,
    }
}

/// Snapshot of the environment variables the core reads.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Captures the current process environment.
    #[must_use]
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
                .collect(),
        }
    }

    /// Builds an environment from explicit pairs.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Returns the trimmed value of `key`, or `None` when unset or blank.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        non_empty(self.vars.get(key).map(String::as_str))
    }
}

/// The addresses a run needs, fully resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Addresses {
    /// Account that sends and is always copied.
    pub sender: String,
    /// Recipient in test mode.
    pub test_address: String,
    /// Recipient in real mode.
    pub submission: String,
}

struct Lookup {
    name: &'static str,
    env_var: &'static str,
    key: &'static str,
}

const SENDER: Lookup = Lookup {
    name: "sender address",
    env_var: SENDER_ENV,
    key: "sender",
};

const TEST_ADDRESS: Lookup = Lookup {
    name: "test address",
    env_var: TEST_ADDRESS_ENV,
    key: "test_address",
};

impl Addresses {
    /// Resolves the sender and test addresses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigurationMissing`] if a value is unset in every
    /// tier, and [`Error::InvalidAddress`] if a value is not an address.
    pub fn resolve(settings: &Settings, env: &Environment) -> Result<Self> {
        Self::resolve_with_defaults(settings, env, COMPILED_SENDER, COMPILED_TEST_ADDRESS)
    }

    fn resolve_with_defaults(
        settings: &Settings,
        env: &Environment,
        compiled_sender: Option<&str>,
        compiled_test_address: Option<&str>,
    ) -> Result<Self> {
        let sender = lookup(&SENDER, env, settings.sender.as_deref(), compiled_sender)?;
        let test_address = lookup(
            &TEST_ADDRESS,
            env,
            settings.test_address.as_deref(),
            compiled_test_address,
        )?;
        let submission = validate(&settings.submission_address)?;
        Ok(Self {
            sender,
            test_address,
            submission,
        })
    }
}

fn lookup(
    what: &Lookup,
    env: &Environment,
    file: Option<&str>,
    compiled: Option<&str>,
) -> Result<String> {
    let value = env
        .get(what.env_var)
        .or_else(|| non_empty(file))
        .or_else(|| non_empty(compiled))
        .ok_or(Error::ConfigurationMissing {
            name: what.name,
            env_var: what.env_var,
            key: what.key,
        })?;
    validate(value)
}

fn validate(address: &str) -> Result<String> {
    handin_smtp::Address::new(address)
        .map(|a| a.as_str().to_string())
        .map_err(|e| Error::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_cover_every_field() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.puzzles.contains("hoppity"));
        assert_eq!(settings.library_dir, "lib");
        assert_eq!(settings.smtp.port, 587);
        assert_eq!(settings.smtp.security, Security::StartTls);
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let settings = Settings::from_json(
            r#"{
                "puzzles": ["hoppity", "newpuzzle"],
                "excluded_suffixes": [".pyc", ".beam"],
                "smtp": { "host": "localhost", "security": "none" },
                "sender": "me@example.com"
            }"#,
        )
        .unwrap();
        assert_eq!(settings.puzzles.len(), 2);
        assert_eq!(settings.smtp.host, "localhost");
        assert_eq!(settings.smtp.port, 587);
        assert_eq!(settings.smtp.security, Security::None);
        assert!(settings.path_filter().should_exclude(Path::new("x.beam")));
        assert!(!settings.path_filter().should_exclude(Path::new("x.class")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Settings::from_json(r#"{"puzzle": ["typo"]}"#).is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = Settings::load(Some(&tmp.path().join("absent.json"))).unwrap_err();
        assert!(matches!(err, Error::ConfigFile { .. }));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Settings::from_file(&path),
            Err(Error::ConfigFile { .. })
        ));
    }

    #[test]
    fn environment_beats_file_beats_compiled() {
        let mut settings = Settings {
            sender: Some("file@example.com".into()),
            ..Settings::default()
        };
        let env = Environment::from_pairs([(SENDER_ENV, "env@example.com")]);
        let compiled = Some("built@example.com");

        let a = Addresses::resolve_with_defaults(&settings, &env, compiled, compiled).unwrap();
        assert_eq!(a.sender, "env@example.com");
        assert_eq!(a.test_address, "built@example.com");

        let a = Addresses::resolve_with_defaults(&settings, &Environment::default(), compiled, compiled)
            .unwrap();
        assert_eq!(a.sender, "file@example.com");

        settings.sender = None;
        let a = Addresses::resolve_with_defaults(&settings, &Environment::default(), compiled, compiled)
            .unwrap();
        assert_eq!(a.sender, "built@example.com");
        assert_eq!(a.submission, DEFAULT_SUBMISSION_ADDRESS);
    }

    #[test]
    fn blank_values_fall_through() {
        let settings = Settings {
            test_address: Some("   ".into()),
            ..Settings::default()
        };
        let env = Environment::from_pairs([(SENDER_ENV, ""), (TEST_ADDRESS_ENV, " ")]);
        let err = Addresses::resolve_with_defaults(&settings, &env, Some("me@example.com"), None)
            .unwrap_err();
        match err {
            Error::ConfigurationMissing { name, env_var, .. } => {
                assert_eq!(name, "test address");
                assert_eq!(env_var, TEST_ADDRESS_ENV);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unusable_address_is_rejected() {
        let env = Environment::from_pairs([
            (SENDER_ENV, "not-an-address"),
            (TEST_ADDRESS_ENV, "t@example.com"),
        ]);
        let err = Addresses::resolve_with_defaults(&Settings::default(), &env, None, None)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAddress { address, .. } if address == "not-an-address"));
    }
}
