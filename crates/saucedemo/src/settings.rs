// Settings - layered suite configuration
//
// Defaults < TOML settings file < `.env` file < environment variables.
//
// The resolved `Settings` is immutable and shared as `Arc<Settings>`.
// `SettingsLoader` memoizes the first successful load; there is no global
// instance, callers construct a loader and pass the record on explicitly.

use crate::error::{Error, Result};
use parking_lot::Mutex;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Demo site root used when `BASE_URL` is not configured
pub const DEFAULT_BASE_URL: &str = "https://www.saucedemo.com/v1";

/// Default bound for navigation and condition waits
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default bound for single element actions (click, fill, text reads)
pub const DEFAULT_ACTION_TIMEOUT_MS: u64 = 5_000;

/// Environment variable naming an explicit settings file
pub const SETTINGS_FILE_ENV: &str = "SAUCEDEMO_SETTINGS";

/// Settings file picked up from the working directory when present
pub const DEFAULT_SETTINGS_FILE: &str = "saucedemo.toml";

/// Environment variable naming an explicit dotenv file
pub const DOTENV_FILE_ENV: &str = "SAUCEDEMO_ENV_FILE";

/// Dotenv file picked up from the working directory when present
pub const DEFAULT_DOTENV_FILE: &str = ".env";

/// Rendering engine used for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrowserEngine {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserEngine {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserEngine::Chromium => "chromium",
            BrowserEngine::Firefox => "firefox",
            BrowserEngine::Webkit => "webkit",
        }
    }
}

impl FromStr for BrowserEngine {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserEngine::Chromium),
            "firefox" => Ok(BrowserEngine::Firefox),
            "webkit" => Ok(BrowserEngine::Webkit),
            other => Err(Error::Configuration(format!(
                "unknown browser '{}' (expected chromium, firefox or webkit)",
                other
            ))),
        }
    }
}

impl fmt::Display for BrowserEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One user name / password pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// Passwords stay out of logs and panic messages
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The demo accounts the suite knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserKind {
    Standard,
    LockedOut,
    Problem,
}

/// Resolved, immutable suite configuration
#[derive(Debug, Clone)]
pub struct Settings {
    /// Target site root, without trailing slash
    pub base_url: String,
    pub standard: Credentials,
    pub locked_out: Credentials,
    pub problem: Option<Credentials>,
    /// Run without visible UI
    pub headless: bool,
    pub browser: BrowserEngine,
    /// Artificial delay the engine inserts before each action
    pub slow_mo_ms: u64,
    /// Bound for navigation and condition waits
    pub default_timeout_ms: u64,
    /// Bound for single element actions
    pub action_timeout_ms: u64,
    pub screenshot_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl Settings {
    /// Returns the credential pair for `kind`.
    ///
    /// Fails with `Configuration` when the problem user was not configured.
    pub fn credentials(&self, kind: UserKind) -> Result<&Credentials> {
        match kind {
            UserKind::Standard => Ok(&self.standard),
            UserKind::LockedOut => Ok(&self.locked_out),
            UserKind::Problem => self.problem.as_ref().ok_or_else(|| {
                Error::Configuration("PROBLEM_USER is not configured".to_string())
            }),
        }
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_millis(self.action_timeout_ms)
    }
}

/// One configuration layer; every field optional until resolved
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    base_url: Option<String>,
    standard_user: Option<String>,
    standard_password: Option<String>,
    locked_out_user: Option<String>,
    locked_out_password: Option<String>,
    problem_user: Option<String>,
    problem_password: Option<String>,
    headless: Option<bool>,
    browser: Option<String>,
    slowmo: Option<u64>,
    timeout: Option<u64>,
    action_timeout: Option<u64>,
    screenshot_dir: Option<PathBuf>,
    log_dir: Option<PathBuf>,
}

impl RawSettings {
    fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!(
                "failed to read settings file '{}': {}",
                path.display(),
                e
            ))
        })?;

        toml::from_str(&content).map_err(|e| {
            Error::Configuration(format!(
                "failed to parse settings file '{}': {}",
                path.display(),
                e
            ))
        })
    }

    fn from_lookup(lookup: &Lookup) -> Result<Self> {
        let text = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Ok(Self {
            base_url: text("BASE_URL"),
            standard_user: text("STANDARD_USER"),
            standard_password: text("STANDARD_PASSWORD"),
            locked_out_user: text("LOCKED_OUT_USER"),
            locked_out_password: text("LOCKED_OUT_PASSWORD"),
            problem_user: text("PROBLEM_USER"),
            problem_password: text("PROBLEM_PASSWORD"),
            headless: text("HEADLESS")
                .map(|v| parse_bool("HEADLESS", &v))
                .transpose()?,
            browser: text("BROWSER"),
            slowmo: text("SLOWMO").map(|v| parse_ms("SLOWMO", &v)).transpose()?,
            timeout: text("TIMEOUT").map(|v| parse_ms("TIMEOUT", &v)).transpose()?,
            action_timeout: text("ACTION_TIMEOUT")
                .map(|v| parse_ms("ACTION_TIMEOUT", &v))
                .transpose()?,
            screenshot_dir: text("SCREENSHOT_DIR").map(PathBuf::from),
            log_dir: text("LOG_DIR").map(PathBuf::from),
        })
    }

    /// Fields set in `self` win over `lower`.
    fn overlay(self, lower: RawSettings) -> RawSettings {
        RawSettings {
            base_url: self.base_url.or(lower.base_url),
            standard_user: self.standard_user.or(lower.standard_user),
            standard_password: self.standard_password.or(lower.standard_password),
            locked_out_user: self.locked_out_user.or(lower.locked_out_user),
            locked_out_password: self.locked_out_password.or(lower.locked_out_password),
            problem_user: self.problem_user.or(lower.problem_user),
            problem_password: self.problem_password.or(lower.problem_password),
            headless: self.headless.or(lower.headless),
            browser: self.browser.or(lower.browser),
            slowmo: self.slowmo.or(lower.slowmo),
            timeout: self.timeout.or(lower.timeout),
            action_timeout: self.action_timeout.or(lower.action_timeout),
            screenshot_dir: self.screenshot_dir.or(lower.screenshot_dir),
            log_dir: self.log_dir.or(lower.log_dir),
        }
    }

    fn resolve(self) -> Result<Settings> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let parsed = url::Url::parse(&base_url).map_err(|e| {
            Error::Configuration(format!("BASE_URL '{}' is not a valid URL: {}", base_url, e))
        })?;
        if parsed.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "BASE_URL '{}' cannot be used as a site root",
                base_url
            )));
        }

        let standard_password = required(self.standard_password, "STANDARD_PASSWORD")?;
        let standard = Credentials::new(
            required(self.standard_user, "STANDARD_USER")?,
            standard_password.clone(),
        );
        let locked_out = Credentials::new(
            required(self.locked_out_user, "LOCKED_OUT_USER")?,
            required(self.locked_out_password, "LOCKED_OUT_PASSWORD")?,
        );
        let problem = self.problem_user.map(|username| {
            Credentials::new(
                username,
                self.problem_password.unwrap_or(standard_password),
            )
        });

        let browser = match self.browser {
            Some(name) => name.parse()?,
            None => BrowserEngine::default(),
        };

        let default_timeout_ms = self.timeout.unwrap_or(DEFAULT_TIMEOUT_MS);
        let action_timeout_ms = self.action_timeout.unwrap_or(DEFAULT_ACTION_TIMEOUT_MS);
        if default_timeout_ms == 0 || action_timeout_ms == 0 {
            return Err(Error::Configuration(
                "TIMEOUT and ACTION_TIMEOUT must be greater than zero".to_string(),
            ));
        }

        Ok(Settings {
            base_url: base_url.trim_end_matches('/').to_string(),
            standard,
            locked_out,
            problem,
            headless: self.headless.unwrap_or(true),
            browser,
            slow_mo_ms: self.slowmo.unwrap_or(0),
            default_timeout_ms,
            action_timeout_ms,
            screenshot_dir: self
                .screenshot_dir
                .unwrap_or_else(|| PathBuf::from("screenshots")),
            log_dir: self.log_dir.unwrap_or_else(|| PathBuf::from("logs")),
        })
    }
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    value.ok_or_else(|| Error::Configuration(format!("{} is required but not set", key)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(Error::Configuration(format!(
            "{} must be a boolean, got '{}'",
            key, value
        ))),
    }
}

fn parse_ms(key: &str, value: &str) -> Result<u64> {
    value.parse().map_err(|_| {
        Error::Configuration(format!(
            "{} must be a whole number of milliseconds, got '{}'",
            key, value
        ))
    })
}

fn read_dotenv(path: &Path) -> Result<HashMap<String, String>> {
    let invalid = |e: dotenvy::Error| {
        Error::Configuration(format!(
            "failed to read dotenv file '{}': {}",
            path.display(),
            e
        ))
    };

    dotenvy::from_path_iter(path)
        .map_err(invalid)?
        .collect::<std::result::Result<HashMap<_, _>, _>>()
        .map_err(invalid)
}

type Lookup = dyn Fn(&str) -> Option<String> + Send + Sync;

/// Loads and memoizes `Settings` from a key lookup plus an optional file.
pub struct SettingsLoader {
    lookup: Box<Lookup>,
    cached: Mutex<Option<Arc<Settings>>>,
}

impl SettingsLoader {
    /// Loader reading the process environment
    pub fn from_env() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }

    /// Loader reading a fixed map of variables instead of the environment
    pub fn from_map(vars: HashMap<String, String>) -> Self {
        Self::with_lookup(move |key| vars.get(key).cloned())
    }

    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            lookup: Box::new(lookup),
            cached: Mutex::new(None),
        }
    }

    /// Returns the settings, reading the sources only on the first call.
    ///
    /// Later calls return the identical record until `reset()` is invoked.
    /// Failed loads are not cached.
    pub fn load(&self) -> Result<Arc<Settings>> {
        let mut cached = self.cached.lock();
        if let Some(settings) = cached.as_ref() {
            return Ok(Arc::clone(settings));
        }

        let settings = Arc::new(self.read()?);
        tracing::debug!(
            base_url = %settings.base_url,
            browser = %settings.browser,
            headless = settings.headless,
            "Loaded settings"
        );
        *cached = Some(Arc::clone(&settings));
        Ok(settings)
    }

    /// Drops the memoized record so the next `load()` re-reads the sources.
    pub fn reset(&self) {
        self.cached.lock().take();
    }

    fn read(&self) -> Result<Settings> {
        let env = RawSettings::from_lookup(self.lookup.as_ref())?;
        let dotenv = match self.locate(DOTENV_FILE_ENV, DEFAULT_DOTENV_FILE) {
            Some(path) => {
                let vars = read_dotenv(&path)?;
                RawSettings::from_lookup(&move |key: &str| vars.get(key).cloned())?
            }
            None => RawSettings::default(),
        };
        let file = match self.locate(SETTINGS_FILE_ENV, DEFAULT_SETTINGS_FILE) {
            Some(path) => RawSettings::from_file(&path)?,
            None => RawSettings::default(),
        };
        env.overlay(dotenv).overlay(file).resolve()
    }

    // An explicitly named file must exist; the default is only used when present.
    fn locate(&self, env_key: &str, default: &str) -> Option<PathBuf> {
        if let Some(explicit) = (self.lookup)(env_key).filter(|p| !p.is_empty()) {
            return Some(PathBuf::from(explicit));
        }
        let default = PathBuf::from(default);
        default.is_file().then_some(default)
    }
}

impl fmt::Debug for SettingsLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsLoader")
            .field("cached", &self.cached.lock().is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn required_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("STANDARD_USER", "standard_user"),
            ("STANDARD_PASSWORD", "secret_sauce"),
            ("LOCKED_OUT_USER", "locked_out_user"),
            ("LOCKED_OUT_PASSWORD", "secret_sauce"),
        ]
    }

    #[test]
    fn test_defaults_applied() {
        let settings = SettingsLoader::from_map(vars(&required_vars()))
            .load()
            .unwrap();

        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert!(settings.headless);
        assert_eq!(settings.browser, BrowserEngine::Chromium);
        assert_eq!(settings.slow_mo_ms, 0);
        assert_eq!(settings.default_timeout_ms, 30_000);
        assert_eq!(settings.action_timeout_ms, 5_000);
        assert_eq!(settings.screenshot_dir, PathBuf::from("screenshots"));
        assert!(settings.problem.is_none());
    }

    #[test]
    fn test_missing_credential_is_configuration_error() {
        let mut pairs = required_vars();
        pairs.retain(|(k, _)| *k != "LOCKED_OUT_PASSWORD");

        let err = SettingsLoader::from_map(vars(&pairs)).load().unwrap_err();
        match err {
            Error::Configuration(msg) => assert!(msg.contains("LOCKED_OUT_PASSWORD")),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let mut pairs = required_vars();
        pairs.push(("STANDARD_USER", "   "));
        let map: HashMap<_, _> = vars(&pairs);

        let err = SettingsLoader::from_map(map).load().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_env_values_parsed() {
        let mut pairs = required_vars();
        pairs.extend([
            ("BASE_URL", "http://127.0.0.1:8080/"),
            ("HEADLESS", "No"),
            ("BROWSER", "Firefox"),
            ("SLOWMO", "250"),
            ("TIMEOUT", "10000"),
            ("ACTION_TIMEOUT", "1500"),
        ]);

        let settings = SettingsLoader::from_map(vars(&pairs)).load().unwrap();
        assert_eq!(settings.base_url, "http://127.0.0.1:8080");
        assert!(!settings.headless);
        assert_eq!(settings.browser, BrowserEngine::Firefox);
        assert_eq!(settings.slow_mo_ms, 250);
        assert_eq!(settings.default_timeout(), Duration::from_secs(10));
        assert_eq!(settings.action_timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn test_invalid_values_rejected() {
        for (key, value) in [
            ("HEADLESS", "sometimes"),
            ("SLOWMO", "-5"),
            ("TIMEOUT", "0"),
            ("BROWSER", "netscape"),
            ("BASE_URL", "not a url"),
        ] {
            let mut pairs = required_vars();
            pairs.push((key, value));
            let result = SettingsLoader::from_map(vars(&pairs)).load();
            assert!(
                matches!(result, Err(Error::Configuration(_))),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_problem_password_falls_back_to_standard() {
        let mut pairs = required_vars();
        pairs.push(("PROBLEM_USER", "problem_user"));

        let settings = SettingsLoader::from_map(vars(&pairs)).load().unwrap();
        let problem = settings.credentials(UserKind::Problem).unwrap();
        assert_eq!(problem.username, "problem_user");
        assert_eq!(problem.password, "secret_sauce");
    }

    #[test]
    fn test_problem_user_absent() {
        let settings = SettingsLoader::from_map(vars(&required_vars()))
            .load()
            .unwrap();
        assert!(matches!(
            settings.credentials(UserKind::Problem),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_file_layer_below_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suite.toml");
        std::fs::write(
            &path,
            r#"
base_url = "http://file.example"
standard_user = "file_user"
standard_password = "file_pass"
locked_out_user = "file_locked"
locked_out_password = "file_pass"
headless = false
timeout = 12000
"#,
        )
        .unwrap();

        let loader = SettingsLoader::from_map(vars(&[
            (SETTINGS_FILE_ENV, path.to_str().unwrap()),
            ("STANDARD_USER", "env_user"),
        ]));
        let settings = loader.load().unwrap();

        assert_eq!(settings.base_url, "http://file.example");
        assert_eq!(settings.standard.username, "env_user");
        assert_eq!(settings.standard.password, "file_pass");
        assert!(!settings.headless);
        assert_eq!(settings.default_timeout_ms, 12_000);
    }

    #[test]
    fn test_dotenv_layer_between_env_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("suite.toml");
        std::fs::write(
            &toml_path,
            r#"
standard_user = "file_user"
standard_password = "file_pass"
locked_out_user = "file_locked"
locked_out_password = "file_pass"
timeout = 12000
"#,
        )
        .unwrap();
        let env_path = dir.path().join("suite.env");
        std::fs::write(
            &env_path,
            "# local overrides\nSTANDARD_USER=dotenv_user\nTIMEOUT=15000\nHEADLESS=false\n",
        )
        .unwrap();

        let loader = SettingsLoader::from_map(vars(&[
            (SETTINGS_FILE_ENV, toml_path.to_str().unwrap()),
            (DOTENV_FILE_ENV, env_path.to_str().unwrap()),
            ("HEADLESS", "true"),
        ]));
        let settings = loader.load().unwrap();

        assert_eq!(settings.standard.username, "dotenv_user");
        assert_eq!(settings.standard.password, "file_pass");
        assert_eq!(settings.default_timeout_ms, 15_000);
        assert!(settings.headless);
    }

    #[test]
    fn test_missing_named_dotenv_rejected() {
        let mut pairs = required_vars();
        pairs.push((DOTENV_FILE_ENV, "/nonexistent/saucedemo.env"));

        let err = SettingsLoader::from_map(vars(&pairs)).load().unwrap_err();
        match err {
            Error::Configuration(msg) => assert!(msg.contains("dotenv")),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suite.toml");
        std::fs::write(&path, "unknown_key = 1\n").unwrap();

        let loader = SettingsLoader::from_map(vars(&[(SETTINGS_FILE_ENV, path.to_str().unwrap())]));
        assert!(matches!(loader.load(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_load_is_memoized_until_reset() {
        let reads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reads);
        let base = vars(&required_vars());
        let loader = SettingsLoader::with_lookup(move |key| {
            if key == "STANDARD_USER" {
                counter.fetch_add(1, Ordering::SeqCst);
            }
            base.get(key).cloned()
        });

        let first = loader.load().unwrap();
        let second = loader.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(reads.load(Ordering::SeqCst), 1);

        loader.reset();
        let third = loader.load().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("standard_user", "secret_sauce");
        let rendered = format!("{creds:?}");
        assert!(rendered.contains("standard_user"));
        assert!(!rendered.contains("secret_sauce"));
    }
}
