//! Runtime configuration: `dashboard.conf`, config-dir lookup, and the CLI.
//!
//! Precedence is CLI/env, then the settings file, then built-in defaults.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::app::{Credentials, Timings};

const APP_DIR: &str = "ad-dashboard";

/// Non-empty, non-comment `key = value` lines with both sides trimmed.
pub fn key_values(contents: &str) -> impl Iterator<Item = (&str, &str)> {
    contents.lines().filter_map(|raw| {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        let (key, value) = line.split_once('=')?;
        let (key, value) = (key.trim(), value.trim());
        (!key.is_empty() && !value.is_empty()).then_some((key, value))
    })
}

/// Per-user config directory: `$XDG_CONFIG_HOME/ad-dashboard`, else
/// `~/.config/ad-dashboard`.
pub fn config_dir() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join(APP_DIR))
}

/// Path of `name` in the config directory, if that file exists.
pub fn config_file_read_path(name: &str) -> Option<String> {
    let path = config_dir()?.join(name);
    path.is_file().then(|| path.to_string_lossy().into_owned())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub base_url: String,
    pub email: Option<String>,
    /// Never written back to disk.
    pub password: Option<String>,
    pub close_delay_ms: u64,
    pub notification_ms: u64,
    pub error_notification_ms: u64,
    /// Zero disables the timeout.
    pub request_timeout_ms: u64,
    pub log_file: String,
    pub theme_file: String,
    pub keybinds_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            email: None,
            password: None,
            close_delay_ms: 2000,
            notification_ms: 3000,
            error_notification_ms: 5000,
            request_timeout_ms: 0,
            log_file: "ad-dashboard.log".to_string(),
            theme_file: "theme.conf".to_string(),
            keybinds_file: "keybinds.conf".to_string(),
        }
    }
}

impl Settings {
    pub fn parse(contents: &str) -> Self {
        let mut s = Self::default();
        for (key, value) in key_values(contents) {
            let number = || value.parse::<u64>().ok();
            match key {
                "base_url" => s.base_url = value.trim_end_matches('/').to_string(),
                "email" => s.email = Some(value.to_string()),
                "password" => s.password = Some(value.to_string()),
                "close_delay_ms" => s.close_delay_ms = number().unwrap_or(s.close_delay_ms),
                "notification_ms" => s.notification_ms = number().unwrap_or(s.notification_ms),
                "error_notification_ms" => s.error_notification_ms = number().unwrap_or(s.error_notification_ms),
                "request_timeout_ms" => s.request_timeout_ms = number().unwrap_or(s.request_timeout_ms),
                "log_file" => s.log_file = value.to_string(),
                "theme_file" => s.theme_file = value.to_string(),
                "keybinds_file" => s.keybinds_file = value.to_string(),
                other => tracing::warn!(key = other, "unknown setting"),
            }
        }
        s
    }

    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# ad-dashboard settings\n");
        buf.push_str("# password may be set here or via AD_DASHBOARD_PASSWORD; it is never written back\n\n");
        let _ = writeln!(&mut buf, "base_url = {}", self.base_url);
        if let Some(email) = &self.email {
            let _ = writeln!(&mut buf, "email = {email}");
        }
        for (key, value) in [
            ("close_delay_ms", self.close_delay_ms),
            ("notification_ms", self.notification_ms),
            ("error_notification_ms", self.error_notification_ms),
            ("request_timeout_ms", self.request_timeout_ms),
        ] {
            let _ = writeln!(&mut buf, "{key} = {value}");
        }
        let _ = writeln!(&mut buf, "log_file = {}", self.log_file);
        let _ = writeln!(&mut buf, "theme_file = {}", self.theme_file);
        let _ = writeln!(&mut buf, "keybinds_file = {}", self.keybinds_file);
        std::fs::write(path, buf)
    }

    /// Load from `path` (or the user config dir); write defaults when neither exists.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        if let Some(existing) = config_file_read_path("dashboard.conf") {
            return Self::from_file(&existing).unwrap_or_default();
        }
        let s = Self::default();
        if let Err(err) = s.write_file(path) {
            tracing::warn!(path, %err, "could not write default settings");
        }
        s
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(email) = &cli.email {
            self.email = Some(email.clone());
        }
        if let Some(password) = &cli.password {
            self.password = Some(password.clone());
        }
        if let Some(ms) = cli.close_delay_ms {
            self.close_delay_ms = ms;
        }
        if let Some(ms) = cli.request_timeout_ms {
            self.request_timeout_ms = ms;
        }
        if let Some(path) = &cli.log_file {
            self.log_file = path.clone();
        }
    }

    pub fn timings(&self) -> Timings {
        Timings {
            close_delay: Duration::from_millis(self.close_delay_ms),
            notice: Duration::from_millis(self.notification_ms),
            error_notice: Duration::from_millis(self.error_notification_ms),
        }
    }

    /// Login credentials, when both halves are configured.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) if !email.is_empty() => Some(Credentials {
                email: email.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_ms > 0).then(|| Duration::from_millis(self.request_timeout_ms))
    }
}

#[derive(Debug, Parser)]
#[command(name = "ad-dashboard", version, about = "Terminal dashboard for a directory-service REST backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Backend base URL
    #[arg(long, env = "AD_DASHBOARD_URL", global = true)]
    pub url: Option<String>,

    /// Login email
    #[arg(long, env = "AD_DASHBOARD_EMAIL", global = true)]
    pub email: Option<String>,

    /// Login password
    #[arg(long, env = "AD_DASHBOARD_PASSWORD", global = true, hide_env_values = true)]
    pub password: Option<String>,

    /// Settings file
    #[arg(long, env = "AD_DASHBOARD_CONFIG", default_value = "dashboard.conf", global = true)]
    pub config: String,

    /// Log file (the terminal belongs to the UI)
    #[arg(long, env = "AD_DASHBOARD_LOG_FILE", global = true)]
    pub log_file: Option<String>,

    /// Delay before a dialog closes after a successful action
    #[arg(long, env = "AD_DASHBOARD_CLOSE_DELAY_MS", global = true)]
    pub close_delay_ms: Option<u64>,

    /// Per-request timeout; 0 disables it
    #[arg(long, env = "AD_DASHBOARD_REQUEST_TIMEOUT_MS", global = true)]
    pub request_timeout_ms: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the dashboard (default)
    Run,
    /// Create an account on the backend with --email/--password and exit
    Register {
        /// Display name for the new account
        #[arg(long)]
        name: String,
    },
}
