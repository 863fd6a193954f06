use crate::{
    notes,
    quote::DailyQuote,
    storage::{BackendLocal, StorageManager},
    widgets::CustomWidget,
};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_DAILY_FILE_FORMAT: &str = "%Y-%m-%d";
/// Weekday, day of month and month name, e.g. "Monday 01, January".
const DEFAULT_DAILY_LABEL_FORMAT: &str = "%A %d, %B";
const DEFAULT_WEEKLY_ICON: &str = "calendar-week";
const DEFAULT_QUOTE_URL: &str = "https://frasedeldia.azurewebsites.net/api/phrase";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Vault root. Relative paths are resolved against the working directory.
    #[serde(default = "default_vault_path")]
    pub path: String,

    /// Extensions included in the default candidate set. Empty means every file.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Folders (relative to the vault root) skipped while scanning.
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            path: default_vault_path(),
            extensions: default_extensions(),
            ignore: vec![],
        }
    }
}

fn default_vault_path() -> String {
    ".".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string()]
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Join adjacent operands with AND (`tag:work path:inbox`).
    /// Off by default: only the last operand decides the result.
    #[serde(default)]
    pub implicit_and: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DailyConfig {
    /// Folder for daily notes, relative to the vault root.
    #[serde(default)]
    pub folder: String,

    /// chrono format for the daily note file name (without extension).
    #[serde(default = "default_daily_file_format")]
    pub file_format: String,

    /// chrono format for the human readable label.
    #[serde(default = "default_daily_label_format")]
    pub label_format: String,

    /// Template note used when the daily note does not exist yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl Default for DailyConfig {
    fn default() -> Self {
        Self {
            folder: String::new(),
            file_format: default_daily_file_format(),
            label_format: default_daily_label_format(),
            template: None,
        }
    }
}

fn default_daily_file_format() -> String {
    DEFAULT_DAILY_FILE_FORMAT.to_string()
}

fn default_daily_label_format() -> String {
    DEFAULT_DAILY_LABEL_FORMAT.to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeeklyConfig {
    #[serde(default = "default_weekly_icon")]
    pub icon: String,

    #[serde(default = "default_true")]
    pub week_starts_on_monday: bool,
}

impl Default for WeeklyConfig {
    fn default() -> Self {
        Self {
            icon: default_weekly_icon(),
            week_starts_on_monday: true,
        }
    }
}

fn default_weekly_icon() -> String {
    DEFAULT_WEEKLY_ICON.to_string()
}

fn default_true() -> bool {
    true
}

fn default_quote_url() -> String {
    DEFAULT_QUOTE_URL.to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub vault: VaultConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub daily: DailyConfig,
    #[serde(default)]
    pub weekly: WeeklyConfig,

    #[serde(default = "default_true")]
    pub daily_quote: bool,
    #[serde(default = "default_quote_url")]
    pub quote_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote_data: Option<DailyQuote>,

    #[serde(default)]
    pub widgets: Vec<CustomWidget>,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault: VaultConfig::default(),
            query: QueryConfig::default(),
            daily: DailyConfig::default(),
            weekly: WeeklyConfig::default(),
            daily_quote: true,
            quote_url: default_quote_url(),
            quote_data: None,
            widgets: vec![],
            base_path: String::new(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.vault.path.trim().is_empty() {
            bail!("vault.path must not be empty");
        }

        if self.daily.file_format.trim().is_empty() {
            bail!("daily.file_format must not be empty");
        }

        let probe = chrono::NaiveDate::default();
        for (field, fmt) in [
            ("daily.file_format", &self.daily.file_format),
            ("daily.label_format", &self.daily.label_format),
        ] {
            notes::format_date(probe, fmt).with_context(|| format!("{field} is invalid"))?;
        }

        for (idx, widget) in self.widgets.iter().enumerate() {
            if widget.title.trim().is_empty() {
                let idx = idx + 1;
                bail!("widget #{idx} has no title");
            }
        }

        Ok(())
    }

    pub fn load_with(base_path: &str) -> anyhow::Result<Self> {
        let store = BackendLocal::new(base_path)
            .with_context(|| format!("creating config directory {base_path}"))?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            store.write(
                CONFIG_FILE,
                serde_yml::to_string(&Self::default())?.as_bytes(),
            )?;
        }

        let config_str =
            String::from_utf8(store.read(CONFIG_FILE)?).context("config file is not valid utf8")?;
        let mut config: Self = serde_yml::from_str(&config_str).context("config is malformed")?;

        config.base_path = base_path.to_string();

        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let store = BackendLocal::new(&self.base_path)?;

        let config_str = serde_yml::to_string(&self)?;
        store
            .write(CONFIG_FILE, config_str.as_bytes())
            .context("writing config")?;
        Ok(())
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn widget(&self, title: &str) -> Option<&CustomWidget> {
        self.widgets
            .iter()
            .find(|w| w.title.eq_ignore_ascii_case(title))
    }
}
