use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    app::errors::AppError,
    config::Config,
    notes::{self, WeekDay},
    query::{ParseOptions, QueryEngine},
    quote::{DailyQuote, QuoteHelper},
    vault::{LocalVault, Record},
    widgets::{self, WidgetResult},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyNote {
    pub path: String,
    pub label: String,
    pub created: bool,
}

/// Everything a command needs: the loaded config, the scanned vault and a
/// query engine configured from the config.
pub struct AppContext {
    config: Config,
    vault: LocalVault,
    engine: QueryEngine,
}

impl AppContext {
    pub fn new(config: Config, vault: LocalVault) -> Self {
        let engine = QueryEngine::with_options(ParseOptions {
            implicit_and: config.query.implicit_and,
        });
        Self {
            config,
            vault,
            engine,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn vault(&self) -> &LocalVault {
        &self.vault
    }

    /// Override `query.implicit_and` for this context only.
    pub fn set_implicit_and(&mut self, implicit_and: bool) {
        self.engine = QueryEngine::with_options(ParseOptions { implicit_and });
    }

    pub async fn query(&self, query: &str) -> Result<Vec<Record>, AppError> {
        Ok(self.engine.execute(query, &self.vault, None).await?)
    }

    /// All records, or those inside `folder`.
    pub fn list(&self, folder: Option<&str>) -> Vec<Record> {
        match folder {
            Some(folder) => self.vault.files_in_folder(folder),
            None => self.vault.records().to_vec(),
        }
    }

    pub fn folders(&self) -> &[String] {
        self.vault.folders()
    }

    pub fn suggest(&self, text: &str, folder: Option<&str>, limit: usize) -> Vec<String> {
        self.vault.suggest(text, folder, limit)
    }

    /// Open the daily note for `date`, creating it from the configured
    /// template when missing.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn open_daily(&self, date: NaiveDate) -> Result<DailyNote, AppError> {
        let daily = &self.config.daily;
        let path = notes::daily_note_path(daily, date)?;
        let label = notes::daily_label(daily, date)?;

        let created = !self.vault.exists(&path);
        let path = self
            .vault
            .open_or_create(&path, daily.template.as_deref())
            .await?;

        Ok(DailyNote {
            path,
            label,
            created,
        })
    }

    pub fn week(&self, today: NaiveDate) -> Result<Vec<WeekDay>, AppError> {
        // fail on a bad format before probing seven days
        notes::daily_note_path(&self.config.daily, today)?;

        let days = notes::week_days(today, self.config.weekly.week_starts_on_monday, |date| {
            notes::daily_note_path(&self.config.daily, date)
                .map(|path| self.vault.exists(&path))
                .unwrap_or(false)
        });
        Ok(days)
    }

    pub async fn run_widget(&self, title: &str) -> Result<WidgetResult, AppError> {
        let widget = self
            .config
            .widget(title)
            .ok_or_else(|| AppError::WidgetNotFound(title.to_string()))?;

        Ok(widgets::run_widget(widget, &self.engine, &self.vault).await?)
    }

    /// Today's quote, fetched and persisted at most once per day.
    pub async fn daily_quote(&mut self, today: NaiveDate) -> Result<Option<DailyQuote>, AppError> {
        let helper = QuoteHelper::new(&self.config.quote_url);
        Ok(helper.fetch_and_store(&mut self.config, today).await?)
    }
}
