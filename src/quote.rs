use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyQuote {
    pub quote: String,
    pub author: String,
    /// Day the quote was fetched, `YYYY-MM-DD`.
    pub date: String,
}

pub struct QuoteHelper {
    client: reqwest::Client,
    url: String,
}

impl QuoteHelper {
    pub fn new(url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
        }
    }

    /// Read `{ phrase | content, author | autor }`. Missing fields are empty;
    /// anything but a JSON object is no quote at all.
    pub fn parse_payload(data: &Value, today: NaiveDate) -> Option<DailyQuote> {
        let obj = data.as_object()?;
        let field = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| obj.get(*name).and_then(Value::as_str))
                .unwrap_or_default()
                .to_string()
        };

        Some(DailyQuote {
            quote: field(&["phrase", "content"]),
            author: field(&["author", "autor"]),
            date: today.format("%Y-%m-%d").to_string(),
        })
    }

    /// Fetch today's quote. Network failures, error statuses and bodies that
    /// are not JSON are logged and yield `None`.
    pub async fn fetch_daily_quote(&self, today: NaiveDate) -> Option<DailyQuote> {
        let resp = match self.client.get(&self.url).send().await {
            Ok(resp) => resp,
            Err(err) => {
                log::warn!("failed to fetch daily quote from {}: {err}", self.url);
                return None;
            }
        };

        let resp = match resp.error_for_status() {
            Ok(resp) => resp,
            Err(err) => {
                log::warn!("daily quote request to {} failed: {err}", self.url);
                return None;
            }
        };

        let data: Value = match resp.json().await {
            Ok(data) => data,
            Err(err) => {
                log::warn!("daily quote response is not JSON: {err}");
                return None;
            }
        };

        let quote = Self::parse_payload(&data, today);
        if quote.is_none() {
            log::warn!("no data in daily quote response");
        }
        quote
    }

    /// Return the stored quote unless it is stale, otherwise fetch a new one
    /// and persist it in the config.
    pub async fn fetch_and_store(
        &self,
        config: &mut Config,
        today: NaiveDate,
    ) -> anyhow::Result<Option<DailyQuote>> {
        if !needs_refresh(config, today) {
            return Ok(config.quote_data.clone());
        }

        let Some(quote) = self.fetch_daily_quote(today).await else {
            return Ok(None);
        };

        config.quote_data = Some(quote.clone());
        config.save()?;
        log::info!("stored daily quote for {}", quote.date);

        Ok(Some(quote))
    }
}

/// Quotes are enabled and there is no quote for `today` yet.
pub fn needs_refresh(config: &Config, today: NaiveDate) -> bool {
    if !config.daily_quote {
        return false;
    }
    let today = today.format("%Y-%m-%d").to_string();
    match &config.quote_data {
        Some(stored) => stored.date != today,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_payload_field_fallbacks() {
        let today = day("2024-05-01");

        let q = QuoteHelper::parse_payload(&json!({"phrase": "p", "author": "a"}), today).unwrap();
        assert_eq!(q.quote, "p");
        assert_eq!(q.author, "a");
        assert_eq!(q.date, "2024-05-01");

        let q = QuoteHelper::parse_payload(&json!({"content": "c", "autor": "b"}), today).unwrap();
        assert_eq!((q.quote.as_str(), q.author.as_str()), ("c", "b"));

        let q = QuoteHelper::parse_payload(&json!({}), today).unwrap();
        assert_eq!((q.quote.as_str(), q.author.as_str()), ("", ""));

        assert!(QuoteHelper::parse_payload(&json!(null), today).is_none());
        assert!(QuoteHelper::parse_payload(&json!("text"), today).is_none());
    }

    #[test]
    fn test_needs_refresh() {
        let today = day("2024-05-01");
        let mut config = Config::default();
        assert!(needs_refresh(&config, today));

        config.quote_data = Some(DailyQuote {
            quote: "q".into(),
            author: "a".into(),
            date: "2024-04-30".into(),
        });
        assert!(needs_refresh(&config, today));

        config.quote_data.as_mut().unwrap().date = "2024-05-01".into();
        assert!(!needs_refresh(&config, today));

        config.quote_data = None;
        config.daily_quote = false;
        assert!(!needs_refresh(&config, today));
    }

    #[tokio::test]
    async fn test_fresh_quote_is_not_refetched() {
        let mut config = Config::default();
        config.quote_url = "http://127.0.0.1:9/unreachable".into();
        let stored = DailyQuote {
            quote: "q".into(),
            author: "a".into(),
            date: "2024-05-01".into(),
        };
        config.quote_data = Some(stored.clone());

        let helper = QuoteHelper::new(&config.quote_url);
        let quote = helper
            .fetch_and_store(&mut config, day("2024-05-01"))
            .await
            .unwrap();
        assert_eq!(quote, Some(stored));
    }

    /// Answer a single HTTP request with `status` and a JSON `body`.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        use std::io::{Read, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let resp = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(resp.as_bytes());
        });
        format!("http://{addr}/api/phrase")
    }

    fn local_helper(url: &str) -> QuoteHelper {
        QuoteHelper {
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
            url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_error_status_is_not_stored() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config::load_with(tmp.path().to_str().unwrap()).unwrap();
        config.quote_url = serve_once("500 Internal Server Error", r#"{"error":"internal"}"#);

        let helper = local_helper(&config.quote_url);
        let quote = helper
            .fetch_and_store(&mut config, day("2024-05-01"))
            .await
            .unwrap();
        assert!(quote.is_none());
        assert!(config.quote_data.is_none());

        let reloaded = Config::load_with(tmp.path().to_str().unwrap()).unwrap();
        assert!(reloaded.quote_data.is_none());
    }

    #[tokio::test]
    async fn test_successful_fetch_is_stored() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config::load_with(tmp.path().to_str().unwrap()).unwrap();
        config.quote_url = serve_once("200 OK", r#"{"phrase":"p","author":"a"}"#);

        let helper = local_helper(&config.quote_url);
        let quote = helper
            .fetch_and_store(&mut config, day("2024-05-01"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(quote.quote, "p");

        let reloaded = Config::load_with(tmp.path().to_str().unwrap()).unwrap();
        assert_eq!(reloaded.quote_data, Some(quote));
    }

    #[tokio::test]
    async fn test_fetch_failure_yields_none() {
        let helper = local_helper("http://127.0.0.1:9/unreachable");
        assert!(helper.fetch_daily_quote(day("2024-05-01")).await.is_none());
    }
}
