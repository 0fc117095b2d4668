//! Retrieval of `historicdata.csv` from the PRTG HTTP API.

use std::time::Duration;

use chrono::{Local, NaiveDateTime};

use crate::data::loader::{self, LoadedData};
use crate::error::SourceError;
use crate::source::SensorSource;
use crate::state::config::PrtgConfig;

/// Characters of an error body kept in [`SourceError::Status`].
const ERROR_BODY_PREVIEW: usize = 150;

pub struct PrtgSource {
    client: reqwest::blocking::Client,
    base_url: String,
    username: String,
    credential: Credential,
    average_secs: u32,
    days: u32,
}

enum Credential {
    Password(String),
    Passhash(String),
}

impl PrtgSource {
    pub fn new(config: &PrtgConfig, days: u32) -> Result<Self, SourceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;

        let credential = match (&config.passhash, &config.password) {
            (Some(hash), _) => Credential::Passhash(hash.clone()),
            (None, Some(pw)) => Credential::Password(pw.clone()),
            (None, None) => Credential::Password(String::new()),
        };

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            credential,
            average_secs: config.average_secs,
            days,
        })
    }

    /// Query parameters for one sensor, relative to `now`.
    fn query(&self, sensor_id: u32, now: NaiveDateTime) -> Vec<(&'static str, String)> {
        let (sdate, edate) = date_window(now, self.days);
        let (key, secret) = match &self.credential {
            Credential::Password(p) => ("password", p.clone()),
            Credential::Passhash(h) => ("passhash", h.clone()),
        };
        vec![
            ("id", sensor_id.to_string()),
            ("sdate", sdate),
            ("edate", edate),
            ("avg", self.average_secs.to_string()),
            ("username", self.username.clone()),
            (key, secret),
        ]
    }
}

/// `sdate`/`edate` covering whole days: from midnight `days` ago through the
/// end of today.
pub fn date_window(now: NaiveDateTime, days: u32) -> (String, String) {
    let start = now - chrono::Duration::days(i64::from(days));
    (
        start.format("%Y-%m-%d-00-00-00").to_string(),
        now.format("%Y-%m-%d-23-59-59").to_string(),
    )
}

impl SensorSource for PrtgSource {
    fn fetch(&self, sensor_id: u32) -> Result<LoadedData, SourceError> {
        let url = format!("{}/api/historicdata.csv", self.base_url);
        tracing::info!(sensor_id, days = self.days, "Fetching history");

        let response = self
            .client
            .get(&url)
            .query(&self.query(sensor_id, Local::now().naive_local()))
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_PREVIEW).collect(),
            });
        }

        tracing::info!(sensor_id, bytes = body.len(), "History retrieved");
        Ok(loader::load_csv_text(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn window_spans_whole_days() {
        let (s, e) = date_window(now(), 2);
        assert_eq!(s, "2026-10-14-00-00-00");
        assert_eq!(e, "2026-10-16-23-59-59");
    }

    #[test]
    fn passhash_takes_precedence() {
        let cfg = PrtgConfig {
            url: "https://prtg.local/".into(),
            username: "ops".into(),
            password: Some("pw".into()),
            passhash: Some("123456".into()),
            ..PrtgConfig::default()
        };
        let source = PrtgSource::new(&cfg, 7).unwrap();
        assert_eq!(source.base_url, "https://prtg.local");
        let q = source.query(2051, now());
        assert!(q.contains(&("passhash", "123456".to_string())));
        assert!(!q.iter().any(|(k, _)| *k == "password"));
        assert!(q.contains(&("avg", "300".to_string())));
        assert!(q.contains(&("sdate", "2026-10-09-00-00-00".to_string())));
    }
}
