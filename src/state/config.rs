use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;
use crate::processing::thresholds::ThresholdPolicy;
use crate::state::theme::Palette;

pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Full run configuration, loaded once from `config.json` and passed down
/// explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub prtg: PrtgConfig,
    /// Sensor id → display name, in the order the config file lists them.
    #[serde(deserialize_with = "sensor_list", serialize_with = "serialize_sensors")]
    pub sensors: Vec<SensorEntry>,
    #[serde(default = "default_days")]
    pub days_to_analyze: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Read PRTG CSV/XLSX exports from this directory instead of the API.
    #[serde(default)]
    pub input_dir: Option<PathBuf>,
    #[serde(default)]
    pub export_json: bool,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub thresholds: ThresholdPolicy,
    #[serde(default)]
    pub palette: Palette,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorEntry {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrtgConfig {
    pub url: String,
    pub username: String,
    pub password: Option<String>,
    pub passhash: Option<String>,
    /// PRTG installs commonly run on self-signed certificates.
    pub verify_tls: bool,
    pub timeout_secs: u64,
    /// Averaging interval requested from `historicdata.csv`, in seconds.
    pub average_secs: u32,
}

impl Default for PrtgConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: String::new(),
            password: None,
            passhash: None,
            verify_tls: false,
            timeout_secs: 30,
            average_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub title: String,
    pub prepared_by: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            title: "PRTG Temperature Sensor Report".to_string(),
            prepared_by: "Data Center Operations".to_string(),
        }
    }
}

fn default_days() -> u32 {
    2
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io { path: path.to_path_buf(), source: e }
            }
        })?;
        let config = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), sensors = config.sensors.len(), "Config loaded");
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sensors.is_empty() {
            return Err(ConfigError::Invalid("no sensors configured".into()));
        }
        if self.days_to_analyze == 0 {
            return Err(ConfigError::Invalid("days_to_analyze must be at least 1".into()));
        }
        self.thresholds.check().map_err(ConfigError::Invalid)?;
        if self.input_dir.is_none() {
            if self.prtg.url.trim().is_empty() {
                return Err(ConfigError::Invalid("prtg.url is required".into()));
            }
            if self.prtg.password.is_none() && self.prtg.passhash.is_none() {
                return Err(ConfigError::Invalid(
                    "prtg.password or prtg.passhash is required".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Collect the `sensors` object in document order. JSON object keys are the
/// numeric sensor ids.
fn sensor_list<'de, D>(deserializer: D) -> Result<Vec<SensorEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    struct SensorVisitor;

    impl<'de> Visitor<'de> for SensorVisitor {
        type Value = Vec<SensorEntry>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object mapping sensor ids to display names")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut out: Vec<SensorEntry> = Vec::new();
            while let Some((key, name)) = map.next_entry::<String, String>()? {
                let id: u32 = key.trim().parse().map_err(|_| {
                    serde::de::Error::custom(format!("sensor id '{key}' is not an integer"))
                })?;
                if out.iter().any(|s| s.id == id) {
                    return Err(serde::de::Error::custom(format!("duplicate sensor id {id}")));
                }
                out.push(SensorEntry { id, name });
            }
            Ok(out)
        }
    }

    deserializer.deserialize_map(SensorVisitor)
}

fn serialize_sensors<S>(sensors: &[SensorEntry], serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    use serde::ser::SerializeMap;
    let mut map = serializer.serialize_map(Some(sensors.len()))?;
    for s in sensors {
        map.serialize_entry(&s.id.to_string(), &s.name)?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "prtg": {"url": "https://prtg.local", "username": "ops", "password": "pw"},
        "sensors": {"2051": "Server Room", "1040": "UPS Room", "3000": "Cold Aisle"},
        "days_to_analyze": 14
    }"#;

    #[test]
    fn sensors_keep_document_order() {
        let cfg = Config::from_json(SAMPLE).unwrap();
        let ids: Vec<u32> = cfg.sensors.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2051, 1040, 3000]);
        assert_eq!(cfg.sensors[1].name, "UPS Room");
    }

    #[test]
    fn defaults_are_applied() {
        let cfg = Config::from_json(SAMPLE).unwrap();
        assert_eq!(cfg.days_to_analyze, 14);
        assert_eq!(cfg.prtg.timeout_secs, 30);
        assert_eq!(cfg.prtg.average_secs, 300);
        assert!(!cfg.prtg.verify_tls);
        assert!(!cfg.export_json);
        assert_eq!(cfg.report.prepared_by, "Data Center Operations");
        assert_eq!(cfg.thresholds, ThresholdPolicy::default());
    }

    #[test]
    fn days_default_to_two() {
        let cfg = Config::from_json(
            r#"{"input_dir": "exports", "sensors": {"1": "A"}}"#,
        )
        .unwrap();
        assert_eq!(cfg.days_to_analyze, 2);
    }

    #[test]
    fn non_numeric_sensor_id_is_rejected() {
        let err = Config::from_json(r#"{"input_dir": "x", "sensors": {"abc": "A"}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn empty_sensor_map_is_invalid() {
        let err = Config::from_json(r#"{"input_dir": "x", "sensors": {}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn api_source_requires_credentials() {
        let err = Config::from_json(
            r#"{"prtg": {"url": "https://prtg.local", "username": "ops"}, "sensors": {"1": "A"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn inverted_threshold_offsets_are_invalid() {
        let err = Config::from_json(
            r#"{"input_dir": "x", "sensors": {"1": "A"},
                "thresholds": {"warning_offset": 5.0, "error_offset": 3.0}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("warning_offset")));
    }

    #[test]
    fn sensors_serialize_back_to_a_map() {
        let cfg = Config::from_json(SAMPLE).unwrap();
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["sensors"]["2051"], "Server Room");
    }
}
