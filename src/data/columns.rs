/// Temperature unit of a source column, inferred from its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Infer the unit from a column name. PRTG labels Fahrenheit channels
    /// with `tempf` or a `(F)` / `°F` suffix; everything else is Celsius.
    pub fn infer(column_name: &str) -> Self {
        let lower = column_name.to_lowercase();
        if lower.contains("tempf") || lower.contains("(f)") || lower.contains("\u{00B0}f") {
            TemperatureUnit::Fahrenheit
        } else {
            TemperatureUnit::Celsius
        }
    }

    pub fn to_celsius(&self, value: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => value,
            TemperatureUnit::Fahrenheit => (value - 32.0) * 5.0 / 9.0,
        }
    }
}

/// Pick the temperature column.
///
/// Prefers a `tempc` channel that is not the `(RAW)` twin; otherwise the
/// first column mentioning `temperature` or `(C)`.
pub fn find_temperature_column(columns: &[String]) -> Option<usize> {
    let lower: Vec<String> = columns.iter().map(|c| c.to_lowercase()).collect();

    lower
        .iter()
        .position(|c| c.contains("tempc") && !c.contains("(raw)"))
        .or_else(|| {
            lower
                .iter()
                .position(|c| c.contains("temperature") || c.contains("(c)"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn tempc_wins_over_raw_twin() {
        let c = cols(&["Date Time", "TempC(RAW)", "TempC", "Temperature"]);
        assert_eq!(find_temperature_column(&c), Some(2));
    }

    #[test]
    fn falls_back_to_temperature_name() {
        let c = cols(&["Date Time", "Humidity", "Temperature", "Temperature(RAW)"]);
        assert_eq!(find_temperature_column(&c), Some(2));
        let c = cols(&["Date Time", "Inlet (C)"]);
        assert_eq!(find_temperature_column(&c), Some(1));
    }

    #[test]
    fn no_temperature_column() {
        assert_eq!(find_temperature_column(&cols(&["Date Time", "Humidity"])), None);
    }

    #[test]
    fn fahrenheit_is_converted() {
        let unit = TemperatureUnit::infer("Temperature (F)");
        assert_eq!(unit, TemperatureUnit::Fahrenheit);
        assert!((unit.to_celsius(212.0) - 100.0).abs() < 1e-12);
        assert_eq!(TemperatureUnit::infer("TempC").to_celsius(21.0), 21.0);
    }
}
