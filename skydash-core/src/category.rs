use serde::{Deserialize, Serialize};
use std::fmt;

/// Four-way classification of upstream conditions, used to theme the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCategory {
    #[default]
    Sunny,
    Rainy,
    Cloudy,
    Snowy,
}

impl WeatherCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCategory::Sunny => "sunny",
            WeatherCategory::Rainy => "rainy",
            WeatherCategory::Cloudy => "cloudy",
            WeatherCategory::Snowy => "snowy",
        }
    }
}

impl fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const RAIN_WORDS: &[&str] = &["rain", "drizzle", "thunderstorm"];
const RAIN_ICONS: &[&str] = &["09", "10", "11"];
const SNOW_WORDS: &[&str] = &["snow"];
const SNOW_ICONS: &[&str] = &["13"];
const CLOUD_WORDS: &[&str] = &["cloud"];
const CLOUD_ICONS: &[&str] = &["02", "03", "04"];

/// Classify an upstream condition label and icon code.
///
/// Rain wins over snow, snow over clouds; anything unrecognised is sunny.
/// Both current conditions and forecast days go through this function.
pub fn classify(label: &str, icon_code: &str) -> WeatherCategory {
    let label = label.to_lowercase();
    let prefix = icon_prefix(icon_code);

    if matches(&label, prefix, RAIN_WORDS, RAIN_ICONS) {
        WeatherCategory::Rainy
    } else if matches(&label, prefix, SNOW_WORDS, SNOW_ICONS) {
        WeatherCategory::Snowy
    } else if matches(&label, prefix, CLOUD_WORDS, CLOUD_ICONS) {
        WeatherCategory::Cloudy
    } else {
        WeatherCategory::Sunny
    }
}

fn matches(label: &str, prefix: &str, words: &[&str], icons: &[&str]) -> bool {
    words.iter().any(|w| label.contains(*w)) || icons.iter().any(|i| *i == prefix)
}

fn icon_prefix(icon_code: &str) -> &str {
    match icon_code.char_indices().nth(2) {
        Some((idx, _)) => &icon_code[..idx],
        None => icon_code,
    }
}
