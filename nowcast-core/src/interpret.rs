//! Turns raw nowcast category/value pairs into display lines.

use serde::{Deserialize, Serialize};

/// Language of the rendered display lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Korean,
}

/// Nowcast categories that have a display rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// PTY
    PrecipitationType,
    /// REH
    Humidity,
    /// RN1
    HourlyRainfall,
    /// T1H
    Temperature,
    /// WSD
    WindSpeed,
}

impl Category {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PTY" => Some(Self::PrecipitationType),
            "REH" => Some(Self::Humidity),
            "RN1" => Some(Self::HourlyRainfall),
            "T1H" => Some(Self::Temperature),
            "WSD" => Some(Self::WindSpeed),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::PrecipitationType => "PTY",
            Self::Humidity => "REH",
            Self::HourlyRainfall => "RN1",
            Self::Temperature => "T1H",
            Self::WindSpeed => "WSD",
        }
    }

    fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (Self::PrecipitationType, Language::English) => "Precipitation",
            (Self::PrecipitationType, Language::Korean) => "강수",
            (Self::Humidity, Language::English) => "Humidity",
            (Self::Humidity, Language::Korean) => "습도",
            (Self::HourlyRainfall, Language::English) => "Rainfall",
            (Self::HourlyRainfall, Language::Korean) => "강수량",
            (Self::Temperature, Language::English) => "Temperature",
            (Self::Temperature, Language::Korean) => "기온",
            (Self::WindSpeed, Language::English) => "Wind speed",
            (Self::WindSpeed, Language::Korean) => "풍속",
        }
    }

    fn unit(&self) -> &'static str {
        match self {
            Self::PrecipitationType => "",
            Self::Humidity => "%",
            Self::HourlyRainfall => "mm",
            Self::Temperature => "°C",
            Self::WindSpeed => "m/s",
        }
    }
}

/// Coded PTY values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrecipitationType {
    None,
    Rain,
    RainSnow,
    Snow,
    Shower,
}

impl PrecipitationType {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(Self::None),
            "1" => Some(Self::Rain),
            "2" => Some(Self::RainSnow),
            "3" => Some(Self::Snow),
            "4" => Some(Self::Shower),
            _ => None,
        }
    }

    pub fn label(&self, language: Language) -> &'static str {
        match language {
            Language::English => match self {
                Self::None => "none",
                Self::Rain => "rain",
                Self::RainSnow => "rain/snow",
                Self::Snow => "snow",
                Self::Shower => "shower",
            },
            Language::Korean => match self {
                Self::None => "없음",
                Self::Rain => "비",
                Self::RainSnow => "비/눈",
                Self::Snow => "눈",
                Self::Shower => "소나기",
            },
        }
    }
}

/// Renders one observation, or `None` when the category has no display rule.
pub fn interpret(category: &str, value: &str, language: Language) -> Option<String> {
    let category = Category::from_code(category)?;
    let label = category.label(language);

    let line = match category {
        Category::PrecipitationType => {
            // Unknown codes are shown as-is.
            let kind = PrecipitationType::from_code(value)
                .map(|pty| pty.label(language))
                .unwrap_or(value);
            format!("{label}: {kind}")
        }
        _ => format!("{label}: {value}{}", category.unit()),
    };

    Some(line)
}
