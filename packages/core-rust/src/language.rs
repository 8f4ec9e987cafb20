//! Language codes accepted by the translation endpoint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A language code. `Auto` is only meaningful as a translation source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ko,
    En,
    Ja,
    Zh,
    Es,
    Fr,
    De,
    Ru,
    /// Let the backend detect the source language.
    Auto,
}

impl Language {
    /// Every concrete language, in the order served by `GET /translate`.
    pub const SUPPORTED: [Language; 8] = [
        Language::Ko,
        Language::En,
        Language::Ja,
        Language::Zh,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::Ru,
    ];

    /// Wire code (`"ko"`, `"auto"`, ...).
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Ko => "ko",
            Self::En => "en",
            Self::Ja => "ja",
            Self::Zh => "zh",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::De => "de",
            Self::Ru => "ru",
            Self::Auto => "auto",
        }
    }

    /// User-facing label, as listed by the supported-languages endpoint.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ko => "한국어",
            Self::En => "영어",
            Self::Ja => "일본어",
            Self::Zh => "중국어",
            Self::Es => "스페인어",
            Self::Fr => "프랑스어",
            Self::De => "독일어",
            Self::Ru => "러시아어",
            Self::Auto => "자동 감지",
        }
    }

    /// English name, used when prompting the language model.
    #[must_use]
    pub fn english_name(self) -> &'static str {
        match self {
            Self::Ko => "Korean",
            Self::En => "English",
            Self::Ja => "Japanese",
            Self::Zh => "Chinese",
            Self::Es => "Spanish",
            Self::Fr => "French",
            Self::De => "German",
            Self::Ru => "Russian",
            Self::Auto => "auto-detected",
        }
    }

    #[must_use]
    pub fn is_auto(self) -> bool {
        self == Self::Auto
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Error returned when parsing an unrecognized language code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown language code: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ko" => Ok(Self::Ko),
            "en" => Ok(Self::En),
            "ja" => Ok(Self::Ja),
            "zh" => Ok(Self::Zh),
            "es" => Ok(Self::Es),
            "fr" => Ok(Self::Fr),
            "de" => Ok(Self::De),
            "ru" => Ok(Self::Ru),
            "auto" => Ok(Self::Auto),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}
