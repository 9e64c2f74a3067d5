use serde::{Deserialize, Deserializer, Serialize};

/// Traffic-light classification attached to a metric by the data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Green,
    Amber,
    Red,
    #[default]
    Neutral,
}

impl Signal {
    /// Parse a signal word. Anything unrecognized is neutral.
    pub fn from_word(word: &str) -> Self {
        match word.trim().to_ascii_lowercase().as_str() {
            "green" => Signal::Green,
            "amber" => Signal::Amber,
            "red" => Signal::Red,
            _ => Signal::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Green => "green",
            Signal::Amber => "amber",
            Signal::Red => "red",
            Signal::Neutral => "neutral",
        }
    }

    /// Table cell text: the upper-cased word, or an em-dash for neutral.
    pub fn cell_text(&self) -> String {
        match self {
            Signal::Neutral => "—".to_string(),
            other => other.as_str().to_uppercase(),
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Signal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // null or an unknown word degrades to neutral instead of failing the load
        let word: Option<String> = Option::deserialize(deserializer)?;
        Ok(word.as_deref().map(Signal::from_word).unwrap_or_default())
    }
}
