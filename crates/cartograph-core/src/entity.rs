use serde::{Deserialize, Serialize};

/// Label assigned to an extracted entity mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityLabel {
    Person,
    Org,
    Gpe,
    Product,
    Event,
    Time,
    Money,
}

impl EntityLabel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "PERSON",
            Self::Org => "ORG",
            Self::Gpe => "GPE",
            Self::Product => "PRODUCT",
            Self::Event => "EVENT",
            Self::Time => "TIME",
            Self::Money => "MONEY",
        }
    }

    /// Maps a tag emitted by an external model onto the fixed label set.
    /// Accepts the common aliases alongside the canonical names.
    #[must_use]
    pub fn from_model_tag(tag: &str) -> Option<Self> {
        match tag {
            "PERSON" | "PER" => Some(Self::Person),
            "ORG" => Some(Self::Org),
            "GPE" | "LOC" => Some(Self::Gpe),
            "PRODUCT" => Some(Self::Product),
            "EVENT" => Some(Self::Event),
            "TIME" | "DATE" => Some(Self::Time),
            "MONEY" => Some(Self::Money),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityLabel {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PERSON" => Ok(Self::Person),
            "ORG" => Ok(Self::Org),
            "GPE" => Ok(Self::Gpe),
            "PRODUCT" => Ok(Self::Product),
            "EVENT" => Ok(Self::Event),
            "TIME" => Ok(Self::Time),
            "MONEY" => Ok(Self::Money),
            _ => Err(crate::Error::InvalidEntityLabel(s.to_string())),
        }
    }
}

/// A labeled span of text produced by entity extraction.
///
/// Offsets count characters in the normalized text, with `end` exclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
}

impl EntityMention {
    #[must_use]
    pub fn new(
        text: String,
        label: EntityLabel,
        start: usize,
        end: usize,
        confidence: f64,
    ) -> Self {
        Self {
            text,
            label,
            start,
            end,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }
}
