use serde::{Deserialize, Serialize};

/// Predicate of an extracted relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationLabel {
    IsA,
    WorksAt,
    LocatedIn,
    Owns,
    Founded,
    ParticipatesIn,
}

impl RelationLabel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IsA => "is_a",
            Self::WorksAt => "works_at",
            Self::LocatedIn => "located_in",
            Self::Owns => "owns",
            Self::Founded => "founded",
            Self::ParticipatesIn => "participates_in",
        }
    }
}

impl std::fmt::Display for RelationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RelationLabel {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "is_a" => Ok(Self::IsA),
            "works_at" => Ok(Self::WorksAt),
            "located_in" => Ok(Self::LocatedIn),
            "owns" => Ok(Self::Owns),
            "founded" => Ok(Self::Founded),
            "participates_in" => Ok(Self::ParticipatesIn),
            _ => Err(crate::Error::InvalidRelationLabel(s.to_string())),
        }
    }
}

/// A directed relation between two entity texts, with the snippet it was
/// extracted from kept as context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationTriple {
    pub subject: String,
    pub predicate: RelationLabel,
    pub object: String,
    pub confidence: f64,
    pub context: String,
}

impl RelationTriple {
    #[must_use]
    pub fn new(
        subject: String,
        predicate: RelationLabel,
        object: String,
        confidence: f64,
        context: String,
    ) -> Self {
        Self {
            subject,
            predicate,
            object,
            confidence: confidence.clamp(0.0, 1.0),
            context,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trip() {
        for label in [
            RelationLabel::IsA,
            RelationLabel::WorksAt,
            RelationLabel::LocatedIn,
            RelationLabel::Owns,
            RelationLabel::Founded,
            RelationLabel::ParticipatesIn,
        ] {
            let parsed: RelationLabel = label.as_str().parse().unwrap();
            assert_eq!(parsed, label);
        }
    }

    #[test]
    fn test_label_parse_rejects_unknown() {
        assert!("knows".parse::<RelationLabel>().is_err());
    }

    #[test]
    fn test_triple_clamps_confidence() {
        let triple = RelationTriple::new(
            "张伟".to_string(),
            RelationLabel::WorksAt,
            "北京大学".to_string(),
            1.2,
            "张伟在北京大学工作".to_string(),
        );
        assert!((triple.confidence - 1.0).abs() < f64::EPSILON);
    }
}
