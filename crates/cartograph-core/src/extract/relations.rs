use std::collections::HashSet;

use regex::Regex;

use crate::entity::EntityMention;
use crate::relation::{RelationLabel, RelationTriple};

const PATTERN_CONFIDENCE: f64 = 0.7;
const COOCCURRENCE_CONFIDENCE: f64 = 0.6;

/// Surface patterns for explicit relation statements. The first two capture
/// groups are always subject and object.
const RELATION_PATTERNS: &[(&str, RelationLabel)] = &[
    (r"(.+?)(?:是|为)(.+?)(?:的)?(.+)", RelationLabel::IsA),
    (r"(.+?)(?:工作于|任职于|在)(.+)", RelationLabel::WorksAt),
    (r"(.+?)(?:位于|在)(.+)", RelationLabel::LocatedIn),
    (r"(.+?)(?:拥有|持有)(.+)", RelationLabel::Owns),
    (r"(.+?)(?:创建|建立|创办)(?:了)?(.+)", RelationLabel::Founded),
    (r"(.+?)(?:参与|参加)(?:了)?(.+)", RelationLabel::ParticipatesIn),
];

/// Keyword cues for relations between entities that share a sentence,
/// checked in order; the first rule with a keyword in the sentence wins.
const COOCCURRENCE_RULES: &[(&[&str], RelationLabel)] = &[
    (&["工作", "任职"], RelationLabel::WorksAt),
    (&["位于", "在"], RelationLabel::LocatedIn),
];

const SENTENCE_TERMINATORS: &[char] = &['。', '！', '？', '.', '!', '?'];

/// Extracts relation triples from normalized text, combining surface
/// patterns with entity co-occurrence.
pub struct RelationExtractor {
    patterns: Vec<(Regex, RelationLabel)>,
}

impl RelationExtractor {
    #[must_use]
    pub fn new() -> Self {
        let patterns = RELATION_PATTERNS
            .iter()
            .map(|(pattern, label)| (Regex::new(pattern).unwrap(), *label))
            .collect();
        Self { patterns }
    }

    /// Runs both stages. Pattern triples come first, co-occurrence triples
    /// after, in discovery order; duplicates are not removed here.
    #[must_use]
    pub fn extract(&self, text: &str, entities: &[EntityMention]) -> Vec<RelationTriple> {
        let mut triples = self.extract_by_patterns(text);
        triples.extend(self.extract_by_cooccurrence(text, entities));
        triples
    }

    fn extract_by_patterns(&self, text: &str) -> Vec<RelationTriple> {
        let mut triples = Vec::new();

        for (pattern, label) in &self.patterns {
            for captures in pattern.captures_iter(text) {
                let (Some(subject), Some(object)) = (captures.get(1), captures.get(2)) else {
                    continue;
                };
                let subject = subject.as_str().trim();
                let object = object.as_str().trim();
                if !is_valid_endpoint(subject) || !is_valid_endpoint(object) {
                    continue;
                }
                triples.push(RelationTriple::new(
                    subject.to_string(),
                    *label,
                    object.to_string(),
                    PATTERN_CONFIDENCE,
                    captures[0].to_string(),
                ));
            }
        }

        triples
    }

    fn extract_by_cooccurrence(
        &self,
        text: &str,
        entities: &[EntityMention],
    ) -> Vec<RelationTriple> {
        let sentences: Vec<&str> = text.split(SENTENCE_TERMINATORS).collect();
        let mut triples = Vec::new();

        for (i, first) in entities.iter().enumerate() {
            for (j, second) in entities.iter().enumerate() {
                if i == j || first.text == second.text {
                    continue;
                }
                for sentence in &sentences {
                    if !sentence.contains(&first.text) || !sentence.contains(&second.text) {
                        continue;
                    }
                    if let Some(label) = infer_predicate(sentence) {
                        triples.push(RelationTriple::new(
                            first.text.clone(),
                            label,
                            second.text.clone(),
                            COOCCURRENCE_CONFIDENCE,
                            sentence.trim().to_string(),
                        ));
                    }
                }
            }
        }

        triples
    }
}

impl Default for RelationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn infer_predicate(sentence: &str) -> Option<RelationLabel> {
    COOCCURRENCE_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| sentence.contains(keyword)))
        .map(|(_, label)| *label)
}

/// Endpoints must be more than one and fewer than twenty characters once
/// trimmed. Single characters are almost always spurious captures.
fn is_valid_endpoint(text: &str) -> bool {
    let len = text.trim().chars().count();
    len > 1 && len < 20
}

/// Drops exact duplicate triples, keeping the first occurrence of each
/// (subject, predicate, object) key. Context and confidence are not part of
/// the key, so a later triple never displaces an earlier one.
#[must_use]
pub fn dedupe_relations(triples: Vec<RelationTriple>) -> Vec<RelationTriple> {
    let mut seen = HashSet::new();
    let mut unique = Vec::with_capacity(triples.len());

    for triple in triples {
        let key = (triple.subject.clone(), triple.predicate, triple.object.clone());
        if seen.insert(key) {
            unique.push(triple);
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityLabel;

    fn entity(text: &str, label: EntityLabel) -> EntityMention {
        EntityMention::new(text.to_string(), label, 0, text.chars().count(), 0.6)
    }

    #[test]
    fn test_pattern_owns() {
        let extractor = RelationExtractor::new();
        let triples = extractor.extract("王强拥有三家公司", &[]);

        let owns = triples
            .iter()
            .find(|t| t.predicate == RelationLabel::Owns)
            .expect("owns triple");
        assert_eq!(owns.subject, "王强");
        assert_eq!(owns.object, "三家公司");
        assert!((owns.confidence - 0.7).abs() < f64::EPSILON);
        assert_eq!(owns.context, "王强拥有三家公司");
    }

    #[test]
    fn test_pattern_founded_swallows_particle() {
        let extractor = RelationExtractor::new();
        let triples = extractor.extract("马云创办了阿里巴巴", &[]);

        let founded = triples
            .iter()
            .find(|t| t.predicate == RelationLabel::Founded)
            .expect("founded triple");
        assert_eq!(founded.subject, "马云");
        assert_eq!(founded.object, "阿里巴巴");
    }

    #[test]
    fn test_pattern_endpoints_are_trimmed() {
        let extractor = RelationExtractor::new();
        let triples = extractor.extract("张伟 工作于 北京大学", &[]);

        let works = triples
            .iter()
            .find(|t| t.predicate == RelationLabel::WorksAt)
            .expect("works_at triple");
        assert_eq!(works.subject, "张伟");
        assert_eq!(works.object, "北京大学");
    }

    #[test]
    fn test_single_character_endpoint_rejected() {
        let extractor = RelationExtractor::new();
        // The lazy second group of the is_a pattern captures one character,
        // which the length filter then rejects.
        let triples = extractor.extract("张伟是教授", &[]);
        assert!(!triples.iter().any(|t| t.predicate == RelationLabel::IsA));
    }

    #[test]
    fn test_overlong_endpoint_rejected() {
        let extractor = RelationExtractor::new();
        let object = "很".repeat(20);
        let triples = extractor.extract(&format!("张伟拥有{object}"), &[]);
        assert!(!triples.iter().any(|t| t.predicate == RelationLabel::Owns));
    }

    #[test]
    fn test_cooccurrence_works_at_precedes_located_in() {
        let extractor = RelationExtractor::new();
        let entities = [
            entity("张伟", EntityLabel::Person),
            entity("北京大学", EntityLabel::Org),
        ];
        let triples = extractor.extract_by_cooccurrence("张伟在北京大学工作", &entities);

        // Both 工作 and 在 appear; the works_at rule is checked first.
        assert_eq!(triples.len(), 2);
        assert!(triples.iter().all(|t| t.predicate == RelationLabel::WorksAt));
        assert!(triples
            .iter()
            .all(|t| (t.confidence - 0.6).abs() < f64::EPSILON));
        assert!(triples.iter().any(|t| t.subject == "张伟" && t.object == "北京大学"));
        assert!(triples.iter().any(|t| t.subject == "北京大学" && t.object == "张伟"));
    }

    #[test]
    fn test_cooccurrence_requires_shared_sentence() {
        let extractor = RelationExtractor::new();
        let entities = [
            entity("张伟", EntityLabel::Person),
            entity("上海市", EntityLabel::Gpe),
        ];
        let triples = extractor.extract_by_cooccurrence("张伟在工作。上海市很大。", &entities);
        assert!(triples.is_empty());
    }

    #[test]
    fn test_cooccurrence_counts_every_matching_sentence() {
        let extractor = RelationExtractor::new();
        let entities = [
            entity("张伟", EntityLabel::Person),
            entity("北京大学", EntityLabel::Org),
        ];
        let text = "张伟在北京大学工作。张伟任职北京大学。";
        let triples = extractor.extract_by_cooccurrence(text, &entities);

        // Two sentences match, two ordered pairs each.
        assert_eq!(triples.len(), 4);
    }

    #[test]
    fn test_cooccurrence_skips_identical_texts() {
        let extractor = RelationExtractor::new();
        let entities = [
            entity("张伟", EntityLabel::Person),
            entity("张伟", EntityLabel::Person),
        ];
        let triples = extractor.extract_by_cooccurrence("张伟在张伟工作", &entities);
        assert!(triples.is_empty());
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let first = RelationTriple::new(
            "张伟".to_string(),
            RelationLabel::WorksAt,
            "北京大学".to_string(),
            0.7,
            "first context".to_string(),
        );
        let second = RelationTriple::new(
            "张伟".to_string(),
            RelationLabel::WorksAt,
            "北京大学".to_string(),
            0.6,
            "second context".to_string(),
        );
        let other = RelationTriple::new(
            "张伟".to_string(),
            RelationLabel::LocatedIn,
            "北京大学".to_string(),
            0.6,
            "third context".to_string(),
        );

        let unique = dedupe_relations(vec![first, second, other]);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].context, "first context");
        assert_eq!(unique[1].predicate, RelationLabel::LocatedIn);
    }
}
