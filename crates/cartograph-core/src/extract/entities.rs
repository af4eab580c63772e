use std::collections::HashSet;
use std::sync::Arc;

use jieba_rs::{Jieba, TokenizeMode};
use regex::Regex;

use super::lexicon;
use super::model::{ModelResult, NerModel};
use crate::entity::{EntityLabel, EntityMention};

const MODEL_CONFIDENCE: f64 = 0.8;
const PERSON_CONFIDENCE: f64 = 0.6;
const ORG_CONFIDENCE: f64 = 0.7;
const LOCATION_CONFIDENCE: f64 = 0.6;

/// Which extraction strategy an [`EntityExtractor`] runs with. Chosen once at
/// construction and observable so callers can report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityStrategy {
    ModelBased,
    RuleBased,
}

impl EntityStrategy {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModelBased => "model_based",
            Self::RuleBased => "rule_based",
        }
    }
}

/// Lexicon-driven extractor used when no model is available.
///
/// Text is segmented with jieba and every rule is anchored to whole tokens:
/// a keyword match inside a longer token does not count. Offsets are
/// character offsets into the input.
pub struct RuleBasedExtractor {
    jieba: Jieba,
    surnames: HashSet<char>,
    org_rule: Regex,
    location_rule: Regex,
}

impl RuleBasedExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            jieba: Jieba::new(),
            surnames: lexicon::CHINESE_SURNAMES.chars().collect(),
            org_rule: suffix_rule(lexicon::ORG_KEYWORDS),
            location_rule: suffix_rule(lexicon::LOCATION_KEYWORDS),
        }
    }

    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<EntityMention> {
        let tokens = self.jieba.tokenize(text, TokenizeMode::Default, true);
        let mut mentions = Vec::new();

        for token in &tokens {
            let mut chars = token.word.chars();
            let first = chars.next();
            // Surname rule needs at least one character after the surname.
            if chars.next().is_none() {
                continue;
            }
            if first.is_some_and(|c| self.surnames.contains(&c)) {
                mentions.push(EntityMention::new(
                    token.word.to_string(),
                    EntityLabel::Person,
                    token.start,
                    token.end,
                    PERSON_CONFIDENCE,
                ));
            }
        }

        for token in &tokens {
            if self.org_rule.is_match(token.word) {
                mentions.push(EntityMention::new(
                    token.word.to_string(),
                    EntityLabel::Org,
                    token.start,
                    token.end,
                    ORG_CONFIDENCE,
                ));
            }
        }

        for token in &tokens {
            if self.location_rule.is_match(token.word) {
                mentions.push(EntityMention::new(
                    token.word.to_string(),
                    EntityLabel::Gpe,
                    token.start,
                    token.end,
                    LOCATION_CONFIDENCE,
                ));
            }
        }

        mentions
    }
}

impl Default for RuleBasedExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// One or more ideographs followed by one of the keywords, consuming the
/// whole token.
fn suffix_rule(keywords: &[&str]) -> Regex {
    let alternatives = keywords.join("|");
    Regex::new(&format!(r"^[\u{{4e00}}-\u{{9fff}}]+(?:{alternatives})$")).unwrap()
}

/// Entity extraction facade.
///
/// Holds an optional model; with one, mentions come from the model at a fixed
/// confidence, otherwise from [`RuleBasedExtractor`]. The choice is made once
/// at construction and never changes per call.
pub struct EntityExtractor {
    model: Option<Arc<dyn NerModel>>,
    rules: RuleBasedExtractor,
}

impl EntityExtractor {
    #[must_use]
    pub fn new(model: Option<Arc<dyn NerModel>>) -> Self {
        Self {
            model,
            rules: RuleBasedExtractor::new(),
        }
    }

    #[must_use]
    pub fn rule_based() -> Self {
        Self::new(None)
    }

    #[must_use]
    pub fn strategy(&self) -> EntityStrategy {
        if self.model.is_some() {
            EntityStrategy::ModelBased
        } else {
            EntityStrategy::RuleBased
        }
    }

    /// Extracts entity mentions from already-normalized text. Model failures
    /// propagate; they do not silently fall back to rules.
    pub async fn extract(&self, text: &str) -> ModelResult<Vec<EntityMention>> {
        let Some(model) = &self.model else {
            return Ok(self.rules.extract(text));
        };

        let annotations = model.annotate(text).await?;
        let mut mentions = Vec::with_capacity(annotations.len());
        for annotation in annotations {
            let Some(label) = EntityLabel::from_model_tag(&annotation.label) else {
                tracing::debug!(label = %annotation.label, "skipping mention with unmapped label");
                continue;
            };
            mentions.push(EntityMention::new(
                annotation.text,
                label,
                annotation.start,
                annotation.end,
                MODEL_CONFIDENCE,
            ));
        }
        Ok(mentions)
    }
}
