use crate::entity::EntityMention;

/// Collapses near-duplicate mentions into one entity per surface form.
///
/// Two texts are similar when they match case-insensitively or one contains
/// the other. Each incoming mention is compared against the already accepted
/// ones in order; on a similarity hit the accepted mention is replaced only
/// when the incoming confidence is strictly greater, so ties keep the
/// earlier mention and its fields. Output preserves first-acceptance order.
pub struct EntityMerger;

impl EntityMerger {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn merge(&self, mentions: Vec<EntityMention>) -> Vec<EntityMention> {
        let mut accepted: Vec<EntityMention> = Vec::new();

        for mention in mentions {
            match accepted
                .iter_mut()
                .find(|kept| is_similar(&mention.text, &kept.text))
            {
                Some(kept) => {
                    if mention.confidence > kept.confidence {
                        *kept = mention;
                    }
                }
                None => accepted.push(mention),
            }
        }

        accepted
    }
}

impl Default for EntityMerger {
    fn default() -> Self {
        Self::new()
    }
}

fn is_similar(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase() || a.contains(b) || b.contains(a)
}
