use std::collections::BTreeSet;

use crate::content::validate::validate_select;
use crate::content::{ContentError, ExerciseKind, SelectItem};
use crate::engine::normalize::{sentence_tokens, token_key};
use crate::engine::shuffle::Shuffler;
use crate::engine::{AnswerStrategy, EntityId, Interaction, Mistake, Outcome, Step, Target};

/// Click every word of the sentence that belongs to the asked category.
/// Entities are the sentence's whitespace-delimited tokens, left to right.
pub struct WordSelector;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Comparison keys of the targets found so far.
    pub found: BTreeSet<String>,
}

pub fn target_keys(item: &SelectItem) -> BTreeSet<String> {
    item.targets.iter().map(|t| token_key(t)).collect()
}

impl Selection {
    /// Whether the token at `id` is one of the found targets.
    pub fn is_found(&self, item: &SelectItem, id: EntityId) -> bool {
        sentence_tokens(&item.sentence)
            .get(id.0)
            .is_some_and(|token| self.found.contains(&token_key(token)))
    }
}

impl AnswerStrategy for WordSelector {
    type Item = SelectItem;
    type Answer = Selection;

    const KIND: ExerciseKind = ExerciseKind::Select;

    fn validate(item: &SelectItem) -> Result<(), ContentError> {
        validate_select(item)
    }

    fn fresh(_item: &SelectItem, _shuffler: &mut dyn Shuffler) -> Selection {
        Selection::default()
    }

    fn apply(item: &SelectItem, answer: &mut Selection, interaction: Interaction) -> Step {
        let Interaction::Select(id) = interaction else {
            return Step::Ignored;
        };
        let tokens = sentence_tokens(&item.sentence);
        let Some(token) = tokens.get(id.0) else {
            return Step::Ignored;
        };

        let key = token_key(token);
        if !target_keys(item).contains(&key) {
            return Step::Rejected(Mistake::at(Target::Entity(id)));
        }
        if answer.found.insert(key) {
            Step::Updated
        } else {
            Step::Ignored
        }
    }

    fn is_complete(item: &SelectItem, answer: &Selection) -> bool {
        target_keys(item).is_subset(&answer.found)
    }

    fn evaluate(item: &SelectItem, answer: &Selection) -> Outcome {
        if Self::is_complete(item, answer) {
            Outcome::Correct
        } else {
            Outcome::Incorrect(Mistake::at(Target::Builder))
        }
    }

    fn recover(_item: &SelectItem, _answer: &mut Selection, _mistake: &Mistake, _shuffler: &mut dyn Shuffler) {
        // Found targets are kept; only the transient mark goes away.
    }
}
