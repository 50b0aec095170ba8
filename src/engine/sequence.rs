use crate::content::validate::validate_sequence;
use crate::content::{ContentError, ExerciseKind, SequenceItem};
use crate::engine::normalize::canonical;
use crate::engine::shuffle::{Shuffler, arrange};
use crate::engine::{AnswerStrategy, EntityId, Interaction, Mistake, Outcome, Step, Target};

/// Build the sentence by moving words from the pool into order.
pub struct SentenceBuilder;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assembly {
    /// Words not placed yet, in display order.
    pub pool: Vec<EntityId>,
    /// Words placed so far, in sentence order.
    pub built: Vec<EntityId>,
    /// The arrangement the pool was presented in.
    pub shown: Vec<EntityId>,
}

impl Assembly {
    pub fn built_text<'a>(&self, item: &'a SequenceItem) -> Vec<&'a str> {
        self.built
            .iter()
            .filter_map(|id| item.words.get(id.0))
            .map(|w| w.text.as_str())
            .collect()
    }
}

fn shuffled_pool(item: &SequenceItem, previous: &[EntityId], shuffler: &mut dyn Shuffler) -> Vec<EntityId> {
    let labels: Vec<&str> = item.words.iter().map(|w| w.text.as_str()).collect();
    let correct: Vec<&str> = item.correct.iter().map(String::as_str).collect();
    let previous: Vec<&str> = previous
        .iter()
        .filter_map(|id| labels.get(id.0).copied())
        .collect();

    arrange(shuffler, &labels, &[correct.as_slice(), previous.as_slice()])
        .into_iter()
        .map(EntityId)
        .collect()
}

impl AnswerStrategy for SentenceBuilder {
    type Item = SequenceItem;
    type Answer = Assembly;

    const KIND: ExerciseKind = ExerciseKind::Sequence;
    const REBUILD_ON_MISTAKE: bool = true;

    fn validate(item: &SequenceItem) -> Result<(), ContentError> {
        validate_sequence(item)
    }

    fn fresh(item: &SequenceItem, shuffler: &mut dyn Shuffler) -> Assembly {
        let pool = shuffled_pool(item, &[], shuffler);
        Assembly {
            shown: pool.clone(),
            pool,
            built: Vec::new(),
        }
    }

    fn apply(_item: &SequenceItem, answer: &mut Assembly, interaction: Interaction) -> Step {
        match interaction {
            Interaction::Select(id) => match answer.pool.iter().position(|&p| p == id) {
                Some(pos) => {
                    answer.pool.remove(pos);
                    answer.built.push(id);
                    Step::Updated
                }
                None => Step::Ignored,
            },
            Interaction::Deselect(id) => match answer.built.iter().position(|&p| p == id) {
                Some(pos) => {
                    answer.built.remove(pos);
                    answer.pool.push(id);
                    Step::Updated
                }
                None => Step::Ignored,
            },
            Interaction::DropInto(..) => Step::Ignored,
        }
    }

    fn is_complete(_item: &SequenceItem, answer: &Assembly) -> bool {
        answer.pool.is_empty()
    }

    fn evaluate(item: &SequenceItem, answer: &Assembly) -> Outcome {
        let built = answer.built_text(item);
        let matches = built.len() == item.correct.len()
            && built
                .iter()
                .zip(&item.correct)
                .all(|(got, want)| canonical(got) == canonical(want));
        if matches {
            Outcome::Correct
        } else {
            Outcome::Incorrect(Mistake::at(Target::Builder))
        }
    }

    fn recover(item: &SequenceItem, answer: &mut Assembly, _mistake: &Mistake, shuffler: &mut dyn Shuffler) {
        let pool = shuffled_pool(item, &answer.shown, shuffler);
        answer.shown = pool.clone();
        answer.pool = pool;
        answer.built.clear();
    }
}
