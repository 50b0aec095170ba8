use crate::content::validate::validate_blank;
use crate::content::{BlankItem, ContentError, ExerciseKind};
use crate::engine::shuffle::{Shuffler, arrange};
use crate::engine::{AnswerStrategy, EntityId, Interaction, Mistake, Outcome, Step, Target};

/// Pick the one choice that completes the sentence.
pub struct FillInBlank;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlankAnswer {
    /// Choices in display order.
    pub order: Vec<EntityId>,
    /// The committed choice, if any. Committed choices are final until recovered.
    pub chosen: Option<EntityId>,
}

impl AnswerStrategy for FillInBlank {
    type Item = BlankItem;
    type Answer = BlankAnswer;

    const KIND: ExerciseKind = ExerciseKind::Blank;

    fn validate(item: &BlankItem) -> Result<(), ContentError> {
        validate_blank(item)
    }

    fn fresh(item: &BlankItem, shuffler: &mut dyn Shuffler) -> BlankAnswer {
        let labels: Vec<&str> = item.choices.iter().map(|c| c.text.as_str()).collect();
        BlankAnswer {
            order: arrange(shuffler, &labels, &[]).into_iter().map(EntityId).collect(),
            chosen: None,
        }
    }

    fn apply(item: &BlankItem, answer: &mut BlankAnswer, interaction: Interaction) -> Step {
        match interaction {
            Interaction::Select(id) if answer.chosen.is_none() && id.0 < item.choices.len() => {
                answer.chosen = Some(id);
                Step::Updated
            }
            _ => Step::Ignored,
        }
    }

    fn is_complete(_item: &BlankItem, answer: &BlankAnswer) -> bool {
        answer.chosen.is_some()
    }

    fn evaluate(item: &BlankItem, answer: &BlankAnswer) -> Outcome {
        match answer.chosen {
            Some(id) if item.choices.get(id.0).is_some_and(|c| c.correct) => Outcome::Correct,
            Some(id) => Outcome::Incorrect(Mistake::at(Target::Entity(id))),
            None => Outcome::Incorrect(Mistake::at(Target::Builder)),
        }
    }

    fn recover(_item: &BlankItem, answer: &mut BlankAnswer, _mistake: &Mistake, _shuffler: &mut dyn Shuffler) {
        answer.chosen = None;
    }
}
