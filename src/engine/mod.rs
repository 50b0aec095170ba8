//! Answer strategies: the pure correctness rules behind each exercise kind.
//!
//! A strategy never touches timers, randomness sources it does not receive, or the
//! item list. The session controller owns sequencing; strategies only say what an
//! interaction does to the in-progress answer and whether that answer is right.

pub mod blank;
pub mod classify;
pub mod normalize;
pub mod select;
pub mod sequence;
pub mod shuffle;

use std::fmt::Debug;

use crate::content::{ContentError, ExerciseKind};
use crate::engine::shuffle::Shuffler;

pub use blank::FillInBlank;
pub use classify::Classifier;
pub use select::WordSelector;
pub use sequence::SentenceBuilder;

/// A selectable thing inside the current item: a pool word, a choice, a sentence token
/// or a fragment. The number is its position in the item as authored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub usize);

/// A drop zone of a classification item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(pub usize);

/// Where feedback for a mistake is shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    /// The whole answer area (sentence builder).
    Builder,
    Entity(EntityId),
    Slot(SlotId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interaction {
    Select(EntityId),
    Deselect(EntityId),
    DropInto(EntityId, SlotId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mistake {
    pub target: Target,
}

impl Mistake {
    pub fn at(target: Target) -> Self {
        Self { target }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect(Mistake),
}

/// What an interaction did to the in-progress answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Nothing changed.
    Ignored,
    /// The answer changed; evaluation may follow once it is complete.
    Updated,
    /// The interaction itself was checked and is wrong. Retryable.
    Rejected(Mistake),
}

pub trait AnswerStrategy {
    type Item;
    type Answer: Clone + Debug + PartialEq;

    const KIND: ExerciseKind;

    /// A mistake throws the whole answer away: input stays locked until the
    /// rebuild fires, and the longer rebuild delay applies.
    const REBUILD_ON_MISTAKE: bool = false;

    fn validate(item: &Self::Item) -> Result<(), ContentError>;

    /// Working state for a freshly entered item, with its pool shuffled.
    fn fresh(item: &Self::Item, shuffler: &mut dyn Shuffler) -> Self::Answer;

    fn apply(item: &Self::Item, answer: &mut Self::Answer, interaction: Interaction) -> Step;

    /// Enough input was given to attempt evaluation.
    fn is_complete(item: &Self::Item, answer: &Self::Answer) -> bool;

    fn evaluate(item: &Self::Item, answer: &Self::Answer) -> Outcome;

    /// Undo a mistake so the learner can retry the same item.
    fn recover(
        item: &Self::Item,
        answer: &mut Self::Answer,
        mistake: &Mistake,
        shuffler: &mut dyn Shuffler,
    );
}
