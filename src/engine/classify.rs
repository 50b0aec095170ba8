use crate::content::validate::validate_classify;
use crate::content::{ClassifyItem, ContentError, ExerciseKind};
use crate::engine::shuffle::{Shuffler, arrange};
use crate::engine::{AnswerStrategy, EntityId, Interaction, Mistake, Outcome, SlotId, Step, Target};

/// Drag each fragment into the slot of its category. Every drop is checked on the spot.
pub struct Classifier;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Fragments not placed yet, in display order.
    pub pool: Vec<EntityId>,
    /// Occupant of each slot.
    pub slots: Vec<Option<EntityId>>,
}

pub fn fits(item: &ClassifyItem, fragment: EntityId, slot: SlotId) -> bool {
    match (item.fragments.get(fragment.0), item.slots.get(slot.0)) {
        (Some(f), Some(s)) => f.category.trim() == s.trim(),
        _ => false,
    }
}

impl Placement {
    pub fn occupant(&self, slot: SlotId) -> Option<EntityId> {
        self.slots.get(slot.0).copied().flatten()
    }

    fn slot_of(&self, fragment: EntityId) -> Option<SlotId> {
        self.slots
            .iter()
            .position(|occupant| *occupant == Some(fragment))
            .map(SlotId)
    }

    /// Send a wrongly placed fragment back to the pool. Correct placements stay.
    fn evict_if_wrong(&mut self, item: &ClassifyItem, slot: SlotId) -> bool {
        match self.occupant(slot) {
            Some(fragment) if !fits(item, fragment, slot) => {
                self.slots[slot.0] = None;
                self.pool.push(fragment);
                true
            }
            _ => false,
        }
    }
}

impl AnswerStrategy for Classifier {
    type Item = ClassifyItem;
    type Answer = Placement;

    const KIND: ExerciseKind = ExerciseKind::Classify;

    fn validate(item: &ClassifyItem) -> Result<(), ContentError> {
        validate_classify(item)
    }

    fn fresh(item: &ClassifyItem, shuffler: &mut dyn Shuffler) -> Placement {
        let labels: Vec<&str> = item.fragments.iter().map(|f| f.text.as_str()).collect();
        Placement {
            pool: arrange(shuffler, &labels, &[]).into_iter().map(EntityId).collect(),
            slots: vec![None; item.slots.len()],
        }
    }

    fn apply(item: &ClassifyItem, answer: &mut Placement, interaction: Interaction) -> Step {
        match interaction {
            Interaction::DropInto(fragment, slot) => {
                if slot.0 >= answer.slots.len() {
                    return Step::Ignored;
                }
                let Some(pos) = answer.pool.iter().position(|&f| f == fragment) else {
                    return Step::Ignored;
                };
                if answer.occupant(slot).is_some_and(|f| fits(item, f, slot)) {
                    return Step::Ignored;
                }
                answer.pool.remove(pos);
                answer.evict_if_wrong(item, slot);
                answer.slots[slot.0] = Some(fragment);

                if fits(item, fragment, slot) {
                    Step::Updated
                } else {
                    Step::Rejected(Mistake::at(Target::Slot(slot)))
                }
            }
            Interaction::Deselect(fragment) => match answer.slot_of(fragment) {
                Some(slot) if answer.evict_if_wrong(item, slot) => Step::Updated,
                _ => Step::Ignored,
            },
            Interaction::Select(_) => Step::Ignored,
        }
    }

    fn is_complete(_item: &ClassifyItem, answer: &Placement) -> bool {
        answer.slots.iter().all(Option::is_some)
    }

    fn evaluate(item: &ClassifyItem, answer: &Placement) -> Outcome {
        let wrong = answer.slots.iter().enumerate().find(|(idx, occupant)| {
            !occupant.is_some_and(|fragment| fits(item, fragment, SlotId(*idx)))
        });
        match wrong {
            Some((idx, _)) => Outcome::Incorrect(Mistake::at(Target::Slot(SlotId(idx)))),
            None => Outcome::Correct,
        }
    }

    fn recover(item: &ClassifyItem, answer: &mut Placement, mistake: &Mistake, _shuffler: &mut dyn Shuffler) {
        match mistake.target {
            Target::Slot(slot) => {
                answer.evict_if_wrong(item, slot);
            }
            _ => {
                for idx in 0..answer.slots.len() {
                    answer.evict_if_wrong(item, SlotId(idx));
                }
            }
        }
    }
}
