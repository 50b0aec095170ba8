use crate::content::{BlankItem, ClassifyItem, ExerciseKind, SelectItem, SequenceItem};
use crate::engine::blank::BlankAnswer;
use crate::engine::classify::{Placement, fits};
use crate::engine::normalize::sentence_tokens;
use crate::engine::select::Selection;
use crate::engine::sequence::Assembly;
use crate::engine::{
    AnswerStrategy, Classifier, EntityId, FillInBlank, Interaction, SentenceBuilder, SlotId, Target,
    WordSelector,
};
use crate::session::controller::Controller;
use crate::session::feedback::Feedback;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EntityStatus {
    #[default]
    Default,
    Correct,
    Incorrect,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntityView {
    pub id: EntityId,
    pub label: String,
    pub gloss: Option<String>,
    pub status: EntityStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotView {
    pub id: SlotId,
    pub label: String,
    pub occupant: Option<EntityView>,
    pub status: EntityStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptView {
    Assemble { prompt: Option<String> },
    Blank { before: String, after: String, filled: Option<String> },
    /// Sentence tokens are the pool, in sentence order.
    Select { category: String },
    Classify { prompt: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemView {
    pub prompt: PromptView,
    /// Entities the learner can still pick.
    pub pool: Vec<EntityView>,
    /// Entities already placed or committed.
    pub placed: Vec<EntityView>,
    pub slots: Vec<SlotView>,
    pub hint: Option<String>,
    pub builder_status: EntityStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PracticeView {
    pub kind: ExerciseKind,
    pub index: usize,
    pub total: usize,
    pub percent: u16,
    pub completed: bool,
    pub celebrating: bool,
    pub locked: bool,
    /// Answered correctly, waiting to advance.
    pub solved: bool,
    pub revision: u64,
    /// `None` once completed.
    pub item: Option<ItemView>,
}

/// Input accepted from the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PracticeEvent {
    Select(EntityId),
    Deselect(EntityId),
    DropInto(EntityId, SlotId),
    JumpTo(usize),
    Retreat,
    AdvanceIfReady,
    Check,
}

/// Maps a strategy's answer to what the renderer shows.
pub trait PresentItem: AnswerStrategy {
    fn present(item: &Self::Item, answer: &Self::Answer, feedback: &Feedback) -> ItemView;
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn marked(feedback: &Feedback, target: Target) -> EntityStatus {
    if feedback.is_marked(target) {
        EntityStatus::Incorrect
    } else {
        EntityStatus::Default
    }
}

fn builder_status(feedback: &Feedback) -> EntityStatus {
    if feedback.is_marked(Target::Builder) {
        EntityStatus::Incorrect
    } else if feedback.celebrating {
        EntityStatus::Correct
    } else {
        EntityStatus::Default
    }
}

impl PresentItem for SentenceBuilder {
    fn present(item: &SequenceItem, answer: &Assembly, feedback: &Feedback) -> ItemView {
        let entity = |id: &EntityId, status| {
            let word = &item.words[id.0];
            EntityView {
                id: *id,
                label: word.text.clone(),
                gloss: word.gloss.clone(),
                status,
            }
        };
        let status = builder_status(feedback);
        ItemView {
            prompt: PromptView::Assemble {
                prompt: item.prompt.clone(),
            },
            pool: answer.pool.iter().map(|id| entity(id, EntityStatus::Default)).collect(),
            placed: answer.built.iter().map(|id| entity(id, status)).collect(),
            slots: Vec::new(),
            hint: None,
            builder_status: status,
        }
    }
}

impl PresentItem for FillInBlank {
    fn present(item: &BlankItem, answer: &BlankAnswer, feedback: &Feedback) -> ItemView {
        let status_of = |id: EntityId| {
            if feedback.is_marked(Target::Entity(id)) {
                EntityStatus::Incorrect
            } else if answer.chosen == Some(id) && feedback.celebrating {
                EntityStatus::Correct
            } else {
                EntityStatus::Default
            }
        };
        let entity = |id: EntityId| EntityView {
            id,
            label: item.choices[id.0].text.clone(),
            gloss: None,
            status: status_of(id),
        };
        ItemView {
            prompt: PromptView::Blank {
                before: item.before.clone(),
                after: item.after.clone(),
                filled: answer.chosen.map(|id| item.choices[id.0].text.clone()),
            },
            pool: answer.order.iter().map(|&id| entity(id)).collect(),
            placed: answer.chosen.map(entity).into_iter().collect(),
            slots: Vec::new(),
            hint: non_empty(&item.hint),
            builder_status: builder_status(feedback),
        }
    }
}

impl PresentItem for WordSelector {
    fn present(item: &SelectItem, answer: &Selection, feedback: &Feedback) -> ItemView {
        let tokens: Vec<EntityView> = sentence_tokens(&item.sentence)
            .into_iter()
            .enumerate()
            .map(|(idx, token)| {
                let id = EntityId(idx);
                let status = if answer.is_found(item, id) {
                    EntityStatus::Correct
                } else {
                    marked(feedback, Target::Entity(id))
                };
                EntityView {
                    id,
                    label: token.to_string(),
                    gloss: None,
                    status,
                }
            })
            .collect();
        ItemView {
            prompt: PromptView::Select {
                category: item.category.clone(),
            },
            placed: tokens
                .iter()
                .filter(|t| t.status == EntityStatus::Correct)
                .cloned()
                .collect(),
            pool: tokens,
            slots: Vec::new(),
            hint: non_empty(&item.hint),
            builder_status: builder_status(feedback),
        }
    }
}

impl PresentItem for Classifier {
    fn present(item: &ClassifyItem, answer: &Placement, feedback: &Feedback) -> ItemView {
        let fragment = |id: EntityId, status| EntityView {
            id,
            label: item.fragments[id.0].text.clone(),
            gloss: None,
            status,
        };
        let slots: Vec<SlotView> = item
            .slots
            .iter()
            .enumerate()
            .map(|(idx, label)| {
                let slot = SlotId(idx);
                let occupant = answer.occupant(slot);
                let status = match occupant {
                    _ if feedback.is_marked(Target::Slot(slot)) => EntityStatus::Incorrect,
                    Some(f) if fits(item, f, slot) => EntityStatus::Correct,
                    Some(_) => EntityStatus::Incorrect,
                    None => EntityStatus::Default,
                };
                SlotView {
                    id: slot,
                    label: label.trim().to_string(),
                    occupant: occupant.map(|f| fragment(f, status)),
                    status,
                }
            })
            .collect();
        ItemView {
            prompt: PromptView::Classify {
                prompt: item.prompt.clone(),
            },
            pool: answer.pool.iter().map(|&id| fragment(id, EntityStatus::Default)).collect(),
            placed: slots.iter().filter_map(|s| s.occupant.clone()).collect(),
            slots,
            hint: None,
            builder_status: builder_status(feedback),
        }
    }
}

impl<S: PresentItem> Controller<S> {
    pub fn view(&self) -> PracticeView {
        let item = match (self.item(), self.answer()) {
            (Some(item), Some(answer)) => Some(S::present(item, answer, self.feedback())),
            _ => None,
        };
        PracticeView {
            kind: S::KIND,
            index: self.index(),
            total: self.len(),
            percent: self.progress(),
            completed: self.is_completed(),
            celebrating: self.feedback().celebrating,
            locked: self.is_locked(),
            solved: self.is_solved(),
            revision: self.revision(),
            item,
        }
    }

    /// Route one renderer event. Returns whether the session changed.
    pub fn handle(&mut self, event: PracticeEvent) -> bool {
        let before = self.revision();
        match event {
            PracticeEvent::Select(id) => {
                self.interact(Interaction::Select(id));
            }
            PracticeEvent::Deselect(id) => {
                self.interact(Interaction::Deselect(id));
            }
            PracticeEvent::DropInto(id, slot) => {
                self.interact(Interaction::DropInto(id, slot));
            }
            PracticeEvent::JumpTo(index) => {
                self.jump_to(index);
            }
            PracticeEvent::Retreat => {
                self.retreat();
            }
            PracticeEvent::AdvanceIfReady => {
                self.advance_if_ready();
            }
            PracticeEvent::Check => {
                self.submit();
            }
        }
        self.revision() != before
    }
}
