use std::collections::{BTreeMap, HashSet};

use thiserror::Error;

use crate::content::{BlankItem, ClassifyItem, ExerciseSet, Lesson, SelectItem, SequenceItem};
use crate::engine::normalize::{canonical, sentence_tokens, token_key};

/// Content-authoring defects. None of these are recoverable at runtime.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("sentence builder item has no words")]
    NoWords,
    #[error("`{token}` appears {expected} time(s) in the answer but {found} time(s) in the word pool")]
    TokenCount {
        token: String,
        expected: usize,
        found: usize,
    },
    #[error("item has no choices")]
    NoChoices,
    #[error("expected exactly one correct choice, found {found}")]
    CorrectChoiceCount { found: usize },
    #[error("item has no target words")]
    NoTargets,
    #[error("target `{target}` is not a word of `{sentence}`")]
    TargetNotInSentence { target: String, sentence: String },
    #[error("item has no category slots")]
    NoSlots,
    #[error("slot `{slot}` is declared more than once")]
    DuplicateSlot { slot: String },
    #[error("fragment `{fragment}` names unknown category `{category}`")]
    UnknownCategory { fragment: String, category: String },
    #[error("slot `{slot}` needs exactly one fragment, found {found}")]
    SlotFragmentCount { slot: String, found: usize },
    #[error("lesson `{lesson}` has no practice items")]
    EmptyPractice { lesson: String },
    #[error("lesson `{lesson}`, practice item {index}: {source}")]
    InvalidItem {
        lesson: String,
        index: usize,
        #[source]
        source: Box<ContentError>,
    },
    #[error("failed to parse `{name}`: {message}")]
    Parse { name: String, message: String },
    #[error("unsupported lesson file `{name}` (expected .toml or .json)")]
    UnsupportedFormat { name: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The answer and the pool must be the same multiset of display forms.
pub fn validate_sequence(item: &SequenceItem) -> Result<(), ContentError> {
    if item.words.is_empty() || item.correct.is_empty() {
        return Err(ContentError::NoWords);
    }

    let mut pool: BTreeMap<String, usize> = BTreeMap::new();
    for word in &item.words {
        *pool.entry(canonical(&word.text).into_owned()).or_default() += 1;
    }
    let mut answer: BTreeMap<String, usize> = BTreeMap::new();
    for token in &item.correct {
        *answer.entry(canonical(token).into_owned()).or_default() += 1;
    }

    for (token, &expected) in &answer {
        let found = pool.get(token).copied().unwrap_or(0);
        if found != expected {
            return Err(ContentError::TokenCount {
                token: token.clone(),
                expected,
                found,
            });
        }
    }
    for (token, &found) in &pool {
        if !answer.contains_key(token) {
            return Err(ContentError::TokenCount {
                token: token.clone(),
                expected: 0,
                found,
            });
        }
    }
    Ok(())
}

pub fn validate_blank(item: &BlankItem) -> Result<(), ContentError> {
    if item.choices.is_empty() {
        return Err(ContentError::NoChoices);
    }
    let found = item.choices.iter().filter(|c| c.correct).count();
    if found != 1 {
        return Err(ContentError::CorrectChoiceCount { found });
    }
    Ok(())
}

pub fn validate_select(item: &SelectItem) -> Result<(), ContentError> {
    if item.targets.is_empty() {
        return Err(ContentError::NoTargets);
    }
    let words: HashSet<String> = sentence_tokens(&item.sentence)
        .into_iter()
        .map(token_key)
        .collect();
    for target in &item.targets {
        if !words.contains(&token_key(target)) {
            return Err(ContentError::TargetNotInSentence {
                target: target.clone(),
                sentence: item.sentence.clone(),
            });
        }
    }
    Ok(())
}

pub fn validate_classify(item: &ClassifyItem) -> Result<(), ContentError> {
    if item.slots.is_empty() {
        return Err(ContentError::NoSlots);
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for slot in &item.slots {
        if counts.insert(slot.trim(), 0).is_some() {
            return Err(ContentError::DuplicateSlot { slot: slot.clone() });
        }
    }
    for fragment in &item.fragments {
        match counts.get_mut(fragment.category.trim()) {
            Some(count) => *count += 1,
            None => {
                return Err(ContentError::UnknownCategory {
                    fragment: fragment.text.clone(),
                    category: fragment.category.clone(),
                });
            }
        }
    }
    for slot in &item.slots {
        let found = counts.get(slot.trim()).copied().unwrap_or(0);
        if found != 1 {
            return Err(ContentError::SlotFragmentCount {
                slot: slot.clone(),
                found,
            });
        }
    }
    Ok(())
}

fn validate_all<T>(
    lesson: &str,
    items: &[T],
    check: fn(&T) -> Result<(), ContentError>,
) -> Result<(), ContentError> {
    if items.is_empty() {
        return Err(ContentError::EmptyPractice {
            lesson: lesson.to_string(),
        });
    }
    for (index, item) in items.iter().enumerate() {
        check(item).map_err(|source| ContentError::InvalidItem {
            lesson: lesson.to_string(),
            index,
            source: Box::new(source),
        })?;
    }
    Ok(())
}

impl Lesson {
    pub fn validate(&self) -> Result<(), ContentError> {
        match &self.practice {
            ExerciseSet::Sequence { items } => validate_all(&self.id, items, validate_sequence),
            ExerciseSet::Blank { items } => validate_all(&self.id, items, validate_blank),
            ExerciseSet::Select { items } => validate_all(&self.id, items, validate_select),
            ExerciseSet::Classify { items } => validate_all(&self.id, items, validate_classify),
        }
    }
}
