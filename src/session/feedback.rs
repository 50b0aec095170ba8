use std::collections::HashSet;

use crate::engine::Target;

/// Transient feedback for the current item. Dropped on every index change.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Feedback {
    pub celebrating: bool,
    marks: HashSet<Target>,
}

impl Feedback {
    pub fn celebrate(&mut self) {
        self.celebrating = true;
    }

    pub fn clear_celebration(&mut self) {
        self.celebrating = false;
    }

    pub fn mark(&mut self, target: Target) {
        self.marks.insert(target);
    }

    pub fn clear_mark(&mut self, target: Target) {
        self.marks.remove(&target);
    }

    pub fn is_marked(&self, target: Target) -> bool {
        self.marks.contains(&target)
    }

    pub fn has_marks(&self) -> bool {
        !self.marks.is_empty()
    }

    pub fn is_clear(&self) -> bool {
        !self.celebrating && self.marks.is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
