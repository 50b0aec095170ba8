use std::rc::Rc;
use std::time::Duration;

use tracing::{debug, info, trace};

use crate::engine::shuffle::Shuffler;
use crate::engine::{AnswerStrategy, Interaction, Mistake, Outcome, Step, Target};
use crate::session::clock::{Clock, SystemClock};
use crate::session::feedback::Feedback;
use crate::session::timers::{TimerAction, Timers, Visit};
use crate::session::SessionError;

/// Delays of the automatic transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timing {
    /// Correct answer to next item.
    pub advance: Duration,
    /// How long the celebration stays up. Does not hold back the advance.
    pub celebrate: Duration,
    /// Mistake to retry, for strategies that keep partial progress.
    pub shake: Duration,
    /// Mistake to retry, for strategies that rebuild the whole answer.
    pub rebuild: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            advance: Duration::from_millis(250),
            celebrate: Duration::from_millis(1500),
            shake: Duration::from_millis(800),
            rebuild: Duration::from_millis(1200),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerOptions {
    pub timing: Timing,
    /// Evaluate as soon as the answer is complete instead of waiting for a check.
    pub auto_check: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            timing: Timing::default(),
            auto_check: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pending {
    Idle,
    /// Solved; waiting for the advance timer.
    Advance,
    /// Wrong; the answer is thrown away when the recover timer fires.
    Rebuild,
}

/// Drives one practice session over an ordered item list.
///
/// The controller is `InProgress` at some index until the last item is solved,
/// then `Completed`. Completed is terminal: only [`Controller::replace_items`]
/// starts over. Delayed transitions are queued with the visit they belong to and
/// applied by [`Controller::tick`].
pub struct Controller<S: AnswerStrategy> {
    items: Vec<S::Item>,
    index: usize,
    generation: u64,
    answer: Option<S::Answer>,
    feedback: Feedback,
    pending: Pending,
    completed: bool,
    completion_fired: bool,
    disposed: bool,
    revision: u64,
    timers: Timers,
    clock: Rc<dyn Clock>,
    shuffler: Box<dyn Shuffler>,
    options: ControllerOptions,
    on_complete: Option<Box<dyn FnMut()>>,
}

fn check_items<S: AnswerStrategy>(items: &[S::Item]) -> Result<(), SessionError> {
    if items.is_empty() {
        return Err(SessionError::Empty);
    }
    for (index, item) in items.iter().enumerate() {
        S::validate(item).map_err(|source| SessionError::InvalidItem { index, source })?;
    }
    Ok(())
}

impl<S: AnswerStrategy> Controller<S> {
    pub fn new(items: Vec<S::Item>, shuffler: Box<dyn Shuffler>) -> Result<Self, SessionError> {
        check_items::<S>(&items)?;
        let mut controller = Self {
            items,
            index: 0,
            generation: 0,
            answer: None,
            feedback: Feedback::default(),
            pending: Pending::Idle,
            completed: false,
            completion_fired: false,
            disposed: false,
            revision: 0,
            timers: Timers::new(),
            clock: Rc::new(SystemClock),
            shuffler,
            options: ControllerOptions::default(),
            on_complete: None,
        };
        controller.enter(0);
        info!(kind = S::KIND.as_str(), items = controller.items.len(), "practice session started");
        Ok(controller)
    }

    pub fn with_clock(mut self, clock: Rc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_options(mut self, options: ControllerOptions) -> Self {
        self.options = options;
        self
    }

    /// Host callback for leaving a completed session. Runs at most once.
    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    fn visit(&self) -> Visit {
        Visit {
            index: self.index,
            generation: self.generation,
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn enter(&mut self, index: usize) {
        self.timers.cancel_all();
        self.index = index;
        self.generation += 1;
        self.answer = Some(S::fresh(&self.items[index], self.shuffler.as_mut()));
        self.feedback.reset();
        self.pending = Pending::Idle;
        self.touch();
        debug!(index, generation = self.generation, "entered item");
    }

    fn complete(&mut self) {
        self.timers.cancel_all();
        self.generation += 1;
        self.answer = None;
        self.feedback.reset();
        self.pending = Pending::Idle;
        self.completed = true;
        self.touch();
        info!(kind = S::KIND.as_str(), items = self.items.len(), "practice session completed");
    }

    fn is_open(&self) -> bool {
        !self.disposed && !self.completed
    }

    fn settle(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Correct => self.succeed(),
            Outcome::Incorrect(mistake) => self.fail(mistake),
        }
    }

    fn succeed(&mut self) {
        let visit = self.visit();
        let now = self.clock.now();
        let timing = self.options.timing;
        self.feedback.celebrate();
        self.pending = Pending::Advance;
        self.timers.schedule(visit, now + timing.advance, TimerAction::Advance);
        self.timers.schedule(visit, now + timing.celebrate, TimerAction::ClearCelebration);
        self.touch();
        debug!(index = self.index, "answer correct");
    }

    fn fail(&mut self, mistake: Mistake) {
        let visit = self.visit();
        let timing = self.options.timing;
        let delay = if S::REBUILD_ON_MISTAKE {
            self.pending = Pending::Rebuild;
            timing.rebuild
        } else {
            timing.shake
        };
        // A repeated mistake on the same target restarts its shake.
        self.timers.cancel_where(|action| *action == TimerAction::Recover(mistake));
        self.feedback.mark(mistake.target);
        self.timers.schedule(visit, self.clock.now() + delay, TimerAction::Recover(mistake));
        self.touch();
        debug!(index = self.index, mark = ?mistake.target, "answer incorrect");
    }

    /// The target now holds a good answer: drop its mark and pending recovery.
    fn forgive(&mut self, target: Target) {
        let mistake = Mistake::at(target);
        self.timers.cancel_where(|action| *action == TimerAction::Recover(mistake));
        self.feedback.clear_mark(target);
    }

    fn recover(&mut self, mistake: Mistake) {
        if let Some(answer) = self.answer.as_mut() {
            S::recover(&self.items[self.index], answer, &mistake, self.shuffler.as_mut());
        }
        self.feedback.clear_mark(mistake.target);
        if self.pending == Pending::Rebuild {
            self.pending = Pending::Idle;
        }
        self.touch();
    }

    /// Apply a learner action to the current answer. Returns the outcome when the
    /// action led to an evaluation.
    pub fn interact(&mut self, interaction: Interaction) -> Option<Outcome> {
        if !self.is_open() || self.is_locked() {
            return None;
        }
        let step = {
            let answer = self.answer.as_mut()?;
            S::apply(&self.items[self.index], answer, interaction)
        };
        match step {
            Step::Ignored => None,
            Step::Rejected(mistake) => {
                self.fail(mistake);
                Some(Outcome::Incorrect(mistake))
            }
            Step::Updated => {
                if let Interaction::DropInto(_, slot) = interaction {
                    self.forgive(Target::Slot(slot));
                }
                self.touch();
                if self.options.auto_check {
                    self.submit()
                } else {
                    None
                }
            }
        }
    }

    /// Explicit check. Does nothing while the answer is incomplete.
    pub fn submit(&mut self) -> Option<Outcome> {
        if !self.is_open() || self.is_locked() {
            return None;
        }
        let answer = self.answer.as_ref()?;
        let item = &self.items[self.index];
        if !S::is_complete(item, answer) {
            return None;
        }
        let outcome = S::evaluate(item, answer);
        self.settle(outcome);
        Some(outcome)
    }

    /// Apply every timer that is due, oldest first. Returns whether anything changed.
    pub fn tick(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        let before = self.revision;
        let now = self.clock.now();
        while let Some((visit, action)) = self.timers.pop_due(now) {
            if visit != self.visit() || self.completed {
                trace!(?visit, ?action, "discarded stale timer");
                continue;
            }
            match action {
                TimerAction::Advance => self.advance(),
                TimerAction::Recover(mistake) => self.recover(mistake),
                TimerAction::ClearCelebration => {
                    self.feedback.clear_celebration();
                    self.touch();
                }
            }
        }
        self.revision != before
    }

    /// Next item, or `Completed` after the last one. Only reached from a solved item.
    fn advance(&mut self) {
        if !self.is_open() {
            return;
        }
        if self.index + 1 < self.items.len() {
            self.enter(self.index + 1);
        } else {
            self.complete();
        }
    }

    /// Fresh entry to `index`. Ignored while a solved item waits to advance.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if !self.is_open() || self.pending == Pending::Advance || index >= self.items.len() {
            return false;
        }
        self.enter(index);
        true
    }

    pub fn retreat(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.jump_to(self.index - 1)
    }

    /// Move on without waiting: skips the advance delay of a solved item, and on
    /// a completed session activates the host's proceed control.
    pub fn advance_if_ready(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        if self.completed {
            return self.proceed();
        }
        if self.pending == Pending::Advance {
            self.advance();
            return true;
        }
        false
    }

    /// Hand control back to the host. Fires the completion callback exactly once.
    pub fn proceed(&mut self) -> bool {
        if self.disposed || !self.completed || self.completion_fired {
            return false;
        }
        self.completion_fired = true;
        self.touch();
        if let Some(callback) = self.on_complete.as_mut() {
            callback();
        }
        true
    }

    /// Restart on a new list: index 0, completion armed again.
    pub fn replace_items(&mut self, items: Vec<S::Item>) -> Result<(), SessionError> {
        if self.disposed {
            return Ok(());
        }
        check_items::<S>(&items)?;
        self.items = items;
        self.completed = false;
        self.completion_fired = false;
        self.enter(0);
        info!(kind = S::KIND.as_str(), items = self.items.len(), "practice session restarted");
        Ok(())
    }

    /// Tear down. Pending timers are dropped and every later call is a no-op.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.timers.cancel_all();
        self.on_complete = None;
        self.disposed = true;
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The current item, `None` once completed.
    pub fn item(&self) -> Option<&S::Item> {
        if self.completed {
            None
        } else {
            self.items.get(self.index)
        }
    }

    pub fn answer(&self) -> Option<&S::Answer> {
        self.answer.as_ref()
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Input is closed: waiting to advance, or waiting to rebuild after a mistake.
    pub fn is_locked(&self) -> bool {
        self.pending != Pending::Idle
    }

    /// Whether the current item has been answered correctly.
    pub fn is_solved(&self) -> bool {
        self.pending == Pending::Advance
    }

    /// Percent of the list behind the learner, 100 once completed.
    pub fn progress(&self) -> u16 {
        if self.completed {
            100
        } else {
            (self.index * 100 / self.items.len()) as u16
        }
    }

    /// Bumped on every state change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::content::{BlankItem, Choice, SequenceItem, WordToken};
    use crate::engine::shuffle::ScriptedShuffler;
    use crate::engine::{EntityId, FillInBlank, SentenceBuilder, Target};
    use crate::session::clock::ManualClock;

    fn sentence(words: &[&str]) -> SequenceItem {
        SequenceItem {
            prompt: None,
            words: words
                .iter()
                .map(|w| WordToken {
                    text: w.to_string(),
                    gloss: None,
                })
                .collect(),
            correct: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    fn blank(correct: usize) -> BlankItem {
        BlankItem {
            before: "I have".to_string(),
            after: "apple.".to_string(),
            choices: ["a", "an", "the"]
                .iter()
                .enumerate()
                .map(|(i, t)| Choice {
                    text: t.to_string(),
                    correct: i == correct,
                })
                .collect(),
            hint: String::new(),
        }
    }

    fn builder(items: Vec<SequenceItem>, clock: &ManualClock) -> Controller<SentenceBuilder> {
        // Reversed order is never the answer for these items.
        let script = items
            .iter()
            .map(|item| (0..item.words.len()).rev().collect())
            .collect();
        Controller::<SentenceBuilder>::new(items, Box::new(ScriptedShuffler::new(script)))
            .unwrap()
            .with_clock(Rc::new(clock.clone()))
    }

    fn solve(controller: &mut Controller<SentenceBuilder>) -> Option<Outcome> {
        let item = controller.item().unwrap().clone();
        let mut outcome = None;
        for word in &item.correct {
            let answer = controller.answer().unwrap();
            let id = *answer
                .pool
                .iter()
                .find(|id| item.words[id.0].text == *word)
                .unwrap();
            outcome = controller.interact(Interaction::Select(id));
        }
        outcome
    }

    #[test]
    fn test_empty_list_rejected() {
        let result = Controller::<SentenceBuilder>::new(Vec::new(), Box::new(ScriptedShuffler::identity()));
        assert!(matches!(result, Err(SessionError::Empty)));
    }

    #[test]
    fn test_malformed_item_rejected_with_index() {
        let mut bad = sentence(&["I", "like", "apples"]);
        bad.correct.push("pears".to_string());
        let result = Controller::<SentenceBuilder>::new(
            vec![sentence(&["Hi"]), bad],
            Box::new(ScriptedShuffler::identity()),
        );
        assert!(matches!(result, Err(SessionError::InvalidItem { index: 1, .. })));
    }

    #[test]
    fn test_correct_answer_advances_after_delay() {
        let clock = ManualClock::new();
        let mut c = builder(vec![sentence(&["I", "like", "apples"]), sentence(&["Hello", "there"])], &clock);

        assert_eq!(solve(&mut c), Some(Outcome::Correct));
        assert!(c.feedback().celebrating);
        assert!(c.is_locked());
        assert_eq!(c.index(), 0);

        clock.advance_ms(249);
        assert!(!c.tick());
        assert_eq!(c.index(), 0);

        clock.advance_ms(1);
        assert!(c.tick());
        assert_eq!(c.index(), 1);
        assert!(c.feedback().is_clear());
        assert!(!c.is_locked());
        // The celebration clear belonged to the previous item.
        assert_eq!(c.pending_timers(), 0);
    }

    #[test]
    fn test_incorrect_answer_rebuilds_after_delay() {
        let clock = ManualClock::new();
        let mut c = builder(vec![sentence(&["I", "like", "apples"])], &clock);
        for id in c.answer().unwrap().pool.clone() {
            c.interact(Interaction::Select(id));
        }
        assert!(c.feedback().is_marked(Target::Builder));
        assert!(c.is_locked());
        assert_eq!(c.interact(Interaction::Deselect(EntityId(0))), None);

        clock.advance_ms(1200);
        c.tick();
        assert!(c.feedback().is_clear());
        assert!(!c.is_locked());
        let answer = c.answer().unwrap();
        assert!(answer.built.is_empty());
        assert_eq!(answer.pool.len(), 3);
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn test_submit_gated_on_complete_answer() {
        let clock = ManualClock::new();
        let mut c = builder(vec![sentence(&["I", "like", "apples"])], &clock)
            .with_options(ControllerOptions {
                auto_check: false,
                ..ControllerOptions::default()
            });
        let first = c.answer().unwrap().pool[0];
        c.interact(Interaction::Select(first));
        let revision = c.revision();

        assert_eq!(c.submit(), None);
        assert_eq!(c.revision(), revision);
        assert_eq!(c.pending_timers(), 0);
        assert!(c.feedback().is_clear());
    }

    #[test]
    fn test_manual_check_evaluates() {
        let clock = ManualClock::new();
        let mut c = builder(vec![sentence(&["I", "like", "apples"])], &clock)
            .with_options(ControllerOptions {
                auto_check: false,
                ..ControllerOptions::default()
            });
        assert_eq!(solve(&mut c), None);
        assert_eq!(c.submit(), Some(Outcome::Correct));
        assert_eq!(c.submit(), None);
    }

    #[test]
    fn test_jump_ignored_while_waiting_to_advance() {
        let clock = ManualClock::new();
        let mut c = builder(vec![sentence(&["A", "b"]), sentence(&["C", "d"]), sentence(&["E", "f"])], &clock);
        solve(&mut c);
        assert!(!c.jump_to(2));
        assert!(!c.retreat());
        assert_eq!(c.index(), 0);

        clock.advance_ms(250);
        c.tick();
        assert!(c.jump_to(2));
        assert_eq!(c.index(), 2);
        assert!(c.retreat());
        assert_eq!(c.index(), 1);
    }

    #[test]
    fn test_jump_out_of_range_ignored() {
        let clock = ManualClock::new();
        let mut c = builder(vec![sentence(&["A", "b"])], &clock);
        let revision = c.revision();
        assert!(!c.jump_to(1));
        assert!(!c.retreat());
        assert_eq!(c.revision(), revision);
    }

    #[test]
    fn test_unsolved_item_cannot_be_skipped() {
        let clock = ManualClock::new();
        let mut c = builder(vec![sentence(&["A", "b"]), sentence(&["C", "d"])], &clock);
        let revision = c.revision();
        assert!(!c.advance_if_ready());
        assert!(!c.advance_if_ready());
        assert_eq!(c.index(), 0);
        assert!(!c.is_completed());
        assert_eq!(c.revision(), revision);

        // A wrong answer does not unlock skipping either.
        for id in c.answer().unwrap().pool.clone() {
            c.interact(Interaction::Select(id));
        }
        assert!(c.is_locked());
        assert!(!c.is_solved());
        assert!(!c.advance_if_ready());
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn test_stale_recover_discarded_after_jump() {
        let clock = ManualClock::new();
        let mut c = Controller::<FillInBlank>::new(
            vec![blank(1), blank(0)],
            Box::new(ScriptedShuffler::identity()),
        )
        .unwrap()
        .with_clock(Rc::new(clock.clone()));

        c.interact(Interaction::Select(EntityId(0)));
        assert!(c.feedback().is_marked(Target::Entity(EntityId(0))));
        clock.advance_ms(500);
        assert!(c.jump_to(1));

        // The first item's recover comes due here; this item's does not.
        c.interact(Interaction::Select(EntityId(2)));
        clock.advance_ms(300);
        c.tick();
        assert_eq!(c.index(), 1);
        assert!(c.feedback().is_marked(Target::Entity(EntityId(2))));
        assert_eq!(c.answer().unwrap().chosen, Some(EntityId(2)));
    }

    #[test]
    fn test_completion_fires_once_on_proceed() {
        let clock = ManualClock::new();
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        let mut c = builder(vec![sentence(&["Hi", "there"])], &clock).on_complete(move || counter.set(counter.get() + 1));

        solve(&mut c);
        assert!(c.advance_if_ready());
        assert!(c.is_completed());
        assert_eq!(c.progress(), 100);
        assert_eq!(fired.get(), 0);

        assert!(c.advance_if_ready());
        assert!(!c.advance_if_ready());
        assert!(!c.proceed());
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn test_completed_is_terminal() {
        let clock = ManualClock::new();
        let mut c = builder(vec![sentence(&["Hi", "there"])], &clock);
        solve(&mut c);
        clock.advance_ms(250);
        c.tick();
        assert!(c.is_completed());
        assert!(c.item().is_none());
        assert!(!c.jump_to(0));
        assert!(!c.retreat());
        assert_eq!(c.interact(Interaction::Select(EntityId(0))), None);
        assert_eq!(c.submit(), None);
    }

    #[test]
    fn test_replace_items_restarts() {
        let clock = ManualClock::new();
        let fired = Rc::new(Cell::new(0));
        let counter = Rc::clone(&fired);
        let mut c = builder(vec![sentence(&["Hi", "there"])], &clock).on_complete(move || counter.set(counter.get() + 1));
        solve(&mut c);
        c.advance_if_ready();
        c.proceed();

        c.replace_items(vec![sentence(&["Good", "night"]), sentence(&["Bye", "now"])]).unwrap();
        assert!(!c.is_completed());
        assert_eq!(c.index(), 0);
        assert_eq!(c.len(), 2);
        assert_eq!(c.progress(), 0);

        solve(&mut c);
        c.advance_if_ready();
        solve(&mut c);
        c.advance_if_ready();
        c.proceed();
        assert_eq!(fired.get(), 2);
    }

    #[test]
    fn test_dispose_cancels_timers() {
        let clock = ManualClock::new();
        let mut c = builder(vec![sentence(&["A", "b"]), sentence(&["C", "d"])], &clock);
        solve(&mut c);
        assert!(c.pending_timers() > 0);
        c.dispose();
        assert_eq!(c.pending_timers(), 0);

        clock.advance_ms(5000);
        assert!(!c.tick());
        assert_eq!(c.index(), 0);
        assert!(!c.advance_if_ready());
        assert!(!c.jump_to(1));
    }

    #[test]
    fn test_progress_tracks_index() {
        let clock = ManualClock::new();
        let mut c = builder(
            vec![sentence(&["A", "b"]), sentence(&["C", "d"]), sentence(&["E", "f"]), sentence(&["G", "h"])],
            &clock,
        );
        assert_eq!(c.progress(), 0);
        c.jump_to(1);
        assert_eq!(c.progress(), 25);
        c.jump_to(3);
        assert_eq!(c.progress(), 75);
    }
}
