use std::rc::Rc;

use crate::content::{ExerciseKind, ExerciseSet};
use crate::engine::shuffle::Shuffler;
use crate::engine::{Classifier, FillInBlank, SentenceBuilder, WordSelector};
use crate::session::clock::Clock;
use crate::session::controller::{Controller, ControllerOptions};
use crate::session::view::{PracticeEvent, PracticeView, PresentItem};
use crate::session::SessionError;

/// A running practice session of any exercise kind.
pub trait PracticeSession {
    fn kind(&self) -> ExerciseKind;
    fn view(&self) -> PracticeView;
    fn handle(&mut self, event: PracticeEvent) -> bool;
    fn tick(&mut self) -> bool;
    fn proceed(&mut self) -> bool;
    fn is_completed(&self) -> bool;
    fn dispose(&mut self);
}

impl<S: PresentItem> PracticeSession for Controller<S> {
    fn kind(&self) -> ExerciseKind {
        S::KIND
    }

    fn view(&self) -> PracticeView {
        Controller::view(self)
    }

    fn handle(&mut self, event: PracticeEvent) -> bool {
        Controller::handle(self, event)
    }

    fn tick(&mut self) -> bool {
        Controller::tick(self)
    }

    fn proceed(&mut self) -> bool {
        Controller::proceed(self)
    }

    fn is_completed(&self) -> bool {
        Controller::is_completed(self)
    }

    fn dispose(&mut self) {
        Controller::dispose(self)
    }
}

fn build<S: PresentItem + 'static>(
    items: Vec<S::Item>,
    options: ControllerOptions,
    clock: Rc<dyn Clock>,
    shuffler: Box<dyn Shuffler>,
    on_complete: impl FnMut() + 'static,
) -> Result<Box<dyn PracticeSession>, SessionError> {
    let controller = Controller::<S>::new(items, shuffler)?
        .with_clock(clock)
        .with_options(options)
        .on_complete(on_complete);
    Ok(Box::new(controller))
}

/// Start a session for a lesson's practice block, picking the strategy from its kind.
pub fn open(
    set: &ExerciseSet,
    options: ControllerOptions,
    clock: Rc<dyn Clock>,
    shuffler: Box<dyn Shuffler>,
    on_complete: impl FnMut() + 'static,
) -> Result<Box<dyn PracticeSession>, SessionError> {
    match set {
        ExerciseSet::Sequence { items } => {
            build::<SentenceBuilder>(items.clone(), options, clock, shuffler, on_complete)
        }
        ExerciseSet::Blank { items } => {
            build::<FillInBlank>(items.clone(), options, clock, shuffler, on_complete)
        }
        ExerciseSet::Select { items } => {
            build::<WordSelector>(items.clone(), options, clock, shuffler, on_complete)
        }
        ExerciseSet::Classify { items } => {
            build::<Classifier>(items.clone(), options, clock, shuffler, on_complete)
        }
    }
}
