use std::cell::Cell;
use std::rc::Rc;

use ratatui::layout::Rect;
use tracing::{info, warn};

use grammr::config::Config;
use grammr::content::{ExerciseKind, Lesson, LessonLibrary};
use grammr::engine::shuffle::{RngShuffler, Shuffler};
use grammr::engine::{EntityId, SlotId};
use grammr::narrator::{CommandNarrator, Explainer, Narrator, SilentNarrator, TracingNarrator};
use grammr::session::view::{ItemView, PracticeEvent, PracticeView, PromptView};
use grammr::session::{Clock, PracticeSession, SystemClock, open};

use crate::ui::components::menu::Menu;
use crate::ui::components::practice_area::position_for;
use crate::ui::components::progress_dots;
use crate::ui::gesture::{Gesture, SwipeTracker};
use crate::ui::layout::PracticeLayout;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Lesson,
    Practice,
    Finished,
}

pub struct App {
    pub screen: AppScreen,
    pub library: LessonLibrary,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub lesson_index: usize,
    pub example_index: usize,
    pub practice: Option<Box<dyn PracticeSession>>,
    /// Cached view of the running practice session.
    pub view: Option<PracticeView>,
    /// Fragment picked up for a drop (classification).
    pub held: Option<EntityId>,
    pub popup: Option<String>,
    pub swipe: SwipeTracker,
    pub screen_area: Rect,
    pub should_quit: bool,
    proceed: Rc<Cell<bool>>,
    narrator: Box<dyn Narrator>,
    clock: Rc<dyn Clock>,
    sessions_started: u64,
}

fn narrator_for(config: &Config) -> Box<dyn Narrator> {
    if !config.narrate_examples {
        return Box::new(SilentNarrator);
    }
    match config.narrator_command.as_deref().and_then(CommandNarrator::new) {
        Some(narrator) => Box::new(narrator),
        None => Box::new(TracingNarrator),
    }
}

impl App {
    pub fn new(config: Config, library: LessonLibrary, theme: Theme) -> Self {
        let theme: &'static Theme = Box::leak(Box::new(theme));
        let menu = Menu::new(&library, theme);
        let swipe = SwipeTracker::new(config.swipe_threshold);
        let narrator = narrator_for(&config);

        Self {
            screen: AppScreen::Menu,
            library,
            menu,
            theme,
            config,
            lesson_index: 0,
            example_index: 0,
            practice: None,
            view: None,
            held: None,
            popup: None,
            swipe,
            screen_area: Rect::default(),
            should_quit: false,
            proceed: Rc::new(Cell::new(false)),
            narrator,
            clock: Rc::new(SystemClock),
            sessions_started: 0,
        }
    }

    pub fn lesson(&self) -> Option<&Lesson> {
        self.library.get(self.lesson_index)
    }

    pub fn go_to_menu(&mut self) {
        self.close_practice();
        self.menu.selected = self.lesson_index.min(self.library.len().saturating_sub(1));
        self.screen = AppScreen::Menu;
    }

    pub fn open_lesson(&mut self, index: usize) {
        if index >= self.library.len() {
            return;
        }
        self.close_practice();
        self.lesson_index = index;
        self.example_index = 0;
        self.popup = None;
        self.screen = AppScreen::Lesson;
        if let Some(lesson) = self.lesson() {
            info!(id = %lesson.id, "opened lesson");
        }
        self.narrate_example();
    }

    pub fn next_example(&mut self) {
        let count = self.lesson().map_or(0, |l| l.examples.len());
        if self.example_index + 1 < count {
            self.example_index += 1;
            self.narrate_example();
        }
    }

    pub fn prev_example(&mut self) {
        if self.example_index > 0 {
            self.example_index -= 1;
            self.narrate_example();
        }
    }

    pub fn narrate_example(&mut self) {
        let Some(text) = self
            .lesson()
            .and_then(|l| l.examples.get(self.example_index))
            .map(|e| e.text.clone())
        else {
            return;
        };
        self.narrator.speak(&text);
    }

    fn shuffler(&mut self) -> Box<dyn Shuffler> {
        self.sessions_started += 1;
        match self.config.seed {
            Some(seed) => Box::new(RngShuffler::seeded(seed.wrapping_add(self.sessions_started))),
            None => Box::new(RngShuffler::from_entropy()),
        }
    }

    pub fn start_practice(&mut self) {
        let Some(set) = self.lesson().map(|l| l.practice.clone()) else {
            return;
        };
        self.close_practice();
        self.proceed.set(false);
        let signal = Rc::clone(&self.proceed);
        let shuffler = self.shuffler();
        match open(
            &set,
            self.config.controller_options(),
            Rc::clone(&self.clock),
            shuffler,
            move || signal.set(true),
        ) {
            Ok(session) => {
                self.view = Some(session.view());
                self.practice = Some(session);
                self.screen = AppScreen::Practice;
            }
            // Library lessons are validated on load, so this only trips on a bug.
            Err(err) => warn!(%err, "could not start practice"),
        }
    }

    fn close_practice(&mut self) {
        if let Some(mut session) = self.practice.take() {
            session.dispose();
        }
        self.view = None;
        self.held = None;
        self.swipe.cancel();
    }

    fn refresh_view(&mut self) {
        self.view = self.practice.as_ref().map(|p| p.view());
    }

    /// Forward an event to the running session and pick up host navigation.
    pub fn dispatch(&mut self, event: PracticeEvent) {
        let changed = match self.practice.as_mut() {
            Some(session) => session.handle(event),
            None => return,
        };
        if changed {
            self.refresh_view();
        }
        self.follow_completion();
    }

    pub fn tick(&mut self) {
        let changed = self.practice.as_mut().is_some_and(|p| p.tick());
        if changed {
            self.refresh_view();
            if self.view.as_ref().is_some_and(|v| v.item.is_none()) {
                self.held = None;
            }
        }
        self.follow_completion();
    }

    fn follow_completion(&mut self) {
        if !self.proceed.replace(false) {
            return;
        }
        let next = self.lesson_index + 1;
        if next < self.library.len() {
            self.open_lesson(next);
        } else {
            self.close_practice();
            self.screen = AppScreen::Finished;
            info!("all lessons finished");
        }
    }

    fn current_item(&self) -> Option<&ItemView> {
        self.view.as_ref().and_then(|v| v.item.as_ref())
    }

    fn kind(&self) -> Option<ExerciseKind> {
        self.view.as_ref().map(|v| v.kind)
    }

    /// A letter key on the practice screen: pick the pool entry with that hotkey.
    pub fn press_letter(&mut self, key: char) {
        let Some(position) = position_for(key) else {
            return;
        };
        let Some(id) = self.current_item().and_then(|i| i.pool.get(position)).map(|e| e.id) else {
            return;
        };
        if self.kind() == Some(ExerciseKind::Classify) {
            self.held = if self.held == Some(id) { None } else { Some(id) };
        } else {
            self.dispatch(PracticeEvent::Select(id));
        }
    }

    /// A digit key: drop the held fragment into that slot, or send a wrong
    /// occupant back to the pool.
    pub fn press_digit(&mut self, digit: u32) {
        if self.kind() != Some(ExerciseKind::Classify) || digit == 0 {
            return;
        }
        let slot = SlotId(digit as usize - 1);
        match self.held.take() {
            Some(id) => self.dispatch(PracticeEvent::DropInto(id, slot)),
            None => {
                let occupant = self
                    .current_item()
                    .and_then(|i| i.slots.get(slot.0))
                    .and_then(|s| s.occupant.as_ref())
                    .map(|o| o.id);
                if let Some(id) = occupant {
                    self.dispatch(PracticeEvent::Deselect(id));
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        if self.held.take().is_some() {
            return;
        }
        let last = match self.current_item() {
            Some(item) if matches!(item.prompt, PromptView::Assemble { .. }) => {
                item.placed.last().map(|e| e.id)
            }
            _ => None,
        };
        if let Some(id) = last {
            self.dispatch(PracticeEvent::Deselect(id));
        }
    }

    /// Enter: check the answer, or move on once solved or complete.
    pub fn confirm(&mut self) {
        let ready = self.view.as_ref().is_some_and(|v| v.completed || v.solved);
        if ready {
            self.dispatch(PracticeEvent::AdvanceIfReady);
        } else {
            self.dispatch(PracticeEvent::Check);
        }
    }

    pub fn jump_relative(&mut self, forward: bool) {
        let Some(view) = self.view.as_ref() else {
            return;
        };
        let target = if forward {
            view.index + 1
        } else {
            match view.index.checked_sub(1) {
                Some(i) => i,
                None => return,
            }
        };
        self.held = None;
        self.dispatch(PracticeEvent::JumpTo(target));
    }

    pub fn jump_to(&mut self, index: usize) {
        self.held = None;
        self.dispatch(PracticeEvent::JumpTo(index));
    }

    pub fn retreat(&mut self) {
        self.held = None;
        self.dispatch(PracticeEvent::Retreat);
    }

    pub fn mouse_down(&mut self, column: u16, row: u16) {
        self.swipe.press(column, row);
    }

    pub fn mouse_up(&mut self, column: u16, row: u16) {
        if self.screen != AppScreen::Practice {
            self.swipe.cancel();
            return;
        }
        match self.swipe.release(column, row) {
            Some(Gesture::SwipeLeft) => self.dispatch(PracticeEvent::AdvanceIfReady),
            Some(Gesture::SwipeRight) => self.retreat(),
            Some(Gesture::Tap { column, row }) => {
                let total = self.view.as_ref().map_or(0, |v| v.total);
                let dots = PracticeLayout::new(self.screen_area).dots;
                if let Some(index) = progress_dots::hit(dots, total, column, row) {
                    self.jump_to(index);
                }
            }
            None => {}
        }
    }

    /// Hint for the current item plus glossary entries for what it asks about.
    pub fn open_explanation(&mut self) {
        let Some(lesson) = self.lesson() else {
            return;
        };
        let mut parts: Vec<String> = Vec::new();

        if self.screen == AppScreen::Practice {
            if let Some(item) = self.current_item() {
                if let Some(hint) = &item.hint {
                    parts.push(format!("Hint: {hint}"));
                }
                let mut keys: Vec<String> = Vec::new();
                match &item.prompt {
                    PromptView::Select { category } => keys.push(category.clone()),
                    PromptView::Classify { .. } => keys.extend(item.slots.iter().map(|s| s.label.clone())),
                    _ => {}
                }
                if let Some(kind) = self.kind() {
                    keys.push(kind.as_str().to_string());
                }
                for key in keys {
                    if let Some(text) = lesson.explain(&key) {
                        parts.push(format!("{key}: {text}"));
                    }
                }
            }
        } else {
            parts.extend(lesson.glossary.iter().map(|(term, text)| format!("{term}: {text}")));
        }

        if parts.is_empty() {
            parts.push("Nothing to explain here.".to_string());
        }
        self.popup = Some(parts.join("\n\n"));
    }

    pub fn close_popup(&mut self) -> bool {
        self.popup.take().is_some()
    }
}
