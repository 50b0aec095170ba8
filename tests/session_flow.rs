use std::cell::Cell;
use std::rc::Rc;

use grammr::content::{ClassifyItem, Fragment, SelectItem, SequenceItem, WordToken};
use grammr::engine::shuffle::ScriptedShuffler;
use grammr::engine::{
    Classifier, EntityId, Interaction, Mistake, Outcome, SentenceBuilder, SlotId, Target, WordSelector,
};
use grammr::session::view::EntityStatus;
use grammr::session::{Controller, ControllerOptions, ManualClock};

fn sequence(words: &[&str], correct: &[&str]) -> SequenceItem {
    SequenceItem {
        prompt: None,
        words: words
            .iter()
            .map(|w| WordToken {
                text: w.to_string(),
                gloss: None,
            })
            .collect(),
        correct: correct.iter().map(|w| w.to_string()).collect(),
    }
}

fn apples() -> SequenceItem {
    sequence(&["I", "like", "apples"], &["I", "like", "apples"])
}

fn parts() -> ClassifyItem {
    let fragment = |text: &str, category: &str| Fragment {
        text: text.to_string(),
        category: category.to_string(),
    };
    ClassifyItem {
        prompt: "The old dog barked loudly.".to_string(),
        fragments: vec![
            fragment("The old dog", "subject"),
            fragment("barked", "verb"),
            fragment("loudly", "adverb"),
        ],
        slots: vec!["subject".to_string(), "verb".to_string(), "adverb".to_string()],
    }
}

fn nouns() -> SelectItem {
    SelectItem {
        sentence: "The cat chased the dog.".to_string(),
        targets: vec!["cat".to_string(), "dog".to_string()],
        category: "noun".to_string(),
        hint: String::new(),
    }
}

fn drop_into(c: &mut Controller<Classifier>, fragment: usize, slot: usize) -> Option<Outcome> {
    c.interact(Interaction::DropInto(EntityId(fragment), SlotId(slot)))
}

struct Harness<S: grammr::engine::AnswerStrategy> {
    controller: Controller<S>,
    clock: ManualClock,
    completions: Rc<Cell<u32>>,
}

fn harness<S: grammr::engine::AnswerStrategy + 'static>(
    items: Vec<S::Item>,
    script: Vec<Vec<usize>>,
) -> Harness<S> {
    let clock = ManualClock::new();
    let completions = Rc::new(Cell::new(0));
    let counter = Rc::clone(&completions);
    let controller = Controller::<S>::new(items, Box::new(ScriptedShuffler::new(script)))
        .unwrap()
        .with_clock(Rc::new(clock.clone()))
        .with_options(ControllerOptions::default())
        .on_complete(move || counter.set(counter.get() + 1));
    Harness {
        controller,
        clock,
        completions,
    }
}

fn pool_labels(c: &Controller<SentenceBuilder>) -> Vec<String> {
    let item = c.item().unwrap();
    c.answer()
        .unwrap()
        .pool
        .iter()
        .map(|id| item.words[id.0].text.clone())
        .collect()
}

fn click(c: &mut Controller<SentenceBuilder>, label: &str) -> Option<Outcome> {
    let item = c.item().unwrap();
    let id = c
        .answer()
        .unwrap()
        .pool
        .iter()
        .copied()
        .find(|id| item.words[id.0].text == label)
        .unwrap();
    c.interact(Interaction::Select(id))
}

#[test]
fn test_end_to_end_single_item() {
    let mut h = harness::<SentenceBuilder>(vec![apples()], vec![vec![2, 0, 1]]);
    assert_eq!(pool_labels(&h.controller), vec!["apples", "I", "like"]);

    assert_eq!(click(&mut h.controller, "I"), None);
    assert_eq!(click(&mut h.controller, "like"), None);
    assert_eq!(click(&mut h.controller, "apples"), Some(Outcome::Correct));
    assert!(h.controller.feedback().celebrating);
    assert!(h.controller.is_locked());

    h.clock.advance_ms(249);
    h.controller.tick();
    assert!(!h.controller.is_completed());

    h.clock.advance_ms(1);
    assert!(h.controller.tick());
    assert!(h.controller.is_completed());
    assert!(h.controller.item().is_none());
    assert_eq!(h.controller.progress(), 100);
    // Completion is handed over by the host's proceed control.
    assert_eq!(h.completions.get(), 0);
    assert!(h.controller.proceed());
    assert_eq!(h.completions.get(), 1);
}

#[test]
fn test_failure_rebuilds_with_fresh_shuffle() {
    let mut h = harness::<SentenceBuilder>(vec![apples()], vec![vec![2, 0, 1], vec![1, 2, 0]]);

    click(&mut h.controller, "apples");
    click(&mut h.controller, "I");
    let outcome = click(&mut h.controller, "like");
    assert!(matches!(outcome, Some(Outcome::Incorrect(m)) if m.target == Target::Builder));
    assert!(h.controller.feedback().is_marked(Target::Builder));
    assert!(h.controller.is_locked());

    // Locked until the rebuild lands.
    assert_eq!(h.controller.interact(Interaction::Deselect(EntityId(0))), None);

    h.clock.advance_ms(1200);
    assert!(h.controller.tick());
    assert!(h.controller.feedback().is_clear());
    assert!(!h.controller.is_locked());
    assert!(h.controller.answer().unwrap().built.is_empty());
    assert_eq!(pool_labels(&h.controller), vec!["like", "apples", "I"]);
    assert_eq!(h.controller.index(), 0);
}

#[test]
fn test_session_needs_one_success_per_item() {
    let items = vec![
        sequence(&["a", "b"], &["a", "b"]),
        sequence(&["c", "d"], &["c", "d"]),
        sequence(&["e", "f"], &["e", "f"]),
    ];
    let script = vec![vec![1, 0]; 12];
    let mut h = harness::<SentenceBuilder>(items, script);

    let mut successes = 0;
    for attempt in 0.. {
        if h.controller.is_completed() {
            break;
        }
        let item = h.controller.item().unwrap().clone();
        let index = h.controller.index();
        let wrong = attempt % 2 == 0;
        let order: Vec<&str> = if wrong {
            item.correct.iter().rev().map(String::as_str).collect()
        } else {
            item.correct.iter().map(String::as_str).collect()
        };
        let mut outcome = None;
        for label in order {
            outcome = click(&mut h.controller, label);
        }
        match outcome {
            Some(Outcome::Correct) => {
                successes += 1;
                h.clock.advance_ms(250);
            }
            _ => {
                h.clock.advance_ms(1200);
            }
        }
        h.controller.tick();
        if wrong {
            assert_eq!(h.controller.index(), index);
        }
        assert!(attempt < 20);
    }
    assert_eq!(successes, 3);
}

#[test]
fn test_jump_to_same_index_twice_gives_same_state() {
    let items = vec![apples(), sequence(&["x", "y"], &["x", "y"])];
    let mut h = harness::<SentenceBuilder>(
        items,
        vec![vec![2, 0, 1], vec![1, 0], vec![2, 0, 1], vec![2, 0, 1]],
    );
    click(&mut h.controller, "apples");
    h.controller.jump_to(1);

    assert!(h.controller.jump_to(0));
    let first = h.controller.answer().cloned();
    let first_feedback = h.controller.feedback().is_clear();
    assert!(h.controller.jump_to(0));
    assert_eq!(h.controller.answer().cloned(), first);
    assert_eq!(h.controller.feedback().is_clear(), first_feedback);
    assert!(first.unwrap().built.is_empty());
}

#[test]
fn test_word_select_needs_every_target() {
    let mut h = harness::<WordSelector>(vec![nouns()], Vec::new());

    // "cat" twice never satisfies the item.
    assert_eq!(h.controller.interact(Interaction::Select(EntityId(1))), None);
    assert_eq!(h.controller.interact(Interaction::Select(EntityId(1))), None);
    assert!(!h.controller.is_solved());

    assert_eq!(
        h.controller.interact(Interaction::Select(EntityId(4))),
        Some(Outcome::Correct)
    );
    assert!(h.controller.is_solved());
}

#[test]
fn test_incomplete_answer_is_never_evaluated() {
    let mut h = harness::<SentenceBuilder>(vec![apples()], vec![vec![2, 0, 1]]);
    let before = h.controller.feedback().is_clear();

    click(&mut h.controller, "apples");
    assert_eq!(h.controller.submit(), None);
    click(&mut h.controller, "I");
    assert_eq!(h.controller.submit(), None);

    assert_eq!(h.controller.feedback().is_clear(), before);
    assert_eq!(h.controller.pending_timers(), 0);
    assert!(!h.controller.is_locked());
}

#[test]
fn test_completion_fires_once_under_rapid_input() {
    let mut h = harness::<SentenceBuilder>(vec![apples()], vec![vec![2, 0, 1]]);
    click(&mut h.controller, "I");
    click(&mut h.controller, "like");
    click(&mut h.controller, "apples");

    // Double submit while the advance is pending.
    assert_eq!(h.controller.submit(), None);
    assert!(h.controller.advance_if_ready());
    assert!(h.controller.is_completed());
    assert!(h.controller.advance_if_ready());
    assert!(!h.controller.advance_if_ready());
    assert!(!h.controller.proceed());

    // The scheduled advance is stale by now.
    h.clock.advance_ms(2000);
    assert!(!h.controller.tick());
    assert_eq!(h.completions.get(), 1);
}

#[test]
fn test_wrong_drop_returns_to_pool_after_shake() {
    let mut h = harness::<Classifier>(vec![parts()], Vec::new());
    let slot = Target::Slot(SlotId(1));

    assert_eq!(drop_into(&mut h.controller, 0, 0), None);
    assert_eq!(
        drop_into(&mut h.controller, 2, 1),
        Some(Outcome::Incorrect(Mistake::at(slot)))
    );
    assert!(h.controller.feedback().is_marked(slot));
    // A shake does not lock input.
    assert!(!h.controller.is_locked());

    h.clock.advance_ms(799);
    h.controller.tick();
    assert!(h.controller.feedback().is_marked(slot));
    assert_eq!(h.controller.answer().unwrap().occupant(SlotId(1)), Some(EntityId(2)));

    h.clock.advance_ms(1);
    assert!(h.controller.tick());
    let placement = h.controller.answer().unwrap();
    assert!(h.controller.feedback().is_clear());
    assert_eq!(placement.occupant(SlotId(0)), Some(EntityId(0)));
    assert_eq!(placement.occupant(SlotId(1)), None);
    assert_eq!(placement.pool, vec![EntityId(1), EntityId(2)]);
}

#[test]
fn test_correct_drop_clears_earlier_mistake_on_slot() {
    let mut h = harness::<Classifier>(vec![parts()], Vec::new());
    drop_into(&mut h.controller, 2, 1);
    h.clock.advance_ms(100);

    assert_eq!(drop_into(&mut h.controller, 1, 1), None);
    assert!(!h.controller.feedback().is_marked(Target::Slot(SlotId(1))));
    assert_eq!(h.controller.pending_timers(), 0);

    let item = h.controller.view().item.unwrap();
    let verb = &item.slots[1];
    assert_eq!(verb.status, EntityStatus::Correct);
    assert_eq!(verb.occupant.as_ref().map(|o| o.label.as_str()), Some("barked"));

    h.clock.advance_ms(800);
    h.controller.tick();
    assert_eq!(h.controller.answer().unwrap().occupant(SlotId(1)), Some(EntityId(1)));
    assert_eq!(h.controller.view().item.unwrap().slots[1].status, EntityStatus::Correct);
}

#[test]
fn test_second_wrong_drop_gets_its_own_shake() {
    let mut h = harness::<Classifier>(vec![parts()], Vec::new());
    let slot = Target::Slot(SlotId(1));
    drop_into(&mut h.controller, 2, 1);

    h.clock.advance_ms(700);
    assert_eq!(
        drop_into(&mut h.controller, 0, 1),
        Some(Outcome::Incorrect(Mistake::at(slot)))
    );
    assert_eq!(h.controller.pending_timers(), 1);

    // The first drop's shake would have ended here.
    h.clock.advance_ms(110);
    h.controller.tick();
    assert!(h.controller.feedback().is_marked(slot));
    assert_eq!(h.controller.answer().unwrap().occupant(SlotId(1)), Some(EntityId(0)));

    h.clock.advance_ms(690);
    assert!(h.controller.tick());
    assert!(!h.controller.feedback().is_marked(slot));
    let placement = h.controller.answer().unwrap();
    assert_eq!(placement.occupant(SlotId(1)), None);
    assert!(placement.pool.contains(&EntityId(0)));
    assert!(placement.pool.contains(&EntityId(2)));
}

#[test]
fn test_rejected_word_keeps_found_targets() {
    let mut h = harness::<WordSelector>(vec![nouns()], Vec::new());
    let chased = Target::Entity(EntityId(2));

    assert_eq!(h.controller.interact(Interaction::Select(EntityId(1))), None);
    assert_eq!(
        h.controller.interact(Interaction::Select(EntityId(2))),
        Some(Outcome::Incorrect(Mistake::at(chased)))
    );
    assert!(h.controller.feedback().is_marked(chased));

    // Clicking the same wrong word again restarts its shake.
    h.clock.advance_ms(700);
    h.controller.interact(Interaction::Select(EntityId(2)));
    h.clock.advance_ms(110);
    h.controller.tick();
    assert!(h.controller.feedback().is_marked(chased));

    h.clock.advance_ms(690);
    assert!(h.controller.tick());
    assert!(h.controller.feedback().is_clear());
    assert!(h.controller.answer().unwrap().found.contains("cat"));
    assert!(!h.controller.is_solved());

    assert_eq!(
        h.controller.interact(Interaction::Select(EntityId(4))),
        Some(Outcome::Correct)
    );
}
