use std::rc::Rc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use grammr::content::{LessonLibrary, SelectItem, SequenceItem, WordToken};
use grammr::engine::normalize::{sentence_tokens, token_key};
use grammr::engine::shuffle::{RngShuffler, Shuffler, arrange};
use grammr::engine::{AnswerStrategy, EntityId, Interaction, SentenceBuilder, WordSelector};
use grammr::session::{Controller, ManualClock};

fn long_sequence(len: usize) -> SequenceItem {
    let words: Vec<String> = (0..len).map(|i| format!("word{i}")).collect();
    SequenceItem {
        prompt: None,
        words: words
            .iter()
            .map(|w| WordToken {
                text: w.clone(),
                gloss: None,
            })
            .collect(),
        correct: words,
    }
}

fn bench_arrange(c: &mut Criterion) {
    let labels: Vec<String> = (0..12).map(|i| format!("w{i}")).collect();
    let correct = labels.clone();
    let mut shuffler = RngShuffler::seeded(11);

    c.bench_function("arrange (12 words, avoid correct)", |b| {
        b.iter(|| arrange(&mut shuffler, black_box(&labels), &[correct.as_slice()]))
    });
}

fn bench_sequence_evaluate(c: &mut Criterion) {
    let item = long_sequence(20);
    let mut shuffler = RngShuffler::seeded(3);
    let mut answer = SentenceBuilder::fresh(&item, &mut shuffler);
    for id in 0..item.words.len() {
        SentenceBuilder::apply(&item, &mut answer, Interaction::Select(EntityId(id)));
    }

    c.bench_function("sentence evaluate (20 words)", |b| {
        b.iter(|| SentenceBuilder::evaluate(black_box(&item), black_box(&answer)))
    });
}

fn bench_token_keys(c: &mut Criterion) {
    let sentence = "The quick, brown fox jumps over the lazy dog; then it naps. Café-owners don't mind!";

    c.bench_function("token keys of a sentence", |b| {
        b.iter(|| {
            sentence_tokens(black_box(sentence))
                .into_iter()
                .map(token_key)
                .collect::<Vec<_>>()
        })
    });
}

fn bench_controller_round(c: &mut Criterion) {
    let items: Vec<SelectItem> = (0..10)
        .map(|i| SelectItem {
            sentence: format!("The cat number {i} chased the dog."),
            targets: vec!["cat".to_string(), "dog.".to_string()],
            category: "noun".to_string(),
            hint: String::new(),
        })
        .collect();

    c.bench_function("word select session (10 items)", |b| {
        b.iter(|| {
            let clock = ManualClock::new();
            let mut controller =
                Controller::<WordSelector>::new(items.clone(), Box::new(RngShuffler::seeded(1)))
                    .unwrap()
                    .with_clock(Rc::new(clock.clone()));
            while !controller.is_completed() {
                controller.interact(Interaction::Select(EntityId(1)));
                controller.interact(Interaction::Select(EntityId(6)));
                controller.advance_if_ready();
            }
            controller.revision()
        })
    });
}

fn bench_library_load(c: &mut Criterion) {
    c.bench_function("load bundled lessons", |b| {
        b.iter(|| LessonLibrary::bundled().map(|l| l.len()))
    });
}

fn bench_shuffler(c: &mut Criterion) {
    let mut shuffler = RngShuffler::seeded(5);
    c.bench_function("permutation (32)", |b| b.iter(|| shuffler.permutation(black_box(32))));
}

criterion_group!(
    benches,
    bench_arrange,
    bench_sequence_evaluate,
    bench_token_keys,
    bench_controller_round,
    bench_library_load,
    bench_shuffler
);
criterion_main!(benches);
