// Library target: the lesson content model, answer strategies and the practice
// session engine. The terminal front end in main.rs builds on top of it, and the
// integration tests and criterion benchmarks import it as `grammr::*`.

pub mod config;
pub mod content;
pub mod engine;
pub mod narrator;
pub mod session;
