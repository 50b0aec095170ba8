pub mod validate;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rust_embed::Embed;
use serde::{Deserialize, Serialize};

pub use validate::ContentError;

#[derive(Embed)]
#[folder = "assets/lessons/"]
struct LessonAssets;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseKind {
    Sequence,
    Blank,
    Select,
    Classify,
}

impl ExerciseKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseKind::Sequence => "sequence",
            ExerciseKind::Blank => "blank",
            ExerciseKind::Select => "select",
            ExerciseKind::Classify => "classify",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ExerciseKind::Sequence => "Sentence Builder",
            ExerciseKind::Blank => "Fill in the Blank",
            ExerciseKind::Select => "Word Selector",
            ExerciseKind::Classify => "Sort the Parts",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordToken {
    pub text: String,
    #[serde(default)]
    pub gloss: Option<String>,
}

/// Sentence builder item: arrange `words` into the order given by `correct`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceItem {
    /// Shown above the builder, usually a translation or a cue.
    #[serde(default)]
    pub prompt: Option<String>,
    pub words: Vec<WordToken>,
    pub correct: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    pub text: String,
    #[serde(default)]
    pub correct: bool,
}

/// Fill-in-the-blank item: `before ___ after`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlankItem {
    pub before: String,
    pub after: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub hint: String,
}

/// Word selection item: find every word of `targets` inside `sentence`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectItem {
    pub sentence: String,
    pub targets: Vec<String>,
    pub category: String,
    #[serde(default)]
    pub hint: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub text: String,
    pub category: String,
}

/// Classification item: drop each fragment into the slot named by its category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyItem {
    pub prompt: String,
    pub fragments: Vec<Fragment>,
    pub slots: Vec<String>,
}

/// The practice block of a lesson. Items of different kinds are never mixed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExerciseSet {
    Sequence { items: Vec<SequenceItem> },
    Blank { items: Vec<BlankItem> },
    Select { items: Vec<SelectItem> },
    Classify { items: Vec<ClassifyItem> },
}

impl ExerciseSet {
    pub fn kind(&self) -> ExerciseKind {
        match self {
            ExerciseSet::Sequence { .. } => ExerciseKind::Sequence,
            ExerciseSet::Blank { .. } => ExerciseKind::Blank,
            ExerciseSet::Select { .. } => ExerciseKind::Select,
            ExerciseSet::Classify { .. } => ExerciseKind::Classify,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ExerciseSet::Sequence { items } => items.len(),
            ExerciseSet::Blank { items } => items.len(),
            ExerciseSet::Select { items } => items.len(),
            ExerciseSet::Classify { items } => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub text: String,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub examples: Vec<Example>,
    #[serde(default)]
    pub glossary: BTreeMap<String, String>,
    pub practice: ExerciseSet,
}

impl Lesson {
    /// Parse a lesson from TOML or JSON, picked by the file extension of `name`.
    pub fn parse(name: &str, content: &str) -> Result<Self, ContentError> {
        let lesson: Lesson = if name.ends_with(".toml") {
            toml::from_str(content).map_err(|err| ContentError::Parse {
                name: name.to_string(),
                message: err.to_string(),
            })?
        } else if name.ends_with(".json") {
            serde_json::from_str(content).map_err(|err| ContentError::Parse {
                name: name.to_string(),
                message: err.to_string(),
            })?
        } else {
            return Err(ContentError::UnsupportedFormat {
                name: name.to_string(),
            });
        };
        lesson.validate()?;
        Ok(lesson)
    }

    /// Load and validate a single lesson file.
    pub fn from_file(path: &Path) -> Result<Self, ContentError> {
        let content = fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::parse(&name, &content)
    }
}

/// Ordered collection of lessons: bundled ones first, overlaid by user lessons.
#[derive(Clone, Debug, Default)]
pub struct LessonLibrary {
    lessons: Vec<Lesson>,
}

impl LessonLibrary {
    pub fn bundled() -> Result<Self, ContentError> {
        let mut names: Vec<String> = LessonAssets::iter().map(|n| n.to_string()).collect();
        names.sort();

        let mut lessons = Vec::with_capacity(names.len());
        for name in names {
            let Some(file) = LessonAssets::get(&name) else {
                continue;
            };
            let content = std::str::from_utf8(file.data.as_ref()).map_err(|err| {
                ContentError::Parse {
                    name: name.clone(),
                    message: err.to_string(),
                }
            })?;
            lessons.push(Lesson::parse(&name, content)?);
        }
        tracing::debug!(count = lessons.len(), "loaded bundled lessons");
        Ok(Self { lessons })
    }

    /// Bundled lessons plus every lesson file found in `user_dir` (if it exists).
    pub fn load(user_dir: Option<&Path>) -> Result<Self, ContentError> {
        let mut library = Self::bundled()?;
        if let Some(dir) = user_dir {
            if dir.is_dir() {
                library.overlay_dir(dir)?;
            }
        }
        Ok(library)
    }

    pub fn from_lessons(lessons: Vec<Lesson>) -> Self {
        Self { lessons }
    }

    fn overlay_dir(&mut self, dir: &Path) -> Result<(), ContentError> {
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("toml") | Some("json")
                )
            })
            .collect();
        paths.sort();

        for path in paths {
            let lesson = Lesson::from_file(&path)?;
            tracing::info!(id = %lesson.id, path = %path.display(), "loaded user lesson");
            self.insert(lesson);
        }
        Ok(())
    }

    /// Replace the lesson with the same id, or append.
    pub fn insert(&mut self, lesson: Lesson) {
        match self.lessons.iter().position(|l| l.id == lesson.id) {
            Some(idx) => self.lessons[idx] = lesson,
            None => self.lessons.push(lesson),
        }
    }

    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn get(&self, index: usize) -> Option<&Lesson> {
        self.lessons.get(index)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.lessons.iter().position(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }
}
