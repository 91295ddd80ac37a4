use crate::domain::catalog::Catalog;
use crate::domain::models::{Answers, Chapter};
use crate::domain::scoring::{MAX_RESPONSE, MIN_RESPONSE};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SAVE_FILE_NAME: &str = "last_saved_session.json";
pub const MAX_SPICES: usize = 3;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("item {id} is not part of chapter {chapter_id}")]
    UnknownItem { id: String, chapter_id: String },
    #[error("chapter {chapter_id} is missing answers for items: {}", .ids.join(", "))]
    MissingItems { chapter_id: String, ids: Vec<String> },
    #[error("answer {value} for item {id} is outside 1-5")]
    OutOfRange { id: String, value: i32 },
    #[error("unknown spice option {code}")]
    UnknownSpice { code: String },
    #[error("quiz already completed")]
    AlreadyCompleted,
    #[error("session file io: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file format: {0}")]
    Format(#[from] serde_json::Error),
}

/// The literal save file written by "save and leave".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionSnapshot {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub started_at: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub saved_at: DateTime<Utc>,
    #[serde(rename = "page_idx")]
    pub page_index: usize,
    pub answers: Answers,
    #[serde(rename = "global_spices", default)]
    pub selected_spices: Vec<String>,
}

/// Accepts RFC 3339 timestamps and offset-less ISO 8601 ones, which are read as UTC.
fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|n| n.and_utc()),
    }
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterProgress {
    pub page_idx: usize,
    pub total_chapters: usize,
    pub answered: usize,
    pub completed: bool,
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    pub started_at: DateTime<Utc>,
    pub page_index: usize,
    pub answers: Answers,
    pub selected_spices: Vec<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_active: DateTime<Utc>,
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            page_index: 0,
            answers: Answers::new(),
            selected_spices: Vec::new(),
            completed_at: None,
            last_active: now,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn current_chapter<'a>(&self, catalog: &'a Catalog) -> Option<&'a Chapter> {
        catalog.chapter(self.page_index)
    }

    pub fn progress(&self, catalog: &Catalog) -> ChapterProgress {
        ChapterProgress {
            page_idx: self.page_index,
            total_chapters: catalog.chapter_count(),
            answered: self.answers.len(),
            completed: self.is_completed(),
        }
    }

    /// Records answers for the current chapter and moves to the next one.
    /// Answers persist across chapters; resubmitting an item overwrites it.
    /// Every item of the chapter must end up answered, either by this
    /// submission or by an earlier one (e.g. a restored save).
    pub fn submit_chapter(
        &mut self,
        catalog: &Catalog,
        submitted: &Answers,
    ) -> Result<ChapterProgress, SessionError> {
        if self.is_completed() {
            return Err(SessionError::AlreadyCompleted);
        }
        let chapter = self
            .current_chapter(catalog)
            .ok_or(SessionError::AlreadyCompleted)?;

        for (id, value) in submitted {
            if !chapter.items.iter().any(|it| &it.id == id) {
                return Err(SessionError::UnknownItem {
                    id: id.clone(),
                    chapter_id: chapter.chapter_id.clone(),
                });
            }
            if !(MIN_RESPONSE..=MAX_RESPONSE).contains(value) {
                return Err(SessionError::OutOfRange {
                    id: id.clone(),
                    value: *value,
                });
            }
        }

        let missing: Vec<String> = chapter
            .items
            .iter()
            .filter(|it| !submitted.contains_key(&it.id) && !self.answers.contains_key(&it.id))
            .map(|it| it.id.clone())
            .collect();
        if !missing.is_empty() {
            return Err(SessionError::MissingItems {
                chapter_id: chapter.chapter_id.clone(),
                ids: missing,
            });
        }

        self.answers
            .extend(submitted.iter().map(|(k, v)| (k.clone(), *v)));
        self.last_active = Utc::now();

        if self.page_index + 1 < catalog.chapter_count() {
            self.page_index += 1;
        } else {
            self.completed_at = Some(Utc::now());
        }
        Ok(self.progress(catalog))
    }

    /// Keeps at most the first three known spice codes.
    pub fn select_spices(
        &mut self,
        catalog: &Catalog,
        codes: &[String],
    ) -> Result<Vec<String>, SessionError> {
        let known = catalog.spice_options();
        if let Some(code) = codes.iter().find(|c| !known.iter().any(|o| &o.code == *c)) {
            return Err(SessionError::UnknownSpice { code: code.clone() });
        }
        if codes.len() > MAX_SPICES {
            tracing::warn!(
                "{} spices selected, keeping the first {}",
                codes.len(),
                MAX_SPICES
            );
        }
        self.selected_spices = codes.iter().take(MAX_SPICES).cloned().collect();
        self.last_active = Utc::now();
        Ok(self.selected_spices.clone())
    }

    pub fn snapshot(&self, saved_at: DateTime<Utc>) -> SessionSnapshot {
        SessionSnapshot {
            started_at: self.started_at,
            saved_at,
            page_index: self.page_index,
            answers: self.answers.clone(),
            selected_spices: self.selected_spices.clone(),
        }
    }

    /// Rebuilds an in-progress session; the page index is clamped to the catalog.
    pub fn from_snapshot(snapshot: SessionSnapshot, catalog: &Catalog) -> Self {
        let last_page = catalog.chapter_count().saturating_sub(1);
        Self {
            started_at: snapshot.started_at,
            page_index: snapshot.page_index.min(last_page),
            answers: snapshot.answers,
            selected_spices: snapshot.selected_spices,
            completed_at: None,
            last_active: Utc::now(),
        }
    }
}

pub fn save_snapshot(dir: &Path, snapshot: &SessionSnapshot) -> Result<PathBuf, SessionError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(SAVE_FILE_NAME);
    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(&path, json)?;
    tracing::info!("Saved quiz progress to {}", path.display());
    Ok(path)
}

pub fn load_snapshot(dir: &Path) -> Result<SessionSnapshot, SessionError> {
    let raw = std::fs::read_to_string(dir.join(SAVE_FILE_NAME))?;
    Ok(serde_json::from_str(&raw)?)
}
