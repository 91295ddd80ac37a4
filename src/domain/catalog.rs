use crate::domain::models::{Chapter, SpiceOption};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("chapter catalog not found at {path}")]
    NotFound { path: PathBuf },
    #[error("failed to read chapter catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed chapter catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("chapter catalog contains no chapters")]
    Empty,
    #[error("item id {id} appears more than once in the catalog")]
    DuplicateItem { id: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct Catalog {
    pub chapters: Vec<Chapter>,
}

impl Catalog {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CatalogError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let chapters: Vec<Chapter> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let catalog = Self::from_chapters(chapters)?;
        tracing::info!(
            "Loaded catalog {}: {} chapters, {} items",
            path.display(),
            catalog.chapters.len(),
            catalog.item_count()
        );
        Ok(catalog)
    }

    pub fn from_chapters(chapters: Vec<Chapter>) -> Result<Self, CatalogError> {
        if chapters.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for item in chapters.iter().flat_map(|ch| ch.items.iter()) {
            if !seen.insert(item.id.as_str()) {
                return Err(CatalogError::DuplicateItem {
                    id: item.id.clone(),
                });
            }
        }
        Ok(Self { chapters })
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    pub fn item_count(&self) -> usize {
        self.chapters.iter().map(|ch| ch.items.len()).sum()
    }

    /// Union of every chapter's spice options, first-seen order, last definition wins.
    pub fn spice_options(&self) -> Vec<SpiceOption> {
        let mut options: Vec<SpiceOption> = Vec::new();
        for opt in self.chapters.iter().flat_map(|ch| ch.spice_options.iter()) {
            match options.iter_mut().find(|o| o.code == opt.code) {
                Some(existing) => *existing = opt.clone(),
                None => options.push(opt.clone()),
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {"chapter_id": 1, "title": "晨間", "context": "清晨的香氣",
         "spice_options": [{"code": "berg", "label": "佛手柑", "desc": "明亮"}],
         "items": [
            {"id": 1, "trait": "Extraversion", "keyed": "plus", "question_theme": "主動打招呼"},
            {"id": 2, "trait": "Openness", "keyed": "minus", "question_theme": "固定香水"}
         ]},
        {"chapter_id": 2, "title": "午後", "context": "",
         "spice_options": [{"code": "berg", "label": "佛手柑", "desc": "清新"},
                           {"code": "vani", "label": "香草"}],
         "items": [
            {"id": 3, "trait": "Neuroticism", "question_theme": "排隊焦慮"}
         ]}
    ]"#;

    #[test]
    fn test_load_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let catalog = Catalog::load(file.path()).unwrap();
        assert_eq!(catalog.chapter_count(), 2);
        assert_eq!(catalog.item_count(), 3);
        assert_eq!(catalog.chapter(1).unwrap().title, "午後");
    }

    #[test]
    fn test_missing_catalog_names_path() {
        let err = Catalog::load("/definitely/not/here/chapter.json").unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { .. }));
        assert!(err.to_string().contains("/definitely/not/here/chapter.json"));
    }

    #[test]
    fn test_malformed_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(matches!(
            Catalog::load(file.path()),
            Err(CatalogError::Parse { .. })
        ));
    }

    #[test]
    fn test_empty_and_duplicate_catalogs_rejected() {
        assert!(matches!(
            Catalog::from_chapters(vec![]),
            Err(CatalogError::Empty)
        ));

        let mut chapters: Vec<Chapter> = serde_json::from_str(SAMPLE).unwrap();
        chapters[1].items[0].id = "1".into();
        match Catalog::from_chapters(chapters) {
            Err(CatalogError::DuplicateItem { id }) => assert_eq!(id, "1"),
            other => panic!("expected duplicate error, got {:?}", other.map(|c| c.chapter_count())),
        }
    }

    #[test]
    fn test_bundled_catalog_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/chapter.json");
        let catalog = Catalog::load(path).unwrap();
        assert_eq!(catalog.chapter_count(), 12);
        assert_eq!(catalog.item_count(), 48);
        for t in crate::domain::models::Trait::ALL {
            assert!(catalog
                .chapters
                .iter()
                .flat_map(|ch| ch.items.iter())
                .any(|it| it.trait_ == t));
        }
    }

    #[test]
    fn test_spice_options_union() {
        let chapters: Vec<Chapter> = serde_json::from_str(SAMPLE).unwrap();
        let catalog = Catalog::from_chapters(chapters).unwrap();
        let options = catalog.spice_options();
        let codes: Vec<&str> = options.iter().map(|o| o.code.as_str()).collect();
        assert_eq!(codes, vec!["berg", "vani"]);
        assert_eq!(options[0].desc, "清新");
        assert_eq!(options[1].desc, "");
    }
}
