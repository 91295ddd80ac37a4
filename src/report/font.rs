use crate::report::ReportError;
use ab_glyph::FontVec;
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The only typeface the report may use. Other fonts would render CJK copy as tofu.
pub const DEFAULT_FONT_PATH: &str = "fonts/SourceHanSansTC-Normal.otf";

pub struct FontResource {
    path: PathBuf,
    font: FontVec,
}

impl std::fmt::Debug for FontResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontResource")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl FontResource {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReportError> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(ReportError::FontNotFound { path });
        }
        let bytes = std::fs::read(&path).map_err(|source| ReportError::FontIo {
            path: path.clone(),
            source,
        })?;
        let font =
            FontVec::try_from_vec(bytes).map_err(|_| ReportError::InvalidFont { path: path.clone() })?;
        tracing::debug!("Loaded report font {}", path.display());
        Ok(Self { path, font })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn font(&self) -> &FontVec {
        &self.font
    }
}

/// Loads the font on first use. Failures are not cached.
#[derive(Debug)]
pub struct FontCache {
    path: PathBuf,
    cell: OnceCell<Arc<FontResource>>,
}

impl FontCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Result<Arc<FontResource>, ReportError> {
        self.cell
            .get_or_try_init(|| FontResource::load(&self.path).map(Arc::new))
            .cloned()
    }
}

#[cfg(test)]
pub(crate) fn fixture_font_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/DejaVuSans.ttf")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_font_fails_loudly() {
        let err = FontResource::load("/nowhere/fonts/SourceHanSansTC-Normal.otf").unwrap_err();
        assert!(matches!(err, ReportError::FontNotFound { .. }));
        assert!(err
            .to_string()
            .contains("/nowhere/fonts/SourceHanSansTC-Normal.otf"));
    }

    #[test]
    fn test_garbage_font_is_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not an otf").unwrap();
        assert!(matches!(
            FontResource::load(file.path()),
            Err(ReportError::InvalidFont { .. })
        ));
    }

    #[test]
    fn test_cache_retries_after_failure_and_reuses_success() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("report.ttf");
        let cache = FontCache::new(&target);

        assert!(cache.get().is_err());

        std::fs::copy(fixture_font_path(), &target).unwrap();
        let first = cache.get().unwrap();
        let second = cache.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.path(), target.as_path());
    }
}
