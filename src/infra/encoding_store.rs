// ============================================================
// Layer 6 — Encoding Store
// ============================================================
// Persists the character vocabulary as JSON.
//
// Training, resumed training and sampling must all agree on
// which index means which character, so the vocabulary is
// read from a fixed file rather than rebuilt from whatever
// corpus happens to be passed in. Building is only done on
// explicit request, when no vocabulary file exists yet.
//
// Reference: serde_json documentation

use anyhow::{bail, Context, Result};
use std::{fs, path::PathBuf};

use crate::domain::encoding::OneHotEncoding;

pub struct EncodingStore {
    path: PathBuf,
}

impl EncodingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the saved vocabulary
    pub fn load(&self) -> Result<OneHotEncoding> {
        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Cannot read encoding '{}'", self.path.display()))?;
        let enc: OneHotEncoding = serde_json::from_str(&json)
            .with_context(|| format!("Malformed encoding '{}'", self.path.display()))?;
        tracing::info!("Loaded encoding with {} symbols", enc.len());
        Ok(enc)
    }

    /// Load the saved vocabulary, or, when `build_if_missing` is set and
    /// nothing is saved yet, build one from `records` and save it.
    pub fn load_or_build(&self, records: &[String], build_if_missing: bool) -> Result<OneHotEncoding> {
        if self.exists() {
            return self.load();
        }
        if !build_if_missing {
            bail!(
                "Encoding '{}' does not exist (pass --build-encoding to create it from the corpus)",
                self.path.display()
            );
        }

        let enc = OneHotEncoding::build(records.iter().map(String::as_str), true, true);
        tracing::info!("Built encoding with {} symbols from the corpus", enc.len());
        self.save(&enc)?;
        Ok(enc)
    }

    pub fn save(&self, enc: &OneHotEncoding) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(enc)?)
            .with_context(|| format!("Cannot write encoding '{}'", self.path.display()))?;
        tracing::debug!("Saved encoding to '{}'", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_encoding_without_build_is_an_error() {
        let dir   = tempfile::tempdir().unwrap();
        let store = EncodingStore::new(dir.path().join("enc.json"));
        let err   = store.load_or_build(&["abc".to_string()], false).unwrap_err();
        assert!(err.to_string().contains("--build-encoding"));
    }

    #[test]
    fn test_build_saves_and_later_loads_the_same_vocabulary() {
        let dir   = tempfile::tempdir().unwrap();
        let store = EncodingStore::new(dir.path().join("data").join("enc.json"));

        let built = store.load_or_build(&["hello".to_string()], true).unwrap();
        assert!(store.exists());
        assert_eq!(built.start_token(), Some(0));

        // a different corpus does not change the saved vocabulary
        let loaded = store.load_or_build(&["xyz".to_string()], true).unwrap();
        assert_eq!(loaded.len(), built.len());
        assert_eq!(loaded.index_of('o'), built.index_of('o'));
        assert_eq!(loaded.index_of('x'), None);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("enc.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(EncodingStore::new(path).load().is_err());
    }
}
