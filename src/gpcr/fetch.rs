use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{GpcrError, Result};
use crate::types::GeneName;

// the per-receptor files a front end may hold on to between views
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Alignment,
    Conservation,
    OrthologAlignment,
    SnakePlot,
}

/// Read the text of a source file.  Any failure is reported as a
/// Transport error naming the path.
pub async fn read_source(path: &str) -> Result<String> {
    debug!("reading {}", path);

    tokio::fs::read_to_string(path).await
        .map_err(|source| GpcrError::Transport {
            path: path.to_owned(),
            source,
        })
}

/// Read three source files concurrently, eg. an alignment and the
/// conservation files of two receptors.
pub async fn read_source_triple(first_path: &str, second_path: &str, third_path: &str)
    -> Result<(String, String, String)>
{
    tokio::try_join!(read_source(first_path), read_source(second_path),
                     read_source(third_path))
}

/// Source texts keyed by receptor and file kind, so that switching between
/// views of the same receptor doesn't read the files again.  The workflows
/// in `analysis` take texts or paths and never cache; an interactive caller
/// that redraws views keeps one of these and passes the texts in.
#[derive(Debug, Default)]
pub struct SourceCache {
    texts: HashMap<(GeneName, FileKind), Arc<str>>,
}

impl SourceCache {
    pub fn new() -> SourceCache {
        SourceCache::default()
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn get(&self, gene_name: &GeneName, kind: FileKind) -> Option<Arc<str>> {
        self.texts.get(&(gene_name.clone(), kind)).cloned()
    }

    pub fn insert(&mut self, gene_name: GeneName, kind: FileKind, text: String) -> Arc<str> {
        let text: Arc<str> = text.into();
        self.texts.insert((gene_name, kind), text.clone());
        text
    }

    pub async fn fetch(&mut self, gene_name: &GeneName, kind: FileKind, path: &str)
        -> Result<Arc<str>>
    {
        if let Some(text) = self.get(gene_name, kind) {
            debug!("cached {:?} for {}", kind, gene_name);
            return Ok(text);
        }

        let text = read_source(path).await?;

        Ok(self.insert(gene_name.clone(), kind, text))
    }
}

#[cfg(test)]
fn temp_source(name: &str, contents: &str) -> String {
    let path = std::env::temp_dir().join(format!("gpcr-fetch-{}-{}", std::process::id(), name));
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[tokio::test]
async fn test_read_source() {
    let path = temp_source("read.txt", "1\t90\tM\n");
    assert_eq!(read_source(&path).await.unwrap(), "1\t90\tM\n");

    let missing = read_source("/nonexistent/gpcr/file.fasta").await;
    match missing {
        Err(GpcrError::Transport { path, .. }) => assert_eq!(path, "/nonexistent/gpcr/file.fasta"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn test_read_source_triple_fails_as_one() {
    let path = temp_source("triple.txt", ">x\nAC\n");

    let (first, second, third) = read_source_triple(&path, &path, &path).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(second, third);

    assert!(read_source_triple(&path, "/nonexistent/gpcr/other", &path).await.is_err());
}

#[tokio::test]
async fn test_source_cache() {
    let path = temp_source("cache.txt", "first");
    let gene_name: GeneName = "HTR1A".into();
    let mut cache = SourceCache::new();

    let text = cache.fetch(&gene_name, FileKind::Conservation, &path).await.unwrap();
    assert_eq!(&*text, "first");

    std::fs::write(&path, "second").unwrap();

    let text = cache.fetch(&gene_name, FileKind::Conservation, &path).await.unwrap();
    assert_eq!(&*text, "first");

    let text = cache.fetch(&gene_name, FileKind::SnakePlot, &path).await.unwrap();
    assert_eq!(&*text, "second");

    assert_eq!(cache.len(), 2);
    assert!(cache.get(&gene_name, FileKind::Alignment).is_none());
}
