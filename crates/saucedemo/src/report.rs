// Report - artifact sinks for failed tests
//
// The fixture hands one screenshot per failing test to an `ArtifactSink`.
// Any sink honoring "accept one image blob keyed by test name" can be
// substituted.

use crate::error::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Manifest file `DirectorySink` appends to
pub const MANIFEST_FILE: &str = "attachments.jsonl";

/// Content type of an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Png,
}

impl ContentType {
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Png => "image/png",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ContentType::Png => "png",
        }
    }
}

/// One named binary artifact belonging to a test
#[derive(Debug, Clone)]
pub struct Attachment {
    pub test_name: String,
    pub label: String,
    pub content_type: ContentType,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Screenshot attachment as produced on test failure
    pub fn screenshot(test_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            test_name: test_name.into(),
            label: "screenshot".to_string(),
            content_type: ContentType::Png,
            bytes,
        }
    }
}

/// Destination for failure artifacts
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    async fn attach(&self, attachment: Attachment) -> Result<()>;
}

/// Turns a test name into a safe file stem.
pub fn artifact_file_stem(test_name: &str) -> String {
    let stem: String = test_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem.is_empty() {
        "unnamed".to_string()
    } else {
        stem
    }
}

#[derive(Serialize)]
struct ManifestEntry<'a> {
    test: &'a str,
    label: &'a str,
    content_type: &'a str,
    path: &'a Path,
}

/// Writes attachments to a directory and records them in a JSON-lines manifest.
#[derive(Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    // Serializes file naming and manifest appends between concurrent tests
    manifest: tokio::sync::Mutex<()>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            manifest: tokio::sync::Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DirectorySink {
    // Claims a file no earlier attachment used. Names that sanitize to the same
    // stem get a numeric suffix: `cart__remove.png`, `cart__remove-2.png`, ...
    async fn create_unique(&self, stem: &str, extension: &str) -> Result<(PathBuf, tokio::fs::File)> {
        let mut attempt = 1u32;
        loop {
            let file_name = if attempt == 1 {
                format!("{}.{}", stem, extension)
            } else {
                format!("{}-{}.{}", stem, attempt, extension)
            };
            let path = self.dir.join(file_name);
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl ArtifactSink for DirectorySink {
    async fn attach(&self, attachment: Attachment) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        // Held from file creation through the manifest append
        let _guard = self.manifest.lock().await;

        let (path, mut file) = self
            .create_unique(
                &artifact_file_stem(&attachment.test_name),
                attachment.content_type.extension(),
            )
            .await?;
        file.write_all(&attachment.bytes).await?;
        file.flush().await?;

        let entry = ManifestEntry {
            test: &attachment.test_name,
            label: &attachment.label,
            content_type: attachment.content_type.mime(),
            path: &path,
        };
        let mut line = serde_json::to_string(&entry)
            .map_err(|e| Error::Report(format!("failed to encode manifest entry: {}", e)))?;
        line.push('\n');

        let mut manifest = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(MANIFEST_FILE))
            .await?;
        manifest.write_all(line.as_bytes()).await?;
        manifest.flush().await?;

        tracing::info!(
            test = %attachment.test_name,
            path = %path.display(),
            "Attached {}",
            attachment.label
        );
        Ok(())
    }
}

/// Keeps attachments in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    attachments: Mutex<Vec<Attachment>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything attached so far
    pub fn attachments(&self) -> Vec<Attachment> {
        self.attachments.lock().clone()
    }

    /// Attachments recorded for `test_name`
    pub fn for_test(&self, test_name: &str) -> Vec<Attachment> {
        self.attachments
            .lock()
            .iter()
            .filter(|a| a.test_name == test_name)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn attach(&self, attachment: Attachment) -> Result<()> {
        self.attachments.lock().push(attachment);
        Ok(())
    }
}
