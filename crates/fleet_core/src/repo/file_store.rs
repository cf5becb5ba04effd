//! Whole-collection file storage in JSON or YAML.
//!
//! # Responsibility
//! - Read a file into validated entities and write a collection back.
//!
//! # Invariants
//! - A missing or blank file reads as an empty collection.
//! - Writes replace the whole file; parent directories are created.
//! - Text is UTF-8 with non-ASCII characters written unescaped.

use crate::model::Entity;
use crate::repo::error::RepoResult;
use log::{error, info};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;

const JSON_INDENT: &[u8] = b"    ";

/// Serialization format of a file store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl Display for FileFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    format: FileFormat,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>, format: FileFormat) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format,
        }
    }

    pub fn json(path: impl AsRef<Path>) -> Self {
        Self::new(path, FileFormat::Json)
    }

    pub fn yaml(path: impl AsRef<Path>) -> Self {
        Self::new(path, FileFormat::Yaml)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> FileFormat {
        self.format
    }

    /// Reads every record; each one passes through entity validation.
    pub fn read_all<E: Entity>(&self) -> RepoResult<Vec<E>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let entities = match self.format {
            FileFormat::Json => serde_json::from_str(&text)?,
            FileFormat::Yaml => serde_yaml::from_str(&text)?,
        };
        Ok(entities)
    }

    /// Overwrites the file with `entities` in their current order.
    pub fn write_all<E: Entity>(&self, entities: &[E]) -> RepoResult<()> {
        let started_at = Instant::now();
        let result = self.encode(entities).and_then(|text| {
            if let Some(dir) = self.path.parent() {
                if !dir.as_os_str().is_empty() {
                    fs::create_dir_all(dir)?;
                }
            }
            fs::write(&self.path, text)?;
            Ok(())
        });

        match &result {
            Ok(()) => info!(
                "event=file_save module=repo status=ok format={} entity={} count={} duration_ms={}",
                self.format,
                E::KIND,
                entities.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=file_save module=repo status=error format={} entity={} duration_ms={} error={}",
                self.format,
                E::KIND,
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }

    fn encode<E: Entity>(&self, entities: &[E]) -> RepoResult<String> {
        match self.format {
            FileFormat::Json => {
                let mut buffer = Vec::new();
                let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
                let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
                entities.serialize(&mut serializer)?;
                buffer.push(b'\n');
                // serde_json emits UTF-8 only.
                Ok(String::from_utf8_lossy(&buffer).into_owned())
            }
            FileFormat::Yaml => Ok(serde_yaml::to_string(entities)?),
        }
    }
}
