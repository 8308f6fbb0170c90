//! Exchange bundle: the static data handed to the native runtime.
//!
//! Every static extension becomes one record file plus the descriptor the
//! code generator needs to declare, load and access it. Records are in
//! canonical order, so the same task always yields the same bytes.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use blake3::Hasher;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;
use crate::extension::{ExtensionDescriptor, StaticExtension};
use crate::index::ObjectIndex;

/// Records of one static symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeFile {
    /// Symbol the records belong to.
    pub symbol: String,
    /// `<identifier>.<extension>`.
    pub file_name: String,
    /// Records in canonical order.
    pub records: Vec<String>,
}

impl ExchangeFile {
    /// File contents: one record per line, newline-terminated.
    #[must_use]
    pub fn contents(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            out.push_str(record);
            out.push('\n');
        }
        out
    }
}

/// All exchange files and descriptors of a task, keyed by symbol name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeBundle {
    files: BTreeMap<String, ExchangeFile>,
    descriptors: BTreeMap<String, ExtensionDescriptor>,
}

impl ExchangeBundle {
    /// Serializes every extension against `objects`.
    ///
    /// Returns `ValidationError::UnknownObject` if an extension mentions a
    /// name that is not indexed, and `ValidationError::IdentifierCollision`
    /// if two symbols normalize to the same native identifier.
    pub fn build(
        extensions: &BTreeMap<String, StaticExtension>,
        objects: &ObjectIndex,
        data_extension: &str,
    ) -> Result<Self, ValidationError> {
        let mut bundle = Self::default();
        let mut issued: HashMap<String, &str> = HashMap::new();
        for (symbol, extension) in extensions {
            let descriptor = extension.descriptor();
            if let Some(first) = issued.insert(descriptor.identifier().to_string(), symbol) {
                return Err(ValidationError::IdentifierCollision {
                    first: first.to_string(),
                    second: symbol.clone(),
                    identifier: descriptor.identifier().to_string(),
                });
            }
            let file = ExchangeFile {
                symbol: symbol.clone(),
                file_name: descriptor.data_file(data_extension),
                records: extension.serialize(objects)?,
            };
            bundle.files.insert(symbol.clone(), file);
            bundle.descriptors.insert(symbol.clone(), descriptor);
        }
        debug!(files = bundle.files.len(), "built exchange bundle");
        Ok(bundle)
    }

    /// Files in symbol order.
    pub fn files(&self) -> impl Iterator<Item = &ExchangeFile> {
        self.files.values()
    }

    /// Descriptors in symbol order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ExtensionDescriptor> {
        self.descriptors.values()
    }

    /// Each file with its descriptor, in symbol order.
    pub fn entries(&self) -> impl Iterator<Item = (&ExchangeFile, &ExtensionDescriptor)> {
        self.files
            .iter()
            .filter_map(|(symbol, file)| self.descriptors.get(symbol).map(|d| (file, d)))
    }

    /// File of the given symbol.
    #[must_use]
    pub fn get(&self, symbol: &str) -> Option<&ExchangeFile> {
        self.files.get(symbol)
    }

    /// Descriptor of the given symbol.
    #[must_use]
    pub fn descriptor(&self, symbol: &str) -> Option<&ExtensionDescriptor> {
        self.descriptors.get(symbol)
    }

    /// Number of files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True if the task has no static data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Hex blake3 digest over every file name and record, in symbol order.
    #[must_use]
    pub fn digest(&self) -> String {
        let mut h = Hasher::new();
        for file in self.files.values() {
            h.update(file.file_name.as_bytes());
            h.update(&[0]);
            for record in &file.records {
                h.update(record.as_bytes());
                h.update(b"\n");
            }
            h.update(&[0]);
        }
        h.finalize().to_hex().to_string()
    }

    /// Writes every exchange file into `dir`, which must exist. Returns
    /// the written paths.
    pub fn write_to(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.files.len());
        for file in self.files.values() {
            let path = dir.join(&file.file_name);
            fs::write(&path, file.contents())?;
            written.push(path);
        }
        debug!(dir = %dir.display(), files = written.len(), "wrote exchange files");
        Ok(written)
    }
}
