//! Page records and the corpus sink
//!
//! The sink accumulates one record per successfully processed page and writes
//! the whole corpus once, at the end of the run, as a pretty-printed JSON
//! array of `{"url": ..., "text": ...}` objects.

use crate::url::PageUrl;
use crate::GleanError;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Indentation used for the corpus file
const JSON_INDENT: &[u8] = b"    ";

/// One output unit: a page address and its extracted text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    url: PageUrl,
    text: String,
}

impl PageRecord {
    pub fn new(url: PageUrl, text: impl Into<String>) -> Self {
        Self {
            url,
            text: text.into(),
        }
    }

    pub fn url(&self) -> &PageUrl {
        &self.url
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Accumulates page records in the order pages finished processing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorpusSink {
    records: Vec<PageRecord>,
}

impl CorpusSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: PageRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[PageRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<PageRecord> {
        self.records
    }

    /// Serializes the corpus the same way [`write_json`](Self::write_json) does
    pub fn to_json_string(&self) -> Result<String, GleanError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer)?;
        // serde_json only emits UTF-8
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Writes the corpus to `path`, creating parent directories as needed
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sumi_glean::output::{CorpusSink, PageRecord};
    /// use sumi_glean::url::PageUrl;
    /// use std::path::Path;
    ///
    /// let mut sink = CorpusSink::new();
    /// sink.push(PageRecord::new(PageUrl::new("https://example.com").unwrap(), "Hello"));
    /// sink.write_json(Path::new("scraped_content.json")).unwrap();
    /// ```
    pub fn write_json(&self, path: &Path) -> Result<(), GleanError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;

        tracing::info!("Wrote {} records to {}", self.records.len(), path.display());
        Ok(())
    }

    fn write_to<W: Write>(&self, writer: W) -> Result<(), GleanError> {
        let formatter = PrettyFormatter::with_indent(JSON_INDENT);
        let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
        self.records.serialize(&mut serializer)?;
        Ok(())
    }
}

impl From<Vec<PageRecord>> for CorpusSink {
    fn from(records: Vec<PageRecord>) -> Self {
        Self { records }
    }
}

/// Reads a corpus previously written by [`CorpusSink::write_json`]
pub fn load_corpus(path: &Path) -> Result<Vec<PageRecord>, GleanError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
