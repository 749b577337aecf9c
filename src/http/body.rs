use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;
use tempfile::TempPath;

use crate::http::headers::HeaderMap;

/// One unit of message payload.
///
/// A request body is a list of parts: a single part for an opaque payload,
/// one per multipart section otherwise. A response carries exactly one part.
/// Small parts live in memory; parts decoded from multipart uploads are
/// spooled to a temp file that is removed when the part is dropped.
#[derive(Debug)]
pub struct BodyPart {
    data: BodyData,
    /// Per-part headers, e.g. `Content-Disposition` from a multipart section.
    pub metadata: HeaderMap,
    temp: Option<TempPath>,
}

#[derive(Debug)]
pub(crate) enum BodyData {
    Memory(Bytes),
    File { file: File, len: u64 },
}

impl BodyPart {
    /// An empty in-memory part.
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// A part backed by bytes already in memory.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            data: BodyData::Memory(bytes.into()),
            metadata: HeaderMap::new(),
            temp: None,
        }
    }

    /// A part backed by an open file. The current file length is captured
    /// here and later reported as `Content-Length`.
    pub fn from_file(file: File) -> io::Result<Self> {
        let len = file.metadata()?.len();
        Ok(Self {
            data: BodyData::File { file, len },
            metadata: HeaderMap::new(),
            temp: None,
        })
    }

    /// A part spooled to a parser-owned temp file. Dropping the part
    /// removes the file.
    pub(crate) fn from_temp_file(
        file: File,
        len: u64,
        path: TempPath,
        metadata: HeaderMap,
    ) -> Self {
        Self {
            data: BodyData::File { file, len },
            metadata,
            temp: Some(path),
        }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> u64 {
        match &self.data {
            BodyData::Memory(bytes) => bytes.len() as u64,
            BodyData::File { len, .. } => *len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when the payload lives on disk rather than in memory.
    pub fn is_file(&self) -> bool {
        matches!(self.data, BodyData::File { .. })
    }

    /// Path of the backing temp file, when there is one.
    pub fn temp_path(&self) -> Option<&Path> {
        self.temp.as_deref()
    }

    /// The filename announced in the part's `Content-Disposition`
    /// metadata, quotes stripped.
    pub fn file_name(&self) -> Option<String> {
        self.metadata
            .first_value_starting_with("Content-Disposition", "filename=")
            .map(|value| value["filename=".len()..].replace('"', "").trim().to_string())
    }

    /// The payload bytes, when held in memory.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.data {
            BodyData::Memory(bytes) => Some(bytes),
            BodyData::File { .. } => None,
        }
    }

    /// Copies the whole payload into a fresh vector, rewinding file-backed
    /// parts first so repeated calls see the same bytes.
    pub fn read_to_vec(&self) -> io::Result<Vec<u8>> {
        match &self.data {
            BodyData::Memory(bytes) => Ok(bytes.to_vec()),
            BodyData::File { file, len } => {
                let mut reader = file;
                reader.seek(SeekFrom::Start(0))?;
                let mut out = Vec::with_capacity(*len as usize);
                reader.read_to_end(&mut out)?;
                Ok(out)
            }
        }
    }

    /// Splits the part into its payload and the temp guard keeping any
    /// backing file alive. Used by the response writer when streaming.
    pub(crate) fn into_data(self) -> (BodyData, Option<TempPath>) {
        (self.data, self.temp)
    }
}

impl Default for BodyPart {
    fn default() -> Self {
        Self::empty()
    }
}
