//! Durable append-only journal for chain entries
//!
//! # File Format
//! ```text
//! [magic "CSJL"][version u32 LE][record][record]...
//! record = [payload_len u32 LE][crc32(payload_len) u32 LE][crc32(payload) u32 LE][payload]
//! payload = bincode(Entry)
//! ```
//!
//! Every append is flushed and synced before it returns. An append that fails
//! part way is truncated back off the file, so the journal only ever holds
//! records the chain has published.
//!
//! On replay, only a record whose payload runs past the end of the file is
//! torn: it is dropped and the file cut back to the last whole record. A
//! length that fails its own checksum, or a payload that fails its checksum,
//! is corruption. The open fails and the file is left as found.

use crate::chain::entry::Entry;
use crate::core::error::{ChainsealError, Result};
use byteorder::{ByteOrder, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const MAGIC: &[u8; 4] = b"CSJL";
const VERSION: u32 = 1;
const HEADER_LEN: u64 = 8;
const FRAME_HEADER_LEN: u64 = 12;

/// Byte sink a journal appends to
pub trait JournalStorage: Write {
    /// Make everything written so far durable
    fn sync(&mut self) -> io::Result<()>;

    /// Cut the storage back to `len` bytes, durably
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl JournalStorage for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)?;
        self.sync_all()
    }
}

/// Append-only entry journal
#[derive(Debug)]
pub struct Journal<S = File> {
    path: PathBuf,
    storage: S,
    /// Length of the committed prefix
    len: u64,
    records: u64,
    poisoned: bool,
}

impl Journal<File> {
    /// Open or create a journal, returning it with the entries it holds
    pub fn open(path: impl AsRef<Path>) -> Result<(Self, Vec<Entry>)> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let header = header_bytes();
        if bytes.len() < header.len() && header.starts_with(&bytes) {
            if !bytes.is_empty() {
                warn!(path = %path.display(), "rewriting journal header cut short by a crash");
                file.set_len(0)?;
            }
            file.write_all(&header)?;
            file.sync_all()?;
            info!(path = %path.display(), "created journal");
            return Ok((Self::with_storage(path, file, HEADER_LEN, 0), Vec::new()));
        }

        check_header(&bytes)?;
        let (entries, valid_len) = replay(&bytes)?;

        if valid_len < bytes.len() as u64 {
            warn!(
                path = %path.display(),
                dropped_bytes = bytes.len() as u64 - valid_len,
                "dropping torn record at journal tail"
            );
            file.set_len(valid_len)?;
            file.sync_all()?;
        }

        info!(path = %path.display(), entries = entries.len(), "replayed journal");
        let records = entries.len() as u64;
        Ok((Self::with_storage(path, file, valid_len, records), entries))
    }
}

impl<S: JournalStorage> Journal<S> {
    /// Wrap storage whose first `len` bytes are a valid journal of `records` records
    pub(crate) fn with_storage(path: PathBuf, storage: S, len: u64, records: u64) -> Self {
        Self {
            path,
            storage,
            len,
            records,
            poisoned: false,
        }
    }

    /// Durably append one entry
    ///
    /// On failure the partial record is truncated away and the same entry
    /// may be appended again. If the truncation fails too, the journal is
    /// poisoned and refuses every later append.
    pub fn append(&mut self, entry: &Entry) -> Result<()> {
        if self.poisoned {
            return Err(ChainsealError::JournalPoisoned {
                reason: format!(
                    "{} may hold unknown bytes past offset {}",
                    self.path.display(),
                    self.len
                ),
            });
        }

        let frame = encode_frame(entry)?;
        if let Err(e) = self.write_frame(&frame) {
            warn!(
                path = %self.path.display(),
                offset = self.len,
                error = %e,
                "journal append failed, rolling back"
            );
            if let Err(rollback) = self.storage.truncate(self.len) {
                self.poisoned = true;
                return Err(ChainsealError::JournalPoisoned {
                    reason: format!("append failed ({}), truncate failed ({})", e, rollback),
                });
            }
            return Err(e.into());
        }

        self.len += frame.len() as u64;
        self.records += 1;
        Ok(())
    }

    /// Number of records in the journal
    pub fn records(&self) -> u64 {
        self.records
    }

    /// Journal file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether a failed append left the journal in an unknown state
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    fn write_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        self.storage.write_all(frame)?;
        self.storage.flush()?;
        self.storage.sync()
    }
}

fn header_bytes() -> [u8; HEADER_LEN as usize] {
    let mut header = [0u8; HEADER_LEN as usize];
    header[..4].copy_from_slice(MAGIC);
    LittleEndian::write_u32(&mut header[4..], VERSION);
    header
}

fn encode_frame(entry: &Entry) -> Result<Vec<u8>> {
    let payload = bincode::serialize(entry)?;
    let len = u32::try_from(payload.len()).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "entry too large for a journal record")
    })?;

    let mut frame = Vec::with_capacity(FRAME_HEADER_LEN as usize + payload.len());
    frame.write_u32::<LittleEndian>(len)?;
    frame.write_u32::<LittleEndian>(crc32fast::hash(&len.to_le_bytes()))?;
    frame.write_u32::<LittleEndian>(crc32fast::hash(&payload))?;
    frame.extend_from_slice(&payload);
    Ok(frame)
}

fn check_header(bytes: &[u8]) -> Result<()> {
    if bytes.len() < HEADER_LEN as usize || &bytes[..4] != MAGIC {
        return Err(ChainsealError::journal_corrupted(0, "bad magic"));
    }
    let version = Cursor::new(&bytes[4..8]).read_u32::<LittleEndian>()?;
    if version != VERSION {
        return Err(ChainsealError::journal_corrupted(
            4,
            format!("unsupported version {}", version),
        ));
    }
    Ok(())
}

/// Decode whole records, returning them with the length of the valid prefix
fn replay(bytes: &[u8]) -> Result<(Vec<Entry>, u64)> {
    let mut entries = Vec::new();
    let mut offset = HEADER_LEN;
    let total = bytes.len() as u64;

    while offset < total {
        // Frame header cut off by the end of the file
        if total - offset < FRAME_HEADER_LEN {
            break;
        }
        let mut cursor = Cursor::new(&bytes[offset as usize..]);
        let len = cursor.read_u32::<LittleEndian>()?;
        let len_crc = cursor.read_u32::<LittleEndian>()?;
        let payload_crc = cursor.read_u32::<LittleEndian>()?;

        if crc32fast::hash(&len.to_le_bytes()) != len_crc {
            return Err(ChainsealError::journal_corrupted(
                offset,
                "record length checksum mismatch",
            ));
        }

        let start = offset + FRAME_HEADER_LEN;
        let len = u64::from(len);
        // Payload runs past the end of the file
        if total - start < len {
            break;
        }
        let payload = &bytes[start as usize..(start + len) as usize];

        if crc32fast::hash(payload) != payload_crc {
            return Err(ChainsealError::journal_corrupted(offset, "checksum mismatch"));
        }

        let entry: Entry = bincode::deserialize(payload).map_err(|e| {
            ChainsealError::journal_corrupted(offset, format!("undecodable record: {}", e))
        })?;
        entries.push(entry);
        offset = start + len;
    }

    Ok((entries, offset))
}
