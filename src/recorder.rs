//! # Frame Recorder
//!
//! Records emitted channel frames to JSONL files with rotation.
//!
//! This module handles:
//! - Formatting each frame as one JSON line
//! - Starting a new file after `max_records_per_file` records
//! - Retaining only the newest `max_files_to_keep` files
//!
//! Files are named `frames_<sequence>_<timestamp>.jsonl`. The zero-padded
//! sequence number continues from the highest one already in the directory,
//! so ordering does not depend on the wall clock.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::codec::channels::PACKED_CHANNELS_COUNT;
use crate::config::RecorderConfig;
use crate::error::Result;
use crate::link::{hex_string, FrameSink};
use crate::packet::ChannelsPacket;

const FILE_PREFIX: &str = "frames_";
const FILE_EXTENSION: &str = ".jsonl";

/// One recorded frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// RFC 3339 UTC timestamp
    pub timestamp: String,
    pub id: u32,
    pub failsafe: bool,
    /// The 16 packed channel values as sent (before masking)
    pub channels: Vec<u16>,
    /// Packed channels region as uppercase hex
    pub payload: String,
}

impl FrameRecord {
    pub fn new(packet: &ChannelsPacket, payload: &[u8]) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            id: packet.id,
            failsafe: packet.is_failsafe,
            channels: packet.channels[..PACKED_CHANNELS_COUNT].to_vec(),
            payload: hex_string(payload),
        }
    }
}

/// Rotating JSONL frame recorder
#[derive(Debug)]
pub struct FrameRecorder {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    current_path: Option<PathBuf>,
    records_in_file: usize,
    next_sequence: u64,
}

impl FrameRecorder {
    /// Create a recorder writing into `dir`
    ///
    /// The directory is created if missing. No file is opened until the
    /// first record arrives.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created
    pub fn new<P: AsRef<Path>>(dir: P, max_records_per_file: usize, max_files_to_keep: usize) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let mut recorder = Self {
            dir,
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            writer: None,
            current_path: None,
            records_in_file: 0,
            next_sequence: 0,
        };

        recorder.next_sequence = recorder
            .list_files()?
            .iter()
            .filter_map(|path| file_sequence(path))
            .max()
            .map_or(0, |last| last.saturating_add(1));

        info!(
            "Recording frames to {} (next file sequence {})",
            recorder.dir.display(),
            recorder.next_sequence
        );
        Ok(recorder)
    }

    /// Create a recorder from the `[recorder]` configuration section
    pub fn from_config(config: &RecorderConfig) -> Result<Self> {
        Self::new(&config.log_dir, config.max_records_per_file, config.max_files_to_keep)
    }

    /// Append one record, rotating files as needed
    pub fn record(&mut self, record: &FrameRecord) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        if let Some(writer) = self.writer.as_mut() {
            serde_json::to_writer(&mut *writer, record)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            self.records_in_file += 1;
        }

        Ok(())
    }

    /// Path of the file currently being written
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// Recorded files in the directory, oldest first
    ///
    /// Files are ordered by sequence number. Files without one sort first.
    pub fn list_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let is_record_file = path
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(FILE_PREFIX) && name.ends_with(FILE_EXTENSION))
                .unwrap_or(false);
            if is_record_file {
                files.push(path);
            }
        }
        files.sort_by_cached_key(|path| (file_sequence(path), path.clone()));
        Ok(files)
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        let name = format!(
            "{}{:08}_{}{}",
            FILE_PREFIX,
            self.next_sequence,
            Utc::now().format("%Y%m%dT%H%M%S"),
            FILE_EXTENSION
        );
        let path = self.dir.join(name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("Opened frame log {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.current_path = Some(path);
        self.records_in_file = 0;
        self.next_sequence = self.next_sequence.saturating_add(1);

        self.prune()
    }

    fn prune(&self) -> Result<()> {
        let files = self.list_files()?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        let current = self.current_path.as_deref();
        let excess = files.len() - self.max_files_to_keep;
        let stale = files
            .iter()
            .filter(|path| Some(path.as_path()) != current)
            .take(excess);

        for path in stale {
            match fs::remove_file(path) {
                Ok(()) => debug!("Removed old frame log {}", path.display()),
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
        Ok(())
    }
}

/// Sequence number encoded in a recorder file name
fn file_sequence(path: &Path) -> Option<u64> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_prefix(FILE_PREFIX)?.strip_suffix(FILE_EXTENSION)?;
    let (sequence, _timestamp) = stem.split_once('_')?;
    sequence.parse().ok()
}

impl FrameSink for FrameRecorder {
    fn publish(&mut self, packet: &ChannelsPacket, payload: &[u8]) -> Result<()> {
        self.record(&FrameRecord::new(packet, payload))
    }
}

/// Read every record from a JSONL frame log
///
/// Blank lines are skipped.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<FrameRecord>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }

    Ok(records)
}
