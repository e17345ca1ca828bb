//! JSONL lock log: one JSON object per locked piece.
//!
//! Enabled by setting `BLOCKFALL_LOG_PATH`; the file is truncated on open.

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};

use crate::core::LockEvent;

pub const LOG_PATH_ENV: &str = "BLOCKFALL_LOG_PATH";

pub struct LockLog<W: Write> {
    writer: W,
    written: u64,
}

impl LockLog<BufWriter<File>> {
    /// Open the log named by `BLOCKFALL_LOG_PATH`, if set.
    pub fn from_env() -> Result<Option<Self>> {
        let Some(path) = env::var_os(LOG_PATH_ENV) else {
            return Ok(None);
        };
        let file = File::create(&path)
            .with_context(|| format!("failed to create lock log {}", path.to_string_lossy()))?;
        Ok(Some(Self::new(BufWriter::new(file))))
    }
}

impl<W: Write> LockLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    pub fn record(&mut self, event: &LockEvent) -> Result<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
