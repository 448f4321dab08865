//! Per-iteration sample log.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One control iteration as seen by the loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub elapsed_s: f64,
    pub measured_c: f64,
    pub setpoint_c: f64,
    pub output: f64,
    pub on_s: f64,
    pub off_s: f64,
}

pub trait SampleRecorder {
    fn record(&mut self, sample: &Sample) -> io::Result<()>;
}

/// Writes one JSON object per line and flushes after each sample.
pub struct JsonlRecorder<W: Write> {
    out: W,
}

impl JsonlRecorder<BufWriter<File>> {
    /// Append to `path`, creating it if needed.
    pub fn append(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonlRecorder<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> SampleRecorder for JsonlRecorder<W> {
    fn record(&mut self, sample: &Sample) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, sample)?;
        self.out.write_all(b"\n")?;
        self.out.flush()
    }
}
