// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `RunInfo.xml` and `RTAComplete.txt` parsing.
//!
//! `RunInfo.xml` is among the first files written into a run directory and
//! is the source of truth for the declared run id, flowcell, and
//! instrument. `RTAComplete.txt` appears when base calling finishes and
//! carries a timestamp in one of two historical shapes.

use crate::error::IlluminaError;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::warn;

/// Instrument families with distinct analysis-directory layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrumentType {
    MiSeq,
    MiniSeq,
    MiSeqI100Plus,
    NextSeq2000,
}

seqproc_core::simple_display! {
    InstrumentType {
        MiSeq => "MiSeq",
        MiniSeq => "MiniSeq",
        MiSeqI100Plus => "MiSeq i100 Plus",
        NextSeq2000 => "NextSeq 2000",
    }
}

impl InstrumentType {
    /// Classify an instrument by its serial number prefix.
    ///
    /// Unknown serials fall back to MiSeq with a warning so old fixtures
    /// and unanticipated instruments still load as the classic layout.
    pub fn from_serial(serial: &str) -> Self {
        if serial.starts_with("MN") {
            Self::MiniSeq
        } else if serial.starts_with("MI") {
            Self::MiSeqI100Plus
        } else if serial.starts_with("VH") {
            Self::NextSeq2000
        } else if serial.starts_with('M') {
            Self::MiSeq
        } else {
            warn!(serial, "unrecognized instrument serial, assuming MiSeq layout");
            Self::MiSeq
        }
    }
}

/// Parsed contents of `RunInfo.xml`.
#[derive(Debug, Clone)]
pub struct RunInfo {
    /// Run id as declared inside the file (may disagree with the directory name).
    pub run_id: String,
    pub flowcell: String,
    pub instrument: String,
    pub instrument_type: InstrumentType,
}

impl RunInfo {
    /// Parse `RunInfo.xml`. A missing file maps to [`IlluminaError::NotARun`]
    /// on the containing directory.
    pub fn load(path: &Path) -> Result<Self, IlluminaError> {
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                let dir = path.parent().unwrap_or(path).to_path_buf();
                IlluminaError::NotARun(dir)
            } else {
                IlluminaError::io(path, e)
            }
        })?;
        let doc = roxmltree::Document::parse(&text)
            .map_err(|e| IlluminaError::parse(path, e.to_string()))?;
        let run = doc
            .descendants()
            .find(|n| n.has_tag_name("Run"))
            .ok_or_else(|| IlluminaError::parse(path, "no <Run> element"))?;
        let run_id = run
            .attribute("Id")
            .ok_or_else(|| IlluminaError::parse(path, "<Run> has no Id attribute"))?
            .to_string();
        let child_text = |tag: &str| {
            run.children()
                .find(|n| n.has_tag_name(tag))
                .and_then(|n| n.text())
                .unwrap_or_default()
                .trim()
                .to_string()
        };
        let flowcell = child_text("Flowcell");
        let instrument = child_text("Instrument");
        let instrument_type = InstrumentType::from_serial(&instrument);
        Ok(Self { run_id, flowcell, instrument, instrument_type })
    }
}

/// Parsed contents of `RTAComplete.txt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtaComplete {
    pub date: NaiveDateTime,
    pub version: String,
}

fn sentence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::unwrap_used)] // literal pattern
    RE.get_or_init(|| Regex::new(r"^(RTA [0-9.]+) completed on (\S+) (.+)$").unwrap())
}

impl RtaComplete {
    /// Parse `RTAComplete.txt`; `Ok(None)` when the file does not exist yet.
    ///
    /// Two shapes occur in the wild:
    /// - `RTA 2.8.6 completed on 3/17/2017 8:19:33 AM`
    /// - `11/2/2017,03:08:24.972,Illumina RTA 1.18.54`
    pub fn load(path: &Path) -> Result<Option<Self>, IlluminaError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(IlluminaError::io(path, e)),
        };
        let line = text.lines().next().unwrap_or_default().trim();
        Self::parse(line)
            .map(Some)
            .map_err(|reason| IlluminaError::parse(path, reason))
    }

    fn parse(line: &str) -> Result<Self, String> {
        if let Some(caps) = sentence_re().captures(line) {
            let date = NaiveDate::parse_from_str(&caps[2], "%m/%d/%Y")
                .map_err(|e| format!("bad date {:?}: {e}", &caps[2]))?;
            let time = NaiveTime::parse_from_str(&caps[3], "%I:%M:%S %p")
                .map_err(|e| format!("bad time {:?}: {e}", &caps[3]))?;
            return Ok(Self { date: date.and_time(time), version: caps[1].to_string() });
        }
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() >= 3 {
            let date = NaiveDate::parse_from_str(parts[0], "%m/%d/%Y")
                .map_err(|e| format!("bad date {:?}: {e}", parts[0]))?;
            let time = NaiveTime::parse_from_str(parts[1], "%H:%M:%S%.f")
                .map_err(|e| format!("bad time {:?}: {e}", parts[1]))?;
            return Ok(Self { date: date.and_time(time), version: parts[2].trim().to_string() });
        }
        Err(format!("unrecognized RTAComplete line: {line:?}"))
    }
}

#[cfg(test)]
#[path = "runinfo_tests.rs"]
mod tests;
