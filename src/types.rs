//! Core data types shared by the synchronization engine and its hosts.

use std::fmt::{Display, Formatter};
use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::ticker::lanes::build_ticker;
use crate::timecode::parse_duration;

/// Opaque identity of a transcript segment node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SegmentId(String);

impl SegmentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identity derived from the node's start/end attributes.
    pub fn from_bounds(start: f64, end: f64) -> Self {
        Self(format!("{}-{}", start, end))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SegmentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unit of transcript text aligned to media time.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub id: SegmentId,
    pub start: f64, // seconds
    pub end: f64,   // seconds
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            id: SegmentId::from_bounds(start, end),
            start,
            end,
            text: text.into(),
        }
    }

    /// Half-open containment: `start <= t < end`.
    pub fn contains(&self, t: f64) -> bool {
        self.start <= t && t < self.end
    }
}

/// One occurrence of a tracked term on the ticker timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub term: String,
    pub start: f64,
    pub end: f64,
}

impl Appearance {
    pub fn new(term: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            term: term.into(),
            start,
            end,
        }
    }
}

/// Multi-lane timeline. Appearances within one lane never overlap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    #[serde(default)]
    pub lanes: Vec<Vec<Appearance>>,
}

impl Ticker {
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Last instant covered by any appearance.
    pub fn end(&self) -> f64 {
        self.lanes
            .iter()
            .flatten()
            .map(|appearance| appearance.end)
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const CORNFLOWER_BLUE: Rgb = Rgb::new(100, 149, 237);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scales every channel by `factor` (clamped to [0,1]), rounding to nearest.
    pub fn scaled(self, factor: f64) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        let scale = |channel: u8| (f64::from(channel) * factor).round() as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// One rendered ticker label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub x: f64,
    pub y: i32,
    pub text: String,
    pub opacity: f64,
    pub color: Rgb,
}

/// Episode data as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct EpisodeRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub segments: Vec<SegmentRecord>,
    #[serde(default)]
    pub ticker: Option<Ticker>,
    /// Timed terms `(term, center)`, packed into lanes when `ticker` is absent.
    #[serde(default)]
    pub terms: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SegmentRecord {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub text: String,
}

impl EpisodeRecord {
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read episode file {:?}", path))?;
        Self::from_json(&data)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let record: EpisodeRecord =
            serde_json::from_str(raw).context("Failed to parse episode JSON")?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<()> {
        for (idx, segment) in self.segments.iter().enumerate() {
            ensure!(
                segment.start.is_finite() && segment.end.is_finite(),
                "Segment {} has non-finite bounds",
                idx
            );
            ensure!(
                segment.end >= segment.start,
                "Segment {} ends ({}) before it starts ({})",
                idx,
                segment.end,
                segment.start
            );
        }
        Ok(())
    }

    /// Resolves the record into runtime data, packing terms with envelope `width`.
    pub fn to_episode(&self, width: f64, default_duration_secs: u32) -> Result<Episode> {
        let ticker = match &self.ticker {
            Some(ticker) => ticker.clone(),
            None if !self.terms.is_empty() => build_ticker(&self.terms, width)?,
            None => Ticker::default(),
        };
        let duration_text = self.duration.as_deref().unwrap_or_default();
        Ok(Episode {
            title: self.title.clone().unwrap_or_else(|| "Untitled".to_string()),
            duration_secs: parse_duration(duration_text, default_duration_secs),
            segments: self
                .segments
                .iter()
                .map(|record| Segment::new(record.start, record.end, record.text.clone()))
                .collect(),
            ticker,
        })
    }
}

/// Runtime episode: parsed duration, addressable segments and ticker lanes.
#[derive(Debug, Clone)]
pub struct Episode {
    pub title: String,
    pub duration_secs: u32,
    pub segments: Vec<Segment>,
    pub ticker: Ticker,
}
