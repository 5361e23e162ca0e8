//! Free wall span computation.
//!
//! Openings are reduced to busy intervals on the wall run, sorted, and
//! interleaved with the run bounds. Consuming that boundary sequence two at a
//! time yields the solid segments between and around the openings.

use super::WallSide;
use crate::config::LayoutConfig;
use crate::error::{BreachError, Result};

/// Lengths at or below this are treated as zero.
const SPAN_EPSILON: f32 = 1e-4;

/// Interval `[start, end]` along a wall run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start: f32,
    pub end: f32,
}

impl Span {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f32 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpeningKind {
    Door,
    Window,
}

/// An opening that survived filtering, clipped to its wall run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Opening {
    pub kind: OpeningKind,
    pub span: Span,
}

/// Turn raw door and window offsets into openings on `run`.
///
/// Offsets at or past the run end, or negative, are dropped. Openings that
/// overhang the run are clipped to it. The result is stably sorted by start,
/// doors before windows on ties.
pub fn collect_openings(
    side: WallSide,
    run: Span,
    doors: &[f32],
    windows: &[f32],
    config: &LayoutConfig,
) -> Vec<Opening> {
    let raw = doors
        .iter()
        .map(|&offset| (OpeningKind::Door, offset, config.door_width))
        .chain(
            windows
                .iter()
                .map(|&offset| (OpeningKind::Window, offset, config.window_width)),
        );

    let mut openings = Vec::new();
    for (kind, offset, width) in raw {
        if !(0.0..run.end).contains(&offset) {
            tracing::debug!(%side, ?kind, offset, run_end = run.end, "opening outside wall run, ignored");
            continue;
        }
        let span = Span::new(offset.max(run.start), (offset + width).min(run.end));
        if span.length() <= SPAN_EPSILON {
            tracing::debug!(%side, ?kind, offset, "opening clipped to nothing, ignored");
            continue;
        }
        if span.end < offset + width {
            tracing::debug!(%side, ?kind, offset, clipped_end = span.end, "opening clipped to run end");
        }
        openings.push(Opening { kind, span });
    }

    openings.sort_by(|a, b| a.span.start.total_cmp(&b.span.start));
    openings
}

/// Solid segments of `run` left after subtracting `busy` intervals.
///
/// `busy` need not be sorted. Overlapping intervals are rejected; touching
/// ones are fine. Zero-length segments are dropped.
pub fn free_spans(side: WallSide, run: Span, busy: &[Span]) -> Result<Vec<Span>> {
    let mut sorted = busy.to_vec();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    if let Some(pair) = sorted
        .windows(2)
        .find(|pair| pair[1].start < pair[0].end - SPAN_EPSILON)
    {
        return Err(BreachError::OverlappingOpenings {
            side,
            first: (pair[0].start, pair[0].end),
            second: (pair[1].start, pair[1].end),
        });
    }

    let mut boundaries = Vec::with_capacity(sorted.len() * 2 + 2);
    boundaries.push(run.start);
    for span in &sorted {
        boundaries.push(span.start);
        boundaries.push(span.end);
    }
    boundaries.push(run.end);

    Ok(boundaries
        .chunks_exact(2)
        .map(|pair| Span::new(pair[0], pair[1]))
        .filter(|span| span.length() > SPAN_EPSILON)
        .collect())
}
