//! Counters describing what the arc renderer and scene builder produced.
//!
//! Degenerate arcs are skipped silently by the renderer; these counters are
//! how callers find out it happened.

use std::fmt;

use serde::Serialize;

use super::metrics::SketchTimingReport;

/// Per-arc sample counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArcDiagnostics {
    /// Samples walked, including the trailing endpoint.
    pub sample_count: usize,
    pub visible_count: usize,
    pub hidden_count: usize,
    /// Contiguous same-facing spans. More than two means the arc crossed the
    /// silhouette more than once.
    pub run_count: usize,
    /// The arc plane was undefined and nothing was sampled.
    pub degenerate: bool,
}

impl ArcDiagnostics {
    #[must_use]
    pub fn degenerate() -> Self {
        Self {
            degenerate: true,
            ..Self::default()
        }
    }

    /// `true` when the same-class polylines bridge separate spans.
    #[must_use]
    pub fn has_disjoint_spans(&self) -> bool {
        self.run_count > 2
    }
}

/// Totals for a whole scene.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct SceneDiagnostics {
    pub arcs_drawn: usize,
    pub arcs_skipped: usize,
    pub visible_points: usize,
    pub hidden_points: usize,
    pub polylines_emitted: usize,
    /// Arcs whose visible or hidden polyline joins two separate spans.
    pub disjoint_span_arcs: usize,
    pub cube_edges_hidden: usize,
    /// Bins along one face side at the scene's bin level.
    pub nside: u32,
    /// Bins on the whole sphere, `6 · nside²`.
    pub nbins: u64,
    /// Only populated with the `sketch_metrics` feature on native targets.
    pub timing: Option<SketchTimingReport>,
    pub warnings: Vec<String>,
}

impl SceneDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_arc(&mut self, arc: ArcDiagnostics) {
        if arc.degenerate {
            self.arcs_skipped += 1;
            return;
        }
        self.arcs_drawn += 1;
        self.visible_points += arc.visible_count;
        self.hidden_points += arc.hidden_count;
        if arc.has_disjoint_spans() {
            self.disjoint_span_arcs += 1;
        }
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.arcs_skipped == 0 && self.warnings.is_empty()
    }
}

impl fmt::Display for SceneDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arcs: {} drawn, {} skipped; points: {} visible, {} hidden; polylines: {}",
            self.arcs_drawn,
            self.arcs_skipped,
            self.visible_points,
            self.hidden_points,
            self.polylines_emitted
        )?;
        if self.nbins > 0 {
            write!(f, "; bins: {} ({} per face side)", self.nbins, self.nside)?;
        }
        if self.cube_edges_hidden > 0 {
            write!(f, "; hidden cube edges: {}", self.cube_edges_hidden)?;
        }
        if let Some(timing) = &self.timing {
            write!(f, "; {:.3} ms", timing.total_ms())?;
        }
        for warning in &self.warnings {
            write!(f, "\nwarning: {warning}")?;
        }
        Ok(())
    }
}
