//! Opt-in timing hooks for scene construction.
//!
//! Active only with the `sketch_metrics` feature on non-WASM targets
//! (`std::time::Instant` is unavailable on `wasm32`). Otherwise every call is
//! a pass-through and [`SketchMetrics::end`] returns `None`.

use serde::Serialize;

/// Phases of building and writing a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Great-circle sampling and visibility splitting.
    ArcSampling,
    /// Cube overlay and axes.
    Overlay,
    /// SVG serialization.
    SvgWrite,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SketchTimingReport {
    pub arc_sampling_ns: u64,
    pub overlay_ns: u64,
    pub svg_write_ns: u64,
}

impl SketchTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.arc_sampling_ns
            .saturating_add(self.overlay_ns)
            .saturating_add(self.svg_write_ns)
    }

    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

#[derive(Debug, Default)]
pub struct SketchMetrics {
    #[cfg(all(feature = "sketch_metrics", not(target_arch = "wasm32")))]
    report: SketchTimingReport,
}

impl SketchMetrics {
    pub fn begin(&mut self) {
        #[cfg(all(feature = "sketch_metrics", not(target_arch = "wasm32")))]
        {
            self.report = SketchTimingReport::default();
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<SketchTimingReport> {
        #[cfg(all(feature = "sketch_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "sketch_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Run `f`, adding its wall time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "sketch_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            let slot = match bucket {
                TimingBucket::ArcSampling => &mut self.report.arc_sampling_ns,
                TimingBucket::Overlay => &mut self.report.overlay_ns,
                TimingBucket::SvgWrite => &mut self.report.svg_write_ns,
            };
            *slot = slot.saturating_add(nanos);
            result
        }

        #[cfg(not(all(feature = "sketch_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }
}
