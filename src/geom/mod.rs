mod arc;
mod camera;
mod core;
mod diagnostics;
mod metrics;
mod spherical;

pub use arc::{ArcError, GreatCircleArc, PolylineSplit, SplitRun, render_arc};
pub use camera::{CameraError, Facing, ViewTransform};
pub use core::{BBox, Point3, Tolerance, Vec3};
pub use diagnostics::{ArcDiagnostics, SceneDiagnostics};
pub use metrics::{SketchMetrics, SketchTimingReport, TimingBucket};
pub use spherical::{SphericalCoord, angular_distance};

#[cfg(test)]
mod tests;
