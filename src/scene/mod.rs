//! Scene assembly for the quadrilaterized spherical cube diagram.
//!
//! [`build_scene`] turns a [`SceneConfig`] into a [`Drawing`] in paint order:
//! sphere body, face grid, cube edges, highlighted bins, user arcs, inscribed
//! cube, axes.

mod drawing;
pub mod qlsc;
mod style;

pub use drawing::{DrawCommand, Drawing, Layer, PathSink, draw_split};
pub use style::{Color, ColorParseError, FillStyle, StrokeStyle};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::geom::{
    ArcDiagnostics, CameraError, GreatCircleArc, Point3, PolylineSplit, SceneDiagnostics,
    SketchMetrics, SphericalCoord, TimingBucket, Vec3, ViewTransform,
};
use qlsc::{GridLineKind, MAX_BIN_LEVEL};

/// Result type for scene construction.
pub type SceneResult<T> = Result<T, SceneError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("sphere radius must be finite and positive, got {0}")]
    InvalidRadius(f64),
    #[error("bin level {level} is out of range (0..={max})")]
    InvalidBinLevel { level: u32, max: u32 },
    #[error("axis length must be finite and positive, got {0}")]
    InvalidAxisLength(f64),
    #[error("invalid camera: {0}")]
    Camera(#[from] CameraError),
    #[error("invalid {0}: width must be non-negative and opacity within 0..=1")]
    InvalidStyle(String),
    #[error("arc #{index} has non-finite endpoints")]
    InvalidArc { index: usize },
    #[error("bin #{index} ({face}, {ix}, {iy}) does not exist at bin level {level}")]
    InvalidBin {
        index: usize,
        face: u8,
        ix: u32,
        iy: u32,
        level: u32,
    },
}

/// A user arc between two (declination, azimuth) pairs in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcSpec {
    pub theta1: f64,
    pub phi1: f64,
    pub theta2: f64,
    pub phi2: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StrokeStyle>,
}

impl ArcSpec {
    #[must_use]
    pub fn new(theta1: f64, phi1: f64, theta2: f64, phi2: f64) -> Self {
        Self {
            theta1,
            phi1,
            theta2,
            phi2,
            style: None,
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: StrokeStyle) -> Self {
        self.style = Some(style);
        self
    }

    #[must_use]
    pub fn start(&self) -> SphericalCoord {
        SphericalCoord::new(self.theta1, self.phi1)
    }

    #[must_use]
    pub fn end(&self) -> SphericalCoord {
        SphericalCoord::new(self.theta2, self.phi2)
    }

    fn is_finite(&self) -> bool {
        self.start().is_finite() && self.end().is_finite()
    }
}

/// One bin of the face grid, outlined along its four great-circle sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinSpec {
    /// Q3C face number, see [`qlsc::FACES`].
    pub face: u8,
    pub ix: u32,
    pub iy: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StrokeStyle>,
}

impl BinSpec {
    #[must_use]
    pub fn new(face: u8, ix: u32, iy: u32) -> Self {
        Self {
            face,
            ix,
            iy,
            style: None,
        }
    }

    #[must_use]
    pub fn with_style(mut self, style: StrokeStyle) -> Self {
        self.style = Some(style);
        self
    }

    fn corners(&self, bin_level: u32) -> Option<[Vec3; 4]> {
        qlsc::bin_corners(usize::from(self.face), self.ix, self.iy, bin_level)
    }
}

/// Everything that shapes the diagram. Every field has a default, so partial
/// configs deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub radius: f64,
    /// Camera elevation in degrees (tikz-3dplot `θ`).
    pub elevation: f64,
    /// Camera azimuth in degrees (tikz-3dplot `φ`).
    pub azimuth: f64,
    /// Grid lines per face side are `2^bin_level`.
    pub bin_level: u32,
    pub show_sphere: bool,
    pub show_grid: bool,
    /// The 12 cube edges of the face grid. Only drawn with the grid.
    pub show_edges: bool,
    pub show_cube: bool,
    pub show_axes: bool,
    /// Falls back to 1.5 × radius.
    pub axis_length: Option<f64>,
    /// Emit one polyline per contiguous run instead of one per class.
    pub split_runs: bool,
    pub grid_style: StrokeStyle,
    pub edge_style: StrokeStyle,
    pub cube_style: StrokeStyle,
    pub axis_style: StrokeStyle,
    pub arc_style: StrokeStyle,
    pub bin_style: StrokeStyle,
    pub sphere_fill: FillStyle,
    pub bins: Vec<BinSpec>,
    pub arcs: Vec<ArcSpec>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            radius: 3.0,
            elevation: 70.0,
            azimuth: 115.0,
            bin_level: 1,
            show_sphere: true,
            show_grid: true,
            show_edges: true,
            show_cube: true,
            show_axes: true,
            axis_length: None,
            split_runs: false,
            grid_style: StrokeStyle::solid(Color::NAVY, 0.6),
            edge_style: StrokeStyle::solid(Color::NAVY, 1.2),
            cube_style: StrokeStyle::solid(Color::BLACK, 0.9),
            axis_style: StrokeStyle::solid(Color::BLACK, 0.8),
            arc_style: StrokeStyle::solid(Color::RED, 1.2),
            bin_style: StrokeStyle::solid(Color::ORANGE, 1.6),
            sphere_fill: FillStyle::default(),
            bins: Vec::new(),
            arcs: Vec::new(),
        }
    }
}

impl SceneConfig {
    pub fn validate(&self) -> SceneResult<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(SceneError::InvalidRadius(self.radius));
        }
        if self.bin_level > MAX_BIN_LEVEL {
            return Err(SceneError::InvalidBinLevel {
                level: self.bin_level,
                max: MAX_BIN_LEVEL,
            });
        }
        if let Some(length) = self.axis_length {
            if !(length.is_finite() && length > 0.0) {
                return Err(SceneError::InvalidAxisLength(length));
            }
        }

        let styles = [
            ("grid style", &self.grid_style),
            ("edge style", &self.edge_style),
            ("cube style", &self.cube_style),
            ("axis style", &self.axis_style),
            ("arc style", &self.arc_style),
            ("bin style", &self.bin_style),
        ];
        if let Some((name, _)) = styles.iter().find(|(_, style)| !style.is_valid()) {
            return Err(SceneError::InvalidStyle((*name).to_owned()));
        }
        if !(0.0..=1.0).contains(&self.sphere_fill.opacity) {
            return Err(SceneError::InvalidStyle("sphere fill".to_owned()));
        }

        for (index, bin) in self.bins.iter().enumerate() {
            if bin.corners(self.bin_level).is_none() {
                return Err(SceneError::InvalidBin {
                    index,
                    face: bin.face,
                    ix: bin.ix,
                    iy: bin.iy,
                    level: self.bin_level,
                });
            }
            if bin.style.as_ref().is_some_and(|style| !style.is_valid()) {
                return Err(SceneError::InvalidStyle(format!("style of bin #{index}")));
            }
        }

        for (index, arc) in self.arcs.iter().enumerate() {
            if !arc.is_finite() {
                return Err(SceneError::InvalidArc { index });
            }
            if arc.style.as_ref().is_some_and(|style| !style.is_valid()) {
                return Err(SceneError::InvalidStyle(format!("style of arc #{index}")));
            }
        }

        self.view().map(|_| ())
    }

    pub fn view(&self) -> SceneResult<ViewTransform> {
        Ok(ViewTransform::from_main_coords(self.elevation, self.azimuth)?)
    }

    #[must_use]
    pub fn effective_axis_length(&self) -> f64 {
        self.axis_length.unwrap_or(1.5 * self.radius)
    }
}

/// A built diagram: recorded drawing plus what went into it.
#[derive(Debug)]
pub struct Scene {
    pub drawing: Drawing,
    pub diagnostics: SceneDiagnostics,
    pub view: ViewTransform,
    pub radius: f64,
    metrics: SketchMetrics,
}

impl Scene {
    /// Run `f` under the given timing bucket and refresh the timing report.
    pub fn timed<R>(&mut self, bucket: TimingBucket, f: impl FnOnce(&Self) -> R) -> R {
        let mut metrics = std::mem::take(&mut self.metrics);
        let result = metrics.time(bucket, || f(self));
        self.diagnostics.timing = metrics.end();
        self.metrics = metrics;
        result
    }
}

/// One great-circle arc to draw, before sampling.
#[derive(Debug, Clone)]
struct ArcJob {
    label: String,
    arc: Result<GreatCircleArc, crate::geom::ArcError>,
    style: StrokeStyle,
    layer: Layer,
}

impl ArcJob {
    fn split(&self, view: &ViewTransform) -> Option<PolylineSplit> {
        self.arc.as_ref().ok().map(|arc| arc.split(view))
    }
}

fn arc_jobs(config: &SceneConfig) -> Vec<ArcJob> {
    let mut jobs = Vec::new();

    if config.show_grid {
        let lines = qlsc::grid_lines(config.bin_level);
        // Interior lines first so the edges paint over them.
        for kind in [GridLineKind::Interior, GridLineKind::Edge] {
            if kind == GridLineKind::Edge && !config.show_edges {
                continue;
            }
            let (style, layer) = match kind {
                GridLineKind::Interior => (&config.grid_style, Layer::Grid),
                GridLineKind::Edge => (&config.edge_style, Layer::Edges),
            };
            jobs.extend(lines.iter().filter(|line| line.kind == kind).map(|line| {
                ArcJob {
                    label: format!("{kind:?} line {:?} -> {:?}", line.start, line.end),
                    arc: GreatCircleArc::from_directions(line.start, line.end, config.radius),
                    style: style.clone(),
                    layer,
                }
            }));
        }
    }

    for (index, bin) in config.bins.iter().enumerate() {
        // validate() rejects bins outside the grid
        let Some(corners) = bin.corners(config.bin_level) else {
            continue;
        };
        let style = bin.style.as_ref().unwrap_or(&config.bin_style);
        jobs.extend((0..4).map(|side| ArcJob {
            label: format!("bin #{index} side {side}"),
            arc: GreatCircleArc::from_directions(
                corners[side],
                corners[(side + 1) % 4],
                config.radius,
            ),
            style: style.clone(),
            layer: Layer::Bins,
        }));
    }

    jobs.extend(config.arcs.iter().enumerate().map(|(index, spec)| ArcJob {
        label: format!("arc #{index}"),
        arc: GreatCircleArc::from_spherical(spec.start(), spec.end(), config.radius),
        style: spec.style.clone().unwrap_or_else(|| config.arc_style.clone()),
        layer: Layer::Arcs,
    }));

    jobs
}

#[cfg(feature = "parallel")]
fn split_arcs(jobs: &[ArcJob], view: &ViewTransform) -> Vec<Option<PolylineSplit>> {
    jobs.par_iter().map(|job| job.split(view)).collect()
}

#[cfg(not(feature = "parallel"))]
fn split_arcs(jobs: &[ArcJob], view: &ViewTransform) -> Vec<Option<PolylineSplit>> {
    jobs.iter().map(|job| job.split(view)).collect()
}

/// Build the full diagram for `config`.
pub fn build_scene(config: &SceneConfig) -> SceneResult<Scene> {
    config.validate()?;
    let view = config.view()?;
    log::debug!(
        "building scene: radius {}, camera ({}, {}), bin level {}",
        config.radius,
        config.elevation,
        config.azimuth,
        config.bin_level
    );

    let mut metrics = SketchMetrics::default();
    metrics.begin();
    let mut drawing = Drawing::new();
    let mut diagnostics = SceneDiagnostics::new();
    diagnostics.nside = qlsc::lines_per_side(config.bin_level);
    diagnostics.nbins = qlsc::bin_count(config.bin_level);

    if config.show_sphere {
        drawing.record(|d| d.disc(Point3::ORIGIN, config.radius, &config.sphere_fill));
    }

    let jobs = arc_jobs(config);
    let splits = metrics.time(TimingBucket::ArcSampling, || split_arcs(&jobs, &view));

    for (job, split) in jobs.iter().zip(splits) {
        let Some(split) = split else {
            if let Err(err) = &job.arc {
                log::debug!("skipping {}: {err}", job.label);
                if job.layer == Layer::Arcs {
                    diagnostics.add_warning(format!("{} skipped: {err}", job.label));
                }
            }
            diagnostics.record_arc(ArcDiagnostics::degenerate());
            continue;
        };
        let arc_diagnostics = split.diagnostics();
        if arc_diagnostics.has_disjoint_spans() {
            log::debug!(
                "{} crosses the silhouette {} times",
                job.label,
                arc_diagnostics.run_count - 1
            );
        }
        diagnostics.record_arc(arc_diagnostics);
        diagnostics.polylines_emitted +=
            drawing.record(|d| draw_split(d, &split, &job.style, job.layer, config.split_runs));
    }

    metrics.time(TimingBucket::Overlay, || {
        if config.show_cube {
            diagnostics.cube_edges_hidden = draw_cube(&mut drawing, config, &view);
        }
        if config.show_axes {
            draw_axes(&mut drawing, config);
        }
    });

    diagnostics.timing = metrics.end();
    log::debug!("scene built: {diagnostics}");

    Ok(Scene {
        drawing,
        diagnostics,
        view,
        radius: config.radius,
        metrics,
    })
}

/// Draw the inscribed cube, hidden edges first. Returns the hidden edge count.
fn draw_cube(drawing: &mut Drawing, config: &SceneConfig, view: &ViewTransform) -> usize {
    let edges = qlsc::inscribed_cube_edges(config.radius, view);
    let back = StrokeStyle::back();
    let (hidden, shown): (Vec<_>, Vec<_>) = edges.into_iter().partition(|edge| edge.hidden);
    drawing.record(|d| {
        for edge in &hidden {
            d.segment(edge.start, edge.end, &back, Layer::Cube)?;
        }
        for edge in &shown {
            d.segment(edge.start, edge.end, &config.cube_style, Layer::Cube)?;
        }
        Ok(())
    });
    hidden.len()
}

fn draw_axes(drawing: &mut Drawing, config: &SceneConfig) {
    let length = config.effective_axis_length();
    let axes = [(Vec3::X, "x"), (Vec3::Y, "y"), (Vec3::Z, "z")];
    drawing.record(|d| {
        for (axis, name) in axes {
            let tip = Point3::ORIGIN.add_vec(axis.mul_scalar(length));
            d.segment(Point3::ORIGIN, tip, &config.axis_style, Layer::Axes)?;
            d.label(tip, name, config.axis_style.color)?;
        }
        Ok(())
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_layer(drawing: &Drawing, wanted: Layer) -> usize {
        drawing
            .commands()
            .iter()
            .filter(|command| match command {
                DrawCommand::Polyline { layer, .. } | DrawCommand::Segment { layer, .. } => {
                    *layer == wanted
                }
                _ => false,
            })
            .count()
    }

    #[test]
    fn default_config_is_valid() {
        let config = SceneConfig::default();
        assert!(config.validate().is_ok());
        assert!((config.effective_axis_length() - 4.5).abs() < 1e-12);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = SceneConfig {
            radius: 0.0,
            ..SceneConfig::default()
        };
        assert_eq!(config.validate(), Err(SceneError::InvalidRadius(0.0)));

        config.radius = 1.0;
        config.bin_level = 7;
        assert_eq!(
            config.validate(),
            Err(SceneError::InvalidBinLevel { level: 7, max: 6 })
        );

        config.bin_level = 2;
        config.axis_length = Some(-1.0);
        assert_eq!(config.validate(), Err(SceneError::InvalidAxisLength(-1.0)));

        config.axis_length = None;
        config.elevation = f64::INFINITY;
        assert!(matches!(config.validate(), Err(SceneError::Camera(_))));

        config.elevation = 70.0;
        config.arcs.push(ArcSpec::new(f64::NAN, 0.0, 10.0, 10.0));
        assert_eq!(config.validate(), Err(SceneError::InvalidArc { index: 0 }));
    }

    #[test]
    fn default_scene_draws_every_layer() {
        let scene = build_scene(&SceneConfig::default()).unwrap();
        let drawing = &scene.drawing;

        assert!(matches!(drawing.commands()[0], DrawCommand::Disc { .. }));
        // Level 1: 12 interior lines, 12 edges, all drawable.
        assert_eq!(scene.diagnostics.arcs_drawn, 24);
        assert_eq!(scene.diagnostics.arcs_skipped, 0);
        assert!(count_layer(drawing, Layer::Grid) >= 12);
        assert!(count_layer(drawing, Layer::Edges) >= 12);
        assert_eq!(count_layer(drawing, Layer::Cube), 12);
        assert_eq!(count_layer(drawing, Layer::Axes), 3);
        assert!(scene.diagnostics.cube_edges_hidden > 0);
        assert!(scene.diagnostics.is_clean());
    }

    #[test]
    fn hidden_edges_leave_interior_grid() {
        let config = SceneConfig {
            show_edges: false,
            ..SceneConfig::default()
        };
        let scene = build_scene(&config).unwrap();
        // Level 1: 12 interior lines only.
        assert_eq!(scene.diagnostics.arcs_drawn, 12);
        assert_eq!(count_layer(&scene.drawing, Layer::Edges), 0);
        assert!(count_layer(&scene.drawing, Layer::Grid) >= 12);
    }

    #[test]
    fn highlighted_bin_draws_four_sides_on_the_sphere() {
        let config = SceneConfig {
            show_grid: false,
            show_cube: false,
            show_axes: false,
            show_sphere: false,
            bin_level: 2,
            bins: vec![BinSpec::new(1, 1, 2)],
            ..SceneConfig::default()
        };
        let scene = build_scene(&config).unwrap();
        assert_eq!(scene.diagnostics.arcs_drawn, 4);
        assert_eq!(scene.diagnostics.nside, 4);
        assert_eq!(scene.diagnostics.nbins, 96);
        assert!(count_layer(&scene.drawing, Layer::Bins) >= 4);

        for command in scene.drawing.commands() {
            let DrawCommand::Polyline { points, style, .. } = command else {
                continue;
            };
            if !style.is_dashed() {
                assert_eq!(style, &config.bin_style);
            }
            for p in points {
                assert!((p.norm() - config.radius).abs() < 1e-9, "{p:?}");
            }
        }
    }

    #[test]
    fn bins_outside_the_grid_are_rejected() {
        let mut config = SceneConfig {
            bins: vec![BinSpec::new(2, 0, 2)],
            ..SceneConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(SceneError::InvalidBin {
                index: 0,
                face: 2,
                ix: 0,
                iy: 2,
                level: 1,
            })
        );
        config.bin_level = 2;
        assert!(config.validate().is_ok());
        config.bins.push(BinSpec::new(6, 0, 0));
        assert!(matches!(
            config.validate(),
            Err(SceneError::InvalidBin { index: 1, face: 6, .. })
        ));
    }

    #[test]
    fn degenerate_user_arc_is_skipped_with_warning() {
        let config = SceneConfig {
            show_grid: false,
            show_cube: false,
            show_axes: false,
            show_sphere: false,
            arcs: vec![
                ArcSpec::new(10.0, 20.0, 10.0, 20.0),
                ArcSpec::new(0.0, 0.0, 30.0, 60.0),
            ],
            ..SceneConfig::default()
        };
        let scene = build_scene(&config).unwrap();
        assert_eq!(scene.diagnostics.arcs_skipped, 1);
        assert_eq!(scene.diagnostics.arcs_drawn, 1);
        assert_eq!(scene.diagnostics.warnings.len(), 1);
        assert!(scene.diagnostics.warnings[0].starts_with("arc #0"));
        assert_eq!(
            scene.drawing.len(),
            scene.diagnostics.polylines_emitted
        );
    }

    #[test]
    fn user_arc_uses_its_own_style() {
        let style = StrokeStyle::solid(Color::GREEN, 2.0);
        let config = SceneConfig {
            show_grid: false,
            show_cube: false,
            show_axes: false,
            show_sphere: false,
            elevation: 0.0,
            azimuth: 0.0,
            arcs: vec![ArcSpec::new(0.0, -45.0, 0.0, 45.0).with_style(style.clone())],
            ..SceneConfig::default()
        };
        let scene = build_scene(&config).unwrap();
        let styles: Vec<_> = scene
            .drawing
            .commands()
            .iter()
            .filter_map(|command| match command {
                DrawCommand::Polyline { style, .. } => Some(style.clone()),
                _ => None,
            })
            .collect();
        assert!(styles.contains(&style));
    }

    #[test]
    fn split_runs_never_emits_fewer_polylines() {
        let base = SceneConfig {
            bin_level: 2,
            ..SceneConfig::default()
        };
        let per_run = SceneConfig {
            split_runs: true,
            ..base.clone()
        };
        let joined = build_scene(&base).unwrap();
        let split = build_scene(&per_run).unwrap();
        assert!(split.diagnostics.polylines_emitted >= joined.diagnostics.polylines_emitted);
        assert_eq!(
            split.diagnostics.visible_points,
            joined.diagnostics.visible_points
        );
    }
}
