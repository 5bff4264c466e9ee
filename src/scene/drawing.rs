//! Display list and the drawing primitive it is replayed into.

use std::convert::Infallible;

use serde::Serialize;

use super::style::{Color, FillStyle, StrokeStyle};
use crate::geom::{Facing, Point3, PolylineSplit};

/// Which part of the diagram a command belongs to. Writers use it for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Sphere,
    Grid,
    Edges,
    Bins,
    Arcs,
    Cube,
    Axes,
}

impl Layer {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sphere => "sphere",
            Self::Grid => "grid",
            Self::Edges => "edges",
            Self::Bins => "bins",
            Self::Arcs => "arcs",
            Self::Cube => "cube",
            Self::Axes => "axes",
        }
    }
}

/// A vector drawing primitive working in the 3D scene frame.
///
/// Projection to the page is the sink's business.
pub trait PathSink {
    type Error;

    fn polyline(
        &mut self,
        points: &[Point3],
        style: &StrokeStyle,
        layer: Layer,
    ) -> Result<(), Self::Error>;

    fn segment(
        &mut self,
        start: Point3,
        end: Point3,
        style: &StrokeStyle,
        layer: Layer,
    ) -> Result<(), Self::Error>;

    /// A disc facing the viewer, e.g. the sphere silhouette.
    fn disc(&mut self, center: Point3, radius: f64, fill: &FillStyle) -> Result<(), Self::Error>;

    fn label(&mut self, at: Point3, text: &str, color: Color) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum DrawCommand {
    Polyline {
        points: Vec<Point3>,
        style: StrokeStyle,
        layer: Layer,
    },
    Segment {
        start: Point3,
        end: Point3,
        style: StrokeStyle,
        layer: Layer,
    },
    Disc {
        center: Point3,
        radius: f64,
        fill: FillStyle,
    },
    Label {
        at: Point3,
        text: String,
        color: Color,
    },
}

/// Recorded drawing commands in paint order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Drawing {
    commands: Vec<DrawCommand>,
}

impl Drawing {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Anchor points of every command (disc centers only, not their rims).
    pub fn points(&self) -> impl Iterator<Item = Point3> + '_ {
        self.commands.iter().flat_map(|command| -> Vec<Point3> {
            match command {
                DrawCommand::Polyline { points, .. } => points.clone(),
                DrawCommand::Segment { start, end, .. } => vec![*start, *end],
                DrawCommand::Disc { center, .. } => vec![*center],
                DrawCommand::Label { at, .. } => vec![*at],
            }
        })
    }

    pub fn replay<S: PathSink>(&self, sink: &mut S) -> Result<(), S::Error> {
        for command in &self.commands {
            match command {
                DrawCommand::Polyline {
                    points,
                    style,
                    layer,
                } => sink.polyline(points, style, *layer)?,
                DrawCommand::Segment {
                    start,
                    end,
                    style,
                    layer,
                } => sink.segment(*start, *end, style, *layer)?,
                DrawCommand::Disc {
                    center,
                    radius,
                    fill,
                } => sink.disc(*center, *radius, fill)?,
                DrawCommand::Label { at, text, color } => sink.label(*at, text, *color)?,
            }
        }
        Ok(())
    }

    /// Record into this drawing through the [`PathSink`] interface.
    pub fn record<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, Infallible>) -> T {
        match f(self) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }
}

impl PathSink for Drawing {
    type Error = Infallible;

    fn polyline(
        &mut self,
        points: &[Point3],
        style: &StrokeStyle,
        layer: Layer,
    ) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            style: style.clone(),
            layer,
        });
        Ok(())
    }

    fn segment(
        &mut self,
        start: Point3,
        end: Point3,
        style: &StrokeStyle,
        layer: Layer,
    ) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Segment {
            start,
            end,
            style: style.clone(),
            layer,
        });
        Ok(())
    }

    fn disc(&mut self, center: Point3, radius: f64, fill: &FillStyle) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Disc {
            center,
            radius,
            fill: *fill,
        });
        Ok(())
    }

    fn label(&mut self, at: Point3, text: &str, color: Color) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Label {
            at,
            text: text.to_owned(),
            color,
        });
        Ok(())
    }
}

/// Emit a split arc: hidden samples in the back style, visible samples in
/// `style`. Empty classes emit nothing. Returns the number of polylines drawn.
///
/// With `per_run` each contiguous span becomes its own polyline; otherwise
/// all samples of a class form one polyline.
pub fn draw_split<S: PathSink>(
    sink: &mut S,
    split: &PolylineSplit,
    style: &StrokeStyle,
    layer: Layer,
    per_run: bool,
) -> Result<usize, S::Error> {
    let back = StrokeStyle::back();
    let mut emitted = 0;

    if per_run {
        for run in split.runs() {
            let run_style = match run.facing {
                Facing::Front => style,
                Facing::Back => &back,
            };
            emitted += emit(sink, &run.points, run_style, layer)?;
        }
        return Ok(emitted);
    }

    emitted += emit(sink, split.hidden(), &back, layer)?;
    emitted += emit(sink, split.visible(), style, layer)?;
    Ok(emitted)
}

fn emit<S: PathSink>(
    sink: &mut S,
    points: &[Point3],
    style: &StrokeStyle,
    layer: Layer,
) -> Result<usize, S::Error> {
    if points.is_empty() {
        return Ok(0);
    }
    sink.polyline(points, style, layer)?;
    Ok(1)
}
