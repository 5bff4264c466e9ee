//! SVG writer.
//!
//! Scene points are projected with the view transform, then mapped to the page
//! with a uniform scale and the y axis flipped.

use std::fmt::Write as _;
use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::RenderError;
use crate::geom::{BBox, Point3, ViewTransform};
use crate::scene::{Color, DrawCommand, Drawing, FillStyle, Layer, PathSink, StrokeStyle};

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const LABEL_OFFSET: f64 = 4.0;
const LABEL_FONT_SIZE: f64 = 12.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SvgOptions {
    /// Page units per scene unit.
    pub scale: f64,
    /// Blank border around the drawing, in page units.
    pub margin: f64,
    /// Decimal places for coordinates.
    pub precision: usize,
    pub background: Option<Color>,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            scale: 60.0,
            margin: 20.0,
            precision: 2,
            background: None,
        }
    }
}

impl SvgOptions {
    fn validate(&self) -> Result<(), RenderError> {
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(RenderError::InvalidOptions("scale must be finite and positive"));
        }
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            return Err(RenderError::InvalidOptions("margin must be finite and non-negative"));
        }
        Ok(())
    }
}

/// Maps projected scene coordinates to page coordinates.
#[derive(Debug, Clone, Copy)]
struct PageFrame {
    view: ViewTransform,
    min_x: f64,
    max_y: f64,
    scale: f64,
    margin: f64,
    width: f64,
    height: f64,
}

impl PageFrame {
    fn fit(drawing: &Drawing, view: &ViewTransform, options: &SvgOptions) -> Self {
        let projected = |p: Point3| {
            let (x, y) = view.project(p);
            Point3::new(x, y, 0.0)
        };
        let bounds = drawing
            .commands()
            .iter()
            .fold(None, |bounds: Option<BBox>, command| {
                let extent = match command {
                    DrawCommand::Disc { center, radius, .. } => {
                        BBox::new(projected(*center), projected(*center)).expand_by(*radius)
                    }
                    DrawCommand::Label { at, .. } => {
                        // Room for one glyph right of and above the anchor.
                        let pad = (LABEL_OFFSET + LABEL_FONT_SIZE) / options.scale;
                        let anchor = projected(*at);
                        BBox::new(anchor, anchor.add_vec(crate::geom::Vec3::new(pad, pad, 0.0)))
                    }
                    DrawCommand::Polyline { points, .. } => {
                        let points: Vec<Point3> = points.iter().copied().map(projected).collect();
                        match BBox::from_points(&points) {
                            Some(b) => b,
                            None => return bounds,
                        }
                    }
                    DrawCommand::Segment { start, end, .. } => {
                        BBox::new(projected(*start), projected(*start)).expand_point(projected(*end))
                    }
                };
                Some(bounds.map_or(extent, |b| b.union(extent)))
            })
            .unwrap_or_else(|| BBox::new(Point3::ORIGIN, Point3::ORIGIN));

        let size = bounds.size();
        Self {
            view: *view,
            min_x: bounds.min.x,
            max_y: bounds.max.y,
            scale: options.scale,
            margin: options.margin,
            width: size.x * options.scale + 2.0 * options.margin,
            height: size.y * options.scale + 2.0 * options.margin,
        }
    }

    fn to_page(&self, p: Point3) -> (f64, f64) {
        let (x, y) = self.view.project(p);
        (
            (x - self.min_x) * self.scale + self.margin,
            (self.max_y - y) * self.scale + self.margin,
        )
    }
}

/// Fixed-precision number without trailing zeros or negative zero.
fn fmt_num(value: f64, precision: usize) -> String {
    let mut text = format!("{value:.precision$}");
    if text.contains('.') {
        let trimmed = text.trim_end_matches('0').trim_end_matches('.').len();
        text.truncate(trimmed);
    }
    if text == "-0" {
        text.remove(0);
    }
    text
}

struct SvgSink {
    writer: Writer<Cursor<Vec<u8>>>,
    frame: PageFrame,
    precision: usize,
}

impl SvgSink {
    fn num(&self, value: f64) -> String {
        fmt_num(value, self.precision)
    }

    fn write(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        self.writer
            .write_event(event)
            .map_err(|err| RenderError::Xml(err.to_string()))
    }

    fn stroke_attributes(&self, element: &mut BytesStart<'_>, style: &StrokeStyle, layer: Layer) {
        element.push_attribute(("class", layer.name()));
        element.push_attribute(("fill", "none"));
        element.push_attribute(("stroke", style.color.to_hex().as_str()));
        element.push_attribute(("stroke-width", self.num(style.width).as_str()));
        element.push_attribute(("stroke-linecap", "round"));
        element.push_attribute(("stroke-linejoin", "round"));
        if style.opacity < 1.0 {
            element.push_attribute(("stroke-opacity", self.num(style.opacity).as_str()));
        }
        if let Some(dash) = style.dash.as_ref().filter(|_| style.is_dashed()) {
            let pattern: Vec<String> = dash.iter().map(|v| self.num(*v)).collect();
            element.push_attribute(("stroke-dasharray", pattern.join(" ").as_str()));
        }
    }

    fn path_data(&self, points: &[Point3]) -> String {
        let mut data = String::new();
        for (i, p) in points.iter().enumerate() {
            let (x, y) = self.frame.to_page(*p);
            let command = if i == 0 { 'M' } else { 'L' };
            if i > 0 {
                data.push(' ');
            }
            let _ = write!(data, "{command}{} {}", self.num(x), self.num(y));
        }
        if let [single] = points {
            // A lone sample still shows up as a round dot.
            let (x, y) = self.frame.to_page(*single);
            let _ = write!(data, " L{} {}", self.num(x), self.num(y));
        }
        data
    }
}

impl PathSink for SvgSink {
    type Error = RenderError;

    fn polyline(
        &mut self,
        points: &[Point3],
        style: &StrokeStyle,
        layer: Layer,
    ) -> Result<(), Self::Error> {
        if points.is_empty() {
            return Ok(());
        }
        let mut path = BytesStart::new("path");
        path.push_attribute(("d", self.path_data(points).as_str()));
        self.stroke_attributes(&mut path, style, layer);
        self.write(Event::Empty(path))
    }

    fn segment(
        &mut self,
        start: Point3,
        end: Point3,
        style: &StrokeStyle,
        layer: Layer,
    ) -> Result<(), Self::Error> {
        let (x1, y1) = self.frame.to_page(start);
        let (x2, y2) = self.frame.to_page(end);
        let mut line = BytesStart::new("line");
        line.push_attribute(("x1", self.num(x1).as_str()));
        line.push_attribute(("y1", self.num(y1).as_str()));
        line.push_attribute(("x2", self.num(x2).as_str()));
        line.push_attribute(("y2", self.num(y2).as_str()));
        self.stroke_attributes(&mut line, style, layer);
        self.write(Event::Empty(line))
    }

    fn disc(&mut self, center: Point3, radius: f64, fill: &FillStyle) -> Result<(), Self::Error> {
        let (cx, cy) = self.frame.to_page(center);
        let mut circle = BytesStart::new("circle");
        circle.push_attribute(("class", Layer::Sphere.name()));
        circle.push_attribute(("cx", self.num(cx).as_str()));
        circle.push_attribute(("cy", self.num(cy).as_str()));
        circle.push_attribute(("r", self.num(radius * self.frame.scale).as_str()));
        circle.push_attribute(("fill", fill.color.to_hex().as_str()));
        circle.push_attribute(("fill-opacity", self.num(fill.opacity).as_str()));
        circle.push_attribute(("stroke", fill.color.to_hex().as_str()));
        self.write(Event::Empty(circle))
    }

    fn label(&mut self, at: Point3, text: &str, color: Color) -> Result<(), Self::Error> {
        let (x, y) = self.frame.to_page(at);
        let mut element = BytesStart::new("text");
        element.push_attribute(("class", Layer::Axes.name()));
        element.push_attribute(("x", self.num(x + LABEL_OFFSET).as_str()));
        element.push_attribute(("y", self.num(y - LABEL_OFFSET).as_str()));
        element.push_attribute(("fill", color.to_hex().as_str()));
        element.push_attribute(("font-size", self.num(LABEL_FONT_SIZE).as_str()));
        element.push_attribute(("font-family", "sans-serif"));
        self.write(Event::Start(element))?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.write(Event::End(BytesEnd::new("text")))
    }
}

/// Serialize `drawing` as a standalone SVG document.
pub fn write_svg(
    drawing: &Drawing,
    view: &ViewTransform,
    options: &SvgOptions,
) -> Result<String, RenderError> {
    options.validate()?;
    let frame = PageFrame::fit(drawing, view, options);
    let mut sink = SvgSink {
        writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
        frame,
        precision: options.precision,
    };

    sink.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let width = sink.num(frame.width);
    let height = sink.num(frame.height);
    let view_box = format!("0 0 {width} {height}");
    let mut root = BytesStart::new("svg");
    root.push_attribute(("xmlns", SVG_NS));
    root.push_attribute(("width", width.as_str()));
    root.push_attribute(("height", height.as_str()));
    root.push_attribute(("viewBox", view_box.as_str()));
    sink.write(Event::Start(root))?;

    if let Some(background) = options.background {
        let mut rect = BytesStart::new("rect");
        rect.push_attribute(("width", "100%"));
        rect.push_attribute(("height", "100%"));
        rect.push_attribute(("fill", background.to_hex().as_str()));
        sink.write(Event::Empty(rect))?;
    }

    drawing.replay(&mut sink)?;
    sink.write(Event::End(BytesEnd::new("svg")))?;

    log::debug!(
        "wrote SVG: {} commands on a {width} x {height} page",
        drawing.len()
    );
    let bytes = sink.writer.into_inner().into_inner();
    Ok(String::from_utf8(bytes)?)
}
