//! Parser for `<scene>` XML descriptions.
//!
//! ```xml
//! <scene radius="3" elevation="70" azimuth="115" bin-level="2">
//!   <sphere fill="sky" opacity="0.25"/>
//!   <grid color="navy" width="0.6"/>
//!   <edges width="1.2"/>
//!   <cube show="false"/>
//!   <axes length="4.5"/>
//!   <bin face="1" ix="0" iy="1" color="orange"/>
//!   <arc theta1="0" phi1="0" theta2="45" phi2="90" color="red"/>
//! </scene>
//! ```
//!
//! Every attribute and child is optional and children may come in any order;
//! anything absent keeps the [`SceneConfig`] default. `<bin>` picks a face
//! (Q3C numbering, 0 = top, 1 to 4 = sides, 5 = bottom) and a cell at the
//! scene's bin level.

use std::num::ParseFloatError;

use quick_xml::de::from_str;
use serde::Deserialize;
use thiserror::Error;

use crate::scene::{ArcSpec, BinSpec, Color, SceneConfig, SceneError, StrokeStyle};

/// Result type for scene parsing.
pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::DeError),
    #[error("not a scene document: {0}")]
    Document(String),
    #[error("invalid dash pattern: {0}")]
    Number(#[from] ParseFloatError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Read a scene description and validate the resulting configuration.
pub fn parse_str(input: &str) -> ParseResult<SceneConfig> {
    match root_name(input) {
        Some("scene") => {}
        Some(other) => {
            return Err(ParseError::Document(format!(
                "expected a <scene> root, found <{other}>"
            )));
        }
        None => {
            return Err(ParseError::Document("no root element".to_owned()));
        }
    }

    log::debug!("parsing scene document");
    let document: SceneDocument = from_str(input)?;
    let config = document.into_config()?;
    config.validate()?;
    log::debug!(
        "scene parsed: bin level {}, {} extra arcs",
        config.bin_level,
        config.arcs.len()
    );
    Ok(config)
}

fn strip_xml_preamble(input: &str) -> &str {
    let trimmed = input.trim_start_matches(|c: char| c == '\u{feff}' || c.is_whitespace());
    if let Some(rest) = trimmed.strip_prefix("<?xml") {
        if let Some(idx) = rest.find("?>") {
            return rest[idx + 2..].trim_start();
        }
    }
    trimmed
}

/// Tag name of the first element, past the declaration, comments, processing
/// instructions and doctype.
fn root_name(input: &str) -> Option<&str> {
    let mut rest = strip_xml_preamble(input);
    loop {
        if let Some(comment) = rest.strip_prefix("<!--") {
            rest = &comment[comment.find("-->")? + 3..];
        } else if rest.starts_with("<?") || rest.starts_with("<!") {
            rest = &rest[rest.find('>')? + 1..];
        } else {
            break;
        }
        rest = rest.trim_start();
    }
    let tag = rest.strip_prefix('<')?;
    let end = tag
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(tag.len());
    Some(&tag[..end]).filter(|name| !name.is_empty())
}

/// `"3 2"` or `"3,2"`; empty or `none` means solid.
fn parse_dash(pattern: &str) -> ParseResult<Option<Vec<f64>>> {
    let pattern = pattern.trim();
    if pattern.is_empty() || pattern.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let values = pattern
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<Vec<f64>, _>>()?;
    Ok(Some(values))
}

#[derive(Debug, Deserialize)]
struct SceneDocument {
    #[serde(default, rename = "@radius")]
    radius: Option<f64>,
    #[serde(default, rename = "@elevation")]
    elevation: Option<f64>,
    #[serde(default, rename = "@azimuth")]
    azimuth: Option<f64>,
    #[serde(default, rename = "@bin-level")]
    bin_level: Option<u32>,
    #[serde(default, rename = "@split-runs")]
    split_runs: Option<bool>,
    #[serde(default)]
    sphere: Option<SphereElement>,
    #[serde(default)]
    grid: Option<StrokeElement>,
    #[serde(default)]
    edges: Option<StrokeElement>,
    #[serde(default)]
    cube: Option<StrokeElement>,
    #[serde(default)]
    axes: Option<AxesElement>,
    #[serde(default, rename = "bin")]
    bins: Vec<BinElement>,
    #[serde(default, rename = "arc")]
    arcs: Vec<ArcElement>,
}

#[derive(Debug, Default, Deserialize)]
struct SphereElement {
    #[serde(default, rename = "@show")]
    show: Option<bool>,
    #[serde(default, rename = "@fill")]
    fill: Option<Color>,
    #[serde(default, rename = "@opacity")]
    opacity: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct StrokeElement {
    #[serde(default, rename = "@show")]
    show: Option<bool>,
    #[serde(default, rename = "@color")]
    color: Option<Color>,
    #[serde(default, rename = "@width")]
    width: Option<f64>,
    #[serde(default, rename = "@opacity")]
    opacity: Option<f64>,
    #[serde(default, rename = "@dash")]
    dash: Option<String>,
}

impl StrokeElement {
    fn apply(&self, base: &StrokeStyle) -> ParseResult<StrokeStyle> {
        let mut style = base.clone();
        if let Some(color) = self.color {
            style.color = color;
        }
        if let Some(width) = self.width {
            style.width = width;
        }
        if let Some(opacity) = self.opacity {
            style = style.with_opacity(opacity);
        }
        if let Some(dash) = self.dash.as_deref() {
            style.dash = parse_dash(dash)?;
        }
        Ok(style)
    }

    fn has_style(&self) -> bool {
        self.color.is_some() || self.width.is_some() || self.opacity.is_some() || self.dash.is_some()
    }
}

// Stroke attributes are repeated rather than flattened: flattened fields reach
// serde as untyped strings, which breaks numeric attributes.
#[derive(Debug, Deserialize)]
struct AxesElement {
    #[serde(default, rename = "@length")]
    length: Option<f64>,
    #[serde(default, rename = "@show")]
    show: Option<bool>,
    #[serde(default, rename = "@color")]
    color: Option<Color>,
    #[serde(default, rename = "@width")]
    width: Option<f64>,
    #[serde(default, rename = "@opacity")]
    opacity: Option<f64>,
    #[serde(default, rename = "@dash")]
    dash: Option<String>,
}

impl AxesElement {
    fn stroke(&self) -> StrokeElement {
        StrokeElement {
            show: self.show,
            color: self.color,
            width: self.width,
            opacity: self.opacity,
            dash: self.dash.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ArcElement {
    #[serde(rename = "@theta1")]
    theta1: f64,
    #[serde(rename = "@phi1")]
    phi1: f64,
    #[serde(rename = "@theta2")]
    theta2: f64,
    #[serde(rename = "@phi2")]
    phi2: f64,
    #[serde(default, rename = "@color")]
    color: Option<Color>,
    #[serde(default, rename = "@width")]
    width: Option<f64>,
    #[serde(default, rename = "@opacity")]
    opacity: Option<f64>,
    #[serde(default, rename = "@dash")]
    dash: Option<String>,
}

impl ArcElement {
    fn stroke(&self) -> StrokeElement {
        StrokeElement {
            show: None,
            color: self.color,
            width: self.width,
            opacity: self.opacity,
            dash: self.dash.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct BinElement {
    #[serde(rename = "@face")]
    face: u8,
    #[serde(rename = "@ix")]
    ix: u32,
    #[serde(rename = "@iy")]
    iy: u32,
    #[serde(default, rename = "@color")]
    color: Option<Color>,
    #[serde(default, rename = "@width")]
    width: Option<f64>,
    #[serde(default, rename = "@opacity")]
    opacity: Option<f64>,
    #[serde(default, rename = "@dash")]
    dash: Option<String>,
}

impl BinElement {
    fn stroke(&self) -> StrokeElement {
        StrokeElement {
            show: None,
            color: self.color,
            width: self.width,
            opacity: self.opacity,
            dash: self.dash.clone(),
        }
    }
}

impl SceneDocument {
    fn into_config(self) -> ParseResult<SceneConfig> {
        let mut config = SceneConfig::default();
        if let Some(radius) = self.radius {
            config.radius = radius;
        }
        if let Some(elevation) = self.elevation {
            config.elevation = elevation;
        }
        if let Some(azimuth) = self.azimuth {
            config.azimuth = azimuth;
        }
        if let Some(level) = self.bin_level {
            config.bin_level = level;
        }
        if let Some(split_runs) = self.split_runs {
            config.split_runs = split_runs;
        }

        if let Some(sphere) = self.sphere {
            config.show_sphere = sphere.show.unwrap_or(true);
            if let Some(fill) = sphere.fill {
                config.sphere_fill.color = fill;
            }
            if let Some(opacity) = sphere.opacity {
                config.sphere_fill.opacity = opacity;
            }
        }
        if let Some(grid) = self.grid {
            config.show_grid = grid.show.unwrap_or(true);
            config.grid_style = grid.apply(&config.grid_style)?;
        }
        if let Some(edges) = self.edges {
            config.show_edges = edges.show.unwrap_or(true);
            config.edge_style = edges.apply(&config.edge_style)?;
        }
        if let Some(cube) = self.cube {
            config.show_cube = cube.show.unwrap_or(true);
            config.cube_style = cube.apply(&config.cube_style)?;
        }
        if let Some(axes) = self.axes {
            let stroke = axes.stroke();
            config.show_axes = stroke.show.unwrap_or(true);
            config.axis_style = stroke.apply(&config.axis_style)?;
            config.axis_length = axes.length;
        }

        for bin in self.bins {
            let mut spec = BinSpec::new(bin.face, bin.ix, bin.iy);
            let stroke = bin.stroke();
            if stroke.has_style() {
                spec = spec.with_style(stroke.apply(&config.bin_style)?);
            }
            config.bins.push(spec);
        }

        for arc in self.arcs {
            let mut spec = ArcSpec::new(arc.theta1, arc.phi1, arc.theta2, arc.phi2);
            let stroke = arc.stroke();
            if stroke.has_style() {
                spec = spec.with_style(stroke.apply(&config.arc_style)?);
            }
            config.arcs.push(spec);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_scene_uses_defaults() {
        let config = parse_str("<scene/>").expect("empty scene parsed");
        assert_eq!(config, SceneConfig::default());
    }

    #[test]
    fn parses_attributes_and_children() {
        let xml = r##"<?xml version="1.0" encoding="UTF-8"?>
<scene radius="2" elevation="60" azimuth="30" bin-level="2" split-runs="true">
  <sphere fill="#ffffff" opacity="0.5"/>
  <grid color="gray" width="0.4" dash="1 1"/>
  <cube show="false"/>
  <axes length="3.5" color="blue"/>
  <arc theta1="0" phi1="0" theta2="45" phi2="90"/>
  <arc theta1="10" phi1="20" theta2="-10" phi2="200" color="green" width="2"/>
</scene>"##;
        let config = parse_str(xml).expect("scene parsed");

        assert!((config.radius - 2.0).abs() < f64::EPSILON);
        assert!((config.elevation - 60.0).abs() < f64::EPSILON);
        assert!((config.azimuth - 30.0).abs() < f64::EPSILON);
        assert_eq!(config.bin_level, 2);
        assert!(config.split_runs);
        assert_eq!(config.sphere_fill.color, Color::WHITE);
        assert!((config.sphere_fill.opacity - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.grid_style.color, Color::GRAY);
        assert_eq!(config.grid_style.dash, Some(vec![1.0, 1.0]));
        assert!(!config.show_cube);
        assert!(config.show_axes);
        assert_eq!(config.axis_length, Some(3.5));
        assert_eq!(config.axis_style.color, Color::BLUE);

        assert_eq!(config.arcs.len(), 2);
        assert_eq!(config.arcs[0].style, None);
        let styled = config.arcs[1].style.as_ref().expect("arc style");
        assert_eq!(styled.color, Color::GREEN);
        assert!((styled.width - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_other_roots() {
        assert!(matches!(
            parse_str("<drawing><arc/></drawing>"),
            Err(ParseError::Document(_))
        ));
        assert!(matches!(
            parse_str(r#"<scenery radius="2"/>"#),
            Err(ParseError::Document(_))
        ));
        assert!(matches!(parse_str("   "), Err(ParseError::Document(_))));
    }

    #[test]
    fn root_may_follow_comments_and_doctype() {
        let xml = "<?xml version=\"1.0\"?>\n<!-- diagram -->\n<scene radius=\"2\"/>";
        let config = parse_str(xml).expect("scene after comment");
        assert!((config.radius - 2.0).abs() < f64::EPSILON);
        assert_eq!(root_name("<!DOCTYPE scene>\n<scene>"), Some("scene"));
        assert_eq!(root_name("<scene\tradius=\"1\"/>"), Some("scene"));
        assert_eq!(root_name("<!-- open"), None);
    }

    #[test]
    fn children_may_interleave() {
        let xml = r#"<scene bin-level="2">
  <arc theta1="0" phi1="0" theta2="45" phi2="90"/>
  <grid width="1" opacity="0.5"/>
  <bin face="0" ix="1" iy="3"/>
  <arc theta1="10" phi1="20" theta2="-10" phi2="150"/>
  <!-- a second highlight -->
  <bin face="5" ix="0" iy="0" color="blue" opacity="0.7"/>
</scene>"#;
        let config = parse_str(xml).expect("interleaved scene");
        assert_eq!(config.arcs.len(), 2);
        assert!((config.grid_style.width - 1.0).abs() < f64::EPSILON);
        assert!((config.grid_style.opacity - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.bins.len(), 2);
        assert_eq!(config.bins[0], BinSpec::new(0, 1, 3));
        let style = config.bins[1].style.as_ref().expect("bin style");
        assert_eq!(style.color, Color::BLUE);
        assert!((style.opacity - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn edges_can_be_hidden() {
        let config = parse_str(r#"<scene><edges show="false" width="2"/></scene>"#)
            .expect("edges parsed");
        assert!(!config.show_edges);
        assert!(config.show_grid);
        assert!((config.edge_style.width - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bins_are_checked_against_the_bin_level() {
        assert!(matches!(
            parse_str(r#"<scene bin-level="1"><bin face="3" ix="2" iy="0"/></scene>"#),
            Err(ParseError::Scene(SceneError::InvalidBin { face: 3, ix: 2, .. }))
        ));
    }

    #[test]
    fn invalid_values_surface_as_errors() {
        assert!(matches!(
            parse_str(r#"<scene bin-level="9"/>"#),
            Err(ParseError::Scene(SceneError::InvalidBinLevel { level: 9, .. }))
        ));
        assert!(matches!(
            parse_str(r#"<scene><grid dash="3 x"/></scene>"#),
            Err(ParseError::Number(_))
        ));
        assert!(matches!(
            parse_str(r#"<scene><grid color="plaid"/></scene>"#),
            Err(ParseError::Xml(_))
        ));
        assert!(matches!(
            parse_str(r#"<scene radius="abc"/>"#),
            Err(ParseError::Xml(_))
        ));
    }

    #[test]
    fn dash_patterns() {
        assert_eq!(parse_dash("none").unwrap(), None);
        assert_eq!(parse_dash("").unwrap(), None);
        assert_eq!(parse_dash("4, 2 1").unwrap(), Some(vec![4.0, 2.0, 1.0]));
    }
}
