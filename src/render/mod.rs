//! Output writers for recorded drawings.

mod svg;

pub use svg::{SvgOptions, write_svg};

use std::string::FromUtf8Error;

use thiserror::Error;

use crate::geom::TimingBucket;
use crate::scene::Scene;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write XML: {0}")]
    Xml(String),
    #[error("writer produced invalid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),
    #[error("invalid render option: {0}")]
    InvalidOptions(&'static str),
}

/// Write `scene` as SVG, recording the write time in its diagnostics.
pub fn render_svg(scene: &mut Scene, options: &SvgOptions) -> Result<String, RenderError> {
    scene.timed(TimingBucket::SvgWrite, |scene| {
        write_svg(&scene.drawing, &scene.view, options)
    })
}
