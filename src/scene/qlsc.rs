//! Quadrilaterized spherical cube geometry: the cube [-1, 1]³ projected radially
//! onto the sphere.
//!
//! Every straight line on a cube face lies in a plane through the origin, so
//! its radial projection is a great-circle arc. Face grids therefore go through
//! the same arc renderer as any other arc.

use crate::geom::{Point3, Vec3, ViewTransform};

/// Highest supported bin level; 2^6 = 64 lines per face side.
pub const MAX_BIN_LEVEL: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeFace {
    pub normal: Vec3,
    pub u: Vec3,
    pub v: Vec3,
}

impl CubeFace {
    /// Point on the face at face coordinates `(s, t)`, both in `[-1, 1]`.
    #[must_use]
    pub fn point(&self, s: f64, t: f64) -> Vec3 {
        self.normal + self.u.mul_scalar(s) + self.v.mul_scalar(t)
    }
}

/// Faces in Q3C order: 0 is the top (+Z), 1 to 4 are the sides facing
/// azimuth 0°, 90°, 180° and 270° (+X, +Y, −X, −Y), 5 is the bottom (−Z).
pub const FACES: [CubeFace; 6] = [
    CubeFace { normal: Vec3::Z, u: Vec3::X, v: Vec3::Y },
    CubeFace { normal: Vec3::X, u: Vec3::Y, v: Vec3::Z },
    CubeFace { normal: Vec3::Y, u: Vec3::new(-1.0, 0.0, 0.0), v: Vec3::Z },
    CubeFace { normal: Vec3::new(-1.0, 0.0, 0.0), u: Vec3::new(0.0, -1.0, 0.0), v: Vec3::Z },
    CubeFace { normal: Vec3::new(0.0, -1.0, 0.0), u: Vec3::X, v: Vec3::Z },
    CubeFace { normal: Vec3::new(0.0, 0.0, -1.0), u: Vec3::X, v: Vec3::new(0.0, -1.0, 0.0) },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLineKind {
    /// One of the 12 cube edges.
    Edge,
    /// A subdivision line inside a face.
    Interior,
}

/// A straight segment on the cube surface; both ends are cube points, not
/// sphere points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub start: Vec3,
    pub end: Vec3,
    pub kind: GridLineKind,
}

/// Lines per face side at `bin_level`; also the bins per side (`nside`).
#[must_use]
pub fn lines_per_side(bin_level: u32) -> u32 {
    1 << bin_level.min(MAX_BIN_LEVEL)
}

/// Bins on the whole sphere: `6 · nside²`.
#[must_use]
pub fn bin_count(bin_level: u32) -> u64 {
    let nside = u64::from(lines_per_side(bin_level));
    6 * nside * nside
}

/// Cube-surface corners of bin `(ix, iy)` on `face`, counter-clockwise seen
/// from outside. `None` when the face or either index is out of range.
#[must_use]
pub fn bin_corners(face: usize, ix: u32, iy: u32, bin_level: u32) -> Option<[Vec3; 4]> {
    let face = FACES.get(face)?;
    let nside = lines_per_side(bin_level);
    if ix >= nside || iy >= nside {
        return None;
    }
    let d = 2.0 / f64::from(nside);
    let x = -1.0 + d * f64::from(ix);
    let y = -1.0 + d * f64::from(iy);
    Some([
        face.point(x, y),
        face.point(x + d, y),
        face.point(x + d, y + d),
        face.point(x, y + d),
    ])
}

/// Cube corners `(±1, ±1, ±1)`, indexed by sign bits (bit 0 = x, 1 = y, 2 = z).
#[must_use]
pub fn corners() -> [Vec3; 8] {
    std::array::from_fn(|i| {
        let sign = |bit: usize| if i & (1 << bit) == 0 { -1.0 } else { 1.0 };
        Vec3::new(sign(0), sign(1), sign(2))
    })
}

/// Corner index pairs joined by a cube edge.
#[must_use]
pub fn edge_indices() -> Vec<(usize, usize)> {
    let mut edges = Vec::with_capacity(12);
    for i in 0..8_usize {
        for bit in 0..3 {
            let j = i ^ (1 << bit);
            if i < j {
                edges.push((i, j));
            }
        }
    }
    edges
}

/// The 12 cube edges followed by the interior lines of every face.
///
/// Edges are listed once even though each borders two faces.
#[must_use]
pub fn grid_lines(bin_level: u32) -> Vec<GridLine> {
    let n = lines_per_side(bin_level);
    let corners = corners();

    let mut lines: Vec<GridLine> = edge_indices()
        .into_iter()
        .map(|(i, j)| GridLine {
            start: corners[i],
            end: corners[j],
            kind: GridLineKind::Edge,
        })
        .collect();

    for face in &FACES {
        for i in 1..n {
            let c = -1.0 + 2.0 * f64::from(i) / f64::from(n);
            lines.push(GridLine {
                start: face.point(c, -1.0),
                end: face.point(c, 1.0),
                kind: GridLineKind::Interior,
            });
            lines.push(GridLine {
                start: face.point(-1.0, c),
                end: face.point(1.0, c),
                kind: GridLineKind::Interior,
            });
        }
    }
    lines
}

/// A straight edge of the cube inscribed in the sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeEdge {
    pub start: Point3,
    pub end: Point3,
    /// Both faces meeting at this edge point away from the viewer.
    pub hidden: bool,
}

/// Edges of the cube whose corners lie on the sphere of `radius`.
#[must_use]
pub fn inscribed_cube_edges(radius: f64, view: &ViewTransform) -> Vec<CubeEdge> {
    let scale = radius / 3.0_f64.sqrt();
    let corners = corners();
    edge_indices()
        .into_iter()
        .map(|(i, j)| {
            let (a, b) = (corners[i], corners[j]);
            // The edge runs along the axis whose sign bit differs; its two
            // faces are normal to the remaining axes.
            let moving_bit = i ^ j;
            let hidden = (0..3)
                .filter(|bit| 1 << bit != moving_bit)
                .map(|bit| {
                    let mut normal = [0.0; 3];
                    normal[bit] = a.to_array()[bit];
                    Vec3::from(normal)
                })
                .all(|normal| !view.faces_viewer(normal));
            CubeEdge {
                start: a.mul_scalar(scale).into(),
                end: b.mul_scalar(scale).into(),
                hidden,
            }
        })
        .collect()
}
