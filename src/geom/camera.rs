//! Orthographic view transform.
//!
//! A view is the pair of screen axes (`right`, `up`) expressed in the scene
//! frame. Their cross product is the depth axis, pointing from the scene origin
//! toward the viewer. A point's depth decides whether it faces the viewer.

use super::{Point3, Tolerance, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("view angles must be finite")]
    NonFiniteAngle,
    #[error("view axes must be finite and non-zero")]
    DegenerateAxis,
    #[error("right and up axes are parallel")]
    ParallelAxes,
}

/// Which side of the silhouette a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    right: Vec3,
    up: Vec3,
    depth: Vec3,
}

impl ViewTransform {
    /// Main coordinates in the tikz-3dplot convention.
    ///
    /// `theta` tilts the view axis away from +Z (0 looks straight down),
    /// `phi` turns the scene about +Z. Both in degrees.
    pub fn from_main_coords(theta: f64, phi: f64) -> Result<Self, CameraError> {
        if !theta.is_finite() || !phi.is_finite() {
            return Err(CameraError::NonFiniteAngle);
        }
        let (st, ct) = theta.to_radians().sin_cos();
        let (sp, cp) = phi.to_radians().sin_cos();
        let right = Vec3::new(cp, sp, 0.0);
        let up = Vec3::new(-ct * sp, ct * cp, st);
        Ok(Self::from_rows(right, up))
    }

    /// Build from explicit screen axes. `up` is re-orthogonalized against `right`.
    pub fn from_right_up(right: Vec3, up: Vec3) -> Result<Self, CameraError> {
        if !right.is_finite() || !up.is_finite() {
            return Err(CameraError::DegenerateAxis);
        }
        let right = right.normalized().ok_or(CameraError::DegenerateAxis)?;
        let up = up.normalized().ok_or(CameraError::DegenerateAxis)?;
        let ortho_up = up.sub(right.mul_scalar(right.dot(up)));
        if Tolerance::default_geom().is_zero_vec3(ortho_up) {
            return Err(CameraError::ParallelAxes);
        }
        let up = ortho_up.normalized().ok_or(CameraError::ParallelAxes)?;
        Ok(Self::from_rows(right, up))
    }

    /// A viewer placed along `toward_viewer` (from the origin), keeping `up_hint`
    /// as close to screen-up as possible.
    pub fn looking_from(toward_viewer: Vec3, up_hint: Vec3) -> Result<Self, CameraError> {
        let depth = toward_viewer.normalized().ok_or(CameraError::DegenerateAxis)?;
        let right = up_hint
            .cross(depth)
            .normalized()
            .ok_or(CameraError::ParallelAxes)?;
        let up = depth.cross(right);
        Ok(Self::from_rows(right, up))
    }

    fn from_rows(right: Vec3, up: Vec3) -> Self {
        // (r2·u3 − r3·u2, u1·r3 − r1·u3, r1·u2 − r2·u1)
        let depth = Vec3::new(
            right.y * up.z - right.z * up.y,
            up.x * right.z - right.x * up.z,
            right.x * up.y - right.y * up.x,
        );
        Self { right, up, depth }
    }

    #[must_use]
    pub const fn right(&self) -> Vec3 {
        self.right
    }

    #[must_use]
    pub const fn up(&self) -> Vec3 {
        self.up
    }

    /// Unit direction from the scene origin toward the viewer.
    #[must_use]
    pub const fn view_direction(&self) -> Vec3 {
        self.depth
    }

    /// Signed depth of `p`; positive is nearer the viewer than the origin.
    #[must_use]
    pub fn depth_of(&self, p: Point3) -> f64 {
        self.depth.dot(p.to_vec3())
    }

    /// Zero depth counts as front-facing.
    #[must_use]
    pub fn facing(&self, p: Point3) -> Facing {
        if self.depth_of(p) < 0.0 {
            Facing::Back
        } else {
            Facing::Front
        }
    }

    #[must_use]
    pub fn is_visible(&self, p: Point3) -> bool {
        self.facing(p) == Facing::Front
    }

    /// Facing of a direction (e.g. a face normal) rather than a position.
    #[must_use]
    pub fn faces_viewer(&self, normal: Vec3) -> bool {
        self.depth.dot(normal) >= 0.0
    }

    /// Screen coordinates `(x, y)` of `p`, y pointing up.
    #[must_use]
    pub fn project(&self, p: Point3) -> (f64, f64) {
        let v = p.to_vec3();
        (self.right.dot(v), self.up.dot(v))
    }

    /// Screen position packed as `(x, y, depth)`.
    #[must_use]
    pub fn project_with_depth(&self, p: Point3) -> Point3 {
        let (x, y) = self.project(p);
        Point3::new(x, y, self.depth_of(p))
    }
}

impl Default for ViewTransform {
    /// Straight down the +Z axis with +X to the right.
    fn default() -> Self {
        Self::from_rows(Vec3::X, Vec3::Y)
    }
}
