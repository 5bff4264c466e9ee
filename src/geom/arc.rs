//! Minor great-circle arcs sampled in 1° steps and split by visibility.
//!
//! The arc frame is built from the first endpoint `A`, the plane normal
//! `C = |A × B|·r` and `D = |A × C|·r`. Samples are `cos(k°)·A − s·sin(k°)·D`
//! for `k = 0..=n`, followed by `B` itself.

use super::camera::{Facing, ViewTransform};
use super::diagnostics::ArcDiagnostics;
use super::spherical::SphericalCoord;
use super::{Point3, Tolerance, Vec3};

/// Why an arc could not be built. The renderer treats every variant as
/// "draw nothing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ArcError {
    #[error("sphere radius must be finite and positive")]
    InvalidRadius,
    #[error("arc endpoints must be finite")]
    NonFiniteInput,
    #[error("arc endpoints are coincident or antipodal, the arc plane is undefined")]
    UndefinedPlane,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GreatCircleArc {
    start: Point3,
    end: Point3,
    normal: Vec3,
    binormal: Vec3,
    radius: f64,
    angle: f64,
    direction: f64,
}

impl GreatCircleArc {
    /// Arc between two (declination, azimuth) pairs in degrees.
    pub fn from_angles(
        theta1: f64,
        phi1: f64,
        theta2: f64,
        phi2: f64,
        radius: f64,
    ) -> Result<Self, ArcError> {
        Self::from_spherical(
            SphericalCoord::new(theta1, phi1),
            SphericalCoord::new(theta2, phi2),
            radius,
        )
    }

    pub fn from_spherical(
        a: SphericalCoord,
        b: SphericalCoord,
        radius: f64,
    ) -> Result<Self, ArcError> {
        validate_radius(radius)?;
        if !a.is_finite() || !b.is_finite() {
            return Err(ArcError::NonFiniteInput);
        }
        Self::from_sphere_points(a.to_cartesian(radius), b.to_cartesian(radius), radius)
    }

    /// Arc between the radial projections of two directions onto the sphere.
    ///
    /// Used for cube-face grid lines, whose endpoints lie on the cube rather
    /// than on the sphere.
    pub fn from_directions(a: Vec3, b: Vec3, radius: f64) -> Result<Self, ArcError> {
        validate_radius(radius)?;
        if !a.is_finite() || !b.is_finite() {
            return Err(ArcError::NonFiniteInput);
        }
        let a = a.with_length(radius).ok_or(ArcError::UndefinedPlane)?;
        let b = b.with_length(radius).ok_or(ArcError::UndefinedPlane)?;
        Self::from_sphere_points(a.into(), b.into(), radius)
    }

    fn from_sphere_points(a: Point3, b: Point3, radius: f64) -> Result<Self, ArcError> {
        let av = a.to_vec3();
        let bv = b.to_vec3();
        let r2 = radius * radius;

        let cross = av.cross(bv);
        // |A × B| = r²·sin(angle)
        if cross.length() <= Tolerance::default_geom().scaled(r2).eps {
            return Err(ArcError::UndefinedPlane);
        }
        let normal = cross.with_length(radius).ok_or(ArcError::UndefinedPlane)?;

        let cos_angle = (av.dot(bv) / r2).clamp(-1.0, 1.0);
        let angle = cos_angle.acos().to_degrees();

        let binormal = av
            .cross(normal)
            .with_length(radius)
            .ok_or(ArcError::UndefinedPlane)?;

        // Raw angle is non-negative by construction of acos, kept for the walk.
        let direction = if angle < 0.0 { -1.0 } else { 1.0 };

        Ok(Self {
            start: a,
            end: b,
            normal,
            binormal,
            radius,
            angle,
            direction,
        })
    }

    #[must_use]
    pub const fn start(&self) -> Point3 {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> Point3 {
        self.end
    }

    /// Plane normal scaled to the radius (`C`).
    #[must_use]
    pub const fn normal(&self) -> Vec3 {
        self.normal
    }

    /// In-plane axis completing the frame (`D`).
    #[must_use]
    pub const fn binormal(&self) -> Vec3 {
        self.binormal
    }

    #[must_use]
    pub const fn radius(&self) -> f64 {
        self.radius
    }

    /// Angular length in degrees, within `[0, 180]`.
    #[must_use]
    pub const fn angle(&self) -> f64 {
        self.angle
    }

    #[must_use]
    pub const fn direction(&self) -> f64 {
        self.direction
    }

    /// Number of whole-degree steps walked before `B` is appended.
    #[must_use]
    pub fn step_count(&self) -> usize {
        // angle is in [0, 180]
        self.angle.abs().round() as usize
    }

    #[must_use]
    pub fn point_at_step(&self, k: usize) -> Point3 {
        let (sin_k, cos_k) = (k as f64).to_radians().sin_cos();
        let a = self.start.to_vec3().mul_scalar(cos_k);
        let d = self.binormal.mul_scalar(self.direction * sin_k);
        a.sub(d).into()
    }

    /// Sampled points in walk order: every whole degree, then `B`.
    #[must_use]
    pub fn sample_points(&self) -> Vec<Point3> {
        let steps = self.step_count();
        let mut points = Vec::with_capacity(steps + 2);
        points.extend((0..=steps).map(|k| self.point_at_step(k)));
        points.push(self.end);
        points
    }

    /// Walk the arc and sort every sample into the visible or hidden list.
    #[must_use]
    pub fn split(&self, view: &ViewTransform) -> PolylineSplit {
        let mut split = PolylineSplit::default();
        for point in self.sample_points() {
            split.push(point, view.facing(point));
        }
        log::trace!(
            "arc {:.3}° split into {} visible / {} hidden samples",
            self.angle,
            split.visible.len(),
            split.hidden.len()
        );
        split
    }
}

fn validate_radius(radius: f64) -> Result<(), ArcError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(ArcError::InvalidRadius)
    }
}

/// Arc samples partitioned by facing.
///
/// `visible` and `hidden` each keep sampling order. Points of one class are
/// concatenated even when the arc left and re-entered that class, so a single
/// polyline through `visible` may bridge two separate spans. Use
/// [`PolylineSplit::runs`] to get the spans individually.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolylineSplit {
    visible: Vec<Point3>,
    hidden: Vec<Point3>,
    order: Vec<Facing>,
}

/// One contiguous stretch of same-facing samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRun {
    pub facing: Facing,
    pub points: Vec<Point3>,
}

impl PolylineSplit {
    pub(crate) fn push(&mut self, point: Point3, facing: Facing) {
        match facing {
            Facing::Front => self.visible.push(point),
            Facing::Back => self.hidden.push(point),
        }
        self.order.push(facing);
    }

    #[must_use]
    pub fn visible(&self) -> &[Point3] {
        &self.visible
    }

    #[must_use]
    pub fn hidden(&self) -> &[Point3] {
        &self.hidden
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// All samples restored to walk order.
    #[must_use]
    pub fn sampled_points(&self) -> Vec<Point3> {
        let mut front = self.visible.iter();
        let mut back = self.hidden.iter();
        self.order
            .iter()
            .filter_map(|facing| match facing {
                Facing::Front => front.next(),
                Facing::Back => back.next(),
            })
            .copied()
            .collect()
    }

    /// Contiguous same-facing spans in walk order.
    #[must_use]
    pub fn runs(&self) -> Vec<SplitRun> {
        let mut runs: Vec<SplitRun> = Vec::new();
        for (point, facing) in self.sampled_points().into_iter().zip(self.order.iter().copied()) {
            match runs.last_mut() {
                Some(run) if run.facing == facing => run.points.push(point),
                _ => runs.push(SplitRun {
                    facing,
                    points: vec![point],
                }),
            }
        }
        runs
    }

    #[must_use]
    pub fn diagnostics(&self) -> ArcDiagnostics {
        let run_count = self
            .order
            .windows(2)
            .filter(|pair| pair[0] != pair[1])
            .count()
            + usize::from(!self.order.is_empty());
        ArcDiagnostics {
            sample_count: self.order.len(),
            visible_count: self.visible.len(),
            hidden_count: self.hidden.len(),
            run_count,
            degenerate: false,
        }
    }
}

/// Build and split the arc from `a` to `b`.
///
/// An undefined arc (coincident or antipodal endpoints, bad radius, non-finite
/// input) yields an empty split instead of an error so one bad arc never
/// aborts a scene.
#[must_use]
pub fn render_arc(
    a: SphericalCoord,
    b: SphericalCoord,
    radius: f64,
    view: &ViewTransform,
) -> PolylineSplit {
    match GreatCircleArc::from_spherical(a, b, radius) {
        Ok(arc) => arc.split(view),
        Err(err) => {
            log::debug!("skipping arc {a:?} -> {b:?}: {err}");
            PolylineSplit::default()
        }
    }
}
