//! Spherical coordinates on a sphere centered at the origin.
//!
//! Angles are in degrees. `theta` is measured from the equatorial plane
//! (declination, positive toward +Z) and `phi` around the Z axis starting at +X.

use super::{Point3, Vec3};

/// A direction on the sphere given as (declination, azimuth) in degrees.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SphericalCoord {
    pub theta: f64,
    pub phi: f64,
}

impl SphericalCoord {
    #[must_use]
    pub const fn new(theta: f64, phi: f64) -> Self {
        Self { theta, phi }
    }

    /// Build from a colatitude (angle from the +Z pole) and azimuth.
    #[must_use]
    pub fn from_colatitude(colatitude: f64, phi: f64) -> Self {
        Self::new(90.0 - colatitude, phi)
    }

    /// Recover the spherical direction of a Cartesian point.
    ///
    /// Returns `None` for the origin or non-finite input. The azimuth is
    /// reported in `[0, 360)`; at the poles it is 0.
    #[must_use]
    pub fn from_cartesian(p: Point3) -> Option<Self> {
        let v = p.to_vec3();
        let r = v.length();
        if !r.is_finite() || r <= 0.0 {
            return None;
        }
        let theta = (v.z / r).clamp(-1.0, 1.0).asin().to_degrees();
        let phi = if v.x == 0.0 && v.y == 0.0 {
            0.0
        } else {
            v.y.atan2(v.x).to_degrees().rem_euclid(360.0)
        };
        Some(Self::new(theta, phi))
    }

    /// x = r·cos θ·cos φ, y = r·cos θ·sin φ, z = r·sin θ.
    #[must_use]
    pub fn to_cartesian(self, radius: f64) -> Point3 {
        let (sin_t, cos_t) = self.theta.to_radians().sin_cos();
        let (sin_p, cos_p) = self.phi.to_radians().sin_cos();
        Point3::new(radius * cos_t * cos_p, radius * cos_t * sin_p, radius * sin_t)
    }

    #[must_use]
    pub fn unit_vector(self) -> Vec3 {
        self.to_cartesian(1.0).to_vec3()
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.theta.is_finite() && self.phi.is_finite()
    }
}

/// Great-circle distance between two directions in degrees (haversine form).
///
/// Independent of the vector formulation used by the arc renderer, so the two
/// can be checked against each other.
#[must_use]
pub fn angular_distance(a: SphericalCoord, b: SphericalCoord) -> f64 {
    let t1 = a.theta.to_radians();
    let t2 = b.theta.to_radians();
    let dt = t2 - t1;
    let dp = (b.phi - a.phi).to_radians();
    let h = (dt * 0.5).sin().powi(2) + t1.cos() * t2.cos() * (dp * 0.5).sin().powi(2);
    (2.0 * h.sqrt().clamp(0.0, 1.0).asin()).to_degrees()
}
