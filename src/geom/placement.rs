//! Rigid placements: a rotation followed by a translation.
//!
//! A [`Placement`] maps a local point `p` to `R·p + base`. Composition via
//! [`Placement::multiply`] applies the right-hand operand first, so
//! `a.multiply(b)` maps `p` to `a(b(p))`.

use serde::{Deserialize, Serialize};

use super::core::{Point3, Tolerance, Vec3};

// ─────────────────────────────────────────────────────────────────────────────
// Rotation
// ─────────────────────────────────────────────────────────────────────────────

/// Unit quaternion rotation `(x, y, z, w)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Rotation {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Rotation of `angle` radians about `axis`. A null axis yields identity.
    #[must_use]
    pub fn from_axis_angle(axis: Vec3, angle: f64) -> Self {
        let Some(axis) = axis.normalized() else {
            return Self::IDENTITY;
        };
        let (s, c) = (angle * 0.5).sin_cos();
        Self {
            x: axis.x * s,
            y: axis.y * s,
            z: axis.z * s,
            w: c,
        }
    }

    /// Same as [`Rotation::from_axis_angle`] with the angle in degrees.
    #[must_use]
    pub fn from_axis_degrees(axis: Vec3, degrees: f64) -> Self {
        Self::from_axis_angle(axis, degrees.to_radians())
    }

    /// Shortest-arc rotation that turns direction `from` onto direction `to`.
    ///
    /// Null input yields identity. Opposite directions rotate half a turn
    /// about an arbitrary perpendicular axis.
    #[must_use]
    pub fn between(from: Vec3, to: Vec3) -> Self {
        let (Some(a), Some(b)) = (from.normalized(), to.normalized()) else {
            return Self::IDENTITY;
        };
        let dot = a.dot(b).clamp(-1.0, 1.0);
        if dot >= 1.0 - Tolerance::ZERO_LENGTH.eps {
            return Self::IDENTITY;
        }
        if dot <= -1.0 + Tolerance::ZERO_LENGTH.eps {
            return Self::from_axis_angle(a.any_perpendicular(), std::f64::consts::PI);
        }
        let axis = a.cross(b);
        Self {
            x: axis.x,
            y: axis.y,
            z: axis.z,
            w: 1.0 + dot,
        }
        .normalized()
    }

    /// Rotation whose image of the global X and Y axes is `x_axis` and the
    /// component of `y_axis` orthogonal to it. Degenerate input yields
    /// identity.
    #[must_use]
    pub fn from_frame(x_axis: Vec3, y_axis: Vec3) -> Self {
        let Some(x) = x_axis.normalized() else {
            return Self::IDENTITY;
        };
        let Some(z) = x.cross(y_axis).normalized() else {
            return Self::IDENTITY;
        };
        let y = z.cross(x);

        // Rotation matrix columns are x, y, z.
        let (m00, m11, m22) = (x.x, y.y, z.z);
        let trace = m00 + m11 + m22;
        let q = if trace > 0.0 {
            let s = (trace + 1.0).sqrt() * 2.0;
            Self {
                w: 0.25 * s,
                x: (y.z - z.y) / s,
                y: (z.x - x.z) / s,
                z: (x.y - y.x) / s,
            }
        } else if m00 > m11 && m00 > m22 {
            let s = (1.0 + m00 - m11 - m22).sqrt() * 2.0;
            Self {
                w: (y.z - z.y) / s,
                x: 0.25 * s,
                y: (y.x + x.y) / s,
                z: (z.x + x.z) / s,
            }
        } else if m11 > m22 {
            let s = (1.0 + m11 - m00 - m22).sqrt() * 2.0;
            Self {
                w: (z.x - x.z) / s,
                x: (y.x + x.y) / s,
                y: 0.25 * s,
                z: (z.y + y.z) / s,
            }
        } else {
            let s = (1.0 + m22 - m00 - m11).sqrt() * 2.0;
            Self {
                w: (x.y - y.x) / s,
                x: (z.x + x.z) / s,
                y: (z.y + y.z) / s,
                z: 0.25 * s,
            }
        };
        q.normalized()
    }

    #[must_use]
    fn normalized(self) -> Self {
        let len = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if len <= Tolerance::ZERO_LENGTH.eps {
            return Self::IDENTITY;
        }
        Self {
            x: self.x / len,
            y: self.y / len,
            z: self.z / len,
            w: self.w / len,
        }
    }

    /// Hamilton product: the result applies `rhs` first, then `self`.
    #[must_use]
    pub fn multiply(self, rhs: Self) -> Self {
        Self {
            w: self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
            x: self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            y: self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            z: self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
        }
        .normalized()
    }

    #[must_use]
    pub fn inverse(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
            z: -self.z,
            w: self.w,
        }
    }

    #[must_use]
    pub fn apply(self, v: Vec3) -> Vec3 {
        let q = Vec3::new(self.x, self.y, self.z);
        let t = q.cross(v) * 2.0;
        v + t * self.w + q.cross(t)
    }

    /// Rotation angle in radians, in `[0, π]`.
    #[must_use]
    pub fn angle(self) -> f64 {
        2.0 * self.w.abs().clamp(0.0, 1.0).acos()
    }

    /// Equality up to the `q` / `-q` ambiguity.
    #[must_use]
    pub fn approx_eq(self, other: Self, tol: Tolerance) -> bool {
        let dot = self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w;
        (1.0 - dot.abs()) <= tol.eps
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Placement
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub base: Vec3,
    pub rotation: Rotation,
}

impl Placement {
    pub const IDENTITY: Self = Self {
        base: Vec3::ZERO,
        rotation: Rotation::IDENTITY,
    };

    #[must_use]
    pub const fn new(base: Vec3, rotation: Rotation) -> Self {
        Self { base, rotation }
    }

    #[must_use]
    pub const fn translation(base: Vec3) -> Self {
        Self::new(base, Rotation::IDENTITY)
    }

    /// Rotation about `center`, followed by a translation of `base`.
    ///
    /// Maps `p` to `R·(p − center) + center + base`.
    #[must_use]
    pub fn with_center(base: Vec3, rotation: Rotation, center: Vec3) -> Self {
        Self::new(base + center - rotation.apply(center), rotation)
    }

    /// `self ∘ rhs`: `rhs` is applied first.
    #[must_use]
    pub fn multiply(self, rhs: Self) -> Self {
        Self::new(
            self.rotation.apply(rhs.base) + self.base,
            self.rotation.multiply(rhs.rotation),
        )
    }

    #[must_use]
    pub fn inverse(self) -> Self {
        let inv = self.rotation.inverse();
        Self::new(-inv.apply(self.base), inv)
    }

    #[must_use]
    pub fn apply_point(self, p: Point3) -> Point3 {
        Point3::from(self.rotation.apply(p.to_vec3()) + self.base)
    }

    #[must_use]
    pub fn apply_vec(self, v: Vec3) -> Vec3 {
        self.rotation.apply(v)
    }

    #[must_use]
    pub fn approx_eq(self, other: Self, tol: Tolerance) -> bool {
        tol.approx_eq_vec3(self.base, other.base) && self.rotation.approx_eq(other.rotation, tol)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    const TOL: Tolerance = Tolerance::new(1e-9);

    #[test]
    fn test_axis_angle_quarter_turn() {
        let r = Rotation::from_axis_angle(Vec3::Z, FRAC_PI_2);
        assert!(TOL.approx_eq_vec3(r.apply(Vec3::X), Vec3::Y));
        assert!((r.angle() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_between_aligns_directions() {
        let from = Vec3::new(0.0, 0.0, 1.0);
        let to = Vec3::new(1.0, 2.0, 2.0);
        let r = Rotation::between(from, to);
        let expected = to.normalized().unwrap();
        assert!(TOL.approx_eq_vec3(r.apply(from), expected));
    }

    #[test]
    fn test_between_opposite_directions() {
        let r = Rotation::between(Vec3::Z, -Vec3::Z);
        assert!(TOL.approx_eq_vec3(r.apply(Vec3::Z), -Vec3::Z));
        assert_eq!(Rotation::between(Vec3::ZERO, Vec3::X), Rotation::IDENTITY);
    }

    #[test]
    fn test_from_frame_maps_axes() {
        let r = Rotation::from_frame(Vec3::Y, Vec3::Z);
        assert!(TOL.approx_eq_vec3(r.apply(Vec3::X), Vec3::Y));
        assert!(TOL.approx_eq_vec3(r.apply(Vec3::Y), Vec3::Z));
        assert!(TOL.approx_eq_vec3(r.apply(Vec3::Z), Vec3::X));

        let r = Rotation::from_frame(Vec3::X, Vec3::new(0.0, 0.0, 1.0));
        assert!(TOL.approx_eq_vec3(r.apply(Vec3::Z), -Vec3::Y));
        assert_eq!(Rotation::from_frame(Vec3::X, Vec3::X), Rotation::IDENTITY);
    }

    #[test]
    fn test_multiply_applies_right_first() {
        let translate = Placement::translation(Vec3::new(1.0, 0.0, 0.0));
        let rotate = Placement::new(Vec3::ZERO, Rotation::from_axis_angle(Vec3::Z, FRAC_PI_2));

        let p = Point3::new(1.0, 0.0, 0.0);
        let a = rotate.multiply(translate).apply_point(p);
        assert!(TOL.approx_eq_point3(a, Point3::new(0.0, 2.0, 0.0)));

        let b = translate.multiply(rotate).apply_point(p);
        assert!(TOL.approx_eq_point3(b, Point3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_with_center_keeps_center_fixed() {
        let center = Vec3::new(2.0, 3.0, 0.0);
        let p = Placement::with_center(
            Vec3::ZERO,
            Rotation::from_axis_degrees(Vec3::Z, 37.0),
            center,
        );
        assert!(TOL.approx_eq_point3(p.apply_point(center.into()), center.into()));
    }

    #[test]
    fn test_inverse_round_trip() {
        let p = Placement::new(
            Vec3::new(1.0, -2.0, 3.0),
            Rotation::from_axis_degrees(Vec3::new(1.0, 1.0, 0.0), 25.0),
        );
        let identity = p.multiply(p.inverse());
        assert!(identity.approx_eq(Placement::IDENTITY, TOL));
    }
}
