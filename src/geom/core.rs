//! Vectoren, punten, begrenzingsdozen en toleranties.

use std::ops::{Add, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Vec3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// Nulvector; de bemonsteringsfuncties geven hem terug bij ontaarde invoer.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const X: Self = Self::new(1.0, 0.0, 0.0);
    pub const Y: Self = Self::new(0.0, 1.0, 0.0);
    pub const Z: Self = Self::new(0.0, 0.0, 1.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    #[must_use]
    pub const fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[must_use]
    pub const fn dot(self, rhs: Self) -> f64 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z
    }

    #[must_use]
    pub const fn cross(self, rhs: Self) -> Self {
        Self::new(
            self.y * rhs.z - self.z * rhs.y,
            self.z * rhs.x - self.x * rhs.z,
            self.x * rhs.y - self.y * rhs.x,
        )
    }

    /// Eenheidsvector, of `None` voor een (bijna) nulvector.
    #[must_use]
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        (len.is_finite() && len > Tolerance::ZERO_LENGTH.eps).then(|| self / len)
    }

    /// Zoals [`Vec3::normalized`], maar een nulvector blijft de nulvector.
    /// De aanroeper herkent dat geval met [`Vec3::is_null`].
    #[must_use]
    pub fn normalized_or_zero(self) -> Self {
        self.normalized().unwrap_or(Self::ZERO)
    }

    /// Alle componenten exact nul.
    #[must_use]
    pub fn is_null(self) -> bool {
        self == Self::ZERO
    }

    /// Projectie op het vlak door `base` met normaal `normal`. De normaal
    /// hoeft geen eenheidslengte te hebben; een nulnormaal laat de vector
    /// ongewijzigd.
    #[must_use]
    pub fn project_to_plane(self, base: Self, normal: Self) -> Self {
        let sqr = normal.length_squared();
        if sqr <= Tolerance::ZERO_LENGTH.eps_squared() {
            return self;
        }
        self - normal * ((self - base).dot(normal) / sqr)
    }

    #[must_use]
    pub fn lerp(self, rhs: Self, t: f64) -> Self {
        self + (rhs - self) * t
    }

    /// Een willekeurige eenheidsvector loodrecht op `self`.
    #[must_use]
    pub fn any_perpendicular(self) -> Self {
        let helper = if self.x.abs() < 0.9 { Self::X } else { Self::Y };
        self.cross(helper).normalized_or_zero()
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vec3 {
    type Output = Self;
    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s, self.z * s)
    }
}

impl Mul<Vec3> for f64 {
    type Output = Vec3;
    fn mul(self, v: Vec3) -> Vec3 {
        v * self
    }
}

impl Div<f64> for Vec3 {
    type Output = Self;
    fn div(self, s: f64) -> Self {
        Self::new(self.x / s, self.y / s, self.z / s)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        self * -1.0
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Point3
// ─────────────────────────────────────────────────────────────────────────────

/// Punt in documentcoördinaten (mm).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Coördinaten zoals de facade ze exporteert.
    #[must_use]
    pub const fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Plaatsvector vanuit de oorsprong.
    #[must_use]
    pub const fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    #[must_use]
    pub fn lerp(self, rhs: Self, t: f64) -> Self {
        self + (rhs - self) * t
    }

    #[must_use]
    pub fn distance_to(self, other: Self) -> f64 {
        (self - other).length()
    }

    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        self.lerp(other, 0.5)
    }
}

impl From<Vec3> for Point3 {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Point3> for Vec3 {
    fn from(p: Point3) -> Self {
        p.to_vec3()
    }
}

impl Add<Vec3> for Point3 {
    type Output = Self;
    fn add(self, v: Vec3) -> Self {
        Self::new(self.x + v.x, self.y + v.y, self.z + v.z)
    }
}

impl Sub<Vec3> for Point3 {
    type Output = Self;
    fn sub(self, v: Vec3) -> Self {
        self + -v
    }
}

impl Sub for Point3 {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Vec3 {
        self.to_vec3() - rhs.to_vec3()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// BBox
// ─────────────────────────────────────────────────────────────────────────────

/// Asgerichte begrenzingsdoos in globale coördinaten.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BBox {
    pub min: Point3,
    pub max: Point3,
}

impl BBox {
    #[must_use]
    pub fn from_points(points: &[Point3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(rest.iter().fold(Self { min: *first, max: *first }, |bbox, p| Self {
            min: Point3::new(bbox.min.x.min(p.x), bbox.min.y.min(p.y), bbox.min.z.min(p.z)),
            max: Point3::new(bbox.max.x.max(p.x), bbox.max.y.max(p.y), bbox.max.z.max(p.z)),
        }))
    }

    #[must_use]
    pub fn center(self) -> Point3 {
        self.min.midpoint(self.max)
    }

    #[must_use]
    pub fn x_length(self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn y_length(self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn z_length(self) -> f64 {
        self.max.z - self.min.z
    }

    /// Uitgestrektheid langs `direction`; de richting hoeft geen
    /// eenheidslengte te hebben.
    #[must_use]
    pub fn extent_along(self, direction: Vec3) -> f64 {
        let Some(dir) = direction.normalized() else {
            return 0.0;
        };
        let (lo, hi) = self.projected_range(dir);
        hi - lo
    }

    /// Kleinste en grootste projectie van de acht hoekpunten op `dir`.
    #[must_use]
    pub fn projected_range(self, dir: Vec3) -> (f64, f64) {
        let (a, b) = (self.min, self.max);
        let mut range = (f64::INFINITY, f64::NEG_INFINITY);
        for x in [a.x, b.x] {
            for y in [a.y, b.y] {
                for z in [a.z, b.z] {
                    let d = Vec3::new(x, y, z).dot(dir);
                    range = (range.0.min(d), range.1.max(d));
                }
            }
        }
        range
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tolerance
// ─────────────────────────────────────────────────────────────────────────────

/// Toleranties voor geometrische vergelijkingen.
///
/// - `DEFAULT`: algemene vergelijkingen (1e-9)
/// - `ZERO_LENGTH`: ontaarde vectoren en randen (1e-12)
/// - `PROFILE_DUPLICATE`: slotpunt van een airfoilbestand (1e-14)
/// - `WELD`: aaneenrijgen van snijsegmenten tot lussen (1e-7)
/// - `LOOSE`: grove vergelijkingen (1e-6)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub eps: f64,
}

impl Tolerance {
    pub const DEFAULT: Self = Self::new(1e-9);
    pub const ZERO_LENGTH: Self = Self::new(1e-12);
    pub const PROFILE_DUPLICATE: Self = Self::new(1e-14);
    pub const WELD: Self = Self::new(1e-7);
    pub const LOOSE: Self = Self::new(1e-6);

    #[must_use]
    pub const fn new(eps: f64) -> Self {
        Self { eps }
    }

    #[must_use]
    pub const fn eps_squared(self) -> f64 {
        self.eps * self.eps
    }

    #[must_use]
    pub fn approx_eq_f64(self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.eps
    }

    #[must_use]
    pub fn approx_eq_point3(self, a: Point3, b: Point3) -> bool {
        (a - b).length_squared() <= self.eps_squared()
    }

    #[must_use]
    pub fn approx_eq_vec3(self, a: Vec3, b: Vec3) -> bool {
        (a - b).length_squared() <= self.eps_squared()
    }
}
