//! Minimal three-vector and four-vector algebra for event kinematics.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::rng::RngHandle;

/// Cartesian three-vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThreeVector {
    /// x component.
    pub x: f64,
    /// y component.
    pub y: f64,
    /// z component.
    pub z: f64,
}

impl ThreeVector {
    /// Creates a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Unit vector along the positive z axis.
    pub const fn unit_z() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }

    /// Builds a vector from its magnitude and polar/azimuthal angles.
    pub fn from_spherical(mag: f64, cos_theta: f64, phi: f64) -> Self {
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        Self::new(
            mag * sin_theta * phi.cos(),
            mag * sin_theta * phi.sin(),
            mag * cos_theta,
        )
    }

    /// Squared magnitude.
    pub fn mag2(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// Magnitude.
    pub fn mag(&self) -> f64 {
        self.mag2().sqrt()
    }

    /// Dot product.
    pub fn dot(&self, other: &ThreeVector) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Unit vector in the same direction, or the zero vector for null input.
    pub fn unit(&self) -> ThreeVector {
        let mag = self.mag();
        if mag > 0.0 {
            *self * (1.0 / mag)
        } else {
            *self
        }
    }

    /// Rotates the frame so that the z axis maps onto the direction `u`.
    ///
    /// `u` must be a unit vector. Vectors expressed relative to the z axis
    /// come out expressed relative to `u`.
    pub fn rotate_uz(&self, u: &ThreeVector) -> ThreeVector {
        let (u1, u2, u3) = (u.x, u.y, u.z);
        let up = u1 * u1 + u2 * u2;
        if up > 0.0 {
            let up = up.sqrt();
            let (px, py, pz) = (self.x, self.y, self.z);
            ThreeVector::new(
                (u1 * u3 * px - u2 * py) / up + u1 * pz,
                (u2 * u3 * px + u1 * py) / up + u2 * pz,
                -up * px + u3 * pz,
            )
        } else if u3 < 0.0 {
            ThreeVector::new(-self.x, self.y, -self.z)
        } else {
            *self
        }
    }
}

impl Add for ThreeVector {
    type Output = ThreeVector;

    fn add(self, rhs: ThreeVector) -> ThreeVector {
        ThreeVector::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for ThreeVector {
    type Output = ThreeVector;

    fn sub(self, rhs: ThreeVector) -> ThreeVector {
        ThreeVector::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for ThreeVector {
    type Output = ThreeVector;

    fn mul(self, rhs: f64) -> ThreeVector {
        ThreeVector::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for ThreeVector {
    type Output = ThreeVector;

    fn neg(self) -> ThreeVector {
        ThreeVector::new(-self.x, -self.y, -self.z)
    }
}

/// Four-vector `(px, py, pz, E)` or `(x, y, z, t)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LorentzVector {
    /// Spatial part.
    pub vect: ThreeVector,
    /// Time-like part (energy or time).
    pub t: f64,
}

impl LorentzVector {
    /// Creates a four-vector from its components.
    pub const fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self {
            vect: ThreeVector::new(px, py, pz),
            t: e,
        }
    }

    /// Creates a four-vector from a spatial part and a time component.
    pub const fn from_parts(vect: ThreeVector, t: f64) -> Self {
        Self { vect, t }
    }

    /// Particle of mass `m` at rest.
    pub const fn at_rest(m: f64) -> Self {
        Self::new(0.0, 0.0, 0.0, m)
    }

    /// On-shell four-momentum with the given three-momentum and mass.
    pub fn on_shell(p: ThreeVector, m: f64) -> Self {
        Self::from_parts(p, (p.mag2() + m * m).sqrt())
    }

    /// Energy component.
    pub fn e(&self) -> f64 {
        self.t
    }

    /// Spatial x component.
    pub fn px(&self) -> f64 {
        self.vect.x
    }

    /// Spatial y component.
    pub fn py(&self) -> f64 {
        self.vect.y
    }

    /// Spatial z component.
    pub fn pz(&self) -> f64 {
        self.vect.z
    }

    /// Magnitude of the spatial part.
    pub fn p(&self) -> f64 {
        self.vect.mag()
    }

    /// Invariant mass squared (may be slightly negative from rounding).
    pub fn m2(&self) -> f64 {
        self.t * self.t - self.vect.mag2()
    }

    /// Invariant mass, clamped at zero for space-like vectors.
    pub fn m(&self) -> f64 {
        self.m2().max(0.0).sqrt()
    }

    /// Velocity vector `p / E`; zero for null energy.
    pub fn boost_vector(&self) -> ThreeVector {
        if self.t == 0.0 {
            ThreeVector::zero()
        } else {
            self.vect * (1.0 / self.t)
        }
    }

    /// Lorentz boost by the velocity `b`.
    pub fn boost(&self, b: &ThreeVector) -> LorentzVector {
        let b2 = b.mag2();
        if b2 <= 0.0 || b2 >= 1.0 {
            return *self;
        }
        let gamma = 1.0 / (1.0 - b2).sqrt();
        let bp = b.dot(&self.vect);
        let gamma2 = (gamma - 1.0) / b2;
        let vect = self.vect + *b * (gamma2 * bp + gamma * self.t);
        LorentzVector::from_parts(vect, gamma * (self.t + bp))
    }

    /// Minkowski product with metric `(+,-,-,-)`.
    pub fn dot(&self, other: &LorentzVector) -> f64 {
        self.t * other.t - self.vect.dot(&other.vect)
    }

    /// Largest absolute component difference against `other`.
    pub fn max_abs_diff(&self, other: &LorentzVector) -> f64 {
        let d = *self - *other;
        d.t.abs()
            .max(d.vect.x.abs())
            .max(d.vect.y.abs())
            .max(d.vect.z.abs())
    }
}

impl Add for LorentzVector {
    type Output = LorentzVector;

    fn add(self, rhs: LorentzVector) -> LorentzVector {
        LorentzVector::from_parts(self.vect + rhs.vect, self.t + rhs.t)
    }
}

impl AddAssign for LorentzVector {
    fn add_assign(&mut self, rhs: LorentzVector) {
        *self = *self + rhs;
    }
}

impl Sub for LorentzVector {
    type Output = LorentzVector;

    fn sub(self, rhs: LorentzVector) -> LorentzVector {
        LorentzVector::from_parts(self.vect - rhs.vect, self.t - rhs.t)
    }
}

/// Momentum of either daughter in the rest frame of a two-body decay,
/// or `None` when the decay is kinematically closed.
pub fn two_body_momentum(parent: f64, m1: f64, m2: f64) -> Option<f64> {
    if parent <= 0.0 || parent < m1 + m2 {
        return None;
    }
    let lambda = (parent * parent - (m1 + m2) * (m1 + m2))
        * (parent * parent - (m1 - m2) * (m1 - m2));
    if !lambda.is_finite() || lambda < 0.0 {
        return None;
    }
    Some(lambda.sqrt() / (2.0 * parent))
}

/// Isotropic two-body decay of `parent` into daughters of masses `m1` and
/// `m2`, returned in the frame of `parent`. The daughters sum exactly to
/// `parent` up to rounding.
pub fn isotropic_two_body(
    parent: &LorentzVector,
    m1: f64,
    m2: f64,
    rng: &mut RngHandle,
) -> Option<(LorentzVector, LorentzVector)> {
    let w = parent.m();
    let p = two_body_momentum(w, m1, m2)?;
    let cos_theta = rng.uniform_in(-1.0, 1.0);
    let phi = rng.uniform_in(0.0, 2.0 * std::f64::consts::PI);
    let dir = ThreeVector::from_spherical(p, cos_theta, phi);
    let beta = parent.boost_vector();
    let first = LorentzVector::on_shell(dir, m1).boost(&beta);
    let second = *parent - first;
    Some((first, second))
}
