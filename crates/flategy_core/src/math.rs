//! Fixed-point math utilities for deterministic simulation.
//!
//! All game simulation uses fixed-point arithmetic to ensure
//! deterministic behavior across platforms. Floating-point
//! operations can produce different results on different CPUs.

use std::cmp::Ordering;

use fixed::traits::ToFixed;
use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// π in `I32F32`.
pub const PI: Fixed = Fixed::from_bits(13_493_037_705);

/// π/2 in `I32F32`.
pub const FRAC_PI_2: Fixed = Fixed::from_bits(6_746_518_852);

/// π/4 in `I32F32`.
pub const FRAC_PI_4: Fixed = Fixed::from_bits(3_373_259_426);

/// Correction term of the first-octant arctangent approximation (0.273).
const ATAN_CORRECTION: Fixed = Fixed::from_bits(1_172_526_072);

/// Fixed-point 2D vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Serde support for hand-written data files.
///
/// Balance files are edited by people, so numbers are written as decimals
/// (`radius: 1.5`) and converted to fixed-point once, at load time.
/// The conversion is exact-rounding and therefore reproducible.
pub mod fixed_decimal {
    use super::Fixed;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialize a fixed-point number as a decimal.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(value.to_num::<f64>())
    }

    /// Deserialize a fixed-point number from a decimal.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = f64::deserialize(deserializer)?;
        Fixed::checked_from_num(value)
            .ok_or_else(|| D::Error::custom(format!("{value} is out of fixed-point range")))
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from any numeric pair (test and config convenience).
    #[must_use]
    pub fn from_num<T: ToFixed>(x: T, y: T) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Squared distance in raw units (`2^64` per unit squared).
    ///
    /// Exact for any pair of representable points.
    fn distance_squared_bits(self, other: Self) -> u128 {
        let dx = (i128::from(self.x.to_bits()) - i128::from(other.x.to_bits())).unsigned_abs();
        let dy = (i128::from(self.y.to_bits()) - i128::from(other.y.to_bits())).unsigned_abs();
        (dx * dx).saturating_add(dy * dy)
    }

    /// Calculate squared distance (avoids sqrt for comparisons).
    ///
    /// Saturates at `Fixed::MAX` once the points are more than about
    /// 46,340 units apart.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        saturate_bits(self.distance_squared_bits(other) >> 32)
    }

    /// Euclidean distance.
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        saturate_bits(isqrt_u128(self.distance_squared_bits(other)))
    }

    /// Compare the distance to `other` against `radius` without rounding
    /// or overflow.
    #[must_use]
    pub fn compare_distance(self, other: Self, radius: Fixed) -> Ordering {
        let r = u128::from(radius.to_bits().unsigned_abs());
        self.distance_squared_bits(other).cmp(&(r * r))
    }

    /// Vector length.
    #[must_use]
    pub fn length(self) -> Fixed {
        Self::ZERO.distance(self)
    }

    /// Dot product of two vectors.
    #[must_use]
    pub fn dot(self, other: Self) -> Fixed {
        self.x
            .saturating_mul(other.x)
            .saturating_add(self.y.saturating_mul(other.y))
    }

    /// Multiply both components by a scalar.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self::new(self.x.saturating_mul(factor), self.y.saturating_mul(factor))
    }

    /// Normalize vector using fixed-point math.
    ///
    /// The zero vector normalizes to zero.
    #[must_use]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == Fixed::ZERO {
            return Self::ZERO;
        }
        Self::new(self.x / len, self.y / len)
    }

    /// Move up to `max_step` toward `target` without overshooting it.
    #[must_use]
    pub fn step_toward(self, target: Self, max_step: Fixed) -> Self {
        if max_step <= Fixed::ZERO {
            return self;
        }
        let dist = self.distance(target);
        if dist <= max_step {
            return target;
        }
        // Multiply before dividing so axis-aligned steps stay exact
        let step = i128::from(max_step.to_bits());
        let along = |from: Fixed, to: Fixed| {
            let delta = i128::from(to.to_bits()) - i128::from(from.to_bits());
            from.saturating_add(saturate_bits(
                delta.saturating_mul(step) / i128::from(dist.to_bits()),
            ))
        };
        Self::new(along(self.x, target.x), along(self.y, target.y))
    }

    /// Heading of this vector in radians, in `[-π, π]`.
    #[must_use]
    pub fn heading(self) -> Fixed {
        fixed_atan2(self.y, self.x)
    }

    /// Lossy conversion for presentation layers.
    #[must_use]
    pub fn to_f64(self) -> (f64, f64) {
        (self.x.to_num(), self.y.to_num())
    }
}

/// Exact square root of a fixed-point number.
///
/// Works on the raw bits: `sqrt(bits / 2^32) * 2^32 == isqrt(bits * 2^32)`,
/// so the result is the truncated root with full fractional precision.
/// Non-positive inputs return zero.
#[must_use]
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }
    #[allow(clippy::cast_sign_loss)]
    let scaled = (value.to_bits() as u128) << 32;
    let root = isqrt_u128(scaled);
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    Fixed::from_bits(root as i64)
}

/// Raw bits to `Fixed`, clamped to the representable range.
fn saturate_bits<T: TryInto<i64> + PartialOrd + Default>(bits: T) -> Fixed {
    let negative = bits < T::default();
    match bits.try_into() {
        Ok(bits) => Fixed::from_bits(bits),
        Err(_) if negative => Fixed::MIN,
        Err(_) => Fixed::MAX,
    }
}

fn isqrt_u128(n: u128) -> u128 {
    if n < 2 {
        return n;
    }
    // Start above the root and walk down with Newton steps.
    let bits = 128 - n.leading_zeros();
    let mut x = 1u128 << (bits / 2 + 1);
    loop {
        let y = (x + n / x) / 2;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Deterministic fixed-point `atan2`, accurate to about 0.005 rad.
///
/// Uses the first-octant approximation
/// `atan(z) ≈ z·π/4 + 0.273·z·(1 − z)` and folds the result into the
/// right quadrant. `atan2(0, 0)` is zero.
#[must_use]
pub fn fixed_atan2(y: Fixed, x: Fixed) -> Fixed {
    if x == Fixed::ZERO && y == Fixed::ZERO {
        return Fixed::ZERO;
    }

    let abs_x = x.abs();
    let abs_y = y.abs();
    let (z, steep) = if abs_x >= abs_y {
        (abs_y / abs_x, false)
    } else {
        (abs_x / abs_y, true)
    };

    let mut angle = z * FRAC_PI_4 + ATAN_CORRECTION * z * (Fixed::ONE - z);
    if steep {
        angle = FRAC_PI_2 - angle;
    }
    if x < Fixed::ZERO {
        angle = PI - angle;
    }
    if y < Fixed::ZERO {
        angle = -angle;
    }
    angle
}

// Vector arithmetic saturates at the edge of the fixed-point range.

impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x.saturating_add(rhs.x),
            y: self.y.saturating_add(rhs.y),
        }
    }
}

impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x.saturating_sub(rhs.x),
            y: self.y.saturating_sub(rhs.y),
        }
    }
}

impl std::ops::Neg for Vec2Fixed {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self {
            x: self.x.saturating_neg(),
            y: self.y.saturating_neg(),
        }
    }
}
