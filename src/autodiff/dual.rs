//! Forward-mode dual numbers.
//!
//! A `Dual { val, dot }` holds a value and its derivative along one seeded
//! direction. Evaluating a block function with input `j` seeded (`dot = 1`)
//! and every other input constant yields column `j` of its Jacobian.
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// Dual number for forward-mode differentiation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dual {
    /// Primal value.
    pub val: f64,
    /// Tangent along the seeded direction.
    pub dot: f64,
}

impl Dual {
    /// Constant (zero tangent).
    #[inline]
    pub fn constant(val: f64) -> Self {
        Self { val, dot: 0.0 }
    }

    /// Seeded input (unit tangent).
    #[inline]
    pub fn var(val: f64) -> Self {
        Self { val, dot: 1.0 }
    }

    #[inline]
    pub fn new(val: f64, dot: f64) -> Self {
        Self { val, dot }
    }

    #[inline]
    pub fn ln(self) -> Self {
        Self { val: self.val.ln(), dot: self.dot / self.val }
    }

    #[inline]
    pub fn exp(self) -> Self {
        let e = self.val.exp();
        Self { val: e, dot: self.dot * e }
    }

    #[inline]
    pub fn powf(self, n: f64) -> Self {
        Self { val: self.val.powf(n), dot: self.dot * n * self.val.powf(n - 1.0) }
    }

    #[inline]
    pub fn powi(self, n: i32) -> Self {
        if n == 0 {
            return Self::constant(1.0);
        }
        Self { val: self.val.powi(n), dot: self.dot * (n as f64) * self.val.powi(n - 1) }
    }

    #[inline]
    pub fn sqrt(self) -> Self {
        let s = self.val.sqrt();
        Self { val: s, dot: self.dot / (2.0 * s) }
    }

    #[inline]
    pub fn sin(self) -> Self {
        Self { val: self.val.sin(), dot: self.dot * self.val.cos() }
    }

    #[inline]
    pub fn cos(self) -> Self {
        Self { val: self.val.cos(), dot: -self.dot * self.val.sin() }
    }

    #[inline]
    pub fn tanh(self) -> Self {
        let t = self.val.tanh();
        Self { val: t, dot: self.dot * (1.0 - t * t) }
    }

    /// `|x|`; the tangent follows `sign(x)`.
    #[inline]
    pub fn abs(self) -> Self {
        Self { val: self.val.abs(), dot: self.dot * self.val.signum() }
    }
}

// ---- Dual op Dual ----

impl Add for Dual {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self { val: self.val + rhs.val, dot: self.dot + rhs.dot }
    }
}

impl Sub for Dual {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self { val: self.val - rhs.val, dot: self.dot - rhs.dot }
    }
}

impl Mul for Dual {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self { val: self.val * rhs.val, dot: self.dot * rhs.val + self.val * rhs.dot }
    }
}

impl Div for Dual {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        Self {
            val: self.val / rhs.val,
            dot: (self.dot * rhs.val - self.val * rhs.dot) / (rhs.val * rhs.val),
        }
    }
}

impl Neg for Dual {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self { val: -self.val, dot: -self.dot }
    }
}

impl AddAssign for Dual {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.val += rhs.val;
        self.dot += rhs.dot;
    }
}

impl SubAssign for Dual {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.val -= rhs.val;
        self.dot -= rhs.dot;
    }
}

impl MulAssign for Dual {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

// ---- Dual op f64 ----

impl Add<f64> for Dual {
    type Output = Self;
    #[inline]
    fn add(self, rhs: f64) -> Self {
        Self { val: self.val + rhs, dot: self.dot }
    }
}

impl Sub<f64> for Dual {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: f64) -> Self {
        Self { val: self.val - rhs, dot: self.dot }
    }
}

impl Mul<f64> for Dual {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self { val: self.val * rhs, dot: self.dot * rhs }
    }
}

impl Div<f64> for Dual {
    type Output = Self;
    #[inline]
    fn div(self, rhs: f64) -> Self {
        Self { val: self.val / rhs, dot: self.dot / rhs }
    }
}

// ---- f64 op Dual ----

impl Add<Dual> for f64 {
    type Output = Dual;
    #[inline]
    fn add(self, rhs: Dual) -> Dual {
        Dual { val: self + rhs.val, dot: rhs.dot }
    }
}

impl Sub<Dual> for f64 {
    type Output = Dual;
    #[inline]
    fn sub(self, rhs: Dual) -> Dual {
        Dual { val: self - rhs.val, dot: -rhs.dot }
    }
}

impl Mul<Dual> for f64 {
    type Output = Dual;
    #[inline]
    fn mul(self, rhs: Dual) -> Dual {
        Dual { val: self * rhs.val, dot: self * rhs.dot }
    }
}

impl Div<Dual> for f64 {
    type Output = Dual;
    #[inline]
    fn div(self, rhs: Dual) -> Dual {
        Dual { val: self / rhs.val, dot: -self * rhs.dot / (rhs.val * rhs.val) }
    }
}

impl Sum for Dual {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Dual::constant(0.0), |acc, x| acc + x)
    }
}

impl PartialOrd for Dual {
    /// Orders by primal value only.
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.val.partial_cmp(&other.val)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn product_rule() {
        // d/dx [x * (x + 2)] = 2x + 2
        let x = Dual::var(3.0);
        let y = x * (x + 2.0);
        assert_relative_eq!(y.val, 15.0, epsilon = 1e-14);
        assert_relative_eq!(y.dot, 8.0, epsilon = 1e-14);
    }

    #[test]
    fn quotient_and_reciprocal() {
        // d/dx [1 / x] = -1 / x²
        let x = Dual::var(2.0);
        let y = 1.0 / x;
        assert_relative_eq!(y.dot, -0.25, epsilon = 1e-14);

        // d/dx [x / (1 + x)] = 1 / (1 + x)²
        let z = x / (x + 1.0);
        assert_relative_eq!(z.dot, 1.0 / 9.0, epsilon = 1e-14);
    }

    #[test]
    fn elementary_functions() {
        let x = Dual::var(0.7);
        assert_relative_eq!(x.sin().dot, 0.7_f64.cos(), epsilon = 1e-14);
        assert_relative_eq!(x.cos().dot, -(0.7_f64.sin()), epsilon = 1e-14);
        assert_relative_eq!(x.exp().dot, 0.7_f64.exp(), epsilon = 1e-14);
        assert_relative_eq!(x.ln().dot, 1.0 / 0.7, epsilon = 1e-14);
        assert_relative_eq!(x.sqrt().dot, 0.5 / 0.7_f64.sqrt(), epsilon = 1e-14);
        assert_relative_eq!(x.tanh().dot, 1.0 - 0.7_f64.tanh().powi(2), epsilon = 1e-14);
        assert_relative_eq!(x.powi(3).dot, 3.0 * 0.49, epsilon = 1e-14);
        assert_relative_eq!(x.powf(2.5).dot, 2.5 * 0.7_f64.powf(1.5), epsilon = 1e-14);
    }

    #[test]
    fn powi_zero_is_constant() {
        let x = Dual::var(4.0);
        let y = x.powi(0);
        assert_eq!(y, Dual::constant(1.0));
    }

    #[test]
    fn constants_carry_no_tangent() {
        let c = Dual::constant(5.0);
        let x = Dual::var(2.0);
        let y = c * x + c;
        assert_relative_eq!(y.dot, 5.0, epsilon = 1e-14);
    }
}
