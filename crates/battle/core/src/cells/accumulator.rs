//! Additive and multiplicative modifier accumulators.

use tracing::warn;

use super::Cell;

/// Authored fraction, as written in catalog data and balance tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ratio {
    pub num: i64,
    pub den: i64,
}

impl Ratio {
    pub const ONE: Self = Self::new(1, 1);
    pub const ZERO: Self = Self::new(0, 1);

    pub const fn new(num: i64, den: i64) -> Self {
        Self { num, den }
    }

    /// `value * num / den`, truncating. A zero denominator leaves the value unchanged.
    pub fn apply(self, value: i64) -> i64 {
        if self.den == 0 {
            return value;
        }
        let scaled = i128::from(value) * i128::from(self.num) / i128::from(self.den);
        saturate(scaled)
    }
}

impl Default for Ratio {
    fn default() -> Self {
        Self::ONE
    }
}

/// Multiplicative accumulator with a sticky neutralized state.
///
/// Starts at `1/1`. Multiplying by zero, or a product too small to keep a
/// nonzero numerator, neutralizes it permanently: every
/// later [`multiply`](Self::multiply) is a no-op and [`apply`](Self::apply)
/// returns 0 for every base.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Fraction {
    num: i64,
    den: i64,
    neutralized: bool,
}

impl Default for Fraction {
    fn default() -> Self {
        Self::ONE
    }
}

impl Fraction {
    pub const ONE: Self = Self {
        num: 1,
        den: 1,
        neutralized: false,
    };

    pub fn numerator(&self) -> i64 {
        self.num
    }

    pub fn denominator(&self) -> i64 {
        self.den
    }

    pub fn is_neutralized(&self) -> bool {
        self.neutralized
    }

    pub fn multiply(&mut self, n: i64, d: i64) {
        if self.neutralized {
            return;
        }
        if n == 0 {
            self.neutralized = true;
            self.num = 0;
            self.den = 1;
            return;
        }
        if d == 0 {
            warn!(
                target: "battle::cells",
                numerator = n,
                "multiplier with zero denominator ignored"
            );
            return;
        }

        let mut num = i128::from(self.num) * i128::from(n);
        let mut den = i128::from(self.den) * i128::from(d);
        if den < 0 {
            num = -num;
            den = -den;
        }
        let divisor = gcd(num.unsigned_abs(), den.unsigned_abs()) as i128;
        num /= divisor;
        den /= divisor;

        // Coprime terms that still exceed i64 lose low bits from both sides.
        while num > i128::from(i64::MAX) || num < -i128::from(i64::MAX) || den > i128::from(i64::MAX)
        {
            num /= 2;
            den = (den / 2).max(1);
        }
        if num == 0 {
            self.neutralized = true;
            self.num = 0;
            self.den = 1;
            return;
        }

        self.num = num as i64;
        self.den = den as i64;
    }

    pub fn multiply_by(&mut self, ratio: Ratio) {
        self.multiply(ratio.num, ratio.den);
    }

    /// `base * num / den` over the whole accumulated fraction, truncating once.
    pub fn apply(&self, base: i64) -> i64 {
        if self.neutralized {
            return 0;
        }
        saturate(i128::from(base) * i128::from(self.num) / i128::from(self.den))
    }
}

/// Integer accumulator cell. Absent counters read as 0.
pub trait Counter: Cell {
    fn value(&self) -> i64;
    fn value_mut(&mut self) -> &mut i64;
}

/// Fraction accumulator cell. Absent multipliers read as `1/1`.
pub trait Multiplier: Cell {
    fn fraction(&self) -> &Fraction;
    fn fraction_mut(&mut self) -> &mut Fraction;
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

fn saturate(value: i128) -> i64 {
    value.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_multiply_is_sticky() {
        let mut f = Fraction::default();
        f.multiply(1, 2);
        f.multiply(0, 1);
        f.multiply(4, 3);
        assert!(f.is_neutralized());
        assert_eq!(f.apply(100), 0);
    }

    #[test]
    fn apply_truncates_once_over_accumulated_fraction() {
        let mut f = Fraction::default();
        f.multiply(3, 2);
        f.multiply(4, 3);
        // 3/2 * 4/3 = 2/1 exactly; per-step truncation would give 7 * 3 / 2 = 10 then 13.
        assert_eq!((f.numerator(), f.denominator()), (2, 1));
        assert_eq!(f.apply(7), 14);
    }

    #[test]
    fn terms_are_reduced_and_denominator_positive() {
        let mut f = Fraction::default();
        f.multiply(6, -4);
        assert_eq!((f.numerator(), f.denominator()), (-3, 2));
        assert_eq!(f.apply(10), -15);
    }

    #[test]
    fn zero_denominator_is_ignored() {
        let mut f = Fraction::default();
        f.multiply(5, 0);
        assert_eq!(f, Fraction::ONE);
    }

    #[test]
    fn large_products_stay_in_range() {
        let mut f = Fraction::default();
        for _ in 0..64 {
            f.multiply(1_000_003, 999_983);
        }
        assert!(f.denominator() > 0);
        assert!(!f.is_neutralized());
    }

    #[test]
    fn vanishing_fraction_becomes_neutralized() {
        let mut f = Fraction::default();
        f.multiply(1, i64::MAX);
        assert!(!f.is_neutralized());
        f.multiply(1, i64::MAX);
        assert!(f.is_neutralized());
        assert_eq!(f.apply(1_000_000), 0);
        f.multiply(4, 1);
        assert_eq!(f.numerator(), 0);
    }

    #[test]
    fn ratio_apply_ignores_zero_denominator() {
        assert_eq!(Ratio::new(3, 2).apply(9), 13);
        assert_eq!(Ratio::new(3, 0).apply(9), 9);
    }

    proptest! {
        #[test]
        fn neutralized_fraction_always_applies_to_zero(
            before in prop::collection::vec((-50i64..50, 1i64..50), 0..6),
            after in prop::collection::vec((-50i64..50, -50i64..50), 0..6),
            base in any::<i32>(),
        ) {
            let mut f = Fraction::default();
            for (n, d) in before {
                f.multiply(n, d);
            }
            f.multiply(0, 1);
            for (n, d) in after {
                f.multiply(n, d);
            }
            prop_assert!(f.is_neutralized());
            prop_assert_eq!(f.apply(i64::from(base)), 0);
        }

        #[test]
        fn denominator_is_always_positive(
            steps in prop::collection::vec((1i64..1000, -1000i64..1000), 0..12),
        ) {
            let mut f = Fraction::default();
            for (n, d) in steps {
                f.multiply(n, d);
            }
            prop_assert!(f.denominator() > 0);
        }
    }
}
