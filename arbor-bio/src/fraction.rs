/// Exact rational numbers for distance bookkeeping
///
/// UPGMA averages distances over and over; doing that in floating point makes
/// the printed derivations drift away from the hand-computed values. Every
/// [`Fraction`] is kept reduced with a positive denominator, so equality is
/// structural and ordering is exact.
use arbor_core::{ArborError, ArborResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fraction {
    numer: i128,
    denom: i128,
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

impl Fraction {
    pub const ZERO: Fraction = Fraction { numer: 0, denom: 1 };
    pub const ONE: Fraction = Fraction { numer: 1, denom: 1 };

    /// Build a reduced fraction. Returns `None` for a zero denominator or
    /// when the reduced form does not fit in `i128`.
    pub fn new(numer: i128, denom: i128) -> Option<Self> {
        if denom == 0 {
            return None;
        }

        let g = i128::try_from(gcd(numer.unsigned_abs(), denom.unsigned_abs())).ok()?;
        let (mut numer, mut denom) = (numer / g, denom / g);
        if denom < 0 {
            numer = numer.checked_neg()?;
            denom = denom.checked_neg()?;
        }

        Some(Self { numer, denom })
    }

    pub const fn from_integer(value: i128) -> Self {
        Self {
            numer: value,
            denom: 1,
        }
    }

    /// Convert through the shortest decimal representation of `value`, so
    /// `0.1` becomes exactly `1/10` rather than its binary approximation.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        format!("{}", value).parse().ok()
    }

    pub fn numer(&self) -> i128 {
        self.numer
    }

    pub fn denom(&self) -> i128 {
        self.denom
    }

    pub fn is_zero(&self) -> bool {
        self.numer == 0
    }

    pub fn is_negative(&self) -> bool {
        self.numer < 0
    }

    pub fn is_integer(&self) -> bool {
        self.denom == 1
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        // Denominators are positive, so the gcd fits in i128
        let g = gcd(self.denom as u128, rhs.denom as u128) as i128;
        let lhs_scale = rhs.denom / g;
        let rhs_scale = self.denom / g;

        let numer = self
            .numer
            .checked_mul(lhs_scale)?
            .checked_add(rhs.numer.checked_mul(rhs_scale)?)?;
        let denom = self.denom.checked_mul(lhs_scale)?;
        Self::new(numer, denom)
    }

    pub fn checked_neg(self) -> Option<Self> {
        Some(Self {
            numer: self.numer.checked_neg()?,
            denom: self.denom,
        })
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.checked_add(rhs.checked_neg()?)
    }

    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        // Cross-reduce first to keep intermediates small
        let g1 = gcd(self.numer.unsigned_abs(), rhs.denom as u128) as i128;
        let g2 = gcd(rhs.numer.unsigned_abs(), self.denom as u128) as i128;

        let numer = (self.numer / g1).checked_mul(rhs.numer / g2)?;
        let denom = (self.denom / g2).checked_mul(rhs.denom / g1)?;
        Self::new(numer, denom)
    }

    /// Returns `None` on division by zero or overflow.
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        if rhs.is_zero() {
            return None;
        }
        self.checked_mul(Self::new(rhs.denom, rhs.numer)?)
    }

    pub fn to_f64(self) -> f64 {
        self.numer as f64 / self.denom as f64
    }

    /// Decimal projection rounded to `places` digits, for display only.
    pub fn round_to(self, places: u32) -> f64 {
        let factor = 10f64.powi(places as i32);
        (self.to_f64() * factor).round() / factor
    }
}

/// Compare two positive-denominator fractions without multiplying, by
/// walking their continued fraction expansions in lockstep.
fn compare_expansions(mut an: i128, mut ad: i128, mut bn: i128, mut bd: i128) -> Ordering {
    let mut flipped = false;
    loop {
        let (aq, ar) = (an.div_euclid(ad), an.rem_euclid(ad));
        let (bq, br) = (bn.div_euclid(bd), bn.rem_euclid(bd));

        let ordering = if aq != bq {
            aq.cmp(&bq)
        } else {
            match (ar == 0, br == 0) {
                (true, true) => return Ordering::Equal,
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                (false, false) => {
                    // ar/ad vs br/bd has the opposite order of ad/ar vs bd/br
                    (an, ad, bn, bd) = (ad, ar, bd, br);
                    flipped = !flipped;
                    continue;
                }
            }
        };

        return if flipped { ordering.reverse() } else { ordering };
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        match (
            self.numer.checked_mul(other.denom),
            other.numer.checked_mul(self.denom),
        ) {
            (Some(lhs), Some(rhs)) => lhs.cmp(&rhs),
            _ => compare_expansions(self.numer, self.denom, other.numer, other.denom),
        }
    }
}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Default for Fraction {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<u64> for Fraction {
    fn from(value: u64) -> Self {
        Self::from_integer(value as i128)
    }
}

impl From<usize> for Fraction {
    fn from(value: usize) -> Self {
        Self::from_integer(value as i128)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom == 1 {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

impl FromStr for Fraction {
    type Err = ArborError;

    /// Accepts integers (`7`), decimals (`0.35`) and ratios (`37/3`).
    fn from_str(s: &str) -> ArborResult<Self> {
        let text = s.trim();
        let invalid = || ArborError::Parse(format!("invalid number '{}'", text));
        let overflow = || ArborError::ArithmeticOverflow(format!("'{}' does not fit", text));

        if let Some((numer, denom)) = text.split_once('/') {
            let numer: i128 = numer.trim().parse().map_err(|_| invalid())?;
            let denom: i128 = denom.trim().parse().map_err(|_| invalid())?;
            if denom == 0 {
                return Err(invalid());
            }
            return Fraction::new(numer, denom).ok_or_else(overflow);
        }

        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(invalid());
        }

        let mut numer: i128 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            numer = numer
                .checked_mul(10)
                .and_then(|n| n.checked_add((b - b'0') as i128))
                .ok_or_else(overflow)?;
        }
        let denom = 10i128
            .checked_pow(frac_part.len() as u32)
            .ok_or_else(overflow)?;
        if negative {
            numer = -numer;
        }

        Fraction::new(numer, denom).ok_or_else(overflow)
    }
}

impl Serialize for Fraction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Fraction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
