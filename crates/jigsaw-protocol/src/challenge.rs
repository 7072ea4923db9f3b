//! The anti-bot challenge the server issues before a room can be joined.
//!
//! The challenge frame announces the server version and carries a small
//! arithmetic formula of the fixed shape
//!
//! ```text
//! return a*<A>-!0+b*<B>-<C>
//! ```
//!
//! where `a` and `b` are multipliers baked into both the browser client and
//! the server. The client answers with `A*a + B*b - C - 1`, computed in
//! wrapping `u32` arithmetic exactly as the server recomputes it.

use crate::ProtocolError;

/// Server version this client speaks.
pub const EXPECTED_VERSION: &str = "1.8.5";

/// Placeholder a JSON "version" message carries when the real version comes
/// with the binary challenge instead.
pub const CHALLENGE_VERSION: &str = "x";

/// Multiplier applied to `A`.
pub const FIXED_A: u32 = 123;

/// Multiplier applied to `B`.
pub const FIXED_B: u32 = 765;

const PREFIX: &str = "return a*";
const MIDDLE: &str = "-!0+b*";
const TAIL: &str = "-";

/// Rejects a server version other than [`EXPECTED_VERSION`] unless
/// `override_version` is set.
pub fn check_version(
    found: &str,
    override_version: bool,
) -> Result<(), ProtocolError> {
    if found == EXPECTED_VERSION || override_version {
        Ok(())
    } else {
        Err(ProtocolError::VersionMismatch {
            found: found.to_string(),
        })
    }
}

/// Computes the challenge answer with wrapping `u32` arithmetic.
///
/// ```rust
/// assert_eq!(jigsaw_protocol::challenge::solve(10, 5, 2), 5052);
/// ```
pub fn solve(a: u32, b: u32, c: u32) -> u32 {
    a.wrapping_mul(FIXED_A)
        .wrapping_add(b.wrapping_mul(FIXED_B))
        .wrapping_sub(c)
        .wrapping_sub(1)
}

/// The three server-chosen numbers of a challenge formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coefficients {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl Coefficients {
    /// Parses a formula of the exact shape `return a*<A>-!0+b*<B>-<C>`.
    ///
    /// # Errors
    /// [`ProtocolError::MalformedChallenge`] on any deviation: other text,
    /// missing or non-ASCII digits, trailing input, or a number that
    /// doesn't fit a `u32`.
    pub fn parse(formula: &str) -> Result<Self, ProtocolError> {
        let malformed = || ProtocolError::MalformedChallenge(formula.to_string());

        let rest = formula.strip_prefix(PREFIX).ok_or_else(malformed)?;
        let (a, rest) = rest.split_once(MIDDLE).ok_or_else(malformed)?;
        let (b, c) = rest.split_once(TAIL).ok_or_else(malformed)?;

        Ok(Self {
            a: parse_digits(a).ok_or_else(malformed)?,
            b: parse_digits(b).ok_or_else(malformed)?,
            c: parse_digits(c).ok_or_else(malformed)?,
        })
    }

    /// The answer to send back.
    pub fn solve(&self) -> u32 {
        solve(self.a, self.b, self.c)
    }
}

/// A non-empty run of ASCII digits that fits a `u32`.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_small_values() {
        // 10*123 + 5*765 - 2 - 1 = 1230 + 3825 - 3
        assert_eq!(solve(10, 5, 2), 5052);
    }

    #[test]
    fn test_solve_wraps_on_overflow() {
        let expected = (u64::from(u32::MAX) * 123 + 765 - 1) as u32;
        assert_eq!(solve(u32::MAX, 1, 0), expected);
    }

    #[test]
    fn test_solve_wraps_on_underflow() {
        // 0 - 0 - 1 wraps to u32::MAX
        assert_eq!(solve(0, 0, 0), u32::MAX);
        assert_eq!(solve(0, 0, 5), u32::MAX - 5);
    }

    #[test]
    fn test_solve_matches_u64_modular_reference() {
        let samples = [(1, 2, 3), (99_999, 123_456, 7), (4_000_000_000, 17, 999)];
        for (a, b, c) in samples {
            let reference = (u64::from(a) * 123 + u64::from(b) * 765)
                .wrapping_sub(u64::from(c) + 1)
                % (1u64 << 32);
            assert_eq!(u64::from(solve(a, b, c)), reference, "({a},{b},{c})");
        }
    }

    #[test]
    fn test_parse_well_formed_formula() {
        let coeffs = Coefficients::parse("return a*10-!0+b*5-2").unwrap();
        assert_eq!(coeffs, Coefficients { a: 10, b: 5, c: 2 });
        assert_eq!(coeffs.solve(), 5052);
    }

    #[test]
    fn test_parse_rejects_deviations() {
        let bad = [
            "",
            "return a*10-!0+b*5",
            "return a*10+!0+b*5-2",
            "return a*-!0+b*5-2",
            "return a*10-!0+b*5-",
            "return a*10-!0+b*5-2 ",
            " return a*10-!0+b*5-2",
            "return a*1x-!0+b*5-2",
            "return a*10-!0+b*5-2-1",
            "return a*10-!0+b*+5-2",
            "return b*10-!0+a*5-2",
        ];
        for formula in bad {
            let err = Coefficients::parse(formula).unwrap_err();
            assert!(
                matches!(err, ProtocolError::MalformedChallenge(_)),
                "{formula:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_rejects_numbers_wider_than_u32() {
        assert!(Coefficients::parse("return a*4294967296-!0+b*1-1").is_err());
        assert!(Coefficients::parse("return a*4294967295-!0+b*1-1").is_ok());
    }

    #[test]
    fn test_check_version() {
        assert!(check_version(EXPECTED_VERSION, false).is_ok());
        assert!(check_version("1.8.0", true).is_ok());

        let err = check_version("1.8.0", false).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::VersionMismatch { ref found } if found == "1.8.0"
        ));
        assert!(err.to_string().contains("1.8.5"));
    }
}
