use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Contest key the single-jurisdiction results endpoint expects.
pub const CONTEST_KEY: &str = "contest-1";

//
// ─── FORM ──────────────────────────────────────────────────────────────────────
//

/// One of the two tally fields on the results form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChoiceSlot {
    First,
    Second,
}

impl ChoiceSlot {
    pub const ALL: [ChoiceSlot; 2] = [ChoiceSlot::First, ChoiceSlot::Second];

    /// Result key sent to the server for this slot.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            ChoiceSlot::First => "candidate-1",
            ChoiceSlot::Second => "candidate-2",
        }
    }

    /// Position of the contest choice labelling this slot.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            ChoiceSlot::First => 0,
            ChoiceSlot::Second => 1,
        }
    }
}

/// Operator-entered tallies for one round, exactly as typed.
///
/// Updates produce a new value; the owner decides where it is stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsForm {
    first: String,
    second: String,
}

impl ResultsForm {
    #[must_use]
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    #[must_use]
    pub fn value(&self, slot: ChoiceSlot) -> &str {
        match slot {
            ChoiceSlot::First => &self.first,
            ChoiceSlot::Second => &self.second,
        }
    }

    #[must_use]
    pub fn with_count(&self, slot: ChoiceSlot, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        match slot {
            ChoiceSlot::First => next.first = value.into(),
            ChoiceSlot::Second => next.second = value.into(),
        }
        next
    }
}

//
// ─── COUNT POLICY ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CountError {
    #[error("count for {choice} must be a non-negative whole number, got {raw:?}")]
    Invalid { choice: &'static str, raw: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown count policy {0:?} (expected \"strict\" or \"coerce\")")]
pub struct ParseCountPolicyError(String);

/// How free-text tallies become numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountPolicy {
    /// Reject anything that is not a non-negative whole number.
    #[default]
    Strict,
    /// Accept anything, using lenient numeric coercion (non-numeric input becomes NaN).
    Coerce,
}

impl CountPolicy {
    /// Converts one raw field into a tally.
    ///
    /// # Errors
    ///
    /// Returns `CountError::Invalid` under `Strict` when `raw` is not a whole number.
    pub fn apply(self, slot: ChoiceSlot, raw: &str) -> Result<Tally, CountError> {
        match self {
            CountPolicy::Strict => raw
                .trim()
                .parse::<u64>()
                .map(Tally::Count)
                .map_err(|_| CountError::Invalid {
                    choice: slot.key(),
                    raw: raw.to_string(),
                }),
            CountPolicy::Coerce => Ok(Tally::Coerced(coerce_number(raw))),
        }
    }
}

impl fmt::Display for CountPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountPolicy::Strict => f.write_str("strict"),
            CountPolicy::Coerce => f.write_str("coerce"),
        }
    }
}

impl FromStr for CountPolicy {
    type Err = ParseCountPolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(CountPolicy::Strict),
            "coerce" => Ok(CountPolicy::Coerce),
            _ => Err(ParseCountPolicyError(s.to_string())),
        }
    }
}

/// Lenient string-to-number conversion.
///
/// Blank input is `0`; decimal and exponent forms, `0x`/`0o`/`0b` integers and
/// `Infinity` parse; everything else is `NaN`.
#[must_use]
pub fn coerce_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = s.strip_prefix(prefix) {
            return radix_digits(digits, radix);
        }
    }
    if is_decimal_literal(s) {
        s.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

fn radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    let mut value = 0.0_f64;
    for ch in digits.chars() {
        match ch.to_digit(radix) {
            Some(d) => value = value * f64::from(radix) + f64::from(d),
            None => return f64::NAN,
        }
    }
    value
}

fn is_decimal_literal(s: &str) -> bool {
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(at) => (&body[..at], Some(&body[at + 1..])),
        None => (body, None),
    };

    let mut parts = mantissa.splitn(2, '.');
    let whole = parts.next().unwrap_or("");
    let fraction = parts.next().unwrap_or("");
    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if whole.is_empty() && fraction.is_empty() {
        return false;
    }
    if !all_digits(whole) || !all_digits(fraction) {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && all_digits(digits)
        }
    }
}

//
// ─── PAYLOAD ───────────────────────────────────────────────────────────────────
//

/// A single submitted count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tally {
    Count(u64),
    Coerced(f64),
}

impl Tally {
    #[must_use]
    pub fn as_f64(self) -> f64 {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Tally::Count(n) => n as f64,
            Tally::Coerced(v) => v,
        }
    }
}

// Integral values go out as JSON integers and non-finite values as `null`.
impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Tally::Count(n) => serializer.serialize_u64(n),
            Tally::Coerced(v) if !v.is_finite() => serializer.serialize_none(),
            #[allow(clippy::cast_possible_truncation)]
            Tally::Coerced(v) if v.fract() == 0.0 && v.abs() < 9_007_199_254_740_992.0 => {
                serializer.serialize_i64(v as i64)
            }
            Tally::Coerced(v) => serializer.serialize_f64(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContestResults {
    pub id: String,
    pub results: BTreeMap<String, Tally>,
}

/// Body of `POST /jurisdiction/{id}/{round}/results`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsPayload {
    pub contests: Vec<ContestResults>,
}

impl ResultsPayload {
    /// Builds the payload from the two form fields.
    ///
    /// # Errors
    ///
    /// Returns `CountError` when `policy` rejects a field.
    pub fn from_form(form: &ResultsForm, policy: CountPolicy) -> Result<Self, CountError> {
        let mut results = BTreeMap::new();
        for slot in ChoiceSlot::ALL {
            let tally = policy.apply(slot, form.value(slot))?;
            results.insert(slot.key().to_string(), tally);
        }
        Ok(Self {
            contests: vec![ContestResults {
                id: CONTEST_KEY.to_string(),
                results,
            }],
        })
    }

    /// The tally submitted for `slot`.
    #[must_use]
    pub fn tally(&self, slot: ChoiceSlot) -> Option<Tally> {
        self.contests
            .first()
            .and_then(|contest| contest.results.get(slot.key()))
            .copied()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
