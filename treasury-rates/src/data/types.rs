//! Core data types for Treasury yield curve retrieval.
//!
//! A `RateSet` holds one reporting day of tenor yields for one curve kind,
//! exactly as published in the most recent feed entry.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::FeedResult;

/// Default number of significant digits kept when parsing yields.
pub const DEFAULT_PRECISION: u32 = 6;

/// Which Treasury yield curve a feed publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateKind {
    /// Par yield curve rates.
    Nominal,
    /// Real (inflation-adjusted) par yield curve rates.
    Real,
}

impl RateKind {
    /// Both curves, in output order.
    pub const ALL: [RateKind; 2] = [RateKind::Nominal, RateKind::Real];

    /// Label prefix used by the Treasury for this curve's fields.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Nominal => "BC_",
            Self::Real => "TC_",
        }
    }

    /// Value of the `data` query parameter selecting this curve's feed.
    pub fn dataset(&self) -> &'static str {
        match self {
            Self::Nominal => "daily_treasury_yield_curve",
            Self::Real => "daily_treasury_real_yield_curve",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nominal => "nominal",
            Self::Real => "real",
        }
    }
}

impl fmt::Display for RateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decimal parsing context.
///
/// Limits parsed values to `precision` significant digits. Values that are
/// already within the limit keep their published scale, so `"4.20"` stays
/// `4.20`.
#[derive(Debug, Clone, Copy)]
pub struct DecimalContext {
    pub precision: u32,
    pub rounding: RoundingStrategy,
}

impl Default for DecimalContext {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl DecimalContext {
    pub fn new(precision: u32) -> Self {
        Self {
            precision: precision.max(1),
            rounding: RoundingStrategy::MidpointNearestEven,
        }
    }

    /// Parse decimal text (plain or scientific notation) and round it to the
    /// context precision.
    pub fn parse(&self, text: &str) -> Result<Decimal, rust_decimal::Error> {
        let value = Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text))?;
        Ok(self.round(value))
    }

    /// Round `value` to at most `precision` significant digits.
    pub fn round(&self, value: Decimal) -> Decimal {
        let mut value = value;
        loop {
            let digits = significant_digits(value);
            if digits <= self.precision {
                return value;
            }
            let excess = digits - self.precision;
            let scale = value.scale();
            if excess > scale {
                // Integer digits alone exceed the precision.
                return value
                    .round_sf_with_strategy(self.precision, self.rounding)
                    .unwrap_or(value);
            }
            // A carry (9.999995 -> 10.00000) can add a digit, hence the loop.
            value = value.round_dp_with_strategy(scale - excess, self.rounding);
        }
    }
}

fn significant_digits(value: Decimal) -> u32 {
    let mantissa = value.mantissa().unsigned_abs();
    if mantissa == 0 {
        1
    } else {
        mantissa.ilog10() + 1
    }
}

/// One reporting day of tenor yields for a single curve.
///
/// Tenors missing from the feed entry are `None` and print as blanks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateSet {
    pub kind: RateKind,

    /// Reporting date, verbatim from the feed.
    pub date: String,

    pub y5: Option<Decimal>,
    pub y10: Option<Decimal>,
    pub y20: Option<Decimal>,
    pub y30: Option<Decimal>,
}

impl RateSet {
    /// An empty rate set; fields are filled in by the extractor.
    pub fn new(kind: RateKind) -> Self {
        Self {
            kind,
            date: String::new(),
            y5: None,
            y10: None,
            y20: None,
            y30: None,
        }
    }

    /// True when no field was found in the entry.
    pub fn is_empty(&self) -> bool {
        self.date.is_empty()
            && self.y5.is_none()
            && self.y10.is_none()
            && self.y20.is_none()
            && self.y30.is_none()
    }

    /// Tenor rows as `(label, value)` pairs, in output order.
    pub fn tenors(&self) -> [(String, Option<Decimal>); 4] {
        let prefix = self.kind.prefix();
        [
            (format!("{prefix}5YEAR"), self.y5),
            (format!("{prefix}10YEAR"), self.y10),
            (format!("{prefix}20YEAR"), self.y20),
            (format!("{prefix}30YEAR"), self.y30),
        ]
    }

    /// Write this rate set as a `NAME,VALUE` CSV block.
    pub fn write_csv<W: Write>(&self, writer: W) -> FeedResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["NAME", "VALUE"])?;
        csv.write_record(["NEW_DATE", self.date.as_str()])?;
        for (label, value) in self.tenors() {
            let value = value.map(|v| v.to_string()).unwrap_or_default();
            csv.write_record([label.as_str(), value.as_str()])?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Render the CSV block as a string.
    pub fn to_csv(&self) -> FeedResult<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
