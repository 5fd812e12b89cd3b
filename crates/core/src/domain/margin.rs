use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::numeric::lenient_optional_decimal;

pub const MIN_MARGIN_PCT: Decimal = Decimal::ZERO;
pub const MAX_MARGIN_PCT: Decimal = Decimal::ONE_HUNDRED;

pub const DEFAULT_PART_MARGIN_PCT: Decimal = Decimal::from_parts(15, 0, 0, false, 0);
pub const DEFAULT_LABOR_MARGIN_PCT: Decimal = Decimal::from_parts(20, 0, 0, false, 0);
pub const DEFAULT_EXTRA_MARGIN_PCT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

pub fn clamp_margin_pct(value: Decimal) -> Decimal {
    value.clamp(MIN_MARGIN_PCT, MAX_MARGIN_PCT)
}

/// Canonical markup percentages. Every field is clamped to `[0, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarginSet {
    pub part_margin: Decimal,
    pub labor_margin: Decimal,
    pub extra_margin: Decimal,
}

impl Default for MarginSet {
    fn default() -> Self {
        Self {
            part_margin: DEFAULT_PART_MARGIN_PCT,
            labor_margin: DEFAULT_LABOR_MARGIN_PCT,
            extra_margin: DEFAULT_EXTRA_MARGIN_PCT,
        }
    }
}

impl MarginSet {
    pub fn new(part_margin: Decimal, labor_margin: Decimal, extra_margin: Decimal) -> Self {
        Self {
            part_margin: clamp_margin_pct(part_margin),
            labor_margin: clamp_margin_pct(labor_margin),
            extra_margin: clamp_margin_pct(extra_margin),
        }
    }

    pub fn clamped(self) -> Self {
        Self::new(self.part_margin, self.labor_margin, self.extra_margin)
    }

    pub fn total_markup_pct(&self) -> Decimal {
        self.part_margin + self.labor_margin + self.extra_margin
    }

    /// `1 + (part + labor + extra) / 100`
    pub fn multiplier(&self) -> Decimal {
        Decimal::ONE + self.total_markup_pct() / Decimal::ONE_HUNDRED
    }

    /// Share of the sell price that is markup, as a percentage.
    pub fn gross_margin_pct(&self) -> Decimal {
        let markup = self.total_markup_pct();
        let denominator = Decimal::ONE_HUNDRED + markup;
        if denominator.is_zero() {
            return Decimal::ZERO;
        }
        markup / denominator * Decimal::ONE_HUNDRED
    }
}

/// Per-estimate margin override as it appears on the wire.
///
/// Two encodings exist in stored records: short keys (`p`, `l`, `e`) written by the
/// estimator and long keys (`part_margin`, ...) written by older tooling. Any short key
/// present selects the short encoding. Fields may be missing; resolution fills them from
/// the global defaults.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, from = "RawMarginOverride")]
pub enum MarginOverride {
    Short {
        #[serde(skip_serializing_if = "Option::is_none")]
        p: Option<Decimal>,
        #[serde(skip_serializing_if = "Option::is_none")]
        l: Option<Decimal>,
        #[serde(skip_serializing_if = "Option::is_none")]
        e: Option<Decimal>,
    },
    Long {
        #[serde(skip_serializing_if = "Option::is_none")]
        part_margin: Option<Decimal>,
        #[serde(skip_serializing_if = "Option::is_none")]
        labor_margin: Option<Decimal>,
        #[serde(skip_serializing_if = "Option::is_none")]
        extra_margin: Option<Decimal>,
    },
}

impl MarginOverride {
    pub fn short(p: Decimal, l: Decimal, e: Decimal) -> Self {
        Self::Short { p: Some(p), l: Some(l), e: Some(e) }
    }

    pub fn long(part_margin: Decimal, labor_margin: Decimal, extra_margin: Decimal) -> Self {
        Self::Long {
            part_margin: Some(part_margin),
            labor_margin: Some(labor_margin),
            extra_margin: Some(extra_margin),
        }
    }

    /// Fields in `(part, labor, extra)` order, regardless of encoding.
    pub fn fields(&self) -> (Option<Decimal>, Option<Decimal>, Option<Decimal>) {
        match self {
            Self::Short { p, l, e } => (*p, *l, *e),
            Self::Long { part_margin, labor_margin, extra_margin } => {
                (*part_margin, *labor_margin, *extra_margin)
            }
        }
    }

    pub fn is_short(&self) -> bool {
        matches!(self, Self::Short { .. })
    }
}

impl From<MarginSet> for MarginOverride {
    fn from(value: MarginSet) -> Self {
        Self::short(value.part_margin, value.labor_margin, value.extra_margin)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawMarginOverride {
    #[serde(default, deserialize_with = "lenient_optional_decimal")]
    p: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_optional_decimal")]
    l: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_optional_decimal")]
    e: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_optional_decimal")]
    part_margin: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_optional_decimal")]
    labor_margin: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_optional_decimal")]
    extra_margin: Option<Decimal>,
}

impl From<RawMarginOverride> for MarginOverride {
    fn from(raw: RawMarginOverride) -> Self {
        if raw.p.is_some() || raw.l.is_some() || raw.e.is_some() {
            return Self::Short { p: raw.p, l: raw.l, e: raw.e };
        }

        Self::Long {
            part_margin: raw.part_margin,
            labor_margin: raw.labor_margin,
            extra_margin: raw.extra_margin,
        }
    }
}
