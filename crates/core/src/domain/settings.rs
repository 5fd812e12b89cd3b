use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::margin::MarginSet;
use crate::domain::numeric::{bounded_input, lenient_optional_decimal};

pub const DEFAULT_DAILY_LABOR_RATE: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Share of projected profit that the advance must cover on top of the full base cost.
pub const ADVANCE_FRACTION: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Grand totals and advances are rounded up to a multiple of this.
pub const ROUNDING_QUANTUM: Decimal = Decimal::ONE_HUNDRED;

/// Process-wide pricing defaults, passed explicitly into every calculation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawGlobalSettings")]
pub struct GlobalSettings {
    pub daily_labor_rate: Decimal,
    #[serde(flatten)]
    pub margins: MarginSet,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self { daily_labor_rate: DEFAULT_DAILY_LABOR_RATE, margins: MarginSet::default() }
    }
}

impl GlobalSettings {
    pub fn new(daily_labor_rate: Decimal, margins: MarginSet) -> Self {
        Self { daily_labor_rate: bounded_input(daily_labor_rate), margins: margins.clamped() }
    }

    /// Share of projected profit collected up front, on top of the full base cost.
    pub fn advance_fraction(&self) -> Decimal {
        ADVANCE_FRACTION
    }
}

/// Stored settings rows predate `daily_labor_rate` and call it `daily_labor_cost`.
#[derive(Debug, Default, Deserialize)]
struct RawGlobalSettings {
    #[serde(default, alias = "daily_labor_cost", deserialize_with = "lenient_optional_decimal")]
    daily_labor_rate: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_optional_decimal")]
    part_margin: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_optional_decimal")]
    labor_margin: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_optional_decimal")]
    extra_margin: Option<Decimal>,
}

impl From<RawGlobalSettings> for GlobalSettings {
    fn from(raw: RawGlobalSettings) -> Self {
        let defaults = MarginSet::default();
        Self::new(
            raw.daily_labor_rate.unwrap_or(DEFAULT_DAILY_LABOR_RATE),
            MarginSet::new(
                raw.part_margin.unwrap_or(defaults.part_margin),
                raw.labor_margin.unwrap_or(defaults.labor_margin),
                raw.extra_margin.unwrap_or(defaults.extra_margin),
            ),
        )
    }
}
