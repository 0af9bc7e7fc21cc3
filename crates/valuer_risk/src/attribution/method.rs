//! Attribution methods.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use valuer_core::ValuationError;

/// How probe scenarios are built from the differing parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionMethod {
    /// Each probe is the baseline with a single parameter moved to its
    /// variant value. Interaction effects land in the residual.
    #[default]
    OneAtATime,
    /// Waterfall: parameters are moved cumulatively in declaration order,
    /// each probe building on the previous one. Interaction is absorbed by
    /// the later contributions, so the residual is rounding only.
    Sequential,
}

impl AttributionMethod {
    /// Get the name of this method.
    pub fn name(&self) -> &'static str {
        match self {
            AttributionMethod::OneAtATime => "one_at_a_time",
            AttributionMethod::Sequential => "sequential",
        }
    }

    /// Whether contributions depend on declaration order.
    pub fn is_order_dependent(&self) -> bool {
        matches!(self, AttributionMethod::Sequential)
    }
}

impl fmt::Display for AttributionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AttributionMethod {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "one_at_a_time" | "oaat" => Ok(AttributionMethod::OneAtATime),
            "sequential" | "waterfall" => Ok(AttributionMethod::Sequential),
            other => Err(ValuationError::InvalidConfig(format!(
                "unknown attribution method '{}'",
                other
            ))),
        }
    }
}
