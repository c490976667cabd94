//! Solver configuration.
use serde::Deserialize;

use dpll_macros::DocDefault;

/// Configurable parameters used during solving.
#[derive(DocDefault, Clone, Debug)]
pub struct SolverConfig {
    /// Maximal number of branching decisions, unlimited when not set. (Default: None)
    pub decision_limit: Option<u64>,

    /// Read the assignment off the polarities when every variable is pure. (Default: true)
    pub polarity_fast_path: bool,

    /// Eliminate pure literals after unit propagation. (Default: true)
    pub pure_literal_elimination: bool,

    /// Value of variables that vanish from the formula without being assigned. (Default: false)
    pub dont_care_value: bool,
}

/// Partial update of a [`SolverConfig`].
///
/// Deserialized from user input, e.g. a TOML table. Options not present are left unchanged.
#[derive(Deserialize, Default, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct SolverConfigUpdate {
    pub decision_limit: Option<u64>,
    pub polarity_fast_path: Option<bool>,
    pub pure_literal_elimination: Option<bool>,
    pub dont_care_value: Option<bool>,
}

impl SolverConfigUpdate {
    /// Create an empty update.
    pub fn new() -> SolverConfigUpdate {
        SolverConfigUpdate::default()
    }

    /// Combines two updates, options set in `other` take precedence.
    pub fn merge(&mut self, other: SolverConfigUpdate) {
        self.decision_limit = other.decision_limit.or(self.decision_limit);
        self.polarity_fast_path = other.polarity_fast_path.or(self.polarity_fast_path);
        self.pure_literal_elimination = other
            .pure_literal_elimination
            .or(self.pure_literal_elimination);
        self.dont_care_value = other.dont_care_value.or(self.dont_care_value);
    }

    /// Applies the update to a config.
    pub fn apply(&self, config: &mut SolverConfig) {
        if let Some(limit) = self.decision_limit {
            config.decision_limit = Some(limit);
        }
        if let Some(enabled) = self.polarity_fast_path {
            config.polarity_fast_path = enabled;
        }
        if let Some(enabled) = self.pure_literal_elimination {
            config.pure_literal_elimination = enabled;
        }
        if let Some(value) = self.dont_care_value {
            config.dont_care_value = value;
        }
    }
}
