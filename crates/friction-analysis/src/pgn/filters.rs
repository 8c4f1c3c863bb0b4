//! Game acceptance criteria.

use friction_core::config::FilterConfig;
use friction_core::types::GameRecord;

/// Why a decoded game was not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RejectionReason {
    MissingTimeControl,
    TimeControlTooShort,
    MissingRating,
    RatingOutOfRange,
    InsufficientClocks,
    TooShort,
    Unfinished,
    Abandoned,
}

impl RejectionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingTimeControl => "missing_time_control",
            Self::TimeControlTooShort => "time_control_too_short",
            Self::MissingRating => "missing_rating",
            Self::RatingOutOfRange => "rating_out_of_range",
            Self::InsufficientClocks => "insufficient_clocks",
            Self::TooShort => "too_short",
            Self::Unfinished => "unfinished",
            Self::Abandoned => "abandoned",
        }
    }
}

/// Resolved filter thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub min_rating: u32,
    pub max_rating: u32,
    pub min_base_seconds: u32,
    pub require_clocks: bool,
    pub min_clock_coverage: f64,
    pub min_full_moves: u32,
}

impl From<&FilterConfig> for FilterCriteria {
    fn from(cfg: &FilterConfig) -> Self {
        Self {
            min_rating: cfg.effective_min_rating(),
            max_rating: cfg.effective_max_rating(),
            min_base_seconds: cfg.effective_min_time_control(),
            require_clocks: cfg.effective_require_clocks(),
            min_clock_coverage: cfg.effective_min_clock_coverage(),
            min_full_moves: cfg.effective_min_moves(),
        }
    }
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self::from(&FilterConfig::default())
    }
}

impl FilterCriteria {
    /// First failing criterion, checked in a fixed order.
    pub fn check(&self, game: &GameRecord) -> Result<(), RejectionReason> {
        let tc = game
            .time_control
            .ok_or(RejectionReason::MissingTimeControl)?;
        if !tc.is_at_least(self.min_base_seconds) {
            return Err(RejectionReason::TimeControlTooShort);
        }

        let (white, black) = match (game.white_rating, game.black_rating) {
            (Some(w), Some(b)) => (w, b),
            _ => return Err(RejectionReason::MissingRating),
        };
        let window = self.min_rating..=self.max_rating;
        if !window.contains(&white) || !window.contains(&black) {
            return Err(RejectionReason::RatingOutOfRange);
        }

        if self.require_clocks && game.clock_coverage() < self.min_clock_coverage {
            return Err(RejectionReason::InsufficientClocks);
        }
        if game.num_full_moves() < self.min_full_moves as usize {
            return Err(RejectionReason::TooShort);
        }
        if !game.result.is_completed() {
            return Err(RejectionReason::Unfinished);
        }
        if game.termination.to_lowercase().contains("abandon") {
            return Err(RejectionReason::Abandoned);
        }
        Ok(())
    }
}
