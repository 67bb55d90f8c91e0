//! Deciding whether a finished game was won.

use exposure_types::{GameOutcome, ResourceLevels};

/// Decides the outcome once the last turn has been played.
pub trait OutcomeJudge: Send {
    /// Judge the final resource levels.
    fn judge(&self, levels: &ResourceLevels) -> GameOutcome;
}

/// Won when the energy target meets capacity and pollution stays within
/// tolerance.
///
/// Targets are judged rather than displayed values, so a game that ends
/// while the bars are still animating is judged on where they settle.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdJudge;

impl OutcomeJudge for ThresholdJudge {
    #[allow(clippy::cast_precision_loss)]
    fn judge(&self, levels: &ResourceLevels) -> GameOutcome {
        let enough_energy = levels.target_energy >= levels.max_energy as f32;
        let clean_enough = levels.target_pollution <= levels.max_pollution as f32;
        GameOutcome::from_won(enough_energy && clean_enough)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_judge() {
        let judge = ThresholdJudge;
        assert_eq!(
            judge.judge(&ResourceLevels::at_rest(12.0, 9.0, 12, 9)),
            GameOutcome::Won
        );
        assert_eq!(
            judge.judge(&ResourceLevels::at_rest(11.0, 1.0, 12, 9)),
            GameOutcome::Lost
        );
        assert_eq!(
            judge.judge(&ResourceLevels::at_rest(20.0, 10.0, 12, 9)),
            GameOutcome::Lost
        );
    }

    #[test]
    fn judges_targets_not_displayed_values() {
        let mut levels = ResourceLevels::at_rest(0.0, 0.0, 6, 6);
        levels.target_energy = 6.0;
        assert_eq!(ThresholdJudge.judge(&levels), GameOutcome::Won);
    }
}
