use tracing::trace;

/// One step of the breathing cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Inhale,
    #[strum(to_string = "Hold")]
    HoldAfterInhale,
    Exhale,
    #[strum(to_string = "Hold")]
    HoldAfterExhale,
}

impl Phase {
    /// Phases of one cycle, in order.
    pub const CYCLE: [Phase; 4] = [
        Phase::Inhale,
        Phase::HoldAfterInhale,
        Phase::Exhale,
        Phase::HoldAfterExhale,
    ];

    /// Inhale and exhale animate the bar; holds keep it still.
    pub fn is_sweep(self) -> bool {
        matches!(self, Phase::Inhale | Phase::Exhale)
    }

    /// Fill level shown on entering this phase, given the level the previous
    /// phase left behind.
    pub fn entry_progress(self, previous: f64) -> f64 {
        match self {
            Phase::Inhale => 0.0,
            Phase::Exhale => 1.0,
            Phase::HoldAfterInhale | Phase::HoldAfterExhale => {
                // snap to where the preceding sweep was meant to end, even if
                // its last frame was skipped
                let end = if self == Phase::HoldAfterInhale { 1.0 } else { 0.0 };
                if (previous - end).abs() > f64::EPSILON {
                    trace!(phase = %self, previous, end, "snapping hold progress");
                }
                end
            }
        }
    }

    /// Fill level for `frame` of `total_frames`, or `None` for holds.
    pub fn sweep_progress(self, frame: u64, total_frames: u64) -> Option<f64> {
        let fraction = if total_frames == 0 {
            1.0
        } else {
            (frame as f64 / total_frames as f64).clamp(0.0, 1.0)
        };
        match self {
            Phase::Inhale => Some(fraction),
            Phase::Exhale => Some(1.0 - fraction),
            Phase::HoldAfterInhale | Phase::HoldAfterExhale => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_alternates_sweeps_and_holds() {
        assert_eq!(Phase::CYCLE[0], Phase::Inhale);
        assert_eq!(Phase::CYCLE[2], Phase::Exhale);
        let sweeps: Vec<bool> = Phase::CYCLE.iter().map(|p| p.is_sweep()).collect();
        assert_eq!(sweeps, vec![true, false, true, false]);
    }

    #[test]
    fn labels() {
        assert_eq!(Phase::Inhale.to_string(), "Inhale");
        assert_eq!(Phase::HoldAfterInhale.to_string(), "Hold");
        assert_eq!(Phase::Exhale.to_string(), "Exhale");
        assert_eq!(Phase::HoldAfterExhale.to_string(), "Hold");
    }

    #[test]
    fn inhale_sweeps_up() {
        assert_eq!(Phase::Inhale.sweep_progress(0, 40), Some(0.0));
        assert_eq!(Phase::Inhale.sweep_progress(20, 40), Some(0.5));
        assert_eq!(Phase::Inhale.sweep_progress(40, 40), Some(1.0));
    }

    #[test]
    fn exhale_sweeps_down() {
        assert_eq!(Phase::Exhale.sweep_progress(0, 40), Some(1.0));
        assert_eq!(Phase::Exhale.sweep_progress(10, 40), Some(0.75));
        assert_eq!(Phase::Exhale.sweep_progress(40, 40), Some(0.0));
    }

    #[test]
    fn sweep_is_clamped() {
        assert_eq!(Phase::Inhale.sweep_progress(55, 40), Some(1.0));
        assert_eq!(Phase::Exhale.sweep_progress(55, 40), Some(0.0));
    }

    #[test]
    fn holds_do_not_sweep() {
        assert_eq!(Phase::HoldAfterInhale.sweep_progress(3, 20), None);
        assert_eq!(Phase::HoldAfterExhale.sweep_progress(3, 20), None);
    }

    #[test]
    fn hold_after_inhale_always_starts_full() {
        for previous in [1.0, 0.975, 0.5, 0.0] {
            assert_eq!(Phase::HoldAfterInhale.entry_progress(previous), 1.0);
        }
    }

    #[test]
    fn hold_after_exhale_always_starts_empty() {
        for previous in [0.0, 0.025, 0.5, 1.0] {
            assert_eq!(Phase::HoldAfterExhale.entry_progress(previous), 0.0);
        }
    }

    #[test]
    fn sweeps_start_at_their_origin() {
        assert_eq!(Phase::Inhale.entry_progress(0.0), 0.0);
        assert_eq!(Phase::Exhale.entry_progress(1.0), 1.0);
    }
}
