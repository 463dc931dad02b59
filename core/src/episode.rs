use serde::{Deserialize, Serialize};

/// Progress through one episode. Replaced wholesale on every step and reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeState {
    pub step: u64,
    pub finished: bool,
}

impl EpisodeState {
    /// State right after a reset.
    pub const fn initial() -> Self {
        Self {
            step: 0,
            finished: false,
        }
    }

    /// State of an environment that has no episode in progress.
    pub const fn idle() -> Self {
        Self {
            step: 0,
            finished: true,
        }
    }

    /// The state after one more step.
    #[must_use]
    pub const fn advance(&self, max_steps: u64) -> Self {
        let step = self.step + 1;
        Self {
            step,
            finished: step >= max_steps,
        }
    }
}

impl Default for EpisodeState {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_until_finished() {
        let s0 = EpisodeState::initial();
        let s1 = s0.advance(3);
        let s2 = s1.advance(3);
        let s3 = s2.advance(3);

        assert_eq!((s1.step, s1.finished), (1, false));
        assert_eq!((s2.step, s2.finished), (2, false));
        assert_eq!((s3.step, s3.finished), (3, true));
        // Advancing never touches the original.
        assert_eq!(s0, EpisodeState::initial());
    }

    #[test]
    fn test_single_step_episode() {
        assert!(EpisodeState::initial().advance(1).finished);
    }
}
