use crate::animation::ease::Ease;

/// Motion duration tokens shared by the page and its controllers.
pub const MICRO_MS: f64 = 200.0;
/// Chart data updates and panel reveals.
pub const MACRO_MS: f64 = 400.0;
/// Section handoffs.
pub const CINEMATIC_MS: f64 = 600.0;

/// Transition timing forwarded with every step update.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransitionTiming {
    /// Duration in milliseconds.
    pub duration_ms: f64,
    /// Easing curve, serialized as its CSS identifier.
    pub easing: Ease,
}

impl Default for TransitionTiming {
    fn default() -> Self {
        Self {
            duration_ms: MACRO_MS,
            easing: Ease::Standard,
        }
    }
}

impl TransitionTiming {
    /// Progress in `[0, 1]` after `elapsed_ms`, eased.
    pub fn sample(self, elapsed_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        self.easing.apply(elapsed_ms / self.duration_ms)
    }
}
