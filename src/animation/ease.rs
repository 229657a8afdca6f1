use crate::foundation::error::{TidesError, TidesResult};

/// Easing curves understood by the engine.
///
/// Controllers receive the curve as part of [`crate::TransitionTiming`]; the engine itself only
/// samples it for page-level count-up animations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Ease {
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    /// Material "standard" curve, `cubic-bezier(0.4, 0.0, 0.2, 1)`.
    Standard,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
            Self::Standard => cubic_bezier(0.4, 0.0, 0.2, 1.0, t),
        }
    }

    /// CSS identifier passed to controllers.
    pub fn css(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::InQuad => "ease-in-quad",
            Self::OutQuad => "ease-out-quad",
            Self::InOutQuad => "ease-in-out-quad",
            Self::InCubic => "ease-in-cubic",
            Self::OutCubic => "ease-out-cubic",
            Self::InOutCubic => "ease-in-out-cubic",
            Self::Standard => "cubic-bezier(0.4, 0.0, 0.2, 1)",
        }
    }

    /// Parse an easing identifier as written in manifests.
    pub fn parse(identifier: &str) -> TidesResult<Self> {
        let compact: String = identifier
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_lowercase();
        match compact.as_str() {
            "linear" => Ok(Self::Linear),
            "ease-in-quad" | "inquad" => Ok(Self::InQuad),
            "ease-out-quad" | "outquad" => Ok(Self::OutQuad),
            "ease-in-out-quad" | "inoutquad" => Ok(Self::InOutQuad),
            "ease-in-cubic" | "incubic" => Ok(Self::InCubic),
            "ease-out-cubic" | "outcubic" => Ok(Self::OutCubic),
            "ease-in-out-cubic" | "inoutcubic" => Ok(Self::InOutCubic),
            "standard" | "cubic-bezier(0.4,0.0,0.2,1)" | "cubic-bezier(0.4,0,0.2,1)" => {
                Ok(Self::Standard)
            }
            _ => Err(TidesError::validation(format!(
                "unknown easing '{identifier}'"
            ))),
        }
    }
}

impl TryFrom<String> for Ease {
    type Error = TidesError;

    fn try_from(value: String) -> TidesResult<Self> {
        Self::parse(&value)
    }
}

impl From<Ease> for String {
    fn from(value: Ease) -> Self {
        value.css().to_string()
    }
}

/// Sample a CSS `cubic-bezier(x1, y1, x2, y2)` timing function at progress `x`.
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> f64 {
    fn bez(a: f64, b: f64, t: f64) -> f64 {
        let u = 1.0 - t;
        3.0 * u * u * t * a + 3.0 * u * t * t * b + t * t * t
    }

    // Bisection on the monotonic x(t) curve; 32 rounds is well below f64 noise.
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    let mut t = x;
    for _ in 0..32 {
        let bx = bez(x1, x2, t);
        if (bx - x).abs() < 1e-7 {
            break;
        }
        if bx < x {
            lo = t;
        } else {
            hi = t;
        }
        t = 0.5 * (lo + hi);
    }
    bez(y1, y2, t)
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
