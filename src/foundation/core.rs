use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{TidesError, TidesResult};

pub use kurbo::{Point, Rect};

/// One of the fixed narrative worlds a section can switch the page into.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SceneName {
    /// Landing starfield.
    Cosmos,
    /// First chapter sunrise.
    Dawn,
    /// Orbiting artists.
    Orbit,
    /// Night city skyline.
    City,
    /// Forest canopy.
    Forest,
    /// Open air bubbles.
    Air,
    /// Recipe laboratory.
    Lab,
}

impl SceneName {
    /// Every scene, in narrative order (also the dev keyboard order `1..=7`).
    pub const ALL: [SceneName; 7] = [
        SceneName::Cosmos,
        SceneName::Dawn,
        SceneName::Orbit,
        SceneName::City,
        SceneName::Forest,
        SceneName::Air,
        SceneName::Lab,
    ];

    /// Attribute value used for `body[data-scene]`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cosmos => "cosmos",
            Self::Dawn => "dawn",
            Self::Orbit => "orbit",
            Self::City => "city",
            Self::Forest => "forest",
            Self::Air => "air",
            Self::Lab => "lab",
        }
    }

    /// Scene bound to a 1-based QA digit key, if any.
    pub fn from_digit(digit: u32) -> Option<Self> {
        let idx = usize::try_from(digit.checked_sub(1)?).ok()?;
        Self::ALL.get(idx).copied()
    }
}

impl fmt::Display for SceneName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SceneName {
    type Err = TidesError;

    fn from_str(s: &str) -> TidesResult<Self> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|scene| scene.as_str() == s)
            .ok_or_else(|| TidesError::validation(format!("unknown scene '{s}'")))
    }
}

/// Key of one visualization family.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VizKey {
    /// Video duration vs engagement radial chart.
    Stopwatch,
    /// Artists orbiting as planets.
    Planets,
    /// Community / sound network.
    Community,
    /// Community ranking pyramid.
    Ranking,
    /// Emotion bubble cloud.
    Emotion,
    /// Ingredient cards.
    Ingredients,
}

impl VizKey {
    /// Every visualization key in page order.
    pub const ALL: [VizKey; 6] = [
        VizKey::Stopwatch,
        VizKey::Planets,
        VizKey::Community,
        VizKey::Ranking,
        VizKey::Emotion,
        VizKey::Ingredients,
    ];

    /// Lowercase key used in `data-viz` attributes and dataset names.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopwatch => "stopwatch",
            Self::Planets => "planets",
            Self::Community => "community",
            Self::Ranking => "ranking",
            Self::Emotion => "emotion",
            Self::Ingredients => "ingredients",
        }
    }

    /// Element id of this visualization's mount point (`viz-<key>`).
    pub fn mount_id(self) -> String {
        format!("viz-{}", self.as_str())
    }
}

impl fmt::Display for VizKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VizKey {
    type Err = TidesError;

    fn from_str(s: &str) -> TidesResult<Self> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| TidesError::validation(format!("unknown visualization '{s}'")))
    }
}

/// Identifier of a scrollable section (the element id, without `#`).
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(from = "String", into = "String")]
pub struct SectionId(pub String);

impl SectionId {
    /// Build a section id, stripping a leading `#` selector prefix.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        match id.strip_prefix('#') {
            Some(stripped) => Self(stripped.to_string()),
            None => Self(id),
        }
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SectionId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<SectionId> for String {
    fn from(value: SectionId) -> Self {
        value.0
    }
}

/// Integer step number declared on a step marker.
///
/// Steps are forwarded as-is; negative or unknown values are legal and left to the receiver.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct Step(pub i64);

impl Step {
    /// Parse a step from a declared `data-step` attribute value.
    pub fn parse(raw: &str) -> TidesResult<Self> {
        raw.trim()
            .parse::<i64>()
            .map(Step)
            .map_err(|_| TidesError::validation(format!("invalid step attribute '{raw}'")))
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic page clock in milliseconds.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Millis(pub f64);

impl Millis {
    /// Add a delay, saturating non-finite input to the current time.
    pub fn after(self, delay_ms: f64) -> Self {
        if delay_ms.is_finite() {
            Self(self.0 + delay_ms.max(0.0))
        } else {
            self
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
