use std::fmt;

/// Stable identifier for an entity placed on the scene.
///
/// The scene owns the entity; the engine only keeps this id for cache keys and
/// ledger entries.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Scene position in distance units (feet), including elevation.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: f64,
    pub y: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub elevation: f64,
}

impl Position {
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        elevation: 0.0,
    };

    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            elevation: 0.0,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = elevation;
        self
    }

    /// Straight-line distance including the elevation difference.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.elevation - other.elevation;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Integer coordinates used in cache keys.
    ///
    /// Sub-unit jitter maps to the same key; any real move produces a new one.
    pub fn truncated(&self) -> (i64, i64, i64) {
        (
            self.x.trunc() as i64,
            self.y.trunc() as i64,
            self.elevation.trunc() as i64,
        )
    }
}
