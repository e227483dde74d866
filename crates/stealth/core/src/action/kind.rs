//! Action kind enumeration.

/// The perception actions handled by the engine.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActionKind {
    /// Search for hidden or undetected creatures and walls.
    Seek,

    /// Become hidden to observers while concealed or in cover.
    Hide,

    /// Move while staying hidden.
    Sneak,

    /// Reveal a creature's location to allies.
    PointOut,

    /// Distract observers to become hidden.
    CreateDiversion,

    /// Lose hidden/undetected status after acting openly (e.g. attacking).
    Consequences,

    /// Improve cover against every observer.
    TakeCover,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::Seek,
        ActionKind::Hide,
        ActionKind::Sneak,
        ActionKind::PointOut,
        ActionKind::CreateDiversion,
        ActionKind::Consequences,
        ActionKind::TakeCover,
    ];

    /// Returns the snake_case name, used for ledger keys and file names.
    pub fn as_snake_case(&self) -> &'static str {
        match self {
            ActionKind::Seek => "seek",
            ActionKind::Hide => "hide",
            ActionKind::Sneak => "sneak",
            ActionKind::PointOut => "point_out",
            ActionKind::CreateDiversion => "create_diversion",
            ActionKind::Consequences => "consequences",
            ActionKind::TakeCover => "take_cover",
        }
    }
}
