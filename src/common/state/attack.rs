use serde::{Deserialize, Serialize};

/// Phase of the current melee swing, as reported by animation events.
///
/// Held as-is until the next event; only used to pick a rotation multiplier
/// and to gate melee magnetism.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum AttackState {
    #[default]
    None,
    Start,
    Mid,
    End,
}

/// The engine's own attack animation state for an actor.
///
/// Variants are declared in engine order so the range checks below can
/// compare discriminants.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum AttackAnimation {
    #[default]
    None,
    Draw,
    Swing,
    Hit,
    NextAttack,
    FollowThrough,
    Bash,
    BowDraw,
    BowAttached,
    BowDrawn,
    BowReleasing,
    BowReleased,
    BowNextAttack,
    BowFollowThrough,
    Fire,
    Firing,
    Fired,
}

impl AttackAnimation {
    /// Melee swing or bash; everything before the bow states.
    pub fn is_melee(self) -> bool {
        self > AttackAnimation::None && self < AttackAnimation::BowDraw
    }

    /// Bow draw through release.
    pub fn is_bow_aiming(self) -> bool {
        self >= AttackAnimation::BowDraw && self <= AttackAnimation::BowReleased
    }

    /// Crossbows skip the draw phase: drawn through release.
    pub fn is_crossbow_aiming(self) -> bool {
        self >= AttackAnimation::BowDrawn && self <= AttackAnimation::BowReleased
    }
}
