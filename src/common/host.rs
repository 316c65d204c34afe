//! Host Capabilities
//!
//! The controller never reaches into the game directly. Everything it reads
//! or writes goes through the narrow traits below, handed to each system by
//! the caller. Production code wires them to the game; tests and the sandbox
//! binary use `sandbox::Arena`.
//!
//! Every read may come back empty. Handles are weak: an `Entity` that resolved
//! last frame may not resolve this frame.

use bevy::prelude::*;

use crate::common::state::attack::AttackAnimation;

/// Size class of an actor's race, used to scale lock-on distance
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RaceSize {
    Small,
    #[default]
    Medium,
    Large,
    ExtraLarge,
}

/// Form type of a world reference
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ActorKind {
    /// Humanoid or creature actor; the only kind that can be targeted
    #[default]
    Character,
    Other,
}

/// Read-only view of an actor for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ActorSnapshot {
    pub kind: ActorKind,
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub race_size: RaceSize,
    pub race_id: u32,
    pub npc_id: u32,
    pub location_ref_type: Option<u32>,
    /// Loaded, attached and simulated at full detail
    pub active: bool,
    pub dead: bool,
    pub bleeding_out: bool,
    pub essential: bool,
    pub invisibility: f32,
    pub hostile_to_player: bool,
    pub in_combat: bool,
}

impl ActorSnapshot {
    /// Bleeding out while essential counts as down for good.
    pub fn is_downed(&self) -> bool {
        self.dead || (self.bleeding_out && self.essential)
    }
}

/// Something held in one hand
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HeldItem {
    Bow,
    Crossbow,
    Staff,
    Spell { casting: bool, self_delivered: bool },
    Other,
}

/// Player-only reads for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerState {
    pub weapon_drawn: bool,
    pub attack: AttackAnimation,
    pub right_hand: Option<HeldItem>,
    pub left_hand: Option<HeldItem>,
    pub shouting: bool,
    pub blocking: bool,
    /// Currently sprinting according to the engine
    pub sprinting: bool,
    /// Sprint key held, before the engine agrees
    pub wants_to_sprint: bool,
    pub airborne: bool,
    pub swimming: bool,
    pub mount: Option<Entity>,
    pub animation_driven: bool,
    pub ai_driven: bool,
    pub auto_move: bool,
    /// A time-slowing effect is active
    pub slow_time: bool,
    /// Race is a transformation (werewolf and the like)
    pub transformed: bool,
    /// Rotation rate of the active animation movement type (rad/s)
    pub movement_rotation_rate: Option<f32>,
    /// Point the head looks out from
    pub look_origin: Vec3,
}

impl PlayerState {
    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }
}

/// Free-look offset of a third-person style camera, relative to the character
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FreeLook {
    pub yaw: f32,
    pub pitch: f32,
}

/// The camera modes the controller distinguishes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CameraMode {
    /// `pitch` is the camera object's own pitch
    FirstPerson { pitch: f32 },
    ThirdPerson(FreeLook),
    Mount { look: FreeLook, horse: Option<Entity> },
    Tween,
    Bleedout,
    /// Bullet-time targeting; incompatible with lock-on
    Vats,
    Other,
}

impl CameraMode {
    pub fn is_third_person(&self) -> bool {
        matches!(self, CameraMode::ThirdPerson(_))
    }

    /// Free-look offset of the modes that carry one.
    pub fn free_look(&self) -> Option<FreeLook> {
        match self {
            CameraMode::ThirdPerson(look) | CameraMode::Mount { look, .. } => Some(*look),
            _ => None,
        }
    }
}

/// Head-tracking priority slot
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HeadtrackSlot {
    Default,
    Dialogue,
    TargetLock,
}

pub trait ActorQuery {
    fn player(&self) -> Option<Entity>;
    fn player_state(&self) -> Option<PlayerState>;
    fn actor(&self, ent: Entity) -> Option<ActorSnapshot>;
    /// Actors currently simulated at full detail
    fn high_actors(&self) -> Vec<Entity>;
    fn has_line_of_sight(&self, from: Entity, to: Entity) -> bool;
    /// Actor under the crosshair, if any
    fn crosshair_actor(&self) -> Option<Entity>;
}

pub trait ActorControl {
    fn set_yaw(&mut self, ent: Entity, yaw: f32);
    fn set_pitch(&mut self, ent: Entity, pitch: f32);
    fn set_headtracking(&mut self, enabled: bool);
}

pub trait CameraQuery {
    fn mode(&self) -> Option<CameraMode>;
    fn position(&self) -> Option<Vec3>;
    /// World field of view in degrees
    fn fov(&self) -> f32;
    /// Third-person free look; available even while another mode is active
    fn free_look(&self) -> Option<FreeLook>;
    /// Write the free look of the third-person (or mount) camera
    fn set_free_look(&mut self, look: FreeLook);
    fn is_tweening(&self) -> Option<bool>;
}

pub trait DialogueQuery {
    fn is_paused(&self) -> bool;
    fn speaker(&self) -> Option<Entity>;
    fn is_character_menu_open(&self) -> bool;
}

pub trait AnimationSink {
    fn notify(&mut self, event: &str);
    fn graph_bool(&self, name: &str) -> Option<bool>;
    fn set_graph_bool(&mut self, name: &str, value: bool);
    fn graph_int(&self, name: &str) -> Option<i32>;
    fn set_headtrack_target(&mut self, slot: HeadtrackSlot, target: Option<Entity>);
    fn set_headtrack_point(&mut self, point: Vec3);
}

pub trait WidgetSink {
    fn set_target(&mut self, target: Option<Entity>);
    fn set_soft_target(&mut self, target: Option<Entity>);
    fn add_boss(&mut self, boss: Entity);
    fn remove_boss(&mut self, boss: Entity, died: bool);
    fn crosshair_visible(&self) -> bool;
    fn set_crosshair_visible(&mut self, visible: bool);
    /// Ask a camera mod that owns the crosshair for control
    fn request_crosshair_control(&mut self) -> bool {
        true
    }
    fn release_crosshair_control(&mut self) {}
}

pub trait FlagSink {
    /// Marker that lets animation-condition systems detect lock-on
    fn grant_lock_marker(&mut self);
    fn revoke_lock_marker(&mut self);
    fn set_directional_movement_global(&mut self, value: f32);
}

/// Third-party camera mods, detected by the host.
pub trait CompatibilityFlags {
    fn alternate_first_person_active(&self) -> bool {
        false
    }
    fn alternate_third_person_active(&self) -> bool {
        false
    }
    fn alternate_conversation_camera(&self) -> bool {
        false
    }
    /// Behavior files that understand the headtracking marker are installed
    fn behavior_patch_installed(&self) -> bool {
        false
    }
}

/// Everything the per-frame update needs.
pub trait Host:
    ActorQuery + ActorControl + CameraQuery + DialogueQuery + AnimationSink + WidgetSink + FlagSink + CompatibilityFlags
{
}

impl<T> Host for T where
    T: ActorQuery + ActorControl + CameraQuery + DialogueQuery + AnimationSink + WidgetSink + FlagSink + CompatibilityFlags
{
}

/// Graph variable names shared with the behavior files
pub mod graph {
    pub const DODGE: &str = "TDM_Dodge";
    pub const TARGET_LOCK: &str = "TDM_TargetLock";
    pub const TURN_180: &str = "TDM_Turn_180";
    pub const IS_NPC: &str = "IsNPC";
    pub const STATE: &str = "iState";
    /// `iState` value of a staff held in its firing pose
    pub const STAFF_FIRING_STATE: i32 = 10;
}
