//! In-memory Host
//!
//! [`Arena`] implements every host trait over plain data so the controller can
//! run without a game attached. Fields are public: tests and the sandbox
//! binary set the scene up directly and read back what the controller wrote.
//!
//! Actors are laid out on the XY plane with Z up. The player always exists.

use std::collections::{HashMap, HashSet};

use bevy::prelude::*;
use rand::Rng;

use crate::common::{angle::*, host::*};

/// Ground speed of the player at full input (units/s)
const RUN_SPEED: f32 = 350.0;

/// Height of the player's eyes above its position
const EYE_HEIGHT: f32 = 120.0;

/// One call made through [`WidgetSink`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WidgetCall {
    Target(Option<Entity>),
    SoftTarget(Option<Entity>),
    AddBoss(Entity),
    RemoveBoss(Entity, bool),
    Crosshair(bool),
}

#[derive(Resource)]
pub struct Arena {
    world: World,
    player_entity: Entity,
    actors: HashMap<Entity, ActorSnapshot>,
    /// Spawn order of every actor but the player
    order: Vec<Entity>,
    blocked_sight: HashSet<Entity>,
    /// Third-person camera state, kept while another camera mode is active
    third_person_look: FreeLook,

    pub player: PlayerState,
    pub camera_mode: Option<CameraMode>,
    pub camera_position: Option<Vec3>,
    pub fov: f32,
    pub tweening: Option<bool>,
    pub paused: bool,
    pub speaker: Option<Entity>,
    pub character_menu_open: bool,
    pub crosshair: Option<Entity>,

    pub graph_bools: HashMap<String, bool>,
    pub graph_ints: HashMap<String, i32>,
    pub events: Vec<String>,
    pub headtrack_targets: HashMap<HeadtrackSlot, Option<Entity>>,
    pub headtrack_point: Option<Vec3>,
    pub headtracking: bool,

    pub widget_log: Vec<WidgetCall>,
    pub widget_target: Option<Entity>,
    pub widget_soft_target: Option<Entity>,
    pub bosses: Vec<Entity>,
    pub removed_bosses: Vec<(Entity, bool)>,
    pub crosshair_shown: bool,

    pub lock_marker: bool,
    pub directional_global: Option<f32>,

    pub alternate_first_person: bool,
    pub alternate_third_person: bool,
    pub alternate_conversation_camera: bool,
    pub behavior_patch: bool,
}

impl Default for Arena {
    fn default() -> Self {
        let mut world = World::new();
        let player_entity = world.spawn_empty().id();
        let player_actor = ActorSnapshot { active: true, ..default() };

        Self {
            world,
            player_entity,
            actors: HashMap::from([(player_entity, player_actor)]),
            order: Vec::new(),
            blocked_sight: HashSet::new(),
            third_person_look: FreeLook::default(),

            player: PlayerState { look_origin: Vec3::Z * EYE_HEIGHT, ..default() },
            camera_mode: Some(CameraMode::ThirdPerson(FreeLook::default())),
            camera_position: Some(Vec3::new(0.0, -300.0, 150.0)),
            fov: 80.0,
            tweening: Some(false),
            paused: false,
            speaker: None,
            character_menu_open: false,
            crosshair: None,

            graph_bools: HashMap::new(),
            graph_ints: HashMap::new(),
            events: Vec::new(),
            headtrack_targets: HashMap::new(),
            headtrack_point: None,
            headtracking: false,

            widget_log: Vec::new(),
            widget_target: None,
            widget_soft_target: None,
            bosses: Vec::new(),
            removed_bosses: Vec::new(),
            crosshair_shown: true,

            lock_marker: false,
            directional_global: None,

            alternate_first_person: false,
            alternate_third_person: false,
            alternate_conversation_camera: false,
            behavior_patch: false,
        }
    }
}

impl Arena {
    /// Arena with `count` hostile actors scattered around the player.
    pub fn scattered(rng: &mut impl Rng, count: usize) -> Self {
        let mut arena = Self::default();
        for _ in 0..count {
            let heading = rng.random_range(-std::f32::consts::PI..std::f32::consts::PI);
            let distance = rng.random_range(200.0..2500.0);
            let position = (heading_to_direction(heading) * distance).extend(rng.random_range(-50.0..50.0));
            let ent = arena.spawn_hostile(position);
            let actor = arena.actor_mut(ent);
            actor.yaw = rng.random_range(-std::f32::consts::PI..std::f32::consts::PI);
            actor.in_combat = rng.random_bool(0.5);
        }
        arena
    }

    pub fn player_entity(&self) -> Entity {
        self.player_entity
    }

    fn spawn(&mut self, actor: ActorSnapshot) -> Entity {
        let ent = self.world.spawn_empty().id();
        self.actors.insert(ent, actor);
        self.order.push(ent);
        ent
    }

    /// Spawn an active character hostile to the player.
    pub fn spawn_hostile(&mut self, position: Vec3) -> Entity {
        self.spawn(ActorSnapshot { position, active: true, hostile_to_player: true, ..default() })
    }

    /// Spawn an active character that does not care about the player.
    pub fn spawn_neutral(&mut self, position: Vec3) -> Entity {
        self.spawn(ActorSnapshot { position, active: true, ..default() })
    }

    /// Remove an actor; its handle stops resolving.
    pub fn despawn(&mut self, ent: Entity) {
        if ent == self.player_entity {
            return;
        }
        self.actors.remove(&ent);
        self.order.retain(|&e| e != ent);
        self.world.despawn(ent);
    }

    /// Mutable snapshot of `ent`, created blank if it does not exist yet.
    pub fn actor_mut(&mut self, ent: Entity) -> &mut ActorSnapshot {
        self.actors.entry(ent).or_default()
    }

    pub fn block_sight(&mut self, ent: Entity) {
        self.blocked_sight.insert(ent);
    }

    pub fn restore_sight(&mut self, ent: Entity) {
        self.blocked_sight.remove(&ent);
    }

    /// Move the player along its facing by the remapped input vector.
    ///
    /// `move_vec` is relative to the character, +Y forward.
    pub fn advance(&mut self, move_vec: Vec2, dt: f32) {
        let Some(player) = self.actors.get_mut(&self.player_entity) else { return };
        let step = rotate_heading(move_vec, player.yaw) * RUN_SPEED * dt;
        player.position += step.extend(0.0);
        self.player.look_origin = player.position + Vec3::Z * EYE_HEIGHT;
        if let Some(camera) = self.camera_position.as_mut() {
            *camera += step.extend(0.0);
        }
    }
}

impl ActorQuery for Arena {
    fn player(&self) -> Option<Entity> {
        Some(self.player_entity)
    }

    fn player_state(&self) -> Option<PlayerState> {
        Some(self.player)
    }

    fn actor(&self, ent: Entity) -> Option<ActorSnapshot> {
        self.actors.get(&ent).copied()
    }

    fn high_actors(&self) -> Vec<Entity> {
        self.order.iter().copied().filter(|e| self.actors.get(e).is_some_and(|a| a.active)).collect()
    }

    fn has_line_of_sight(&self, _from: Entity, to: Entity) -> bool {
        !self.blocked_sight.contains(&to)
    }

    fn crosshair_actor(&self) -> Option<Entity> {
        self.crosshair
    }
}

impl ActorControl for Arena {
    fn set_yaw(&mut self, ent: Entity, yaw: f32) {
        if let Some(actor) = self.actors.get_mut(&ent) {
            actor.yaw = normalize_relative(yaw);
        }
    }

    fn set_pitch(&mut self, ent: Entity, pitch: f32) {
        if let Some(actor) = self.actors.get_mut(&ent) {
            actor.pitch = pitch;
        }
    }

    fn set_headtracking(&mut self, enabled: bool) {
        self.headtracking = enabled;
    }
}

impl CameraQuery for Arena {
    fn mode(&self) -> Option<CameraMode> {
        self.camera_mode
    }

    fn position(&self) -> Option<Vec3> {
        self.camera_position
    }

    fn fov(&self) -> f32 {
        self.fov
    }

    fn free_look(&self) -> Option<FreeLook> {
        let mode = self.camera_mode?;
        Some(mode.free_look().unwrap_or(self.third_person_look))
    }

    fn set_free_look(&mut self, new_look: FreeLook) {
        self.third_person_look = new_look;
        match self.camera_mode.as_mut() {
            Some(CameraMode::ThirdPerson(look)) | Some(CameraMode::Mount { look, .. }) => *look = new_look,
            _ => {}
        }
    }

    fn is_tweening(&self) -> Option<bool> {
        self.tweening
    }
}

impl DialogueQuery for Arena {
    fn is_paused(&self) -> bool {
        self.paused
    }

    fn speaker(&self) -> Option<Entity> {
        self.speaker
    }

    fn is_character_menu_open(&self) -> bool {
        self.character_menu_open
    }
}

impl AnimationSink for Arena {
    fn notify(&mut self, event: &str) {
        self.events.push(event.to_owned());
    }

    fn graph_bool(&self, name: &str) -> Option<bool> {
        self.graph_bools.get(name).copied()
    }

    fn set_graph_bool(&mut self, name: &str, value: bool) {
        self.graph_bools.insert(name.to_owned(), value);
    }

    fn graph_int(&self, name: &str) -> Option<i32> {
        self.graph_ints.get(name).copied()
    }

    fn set_headtrack_target(&mut self, slot: HeadtrackSlot, target: Option<Entity>) {
        self.headtrack_targets.insert(slot, target);
    }

    fn set_headtrack_point(&mut self, point: Vec3) {
        self.headtrack_point = Some(point);
    }
}

impl WidgetSink for Arena {
    fn set_target(&mut self, target: Option<Entity>) {
        self.widget_log.push(WidgetCall::Target(target));
        self.widget_target = target;
    }

    fn set_soft_target(&mut self, target: Option<Entity>) {
        self.widget_log.push(WidgetCall::SoftTarget(target));
        self.widget_soft_target = target;
    }

    fn add_boss(&mut self, boss: Entity) {
        self.widget_log.push(WidgetCall::AddBoss(boss));
        self.bosses.push(boss);
    }

    fn remove_boss(&mut self, boss: Entity, died: bool) {
        self.widget_log.push(WidgetCall::RemoveBoss(boss, died));
        self.bosses.retain(|&b| b != boss);
        self.removed_bosses.push((boss, died));
    }

    fn crosshair_visible(&self) -> bool {
        self.crosshair_shown
    }

    fn set_crosshair_visible(&mut self, visible: bool) {
        self.widget_log.push(WidgetCall::Crosshair(visible));
        self.crosshair_shown = visible;
    }
}

impl FlagSink for Arena {
    fn grant_lock_marker(&mut self) {
        self.lock_marker = true;
    }

    fn revoke_lock_marker(&mut self) {
        self.lock_marker = false;
    }

    fn set_directional_movement_global(&mut self, value: f32) {
        self.directional_global = Some(value);
    }
}

impl CompatibilityFlags for Arena {
    fn alternate_first_person_active(&self) -> bool {
        self.alternate_first_person
    }

    fn alternate_third_person_active(&self) -> bool {
        self.alternate_third_person
    }

    fn alternate_conversation_camera(&self) -> bool {
        self.alternate_conversation_camera
    }

    fn behavior_patch_installed(&self) -> bool {
        self.behavior_patch
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn test_player_always_resolves() {
        let arena = Arena::default();
        let player = arena.player().unwrap();
        assert_eq!(player, arena.player_entity());
        assert!(arena.actor(player).is_some_and(|a| a.active));
        assert!(arena.high_actors().is_empty());
    }

    #[test]
    fn test_high_actors_in_spawn_order() {
        let mut arena = Arena::default();
        let a = arena.spawn_hostile(Vec3::X);
        let b = arena.spawn_neutral(Vec3::Y);
        let c = arena.spawn_hostile(Vec3::Z);
        arena.actor_mut(b).active = false;
        assert_eq!(arena.high_actors(), vec![a, c]);
    }

    #[test]
    fn test_despawned_handle_stops_resolving() {
        let mut arena = Arena::default();
        let a = arena.spawn_hostile(Vec3::X);
        arena.despawn(a);
        assert_eq!(arena.actor(a), None);
        assert!(arena.high_actors().is_empty());

        let player = arena.player_entity();
        arena.despawn(player);
        assert!(arena.actor(player).is_some());
    }

    #[test]
    fn test_free_look_survives_camera_mode_changes() {
        let mut arena = Arena::default();
        arena.set_free_look(FreeLook { yaw: 0.3, pitch: 0.1 });
        assert_eq!(arena.free_look(), Some(FreeLook { yaw: 0.3, pitch: 0.1 }));

        arena.camera_mode = Some(CameraMode::Tween);
        assert_eq!(arena.free_look(), Some(FreeLook { yaw: 0.3, pitch: 0.1 }));
        arena.set_free_look(FreeLook { yaw: 1.0, pitch: 1.0 });
        assert_eq!(arena.free_look(), Some(FreeLook { yaw: 1.0, pitch: 1.0 }));

        arena.camera_mode = None;
        assert_eq!(arena.free_look(), None);
    }

    #[test]
    fn test_advance_walks_along_facing() {
        let mut arena = Arena::default();
        let player = arena.player_entity();
        arena.set_yaw(player, std::f32::consts::FRAC_PI_2);

        arena.advance(Vec2::Y, 1.0);
        let position = arena.actor(player).unwrap().position;
        assert!((position - Vec3::X * RUN_SPEED).length() < 1e-2);
        assert!((arena.player.look_origin.z - EYE_HEIGHT).abs() < 1e-5);
    }

    #[test]
    fn test_scattered_is_reproducible() {
        let first = Arena::scattered(&mut StdRng::seed_from_u64(7), 6);
        let second = Arena::scattered(&mut StdRng::seed_from_u64(7), 6);
        let positions = |arena: &Arena| {
            arena.high_actors().iter().filter_map(|&e| arena.actor(e)).map(|a| a.position).collect::<Vec<_>>()
        };
        assert_eq!(positions(&first).len(), 6);
        assert_eq!(positions(&first), positions(&second));
    }
}
