//! Target Lock State
//!
//! Tracks the committed hard target, the highlighted soft target and the set
//! of bosses shown on the boss bar. Transitions live in
//! `common::systems::target_lock`; this type only holds the data and the
//! timers that survive between frames.

use std::collections::HashSet;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Direction of a manual target switch
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum SwitchDirection {
    Left,
    Right,
    /// Closest to the camera
    Back,
}

#[derive(Clone, Debug, Default)]
pub struct TargetLockState {
    hard_target: Option<Entity>,
    soft_target: Option<Entity>,
    bosses: HashSet<Entity>,
    locked: bool,
    /// Direction of the last successful switch
    pub last_switch_direction: Option<SwitchDirection>,
    /// Seconds left before a switch in the same direction is accepted again
    pub switch_cooldown: f32,
    /// Line-of-sight grace timer for the current target; `None` until the
    /// first check after that target was committed
    pub los_timer: Option<f32>,
}

impl TargetLockState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn hard_target(&self) -> Option<Entity> {
        self.hard_target
    }

    pub fn soft_target(&self) -> Option<Entity> {
        self.soft_target
    }

    /// Target the rest of the controller should care about: the hard target
    /// while locked, otherwise the soft target.
    pub fn current_target(&self) -> Option<Entity> {
        if self.locked { self.hard_target } else { self.soft_target }
    }

    /// Commit to a hard target. Pair with [`Self::set_hard_target`] when only
    /// the entity changes.
    pub fn lock(&mut self, target: Entity) {
        self.hard_target = Some(target);
        self.locked = true;
        self.los_timer = None;
    }

    /// Replace the hard target without touching the locked flag. A new
    /// target starts with a fresh LOS grace period.
    pub fn set_hard_target(&mut self, target: Option<Entity>) {
        if target != self.hard_target {
            self.los_timer = None;
        }
        self.hard_target = target;
    }

    /// Drop the hard target and the LOS grace timer.
    pub fn unlock(&mut self) {
        self.hard_target = None;
        self.locked = false;
        self.los_timer = None;
    }

    pub fn set_soft_target(&mut self, target: Option<Entity>) {
        if !self.locked && target != self.soft_target {
            self.los_timer = None;
        }
        self.soft_target = target;
    }

    pub fn bosses(&self) -> impl Iterator<Item = Entity> + '_ {
        self.bosses.iter().copied()
    }

    pub fn is_boss_tracked(&self, boss: Entity) -> bool {
        self.bosses.contains(&boss)
    }

    /// Returns `true` if the boss was not already tracked.
    pub fn track_boss(&mut self, boss: Entity) -> bool {
        self.bosses.insert(boss)
    }

    /// Returns `true` if the boss was tracked.
    pub fn untrack_boss(&mut self, boss: Entity) -> bool {
        self.bosses.remove(&boss)
    }

    /// Count down the switch cooldown and LOS grace timers.
    pub fn tick(&mut self, dt: f32) {
        if self.switch_cooldown > 0.0 {
            self.switch_cooldown -= dt;
        }
        if let Some(timer) = self.los_timer.as_mut() {
            if *timer > 0.0 {
                *timer -= dt;
            }
        }
    }

    /// A switch in `direction` is still cooling down.
    pub fn is_switch_cooling_down(&self, direction: SwitchDirection) -> bool {
        self.last_switch_direction == Some(direction) && self.switch_cooldown > 0.0
    }

    /// Forget everything, bosses included. Used on game load.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
