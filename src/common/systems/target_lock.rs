//! Target Lock Transitions
//!
//! The lock machine has two states, `Unlocked` and `Locked`, held in
//! [`TargetLockState`]. Every transition here also tells the outside world:
//! - the target widget learns the new hard or soft target
//! - the animation graph learns the lock flag (`TDM_TargetLock`)
//! - the persistent marker lets animation-condition systems see lock-on
//! - head tracking follows the hard target when enabled
//!
//! Disabling an unlocked machine touches none of the above.

use bevy::prelude::*;

use crate::common::{
    host::*,
    resources::config::Config,
    state::{target_lock::*, ControllerState},
    systems::{targeting::*, validation::*},
};

/// Replace the hard target and mirror it to the widget and head tracking.
pub fn set_target<H: Host + ?Sized>(state: &mut ControllerState, host: &mut H, config: &Config, target: Option<Entity>) {
    state.lock.set_hard_target(target);

    host.set_headtrack_target(HeadtrackSlot::TargetLock, None);
    host.set_headtrack_target(HeadtrackSlot::Default, None);
    host.set_target(target);

    if config.headtracking && target.is_some() {
        host.set_headtrack_target(HeadtrackSlot::TargetLock, target);
    }
}

/// Highlight `target` as the soft target, or clear the highlight when it is
/// not a valid target.
///
/// The widget only hears about actual changes.
pub fn set_soft_target<H: Host + ?Sized>(state: &mut ControllerState, host: &mut H, config: &Config, target: Option<Entity>) {
    if target == state.lock.soft_target() {
        return;
    }

    match target.filter(|&ent| is_valid_target(host, config, ent, true)) {
        Some(ent) => {
            state.lock.set_soft_target(Some(ent));
            host.set_soft_target(Some(ent));
        }
        None => {
            if state.lock.soft_target().is_some() {
                state.lock.set_soft_target(None);
                host.set_soft_target(None);
            }
        }
    }
}

/// Request lock-on (`enable`) or lock-off.
///
/// Lock-on fails during a conversation or when nothing can be found; a failed
/// lock-on of an already locked machine unlocks it instead. Lock-off always
/// succeeds.
pub fn toggle_target_lock<H: Host + ?Sized>(state: &mut ControllerState, host: &mut H, config: &Config, enable: bool) -> bool {
    if enable {
        if enable_target_lock(state, host, config) {
            return true;
        }
        if !state.is_locked() {
            return false;
        }
    }

    disable_target_lock(state, host, config);
    true
}

/// Lock on to the best available target. Returns `false` without touching
/// any state when no lock-on is possible.
pub fn enable_target_lock<H: Host + ?Sized>(state: &mut ControllerState, host: &mut H, config: &Config) -> bool {
    if host.speaker().is_some() {
        return false;
    }

    let order = if state.is_locked() {
        TargetSortOrder::CharacterDistanceAndCrosshair
    } else {
        TargetSortOrder::Crosshair
    };
    let Some(target) = find_target(&state.lock, host, config, config.target_lock_distance, order) else {
        return false;
    };

    set_target(state, host, config, Some(target));
    host.set_graph_bool(graph::TARGET_LOCK, true);
    host.grant_lock_marker();
    state.lock.lock(target);

    info!("locked on to {target:?}");
    true
}

/// Drop the hard target. A no-op when nothing is locked.
pub fn disable_target_lock<H: Host + ?Sized>(state: &mut ControllerState, host: &mut H, config: &Config) {
    if !state.is_locked() {
        if state.lock.hard_target().is_some() {
            warn!("hard target held while unlocked; clearing");
            state.lock.set_hard_target(None);
        }
        return;
    }

    set_target(state, host, config, None);
    host.set_graph_bool(graph::TARGET_LOCK, false);
    host.revoke_lock_marker();
    show_crosshair(state, host);
    state.lock.unlock();

    // Match rider and horse pitch to the camera so it does not snap back
    if let Some(CameraMode::Mount { look, horse }) = host.mode() {
        let mounted = host.player_state().is_some_and(|p| p.is_mounted());
        if let Some(player) = host.player().filter(|_| mounted) {
            host.set_pitch(player, -look.pitch);
            if let Some(horse) = horse {
                host.set_pitch(horse, -look.pitch);
            }
        }
    }

    info!("target lock released");
}

/// Switch the hard target sideways or to the nearest actor.
///
/// Only meaningful while locked. Repeating the same direction inside the
/// cooldown is ignored.
pub fn switch_target<H: Host + ?Sized>(
    state: &mut ControllerState,
    host: &mut H,
    config: &Config,
    direction: SwitchDirection,
) -> bool {
    if !state.is_locked() || state.lock.is_switch_cooling_down(direction) {
        return false;
    }

    let distance = config.target_lock_distance;
    let found = match direction {
        SwitchDirection::Left => find_next_target(&state.lock, host, config, distance, false),
        SwitchDirection::Right => find_next_target(&state.lock, host, config, distance, true),
        SwitchDirection::Back => find_closest_target(&state.lock, host, config, distance),
    };
    let Some(target) = found else { return false };

    set_target(state, host, config, Some(target));
    state.lock.last_switch_direction = Some(direction);
    state.lock.switch_cooldown = config.target_switch_cooldown;

    info!("switched target {direction:?} to {target:?}");
    true
}

/// Per-frame maintenance: revalidate the hard target (or the soft target when
/// unlocked) and drop whatever no longer qualifies.
pub fn update_target_lock<H: Host + ?Sized>(state: &mut ControllerState, host: &mut H, config: &Config) {
    if state.is_locked() {
        let target = state.lock.hard_target();
        if matches!(host.mode(), Some(CameraMode::Vats))
            || !check_current_target(&mut state.lock, host, config, target, false)
        {
            disable_target_lock(state, host, config);
        }
        return;
    }

    if !config.show_soft_target_bar {
        return;
    }

    if let Some(soft) = state.lock.soft_target() {
        if !check_current_target(&mut state.lock, host, config, Some(soft), false) {
            set_soft_target(state, host, config, None);
        }
    }

    // The soft target follows whatever actor the crosshair last rested on
    if let Some(hovered) = host.crosshair_actor() {
        set_soft_target(state, host, config, Some(hovered));
    }
}

/// Drop the hard and soft targets.
pub fn clear_targets<H: Host + ?Sized>(state: &mut ControllerState, host: &mut H, config: &Config) {
    if state.lock.hard_target().is_some() {
        toggle_target_lock(state, host, config, false);
    }
    if state.lock.soft_target().is_some() {
        set_soft_target(state, host, config, None);
    }
}

/// Hide the crosshair while locked, if configured and the crosshair owner agrees.
pub fn hide_crosshair<H: WidgetSink + ?Sized>(state: &mut ControllerState, host: &mut H, config: &Config) {
    if !config.target_lock_hide_crosshair || !host.request_crosshair_control() {
        return;
    }
    if host.crosshair_visible() {
        host.set_crosshair_visible(false);
        state.crosshair_hidden = true;
    }
}

/// Bring back a crosshair hidden by [`hide_crosshair`].
pub fn show_crosshair<H: WidgetSink + ?Sized>(state: &mut ControllerState, host: &mut H) {
    if !state.crosshair_hidden {
        return;
    }
    host.set_crosshair_visible(true);
    host.release_crosshair_control();
    state.crosshair_hidden = false;
}

/// Whether the configured recognition lists mark `actor` as a boss.
pub fn is_boss(config: &Config, actor: &ActorSnapshot) -> bool {
    let lists = &config.boss_recognition;
    if lists.npc_blacklist.contains(&actor.npc_id) {
        return false;
    }

    lists.races.contains(&actor.race_id)
        || lists.npcs.contains(&actor.npc_id)
        || actor.location_ref_type.is_some_and(|t| lists.location_ref_types.contains(&t))
}

pub fn add_boss<H: WidgetSink + ?Sized>(state: &mut ControllerState, host: &mut H, boss: Entity) {
    if state.lock.track_boss(boss) {
        info!("tracking boss {boss:?}");
        host.add_boss(boss);
    }
}

pub fn remove_boss<H: WidgetSink + ?Sized>(state: &mut ControllerState, host: &mut H, boss: Entity, died: bool) {
    if state.lock.untrack_boss(boss) {
        info!("boss {boss:?} removed (died: {died})");
        host.remove_boss(boss, died);
    }
}

/// Start tracking `ent` on the boss bar when it is a hostile boss in combat.
///
/// Called by the host when an actor enters combat.
pub fn track_if_boss<H: Host + ?Sized>(state: &mut ControllerState, host: &mut H, config: &Config, ent: Entity) -> bool {
    if !config.show_boss_bar {
        return false;
    }
    let Some(actor) = host.actor(ent) else { return false };
    if !actor.in_combat || !actor.hostile_to_player || actor.is_downed() || !is_boss(config, &actor) {
        return false;
    }

    add_boss(state, host, ent);
    true
}

/// Drop bosses that died, despawned or left combat.
pub fn check_bosses<H: Host + ?Sized>(state: &mut ControllerState, host: &mut H, config: &Config) {
    if !config.show_boss_bar {
        return;
    }

    let expired: Vec<(Entity, bool)> = state
        .lock
        .bosses()
        .filter_map(|boss| match host.actor(boss) {
            None => Some((boss, false)),
            Some(actor) if !actor.active || !actor.in_combat || !actor.hostile_to_player => Some((boss, false)),
            Some(actor) if actor.is_downed() => Some((boss, true)),
            Some(_) => None,
        })
        .collect();

    for (boss, died) in expired {
        remove_boss(state, host, boss, died);
    }
}
