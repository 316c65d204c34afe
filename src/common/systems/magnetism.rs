use bevy::prelude::*;

use crate::common::{
    angle::normalize_relative,
    host::*,
    resources::config::Config,
    state::{attack::AttackState, ControllerState},
    systems::{targeting::heading_towards, validation::is_valid_target},
};

/// Pull the desired heading towards the nearest valid actor at the start of a
/// melee swing.
///
/// Only actors within the magnetism range whose heading lies inside the
/// magnetism cone around the current desired heading qualify. Once a pull has
/// been applied it holds for the rest of the swing. Returns whether a pull is
/// active.
pub fn set_desired_angle_to_magnetism_target<H: ActorQuery + ?Sized>(
    state: &mut ControllerState,
    host: &H,
    config: &Config,
) -> bool {
    state.magnetism_active = magnetism_heading(state, host, config).map_or(false, |heading| {
        if let Some(heading) = heading {
            debug!("melee magnetism towards heading {heading:.3}");
            state.desired_angle.set(heading);
        }
        true
    });
    state.magnetism_active
}

/// `None` when no pull applies, `Some(None)` when an earlier pull still
/// holds, `Some(Some(heading))` for a new pull.
fn magnetism_heading<H: ActorQuery + ?Sized>(state: &ControllerState, host: &H, config: &Config) -> Option<Option<f32>> {
    if state.facing.turning_to_crosshair {
        return None;
    }
    let player_state = host.player_state()?;
    if !player_state.attack.is_melee() || state.attack_state > AttackState::Start {
        return None;
    }

    let actors = host.high_actors();
    if actors.is_empty() {
        return None;
    }
    if state.magnetism_active {
        return Some(None);
    }

    let player = host.player()?;
    let player_actor = host.actor(player)?;
    let base = state.desired_angle.get().unwrap_or(player_actor.yaw);
    let cone = config.melee_magnetism_angle.to_radians();

    let mut best: Option<(f32, f32)> = None;
    for ent in actors {
        if !is_valid_target(host, config, ent, false) {
            continue;
        }
        let Some(actor) = host.actor(ent) else { continue };
        let distance = actor.position.distance(player_actor.position);
        if distance >= config.melee_magnetism_range {
            continue;
        }
        let Some(heading) = heading_towards(player_actor.position, actor.position) else { continue };
        let delta = normalize_relative(heading - base);
        if delta.abs() < cone && best.map_or(true, |(nearest, _)| distance < nearest) {
            best = Some((distance, delta));
        }
    }

    best.map(|(_, delta)| Some(base + delta))
}
