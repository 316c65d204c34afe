//! Facing and Aiming
//!
//! Decides every frame whether the crosshair, the target or free movement has
//! authority over the character's heading. The decision is an ordered list;
//! the first rule that matches wins:
//!
//! 1. auto-move (when configured)
//! 2. a melee swing while unlocked
//! 3. shouting
//! 4. blocking or bashing while unlocked
//! 5. drawing a bow or crossbow
//! 6. a staff in its firing pose, or casting a spell that is not self-delivered
//!
//! Rules 2 to 6 re-arm the hold timer, so the crosshair keeps authority for a
//! short grace period after the action ends. Only when no rule matches and the
//! timer has run out are the flags cleared.

use crate::common::{
    host::*,
    resources::config::{AimType, Config},
    state::{attack::AttackAnimation, facing::FacingState, ControllerState},
};

/// Re-derive the facing intent for this frame.
pub fn update_facing_state<H: ActorQuery + AnimationSink + ?Sized>(state: &mut ControllerState, host: &H, config: &Config) {
    let locked = state.is_locked();
    let facing = &mut state.facing;

    if facing.is_holding() {
        facing.should_face_crosshair = true;
        facing.should_face_target = true;
    }
    facing.aiming = false;

    let Some(player) = host.player_state() else { return };

    if config.face_crosshair_during_auto_move && player.auto_move {
        facing.should_face_crosshair = true;
        facing.should_face_target = true;
        return;
    }

    // Re-attaching an arrow replays the attach state; remember what came before it
    let previous_attack = facing.last_attack;
    if player.attack != AttackAnimation::BowAttached {
        facing.last_attack = player.attack;
    }

    let hold = config.face_crosshair_duration;

    if config.face_crosshair_while_attacking && player.attack.is_melee() && !locked {
        face_crosshair(facing, hold);
        return;
    }

    if config.face_crosshair_while_shouting && player.shouting {
        face_crosshair(facing, hold);
        return;
    }

    if config.face_crosshair_while_blocking && (player.blocking || player.attack == AttackAnimation::Bash) && !locked {
        face_crosshair(facing, hold);
        return;
    }

    let free_arrows = !locked || config.target_lock_arrow_aim_type == AimType::Free;
    let free_missiles = !locked || config.target_lock_missile_aim_type == AimType::Free;
    let staff_firing = host.graph_int(graph::STATE) == Some(graph::STAFF_FIRING_STATE);

    let aiming_with = |item: Option<HeldItem>, right_hand: bool| -> Option<bool> {
        match item? {
            HeldItem::Bow if right_hand => {
                let reattach = player.attack == AttackAnimation::BowAttached
                    && matches!(previous_attack, AttackAnimation::None | AttackAnimation::BowReleased);
                (player.attack.is_bow_aiming() && !reattach).then_some(free_arrows)
            }
            HeldItem::Crossbow if right_hand => player.attack.is_crossbow_aiming().then_some(free_arrows),
            HeldItem::Staff => staff_firing.then_some(free_missiles),
            HeldItem::Spell { casting: true, self_delivered: false } => Some(free_missiles),
            _ => None,
        }
    };

    if let Some(free) = aiming_with(player.right_hand, true).or_else(|| aiming_with(player.left_hand, false)) {
        facing.aiming = free;
        facing.should_face_crosshair = free;
        if free {
            facing.arm(hold);
        }
        facing.should_face_target = true;
        return;
    }

    if !facing.is_holding() {
        facing.should_face_crosshair = false;
        facing.should_face_target = false;
    }
}

fn face_crosshair(facing: &mut FacingState, hold: f32) {
    facing.should_face_crosshair = true;
    facing.should_face_target = true;
    facing.arm(hold);
}

/// Turn towards the camera heading while the crosshair has authority and the
/// camera looks away from the character.
pub fn update_facing_crosshair<H: ActorQuery + CameraQuery + ?Sized>(state: &mut ControllerState, host: &H) {
    state.facing.turning_to_crosshair = false;
    if !state.facing.should_face_crosshair {
        return;
    }

    let Some(CameraMode::ThirdPerson(look)) = host.mode() else { return };
    if look.yaw.abs() <= f32::EPSILON {
        return;
    }
    let Some(player) = host.player().and_then(|p| host.actor(p)) else { return };

    state.facing.turning_to_crosshair = true;
    state.desired_angle.set(player.yaw + look.yaw);
}

/// Track the dodge graph variable; the first dodge frame cancels the
/// crosshair hold unless an animation is steering the character.
pub fn update_dodging_state<H: ActorQuery + AnimationSink + ?Sized>(state: &mut ControllerState, host: &H) {
    state.dodge.observe(host.graph_bool(graph::DODGE).unwrap_or(false));

    let animation_driven = host.player_state().is_some_and(|p| p.animation_driven);
    if state.dodge.just_dodged && !animation_driven {
        state.facing.cancel_hold();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::arena::Arena;

    fn run(arena: &Arena, state: &mut ControllerState, config: &Config) {
        update_facing_state(state, arena, config);
    }

    #[test]
    fn test_idle_has_no_authority() {
        let arena = Arena::default();
        let mut state = ControllerState::new();
        run(&arena, &mut state, &Config::default());
        assert!(!state.facing.should_face_crosshair);
        assert!(!state.facing.should_face_target);
        assert!(!state.facing.aiming);
    }

    #[test]
    fn test_auto_move_faces_without_arming() {
        let mut arena = Arena::default();
        arena.player.auto_move = true;
        let mut state = ControllerState::new();
        run(&arena, &mut state, &Config::default());
        assert!(state.facing.should_face_crosshair && state.facing.should_face_target);
        assert!(!state.facing.is_holding());
    }

    #[test]
    fn test_melee_only_when_configured_and_unlocked() {
        let mut arena = Arena::default();
        arena.player.attack = AttackAnimation::Swing;
        let mut state = ControllerState::new();

        run(&arena, &mut state, &Config::default());
        assert!(!state.facing.should_face_crosshair);

        let config = Config { face_crosshair_while_attacking: true, ..Config::default() };
        run(&arena, &mut state, &config);
        assert!(state.facing.should_face_crosshair);
        assert!(state.facing.is_holding());

        let mut state = ControllerState::new();
        let target = arena.spawn_hostile(bevy::prelude::Vec3::Y * 300.0);
        state.lock.lock(target);
        run(&arena, &mut state, &config);
        assert!(!state.facing.should_face_crosshair);
    }

    #[test]
    fn test_hold_timer_keeps_authority_after_release() {
        let mut arena = Arena::default();
        let config = Config::default();
        let mut state = ControllerState::new();

        arena.player.shouting = true;
        run(&arena, &mut state, &config);
        assert!(state.facing.should_face_crosshair);

        arena.player.shouting = false;
        state.tick(0.2);
        run(&arena, &mut state, &config);
        assert!(state.facing.should_face_crosshair);

        state.tick(0.3);
        run(&arena, &mut state, &config);
        assert!(!state.facing.should_face_crosshair);
        assert!(!state.facing.should_face_target);
    }

    #[test]
    fn test_bow_aiming_depends_on_lock_and_aim_type() {
        let mut arena = Arena::default();
        arena.player.right_hand = Some(HeldItem::Bow);
        arena.player.attack = AttackAnimation::BowDrawn;
        let mut state = ControllerState::new();

        run(&arena, &mut state, &Config::default());
        assert!(state.facing.aiming && state.facing.should_face_crosshair && state.facing.should_face_target);

        let target = arena.spawn_hostile(bevy::prelude::Vec3::Y * 300.0);
        let mut state = ControllerState::new();
        state.lock.lock(target);
        run(&arena, &mut state, &Config::default());
        assert!(!state.facing.aiming);
        assert!(!state.facing.should_face_crosshair);
        assert!(state.facing.should_face_target);
        assert!(!state.facing.is_holding());

        let config = Config { target_lock_arrow_aim_type: AimType::Free, ..Config::default() };
        run(&arena, &mut state, &config);
        assert!(state.facing.aiming);
    }

    #[test]
    fn test_bow_reattach_after_release_is_not_aiming() {
        let mut arena = Arena::default();
        arena.player.right_hand = Some(HeldItem::Bow);
        let config = Config { face_crosshair_duration: 0.0, ..Config::default() };
        let mut state = ControllerState::new();

        arena.player.attack = AttackAnimation::BowReleased;
        run(&arena, &mut state, &config);
        assert!(state.facing.aiming);

        arena.player.attack = AttackAnimation::BowAttached;
        run(&arena, &mut state, &config);
        assert!(!state.facing.aiming);

        // Attaching mid-draw still counts
        arena.player.attack = AttackAnimation::BowDraw;
        run(&arena, &mut state, &config);
        arena.player.attack = AttackAnimation::BowAttached;
        run(&arena, &mut state, &config);
        assert!(state.facing.aiming);
    }

    #[test]
    fn test_crossbow_skips_draw() {
        let mut arena = Arena::default();
        arena.player.right_hand = Some(HeldItem::Crossbow);
        arena.player.attack = AttackAnimation::BowDraw;
        let mut state = ControllerState::new();
        run(&arena, &mut state, &Config::default());
        assert!(!state.facing.aiming);

        arena.player.attack = AttackAnimation::BowDrawn;
        run(&arena, &mut state, &Config::default());
        assert!(state.facing.aiming);
    }

    #[test]
    fn test_staff_and_spells_in_either_hand() {
        let mut arena = Arena::default();
        let mut state = ControllerState::new();
        let config = Config::default();

        arena.player.left_hand = Some(HeldItem::Staff);
        run(&arena, &mut state, &config);
        assert!(!state.facing.aiming);
        arena.graph_ints.insert(graph::STATE.to_string(), graph::STAFF_FIRING_STATE);
        run(&arena, &mut state, &config);
        assert!(state.facing.aiming);

        let mut arena = Arena::default();
        arena.player.left_hand = Some(HeldItem::Spell { casting: true, self_delivered: true });
        run(&arena, &mut state, &Config { face_crosshair_duration: 0.0, ..config.clone() });
        assert!(!state.facing.aiming);

        arena.player.right_hand = Some(HeldItem::Spell { casting: true, self_delivered: false });
        run(&arena, &mut state, &config);
        assert!(state.facing.aiming);
    }

    #[test]
    fn test_facing_crosshair_sets_camera_heading() {
        use crate::common::angle::normalize_relative;

        let mut arena = Arena::default();
        arena.camera_mode = Some(CameraMode::ThirdPerson(FreeLook { yaw: 1.0, pitch: 0.0 }));
        let mut state = ControllerState::new();

        update_facing_crosshair(&mut state, &arena);
        assert!(!state.facing.turning_to_crosshair);

        state.facing.should_face_crosshair = true;
        update_facing_crosshair(&mut state, &arena);
        assert!(state.facing.turning_to_crosshair);
        let yaw = arena.actor(arena.player_entity()).map(|a| a.yaw).unwrap_or_default();
        assert!((state.desired_angle.get().unwrap() - normalize_relative(yaw + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_dodge_cancels_hold() {
        let mut arena = Arena::default();
        let mut state = ControllerState::new();
        state.facing.arm(0.4);

        arena.graph_bools.insert(graph::DODGE.to_string(), true);
        update_dodging_state(&mut state, &arena);
        assert!(state.dodge.just_dodged);
        assert!(!state.facing.is_holding());

        state.facing.arm(0.4);
        update_dodging_state(&mut state, &arena);
        assert!(!state.dodge.just_dodged);
        assert!(state.facing.is_holding());
    }
}
