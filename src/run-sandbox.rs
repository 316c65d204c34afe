use std::time::Duration;

use bevy::{
    app::ScheduleRunnerPlugin,
    log::{Level, LogPlugin},
    prelude::*,
};
use rand::{rngs::StdRng, SeedableRng};

use directional_movement::{
    common::{
        angle::heading_to_direction,
        host::ActorQuery,
        plugins::directional_movement::{remap_input, update},
        resources::{config::Config, MovementInput},
        state::{target_lock::SwitchDirection, ControllerState},
        systems::target_lock::{switch_target, toggle_target_lock, track_if_boss},
    },
    sandbox::arena::Arena,
    DirectionalMovementPlugin,
};

const FRAME: Duration = Duration::from_millis(16);
const SEED: u64 = 7;
const ENEMIES: usize = 8;
const FRAMES: u32 = 900;
const BOSS_RACE: u32 = 1;

/// Walk a slow circle with the left stick
fn drive_input(mut frame: Local<u32>, mut input: ResMut<MovementInput>) {
    *frame += 1;
    let heading = *frame as f32 * 0.01;
    input.raw = heading_to_direction(heading) * 0.8;
}

/// Lock on after a few seconds, flick the target around, then let go
fn script_lock(
    mut frame: Local<u32>,
    mut state: ResMut<ControllerState>,
    mut arena: ResMut<Arena>,
    config: Res<Config>,
) {
    *frame += 1;
    match *frame {
        1 => {
            let actors = arena.high_actors();
            for ent in actors {
                track_if_boss(&mut state, &mut *arena, &config, ent);
            }
        }
        180 => {
            let locked = toggle_target_lock(&mut state, &mut *arena, &config, true);
            info!("lock-on requested: {locked}");
        }
        360 => {
            switch_target(&mut state, &mut *arena, &config, SwitchDirection::Right);
        }
        540 => {
            switch_target(&mut state, &mut *arena, &config, SwitchDirection::Back);
        }
        720 => {
            toggle_target_lock(&mut state, &mut *arena, &config, false);
        }
        _ => {}
    }
}

fn move_player(time: Res<Time>, input: Res<MovementInput>, mut arena: ResMut<Arena>) {
    if input.handled {
        arena.advance(input.move_vec, time.delta_secs());
    }
}

fn report(mut frame: Local<u32>, state: Res<ControllerState>, mut exit: MessageWriter<AppExit>) {
    *frame += 1;
    if *frame % 60 == 0 {
        info!(
            "frame {} directional={} locked={} target={:?} soft={:?}",
            *frame,
            state.directional_movement,
            state.is_locked(),
            state.lock.hard_target(),
            state.lock.soft_target(),
        );
    }
    if *frame >= FRAMES {
        exit.write(AppExit::Success);
    }
}

fn main() {
    let mut rng = StdRng::seed_from_u64(SEED);

    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(FRAME)),
        LogPlugin {
            level: Level::DEBUG,
            filter: "directional_movement=debug,sandbox=debug".to_owned(),
            ..default()
        },
    ));
    let mut arena = Arena::scattered(&mut rng, ENEMIES);
    if let Some(boss) = arena.high_actors().first().copied() {
        let actor = arena.actor_mut(boss);
        actor.race_id = BOSS_RACE;
        actor.in_combat = true;
    }
    let mut config = Config::default();
    config.boss_recognition.races.insert(BOSS_RACE);

    app.insert_resource(arena).insert_resource(config);
    app.add_plugins(DirectionalMovementPlugin::<Arena>::default());

    app.add_systems(Update, (
        (drive_input, script_lock).before(remap_input::<Arena>),
        (move_player, report).after(update::<Arena>),
    ));

    app.run();
}
