//! Fixed timestep game tick
//!
//! Scene flow around the storm update. The shell calls `tick` once per
//! simulation step and reacts to the returned events; nothing here touches
//! the platform.

use glam::Vec2;
use rand::Rng;

use super::state::{GameEvent, GameState, Scene};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Steering intent, components in {-1, 0, 1}
    pub steer: Vec2,
    /// Start a run from the title card (any key / click / tap)
    pub start: bool,
    /// Pause toggle
    pub pause: bool,
}

/// Advance the game by one fixed timestep, returning events for the shell.
pub fn tick(state: &mut GameState, input: &TickInput) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.pause {
        match state.scene {
            Scene::Playing => {
                state.scene = Scene::Paused;
                return events;
            }
            Scene::Paused => state.scene = Scene::Playing,
            _ => {}
        }
    }

    state.time_ticks += 1;

    match state.scene {
        Scene::Title => {
            if input.start {
                state.start_run();
                events.push(GameEvent::RunStarted);
                log::info!("run started (seed {})", state.seed);
            }
        }

        Scene::Paused => {}

        Scene::Playing => {
            state.storm.set_steer(input.steer);
            // A dead storm is never stepped: its stats are frozen for the
            // game-over card.
            if state.storm.is_alive() {
                let report = state.storm.step(&state.map, &mut state.rng);
                if report.scream {
                    let variant = state.rng.random_range(1u8..=3);
                    events.push(GameEvent::Scream { variant });
                }
            }
            if !state.storm.is_alive() {
                state.scene = Scene::GameOver {
                    ticks_left: GAME_OVER_HOLD_TICKS,
                };
                let casualty = state.storm.casualty();
                let lowest_pressure = state.storm.lowest_pressure_mb();
                events.push(GameEvent::StormDied {
                    casualty,
                    lowest_pressure,
                });
                log::info!("run over: {casualty} casualties, lowest pressure {lowest_pressure}mb");
            }
        }

        Scene::GameOver { ticks_left } => {
            if ticks_left > 1 {
                state.scene = Scene::GameOver {
                    ticks_left: ticks_left - 1,
                };
            } else {
                state.start_run();
                events.push(GameEvent::RunStarted);
            }
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::terrain::TerrainMap;

    fn uniform_map(r: u8, g: u8, b: u8) -> TerrainMap {
        let mut rgba = Vec::with_capacity((MAP_SIZE * MAP_SIZE * 4) as usize);
        for _ in 0..MAP_SIZE * MAP_SIZE {
            rgba.extend_from_slice(&[r, g, b, 255]);
        }
        TerrainMap::from_rgba(MAP_SIZE, MAP_SIZE, rgba).unwrap()
    }

    fn start_input() -> TickInput {
        TickInput {
            start: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_title_to_playing() {
        let mut state = GameState::new(12345);
        assert_eq!(state.scene, Scene::Title);

        // Ticking without input stays on the title card
        tick(&mut state, &TickInput::default());
        assert_eq!(state.scene, Scene::Title);

        let events = tick(&mut state, &start_input());
        assert_eq!(state.scene, Scene::Playing);
        assert!(events.contains(&GameEvent::RunStarted));
    }

    #[test]
    fn test_pause_freezes_the_storm() {
        let mut state = GameState::new(12345);
        tick(&mut state, &start_input());

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause);
        assert_eq!(state.scene, Scene::Paused);

        let frozen_pos = state.storm.pos();
        let frozen_phase = state.storm.phase();
        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
        }
        assert_eq!(state.storm.pos(), frozen_pos);
        assert_eq!(state.storm.phase(), frozen_phase);

        tick(&mut state, &pause);
        assert_eq!(state.scene, Scene::Playing);
    }

    #[test]
    fn test_pause_ignored_on_title() {
        let mut state = GameState::new(12345);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause);
        assert_eq!(state.scene, Scene::Title);
    }

    #[test]
    fn test_game_over_freezes_score_then_restarts() {
        // An all-city level weakens the storm by 4 mb per tick, so the run
        // ends quickly.
        let mut state = GameState::with_map(4242, uniform_map(200, 10, 10));
        tick(&mut state, &start_input());

        let mut died = None;
        for _ in 0..200 {
            let events = tick(&mut state, &TickInput::default());
            if let Some(GameEvent::StormDied { casualty, .. }) = events
                .iter()
                .copied()
                .find(|e| matches!(e, GameEvent::StormDied { .. }))
            {
                died = Some(casualty);
                break;
            }
        }
        let final_casualty = died.expect("storm should dissipate over a city map");

        // Scoring is frozen while the game-over card is up
        for _ in 0..10 {
            tick(&mut state, &TickInput::default());
            assert!(matches!(state.scene, Scene::GameOver { .. }));
            assert_eq!(state.storm.casualty(), final_casualty);
        }

        // After the hold the session rolls into a fresh run
        let mut restarted = false;
        for _ in 0..GAME_OVER_HOLD_TICKS {
            if tick(&mut state, &TickInput::default()).contains(&GameEvent::RunStarted) {
                restarted = true;
                break;
            }
        }
        assert!(restarted);
        assert_eq!(state.scene, Scene::Playing);
        assert_eq!(state.storm.casualty(), 0);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);

        let inputs = [
            start_input(),
            TickInput {
                steer: Vec2::new(1.0, 0.0),
                ..Default::default()
            },
            TickInput {
                steer: Vec2::new(-1.0, 1.0),
                ..Default::default()
            },
            TickInput::default(),
        ];

        for input in &inputs {
            for _ in 0..20 {
                let e1 = tick(&mut state1, input);
                let e2 = tick(&mut state2, input);
                assert_eq!(e1, e2);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.storm.pos(), state2.storm.pos());
        assert_eq!(state1.storm.pressure_mb(), state2.storm.pressure_mb());
        assert_eq!(state1.storm.casualty(), state2.storm.casualty());
    }
}
