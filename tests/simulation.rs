//! End-to-end driver scenarios

use felt_physics::PhysicsSettings;
use felt_physics::consts::*;
use felt_physics::sim::{
    Ball, BallKind, CuePlacement, EdgeKind, Rack, SimEvent, SimPhase, SimulationState,
    TableBoundary, TickInput, place_cue_ball, setup, tick,
};
use glam::Vec2;

const TABLE: &str = include_str!("../assets/table.obj");

fn moving(pos: Vec2, vel: Vec2) -> Ball {
    let mut ball = Ball::new(0, pos);
    ball.vel = vel;
    ball
}

fn run_to_rest(state: &mut SimulationState, limit: usize) -> usize {
    let idle = TickInput::default();
    let mut ticks = 0;
    while state.phase == SimPhase::InMotion {
        tick(state, &idle, SIM_DT);
        ticks += 1;
        assert!(ticks < limit, "still moving after {} ticks", limit);
    }
    ticks
}

/// Even-odd test against the table's boundary edges
fn on_table(table: &TableBoundary, p: Vec2) -> bool {
    let mut inside = false;
    for k in 0..table.edge_count() {
        let (a, b) = table.edge(k);
        if (a.y > p.y) != (b.y > p.y) && p.x < a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y) {
            inside = !inside;
        }
    }
    inside
}

fn shoot(state: &mut SimulationState, velocity: Vec2) {
    let input = TickInput {
        shot: Some(velocity),
        ..Default::default()
    };
    tick(state, &input, SIM_DT);
}

#[test]
fn head_on_transfers_velocity() {
    let mut state = SimulationState::with_balls(
        TableBoundary::open(),
        PhysicsSettings::frictionless(),
        vec![
            moving(Vec2::ZERO, Vec2::new(1.0, 0.0)),
            Ball::new(1, Vec2::new(0.05, 0.0)),
        ],
    );
    assert_eq!(state.phase, SimPhase::InMotion);

    tick(&mut state, &TickInput::default(), 0.01);
    tick(&mut state, &TickInput::default(), 0.01);

    let (a, b) = (state.balls[0], state.balls[1]);
    assert_eq!(a.vel, Vec2::ZERO);
    assert!(a.pos.x.abs() < 0.01, "A ended at {:?}", a.pos);
    assert!((b.vel - Vec2::new(1.0, 0.0)).length() < 1e-5);
    assert!(b.pos.x > 0.05);
    assert!((state.clock.time - 0.02).abs() < 1e-6);
}

#[test]
fn rails_keep_ball_on_table() {
    let table = TableBoundary::square(0.5, Some([EdgeKind::Rail; 4])).unwrap();
    let mut state = SimulationState::with_balls(
        table,
        PhysicsSettings::frictionless(),
        vec![moving(Vec2::ZERO, Vec2::new(1.3, 0.7))],
    );
    let mut reflections = 0;
    let mut last_vel = state.balls[0].vel;
    for _ in 0..3000 {
        tick(&mut state, &TickInput::default(), SIM_DT);
        let ball = state.balls[0];
        assert!(ball.in_play());
        assert!(ball.pos.x.abs() <= 0.5 && ball.pos.y.abs() <= 0.5, "escaped to {:?}", ball.pos);
        // Speed is preserved by reflection
        assert!((ball.vel.length() - last_vel.length()).abs() < 1e-4);
        if ball.vel != last_vel {
            reflections += 1;
        }
        last_vel = ball.vel;
    }
    assert!(reflections > 10);
}

#[test]
fn pocket_edge_sinks_ball() {
    // Conventional classification: the right edge of the square is a pocket
    let table = TableBoundary::square(0.5, None).unwrap();
    assert_eq!(table.kind(1), EdgeKind::Pocket);
    let mut state = SimulationState::with_balls(
        table,
        PhysicsSettings::default(),
        vec![moving(Vec2::ZERO, Vec2::new(1.0, 0.0))],
    );
    run_to_rest(&mut state, 10_000);

    let events = state.drain_events();
    assert!(events.contains(&SimEvent::BallSunk {
        id: 0,
        kind: BallKind::Cue
    }));
    assert_eq!(events.last(), Some(&SimEvent::CameToRest));
    assert!(state.balls[0].sunk);
    assert!(state.needs_cue_placement());
}

#[test]
fn sunk_balls_stay_sunk() {
    let table = TableBoundary::square(0.5, None).unwrap();
    let mut state = SimulationState::with_balls(
        table,
        PhysicsSettings::default(),
        vec![
            moving(Vec2::new(0.0, 0.1), Vec2::new(1.0, 0.0)),
            moving(Vec2::new(0.0, -0.1), Vec2::new(1.2, 0.3)),
            Ball::new(2, Vec2::new(-0.3, 0.0)),
        ],
    );
    let idle = TickInput::default();
    let mut sunk_reports = vec![0; state.balls.len()];
    for _ in 0..5000 {
        tick(&mut state, &idle, SIM_DT);
        for event in state.drain_events() {
            if let SimEvent::BallSunk { id, .. } = event {
                sunk_reports[id] += 1;
            }
        }
        for ball in state.balls.iter().filter(|b| b.sunk) {
            assert!(!ball.in_play());
            assert_eq!(ball.vel, Vec2::ZERO);
        }
        if state.phase == SimPhase::AtRest {
            break;
        }
    }
    assert!(sunk_reports.iter().all(|&n| n <= 1));
    assert_eq!(sunk_reports[0], 1);
    assert!(!state.balls[2].sunk);
}

#[test]
fn rest_is_idempotent() {
    for seed in 0..5 {
        let settings = PhysicsSettings {
            seed,
            ..Default::default()
        };
        let (mut state, _) = setup(TableBoundary::parse(TABLE).unwrap(), settings, HEAD_SPOT);
        let before = state.balls.clone();
        for _ in 0..100 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.balls, before);
        assert_eq!(state.phase, SimPhase::AtRest);
        assert!(state.drain_events().is_empty());
    }
}

#[test]
fn rack_on_bundled_table() {
    let table = TableBoundary::parse(TABLE).unwrap();
    let (lo, hi) = table.bounds().unwrap();
    let (state, rack) = setup(table, PhysicsSettings::default(), HEAD_SPOT);

    assert!(rack.is_legal());
    assert_eq!(state.balls.len(), NUM_BALLS);
    assert!(state.kitchen.contains(state.balls[CUE_BALL].pos));
    for (i, ball) in state.balls.iter().enumerate() {
        assert_eq!(ball.id, i);
        assert!(ball.pos.cmpge(lo).all() && ball.pos.cmple(hi).all());
    }
    assert_eq!(rack, Rack::shuffled(0));
}

#[test]
fn break_is_deterministic_and_settles() {
    let run = || {
        let (mut state, _) = setup(
            TableBoundary::parse(TABLE).unwrap(),
            PhysicsSettings::default(),
            HEAD_SPOT,
        );
        shoot(&mut state, Vec2::new(4.0, 0.02));
        run_to_rest(&mut state, 20_000);
        state
    };
    let first = run();
    let second = run();
    assert_eq!(first.balls, second.balls);
    assert!(first.all_still());
    for ball in first.balls.iter().filter(|b| b.in_play()) {
        assert!(on_table(&first.table, ball.pos), "ball {} at {:?}", ball.id, ball.pos);
    }
}

#[test]
fn breaks_stay_on_bundled_table() {
    let shots = [
        Vec2::new(4.0, 0.02),
        Vec2::new(6.0, -0.05),
        Vec2::new(5.0, 0.1),
        Vec2::new(3.0, -0.2),
    ];
    for seed in 0..8 {
        for shot in shots {
            let settings = PhysicsSettings {
                seed,
                ..Default::default()
            };
            let (mut state, _) = setup(TableBoundary::parse(TABLE).unwrap(), settings, HEAD_SPOT);
            shoot(&mut state, shot);
            let mut ticks = 0;
            while state.phase == SimPhase::InMotion {
                tick(&mut state, &TickInput::default(), SIM_DT);
                for ball in state.balls.iter().filter(|b| b.in_play()) {
                    assert!(
                        on_table(&state.table, ball.pos),
                        "seed {} shot {:?}: ball {} left the table at {:?} (tick {})",
                        seed,
                        shot,
                        ball.id,
                        ball.pos,
                        ticks
                    );
                }
                ticks += 1;
                assert!(ticks < 20_000, "seed {} shot {:?} never settled", seed, shot);
            }
        }
    }
}

#[test]
fn straight_shots_sink_in_every_pocket() {
    // Mouth midpoints of the four corner and two side pockets
    let targets = [
        Vec2::new(1.0, -0.5),
        Vec2::new(1.0, 0.5),
        Vec2::new(0.0, 0.53),
        Vec2::new(-1.0, 0.5),
        Vec2::new(-1.0, -0.5),
        Vec2::new(0.0, -0.53),
    ];
    for target in targets {
        let mut state = SimulationState::with_balls(
            TableBoundary::parse(TABLE).unwrap(),
            PhysicsSettings::default(),
            vec![moving(Vec2::ZERO, target.normalize() * 2.0)],
        );
        run_to_rest(&mut state, 10_000);
        assert!(state.balls[0].sunk, "shot at {:?} stopped at {:?}", target, state.balls[0].pos);
        assert!(state.drain_events().contains(&SimEvent::BallSunk {
            id: 0,
            kind: BallKind::Cue
        }));
    }
}

#[test]
fn scratch_requires_placement_before_next_shot() {
    let table = TableBoundary::square(0.5, None).unwrap();
    let mut state = SimulationState::with_balls(
        table,
        PhysicsSettings::default(),
        vec![Ball::new(0, Vec2::new(-0.4, 0.0)), Ball::new(1, Vec2::new(-0.4, 0.3))],
    );
    state.time_ticks = 1;
    shoot(&mut state, Vec2::new(1.5, 0.0));
    run_to_rest(&mut state, 10_000);
    assert!(state.needs_cue_placement());
    state.drain_events();

    // Shot refused while the cue ball is off the table
    shoot(&mut state, Vec2::new(1.0, 0.0));
    assert_eq!(state.phase, SimPhase::AtRest);
    assert!(state.drain_events().is_empty());

    assert_eq!(place_cue_ball(&mut state, Vec2::new(0.2, 0.0)), CuePlacement::OutsideKitchen);
    assert_eq!(place_cue_ball(&mut state, Vec2::new(-0.4, 0.31)), CuePlacement::Blocked);
    assert_eq!(place_cue_ball(&mut state, Vec2::new(-0.4, -0.2)), CuePlacement::Placed);
    shoot(&mut state, Vec2::new(0.5, 0.0));
    assert_eq!(state.phase, SimPhase::InMotion);
}

#[test]
fn pause_time_is_not_simulated() {
    let (mut state, _) = setup(TableBoundary::square(2.0, None).unwrap(), PhysicsSettings::default(), HEAD_SPOT);
    state.clock.add_pause(0.5);
    let input = TickInput {
        shot: Some(Vec2::new(1.0, 0.0)),
        ..Default::default()
    };
    tick(&mut state, &input, 0.1);

    assert_eq!(state.phase, SimPhase::InMotion);
    assert_eq!(state.balls[CUE_BALL].pos, HEAD_SPOT);
    assert_eq!(state.clock.time, 0.0);
    assert!((state.clock.pause_time - 0.4).abs() < 1e-6);
}

#[test]
fn boundary_containment_after_one_tick() {
    let w = 1.0;
    let start = Vec2::new(w - 0.4 * BALL_RADIUS, 0.0);

    let rails = TableBoundary::square(w, Some([EdgeKind::Rail; 4])).unwrap();
    let mut state = SimulationState::with_balls(
        rails,
        PhysicsSettings::default(),
        vec![moving(start, Vec2::new(1.0, 0.0))],
    );
    tick(&mut state, &TickInput::default(), 0.1);
    assert!(state.balls[0].vel.x < 0.0);
    assert!(state.balls[0].pos.x < start.x);

    let pocketed = TableBoundary::square(w, None).unwrap();
    let mut state = SimulationState::with_balls(
        pocketed,
        PhysicsSettings::default(),
        vec![moving(start, Vec2::new(1.0, 0.0))],
    );
    tick(&mut state, &TickInput::default(), 0.1);
    assert!(state.balls[0].sunk);
    assert_eq!(state.phase, SimPhase::AtRest);
}
