//! Felt entry point
//!
//! Headless console driver: loads the table, racks, asks for a cue ball
//! spot, then runs the fixed-timestep loop while shots are typed in.

#[cfg(not(target_arch = "wasm32"))]
mod console {
    use std::io::{BufRead, Write};
    use std::path::PathBuf;
    use std::sync::mpsc::{self, Receiver, TryRecvError};
    use std::thread;
    use std::time::{Duration, Instant};

    use felt_physics::PhysicsSettings;
    use felt_physics::consts::*;
    use felt_physics::input::{ShotSlot, parse_position, parse_shot};
    use felt_physics::renderer::ball_quads;
    use felt_physics::sim::{
        CuePlacement, SimEvent, SimPhase, SimulationState, TableBoundary, TickInput,
        place_cue_ball, setup, tick,
    };

    const DEFAULT_TABLE: &str = "assets/table.obj";
    const USAGE: &str = "\
usage: felt [--table FILE] [--settings FILE] [--seed N]
  --table FILE     boundary geometry (default assets/table.obj); the kitchen
                   follows its axis-aligned cushions, while the head spot and
                   rack stay at fixed coordinates
  --settings FILE  physics settings JSON
  --seed N         rack shuffle seed";

    struct Args {
        table: PathBuf,
        settings: Option<PathBuf>,
        seed: Option<u64>,
    }

    fn parse_args() -> Result<Args, String> {
        let mut args = Args {
            table: PathBuf::from(DEFAULT_TABLE),
            settings: None,
            seed: None,
        };
        let mut it = std::env::args().skip(1);
        while let Some(flag) = it.next() {
            let mut value = || it.next().ok_or_else(|| format!("{} needs a value", flag));
            match flag.as_str() {
                "--table" => args.table = PathBuf::from(value()?),
                "--settings" => args.settings = Some(PathBuf::from(value()?)),
                "--seed" => {
                    let raw = value()?;
                    args.seed = Some(raw.parse().map_err(|_| format!("bad seed '{}'", raw))?);
                }
                other => return Err(format!("unknown argument '{}'", other)),
            }
        }
        Ok(args)
    }

    fn prompt(text: &str) {
        print!("{}", text);
        let _ = std::io::stdout().flush();
    }

    /// Block until a legal kitchen spot is entered. Returns false on EOF.
    fn prompt_cue_placement(state: &mut SimulationState, lines: &Receiver<String>) -> bool {
        let started = Instant::now();
        let kitchen = state.kitchen;
        loop {
            prompt(&format!(
                "Cue ball spot x y (x {:.3}..{:.3}, y {:.3}..{:.3}): ",
                kitchen.min.x, kitchen.max.x, kitchen.min.y, kitchen.max.y
            ));
            let Ok(line) = lines.recv() else {
                return false;
            };
            let Some(pos) = parse_position(&line) else {
                println!("Expected two numbers");
                continue;
            };
            match place_cue_ball(state, pos) {
                CuePlacement::Placed => break,
                CuePlacement::OutsideKitchen => println!("That spot is outside the kitchen"),
                CuePlacement::Blocked => println!("Another ball is in the way"),
                CuePlacement::NotAllowed => {
                    log::warn!("Cue placement refused while balls are moving");
                    break;
                }
            }
        }
        state.clock.add_pause(started.elapsed().as_secs_f32());
        true
    }

    fn spawn_reader() -> Receiver<String> {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        rx
    }

    fn report_rest(state: &SimulationState) {
        println!("-- at rest (t = {:.2}s) --", state.clock.time);
        for quad in ball_quads(&state.balls, state.settings.ball_radius) {
            println!("  ball {:2}: ({:+.3}, {:+.3})", quad.id, quad.center.x, quad.center.y);
        }
        let pocketed = state.pocketed();
        if !pocketed.is_empty() {
            let ids: Vec<String> = pocketed.iter().map(|(id, _)| id.to_string()).collect();
            println!("  pocketed: {}", ids.join(" "));
        }
    }

    pub fn run() {
        env_logger::init();
        log::info!("Felt starting...");

        let args = match parse_args() {
            Ok(args) => args,
            Err(e) => {
                eprintln!("{}\n{}", e, USAGE);
                std::process::exit(2);
            }
        };

        let mut settings = match &args.settings {
            Some(path) => match PhysicsSettings::load_or_default(path) {
                Ok(s) => s,
                Err(e) => {
                    log::error!("{}: {}", path.display(), e);
                    std::process::exit(1);
                }
            },
            None => PhysicsSettings::default(),
        };
        if let Some(seed) = args.seed {
            settings.seed = seed;
        }

        let table = match TableBoundary::load(&args.table) {
            Ok(table) => table,
            Err(e) => {
                log::error!("{}: {}", args.table.display(), e);
                std::process::exit(1);
            }
        };

        let (mut state, _rack) = setup(table, settings, HEAD_SPOT);
        let lines = spawn_reader();
        let mut last = Instant::now();
        if !prompt_cue_placement(&mut state, &lines) {
            return;
        }

        let shots = ShotSlot::new();
        let mut accumulator = 0.0f32;
        let mut input_open = true;
        println!("Shoot with: vx vy   (q to quit)");

        loop {
            while input_open {
                match lines.try_recv() {
                    Ok(line) if matches!(line.trim(), "q" | "quit") => return,
                    Ok(line) => match parse_shot(&line) {
                        Some(v) => shots.offer(v),
                        None => println!("Expected a nonzero velocity: vx vy"),
                    },
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => input_open = false,
                }
            }

            let now = Instant::now();
            let raw_dt = state.clock.consume_pause((now - last).as_secs_f32());
            let frame_dt = raw_dt.min(state.settings.max_frame_dt);
            last = now;
            accumulator += frame_dt;

            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = TickInput {
                    shot: if state.phase == SimPhase::AtRest { shots.take() } else { None },
                    place_cue: None,
                };
                tick(&mut state, &input, SIM_DT);
                accumulator -= SIM_DT;
                substeps += 1;

                for event in state.drain_events() {
                    match event {
                        SimEvent::BallSunk { id, kind } => println!("  ball {} ({:?}) pocketed", id, kind),
                        SimEvent::CameToRest => report_rest(&state),
                        SimEvent::ShotTaken { .. } | SimEvent::CuePlaced { .. } => {}
                    }
                }
            }

            if state.needs_cue_placement() {
                println!("Scratch: ball in hand");
                if !prompt_cue_placement(&mut state, &lines) {
                    return;
                }
            }

            if !input_open && state.phase == SimPhase::AtRest && shots.is_empty() {
                log::info!("Input closed, exiting");
                return;
            }

            thread::sleep(Duration::from_secs_f32(SIM_DT));
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    console::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The console driver is native only
}
