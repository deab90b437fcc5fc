//! Headless patrol demo -- guards walk their corridors, reverse at walls,
//! and report when they spot the goal marker.
//!
//! Run with:
//!   cargo run --example patrol -p gridcast-engine
//!
//! The demo loads a small level from its byte matrix, runs 300 ticks, and
//! logs each guard's position plus the per-tick state hash. Running it
//! twice prints identical hashes on every tick.

use anyhow::Result;
use tracing::info;

use gridcast_engine::prelude::*;

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

const TILE: f32 = 16.0;

/// 12x8 cells: a border wall, two corridors, a start marker and a goal.
#[rustfmt::skip]
const LEVEL: [u8; 96] = [
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
    1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
    1, 1, 1, 1, 0, 1, 1, 1, 1, 1, 0, 1,
    1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
    1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1,
    1, 0, 0, 0, 0, 0, 0, 0, 0, 3, 0, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
];

// ---------------------------------------------------------------------------
// Guard behavior
// ---------------------------------------------------------------------------

/// Walks its corridor at a fixed speed, reversing when blocked, and logs
/// when it has line of sight to the goal cell.
struct Guard {
    facing: Direction,
    speed: u32,
    goal: (f32, f32),
}

impl Behavior for Guard {
    fn step(&mut self, id: EntityId, body: &mut Body, ctx: &mut TickCtx<'_>) {
        if !ctx.try_step(body, self.facing, self.speed) {
            self.facing = match self.facing {
                Direction::Left => Direction::Right,
                Direction::Right => Direction::Left,
                Direction::Up => Direction::Down,
                Direction::Down => Direction::Up,
            };
        }
        if ctx.can_see(body.position(), self.goal) {
            info!(guard = %id, x = body.shape.x, y = body.shape.y, "goal in sight");
        }
    }

    fn on_tile(&mut self, id: EntityId, _body: &mut Body, code: TileCode, _ctx: &mut TickCtx<'_>) {
        if code == TileCode::Goal {
            info!(guard = %id, "standing on the goal");
        }
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let grid = TileGrid::from_bytes(12, 8, TILE, &LEVEL)?;
    let goal_cell = (9, 6);
    let goal = (
        goal_cell.0 as f32 * TILE + TILE * 0.5,
        goal_cell.1 as f32 * TILE + TILE * 0.5,
    );
    let start = grid
        .find_start()
        .map(|(x, y)| (x as f32 * TILE + TILE * 0.5, y as f32 * TILE + TILE * 0.5));
    info!(?start, ?goal, "level loaded");

    let mut scene = Scene::new(grid, 2024);
    let top = scene.spawn_with(
        Body::new(Shape::rect(40.0, 24.0, 10.0, 10.0)),
        Guard {
            facing: Direction::Right,
            speed: 2,
            goal,
        },
    );
    let bottom = scene.spawn_with(
        Body::new(Shape::rect(140.0, 88.0, 10.0, 10.0)).with_depth(1),
        Guard {
            facing: Direction::Left,
            speed: 3,
            goal,
        },
    );

    scene.run_ticks(300);

    for id in [top, bottom] {
        if let Some(body) = scene.body(id) {
            info!(guard = %id, x = body.shape.x, y = body.shape.y, "final position");
        }
    }
    info!(tick = scene.tick_count(), hash = %scene.state_hash(), "run complete");
    Ok(())
}
