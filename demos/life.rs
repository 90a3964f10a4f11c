//! Game of Life stepped by barrier-synchronized worker strips.
//!
//! The board is split into horizontal bands, one worker per band. Each
//! generation is two barrier phases: every worker computes its band from
//! the front buffer and stores it into the back buffer, then waits; the
//! phase leader swaps the buffers; a second wait holds everyone back until
//! the swap is done. No worker can read a half-published generation.

use std::sync::{Arc, RwLock};
use std::thread;

use anyhow::Result;
use lockstep::{Grid, ReusableBarrier};
use rand::Rng;

const WIDTH: usize = 48;
const HEIGHT: usize = 24;
const WORKERS: usize = 3;
const GENERATIONS: usize = 60;
const SEED_DENSITY: f64 = 0.3;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    assert_eq!(HEIGHT % WORKERS, 0, "workers must divide the board evenly");

    let mut board = Grid::new(WIDTH, HEIGHT)?;
    let mut rng = rand::thread_rng();
    for y in 1..HEIGHT - 1 {
        for x in 1..WIDTH - 1 {
            if rng.gen_bool(SEED_DENSITY) {
                board.set(x, y, true);
            }
        }
    }
    tracing::info!(population = board.population(), "seeded");

    let grid = Arc::new(RwLock::new(board));
    let barrier = Arc::new(ReusableBarrier::new(WORKERS)?);
    let rows_per_worker = HEIGHT / WORKERS;

    thread::scope(|s| {
        for worker in 0..WORKERS {
            let grid = Arc::clone(&grid);
            let barrier = Arc::clone(&barrier);
            let band = worker * rows_per_worker..(worker + 1) * rows_per_worker;
            s.spawn(move || {
                for _ in 0..GENERATIONS {
                    let next = grid.read().unwrap().next_rows(band.clone());
                    grid.write().unwrap().store_rows(band.start, &next);
                    if barrier.wait().is_leader() {
                        grid.write().unwrap().swap_buffers();
                    }
                    barrier.wait();
                }
            });
        }
    });

    assert_eq!(barrier.phases(), (GENERATIONS * 2) as u64);

    let board = grid.read().unwrap();
    for y in 0..HEIGHT {
        let row: String = (0..WIDTH)
            .map(|x| if board.get(x, y) { '#' } else { '.' })
            .collect();
        println!("{row}");
    }
    tracing::info!(
        generations = GENERATIONS,
        population = board.population(),
        "simulation complete"
    );
    Ok(())
}
