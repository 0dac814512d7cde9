//! Any-angle search on a random block map.
//!
//! Run: cargo run --bin anyangle-demo [seed]

use anyangle_core::{Occupancy, Point};
use anyangle_gen::MapGen;
use anyangle_paths::{LineOfSightScanner, PathOutcome, SearchContext, SparseVisibilityIndex};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

const SIZE_X: i32 = 35;
const SIZE_Y: i32 = 35;
const FREQUENCY: u32 = 9;
const START: Point = Point::new(1, 1);
const GOAL: Point = Point::new(33, 32);
const MAX_DOUBLINGS: u32 = 16;

fn main() {
    let seed = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<u64>() {
            Ok(seed) => seed,
            Err(e) => {
                eprintln!("Error: invalid seed {arg:?}: {e}");
                std::process::exit(1);
            }
        },
        None => rand::rng().random(),
    };

    let mut mapgen = MapGen::new(SIZE_X, SIZE_Y, StdRng::seed_from_u64(seed));
    mapgen.random_block_map(FREQUENCY);
    mapgen.fill_corners();
    mapgen.clear(START);
    mapgen.clear(GOAL);
    let grid = mapgen.into_grid();

    println!("seed {seed}, {} of {} tiles blocked", grid.blocked_count(), SIZE_X * SIZE_Y);
    println!("{grid}");

    let mut scanner = LineOfSightScanner::new(&grid);
    let successors = scanner.taut_successors(&grid, START);
    println!("taut successors of {START}: {}", successors.len());
    for p in successors {
        println!("  {p}");
    }

    let mut index = SparseVisibilityIndex::from_corners(&grid);
    index.connect(&grid, &mut scanner);
    let mut ctx = SearchContext::default();
    let mut bound = grid.octile_distance(START, GOAL);
    for _ in 0..MAX_DOUBLINGS {
        match ctx.bounded_jps_path(&grid, START, GOAL, bound, &mut index) {
            Ok(PathOutcome::Found(path)) => {
                let stats = ctx.stats();
                println!("bound {bound:.3}: {path}");
                println!(
                    "path length {:.3}, {} expanded, {} heuristic updates",
                    path.length(),
                    stats.expanded,
                    stats.heuristic_updates
                );
                return;
            }
            Ok(PathOutcome::NoPathWithinBound) => {
                println!("bound {bound:.3}: no path ({} expanded)", ctx.stats().expanded);
                bound *= 2.0;
            }
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }
    println!("no path from {START} to {GOAL}");
}
