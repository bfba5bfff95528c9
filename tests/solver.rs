use rand::{rngs::StdRng, SeedableRng};

use gencube::config::{EndgameStrategy, SolverConfig, StageConfig};
use gencube::eval::{is_2gen, is_2x2x3};
use gencube::facelet::FaceCube;
use gencube::moves::Move::*;
use gencube::scramble::{gen_scramble, scramble_from_str};
use gencube::solver::{Stage, StagedSolver};

fn quick_config(seed: u64) -> SolverConfig {
    SolverConfig {
        block: StageConfig::new(300, 0, 0),
        two_gen: StageConfig::new(2000, 2000, 0),
        endgame: StageConfig::new(2000, 0, 0),
        seed: Some(seed),
        max_total_generations: Some(2_000_000),
        ..Default::default()
    }
}

/// Replays a result: rotations first, then every stage.
fn replay(scramble: &[gencube::moves::Move], result: &gencube::solver::SolveResult) -> FaceCube {
    let cube = result.location.orient(&FaceCube::default().apply_moves(scramble));
    cube.apply_moves(&result.solution())
}

#[test]
fn test_solves_two_gen_scramble_genetically() {
    let scramble = scramble_from_str("F U").unwrap();
    let mut solver = StagedSolver::new(quick_config(1)).unwrap();
    let result = solver.solve(&scramble).unwrap();
    assert_eq!(result.location.index(), 0);
    assert_eq!(result.stages[2].stage, Stage::TwoGenSolve);
    assert!(replay(&scramble, &result).is_solved());
    assert_eq!(result.total_moves, result.solution().len());
}

#[test]
fn test_solves_two_layer_scramble() {
    let scramble = vec![L, R];
    let config = SolverConfig {
        endgame_strategy: EndgameStrategy::BruteForce,
        ..quick_config(7)
    };
    let mut solver = StagedSolver::new(config).unwrap();
    let result = solver.solve(&scramble).unwrap();

    let oriented = result.location.orient(&FaceCube::default().apply_moves(&scramble));
    let after_block = oriented.apply_moves(&result.stages[0].moves);
    assert_eq!(is_2x2x3(&after_block), 16);
    let after_two_gen = after_block.apply_moves(&result.stages[1].moves);
    assert_eq!(is_2gen(&after_two_gen), 1);
    assert!(replay(&scramble, &result).is_solved());
    assert!(FaceCube::try_from(result.final_cube.as_str()).unwrap().is_solved());
}

#[test]
fn test_seeded_runs_repeat() {
    let mut rng = StdRng::seed_from_u64(3);
    let scramble = gen_scramble(2, &mut rng);
    let config = SolverConfig {
        endgame_strategy: EndgameStrategy::BruteForce,
        ..quick_config(11)
    };
    let first = StagedSolver::new(config.clone()).unwrap().solve(&scramble).unwrap();
    let second = StagedSolver::new(config).unwrap().solve(&scramble).unwrap();
    assert_eq!(first.location, second.location);
    assert_eq!(first.stages, second.stages);
}

#[test]
fn test_checkpoint_is_written() {
    let path = std::env::temp_dir().join("gencube_test_checkpoint.bin");
    let _ = std::fs::remove_file(&path);
    let config = SolverConfig {
        endgame_strategy: EndgameStrategy::BruteForce,
        checkpoint: Some(path.clone()),
        ..quick_config(5)
    };
    let scramble = vec![L, R];
    let mut solver = StagedSolver::new(config.clone()).unwrap();
    assert!(solver.solve(&scramble).is_ok());
    assert!(path.exists());

    let mut resumed = StagedSolver::new(config).unwrap();
    let result = resumed.solve(&scramble).unwrap();
    assert!(replay(&scramble, &result).is_solved());
    std::fs::remove_file(path).unwrap();
}
