use log::debug;

use crate::constants::TWO_GEN_MOVES;
use crate::error::Error;
use crate::facelet::FaceCube;
use crate::genetic::Budget;
use crate::moves::Move;

/// Depth used when none is configured.
pub const DEFAULT_MAX_DEPTH: usize = 20;

/// Iterative deepening search over <F, U> for a sequence solving `cube`.
///
/// The cube must already be in the 2-gen group with its 2x2x3 block solved, otherwise no
/// sequence exists and the search ends in [Error::SearchExhausted] after `max_depth`.
/// Consecutive moves never turn the same face, so the first hit is a shortest solution.
/// The search spends no generations but stops with [Error::BudgetExhausted] once the time
/// limit of `budget` has passed.
pub fn solve_two_gen(
    cube: &FaceCube,
    max_depth: usize,
    budget: &Budget,
) -> Result<Vec<Move>, Error> {
    let mut path = Vec::with_capacity(max_depth);
    for depth in 0..=max_depth {
        debug!("2-gen search depth {}", depth);
        if search(cube, depth, &mut path, budget)? {
            return Ok(path);
        }
    }
    Err(Error::SearchExhausted { max_depth })
}

fn search(
    cube: &FaceCube,
    togo: usize,
    path: &mut Vec<Move>,
    budget: &Budget,
) -> Result<bool, Error> {
    if togo == 0 {
        return Ok(cube.is_solved());
    }
    budget.check_deadline()?;
    for m in TWO_GEN_MOVES {
        if path.last().is_some_and(|last| last.is_same_layer(m)) {
            continue;
        }
        path.push(m);
        if search(&cube.apply_move(m), togo - 1, path, budget)? {
            return Ok(true);
        }
        path.pop();
    }
    Ok(false)
}
