use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use log::{info, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::bruteforce::solve_two_gen;
use crate::config::{EndgameStrategy, SolverConfig, StageConfig};
use crate::constants::{BLOCK_MAX, ENTROPY_MAX, N_LOCATIONS, TWO_GEN_PEAK};
use crate::error::Error;
use crate::eval::{is_2gen, is_2x2x3, Evaluator, Fitness};
use crate::facelet::FaceCube;
use crate::genetic::{Budget, GeneticEngine, Genome, Objective, Population};
use crate::moves::{Move, MoveSet};
use crate::scramble::scramble_to_str;
use crate::{decode_table, write_table};

/// Whole cube rotations used to reorient the scrambled cube.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Rotation {
    /// Clockwise around the vertical axis.
    Y,
    /// Around the FUR corner.
    XY,
    /// Around the LR axis.
    X,
}

impl Rotation {
    pub fn apply(self, cube: &FaceCube) -> FaceCube {
        match self {
            Rotation::Y => cube.rotate_y(),
            Rotation::XY => cube.twist(),
            Rotation::X => cube.rotate_x(),
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Rotation::Y => "y",
            Rotation::XY => "xy",
            Rotation::X => "x",
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

/// One of the 12 orientations in which a 2x2x3 block is searched: `index / 3` y rotations,
/// followed by nothing, a twist or two x rotations depending on `index % 3`.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct Location(u8);

impl Location {
    pub fn new(index: usize) -> Option<Self> {
        (index < N_LOCATIONS).then_some(Self(index as u8))
    }

    pub fn all() -> impl Iterator<Item = Location> {
        (0..N_LOCATIONS as u8).map(Location)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn rotations(self) -> Vec<Rotation> {
        let mut rotations = vec![Rotation::Y; self.index() / 3];
        match self.index() % 3 {
            1 => rotations.push(Rotation::XY),
            2 => rotations.extend([Rotation::X, Rotation::X]),
            _ => {}
        }
        rotations
    }

    pub fn orient(self, cube: &FaceCube) -> FaceCube {
        self.rotations()
            .into_iter()
            .fold(*cube, |cc, rotation| rotation.apply(&cc))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Stage {
    Block,
    IntoTwoGen,
    TwoGenSolve,
}

impl Stage {
    /// Tag used in the result log.
    pub fn tag(self) -> &'static str {
        match self {
            Stage::Block => "2x2x3",
            Stage::IntoTwoGen => "Get into 2-GEN",
            Stage::TwoGenSolve => "2-GEN solve",
        }
    }
}

/// The subsequence applied by one stage.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: Stage,
    pub moves: Vec<Move>,
}

impl StageOutcome {
    pub fn notation(&self) -> String {
        scramble_to_str(&self.moves)
    }
}

/// Solution result.
///
/// Cubes are facelet strings. The stage moves apply to the scrambled cube after the rotations of
/// `location`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveResult {
    pub scrambled: String,
    pub location: Location,
    pub rotations: Vec<Rotation>,
    pub stages: Vec<StageOutcome>,
    pub total_moves: usize,
    pub final_cube: String,
    pub solve_time: Duration,
}

impl SolveResult {
    /// All stage moves in order.
    pub fn solution(&self) -> Vec<Move> {
        self.stages
            .iter()
            .flat_map(|s| s.moves.iter().copied())
            .collect()
    }
}

/// Best 2x2x3 found at one location.
#[derive(Debug, Clone)]
struct Candidate {
    location: Location,
    elite: Genome,
    fitness: Fitness,
    rank_score: i32,
}

impl Candidate {
    fn new(location: Location, population: &Population) -> Self {
        let (elite, fitness) = population.elite();
        Self {
            location,
            elite: elite.to_vec(),
            fitness,
            rank_score: location_score(fitness),
        }
    }

    fn solution(&self) -> &[Move] {
        &self.elite[..self.fitness.cut]
    }
}

/// Ranking score of a location: full blocks first, then fewer moves.
pub fn location_score(fitness: Fitness) -> i32 {
    -(fitness.cut as i32) - 100 * (BLOCK_MAX - fitness.peak())
}

/// Populations of the 2x2x3 search, one per location, with the cube they were bred on.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LocationStore {
    scrambled: String,
    populations: Vec<Population>,
}

/** Three stage solver.

1. For each of the 12 locations, search a 2x2x3 block with the genetic algorithm. Locations are
   ranked by [location_score]; while the best one stays below the threshold the sweep is repeated,
   each location continuing from its last population.
2. Get into the 2-gen group while keeping the block, retrying with growing budgets.
3. Solve inside the 2-gen group, genetically or with [solve_two_gen].
*/
pub struct StagedSolver<R: Rng> {
    config: SolverConfig,
    engine: GeneticEngine,
    rng: R,
    budget: Budget,
    solved: FaceCube,
}

impl StagedSolver<StdRng> {
    /// Seeded from `config.seed`, or from entropy.
    pub fn new(config: SolverConfig) -> Result<Self, Error> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<R: Rng> StagedSolver<R> {
    pub fn with_rng(config: SolverConfig, rng: R) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            engine: GeneticEngine::new(config.genetic, config.parallel),
            budget: Budget::unlimited(),
            solved: FaceCube::default(),
            config,
            rng,
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// The solver's random source, for drawing scrambles from the same seeded stream.
    pub fn rng(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Generations spent by the last solve.
    pub fn generations(&self) -> u64 {
        self.budget.spent()
    }

    pub fn solve(&mut self, scramble: &[Move]) -> Result<SolveResult, Error> {
        let scrambled = self.solved.apply_moves(scramble);
        self.solve_cube(&scrambled)
    }

    pub fn solve_cube(&mut self, scrambled: &FaceCube) -> Result<SolveResult, Error> {
        let start_time = Instant::now();
        self.budget = Budget::new(self.config.max_total_generations, self.config.time_limit);

        let (location, block) = self.locate_block(scrambled)?;
        info!("Location searched : {}", location);
        let mut cube = location.orient(scrambled);
        cube.multiply_moves(&block);
        info!("2x2x3 : {}", scramble_to_str(&block));

        let into_two_gen = self.into_two_gen(&cube)?;
        cube.multiply_moves(&into_two_gen);
        info!("Get into 2-GEN : {}", scramble_to_str(&into_two_gen));

        let endgame = self.endgame(&cube)?;
        cube.multiply_moves(&endgame);
        info!("2-GEN solve : {}", scramble_to_str(&endgame));

        let stages = vec![
            StageOutcome {
                stage: Stage::Block,
                moves: block,
            },
            StageOutcome {
                stage: Stage::IntoTwoGen,
                moves: into_two_gen,
            },
            StageOutcome {
                stage: Stage::TwoGenSolve,
                moves: endgame,
            },
        ];
        let total_moves = stages.iter().map(|s| s.moves.len()).sum();
        info!("Whole cube was solved in {} moves", total_moves);
        Ok(SolveResult {
            scrambled: scrambled.to_string(),
            location,
            rotations: location.rotations(),
            stages,
            total_moves,
            final_cube: cube.to_string(),
            solve_time: start_time.elapsed(),
        })
    }

    /// Stage 1. Returns the winning location and its block solution.
    fn locate_block(&mut self, scrambled: &FaceCube) -> Result<(Location, Vec<Move>), Error> {
        for location in Location::all() {
            if is_2x2x3(&location.orient(scrambled)) == BLOCK_MAX {
                info!("2x2x3 is already solved at location {}", location);
                return Ok((location, Vec::new()));
            }
        }

        let mut store = self.load_checkpoint(scrambled);
        loop {
            let continuing = store.is_some();
            let mut previous: Vec<Option<Population>> = store
                .take()
                .map(|s| s.populations.into_iter().map(Some).collect())
                .unwrap_or_default();
            let mut populations = Vec::with_capacity(N_LOCATIONS);
            let mut candidates = Vec::with_capacity(N_LOCATIONS);
            for location in Location::all() {
                let last = previous.get_mut(location.index()).and_then(Option::take);
                let population = self.search_location(scrambled, location, last)?;
                candidates.push(Candidate::new(location, &population));
                populations.push(population);
            }
            let sweep = LocationStore {
                scrambled: scrambled.to_string(),
                populations,
            };
            self.save_checkpoint(&sweep);
            store = Some(sweep);

            candidates.sort_by(|a, b| b.rank_score.cmp(&a.rank_score));
            let order: Vec<String> = candidates.iter().map(|c| c.location.to_string()).collect();
            info!("Best 2x2x3 locations : {}", order.join(", "));
            let best = &candidates[0];
            if best.rank_score >= self.config.block_threshold {
                return Ok((best.location, best.solution().to_vec()));
            }
            info!(
                "Adding generations to solve the 2x2x3: no good solution was found{}",
                if continuing { " again" } else { "" }
            );
        }
    }

    /// Runs the block search at one location, continuing `previous` when given.
    fn search_location(
        &mut self,
        scrambled: &FaceCube,
        location: Location,
        previous: Option<Population>,
    ) -> Result<Population, Error> {
        info!("------------2x2x3 position is : {}       ----------", location);
        let cube = location.orient(scrambled);
        for rotation in location.rotations() {
            info!("whole cube rotation {}", rotation);
        }
        let alphabet = if is_2gen(&cube) == 1 {
            info!("2-gen solve");
            MoveSet::TwoGen
        } else {
            MoveSet::Full
        };
        let mut population = match previous {
            Some(p) if !p.is_empty() => Population::from_genomes(p.genomes, alphabet),
            _ => Population::random(self.engine.params(), alphabet, &mut self.rng),
        };
        let objective = Objective {
            start: &cube,
            solved: &self.solved,
            evaluator: Evaluator::Block,
        };
        let stage = self.config.block;
        let elite = self.engine.run(
            &mut population,
            &objective,
            stage.generations,
            stage.log_interval,
            &mut self.budget,
            &mut self.rng,
        )?;
        info!(
            "optimal : {}",
            scramble_to_str(population.elite_solution())
        );
        info!("perfo, # moves, block : {} {} {}", elite.score, elite.cut, elite.peak());
        if elite.peak() == BLOCK_MAX {
            info!("This 2x2x3 was solved :)");
        }
        Ok(population)
    }

    /// Stage 2.
    fn into_two_gen(&mut self, cube: &FaceCube) -> Result<Vec<Move>, Error> {
        let in_group = is_2gen(cube) == 1;
        if in_group && is_2x2x3(cube) == BLOCK_MAX {
            info!("Cube was already in the 2-gen group.");
            return Ok(Vec::new());
        }
        let alphabet = if in_group { MoveSet::TwoGen } else { MoveSet::Full };
        let stage = self.config.two_gen;
        let solution = self.evolve(cube, Evaluator::TwoGenBlock, alphabet, stage, TWO_GEN_PEAK)?;
        info!("Getting into 2-gen phase is done :)");
        Ok(solution)
    }

    /// Stage 3.
    fn endgame(&mut self, cube: &FaceCube) -> Result<Vec<Move>, Error> {
        if cube.is_solved() {
            return Ok(Vec::new());
        }
        if self.config.endgame_strategy == EndgameStrategy::BruteForce {
            match solve_two_gen(cube, self.config.brute_force_max_depth, &self.budget) {
                Ok(solution) => return Ok(solution),
                Err(e @ Error::SearchExhausted { .. }) => {
                    warn!("{}, falling back to the genetic endgame", e)
                }
                Err(e) => return Err(e),
            }
        }
        let stage = self.config.endgame;
        self.evolve(cube, Evaluator::Entropy, MoveSet::TwoGen, stage, ENTROPY_MAX)
    }

    /// Evolves one population until its elite peaks at `target`, the attempt budgets growing
    /// as configured by `stage`.
    fn evolve(
        &mut self,
        cube: &FaceCube,
        evaluator: Evaluator,
        alphabet: MoveSet,
        stage: StageConfig,
        target: i32,
    ) -> Result<Vec<Move>, Error> {
        let mut population = Population::random(self.engine.params(), alphabet, &mut self.rng);
        let objective = Objective {
            start: cube,
            solved: &self.solved,
            evaluator,
        };
        let mut attempt = 0;
        loop {
            let elite = self.engine.run(
                &mut population,
                &objective,
                stage.budget(attempt),
                stage.log_interval,
                &mut self.budget,
                &mut self.rng,
            )?;
            if elite.peak() == target {
                info!("fobj / # moves / peak : {} {} {}", elite.score, elite.cut, elite.peak());
                return Ok(population.elite_solution().to_vec());
            }
            attempt += 1;
            info!(
                "Adding {} generations to solve this stage",
                stage.budget(attempt)
            );
        }
    }

    fn load_checkpoint(&self, scrambled: &FaceCube) -> Option<LocationStore> {
        let path = self.config.checkpoint.as_deref()?;
        if !path.exists() {
            return None;
        }
        match read_store(path) {
            Ok(store) if store.scrambled == scrambled.to_string() => {
                info!("Continuing the 2x2x3 search from {}", path.display());
                Some(store)
            }
            Ok(_) => {
                warn!("{} belongs to another scramble, ignored", path.display());
                None
            }
            Err(e) => {
                warn!("cannot read checkpoint {}: {}", path.display(), e);
                None
            }
        }
    }

    fn save_checkpoint(&self, store: &LocationStore) {
        if let Some(path) = self.config.checkpoint.as_deref() {
            if let Err(e) = write_table(path, store) {
                warn!("cannot write checkpoint {}: {}", path.display(), e);
            }
        }
    }
}

fn read_store(path: &Path) -> Result<LocationStore, Error> {
    let bytes = std::fs::read(path)?;
    decode_table(&bytes)
}

#[cfg(test)]
mod test {
    use crate::config::StageConfig;
    use crate::moves::Move::*;
    use crate::solver::*;

    fn quick_config() -> SolverConfig {
        SolverConfig {
            block: StageConfig::new(100, 0, 0),
            two_gen: StageConfig::new(200, 200, 0),
            endgame: StageConfig::new(500, 0, 0),
            seed: Some(2026),
            max_total_generations: Some(200_000),
            ..Default::default()
        }
    }

    #[test]
    fn test_location_rotations() {
        let tags = |i: usize| -> Vec<&str> {
            Location::new(i).unwrap().rotations().into_iter().map(Rotation::tag).collect()
        };
        assert!(tags(0).is_empty());
        assert_eq!(tags(1), vec!["xy"]);
        assert_eq!(tags(2), vec!["x", "x"]);
        assert_eq!(tags(7), vec!["y", "y", "xy"]);
        assert_eq!(tags(11), vec!["y", "y", "y", "x", "x"]);
        assert!(Location::new(12).is_none());
        assert_eq!(Location::all().count(), 12);
    }

    #[test]
    fn test_location_orient() {
        let cube = FaceCube::default().apply_moves(&[R, U]);
        let location = Location::new(4).unwrap();
        let expected = cube.rotate_y().twist();
        assert_eq!(location.orient(&cube), expected);
        let location = Location::new(2).unwrap();
        assert_eq!(location.orient(&cube), cube.rotate_x().rotate_x());
    }

    #[test]
    fn test_location_score() {
        assert_eq!(location_score(Fitness { score: 0, cut: 0 }), -1600);
        let full = Fitness { score: 160 - 7, cut: 7 };
        assert_eq!(location_score(full), -7);
        let partial = Fitness { score: 130 - 2, cut: 2 };
        assert_eq!(location_score(partial), -302);
    }

    #[test]
    fn test_stage_tags() {
        assert_eq!(Stage::Block.tag(), "2x2x3");
        assert_eq!(Stage::IntoTwoGen.tag(), "Get into 2-GEN");
        assert_eq!(Stage::TwoGenSolve.tag(), "2-GEN solve");
    }

    #[test]
    fn test_solved_cube() {
        let mut solver = StagedSolver::new(quick_config()).unwrap();
        let result = solver.solve(&[]).unwrap();
        assert_eq!(result.total_moves, 0);
        assert_eq!(result.location.index(), 0);
        assert!(result.solution().is_empty());
        assert_eq!(solver.generations(), 0);
    }

    #[test]
    fn test_two_gen_scramble_brute_force() {
        let config = SolverConfig {
            endgame_strategy: EndgameStrategy::BruteForce,
            ..quick_config()
        };
        let mut solver = StagedSolver::new(config).unwrap();
        let result = solver.solve(&[F, U]).unwrap();
        assert_eq!(result.location.index(), 0);
        assert_eq!(result.stages[0].moves, vec![]);
        assert_eq!(result.stages[1].moves, vec![]);
        assert_eq!(result.stages[2].moves, vec![U3, F3]);
        assert_eq!(result.total_moves, 2);
        assert!(FaceCube::try_from(result.final_cube.as_str()).unwrap().is_solved());
    }

    #[test]
    fn test_budget_exhausted() {
        let config = SolverConfig {
            max_total_generations: Some(3),
            ..quick_config()
        };
        let mut solver = StagedSolver::new(config).unwrap();
        assert!(matches!(
            solver.solve(&[L, R, F, D3, B2]),
            Err(Error::BudgetExhausted { generations: 3 })
        ));
    }

    #[test]
    fn test_block_sweep_repeats_below_threshold() {
        // A derived score of 0 needs an intact block, which returns before any sweep.
        let config = SolverConfig {
            block: StageConfig::new(5, 0, 0),
            block_threshold: 0,
            max_total_generations: Some(150),
            ..quick_config()
        };
        let mut solver = StagedSolver::new(config).unwrap();
        let cube = FaceCube::default().apply_moves(&[L, R, F, D3, B2, U, R2]);
        assert!(matches!(
            solver.locate_block(&cube),
            Err(Error::BudgetExhausted { generations: 150 })
        ));
        assert!(solver.generations() > 12 * 5);
    }

    #[test]
    fn test_location_search_continues() {
        let config = SolverConfig {
            block: StageConfig::new(20, 0, 0),
            ..quick_config()
        };
        let mut solver = StagedSolver::new(config).unwrap();
        let cube = FaceCube::default().apply_moves(&[L, R, F, D3, B2]);
        let location = Location::new(0).unwrap();
        let first = solver.search_location(&cube, location, None).unwrap();
        let first_fitness = first.elite().1;
        let second = solver
            .search_location(&cube, location, Some(first))
            .unwrap();
        assert!(location_score(second.elite().1) >= location_score(first_fitness));
        assert_eq!(solver.generations(), 40);
    }

    #[test]
    fn test_brute_force_falls_back_to_genetic() {
        let config = SolverConfig {
            endgame_strategy: EndgameStrategy::BruteForce,
            brute_force_max_depth: 1,
            ..quick_config()
        };
        let mut solver = StagedSolver::new(config).unwrap();
        let result = solver.solve(&[F, U, F2, U3]).unwrap();
        assert!(result.stages[0].moves.is_empty());
        assert!(result.stages[1].moves.is_empty());
        assert!(result.stages[2].moves.len() > 1);
        assert!(FaceCube::try_from(result.final_cube.as_str()).unwrap().is_solved());
        assert!(solver.generations() > 0);
    }

    #[test]
    fn test_into_two_gen_retries_with_growing_budget() {
        let config = SolverConfig {
            two_gen: StageConfig::new(1, 1, 0),
            ..quick_config()
        };
        let mut solver = StagedSolver::new(config).unwrap();
        let cube = FaceCube::default().apply_moves(&[R, D, B]);
        assert_eq!(is_2gen(&cube), 0);
        let solution = solver.into_two_gen(&cube).unwrap();
        let end = cube.apply_moves(&solution);
        assert_eq!(is_2gen(&end), 1);
        assert_eq!(is_2x2x3(&end), BLOCK_MAX);
        // The first attempt runs a single generation.
        assert!(solver.generations() > 1);
    }

    #[test]
    fn test_seeded_rng_draws_same_scramble() {
        use crate::scramble::ScrambleSource;
        let draw = || {
            let mut solver = StagedSolver::new(quick_config()).unwrap();
            ScrambleSource::Random(25).resolve(solver.rng())
        };
        let scramble = draw();
        assert_eq!(scramble.len(), 25);
        assert_eq!(scramble, draw());
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = quick_config();
        config.genetic.population_size = 1;
        assert!(StagedSolver::new(config).is_err());
    }
}
