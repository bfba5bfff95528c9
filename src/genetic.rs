//! Genetic algorithm over fixed-length move sequences.
//!
//! A generation runs, in this order: trim every genome, evaluate, rank (index 0 becomes the
//! elite), replace the worst genomes by intruders, breed by rank-based selection and single point
//! crossover, then mutate every genome but the elite.

use std::time::{Duration, Instant};

use log::info;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::eval::{sequence_objective, Evaluator, Fitness};
use crate::facelet::FaceCube;
use crate::moves::{Move, MoveSet};
use crate::trim::trim_sequence;

/// Parameters of the genetic algorithm.
///
/// * `population_size`: number of genomes.
/// * `intruders`: number of worst genomes replaced by random ones every generation.
/// * `code_length`: number of moves per genome.
/// * `mutation_rate`: per gene mutation probability.
/// * `crossover_rate`: probability that a pair of parents is crossed instead of copied.
/// * `selection_pressure`: phi in [1, 2], 1 selects uniformly, 2 never selects the worst genome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneticParams {
    pub population_size: usize,
    pub intruders: usize,
    pub code_length: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub selection_pressure: f64,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            population_size: 51,
            intruders: 5,
            code_length: 30,
            mutation_rate: 0.05,
            crossover_rate: 0.8,
            selection_pressure: 1.5,
        }
    }
}

impl GeneticParams {
    pub fn validate(&self) -> Result<(), Error> {
        if self.population_size < 2 {
            return Err(Error::InvalidConfig(
                "population size must be at least 2".to_string(),
            ));
        }
        if self.code_length < 2 {
            return Err(Error::InvalidConfig(
                "code length must be at least 2".to_string(),
            ));
        }
        if self.intruders >= self.population_size {
            return Err(Error::InvalidConfig(
                "intruders must leave the elite in place".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(Error::InvalidConfig(
                "mutation rate must be between 0 and 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(Error::InvalidConfig(
                "crossover rate must be between 0 and 1".to_string(),
            ));
        }
        if !(1.0..=2.0).contains(&self.selection_pressure) {
            return Err(Error::InvalidConfig(
                "selection pressure must be between 1 and 2".to_string(),
            ));
        }
        Ok(())
    }
}

pub type Genome = Vec<Move>;

/// What a population is optimised for: the sequence objective of `evaluator` starting at `start`.
#[derive(Debug, Clone, Copy)]
pub struct Objective<'a> {
    pub start: &'a FaceCube,
    pub solved: &'a FaceCube,
    pub evaluator: Evaluator,
}

impl Objective<'_> {
    pub fn fitness(&self, genome: &[Move]) -> Fitness {
        sequence_objective(self.start, self.solved, genome, self.evaluator)
    }
}

/// Genomes with their fitness table, row for row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    pub genomes: Vec<Genome>,
    pub fitness: Vec<Fitness>,
    pub alphabet: MoveSet,
}

impl Population {
    pub fn random<R: Rng + ?Sized>(params: &GeneticParams, alphabet: MoveSet, rng: &mut R) -> Self {
        let genomes = (0..params.population_size)
            .map(|_| random_genome(params.code_length, alphabet, rng))
            .collect();
        Self::from_genomes(genomes, alphabet)
    }

    /// Wraps stored genomes, projecting them onto the 2-gen alphabet if needed.
    pub fn from_genomes(genomes: Vec<Genome>, alphabet: MoveSet) -> Self {
        let mut population = Self {
            fitness: vec![Fitness::default(); genomes.len()],
            genomes,
            alphabet: MoveSet::Full,
        };
        if alphabet == MoveSet::TwoGen {
            population.restrict_to_two_gen();
        }
        population
    }

    /// Maps every gene onto <F, U> and switches the alphabet.
    pub fn restrict_to_two_gen(&mut self) {
        for genome in self.genomes.iter_mut() {
            for gene in genome.iter_mut() {
                *gene = gene.to_two_gen();
            }
        }
        self.alphabet = MoveSet::TwoGen;
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }

    pub fn elite(&self) -> (&[Move], Fitness) {
        (&self.genomes[0], self.fitness[0])
    }

    /// The prefix of the elite reaching its peak.
    pub fn elite_solution(&self) -> &[Move] {
        let (genome, fitness) = self.elite();
        &genome[..fitness.cut]
    }

    pub fn mean_score(&self) -> f64 {
        let total: i64 = self.fitness.iter().map(|f| f.score as i64).sum();
        total as f64 / self.len() as f64
    }

    pub fn trim<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let alphabet = self.alphabet;
        for genome in self.genomes.iter_mut() {
            trim_sequence(genome, alphabet, rng);
        }
    }

    pub fn evaluate(&mut self, objective: &Objective, parallel: bool) {
        self.fitness = if parallel {
            self.genomes.par_iter().map(|g| objective.fitness(g)).collect()
        } else {
            self.genomes.iter().map(|g| objective.fitness(g)).collect()
        };
    }

    /// Stable sort by descending score.
    pub fn rank(&mut self) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|a, b| self.fitness[*b].score.cmp(&self.fitness[*a].score));
        self.genomes = order.iter().map(|i| self.genomes[*i].clone()).collect();
        self.fitness = order.iter().map(|i| self.fitness[*i]).collect();
    }

    /// Replaces the `count` last genomes by random ones.
    pub fn intrude<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        let n = self.len();
        let alphabet = self.alphabet;
        for genome in self.genomes[n.saturating_sub(count)..].iter_mut() {
            let len = genome.len();
            *genome = random_genome(len, alphabet, rng);
        }
    }

    /// Redraws every gene of every genome but the elite with probability `rate`.
    pub fn mutate<R: Rng + ?Sized>(&mut self, rate: f64, rng: &mut R) {
        let alphabet = self.alphabet;
        for genome in self.genomes.iter_mut().skip(1) {
            for gene in genome.iter_mut() {
                if rng.gen::<f64>() < rate {
                    *gene = alphabet.random(rng);
                }
            }
        }
    }
}

pub fn random_genome<R: Rng + ?Sized>(length: usize, alphabet: MoveSet, rng: &mut R) -> Genome {
    (0..length).map(|_| alphabet.random(rng)).collect()
}

/// Safety net for the open ended search loops: a generation count and a wall clock limit.
#[derive(Debug, Clone)]
pub struct Budget {
    max_generations: Option<u64>,
    deadline: Option<Instant>,
    spent: u64,
}

impl Budget {
    pub fn unlimited() -> Self {
        Self::new(None, None)
    }

    /// `time_limit` in seconds.
    pub fn new(max_generations: Option<u64>, time_limit: Option<f32>) -> Self {
        Self {
            max_generations,
            deadline: time_limit.map(|t| Instant::now() + Duration::from_secs_f32(t)),
            spent: 0,
        }
    }

    pub fn spent(&self) -> u64 {
        self.spent
    }

    /// Accounts for one generation, failing once the budget is gone.
    pub fn charge(&mut self) -> Result<(), Error> {
        if self.max_generations.is_some_and(|max| self.spent >= max) {
            return Err(self.exhausted());
        }
        self.check_deadline()?;
        self.spent += 1;
        Ok(())
    }

    /// Fails once the time limit has passed, without spending a generation.
    pub fn check_deadline(&self) -> Result<(), Error> {
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(self.exhausted());
        }
        Ok(())
    }

    fn exhausted(&self) -> Error {
        Error::BudgetExhausted {
            generations: self.spent,
        }
    }
}

/// Runs generations on a [Population] with fixed [GeneticParams].
pub struct GeneticEngine {
    params: GeneticParams,
    rank_weights: Vec<f64>,
    parallel: bool,
}

impl GeneticEngine {
    /// `parallel` evaluates genomes on the rayon thread pool.
    pub fn new(params: GeneticParams, parallel: bool) -> Self {
        Self {
            rank_weights: rank_weights(params.population_size, params.selection_pressure),
            params,
            parallel,
        }
    }

    pub fn params(&self) -> &GeneticParams {
        &self.params
    }

    /// Draws the first parent: a uniform rank, accepted against the linearly decreasing rank
    /// weights.
    pub fn select_first_parent<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let n = self.rank_weights.len() as f64;
        let phi = self.params.selection_pressure;
        loop {
            let candidate = rng.gen_range(0..self.rank_weights.len());
            let y: f64 = rng.gen();
            if (2.0 - phi + 2.0 * y * (phi - 1.0)) / n <= self.rank_weights[candidate] {
                return candidate;
            }
        }
    }

    /// Refills every slot but the elite with children of the ranked population.
    pub fn crossover<R: Rng + ?Sized>(&self, population: &mut Population, rng: &mut R) {
        let n = population.len();
        let parents = population.genomes.clone();
        let mut child = 1;
        while child + 1 < n {
            let a = &parents[self.select_first_parent(rng)];
            let b = &parents[rng.gen_range(0..n)];
            let m = a.len();
            let cross = rng.gen_range(1..m);
            if rng.gen::<f64>() < self.params.crossover_rate {
                let first = &mut population.genomes[child];
                first[..cross].copy_from_slice(&a[..cross]);
                first[cross..].copy_from_slice(&b[cross..]);
                let second = &mut population.genomes[child + 1];
                second[..cross].copy_from_slice(&b[..cross]);
                second[cross..].copy_from_slice(&a[cross..]);
            } else {
                population.genomes[child].copy_from_slice(a);
                population.genomes[child + 1].copy_from_slice(b);
            }
            child += 2;
        }
        if child < n {
            population.genomes[child].copy_from_slice(&parents[rng.gen_range(0..n)]);
        }
    }

    /// Trims, evaluates and ranks. Afterwards index 0 holds the best genome.
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        population: &mut Population,
        objective: &Objective,
        rng: &mut R,
    ) -> Fitness {
        population.trim(rng);
        population.evaluate(objective, self.parallel);
        population.rank();
        population.fitness[0]
    }

    /// Intrusion, crossover and mutation on a ranked population.
    pub fn breed<R: Rng + ?Sized>(&self, population: &mut Population, rng: &mut R) {
        population.intrude(self.params.intruders, rng);
        self.crossover(population, rng);
        population.mutate(self.params.mutation_rate, rng);
    }

    /// One full generation, returning the elite fitness.
    pub fn step<R: Rng + ?Sized>(
        &self,
        population: &mut Population,
        objective: &Objective,
        rng: &mut R,
    ) -> Fitness {
        let elite = self.evaluate(population, objective, rng);
        self.breed(population, rng);
        elite
    }

    /** Runs `generations` generations and returns the final elite fitness.

    Progress is logged every `log_interval` generations, never when it is 0. Every generation is
    charged to `budget`.
    */
    pub fn run<R: Rng + ?Sized>(
        &self,
        population: &mut Population,
        objective: &Objective,
        generations: u64,
        log_interval: u64,
        budget: &mut Budget,
        rng: &mut R,
    ) -> Result<Fitness, Error> {
        let mut elite = population.fitness.first().copied().unwrap_or_default();
        for generation in 1..=generations {
            budget.charge()?;
            elite = self.evaluate(population, objective, rng);
            if log_interval > 0 && generation % log_interval == 0 {
                info!(
                    "Generation / elite / mean {} {} {:.2}",
                    generation,
                    elite.score,
                    population.mean_score()
                );
            }
            self.breed(population, rng);
        }
        Ok(elite)
    }
}

/// Selection weight of each rank, `(phi - i * (2 phi - 2) / (n - 1)) / n`, summing to 1.
pub fn rank_weights(n: usize, phi: f64) -> Vec<f64> {
    let last = (n.max(2) - 1) as f64;
    (0..n)
        .map(|i| (phi - i as f64 * (2.0 * phi - 2.0) / last) / n as f64)
        .collect()
}
