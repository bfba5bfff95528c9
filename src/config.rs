use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bruteforce::DEFAULT_MAX_DEPTH;
use crate::error::Error;
use crate::genetic::GeneticParams;

/// Generation budget of one solver stage.
///
/// A stage first runs `generations` generations, and every failed attempt is followed by
/// another attempt `growth` generations longer. Progress is logged every `log_interval`
/// generations, 0 disables it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub generations: u64,
    #[serde(default)]
    pub growth: u64,
    #[serde(default)]
    pub log_interval: u64,
}

impl StageConfig {
    pub const fn new(generations: u64, growth: u64, log_interval: u64) -> Self {
        Self {
            generations,
            growth,
            log_interval,
        }
    }

    /// Generations of the attempt number `attempt`, counting from 0.
    pub fn budget(&self, attempt: u64) -> u64 {
        self.generations.saturating_add(self.growth.saturating_mul(attempt))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndgameStrategy {
    Genetic,
    BruteForce,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub genetic: GeneticParams,
    /// 2x2x3 search, per location and sweep.
    pub block: StageConfig,
    /// Getting into the 2-gen group.
    pub two_gen: StageConfig,
    /// Solving the 2-gen group.
    pub endgame: StageConfig,
    /// Sweeps are repeated while the best location scores below this.
    pub block_threshold: i32,
    pub endgame_strategy: EndgameStrategy,
    pub brute_force_max_depth: usize,
    /// Evaluate genomes on the rayon thread pool.
    pub parallel: bool,
    pub seed: Option<u64>,
    pub max_total_generations: Option<u64>,
    /// Seconds.
    pub time_limit: Option<f32>,
    /// File for the 2x2x3 population store.
    pub checkpoint: Option<PathBuf>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            genetic: GeneticParams::default(),
            block: StageConfig::new(1000, 0, 100_000),
            two_gen: StageConfig::new(10_000, 10_000, 5000),
            endgame: StageConfig::new(200_000, 0, 10_000),
            block_threshold: -20,
            endgame_strategy: EndgameStrategy::Genetic,
            brute_force_max_depth: DEFAULT_MAX_DEPTH,
            parallel: false,
            seed: None,
            max_total_generations: None,
            time_limit: None,
            checkpoint: None,
        }
    }
}

impl SolverConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, Error> {
        let config: SolverConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.genetic.validate()?;
        for (name, stage) in [
            ("block", &self.block),
            ("two_gen", &self.two_gen),
            ("endgame", &self.endgame),
        ] {
            if stage.generations == 0 {
                return Err(Error::InvalidConfig(format!(
                    "{} stage needs at least one generation",
                    name
                )));
            }
        }
        if self.time_limit.is_some_and(|t| !(t > 0.0 && t.is_finite())) {
            return Err(Error::InvalidConfig(
                "time limit must be a positive number of seconds".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::config::*;

    #[test]
    fn test_defaults() {
        let config = SolverConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.genetic.population_size, 51);
        assert_eq!(config.two_gen.budget(0), 10_000);
        assert_eq!(config.two_gen.budget(2), 30_000);
        assert_eq!(config.endgame.budget(5), 200_000);
    }

    #[test]
    fn test_from_toml() {
        let config = SolverConfig::from_toml_str(
            r#"
            endgame_strategy = "brute_force"
            seed = 7

            [genetic]
            population_size = 21
            mutation_rate = 0.1

            [block]
            generations = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.endgame_strategy, EndgameStrategy::BruteForce);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.genetic.population_size, 21);
        assert_eq!(config.genetic.code_length, 30);
        assert_eq!(config.block, StageConfig::new(50, 0, 0));
        assert_eq!(config.two_gen, SolverConfig::default().two_gen);
    }

    #[test]
    fn test_rejects_invalid() {
        assert!(matches!(
            SolverConfig::from_toml_str("[genetic]\nintruders = 60\n"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            SolverConfig::from_toml_str("[genetic]\ncrossover_rate = 1.5\n"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            SolverConfig::from_toml_str("seed = \"abc\""),
            Err(Error::Toml(_))
        ));
        let config = SolverConfig {
            time_limit: Some(-1.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
