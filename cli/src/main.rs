mod results;

use clap::{arg, command, Parser, Subcommand};
use crossterm::{
    cursor::{MoveLeft, MoveRight, MoveUp},
    execute,
    style::{Attribute, Color as TermColor, SetBackgroundColor, Stylize},
};
use gencube::{
    config::{EndgameStrategy, SolverConfig},
    error::Error,
    facelet::FaceCube,
    moves::{Face, Move},
    scramble::{scramble_from_str, scramble_to_str, ScrambleSource, DEFAULT_SCRAMBLE_LENGTH},
    solver::{SolveResult, StagedSolver},
};
use log::{warn, LevelFilter};
use rand::{rngs::StdRng, SeedableRng};
use spinners::Spinner;
use std::{
    io::{self, stdout},
    path::{Path, PathBuf},
    time::Instant,
};

use crate::results::ResultLog;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "solves the cube with the staged genetic algorithm")]
    #[clap(group(
    clap::ArgGroup::new("source")
        .required(false)
        .args(&["scramble", "facelet", "file", "random", "interactive"]),
    ))]
    Solve {
        /// Scramble moves, e.g. "R U R' U'"
        #[arg(short, long)]
        scramble: Option<String>,

        /// 54 character facelet string
        #[arg(short, long)]
        facelet: Option<String>,

        /// Text file holding the scramble
        #[arg(long)]
        file: Option<PathBuf>,

        /// Length of a random scramble
        #[arg(short, long)]
        random: Option<usize>,

        /// Number of moves to type in, one per line
        #[arg(short, long)]
        interactive: Option<usize>,

        /// TOML solver configuration
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Generations of the 2x2x3 search per location
        #[arg(short, long)]
        generations: Option<u64>,

        /// Solve the 2-gen stage by brute force
        #[arg(short, long)]
        brute_force: bool,

        #[arg(long)]
        seed: Option<u64>,

        /// Result log
        #[arg(long, default_value = "results.txt")]
        results: PathBuf,

        /// Abort after this many generations in total
        #[arg(long)]
        max_generations: Option<u64>,

        /// Abort after this many seconds
        #[arg(short, long)]
        timeout: Option<f32>,

        /// Evaluate genomes in parallel
        #[arg(long)]
        parallel: bool,

        #[arg(short, long)]
        verbose: bool,

        #[arg(short, long)]
        preview: bool,
    },

    #[command(about = "generates scramble")]
    Scramble {
        #[arg(short, long, default_value_t = 25)]
        length: usize,
        #[arg(short, long)]
        preview: bool,
    },
}

struct SolveArgs {
    config: Option<PathBuf>,
    generations: Option<u64>,
    brute_force: bool,
    seed: Option<u64>,
    max_generations: Option<u64>,
    timeout: Option<f32>,
    parallel: bool,
}

impl SolveArgs {
    fn solver_config(&self) -> Result<SolverConfig, Error> {
        let mut config = match &self.config {
            Some(path) => SolverConfig::from_toml_file(path)?,
            None => SolverConfig::default(),
        };
        if let Some(generations) = self.generations {
            config.block.generations = generations;
        }
        if self.brute_force {
            config.endgame_strategy = EndgameStrategy::BruteForce;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.max_generations.is_some() {
            config.max_total_generations = self.max_generations;
        }
        if self.timeout.is_some() {
            config.time_limit = self.timeout;
        }
        config.parallel |= self.parallel;
        config.validate()?;
        Ok(config)
    }
}

fn init_logger(verbose: bool) {
    let level = if verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn scramble_source(
    scramble: &Option<String>,
    file: &Option<PathBuf>,
    random: Option<usize>,
    interactive: Option<usize>,
) -> Result<ScrambleSource, Error> {
    if let Some(scramble) = scramble {
        return Ok(ScrambleSource::Moves(scramble_from_str(scramble)?));
    }
    if let Some(file) = file {
        return Ok(ScrambleSource::File(file.clone()));
    }
    if let Some(count) = interactive {
        println!("Enter the scramble moves. Only one move per line!");
        return Ok(ScrambleSource::Interactive(count));
    }
    Ok(ScrambleSource::Random(random.unwrap_or(DEFAULT_SCRAMBLE_LENGTH)))
}

#[allow(clippy::too_many_arguments)]
fn solve(
    scramble: &Option<String>,
    facelet: &Option<String>,
    file: &Option<PathBuf>,
    random: Option<usize>,
    interactive: Option<usize>,
    results: &Path,
    args: SolveArgs,
    verbose: bool,
    preview: bool,
) -> Result<(), Error> {
    let config = args.solver_config()?;
    let mut solver = StagedSolver::new(config)?;

    let (cube, log) = if let Some(facelet) = facelet {
        let cube = FaceCube::try_from(facelet.as_str())?;
        (cube, ResultLog::create_with_header(results, facelet))
    } else {
        let source = scramble_source(scramble, file, random, interactive)?;
        let moves = source.resolve(solver.rng());
        println!("Scramble: {}", scramble_to_str(&moves));
        (FaceCube::default().apply_moves(&moves), ResultLog::create(results, &moves))
    };
    if preview {
        print_facelet(&cube)?;
    }

    let result = solve_state(&mut solver, &cube, verbose)?;
    match log.and_then(|log| log.write_result(&result)) {
        Ok(()) => {}
        Err(e) => warn!("{}", e),
    }
    Ok(())
}

fn solve_state(
    solver: &mut StagedSolver<StdRng>,
    cube: &FaceCube,
    verbose: bool,
) -> Result<SolveResult, Error> {
    let start = Instant::now();
    let mut spinner = (!verbose).then(|| Spinner::new(spinners::Spinners::Dots, "Solving".to_owned()));
    let result = solver.solve_cube(cube);
    let end = Instant::now();
    if let Some(spinner) = spinner.as_mut() {
        spinner.stop_with_newline();
    }
    let result = result?;

    let rotations: Vec<String> = result.rotations.iter().map(|r| r.to_string()).collect();
    println!("Rotations: {}", rotations.join(" "));
    for stage in &result.stages {
        println!("{}: {}", stage.stage.tag(), stage.notation());
    }
    println!("Move count: {}", result.total_moves);
    println!("Generations: {}", solver.generations());
    println!("Solve time: {:?}", result.solve_time);
    println!("Total time: {:?}", end - start);

    Ok(result)
}

fn label_to_termcolor(label: u8) -> TermColor {
    match label {
        0 => TermColor::Green,
        1 => TermColor::White,
        2 => TermColor::Red,
        3 => TermColor::Blue,
        4 => TermColor::Yellow,
        5 => TermColor::Magenta,
        _ => TermColor::DarkGrey,
    }
}

fn print_face(face: &[u8], offset: u16) -> Result<(), io::Error> {
    for i in 0..3 {
        let layer = format!(
            "{}  {}  {}  {}",
            SetBackgroundColor(label_to_termcolor(face[3 * i])),
            SetBackgroundColor(label_to_termcolor(face[(3 * i) + 1])),
            SetBackgroundColor(label_to_termcolor(face[(3 * i) + 2])),
            SetBackgroundColor(TermColor::Reset)
        );

        println!("{layer}");

        if offset != 0 {
            execute!(stdout(), MoveRight(offset))?;
        }
    }

    Ok(())
}

fn print_facelet(facelet: &FaceCube) -> Result<(), io::Error> {
    let stdout = stdout();

    println!();
    execute!(&stdout, MoveRight(6))?;
    print_face(facelet.face(Face::U), 6)?;
    execute!(&stdout, MoveLeft(6))?;
    print_face(facelet.face(Face::L), 0)?;
    execute!(&stdout, MoveRight(6), MoveUp(3))?;
    print_face(facelet.face(Face::F), 6)?;
    execute!(&stdout, MoveLeft(12), MoveUp(3), MoveRight(12))?;
    print_face(facelet.face(Face::R), 12)?;
    execute!(&stdout, MoveLeft(12), MoveUp(3), MoveRight(18))?;
    print_face(facelet.face(Face::B), 18)?;
    execute!(&stdout, MoveLeft(12))?;
    print_face(facelet.face(Face::D), 6)?;
    execute!(&stdout, MoveLeft(12))?;
    println!();

    Ok(())
}

fn scramble(length: usize, preview: bool) -> Result<(), Error> {
    let mut rng = StdRng::from_entropy();
    let ss: Vec<Move> = gencube::scramble::gen_scramble(length, &mut rng);
    println!("Scramble: {}", scramble_to_str(&ss));
    if preview {
        print_facelet(&FaceCube::default().apply_moves(&ss))?;
    }
    Ok(())
}

fn main() {
    let program = Cli::parse();

    let result = match &program.command {
        Some(Commands::Solve {
            scramble,
            facelet,
            file,
            random,
            interactive,
            config,
            generations,
            brute_force,
            seed,
            results,
            max_generations,
            timeout,
            parallel,
            verbose,
            preview,
        }) => {
            init_logger(*verbose);
            let args = SolveArgs {
                config: config.clone(),
                generations: *generations,
                brute_force: *brute_force,
                seed: *seed,
                max_generations: *max_generations,
                timeout: *timeout,
                parallel: *parallel,
            };
            solve(
                scramble,
                facelet,
                file,
                *random,
                *interactive,
                results,
                args,
                *verbose,
                *preview,
            )
        }
        Some(Commands::Scramble { length, preview }) => {
            init_logger(false);
            scramble(*length, *preview)
        }
        _ => Ok(()),
    };

    if let Err(error) = result {
        let styled = "Error:".with(TermColor::Red).attribute(Attribute::Bold);
        println!("{styled} {error}");
    }
}
