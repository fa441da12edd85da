use clap::{Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt};
use twophase_lang::{Report, WriterTrace};
use twophase_solver::{GeneralProblem, Solver, SolverConfig, canonicalize};

#[derive(Parser)]
#[command(name = "twophase")]
#[command(about = "Solve linear programs with the two-phase simplex method", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem file and print the optimal solution
    Solve {
        /// The problem file
        file: PathBuf,
        /// Write the step-by-step solution log to this file
        #[arg(short, long)]
        log: Option<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
        /// JSON file with solver settings
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Maximum pivots per phase
        #[arg(long)]
        max_iterations: Option<usize>,
    },
    /// Parse a problem file and show its canonical form
    Check {
        /// The problem file
        file: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Pretty,
    Json,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn read_problem(file: &Path) -> GeneralProblem {
    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    };

    match twophase_lang::parse_problem(&source) {
        Ok(problem) => problem,
        Err(e) => {
            eprintln!("Parse error in {}: {}", file.display(), e);
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<&Path>, max_iterations: Option<usize>) -> SolverConfig {
    let mut config = match path {
        Some(path) => {
            let text = match std::fs::read_to_string(path) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error reading config: {}", e);
                    std::process::exit(1);
                }
            };
            match serde_json::from_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Invalid config {}: {}", path.display(), e);
                    std::process::exit(1);
                }
            }
        }
        None => SolverConfig::default(),
    };
    if let Some(max) = max_iterations {
        config.max_iterations = max;
    }
    config
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Solve {
            file,
            log,
            format,
            config,
            max_iterations,
        } => {
            let problem = read_problem(&file);
            let config = load_config(config.as_deref(), max_iterations);
            tracing::debug!(?config, file = %file.display(), "solving");
            let solver = Solver::with_config(config);

            let result = match &log {
                Some(log_path) => {
                    let log_file = match File::create(log_path) {
                        Ok(f) => f,
                        Err(e) => {
                            eprintln!("Error creating log file: {}", e);
                            std::process::exit(1);
                        }
                    };
                    let mut trace = WriterTrace::new(BufWriter::new(log_file));
                    trace.note("=== LINEAR PROGRAMMING SOLUTION ===\n");
                    trace.note(format_args!("=== Original problem ===\n{}", problem));
                    trace.note(format_args!("=== Canonical form ===\n{}", canonicalize(&problem)));

                    let result = solver.solve_traced(&problem, &mut trace);
                    match &result {
                        Ok(solution) => {
                            trace.note(format_args!("\n=== Result ===\n{}", Report::new(&problem, solution)))
                        }
                        Err(e) => trace.note(format_args!("\nError: {}", e)),
                    }
                    if let Err(e) = trace.finish() {
                        eprintln!("Error writing log file: {}", e);
                        std::process::exit(1);
                    }
                    eprintln!("Solution log written to {}", log_path.display());
                    result
                }
                None => solver.solve(&problem),
            };

            let solution = match result {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            let report = Report::new(&problem, &solution);
            match format {
                OutputFormat::Json => match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error serializing result: {}", e);
                        std::process::exit(1);
                    }
                },
                OutputFormat::Pretty => print!("{}", report),
            }
        }
        Commands::Check { file } => {
            let problem = read_problem(&file);
            let canonical = canonicalize(&problem);

            println!("✓ {} is valid", file.display());
            println!("  {} variables", problem.num_variables());
            println!("  {} constraints", problem.num_constraints());
            println!("  {} free variables", canonical.free_splits.len());
            println!();
            print!("{}", problem);
            println!();
            print!("{}", canonical);
        }
    }
}
