use clap::{Parser, Subcommand, ValueEnum};
use simplex_lang::{CompileError, Compiler, ConstraintInput, Location, ProblemInput};
use simplex_solver::{Direction, Formatter, Relation, Solution, Solver};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "simplex")]
#[command(about = "Two-phase simplex solver for small linear programs", long_about = None)]
struct Cli {
    /// Log solver progress (-v for phases, -vv for every pivot)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem from a JSON file or from inline equations
    Solve {
        /// JSON problem file
        #[arg(conflicts_with_all = ["vars", "max", "min", "constraints"])]
        file: Option<PathBuf>,
        /// Number of decision variables (X1..Xn)
        #[arg(long)]
        vars: Option<usize>,
        /// Objective to maximize
        #[arg(long, value_name = "OBJECTIVE", conflicts_with = "min")]
        max: Option<String>,
        /// Objective to minimize
        #[arg(long, value_name = "OBJECTIVE")]
        min: Option<String>,
        /// Constraint such as "X1 + 2X2 <= 14"
        #[arg(short = 'c', long = "constraint", value_name = "CONSTRAINT")]
        constraints: Vec<String>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Print the final tableau
        #[arg(long)]
        show_tableau: bool,
        /// Decimal places in text output
        #[arg(long, default_value_t = 4)]
        precision: usize,
        /// Pivot limit across both phases
        #[arg(long, default_value_t = 10_000)]
        max_iterations: usize,
    },
    /// Check a JSON problem file for errors without solving it
    Check {
        /// The file to check
        file: PathBuf,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Solve {
            file,
            vars,
            max,
            min,
            constraints,
            format,
            show_tableau,
            precision,
            max_iterations,
        } => {
            let input = match file {
                Some(path) => load_problem(&path),
                None => inline_problem(vars, max, min, &constraints),
            };
            let input = input.unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });

            let problem = match Compiler::new().compile(&input) {
                Ok(p) => p,
                Err(e) => {
                    report_compile_error(&input, &e);
                    std::process::exit(1);
                }
            };

            let solver = Solver::new().with_max_iterations(max_iterations);
            let solution = match solver.solve(&problem) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Solve error: {}", e);
                    std::process::exit(1);
                }
            };
            debug!(iterations = solution.iterations, "solved");

            match format {
                OutputFormat::Json => match serde_json::to_string_pretty(&solution) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error encoding solution: {}", e);
                        std::process::exit(1);
                    }
                },
                OutputFormat::Text => print!("{}", render_text(&solution, precision, show_tableau)),
            }
        }
        Commands::Check { file } => {
            let input = load_problem(&file).unwrap_or_else(|e| {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            });

            match Compiler::new().compile(&input) {
                Ok(problem) => {
                    println!("✓ {} is valid", file.display());
                    println!("  {} variables", problem.num_variables());
                    println!("  {} constraints", problem.num_constraints());
                }
                Err(e) => {
                    eprintln!("✗ {} has errors:", file.display());
                    report_compile_error(&input, &e);
                    std::process::exit(1);
                }
            }
        }
    }
}

/// RUST_LOG wins over -v when set
fn init_logging(verbose: u8) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn load_problem(path: &Path) -> Result<ProblemInput, String> {
    let source = std::fs::read_to_string(path).map_err(|e| format!("reading {}: {}", path.display(), e))?;
    serde_json::from_str(&source).map_err(|e| format!("parsing {}: {}", path.display(), e))
}

fn inline_problem(
    vars: Option<usize>,
    max: Option<String>,
    min: Option<String>,
    constraints: &[String],
) -> Result<ProblemInput, String> {
    let variables = vars.ok_or("either a problem file or --vars is required")?;
    let (objective, direction) = match (max, min) {
        (Some(objective), None) => (objective, Direction::Maximize),
        (None, Some(objective)) => (objective, Direction::Minimize),
        _ => return Err("exactly one of --max or --min is required".to_string()),
    };
    let constraints = constraints
        .iter()
        .map(|c| parse_inline_constraint(c))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ProblemInput {
        variables,
        objective,
        direction,
        constraints,
    })
}

/// Split `"<lhs> <op> <rhs>"` on its relation operator
fn parse_inline_constraint(text: &str) -> Result<ConstraintInput, String> {
    const OPERATORS: [(&str, Relation); 5] = [
        ("<=", Relation::LessOrEqual),
        ("≤", Relation::LessOrEqual),
        (">=", Relation::GreaterOrEqual),
        ("≥", Relation::GreaterOrEqual),
        ("=", Relation::Equal),
    ];

    let (pos, op, relation) = OPERATORS
        .iter()
        .find_map(|&(op, relation)| text.find(op).map(|pos| (pos, op, relation)))
        .ok_or_else(|| format!("constraint '{}' has no <=, >= or = operator", text))?;

    let lhs = text[..pos].trim();
    let rhs_text = text[pos + op.len()..].trim();
    let rhs = rhs_text
        .parse::<f64>()
        .map_err(|_| format!("constraint '{}' has an invalid right-hand side '{}'", text, rhs_text))?;

    Ok(ConstraintInput::new(lhs, relation, rhs))
}

/// Text report: optional final tableau, the solution summary, pivot count
fn render_text(solution: &Solution, precision: usize, show_tableau: bool) -> String {
    let formatter = Formatter::new().with_precision(precision);
    let mut out = String::new();
    if show_tableau {
        out.push_str(&formatter.tableau(&solution.tableau));
        out.push_str("\n\n");
    }
    out.push_str(&formatter.solution(solution));
    out.push('\n');
    out.push_str(&format!("Iterations: {}\n", solution.iterations));
    out
}

fn report_compile_error(input: &ProblemInput, error: &CompileError) {
    eprintln!("  {}", error);

    if let CompileError::Parse { location, source } = error {
        let text = match location {
            Location::Objective => Some(input.objective.as_str()),
            Location::Constraint(n) => input.constraints.get(n - 1).map(|c| c.lhs.as_str()),
        };
        if let Some(text) = text {
            let column = text[..source.offset().min(text.len())].chars().count();
            eprintln!("    {}", text);
            eprintln!("    {}^", " ".repeat(column));
        }
    }
}
