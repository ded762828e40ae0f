mod config;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use lpp_model::{DenseForm, Problem};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use config::{Config, OutputFormat};

#[derive(Parser)]
#[command(name = "lpp")]
#[command(about = "Parse linear problems and build their duals", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a problem text file
    Parse {
        /// The file to parse
        file: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Load a problem saved as JSON
    Load {
        /// The JSON file to load
        file: PathBuf,
        /// Read the dense matrix layout
        #[arg(long)]
        matrix: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Check a problem text file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Output the dual problem
    #[arg(long)]
    dual: bool,
    /// Output format (text, json, matrix)
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,
    /// Output file, next to the input by default
    #[arg(short, long, conflicts_with = "print")]
    output: Option<PathBuf>,
    /// Print to stdout instead of writing a file
    #[arg(long)]
    print: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Parse { file, output } => {
            let problem = parse_file(&file, &config)?;
            emit(&problem, &file, &output, &config)
        }
        Commands::Load {
            file,
            matrix,
            output,
        } => {
            let problem = load_file(&file, matrix)?;
            emit(&problem, &file, &output, &config)
        }
        Commands::Check { file } => {
            let problem = parse_file(&file, &config)?;
            print!("{}", summary(&file, &problem));
            Ok(())
        }
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

fn parse_file(path: &Path, config: &Config) -> Result<Problem> {
    let source = read(path)?;
    let problem = lpp_lang::Parser::new(config.parse.clone())
        .parse(&source)
        .with_context(|| format!("Failed to parse {:?}", path))?;
    Ok(problem)
}

fn load_file(path: &Path, matrix: bool) -> Result<Problem> {
    let content = read(path)?;
    let problem = if matrix {
        let dense: DenseForm = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse dense JSON from {:?}", path))?;
        Problem::try_from(dense).with_context(|| format!("Invalid dense problem in {:?}", path))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse problem JSON from {:?}", path))?
    };
    Ok(problem)
}

fn render(problem: &Problem, format: OutputFormat) -> Result<String> {
    let text = match format {
        OutputFormat::Text => problem.to_string(),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(problem).context("Failed to serialize problem")?;
            json.push('\n');
            json
        }
        OutputFormat::Matrix => DenseForm::from(problem).to_string(),
    };
    Ok(text)
}

fn emit(problem: &Problem, input: &Path, args: &OutputArgs, config: &Config) -> Result<()> {
    let format = args.format.unwrap_or(config.output.format);
    let problem = if args.dual {
        debug!("building dual");
        problem.dual()
    } else {
        problem.clone()
    };
    let text = render(&problem, format)?;
    if format == OutputFormat::Text && !problem.has_text_form() {
        warn!("problem has an empty objective or constraint; its text will not parse back");
    }

    if args.print {
        print!("{}", text);
        return Ok(());
    }

    let path = match &args.output {
        Some(path) => path.clone(),
        None => default_output_path(input, &config.output.prefix, format),
    };
    std::fs::write(&path, text).with_context(|| format!("Failed to write {:?}", path))?;
    info!(path = %path.display(), "wrote problem");
    Ok(())
}

/// `<dir>/<prefix><file name>`, with `.json` added for JSON output
fn default_output_path(input: &Path, prefix: &str, format: OutputFormat) -> PathBuf {
    let file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{}{}", prefix, file_name);
    let is_json = input.extension().is_some_and(|ext| ext == "json");
    if format == OutputFormat::Json && !is_json {
        name.push_str(".json");
    }
    input.with_file_name(name)
}

fn summary(path: &Path, problem: &Problem) -> String {
    let mut declared: Vec<String> = problem
        .explicit_restrictions()
        .iter()
        .map(|(variable, restriction)| format!("x{} {}", variable, restriction))
        .collect();
    let rest = if declared.is_empty() { "all >= 0" } else { "others >= 0" };
    declared.push(rest.to_string());

    let mut text = format!("{}: ok\n", path.display());
    text.push_str(&format!("  direction: {}\n", problem.direction()));
    text.push_str(&format!("  variables: {}\n", problem.num_variables()));
    text.push_str(&format!("  constraints: {}\n", problem.num_constraints()));
    text.push_str(&format!("  restrictions: {}\n", declared.join(", ")));
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "max 3x1 + 5x2\ns.t.\nx1 + 2x2 <= 4\n3x1 + 2x2 <= 6\nwith x2 free\nend\n";

    fn run_args(args: &[&str]) -> Result<()> {
        run(Cli::try_parse_from(args).unwrap())
    }

    #[test]
    fn test_default_output_path() {
        let input = Path::new("/tmp/problems/lp.txt");
        assert_eq!(
            default_output_path(input, "(LP-2) ", OutputFormat::Text),
            PathBuf::from("/tmp/problems/(LP-2) lp.txt")
        );
        assert_eq!(
            default_output_path(input, "(LP-2) ", OutputFormat::Json),
            PathBuf::from("/tmp/problems/(LP-2) lp.txt.json")
        );
        assert_eq!(
            default_output_path(Path::new("lp.json"), "dual-", OutputFormat::Json),
            PathBuf::from("dual-lp.json")
        );
    }

    #[test]
    fn test_render_formats() {
        let problem = lpp_lang::parse(SOURCE).unwrap();
        assert!(render(&problem, OutputFormat::Text).unwrap().starts_with("max 3x1 + 5x2\n"));
        assert!(render(&problem, OutputFormat::Json).unwrap().contains("\"direction\": \"max\""));
        assert!(render(&problem, OutputFormat::Matrix).unwrap().starts_with("MinMax = 1"));
    }

    #[test]
    fn test_summary() {
        let problem = lpp_lang::parse(SOURCE).unwrap();
        let text = summary(Path::new("lp.txt"), &problem);
        assert!(text.contains("direction: max"));
        assert!(text.contains("variables: 2"));
        assert!(text.contains("restrictions: x2 free, others >= 0"));

        let problem = lpp_lang::parse("min x1 s.t. x1 >= 1 end").unwrap();
        assert!(summary(Path::new("lp.txt"), &problem).contains("restrictions: all >= 0"));
    }

    #[test]
    fn test_parse_writes_dual_next_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("lp.txt");
        std::fs::write(&input, SOURCE).unwrap();

        run_args(&["lpp", "parse", input.to_str().unwrap(), "--dual"]).unwrap();

        let written = std::fs::read_to_string(dir.path().join("(LP-2) lp.txt")).unwrap();
        let dual = lpp_lang::parse(&written).unwrap();
        assert_eq!(dual, lpp_lang::parse(SOURCE).unwrap().dual());
    }

    #[test]
    fn test_json_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("lp.txt");
        let json = dir.path().join("lp.json");
        let text = dir.path().join("back.txt");
        std::fs::write(&input, SOURCE).unwrap();

        run_args(&["lpp", "parse", input.to_str().unwrap(), "-f", "json", "-o", json.to_str().unwrap()]).unwrap();
        run_args(&["lpp", "load", json.to_str().unwrap(), "-o", text.to_str().unwrap()]).unwrap();

        let loaded = lpp_lang::parse(&std::fs::read_to_string(&text).unwrap()).unwrap();
        assert_eq!(loaded, lpp_lang::parse(SOURCE).unwrap());
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("lp.txt");
        let config = dir.path().join("lpp.toml");
        std::fs::write(&input, "max x1 s.t. x1 < 4 end").unwrap();
        std::fs::write(&config, "[parse]\nallow_strict_inequalities = true\n[output]\nprefix = \"out-\"\nformat = \"matrix\"\n").unwrap();

        assert!(run_args(&["lpp", "parse", input.to_str().unwrap()]).is_err());
        run_args(&["lpp", "--config", config.to_str().unwrap(), "parse", input.to_str().unwrap()]).unwrap();

        let written = std::fs::read_to_string(dir.path().join("out-lp.txt")).unwrap();
        assert!(written.starts_with("MinMax = 1"));
    }

    #[test]
    fn test_parse_error_context() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("lp.txt");
        std::fs::write(&input, "max x1 s.t. x1 <= 1").unwrap();

        let error = run_args(&["lpp", "check", input.to_str().unwrap()]).unwrap_err();
        assert!(format!("{:#}", error).contains("Missing `end`"));
    }
}
