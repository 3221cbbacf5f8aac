//! tex2docx CLI - prepare LaTeX for Word conversion

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::io::{self, Read, Write};
#[cfg(feature = "cli")]
use tex2docx::{
    utils::error::DiagnosticSeverity, ConversionSession, PandocCommand, PreprocessOptions,
    PreprocessOutput, PreprocessWarning, Preprocessor, Substitution, UnterminatedPolicy,
    DEFAULT_FILE_NAME,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "tex2docx")]
#[command(version)]
#[command(about = "tex2docx - resolve LaTeX references and number equations for Word conversion", long_about = None)]
struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file path (reads from stdin if not provided)
    input_file: Option<String>,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<String>,

    #[command(flatten)]
    prep: PrepArgs,

    /// Write the label tables and warnings as JSON to this path
    #[arg(long)]
    report: Option<String>,

    /// Exit with status 1 if any warning was emitted
    #[arg(long)]
    strict: bool,

    /// Disable colored warnings
    #[arg(long)]
    no_color: bool,
}

/// Preprocessing flags shared by every mode
#[cfg(feature = "cli")]
#[derive(clap::Args, Clone)]
struct PrepArgs {
    /// TOML file with preprocessing options
    #[arg(long)]
    config: Option<String>,

    /// Extra literal substitution, SEARCH=REPLACE (repeatable)
    #[arg(long = "subst", value_name = "SEARCH=REPLACE")]
    substitutions: Vec<String>,

    /// Do not center equation bodies inside their table cell
    #[arg(long)]
    no_center: bool,

    /// Keep the lines of never-closed equation environments
    #[arg(long)]
    keep_unterminated: bool,

    /// Strip \vspace, \hfill and minipages, rewrite \captionof{table}
    #[arg(long)]
    clean_tables: bool,

    /// Close an equation environment opened and closed on the same line
    #[arg(long)]
    one_line_equations: bool,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Preprocess and convert to .docx with pandoc
    Convert {
        /// Input .tex file
        input: String,

        /// Output .docx path
        #[arg(short, long, default_value = DEFAULT_FILE_NAME)]
        output: String,

        /// Converter command (defaults to $TEX2DOCX_PANDOC or `pandoc`)
        #[arg(long)]
        pandoc: Option<String>,

        #[command(flatten)]
        prep: PrepArgs,
    },

    /// Print the numbers assigned to equation, figure and table labels
    Labels {
        /// Input file (reads from stdin if not provided)
        input: Option<String>,
    },

    /// Show version and feature info
    Info,
}

#[cfg(feature = "cli")]
fn main() -> io::Result<()> {
    let cli = Cli::parse();

    if let Some(cmd) = cli.command {
        return handle_subcommand(cmd, !cli.no_color);
    }

    let input = read_input(cli.input_file.as_deref())?;
    let options = build_options(&cli.prep)?;
    let prepared = Preprocessor::new(options).run(&input);

    print_warnings(&prepared.warnings, !cli.no_color);

    if let Some(path) = cli.report.as_ref() {
        let serialized = serde_json::to_string_pretty(&Report::from(&prepared))
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
        fs::write(path, serialized)?;
    }

    match cli.output {
        Some(path) => {
            fs::write(&path, &prepared.content)?;
            eprintln!("✓ Output written to: {}", path);
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(prepared.content.as_bytes())?;
            stdout.flush()?;
        }
    }

    if cli.strict && prepared.has_warnings() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn handle_subcommand(cmd: Commands, color: bool) -> io::Result<()> {
    match cmd {
        Commands::Convert {
            input,
            output,
            pandoc,
            prep,
        } => {
            let source = fs::read_to_string(&input)?;
            let options = build_options(&prep)?;
            let converter = match pandoc {
                Some(cmd) => PandocCommand::new(cmd),
                None => PandocCommand::from_env(),
            };

            let mut session = ConversionSession::with_options(converter, options);
            session.engine_ready();
            let name = std::path::Path::new(&input)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(&input)
                .to_string();
            session.load_file(&name, source);
            eprintln!("{}", session.status());

            let result = session.convert().map(|artifact| artifact.bytes.clone());
            print_warnings(session.warnings(), color);
            match result {
                Ok(bytes) => {
                    fs::write(&output, bytes)?;
                    eprintln!("{}", session.status());
                    eprintln!("✓ Output written to: {}", output);
                }
                Err(_) => {
                    eprintln!("{}", session.status());
                    std::process::exit(1);
                }
            }
        }

        Commands::Labels { input } => {
            let source = read_input(input.as_deref())?;
            let prepared = Preprocessor::default().run(&source);
            print_table("Equations", prepared.equations.iter());
            print_table("Figures", prepared.figures.iter());
            print_table("Tables", prepared.tables.iter());
            print_warnings(&prepared.warnings, color);
        }

        Commands::Info => {
            println!("tex2docx v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Resolves LaTeX cross references ahead of Word conversion.");
            println!();
            println!("Stages:");
            println!("  • Literal substitutions (commands the converter cannot parse)");
            println!("  • Equation labels eq:, eqn: → (n), wrapped in a numbered tabular");
            println!("  • Figure labels fig: → Figure n");
            println!("  • Table labels tab: → Table n");
            println!("  • Optional table clean-up (--clean-tables)");
            println!();
            println!("Converter: ${} or `pandoc`", PandocCommand::ENV_VAR);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn read_input(path: Option<&str>) -> io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

#[cfg(feature = "cli")]
fn build_options(args: &PrepArgs) -> io::Result<PreprocessOptions> {
    let mut options = match args.config.as_ref() {
        Some(path) => load_config(path)?,
        None => PreprocessOptions::default(),
    };

    for pair in &args.substitutions {
        let sub = Substitution::parse_pair(pair).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid substitution '{}', expected SEARCH=REPLACE", pair),
            )
        })?;
        options.substitutions.push(sub);
    }
    if args.no_center {
        options.center_equations = false;
    }
    if args.keep_unterminated {
        options.unterminated = UnterminatedPolicy::Flush;
    }
    if args.clean_tables {
        options.clean_tables = true;
    }
    if args.one_line_equations {
        options.one_line_equations = true;
    }

    Ok(options)
}

#[cfg(all(feature = "cli", feature = "config-file"))]
fn load_config(path: &str) -> io::Result<PreprocessOptions> {
    PreprocessOptions::from_toml_file(path)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
}

#[cfg(all(feature = "cli", not(feature = "config-file")))]
fn load_config(_path: &str) -> io::Result<PreprocessOptions> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "config files need the `config-file` feature",
    ))
}

#[cfg(feature = "cli")]
fn print_warnings(warnings: &[PreprocessWarning], color: bool) {
    for warning in warnings {
        let label = match warning.severity() {
            DiagnosticSeverity::Error => "error",
            DiagnosticSeverity::Warning => "warning",
            DiagnosticSeverity::Info => "info",
        };
        if color {
            eprintln!("{}{}\x1b[0m: {}", warning.color_code(), label, warning);
        } else {
            eprintln!("{}: {}", label, warning);
        }
    }
}

#[cfg(feature = "cli")]
fn print_table<'a>(title: &str, entries: impl Iterator<Item = (&'a str, usize)>) {
    let entries: Vec<_> = entries.collect();
    println!("{} ({})", title, entries.len());
    for (id, n) in entries {
        println!("  {:>4}  {}", n, id);
    }
}

/// JSON report written by `--report`
#[cfg(feature = "cli")]
#[derive(serde::Serialize)]
struct Report<'a> {
    equations: &'a tex2docx::LabelTable,
    figures: &'a tex2docx::LabelTable,
    tables: &'a tex2docx::LabelTable,
    warnings: &'a [PreprocessWarning],
}

#[cfg(feature = "cli")]
impl<'a> From<&'a PreprocessOutput> for Report<'a> {
    fn from(out: &'a PreprocessOutput) -> Self {
        Report {
            equations: &out.equations,
            figures: &out.figures,
            tables: &out.tables,
            warnings: &out.warnings,
        }
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Build with --features cli");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  cargo install tex2docx --features cli");
    eprintln!("  tex2docx [OPTIONS] [INPUT_FILE]");
}
