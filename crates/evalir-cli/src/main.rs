use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use evalir::core::RedefinitionPolicy;
use evalir::{exec_to, CompilerConfig, ExecConfig, Module};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "evalir")]
#[command(about = "Eval - compile S-expression programs to LLVM-style IR")]
#[command(version = "0.1.0")]
#[command(author = "Gianluca Brigandi <gbrigand@gmail.com>")]
struct Cli {
    /// Disable colored status output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log compiler internals (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a program, or every `.eva` file under a directory
    Compile {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also emit a native object file
        #[arg(long)]
        object: Option<PathBuf>,

        /// Also save the module as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// JSON file with `compiler` and `emitter` settings
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        intern_strings: bool,

        /// Reject a second `var` of the same name
        #[arg(long)]
        strict_redefinition: bool,
    },

    /// Check that a program parses
    Validate { input: PathBuf },

    /// Print module statistics
    Debug { input: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    match cli.command {
        Commands::Compile {
            input,
            output,
            object,
            json,
            config,
            intern_strings,
            strict_redefinition,
        } => {
            // Without a config file the IR goes to stdout unless -o is given.
            let mut exec_config = match config {
                Some(path) => load_config(&path)?,
                None => ExecConfig {
                    output_path: None,
                    ..ExecConfig::default()
                },
            };
            if intern_strings {
                exec_config.compiler.intern_strings = true;
            }
            if strict_redefinition {
                exec_config.compiler.redefinition = RedefinitionPolicy::Error;
            }
            if cli.no_color {
                exec_config.emitter.use_colors = false;
            }

            if input.is_dir() {
                if output.is_some() || object.is_some() || json.is_some() {
                    bail!("--output, --object and --json need a single input file");
                }
                cmd_compile_dir(&input, exec_config, cli.verbose)
            } else {
                exec_config.output_path = output.or(exec_config.output_path);
                exec_config.object_path = object.or(exec_config.object_path);
                exec_config.json_path = json.or(exec_config.json_path);
                cmd_compile(&input, exec_config, cli.verbose)
            }
        }
        Commands::Validate { input } => cmd_validate(&input, cli.verbose),
        Commands::Debug { input } => cmd_debug(&input, cli.verbose),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<ExecConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid config file {}", path.display()))
}

fn read_source(input: &Path) -> Result<String> {
    fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
}

fn cmd_compile(input: &Path, mut config: ExecConfig, verbose: bool) -> Result<()> {
    let start = Instant::now();
    let source = read_source(input)?;
    config.source_file = input.to_str().map(str::to_string);

    if verbose {
        eprintln!("{}", " Eval Compiler".bright_blue().bold());
        eprintln!("{}", "=".repeat(50).bright_blue());
        eprintln!(" Input: {}", input.display());
        if let Some(out) = &config.output_path {
            eprintln!(" Output: {}", out.display());
        }
        eprintln!();
    }

    match &config.output_path {
        Some(output_path) => {
            let output_path = output_path.clone();
            exec_to(&source, &config, &mut std::io::sink())?;
            if verbose {
                eprintln!(
                    "\n {} Compilation successful!",
                    "SUCCESS:".bright_green().bold()
                );
                eprintln!("   Time: {:.3}s", start.elapsed().as_secs_f64());
                eprintln!("   Output: {}", output_path.display());
            }
        }
        None => {
            let stdout = std::io::stdout();
            exec_to(&source, &config, &mut stdout.lock())?;
        }
    }

    Ok(())
}

/// Compile every `*.eva` file under `dir`. Artifacts land next to each source; object and JSON
/// files are written when the config asks for them.
fn cmd_compile_dir(dir: &Path, config: ExecConfig, verbose: bool) -> Result<()> {
    let mut compiled = 0;
    let mut failed = 0;

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "eva") {
            continue;
        }

        debug!(path = %path.display(), "compile");
        let file_config = ExecConfig {
            output_path: Some(path.with_extension("ll")),
            object_path: config.object_path.as_ref().map(|_| path.with_extension("o")),
            json_path: config.json_path.as_ref().map(|_| path.with_extension("json")),
            source_file: path.to_str().map(str::to_string),
            ..config.clone()
        };

        let result =
            read_source(path).and_then(|source| exec_to(&source, &file_config, &mut std::io::sink()));
        match result {
            Ok(_) => {
                compiled += 1;
                if verbose {
                    eprintln!(" {} {}", "OK".bright_green(), path.display());
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!(" {} {}: {}", "FAILED".bright_red(), path.display(), e);
            }
        }
    }

    println!(
        "{} {} compiled, {} failed",
        "Summary:".bold(),
        compiled,
        failed
    );
    if failed > 0 {
        bail!("{} file(s) failed to compile", failed);
    }
    Ok(())
}

fn cmd_validate(input: &Path, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("{}", " Validating Eval source".bright_cyan().bold());
        eprintln!(" Input: {}", input.display());
    }

    let source = read_source(input)?;

    match evalir::parse(&source) {
        Ok(program) => {
            println!("{}", " VALID".bright_green().bold());
            if verbose {
                let forms = program.as_list().map_or(0, |forms| forms.len().saturating_sub(1));
                println!("   Parsed {} top-level form(s)", forms);
            }
            Ok(())
        }
        Err(e) => {
            println!("{}", " INVALID".bright_red().bold());
            println!("\n{}", "Parse Error:".bright_red());
            println!("{}", e);
            Err(anyhow::anyhow!("Validation failed"))
        }
    }
}

fn cmd_debug(input: &Path, verbose: bool) -> Result<()> {
    let source = read_source(input)?;
    let module = evalir::transform_eval_to_ir_with_config(
        &source,
        input.to_str(),
        &CompilerConfig::default(),
    )?;
    print_stats(&module, verbose);
    Ok(())
}

fn print_stats(module: &Module, verbose: bool) {
    println!(
        "{}",
        format!(" Module: {}", module.name).bright_green().bold()
    );
    println!("{}", "=".repeat(60).bright_green());
    if let Some(hash) = module.metadata.source_hash_hex() {
        println!("Source sha256: {}", hash);
    }
    println!("Globals: {}", module.globals.len());
    println!("Strings: {}", module.strings.len());
    println!("Functions: {}", module.functions.len());

    if verbose {
        for global in module.globals.values() {
            println!(
                "    @{}: {} = {}",
                global.name, global.ty, global.initializer
            );
        }
    }

    for function in module.functions.values() {
        let kind = if function.is_external() { "declare" } else { "define" };
        println!(
            "\n  {}",
            format!(" {} @{}: {}", kind, function.name(), function.signature.function_type())
                .bright_yellow()
        );
        if let Some(body) = &function.body {
            println!("     Blocks: {}", body.blocks.len());
            println!("     Instructions: {}", function.instruction_count());
            let calls = body
                .blocks
                .values()
                .flat_map(|block| &block.instructions)
                .filter(|inst| inst.is_call())
                .count();
            println!("     Calls: {}", calls);
            if verbose {
                for block in body.blocks.values() {
                    println!(
                        "       {}: {} instructions",
                        block.name,
                        block.instructions.len()
                    );
                }
            }
        }
    }
}
