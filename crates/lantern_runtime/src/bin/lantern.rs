//! Lantern CLI entry point.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use lantern_runtime::{ConsoleSink, RustylineEditor, init_logging, write_dump};
use lantern_storage::ProgramStore;
use lantern_vm::{Vm, format_value};
use tracing::info;

/// Game file used when none is given.
const DEFAULT_GAME_FILE: &str = "game.bin";

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    game_file: Option<PathBuf>,
    show_help: bool,
    show_version: bool,
    quiet: bool,
    // Debug flags
    dump: bool,
    trace_vm: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            if let Some(context) = e
                .downcast_ref::<lantern_foundation::Error>()
                .and_then(|err| err.context.as_ref())
            {
                eprint!("{context}");
            }
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    for arg in args.into_iter().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-q" | "--quiet" => config.quiet = true,
            "--dump" => config.dump = true,
            "--trace-vm" => config.trace_vm = true,
            flag if flag.starts_with('-') => {
                return Err(format!("unknown option: {flag}").into());
            }
            path => {
                if config.game_file.is_some() {
                    return Err(
                        format!("unexpected argument: {path} (only one game file may be given)")
                            .into(),
                    );
                }
                config.game_file = Some(PathBuf::from(path));
            }
        }
    }

    Ok(config)
}

fn run(args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(());
    }

    if config.show_version {
        println!("lantern {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logging(config.trace_vm);

    let path = config
        .game_file
        .unwrap_or_else(|| PathBuf::from(DEFAULT_GAME_FILE));
    let bytes =
        fs::read(&path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    let program = ProgramStore::load(&bytes)?;
    info!(path = %path.display(), code = program.code().len(), "loaded game file");

    if config.dump {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        write_dump(&program, &mut out)?;
        out.flush()?;
        return Ok(());
    }

    let console = ConsoleSink::new(RustylineEditor::new()?, io::stdout());
    let mut vm = Vm::new(&program, console);
    let result = vm.run().map_err(|err| {
        let context = err.context.clone().unwrap_or_default();
        err.with_context(context.with_source(path.display().to_string()))
    })?;

    if !config.quiet {
        println!("\nMAIN RETURNED: {}", format_value(&program, &result)?);
    }

    Ok(())
}

fn print_help() {
    println!(
        "\x1b[1mLantern\x1b[0m - Bytecode runner for interactive fiction

\x1b[1mUSAGE:\x1b[0m
    lantern [OPTIONS] [GAMEFILE]

\x1b[1mARGUMENTS:\x1b[0m
    [GAMEFILE]    Compiled game file to run (default: {DEFAULT_GAME_FILE})

\x1b[1mOPTIONS:\x1b[0m
    -h, --help         Print help information
    -V, --version      Print version information
    -q, --quiet        Do not print the value returned by main

\x1b[1mDEBUG OPTIONS:\x1b[0m
    --dump             Print the decoded program tables and bytecode, then exit
    --trace-vm         Enable VM instruction tracing

\x1b[1mENVIRONMENT:\x1b[0m
    RUST_LOG           Log filter (default: warn)

\x1b[1mEXAMPLES:\x1b[0m
    lantern                      Run game.bin
    lantern story.bin            Run story.bin
    lantern --dump story.bin     Inspect story.bin without running it"
    );
}
