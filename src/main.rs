use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{Generator, generate};
use hashcheck::cli::{Cli, Commands};
use hashcheck::commands::{self, capture::CaptureOptions, verify::VerifyOptions};
use hashcheck::error::{EXIT_FAILURE, HashcheckError};
use hashcheck::output::{self, Verbosity};
use hashcheck::scanner::ScanMode;
use hashcheck::{HashcheckContext, logging};
use std::io;
use std::process;

fn main() {
    match run() {
        Ok(code) => process::exit(code),
        Err(e) => {
            output::error(&format!("{e:#}"));
            process::exit(exit_code(&e));
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    let verbosity = Verbosity::from_flags(cli.quiet, cli.verbose);
    output::set_verbosity(verbosity);
    logging::init(verbosity);

    if let Commands::Completion { shell } = cli.command {
        print_completions(shell, &mut Cli::command());
        return Ok(0);
    }

    let ctx = HashcheckContext::new(cli.config)?;

    match cli.command {
        Commands::Capture {
            root,
            manifest,
            quick,
            strict,
            jobs,
        } => {
            let opts = CaptureOptions {
                mode: if quick { ScanMode::Quick } else { ScanMode::Full },
                strict,
                jobs,
            };
            commands::capture::execute(&ctx, &root, &manifest, opts)?;
            Ok(0)
        }
        Commands::Verify {
            root,
            manifest,
            full,
            strict,
            short,
            fail_on_change,
            jobs,
        } => {
            let opts = VerifyOptions {
                full,
                strict,
                short,
                fail_on_change,
                jobs,
            };
            let outcome = commands::verify::execute(&ctx, &root, &manifest, opts)?;
            Ok(outcome.exit_code())
        }
        Commands::Completion { .. } => Ok(0),
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<HashcheckError>()
        .map_or(EXIT_FAILURE, HashcheckError::exit_code)
}

fn print_completions<G: Generator>(g: G, cmd: &mut clap::Command) {
    generate(g, cmd, cmd.get_name().to_string(), &mut io::stdout());
}
