//! Deploy adapter - one lifecycle command per invocation.
//!
//! This is the entry point for the `deploy-adapter` binary. It captures the
//! command line and process environment, runs the dispatcher once, and maps
//! the outcome to an exit code.
//!
//! ```text
//! deploy-adapter --name PipelineResource --command create --state state.json
//! deploy-adapter --name PipelineStepResource --command read --inline-state '{"id":"s1"}'
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use deploy_adapter_core::Environment;
use deploy_adapter_resources::registry::UMBRELLA_MODULE;
use deploy_adapter_resources::{Dispatcher, Registry, RunContext};
use deploy_adapter_store::{StateSink, StateSource, StateStore};

const DEFAULT_STATE_FILE: &str = "state.json";

/// Manage one remote deploy resource per invocation.
#[derive(Parser, Debug)]
#[command(name = "deploy-adapter")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Module the resource is registered under.
    #[arg(long, default_value = UMBRELLA_MODULE)]
    module: String,

    /// Resource name (e.g. PipelineResource).
    #[arg(long, required_unless_present = "list_resources")]
    name: Option<String>,

    /// Lifecycle command: create, read, update or delete.
    #[arg(long, required_unless_present = "list_resources")]
    command: Option<String>,

    /// State file, read before and rewritten after the command.
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    state: PathBuf,

    /// Prior state as an inline JSON document instead of a file.
    #[arg(long, conflicts_with = "state")]
    inline_state: Option<String>,

    /// Where to write the new state when using --inline-state
    /// [default: state.json].
    #[arg(long, requires = "inline_state")]
    output: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(long, default_value = "false")]
    debug: bool,

    /// Print the registered resources and exit.
    #[arg(long)]
    list_resources: bool,
}

impl Args {
    /// File mode rewrites the state file with stringified values; inline mode
    /// writes native JSON to `--output`.
    fn store(&self) -> StateStore {
        match &self.inline_state {
            Some(json) => {
                let output = self
                    .output
                    .as_deref()
                    .unwrap_or_else(|| Path::new(DEFAULT_STATE_FILE));
                StateStore::new(StateSource::Inline(json.clone()), StateSink::native(output))
            }
            None => StateStore::new(
                StateSource::File(self.state.clone()),
                StateSink::stringified(&self.state),
            ),
        }
    }

    fn into_context(self, environment: Environment) -> RunContext {
        let store = self.store();
        RunContext {
            environment,
            module: self.module,
            name: self.name.unwrap_or_default(),
            command: self.command.unwrap_or_default(),
            store,
        }
    }
}

/// Capture the process environment, skipping entries that are not UTF-8.
fn capture_environment() -> Environment {
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .collect()
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "warn,deploy_adapter=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_registry(registry: &Registry) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for entry in registry.iter() {
        let commands: Vec<&str> = entry.commands.iter().map(|c| c.as_str()).collect();
        writeln!(out, "{}", entry.qualified_name())?;
        writeln!(out, "  path:     {}", entry.api_path)?;
        writeln!(out, "  mode:     {}", entry.construct.mode())?;
        writeln!(out, "  commands: {}", commands.join(", "))?;
        writeln!(out, "  requires: {}", entry.required_keys.join(", "))?;
        writeln!(out, "  payload:  {}", entry.payload_keys.join(", "))?;
        if !entry.optional_keys.is_empty() {
            writeln!(out, "  optional: {}", entry.optional_keys.join(", "))?;
        }
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.debug);

    let dispatcher = Dispatcher::new(Registry::builtin());

    if args.list_resources {
        print_registry(dispatcher.registry())?;
        return Ok(ExitCode::SUCCESS);
    }

    let context = args.into_context(capture_environment());

    match dispatcher.execute(&context).await {
        Ok(state) => {
            tracing::info!(
                resource = %context.name,
                command = %context.command,
                status = %state.status(),
                "Invocation succeeded"
            );
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(
                resource = %context.name,
                command = %context.command,
                error = %e,
                exit_code = e.exit_code(),
                retriable = e.is_retriable(),
                "Invocation failed"
            );
            Ok(ExitCode::from(e.exit_code()))
        }
    }
}
