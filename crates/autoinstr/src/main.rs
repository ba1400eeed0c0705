mod cli;
mod plugins;

use std::io;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use autoinstr_core::bootstrap::{
    self, BootstrapAction, BootstrapPlanner, CommandInstaller, LibraryRegistry,
};
use autoinstr_core::environment::{CommandEnvironment, EnvironmentInspector, StaticEnvironment};
use autoinstr_core::plugin_system::conflict::CommandConsistencyCheck;
use autoinstr_core::plugin_system::PluginGroup;
use autoinstr_core::{initialize, AutoInstrumentConfig, InitializeOptions, KernelError, PluginManager};
use clap::Parser;
use env_logger::Env;
use log::LevelFilter;

use cli::{CliArgs, Commands, PluginCommand};

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

/// Snapshot file when given, otherwise the configured list command.
fn inspect_environment(
    snapshot: Option<&Path>,
    config: &AutoInstrumentConfig,
) -> Result<Arc<dyn EnvironmentInspector>, KernelError> {
    let environment: Arc<dyn EnvironmentInspector> = match snapshot {
        Some(path) => Arc::new(StaticEnvironment::load(path)?),
        None => Arc::new(CommandEnvironment::capture(&config.bootstrap.list_command)?),
    };
    Ok(environment)
}

fn run_bootstrap(
    config: &AutoInstrumentConfig,
    action: BootstrapAction,
    registry_path: Option<&Path>,
    snapshot: Option<&Path>,
) -> Result<(), KernelError> {
    if action == BootstrapAction::Requirements {
        // stdout carries only the plan
        log::set_max_level(LevelFilter::Error);
    }

    let registry_path = registry_path.or(config.bootstrap.registry.as_deref());
    let registry = LibraryRegistry::load_or_builtin(registry_path)?;
    let environment = inspect_environment(snapshot, config)?;
    let plan = BootstrapPlanner::new(environment.as_ref()).plan(&registry);

    match action {
        BootstrapAction::Requirements => {
            bootstrap::run_requirements(&plan, &mut io::stdout().lock())?;
        }
        BootstrapAction::Install => {
            let installer = CommandInstaller::new(config.bootstrap.install_command.clone())?;
            let check = CommandConsistencyCheck::new(config.bootstrap.check_command.clone());
            bootstrap::run_install(&plan, &installer, &check, environment.as_ref())?;
        }
    }
    Ok(())
}

fn run_activate(config: &AutoInstrumentConfig, snapshot: Option<&Path>) -> Result<(), KernelError> {
    let environment = inspect_environment(snapshot, config)?;
    let mut manager = PluginManager::new(plugins::registry()?, environment);
    let settings = config.activation_settings();

    // Failures must reach the exit code here, so nothing is swallowed.
    let options = InitializeOptions { swallow_errors: false };
    if let Some(report) = initialize(&mut manager, &settings, options)? {
        println!("Activation report:");
        print!("{}", report);
    }
    Ok(())
}

fn list_plugins() -> Result<(), KernelError> {
    let registry = plugins::registry()?;
    println!("Registered plugins:");
    for group in PluginGroup::ALL {
        let names = registry.names(group);
        if names.is_empty() {
            println!("  {}: (none)", group);
        } else {
            println!("  {}: {}", group, names.join(", "));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    let config = match AutoInstrumentConfig::resolve(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        Commands::Bootstrap { action, registry, environment } => {
            run_bootstrap(&config, action, registry.as_deref(), environment.as_deref())
        }
        Commands::Activate { environment } => run_activate(&config, environment.as_deref()),
        Commands::Plugin { command: PluginCommand::List {} } => list_plugins(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
