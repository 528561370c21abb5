use std::collections::HashMap;
use std::fs;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::error;

use trellis_core::dependency::check_dependencies;
use trellis_core::hooks::SystemHook;
use trellis_core::lifecycle::LifecycleEngine;
use trellis_core::manifest::{validate_manifest, ManifestBuilder, PluginManifest};
use trellis_core::version::{satisfies, SemanticVersion};

/// Trellis: plugin registry and lifecycle engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Work with plugin manifests
    Manifest {
        #[command(subcommand)]
        command: ManifestCommand,
    },
    /// Work with semantic versions and constraints
    Version {
        #[command(subcommand)]
        command: VersionCommand,
    },
    /// Check a candidate manifest's dependencies against a registry
    Check {
        /// Path to the candidate manifest (JSON)
        candidate: String,
        /// Paths to the manifests already in the registry (JSON)
        registry: Vec<String>,
    },
    /// Run an in-process lifecycle walkthrough
    Demo,
}

#[derive(Subcommand, Debug)]
enum ManifestCommand {
    /// Validate a manifest file and report every problem found
    Validate {
        /// Path to the manifest (JSON)
        path: String,
    },
}

#[derive(Subcommand, Debug)]
enum VersionCommand {
    /// Compare two versions by precedence
    Compare {
        left: String,
        right: String,
    },
    /// Test a version against a constraint (`^`, `~`, comparison, exact)
    Matches {
        version: String,
        constraint: String,
    },
}

fn load_manifest(path: &str) -> Option<PluginManifest> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            error!("cannot read '{}': {}", path, e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            error!("'{}' is not a valid manifest: {}", path, e);
            None
        }
    }
}

fn cmd_validate(path: &str) -> ExitCode {
    let Some(manifest) = load_manifest(path) else {
        return ExitCode::FAILURE;
    };
    let report = validate_manifest(&manifest);
    if report.is_valid() {
        println!("{}: manifest '{}' v{} is valid", path, manifest.id, manifest.version);
        ExitCode::SUCCESS
    } else {
        println!("{}: manifest '{}' has {} problem(s):", path, manifest.id, report.errors.len());
        for problem in &report.errors {
            println!("  - {}", problem);
        }
        ExitCode::FAILURE
    }
}

fn cmd_compare(left: &str, right: &str) -> ExitCode {
    let (a, b) = match (SemanticVersion::parse(left), SemanticVersion::parse(right)) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(e), _) | (_, Err(e)) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let symbol = match a.compare(&b) {
        std::cmp::Ordering::Less => "<",
        std::cmp::Ordering::Equal => "=",
        std::cmp::Ordering::Greater => ">",
    };
    println!("{} {} {}", left, symbol, right);
    ExitCode::SUCCESS
}

fn cmd_matches(version: &str, constraint: &str) -> ExitCode {
    if satisfies(version, constraint) {
        println!("{} matches {}", version, constraint);
        ExitCode::SUCCESS
    } else {
        println!("{} does not match {}", version, constraint);
        ExitCode::FAILURE
    }
}

fn cmd_check(candidate: &str, registry_paths: &[String]) -> ExitCode {
    let Some(candidate) = load_manifest(candidate) else {
        return ExitCode::FAILURE;
    };
    let mut registry = HashMap::new();
    for path in registry_paths {
        let Some(manifest) = load_manifest(path) else {
            return ExitCode::FAILURE;
        };
        registry.insert(manifest.id.clone(), manifest);
    }

    let issues = check_dependencies(&candidate, &registry);
    if issues.is_empty() {
        println!("'{}' is installable against {} registered plugin(s)", candidate.id, registry.len());
        ExitCode::SUCCESS
    } else {
        println!("'{}' has {} dependency issue(s):", candidate.id, issues.len());
        for issue in &issues {
            println!("  - {}", issue);
        }
        ExitCode::FAILURE
    }
}

async fn cmd_demo() -> ExitCode {
    let engine = LifecycleEngine::new();

    let billing = ManifestBuilder::new("billing", "Billing", "1.2.0")
        .description("invoicing and payment records")
        .category("finance")
        .author("Trellis Developers")
        .license("Apache-2.0")
        .build();
    let crm = ManifestBuilder::new("crm-sync", "Crm Sync", "1.0.0")
        .description("synchronizes CRM records")
        .category("integrations")
        .author("Trellis Developers")
        .license("Apache-2.0")
        .requires("billing", "^1.0.0")
        .event(SystemHook::TenantCreated.name())
        .build();

    let steps = async {
        engine.publish(billing).await?;
        engine.publish(crm).await?;
        for plugin_id in ["billing", "crm-sync"] {
            let snapshot = engine.install(plugin_id).await?;
            println!("installed '{}' ({} steps):", plugin_id, snapshot.steps.len());
            for step in &snapshot.steps {
                println!("  {}. {} [{:?}]", step.number, step.name, step.state);
            }
            engine.enable(plugin_id).await?;
        }

        engine.enable_for_tenant("crm-sync", "acme").await?;
        println!(
            "'crm-sync' active for {} tenant(s)",
            engine.active_tenant_count("crm-sync").await?
        );

        engine
            .publish_version(
                ManifestBuilder::new("crm-sync", "Crm Sync", "1.3.0")
                    .description("synchronizes CRM records")
                    .category("integrations")
                    .author("Trellis Developers")
                    .license("Apache-2.0")
                    .build(),
            )
            .await?;
        engine.update("crm-sync", "^1.0.0", None).await?;
        println!(
            "'crm-sync' updated to v{}",
            engine.manifest_of("crm-sync").await?.version
        );

        engine.disable_for_tenant("crm-sync", "acme").await?;
        engine.disable("crm-sync").await?;
        engine.uninstall("crm-sync", true).await?;
        println!("'crm-sync' is now {}", engine.state_of("crm-sync").await?);
        Ok::<(), trellis_core::lifecycle::LifecycleError>(())
    };

    match steps.await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("demo failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    match args.command {
        Commands::Manifest { command } => match command {
            ManifestCommand::Validate { path } => cmd_validate(&path),
        },
        Commands::Version { command } => match command {
            VersionCommand::Compare { left, right } => cmd_compare(&left, &right),
            VersionCommand::Matches { version, constraint } => cmd_matches(&version, &constraint),
        },
        Commands::Check { candidate, registry } => cmd_check(&candidate, &registry),
        Commands::Demo => cmd_demo().await,
    }
}
