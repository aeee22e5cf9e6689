//! stalin-install - build and install the Stalin Scheme compiler

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use stalin_installer::{
    install, probe, InstallOptions, InstallProgress, InstallationRequest, PackageInfo,
    ProbeOptions, SystemRunner, Tool, ToolStatus,
};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stalin-install", version, about = "Build, install and smoke-test the Stalin Scheme compiler")]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the compiler from a source tree and install it
    Install {
        /// Extracted Stalin source tree
        #[arg(long, default_value = ".")]
        source: PathBuf,

        /// Installation prefix
        #[arg(long)]
        prefix: PathBuf,

        /// Root shown in the caveats (defaults to the prefix)
        #[arg(long, env = "STALIN_INSTALL_ROOT")]
        root: Option<PathBuf>,

        /// Do not compile and run the test program
        #[arg(long)]
        skip_test: bool,

        /// Do not run the provisioning script
        #[arg(long)]
        skip_provision: bool,

        /// Continue even if required tools are missing
        #[arg(long)]
        allow_missing_tools: bool,

        /// Build program
        #[arg(long = "make", default_value = "make")]
        build_program: String,

        /// Provisioning script, relative to the source tree
        #[arg(long, default_value = "docker-build.sh")]
        provision_script: PathBuf,

        /// Kill any external step that runs longer than this
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check which required tools are installed
    Probe {
        /// Tools to look for (defaults to gcc, docker and make)
        tools: Vec<String>,

        /// Only check presence; do not run --version
        #[arg(long)]
        skip_version: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show package metadata
    Info {
        /// Print the metadata as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Install {
            source,
            prefix,
            root,
            skip_test,
            skip_provision,
            allow_missing_tools,
            build_program,
            provision_script,
            timeout_secs,
            json,
        } => {
            let mut request = InstallationRequest::new(source, prefix);
            if let Some(root) = root {
                request = request.with_install_root(root);
            }
            let options = InstallOptions {
                allow_missing_tools,
                provision_script,
                skip_provision,
                build_program,
                run_smoke_test: !skip_test,
                stage_timeout: timeout_secs.map(Duration::from_secs),
                ..Default::default()
            };
            run_install(&request, &options, json).await
        }
        Commands::Probe {
            tools,
            skip_version,
            json,
        } => {
            let tools = if tools.is_empty() {
                Tool::default_names()
            } else {
                tools
            };
            let options = ProbeOptions {
                skip_version,
                ..Default::default()
            };
            run_probe(&tools, &options, json).await
        }
        Commands::Info { json } => show_info(json),
    }
}

async fn run_install(request: &InstallationRequest, options: &InstallOptions, json: bool) -> Result<()> {
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted; stopping");
            on_interrupt.cancel();
        }
    });

    let runner = SystemRunner::new();
    let result = install(request, options, &runner, &cancel, |progress| {
        if let InstallProgress::StageStarted { .. } | InstallProgress::StageSkipped { .. } = progress {
            eprintln!("==> {}", progress.description());
        }
    })
    .await;

    match result {
        Ok(report) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", report.message);
            }
            Ok(())
        }
        Err(e) => {
            if let Some(stderr) = e.stderr().filter(|s| !s.trim().is_empty()) {
                eprintln!("{}", stderr.trim_end());
            }
            eprintln!("Fix: {}", e.fix_suggestion());
            Err(e).context("installation failed")
        }
    }
}

async fn run_probe(tools: &[String], options: &ProbeOptions, json: bool) -> Result<()> {
    let report = probe(tools, options).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for (name, status) in report.iter() {
            match status {
                ToolStatus::Available { path, version } => {
                    let version = version
                        .as_ref()
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "unknown version".to_string());
                    println!("{name:<8} {version:<16} {}", path.display());
                }
                ToolStatus::Unknown { path, message, .. } => {
                    println!("{name:<8} {:<16} {} ({message})", "?", path.display());
                }
                ToolStatus::Missing => {
                    let hint = Tool::from_executable(name)
                        .map(|tool| tool.install_hint())
                        .unwrap_or("");
                    println!("{name:<8} {:<16} {hint}", "missing");
                }
                _ => println!("{name:<8} {status:?}"),
            }
        }
    }

    let missing = report.missing();
    if !missing.is_empty() {
        let names: Vec<_> = missing.into_iter().collect();
        bail!("missing tools: {}", names.join(", "));
    }
    Ok(())
}

fn show_info(json: bool) -> Result<()> {
    let package = PackageInfo::stalin();
    if json {
        println!("{}", serde_json::to_string_pretty(&package)?);
    } else {
        println!("{} {}", package.name, package.version);
        println!("{}", package.description);
        println!("{}", package.homepage);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_install_args() {
        let cli = Cli::try_parse_from([
            "stalin-install",
            "install",
            "--prefix",
            "/opt/stalin",
            "--skip-test",
            "--timeout-secs",
            "600",
        ])
        .unwrap();
        match cli.command {
            Commands::Install {
                prefix,
                skip_test,
                timeout_secs,
                build_program,
                ..
            } => {
                assert_eq!(prefix, PathBuf::from("/opt/stalin"));
                assert!(skip_test);
                assert_eq!(timeout_secs, Some(600));
                assert_eq!(build_program, "make");
            }
            _ => panic!("expected install"),
        }
    }

    #[test]
    fn test_install_requires_prefix() {
        assert!(Cli::try_parse_from(["stalin-install", "install"]).is_err());
    }
}
