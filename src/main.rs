use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use db_backup_manager::config::{self, Config, StrategyKind};
use db_backup_manager::managers::logging::{self, LoggingConfig};
use db_backup_manager::utils::docker::ManagedContext;
use db_backup_manager::utils::{CommandExecutor, RealExecutor};
use db_backup_manager::{ArchiveStream, BackupService, Scheduler};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Parser)]
#[command(name = "db-backup-manager")]
#[command(about = "Scheduled archive backups for a document datastore", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "backup-config.toml")]
    config: PathBuf,

    /// Emit console logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the daily scheduler until interrupted
    Daemon,

    /// Create a backup now
    Backup,

    /// List archives in the backup directory, newest first
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Restore the datastore from an archive file (destructive)
    Restore {
        /// Path to the archive
        path: PathBuf,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Copy an existing archive out of the backup directory
    Download {
        /// Archive file name
        filename: String,

        /// Destination file or directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Create a fresh backup and copy it out
    DownloadLatest {
        /// Destination file or directory
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Delete archives older than the retention window
    Prune,

    /// Validate configuration file
    Validate,

    /// Check that the dump/restore tools (and container) are reachable
    CheckTools,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load_config(&cli.config)?;

    // Short-lived diagnostic commands only log to the console
    let _log_guard = match cli.command {
        Commands::Validate | Commands::CheckTools => {
            logging::init_console_logging();
            None
        }
        _ => {
            let logging_config = LoggingConfig::from_config(
                &config.global.log_directory,
                &config.global.log_level,
                config.global.log_max_files,
            )
            .with_json_console(cli.json_logs);
            Some(logging::init_logging(&logging_config)?)
        }
    };

    let executor: Arc<dyn CommandExecutor> = Arc::new(RealExecutor::new());
    let service = Arc::new(BackupService::from_config(&config, executor.clone()));

    match cli.command {
        Commands::Daemon => {
            if !config.schedule.enabled {
                anyhow::bail!("Scheduling is disabled in {:?}", cli.config);
            }

            let scheduler = Scheduler::from_config(service, &config.schedule)?;
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            let handle = scheduler.spawn(shutdown_rx);

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            tracing::info!("Shutdown requested");
            let _ = shutdown_tx.send(true);
            handle.await.context("Scheduler task failed")?;
        }

        Commands::Backup => {
            println!("Creating backup in {:?}...", service.backup_dir());
            let path = service.create_manual_backup().await?;
            println!("✓ Backup saved to {}", path.display());
        }

        Commands::List { json } => {
            let entries = service.list_backup_entries().await?;

            if json {
                let names: Vec<&str> = entries.iter().map(|e| e.file_name.as_str()).collect();
                println!("{}", serde_json::json!({ "backups": names }));
            } else if entries.is_empty() {
                println!("No backups found in {:?}", service.backup_dir());
            } else {
                println!("Backups in {:?}:", service.backup_dir());
                for entry in &entries {
                    println!(
                        "  {}  {:>12}  {}",
                        entry.created_at().format("%Y-%m-%d %H:%M:%S"),
                        format_size(entry.size),
                        entry.file_name
                    );
                }
                println!("\nTotal: {} archive(s)", entries.len());
            }
        }

        Commands::Restore { path, yes } => {
            use dialoguer::Confirm;

            println!("=== Restore from {} ===\n", path.display());
            println!("Existing collections will be dropped and replaced!");

            if !yes {
                let confirm = Confirm::new()
                    .with_prompt("Do you want to proceed with the restore?")
                    .default(false)
                    .interact()?;

                if !confirm {
                    println!("Restore cancelled.");
                    return Ok(());
                }
            }

            service.restore_backup(&path).await?;
            println!("\n✓ Restore completed successfully!");
        }

        Commands::Download { filename, output } => {
            let stream = service.open_archive(&filename).await?;
            let written = save_stream(stream, &output).await?;
            println!("✓ Archive written to {}", written.display());
        }

        Commands::DownloadLatest { output } => {
            let stream = service.download_latest().await?;
            let written = save_stream(stream, &output).await?;
            println!("✓ Fresh archive written to {}", written.display());
        }

        Commands::Prune => {
            let report = service.prune_now().await?;
            println!(
                "Retention {} day(s): deleted {}, kept {}",
                service.retention().window.as_secs() / 86_400,
                report.deleted.len(),
                report.kept
            );
            for warning in &report.warnings {
                eprintln!("⚠️  {}: {}", warning.path.display(), warning.message);
            }
        }

        Commands::Validate => {
            println!("Configuration is valid!");
            println!("Backup directory: {}", config::backup_directory(&config.global).display());
            println!("Retention: {} day(s)", config.global.retention_days);
            println!("Strategy: {}", config.database.strategy);
            if config.schedule.enabled {
                println!("Schedule: daily at {}", config.schedule.daily_at);
            } else {
                println!("Schedule: disabled");
            }
        }

        Commands::CheckTools => {
            if !check_tools(&config, executor.as_ref()).await {
                anyhow::bail!("Required tools are missing");
            }
        }
    }

    Ok(())
}

/// Copy an archive stream to `output`; a directory receives the archive's own name
async fn save_stream(mut stream: ArchiveStream, output: &Path) -> Result<PathBuf> {
    let target = if output.is_dir() {
        output.join(&stream.file_name)
    } else {
        output.to_path_buf()
    };

    // Creating the target truncates it, so it must not be the source archive
    if let (Ok(source), Ok(existing)) = (
        tokio::fs::canonicalize(&stream.path).await,
        tokio::fs::canonicalize(&target).await,
    ) {
        if source == existing {
            anyhow::bail!(
                "Output {} is the archive itself; choose another destination",
                target.display()
            );
        }
    }

    let mut file = tokio::fs::File::create(&target)
        .await
        .with_context(|| format!("Failed to create {:?}", target))?;
    tokio::io::copy(&mut stream.reader, &mut file)
        .await
        .with_context(|| format!("Failed to write {:?}", target))?;

    Ok(target)
}

async fn check_tools(config: &Config, executor: &dyn CommandExecutor) -> bool {
    let mut ok = true;

    match config.database.strategy {
        StrategyKind::Direct => {
            for program in [&config.tools.dump_program, &config.tools.restore_program] {
                match which::which(program) {
                    Ok(path) => println!("✓ {} found at {}", program, path.display()),
                    Err(_) => {
                        println!("✗ {} not found in PATH", program);
                        ok = false;
                    }
                }
            }
        }
        StrategyKind::Containerized => {
            let runtime = &config.tools.container_runtime;
            match which::which(runtime) {
                Ok(path) => println!("✓ {} found at {}", runtime, path.display()),
                Err(_) => {
                    println!("✗ {} not found in PATH", runtime);
                    return false;
                }
            }

            let container = std::env::var(config::DB_CONTAINER_ENV)
                .ok()
                .filter(|c| !c.trim().is_empty())
                .or_else(|| config.database.container.clone());

            match container {
                Some(container) => {
                    let ctx = ManagedContext::new(runtime.clone(), container.clone());
                    match ctx.is_running(executor, Some(Duration::from_secs(30))).await {
                        Ok(true) => println!("✓ Container '{}' is running", container),
                        Ok(false) => {
                            println!("✗ Container '{}' is not running", container);
                            ok = false;
                        }
                        Err(e) => {
                            println!("✗ Could not inspect container '{}': {}", container, e);
                            ok = false;
                        }
                    }
                }
                None => {
                    println!("✗ No container configured (set database.container or {})", config::DB_CONTAINER_ENV);
                    ok = false;
                }
            }
        }
    }

    ok
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}
