use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use tracing::{debug, info};

use modfix::cli::{Cli, Command, OutputFormat};
use modfix::config::Config;
use modfix::{Catalog, Customizer, Mode, Outcome, PageRenderer};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > WARN
    let level = match cli_log_level.or(config_log_level).map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", s);
                tracing::Level::WARN
            }
        },
        None => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre!("Failed to initialize tracing: {}", e))?;

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn load_catalog(config: &Config) -> Result<Catalog> {
    match &config.catalog {
        Some(path) => Catalog::load(path).context(format!("Failed to load catalog from {}", path.display())),
        None => Ok(Catalog::builtin()),
    }
}

fn print_fixed(outcome: &Outcome, dry_run: bool) {
    if dry_run {
        let verb = if outcome.changed { "Would fix" } else { "Unchanged" };
        println!("{} {} Module {}: {}", "·".dimmed(), verb, outcome.number, outcome.title);
    } else {
        println!("{} Fixed Module {}: {}", "✅".green(), outcome.number, outcome.title);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let catalog = load_catalog(&config)?;
    info!(modules = catalog.len(), dir = %config.modules_dir.display(), "modfix starting");

    match cli.command {
        Command::Fix {
            module,
            lenient,
            dry_run,
            scope,
        } => {
            let mode = if lenient || !config.strict {
                Mode::Lenient
            } else {
                Mode::Strict
            };
            let summary = Customizer::new(&catalog, &config.anchors)
                .scope(scope.unwrap_or(config.next_link_scope))
                .mode(mode)
                .dry_run(dry_run)
                .run(module, |n| config.page_path(n), |o| print_fixed(o, dry_run))?;

            if !dry_run {
                println!("\n{} All modules fixed successfully! ({} written)", "✅".green(), summary.written());
            }
        }
        Command::Render {
            template,
            module,
            dry_run,
        } => {
            let renderer = PageRenderer::load(&template)
                .context(format!("Failed to load template {}", template.display()))?;
            let summary = renderer.render_all(
                &catalog,
                &config.anchors,
                module,
                dry_run,
                |n| config.page_path(n),
                |o| print_fixed(o, dry_run),
            )?;

            if !dry_run {
                println!("\n{} All modules rendered successfully! ({} written)", "✅".green(), summary.written());
            }
        }
        Command::Check => {
            let summary = Customizer::new(&catalog, &config.anchors)
                .scope(config.next_link_scope)
                .mode(Mode::Lenient)
                .dry_run(true)
                .run(None, |n| config.page_path(n), |_| {})?;

            let mut misses = 0;
            for outcome in &summary.outcomes {
                println!("Module {} ({})", outcome.number, outcome.path.display().to_string().dimmed());
                for report in &outcome.reports {
                    let mark = if report.satisfied {
                        "✓".green()
                    } else {
                        misses += 1;
                        "✗".red()
                    };
                    println!("  {} {:<18} {}", mark, report.step.name(), report.matches);
                }
            }

            if misses > 0 {
                return Err(eyre!("{} anchor(s) did not match as expected", misses));
            }
            println!("{} Catalog and all {} pages check out", "✓".green(), summary.outcomes.len());
        }
        Command::List { format } => match format {
            OutputFormat::Text => {
                for d in catalog.iter() {
                    println!(
                        "{:>2}  {:<30} {:<12} <- {}",
                        d.number,
                        d.title.cyan(),
                        d.theme.yellow(),
                        d.previous_title.dimmed()
                    );
                }
            }
            OutputFormat::Json => {
                let modules: Vec<_> = catalog.iter().collect();
                println!("{}", serde_json::to_string_pretty(&modules)?);
            }
            OutputFormat::Yaml => {
                print!("{}", catalog.to_yaml()?);
            }
        },
    }

    Ok(())
}
