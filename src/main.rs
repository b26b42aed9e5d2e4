use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use longform::{Config, GeminiClient, PromptTemplate, Shell};

#[derive(Parser)]
#[command(name = "longform")]
#[command(about = "Generate long-form content from a brief and export it to Word")]
struct Cli {
    /// Secrets file holding GEMINI_API_KEY (default: secrets.toml)
    #[arg(long, global = true)]
    secrets: Option<PathBuf>,

    /// Write logs to this file (the interactive form logs nowhere otherwise)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the interactive form (the default)
    Run {
        /// Directory downloads are saved to
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Print the prompt template briefs are wrapped in
    Prompt,

    /// Generate once from a brief and print the result
    Generate {
        /// File containing the brief (default: read stdin)
        #[arg(long)]
        brief_file: Option<PathBuf>,

        /// Also export the result as a Word document at this path
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Run {
        output_dir: PathBuf::from("."),
    });
    init_logging(
        cli.log_file.as_deref(),
        matches!(command, Command::Run { .. }),
    )?;

    let secrets = cli.secrets.as_deref();
    match command {
        Command::Prompt => {
            let template = Config::load_template(secrets).unwrap_or_else(|e| {
                let error = format!("{:#}", anyhow::Error::from(e));
                tracing::warn!(%error, "configured template unusable, showing the bundled one");
                PromptTemplate::default()
            });
            print!("{}", template.as_str());
        }
        Command::Run { output_dir } => {
            let shell = match Config::load(secrets) {
                Ok(config) => Shell::new(config.template.clone(), GeminiClient::new(&config)),
                Err(e) => {
                    let message = format!("{:#}", anyhow::Error::from(e));
                    tracing::error!(%message, "configuration failed");
                    Shell::halted(message)
                }
            };
            longform::shell::tui::run(shell, output_dir).await?;
        }
        Command::Generate { brief_file, output } => {
            let config = Config::load(secrets).context("configuration failed")?;
            let brief = match &brief_file {
                Some(path) => std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read brief from '{}'", path.display()))?,
                None => std::io::read_to_string(std::io::stdin()).context("failed to read brief")?,
            };
            generate_once(&config, &brief, output.as_deref()).await?;
        }
    }

    Ok(())
}

/// Run one generation through the shell and report the outcome on stdout.
async fn generate_once(config: &Config, brief: &str, output: Option<&Path>) -> anyhow::Result<()> {
    if brief.is_empty() {
        tracing::info!("brief is empty, nothing to generate");
        return Ok(());
    }

    let mut shell = Shell::new(config.template.clone(), GeminiClient::new(config));
    shell.generate(brief).await;

    let Some(content) = shell.session().content() else {
        let reason = shell
            .session()
            .notice()
            .map(|n| n.text().to_string())
            .unwrap_or_default();
        bail!("{reason}");
    };
    println!("{content}");

    if let Some(path) = output {
        let Some(download) = shell.download() else {
            let reason = shell
                .session()
                .notice()
                .map(|n| n.text().to_string())
                .unwrap_or_default();
            bail!("{reason}");
        };
        std::fs::write(path, &download.bytes)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        tracing::info!(path = %path.display(), "saved document");
    }

    Ok(())
}

fn init_logging(log_file: Option<&Path>, interactive: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file '{}'", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        // The form owns the terminal; logging to it would garble the screen
        None if interactive => {}
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}
