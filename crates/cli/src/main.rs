//! `hwpgen` -- turn a photographed math problem into an HWP document.
//!
//! Recognizes the problem text through the OCR service, submits it (or a
//! filled-in HWP template) to the document-generation service, follows
//! the job while drawing a progress bar and saves the result.
//!
//! Configuration comes from `HWPGEN_*` environment variables (see
//! [`ClientConfig::from_env`]); a `.env` file is honoured. Set
//! `LOG_FORMAT=json` for JSON logs on stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hwpgen_client::config::ClientConfig;
use hwpgen_client::error::WorkflowError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

/// Photo-to-HWP problem document generator
#[derive(Parser)]
#[command(name = "hwpgen", version, long_about = None)]
struct Cli {
    /// Document-generation service base URL (overrides HWPGEN_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// OCR endpoint URL (overrides HWPGEN_OCR_URL)
    #[arg(long, global = true)]
    ocr_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recognize a problem image and convert it to HWP
    Convert {
        /// PNG or JPEG image of the problem
        image: PathBuf,

        /// Use this text instead of the recognized one
        #[arg(long, conflicts_with = "text_file")]
        text: Option<String>,

        /// Read the replacement text from a file
        #[arg(long)]
        text_file: Option<PathBuf>,

        /// Directory to save the document in (overrides HWPGEN_OUTPUT_DIR)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Print the download link instead of saving the document
        #[arg(long)]
        link_only: bool,
    },

    /// Manage HWP templates
    Templates {
        #[command(subcommand)]
        command: TemplateCommand,
    },

    /// Fill the numbered questions of a template and generate a document
    Create {
        /// Template name as listed by `templates list`
        template: String,

        /// Question content as NUMBER=TEXT; repeat for every slot
        #[arg(long = "question", short = 'q', value_name = "N=TEXT")]
        questions: Vec<String>,

        /// Directory to save the document in (overrides HWPGEN_OUTPUT_DIR)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Query the status of a job once
    Status {
        job_id: String,
    },

    /// Download a generated document by file name
    Download {
        filename: String,

        /// Directory to save the document in (overrides HWPGEN_OUTPUT_DIR)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// List uploaded templates
    List,
    /// Upload an `.hwp` template
    Upload { file: PathBuf },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<WorkflowError>() {
                Some(workflow_error) => eprintln!("{}", workflow_error.user_message()),
                None => eprintln!("{e:#}"),
            }
            tracing::debug!(error = ?e, "Command failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url;
    }
    if let Some(ocr_url) = cli.ocr_url {
        config.ocr_url = ocr_url;
    }

    tracing::debug!(api_url = %config.api_url, ocr_url = %config.ocr_url, "Configuration loaded");
    let ctx = commands::Context::new(config)?;

    match cli.command {
        Command::Convert {
            image,
            text,
            text_file,
            out,
            link_only,
        } => {
            let text = match (text, text_file) {
                (Some(text), _) => Some(text),
                (None, Some(path)) => Some(commands::read_text_file(&path).await?),
                (None, None) => None,
            };
            commands::convert(&ctx, &image, text, ctx.sink(out, link_only)).await
        }
        Command::Templates { command } => match command {
            TemplateCommand::List => commands::list_templates(&ctx).await,
            TemplateCommand::Upload { file } => commands::upload_template(&ctx, &file).await,
        },
        Command::Create {
            template,
            questions,
            out,
        } => commands::create(&ctx, &template, &questions, ctx.sink(out, false)).await,
        Command::Status { job_id } => commands::status(&ctx, &job_id).await,
        Command::Download { filename, out } => {
            commands::download(&ctx, &filename, ctx.sink(out, false)).await
        }
    }
}

/// Logs go to stderr so stdout only carries command output.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "hwpgen=info,hwpgen_client=info".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
