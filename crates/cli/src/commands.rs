//! Subcommand handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as _};
use hwpgen_client::api::GeneratorApi;
use hwpgen_client::config::ClientConfig;
use hwpgen_client::download::{deliver, ArtifactSink, Delivered};
use hwpgen_client::ocr::OcrApi;
use hwpgen_client::workflow::ConversionWorkflow;
use hwpgen_core::file_size::format_file_size;
use hwpgen_core::job::JobId;
use hwpgen_core::payload::SubmissionPayload;
use hwpgen_core::session::{ConversionDraft, UploadedImage};
use hwpgen_core::template::{
    empty_slots, fill_slot, slots_from_numbers, validate_template_filename,
    MSG_FILL_ALL_QUESTIONS,
};
use tokio_util::sync::CancellationToken;

use crate::render;

/// Clients and settings shared by every command.
pub struct Context {
    config: ClientConfig,
    api: GeneratorApi,
    ocr: OcrApi,
}

impl Context {
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let client = config.http_client()?;
        let api = config.generator_api(client.clone());
        let ocr = config.ocr_api(client);
        Ok(Self { config, api, ocr })
    }

    pub fn sink(&self, out: Option<PathBuf>, link_only: bool) -> ArtifactSink {
        if link_only {
            ArtifactSink::Link
        } else {
            ArtifactSink::SaveToDir(out.unwrap_or_else(|| self.config.output_dir.clone()))
        }
    }

    fn workflow(&self) -> ConversionWorkflow {
        ConversionWorkflow::with_policies(
            Arc::new(self.api.clone()),
            self.config.poll,
            self.config.progress,
        )
    }
}

pub async fn read_text_file(path: &Path) -> anyhow::Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))
}

/// Image -> OCR -> (optional edit) -> HWP.
pub async fn convert(
    ctx: &Context,
    image_path: &Path,
    text_override: Option<String>,
    sink: ArtifactSink,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(image_path)
        .await
        .with_context(|| format!("Failed to read {}", image_path.display()))?;
    let name = image_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let image = UploadedImage::from_bytes(name, bytes)?;
    println!(
        "{} ({}, {})",
        image.name,
        image.size_label,
        image.dimensions_label()
    );

    let recognized = ctx.ocr.recognize(&image).await;
    let mut draft = ConversionDraft::new(&image.name, recognized);
    println!("{}", draft.text());
    println!("수식 {}개", draft.formula_count());

    if let Some(text) = text_override {
        draft = draft.with_text(&text);
        println!("수정된 텍스트: 수식 {}개", draft.formula_count());
    } else if draft.recognized.is_placeholder() {
        bail!("텍스트를 인식하지 못했습니다. --text 또는 --text-file 로 문제를 직접 입력하세요.");
    }

    generate(ctx, &draft.into_payload(), &sink).await
}

pub async fn list_templates(ctx: &Context) -> anyhow::Result<()> {
    let templates = ctx.api.list_templates().await?;
    if templates.is_empty() {
        println!("업로드된 템플릿이 없습니다.");
    }
    for name in templates {
        println!("{name}");
    }
    Ok(())
}

pub async fn upload_template(ctx: &Context, path: &Path) -> anyhow::Result<()> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    validate_template_filename(&filename)?;

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let response = ctx.api.upload_template(&filename, bytes).await?;
    tracing::info!(template = %filename, "Template uploaded");
    println!("{}", response.message);
    Ok(())
}

/// Template + numbered questions -> HWP.
pub async fn create(
    ctx: &Context,
    template: &str,
    questions: &[String],
    sink: ArtifactSink,
) -> anyhow::Result<()> {
    let numbers = ctx.api.template_questions(template).await?.question_numbers;
    let mut slots = slots_from_numbers(&numbers);
    for arg in questions {
        let (number, content) = parse_question(arg)?;
        fill_slot(&mut slots, number, content)?;
    }

    let missing = empty_slots(&slots);
    if !missing.is_empty() {
        let list = missing
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        bail!("{MSG_FILL_ALL_QUESTIONS} ({list})");
    }

    generate(ctx, &SubmissionPayload::template(template, slots), &sink).await
}

pub async fn status(ctx: &Context, job_id: &str) -> anyhow::Result<()> {
    let job_id = JobId::new(job_id)?;
    let response = ctx.api.status(&job_id).await?;
    println!("{}", response.status.as_str());
    if let Some(filename) = response.filename {
        println!("{filename}");
    }
    if let Some(error) = response.error {
        println!("{error}");
    }
    Ok(())
}

pub async fn download(ctx: &Context, filename: &str, sink: ArtifactSink) -> anyhow::Result<()> {
    let delivered = deliver(&ctx.api, filename, &sink).await?;
    print_delivered(&delivered);
    Ok(())
}

/// `N=TEXT` -> `(N, TEXT)`.
fn parse_question(arg: &str) -> anyhow::Result<(u32, &str)> {
    let Some((number, content)) = arg.split_once('=') else {
        bail!("Question must look like NUMBER=TEXT, got '{arg}'");
    };
    let number = number
        .trim()
        .parse()
        .with_context(|| format!("Invalid question number in '{arg}'"))?;
    Ok((number, content))
}

// ---- workflow driver ----

/// Submit, follow the job with a progress bar and deliver the result.
/// Ctrl-C cancels the workflow.
async fn generate(
    ctx: &Context,
    payload: &SubmissionPayload,
    sink: &ArtifactSink,
) -> anyhow::Result<()> {
    let mut workflow = ctx.workflow();
    let interrupt = cancel_on_ctrl_c(workflow.cancellation_token());
    let rendering = CancellationToken::new();
    let bar = tokio::spawn(render::progress_bar(
        workflow.watch_progress(),
        rendering.clone(),
    ));

    let result = workflow.run(payload).await;
    interrupt.abort();
    rendering.cancel();
    bar.await.ok();

    let filename = result?;
    println!("변환 완료: {filename}");
    let delivered = workflow.retrieve(sink).await?;
    print_delivered(&delivered);
    Ok(())
}

fn cancel_on_ctrl_c(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            signal = tokio::signal::ctrl_c() => {
                if signal.is_ok() {
                    tracing::warn!("Interrupted, cancelling conversion");
                    token.cancel();
                }
            }
        }
    })
}

fn print_delivered(delivered: &Delivered) {
    match delivered {
        Delivered::Saved { path, bytes } => {
            println!("{} ({})", path.display(), format_file_size(*bytes as u64));
        }
        Delivered::Link { url } => println!("{url}"),
    }
}
