//! Batch mode: caption every image in a directory with bounded concurrency.

use std::path::Path;
use std::time::{Duration, Instant};

use brandcap_core::{BatchItem, BatchRecord, Exporter, ImageDiscovery, ImageSource};
use futures_util::stream::{self, StreamExt};

use super::types::OutputFormat;
use super::{render, write_json, GenerateArgs, GenerateContext};

/// Caption each discovered image, then print, write, and save the results.
pub async fn process_batch(
    ctx: &GenerateContext,
    args: &GenerateArgs,
    dir: &Path,
) -> anyhow::Result<()> {
    let discovery = ImageDiscovery::new(ctx.config.generation.batch_limit).discover(dir);
    if discovery.images.is_empty() {
        anyhow::bail!(
            "No supported images found in {:?}\n\n  Hint: Supported formats are {}.",
            dir,
            brandcap_core::image::SUPPORTED_EXTENSIONS.join(", ")
        );
    }
    tracing::info!("Captioning {} images from {:?}", discovery.images.len(), dir);

    // Analyze once up front; each image reuses the cached outcome, success or failure.
    if let Some(url) = ctx.request.context.website() {
        if ctx.config.scrape.enabled {
            let spinner = render::spinner("Analyzing website...");
            let result = ctx.brandcap.analyze(url).await;
            spinner.finish_and_clear();
            if let Err(e) = result {
                tracing::warn!("Website analysis failed: {e}. {}", e.hint());
            }
        }
    }

    let total = discovery.images.len() as u64;
    let progress = create_progress_bar(total);
    let start_time = Instant::now();
    let parallel = ctx.config.generation.parallel.max(1);

    let progress_ref = &progress;
    let mut outcomes: Vec<_> = stream::iter(discovery.images.iter().enumerate())
        .map(move |(index, image)| {
            let request = ctx
                .request
                .clone()
                .with_image(ImageSource::Path(image.path.clone()));
            let progress = progress_ref;
            async move {
                let result = ctx.brandcap.generate(&request).await;
                progress.inc(1);
                progress.set_message(image.file_name());
                (index, image.file_name(), result)
            }
        })
        .buffer_unordered(parallel)
        .collect()
        .await;
    outcomes.sort_by_key(|(index, _, _)| *index);

    progress.finish_and_clear();

    let mut items = Vec::new();
    let mut records = Vec::with_capacity(outcomes.len());
    for (_, file_name, result) in outcomes {
        match result {
            Ok(generated) => {
                records.push(BatchRecord::Ok {
                    image: file_name.clone(),
                    captions: Box::new(generated.captions.clone()),
                });
                items.push(BatchItem {
                    file_name,
                    captions: generated.captions,
                });
            }
            Err(e) => {
                tracing::error!("Failed: {} - {}", file_name, e);
                records.push(BatchRecord::Failed {
                    image: file_name,
                    error: e.to_string(),
                });
            }
        }
    }

    match args.format {
        OutputFormat::Text => print_items(&items),
        OutputFormat::Json | OutputFormat::Jsonl => write_json(ctx, args, &records, false)?,
    }

    if let Some(export_dir) = args.export_dir(&ctx.config) {
        if items.is_empty() {
            tracing::warn!("No captions generated; nothing to save");
        } else {
            let written = Exporter::new(export_dir).write_batch(&ctx.request.context.business, &items)?;
            render::print_saved(&written);
        }
    }

    let failed = records.len() - items.len();
    print_summary(items.len(), failed, discovery.skipped, start_time.elapsed());

    if items.is_empty() {
        anyhow::bail!("All {failed} images failed");
    }
    Ok(())
}

fn print_items(items: &[BatchItem]) {
    for (i, item) in items.iter().enumerate() {
        println!("IMAGE {}: {}", i + 1, item.file_name);
        println!("{}", "=".repeat(40));
        render::print_caption_set(&item.captions);
    }
}

/// Create a progress bar for batch generation.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-");
    pb.set_style(style);
    pb.set_message("starting...");
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

/// Print a formatted summary table after a batch run.
fn print_summary(succeeded: usize, failed: usize, skipped: usize, elapsed: Duration) {
    let total = succeeded + failed;
    let rate = if elapsed.as_secs_f64() > 0.0 {
        total as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", succeeded);
    if failed > 0 {
        eprintln!("    Failed:       {:>8}", failed);
    }
    if skipped > 0 {
        eprintln!("    Over limit:   {:>8}", skipped);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.2} img/sec", rate);
    eprintln!("  ====================================");
}
