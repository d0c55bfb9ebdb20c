use argh::FromArgs;
use std::path::PathBuf;

use loraset::{
    dataset::{DatasetConfig, DatasetPipeline, ItemOutcome},
    imgproc::CanvasSize,
    vlm::{CaptionTask, Captioner, CommandCaptioner, GenerationOptions, SidecarCaptioner},
};

#[derive(FromArgs)]
/// Caption a directory of images and build a LoRA training dataset
struct Args {
    /// source directory containing images
    #[argh(positional)]
    source_dir: PathBuf,

    /// target directory to save processed images and the JSONL file
    #[argh(positional)]
    target_dir: PathBuf,

    /// the trigger word replacing gender terms in captions
    #[argh(positional)]
    trigger_word: String,

    /// task type for the captioning model
    #[argh(option, default = "CaptionTask::default()")]
    task: CaptionTask,

    /// additional text input for the grounding, segmentation and docvqa tasks
    #[argh(option)]
    text_input: Option<String>,

    /// maximum new tokens for generation
    #[argh(option, default = "256")]
    max_new_tokens: usize,

    /// number of beams for beam search
    #[argh(option, default = "3")]
    num_beams: usize,

    /// width of the output images
    #[argh(option, default = "1024")]
    width: u32,

    /// height of the output images
    #[argh(option, default = "1024")]
    height: u32,

    /// program generating a caption per image. Without it captions are read from a .txt file
    /// next to each image
    #[argh(option)]
    captioner_cmd: Option<PathBuf>,

    /// argument passed to the captioner program before the image arguments (repeatable)
    #[argh(option)]
    captioner_arg: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    let config = DatasetConfig {
        trigger_word: args.trigger_word,
        canvas: CanvasSize::new(args.width, args.height)?,
        generation: GenerationOptions {
            task: args.task,
            text_input: args.text_input.filter(|text| !text.is_empty()),
            max_new_tokens: args.max_new_tokens,
            num_beams: args.num_beams,
        },
    };

    // create the captioning backend
    let captioner: Box<dyn Captioner> = match args.captioner_cmd {
        Some(program) => {
            let captioner = CommandCaptioner::new(program)?.with_args(args.captioner_arg);
            log::info!("Captioning with {}", captioner.program().display());
            Box::new(captioner)
        }
        None => {
            log::info!("Reading captions from .txt files next to the images");
            Box::new(SidecarCaptioner::new())
        }
    };

    let mut pipeline = DatasetPipeline::new(config, captioner)?;

    let style = indicatif::ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>4}/{len:4} ({eta})")?
        .progress_chars("##>-");

    // the bar is created on the first report, once the number of images is known
    let mut progress: Option<indicatif::ProgressBar> = None;

    let summary = pipeline.run(&args.source_dir, &args.target_dir, |report| {
        let pb = progress.get_or_insert_with(|| {
            indicatif::ProgressBar::new(report.total as u64).with_style(style.clone())
        });

        let name = report
            .source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        match &report.outcome {
            ItemOutcome::Recorded(_) => {
                pb.println(format!("✓ {}/{}: {name}", report.index, report.total));
            }
            ItemOutcome::Failed { stage, error } => {
                pb.println(format!(
                    "✗ {}/{}: {name} failed while {stage}: {error}",
                    report.index, report.total
                ));
            }
        }

        pb.inc(1);
    })?;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    println!("\nProcessing complete!");
    println!(
        "Successfully processed {}/{} images",
        summary.succeeded, summary.total
    );
    println!("Images saved to: {}", summary.target_dir.display());
    println!("JSONL file saved to: {}", summary.manifest_path.display());

    Ok(())
}
