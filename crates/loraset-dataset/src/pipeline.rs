use std::{
    fmt,
    path::{Path, PathBuf},
};

use loraset_imgproc::{normalize_image, read_image_rgb8, CanvasSize};
use loraset_text::CaptionSanitizer;
use loraset_vlm::{build_prompt, clean_generated_text, CaptionInput, Captioner, GenerationOptions};

use crate::{
    error::DatasetError,
    manifest::{write_manifest, MANIFEST_FILE_NAME},
    record::DatasetRecord,
    source::list_source_images,
};

/// Configuration of a dataset build.
#[derive(Debug, Clone)]
pub struct DatasetConfig {
    /// The word substituted for gendered nouns and pronouns in captions.
    pub trigger_word: String,
    /// The size every training image is padded to.
    pub canvas: CanvasSize,
    /// The captioning task and generation bounds.
    pub generation: GenerationOptions,
}

impl DatasetConfig {
    /// Create a configuration with default canvas and generation options.
    pub fn new(trigger_word: impl Into<String>) -> Self {
        Self {
            trigger_word: trigger_word.into(),
            canvas: CanvasSize::default(),
            generation: GenerationOptions::default(),
        }
    }
}

/// The processing stages of a single image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStage {
    /// Normalizing the image into the target directory.
    Copying,
    /// Generating the caption.
    Captioning,
    /// Rewriting the caption around the trigger word.
    Sanitizing,
    /// Appending the record and rewriting the manifest.
    Recording,
}

impl fmt::Display for ItemStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ItemStage::Copying => "copying",
            ItemStage::Captioning => "captioning",
            ItemStage::Sanitizing => "sanitizing",
            ItemStage::Recording => "recording",
        };
        f.write_str(name)
    }
}

/// How processing a single image ended.
#[derive(Debug)]
pub enum ItemOutcome {
    /// The image made it into the manifest.
    Recorded(DatasetRecord),
    /// The image was skipped.
    Failed {
        /// The stage that failed.
        stage: ItemStage,
        /// The cause of the failure.
        error: DatasetError,
    },
}

impl ItemOutcome {
    /// Whether the image made it into the manifest.
    pub fn is_recorded(&self) -> bool {
        matches!(self, ItemOutcome::Recorded(_))
    }
}

/// Progress report emitted after every image.
#[derive(Debug)]
pub struct ItemReport<'a> {
    /// 1-based position of the image in the sorted source list.
    pub index: usize,
    /// Number of source images.
    pub total: usize,
    /// The source image.
    pub source: &'a Path,
    /// The result of processing the image.
    pub outcome: ItemOutcome,
}

/// Totals of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of source images found.
    pub total: usize,
    /// Number of images recorded in the manifest.
    pub succeeded: usize,
    /// The directory holding the canonical images.
    pub target_dir: PathBuf,
    /// The manifest file.
    pub manifest_path: PathBuf,
}

impl RunSummary {
    /// Number of images that were skipped.
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }
}

/// State owned by a running pipeline: the captioner and the records accumulated so far.
pub struct PipelineContext<C: Captioner> {
    captioner: C,
    records: Vec<DatasetRecord>,
}

impl<C: Captioner> PipelineContext<C> {
    /// Create an empty context around a captioner.
    pub fn new(captioner: C) -> Self {
        Self::with_records(captioner, Vec::new())
    }

    /// Create a context seeded with records, e.g. the manifest of an earlier run.
    ///
    /// The seeded records are written ahead of the new ones.
    pub fn with_records(captioner: C, records: Vec<DatasetRecord>) -> Self {
        Self { captioner, records }
    }

    /// The records accumulated so far, in manifest order.
    pub fn records(&self) -> &[DatasetRecord] {
        &self.records
    }

    /// Append a record, warning when an identical one is already present.
    ///
    /// Duplicates are kept. Returns whether the record was a duplicate.
    fn push_record(&mut self, record: DatasetRecord, source: &Path) -> bool {
        let duplicate = self.records.contains(&record);
        if duplicate {
            log::warn!("Entry for image {} already exists", display_name(source));
        }
        self.records.push(record);
        duplicate
    }
}

struct ItemFailure {
    stage: ItemStage,
    error: DatasetError,
}

trait AtStage<T> {
    fn at(self, stage: ItemStage) -> Result<T, ItemFailure>;
}

impl<T, E: Into<DatasetError>> AtStage<T> for Result<T, E> {
    fn at(self, stage: ItemStage) -> Result<T, ItemFailure> {
        self.map_err(|error| ItemFailure {
            stage,
            error: error.into(),
        })
    }
}

/// Builds a captioned dataset from a directory of images.
///
/// Images are processed one at a time in sorted order. The i-th image (1-based) is normalized to
/// `{i}.png` in the target directory, captioned, sanitized and appended to the manifest, which
/// is rewritten in full after every recorded image. A failing image is reported and skipped,
/// it never stops the run.
///
/// # Example
///
/// ```no_run
/// use loraset_dataset::{DatasetConfig, DatasetPipeline};
/// use loraset_vlm::SidecarCaptioner;
///
/// let mut pipeline = DatasetPipeline::new(DatasetConfig::new("sks"), SidecarCaptioner::new())?;
/// let summary = pipeline.run("raw", "dataset", |report| {
///     println!("{}/{} {}", report.index, report.total, report.source.display());
/// })?;
/// println!("{}/{} images recorded", summary.succeeded, summary.total);
/// # Ok::<(), loraset_dataset::DatasetError>(())
/// ```
pub struct DatasetPipeline<C: Captioner> {
    config: DatasetConfig,
    prompt: String,
    sanitizer: CaptionSanitizer,
    context: PipelineContext<C>,
}

impl<C: Captioner> DatasetPipeline<C> {
    /// Create a new pipeline.
    ///
    /// Fails when the trimmed trigger word is empty or when the configured task does not accept
    /// the configured text input.
    ///
    /// # Arguments
    ///
    /// * `config` - The dataset configuration.
    /// * `captioner` - The captioning backend.
    pub fn new(config: DatasetConfig, captioner: C) -> Result<Self, DatasetError> {
        Self::with_context(config, PipelineContext::new(captioner))
    }

    /// Create a new pipeline around an existing context.
    ///
    /// Records already held by the context stay at the front of the manifest.
    pub fn with_context(
        mut config: DatasetConfig,
        context: PipelineContext<C>,
    ) -> Result<Self, DatasetError> {
        let trigger_word = config.trigger_word.trim();
        if trigger_word.is_empty() {
            return Err(DatasetError::EmptyTriggerWord);
        }
        config.trigger_word = trigger_word.to_string();

        let prompt = build_prompt(
            config.generation.task,
            config.generation.text_input.as_deref(),
        )?;

        Ok(Self {
            sanitizer: CaptionSanitizer::new(config.trigger_word.clone()),
            prompt,
            config,
            context,
        })
    }

    /// The configuration, with the trigger word trimmed.
    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// The prompt sent to the captioner for every image.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The records accumulated by the context, in manifest order.
    pub fn records(&self) -> &[DatasetRecord] {
        self.context.records()
    }

    /// Process every image of `source_dir` into `target_dir`.
    ///
    /// The manifest is rewritten from the records held by the context, so records of earlier
    /// runs of the same pipeline are kept in front of the new ones.
    ///
    /// # Arguments
    ///
    /// * `source_dir` - The directory holding the source images.
    /// * `target_dir` - The directory receiving the canonical images and the manifest; created
    ///   when missing.
    /// * `on_item` - Called after every image with its outcome.
    ///
    /// # Returns
    ///
    /// The run totals. Fails without touching the target directory when the source directory is
    /// missing or holds no supported image.
    pub fn run(
        &mut self,
        source_dir: impl AsRef<Path>,
        target_dir: impl AsRef<Path>,
        mut on_item: impl FnMut(&ItemReport),
    ) -> Result<RunSummary, DatasetError> {
        let (source_dir, target_dir) = (source_dir.as_ref(), target_dir.as_ref());

        if !source_dir.is_dir() {
            return Err(DatasetError::SourceDirNotFound(source_dir.to_path_buf()));
        }

        log::info!("Scanning for images in {}", source_dir.display());
        let images = list_source_images(source_dir)?;
        if images.is_empty() {
            return Err(DatasetError::NoImagesFound(source_dir.to_path_buf()));
        }

        let total = images.len();
        log::info!("Found {total} image files");
        log::info!("Using task: {}", self.config.generation.task);
        log::info!("Using trigger word: {}", self.config.trigger_word);
        if let Some(text_input) = &self.config.generation.text_input {
            log::info!("Using text input: {text_input}");
        }

        std::fs::create_dir_all(target_dir).map_err(|source| DatasetError::FileError {
            path: target_dir.to_path_buf(),
            source,
        })?;

        let manifest_path = target_dir.join(MANIFEST_FILE_NAME);
        write_manifest(&manifest_path, self.context.records())?;

        let mut succeeded = 0;

        for (i, source) in images.iter().enumerate() {
            let index = i + 1;
            log::debug!("Processing {index}/{total}: {}", display_name(source));

            let outcome = match self.process_item(index, source, target_dir, &manifest_path) {
                Ok(record) => {
                    succeeded += 1;
                    log::debug!("Processed {}", display_name(source));
                    ItemOutcome::Recorded(record)
                }
                Err(ItemFailure { stage, error }) => {
                    log::warn!("Failed {stage} {}: {error}", display_name(source));
                    ItemOutcome::Failed { stage, error }
                }
            };

            on_item(&ItemReport {
                index,
                total,
                source,
                outcome,
            });
        }

        log::info!("Successfully processed {succeeded}/{total} images");

        Ok(RunSummary {
            total,
            succeeded,
            target_dir: target_dir.to_path_buf(),
            manifest_path,
        })
    }

    fn process_item(
        &mut self,
        index: usize,
        source: &Path,
        target_dir: &Path,
        manifest_path: &Path,
    ) -> Result<DatasetRecord, ItemFailure> {
        log::debug!("[{index}] {}", ItemStage::Copying);
        let canonical = normalize_image(
            source,
            target_dir.join(format!("{index}.png")),
            self.config.canvas,
        )
        .at(ItemStage::Copying)?;

        log::debug!("[{index}] {}", ItemStage::Captioning);
        let image = read_image_rgb8(source).at(ItemStage::Captioning)?;
        let input = CaptionInput {
            path: source,
            image: &image,
        };
        let raw = self
            .context
            .captioner
            .generate(&input, &self.prompt, &self.config.generation)
            .at(ItemStage::Captioning)?;

        let caption = clean_generated_text(&raw, self.config.generation.task);
        if caption.is_empty() {
            return Err(ItemFailure {
                stage: ItemStage::Captioning,
                error: DatasetError::EmptyCaption(source.to_path_buf()),
            });
        }
        log::debug!("[{index}] raw caption: {caption}");

        log::debug!("[{index}] {}", ItemStage::Sanitizing);
        let caption = self.sanitizer.sanitize(&caption);

        log::debug!("[{index}] {}", ItemStage::Recording);
        let record = DatasetRecord::new(canonical.to_string_lossy(), caption);
        self.context.push_record(record.clone(), source);

        if let Err(error) = write_manifest(manifest_path, self.context.records()) {
            // keep the in-memory list in step with what was counted
            self.context.records.pop();
            return Err(ItemFailure {
                stage: ItemStage::Recording,
                error,
            });
        }

        Ok(record)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use loraset_vlm::{CaptionError, CaptionTask};

    struct FixedCaptioner(&'static str);

    impl Captioner for FixedCaptioner {
        fn generate(
            &mut self,
            _input: &CaptionInput<'_>,
            _prompt: &str,
            _options: &GenerationOptions,
        ) -> Result<String, CaptionError> {
            Ok(self.0.to_string())
        }
    }

    fn write_rgb(path: &Path, width: u32, height: u32) {
        RgbImage::from_pixel(width, height, Rgb([90, 60, 30]))
            .save(path)
            .expect("failed to write fixture");
    }

    fn small_config(trigger_word: &str) -> DatasetConfig {
        DatasetConfig {
            canvas: CanvasSize::new(32, 32).expect("valid canvas"),
            ..DatasetConfig::new(trigger_word)
        }
    }

    #[test]
    fn trigger_word_is_trimmed() -> Result<(), DatasetError> {
        let pipeline = DatasetPipeline::new(DatasetConfig::new("  sks \n"), FixedCaptioner(""))?;
        assert_eq!(pipeline.config().trigger_word, "sks");
        assert_eq!(pipeline.prompt(), "<MORE_DETAILED_CAPTION>");
        Ok(())
    }

    #[test]
    fn empty_trigger_word() {
        let res = DatasetPipeline::new(DatasetConfig::new("   "), FixedCaptioner(""));
        assert!(matches!(res, Err(DatasetError::EmptyTriggerWord)));
    }

    #[test]
    fn text_input_for_plain_caption_task() {
        let mut config = DatasetConfig::new("sks");
        config.generation.task = CaptionTask::Caption;
        config.generation.text_input = Some("the hat".to_string());

        let res = DatasetPipeline::new(config, FixedCaptioner(""));
        assert!(matches!(
            res,
            Err(DatasetError::Caption(CaptionError::TextInputNotSupported(
                CaptionTask::Caption
            )))
        ));
    }

    #[test]
    fn missing_source_dir() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let mut pipeline = DatasetPipeline::new(small_config("sks"), FixedCaptioner("a"))?;

        let res = pipeline.run(tmp_dir.path().join("nope"), tmp_dir.path().join("out"), |_| {});
        assert!(matches!(res, Err(DatasetError::SourceDirNotFound(_))));
        assert!(!tmp_dir.path().join("out").exists());
        Ok(())
    }

    #[test]
    fn echoed_prompt_is_stripped() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let src = tmp_dir.path().join("src");
        std::fs::create_dir(&src)?;
        write_rgb(&src.join("a.png"), 8, 8);

        let mut pipeline = DatasetPipeline::new(
            small_config("sks"),
            FixedCaptioner("<MORE_DETAILED_CAPTION> A girl.<|endoftext|>"),
        )?;
        pipeline.run(&src, tmp_dir.path().join("out"), |_| {})?;

        assert_eq!(pipeline.records().len(), 1);
        assert_eq!(pipeline.records()[0].caption, "A sks.");
        Ok(())
    }

    #[test]
    fn empty_caption_fails_item() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempfile::tempdir()?;
        let src = tmp_dir.path().join("src");
        std::fs::create_dir(&src)?;
        write_rgb(&src.join("a.png"), 8, 8);

        let mut pipeline =
            DatasetPipeline::new(small_config("sks"), FixedCaptioner(" <|endoftext|> "))?;

        let mut stages = Vec::new();
        let summary = pipeline.run(&src, tmp_dir.path().join("out"), |report| {
            if let ItemOutcome::Failed { stage, .. } = &report.outcome {
                stages.push(*stage);
            }
        })?;

        assert_eq!(stages, vec![ItemStage::Captioning]);
        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.failed(), 1);
        // the image itself was still normalized before captioning
        assert!(tmp_dir.path().join("out").join("1.png").exists());
        assert_eq!(std::fs::read_to_string(&summary.manifest_path)?, "");
        Ok(())
    }

    #[test]
    fn duplicates_are_kept() {
        let mut context = PipelineContext::new(FixedCaptioner(""));
        let source = Path::new("raw/portrait.jpg");
        assert!(!context.push_record(DatasetRecord::new("1.png", "a"), source));
        assert!(context.push_record(DatasetRecord::new("1.png", "a"), source));
        assert!(!context.push_record(DatasetRecord::new("1.png", "b"), source));
        assert_eq!(context.records().len(), 3);
    }

    #[test]
    fn seeded_context_keeps_its_records() -> Result<(), DatasetError> {
        let seeded = vec![DatasetRecord::new("old/1.png", "a sks")];
        let context = PipelineContext::with_records(FixedCaptioner(""), seeded.clone());
        let pipeline = DatasetPipeline::with_context(DatasetConfig::new("sks"), context)?;
        assert_eq!(pipeline.records(), seeded.as_slice());
        Ok(())
    }

    #[test]
    fn stage_names() {
        assert_eq!(ItemStage::Copying.to_string(), "copying");
        assert_eq!(ItemStage::Recording.to_string(), "recording");
    }
}
