use std::{fmt, str::FromStr};

use crate::error::CaptionError;

/// End-of-text marker some decoders leave in the generated text.
pub const END_OF_TEXT: &str = "<|endoftext|>";

/// The captioning tasks understood by Florence-2 style prompt-token models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptionTask {
    /// Object detection with region labels.
    RegionCaption,
    /// Dense region captioning.
    DenseRegionCaption,
    /// Region proposals.
    RegionProposal,
    /// Short caption.
    Caption,
    /// Detailed caption.
    DetailedCaption,
    /// Paragraph-length caption.
    #[default]
    MoreDetailedCaption,
    /// Ground the phrases of a given caption.
    CaptionToPhraseGrounding,
    /// Segment the object a given expression refers to.
    ReferringExpressionSegmentation,
    /// Optical character recognition.
    Ocr,
    /// Optical character recognition with regions.
    OcrWithRegion,
    /// Document visual question answering.
    DocVqa,
    /// Comma separated tags.
    PromptGenTags,
    /// Mixed natural language and tag caption.
    PromptGenMixedCaption,
    /// Image composition analysis.
    PromptGenAnalyze,
    /// Extended mixed caption.
    PromptGenMixedCaptionPlus,
}

impl CaptionTask {
    /// Every task, in the order they are listed on the command line.
    pub const ALL: [CaptionTask; 15] = [
        CaptionTask::RegionCaption,
        CaptionTask::DenseRegionCaption,
        CaptionTask::RegionProposal,
        CaptionTask::Caption,
        CaptionTask::DetailedCaption,
        CaptionTask::MoreDetailedCaption,
        CaptionTask::CaptionToPhraseGrounding,
        CaptionTask::ReferringExpressionSegmentation,
        CaptionTask::Ocr,
        CaptionTask::OcrWithRegion,
        CaptionTask::DocVqa,
        CaptionTask::PromptGenTags,
        CaptionTask::PromptGenMixedCaption,
        CaptionTask::PromptGenAnalyze,
        CaptionTask::PromptGenMixedCaptionPlus,
    ];

    /// The snake_case name of the task.
    pub fn name(&self) -> &'static str {
        match self {
            CaptionTask::RegionCaption => "region_caption",
            CaptionTask::DenseRegionCaption => "dense_region_caption",
            CaptionTask::RegionProposal => "region_proposal",
            CaptionTask::Caption => "caption",
            CaptionTask::DetailedCaption => "detailed_caption",
            CaptionTask::MoreDetailedCaption => "more_detailed_caption",
            CaptionTask::CaptionToPhraseGrounding => "caption_to_phrase_grounding",
            CaptionTask::ReferringExpressionSegmentation => "referring_expression_segmentation",
            CaptionTask::Ocr => "ocr",
            CaptionTask::OcrWithRegion => "ocr_with_region",
            CaptionTask::DocVqa => "docvqa",
            CaptionTask::PromptGenTags => "prompt_gen_tags",
            CaptionTask::PromptGenMixedCaption => "prompt_gen_mixed_caption",
            CaptionTask::PromptGenAnalyze => "prompt_gen_analyze",
            CaptionTask::PromptGenMixedCaptionPlus => "prompt_gen_mixed_caption_plus",
        }
    }

    /// The prompt token sent to the model for this task.
    pub fn prompt(&self) -> &'static str {
        match self {
            CaptionTask::RegionCaption => "<OD>",
            CaptionTask::DenseRegionCaption => "<DENSE_REGION_CAPTION>",
            CaptionTask::RegionProposal => "<REGION_PROPOSAL>",
            CaptionTask::Caption => "<CAPTION>",
            CaptionTask::DetailedCaption => "<DETAILED_CAPTION>",
            CaptionTask::MoreDetailedCaption => "<MORE_DETAILED_CAPTION>",
            CaptionTask::CaptionToPhraseGrounding => "<CAPTION_TO_PHRASE_GROUNDING>",
            CaptionTask::ReferringExpressionSegmentation => "<REFERRING_EXPRESSION_SEGMENTATION>",
            CaptionTask::Ocr => "<OCR>",
            CaptionTask::OcrWithRegion => "<OCR_WITH_REGION>",
            CaptionTask::DocVqa => "<DocVQA>",
            CaptionTask::PromptGenTags => "<GENERATE_TAGS>",
            CaptionTask::PromptGenMixedCaption => "<MIXED_CAPTION>",
            CaptionTask::PromptGenAnalyze => "<ANALYZE>",
            CaptionTask::PromptGenMixedCaptionPlus => "<MIXED_CAPTION_PLUS>",
        }
    }

    /// Whether the task takes a free-text qualifier after the prompt token.
    pub fn accepts_text_input(&self) -> bool {
        matches!(
            self,
            CaptionTask::ReferringExpressionSegmentation
                | CaptionTask::CaptionToPhraseGrounding
                | CaptionTask::DocVqa
        )
    }

    /// The names of all tasks.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|task| task.name()).collect()
    }
}

impl fmt::Display for CaptionTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CaptionTask {
    type Err = CaptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|task| task.name() == s)
            .ok_or_else(|| CaptionError::UnknownTask(s.to_string()))
    }
}

/// Build the prompt for a task.
///
/// # Arguments
///
/// * `task` - The captioning task.
/// * `text_input` - An optional free-text qualifier, only valid for tasks that accept one.
///
/// # Returns
///
/// `"{token} {text}"` when a non-empty qualifier is given, the bare task token otherwise.
///
/// # Example
///
/// ```
/// use loraset_vlm::{build_prompt, CaptionTask};
///
/// assert_eq!(build_prompt(CaptionTask::Caption, None).unwrap(), "<CAPTION>");
/// assert_eq!(
///     build_prompt(CaptionTask::DocVqa, Some("what is the title?")).unwrap(),
///     "<DocVQA> what is the title?"
/// );
/// assert!(build_prompt(CaptionTask::Caption, Some("a dog")).is_err());
/// ```
pub fn build_prompt(task: CaptionTask, text_input: Option<&str>) -> Result<String, CaptionError> {
    match text_input.filter(|text| !text.is_empty()) {
        Some(_) if !task.accepts_text_input() => Err(CaptionError::TextInputNotSupported(task)),
        Some(text) => Ok(format!("{} {}", task.prompt(), text)),
        None => Ok(task.prompt().to_string()),
    }
}

/// Remove an echoed task token and end-of-text markers from generated text.
///
/// # Arguments
///
/// * `text` - The raw text returned by the captioner.
/// * `task` - The task the text was generated for.
///
/// # Returns
///
/// The trimmed caption, possibly empty.
pub fn clean_generated_text(text: &str, task: CaptionTask) -> String {
    let text = match text.strip_prefix(task.prompt()) {
        Some(rest) => rest.trim(),
        None => text,
    };
    text.replace(END_OF_TEXT, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_task_names() -> Result<(), CaptionError> {
        for task in CaptionTask::ALL {
            assert_eq!(task.name().parse::<CaptionTask>()?, task);
            assert_eq!(task.to_string(), task.name());
        }
        assert_eq!(
            "more_detailed_caption".parse::<CaptionTask>()?,
            CaptionTask::default()
        );
        Ok(())
    }

    #[test]
    fn parse_unknown_task() {
        let err = "summarize".parse::<CaptionTask>().unwrap_err();
        assert!(matches!(err, CaptionError::UnknownTask(ref name) if name == "summarize"));
        assert!(err.to_string().contains("more_detailed_caption"));
    }

    #[test]
    fn prompts() {
        assert_eq!(CaptionTask::RegionCaption.prompt(), "<OD>");
        assert_eq!(CaptionTask::DocVqa.prompt(), "<DocVQA>");
        assert_eq!(CaptionTask::PromptGenTags.prompt(), "<GENERATE_TAGS>");
        assert_eq!(
            CaptionTask::MoreDetailedCaption.prompt(),
            "<MORE_DETAILED_CAPTION>"
        );
    }

    #[test]
    fn text_input_only_for_qualified_tasks() {
        let qualified: Vec<_> = CaptionTask::ALL
            .into_iter()
            .filter(|task| task.accepts_text_input())
            .collect();
        assert_eq!(
            qualified,
            vec![
                CaptionTask::CaptionToPhraseGrounding,
                CaptionTask::ReferringExpressionSegmentation,
                CaptionTask::DocVqa,
            ]
        );

        assert!(matches!(
            build_prompt(CaptionTask::MoreDetailedCaption, Some("a cat")),
            Err(CaptionError::TextInputNotSupported(CaptionTask::MoreDetailedCaption))
        ));
    }

    #[test]
    fn empty_text_input_is_ignored() -> Result<(), CaptionError> {
        assert_eq!(build_prompt(CaptionTask::Ocr, Some(""))?, "<OCR>");
        Ok(())
    }

    #[test]
    fn qualified_prompt() -> Result<(), CaptionError> {
        assert_eq!(
            build_prompt(CaptionTask::CaptionToPhraseGrounding, Some("a red hat"))?,
            "<CAPTION_TO_PHRASE_GROUNDING> a red hat"
        );
        Ok(())
    }

    #[test]
    fn clean_echoed_prompt() {
        let text = "<MORE_DETAILED_CAPTION>  A woman sitting.<|endoftext|>";
        assert_eq!(
            clean_generated_text(text, CaptionTask::MoreDetailedCaption),
            "A woman sitting."
        );
    }

    #[test]
    fn clean_keeps_other_prompts() {
        // only the token of the requested task is stripped
        assert_eq!(
            clean_generated_text("<CAPTION> a dog", CaptionTask::Ocr),
            "<CAPTION> a dog"
        );
    }

    #[test]
    fn clean_end_of_text_anywhere() {
        assert_eq!(
            clean_generated_text(" a<|endoftext|> dog <|endoftext|>", CaptionTask::Caption),
            "a dog"
        );
        assert_eq!(clean_generated_text("<|endoftext|>", CaptionTask::Caption), "");
    }
}
