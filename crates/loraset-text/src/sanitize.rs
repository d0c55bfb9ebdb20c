/// Gendered nouns replaced by the trigger word, in application order.
pub const GENDER_TERMS: [&str; 8] = [
    "woman",
    "man",
    "female",
    "male",
    "lady",
    "gentleman",
    "girl",
    "boy",
];

/// Framing phrases removed from captions, longest first.
pub const FILLER_PHRASES: [&str; 13] = [
    "portrait of a",
    "portrait of the",
    "portrait of",
    "portrait",
    "photo of a",
    "photo of the",
    "photo of",
    "image of a",
    "image of the",
    "image of",
    "picture of a",
    "picture of the",
    "picture of",
];

/// Rewrites captions around a trigger word.
///
/// The sanitizer holds an explicit, ordered list of literal `(pattern, replacement)` rules.
/// Each rule is a single left-to-right replace over the output of the previous rule, so later
/// rules see (and may rewrite) text produced by earlier ones, while a rule never re-scans its
/// own output. The order is part of the behavior: `"man"` runs before `"gentleman"`, so a
/// gentleman becomes `gentle{trigger}`, and the article rules run before the pronoun rules.
///
/// After the substitutions, framing phrases such as `"photo of a"` are removed and whitespace
/// is collapsed.
///
/// # Example
///
/// ```
/// use loraset_text::CaptionSanitizer;
///
/// let sanitizer = CaptionSanitizer::new("sks");
/// assert_eq!(sanitizer.sanitize("portrait of a woman smiling"), "sks smiling");
/// ```
#[derive(Debug, Clone)]
pub struct CaptionSanitizer {
    trigger_word: String,
    rules: Vec<(String, String)>,
}

impl CaptionSanitizer {
    /// Create a sanitizer for the given trigger word.
    ///
    /// The trigger word is used verbatim and is expected to be non-empty.
    pub fn new(trigger_word: impl Into<String>) -> Self {
        let trigger_word = trigger_word.into();
        let t = trigger_word.as_str();

        let mut rules: Vec<(String, String)> = GENDER_TERMS
            .iter()
            .map(|term| (term.to_string(), t.to_string()))
            .collect();

        rules.extend(
            [
                ("the ", format!("the {t}")),
                ("The ", format!("The {t}")),
                ("she ", format!("the {t}")),
                ("She ", format!("The {t}")),
                ("her ", format!("the {t}")),
                ("Her ", format!("The {t}")),
                ("hers ", format!("the {t}'s")),
                ("Hers ", format!("The {t}'s")),
                ("he ", format!("the {t}")),
                ("He ", format!("The {t}")),
                ("him ", format!("the {t}")),
                ("Him ", format!("The {t}")),
                ("his ", format!("the {t}'s")),
                ("His ", format!("The {t}'s")),
                ("Tthe", "The".to_string()),
                ("tthe", "the".to_string()),
            ]
            .into_iter()
            .map(|(pattern, replacement)| (pattern.to_string(), replacement)),
        );

        rules.push((format!("{t}{t}"), format!(" {t} ")));

        Self {
            trigger_word,
            rules,
        }
    }

    /// The trigger word substituted into captions.
    pub fn trigger_word(&self) -> &str {
        &self.trigger_word
    }

    /// The ordered substitution rules, before phrase removal.
    pub fn rules(&self) -> &[(String, String)] {
        &self.rules
    }

    /// Sanitize a caption.
    ///
    /// # Arguments
    ///
    /// * `caption` - The raw caption text.
    ///
    /// # Returns
    ///
    /// The rewritten caption without leading, trailing or repeated whitespace.
    pub fn sanitize(&self, caption: &str) -> String {
        if caption.is_empty() {
            return String::new();
        }

        let mut caption = caption.to_string();

        for (pattern, replacement) in self.rules.iter() {
            caption = caption.replace(pattern.as_str(), replacement);
        }

        for phrase in FILLER_PHRASES {
            caption = caption.replace(phrase, "");
        }

        collapse_whitespace(&caption)
    }
}

/// Sanitize a caption with a one-off [`CaptionSanitizer`].
///
/// # Arguments
///
/// * `caption` - The raw caption text.
/// * `trigger_word` - The word substituted for gendered nouns and pronouns.
pub fn sanitize_caption(caption: &str, trigger_word: &str) -> String {
    CaptionSanitizer::new(trigger_word).sanitize(caption)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
