//! Filename conventions tying a content file to its companions.
//!
//! Course material carries no manifest, so audio and evaluation files are
//! found by probing sibling names derived from the content filename. Each
//! probe is an explicit (predicate, transform) rule; rules are evaluated in
//! priority order and the first candidate that exists on disk wins.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

pub(crate) const MARKDOWN_EXT: &str = ".md";
const CONTENT_SUFFIX: &str = "_contenido.md";
const SCRIPT_SUFFIX: &str = "_guion.md";
const EVALUATION_SUFFIX: &str = "_evaluacion.md";
const SUBTOPIC_MARKER: &str = "_subtema_";

/// Whether a directory entry is a markdown file at all.
pub(crate) fn is_markdown(name: &str) -> bool {
    name.ends_with(MARKDOWN_EXT)
}

/// Script and evaluation companions are never standalone topics.
pub(crate) fn is_auxiliary(name: &str) -> bool {
    name.ends_with(SCRIPT_SUFFIX) || name.ends_with(EVALUATION_SUFFIX)
}

/// Whether a file is eligible for the primary topic listing.
pub(crate) fn is_content_topic(name: &str) -> bool {
    is_markdown(name) && !is_auxiliary(name)
}

fn stem(name: &str) -> &str {
    name.strip_suffix(MARKDOWN_EXT).unwrap_or(name)
}

/// One rule in the audio lookup chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AudioPattern {
    /// `tema_1.md` → `tema_1.<ext>`
    SwapExtension(&'static str),
    /// `tema_1_contenido.md` → `tema_1_<tag>.<ext>`; without a content
    /// suffix the tag is appended to the stem instead.
    CompanionTag {
        tag: &'static str,
        ext: &'static str,
    },
    /// `tema_1_contenido.md` → `tema_1.<ext>`. Restricted to names that
    /// actually carry the content suffix, otherwise the candidate would be
    /// the markdown file itself.
    DropContentSuffix(&'static str),
}

impl AudioPattern {
    pub(crate) fn applies_to(&self, name: &str) -> bool {
        match self {
            Self::SwapExtension(_) | Self::CompanionTag { .. } => is_markdown(name),
            Self::DropContentSuffix(_) => name.ends_with(CONTENT_SUFFIX),
        }
    }

    pub(crate) fn candidate(&self, name: &str) -> String {
        match self {
            Self::SwapExtension(ext) => format!("{}.{ext}", stem(name)),
            Self::CompanionTag { tag, ext } => match name.strip_suffix(CONTENT_SUFFIX) {
                Some(base) => format!("{base}_{tag}.{ext}"),
                None => format!("{}_{tag}.{ext}", stem(name)),
            },
            Self::DropContentSuffix(ext) => {
                let base = name.strip_suffix(CONTENT_SUFFIX).unwrap_or(name);
                format!("{base}.{ext}")
            }
        }
    }
}

/// Audio probes in priority order: plain extension swap first, then the
/// `_audio` and `_guion` companion names, then the bare stem.
pub(crate) const AUDIO_PATTERNS: &[AudioPattern] = &[
    AudioPattern::SwapExtension("mp3"),
    AudioPattern::SwapExtension("wav"),
    AudioPattern::SwapExtension("m4a"),
    AudioPattern::CompanionTag {
        tag: "audio",
        ext: "wav",
    },
    AudioPattern::CompanionTag {
        tag: "audio",
        ext: "mp3",
    },
    AudioPattern::CompanionTag {
        tag: "audio",
        ext: "m4a",
    },
    AudioPattern::CompanionTag {
        tag: "guion",
        ext: "m4a",
    },
    AudioPattern::CompanionTag {
        tag: "guion",
        ext: "mp3",
    },
    AudioPattern::CompanionTag {
        tag: "guion",
        ext: "wav",
    },
    AudioPattern::DropContentSuffix("wav"),
    AudioPattern::DropContentSuffix("mp3"),
];

/// First audio sibling of `name` that exists in `dir`, if any.
pub(crate) fn find_audio(name: &str, dir: &Path) -> Option<String> {
    AUDIO_PATTERNS
        .iter()
        .filter(|pattern| pattern.applies_to(name))
        .map(|pattern| pattern.candidate(name))
        .find(|candidate| dir.join(candidate).is_file())
}

/// One rule in the evaluation lookup chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EvaluationPattern {
    /// `tema_1.md` → `tema_1_evaluacion.md`
    SiblingSuffix,
    /// `tema_1_contenido.md` → `tema_1_evaluacion.md`
    ReplaceContentSuffix,
    /// `tema_1_subtema_x.md` → `tema_1_evaluacion.md`: subtopics share the
    /// parent topic's evaluation.
    ParentOfSubtopic,
}

impl EvaluationPattern {
    pub(crate) fn applies_to(&self, name: &str) -> bool {
        match self {
            Self::SiblingSuffix => is_markdown(name),
            Self::ReplaceContentSuffix => name.ends_with(CONTENT_SUFFIX),
            Self::ParentOfSubtopic => name.contains(SUBTOPIC_MARKER),
        }
    }

    pub(crate) fn candidate(&self, name: &str) -> String {
        match self {
            Self::SiblingSuffix => format!("{}{EVALUATION_SUFFIX}", stem(name)),
            Self::ReplaceContentSuffix => {
                let base = name.strip_suffix(CONTENT_SUFFIX).unwrap_or(name);
                format!("{base}{EVALUATION_SUFFIX}")
            }
            Self::ParentOfSubtopic => {
                let parent = name.split(SUBTOPIC_MARKER).next().unwrap_or(name);
                format!("{parent}{EVALUATION_SUFFIX}")
            }
        }
    }
}

pub(crate) const EVALUATION_PATTERNS: &[EvaluationPattern] = &[
    EvaluationPattern::SiblingSuffix,
    EvaluationPattern::ReplaceContentSuffix,
    EvaluationPattern::ParentOfSubtopic,
];

/// First evaluation sibling of `name` that exists in `dir`, if any.
///
/// An evaluation file never links to another evaluation.
pub(crate) fn find_evaluation(name: &str, dir: &Path) -> Option<String> {
    if name.ends_with(EVALUATION_SUFFIX) {
        return None;
    }
    EVALUATION_PATTERNS
        .iter()
        .filter(|pattern| pattern.applies_to(name))
        .map(|pattern| pattern.candidate(name))
        .find(|candidate| dir.join(candidate).is_file())
}

static MD_EXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.md$").expect("valid pattern"));
static EXERCISES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(__|_)ejercicios$").expect("valid pattern"));
static TITLE_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(__|_)(contenido|evaluacion|ejercicios|guion)$").expect("valid pattern")
});
static SEPARATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_+").expect("valid pattern"));

/// Display title derived from a topic filename: extension and known suffix
/// tokens stripped, separators turned into spaces, first letter upper-cased.
/// Exercise files keep a marker prefix so they stand out in listings.
pub(crate) fn topic_title(file_name: &str) -> String {
    let stem = MD_EXT_RE.replace(file_name, "");
    let prefix = if EXERCISES_RE.is_match(&stem) {
        "📝 "
    } else {
        ""
    };
    let base = TITLE_SUFFIX_RE.replace(&stem, "");
    let spaced = SEPARATOR_RE.replace_all(&base, " ");
    format!("{prefix}{}", capitalize_first(&spaced))
}

pub(crate) fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
