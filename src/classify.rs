//! Code-fence classification: decides the rendering path for a fence.

/// The reserved fence language tag that routes to the diagram engine.
pub const DIAGRAM_TAG: &str = "mermaid";

/// Rendering path for a code span or fenced block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockClass {
    /// Inline code — escaped monospace, never diagram- or syntax-rendered.
    Inline,
    /// A diagram description destined for the diagram engine.
    Diagram,
    /// Source code in a declared language; highlighted with line numbers.
    Highlighted(String),
    /// A fence with no language tag — monospace, line-numbered, unstyled.
    Plain,
}

/// Classifies a code node by its declared language tag.
///
/// Total over all inputs: inline code is always [`BlockClass::Inline`]
/// regardless of tag; the reserved diagram keyword routes to
/// [`BlockClass::Diagram`]; any other non-empty tag is
/// [`BlockClass::Highlighted`] (unknown languages degrade to plain styling
/// downstream, never an error); an empty tag is [`BlockClass::Plain`].
pub fn classify(language_tag: &str, is_inline: bool) -> BlockClass {
    if is_inline {
        return BlockClass::Inline;
    }
    match language_tag {
        DIAGRAM_TAG => BlockClass::Diagram,
        "" => BlockClass::Plain,
        tag => BlockClass::Highlighted(tag.to_string()),
    }
}

/// Extracts the language tag from a fence info string.
///
/// Only the first whitespace-separated word counts; trailing attributes
/// (` ```rust,ignore title="x" `) are discarded along with anything after a
/// comma, matching how fence info strings are conventionally read.
pub fn fence_language(info: &str) -> &str {
    let word = info.split_whitespace().next().unwrap_or("");
    word.split(',').next().unwrap_or(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify the four classification paths.
    #[test]
    fn test_classify_paths() {
        assert_eq!(classify("rust", true), BlockClass::Inline);
        assert_eq!(classify("", true), BlockClass::Inline);
        assert_eq!(classify(DIAGRAM_TAG, false), BlockClass::Diagram);
        assert_eq!(
            classify("rust", false),
            BlockClass::Highlighted("rust".to_string())
        );
        assert_eq!(classify("", false), BlockClass::Plain);
    }

    /// Verify classification is total: arbitrary tags never error and fall
    /// through to the highlighted path.
    #[test]
    fn test_classify_totality() {
        for tag in ["", " ", "\t", "日本語", "no-such-lang", "mermaid ", "a b"] {
            let _ = classify(tag, false);
            let _ = classify(tag, true);
        }
        // A tag that merely contains the keyword is not a diagram.
        assert_eq!(
            classify("mermaidish", false),
            BlockClass::Highlighted("mermaidish".to_string())
        );
    }

    /// Verify info-string parsing keeps only the leading word.
    #[test]
    fn test_fence_language_extraction() {
        assert_eq!(fence_language("rust"), "rust");
        assert_eq!(fence_language("rust,ignore"), "rust");
        assert_eq!(fence_language("mermaid theme=dark"), "mermaid");
        assert_eq!(fence_language(""), "");
        assert_eq!(fence_language("   "), "");
    }
}
