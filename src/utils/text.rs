// Text cleanup for agent output

const FENCE: &str = "```";

/// Strip a markdown code fence wrapping the whole reply.
///
/// Agents often answer with "```markdown\n...\n```". The opening fence may
/// carry any single-word language tag. Both fences must be present for
/// either to be removed; fences inside the body are left alone.
pub fn clean_markdown_response(text: &str) -> String {
    let body = text.trim();
    unwrap_fence(body).unwrap_or(body).trim().to_string()
}

fn unwrap_fence(body: &str) -> Option<&str> {
    let (opening, remainder) = body.strip_prefix(FENCE)?.split_once('\n')?;
    if opening.trim().contains(char::is_whitespace) {
        return None;
    }

    let inner = remainder.trim_end().strip_suffix(FENCE)?;
    (inner.is_empty() || inner.ends_with('\n')).then_some(inner)
}

/// Split a formatted study package into its notes and questions sections.
///
/// Returns `None` unless both a `notes:` and a `questions:` marker are
/// present (case-insensitive). Sections may appear in either order.
pub fn split_study_package(text: &str) -> Option<(String, String)> {
    const NOTES: &str = "notes:";
    const QUESTIONS: &str = "questions:";

    // ASCII lowering keeps byte offsets aligned with `text`
    let lower = text.to_ascii_lowercase();
    let notes_at = lower.find(NOTES)?;
    let questions_at = lower.find(QUESTIONS)?;

    let (notes, questions) = if notes_at < questions_at {
        (
            &text[notes_at + NOTES.len()..questions_at],
            &text[questions_at + QUESTIONS.len()..],
        )
    } else {
        (
            &text[notes_at + NOTES.len()..],
            &text[questions_at + QUESTIONS.len()..notes_at],
        )
    };

    Some((notes.trim().to_string(), questions.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_tagged_fence() {
        let text = "```markdown\n# Cell Biology\n\n- Nucleus\n```";
        assert_eq!(clean_markdown_response(text), "# Cell Biology\n\n- Nucleus");
    }

    #[test]
    fn test_clean_bare_fence_with_surrounding_whitespace() {
        let text = "\n  ```\nQ1. What is ATP?\n```\n\n";
        assert_eq!(clean_markdown_response(text), "Q1. What is ATP?");
    }

    #[test]
    fn test_clean_leaves_unfenced_text() {
        assert_eq!(clean_markdown_response("  plain notes  "), "plain notes");
        assert_eq!(clean_markdown_response(""), "");
    }

    #[test]
    fn test_clean_keeps_inner_code_blocks() {
        let text = "```md\nIntro\n\n```python\nprint(1)\n```\n\nOutro\n```";
        assert_eq!(
            clean_markdown_response(text),
            "Intro\n\n```python\nprint(1)\n```\n\nOutro"
        );
    }

    #[test]
    fn test_clean_does_not_eat_inline_backticks() {
        assert_eq!(clean_markdown_response("```rust fn main() {}```"), "```rust fn main() {}```");
    }

    #[test]
    fn test_clean_accepts_symbolic_language_tags() {
        assert_eq!(clean_markdown_response("```c#\nConsole.WriteLine();\n```"), "Console.WriteLine();");
        assert_eq!(clean_markdown_response("```objective-c++\n[obj run];\n```"), "[obj run];");
    }

    #[test]
    fn test_clean_requires_both_fences() {
        let text = "```objective-c++ example\n[obj run];\n```";
        assert_eq!(clean_markdown_response(text), text);
        assert_eq!(clean_markdown_response("Notes here\n```"), "Notes here\n```");
        assert_eq!(clean_markdown_response("```md\nNotes here"), "```md\nNotes here");
    }

    #[test]
    fn test_split_notes_first() {
        let (notes, questions) =
            split_study_package("Notes: cells are small\n\nQuestions: 1. What is a cell?").unwrap();
        assert_eq!(notes, "cells are small");
        assert_eq!(questions, "1. What is a cell?");
    }

    #[test]
    fn test_split_questions_first() {
        let (notes, questions) =
            split_study_package("QUESTIONS:\n1. Why?\nNOTES:\nBecause.").unwrap();
        assert_eq!(notes, "Because.");
        assert_eq!(questions, "1. Why?");
    }

    #[test]
    fn test_split_requires_both_markers() {
        assert!(split_study_package("Notes: only notes here").is_none());
        assert!(split_study_package("nothing structured").is_none());
    }

    #[test]
    fn test_split_with_non_ascii_content() {
        let (notes, questions) =
            split_study_package("Notes: Über Zellkerne — Überblick\nQuestions: Was ist ÄTP?").unwrap();
        assert_eq!(notes, "Über Zellkerne — Überblick");
        assert_eq!(questions, "Was ist ÄTP?");
    }
}
