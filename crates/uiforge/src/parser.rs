//! Extraction of code artifacts from a markdown reply.
//!
//! Recognizes fenced blocks of the form
//!
//! ````text
//! ```tsx
//! // filename: PricingCard.tsx
//! export default function PricingCard() { ... }
//! ```
//! ````
//!
//! The filename comment is optional. Untagged or unterminated fences are
//! skipped without error; prose outside fences is ignored.

use std::sync::LazyLock;

use regex::Regex;

use crate::turn::CodeArtifact;

/// Tagged fence opener, optional `// filename:` line, lazy body, fence closer.
static CODE_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(\w+)\s*\n(?://\s*filename:\s*(\S+)\s*\n)?(.*?)```")
        .expect("code block pattern is valid")
});

/// Extract every tagged code block from `text`, in order of appearance.
///
/// # Example
///
/// ```
/// use uiforge::parser::parse_artifacts;
///
/// let reply = "Here you go:\n\n```css\n.card { padding: 16px; }\n```\n";
/// let artifacts = parse_artifacts(reply);
/// assert_eq!(artifacts.len(), 1);
/// assert_eq!(artifacts[0].filename, "styles.css");
/// assert_eq!(artifacts[0].code, ".card { padding: 16px; }");
/// ```
pub fn parse_artifacts(text: &str) -> Vec<CodeArtifact> {
    CODE_BLOCK_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let language = caps.get(1)?.as_str().trim().to_string();
            let filename = caps
                .get(2)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| default_filename(&language));
            let code = caps.get(3)?.as_str().trim().to_string();
            Some(CodeArtifact {
                language,
                filename,
                code,
            })
        })
        .collect()
}

/// Filename used when a block does not declare one.
pub fn default_filename(language: &str) -> String {
    match language {
        "tsx" => "Component.tsx".to_string(),
        "ts" => "module.ts".to_string(),
        "jsx" => "Component.jsx".to_string(),
        "js" => "module.js".to_string(),
        "css" => "styles.css".to_string(),
        "html" => "index.html".to_string(),
        other => format!("file.{other}"),
    }
}
