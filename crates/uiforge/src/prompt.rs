//! Fixed prompt text: the generation system prompt, the few-shot exchange,
//! and the classifier policy.

use crate::Message;
use crate::turn::Turn;

/// System prompt for component generation.
pub const GENERATION_SYSTEM_PROMPT: &str = "\
You are a senior React and TypeScript engineer. You turn UI descriptions into \
complete, runnable React components.

## Components
- Write TypeScript (.tsx) function components with hooks. No class components.
- Each file is self-contained: all imports at the top, one default export.
- Type every prop with an interface. Never use `any`.
- Use only React itself unless the user explicitly asks for another package.

## Styling
- Use inline styles from a `const styles: Record<string, React.CSSProperties>` object.
- No external stylesheets or CSS modules.
- Layouts use flexbox or grid and work from 320px wide upwards.
- Hover and focus states come from local state (`onMouseEnter` / `onMouseLeave`).

## Accessibility
- Prefer semantic elements (header, nav, main, section, footer, button, a).
- Icon-only controls get an `aria-label`.
- Interactive elements are at least 44x44px and reachable by keyboard.

## Output format
- Put each file in its own fenced block tagged with its language, e.g. ```tsx
- The first line of every block is a comment: `// filename: ComponentName.tsx`
- After the code, add a short **Design notes** section.

## Follow-up requests
- Keep the existing structure and names; change only what was asked.
- End with one or two lines on what changed.";

/// Example request used as the few-shot user turn.
pub const FEW_SHOT_REQUEST: &str = "A toggle switch with a label, on and off states";

/// Example reply used as the few-shot assistant turn.
pub const FEW_SHOT_REPLY: &str = "\
Here is an accessible toggle switch:

```tsx
// filename: Toggle.tsx
import React, { useState } from 'react';

interface ToggleProps {
  label: string;
  defaultOn?: boolean;
  onChange?: (on: boolean) => void;
}

const Toggle: React.FC<ToggleProps> = ({ label, defaultOn = false, onChange }) => {
  const [on, setOn] = useState(defaultOn);

  const flip = () => {
    setOn(!on);
    onChange?.(!on);
  };

  return (
    <label style={styles.row}>
      <span>{label}</span>
      <button
        type=\"button\"
        role=\"switch\"
        aria-checked={on}
        onClick={flip}
        style={{ ...styles.track, ...(on ? styles.trackOn : {}) }}
      >
        <span style={{ ...styles.thumb, ...(on ? styles.thumbOn : {}) }} />
      </button>
    </label>
  );
};

const styles: Record<string, React.CSSProperties> = {
  row: { display: 'flex', alignItems: 'center', gap: '12px', minHeight: '44px' },
  track: {
    position: 'relative',
    width: '52px',
    height: '32px',
    borderRadius: '16px',
    border: 'none',
    backgroundColor: '#cbd5e1',
    cursor: 'pointer',
    transition: 'background-color 0.2s ease',
  },
  trackOn: { backgroundColor: '#16a34a' },
  thumb: {
    position: 'absolute',
    top: '4px',
    left: '4px',
    width: '24px',
    height: '24px',
    borderRadius: '50%',
    backgroundColor: '#ffffff',
    transition: 'transform 0.2s ease',
  },
  thumbOn: { transform: 'translateX(20px)' },
};

export default Toggle;
```

**Design notes:**
- `role=\"switch\"` with `aria-checked` lets screen readers announce the state.
- The whole row is at least 44px tall so it is easy to tap.";

/// System prompt for the ask-or-generate decision.
pub const CLASSIFIER_SYSTEM_PROMPT: &str = "\
You decide how a React component generator should respond to the latest user message.

Generate immediately when:
- the message names a component type and at least one concrete detail (layout, color, behavior, content);
- the user is answering a clarifying question you asked earlier;
- the user is iterating on code that was already generated (\"make it bigger\", \"add a footer\").

Ask exactly one question only when:
- this is the first message, it names a broad category with no specifics at all \
(\"a landing page\", \"a dashboard\", \"build me a form\"), and
- a reasonable component is impossible without that one missing fact.

Rules:
- One question, never a list. Keep it under 15 words.
- If the conversation already contains a question from you, do not ask again. Generate.
- When unsure, generate.

Reply with JSON only:
{\"action\": \"ask\" | \"generate\", \"question\": \"<the question, or an empty string>\"}";

/// System prompt followed by the few-shot exchange.
pub fn generation_preamble() -> Vec<Message> {
    vec![
        Message::system(GENERATION_SYSTEM_PROMPT),
        Message::user(FEW_SHOT_REQUEST),
        Message::assistant(FEW_SHOT_REPLY),
    ]
}

/// Classifier user prompt: the recent `window` of turns, each cut to
/// `max_chars` characters, followed by the latest message.
pub fn classifier_user_prompt(
    user_input: &str,
    history: &[Turn],
    window: usize,
    max_chars: usize,
) -> String {
    let recent = &history[history.len().saturating_sub(window)..];
    let history_text = if recent.is_empty() {
        "(no prior messages)".to_string()
    } else {
        recent
            .iter()
            .map(|turn| {
                format!(
                    "{}: {}",
                    turn.role.as_str().to_uppercase(),
                    truncate_chars(&turn.content, max_chars)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    format!("Conversation so far:\n{history_text}\n\nLatest user message:\n{user_input}")
}

/// First `max` characters of `s`, cut on a char boundary.
fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s.get(..idx).unwrap_or(s),
        None => s,
    }
}
