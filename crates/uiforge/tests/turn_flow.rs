//! Multi-turn flows through the public API.
//!
//! A scripted completion service stands in for the network so each test
//! can assert exactly which calls a conversation makes.

use std::collections::VecDeque;
use std::sync::Mutex;

use uiforge::completion::CompletionFuture;
use uiforge::prelude::*;

/// Pops canned replies in order; records every request it receives.
struct Script {
    replies: Mutex<VecDeque<Result<String, String>>>,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl Script {
    fn new(replies: Vec<Result<String, String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn seen(&self) -> Vec<CompletionRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl CompletionService for Script {
    fn complete(&self, request: CompletionRequest) -> CompletionFuture<'_> {
        self.seen.lock().unwrap().push(request);
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("script exhausted".to_string()));
        Box::pin(async move { reply })
    }
}

fn ask(question: &str) -> Result<String, String> {
    Ok(serde_json::json!({ "action": "ask", "question": question }).to_string())
}

fn generate() -> Result<String, String> {
    Ok(r#"{"action": "generate", "question": ""}"#.to_string())
}

const DASHBOARD: &str = "\
Here is the dashboard:

```tsx
// filename: Dashboard.tsx
import React from 'react';
export default function Dashboard() { return <main />; }
```

```css
main { display: grid; }
```

**Design notes:** grid layout.";

/// Stored turns, with assistant turns counted the way a session would.
fn ask_rounds(results: &[GenerationResult]) -> u32 {
    results
        .iter()
        .filter(|r| r.action == TurnAction::Ask)
        .count() as u32
}

// ── Scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn vague_request_asks_then_generates_after_answer() {
    let script = Script::new(vec![
        ask("What data should the dashboard show?"),
        generate(),
        Ok(DASHBOARD.to_string()),
    ]);
    let generator = Generator::new(&script, GeneratorConfig::default()).unwrap();

    let first = generator.run("build me a dashboard", &[], 0).await.unwrap();
    assert_eq!(first.action, TurnAction::Ask);
    assert_eq!(first.questions.len(), 1);

    let history = vec![
        Turn::user("build me a dashboard"),
        Turn::assistant(&first.content),
    ];
    let second = generator
        .run("sales by region and monthly revenue", &history, ask_rounds(&[first]))
        .await
        .unwrap();

    assert_eq!(second.action, TurnAction::Generate);
    assert!(second.questions.is_empty());
    let files: Vec<_> = second.artifacts.iter().map(|a| a.filename.as_str()).collect();
    assert_eq!(files, vec!["Dashboard.tsx", "styles.css"]);
    assert!(second.token_count > 0);

    let seen = script.seen();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[2].history.len(), 2);
    assert_eq!(seen[2].history[1].content, "What data should the dashboard show?");
}

#[tokio::test]
async fn persistent_asking_is_cut_off_at_the_ceiling() {
    // The model would ask forever; only two questions get through.
    let script = Script::new(vec![
        ask("What is it for?"),
        ask("Which charts?"),
        Ok(DASHBOARD.to_string()),
    ]);
    let generator = Generator::new(&script, GeneratorConfig::default()).unwrap();

    let mut history = Vec::new();
    let mut results = Vec::new();
    for message in ["a dashboard", "for sales", "not sure"] {
        let result = generator
            .run(message, &history, ask_rounds(&results))
            .await
            .unwrap();
        history.push(Turn::user(message));
        history.push(Turn::assistant(&result.content));
        results.push(result);
    }

    let actions: Vec<_> = results.iter().map(|r| r.action).collect();
    assert_eq!(
        actions,
        vec![TurnAction::Ask, TurnAction::Ask, TurnAction::Generate]
    );
    // Third turn skipped the classifier entirely.
    let seen = script.seen();
    assert_eq!(seen.len(), 3);
    assert!(!seen[2].is_structured());
}

#[tokio::test]
async fn detailed_request_generates_on_first_turn() {
    let script = Script::new(vec![generate(), Ok(DASHBOARD.to_string())]);
    let generator = Generator::new(&script, GeneratorConfig::default()).unwrap();

    let result = generator
        .run(
            "a dark dashboard with a revenue line chart and a top-customers table",
            &[],
            0,
        )
        .await
        .unwrap();

    assert_eq!(result.action, TurnAction::Generate);
    assert_eq!(result.artifacts.len(), 2);
    assert_eq!(result.content, DASHBOARD);
}

#[tokio::test]
async fn generation_failure_is_the_only_error() {
    let script = Script::new(vec![
        Ok("I think you should generate".to_string()),
        Err("OpenRouter API HTTP 500 Internal Server Error: boom".to_string()),
    ]);
    let generator = Generator::new(&script, GeneratorConfig::default()).unwrap();

    assert!(generator.run("a modal dialog", &[], 0).await.is_err());
    assert_eq!(script.seen().len(), 2);
}
