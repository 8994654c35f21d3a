//! One user turn, end to end.
//!
//! [`Generator::run`] classifies the turn first. An `Ask` decision returns
//! the question immediately without a generation call. A `Generate` decision
//! trims the history to the budget, sends system prompt + few-shot example +
//! trimmed history + the new message to the completion service once, and
//! parses code artifacts out of the reply.
//!
//! A turn makes at most two sequential completion calls and keeps no state
//! between runs: the caller supplies the history and ask count every time.

use tracing::{debug, info};

use crate::classifier::TurnClassifier;
use crate::completion::{CompletionRequest, CompletionService, OutputMode};
use crate::config::GeneratorConfig;
use crate::context::{CountTokens, HistoryTrimmer, TokenCounter};
use crate::parser::parse_artifacts;
use crate::prompt::generation_preamble;
use crate::turn::{Classification, GenerationResult, Turn};

/// The per-turn orchestrator.
pub struct Generator<'a> {
    service: &'a dyn CompletionService,
    counter: TokenCounter,
    trimmer: HistoryTrimmer,
    config: GeneratorConfig,
}

impl<'a> Generator<'a> {
    /// Create a generator, resolving the tokenizer for
    /// `config.tokenizer_model`.
    ///
    /// Fails when no tokenizer exists for that model; refuse to serve rather
    /// than budget context with a guess.
    pub fn new(service: &'a dyn CompletionService, config: GeneratorConfig) -> Result<Self, String> {
        let counter = TokenCounter::for_model(&config.tokenizer_model)?;
        Ok(Self {
            service,
            counter,
            trimmer: HistoryTrimmer::from_config(&config),
            config,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Handle one user turn.
    ///
    /// `history` holds the session's prior turns, oldest first, excluding
    /// `user_input`. `ask_rounds_done` is the number of earlier assistant
    /// turns that asked a question.
    ///
    /// Only a failed generation call returns `Err`; classification problems
    /// fall back to generating.
    pub async fn run(
        &self,
        user_input: &str,
        history: &[Turn],
        ask_rounds_done: u32,
    ) -> Result<GenerationResult, String> {
        let classifier = TurnClassifier::new(self.service, &self.config);
        match classifier
            .classify(user_input, history, ask_rounds_done)
            .await
        {
            Classification::Ask { question } => {
                info!("Asking clarifying question (round {})", ask_rounds_done + 1);
                Ok(GenerationResult::ask(question))
            }
            Classification::Generate => self.generate(user_input, history).await,
        }
    }

    async fn generate(&self, user_input: &str, history: &[Turn]) -> Result<GenerationResult, String> {
        let request = self.build_generation_request(user_input, history);
        let content = self
            .service
            .complete(request)
            .await
            .map_err(|e| format!("generation failed: {e}"))?;

        let artifacts = parse_artifacts(&content);
        let token_count = self.counter.count(&content);
        info!(
            "Generated reply: {} artifact(s), {token_count} tokens",
            artifacts.len()
        );
        Ok(GenerationResult::generated(content, artifacts, token_count))
    }

    /// Text-mode request with the trimmed history.
    pub fn build_generation_request(&self, user_input: &str, history: &[Turn]) -> CompletionRequest {
        let (kept, report) = self.trimmer.trim_with_report(history, &self.counter);
        debug!(
            "History trimmed: kept {} turn(s), dropped {}, ~{} tokens of {} budget",
            report.kept, report.dropped, report.tokens, self.trimmer.budget
        );

        CompletionRequest {
            preamble: generation_preamble(),
            history: kept.iter().map(Turn::to_message).collect(),
            user: user_input.to_string(),
            sampling: self.config.generation_sampling(),
            output: OutputMode::Text,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::ScriptedService;
    use super::*;
    use crate::MessageRole;
    use crate::turn::TurnAction;

    const GENERATE: &str = r#"{"action": "generate", "question": ""}"#;

    fn ask(question: &str) -> Result<String, String> {
        Ok(serde_json::json!({"action": "ask", "question": question}).to_string())
    }

    const REPLY: &str = "\
Here is the card:

```tsx
// filename: PricingCard.tsx
export default function PricingCard() { return <div />; }
```

**Design notes:** minimal.";

    #[tokio::test]
    async fn ask_short_circuits_generation() {
        let service = ScriptedService::new(vec![ask("What metrics should the dashboard show?")]);
        let generator = Generator::new(&service, GeneratorConfig::default()).unwrap();

        let result = generator.run("build me a dashboard", &[], 0).await.unwrap();

        assert_eq!(result.action, TurnAction::Ask);
        assert_eq!(result.content, "What metrics should the dashboard show?");
        assert_eq!(result.questions, vec![result.content.clone()]);
        assert!(result.artifacts.is_empty());
        assert_eq!(result.token_count, 0);

        let requests = service.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests.iter().all(|r| r.is_structured()));
    }

    #[tokio::test]
    async fn generate_parses_reply_and_counts_tokens() {
        let service = ScriptedService::new(vec![Ok(GENERATE.into()), Ok(REPLY.into())]);
        let generator = Generator::new(&service, GeneratorConfig::default()).unwrap();

        let result = generator
            .run("a pricing card with three tiers", &[], 0)
            .await
            .unwrap();

        assert_eq!(result.action, TurnAction::Generate);
        assert!(result.questions.is_empty());
        assert_eq!(result.content, REPLY);
        assert_eq!(result.artifacts.len(), 1);
        assert_eq!(result.artifacts[0].filename, "PricingCard.tsx");
        let expected = TokenCounter::for_model("gpt-4o").unwrap().count(REPLY);
        assert_eq!(result.token_count, expected);
    }

    #[tokio::test]
    async fn generate_without_code_still_has_no_questions() {
        let service = ScriptedService::new(vec![
            Ok(GENERATE.into()),
            Ok("Could you share a screenshot? Meanwhile, no code.".into()),
        ]);
        let generator = Generator::new(&service, GeneratorConfig::default()).unwrap();
        let result = generator.run("a nav bar", &[], 0).await.unwrap();
        assert_eq!(result.action, TurnAction::Generate);
        assert!(result.questions.is_empty());
        assert!(result.artifacts.is_empty());
    }

    #[tokio::test]
    async fn ceiling_generates_without_classifier_call() {
        let service = ScriptedService::new(vec![Ok(REPLY.into())]);
        let generator = Generator::new(&service, GeneratorConfig::default()).unwrap();

        let result = generator.run("build me a dashboard", &[], 2).await.unwrap();

        assert_eq!(result.action, TurnAction::Generate);
        let requests = service.requests();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].is_structured());
    }

    #[tokio::test]
    async fn classifier_failure_still_generates() {
        let service = ScriptedService::new(vec![
            Err("OpenRouter API HTTP 503 Service Unavailable: overloaded".into()),
            Ok(REPLY.into()),
        ]);
        let generator = Generator::new(&service, GeneratorConfig::default()).unwrap();
        let result = generator.run("a landing page", &[], 0).await.unwrap();
        assert_eq!(result.action, TurnAction::Generate);
        assert_eq!(service.call_count(), 2);
    }

    #[tokio::test]
    async fn generation_failure_propagates() {
        let service = ScriptedService::new(vec![
            Ok(GENERATE.into()),
            Err("request failed: connection reset".into()),
        ]);
        let generator = Generator::new(&service, GeneratorConfig::default()).unwrap();
        let err = generator.run("a footer", &[], 0).await.unwrap_err();
        assert!(err.starts_with("generation failed"));
    }

    #[tokio::test]
    async fn generation_request_is_fully_assembled() {
        let service = ScriptedService::new(vec![Ok(GENERATE.into()), Ok(REPLY.into())]);
        let generator = Generator::new(&service, GeneratorConfig::default()).unwrap();
        let history = vec![
            Turn::user("a login form"),
            Turn::assistant("```tsx\n// filename: Login.tsx\nexport default 1;\n```"),
        ];

        generator
            .run("add a remember-me checkbox", &history, 0)
            .await
            .unwrap();

        let requests = service.requests();
        let request = &requests[1];
        assert_eq!(request.output, OutputMode::Text);
        assert_eq!(request.sampling.model, "openai/gpt-4o");
        assert_eq!(request.sampling.max_tokens, 4096);
        assert!((request.sampling.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(request.preamble, generation_preamble());
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.history[0].role, MessageRole::User);
        assert_eq!(request.history[1].role, MessageRole::Assistant);
        assert_eq!(request.user, "add a remember-me checkbox");
    }

    #[tokio::test]
    async fn generation_history_is_trimmed_to_budget() {
        // 128k window minus reserves leaves a 200-token history budget.
        let config = GeneratorConfig::default().with_context_window(4_096 + 2_500 + 200);
        let service = ScriptedService::new(vec![Ok(REPLY.into())]);
        let generator = Generator::new(&service, config).unwrap();

        let history = vec![
            Turn::user("word ".repeat(400)),
            Turn::assistant("short answer"),
            Turn::user("short follow-up"),
        ];
        generator.run("tweak it", &history, 2).await.unwrap();

        let requests = service.requests();
        assert_eq!(requests[0].history.len(), 2);
        assert_eq!(requests[0].history[0].content, "short answer");
    }

    #[test]
    fn unknown_tokenizer_fails_at_construction() {
        let service = ScriptedService::new(vec![]);
        let config = GeneratorConfig::default().with_tokenizer_model("mystery-llm");
        assert!(Generator::new(&service, config).is_err());
    }
}
