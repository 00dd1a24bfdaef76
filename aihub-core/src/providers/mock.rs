//! Offline providers
//!
//! [`MockProvider`] answers from a small table of canned replies and is used
//! for demos without credentials. [`ScriptedProvider`] is a deterministic test
//! double whose outcome is fixed at construction.

use crate::protocol::Prompt;
use crate::providers::adapter::Provider;
use crate::providers::error::{GenerationError, GenerationResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

const GREETING: &str = "Hello! I'm HuBi, your AI assistant for AI Solutions Hub. \
I'm here to help you learn about our platform, features, pricing, and more. \
What would you like to know?";

const PRICING: &str = "We offer flexible pricing plans to suit different needs:

Starter Plan - $9/month
  * 10,000 AI credits
  * Basic text generation
  * Email support

Pro Plan - $29/month
  * 50,000 AI credits
  * Advanced AI models
  * Priority support
  * Image processing

Business Plan - $99/month
  * 200,000 AI credits
  * All premium features
  * Custom AI models
  * Dedicated support

Enterprise Plan - Custom pricing
  * Unlimited credits
  * White-label solutions
  * 24/7 support
  * Custom integrations

For more details, visit our pricing page or contact us at support@aisolutionshub.co";

const FEATURES: &str = "AI Solutions Hub offers a comprehensive suite of AI-powered tools:

Text Generation: create high-quality content, articles, and marketing copy
Image Processing: AI-powered image enhancement and manipulation
Audio & Speech: voice synthesis and speech recognition
Data Analytics: advanced data analysis and insights
Custom AI Models: build and deploy your own AI solutions
Chat Assistants: intelligent conversational AI

All tools are accessible through our dashboard and API. \
Would you like to know more about any specific feature?";

const GETTING_STARTED: &str = "Getting started with AI Solutions Hub is easy:

1. Sign Up: create your free account at our registration page
2. Choose a Plan: select the pricing plan that fits your needs
3. Explore Tools: access our suite of AI tools from your dashboard
4. Generate Content: start creating with our AI-powered tools
5. Monitor Usage: track your credits and usage in real-time

New users get bonus credits to try out all features. \
Need help getting started? Contact us at support@aisolutionshub.co";

const SUPPORT: &str = "We're here to help! You can reach our support team through:

Email: support@aisolutionshub.co
Live Chat: available in your dashboard (Pro and above)
Documentation: comprehensive guides and tutorials
Video Tutorials: step-by-step video guides

Support hours:
  * Starter & Pro: email support (24-48 hour response)
  * Business: priority support (12-hour response)
  * Enterprise: 24/7 dedicated support

What specific issue can I help you with today?";

const LICENSING: &str = "Our licensing is straightforward and flexible:

  * Full Commercial Rights: all content generated belongs to you
  * No Attribution Required: use generated content freely
  * API Access: integrate into your applications
  * White-Label Options: available for Enterprise plans

For detailed licensing information and custom arrangements, \
contact our legal team at support@aisolutionshub.co";

const API: &str = "Our API makes integration simple and powerful:

  * RESTful API: easy-to-use REST endpoints
  * Comprehensive Documentation: complete API reference
  * API Keys: secure authentication
  * High Performance: fast response times
  * Webhooks: real-time notifications

API access is available on Pro plans and above. \
Check our developer documentation for implementation guides and code examples.";

const DEFAULT_ANSWER: &str = "Thank you for your question! I'm HuBi, your AI assistant for AI Solutions Hub.

I can help you with information about:
  * Platform features and AI tools
  * Pricing plans and subscription options
  * Getting started guides
  * Support and technical assistance
  * Licensing and usage rights

For detailed support or specific inquiries, please contact us at support@aisolutionshub.co

Could you rephrase your question or let me know what specific aspect you'd like to learn about?";

/// Keyword table, checked in order; the first topic with a matching keyword wins
const TOPICS: &[(&[&str], &str)] = &[
    (&["pricing", "price", "cost", "plan"], PRICING),
    (&["feature", "tool", "offer", "capabilities"], FEATURES),
    (&["start", "begin", "how to use"], GETTING_STARTED),
    (&["support", "help", "contact", "assistance"], SUPPORT),
    (&["licens", "usage rights", "commercial"], LICENSING),
    (&["api", "integration", "integrate"], API),
];

/// Keyword-matched canned answers, no network and no credential
#[derive(Debug, Clone)]
pub struct MockProvider {
    name: String,
}

impl MockProvider {
    pub const NAME: &'static str = "Mock (Test Mode)";

    pub fn new() -> Self {
        Self::with_name(Self::NAME)
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Canned answer for a prompt
    pub fn answer(prompt: &str) -> &'static str {
        let lower = prompt.to_lowercase();

        // "hi" only as a whole word, so "this" or "history" do not greet
        let greets = lower.contains("hello")
            || lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == "hi");
        if greets {
            return GREETING;
        }

        TOPICS
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| lower.contains(k)))
            .map(|(_, answer)| *answer)
            .unwrap_or(DEFAULT_ANSWER)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_text(&self, prompt: &Prompt, request_id: Uuid) -> GenerationResult<String> {
        debug!(
            "[request_id: {}] {} generating canned response",
            request_id, self.name
        );
        Ok(Self::answer(prompt.as_str()).to_string())
    }
}

#[derive(Debug, Clone)]
enum Script {
    Reply(String),
    Fail(String),
}

/// Test double with a fixed outcome and a call counter.
///
/// Clones share the counter, so a test can keep a handle after moving the
/// provider into a router.
#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    name: String,
    script: Script,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    /// Always returns `text`, which may be empty or whitespace
    pub fn succeeding(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::scripted(name, Script::Reply(text.into()))
    }

    /// Always fails with exactly `message`
    pub fn failing(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::scripted(name, Script::Fail(message.into()))
    }

    fn scripted(name: impl Into<String>, script: Script) -> Self {
        Self {
            name: name.into(),
            script,
            delay: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `generate_text` has been entered
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate_text(&self, _prompt: &Prompt, _request_id: Uuid) -> GenerationResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match &self.script {
            Script::Reply(text) => Ok(text.clone()),
            Script::Fail(message) => Err(GenerationError::Other(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Hello there", GREETING ; "greeting")]
    #[test_case("hi, who are you?", GREETING ; "short greeting")]
    #[test_case("What does the Pro plan cost?", PRICING ; "pricing")]
    #[test_case("Which tools do you have?", FEATURES ; "features")]
    #[test_case("How do I get started?", GETTING_STARTED ; "getting started")]
    #[test_case("I need help with my account", SUPPORT ; "support")]
    #[test_case("Can I use output for commercial work?", LICENSING ; "licensing")]
    #[test_case("Do you have a REST API?", API ; "api")]
    #[test_case("Tell me a joke", DEFAULT_ANSWER ; "fallback answer")]
    fn test_mock_answer_by_keyword(prompt: &str, expected: &str) {
        assert_eq!(MockProvider::answer(prompt), expected);
    }

    #[test]
    fn test_hi_matches_whole_word_only() {
        assert_ne!(MockProvider::answer("this history"), GREETING);
    }

    #[tokio::test]
    async fn test_mock_provider_generates_text() {
        let provider = MockProvider::new();
        let prompt = Prompt::parse("what is the price?").unwrap();

        assert_eq!(provider.name(), "Mock (Test Mode)");
        assert_eq!(provider.generate_text(&prompt, Uuid::new_v4()).await.unwrap(), PRICING);
    }

    #[tokio::test]
    async fn test_scripted_provider_counts_calls_across_clones() {
        let provider = ScriptedProvider::failing("A", "rate limited");
        let handle = provider.clone();
        let prompt = Prompt::parse("hi").unwrap();

        let err = provider.generate_text(&prompt, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.to_string(), "rate limited");
        provider.generate_text(&prompt, Uuid::new_v4()).await.unwrap_err();

        assert_eq!(handle.calls(), 2);
    }
}
