// tests/controller_test.rs — Integration test: full conversation turns with mock provider

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use chatx::core::controller::ChatController;
use chatx::core::limiter::CooldownGate;
use chatx::core::message::Role;
use chatx::core::persist::SharedStore;
use chatx::infra::config::ChatConfig;
use chatx::infra::errors::{ChatError, COOLDOWN_TEXT, UPSTREAM_RATE_LIMIT_TEXT};
use chatx::provider::gateway::CompletionGateway;
use chatx::provider::{CompletionProvider, CompletionRequest, CompletionResponse};

/// A mock provider that returns canned responses without making any network calls.
struct MockProvider {
    id: &'static str,
    model: &'static str,
    reply: Result<&'static str, fn(&str) -> ChatError>,
    calls: AtomicU32,
}

impl MockProvider {
    fn replying(reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            id: "groq",
            model: "llama-3.3-70b-versatile",
            reply: Ok(reply),
            calls: AtomicU32::new(0),
        })
    }

    fn named(id: &'static str, model: &'static str, reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            id,
            model,
            reply: Ok(reply),
            calls: AtomicU32::new(0),
        })
    }

    fn failing(make: fn(&str) -> ChatError) -> Arc<Self> {
        Arc::new(Self {
            id: "groq",
            model: "llama-3.3-70b-versatile",
            reply: Err(make),
            calls: AtomicU32::new(0),
        })
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    fn id(&self) -> &str {
        self.id
    }

    fn name(&self) -> &str {
        "Mock Provider"
    }

    fn description(&self) -> &str {
        "Canned responses for tests"
    }

    fn default_model(&self) -> &str {
        self.model
    }

    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, ChatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(CompletionResponse {
                content: text.to_string(),
            }),
            Err(make) => Err(make(self.id)),
        }
    }
}

fn controller_with(provider: Arc<MockProvider>, cooldown_ms: u64) -> ChatController {
    let providers: Vec<Arc<dyn CompletionProvider>> = vec![provider];
    let gateway = Arc::new(CompletionGateway::new(providers, &ChatConfig::default()));
    ChatController::new(
        SharedStore::in_memory(),
        gateway,
        CooldownGate::from_millis(cooldown_ms),
    )
}

#[tokio::test]
async fn test_turn_appends_user_and_assistant() {
    let provider = MockProvider::replying("hi there");
    let controller = controller_with(provider.clone(), 0);

    let turn = controller.submit("hello", None).await.unwrap();

    assert_eq!(turn.user.role, Role::User);
    assert_eq!(turn.user.content, "hello");
    assert_eq!(turn.assistant.role, Role::Assistant);
    assert_eq!(turn.assistant.content, "hi there");
    assert_eq!(
        turn.assistant.model.as_deref(),
        Some("llama-3.3-70b-versatile")
    );

    let store = controller.store();
    let session = store.current_session().unwrap();
    assert_eq!(session.messages.len(), 2);
    assert!(!store.is_loading());
    assert!(store.error().is_none());
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_asterisks_stripped_from_reply() {
    let provider = MockProvider::replying("**Rust** is *great*");
    let controller = controller_with(provider, 0);

    let turn = controller.submit("tell me", None).await.unwrap();
    assert_eq!(turn.assistant.content, "Rust is great");
}

#[tokio::test]
async fn test_second_submission_within_cooldown_gets_fixed_copy() {
    let provider = MockProvider::replying("hi there");
    // Wide window so the second turn always lands inside it.
    let controller = controller_with(provider.clone(), 60_000);

    controller.submit("first", None).await.unwrap();
    let denied = controller.submit("second", None).await.unwrap();

    assert_eq!(denied.assistant.content, COOLDOWN_TEXT);
    assert!(denied.assistant.model.is_none());
    // The provider was never consulted for the denied turn.
    assert_eq!(provider.call_count(), 1);

    let store = controller.store();
    let session = store.current_session().unwrap();
    assert_eq!(session.messages.len(), 4);
    let error = store.error().unwrap();
    assert!(error.contains("retry in"), "unexpected error: {error}");
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_upstream_rate_limit_lands_fixed_copy() {
    let provider = MockProvider::failing(|id| ChatError::UpstreamRateLimited {
        provider: id.to_string(),
        retry_after_ms: 60_000,
    });
    let controller = controller_with(provider, 0);

    let turn = controller.submit("hello", None).await.unwrap();
    assert_eq!(turn.assistant.content, UPSTREAM_RATE_LIMIT_TEXT);

    let store = controller.store();
    assert!(!store.is_loading());
    assert!(store.error().is_some());
}

#[tokio::test]
async fn test_provider_failure_lands_failure_copy() {
    let provider = MockProvider::failing(|id| ChatError::Provider {
        provider: id.to_string(),
        message: "connection reset".into(),
    });
    let controller = controller_with(provider, 0);

    let turn = controller.submit("hello", None).await.unwrap();
    assert_eq!(
        turn.assistant.content,
        "Failed to generate response: connection reset"
    );
    assert!(!controller.store().is_loading());
}

#[tokio::test]
async fn test_blank_input_rejected_without_append() {
    let provider = MockProvider::replying("hi there");
    let controller = controller_with(provider.clone(), 0);

    let err = controller.submit("   ", None).await.unwrap_err();
    assert!(matches!(err, ChatError::InvalidInput));
    assert!(controller
        .store()
        .current_session()
        .unwrap()
        .messages
        .is_empty());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_selector_routes_to_named_provider() {
    let groq = MockProvider::named("groq", "llama-3.3-70b-versatile", "from groq");
    let gemini = MockProvider::named("gemini", "gemini-1.5-flash", "from gemini");
    let providers: Vec<Arc<dyn CompletionProvider>> = vec![groq.clone(), gemini.clone()];
    let gateway = Arc::new(CompletionGateway::new(providers, &ChatConfig::default()));
    let controller = ChatController::new(
        SharedStore::in_memory(),
        gateway,
        CooldownGate::from_millis(0),
    );

    let turn = controller.submit("hello", Some("gemini")).await.unwrap();
    assert_eq!(turn.assistant.content, "from gemini");
    assert_eq!(turn.assistant.model.as_deref(), Some("gemini-1.5-flash"));
    assert_eq!(gemini.call_count(), 1);
    assert_eq!(groq.call_count(), 0);
}

#[tokio::test]
async fn test_turns_persist_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat-storage.json");

    let providers: Vec<Arc<dyn CompletionProvider>> =
        vec![MockProvider::replying("hi there")];
    let gateway = Arc::new(CompletionGateway::new(providers, &ChatConfig::default()));
    let controller = ChatController::new(
        SharedStore::open(path.clone()),
        gateway,
        CooldownGate::from_millis(0),
    );
    controller.submit("hello", None).await.unwrap();
    drop(controller);

    let reopened = SharedStore::open(path);
    let session = reopened.current_session().unwrap();
    assert_eq!(session.messages.len(), 2);
    assert_eq!(session.messages[0].content, "hello");
    assert_eq!(session.messages[1].content, "hi there");
    assert_eq!(
        session.messages[1].model.as_deref(),
        Some("llama-3.3-70b-versatile")
    );
}
