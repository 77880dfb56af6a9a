//! Edit-cycle orchestrator.
//!
//! Drives one user submission through provider call, plan validation and
//! atomic application. Exactly one cycle may be in flight; a second submit
//! fails fast with `Busy`. All shared state sits behind a `parking_lot::Mutex`
//! that is never held across an `.await`.
//!
//! Cancellation bumps an epoch counter and fires the cycle's token, so a
//! late provider reply can never touch the scene.

mod guard;
mod state;

pub use state::CycleState;

use std::sync::Arc;

use parking_lot::Mutex;
use photronic_types::models::{ConversationConfig, CostTable};
use photronic_types::{Account, AppConfig, ChatMessage, PlanError, ProviderError, SessionError, TypedError};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use self::guard::CycleGuard;
use crate::conversation::Conversation;
use crate::edit::{self, AppliedOperation, AppliedResult};
use crate::modules::ledger::CreditLedger;
use crate::provider::{ChatProvider, ProviderResponse};
use crate::scene::SceneModel;

/// How a submitted message ended.
///
/// Input rejected before it entered the conversation (`EmptyInput`, `Busy`)
/// is returned as `Err` from [`Orchestrator::submit`] instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// The plan was applied (possibly a conversational no-op) and the reply appended
    Completed { reply: ChatMessage, applied: Vec<AppliedOperation>, cost: u64 },
    /// The cycle failed; the error was appended as an `Error: ...` turn
    Failed { error: TypedError, reply: ChatMessage },
    /// The cycle was cancelled; nothing was appended
    Cancelled,
}

impl CycleOutcome {
    /// Model turn appended by this cycle, if any.
    pub const fn reply(&self) -> Option<&ChatMessage> {
        match self {
            Self::Completed { reply, .. } | Self::Failed { reply, .. } => Some(reply),
            Self::Cancelled => None,
        }
    }

    pub const fn error(&self) -> Option<&TypedError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            Self::Completed { .. } | Self::Cancelled => None,
        }
    }
}

struct Shared {
    state: CycleState,
    /// Incremented on every cycle start and every cancellation
    epoch: u64,
    cancel: Option<CancellationToken>,
    conversation: Conversation,
    scene: SceneModel,
    ledger: Box<dyn CreditLedger>,
    provider: Arc<dyn ChatProvider>,
    conversation_config: ConversationConfig,
    costs: CostTable,
}

impl Shared {
    fn transition(&mut self, next: CycleState) {
        if !self.state.can_transition_to(next) {
            warn!("Unexpected cycle transition {} -> {}", self.state, next);
        }
        debug!("Cycle {}: {} -> {}", self.epoch, self.state, next);
        self.state = next;
        if next.is_idle() {
            self.cancel = None;
        }
    }

    fn cancel_in_flight(&mut self) -> bool {
        let Some(token) = self.cancel.take() else {
            return false;
        };
        token.cancel();
        self.epoch = self.epoch.wrapping_add(1);
        self.state = CycleState::Idle;
        info!("Edit cycle cancelled");
        true
    }

    fn fail(&mut self, error: TypedError) -> CycleOutcome {
        warn!("Edit cycle {} failed: {}", self.epoch, error);
        let reply = self.conversation.append_error(&error);
        self.transition(CycleState::Idle);
        CycleOutcome::Failed { error, reply }
    }

    /// Validating and Applying run back to back under one lock.
    fn finish(&mut self, response: &ProviderResponse) -> CycleOutcome {
        self.transition(CycleState::Validating);
        let plan = match edit::parse(&response.text, &self.scene) {
            Ok(plan) => plan,
            Err(e) => return self.fail(e.into()),
        };

        self.transition(CycleState::Applying);
        let account = self.ledger.account();
        let result = match edit::apply(&plan, &self.scene, &account, &self.costs) {
            Ok(result) => result,
            Err(e) => return self.fail(e.into()),
        };
        if result.cost > 0 {
            let delta = i64::try_from(result.cost).map_or(i64::MIN, |cost| -cost);
            if let Err(e) = self.ledger.adjust_credits(delta) {
                return self.fail(e.into());
            }
        }

        let reply_text = compose_reply(&plan.prose, &result);
        let AppliedResult { scene, applied, cost, .. } = result;
        self.scene = scene;
        let reply = self.conversation.append_model_message(reply_text);
        info!("Edit cycle {} applied {} operation(s) for {} credit(s)", self.epoch, applied.len(), cost);
        self.transition(CycleState::Idle);
        CycleOutcome::Completed { reply, applied, cost }
    }
}

/// Text of the success turn: prose, change summary, credits used.
fn compose_reply(prose: &str, result: &AppliedResult) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !prose.trim().is_empty() {
        parts.push(prose.trim().to_string());
    }
    if !result.summary.is_empty() {
        parts.push(result.summary.clone());
    }
    if result.cost > 0 {
        let unit = if result.cost == 1 { "credit" } else { "credits" };
        parts.push(format!("Used {} {} ({} left).", result.cost, unit, result.account.credits));
    }
    if parts.is_empty() {
        return "No changes were made.".to_string();
    }
    parts.join("\n\n")
}

/// Cloneable handle; clones share the same conversation, scene and ledger.
#[derive(Clone)]
pub struct Orchestrator {
    shared: Arc<Mutex<Shared>>,
}

impl Orchestrator {
    pub fn new(provider: Arc<dyn ChatProvider>, ledger: Box<dyn CreditLedger>, config: &AppConfig) -> Self {
        let shared = Shared {
            state: CycleState::Idle,
            epoch: 0,
            cancel: None,
            conversation: Conversation::new(),
            scene: SceneModel::new(),
            ledger,
            provider,
            conversation_config: config.conversation.clone(),
            costs: config.edit.costs,
        };
        Self { shared: Arc::new(Mutex::new(shared)) }
    }

    /// Run one edit cycle for `text`.
    ///
    /// Returns `Err` only for input rejected up front (`EmptyInput`, `Busy`);
    /// every other failure is surfaced as an `Error: ...` turn inside
    /// [`CycleOutcome::Failed`].
    pub async fn submit(&self, text: &str) -> Result<CycleOutcome, TypedError> {
        let (request, provider, cancel, epoch) = {
            let mut shared = self.shared.lock();
            if !shared.state.is_idle() {
                return Err(SessionError::Busy { state: shared.state.to_string() }.into());
            }
            shared.conversation.append_user_message(text)?;

            let summary = shared.scene.summary();
            let request = shared.conversation.build_request(&summary, &shared.conversation_config);
            let cancel = CancellationToken::new();
            shared.epoch = shared.epoch.wrapping_add(1);
            shared.cancel = Some(cancel.clone());
            shared.transition(CycleState::AwaitingResponse);
            (request, Arc::clone(&shared.provider), cancel, shared.epoch)
        };

        let guard = CycleGuard::new(Arc::clone(&self.shared), epoch);
        info!("Edit cycle {} started via {} ({} turn(s))", epoch, provider.name(), request.turns.len());
        let result = provider.complete(&request, &cancel).await;

        let mut shared = self.shared.lock();
        if shared.epoch != epoch || cancel.is_cancelled() {
            debug!("Edit cycle {} cancelled, discarding provider result", epoch);
            drop(shared);
            guard.release();
            return Ok(CycleOutcome::Cancelled);
        }

        let outcome = match result {
            Ok(response) => shared.finish(&response),
            Err(ProviderError::Cancelled) => {
                shared.transition(CycleState::Idle);
                CycleOutcome::Cancelled
            },
            Err(e) => shared.fail(e.into()),
        };
        drop(shared);
        guard.release();
        Ok(outcome)
    }

    /// Abort the in-flight cycle, if any. Nothing is appended to the conversation.
    pub fn cancel(&self) -> bool {
        self.shared.lock().cancel_in_flight()
    }

    /// Cancel any cycle, clear the conversation and empty the scene.
    ///
    /// Runs under one lock so no cycle can start between the cancel and the clear.
    pub fn reset(&self) {
        let mut shared = self.shared.lock();
        shared.cancel_in_flight();
        shared.epoch = shared.epoch.wrapping_add(1);
        shared.conversation.clear();
        shared.scene = SceneModel::new();
        debug!("Orchestrator reset");
    }

    pub fn state(&self) -> CycleState {
        self.shared.lock().state
    }

    pub fn is_busy(&self) -> bool {
        !self.state().is_idle()
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.shared.lock().conversation.messages().to_vec()
    }

    pub fn scene(&self) -> SceneModel {
        self.shared.lock().scene.clone()
    }

    pub fn account(&self) -> Account {
        self.shared.lock().ledger.account()
    }

    /// Replace the scene, e.g. with edits the user made directly on the canvas.
    pub fn replace_scene(&self, scene: SceneModel) {
        self.shared.lock().scene = scene;
    }

    /// Add an element outside an edit cycle (image uploads).
    pub fn insert_element(&self, element: photronic_types::SceneElement) -> Result<(), PlanError> {
        self.shared.lock().scene.insert(element)
    }

    /// Apply a balance change through the ledger (purchases).
    pub fn adjust_credits(&self, delta: i64) -> Result<Account, PlanError> {
        self.shared.lock().ledger.adjust_credits(delta)
    }

    pub fn set_ledger(&self, ledger: Box<dyn CreditLedger>) {
        self.shared.lock().ledger = ledger;
    }

    /// Swap the provider. A cycle already in flight keeps the old one.
    pub fn set_provider(&self, provider: Arc<dyn ChatProvider>) {
        let mut shared = self.shared.lock();
        info!("Provider set to {}", provider.name());
        shared.provider = provider;
    }

    /// Pick up conversation and pricing settings.
    pub fn apply_config(&self, config: &AppConfig) {
        let mut shared = self.shared.lock();
        shared.conversation_config = config.conversation.clone();
        shared.costs = config.edit.costs;
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shared = self.shared.lock();
        f.debug_struct("Orchestrator")
            .field("state", &shared.state)
            .field("epoch", &shared.epoch)
            .field("turns", &shared.conversation.len())
            .field("elements", &shared.scene.live_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::ledger::MemoryLedger;
    use crate::provider::ProviderRequest;
    use async_trait::async_trait;

    struct Fixed(&'static str);

    #[async_trait]
    impl ChatProvider for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn complete(
            &self,
            _request: &ProviderRequest,
            _cancel: &CancellationToken,
        ) -> Result<ProviderResponse, ProviderError> {
            Ok(ProviderResponse::new(self.0, "test"))
        }
    }

    /// Never answers; only cancellation ends the call.
    struct Hanging;

    #[async_trait]
    impl ChatProvider for Hanging {
        fn name(&self) -> &'static str {
            "hanging"
        }

        async fn complete(
            &self,
            _request: &ProviderRequest,
            cancel: &CancellationToken,
        ) -> Result<ProviderResponse, ProviderError> {
            cancel.cancelled().await;
            Err(ProviderError::Cancelled)
        }
    }

    fn orchestrator(provider: Arc<dyn ChatProvider>, credits: u64) -> Orchestrator {
        Orchestrator::new(
            provider,
            Box::new(MemoryLedger::new(Account::new("Tester", credits))),
            &AppConfig::new(),
        )
    }

    #[tokio::test]
    async fn test_empty_input_is_rejected_without_a_turn() {
        let orchestrator = orchestrator(Arc::new(Fixed("hi")), 1);
        let err = orchestrator.submit("   ").await.unwrap_err();
        assert_eq!(err, TypedError::Session(SessionError::EmptyInput));
        assert!(orchestrator.messages().is_empty());
        assert_eq!(orchestrator.state(), CycleState::Idle);
    }

    #[tokio::test]
    async fn test_conversational_reply() {
        let orchestrator = orchestrator(Arc::new(Fixed("Hello there.")), 1);
        let outcome = orchestrator.submit("hi").await.unwrap();

        assert!(matches!(&outcome, CycleOutcome::Completed { cost: 0, .. }));
        assert_eq!(outcome.reply().map(|r| r.content.as_str()), Some("Hello there."));
        assert_eq!(orchestrator.messages().len(), 2);
        assert_eq!(orchestrator.account().credits, 1);
    }

    #[tokio::test]
    async fn test_malformed_plan_is_surfaced() {
        let orchestrator = orchestrator(Arc::new(Fixed("<edit_plan>{oops</edit_plan>")), 1);
        let outcome = orchestrator.submit("draw").await.unwrap();

        let reply = outcome.reply().unwrap();
        assert!(reply.is_error);
        assert!(reply.content.starts_with("Error: Could not understand the edit plan"));
        assert!(matches!(outcome.error(), Some(TypedError::Plan(PlanError::MalformedPlan { .. }))));
        assert_eq!(orchestrator.state(), CycleState::Idle);
    }

    #[tokio::test]
    async fn test_dropped_submit_returns_to_idle() {
        let orchestrator = orchestrator(Arc::new(Hanging), 1);
        {
            let pending = orchestrator.submit("hello");
            tokio::pin!(pending);
            // Poll once so the cycle starts, then drop it
            assert!(futures::poll!(pending.as_mut()).is_pending());
            assert_eq!(orchestrator.state(), CycleState::AwaitingResponse);
        }
        assert_eq!(orchestrator.state(), CycleState::Idle);
        assert_eq!(orchestrator.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_reset_mid_cycle_cancels_and_clears() {
        let orchestrator = orchestrator(Arc::new(Hanging), 1);
        let other = orchestrator.clone();

        let pending = orchestrator.submit("hello");
        tokio::pin!(pending);
        assert!(futures::poll!(pending.as_mut()).is_pending());
        assert_eq!(other.messages().len(), 1);

        other.reset();
        assert_eq!(other.state(), CycleState::Idle);
        assert!(other.messages().is_empty());

        assert_eq!(pending.await.unwrap(), CycleOutcome::Cancelled);
        assert!(orchestrator.messages().is_empty());
        assert!(orchestrator.scene().is_empty());
        assert!(!other.cancel());
    }

    #[tokio::test]
    async fn test_cancel_without_cycle_is_noop() {
        let orchestrator = orchestrator(Arc::new(Fixed("hi")), 1);
        assert!(!orchestrator.cancel());
    }

    #[test]
    fn test_compose_reply_mentions_credits() {
        let result = AppliedResult {
            scene: SceneModel::new(),
            account: Account::new("Tester", 4),
            applied: Vec::new(),
            cost: 1,
            summary: "Added ellipse shape-1".to_string(),
        };
        assert_eq!(
            compose_reply("Here you go.", &result),
            "Here you go.\n\nAdded ellipse shape-1\n\nUsed 1 credit (4 left)."
        );
    }
}
