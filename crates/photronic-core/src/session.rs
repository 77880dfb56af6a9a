//! Editor session: the single top-level controller.
//!
//! Owns the configuration, the signed-in account, the orchestrator and the
//! rendering surface. Sign-in and sign-out both reset the editor.

use std::sync::Arc;

use photronic_types::models::{CreditPackage, Point, Style};
use photronic_types::{
    Account, AppConfig, ChatMessage, ElementKind, Geometry, LlmConfig, PlanError, SceneElement,
    SessionError, TypedError,
};
use tracing::info;

use crate::modules::config::validate_config;
use crate::modules::ledger::{CreditLedger, MemoryLedger};
use crate::orchestrator::{CycleOutcome, CycleState, Orchestrator};
use crate::provider::{ChatProvider, ProviderAdapter};
use crate::scene::{MemorySurface, RenderSurface, SceneModel};

pub struct EditorSession<S: RenderSurface = MemorySurface> {
    config: AppConfig,
    orchestrator: Orchestrator,
    surface: S,
    signed_in: bool,
}

impl<S: RenderSurface> EditorSession<S> {
    /// Build a session using the provider selected in `config`.
    ///
    /// The configuration is validated first, as in [`Self::apply_config`].
    pub fn new(config: AppConfig, surface: S) -> Result<Self, TypedError> {
        validate_config(&config)?;
        let provider = ProviderAdapter::from_config(&config.llm)?;
        Ok(Self::with_provider(config, Arc::new(provider), surface))
    }

    /// Build a session around an explicit provider.
    pub fn with_provider(config: AppConfig, provider: Arc<dyn ChatProvider>, surface: S) -> Self {
        let ledger = Box::new(MemoryLedger::new(Account::new("", 0)));
        let orchestrator = Orchestrator::new(provider, ledger, &config);
        Self { config, orchestrator, surface, signed_in: false }
    }

    /// Sign in with an in-memory ledger for `account`.
    pub fn sign_in(&mut self, account: Account) {
        self.sign_in_with_ledger(Box::new(MemoryLedger::new(account)));
    }

    /// Sign in against an external ledger.
    pub fn sign_in_with_ledger(&mut self, ledger: Box<dyn CreditLedger>) {
        self.reset();
        let account = ledger.account();
        self.orchestrator.set_ledger(ledger);
        self.signed_in = true;
        info!("Signed in as {} ({} credits)", account.name, account.credits);
    }

    pub fn sign_out(&mut self) {
        self.reset();
        self.orchestrator.set_ledger(Box::new(MemoryLedger::new(Account::new("", 0))));
        self.signed_in = false;
        info!("Signed out");
    }

    pub const fn is_signed_in(&self) -> bool {
        self.signed_in
    }

    pub fn account(&self) -> Option<Account> {
        self.signed_in.then(|| self.orchestrator.account())
    }

    /// Add a package's credits to the account. Payment happens elsewhere.
    pub fn purchase_credits(&mut self, package: CreditPackage) -> Result<Account, TypedError> {
        self.require_sign_in()?;
        let delta = i64::try_from(package.credits).unwrap_or(i64::MAX);
        let account = self.orchestrator.adjust_credits(delta)?;
        info!("Purchased {} credits for ${:.2}", package.credits, package.price);
        Ok(account)
    }

    /// Place an uploaded image at the origin with its natural size, locked.
    pub fn upload_image(
        &mut self,
        file_id: &str,
        mime_type: Option<String>,
        width: f64,
        height: f64,
    ) -> Result<SceneElement, TypedError> {
        self.require_sign_in()?;
        let geometry = Geometry::new(0.0, 0.0, width, height);
        if !geometry.has_positive_size() {
            return Err(PlanError::InvalidGeometry { target: file_id.to_string(), width, height }.into());
        }

        self.pull_surface();
        let scene = self.orchestrator.scene();
        let base = format!("image-{}", chrono::Utc::now().timestamp_millis());
        let mut id = base.clone();
        let mut n = 2;
        while scene.contains_id(&id) {
            id = format!("{}-{}", base, n);
            n += 1;
        }

        let mut element = SceneElement::new(
            id,
            ElementKind::Image { file_id: file_id.to_string(), mime_type },
            geometry,
        );
        element.style = Style::transparent();
        element.locked = true;
        element.z_index = scene.next_z_index();

        self.orchestrator.insert_element(element.clone())?;
        self.push_surface();
        info!("Uploaded image {} as {} ({}x{})", file_id, element.id, width, height);
        Ok(element)
    }

    /// Lock or unlock an element on the user's behalf.
    pub fn set_element_locked(&mut self, id: &str, locked: bool) -> Result<(), TypedError> {
        self.pull_surface();
        let mut scene = self.orchestrator.scene();
        scene.set_locked(id, locked)?;
        self.orchestrator.replace_scene(scene);
        self.push_surface();
        Ok(())
    }

    /// Switch provider settings. The new adapter is used from the next message on.
    pub fn update_llm_config(&mut self, llm: LlmConfig) -> Result<(), TypedError> {
        let mut next = self.config.clone();
        next.llm = llm;
        self.apply_config(next)
    }

    /// Replace the whole configuration (provider, history window, pricing).
    ///
    /// Nothing changes if the new configuration is invalid.
    pub fn apply_config(&mut self, config: AppConfig) -> Result<(), TypedError> {
        validate_config(&config)?;
        let provider = ProviderAdapter::from_config(&config.llm)?;
        self.orchestrator.set_provider(Arc::new(provider));
        self.orchestrator.apply_config(&config);
        self.config = config;
        Ok(())
    }

    /// Run one edit cycle, syncing the surface before and after.
    pub async fn send_message(&mut self, text: &str) -> Result<CycleOutcome, TypedError> {
        self.require_sign_in()?;
        if !self.orchestrator.is_busy() {
            self.pull_surface();
        }
        let outcome = self.orchestrator.submit(text).await?;
        if matches!(outcome, CycleOutcome::Completed { .. }) {
            self.push_surface();
        }
        Ok(outcome)
    }

    /// Start over: cancel any cycle, clear chat and canvas.
    pub fn reset(&mut self) {
        self.orchestrator.reset();
        self.surface.reset_scene();
    }

    pub fn hit_test(&self, point: Point) -> Option<String> {
        self.surface.hit_test(point)
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        self.orchestrator.messages()
    }

    pub fn scene(&self) -> SceneModel {
        self.orchestrator.scene()
    }

    pub fn state(&self) -> CycleState {
        self.orchestrator.state()
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Handle for cancelling from another task.
    pub fn orchestrator(&self) -> Orchestrator {
        self.orchestrator.clone()
    }

    pub const fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn require_sign_in(&self) -> Result<(), SessionError> {
        if self.signed_in {
            Ok(())
        } else {
            Err(SessionError::NotSignedIn)
        }
    }

    /// Adopt edits the user made directly on the canvas.
    fn pull_surface(&mut self) {
        let exported = self.surface.export_elements();
        let scene = self.orchestrator.scene();
        if exported.as_slice() != scene.elements() {
            self.orchestrator.replace_scene(SceneModel::from_elements(exported));
        }
    }

    fn push_surface(&mut self) {
        let scene = self.orchestrator.scene();
        self.surface.render(scene.elements());
    }
}
