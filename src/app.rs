use crate::config::Config;
use crate::cycle::FeedCycle;
use crate::feed::{Article, Category, FetchError};
use crate::guard::{ExitDecision, UnsavedChangesGuard};
use crate::keybindings::KeybindingRegistry;
use crate::menu::{MenuController, MenuItem};
use crate::session::{Admission, CredentialError, CredentialStore, Session};
use crate::theme::{ThemeController, ThemeVariant};
use crate::translate::Language;
use crate::ui::helpers::catch_task_panic;
use crate::util::validate_url_for_open;
use anyhow::Result;
use ratatui::style::Style;
use reqwest::redirect::Policy;
use std::borrow::Cow;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// How long a status message stays visible.
const STATUS_TTL_SECS: u64 = 3;

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Redirect policy: at most 3 hops, no loops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }
        if attempt.previous().iter().any(|prev| prev == attempt.url()) {
            return attempt.error("Redirect loop detected");
        }
        attempt.follow()
    })
}

/// Shared HTTP client for headline, translation and account requests.
pub fn build_http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .redirect(create_redirect_policy())
        .pool_max_idle_per_host(8)
        .pool_idle_timeout(std::time::Duration::from_secs(30))
        .tcp_keepalive(std::time::Duration::from_secs(60))
        .timeout(std::time::Duration::from_secs(30))
        .build()?;
    Ok(client)
}

// ============================================================================
// View and Event Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    /// Entry screen shown when no user is signed in.
    SignedOut,
}

/// Why a fetch cycle was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Mount,
    Selection,
    Refresh,
}

/// Headlines on display plus the state of the latest cycle.
#[derive(Debug, Default)]
pub struct FetchState {
    pub loading: bool,
    pub articles: Vec<Article>,
    pub last_error: Option<String>,
}

/// Events from background tasks
#[derive(Debug)]
pub enum AppEvent {
    /// A fetch cycle finished.
    ///
    /// `generation` is the counter value when the cycle was started; results
    /// from anything but the latest cycle are dropped.
    FeedLoaded {
        generation: u64,
        result: Result<Vec<Article>, FetchError>,
    },
    /// A background task panicked. Settles the cycle it belonged to.
    TaskPanicked {
        task: &'static str,
        generation: u64,
        error: String,
    },
}

// ============================================================================
// Application State
// ============================================================================

/// Dashboard state and the orchestration of fetch cycles.
pub struct App {
    pub cycle: FeedCycle,
    pub credentials: CredentialStore,
    pub session: Session,

    pub view: View,
    pub category: Category,
    pub language: Language,
    pub feed: FetchState,

    /// Incremented per triggered cycle. Only the cycle carrying the current
    /// value may publish its result.
    pub generation: u64,
    /// In-flight cycles. Not cancelled by newer cycles; aborted on drop.
    pub cycle_handles: Vec<JoinHandle<()>>,

    pub menu: MenuController,
    pub theme: ThemeController,
    pub unsaved: UnsavedChangesGuard,
    pub keybindings: KeybindingRegistry,

    pub selected_article: usize,
    /// Showing the "quit anyway?" prompt.
    pub confirm_quit: bool,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    /// Current frame of the loading spinner animation.
    pub spinner_frame: usize,
}

impl App {
    pub fn new(config: &Config, cycle: FeedCycle, credentials: CredentialStore) -> Self {
        let session = credentials.session();

        let category = Category::from_str_name(&config.default_category).unwrap_or_else(|| {
            tracing::warn!(category = %config.default_category, "Unknown default category, using General");
            Category::default()
        });
        let language = Language::from_code(&config.default_language).unwrap_or_else(|| {
            tracing::warn!(language = %config.default_language, "Unsupported default language, using en");
            Language::default()
        });
        let variant = ThemeVariant::from_str_name(&config.theme).unwrap_or_else(|| {
            tracing::warn!(theme = %config.theme, "Unknown theme, using light");
            ThemeVariant::Light
        });

        let mut keybindings = KeybindingRegistry::new();
        for warning in keybindings.apply_overrides(&config.keybindings) {
            tracing::warn!("{}", warning);
        }

        let view = match session.admit() {
            Admission::Allow => View::Dashboard,
            Admission::Redirect => View::SignedOut,
        };

        Self {
            cycle,
            credentials,
            session,
            view,
            category,
            language,
            feed: FetchState::default(),
            generation: 0,
            cycle_handles: Vec::new(),
            menu: MenuController::new(),
            theme: ThemeController::new(variant),
            unsaved: UnsavedChangesGuard::new(),
            keybindings,
            selected_article: 0,
            confirm_quit: false,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
        }
    }

    pub fn style(&self, role: &str) -> Style {
        self.theme.style(role)
    }

    // ========================================================================
    // Fetch cycles
    // ========================================================================

    /// Check the session; switch to the entry screen when nobody is signed in.
    pub fn admit(&mut self) -> Admission {
        let admission = self.session.admit();
        if admission == Admission::Redirect && self.view != View::SignedOut {
            tracing::info!("No signed-in user, showing entry screen");
            self.view = View::SignedOut;
            self.menu.close();
            self.needs_redraw = true;
        }
        admission
    }

    /// Re-read the credential store, e.g. after `newsfeed login` ran in
    /// another terminal. Starts a cycle if someone is now signed in.
    pub fn reload_session(&mut self, event_tx: &mpsc::Sender<AppEvent>) -> bool {
        self.session = self.credentials.session();
        if self.session.admit() == Admission::Redirect {
            self.set_status("Not signed in");
            return false;
        }
        self.view = View::Dashboard;
        self.needs_redraw = true;
        self.trigger_cycle(Trigger::Mount, event_tx)
    }

    /// Start a fetch → filter → translate cycle for the current selection.
    ///
    /// Returns `false` without doing anything when the session gate redirects.
    pub fn trigger_cycle(&mut self, trigger: Trigger, event_tx: &mpsc::Sender<AppEvent>) -> bool {
        if self.admit() == Admission::Redirect {
            return false;
        }
        if trigger == Trigger::Selection {
            self.unsaved.mark_dirty();
        }

        self.generation += 1;
        let generation = self.generation;
        self.feed.loading = true;
        self.needs_redraw = true;

        let cycle = self.cycle.clone();
        let (category, language) = (self.category, self.language);
        let tx = event_tx.clone();

        tracing::debug!(
            generation,
            category = %category,
            language = %language,
            ?trigger,
            "Starting fetch cycle"
        );

        self.cycle_handles.retain(|h| !h.is_finished());
        self.cycle_handles.push(tokio::spawn(async move {
            let event = match catch_task_panic(cycle.run(category, language)).await {
                Ok(result) => AppEvent::FeedLoaded { generation, result },
                Err(error) => AppEvent::TaskPanicked {
                    task: "feed_cycle",
                    generation,
                    error,
                },
            };
            if tx.send(event).await.is_err() {
                tracing::debug!(generation, "Event channel closed, dropping cycle result");
            }
        }));

        true
    }

    /// Apply a finished cycle. Returns `false` if the result was stale.
    pub fn apply_feed_loaded(
        &mut self,
        generation: u64,
        result: Result<Vec<Article>, FetchError>,
    ) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "Discarding stale fetch cycle result"
            );
            return false;
        }

        self.feed.loading = false;
        match result {
            Ok(articles) => {
                tracing::info!(count = articles.len(), generation, "Headlines updated");
                self.feed.articles = articles;
                self.feed.last_error = None;
                self.selected_article = 0;
                self.unsaved.reset();
            }
            Err(e) => {
                tracing::warn!(error = %e, generation, "Fetch cycle failed, keeping previous headlines");
                self.set_status(format!("Failed to load headlines: {}", e));
                self.feed.last_error = Some(e.to_string());
            }
        }
        self.needs_redraw = true;
        true
    }

    /// Settle a cycle whose task panicked.
    pub fn apply_task_panicked(&mut self, task: &'static str, generation: u64, error: String) {
        tracing::error!(task, generation, error = %error, "Background task panicked");
        if generation == self.generation {
            self.feed.loading = false;
            self.feed.last_error = Some(format!("Internal error in {} task", task));
        }
        self.set_status(format!("Internal error in {} task", task));
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::FeedLoaded { generation, result } => {
                self.apply_feed_loaded(generation, result);
            }
            AppEvent::TaskPanicked {
                task,
                generation,
                error,
            } => self.apply_task_panicked(task, generation, error),
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn select_category(&mut self, category: Category, event_tx: &mpsc::Sender<AppEvent>) {
        if category == self.category {
            return;
        }
        self.category = category;
        self.trigger_cycle(Trigger::Selection, event_tx);
    }

    pub fn select_language(&mut self, language: Language, event_tx: &mpsc::Sender<AppEvent>) {
        if language == self.language {
            return;
        }
        self.language = language;
        self.trigger_cycle(Trigger::Selection, event_tx);
    }

    pub fn refresh(&mut self, event_tx: &mpsc::Sender<AppEvent>) {
        self.trigger_cycle(Trigger::Refresh, event_tx);
    }

    pub fn toggle_theme(&mut self) {
        let variant = self.theme.toggle();
        self.unsaved.mark_dirty();
        self.set_status(format!("Theme: {}", variant.name()));
        self.needs_redraw = true;
    }

    /// Run a menu entry. The menu closes afterwards.
    pub fn activate_menu_item(&mut self, item: MenuItem, event_tx: &mpsc::Sender<AppEvent>) {
        self.menu.close();
        match item {
            MenuItem::Category => self.select_category(self.category.next(), event_tx),
            MenuItem::Language => self.select_language(self.language.next(), event_tx),
            MenuItem::Theme => self.toggle_theme(),
            MenuItem::Logout => {
                if let Err(e) = self.logout() {
                    tracing::debug!(error = %e, "Signed out with a stale credential file");
                }
            }
            MenuItem::Close => {}
        }
        self.needs_redraw = true;
    }

    // ========================================================================
    // Article list
    // ========================================================================

    pub fn selected_article(&self) -> Option<&Article> {
        self.feed.articles.get(self.selected_article)
    }

    pub fn nav_up(&mut self) {
        self.selected_article = self.selected_article.saturating_sub(1);
    }

    pub fn nav_down(&mut self) {
        if !self.feed.articles.is_empty() {
            let max_index = self.feed.articles.len() - 1;
            self.selected_article = self.selected_article.saturating_add(1).min(max_index);
        }
    }

    /// Open the selected article's source page in the system browser.
    pub fn open_selected(&mut self) {
        let Some(url) = self.selected_article().and_then(|a| a.url.clone()) else {
            self.set_status("Article has no link");
            return;
        };
        match validate_url_for_open(&url) {
            Ok(url) => {
                if let Err(e) = open::that(url.as_str()) {
                    self.set_status(format!("Failed to open browser: {}", e));
                }
            }
            Err(e) => self.set_status(format!("Refusing to open link: {}", e)),
        }
    }

    // ========================================================================
    // Logout and quit
    // ========================================================================

    /// Sign out: forget the credential and reset per-user UI state.
    ///
    /// In-memory state is reset even when removing the credential file fails.
    pub fn logout(&mut self) -> Result<(), CredentialError> {
        let cleared = self.credentials.clear();

        self.theme.reset();
        self.unsaved.reset();
        self.menu.close();
        self.session.clear();
        // Invalidate cycles still in flight
        self.generation += 1;
        self.feed = FetchState::default();
        self.selected_article = 0;
        self.confirm_quit = false;
        self.view = View::SignedOut;
        self.needs_redraw = true;

        match &cleared {
            Ok(()) => tracing::info!("Logged out"),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to remove stored credential");
                self.set_status(format!("Logged out, but {}", e));
            }
        }
        cleared
    }

    /// Ask to quit. Returns `true` if the app may exit right away; otherwise
    /// the confirmation prompt is shown.
    pub fn request_quit(&mut self) -> bool {
        match self.unsaved.check_exit() {
            ExitDecision::Proceed => true,
            ExitDecision::Confirm => {
                self.confirm_quit = true;
                self.needs_redraw = true;
                false
            }
        }
    }

    // ========================================================================
    // Status line
    // ========================================================================

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear status message if expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

// ============================================================================
// Resource Cleanup
// ============================================================================

/// Abort in-flight cycles so no task outlives the event loop.
impl Drop for App {
    fn drop(&mut self) {
        for handle in self.cycle_handles.drain(..) {
            handle.abort();
        }
        self.menu.close();
    }
}
