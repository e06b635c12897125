//! Live preview: bridge configuration, change subscriptions, and the
//! refresh loop that re-fetches a page whenever an entry changes.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

use serde::{Deserialize, Serialize};
use stackpage_core::{Endpoints, PageRecord, Result, StackConfig};
use tokio::sync::{Notify, mpsc};

use crate::fetcher::PageFetcher;

// ============================================================================
// Bridge configuration
// ============================================================================

/// Settings handed to the browser-side live preview bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LivePreviewConfig {
    /// Server-side rendering mode. Always `false`; pages refresh client side.
    pub ssr: bool,
    /// Whether live preview is on.
    pub enable: bool,
    /// Bridge mode.
    pub mode: String,
    /// Stack identification.
    pub stack_details: StackDetails,
    /// Where the editing application lives.
    pub client_url_params: ClientUrlParams,
    /// Edit button behavior.
    pub edit_button: EditButtonConfig,
}

/// Stack identification for the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackDetails {
    /// Stack API key.
    pub api_key: String,
    /// Publishing environment.
    pub environment: String,
}

/// Location of the editing application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientUrlParams {
    /// Application host; unknown for custom regions without an override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

/// Edit button settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditButtonConfig {
    /// Show the edit button.
    pub enable: bool,
    /// Contexts where the button is hidden.
    pub exclude: Vec<String>,
}

impl Default for EditButtonConfig {
    fn default() -> Self {
        Self {
            enable: true,
            exclude: vec!["outsideLivePreviewPortal".to_string()],
        }
    }
}

impl LivePreviewConfig {
    /// Bridge mode used for visual building.
    pub const BUILDER_MODE: &'static str = "builder";

    /// Build the bridge settings for a stack.
    pub fn from_config(config: &StackConfig, endpoints: &Endpoints) -> Self {
        Self {
            ssr: false,
            enable: config.preview,
            mode: Self::BUILDER_MODE.to_string(),
            stack_details: StackDetails {
                api_key: config.api_key.clone(),
                environment: config.environment.clone(),
            },
            client_url_params: ClientUrlParams {
                host: endpoints.application.clone(),
            },
            edit_button: EditButtonConfig::default(),
        }
    }
}

// ============================================================================
// Subscriptions
// ============================================================================

/// Handle returned by [`LivePreview::on_entry_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Handler = Arc<dyn Fn() + Send + Sync>;

/// Entry-change notifications and the current editing-session hash.
///
/// When live preview is disabled, handlers are accepted but never stored,
/// so notifications reach nobody.
pub struct LivePreview {
    enabled: bool,
    next_id: AtomicU64,
    hash: RwLock<Option<String>>,
    handlers: RwLock<Vec<(SubscriptionId, Handler)>>,
}

impl fmt::Debug for LivePreview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LivePreview")
            .field("enabled", &self.enabled)
            .field("hash", &self.hash())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl LivePreview {
    /// Creates a subscription hub.
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            next_id: AtomicU64::new(1),
            hash: RwLock::new(None),
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Creates a hub enabled according to the stack's preview flag.
    pub fn from_config(config: &StackConfig) -> Self {
        Self::new(config.preview)
    }

    /// Whether notifications are delivered.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Register a handler called on every entry change.
    pub fn on_entry_change<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if self.enabled {
            self.handlers
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .push((id, Arc::new(handler)));
        }
        id
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    /// Call every handler in registration order. Returns how many ran.
    pub fn notify_entry_change(&self) -> usize {
        // Handlers may subscribe or unsubscribe, so call them unlocked.
        let handlers: Vec<Handler> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    /// Number of registered handlers.
    pub fn subscriber_count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Set the editing-session hash.
    pub fn set_hash(&self, hash: impl Into<String>) {
        *self.hash.write().unwrap_or_else(PoisonError::into_inner) = Some(hash.into());
    }

    /// Forget the editing-session hash.
    pub fn clear_hash(&self) {
        *self.hash.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The current editing-session hash.
    pub fn hash(&self) -> Option<String> {
        self.hash
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// ============================================================================
// Session
// ============================================================================

/// Receives each freshly fetched page.
pub trait PageSink: Send + Sync {
    /// Present a fetch result. `None` means no page matched.
    fn present(&self, page: Option<PageRecord>);
}

/// Keeps one page current while an editor works on it.
///
/// The session holds the [`LivePreview`] weakly. Once every owner drops it,
/// the subscription goes with it and [`PreviewSession::run`] returns.
pub struct PreviewSession {
    fetcher: Arc<PageFetcher>,
    url: String,
    live_preview: Weak<LivePreview>,
    sink: Arc<dyn PageSink>,
    shutdown: Notify,
}

impl PreviewSession {
    /// Bind a fetcher, page URL, live preview hub, and sink.
    pub fn new(
        fetcher: Arc<PageFetcher>,
        url: impl Into<String>,
        live_preview: &Arc<LivePreview>,
        sink: Arc<dyn PageSink>,
    ) -> Self {
        Self {
            fetcher,
            url: url.into(),
            live_preview: Arc::downgrade(live_preview),
            sink,
            shutdown: Notify::new(),
        }
    }

    /// The page URL this session keeps current.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch once with the current hash and present the result.
    pub async fn refresh(&self) -> Result<()> {
        let hash = self.live_preview.upgrade().and_then(|lp| lp.hash());
        let page = self.fetcher.fetch_page(&self.url, hash.as_deref()).await?;
        self.sink.present(page);
        Ok(())
    }

    /// Ask a running [`PreviewSession::run`] to stop.
    ///
    /// A stop requested before `run` starts takes effect as soon as it does.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Refresh now, then again on every entry change, until shut down or
    /// the live preview hub is dropped.
    pub async fn run(&self) {
        self.run_until(std::future::pending()).await;
    }

    /// Like [`PreviewSession::run`], but also stops when `stop` completes.
    ///
    /// The initial refresh always runs, and a change already queued when
    /// the stop arrives still gets its refresh.
    pub async fn run_until<F>(&self, stop: F)
    where
        F: Future<Output = ()>,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<()>();
        let subscription = self.live_preview.upgrade().map(|lp| {
            let id = lp.on_entry_change(move || {
                let _ = tx.send(());
            });
            (Arc::downgrade(&lp), id)
        });

        self.refresh_logged().await;

        tokio::pin!(stop);
        let shutdown = self.shutdown.notified();
        tokio::pin!(shutdown);

        loop {
            // Changes queued before a stop request are refreshed first.
            tokio::select! {
                biased;
                received = rx.recv() => {
                    if received.is_none() {
                        tracing::debug!(url = %self.url, "live preview closed");
                        break;
                    }
                    // Collapse a burst of changes into one refresh.
                    while rx.try_recv().is_ok() {}
                    self.refresh_logged().await;
                }
                _ = &mut stop => break,
                _ = &mut shutdown => break,
            }
        }

        if let Some((live_preview, id)) = subscription
            && let Some(live_preview) = live_preview.upgrade()
        {
            live_preview.unsubscribe(id);
        }
    }

    async fn refresh_logged(&self) {
        if let Err(e) = self.refresh().await {
            tracing::warn!(url = %self.url, error = %e, "live preview refresh failed");
        }
    }
}
