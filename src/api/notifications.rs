use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use tokio::sync::watch;
use tracing::warn;

use super::base::Backend;
use crate::error::Result;
use crate::models::NotificationPage;
use crate::utils::log_throttle::LogThrottle;

const FETCH_WARN_WINDOW: Duration = Duration::from_secs(30);

/// Notifications plus the unread-badge bookkeeping.
///
/// The badge is only meaningful while the user is away from the notification
/// surface: while they are looking at it, everything on screen counts as
/// seen, so the published count pins to zero no matter what the server's
/// tally says. This keeps a fetch from re-raising a badge the user is
/// already looking at.
pub struct Notifications {
    backend: Arc<Backend>,
    unread: watch::Sender<u64>,
    viewing: AtomicBool,
    fetch_warn: LogThrottle,
}

impl Notifications {
    pub(crate) fn new(backend: Arc<Backend>) -> Self {
        let (unread, _) = watch::channel(0);
        Notifications {
            backend,
            unread,
            viewing: AtomicBool::new(false),
            fetch_warn: LogThrottle::new(FETCH_WARN_WINDOW),
        }
    }

    /// One page of notifications, newest first. The server's unread tally is
    /// published on the badge stream subject to the viewing rule.
    pub async fn page(&self, page: u32, limit: u32) -> Result<NotificationPage> {
        let request = self
            .backend
            .authed(Method::GET, "/notifications")
            .await?
            .query(&[("page", page), ("limit", limit)]);
        match self.backend.send(request).await {
            Ok(response) => {
                let body: NotificationPage = response.json().await?;
                self.publish_unread(body.unread_count);
                Ok(body)
            }
            Err(e) => {
                if let Some(suppressed) = self.fetch_warn.should_emit() {
                    warn!(error = %e, suppressed, "notification fetch failed");
                }
                Err(e)
            }
        }
    }

    /// The unread tally alone, via a minimal page fetch.
    pub async fn unread_count(&self) -> Result<u64> {
        let body = self.page(1, 1).await?;
        Ok(body.unread_count)
    }

    /// Marks one notification read and lowers the badge.
    pub async fn mark_read(&self, id: &str) -> Result<()> {
        let request = self
            .backend
            .authed(Method::PATCH, &format!("/notifications/{}/read", id))
            .await?;
        self.backend.send(request).await?;
        let current = *self.unread.borrow();
        self.unread.send_replace(current.saturating_sub(1));
        Ok(())
    }

    /// Marks everything read; the badge drops to zero.
    pub async fn mark_all_read(&self) -> Result<()> {
        let request = self
            .backend
            .authed(Method::PATCH, "/notifications/read-all")
            .await?;
        self.backend.send(request).await?;
        self.unread.send_replace(0);
        Ok(())
    }

    /// Tells the badge bookkeeping whether the user is currently on the
    /// notification surface. Entering it clears the badge immediately.
    pub fn set_viewing(&self, viewing: bool) {
        self.viewing.store(viewing, Ordering::SeqCst);
        if viewing {
            self.unread.send_replace(0);
        }
    }

    /// Stream of the unread-badge count.
    pub fn unread_badge(&self) -> watch::Receiver<u64> {
        self.unread.subscribe()
    }

    fn publish_unread(&self, server_count: u64) {
        let count = if self.viewing.load(Ordering::SeqCst) {
            0
        } else {
            server_count
        };
        self.unread.send_replace(count);
    }
}
