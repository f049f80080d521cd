// Expiry reminders: the service seam plus the bookkeeping on our side
use crate::config::{default_lead_minutes, NotificationConfig};
use crate::models::Item;
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A single time-triggered alert, keyed by the item it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub id: Uuid,
    pub fire_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
}

/// Whatever actually delivers alerts (OS notification center, push
/// gateway, a log line).
///
/// Scheduling an id that is already pending replaces it. The core never
/// reads state back from the service.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait NotificationService: Send + Sync {
    async fn schedule(&self, request: NotificationRequest) -> Result<()>;
    async fn cancel(&self, id: Uuid) -> Result<()>;
}

/// Turns items into requests and pushes them at the service
///
/// Service failures are logged and dropped. Data mutations never roll
/// back because an alert could not be (un)scheduled.
#[derive(Clone)]
pub struct NotificationScheduler {
    service: Arc<dyn NotificationService>,
    lead_interval: Duration,
    title: String,
    body_template: String,
}

impl NotificationScheduler {
    /// An out-of-range lead interval falls back to the default one
    pub fn new(service: Arc<dyn NotificationService>, config: &NotificationConfig) -> Self {
        let lead_interval = config.lead_interval().unwrap_or_else(|e| {
            warn!("{}, using the default lead interval", e);
            Duration::minutes(default_lead_minutes())
        });
        Self {
            service,
            lead_interval,
            title: config.title.clone(),
            body_template: config.body_template.clone(),
        }
    }

    /// The request an item should have pending right now
    ///
    /// Fire times already in the past are passed through as-is; what the
    /// service does with them is up to the service. A fire time beyond the
    /// representable range is clamped to its edge.
    pub fn request_for(&self, item: &Item) -> NotificationRequest {
        NotificationRequest {
            id: item.id,
            fire_at: self.fire_time(item.expiry_date),
            title: self.title.clone(),
            body: self.body_template.replace("{name}", &item.name),
        }
    }

    fn fire_time(&self, expiry_date: DateTime<Utc>) -> DateTime<Utc> {
        expiry_date
            .checked_sub_signed(self.lead_interval)
            .unwrap_or_else(|| {
                debug!("Fire time for {} overflowed, clamping", expiry_date);
                if self.lead_interval > Duration::zero() {
                    DateTime::<Utc>::MIN_UTC
                } else {
                    DateTime::<Utc>::MAX_UTC
                }
            })
    }

    pub async fn schedule(&self, item: &Item) {
        let request = self.request_for(item);
        let fire_at = request.fire_at;
        match self.service.schedule(request).await {
            Ok(()) => info!("Scheduled reminder for {} at {}", item.name, fire_at),
            Err(e) => warn!("Failed to schedule reminder for {}: {}", item.name, e),
        }
    }

    /// Cancel whatever is pending for the item, then schedule fresh
    pub async fn reschedule(&self, item: &Item) {
        self.cancel(item.id).await;
        self.schedule(item).await;
    }

    pub async fn cancel(&self, id: Uuid) {
        match self.service.cancel(id).await {
            Ok(()) => debug!("Cancelled reminder {}", id),
            Err(e) => warn!("Failed to cancel reminder {}: {}", id, e),
        }
    }
}

/// Keeps pending requests in a map. Useful for tests and for embedders
/// that poll for due reminders themselves.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    pending: Arc<Mutex<HashMap<Uuid, NotificationRequest>>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Uuid) -> Option<NotificationRequest> {
        self.pending.lock().ok()?.get(&id).cloned()
    }

    /// Pending requests ordered by fire time
    pub fn pending(&self) -> Vec<NotificationRequest> {
        let mut requests: Vec<_> = self
            .pending
            .lock()
            .map(|p| p.values().cloned().collect())
            .unwrap_or_default();
        requests.sort_by(|a, b| a.fire_at.cmp(&b.fire_at));
        requests
    }

    /// Requests whose fire time is at or before `now`
    pub fn due(&self, now: DateTime<Utc>) -> Vec<NotificationRequest> {
        self.pending()
            .into_iter()
            .filter(|r| r.fire_at <= now)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl NotificationService for InMemoryNotifier {
    async fn schedule(&self, request: NotificationRequest) -> Result<()> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| crate::Error::Notification("notifier lock poisoned".into()))?;
        pending.insert(request.id, request);
        Ok(())
    }

    async fn cancel(&self, id: Uuid) -> Result<()> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| crate::Error::Notification("notifier lock poisoned".into()))?;
        pending.remove(&id);
        Ok(())
    }
}

/// Delivers nothing, just reports what would have been scheduled
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl NotificationService for LogNotifier {
    async fn schedule(&self, request: NotificationRequest) -> Result<()> {
        info!(
            id = %request.id,
            fire_at = %request.fire_at,
            "{}: {}",
            request.title,
            request.body
        );
        Ok(())
    }

    async fn cancel(&self, id: Uuid) -> Result<()> {
        info!(id = %id, "Reminder cancelled");
        Ok(())
    }
}
