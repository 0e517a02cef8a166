//! Resource lifecycle tracking
//!
//! A test case registers every entity it creates on the service. At teardown the
//! tracker deletes them all, one isolated attempt per entry, whether the test
//! passed or not. Cleanup is best effort: a failed delete leaves an orphan on
//! the service, is logged at `warn`, and never fails the test.

use async_trait::async_trait;
use futures::FutureExt;
use petstore_api_client::{ApiResult, PetstoreClient};
use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::panic::AssertUnwindSafe;
use tracing::{debug, info, warn};

/// Resource kinds the tracker knows how to delete
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Pet,
    Order,
    User,
}

impl ResourceKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pet => "pet",
            Self::Order => "order",
            Self::User => "user",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A server-side entity created by a test case
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackedResource {
    /// Pet, by numeric id
    Pet(i64),
    /// Store order, by numeric id
    Order(i64),
    /// User, by username
    User(String),
}

impl TrackedResource {
    /// Kind of this resource
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::Pet(_) => ResourceKind::Pet,
            Self::Order(_) => ResourceKind::Order,
            Self::User(_) => ResourceKind::User,
        }
    }

    /// Identifier as the service addresses it
    #[must_use]
    pub fn id(&self) -> String {
        match self {
            Self::Pet(id) | Self::Order(id) => id.to_string(),
            Self::User(username) => username.clone(),
        }
    }
}

impl fmt::Display for TrackedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// Deletes one tracked resource
///
/// A non-success outcome must be reported as an `Err`; the tracker treats every
/// error as a failed cleanup.
#[async_trait]
pub trait ResourceDeleter: Send + Sync {
    /// Delete `resource` on the service
    async fn delete(&self, resource: &TrackedResource) -> ApiResult<()>;
}

/// Deletes through the pet, store and user endpoints
///
/// A 404 means the resource is already gone (usually deleted by the test
/// itself) and counts as success.
#[async_trait]
impl ResourceDeleter for PetstoreClient {
    async fn delete(&self, resource: &TrackedResource) -> ApiResult<()> {
        let response = match resource {
            TrackedResource::Pet(id) => self.pets().delete(*id).await?,
            TrackedResource::Order(id) => self.store().delete_order(*id).await?,
            TrackedResource::User(username) => self.users().delete(username).await?,
        };

        if response.status_code() == 404 {
            debug!(kind = %resource.kind(), id = %resource.id(), "Resource already gone");
            return Ok(());
        }

        response.error_for_status().map(|_| ())
    }
}

/// Observable tracker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    /// Nothing registered
    Empty,
    /// At least one entry awaiting teardown
    Accumulating,
    /// Teardown in progress
    Draining,
}

/// One cleanup that did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedCleanup {
    pub resource: TrackedResource,
    pub reason: String,
}

/// Outcome of [`ResourceTracker::drain_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrainReport {
    /// Entries for which a delete was attempted
    pub attempted: usize,
    /// Entries whose delete errored, returned a failure status or panicked
    pub failed: Vec<FailedCleanup>,
}

impl DrainReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed.len()
    }

    /// True when every attempted delete succeeded
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Per-test-case registry of created resources
///
/// Owned by exactly one test case. Registration order is preserved and
/// duplicates are kept; each entry gets its own delete attempt. An entry stays
/// pending until its attempt starts, so a cancelled drain keeps the rest.
#[derive(Debug, Default)]
pub struct ResourceTracker {
    entries: VecDeque<TrackedResource>,
    draining: bool,
}

impl ResourceTracker {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resource for deletion at teardown
    ///
    /// The variant is the resource kind and carries its identifier.
    pub fn register(&mut self, resource: TrackedResource) {
        debug!(kind = %resource.kind(), id = %resource.id(), "Tracking resource");
        self.entries.push_back(resource);
    }

    pub fn track_pet(&mut self, id: i64) {
        self.register(TrackedResource::Pet(id));
    }

    pub fn track_order(&mut self, id: i64) {
        self.register(TrackedResource::Order(id));
    }

    pub fn track_user(&mut self, username: impl Into<String>) {
        self.register(TrackedResource::User(username.into()));
    }

    /// Number of pending entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pending entries, in registration order
    #[must_use]
    pub fn entries(&self) -> &VecDeque<TrackedResource> {
        &self.entries
    }

    #[must_use]
    pub fn state(&self) -> TrackerState {
        if self.draining {
            TrackerState::Draining
        } else if self.entries.is_empty() {
            TrackerState::Empty
        } else {
            TrackerState::Accumulating
        }
    }

    /// Attempt to delete every pending entry, in registration order
    ///
    /// Each attempt is isolated: errors and panics from `deleter` are caught and
    /// logged, and the next entry is still attempted. The tracker is empty
    /// afterwards regardless of the outcome.
    ///
    /// If the returned future is dropped early, entries whose attempt had not
    /// started remain registered and the tracker leaves the draining state.
    pub async fn drain_all(&mut self, deleter: &dyn ResourceDeleter) -> DrainReport {
        if self.entries.is_empty() {
            return DrainReport::default();
        }

        info!(count = self.entries.len(), "Cleaning up tracked resources");
        let _draining = DrainingFlag::raise(&mut self.draining);

        let mut report = DrainReport::default();
        while let Some(resource) = self.entries.pop_front() {
            report.attempted += 1;

            let outcome = AssertUnwindSafe(deleter.delete(&resource))
                .catch_unwind()
                .await;

            let reason = match outcome {
                Ok(Ok(())) => {
                    debug!(kind = %resource.kind(), id = %resource.id(), "Cleaned up resource");
                    continue;
                }
                Ok(Err(e)) => e.to_string(),
                Err(panic) => format!("deleter panicked: {}", panic_message(panic.as_ref())),
            };

            warn!(
                kind = %resource.kind(),
                id = %resource.id(),
                error = %reason,
                "Failed to clean up resource"
            );
            report.failed.push(FailedCleanup { resource, reason });
        }

        if !report.is_clean() {
            warn!(
                attempted = report.attempted,
                failed = report.failed.len(),
                "Cleanup left orphaned resources"
            );
        }
        report
    }
}

impl Drop for ResourceTracker {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            let pending: Vec<String> = self.entries.iter().map(ToString::to_string).collect();
            warn!(
                count = pending.len(),
                pending = ?pending,
                "Tracker dropped with pending resources; left on the service"
            );
        }
    }
}

/// Marks a tracker as draining until the drain completes or is cancelled
struct DrainingFlag<'a>(&'a mut bool);

impl<'a> DrainingFlag<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for DrainingFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        *msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "non-string panic payload"
    }
}
