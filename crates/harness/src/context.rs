//! Per-test-case scaffold
//!
//! A [`TestContext`] owns a client and a fresh [`ResourceTracker`]. Tests create
//! entities through the endpoint services, register them, and rely on teardown
//! to delete them.

use crate::error::HarnessResult;
use crate::tracker::{DrainReport, ResourceTracker, TrackedResource};
use futures::future::BoxFuture;
use futures::FutureExt;
use petstore_api_client::endpoints::{PetApi, StoreApi, UserApi};
use petstore_api_client::{ConfigProvider, PetstoreClient};
use std::panic::{self, AssertUnwindSafe};
use tracing::{info, warn};

/// Services and cleanup registry for one test case
///
/// Never shared between test cases; each one calls [`TestContext::setup`] or
/// [`TestContext::run`] itself.
#[derive(Debug)]
pub struct TestContext {
    client: PetstoreClient,
    tracker: ResourceTracker,
}

impl TestContext {
    /// Build a client from `provider` and start with an empty tracker
    ///
    /// Loads configuration on first use; fails if it is missing or invalid.
    pub fn setup(provider: &ConfigProvider) -> HarnessResult<Self> {
        let client = PetstoreClient::from_provider(provider)?;
        Ok(Self::with_client(client))
    }

    /// Use an already configured client
    #[must_use]
    pub fn with_client(client: PetstoreClient) -> Self {
        info!(
            session_id = %petstore_telemetry::session_id(),
            environment = %client.config().environment,
            base_url = %client.base_url(),
            "Test context ready"
        );
        Self {
            client,
            tracker: ResourceTracker::new(),
        }
    }

    #[must_use]
    pub fn client(&self) -> &PetstoreClient {
        &self.client
    }

    #[must_use]
    pub fn pets(&self) -> PetApi {
        self.client.pets()
    }

    #[must_use]
    pub fn store(&self) -> StoreApi {
        self.client.store()
    }

    #[must_use]
    pub fn users(&self) -> UserApi {
        self.client.users()
    }

    #[must_use]
    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    /// Register any resource for cleanup
    pub fn track(&mut self, resource: TrackedResource) {
        self.tracker.register(resource);
    }

    pub fn track_pet(&mut self, id: i64) {
        self.tracker.track_pet(id);
    }

    pub fn track_order(&mut self, id: i64) {
        self.tracker.track_order(id);
    }

    pub fn track_user(&mut self, username: impl Into<String>) {
        self.tracker.track_user(username);
    }

    /// Delete everything registered so far
    ///
    /// Failures are logged and reported, never raised.
    pub async fn teardown(mut self) -> DrainReport {
        let report = self.tracker.drain_all(&self.client).await;
        if report.attempted > 0 {
            info!(
                attempted = report.attempted,
                succeeded = report.succeeded(),
                "Teardown complete"
            );
        }
        report
    }

    /// Run a test body with guaranteed teardown
    ///
    /// The body gets exclusive access to the context. Teardown runs whether the
    /// body returns or panics; a panic (a failed assertion) is re-raised once
    /// cleanup has finished.
    ///
    /// ```rust,no_run
    /// use petstore_api_client::ConfigProvider;
    /// use petstore_harness::{factory, TestContext};
    ///
    /// # async fn example() -> petstore_harness::HarnessResult<()> {
    /// let provider = ConfigProvider::from_env();
    /// TestContext::run(&provider, |ctx| {
    ///     Box::pin(async move {
    ///         let pet = factory::random_pet();
    ///         let response = ctx.pets().create(&pet).await.unwrap();
    ///         assert_eq!(response.status_code(), 200);
    ///         ctx.track_pet(pet.id.unwrap());
    ///     })
    /// })
    /// .await
    /// # }
    /// ```
    pub async fn run<T, F>(provider: &ConfigProvider, body: F) -> HarnessResult<T>
    where
        F: for<'a> FnOnce(&'a mut TestContext) -> BoxFuture<'a, T>,
    {
        let mut ctx = Self::setup(provider)?;
        let outcome = AssertUnwindSafe(body(&mut ctx)).catch_unwind().await;
        let report = ctx.teardown().await;

        match outcome {
            Ok(value) => Ok(value),
            Err(payload) => {
                warn!(
                    cleaned_up = report.succeeded(),
                    orphaned = report.failed.len(),
                    "Test body panicked; re-raising after teardown"
                );
                panic::resume_unwind(payload)
            }
        }
    }
}
