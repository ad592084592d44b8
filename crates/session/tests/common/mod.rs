//! Shared fixtures for session integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use encore_core::invite::{InviteOutcome, InviteRejection};
use encore_core::roles::RoleSet;
use encore_db::{Entity, MemoryStore};
use encore_events::EventBus;
use encore_session::{
    InviteAcceptor, MemoryContextStore, RecordingNavigator, SessionAuth, SessionFlags,
    StoreInviteAcceptor, StudioContextRouter,
};
use serde_json::{json, Value};

/// Everything a router talks to, kept reachable for assertions.
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub context: Arc<MemoryContextStore>,
    pub navigator: Arc<RecordingNavigator>,
    pub auth: Arc<SessionAuth>,
    pub flags: Arc<SessionFlags>,
    pub bus: Arc<EventBus>,
}

impl Harness {
    /// A session signed in as `user_id`, currently showing `page`.
    pub fn signed_in(user_id: &str, page: &str) -> Self {
        Self::with_auth(SessionAuth::signed_in(user_id), page)
    }

    pub fn anonymous(page: &str) -> Self {
        Self::with_auth(SessionAuth::default(), page)
    }

    fn with_auth(auth: SessionAuth, page: &str) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            context: Arc::new(MemoryContextStore::new()),
            navigator: Arc::new(RecordingNavigator::new(page)),
            auth: Arc::new(auth),
            flags: Arc::new(SessionFlags::new()),
            bus: Arc::new(EventBus::default()),
        }
    }

    /// Add a `studio_members` row.
    pub fn member(&self, user_id: &str, studio_id: &str, roles: &str) {
        self.store
            .seed(Entity::StudioMembers, [membership_row(user_id, studio_id, roles)]);
    }

    pub fn router(&self, invites: Arc<dyn InviteAcceptor>) -> StudioContextRouter {
        StudioContextRouter::new(
            self.auth.clone(),
            self.store.clone(),
            self.context.clone(),
            invites,
            self.navigator.clone(),
        )
        .with_flags(self.flags.clone())
        .with_events(self.bus.clone())
    }

    /// Router with an acceptor that always reports no pending invite.
    pub fn router_without_invites(&self) -> StudioContextRouter {
        self.router(Arc::new(FakeAcceptor::rejecting(InviteRejection::NoToken)))
    }

    /// Acceptor backed by this harness's store and context.
    pub fn store_acceptor(&self) -> Arc<StoreInviteAcceptor> {
        Arc::new(StoreInviteAcceptor::new(
            self.store.clone(),
            self.context.clone(),
        ))
    }
}

pub fn membership_row(user_id: &str, studio_id: &str, roles: &str) -> Value {
    json!({ "user_id": user_id, "studio_id": studio_id, "roles": roles })
}

/// Scripted [`InviteAcceptor`] that counts calls.
///
/// On acceptance it can act on the store, e.g. seed the membership row the
/// backend inserts when an invite is consumed.
pub struct FakeAcceptor {
    outcome: InviteOutcome,
    delay: Duration,
    on_accept: Option<Box<dyn Fn() + Send + Sync>>,
    calls: AtomicUsize,
}

impl FakeAcceptor {
    pub fn rejecting(reason: InviteRejection) -> Self {
        Self::new(InviteOutcome::rejected(reason))
    }

    pub fn accepting(studio_id: &str, roles: &str) -> Self {
        Self::new(InviteOutcome::Accepted {
            studio_id: Some(studio_id.to_string()),
            roles: RoleSet::from_csv(roles),
        })
    }

    fn new(outcome: InviteOutcome) -> Self {
        Self {
            outcome,
            delay: Duration::ZERO,
            on_accept: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Hold each call open for `delay` before answering.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn inserting(mut self, store: Arc<MemoryStore>, row: Value) -> Self {
        self.on_accept = Some(Box::new(move || {
            store.seed(Entity::StudioMembers, [row.clone()]);
        }));
        self
    }

    /// Make membership reads fail once the invite is accepted.
    pub fn breaking_reads(mut self, store: Arc<MemoryStore>) -> Self {
        self.on_accept = Some(Box::new(move || {
            store.fail_reads(Entity::StudioMembers, true);
        }));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InviteAcceptor for FakeAcceptor {
    async fn accept_pending_if_any(&self) -> InviteOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let (true, Some(hook)) = (self.outcome.is_accepted(), &self.on_accept) {
            hook();
        }
        self.outcome.clone()
    }
}
