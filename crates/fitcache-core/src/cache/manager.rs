use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{
    Exercise, Measurement, NutritionEntry, Resource, ResourceKind, ResourceList, Validate,
    ValidationError, WorkoutSession,
};

use super::{CachedData, QueryKey, QuerySubscription, QueryState};

/// Consider cached collections stale after 1 hour even without an invalidation.
const DEFAULT_STALE_MINUTES: i64 = 60;

#[derive(Debug, Clone)]
pub struct CacheOptions {
    /// Age after which a successful read is re-fetched. `None` keeps data until invalidated.
    pub stale_after: Option<Duration>,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            stale_after: Some(Duration::minutes(DEFAULT_STALE_MINUTES)),
        }
    }
}

/// A create, update or delete against one resource kind.
pub enum Mutation<R: Resource> {
    Create(R::Create),
    Update { id: String, patch: R::Patch },
    Delete { id: String },
}

impl<R: Resource> Mutation<R> {
    pub fn update(id: impl Into<String>, patch: R::Patch) -> Self {
        Mutation::Update {
            id: id.into(),
            patch,
        }
    }

    pub fn delete(id: impl Into<String>) -> Self {
        Mutation::Delete { id: id.into() }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Mutation::Create(_) => "create",
            Mutation::Update { .. } => "update",
            Mutation::Delete { .. } => "delete",
        }
    }
}

impl<R: Resource> Validate for Mutation<R> {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Mutation::Create(payload) => payload.validate(),
            Mutation::Update { id, patch } => {
                if id.trim().is_empty() {
                    return Err(ValidationError::new("id", "must not be empty"));
                }
                patch.validate()
            }
            Mutation::Delete { id } => {
                if id.trim().is_empty() {
                    return Err(ValidationError::new("id", "must not be empty"));
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum MutationOutcome<R> {
    Created(R),
    Updated(R),
    Deleted(String),
}

impl<R> MutationOutcome<R> {
    pub fn resource(&self) -> Option<&R> {
        match self {
            MutationOutcome::Created(r) | MutationOutcome::Updated(r) => Some(r),
            MutationOutcome::Deleted(_) => None,
        }
    }

    /// The resource returned by the server, if the operation returns one.
    pub fn into_resource(self) -> Option<R> {
        match self {
            MutationOutcome::Created(r) | MutationOutcome::Updated(r) => Some(r),
            MutationOutcome::Deleted(_) => None,
        }
    }
}

struct Entry {
    tx: watch::Sender<QueryState<ResourceList>>,
    /// Set by invalidation; cleared when a fetch starts.
    stale: bool,
    in_flight: bool,
    /// Bumped on every invalidation. A fetch only publishes if this is unchanged.
    generation: u64,
}

impl Entry {
    fn new() -> Self {
        let (tx, _) = watch::channel(QueryState::Pending);
        Self {
            tx,
            stale: false,
            in_flight: false,
            generation: 0,
        }
    }

    fn has_subscribers(&self) -> bool {
        self.tx.receiver_count() > 0
    }
}

struct Inner {
    client: ApiClient,
    options: CacheOptions,
    entries: Mutex<HashMap<QueryKey, Entry>>,
}

/// Keyed cache of server collections.
///
/// Reads are de-duplicated per key, mutations invalidate the key that holds the
/// mutated resource, and every transition is pushed to subscribers. Clone is
/// cheap and all clones share the same entries.
///
/// Fetches run on spawned Tokio tasks, so `read`, `subscribe` and `invalidate`
/// must be called from within a Tokio runtime.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<Inner>,
}

impl QueryCache {
    pub fn new(client: ApiClient, options: CacheOptions) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                options,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.inner.client
    }

    // ===== Reads =====

    /// Current state for `(R, user_id)`, starting a fetch if the entry has no
    /// fresh data and nothing is in flight.
    pub fn read<R: Resource>(&self, user_id: &str) -> QueryState<Arc<Vec<R>>> {
        self.read_key(&QueryKey::of::<R>(user_id)).typed::<R>()
    }

    /// Untyped form of `read`.
    pub fn read_key(&self, key: &QueryKey) -> QueryState<ResourceList> {
        let mut entries = self.inner.lock_entries();
        let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
        self.inner.refresh_if_needed(entry, key);
        let state = entry.tx.borrow().clone();
        state
    }

    /// Register as an active subscriber on `(R, user_id)`; also performs a `read`.
    pub fn subscribe<R: Resource>(&self, user_id: &str) -> QuerySubscription<R> {
        let key = QueryKey::of::<R>(user_id);
        let mut entries = self.inner.lock_entries();
        let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
        let rx = entry.tx.subscribe();
        self.inner.refresh_if_needed(entry, &key);
        QuerySubscription::new(key, rx)
    }

    /// Read and wait for the key to settle.
    pub async fn fetch<R: Resource>(&self, user_id: &str) -> Result<Arc<Vec<R>>, Arc<ApiError>> {
        self.subscribe::<R>(user_id).settled().await
    }

    /// Inspect an entry without triggering a fetch.
    pub fn state(&self, key: &QueryKey) -> Option<QueryState<ResourceList>> {
        let entries = self.inner.lock_entries();
        entries.get(key).map(|entry| entry.tx.borrow().clone())
    }

    /// How long ago the entry's data was fetched, e.g. "5m ago".
    pub fn cached_age(&self, key: &QueryKey) -> Option<String> {
        match self.state(key)? {
            QueryState::Success(cached) => Some(cached.age_display()),
            _ => None,
        }
    }

    // ===== Invalidation =====

    /// Mark `key` stale. Active subscribers get an immediate re-fetch; otherwise
    /// the next `read` re-fetches.
    pub fn invalidate(&self, key: &QueryKey) {
        let mut entries = self.inner.lock_entries();
        if let Some(entry) = entries.get_mut(key) {
            self.inner.invalidate_entry(entry, key);
        } else {
            debug!(key = %key, "Invalidate on unknown key ignored");
        }
    }

    /// Invalidate every cached kind for one user.
    pub fn invalidate_user(&self, user_id: &str) {
        let mut entries = self.inner.lock_entries();
        for (key, entry) in entries.iter_mut().filter(|(k, _)| k.user_id == user_id) {
            self.inner.invalidate_entry(entry, key);
        }
    }

    pub fn invalidate_all(&self) {
        let mut entries = self.inner.lock_entries();
        for (key, entry) in entries.iter_mut() {
            self.inner.invalidate_entry(entry, key);
        }
    }

    // ===== Mutations =====

    /// Run one create/update/delete against the backend. On success the
    /// `(R, user_id)` entry is invalidated, along with the owner's entry when the
    /// server reports a different one; on failure nothing changes.
    ///
    /// A create whose payload names another user is rejected before sending.
    pub async fn mutate<R: Resource>(
        &self,
        user_id: &str,
        mutation: Mutation<R>,
    ) -> Result<MutationOutcome<R>, ApiError> {
        check_scope(user_id)?;
        mutation.validate()?;
        if let Mutation::Create(payload) = &mutation {
            check_owner::<R>(user_id, payload)?;
        }

        let operation = mutation.operation();
        let client = &self.inner.client;
        let result = match mutation {
            Mutation::Create(payload) => client.create::<R>(&payload).await.map(MutationOutcome::Created),
            Mutation::Update { id, patch } => client.update::<R>(&id, &patch).await.map(MutationOutcome::Updated),
            Mutation::Delete { id } => client.delete::<R>(&id).await.map(|()| MutationOutcome::Deleted(id)),
        };
        let owner = result
            .as_ref()
            .ok()
            .and_then(|outcome| outcome.resource())
            .and_then(|resource| resource.owner())
            .map(str::to_string);
        self.finish_mutation::<R, _>(user_id, operation, result, owner)
    }

    pub async fn create<R: Resource>(&self, user_id: &str, payload: R::Create) -> Result<R, ApiError> {
        check_scope(user_id)?;
        payload.validate()?;
        check_owner::<R>(user_id, &payload)?;
        let result = self.inner.client.create::<R>(&payload).await;
        let owner = owner_of(&result);
        self.finish_mutation::<R, _>(user_id, "create", result, owner)
    }

    pub async fn update<R: Resource>(&self, user_id: &str, id: &str, patch: R::Patch) -> Result<R, ApiError> {
        check_scope(user_id)?;
        let result = self.inner.client.update::<R>(id, &patch).await;
        let owner = owner_of(&result);
        self.finish_mutation::<R, _>(user_id, "update", result, owner)
    }

    pub async fn delete<R: Resource>(&self, user_id: &str, id: &str) -> Result<(), ApiError> {
        check_scope(user_id)?;
        let result = self.inner.client.delete::<R>(id).await;
        self.finish_mutation::<R, _>(user_id, "delete", result, None)
    }

    fn finish_mutation<R: Resource, T>(
        &self,
        user_id: &str,
        operation: &'static str,
        result: Result<T, ApiError>,
        owner: Option<String>,
    ) -> Result<T, ApiError> {
        match result {
            Ok(value) => {
                info!(kind = %R::KIND, user_id = user_id, operation = operation, "Mutation succeeded");
                self.invalidate(&QueryKey::of::<R>(user_id));
                if let Some(owner) = owner.filter(|owner| owner != user_id) {
                    debug!(kind = %R::KIND, owner = %owner, "Resource belongs to another user");
                    self.invalidate(&QueryKey::of::<R>(owner));
                }
                Ok(value)
            }
            Err(e) => {
                warn!(kind = %R::KIND, user_id = user_id, operation = operation, error = %e, "Mutation failed");
                Err(e)
            }
        }
    }
}

fn check_scope(user_id: &str) -> Result<(), ApiError> {
    if user_id.trim().is_empty() {
        return Err(ValidationError::new("userId", "must not be empty").into());
    }
    Ok(())
}

/// A create must land in the collection it invalidates.
fn check_owner<R: Resource>(user_id: &str, payload: &R::Create) -> Result<(), ApiError> {
    match R::create_owner(payload) {
        Some(owner) if owner != user_id => {
            Err(ValidationError::new("userId", "does not match scope").into())
        }
        _ => Ok(()),
    }
}

fn owner_of<R: Resource>(result: &Result<R, ApiError>) -> Option<String> {
    result
        .as_ref()
        .ok()
        .and_then(|resource| resource.owner())
        .map(str::to_string)
}

impl Inner {
    fn lock_entries(&self) -> MutexGuard<'_, HashMap<QueryKey, Entry>> {
        // Entries hold no invariants a panicking reader could break mid-update.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn needs_fetch(&self, entry: &Entry) -> bool {
        if entry.in_flight {
            return false;
        }
        match &*entry.tx.borrow() {
            QueryState::Pending => true,
            // An error stays until someone reads again
            QueryState::Error(_) => true,
            QueryState::Success(cached) => {
                entry.stale
                    || self
                        .options
                        .stale_after
                        .is_some_and(|max_age| cached.is_older_than(max_age))
            }
        }
    }

    fn refresh_if_needed(self: &Arc<Self>, entry: &mut Entry, key: &QueryKey) {
        if self.needs_fetch(entry) {
            self.start_fetch(entry, key);
        }
    }

    fn invalidate_entry(self: &Arc<Self>, entry: &mut Entry, key: &QueryKey) {
        entry.generation += 1;
        entry.stale = true;
        debug!(key = %key, generation = entry.generation, "Invalidated");

        // A running fetch sees the new generation and fetches again
        if !entry.in_flight && entry.has_subscribers() {
            self.start_fetch(entry, key);
        }
    }

    /// Caller holds the entries lock.
    fn start_fetch(self: &Arc<Self>, entry: &mut Entry, key: &QueryKey) {
        entry.in_flight = true;
        entry.stale = false;
        entry.tx.send_replace(QueryState::Pending);

        let inner = Arc::clone(self);
        let key = key.clone();
        let generation = entry.generation;
        debug!(key = %key, generation = generation, "Starting fetch");
        tokio::spawn(async move {
            inner.run_fetch(key, generation).await;
        });
    }

    async fn run_fetch(self: Arc<Self>, key: QueryKey, mut generation: u64) {
        loop {
            let result = self.fetch_list(&key).await;
            match self.complete_fetch(&key, generation, result) {
                Some(next) => generation = next,
                None => return,
            }
        }
    }

    /// Publish a fetch result, or return the generation to re-fetch at when the
    /// key was invalidated while the request was in flight.
    fn complete_fetch(
        &self,
        key: &QueryKey,
        generation: u64,
        result: Result<ResourceList, ApiError>,
    ) -> Option<u64> {
        let mut entries = self.lock_entries();
        let entry = entries.get_mut(key)?;

        if entry.generation != generation {
            debug!(key = %key, "Invalidated during fetch, discarding result");
            entry.stale = false;
            return Some(entry.generation);
        }

        entry.in_flight = false;
        match result {
            Ok(list) => {
                debug!(key = %key, count = list.len(), "Fetch succeeded");
                entry.tx.send_replace(QueryState::Success(CachedData::new(list)));
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Fetch failed");
                entry.tx.send_replace(QueryState::Error(Arc::new(e)));
            }
        }
        None
    }

    async fn fetch_list(&self, key: &QueryKey) -> Result<ResourceList, ApiError> {
        let client = &self.client;
        let user_id = key.user_id.as_str();
        match key.kind {
            ResourceKind::Workouts => list_as::<WorkoutSession>(client, user_id).await,
            ResourceKind::Exercises => list_as::<Exercise>(client, user_id).await,
            ResourceKind::Nutrition => list_as::<NutritionEntry>(client, user_id).await,
            ResourceKind::Measurements => list_as::<Measurement>(client, user_id).await,
        }
    }
}

async fn list_as<R: Resource>(client: &ApiClient, user_id: &str) -> Result<ResourceList, ApiError> {
    let items = client.list::<R>(user_id).await?;
    Ok(R::wrap(Arc::new(items)))
}
