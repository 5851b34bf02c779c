//! Query keys and the per-key state machine.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::api::ApiError;
use crate::models::{Resource, ResourceKind, ResourceList};

/// Identifies one cached collection: every resource kind is scoped by user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey {
    pub kind: ResourceKind,
    pub user_id: String,
}

impl QueryKey {
    pub fn new(kind: ResourceKind, user_id: impl Into<String>) -> Self {
        Self {
            kind,
            user_id: user_id.into(),
        }
    }

    pub fn of<R: Resource>(user_id: impl Into<String>) -> Self {
        Self::new(R::KIND, user_id)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.user_id)
    }
}

#[derive(Debug, Clone)]
pub struct CachedData<T> {
    pub data: T,
    pub fetched_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            fetched_at: Utc::now(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> CachedData<U> {
        CachedData {
            data: f(self.data),
            fetched_at: self.fetched_at,
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.fetched_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew (negative ages)
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_older_than(&self, max_age: Duration) -> bool {
        Utc::now() - self.fetched_at > max_age
    }
}

/// State of one query key. Exactly one variant is active at a time.
#[derive(Debug, Clone)]
pub enum QueryState<T> {
    Pending,
    Success(CachedData<T>),
    Error(Arc<ApiError>),
}

impl<T> QueryState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, QueryState::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, QueryState::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryState::Error(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            QueryState::Success(cached) => Some(&cached.data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Arc<ApiError>> {
        match self {
            QueryState::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryState<U> {
        match self {
            QueryState::Pending => QueryState::Pending,
            QueryState::Success(cached) => QueryState::Success(cached.map(f)),
            QueryState::Error(e) => QueryState::Error(e),
        }
    }

    /// Settled result, or `None` while pending.
    pub fn into_result(self) -> Option<Result<T, Arc<ApiError>>> {
        match self {
            QueryState::Pending => None,
            QueryState::Success(cached) => Some(Ok(cached.data)),
            QueryState::Error(e) => Some(Err(e)),
        }
    }
}

impl QueryState<ResourceList> {
    /// View an untyped state as the collection type of `R`.
    ///
    /// Entries are always filled by a fetch of their own key's kind, so a
    /// mismatch can only come from asking with the wrong `R`; it reads as pending.
    pub(crate) fn typed<R: Resource>(&self) -> QueryState<Arc<Vec<R>>> {
        match self {
            QueryState::Pending => QueryState::Pending,
            QueryState::Error(e) => QueryState::Error(Arc::clone(e)),
            QueryState::Success(cached) => match R::unwrap(&cached.data) {
                Some(items) => QueryState::Success(CachedData {
                    data: items,
                    fetched_at: cached.fetched_at,
                }),
                None => QueryState::Pending,
            },
        }
    }
}
