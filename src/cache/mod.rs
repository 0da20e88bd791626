//! In-memory entity lists kept in step with the backend.
//!
//! An [`EntityCache`] owns the list for one collection (optionally scoped,
//! e.g. the assessments of one student). After the initial fetch, mutations
//! patch the local list from the gateway's response instead of refetching.

use std::cmp::Ordering;

use crate::api::{ApiError, ApiResult};
use crate::gateway::{Repository, StudentId};
use crate::models::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// No scope selected; nothing to show and nothing pending
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Handle for one in-flight fetch. Results carrying a ticket from an older
/// generation are dropped.
#[derive(Debug, Clone)]
pub struct LoadTicket<S> {
    generation: u64,
    scope: S,
}

impl<S> LoadTicket<S> {
    pub fn scope(&self) -> &S {
        &self.scope
    }
}

pub struct EntityCache<R: Repository> {
    repo: R,
    items: Vec<R::Record>,
    state: LoadState,
    error: Option<String>,
    scope: Option<R::Scope>,
    generation: u64,
}

impl<R: Repository> EntityCache<R> {
    /// A cache for `scope`; `None` leaves it idle until a scope is assigned
    pub fn new(repo: R, scope: Option<R::Scope>) -> Self {
        Self {
            repo,
            items: Vec::new(),
            state: LoadState::Idle,
            error: None,
            scope,
            generation: 0,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn items(&self) -> &[R::Record] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&R::Record> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Message of the last failed fetch or mutation
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn scope(&self) -> Option<&R::Scope> {
        self.scope.as_ref()
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Enter `Loading` and hand out a ticket for the current scope.
    ///
    /// Returns `None` without a scope: the cache becomes idle with an empty
    /// list and no error. Items from the previous load stay visible while
    /// loading.
    pub fn begin_load(&mut self) -> Option<LoadTicket<R::Scope>> {
        let Some(scope) = self.scope.clone() else {
            self.reset_idle();
            return None;
        };

        self.generation += 1;
        self.state = LoadState::Loading;

        Some(LoadTicket {
            generation: self.generation,
            scope,
        })
    }

    /// Apply the outcome of a fetch. Returns `false` when the ticket is stale
    /// and the result was discarded.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket<R::Scope>,
        result: ApiResult<Vec<R::Record>>,
    ) -> bool {
        if ticket.generation != self.generation || self.scope.as_ref() != Some(&ticket.scope) {
            tracing::debug!("Discarding stale load for {:?}", ticket.scope);
            return false;
        }

        match result {
            Ok(items) => {
                self.items = items;
                self.error = None;
                self.state = LoadState::Ready;
            }
            Err(e) => {
                tracing::warn!("Load failed: {}", e);
                self.error = Some(e.to_string());
                self.state = LoadState::Failed;
            }
        }
        true
    }

    /// Load the list for the current scope
    pub async fn fetch(&mut self) -> ApiResult<()> {
        let Some(ticket) = self.begin_load() else {
            return Ok(());
        };

        let result = self.repo.list(ticket.scope()).await;
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        self.finish_load(ticket, result);
        outcome
    }

    /// Explicit reload, e.g. from a retry banner
    pub async fn refetch(&mut self) -> ApiResult<()> {
        self.fetch().await
    }

    /// Switch scope without fetching. Returns `false` when the scope is
    /// unchanged; any load still in flight for the old scope becomes stale.
    pub fn assign_scope(&mut self, scope: Option<R::Scope>) -> bool {
        if self.scope == scope {
            return false;
        }

        self.scope = scope;
        self.generation += 1;
        if self.scope.is_none() {
            self.reset_idle();
        }
        true
    }

    /// Switch scope and fetch. A no-op change does not fetch again.
    pub async fn set_scope(&mut self, scope: Option<R::Scope>) -> ApiResult<()> {
        if !self.assign_scope(scope) {
            return Ok(());
        }
        self.fetch().await
    }

    fn reset_idle(&mut self) {
        self.items.clear();
        self.error = None;
        self.state = LoadState::Idle;
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Create through the gateway and insert the stored record at its
    /// natural position. Records outside the current scope are not listed.
    pub async fn create(&mut self, draft: &R::Draft) -> ApiResult<R::Record> {
        let record = match self.repo.create(draft).await {
            Ok(record) => record,
            Err(e) => return Err(self.fail(e)),
        };

        let listed = self
            .scope
            .as_ref()
            .is_some_and(|scope| R::in_scope(scope, &record));
        if listed {
            let at = self
                .items
                .partition_point(|item| item.list_order(&record) == Ordering::Less);
            self.items.insert(at, record.clone());
        }

        self.mutation_succeeded();
        Ok(record)
    }

    /// Update through the gateway and replace the record in place
    pub async fn update(&mut self, id: &str, patch: &R::Patch) -> ApiResult<R::Record> {
        let record = match self.repo.update(id, patch).await {
            Ok(record) => record,
            Err(e) => return Err(self.fail(e)),
        };

        if let Some(slot) = self.items.iter_mut().find(|item| item.id() == id) {
            *slot = record.clone();
        }

        self.mutation_succeeded();
        Ok(record)
    }

    /// Delete through the gateway and drop the record from the list
    pub async fn delete(&mut self, id: &str) -> ApiResult<()> {
        if let Err(e) = self.repo.delete(id).await {
            return Err(self.fail(e));
        }

        self.items.retain(|item| item.id() != id);
        self.mutation_succeeded();
        Ok(())
    }

    /// A failed fetch keeps its error until the list is actually loaded
    fn mutation_succeeded(&mut self) {
        if self.state != LoadState::Failed {
            self.error = None;
        }
    }

    fn fail(&mut self, error: ApiError) -> ApiError {
        tracing::warn!("Mutation failed: {}", error);
        self.error = Some(error.to_string());
        error
    }
}

impl<R: Repository<Scope = ()>> EntityCache<R> {
    /// A cache over the whole collection
    pub fn unscoped(repo: R) -> Self {
        Self::new(repo, Some(()))
    }
}

impl<R: Repository<Scope = StudentId>> EntityCache<R> {
    /// A cache over one student's records; an empty id leaves it idle
    pub fn for_student(repo: R, student_id: &str) -> Self {
        Self::new(repo, student_scope(student_id))
    }

    /// Point the cache at another student and fetch if it changed
    pub async fn set_student(&mut self, student_id: &str) -> ApiResult<()> {
        self.set_scope(student_scope(student_id)).await
    }
}

fn student_scope(student_id: &str) -> Option<StudentId> {
    let student_id = student_id.trim();
    (!student_id.is_empty()).then(|| student_id.to_string())
}
