//! Session orchestration.
//!
//! [`AppController`] is the single owner of workflow state, the current
//! [`IndexInfo`], the [`ResultHistory`] and the error slot. Submissions spawn
//! a task that talks to the [`Backend`] and posts a [`Completion`] back over a
//! channel; the owner drains completions and [`AppController::apply`]s them.
//! Nothing else mutates session state.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::api::Backend;
use crate::error::{ApiError, Operation};
use crate::forms::{IndexSubmission, QuerySubmission};
use crate::model::{IndexInfo, QueryResult, ResultHistory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Indexing,
    Indexed,
    Querying,
}

impl WorkflowState {
    /// An index request may start from here.
    pub fn accepts_index(self) -> bool {
        matches!(self, WorkflowState::Idle | WorkflowState::Indexed)
    }

    /// A query request may start from here.
    pub fn accepts_query(self) -> bool {
        matches!(self, WorkflowState::Indexed)
    }

    pub fn in_flight(self) -> bool {
        matches!(self, WorkflowState::Indexing | WorkflowState::Querying)
    }
}

/// Monotonic per-session request number, for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of one backend call, delivered back to the controller.
#[derive(Debug)]
pub enum Completion {
    Index {
        id: RequestId,
        outcome: Result<IndexInfo, ApiError>,
    },
    Query {
        id: RequestId,
        outcome: Result<QueryResult, ApiError>,
    },
}

impl Completion {
    pub fn id(&self) -> RequestId {
        match self {
            Completion::Index { id, .. } | Completion::Query { id, .. } => *id,
        }
    }
}

/// What applying a completion did, for front ends that want to announce it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Indexed,
    IndexFailed,
    Answered { seq: u64 },
    QueryFailed,
    /// The completion did not match the current state and was dropped.
    Ignored,
}

pub struct AppController {
    backend: Arc<dyn Backend>,
    state: WorkflowState,
    index: Option<IndexInfo>,
    history: ResultHistory,
    error: Option<String>,
    index_form: IndexSubmission,
    query_form: QuerySubmission,
    next_id: u64,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
}

impl AppController {
    pub fn new(backend: Arc<dyn Backend>, top_k: i64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            backend,
            state: WorkflowState::Idle,
            index: None,
            history: ResultHistory::new(),
            error: None,
            index_form: IndexSubmission::default(),
            query_form: QuerySubmission::with_top_k(top_k),
            next_id: 0,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    pub fn index_info(&self) -> Option<&IndexInfo> {
        self.index.as_ref()
    }

    pub fn history(&self) -> &ResultHistory {
        &self.history
    }

    /// Contents of the single error slot.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn index_form(&self) -> &IndexSubmission {
        &self.index_form
    }

    pub fn index_form_mut(&mut self) -> &mut IndexSubmission {
        &mut self.index_form
    }

    pub fn query_form(&self) -> &QuerySubmission {
        &self.query_form
    }

    pub fn query_form_mut(&mut self) -> &mut QuerySubmission {
        &mut self.query_form
    }

    /// Starts indexing `repository`. Blank input, or any request already in
    /// flight, makes this a silent no-op. Returns whether a request was issued.
    pub fn submit_index(&mut self, repository: &str) -> bool {
        let repository = repository.trim();
        if repository.is_empty() {
            return false;
        }
        if !self.state.accepts_index() {
            debug!(state = ?self.state, "index submit dropped");
            return false;
        }

        let id = self.next_request_id();
        info!(%id, repository, "indexing");
        self.state = WorkflowState::Indexing;
        self.error = None;
        self.index = None;

        let backend = Arc::clone(&self.backend);
        let repository = repository.to_string();
        self.dispatch(
            async move { backend.index(&repository).await },
            move |outcome| Completion::Index { id, outcome },
        );
        true
    }

    /// Asks `question` with `top_k` passed through unchanged. No-op when the
    /// question is blank, no index exists, or a query is in flight.
    pub fn submit_query(&mut self, question: &str, top_k: i64) -> bool {
        let question = question.trim();
        if question.is_empty() || self.index.is_none() {
            return false;
        }
        if !self.state.accepts_query() {
            debug!(state = ?self.state, "query submit dropped");
            return false;
        }

        let id = self.next_request_id();
        info!(%id, question, top_k, "querying");
        self.state = WorkflowState::Querying;
        self.error = None;

        let backend = Arc::clone(&self.backend);
        let question = question.to_string();
        self.dispatch(
            async move { backend.query(&question, top_k).await },
            move |outcome| Completion::Query { id, outcome },
        );
        true
    }

    /// Submits whatever the index form currently holds.
    pub fn submit_index_form(&mut self) -> bool {
        if !self.index_form.can_submit(self.state) {
            return false;
        }
        let repository = self.index_form.trimmed().to_string();
        self.submit_index(&repository)
    }

    /// Submits whatever the query form currently holds.
    pub fn submit_query_form(&mut self) -> bool {
        if !self.query_form.can_submit(self.state) {
            return false;
        }
        let question = self.query_form.trimmed().to_string();
        let top_k = self.query_form.top_k();
        self.submit_query(&question, top_k)
    }

    /// Waits for the next in-flight request to finish. Returns `None` when
    /// nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<Completion> {
        if !self.state.in_flight() {
            return None;
        }
        self.rx.recv().await
    }

    /// Applies every completion that has already arrived.
    pub fn drain_ready(&mut self) -> Vec<Applied> {
        let mut applied = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            applied.push(self.apply(completion));
        }
        applied
    }

    /// Waits for the in-flight request, if any, and applies it.
    pub async fn settle(&mut self) -> Option<Applied> {
        let completion = self.next_completion().await?;
        Some(self.apply(completion))
    }

    pub fn apply(&mut self, completion: Completion) -> Applied {
        let id = completion.id();
        match (self.state, completion) {
            (WorkflowState::Indexing, Completion::Index { outcome, .. }) => match outcome {
                Ok(info) => {
                    info!(%id, repository = %info.repository, files = info.file_count, chunks = info.chunk_count, "indexed");
                    self.index = Some(info);
                    self.history.clear();
                    self.error = None;
                    self.state = WorkflowState::Indexed;
                    Applied::Indexed
                }
                Err(err) => {
                    warn!(%id, error = %err, "index failed");
                    self.error = Some(err.user_message(Operation::Index));
                    self.state = WorkflowState::Idle;
                    Applied::IndexFailed
                }
            },
            (WorkflowState::Querying, Completion::Query { outcome, .. }) => {
                self.state = WorkflowState::Indexed;
                match outcome {
                    Ok(result) => {
                        info!(%id, chunks = result.retrieved_chunks.len(), "answered");
                        let seq = self.history.prepend(result);
                        self.query_form.clear_question();
                        self.error = None;
                        Applied::Answered { seq }
                    }
                    Err(err) => {
                        warn!(%id, error = %err, "query failed");
                        self.error = Some(err.user_message(Operation::Query));
                        Applied::QueryFailed
                    }
                }
            }
            (state, completion) => {
                warn!(%id, ?state, ?completion, "completion does not match state, dropped");
                Applied::Ignored
            }
        }
    }

    /// Runs `work` on its own task and always posts exactly one completion:
    /// a task that panics or is cancelled comes back as `Interrupted`.
    fn dispatch<T, W, C>(&self, work: W, complete: C)
    where
        T: Send + 'static,
        W: Future<Output = Result<T, ApiError>> + Send + 'static,
        C: FnOnce(Result<T, ApiError>) -> Completion + Send + 'static,
    {
        let tx = self.tx.clone();
        let handle = tokio::spawn(work);
        tokio::spawn(async move {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join) => {
                    warn!(error = %join, "request task did not finish");
                    Err(ApiError::Interrupted(join.to_string()))
                }
            };
            let _ = tx.send(complete(outcome));
        });
    }

    fn next_request_id(&mut self) -> RequestId {
        self.next_id += 1;
        RequestId(self.next_id)
    }
}
