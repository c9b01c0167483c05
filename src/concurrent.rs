//! Bounded fan-out/fan-in task group
//!
//! Independent git reads and host lookups are started together, share one
//! [`CancellationToken`], and are joined as a unit. The first real error (by
//! completion order) cancels the token so siblings can bail out early; the
//! group still waits for every task before returning.

use crate::error::{Error, Result};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

/// Shared cancellation signal for a task group
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel every holder of this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check if the token has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(Error::Cancelled)` once the token is cancelled
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Boxed future produced by a [`Task`]
pub type TaskFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

/// A zero-argument operation that receives the group's cancellation token
pub type Task<T> = Box<dyn FnOnce(CancellationToken) -> TaskFuture<T> + Send>;

/// Box a closure into a [`Task`]
pub fn task<T, F, Fut>(f: F) -> Task<T>
where
    F: FnOnce(CancellationToken) -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    Box::new(move |token| Box::pin(f(token)))
}

/// Run blocking work (git plumbing) on the blocking pool, honouring cancellation
pub async fn blocking<T, F>(token: &CancellationToken, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    token.check()?;
    tokio::task::spawn_blocking(f).await?
}

/// Run every task concurrently, at most `limit` at a time
///
/// Results come back in start order. On failure the first non-cancellation
/// error is returned after all tasks have finished.
pub async fn run_all<T>(token: &CancellationToken, limit: usize, tasks: Vec<Task<T>>) -> Result<Vec<T>>
where
    T: Send + 'static,
{
    let count = tasks.len();
    if count == 0 {
        return Ok(Vec::new());
    }

    let permits = Arc::new(Semaphore::new(limit.clamp(1, count)));
    let mut set = JoinSet::new();
    for (index, task) in tasks.into_iter().enumerate() {
        let token = token.clone();
        let permits = Arc::clone(&permits);
        set.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .map_err(|e| Error::Internal(format!("task group closed: {e}")))?;
            token.check()?;
            task(token).await.map(|value| (index, value))
        });
    }

    let mut slots: Vec<Option<T>> = (0..count).map(|_| None).collect();
    let mut first_error: Option<Error> = None;

    while let Some(joined) = set.join_next().await {
        match joined.map_err(Error::from).and_then(|outcome| outcome) {
            Ok((index, value)) => slots[index] = Some(value),
            Err(err) => {
                token.cancel();
                let replace = first_error
                    .as_ref()
                    .is_none_or(|current| current.is_cancelled() && !err.is_cancelled());
                if replace {
                    debug!(error = %err, "task group failed");
                    first_error = Some(err);
                }
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err);
    }

    slots
        .into_iter()
        .map(|slot| slot.ok_or_else(|| Error::Internal("task produced no result".to_string())))
        .collect()
}

enum Either<A, B> {
    Left(A),
    Right(B),
}

/// Run two differently-typed operations concurrently
pub async fn run2<A, B, FA, FB, FutA, FutB>(token: &CancellationToken, a: FA, b: FB) -> Result<(A, B)>
where
    A: Send + 'static,
    B: Send + 'static,
    FA: FnOnce(CancellationToken) -> FutA + Send + 'static,
    FB: FnOnce(CancellationToken) -> FutB + Send + 'static,
    FutA: Future<Output = Result<A>> + Send + 'static,
    FutB: Future<Output = Result<B>> + Send + 'static,
{
    let tasks: Vec<Task<Either<A, B>>> = vec![
        task(move |t| async move { a(t).await.map(Either::Left) }),
        task(move |t| async move { b(t).await.map(Either::Right) }),
    ];

    let mut results = run_all(token, 2, tasks).await?.into_iter();
    match (results.next(), results.next()) {
        (Some(Either::Left(a)), Some(Either::Right(b))) => Ok((a, b)),
        _ => Err(Error::Internal("task results out of order".to_string())),
    }
}
