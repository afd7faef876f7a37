//! Where calls run and where their outcomes are delivered.
//!
//! Every façade call is a single-shot pipeline wrapped in a [`Call`]. The
//! injected [`Schedulers`] value decides two things:
//!
//! - the **work** context: where the network I/O and decoding run
//! - the **delivery** context: where [`Call::on_complete`] callbacks run
//!
//! Awaiting a [`Call`] delivers in the awaiting task. Tests use
//! [`Schedulers::immediate`] so the whole pipeline is polled inline.
//!
//! A call can be cancelled through its [`CancelHandle`]. Once cancelled, no
//! outcome is delivered and the in-flight work is dropped.

use crate::error::SearchError;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

/// An execution context for one side of the pipeline.
#[derive(Debug, Clone, Default)]
pub enum ExecutionContext {
    /// Run in whichever task drives the call.
    #[default]
    Inline,
    /// Run on the given tokio runtime.
    Runtime(Handle),
}

/// The work/delivery policy injected into the client.
#[derive(Debug, Clone, Default)]
pub struct Schedulers {
    pub work: ExecutionContext,
    pub delivery: ExecutionContext,
}

impl Schedulers {
    /// Work and delivery both inline, with no background tasks.
    pub fn immediate() -> Self {
        Self {
            work: ExecutionContext::Inline,
            delivery: ExecutionContext::Inline,
        }
    }

    /// Work on `runtime`; awaiting callers receive outcomes in their own task.
    pub fn background(runtime: Handle) -> Self {
        Self {
            work: ExecutionContext::Runtime(runtime),
            delivery: ExecutionContext::Inline,
        }
    }

    /// Work on the current tokio runtime, falling back to inline work when
    /// there is none.
    pub fn current() -> Self {
        match Handle::try_current() {
            Ok(handle) => Self::background(handle),
            Err(_) => Self::immediate(),
        }
    }

    pub fn with_delivery(mut self, delivery: ExecutionContext) -> Self {
        self.delivery = delivery;
        self
    }

    /// Wraps `work` in a cancellable [`Call`] according to this policy.
    pub fn run<T, F>(&self, work: F) -> Call<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T, SearchError>> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancel = CancelHandle {
            token: token.clone(),
        };

        let future: BoxFuture<'static, Result<T, SearchError>> = match &self.work {
            ExecutionContext::Inline => {
                let token = token.clone();
                async move {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => Err(SearchError::Cancelled),
                        result = work => result,
                    }
                }
                .boxed()
            }
            ExecutionContext::Runtime(handle) => {
                let worker_token = token.clone();
                let task = handle.spawn(async move {
                    tokio::select! {
                        biased;
                        _ = worker_token.cancelled() => {
                            debug!("Call cancelled, dropping in-flight work");
                            None
                        }
                        result = work => Some(result),
                    }
                });
                let token = token.clone();
                async move {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => Err(SearchError::Cancelled),
                        joined = task => match joined {
                            Ok(Some(result)) => result,
                            Ok(None) => Err(SearchError::Cancelled),
                            Err(e) => Err(SearchError::Task(e.to_string())),
                        },
                    }
                }
                .boxed()
            }
        };

        Call {
            future,
            cancel,
            delivery: self.delivery.clone(),
            _guard: token.drop_guard(),
        }
    }
}

/// Requests cancellation of a [`Call`].
#[derive(Clone, Debug)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// A pending backend call.
///
/// Resolves to the call's outcome, or to [`SearchError::Cancelled`] once the
/// call has been cancelled. Dropping a `Call` before it completes cancels it.
#[must_use = "calls do nothing unless awaited or given a callback"]
pub struct Call<T> {
    future: BoxFuture<'static, Result<T, SearchError>>,
    cancel: CancelHandle,
    delivery: ExecutionContext,
    _guard: DropGuard,
}

impl<T: Send + 'static> Call<T> {
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Delivers the outcome to `callback` on the delivery context.
    ///
    /// The callback is never invoked for a cancelled call. With an inline
    /// delivery context the callback runs on the ambient tokio runtime; if
    /// there is none, the call is dropped and [`SearchError::Config`] returned.
    pub fn on_complete<C>(self, callback: C) -> Result<CancelHandle, SearchError>
    where
        C: FnOnce(Result<T, SearchError>) + Send + 'static,
    {
        let cancel = self.cancel.clone();
        let handle = match &self.delivery {
            ExecutionContext::Runtime(handle) => handle.clone(),
            ExecutionContext::Inline => Handle::try_current().map_err(|e| {
                SearchError::Config(format!("No tokio runtime to deliver the outcome on: {e}"))
            })?,
        };
        handle.spawn(async move {
            // Await by reference: dropping the call trips its guard.
            let mut call = self;
            let outcome = (&mut call).await;
            if call.cancel.is_cancelled() || matches!(outcome, Err(SearchError::Cancelled)) {
                debug!("Suppressing delivery of cancelled call");
                return;
            }
            callback(outcome);
        });
        Ok(cancel)
    }
}

impl<T> Future for Call<T> {
    type Output = Result<T, SearchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

impl<T> std::fmt::Debug for Call<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Call")
            .field("cancelled", &self.cancel.is_cancelled())
            .field("delivery", &self.delivery)
            .finish()
    }
}
