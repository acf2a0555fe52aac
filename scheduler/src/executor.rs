//! The protected operation.
//!
//! Implemented by the caller (a quote fetcher, an RPC call). The scheduler
//! never inspects the output, only whether the call settled cleanly.

use std::future::Future;

use async_trait::async_trait;

#[async_trait]
pub trait Executor<T: Send + 'static>: Send + Sync + 'static {
    async fn execute(&self, params: T) -> anyhow::Result<()>;
}

/// Adapts an async closure into an [`Executor`].
pub struct FnExecutor<F> {
    f: F,
}

pub fn executor_fn<T, F, Fut>(f: F) -> FnExecutor<F>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    FnExecutor { f }
}

#[async_trait]
impl<T, F, Fut> Executor<T> for FnExecutor<F>
where
    T: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    async fn execute(&self, params: T) -> anyhow::Result<()> {
        (self.f)(params).await
    }
}
