/// Bounded concurrent fan-out.
///
/// Batch enrichment (hover text for every outline entry, snippets for
/// every reference, symbols for every file in a directory) dispatches one
/// unit of work per item. Each unit waits on a shared semaphore before it
/// calls the language client, the whole group is joined before returning,
/// and a failed unit is logged and dropped without failing the batch.
///
/// Units run concurrently inside the caller's task; nothing is spawned.
/// Output order follows input order, but callers that need a stable
/// ordering by content sort the aggregate themselves.
use std::future::Future;

use futures::future::join_all;
use tokio::sync::Semaphore;

use crate::error::Result;

pub(crate) async fn bounded<I, F, Fut, T>(limit: &Semaphore, what: &str, items: I, run: F) -> Vec<T>
where
    I: IntoIterator,
    F: Fn(I::Item) -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let units = items.into_iter().map(move |item| {
        let unit = run(item);
        async move {
            let Ok(_permit) = limit.acquire().await else {
                return None;
            };
            match unit.await {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(error = %e, "{what}: dropping failed item");
                    None
                }
            }
        }
    });

    join_all(units).await.into_iter().flatten().collect()
}
