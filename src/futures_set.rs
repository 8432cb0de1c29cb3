use std::{future::Future, panic::AssertUnwindSafe};

use futures::FutureExt;
use tokio::task::JoinSet;
use tracing::warn;

/// Spawns every future on its own task and waits for all of them.
///
/// Outputs come back in submission order whatever the completion order:
/// each task owns one pre-assigned slot of the result vector. A slot whose
/// future panicked is `None`, the other slots are unaffected.
pub async fn join_all_indexed<Iterable, Output>(
    iterable: Iterable,
) -> Vec<Option<Output>>
where
    Iterable: IntoIterator,
    Iterable::Item: Future<Output = Output> + Send + 'static,
    Output: Send + 'static,
{
    let mut set = JoinSet::new();
    let mut slots: Vec<Option<Output>> = Vec::new();

    for (index, future) in iterable.into_iter().enumerate() {
        set.spawn(async move {
            let output = AssertUnwindSafe(future).catch_unwind().await.ok();
            (index, output)
        });
        slots.push(None);
    }

    while let Some(result) = set.join_next().await {
        match result {
            Ok((index, output)) => {
                if output.is_none() {
                    warn!("Task {} panicked", index);
                }
                slots[index] = output;
            },
            Err(e) => warn!("Task failed: {}", e),
        }
    }

    slots
}
