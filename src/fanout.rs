use std::cell::{Cell, RefCell};
use std::future::Future;

use anyhow::Result;
use futures::future::try_join_all;

/// Map `items` through an async `mapper` with at most `max_concurrency`
/// lookups in flight.
///
/// Workers run cooperatively on the calling task. Each claims the next
/// unclaimed index until the input is exhausted, so every item is mapped
/// exactly once. `Ok(None)` omits an item. Results come back in completion
/// order, not input order. The first error aborts the whole batch.
pub async fn map_with_concurrency<T, U, F, Fut>(
    items: &[T],
    max_concurrency: usize,
    mapper: F,
) -> Result<Vec<U>>
where
    F: Fn(&T) -> Fut,
    Fut: Future<Output = Result<Option<U>>>,
{
    let workers = max_concurrency.max(1).min(items.len());
    let cursor = &Cell::new(0usize);
    let collected = RefCell::new(Vec::with_capacity(items.len()));
    let results = &collected;
    let mapper = &mapper;

    let worker = move || async move {
        loop {
            let index = cursor.get();
            let Some(item) = items.get(index) else {
                break;
            };
            cursor.set(index + 1);

            if let Some(value) = mapper(item).await? {
                results.borrow_mut().push(value);
            }
        }
        Ok::<(), anyhow::Error>(())
    };

    try_join_all((0..workers).map(|_| worker())).await?;
    Ok(collected.into_inner())
}
