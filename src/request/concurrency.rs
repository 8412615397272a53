use std::num::NonZeroUsize;

use futures::future;
use futures::stream::{Stream, StreamExt};
use tracing::debug;

use crate::error::RequestError;
use crate::request::executor::CompletedRequest;
use crate::request::request_item::RequestItem;
use crate::response::Response;

/// In-flight ceiling used by [`imap`] when no size is given.
pub const DEFAULT_STREAM_CONCURRENCY: usize = 5;

/// Callback notified once per failed request with the original descriptor
/// and the captured error. Its return value is discarded.
pub type ExceptionHandler = Box<dyn FnMut(&RequestItem, &RequestError) + Send>;

/// Executes a batch of requests and returns the successful responses in
/// input order.
///
/// The input is materialized fully before dispatch. At most `size` requests
/// are in flight at once; `None` (or zero) sizes the pool to the host's
/// available parallelism. The call returns only after every request has
/// completed, on the success and partial-failure paths alike.
///
/// Failed requests are reported to `exception_handler` if one is supplied
/// and are omitted from the output either way, so the result may be shorter
/// than the input.
pub async fn map<I>(
    requests: I,
    stream: bool,
    size: Option<usize>,
    mut exception_handler: Option<ExceptionHandler>,
) -> Vec<Response>
where
    I: IntoIterator<Item = RequestItem>,
{
    let items: Vec<RequestItem> = requests.into_iter().collect();
    let size = size.filter(|s| *s > 0).unwrap_or_else(available_parallelism);
    debug!(total = items.len(), pool_size = size, "executing request batch");

    // `buffered` keeps at most `size` sends running and yields completions
    // in input order; collecting is the join barrier.
    let completed: Vec<CompletedRequest> = futures::stream::iter(items)
        .map(move |item| item.send(Some(stream)))
        .buffered(size)
        .collect()
        .await;

    let mut responses = Vec::with_capacity(completed.len());
    for done in completed {
        match done.into_parts() {
            (_, Ok(response)) => responses.push(response),
            (request, Err(error)) => {
                if let Some(handler) = exception_handler.as_mut() {
                    handler(&request, &error);
                }
            }
        }
    }
    responses
}

/// Executes requests from a possibly lazy or unbounded source, yielding
/// successful responses in completion order.
///
/// Descriptors are pulled from `requests` incrementally, with at most `size`
/// (default [`DEFAULT_STREAM_CONCURRENCY`]) in flight. The stream is
/// pull-based: requests make progress only while the consumer polls, and it
/// terminates once the source is exhausted and every in-flight request has
/// completed. Failed requests go to `exception_handler` and yield nothing.
///
/// Dropping the stream early drops all in-flight executions with it; no
/// separate teardown is needed. A single pass consumes the descriptors —
/// the stream cannot be restarted.
pub fn imap<I>(
    requests: I,
    stream: bool,
    size: Option<usize>,
    mut exception_handler: Option<ExceptionHandler>,
) -> impl Stream<Item = Response> + Send
where
    I: IntoIterator<Item = RequestItem>,
    I::IntoIter: Send + 'static,
{
    let size = size.filter(|s| *s > 0).unwrap_or(DEFAULT_STREAM_CONCURRENCY);
    debug!(pool_size = size, "executing request stream");

    futures::stream::iter(requests)
        .map(move |item| item.send(Some(stream)))
        .buffer_unordered(size)
        .filter_map(move |done| {
            let response = match done.into_parts() {
                (_, Ok(response)) => Some(response),
                (request, Err(error)) => {
                    if let Some(handler) = exception_handler.as_mut() {
                        handler(&request, &error);
                    }
                    None
                }
            };
            future::ready(response)
        })
}

fn available_parallelism() -> usize {
    std::thread::available_parallelism().map(NonZeroUsize::get).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_size_is_positive() {
        assert!(available_parallelism() >= 1);
    }

    #[tokio::test]
    async fn map_of_empty_input_is_empty() {
        let responses = map(Vec::new(), false, None, None).await;
        assert!(responses.is_empty());
    }

    #[tokio::test]
    async fn imap_of_empty_input_terminates() {
        let responses: Vec<Response> = imap(Vec::new(), false, Some(2), None).collect().await;
        assert!(responses.is_empty());
    }
}
