//! Collects individual requests into windows so a downstream capability
//! (e.g. an embedding or analysis RPC) can be called once per window rather
//! than once per request.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

pub struct Batcher<T, R> {
    tx: mpsc::Sender<(T, oneshot::Sender<R>)>,
}

impl<T: Send + 'static, R: Send + Clone + 'static> Batcher<T, R> {
    /// Spawns a background task that accumulates up to `max_batch_size`
    /// items or `max_wait` (whichever comes first), then calls `handler`
    /// once per batch and fans the shared result back out to every waiter.
    pub fn spawn<F, Fut>(max_batch_size: usize, max_wait: Duration, handler: F) -> Self
    where
        F: Fn(Vec<T>) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Vec<R>> + Send,
    {
        let (tx, mut rx) = mpsc::channel::<(T, oneshot::Sender<R>)>(max_batch_size * 4);

        tokio::spawn(async move {
            loop {
                let mut items = Vec::with_capacity(max_batch_size);
                let mut responders = Vec::with_capacity(max_batch_size);

                let first = match rx.recv().await {
                    Some(item) => item,
                    None => break,
                };
                items.push(first.0);
                responders.push(first.1);

                let deadline = tokio::time::Instant::now() + max_wait;
                while items.len() < max_batch_size {
                    match tokio::time::timeout_at(deadline, rx.recv()).await {
                        Ok(Some((item, responder))) => {
                            items.push(item);
                            responders.push(responder);
                        }
                        _ => break,
                    }
                }

                let results = handler(items).await;
                for (responder, result) in responders.into_iter().zip(results) {
                    let _ = responder.send(result);
                }
            }
        });

        Self { tx }
    }

    pub async fn submit(&self, item: T) -> Option<R> {
        let (resp_tx, resp_rx) = oneshot::channel();
        self.tx.send((item, resp_tx)).await.ok()?;
        resp_rx.await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn batches_requests_submitted_within_the_window() {
        let batcher = Batcher::spawn(4, Duration::from_millis(50), |items: Vec<i32>| async move {
            items.into_iter().map(|n| n * 2).collect()
        });

        let (a, b) = tokio::join!(batcher.submit(1), batcher.submit(2));
        assert_eq!(a, Some(2));
        assert_eq!(b, Some(4));
    }
}
