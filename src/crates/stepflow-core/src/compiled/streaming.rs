//! Streaming execution

use super::execution::Execution;
use super::types::{RunConfig, SnapshotStream};
use super::CompiledGraph;
use serde_json::Value;
use tracing::{debug, error};

impl CompiledGraph {
    /// Stream one [`StepSnapshot`](super::StepSnapshot) per completed step
    ///
    /// Nothing runs until the stream is first polled, and each poll runs at
    /// most one node. Each step runs on its own task, so dropping the stream
    /// stops the run at the next step boundary: a node body in flight still
    /// returns, its delta is merged and checkpointed, then the thread lock
    /// is released and no further node is invoked.
    ///
    /// A fatal error is delivered as the last item.
    ///
    /// ```rust,ignore
    /// use futures::StreamExt;
    ///
    /// let mut stream = compiled.stream(json!({"video_url": url}), RunConfig::thread("t1"));
    /// while let Some(snapshot) = stream.next().await {
    ///     let snapshot = snapshot?;
    ///     println!("{} -> {:?}", snapshot.node, snapshot.next);
    /// }
    /// ```
    pub fn stream(&self, input: Value, config: RunConfig) -> SnapshotStream {
        let compiled = self.clone();

        let stream = async_stream::stream! {
            match Execution::start(&compiled, input, &config).await {
                Err(err) => {
                    error!(error = %err, thread_id = ?config.thread_id, "Failed to start streamed run");
                    yield Err(err);
                }
                Ok(mut execution) => loop {
                    let task = tokio::spawn(async move {
                        let result = execution.step().await;
                        (execution, result)
                    });
                    let result = match task.await {
                        Ok((returned, result)) => {
                            execution = returned;
                            result
                        }
                        Err(join) if join.is_panic() => std::panic::resume_unwind(join.into_panic()),
                        Err(_) => {
                            debug!(thread_id = ?config.thread_id, "Step task cancelled");
                            break;
                        }
                    };
                    match result {
                        Ok(Some(snapshot)) => yield Ok(snapshot),
                        Ok(None) => {
                            debug!(thread_id = ?config.thread_id, "Streamed run completed");
                            break;
                        }
                        Err(err) => {
                            error!(error = %err, thread_id = ?config.thread_id, "Streamed run failed");
                            yield Err(err);
                            break;
                        }
                    }
                },
            }
        };

        Box::pin(stream)
    }
}
