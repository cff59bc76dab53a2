use tracing::Instrument;

use super::{ToolExecutor, ToolInvocation, ToolKind, ToolResult};

/// Routes one invocation to the matching capability of `executor`.
///
/// Never fails: an unknown tool type is reported through the result.
pub async fn dispatch(
    executor: &dyn ToolExecutor,
    invocation: &ToolInvocation,
) -> ToolResult {
    let span = info_span!(
        "dispatch",
        kind = %invocation.kind,
        name = %invocation.name
    );
    async move {
        if !invocation.thought.is_empty() {
            debug!(thought = %invocation.thought, "tool rationale");
        }
        let result = match ToolKind::parse(&invocation.kind) {
            Some(ToolKind::FileOperation) => {
                executor.file_operation(invocation).await
            }
            Some(ToolKind::ShellCommand) => {
                executor.shell_command(invocation).await
            }
            None => ToolResult::failure(format!(
                "unknown tool type: {}",
                invocation.kind
            )),
        };
        match &result.error {
            None => info!(output_len = result.result.len(), "tool succeeded"),
            Some(err) => info!("tool failed: {err}"),
        }
        result
    }
    .instrument(span)
    .await
}

/// Progress of a [`dispatch_all`] run.
#[derive(Clone, Copy, Debug)]
pub enum Progress<'a> {
    /// The invocation is about to run.
    Started(&'a ToolInvocation),
    /// The invocation has completed.
    Finished(&'a ToolInvocation, &'a ToolResult),
}

/// Executes `invocations` one after another, in order.
///
/// `on_progress` observes each invocation right before it starts and
/// right after it completes. Returns exactly one result per invocation, in
/// the same order.
pub async fn dispatch_all<F>(
    executor: &dyn ToolExecutor,
    invocations: &[ToolInvocation],
    mut on_progress: F,
) -> Vec<ToolResult>
where
    F: FnMut(Progress<'_>),
{
    let mut results = Vec::with_capacity(invocations.len());
    for invocation in invocations {
        on_progress(Progress::Started(invocation));
        let result = dispatch(executor, invocation).await;
        on_progress(Progress::Finished(invocation, &result));
        results.push(result);
    }
    results
}
