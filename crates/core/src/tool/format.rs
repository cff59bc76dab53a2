use std::fmt::Write;

use super::ToolResult;

/// Renders tool results into the text of a `tool` message.
///
/// Calls are numbered from 1 in execution order. A failed call shows its
/// error, followed by its output when it produced any.
pub fn format_tool_results(results: &[ToolResult]) -> String {
    let mut text = String::from("Tool execution results:\n==============\n\n");
    for (idx, result) in results.iter().enumerate() {
        let status = if result.is_success() { "success" } else { "failure" };
        // Writing into a `String` never fails.
        let _ = write!(text, "Tool call {}:\nStatus: {status}\n", idx + 1);
        if let Some(err) = &result.error {
            let _ = writeln!(text, "Error: {err}");
        }
        if result.error.is_none() || !result.result.is_empty() {
            let _ = writeln!(text, "Result:\n{}", result.result);
        }
        text.push('\n');
    }
    text
}
