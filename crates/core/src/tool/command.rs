use serde_json::{Map, Value};
use thiserror::Error;

use super::ToolInvocation;

const COMMAND_PREFIX: &str = "/tool";

/// Errors from parsing a `/tool` command line.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The line does not have the `/tool <type> <name>` shape.
    #[error("invalid tool command, usage: /tool <type> <name> [json-args]")]
    Usage,
    /// The arguments are not a JSON object.
    #[error("invalid tool arguments: {0}")]
    InvalidArguments(#[source] serde_json::Error),
}

/// Returns `true` if `line` is addressed to the `/tool` side channel.
pub fn is_tool_command(line: &str) -> bool {
    line.trim_start()
        .strip_prefix(COMMAND_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// Parses `/tool <type> <name> [json-args]` into an invocation.
///
/// Everything after the name is taken verbatim as the arguments, so the
/// JSON may contain spaces. Missing arguments mean an empty object.
pub fn parse_tool_command(line: &str) -> Result<ToolInvocation, CommandError> {
    let rest = line
        .trim()
        .strip_prefix(COMMAND_PREFIX)
        .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        .ok_or(CommandError::Usage)?;

    let (kind, rest) = next_token(rest).ok_or(CommandError::Usage)?;
    let (name, rest) = next_token(rest).ok_or(CommandError::Usage)?;

    let args_text = rest.trim();
    let args = if args_text.is_empty() {
        Map::new()
    } else {
        serde_json::from_str::<Map<String, Value>>(args_text)
            .map_err(CommandError::InvalidArguments)?
    };

    Ok(ToolInvocation::new(kind, name, args))
}

fn next_token(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(end) => Some((&s[..end], &s[end..])),
        None => Some((s, "")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_tool_command() {
        assert!(is_tool_command("/tool"));
        assert!(is_tool_command("/tool file_operation list"));
        assert!(is_tool_command("  /tool\tshell_command execute"));
        assert!(!is_tool_command("/toolbox"));
        assert!(!is_tool_command("run /tool please"));
    }

    #[test]
    fn test_parse_with_spaced_args() {
        let invocation = parse_tool_command(
            r#"/tool shell_command execute {"command": "ls -la /tmp"}"#,
        )
        .unwrap();
        assert_eq!(invocation.kind, "shell_command");
        assert_eq!(invocation.name, "execute");
        assert_eq!(invocation.str_arg("command"), Some("ls -la /tmp"));
    }

    #[test]
    fn test_parse_without_args() {
        let invocation = parse_tool_command("/tool file_operation list").unwrap();
        assert_eq!(invocation.name, "list");
        assert!(invocation.args.is_empty());
    }

    #[test]
    fn test_usage_errors() {
        assert!(matches!(
            parse_tool_command("/tool"),
            Err(CommandError::Usage)
        ));
        assert!(matches!(
            parse_tool_command("/tool file_operation"),
            Err(CommandError::Usage)
        ));
        assert!(matches!(
            parse_tool_command("/toolx file_operation list"),
            Err(CommandError::Usage)
        ));
    }

    #[test]
    fn test_invalid_args() {
        let err =
            parse_tool_command("/tool file_operation read [1, 2]").unwrap_err();
        assert!(matches!(err, CommandError::InvalidArguments(_)));
        assert!(err.to_string().starts_with("invalid tool arguments: "));

        assert!(matches!(
            parse_tool_command("/tool file_operation read {path: x}"),
            Err(CommandError::InvalidArguments(_))
        ));
    }
}
