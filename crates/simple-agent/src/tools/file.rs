use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;
use simple_agent_core::tool::{
    Error as ToolError, ToolDefinition, ToolInvocation, ToolKind,
};
use tokio::fs;

use super::parse_args;

/// Files larger than this are refused by `read`.
pub const MAX_READ_BYTES: u64 = 1024 * 1024;

const KB: u64 = 1024;
const MB: u64 = 1024 * 1024;

#[derive(Deserialize, JsonSchema)]
struct ListParameters {
    #[schemars(
        description = "Relative path of the directory, default to \".\".",
        with = "Option<String>"
    )]
    #[serde(default)]
    path: Option<Value>,
}

#[derive(Deserialize, JsonSchema)]
struct ReadParameters {
    #[schemars(description = "Relative path of the file.")]
    path: String,
}

#[derive(Deserialize, JsonSchema)]
struct WriteParameters {
    #[schemars(description = "Relative path of the file.")]
    path: String,
    #[schemars(description = "The full new content of the file.")]
    content: String,
}

/// List, read and write operations confined to a workspace root.
///
/// Paths are relative to the root. Absolute paths and paths containing
/// `..` are refused before the filesystem is touched.
#[derive(Clone, Debug)]
pub struct FileOperations {
    root: PathBuf,
}

impl FileOperations {
    /// Creates file operations rooted at `root`.
    #[inline]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Returns the workspace root.
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Describes the supported operations.
    pub fn definitions() -> Vec<ToolDefinition> {
        let define = |name: &str, description: &str, parameters| ToolDefinition {
            kind: ToolKind::FileOperation,
            name: name.to_owned(),
            description: description.to_owned(),
            parameters,
        };
        vec![
            define(
                "list",
                "Lists the entries of a directory with their type and size.",
                schema_for!(ListParameters).to_value(),
            ),
            define(
                "read",
                "Reads a text file. Files over 1 MB are refused.",
                schema_for!(ReadParameters).to_value(),
            ),
            define(
                "write",
                "Writes a file, replacing its content. Missing parent \
                 directories are created.",
                schema_for!(WriteParameters).to_value(),
            ),
        ]
    }

    /// Performs the operation named by `invocation`.
    pub async fn execute(
        &self,
        invocation: &ToolInvocation,
    ) -> Result<String, ToolError> {
        match invocation.name.as_str() {
            "list" => {
                let params: ListParameters = parse_args(invocation)?;
                // Anything but a string lists the root.
                let path = params.path.as_ref().and_then(Value::as_str);
                self.list(path.unwrap_or(".")).await
            }
            "read" => {
                let params: ReadParameters = parse_args(invocation)?;
                self.read(&params.path).await
            }
            "write" => {
                let params: WriteParameters = parse_args(invocation)?;
                self.write(&params.path, &params.content).await
            }
            other => Err(ToolError::invalid_input()
                .with_reason(format!("unknown file operation: {other}"))),
        }
    }

    async fn list(&self, path: &str) -> Result<String, ToolError> {
        let full_path = self.resolve(path)?;
        let metadata =
            fs::metadata(&full_path).await.map_err(|err| fs_error(path, err))?;
        if !metadata.is_dir() {
            return Err(ToolError::invalid_input()
                .with_reason(format!("{path} is not a directory")));
        }

        let mut dir =
            fs::read_dir(&full_path).await.map_err(|err| fs_error(path, err))?;
        let mut entries = vec![];
        while let Some(entry) =
            dir.next_entry().await.map_err(|err| fs_error(path, err))?
        {
            let metadata =
                entry.metadata().await.map_err(|err| fs_error(path, err))?;
            entries.push((
                entry.file_name().to_string_lossy().into_owned(),
                metadata.is_dir(),
                metadata.len(),
            ));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let mut output = format!(
            "Contents of directory {path}:\nName\tType\tSize\n----\t----\t----\n"
        );
        for (name, is_dir, size) in entries {
            let kind = if is_dir { "directory" } else { "file" };
            let _ = writeln!(output, "{name}\t{kind}\t{}", format_size(size));
        }
        Ok(output)
    }

    async fn read(&self, path: &str) -> Result<String, ToolError> {
        let full_path = self.resolve(path)?;
        let metadata =
            fs::metadata(&full_path).await.map_err(|err| fs_error(path, err))?;
        if metadata.is_dir() {
            return Err(ToolError::invalid_input()
                .with_reason(format!("{path} is a directory")));
        }
        if metadata.len() > MAX_READ_BYTES {
            return Err(ToolError::invalid_input().with_reason(format!(
                "{path} is too large ({} bytes, limit is {MAX_READ_BYTES} bytes)",
                metadata.len()
            )));
        }

        let content =
            fs::read(&full_path).await.map_err(|err| fs_error(path, err))?;
        debug!(path, len = content.len(), "read file");
        Ok(String::from_utf8_lossy(&content).into_owned())
    }

    async fn write(&self, path: &str, content: &str) -> Result<String, ToolError> {
        let full_path = self.resolve(path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| fs_error(path, err))?;
        }
        fs::write(&full_path, content)
            .await
            .map_err(|err| fs_error(path, err))?;
        debug!(path, len = content.len(), "wrote file");
        Ok(format!("Successfully wrote {} bytes to {path}", content.len()))
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, ToolError> {
        if path.contains("..")
            || path.starts_with('/')
            || Path::new(path).is_absolute()
        {
            warn!(path, "refusing path outside the workspace");
            return Err(ToolError::permission_denied().with_reason(format!(
                "access denied: {path} is outside the workspace"
            )));
        }
        Ok(self.root.join(path))
    }
}

fn fs_error(path: &str, err: io::Error) -> ToolError {
    ToolError::execution_error().with_reason(format!("{path}: {err}"))
}

fn format_size(size: u64) -> String {
    if size > MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size > KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
