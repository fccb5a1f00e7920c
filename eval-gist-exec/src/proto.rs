//! The messages exchanged with the sandbox runner.
//!
//! The runner receives an [`ExecutionRequest`](struct.ExecutionRequest.html) serialized as JSON
//! and answers with an [`ExecutionResult`](struct.ExecutionResult.html). The field names are part
//! of the wire format and must not change.

use serde::{Deserialize, Serialize};

/// Name of the file whose content is fed to the standard input of the program.
pub const STDIN_FILE_NAME: &str = "_stdin_";

/// A file sent to the runner, either a source file or the standard input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// The name of the file.
    #[serde(rename = "Name")]
    pub name: String,
    /// The content of the file.
    #[serde(rename = "Content")]
    pub content: String,
    /// Identifier of the remote source the file comes from, empty if local.
    #[serde(default)]
    pub id: String,
    /// Revision of the remote source the file comes from, empty if local.
    #[serde(default)]
    pub sha: String,
}

impl SourceFile {
    /// Make a new local `SourceFile`.
    pub fn new<N: Into<String>, C: Into<String>>(name: N, content: C) -> SourceFile {
        SourceFile {
            name: name.into(),
            content: content.into(),
            ..Default::default()
        }
    }

    /// Make the file that feeds `content` to the standard input of the program.
    pub fn stdin<C: Into<String>>(content: C) -> SourceFile {
        SourceFile::new(STDIN_FILE_NAME, content)
    }

    /// Set the provenance of this file.
    pub fn with_provenance<I: Into<String>, S: Into<String>>(mut self, id: I, sha: S) -> Self {
        self.id = id.into();
        self.sha = sha.into();
        self
    }

    /// Whether this is the standard input file and not a source file.
    pub fn is_stdin(&self) -> bool {
        self.name == STDIN_FILE_NAME
    }
}

/// A request for the runner: run the program made by `files` in the language `language`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Identifier of the language of the program.
    #[serde(rename = "Language")]
    pub language: String,
    /// The files of the program. The first one is the main source file.
    #[serde(rename = "Files")]
    pub files: Vec<SourceFile>,
}

impl ExecutionRequest {
    /// Make a request for running a generator: a single source file and no standard input.
    ///
    /// Generators are not given any input by the evaluator. A generator that reads its standard
    /// input can still get one with [`attach_stdin`](#method.attach_stdin).
    pub fn generator<L, N, C>(language: L, name: N, content: C) -> ExecutionRequest
    where
        L: Into<String>,
        N: Into<String>,
        C: Into<String>,
    {
        ExecutionRequest {
            language: language.into(),
            files: vec![SourceFile::new(name, content)],
        }
    }

    /// Make a request for running a candidate solution: its source file followed by the file with
    /// the standard input.
    pub fn candidate<L, N, C>(
        language: L,
        name: N,
        content: C,
        stdin: SourceFile,
    ) -> ExecutionRequest
    where
        L: Into<String>,
        N: Into<String>,
        C: Into<String>,
    {
        ExecutionRequest {
            language: language.into(),
            files: vec![SourceFile::new(name, content), stdin],
        }
    }

    /// The main source file of the program, if any.
    pub fn main_file(&self) -> Option<&SourceFile> {
        self.files.iter().find(|f| !f.is_stdin())
    }

    /// The content fed to the standard input, if any.
    pub fn stdin(&self) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.is_stdin())
            .map(|f| f.content.as_str())
    }

    /// Set the standard input of the program. If the request already has a standard input file
    /// its content is replaced, otherwise the file is appended, keeping the order of the others.
    pub fn attach_stdin(&mut self, stdin: SourceFile) {
        match self.files.iter_mut().find(|f| f.is_stdin()) {
            Some(file) => file.content = stdin.content,
            None => self.files.push(stdin),
        }
    }
}

/// The result of an execution, as reported by the runner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// What the program wrote to its standard output.
    #[serde(default)]
    pub stdout: String,
    /// What the program wrote to its standard error.
    #[serde(default)]
    pub stderr: String,
    /// The error reported by the backend (e.g. compilation failure), empty if none.
    #[serde(rename = "err", default)]
    pub error: String,
}

impl ExecutionResult {
    /// Whether the backend reported an error for this execution.
    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_wire_format() {
        let request = ExecutionRequest::candidate(
            "cpp",
            "sol.cpp",
            "int main() {}",
            SourceFile::stdin("1 2"),
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "Language": "cpp",
                "Files": [
                    {"Name": "sol.cpp", "Content": "int main() {}", "id": "", "sha": ""},
                    {"Name": "_stdin_", "Content": "1 2", "id": "", "sha": ""},
                ]
            })
        );
    }

    #[test]
    fn test_provenance_serialized() {
        let file = SourceFile::new("gen.py", "print(1)").with_provenance("abc", "123");
        let value = serde_json::to_value(&file).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["sha"], "123");
    }

    #[test]
    fn test_result_wire_format() {
        let result: ExecutionResult =
            serde_json::from_str(r#"{"stdout": "42\n", "stderr": "warn", "err": "boom"}"#)
                .unwrap();
        assert_eq!(result.stdout, "42\n");
        assert_eq!(result.stderr, "warn");
        assert_eq!(result.error, "boom");
        assert!(result.has_error());
    }

    #[test]
    fn test_result_missing_fields() {
        let result: ExecutionResult = serde_json::from_str(r#"{"stdout": "x"}"#).unwrap();
        assert_eq!(result.stdout, "x");
        assert!(!result.has_error());
    }

    #[test]
    fn test_generator_has_no_stdin() {
        let request = ExecutionRequest::generator("python", "gen.py", "print(3)");
        assert_eq!(request.files.len(), 1);
        assert_eq!(request.stdin(), None);
        assert_eq!(request.main_file().unwrap().name, "gen.py");
    }

    #[test]
    fn test_generator_with_input() {
        let mut request = ExecutionRequest::generator("python", "gen.py", "print(input())");
        request.attach_stdin(SourceFile::stdin("seed 42"));
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["Files"][0]["Name"], "gen.py");
        assert_eq!(value["Files"][1]["Name"], "_stdin_");
        assert_eq!(value["Files"][1]["Content"], "seed 42");
    }

    #[test]
    fn test_attach_stdin_appends() {
        let mut request = ExecutionRequest::generator("python", "sol.py", "print(input())");
        request.attach_stdin(SourceFile::stdin("hello"));
        assert_eq!(request.files.len(), 2);
        assert_eq!(request.files[0].name, "sol.py");
        assert_eq!(request.stdin(), Some("hello"));
    }

    #[test]
    fn test_attach_stdin_replaces() {
        let mut request =
            ExecutionRequest::candidate("python", "sol.py", "", SourceFile::stdin("old"));
        request.attach_stdin(SourceFile::stdin("new"));
        assert_eq!(request.files.len(), 2);
        assert_eq!(request.stdin(), Some("new"));
    }

    #[test]
    fn test_attach_stdin_idempotent() {
        let mut once = ExecutionRequest::generator("cpp", "sol.cpp", "");
        once.attach_stdin(SourceFile::stdin("3\n1 2 3"));
        let mut twice = once.clone();
        twice.attach_stdin(SourceFile::stdin("3\n1 2 3"));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_attach_stdin_keeps_order() {
        let mut request = ExecutionRequest {
            language: "cpp".into(),
            files: vec![
                SourceFile::new("main.cpp", ""),
                SourceFile::stdin("a"),
                SourceFile::new("lib.h", ""),
            ],
        };
        request.attach_stdin(SourceFile::stdin("b"));
        let names: Vec<_> = request.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["main.cpp", "_stdin_", "lib.h"]);
        assert_eq!(request.stdin(), Some("b"));
    }
}
