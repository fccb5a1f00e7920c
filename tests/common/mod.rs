#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use eval_gist::Evaluator;
use eval_gist_exec::proto::{ExecutionRequest, ExecutionResult};
use eval_gist_exec::{Dispatcher, FnSandboxRunner, RunnerError};
use eval_gist_lang::LanguageRegistry;

pub fn setup() {
    let _ = env_logger::Builder::from_default_env()
        .format_timestamp_nanos()
        .is_test(true)
        .try_init();
}

/// A fake runner that interprets the content of the main file as a tiny script:
///
/// - `echo` prints the standard input;
/// - `random` prints a different number every time it's run;
/// - `reject` makes the runner fail;
/// - `error:<msg>` reports `<msg>` as the backend error;
/// - anything else is printed verbatim.
pub struct ScriptedRunner {
    /// How many requests the runner received.
    pub calls: Arc<AtomicUsize>,
    /// The evaluator using the runner with the built-in languages.
    pub evaluator: Evaluator,
}

impl ScriptedRunner {
    pub fn new() -> ScriptedRunner {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let runner = FnSandboxRunner(move |input: &[u8]| {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            let request: ExecutionRequest =
                serde_json::from_slice(input).map_err(|e| RunnerError::Rejected(e.to_string()))?;
            let script = request.main_file().map(|f| f.content.clone()).unwrap_or_default();
            let result = match script.as_str() {
                "echo" => ExecutionResult {
                    stdout: request.stdin().unwrap_or_default().to_string(),
                    ..Default::default()
                },
                "random" => ExecutionResult {
                    stdout: format!("{}\n", 1000 + call),
                    ..Default::default()
                },
                "reject" => return Err(RunnerError::Rejected("scripted failure".into())),
                s if s.starts_with("error:") => ExecutionResult {
                    error: s["error:".len()..].to_string(),
                    ..Default::default()
                },
                s => ExecutionResult {
                    stdout: s.to_string(),
                    ..Default::default()
                },
            };
            serde_json::to_vec(&result).map_err(|e| RunnerError::Rejected(e.to_string()))
        });
        let dispatcher = Dispatcher::new(Arc::new(LanguageRegistry::builtin()), runner);
        ScriptedRunner {
            calls,
            evaluator: Evaluator::new(dispatcher),
        }
    }

    /// How many requests reached the runner.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// A request for a generator running `script`.
pub fn generator(script: &str) -> ExecutionRequest {
    ExecutionRequest::generator("python", "gen.py", script)
}

/// A request for a candidate running `script`, with an empty standard input.
pub fn candidate(language: &str, name: &str, script: &str) -> ExecutionRequest {
    ExecutionRequest::candidate(
        language,
        name,
        script,
        eval_gist_exec::proto::SourceFile::stdin(""),
    )
}
