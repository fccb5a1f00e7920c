use std::sync::Arc;

use thiserror::Error;

use eval_gist_lang::LanguageRegistry;

use crate::proto::{ExecutionRequest, ExecutionResult};
use crate::sandbox_runner::{RunnerError, SandboxRunner};

/// A failure dispatching a request to the runner. A program that fails inside the sandbox is not
/// a dispatch failure: it is reported in [`ExecutionResult::error`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The language of the request is not enabled for the backend.
    #[error("Language {0} not supported")]
    LanguageUnsupported(String),
    /// The request cannot be serialized.
    #[error("Failed to encode the execution request")]
    Encoding(#[source] serde_json::Error),
    /// The runner cannot be invoked or it failed.
    #[error("Failed to invoke the runner")]
    Transport(#[from] RunnerError),
    /// The answer of the runner is malformed.
    #[error("Invalid answer from the runner")]
    Decoding(#[source] serde_json::Error),
}

/// Sends the execution requests to a sandbox runner, after checking that their language can be
/// used.
///
/// The dispatcher keeps no state between calls, it's cheap to clone and can be shared between
/// threads.
#[derive(Clone)]
pub struct Dispatcher {
    /// The languages known to the backend.
    registry: Arc<LanguageRegistry>,
    /// Who actually runs the requests.
    runner: Arc<dyn SandboxRunner>,
}

impl Dispatcher {
    /// Make a new `Dispatcher` that checks the languages against `registry` and sends the requests
    /// to `runner`.
    pub fn new<R: SandboxRunner + 'static>(registry: Arc<LanguageRegistry>, runner: R) -> Self {
        Dispatcher {
            registry,
            runner: Arc::new(runner),
        }
    }

    /// Run a request using the runner, blocking until the result is ready.
    ///
    /// The runner is invoked exactly once, and only if the language of the request is supported.
    /// If the execution fails inside the sandbox (e.g. a compilation error) the result is still
    /// returned, with its `error` field set.
    pub fn dispatch(&self, request: &ExecutionRequest) -> Result<ExecutionResult, DispatchError> {
        if !self.registry.is_supported(&request.language) {
            return Err(DispatchError::LanguageUnsupported(request.language.clone()));
        }
        info!(
            "Dispatching {} ({})",
            request
                .main_file()
                .map(|f| f.name.as_str())
                .unwrap_or("<no source>"),
            request.language
        );
        let input = serde_json::to_vec(request).map_err(DispatchError::Encoding)?;
        let output = self.runner.execute(&input)?;
        let result: ExecutionResult =
            serde_json::from_slice(&output).map_err(DispatchError::Decoding)?;
        debug!("Execution result: {:?}", result);
        Ok(result)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
