//! Dispatching of the execution requests to an external sandbox runner.
//!
//! This crate never runs untrusted code: every program is sent to a runner, an opaque component
//! that receives a JSON-encoded [`ExecutionRequest`](proto/struct.ExecutionRequest.html) and
//! answers with a JSON-encoded [`ExecutionResult`](proto/struct.ExecutionResult.html).
//!
//! The components are:
//!
//! - [`SandboxRunner`](trait.SandboxRunner.html), the capability of transforming the bytes of a
//!   request into the bytes of a result. [`ProcessRunner`](struct.ProcessRunner.html) implements it
//!   by spawning the runner executable, other implementations are useful for testing.
//! - [`Dispatcher`](struct.Dispatcher.html), which checks that the language of a request is
//!   enabled in the [`LanguageRegistry`](../eval_gist_lang/struct.LanguageRegistry.html), encodes
//!   the request, invokes the runner and decodes its answer.
//!
//! ```
//! use std::sync::Arc;
//! use eval_gist_exec::proto::ExecutionRequest;
//! use eval_gist_exec::{Dispatcher, FnSandboxRunner, RunnerError};
//! use eval_gist_lang::LanguageRegistry;
//!
//! let runner = FnSandboxRunner(|_: &[u8]| {
//!     Ok::<_, RunnerError>(br#"{"stdout": "hello\n", "stderr": "", "err": ""}"#.to_vec())
//! });
//! let dispatcher = Dispatcher::new(Arc::new(LanguageRegistry::builtin()), runner);
//! let request = ExecutionRequest::generator("python", "gen.py", "print('hello')");
//! assert_eq!(dispatcher.dispatch(&request).unwrap().stdout, "hello\n");
//! ```

#![deny(missing_docs)]

#[macro_use]
extern crate log;

mod dispatcher;
pub mod proto;
mod sandbox_runner;

pub use dispatcher::{DispatchError, Dispatcher};
pub use sandbox_runner::{
    ErrorSandboxRunner, FnSandboxRunner, ProcessRunner, RunnerError, SandboxRunner,
};
