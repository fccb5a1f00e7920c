//! # eval-gist
//!
//! Differential testing of two solutions of a competitive programming task: a generator produces a
//! single input, both solutions are run on it through an external sandbox runner and their outputs
//! are compared byte by byte.
//!
//! This is both an application and a library, the library can be used to run the same evaluation
//! of the `eval-gist` binary inside your application.

#[macro_use]
extern crate log;

pub mod bundle;
pub mod error;
pub mod evaluation;
pub mod gist;
pub mod local;
pub mod opt;

pub use bundle::{Bundle, Program};
pub use evaluation::{Candidate, EvaluationOutcome, Evaluator, RunReport, Verdict};
pub use local::*;
pub use opt::*;
