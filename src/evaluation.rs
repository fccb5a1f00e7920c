//! Differential evaluation of two candidate solutions on the input produced by a generator.
//!
//! The evaluation is a fork-join over three threads: the generator runs first, its output is
//! delivered to each candidate thread through its own one-shot channel, the two candidates run
//! concurrently and the evaluator waits for both of them before comparing their outputs.

use std::fmt::{Display, Formatter};
use std::thread;

use crossbeam_channel::bounded;
use serde::Serialize;

use eval_gist_exec::proto::{ExecutionRequest, ExecutionResult, SourceFile};
use eval_gist_exec::Dispatcher;

/// Which of the two candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Candidate {
    /// The first candidate.
    A,
    /// The second candidate.
    B,
}

impl Display for Candidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Candidate::A => write!(f, "candidate A"),
            Candidate::B => write!(f, "candidate B"),
        }
    }
}

/// The verdict of an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Verdict {
    /// All the programs ran and the two candidates printed the same output.
    Correct,
    /// All the programs ran and the two candidates printed different outputs.
    Incorrect,
    /// At least one of the programs couldn't be dispatched, so the outputs cannot be trusted.
    Inconclusive,
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Correct => write!(f, "Correct"),
            Verdict::Incorrect => write!(f, "Incorrect"),
            Verdict::Inconclusive => write!(f, "Inconclusive"),
        }
    }
}

/// What happened to a single run of the evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// The result of the run. If the dispatch failed this is an empty result.
    pub result: ExecutionResult,
    /// The error that prevented the dispatch of the run, if any.
    pub dispatch_error: Option<String>,
}

impl RunReport {
    /// Whether the run was dispatched successfully.
    pub fn dispatched(&self) -> bool {
        self.dispatch_error.is_none()
    }

    /// The report of a run that never happened.
    fn missing(what: &str) -> RunReport {
        RunReport {
            result: ExecutionResult::default(),
            dispatch_error: Some(format!("The {what} run did not complete")),
        }
    }
}

/// The outcome of the evaluation of two candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationOutcome {
    /// The verdict of the evaluation.
    pub verdict: Verdict,
    /// Whether the standard outputs of the candidates are identical, byte by byte. A run that
    /// couldn't be dispatched counts as an empty output.
    pub stdout_matches: bool,
    /// The input produced by the generator and given to both candidates.
    pub input: String,
    /// The report of the generator.
    pub generator: RunReport,
    /// The report of candidate A.
    pub candidate_a: RunReport,
    /// The report of candidate B.
    pub candidate_b: RunReport,
}

impl EvaluationOutcome {
    /// Build the outcome comparing the standard outputs of the candidates.
    fn new(
        input: String,
        generator: RunReport,
        candidate_a: RunReport,
        candidate_b: RunReport,
    ) -> EvaluationOutcome {
        let stdout_matches = candidate_a.result.stdout == candidate_b.result.stdout;
        let all_dispatched =
            generator.dispatched() && candidate_a.dispatched() && candidate_b.dispatched();
        let verdict = match (all_dispatched, stdout_matches) {
            (false, _) => Verdict::Inconclusive,
            (true, true) => Verdict::Correct,
            (true, false) => Verdict::Incorrect,
        };
        EvaluationOutcome {
            verdict,
            stdout_matches,
            input,
            generator,
            candidate_a,
            candidate_b,
        }
    }

    /// Whether the two candidates agree on the generated input.
    pub fn correct(&self) -> bool {
        self.verdict == Verdict::Correct
    }

    /// The report of a candidate.
    pub fn candidate(&self, candidate: Candidate) -> &RunReport {
        match candidate {
            Candidate::A => &self.candidate_a,
            Candidate::B => &self.candidate_b,
        }
    }
}

/// Runs the generator and the two candidates and compares their outputs.
#[derive(Debug, Clone)]
pub struct Evaluator {
    /// Where the runs are dispatched.
    dispatcher: Dispatcher,
}

impl Evaluator {
    /// Make a new `Evaluator` that dispatches its runs with `dispatcher`.
    pub fn new(dispatcher: Dispatcher) -> Evaluator {
        Evaluator { dispatcher }
    }

    /// Run the generator once, feed its output to both the candidates concurrently and compare
    /// their standard outputs.
    ///
    /// This never fails: when a run cannot be dispatched, or its thread cannot be spawned or
    /// panics, the error is logged, an empty result takes its place and the verdict is
    /// `Inconclusive`.
    pub fn evaluate(
        &self,
        generator: ExecutionRequest,
        candidate_a: ExecutionRequest,
        candidate_b: ExecutionRequest,
    ) -> EvaluationOutcome {
        let (input_a_tx, input_a_rx) = bounded::<ExecutionResult>(1);
        let (input_b_tx, input_b_rx) = bounded::<ExecutionResult>(1);
        let (results_tx, results_rx) = bounded::<(Candidate, RunReport)>(2);

        thread::scope(|scope| {
            let generator_thread = thread::Builder::new()
                .name("Generator".into())
                .spawn_scoped(scope, move || {
                    let report = self.run("generator", &generator);
                    // a receiver is gone only if its candidate thread panicked
                    let _ = input_a_tx.send(report.result.clone());
                    let _ = input_b_tx.send(report.result.clone());
                    report
                })
                .map_err(|e| error!("Failed to spawn the generator thread: {}", e))
                .ok();

            let candidates = [
                (Candidate::A, candidate_a, input_a_rx),
                (Candidate::B, candidate_b, input_b_rx),
            ];
            let mut candidate_threads = Vec::with_capacity(candidates.len());
            for (candidate, mut request, input_rx) in candidates {
                let results_tx = results_tx.clone();
                let handle = thread::Builder::new()
                    .name(format!("Candidate {candidate:?}"))
                    .spawn_scoped(scope, move || {
                        let input = match input_rx.recv() {
                            Ok(input) => input,
                            Err(_) => {
                                warn!("The generator never produced an input for {}", candidate);
                                return;
                            }
                        };
                        trace!("Input for {}: {:?}", candidate, input.stdout);
                        request.attach_stdin(SourceFile::stdin(input.stdout));
                        let report = self.run(&candidate.to_string(), &request);
                        let _ = results_tx.send((candidate, report));
                    });
                // on failure the closure is dropped along with its sender and receiver
                match handle {
                    Ok(handle) => candidate_threads.push((candidate, handle)),
                    Err(e) => error!("Failed to spawn the thread of {}: {}", candidate, e),
                }
            }
            drop(results_tx);

            let mut report_a = None;
            let mut report_b = None;
            for (candidate, report) in results_rx.iter().take(2) {
                debug!("Result of {} arrived", candidate);
                match candidate {
                    Candidate::A => report_a = Some(report),
                    Candidate::B => report_b = Some(report),
                }
            }
            // joined here so that a panic doesn't propagate out of the scope
            for (candidate, handle) in candidate_threads {
                if handle.join().is_err() {
                    error!("The thread of {} panicked", candidate);
                }
            }
            let generator = match generator_thread.map(|handle| handle.join()) {
                Some(Ok(report)) => report,
                Some(Err(_)) => {
                    error!("The generator thread panicked");
                    RunReport::missing("generator")
                }
                None => RunReport::missing("generator"),
            };
            let outcome = EvaluationOutcome::new(
                generator.result.stdout.clone(),
                generator,
                report_a.unwrap_or_else(|| RunReport::missing("candidate A")),
                report_b.unwrap_or_else(|| RunReport::missing("candidate B")),
            );
            if outcome.stdout_matches {
                info!("Identical on input {:?}", outcome.input);
            } else {
                info!(
                    "Different on input {:?}: {:?} {:?}",
                    outcome.input,
                    outcome.candidate_a.result.stdout,
                    outcome.candidate_b.result.stdout
                );
            }
            outcome
        })
    }

    /// Dispatch a request, replacing a dispatch failure with an empty result.
    fn run(&self, what: &str, request: &ExecutionRequest) -> RunReport {
        match self.dispatcher.dispatch(request) {
            Ok(result) => {
                if result.has_error() {
                    info!("The {} reported an error: {}", what, result.error);
                }
                RunReport {
                    result,
                    dispatch_error: None,
                }
            }
            Err(e) => {
                let e = anyhow::Error::from(e);
                warn!("Failed to run the {}: {:?}", what, e);
                RunReport {
                    result: ExecutionResult::default(),
                    dispatch_error: Some(format!("{e:#}")),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use eval_gist_exec::{FnSandboxRunner, RunnerError};
    use eval_gist_lang::LanguageRegistry;

    use super::*;

    fn report(stdout: &str, stderr: &str, error: &str) -> RunReport {
        RunReport {
            result: ExecutionResult {
                stdout: stdout.into(),
                stderr: stderr.into(),
                error: error.into(),
            },
            dispatch_error: None,
        }
    }

    #[test]
    fn test_outcome_equal_stdout() {
        let outcome = EvaluationOutcome::new(
            "1".into(),
            report("1", "", ""),
            report("a", "warning", ""),
            report("a", "", "exit status 1"),
        );
        assert_eq!(outcome.verdict, Verdict::Correct);
        assert!(outcome.correct());
    }

    #[test]
    fn test_outcome_different_stdout() {
        let outcome = EvaluationOutcome::new(
            "1".into(),
            report("1", "", ""),
            report("a", "", ""),
            report("b", "", ""),
        );
        assert_eq!(outcome.verdict, Verdict::Incorrect);
        assert!(!outcome.stdout_matches);
    }

    #[test]
    fn test_outcome_empty_stdout() {
        let outcome = EvaluationOutcome::new(
            "".into(),
            report("", "", ""),
            report("", "", ""),
            report("", "", ""),
        );
        assert!(outcome.correct());
    }

    #[test]
    fn test_outcome_failed_dispatch() {
        let outcome = EvaluationOutcome::new(
            "".into(),
            report("", "", ""),
            RunReport::missing("candidate A"),
            report("", "", ""),
        );
        assert_eq!(outcome.verdict, Verdict::Inconclusive);
        assert!(outcome.stdout_matches);
        assert!(!outcome.correct());
    }

    #[test]
    fn test_evaluate_echo() {
        let runner = FnSandboxRunner(|input: &[u8]| {
            let request: ExecutionRequest = serde_json::from_slice(input).unwrap();
            let stdout = match request.stdin() {
                Some(stdin) => stdin.to_string(),
                None => "3\n1 2 3".to_string(),
            };
            let result = ExecutionResult {
                stdout,
                ..Default::default()
            };
            Ok::<_, RunnerError>(serde_json::to_vec(&result).unwrap())
        });
        let evaluator = Evaluator::new(Dispatcher::new(
            Arc::new(LanguageRegistry::builtin()),
            runner,
        ));
        let outcome = evaluator.evaluate(
            ExecutionRequest::generator("python", "gen.py", ""),
            ExecutionRequest::candidate("python", "a.py", "", SourceFile::stdin("")),
            ExecutionRequest::candidate("cpp", "b.cpp", "", SourceFile::stdin("")),
        );
        assert_eq!(outcome.verdict, Verdict::Correct);
        assert_eq!(outcome.input, "3\n1 2 3");
        assert_eq!(outcome.candidate(Candidate::A).result.stdout, "3\n1 2 3");
        assert_eq!(outcome.candidate(Candidate::B).result.stdout, "3\n1 2 3");
    }

    #[test]
    fn test_evaluate_generator_panic() {
        let runner = FnSandboxRunner(|input: &[u8]| {
            let request: ExecutionRequest = serde_json::from_slice(input).unwrap();
            if request.stdin().is_none() {
                panic!("generator crashed");
            }
            Ok::<_, RunnerError>(br#"{"stdout": "ok"}"#.to_vec())
        });
        let evaluator = Evaluator::new(Dispatcher::new(
            Arc::new(LanguageRegistry::builtin()),
            runner,
        ));
        let outcome = evaluator.evaluate(
            ExecutionRequest::generator("python", "gen.py", ""),
            ExecutionRequest::candidate("python", "a.py", "", SourceFile::stdin("")),
            ExecutionRequest::candidate("python", "b.py", "", SourceFile::stdin("")),
        );
        assert_eq!(outcome.verdict, Verdict::Inconclusive);
        assert_eq!(outcome.input, "");
        assert!(!outcome.generator.dispatched());
        assert!(!outcome.candidate_a.dispatched());
        assert!(!outcome.candidate_b.dispatched());
    }
}
