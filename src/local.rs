use std::sync::Arc;

use anyhow::{Context, Error};

use eval_gist_exec::{Dispatcher, ProcessRunner};
use eval_gist_lang::LanguageRegistry;

use crate::bundle::Bundle;
use crate::evaluation::{Candidate, EvaluationOutcome, Evaluator, RunReport, Verdict};
use crate::gist::GistClient;
use crate::opt::Opt;

/// Entry point of the evaluation: load the programs and, if a runner is available, compare the
/// candidates.
pub fn main_local(opt: Opt) -> Result<(), Error> {
    let bundle = load_bundle(&opt)?;
    let runner = match (&opt.runner, opt.fetch_only) {
        (Some(runner), false) => runner,
        (None, false) => {
            warn!("No runner specified, only printing the programs");
            return print_bundle(&bundle);
        }
        (_, true) => return print_bundle(&bundle),
    };

    let registry = match &opt.languages {
        Some(path) => LanguageRegistry::from_json(path)?,
        None => LanguageRegistry::builtin(),
    };
    debug!("Supported languages: {:?}", registry.supported_languages());
    let mut runner = ProcessRunner::new(runner).context("Invalid runner")?;
    if let Some(timeout) = opt.timeout {
        runner = runner.with_timeout(timeout);
    }
    let evaluator = Evaluator::new(Dispatcher::new(Arc::new(registry), runner));

    let (generator, candidate_a, candidate_b) = bundle.requests();
    let outcome = evaluator.evaluate(generator, candidate_a, candidate_b);
    if opt.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&outcome).context("Failed to serialize the outcome")?
        );
    } else {
        print_outcome(&bundle, &outcome);
    }
    Ok(())
}

/// Load the programs from the source selected in the options.
fn load_bundle(opt: &Opt) -> Result<Bundle, Error> {
    match &opt.local {
        Some(dir) => Bundle::from_dir(dir),
        None => {
            let files = GistClient::new()?.fetch(&opt.gist_id)?;
            Bundle::from_files(&opt.gist_id, files)
        }
    }
}

fn print_bundle(bundle: &Bundle) -> Result<(), Error> {
    println!(
        "{}",
        serde_json::to_string_pretty(bundle).context("Failed to serialize the programs")?
    );
    Ok(())
}

/// Print a human readable summary of the evaluation.
fn print_outcome(bundle: &Bundle, outcome: &EvaluationOutcome) {
    println!(
        "{}: {} on the input of {}",
        bundle.source, bundle.candidate_a.file.name, bundle.generator.file.name
    );
    println!("    vs {}", bundle.candidate_b.file.name);
    println!("Verdict: {}", outcome.verdict);
    print_report(&bundle.generator.file.name, &outcome.generator);
    for (candidate, program) in [
        (Candidate::A, &bundle.candidate_a),
        (Candidate::B, &bundle.candidate_b),
    ] {
        print_report(&program.file.name, outcome.candidate(candidate));
    }
    if outcome.verdict == Verdict::Incorrect {
        println!("\nInput:\n{}", outcome.input);
        println!("\n{}:\n{}", bundle.candidate_a.file.name, outcome.candidate_a.result.stdout);
        println!("\n{}:\n{}", bundle.candidate_b.file.name, outcome.candidate_b.result.stdout);
    }
}

/// Print what went wrong with a run, if anything.
fn print_report(name: &str, report: &RunReport) {
    if let Some(error) = &report.dispatch_error {
        println!("  {name}: not run: {error}");
    }
    if report.result.has_error() {
        println!("  {name}: {}", report.result.error);
    }
    if !report.result.stderr.is_empty() {
        println!("  {name} stderr: {}", report.result.stderr.trim_end());
    }
}
