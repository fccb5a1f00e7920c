//! The programs of an evaluation: a generator and two candidate solutions.

use std::path::Path;

use anyhow::{bail, Context, Error};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use eval_gist_exec::proto::{ExecutionRequest, SourceFile};
use eval_gist_lang::detect_language;

/// The stems of the file names that identify the generator.
const GENERATOR_STEMS: &[&str] = &["gen", "generator"];

/// A program to run: a source file and its language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// The identifier of the language of the program.
    pub language: String,
    /// The source file of the program.
    pub file: SourceFile,
}

impl Program {
    /// Make a program from a source file, detecting its language from the extension. Returns
    /// `None` if the language is unknown.
    pub fn detect(file: SourceFile) -> Option<Program> {
        let language = detect_language(&file.name)?;
        Some(Program {
            language: language.into(),
            file,
        })
    }

    /// Whether this program is a generator, based on its file name.
    fn is_generator(&self) -> bool {
        let stem = Path::new(&self.file.name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        GENERATOR_STEMS.contains(&stem.as_str())
    }

    /// The request for running this program, without standard input.
    fn request(&self) -> ExecutionRequest {
        ExecutionRequest {
            language: self.language.clone(),
            files: vec![self.file.clone()],
        }
    }
}

/// A generator and the two candidates to compare on its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bundle {
    /// Where the programs come from (a gist identifier or a directory).
    pub source: String,
    /// The program that generates the input.
    pub generator: Program,
    /// The first candidate.
    pub candidate_a: Program,
    /// The second candidate.
    pub candidate_b: Program,
}

impl Bundle {
    /// Find the generator and the two candidates among `files`.
    ///
    /// The standard input sentinel and the files in an unknown language are ignored. The generator
    /// is the only program named `gen` or `generator` (any extension), the other two programs are
    /// the candidates, sorted by file name.
    pub fn from_files<S, I>(source: S, files: I) -> Result<Bundle, Error>
    where
        S: Into<String>,
        I: IntoIterator<Item = SourceFile>,
    {
        let source = source.into();
        let (generators, candidates): (Vec<_>, Vec<_>) = files
            .into_iter()
            .filter(|f| !f.is_stdin())
            .filter_map(|f| {
                let name = f.name.clone();
                let program = Program::detect(f);
                if program.is_none() {
                    debug!("Ignoring {}: unknown language", name);
                }
                program
            })
            .partition(Program::is_generator);

        if generators.len() > 1 {
            bail!(
                "Too many generators in {}: {}",
                source,
                generators.iter().map(|p| &p.file.name).join(", ")
            );
        }
        let generator = generators.into_iter().next().with_context(|| {
            format!("No generator found in {source}: expecting a file named gen.*")
        })?;
        let num_candidates = candidates.len();
        let (candidate_a, candidate_b) = candidates
            .into_iter()
            .sorted_by(|a, b| a.file.name.cmp(&b.file.name))
            .collect_tuple()
            .with_context(|| {
                format!("Expecting 2 candidates in {source}, found {num_candidates}")
            })?;
        Ok(Bundle {
            source,
            generator,
            candidate_a,
            candidate_b,
        })
    }

    /// Read the bundle from the files of a local directory.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Bundle, Error> {
        let dir = dir.as_ref();
        let mut files = vec![];
        for entry in std::fs::read_dir(dir)
            .with_context(|| format!("Failed to list directory {}", dir.display()))?
        {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let name = match path.file_name() {
                Some(name) => name.to_string_lossy().to_string(),
                None => continue,
            };
            if detect_language(&name).is_none() {
                continue;
            }
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            files.push(SourceFile::new(name, content));
        }
        Bundle::from_files(dir.display().to_string(), files)
    }

    /// The requests for running the generator and the two candidates. The candidates have an
    /// empty standard input, it's replaced with the output of the generator by the evaluator.
    pub fn requests(&self) -> (ExecutionRequest, ExecutionRequest, ExecutionRequest) {
        let candidate = |program: &Program| {
            let mut request = program.request();
            request.attach_stdin(SourceFile::stdin(""));
            request
        };
        (
            self.generator.request(),
            candidate(&self.candidate_a),
            candidate(&self.candidate_b),
        )
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use speculoos::prelude::*;
    use tempfile::TempDir;

    use super::*;

    fn file(name: &str) -> SourceFile {
        SourceFile::new(name, format!("// {name}"))
    }

    #[test]
    fn test_from_files() {
        let bundle = Bundle::from_files(
            "test",
            vec![
                file("sol2.py"),
                file("README.md"),
                file("gen.cpp"),
                file("sol1.cpp"),
            ],
        )
        .unwrap();
        assert_eq!(bundle.generator.file.name, "gen.cpp");
        assert_eq!(bundle.generator.language, "cpp");
        assert_eq!(bundle.candidate_a.file.name, "sol1.cpp");
        assert_eq!(bundle.candidate_b.file.name, "sol2.py");
        assert_eq!(bundle.candidate_b.language, "python");
    }

    #[test]
    fn test_from_files_generator_name() {
        let bundle =
            Bundle::from_files("test", vec![file("a.go"), file("Generator.py"), file("b.js")])
                .unwrap();
        assert_eq!(bundle.generator.file.name, "Generator.py");
    }

    #[test]
    fn test_from_files_ignores_stdin() {
        let files = vec![
            file("gen.py"),
            file("a.py"),
            file("b.py"),
            SourceFile::stdin("1 2 3"),
        ];
        assert_that(&Bundle::from_files("test", files)).is_ok();
    }

    #[test]
    fn test_from_files_no_generator() {
        let err = Bundle::from_files("test", vec![file("a.py"), file("b.py")]).unwrap_err();
        assert_that(&err.to_string()).contains("No generator found");
    }

    #[test]
    fn test_from_files_two_generators() {
        let files = vec![file("gen.py"), file("gen.cpp"), file("a.py"), file("b.py")];
        let err = Bundle::from_files("test", files).unwrap_err();
        assert_that(&err.to_string()).contains("Too many generators");
    }

    #[test]
    fn test_from_files_wrong_candidates() {
        let files = vec![file("gen.py"), file("a.py"), file("b.py"), file("c.py")];
        let err = Bundle::from_files("test", files).unwrap_err();
        assert_that(&err.to_string()).contains("found 3");
        let err = Bundle::from_files("test", vec![file("gen.py"), file("a.py")]).unwrap_err();
        assert_that(&err.to_string()).contains("found 1");
    }

    #[test]
    fn test_requests() {
        let bundle =
            Bundle::from_files("test", vec![file("gen.py"), file("a.py"), file("b.cpp")]).unwrap();
        let (generator, a, b) = bundle.requests();
        assert_eq!(generator.files.len(), 1);
        assert_eq!(generator.stdin(), None);
        assert_eq!(a.files.len(), 2);
        assert_eq!(a.files[0].name, "a.py");
        assert_eq!(a.stdin(), Some(""));
        assert_eq!(b.language, "cpp");
        assert_eq!(b.stdin(), Some(""));
    }

    #[test]
    fn test_from_dir() {
        let tmpdir = TempDir::new().unwrap();
        std::fs::write(tmpdir.path().join("gen.py"), "print(3)").unwrap();
        std::fs::write(tmpdir.path().join("a.py"), "print(input())").unwrap();
        std::fs::write(tmpdir.path().join("b.py"), "print(input())").unwrap();
        std::fs::write(tmpdir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir(tmpdir.path().join("sub.py")).unwrap();
        let bundle = Bundle::from_dir(tmpdir.path()).unwrap();
        assert_eq!(bundle.generator.file.content, "print(3)");
        assert_eq!(bundle.candidate_a.file.name, "a.py");
        assert_eq!(bundle.candidate_b.file.name, "b.py");
    }

    #[test]
    fn test_from_dir_missing() {
        let tmpdir = TempDir::new().unwrap();
        let err = Bundle::from_dir(tmpdir.path().join("nope")).unwrap_err();
        assert_that(&err.to_string()).contains("Failed to list directory");
    }
}
