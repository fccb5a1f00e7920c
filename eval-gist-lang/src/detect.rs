use std::path::Path;

/// Known extensions and the identifier of their language.
const EXTENSIONS: &[(&str, &str)] = &[
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("c", "c"),
    ("go", "go"),
    ("js", "javascript"),
    ("py", "python"),
    ("java", "java"),
    ("rs", "rust"),
    ("rb", "ruby"),
    ("sh", "bash"),
    ("hs", "haskell"),
    ("cs", "csharp"),
    ("fs", "fsharp"),
    ("ml", "ocaml"),
    ("php", "php"),
    ("pl", "perl"),
    ("lua", "lua"),
    ("jl", "julia"),
    ("nim", "nim"),
    ("scala", "scala"),
    ("swift", "swift"),
    ("ex", "elixir"),
    ("erl", "erlang"),
    ("clj", "clojure"),
    ("coffee", "coffeescript"),
    ("d", "d"),
    ("idr", "idris"),
    ("asm", "assembly"),
];

/// Given a path to a file guess the identifier of the language of the source file, based on the
/// extension. The check is case insensitive.
///
/// ```
/// use eval_gist_lang::detect_language;
///
/// assert_eq!(detect_language("gen.cpp"), Some("cpp"));
/// assert_eq!(detect_language("sol.PY"), Some("python"));
/// assert_eq!(detect_language("notes.txt"), None);
/// ```
pub fn detect_language<P: AsRef<Path>>(path: P) -> Option<&'static str> {
    let ext = path
        .as_ref()
        .extension()
        .map(|s| s.to_string_lossy())
        .unwrap_or_else(|| "".into())
        .to_lowercase();
    EXTENSIONS
        .iter()
        .find(|(lang_ext, _)| *lang_ext == ext)
        .map(|(_, lang)| *lang)
}
