//! Heuristic change classification.
//!
//! A path and its diff text are mapped to a [`ChangeType`] by an ordered
//! chain of checks: test files, documentation, known configuration files,
//! scripts, the path pattern table, the diff pattern table, and finally
//! source-code extensions. Anything left over is a chore.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Conventional commit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Feat,
    Fix,
    Docs,
    Style,
    Refactor,
    Perf,
    Test,
    Build,
    Ci,
    Chore,
    Revert,
    Security,
}

impl ChangeType {
    pub const ALL: [ChangeType; 12] = [
        ChangeType::Feat,
        ChangeType::Fix,
        ChangeType::Docs,
        ChangeType::Style,
        ChangeType::Refactor,
        ChangeType::Perf,
        ChangeType::Test,
        ChangeType::Build,
        ChangeType::Ci,
        ChangeType::Chore,
        ChangeType::Revert,
        ChangeType::Security,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::Feat => "feat",
            ChangeType::Fix => "fix",
            ChangeType::Docs => "docs",
            ChangeType::Style => "style",
            ChangeType::Refactor => "refactor",
            ChangeType::Perf => "perf",
            ChangeType::Test => "test",
            ChangeType::Build => "build",
            ChangeType::Ci => "ci",
            ChangeType::Chore => "chore",
            ChangeType::Revert => "revert",
            ChangeType::Security => "security",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ChangeType::ALL
            .into_iter()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| format!("unknown commit type: {}", s))
    }
}

const DOC_EXTENSIONS: &[&str] = &["md", "rst", "txt", "adoc"];

const CONFIG_FILES: &[&str] = &[
    "setup.py",
    "setup.cfg",
    "requirements.txt",
    "requirements-dev.txt",
    "pipfile",
    "pipfile.lock",
    "poetry.lock",
    "tox.ini",
    "manifest.in",
    "cmakelists.txt",
    ".gitignore",
    ".gitattributes",
    ".dockerignore",
    ".editorconfig",
    ".pre-commit-config.yaml",
    "cargo.lock",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
];

const SCRIPT_EXTENSIONS: &[&str] = &["sh", "bash", "zsh", "ps1", "bat", "cmd"];

const SOURCE_EXTENSIONS: &[&str] = &[
    "py", "rs", "js", "jsx", "ts", "tsx", "go", "java", "kt", "kts", "c", "h", "cc", "cpp",
    "hpp", "cs", "rb", "php", "swift", "scala", "dart", "lua", "ex", "exs", "vue", "svelte",
];

const TEST_DIRS: &[&str] = &["test", "tests", "spec", "specs", "__tests__"];

static PATH_PATTERNS: LazyLock<Vec<(ChangeType, Regex)>> = LazyLock::new(|| {
    compile_table(&[
        (
            ChangeType::Test,
            r"(^|/)(tests?|specs?|__tests__)/|(^|/)test_[^/]*$|_test\.[^/]+$|\.(test|spec)\.[^/]+$",
        ),
        (
            ChangeType::Docs,
            r"\.(md|rst|adoc)$|(^|/)docs?/|(^|/)(readme|changelog|contributing|license)([.][^/]*)?$",
        ),
        (
            ChangeType::Style,
            r"\.(css|scss|sass|less|styl)$|(^|/)(styles?|themes?)/",
        ),
        (
            ChangeType::Ci,
            r"(^|/)\.github/|(^|/)\.gitlab-ci\.ya?ml$|(^|/)\.circleci/|(^|/)\.travis\.ya?ml$|(^|/)jenkinsfile$|azure-pipelines",
        ),
        (
            ChangeType::Build,
            r"(^|/)(setup\.py|setup\.cfg|pyproject\.toml|cargo\.toml|package\.json|makefile|dockerfile|build\.gradle|pom\.xml|cmakelists\.txt|build\.rs)$",
        ),
        (
            ChangeType::Perf,
            r"(^|/)(benchmarks?|benches|perf|profiling)/",
        ),
        (
            ChangeType::Chore,
            r"(^|/)\.env|\.(ini|cfg|conf|lock)$|(^|/)config/|(^|/)\.(editorconfig|gitattributes|gitignore)$",
        ),
        (ChangeType::Feat, r"(^|/)(features?|feat)/"),
        (
            ChangeType::Fix,
            r"(^|/)(hotfix(es)?|fix(es)?|bugfix(es)?|patch(es)?)/",
        ),
        (ChangeType::Refactor, r"(^|/)refactor(ing)?/"),
    ])
});

static DIFF_PATTERNS: LazyLock<Vec<(ChangeType, Regex)>> = LazyLock::new(|| {
    compile_table(&[
        (
            ChangeType::Test,
            r"\bdef test_|\bassert\b|#\[test\]|#\[cfg\(test\)\]|\bdescribe\(|\bunittest\b|\bpytest\b",
        ),
        (
            ChangeType::Docs,
            r"\breadme\b|\bdocumentation\b|\bdocstrings?\b|\bdocs?\b",
        ),
        (
            ChangeType::Security,
            r"\bsecurity\b|\bvulnerab|\bxss\b|\bcsrf\b|sql injection|\bcve-\d|\bexploit",
        ),
        (
            ChangeType::Fix,
            r"\b(hot)?fix(e[sd])?\b|\bbugs?\b|\bcrash(es|ed|ing)?\b",
        ),
        (
            ChangeType::Refactor,
            r"\brefactor|\brestructur|\bclean ?up\b|\bsimplif(y|ied|ies)\b",
        ),
        (
            ChangeType::Perf,
            r"\boptimi[sz]|\bperformance\b|\bfaster\b|\blatency\b|\bspeed ?up\b",
        ),
        (
            ChangeType::Style,
            r"\bformatt(ed|ing)\b|\bprettier\b|\brustfmt\b|\beslint\b|\blint(er|ing)?\b|\bwhitespace\b|\bindentation\b",
        ),
        (
            ChangeType::Feat,
            r"\bimplement(ed|s)?\b|\badd(ed|s)? (a |an )?new\b|\bintroduc(e|ed|es)\b|\bnew feature\b",
        ),
        (
            ChangeType::Chore,
            r"\bdependenc(y|ies)\b|\bbump(ed)?\b|\bupgrad(e|ed)\b|\bversion\b|\bmaintenance\b",
        ),
    ])
});

fn compile_table(table: &[(ChangeType, &str)]) -> Vec<(ChangeType, Regex)> {
    table
        .iter()
        .map(|(t, pattern)| {
            let re = Regex::new(&format!("(?i){}", pattern)).expect("valid classification regex");
            (*t, re)
        })
        .collect()
}

/// Ordered path pattern table.
pub fn path_patterns() -> &'static [(ChangeType, Regex)] {
    &PATH_PATTERNS
}

/// Ordered diff pattern table.
pub fn diff_patterns() -> &'static [(ChangeType, Regex)] {
    &DIFF_PATTERNS
}

pub fn path_pattern(change_type: ChangeType) -> Option<&'static Regex> {
    lookup(path_patterns(), change_type)
}

pub fn diff_pattern(change_type: ChangeType) -> Option<&'static Regex> {
    lookup(diff_patterns(), change_type)
}

fn lookup(table: &'static [(ChangeType, Regex)], change_type: ChangeType) -> Option<&'static Regex> {
    table.iter().find(|(t, _)| *t == change_type).map(|(_, re)| re)
}

fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn extension(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn is_test_file(path: &str) -> bool {
    let path = normalize(path);
    let mut components: Vec<&str> = path.split('/').filter(|c| !c.is_empty()).collect();
    let Some(name) = components.pop() else {
        return false;
    };

    if components
        .iter()
        .any(|c| TEST_DIRS.contains(&c.to_ascii_lowercase().as_str()))
    {
        return true;
    }

    let name = name.to_ascii_lowercase();
    let stem = name.rsplit_once('.').map_or(name.as_str(), |(s, _)| s);
    name.starts_with("test_")
        || stem.ends_with("_test")
        || name.contains(".test.")
        || name.contains(".spec.")
}

fn is_config_file(name: &str) -> bool {
    CONFIG_FILES.contains(&name.to_ascii_lowercase().as_str())
}

pub fn check_test_file(path: &str) -> Option<ChangeType> {
    is_test_file(path).then_some(ChangeType::Test)
}

pub fn check_documentation_file(path: &str) -> Option<ChangeType> {
    let path = normalize(path);
    let name = file_name(&path);
    if is_config_file(name) {
        return None;
    }
    extension(name)
        .filter(|ext| DOC_EXTENSIONS.contains(&ext.as_str()))
        .map(|_| ChangeType::Docs)
}

pub fn check_configuration_file(path: &str) -> Option<ChangeType> {
    let path = normalize(path);
    is_config_file(file_name(&path)).then_some(ChangeType::Chore)
}

pub fn check_script_file(path: &str) -> Option<ChangeType> {
    let path = normalize(path);
    let in_scripts = path
        .split('/')
        .rev()
        .skip(1)
        .any(|c| c.eq_ignore_ascii_case("scripts"));
    let is_script = extension(file_name(&path))
        .is_some_and(|ext| SCRIPT_EXTENSIONS.contains(&ext.as_str()));
    (in_scripts && is_script).then_some(ChangeType::Chore)
}

fn check_source_file(path: &str) -> Option<ChangeType> {
    let path = normalize(path);
    extension(file_name(&path))
        .filter(|ext| SOURCE_EXTENSIONS.contains(&ext.as_str()))
        .map(|_| ChangeType::Feat)
}

fn match_table(table: &[(ChangeType, Regex)], text: &str) -> Option<ChangeType> {
    table
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(t, _)| *t)
}

/// Classify a change from its path and diff text.
pub fn classify_change(path: &str, diff: &str) -> ChangeType {
    let normalized = normalize(path);

    check_test_file(&normalized)
        .or_else(|| check_documentation_file(&normalized))
        .or_else(|| check_configuration_file(&normalized))
        .or_else(|| check_script_file(&normalized))
        .or_else(|| match_table(path_patterns(), &normalized))
        .or_else(|| match_table(diff_patterns(), diff))
        .or_else(|| check_source_file(&normalized))
        .unwrap_or(ChangeType::Chore)
}
