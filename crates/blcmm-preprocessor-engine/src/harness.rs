//! Fixture harness running the transcoder over `<category>/<name>.in` files.
//!
//! Each input sits next to an expected output with the same stem. Outputs are
//! compared as [`canonicalize`]d element trees, so formatting, quote style and
//! entity spelling in the expected files don't matter.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::canonical::canonicalize;
use crate::io::{IoError, transcode_file_to_string};

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("Invalid cases directory: {0}")]
    InvalidCasesDir(PathBuf),
    #[error("Invalid case pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("Failed to read case file: {0}")]
    Glob(#[from] glob::GlobError),
    #[error("Failed to read expected output {path}: {source}")]
    ReadExpected {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A pair of input and expected output files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// `category/stem`, used when reporting.
    pub name: String,
    pub category: String,
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseResult {
    Pass,
    Fail,
    /// The transcoder returned an error.
    Crash,
}

impl fmt::Display for CaseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CaseResult::Pass => "PASS",
            CaseResult::Fail => "FAIL",
            CaseResult::Crash => "CRASH",
        })
    }
}

/// Find every `dir/<category>/<stem>.<input_suffix>` that has a sibling
/// `<stem>.<output_suffix>`, sorted by path.
pub fn find_test_cases(
    dir: &Path,
    input_suffix: &str,
    output_suffix: &str,
) -> Result<Vec<TestCase>, HarnessError> {
    if !dir.is_dir() {
        return Err(HarnessError::InvalidCasesDir(dir.to_path_buf()));
    }

    let pattern = dir
        .join("*")
        .join(format!("*.{input_suffix}"))
        .to_string_lossy()
        .into_owned();
    let mut inputs = glob::glob(&pattern)?.collect::<Result<Vec<_>, _>>()?;
    inputs.sort();

    let mut cases = Vec::new();
    for input in inputs {
        let output = input.with_extension(output_suffix);
        if !output.exists() {
            log::warn!(
                "Skipping '{}' because it does not have a corresponding output file",
                input.display()
            );
            continue;
        }

        let category = input
            .parent()
            .and_then(Path::file_name)
            .map(|c| c.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        cases.push(TestCase {
            name: format!("{category}/{stem}"),
            category,
            input,
            output,
        });
    }

    Ok(cases)
}

/// Run a single case. Returns `None` when the expected output is not valid
/// XML, in which case the case is skipped.
pub fn run_case(case: &TestCase) -> Result<Option<CaseResult>, HarnessError> {
    let expected =
        fs::read_to_string(&case.output).map_err(|source| HarnessError::ReadExpected {
            path: case.output.clone(),
            source,
        })?;
    let expected = match canonicalize(&expected) {
        Ok(tree) => tree,
        Err(e) => {
            log::warn!(
                "Skipping '{}' because parsing its output file failed: {e}",
                case.name
            );
            return Ok(None);
        }
    };

    let actual = match transcode_file_to_string(&case.input) {
        Ok(actual) => actual,
        Err(IoError::Transcode { source, .. }) => {
            log::info!("{}: {source}", case.name);
            return Ok(Some(CaseResult::Crash));
        }
        Err(e) => {
            log::warn!("{}: {e}", case.name);
            return Ok(Some(CaseResult::Crash));
        }
    };

    let result = match canonicalize(&actual) {
        Ok(tree) if tree == expected => CaseResult::Pass,
        Ok(_) => CaseResult::Fail,
        Err(e) => {
            log::info!("{}: output is not well-formed XML: {e}", case.name);
            CaseResult::Fail
        }
    };
    Ok(Some(result))
}

/// Pass/total counts for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryCount {
    pub passed: usize,
    pub total: usize,
}

impl CategoryCount {
    fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.passed as f64 * 100.0 / self.total as f64
        }
    }
}

impl fmt::Display for CategoryCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} ({:>2.0}%)", self.passed, self.total, self.percent())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HarnessReport {
    /// Every case that ran, in order.
    pub results: Vec<(String, CaseResult)>,
    pub categories: BTreeMap<String, CategoryCount>,
}

impl HarnessReport {
    pub fn overall(&self) -> CategoryCount {
        self.categories
            .values()
            .fold(CategoryCount::default(), |acc, c| CategoryCount {
                passed: acc.passed + c.passed,
                total: acc.total + c.total,
            })
    }

    pub fn all_passed(&self) -> bool {
        let overall = self.overall();
        overall.passed == overall.total
    }

    fn record(&mut self, case: &TestCase, result: CaseResult) {
        let count = self.categories.entry(case.category.clone()).or_default();
        count.total += 1;
        if result == CaseResult::Pass {
            count.passed += 1;
        }
        self.results.push((case.name.clone(), result));
    }
}

impl fmt::Display for HarnessReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Overall: {}", self.overall())?;
        writeln!(f, "================================")?;
        for (category, count) in &self.categories {
            writeln!(f, "{category}: {count}")?;
        }
        Ok(())
    }
}

/// Run `cases`, keeping only those in `categories` when it is non-empty.
/// Skipped cases are not counted.
pub fn run_cases(
    cases: &[TestCase],
    categories: &[String],
) -> Result<HarnessReport, HarnessError> {
    let mut report = HarnessReport::default();
    for case in cases {
        if !categories.is_empty() && !categories.contains(&case.category) {
            continue;
        }
        let Some(result) = run_case(case)? else {
            continue;
        };
        log::debug!("{}: {result}", case.name);
        report.record(case, result);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_case(dir: &TempDir, category: &str, stem: &str, input: &str, output: Option<&str>) {
        let category_dir = dir.path().join(category);
        fs::create_dir_all(&category_dir).unwrap();
        fs::write(category_dir.join(format!("{stem}.in")), input).unwrap();
        if let Some(output) = output {
            fs::write(category_dir.join(format!("{stem}.out")), output).unwrap();
        }
    }

    /// Wrap records in a BLCMM document.
    fn blcmm(records: &str) -> String {
        format!("<BLCMM v=\"1\">\n{records}\n</BLCMM>\n")
    }

    #[test]
    fn test_find_test_cases_sorted_and_paired() {
        let dir = TempDir::new().unwrap();
        write_case(&dir, "text", "b", "</BLCMM>\n", Some("</BLCMM>"));
        write_case(&dir, "attrs", "a", "</BLCMM>\n", Some("</BLCMM>"));
        write_case(&dir, "text", "orphan", "</BLCMM>\n", None);

        let cases = find_test_cases(dir.path(), "in", "out").unwrap();

        let names: Vec<_> = cases.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["attrs/a", "text/b"]);
        assert_eq!(cases[0].category, "attrs");
        assert!(cases[1].output.ends_with("text/b.out"));
    }

    #[test]
    fn test_find_test_cases_invalid_dir() {
        let result = find_test_cases(Path::new("/this/path/does/not/exist"), "in", "out");
        assert!(matches!(result, Err(HarnessError::InvalidCasesDir(_))));
    }

    #[test]
    fn test_run_case_ignores_quote_style_and_entity_spelling() {
        let dir = TempDir::new().unwrap();
        write_case(
            &dir,
            "attrs",
            "apos",
            &blcmm(r#"<a b="it's">x</a>"#),
            Some(r#"<BLCMM v='1'><a b='it&#39;s'>x</a></BLCMM>"#),
        );
        write_case(
            &dir,
            "attrs",
            "empty",
            &blcmm("<a></a>"),
            Some("<BLCMM v=\"1\">\n    <a/>\n</BLCMM>"),
        );

        let cases = find_test_cases(dir.path(), "in", "out").unwrap();

        assert_eq!(cases.len(), 2);
        for case in &cases {
            assert_eq!(run_case(case).unwrap(), Some(CaseResult::Pass), "{}", case.name);
        }
    }

    #[test]
    fn test_run_case_skips_unparseable_expected_output() {
        let dir = TempDir::new().unwrap();
        let input = blcmm("<a>x</a>");
        write_case(&dir, "text", "bad", &input, Some("<BLCMM v=\"1\"><a>x</BLCMM>"));
        write_case(&dir, "text", "good", &input, Some("<BLCMM v=\"1\"><a>x</a></BLCMM>"));

        let cases = find_test_cases(dir.path(), "in", "out").unwrap();
        assert_eq!(run_case(&cases[0]).unwrap(), None);

        let report = run_cases(&cases, &[]).unwrap();
        assert_eq!(report.results, vec![("text/good".to_string(), CaseResult::Pass)]);
        assert_eq!(report.overall(), CategoryCount { passed: 1, total: 1 });
    }

    #[test]
    fn test_run_case_fails_on_malformed_output() {
        let dir = TempDir::new().unwrap();
        // No `<BLCMM>` opening line, so the terminator is a stray closing tag.
        write_case(&dir, "text", "stray", "<a>x</a>\n</BLCMM>\n", Some("<a>x</a>"));

        let cases = find_test_cases(dir.path(), "in", "out").unwrap();

        assert_eq!(run_case(&cases[0]).unwrap(), Some(CaseResult::Fail));
    }

    #[test]
    fn test_run_cases_counts_per_category() {
        let dir = TempDir::new().unwrap();
        write_case(
            &dir,
            "text",
            "amp",
            &blcmm("<a>&</a>"),
            Some("<BLCMM v=\"1\">\n  <a>&amp;</a>\n</BLCMM>\n"),
        );
        write_case(
            &dir,
            "text",
            "wrong",
            &blcmm("<a>&</a>"),
            Some("<BLCMM v=\"1\"><a>&amp;&amp;</a></BLCMM>"),
        );
        write_case(&dir, "broken", "no_tag", &blcmm("oops"), Some("<BLCMM v=\"1\"/>"));

        let cases = find_test_cases(dir.path(), "in", "out").unwrap();
        let report = run_cases(&cases, &[]).unwrap();

        assert_eq!(
            report.results,
            vec![
                ("broken/no_tag".to_string(), CaseResult::Crash),
                ("text/amp".to_string(), CaseResult::Pass),
                ("text/wrong".to_string(), CaseResult::Fail),
            ]
        );
        assert_eq!(report.overall(), CategoryCount { passed: 1, total: 3 });
        assert!(!report.all_passed());
        assert_eq!(
            report.to_string(),
            "Overall: 1/3 (33%)\n\
             ================================\n\
             broken: 0/1 ( 0%)\n\
             text: 1/2 (50%)\n"
        );
    }

    #[test]
    fn test_run_cases_filters_categories() {
        let dir = TempDir::new().unwrap();
        write_case(&dir, "keep", "a", &blcmm("<a/>"), Some("<BLCMM v=\"1\"><a/></BLCMM>"));
        write_case(&dir, "skip", "b", "oops\n", Some(""));

        let cases = find_test_cases(dir.path(), "in", "out").unwrap();
        let report = run_cases(&cases, &["keep".to_string()]).unwrap();

        assert_eq!(report.results.len(), 1);
        assert!(report.all_passed());
        assert!(!report.categories.contains_key("skip"));
    }
}
