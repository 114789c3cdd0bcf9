use crate::config::ScaffoldConfig;
use crate::roster::ProblemRef;
use crate::sample::{Sample, SampleKind};
use crate::Result;
use askama::Template;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use strum::Display;
use tracing::{debug, warn};

/// Lays out `<output-dir>/<contest>-<language>/<letter>/` directories
#[derive(Debug, Clone)]
pub struct Scaffolder {
    output_dir: PathBuf,
    language: String,
    template: PathBuf,
}

/// What happened to a problem's solution file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SolutionFile {
    #[strum(serialize = "copied from template")]
    Copied,
    #[strum(serialize = "rendered from built-in skeleton")]
    Rendered,
    #[strum(serialize = "kept existing")]
    Kept,
}

#[derive(Debug, Clone)]
pub struct ProblemReport {
    pub letter: String,
    pub title: String,
    pub dir: PathBuf,
    /// Number of input samples written
    pub tests: usize,
    pub solution: SolutionFile,
}

#[derive(Debug, Template)]
#[template(path = "solution.cc.j2", escape = "none")]
struct SolutionSkeleton<'a> {
    contest: &'a str,
    letter: &'a str,
    title: &'a str,
}

impl Scaffolder {
    pub fn new(
        output_dir: impl Into<PathBuf>,
        language: impl Into<String>,
        template: impl Into<PathBuf>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            language: language.into(),
            template: template.into(),
        }
    }

    pub fn from_config(config: &ScaffoldConfig) -> Self {
        Self::new(&config.output_dir, &config.language, &config.template)
    }

    pub fn contest_dir(&self, contest: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}-{}", contest, self.language))
    }

    /// Creates the problem directory, installs the solution file and writes samples.
    pub fn scaffold_problem(
        &self,
        contest: &str,
        problem: &ProblemRef,
        samples: &[Sample],
    ) -> Result<ProblemReport> {
        let dir = self.contest_dir(contest).join(&problem.letter);
        fs::create_dir_all(&dir)?;

        let solution = self.install_solution(contest, problem, &dir)?;

        for sample in samples {
            fs::write(dir.join(sample_file_name(sample)), &sample.bytes)?;
        }

        let tests = samples
            .iter()
            .filter(|s| s.kind == SampleKind::Input)
            .count();
        if tests == 0 {
            warn!(letter = %problem.letter, "no sample tests found");
        }
        debug!(dir = %dir.display(), tests, %solution, "scaffolded problem");

        Ok(ProblemReport {
            letter: problem.letter.clone(),
            title: problem.title.clone(),
            dir,
            tests,
            solution,
        })
    }

    fn install_solution(
        &self,
        contest: &str,
        problem: &ProblemRef,
        dir: &Path,
    ) -> Result<SolutionFile> {
        let ext = self
            .template
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("cc");
        let target = dir.join(format!("{}.{}", problem.letter, ext));
        if target.exists() {
            return Ok(SolutionFile::Kept);
        }

        match fs::copy(&self.template, &target) {
            Ok(_) => Ok(SolutionFile::Copied),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let skeleton = SolutionSkeleton {
                    contest,
                    letter: &problem.letter,
                    title: &problem.title,
                };
                fs::write(&target, skeleton.render()?)?;
                Ok(SolutionFile::Rendered)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// `input<N>` or `output<N>`
pub fn sample_file_name(sample: &Sample) -> String {
    format!("{}{}", sample.kind, sample.index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn problem(letter: &str) -> ProblemRef {
        ProblemRef {
            letter: letter.to_string(),
            title: format!("{} - Test", letter),
        }
    }

    fn sample(kind: SampleKind, index: usize, body: &str) -> Sample {
        Sample {
            kind,
            index,
            bytes: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn contest_dir_should_include_language() {
        let scaffolder = Scaffolder::new("/tmp/out", "C++17", "template.cc");
        assert_eq!(
            scaffolder.contest_dir("1850"),
            PathBuf::from("/tmp/out/1850-C++17")
        );
    }

    #[test]
    fn sample_file_name_should_use_kind_and_index() {
        assert_eq!(sample_file_name(&sample(SampleKind::Input, 3, "")), "input3");
        assert_eq!(sample_file_name(&sample(SampleKind::Output, 1, "")), "output1");
    }

    #[test]
    fn scaffold_problem_should_write_samples_and_copy_template() {
        let tmp = TempDir::new().unwrap();
        let template = tmp.path().join("template.cc");
        fs::write(&template, "// my template\n").unwrap();

        let scaffolder = Scaffolder::new(tmp.path(), "C++17", &template);
        let samples = vec![
            sample(SampleKind::Input, 1, "1 2\n"),
            sample(SampleKind::Output, 1, "3\n"),
            sample(SampleKind::Input, 2, "5 5\n"),
            sample(SampleKind::Output, 2, "10\n"),
        ];
        let report = scaffolder
            .scaffold_problem("1850", &problem("A"), &samples)
            .unwrap();

        let dir = tmp.path().join("1850-C++17").join("A");
        assert_eq!(report.dir, dir);
        assert_eq!(report.tests, 2);
        assert_eq!(report.solution, SolutionFile::Copied);
        assert_eq!(fs::read_to_string(dir.join("A.cc")).unwrap(), "// my template\n");
        assert_eq!(fs::read_to_string(dir.join("input2")).unwrap(), "5 5\n");
        assert_eq!(fs::read_to_string(dir.join("output1")).unwrap(), "3\n");
    }

    #[test]
    fn existing_solution_should_be_kept() {
        let tmp = TempDir::new().unwrap();
        let template = tmp.path().join("template.cc");
        fs::write(&template, "// template\n").unwrap();

        let scaffolder = Scaffolder::new(tmp.path(), "C++17", &template);
        let dir = scaffolder.contest_dir("1850").join("B1");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("B1.cc"), "// work in progress\n").unwrap();

        let report = scaffolder
            .scaffold_problem("1850", &problem("B1"), &[])
            .unwrap();

        assert_eq!(report.solution, SolutionFile::Kept);
        assert_eq!(report.tests, 0);
        assert_eq!(
            fs::read_to_string(dir.join("B1.cc")).unwrap(),
            "// work in progress\n"
        );
    }

    #[test]
    fn missing_template_should_render_skeleton() {
        let tmp = TempDir::new().unwrap();
        let scaffolder = Scaffolder::new(tmp.path(), "C++17", tmp.path().join("absent.cpp"));

        let report = scaffolder
            .scaffold_problem("1850", &problem("C"), &[])
            .unwrap();

        assert_eq!(report.solution, SolutionFile::Rendered);
        let content = fs::read_to_string(report.dir.join("C.cpp")).unwrap();
        assert!(content.starts_with("// Contest 1850, problem C: C - Test\n"));
        assert!(content.contains("int main()"));
    }
}
