use anyhow::{Context, Result, bail};
use blcmm_preprocessor_config::Config;
use blcmm_preprocessor_engine::{harness, transcode};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::{env, process};

#[derive(Debug, PartialEq, Eq)]
enum Command {
    /// Transcode one BLCMM document. `None` means stdin/stdout.
    Transcode {
        input: Option<PathBuf>,
        output: Option<PathBuf>,
    },
    /// Run the fixture harness.
    Check {
        cases_dir: Option<PathBuf>,
        categories: Vec<String>,
    },
    /// Write a config file pointing `check` at a cases directory.
    Init { cases_dir: PathBuf },
    Help,
}

fn parse_args(args: &[String]) -> Result<Command> {
    let Some(first) = args.first() else {
        return Ok(Command::Transcode {
            input: None,
            output: None,
        });
    };

    match first.as_str() {
        "-h" | "--help" => Ok(Command::Help),
        "check" => parse_check_args(&args[1..]),
        "init" => match &args[1..] {
            [dir] => Ok(Command::Init {
                cases_dir: PathBuf::from(dir),
            }),
            _ => bail!("init takes exactly one CASES_DIR"),
        },
        _ => {
            if args.len() > 2 {
                bail!("Too many arguments");
            }
            let path_arg = |arg: Option<&String>| {
                arg.filter(|a| a.as_str() != "-").map(PathBuf::from)
            };
            Ok(Command::Transcode {
                input: path_arg(args.first()),
                output: path_arg(args.get(1)),
            })
        }
    }
}

fn parse_check_args(args: &[String]) -> Result<Command> {
    let mut cases_dir = None;
    let mut categories = Vec::new();
    let mut in_categories = false;

    for arg in args {
        match arg.as_str() {
            "-c" | "--categories" => in_categories = true,
            _ if in_categories => categories.push(arg.clone()),
            _ if cases_dir.is_none() => cases_dir = Some(PathBuf::from(arg)),
            _ => bail!("Unexpected argument: {arg}"),
        }
    }

    Ok(Command::Check {
        cases_dir,
        categories,
    })
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [INPUT|-] [OUTPUT|-]\n       \
         {program} check [CASES_DIR] [-c|--categories CATEGORY...]\n       \
         {program} init CASES_DIR"
    )
}

fn run_transcode(input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let reader: Box<dyn BufRead> = match &input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let source = input
        .as_ref()
        .map_or_else(|| "stdin".to_string(), |p| p.display().to_string());
    let summary = transcode(reader, writer).with_context(|| format!("Failed to transcode {source}"))?;

    log::info!(
        "Transcoded {source}: {} records, {} warnings skipped, {} lines read",
        summary.records_written,
        summary.warnings_skipped,
        summary.lines_read
    );
    Ok(())
}

fn run_init(cases_dir: PathBuf) -> Result<()> {
    let config_path = Config::config_path();
    if config_path.exists() {
        bail!("Config file already exists at {}", config_path.display());
    }

    let cases_dir = cases_dir
        .canonicalize()
        .with_context(|| format!("Invalid cases directory {}", cases_dir.display()))?;
    Config::new(cases_dir).save()?;

    println!("Wrote {}", config_path.display());
    Ok(())
}

/// Returns whether every case passed.
fn run_check(cases_dir: Option<PathBuf>, categories: Vec<String>) -> Result<bool> {
    let config_path = Config::config_path();
    let config = Config::load()?;

    let (cases_dir, input_suffix, output_suffix) = match (cases_dir, config) {
        (Some(dir), Some(config)) => (dir, config.input_suffix, config.output_suffix),
        (Some(dir), None) => (dir, "in".to_string(), "out".to_string()),
        (None, Some(config)) => {
            log::info!(
                "Using cases directory from config: {}",
                config.cases_dir.display()
            );
            (config.cases_dir, config.input_suffix, config.output_suffix)
        }
        (None, None) => bail!(
            "No cases directory provided and no config file found at {}",
            config_path.display()
        ),
    };

    let cases = harness::find_test_cases(&cases_dir, &input_suffix, &output_suffix)?;
    let report = harness::run_cases(&cases, &categories)?;

    let mut stdout = io::stdout().lock();
    for (name, result) in &report.results {
        writeln!(stdout, "{name}: {result}")?;
    }
    if report.results.is_empty() {
        writeln!(stdout, "No test cases found in {}", cases_dir.display())?;
    } else {
        write!(stdout, "\n{report}")?;
    }

    Ok(report.all_passed())
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let mut args = env::args();
    let program = args
        .next()
        .unwrap_or_else(|| "blcmm-preprocessor".to_string());
    let args: Vec<String> = args.collect();

    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("{}", usage(&program));
            process::exit(1);
        }
    };
    log::debug!("Running {command:?}");

    let outcome = match command {
        Command::Help => {
            println!("{}", usage(&program));
            Ok(true)
        }
        Command::Transcode { input, output } => run_transcode(input, output).map(|()| true),
        Command::Check {
            cases_dir,
            categories,
        } => run_check(cases_dir, categories),
        Command::Init { cases_dir } => run_init(cases_dir).map(|()| true),
    };

    match outcome {
        Ok(true) => Ok(()),
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[rstest]
    #[case(&[], None, None)]
    #[case(&["mod.blcm"], Some("mod.blcm"), None)]
    #[case(&["mod.blcm", "mod.xml"], Some("mod.blcm"), Some("mod.xml"))]
    #[case(&["-", "mod.xml"], None, Some("mod.xml"))]
    #[case(&["mod.blcm", "-"], Some("mod.blcm"), None)]
    fn parses_transcode_paths(
        #[case] list: &[&str],
        #[case] input: Option<&str>,
        #[case] output: Option<&str>,
    ) {
        assert_eq!(
            parse_args(&args(list)).unwrap(),
            Command::Transcode {
                input: input.map(PathBuf::from),
                output: output.map(PathBuf::from),
            }
        );
    }

    #[test]
    fn rejects_extra_transcode_arguments() {
        assert!(parse_args(&args(&["a", "b", "c"])).is_err());
    }

    #[rstest]
    #[case(&["check"], None, &[])]
    #[case(&["check", "tests"], Some("tests"), &[])]
    #[case(&["check", "tests", "-c", "text", "attrs"], Some("tests"), &["text", "attrs"])]
    #[case(&["check", "--categories", "text"], None, &["text"])]
    fn parses_check(
        #[case] list: &[&str],
        #[case] cases_dir: Option<&str>,
        #[case] categories: &[&str],
    ) {
        assert_eq!(
            parse_args(&args(list)).unwrap(),
            Command::Check {
                cases_dir: cases_dir.map(PathBuf::from),
                categories: args(categories),
            }
        );
    }

    #[test]
    fn rejects_second_cases_dir() {
        assert!(parse_args(&args(&["check", "a", "b"])).is_err());
    }

    #[test]
    fn parses_init() {
        assert_eq!(
            parse_args(&args(&["init", "tests/cases"])).unwrap(),
            Command::Init {
                cases_dir: PathBuf::from("tests/cases"),
            }
        );
        assert!(parse_args(&args(&["init"])).is_err());
        assert!(parse_args(&args(&["init", "a", "b"])).is_err());
    }

    #[test]
    fn parses_help() {
        assert_eq!(parse_args(&args(&["--help"])).unwrap(), Command::Help);
    }
}
