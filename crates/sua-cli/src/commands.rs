use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::info;

use sua_parse::{ParseOptions, parse_line};
use sua_schema::{FileType, SchemaRegistry, ValidatorRule, load_rules_json};
use sua_validate::{FileValidationResult, ValidationEngine, write_validation_report_json};

use crate::cli::ValidateArgs;

pub struct ValidateOutcome {
    pub result: FileValidationResult,
    pub report_path: Option<PathBuf>,
}

pub fn run_validate(args: &ValidateArgs) -> Result<ValidateOutcome> {
    let file_type: FileType = args.file_type.into();
    let registry = SchemaRegistry::builtin().context("load built-in schemas")?;
    let schema = registry
        .schema(file_type)
        .with_context(|| format!("no built-in schema for {file_type}"))?;

    let extra: Vec<ValidatorRule> = match &args.rules {
        Some(path) => load_rules_json(path)
            .with_context(|| format!("load rule set {}", path.display()))?,
        None => Vec::new(),
    };

    let lines = read_lines(&args.file)?;
    let evaluation_date = args
        .evaluation_date
        .unwrap_or_else(|| Local::now().date_naive());
    let mut opts = ParseOptions::new(evaluation_date);
    if args.strict_length {
        opts = opts.strict_length();
    }

    info!(
        file = %args.file.display(),
        %file_type,
        lines = lines.len(),
        extra_rules = extra.len(),
        "validating"
    );

    let engine = ValidationEngine::with_extra_rules(schema, &extra);
    let records = lines
        .iter()
        .enumerate()
        .map(|(index, line)| parse_line(schema, index + 1, line, &opts))
        .collect();
    let result = engine.validate_records(records, evaluation_date);

    let report_path = match &args.report_dir {
        Some(dir) => {
            Some(write_validation_report_json(dir, &result).context("write validation report")?)
        }
        None => None,
    };

    Ok(ValidateOutcome {
        result,
        report_path,
    })
}

pub fn run_schemas() -> Result<()> {
    let registry = SchemaRegistry::builtin().context("load built-in schemas")?;
    crate::summary::print_schemas(&registry);
    Ok(())
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file =
        File::open(path).with_context(|| format!("open input file {}", path.display()))?;
    BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<String>>>()
        .with_context(|| format!("read input file {}", path.display()))
}
