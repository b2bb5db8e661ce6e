//! po-merge
//!
//! Catalog maintenance front end: merges extraction fragments produced by
//! per-unit extraction runs against the previous template and locale
//! catalogs, then writes the updated catalogs back out.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, Command};
use i18n_extractor::catalog::{Catalog, EntryStatus};
use i18n_extractor::extract::{ExtractedMessage, ExtractionResult};
use i18n_extractor::pipeline::{merge_all, RunOutcome};
use i18n_extractor::serializers::{read_catalog, write_catalog};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use config::ProjectConfig;

fn main() {
    let matches = Command::new("po-merge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Merge extracted message fragments into translation catalogs")
        .arg(
            Arg::new("fragments")
                .value_name("FRAGMENT")
                .help("Extraction fragment files (glob patterns accepted)")
                .num_args(1..)
                .required(true),
        )
        .arg(
            Arg::new("project")
                .short('p')
                .long("project")
                .value_name("FILE")
                .help("JSON project file naming the catalogs"),
        )
        .arg(
            Arg::new("template")
                .short('t')
                .long("template")
                .value_name("FILE")
                .help("Previous template catalog (.pot)"),
        )
        .arg(
            Arg::new("locale")
                .short('l')
                .long("locale")
                .value_name("TAG=FILE")
                .help("Previous locale catalog, repeatable")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("out")
                .short('o')
                .long("out")
                .value_name("DIR")
                .help("Output directory (defaults to the current directory)"),
        )
        .get_matches();

    match run(&matches) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("error: {:#}", err);
            process::exit(2);
        }
    }
}

fn run(matches: &clap::ArgMatches) -> Result<i32> {
    let mut project = match matches.get_one::<String>("project") {
        Some(path) => ProjectConfig::load(Path::new(path))?,
        None => ProjectConfig::default(),
    };
    if let Some(template) = matches.get_one::<String>("template") {
        project.template = Some(template.clone());
    }
    if let Some(locales) = matches.get_many::<String>("locale") {
        for spec in locales {
            let Some((tag, path)) = spec.split_once('=') else {
                bail!("invalid --locale `{}` (expected TAG=FILE)", spec);
            };
            project.locales.insert(tag.to_string(), path.to_string());
        }
    }
    let out_dir = matches
        .get_one::<String>("out")
        .cloned()
        .or_else(|| project.out_dir.clone())
        .unwrap_or_else(|| ".".to_string());

    let fragment_paths = expand_fragments(
        matches
            .get_many::<String>("fragments")
            .expect("required")
            .map(String::as_str),
    )?;
    if fragment_paths.is_empty() {
        bail!("no fragment files matched");
    }

    let mut results: Vec<ExtractionResult> = Vec::new();
    for path in &fragment_paths {
        let content = fs::read_to_string(path)
            .with_context(|| format!("unable to read fragment {}", path.display()))?;
        let fragment = read_catalog(&content, &path.to_string_lossy())
            .with_context(|| format!("unable to parse fragment {}", path.display()))?;
        results.push(fragment_to_result(&fragment, path));
    }
    results.sort_by(|a, b| a.file_path.cmp(&b.file_path));

    let previous_template = match &project.template {
        Some(path) if Path::new(path).exists() => load_catalog(Path::new(path))?,
        _ => Catalog::template(),
    };

    // A broken locale catalog only takes that locale out of the run.
    let mut previous_locales: Vec<Catalog> = Vec::new();
    let mut locale_failures: Vec<String> = Vec::new();
    for (tag, path) in &project.locales {
        if !Path::new(path).exists() {
            previous_locales.push(Catalog::for_locale(tag.clone()));
            continue;
        }
        match load_catalog(Path::new(path)) {
            Ok(mut catalog) => {
                catalog.locale.get_or_insert_with(|| tag.clone());
                previous_locales.push(catalog);
            }
            Err(err) => locale_failures.push(format!("{:#}", err)),
        }
    }

    let result = merge_all(
        &results,
        &[],
        &BTreeSet::new(),
        &previous_template,
        &previous_locales,
    );

    for failure in &locale_failures {
        eprintln!("fatal: {}", failure);
    }
    for diagnostic in &result.diagnostics {
        eprintln!("{}", diagnostic);
    }

    let out_dir = PathBuf::from(out_dir);
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("unable to create output directory {}", out_dir.display()))?;
    write_output(&out_dir.join("template.pot"), &result.template)?;
    for catalog in &result.locales {
        let tag = catalog.locale.as_deref().unwrap_or("unknown");
        write_output(&out_dir.join(format!("{}.po", tag)), catalog)?;
    }

    let failed = result.outcome == RunOutcome::Failure || !locale_failures.is_empty();
    Ok(if failed { 1 } else { 0 })
}

fn expand_fragments<'a>(patterns: impl Iterator<Item = &'a str>) -> Result<Vec<PathBuf>> {
    let mut paths: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        if pattern.contains(['*', '?', '[']) {
            let matched = glob::glob(pattern)
                .with_context(|| format!("invalid glob pattern `{}`", pattern))?;
            for entry in matched {
                paths.push(entry.with_context(|| format!("while expanding `{}`", pattern))?);
            }
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }
    paths.sort();
    paths.dedup();
    Ok(paths)
}

fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("unable to read catalog {}", path.display()))?;
    Ok(read_catalog(&content, &path.to_string_lossy())?)
}

fn write_output(path: &Path, catalog: &Catalog) -> Result<()> {
    fs::write(path, write_catalog(catalog))
        .with_context(|| format!("unable to write catalog {}", path.display()))
}

/// Re-frame a persisted extraction fragment as the extraction result it
/// came from: one message per recorded reference, so references union
/// again across fragments.
fn fragment_to_result(fragment: &Catalog, path: &Path) -> ExtractionResult {
    let file_path = path.to_string_lossy().to_string();
    let mut messages: Vec<ExtractedMessage> = Vec::new();
    for entry in fragment.iter() {
        if entry.status == EntryStatus::Obsolete {
            continue;
        }
        if entry.references.is_empty() {
            messages.push(ExtractedMessage {
                key: entry.key.clone(),
                text: entry.source_text.clone(),
                reference: i18n_extractor::SourceReference::new(file_path.clone(), 0, 0),
            });
            continue;
        }
        for reference in &entry.references {
            messages.push(ExtractedMessage {
                key: entry.key.clone(),
                text: entry.source_text.clone(),
                reference: reference.clone(),
            });
        }
    }
    ExtractionResult {
        file_path,
        messages,
        diagnostics: Vec::new(),
    }
}
