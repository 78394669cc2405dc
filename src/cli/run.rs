//! The `extract` and `languages` commands.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use walkdir::WalkDir;

use crate::catalog::{Catalog, json, po};
use crate::cli::args::{ExtractCommand, OutputFormat};
use crate::cli::exit_status::ExitStatus;
use crate::diagnostics::{Category, Diagnostics, Issue};
use crate::extract::accumulator::SourceEncoding;
use crate::extract::comments::CommentFilter;
use crate::extract::driver::extract_file;
use crate::extract::flags::{FlagDecl, FlagSpec, FlagTable, SlotFlag, parse_flag_spec};
use crate::extract::keywords::KeywordTable;
use crate::extract::session::{ScanOptions, ScanSession};
use crate::reporter::print_report;
use crate::scanners::{LanguageEntry, ScannerFamily, all_languages, by_extension, by_name};

#[derive(Default)]
struct FamilyTables {
    keywords: KeywordTable,
    flags: FlagTable,
}

fn install_flag(table: &mut FlagTable, family: ScannerFamily, spec: &FlagSpec) {
    // A dialect the family has no slot for cannot apply to its files.
    if let Some(slot) = family.slot_of(spec.dialect) {
        let flag = SlotFlag {
            declared: if spec.pass {
                FlagDecl::Undecided
            } else {
                FlagDecl::Yes
            },
            inherited: spec.pass,
        };
        table.insert(&spec.keyword, spec.argnum, slot, flag);
    }
}

/// Build the keyword and flag tables for every scanner family from the
/// registry defaults plus the user's `-k` and `--flag` arguments. Malformed
/// user specs degrade with a warning, never abort.
fn build_tables(
    cmd: &ExtractCommand,
    diagnostics: &mut Diagnostics,
) -> HashMap<ScannerFamily, FamilyTables> {
    let mut tables: HashMap<ScannerFamily, FamilyTables> = ScannerFamily::ALL
        .iter()
        .map(|family| (*family, FamilyTables::default()))
        .collect();

    // An empty -k argument suppresses the built-in defaults.
    let use_defaults = !cmd.keywords.iter().any(|s| s.is_empty());

    for entry in all_languages() {
        let Some(t) = tables.get_mut(&entry.family) else {
            continue;
        };
        if use_defaults {
            for spec in entry.default_keywords {
                t.keywords.insert_spec(spec);
            }
        }
        for spec in entry.default_flags {
            if let Ok(parsed) = parse_flag_spec(spec) {
                install_flag(&mut t.flags, entry.family, &parsed);
            }
        }
    }

    for spec in &cmd.keywords {
        if spec.is_empty() {
            continue;
        }
        let mut wellformed = true;
        for t in tables.values_mut() {
            wellformed = t.keywords.insert_spec(spec);
        }
        if !wellformed {
            diagnostics.push(Issue::option_warning(
                Category::MalformedKeywordSpec,
                format!(
                    "keyword spec '{}' does not parse; using the whole string as a keyword",
                    spec
                ),
            ));
        }
    }

    for spec in &cmd.flags {
        match parse_flag_spec(spec) {
            Ok(parsed) => {
                for (family, t) in tables.iter_mut() {
                    install_flag(&mut t.flags, *family, &parsed);
                }
            }
            Err(err) => diagnostics.push(Issue::option_warning(
                Category::MalformedFlagSpec,
                format!("invalid --flag argument '{}': {}", spec, err),
            )),
        }
    }

    tables
}

/// Explicit files in the given order, then the recursive directory walk in
/// deterministic name order, filtered to known extensions.
fn collect_files(cmd: &ExtractCommand) -> Result<Vec<PathBuf>> {
    let mut files = cmd.files.clone();
    for dir in &cmd.directories {
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry =
                entry.with_context(|| format!("failed to read directory {}", dir.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let known = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .and_then(by_extension)
                .is_some();
            if known {
                files.push(entry.into_path());
            }
        }
    }
    Ok(files)
}

fn language_for(path: &Path, forced: Option<&'static LanguageEntry>) -> &'static LanguageEntry {
    forced
        .or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .and_then(by_extension)
        })
        // Unknown extensions get the C scanner, the traditional fallback.
        .unwrap_or(&all_languages()[0])
}

pub fn extract(cmd: ExtractCommand, verbose: bool) -> Result<ExitStatus> {
    let encoding = SourceEncoding::from_name(&cmd.from_code)
        .ok_or_else(|| anyhow!("unsupported --from-code encoding '{}'", cmd.from_code))?;
    let forced = match &cmd.language {
        Some(name) => {
            Some(by_name(name).ok_or_else(|| anyhow!("unknown language '{}'", name))?)
        }
        None => None,
    };
    let comment_filter = match &cmd.add_comments {
        None => CommentFilter::None,
        Some(tag) if tag.is_empty() => CommentFilter::All,
        Some(tag) => CommentFilter::Tag(tag.clone()),
    };

    let mut diagnostics = Diagnostics::new();
    let tables = build_tables(&cmd, &mut diagnostics);
    let files = collect_files(&cmd)?;

    let options = ScanOptions {
        extract_all: cmd.extract_all,
        comment_filter,
        encoding,
        trigraphs: cmd.trigraphs,
    };

    let mut catalog = Catalog::new();
    for path in &files {
        let entry = language_for(path, forced);
        let t = &tables[&entry.family];
        if verbose {
            eprintln!(
                "{} {} ({})",
                "Scanning".green().bold(),
                path.display(),
                entry.name
            );
        }
        let file =
            File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
        let name = path.display().to_string();
        let mut session = ScanSession::new(
            &name,
            &name,
            entry.family,
            &t.keywords,
            &t.flags,
            &options,
            &mut diagnostics,
        );
        let mut scanner = entry.scanner(Box::new(file), &options);
        extract_file(scanner.as_mut(), &mut session, &mut catalog)?;
    }

    print_report(&diagnostics);

    match &cmd.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create {}", path.display()))?;
            let mut out = BufWriter::new(file);
            write_catalog(&catalog, cmd.output_format, &mut out)?;
            out.flush()?;
        }
        None => {
            let stdout = io::stdout();
            write_catalog(&catalog, cmd.output_format, &mut stdout.lock())?;
        }
    }

    if verbose {
        eprintln!(
            "{} {} message{}",
            "Extracted".green().bold(),
            catalog.len(),
            if catalog.len() == 1 { "" } else { "s" }
        );
    }

    Ok(if diagnostics.warning_count() > 0 {
        ExitStatus::Failure
    } else {
        ExitStatus::Success
    })
}

fn write_catalog(
    catalog: &Catalog,
    format: OutputFormat,
    out: &mut impl Write,
) -> io::Result<()> {
    match format {
        OutputFormat::Po => po::write_po(catalog, out),
        OutputFormat::Json => json::write_json(catalog, out),
    }
}

pub fn languages() -> Result<ExitStatus> {
    for entry in all_languages() {
        let extensions: Vec<String> =
            entry.extensions.iter().map(|e| format!(".{}", e)).collect();
        println!("{:<10} {}", entry.name, extensions.join(" "));
    }
    Ok(ExitStatus::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract_cmd() -> ExtractCommand {
        ExtractCommand {
            files: Vec::new(),
            directories: Vec::new(),
            language: None,
            output: None,
            output_format: OutputFormat::Po,
            extract_all: false,
            keywords: Vec::new(),
            flags: Vec::new(),
            from_code: "UTF-8".into(),
            add_comments: None,
            trigraphs: false,
            verbose: false,
        }
    }

    #[test]
    fn defaults_install_gettext_keywords() {
        let mut diagnostics = Diagnostics::new();
        let tables = build_tables(&extract_cmd(), &mut diagnostics);
        assert!(tables[&ScannerFamily::C].keywords.lookup("ngettext").is_some());
        assert!(tables[&ScannerFamily::Python].keywords.lookup("_").is_some());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn empty_keyword_spec_suppresses_defaults() {
        let mut cmd = extract_cmd();
        cmd.keywords = vec![String::new(), "mark:1".into()];
        let mut diagnostics = Diagnostics::new();
        let tables = build_tables(&cmd, &mut diagnostics);
        assert!(tables[&ScannerFamily::C].keywords.lookup("gettext").is_none());
        assert!(tables[&ScannerFamily::C].keywords.lookup("mark").is_some());
    }

    #[test]
    fn malformed_flag_spec_warns_but_continues() {
        let mut cmd = extract_cmd();
        cmd.flags = vec!["nonsense".into()];
        let mut diagnostics = Diagnostics::new();
        build_tables(&cmd, &mut diagnostics);
        assert_eq!(diagnostics.warning_count(), 1);
        assert_eq!(
            diagnostics.issues()[0].category,
            Category::MalformedFlagSpec
        );
    }

    #[test]
    fn fallback_language_is_c() {
        assert_eq!(language_for(Path::new("notes.txt"), None).name, "c");
        assert_eq!(language_for(Path::new("mod.py"), None).name, "python");
    }
}
