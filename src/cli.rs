//! Command-line driver: discovers template files, compiles each one, and
//! writes the generated Rust next to a mirror of the template tree.
//!
//! Template files are named `<name>.<kind>.weft`. Each compiles to
//! `<out>/<kind>/<name>_weft.rs`; the `<kind>` segment doubles as the
//! module name in the generated source.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::compiler::{
    compile_template, CompileError, CompileOptions, ErrorFormat, IndentStyle,
};

/// Parsed command-line arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    /// Directory searched (recursively) for `.weft` templates.
    pub templates_dir: PathBuf,
    /// Directory the generated files are written under.
    pub out_dir: PathBuf,
    /// Filename suffixes to compile; empty means everything.
    pub filters: Vec<String>,
    /// Remove previously generated files instead of compiling.
    pub clean: bool,
    /// Indent generated code with tabs instead of spaces.
    pub tabs: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from("templates"),
            out_dir: PathBuf::from("views"),
            filters: Vec::new(),
            clean: false,
            tabs: false,
        }
    }
}

pub const USAGE: &str = "\
usage: weft [options]
  --templates <dir>  directory to search for templates (default: templates)
  --out <dir>        directory to write generated code to (default: views)
  --filter <suffix>  only compile templates whose filename ends with
                     <suffix>; may be given more than once
  --clean            remove generated files from the output directory
  --tabs             indent generated code with tabs";

/// Parses the process arguments, skipping the program name.
pub fn parse_args() -> Result<CliArgs, String> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    parse_argv(&argv)
}

pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut iter = argv.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--templates" => {
                let dir = iter
                    .next()
                    .ok_or_else(|| "--templates requires a directory".to_string())?;
                args.templates_dir = PathBuf::from(dir);
            }
            "--out" => {
                let dir = iter
                    .next()
                    .ok_or_else(|| "--out requires a directory".to_string())?;
                args.out_dir = PathBuf::from(dir);
            }
            "--filter" => {
                let suffix = iter
                    .next()
                    .ok_or_else(|| "--filter requires a suffix".to_string())?;
                args.filters.push(suffix.clone());
            }
            "--clean" => args.clean = true,
            "--tabs" => args.tabs = true,
            other => return Err(format!("unknown argument `{other}`")),
        }
    }
    Ok(args)
}

/// One discovered template file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// First filename segment; becomes the generated function name.
    pub name: String,
    /// Middle filename segment; becomes the module and output subdirectory.
    pub kind: String,
    pub path: PathBuf,
}

/// Recursively finds `<name>.<kind>.weft` files under `dir`.
///
/// Files with a `.weft` extension but the wrong number of name segments
/// are skipped with a warning. Filters match against the full filename.
pub fn template_files(dir: &Path, filters: &[String]) -> Result<Vec<TemplateFile>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry.with_context(|| format!("walking {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension() != Some(OsStr::new("weft")) {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(OsStr::to_str) else {
            continue;
        };
        if !filters.is_empty() && !filters.iter().any(|f| file_name.ends_with(f)) {
            debug!(file = file_name, "skipped by filter");
            continue;
        }
        let segments: Vec<&str> = file_name.split('.').collect();
        if segments.len() != 3 {
            warn!(
                file = file_name,
                "skipping: expected <name>.<kind>.weft naming"
            );
            continue;
        }
        files.push(TemplateFile {
            name: segments[0].to_string(),
            kind: segments[1].to_string(),
            path: path.to_path_buf(),
        });
    }
    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Where the generated code for a template goes.
pub fn generated_path(out_dir: &Path, file: &TemplateFile) -> PathBuf {
    out_dir.join(&file.kind).join(format!("{}_weft.rs", file.name))
}

/// Removes every previously generated `*_weft.rs` under `out_dir`.
pub fn clean(out_dir: &Path) -> Result<usize> {
    let mut removed = 0;
    if !out_dir.exists() {
        return Ok(0);
    }
    for entry in WalkDir::new(out_dir) {
        let entry = entry.with_context(|| format!("walking {}", out_dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_generated = entry
            .path()
            .file_name()
            .and_then(OsStr::to_str)
            .is_some_and(|n| n.ends_with("_weft.rs"));
        if is_generated {
            fs::remove_file(entry.path())
                .with_context(|| format!("removing {}", entry.path().display()))?;
            info!(file = %entry.path().display(), "removed");
            removed += 1;
        }
    }
    Ok(removed)
}

/// Runs one invocation. Returns true when every template compiled.
pub fn run(args: &CliArgs) -> Result<bool> {
    if args.clean {
        let removed = clean(&args.out_dir)?;
        info!(removed, "clean finished");
        return Ok(true);
    }

    let indent = if args.tabs {
        IndentStyle::Tabs
    } else {
        IndentStyle::Spaces
    };

    let files = template_files(&args.templates_dir, &args.filters)?;
    info!(count = files.len(), dir = %args.templates_dir.display(), "compiling templates");

    let mut all_ok = true;
    for file in &files {
        let source = fs::read_to_string(&file.path)
            .with_context(|| format!("reading {}", file.path.display()))?;
        let options = CompileOptions {
            output_kind: file.kind.clone(),
            indent,
        };
        match compile_template(&source, &file.name, &options) {
            Ok(generated) => {
                let target = generated_path(&args.out_dir, file);
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("creating {}", parent.display()))?;
                }
                fs::write(&target, generated)
                    .with_context(|| format!("writing {}", target.display()))?;
                debug!(from = %file.path.display(), to = %target.display(), "compiled");
            }
            Err(CompileError::Parse { errors }) => {
                all_ok = false;
                let filename = file.path.display().to_string();
                for error in &errors {
                    eprint!("{}", ErrorFormat::new(error, &source).filename(&filename).format());
                }
            }
            Err(err) => {
                all_ok = false;
                eprintln!("error: {}: {err}", file.path.display());
            }
        }
    }
    Ok(all_ok)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn args(argv: &[&str]) -> Result<CliArgs, String> {
        let argv: Vec<String> = argv.iter().map(|s| s.to_string()).collect();
        parse_argv(&argv)
    }

    #[test]
    fn test_parse_defaults() {
        let parsed = args(&[]).unwrap();
        assert_eq!(parsed, CliArgs::default());
    }

    #[test]
    fn test_parse_all_flags() {
        let parsed = args(&[
            "--templates",
            "tpl",
            "--out",
            "gen",
            "--filter",
            ".html.weft",
            "--filter",
            ".xml.weft",
            "--tabs",
        ])
        .unwrap();
        assert_eq!(parsed.templates_dir, PathBuf::from("tpl"));
        assert_eq!(parsed.out_dir, PathBuf::from("gen"));
        assert_eq!(parsed.filters, vec![".html.weft", ".xml.weft"]);
        assert!(parsed.tabs);
        assert!(!parsed.clean);
    }

    #[test]
    fn test_parse_rejects_unknown_flag() {
        assert!(args(&["--bogus"]).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_value() {
        assert!(args(&["--templates"]).is_err());
    }

    #[test]
    fn test_discovery_and_naming() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("sub");
        fs::create_dir(&nested).unwrap();
        fs::write(dir.path().join("index.html.weft"), "hi").unwrap();
        fs::write(nested.join("feed.xml.weft"), "hi").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a template").unwrap();
        fs::write(dir.path().join("badname.weft"), "two segments").unwrap();

        let files = template_files(dir.path(), &[]).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "index");
        assert_eq!(files[0].kind, "html");
        assert_eq!(files[1].name, "feed");
        assert_eq!(files[1].kind, "xml");
    }

    #[test]
    fn test_discovery_honors_filters() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.html.weft"), "x").unwrap();
        fs::write(dir.path().join("b.xml.weft"), "x").unwrap();

        let filters = vec![".html.weft".to_string()];
        let files = template_files(dir.path(), &filters).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name, "a");
    }

    #[test]
    fn test_generated_path_layout() {
        let file = TemplateFile {
            name: "index".into(),
            kind: "html".into(),
            path: PathBuf::from("templates/index.html.weft"),
        };
        assert_eq!(
            generated_path(Path::new("views"), &file),
            PathBuf::from("views/html/index_weft.rs")
        );
    }

    #[test]
    fn test_run_compiles_into_out_dir() {
        let templates = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::write(
            templates.path().join("hello.html.weft"),
            "@(name: &str)\nHello @name!",
        )
        .unwrap();

        let args = CliArgs {
            templates_dir: templates.path().to_path_buf(),
            out_dir: out.path().to_path_buf(),
            ..CliArgs::default()
        };
        assert!(run(&args).unwrap());

        let generated = fs::read_to_string(out.path().join("html/hello_weft.rs")).unwrap();
        assert!(generated.contains("pub mod html {"));
        assert!(generated.contains("pub fn hello(name: &str) -> String {"));
    }

    #[test]
    fn test_run_reports_failure_and_keeps_going() {
        let templates = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fs::write(templates.path().join("bad.html.weft"), "broken @ here").unwrap();
        fs::write(templates.path().join("good.html.weft"), "fine").unwrap();

        let args = CliArgs {
            templates_dir: templates.path().to_path_buf(),
            out_dir: out.path().to_path_buf(),
            ..CliArgs::default()
        };
        assert!(!run(&args).unwrap());
        assert!(out.path().join("html/good_weft.rs").exists());
        assert!(!out.path().join("html/bad_weft.rs").exists());
    }

    #[test]
    fn test_clean_removes_only_generated_files() {
        let out = tempfile::tempdir().unwrap();
        let html = out.path().join("html");
        fs::create_dir(&html).unwrap();
        fs::write(html.join("index_weft.rs"), "generated").unwrap();
        fs::write(html.join("handwritten.rs"), "keep me").unwrap();

        let args = CliArgs {
            out_dir: out.path().to_path_buf(),
            clean: true,
            ..CliArgs::default()
        };
        assert!(run(&args).unwrap());
        assert!(!html.join("index_weft.rs").exists());
        assert!(html.join("handwritten.rs").exists());
    }

    #[test]
    fn test_clean_missing_dir_is_noop() {
        assert_eq!(clean(Path::new("/nonexistent/weft-out")).unwrap(), 0);
    }
}
