//! Rebuild AcroForm Fields from Page Widgets
//!
//! Loads a JSON document model, rebuilds `/AcroForm /Fields` from the widget
//! annotations on its pages, writes the repaired model and prints the report.
//!
//! Usage:
//!   cargo run --release --bin rebuild_form_fields -- form.json
//!   cargo run --release --bin rebuild_form_fields -- form.json --output fixed.json
//!   cargo run --release --bin rebuild_form_fields -- form.json --font Helv=/path/to/Arial.ttf
//!   cargo run --release --features system-fonts --bin rebuild_form_fields -- form.json --system-fonts
//!
//! Flags:
//!   --output <path>      Where to write the repaired model (default: overwrite input)
//!   --font NAME=path     Register a font file for fallback lookups (repeatable)
//!   --system-fonts       Also look up installed system fonts
//!   --force              Rebuild even if the form already lists fields
//!   --verbose, -v        Debug logging

use pdf_formfix::document::PdfDocument;
use pdf_formfix::fonts::{FontMapper, FontProgram, FontStyleHint, InMemoryFontMapper};
use pdf_formfix::forms::{AcroForm, AcroFormOrphanWidgetsFixup, FixupReport};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, PartialEq)]
struct RebuildConfig {
    input: PathBuf,
    output: Option<PathBuf>,
    fonts: Vec<(String, PathBuf)>,
    system_fonts: bool,
    force: bool,
    verbose: bool,
}

impl RebuildConfig {
    fn from_args(args: &[String]) -> Result<Self, String> {
        let mut input = None;
        let mut output = None;
        let mut fonts = Vec::new();
        let mut system_fonts = false;
        let mut force = false;
        let mut verbose = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--output" | "-o" => {
                    i += 1;
                    let path = args.get(i).ok_or("--output needs a path")?;
                    output = Some(PathBuf::from(path));
                },
                "--font" => {
                    i += 1;
                    let spec = args.get(i).ok_or("--font needs NAME=path")?;
                    let (name, path) = spec
                        .split_once('=')
                        .filter(|(name, path)| !name.is_empty() && !path.is_empty())
                        .ok_or_else(|| format!("invalid --font value '{}', expected NAME=path", spec))?;
                    fonts.push((name.to_string(), PathBuf::from(path)));
                },
                "--system-fonts" => system_fonts = true,
                "--force" => force = true,
                "--verbose" | "-v" => verbose = true,
                flag if flag.starts_with('-') => return Err(format!("unknown flag '{}'", flag)),
                path => {
                    if input.is_some() {
                        return Err(format!("unexpected argument '{}'", path));
                    }
                    input = Some(PathBuf::from(path));
                },
            }
            i += 1;
        }

        Ok(Self {
            input: input.ok_or("missing input document")?,
            output,
            fonts,
            system_fonts,
            force,
            verbose,
        })
    }
}

/// Registered font files first, then installed fonts when enabled.
struct CliFontMapper {
    registered: InMemoryFontMapper,
    #[cfg(feature = "system-fonts")]
    system: Option<pdf_formfix::fonts::SystemFontMapper>,
}

impl FontMapper for CliFontMapper {
    fn lookup(&self, name: &str, style: Option<FontStyleHint>) -> Option<FontProgram> {
        let found = self.registered.lookup(name, style);
        #[cfg(feature = "system-fonts")]
        let found = found.or_else(|| self.system.as_ref().and_then(|s| s.lookup(name, style)));
        found
    }
}

fn build_mapper(config: &RebuildConfig) -> pdf_formfix::Result<CliFontMapper> {
    let mut registered = InMemoryFontMapper::new();
    for (name, path) in &config.fonts {
        registered.register_file(name.clone(), path)?;
    }

    if config.system_fonts && cfg!(not(feature = "system-fonts")) {
        log::warn!("--system-fonts ignored: built without the system-fonts feature");
    }

    Ok(CliFontMapper {
        registered,
        #[cfg(feature = "system-fonts")]
        system: config
            .system_fonts
            .then(pdf_formfix::fonts::SystemFontMapper::new),
    })
}

fn run(config: &RebuildConfig) -> pdf_formfix::Result<FixupReport> {
    let mut doc = PdfDocument::open(&config.input)?;
    let fixup = AcroFormOrphanWidgetsFixup::new(build_mapper(config)?);

    let report = if config.force {
        let mut acroform = match AcroForm::load(&doc)? {
            Some(acroform) => acroform,
            None => AcroForm::create(&mut doc)?,
        };
        fixup.rebuild_fields(&mut doc, &mut acroform)
    } else {
        fixup.process(&mut doc)
    };

    let output = config.output.as_ref().unwrap_or(&config.input);
    doc.save(output)?;
    Ok(report)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let config = match RebuildConfig::from_args(&args) {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            eprintln!(
                "Usage: rebuild_form_fields <input.json> [--output out.json] [--font NAME=path.ttf]... [--system-fonts] [--force] [--verbose]"
            );
            return ExitCode::from(2);
        },
    };

    let default_level = if config.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match run(&config) {
        Ok(report) => {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Error: {}", e),
            }
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
