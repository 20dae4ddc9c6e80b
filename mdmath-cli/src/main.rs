// Command-line interface for mdmath
//
// This binary converts Markdown with embedded LaTeX into preview HTML, documents with
// native equations, or placeholder HTML ready for a host editor.
//
// The core capabilities live in the mdmath-babel crate; this crate only wires files,
// configuration and terminal output around it.
//
// Usage:
//  mdmath <input>                          - Print preview HTML (default)
//  mdmath preview <input> [-o <file>]      - Same as above (explicit)
//  mdmath insert <input> [--standalone]    - Dry-run insertion into an in-memory document
//  mdmath export <input> [-o <path>]       - Write document-from-md.docx (or .html)
//  mdmath formulas <input> [--normalized]  - List formulas as JSON
//  mdmath watch <input> -o <file>          - Re-render the preview whenever the input changes
//  mdmath generate-css                     - Print the preview stylesheet
//
// Extra Parameters:
//
// Configuration keys can be overridden with --extra-<name> <value>.
// Example:
//  mdmath export notes.md --extra-exporter pandoc --extra-strategy source

mod watch;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use mdmath_babel::bridge::{DocumentBridge, FormulaOutcome, MemoryHost};
use mdmath_babel::export::ExporterRegistry;
use mdmath_babel::formula::extract;
use mdmath_babel::html::wrap_document;
use mdmath_babel::ingest::load_source;
use mdmath_babel::placeholder::PlaceholderStrategy;
use mdmath_babel::publish::{publish_with, PublishArtifact, PublishSpec};
use mdmath_babel::render::{default_css, ComrakRenderer, Preview, RenderOptions};
use mdmath_config::{Loader, MdmathConfig, PROJECT_CONFIG_FILE};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const SUBCOMMANDS: &[&str] = &[
    "preview",
    "insert",
    "export",
    "formulas",
    "watch",
    "generate-css",
    "help",
];

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if let Some(key) = arg.strip_prefix("--extra-") {
            let has_value = i + 1 < args.len() && !args[i + 1].starts_with('-');
            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn input_arg() -> Arg {
    Arg::new("input")
        .help("Markdown or text file")
        .required(true)
        .index(1)
        .value_hint(ValueHint::FilePath)
}

fn output_arg(help: &'static str) -> Arg {
    Arg::new("output")
        .long("output")
        .short('o')
        .help(help)
        .value_hint(ValueHint::AnyPath)
}

fn build_cli() -> Command {
    Command::new("mdmath")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Markdown with LaTeX math to HTML and documents, keeping formulas editable")
        .long_about(
            "mdmath converts Markdown with embedded LaTeX ($...$ and $$...$$) into HTML\n\
            and documents while keeping every formula a native, editable math object.\n\n\
            Commands:\n  \
            - preview:  Render preview HTML with math typeset as MathML (default)\n  \
            - insert:   Dry-run the placeholder round trip against an in-memory document\n  \
            - export:   Produce document-from-md.docx, or HTML when no exporter can run\n  \
            - formulas: List the formulas found in a file\n  \
            - watch:    Re-render the preview on every change\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to override configuration.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            mdmath notes.md                           # Preview HTML to stdout\n  \
            mdmath export notes.md -o out/            # Write out/document-from-md.docx\n  \
            mdmath insert notes.md --extra-strategy source",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to an mdmath.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .subcommand(
            Command::new("preview")
                .about("Render preview HTML (default command)")
                .arg(input_arg())
                .arg(output_arg("Output file path (defaults to stdout)")),
        )
        .subcommand(
            Command::new("insert")
                .about("Insert into an in-memory document, replacing placeholders with math objects")
                .long_about(
                    "Runs the same steps used against a live editor: render, substitute a\n\
                    {formulaN} placeholder for each formula, paste, then resolve every\n\
                    placeholder into a math object.\n\n\
                    The resulting document is printed with math objects shown as ⟨latex⟩.\n\
                    With --standalone, the placeholder HTML is written as preview.html instead.",
                )
                .arg(input_arg())
                .arg(
                    Arg::new("standalone")
                        .long("standalone")
                        .help("Write the placeholder HTML instead of inserting")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("report")
                        .long("report")
                        .help("Print the per-formula resolve report as JSON")
                        .action(ArgAction::SetTrue),
                )
                .arg(output_arg("Where to write preview.html (file or directory)")),
        )
        .subcommand(
            Command::new("export")
                .about("Export to a .docx document, falling back to HTML")
                .arg(input_arg())
                .arg(
                    Arg::new("exporter")
                        .long("exporter")
                        .help("Exporter to use (altchunk, pandoc)")
                        .value_hint(ValueHint::Other),
                )
                .arg(output_arg("Output file or directory (defaults to the current directory)")),
        )
        .subcommand(
            Command::new("formulas")
                .about("List formulas as JSON")
                .arg(input_arg())
                .arg(
                    Arg::new("normalized")
                        .long("normalized")
                        .help("Print normalized LaTeX instead of the raw spans")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("watch")
                .about("Re-render the preview whenever the input changes")
                .arg(input_arg())
                .arg(output_arg("Preview file to keep up to date").required(true))
                .arg(
                    Arg::new("once")
                        .long("once")
                        .help("Render once and exit")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("generate-css")
                .about("Output the stylesheet used by the preview and inlined on export")
                .long_about(
                    "Outputs the built-in preview stylesheet.\n\n\
                    Save it, edit it, and point export.custom_css at the result to add\n\
                    rules on top of the built-in ones.\n\n\
                    Examples:\n  \
                    mdmath generate-css > custom.css",
                ),
        )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MDMATH_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, mut extra_params) = parse_extra_args(&args);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A bare file argument means the default "preview" command
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !SUBCOMMANDS.contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "preview".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    let mut config = load_cli_config(matches.get_one::<String>("config").map(|s| s.as_str()));
    apply_config_overrides(&mut config, &mut extra_params);
    for key in extra_params.keys() {
        tracing::warn!(key = %key, "unknown --extra parameter ignored");
    }

    match matches.subcommand() {
        Some(("preview", sub)) => handle_preview_command(required(sub, "input"), output(sub), &config),
        Some(("insert", sub)) => handle_insert_command(
            required(sub, "input"),
            sub.get_flag("standalone"),
            sub.get_flag("report"),
            output(sub),
            &config,
        ),
        Some(("export", sub)) => {
            if let Some(exporter) = sub.get_one::<String>("exporter") {
                config.export.exporter = exporter.clone();
            }
            handle_export_command(required(sub, "input"), output(sub), &config)
        }
        Some(("formulas", sub)) => handle_formulas_command(required(sub, "input"), sub.get_flag("normalized")),
        Some(("watch", sub)) => {
            let out = output(sub).unwrap_or_else(|| fail("watch requires --output"));
            handle_watch_command(required(sub, "input"), out, sub.get_flag("once"), &config)
        }
        Some(("generate-css", _)) => print!("{}", default_css()),
        _ => {
            eprintln!("Unknown subcommand. Use --help for usage information.");
            std::process::exit(1);
        }
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(|s| s.as_str())
        .unwrap_or_else(|| fail(&format!("missing argument '{name}'")))
}

fn output(matches: &ArgMatches) -> Option<&Path> {
    matches.get_one::<String>("output").map(Path::new)
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn read_input(path: &str) -> String {
    load_source(Path::new(path)).unwrap_or_else(|e| fail(&e.to_string()))
}

fn renderer(config: &MdmathConfig) -> ComrakRenderer {
    ComrakRenderer::new(RenderOptions::from(&config.render))
}

/// Full preview page: rendered body plus the preview stylesheet
fn preview_page(preview: &Preview, source: &str) -> String {
    let output = preview.render(source);
    wrap_document(&output.html, &format!("<style>\n{}</style>", default_css()))
}

fn handle_preview_command(input: &str, output: Option<&Path>, config: &MdmathConfig) {
    let source = read_input(input);
    let preview = Preview::new(Box::new(renderer(config))).with_typesetting(config.preview.typeset_math);
    let page = preview_page(&preview, &source);
    match output {
        Some(path) => fs::write(path, page)
            .unwrap_or_else(|e| fail(&format!("Error writing file '{}': {e}", path.display()))),
        None => println!("{page}"),
    }
}

fn handle_insert_command(
    input: &str,
    standalone: bool,
    report_json: bool,
    output: Option<&Path>,
    config: &MdmathConfig,
) {
    let source = read_input(input);
    let bridge = DocumentBridge::new(Box::new(renderer(config))).with_strategy(config.placeholder.strategy);

    if standalone {
        let mut artifact = bridge.insert_standalone(&source).unwrap_or_else(|e| fail(&e.to_string()));
        artifact.file_name = config.export.preview_file_name.clone();
        let target = output.unwrap_or_else(|| Path::new("."));
        let written = artifact.write_to(target).unwrap_or_else(|e| fail(&e.to_string()));
        println!("{}", written.display());
        return;
    }

    let mut host = MemoryHost::new();
    let outcome = bridge.insert(&mut host, &source).unwrap_or_else(|e| fail(&e.to_string()));
    println!("{}", host.document().render_text());

    if report_json {
        let json = serde_json::to_string_pretty(&outcome.report).unwrap_or_else(|e| fail(&e.to_string()));
        eprintln!("{json}");
    } else {
        for (index, status) in &outcome.report.outcomes {
            match status {
                FormulaOutcome::Inserted => {}
                FormulaOutcome::Missing => eprintln!("formula {index}: placeholder not found"),
                FormulaOutcome::Failed(reason) => eprintln!("formula {index}: {reason}"),
            }
        }
    }
}

fn handle_export_command(input: &str, output: Option<&Path>, config: &MdmathConfig) {
    let source = read_input(input);
    let custom_css = config.export.custom_css_path().map(|path| {
        fs::read_to_string(&path)
            .unwrap_or_else(|e| fail(&format!("Error reading stylesheet '{}': {e}", path.display())))
    });

    let target: PathBuf = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    let spec = PublishSpec::new(&source)
        .with_options(config.publish_options(custom_css))
        .with_output_path(&target);

    let registry = ExporterRegistry::with_defaults();
    let result = publish_with(&registry, &renderer(config), spec).unwrap_or_else(|e| fail(&e.to_string()));
    if result.fell_back {
        eprintln!("Exporter '{}' is not available, wrote HTML instead", config.export.exporter);
    }
    if let PublishArtifact::File(path) = result.artifact {
        println!("{}", path.display());
    }
}

fn handle_formulas_command(input: &str, normalized: bool) {
    let source = read_input(input);
    let formulas = extract(&source);
    let json = if normalized {
        serde_json::to_string_pretty(&formulas.normalized())
    } else {
        let raws: Vec<_> = formulas.iter().collect();
        serde_json::to_string_pretty(&raws)
    };
    println!("{}", json.unwrap_or_else(|e| fail(&e.to_string())));
}

fn handle_watch_command(input: &str, output: &Path, once: bool, config: &MdmathConfig) {
    let preview = Preview::new(Box::new(renderer(config))).with_typesetting(config.preview.typeset_math);
    let render = |source: &str| preview_page(&preview, source);
    let options = watch::WatchOptions {
        debounce: config.preview.debounce(),
        once,
    };
    watch::run(Path::new(input), output, options, render).unwrap_or_else(|e| fail(&e));
}

fn load_cli_config(explicit_path: Option<&str>) -> MdmathConfig {
    let loader = Loader::new().with_optional_file(PROJECT_CONFIG_FILE);
    let loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    loader.build().unwrap_or_else(|err| {
        eprintln!("Failed to load configuration: {err}");
        std::process::exit(1);
    })
}

fn apply_config_overrides(config: &mut MdmathConfig, extra_params: &mut HashMap<String, String>) {
    if let Some(raw) = take_override(extra_params, &["strategy", "placeholder-strategy"]) {
        config.placeholder.strategy = PlaceholderStrategy::from_name(&raw)
            .unwrap_or_else(|| fail(&format!("Invalid placeholder strategy '{raw}' (use html or source)")));
    }
    if let Some(raw) = take_override(extra_params, &["exporter"]) {
        config.export.exporter = raw;
    }
    if let Some(raw) = take_override(extra_params, &["css", "css-path"]) {
        config.export.custom_css = raw;
    }
    if let Some(raw) = take_override(extra_params, &["font", "body-font"]) {
        config.export.body_font = raw;
    }
    if let Some(raw) = take_override(extra_params, &["typeset-math", "math"]) {
        config.preview.typeset_math = parse_bool_arg("typeset-math", &raw);
    }
    if let Some(raw) = take_override(extra_params, &["debounce-ms", "debounce"]) {
        config.preview.debounce_ms = raw
            .parse()
            .unwrap_or_else(|_| fail(&format!("Invalid value '{raw}' for --extra-debounce-ms")));
    }
    if let Some(raw) = take_override(extra_params, &["allow-html"]) {
        config.render.allow_html = parse_bool_arg("allow-html", &raw);
    }
}

fn take_override(map: &mut HashMap<String, String>, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(value) = map.remove(*key) {
            return Some(value);
        }
    }
    None
}

fn parse_bool_arg(flag: &str, raw: &str) -> bool {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => true,
        "false" | "0" | "no" | "n" => false,
        other => fail(&format!("Invalid boolean value '{other}' for --extra-{flag}")),
    }
}
