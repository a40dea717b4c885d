//! Theme Snippets CLI
//!
//! Usage:
//!   theme-snippets [OPTIONS] <COMMAND>
//!
//! Commands:
//!   harvest               List the snippet element types of the current theme
//!   render <TEMPLATE>     Display a snippet for an element
//!   editor <TEMPLATE>     Print the editor form of a snippet, applying `--set` values
//!
//! Options:
//!   -t, --themes <DIR>    Directory holding one subdirectory per theme
//!       --theme <NAME>    Override the site's current theme
//!   -v, --verbose         Raise the log level (repeatable)
//!   -h, --help            Print help

use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use theme_snippets::snippet::{EditorTemplates, ElementData};
use theme_snippets::{
    harvester, render_form, CapabilityDescriptor, Config, Element, ElementDisplayContext,
    ElementEditorContext, FormConfig, FormValues, HarvestContext, SnippetHarvester, ThemeRegistry,
};

#[derive(Parser)]
#[command(name = "theme-snippets")]
#[command(about = "Editable element types harvested from theme snippet templates")]
struct Cli {
    /// Directory holding one subdirectory per theme
    #[arg(short, long, default_value = "themes")]
    themes: PathBuf,

    /// Override the site's current theme
    #[arg(long)]
    theme: Option<String>,

    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the snippet element types of the current theme
    Harvest,
    /// Display a snippet for an element
    Render(ElementArgs),
    /// Print the editor form of a snippet
    Editor {
        #[command(flatten)]
        element: ElementArgs,

        /// Form-field name prefix
        #[arg(long, default_value = "")]
        prefix: String,

        /// Write the updated element data back to the data file
        #[arg(long, requires = "data")]
        write: bool,
    },
}

#[derive(Args)]
struct ElementArgs {
    /// Key of the snippet template, e.g. WelcomeBannerSnippet
    template: String,

    /// Element data file (TOML key/value table)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Set a field value (repeatable)
    #[arg(short, long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, String)>,
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match Config::load_dir(&cli.themes) {
        Ok(config) => config,
        Err(e) => fail(format!("loading config in '{}': {}", cli.themes.display(), e)),
    };
    if let Some(theme) = &cli.theme {
        config = config.with_current_theme(theme.clone());
    }

    let registry = match ThemeRegistry::load(&cli.themes) {
        Ok(registry) => registry,
        Err(e) => fail(format!("loading themes from '{}': {}", cli.themes.display(), e)),
    };
    let harvester = harvester(Rc::new(registry), &config);

    match cli.command {
        Command::Harvest => print_harvest(&harvester),
        Command::Render(args) => {
            let snippet = find_snippet(&harvester, &args.template);
            let mut element = load_element(&harvester, &args);
            // A render has no form submission, so `--set` values go straight into the data
            for (key, value) in &args.set {
                element.data.set(key.clone(), value.clone());
            }
            let mut context = ElementDisplayContext::new(element);
            if let Err(e) = snippet.display(&mut context) {
                fail(e.report());
            }
            println!("{}", context.shape.output().unwrap_or_default());
        }
        Command::Editor {
            element: args,
            prefix,
            write,
        } => {
            let snippet = find_snippet(&harvester, &args.template);
            let mut element = load_element(&harvester, &args);
            // Only `--set` values count as a submission; data file values are stored state
            let values: FormValues = args.set.iter().cloned().collect();
            let mut context = ElementEditorContext::new(&mut element, &EditorTemplates).with_prefix(prefix);
            let editor = if args.set.is_empty() {
                snippet.build_editor(&mut context)
            } else {
                snippet.apply_editor(&mut context.with_values(&values))
            };
            println!("{}", render_form(&editor, &FormConfig::default()));

            if let (true, Some(path)) = (write, &args.data) {
                save_element(path, &element.data);
            }
        }
    }
}

fn print_harvest(harvester: &SnippetHarvester) {
    let mut failed = false;
    for result in harvester.harvest_elements(&HarvestContext::default()) {
        match result {
            Ok(snippet) => {
                let dialog = if snippet.has_editor_dialog { "editor" } else { "no editor" };
                println!(
                    "{} ({}) [{}, {}]",
                    snippet.display_name, snippet.template_name, snippet.category, dialog
                );
                for field in &snippet.snippet.fields {
                    println!("  - {}: {} \"{}\"", field.name, field.field_type, field.label());
                }
            }
            Err(e) => {
                failed = true;
                eprintln!("{}", e.report());
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}

fn find_snippet(harvester: &SnippetHarvester, template: &str) -> CapabilityDescriptor {
    for result in harvester.harvest_elements(&HarvestContext::default()) {
        match result {
            Ok(snippet) if snippet.template_name == template => return snippet,
            Ok(_) => {}
            Err(e) if e.template() == template => fail(e.report()),
            Err(e) => tracing::warn!(error = %e, "skipping snippet template"),
        }
    }
    fail(format!("no snippet template named '{}'", template))
}

fn load_element(harvester: &SnippetHarvester, args: &ElementArgs) -> Element {
    let config = harvester.config();
    let data = match &args.data {
        Some(path) if path.exists() => {
            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => fail(format!("reading '{}': {}", path.display(), e)),
            };
            match ElementData::from_toml(&content) {
                Ok(data) => data,
                Err(e) => fail(format!("parsing '{}': {}", path.display(), e)),
            }
        }
        _ => ElementData::new(),
    };
    Element::new(config.element_type.clone(), config.category.clone()).with_data(data)
}

fn save_element(path: &Path, data: &ElementData) {
    let content = match data.to_toml() {
        Ok(content) => content,
        Err(e) => fail(format!("serializing element data: {}", e)),
    };
    if let Err(e) = fs::write(path, content) {
        fail(format!("writing '{}': {}", path.display(), e));
    }
}
