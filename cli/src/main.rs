//! pptx-toolkit CLI - PowerPoint color swapping tool
//!
//! Lists theme color schemes and swaps scheme or literal colors across a
//! presentation.

use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use pptx_toolkit::{ColorMapping, ProcessSummary, Scope, ScopeSelection, Theme};
use std::path::PathBuf;

/// PowerPoint toolkit for colors and themes
#[derive(Parser)]
#[command(
    name = "pptx-toolkit",
    version,
    about = "PowerPoint toolkit for colors and themes",
    long_about = "pptx-toolkit - Structure-preserving color swapping for PowerPoint.\n\n\
                  Use \"pptx-toolkit <group> <command> --help\" for command-specific help."
)]
struct Cli {
    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and swap colors
    #[command(subcommand, visible_alias = "colour")]
    Color(ColorCommand),

    /// Show version information
    Version,
}

#[derive(Subcommand)]
enum ColorCommand {
    /// List the color scheme of every theme
    List {
        /// Input presentation
        input: PathBuf,

        /// Print themes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Swap colors, e.g. "accent1:accent2,FF0000:dk1"
    Swap {
        /// Comma-separated source:target pairs (scheme token or 6-digit hex)
        mapping: String,

        /// Input presentation
        input: PathBuf,

        /// Output presentation
        output: PathBuf,

        /// Only parts using these themes (e.g. theme1,theme2)
        #[arg(short, long, value_delimiter = ',')]
        theme: Vec<String>,

        /// Parts to process: all, content or master
        #[arg(short, long)]
        scope: Option<String>,

        /// Only these slides and their charts, diagrams and notes (e.g. 1,3,5-8)
        #[arg(long)]
        slides: Option<String>,

        /// Overwrite the output file if it exists
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Color(ColorCommand::List { input, json }) => {
            let themes = pptx_toolkit::list_themes(&input)?;

            if json {
                println!("{}", pptx_toolkit::pptx::themes_to_json(&themes)?);
            } else {
                print_themes(&themes);
            }
        }

        Commands::Color(ColorCommand::Swap {
            mapping,
            input,
            output,
            theme,
            scope,
            slides,
            force,
        }) => {
            // Everything the user typed is validated before touching files.
            let mapping = ColorMapping::parse(&mapping)?;

            let mut selection = ScopeSelection::new().with_themes(theme);
            if let Some(scope) = scope {
                selection = selection.with_scope(scope.parse::<Scope>()?);
            }
            if let Some(slides) = slides {
                selection = selection.with_slides(pptx_toolkit::parse_slide_range(&slides)?);
            }
            selection.validate()?;
            log::debug!(
                "{} mapping(s), scope {}",
                mapping.len(),
                selection.effective_scope()
            );

            if !input.exists() {
                return Err(pptx_toolkit::Error::InputNotFound(input).into());
            }
            if output.exists() && !force {
                return Err(format!(
                    "output file '{}' already exists (use --force to overwrite)",
                    output.display()
                )
                .into());
            }

            print_header(&input, &mapping, &selection);

            let pb = create_spinner("Swapping colors...");
            let result = pptx_toolkit::swap_colors(&input, &output, &mapping, &selection);
            pb.finish_and_clear();
            let summary = result?;

            print_summary(&summary, &output);
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

fn print_themes(themes: &[Theme]) {
    for (i, theme) in themes.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!(
            "{} {}",
            theme.id().cyan().bold(),
            format!("({})", theme.theme_name).dimmed()
        );
        println!("{}: {}", "Color scheme".bold(), theme.color_scheme_name);
        println!("{}", "─".repeat(40));
        for (token, hex) in theme.colors.iter() {
            println!("  {:<10} #{}  {}", token.as_str(), hex, token.description().dimmed());
        }
    }
}

fn print_header(input: &std::path::Path, mapping: &ColorMapping, selection: &ScopeSelection) {
    println!("Processing {}...", input.display());
    println!("{}: {}", "Mappings".bold(), mapping);

    if selection.has_theme_filter() {
        println!("{}: {}", "Themes".bold(), selection.themes().join(", "));
    } else {
        println!("{}: all", "Themes".bold());
    }

    if selection.has_slide_filter() {
        let slides: Vec<String> = selection.slides().iter().map(|n| n.to_string()).collect();
        println!("{}: {}", "Slides".bold(), slides.join(", "));
    }

    let scope = selection.effective_scope();
    if scope != Scope::All {
        println!("{}: {}", "Scope".bold(), scope);
    }
}

fn print_summary(summary: &ProcessSummary, output: &std::path::Path) {
    match summary.slides_matched {
        Some(0) => println!("{} No slides matched the theme filter", "→".yellow()),
        Some(1) => println!("{} 1 slide matched", "→".cyan()),
        Some(n) => println!("{} {} slides matched", "→".cyan(), n),
        None => {}
    }

    println!(
        "{} Successfully processed {} XML file(s)",
        "✓".green().bold(),
        summary.parts_modified
    );
    println!("{} Output saved to {}", "✓".green().bold(), output.display());
}

fn print_version() {
    println!("{} {}", "pptx-toolkit".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Structure-preserving color swapping for PowerPoint presentations");
    println!();
    println!("Supported formats: PPTX, PPTM, POTX, PPSX");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
