//! vbkm CLI - virtual binder inspection tool

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;

use vbkm::{render, CompositeDocument, JsonFormat, LoadOptions};

#[derive(Parser)]
#[command(name = "vbkm")]
#[command(version)]
#[command(about = "Inspect documents bound together by a .vbkm manifest", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Open constituents one after another instead of in parallel
    #[arg(long, global = true)]
    sequential: bool,

    /// Password for encrypted constituents
    #[arg(long, global = true, env = "VBKM_PASSWORD")]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show constituents, their page ranges and load status
    Info {
        /// Manifest file
        #[arg(value_name = "MANIFEST")]
        input: PathBuf,
    },

    /// Print the merged table of contents
    #[command(alias = "outline")]
    Toc {
        /// Manifest file
        #[arg(value_name = "MANIFEST")]
        input: PathBuf,

        /// Output JSON
        #[arg(long)]
        json: bool,

        /// Output compact JSON
        #[arg(long, requires = "json")]
        compact: bool,
    },

    /// Print the text of one logical page
    Text {
        /// Manifest file
        #[arg(value_name = "MANIFEST")]
        input: PathBuf,

        /// Logical page number (1-based)
        #[arg(short, long)]
        page: u32,
    },

    /// Show which file and local page a logical page comes from
    Locate {
        /// Manifest file
        #[arg(value_name = "MANIFEST")]
        input: PathBuf,

        /// Logical page number (1-based)
        #[arg(short, long)]
        page: u32,
    },

    /// Show the label of a page, or find the page carrying a label
    Label {
        /// Manifest file
        #[arg(value_name = "MANIFEST")]
        input: PathBuf,

        /// Logical page number (1-based)
        #[arg(short, long, conflicts_with = "find", required_unless_present = "find")]
        page: Option<u32>,

        /// Label to search for
        #[arg(short, long)]
        find: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if cli.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    let mut options = LoadOptions::new().with_parallel(!cli.sequential);
    if let Some(password) = cli.password {
        options = options.with_password(password);
    }

    let result = match cli.command {
        Commands::Info { input } => cmd_info(&input, &options),
        Commands::Toc {
            input,
            json,
            compact,
        } => cmd_toc(&input, &options, json, compact),
        Commands::Text { input, page } => cmd_text(&input, &options, page),
        Commands::Locate { input, page } => cmd_locate(&input, &options, page),
        Commands::Label { input, page, find } => cmd_label(&input, &options, page, find),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn open(input: &Path, options: &LoadOptions) -> Result<CompositeDocument, Box<dyn std::error::Error>> {
    log::debug!("Opening manifest {}", input.display());
    Ok(CompositeDocument::open(input, options)?)
}

fn cmd_info(input: &Path, options: &LoadOptions) -> Result<(), Box<dyn std::error::Error>> {
    let doc = open(input, options)?;

    println!("{}", "Binder Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), doc.page_count());
    println!("{}: {}", "Constituents".bold(), doc.constituents().len());
    println!();

    println!("{}", "Constituents".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (range, constituent) in doc.index().ranges().iter().zip(doc.constituents()) {
        let title = constituent.record().display_title();
        match constituent.failure() {
            None if range.count == 0 => {
                println!("  {:>3}. {} {}", range.constituent + 1, title, "(no pages)".dimmed());
            }
            None => {
                println!(
                    "  {:>3}. {} {}",
                    range.constituent + 1,
                    title,
                    format!("pages {}-{}", range.start, range.end() - 1).dimmed()
                );
            }
            Some(e) => {
                println!(
                    "  {:>3}. {} {}",
                    range.constituent + 1,
                    title,
                    format!("failed: {}", e).red()
                );
            }
        }
    }

    let failed = doc.failed_constituents().len();
    if failed > 0 {
        println!();
        println!(
            "{}",
            format!("{} constituent(s) could not be opened", failed).yellow()
        );
    }

    Ok(())
}

fn cmd_toc(
    input: &Path,
    options: &LoadOptions,
    json: bool,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = open(input, options)?;
    let toc = doc.toc_tree();

    if json {
        let format = if compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        };
        println!("{}", render::toc_to_json(&toc, format)?);
    } else {
        print!("{}", render::toc_to_text(&toc, 2));
    }

    Ok(())
}

fn cmd_text(
    input: &Path,
    options: &LoadOptions,
    page: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = open(input, options)?;
    let text = doc.extract_page_text(page)?;
    println!("{}", text.text.trim_end());
    Ok(())
}

fn cmd_locate(
    input: &Path,
    options: &LoadOptions,
    page: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = open(input, options)?;
    let (constituent, local) = doc.locate(page)?;
    let record = doc.constituents()[constituent].record();

    println!(
        "{} {} {} {} ({})",
        format!("Page {}", page).bold(),
        "→".dimmed(),
        record.display_title().green(),
        format!("page {}", local).bold(),
        record.path
    );
    Ok(())
}

fn cmd_label(
    input: &Path,
    options: &LoadOptions,
    page: Option<u32>,
    find: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let doc = open(input, options)?;

    match (page, find) {
        (Some(page), _) => println!("{}", doc.page_label(page)?),
        (None, Some(label)) => println!("{}", doc.page_by_label(&label)?),
        (None, None) => return Err("either --page or --find is required".into()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_label_requires_page_or_find() {
        assert!(Cli::try_parse_from(["vbkm", "label", "a.vbkm"]).is_err());
        assert!(Cli::try_parse_from(["vbkm", "label", "a.vbkm", "--page", "3"]).is_ok());
        assert!(Cli::try_parse_from(["vbkm", "label", "a.vbkm", "--find", "iv"]).is_ok());
        assert!(
            Cli::try_parse_from(["vbkm", "label", "a.vbkm", "--page", "3", "--find", "iv"])
                .is_err()
        );
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["vbkm", "toc", "a.vbkm", "--json", "-v", "--sequential"])
            .unwrap();
        assert!(cli.verbose);
        assert!(cli.sequential);
        assert!(matches!(cli.command, Commands::Toc { json: true, .. }));
    }
}
