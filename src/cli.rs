//! Command-line interface module for imgsort.
//!
//! This module handles:
//! - Argument parsing (clap derive)
//! - Category and settings management commands
//! - Listing pending images
//! - Single, batch and interactive sorting

use crate::category::{Category, index_for_key};
use crate::category_store::CategoryStore;
use crate::config::{AppPaths, SettingsStore};
use crate::file_organizer::Sorter;
use crate::images::ImageEnumerator;
use crate::output::{OutputFormatter, category_lines, image_word};
use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Sort a folder of images into category subdirectories.
#[derive(Debug, Parser)]
#[command(name = "imgsort", version, about)]
pub struct Cli {
    /// Application root. Default input/output directories and the data
    /// directory live under it. Defaults to the current directory.
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Directory holding settings.json and categories.json [default: <root>/data]
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Resolves the application paths from the `--root` and `--data-dir` flags.
    pub fn app_paths(&self) -> Result<AppPaths> {
        let root = match &self.root {
            Some(root) => root.clone(),
            None => std::env::current_dir().context("Could not determine the current directory")?,
        };
        Ok(match &self.data_dir {
            Some(data_dir) => AppPaths::with_data_dir(root, data_dir),
            None => AppPaths::from_root(root),
        })
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Manage sorting categories
    #[command(subcommand)]
    Categories(CategoryCommand),

    /// Show or change the input and output directories
    #[command(subcommand)]
    Config(ConfigCommand),

    /// List images waiting to be sorted
    List,

    /// Move one image into a category
    Sort {
        /// Image file to sort
        image: PathBuf,
        /// Category to sort it into
        category: String,
    },

    /// Move every pending image into one category
    SortAll {
        /// Category to sort the images into
        category: String,
    },

    /// Sort pending images one at a time, choosing a category for each
    Session,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CategoryCommand {
    /// List categories in display order
    List,
    /// Add a category (lowercase letters and digits separated by hyphens)
    Add { name: String },
    /// Remove a category; already sorted images stay where they are
    Remove { name: String },
    /// Rename a category; already sorted images are not moved
    Rename { old_name: String, new_name: String },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommand {
    /// Print the resolved directories and data files
    Show,
    /// Set the directory scanned for images
    SetInput { dir: PathBuf },
    /// Set the directory sorted images are moved under
    SetOutput { dir: PathBuf },
}

/// Runs the parsed command line.
pub fn run_cli(cli: Cli) -> Result<()> {
    let paths = cli.app_paths()?;
    run_command(cli.command, &paths)
}

/// Executes a single command against the stores under `paths`.
///
/// # Examples
///
/// ```no_run
/// use imgsort::cli::{run_command, Command};
/// use imgsort::config::AppPaths;
///
/// let paths = AppPaths::from_root("/home/user/pictures");
/// run_command(Command::List, &paths)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn run_command(command: Command, paths: &AppPaths) -> Result<()> {
    match command {
        Command::Categories(command) => run_category_command(command, paths),
        Command::Config(command) => run_config_command(command, paths),
        Command::List => list_pending(paths),
        Command::Sort { image, category } => sort_one(paths, &image, &category),
        Command::SortAll { category } => sort_all(paths, &category),
        Command::Session => {
            let stdin = io::stdin();
            let report = run_session(paths, stdin.lock(), io::stdout())?;
            if report.total_sorted() > 0 {
                let categories = CategoryStore::new(paths).get_categories();
                OutputFormatter::summary_table(&categories, &report.sorted);
            }
            if report.skipped > 0 || report.remaining > 0 {
                OutputFormatter::info(&format!(
                    "{} skipped, {} still pending",
                    report.skipped, report.remaining
                ));
            }
            Ok(())
        }
    }
}

fn run_category_command(command: CategoryCommand, paths: &AppPaths) -> Result<()> {
    let store = CategoryStore::new(paths);
    match command {
        CategoryCommand::List => {
            OutputFormatter::header("Categories");
            OutputFormatter::category_list(&store.get_categories());
        }
        CategoryCommand::Add { name } => {
            store.add_category(&name)?;
            OutputFormatter::success(&format!("Added category '{}'", name));
        }
        CategoryCommand::Remove { name } => {
            store.remove_category(&name)?;
            OutputFormatter::success(&format!("Removed category '{}'", name));
        }
        CategoryCommand::Rename { old_name, new_name } => {
            store.rename_category(&old_name, &new_name)?;
            OutputFormatter::success(&format!(
                "Renamed category '{}' to '{}'",
                old_name, new_name
            ));
        }
    }
    Ok(())
}

fn run_config_command(command: ConfigCommand, paths: &AppPaths) -> Result<()> {
    let settings = SettingsStore::new(paths);
    match command {
        ConfigCommand::Show => {
            let current = settings.get_settings();
            OutputFormatter::header("Settings");
            OutputFormatter::plain(&format!(
                "Input directory:  {}",
                current.input_dir.display()
            ));
            OutputFormatter::plain(&format!(
                "Output directory: {}",
                current.output_dir.display()
            ));
            OutputFormatter::plain(&format!(
                "Settings file:    {}",
                settings.path().display()
            ));
            OutputFormatter::plain(&format!(
                "Categories file:  {}",
                paths.categories_file().display()
            ));
        }
        ConfigCommand::SetInput { dir } => {
            let dir = absolute(&dir)?;
            settings.set_input_dir(&dir)?;
            OutputFormatter::success(&format!("Input directory set to {}", dir.display()));
        }
        ConfigCommand::SetOutput { dir } => {
            let dir = absolute(&dir)?;
            settings.set_output_dir(&dir)?;
            OutputFormatter::success(&format!("Output directory set to {}", dir.display()));
        }
    }
    Ok(())
}

fn absolute(dir: &Path) -> Result<PathBuf> {
    std::path::absolute(dir).with_context(|| format!("Invalid directory {}", dir.display()))
}

fn list_pending(paths: &AppPaths) -> Result<()> {
    let settings = SettingsStore::new(paths);
    let images = ImageEnumerator::new(&settings).list_images()?;
    let input_dir = settings.get_settings().input_dir;

    if images.is_empty() {
        OutputFormatter::info(&format!("No images found in {}", input_dir.display()));
        return Ok(());
    }

    OutputFormatter::header(&format!(
        "{} {} pending in {}",
        images.len(),
        image_word(images.len()),
        input_dir.display()
    ));
    for (i, image) in images.iter().enumerate() {
        OutputFormatter::plain(&format!("{:>4}  {}", i + 1, image.name));
    }
    Ok(())
}

fn warn_if_unregistered(categories: &[Category], category: &str) {
    if !categories.iter().any(|c| c.name() == category) {
        OutputFormatter::warning(&format!(
            "'{}' is not in the category list; sorting anyway",
            category
        ));
    }
}

fn sort_one(paths: &AppPaths, image: &Path, category: &str) -> Result<()> {
    warn_if_unregistered(&CategoryStore::new(paths).get_categories(), category);
    let settings = SettingsStore::new(paths);
    let sorted = Sorter::new(&settings).sort_image(image, category)?;

    if sorted.was_renamed() {
        OutputFormatter::success(&format!(
            "Sorted into {}/ as {} (name already taken)",
            category,
            sorted.destination.display()
        ));
    } else {
        OutputFormatter::success(&format!(
            "Sorted into {}/ → {}",
            category,
            sorted.destination.display()
        ));
    }
    Ok(())
}

fn sort_all(paths: &AppPaths, category: &str) -> Result<()> {
    let categories = CategoryStore::new(paths).get_categories();
    warn_if_unregistered(&categories, category);
    let settings = SettingsStore::new(paths);
    let images = ImageEnumerator::new(&settings).list_images()?;

    if images.is_empty() {
        OutputFormatter::info(&format!(
            "No images found in {}",
            settings.get_settings().input_dir.display()
        ));
        return Ok(());
    }

    let sorter = Sorter::new(&settings);
    let pb = OutputFormatter::create_progress_bar(images.len() as u64, category);
    let mut sorted = 0;
    let mut failures = Vec::new();

    for image in &images {
        pb.set_message(image.name.clone());
        match sorter.sort_image(&image.path, category) {
            Ok(_) => sorted += 1,
            Err(e) => failures.push(e),
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let counts = HashMap::from([(category.to_string(), sorted)]);
    OutputFormatter::summary_table(&categories, &counts);

    if !failures.is_empty() {
        for e in &failures {
            OutputFormatter::error(&e.to_string());
        }
        bail!(
            "{} {} could not be sorted",
            failures.len(),
            image_word(failures.len())
        );
    }
    Ok(())
}

/// Outcome of an interactive sorting session.
#[derive(Debug, Default)]
pub struct SessionReport {
    /// Images sorted per category.
    pub sorted: HashMap<String, usize>,
    /// Images passed over with `s`.
    pub skipped: usize,
    /// Sort attempts that failed; the image stays current after a failure.
    pub failed: usize,
    /// Images not reached before quitting.
    pub remaining: usize,
}

impl SessionReport {
    pub fn total_sorted(&self) -> usize {
        self.sorted.values().sum()
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Choice<'a> {
    Category(&'a str),
    Skip,
    Quit,
    Unknown,
}

/// Shortcut keys win over category names, which win over the skip/quit
/// words, so every category stays selectable.
fn parse_choice<'a>(input: &str, categories: &'a [Category]) -> Choice<'a> {
    let mut chars = input.chars();
    if let (Some(key), None) = (chars.next(), chars.next())
        && let Some(category) = index_for_key(key).and_then(|i| categories.get(i))
    {
        return Choice::Category(category.name());
    }

    if let Some(category) = categories.iter().find(|c| c.name() == input) {
        return Choice::Category(category.name());
    }

    match input {
        "s" | "skip" => Choice::Skip,
        "q" | "quit" => Choice::Quit,
        _ => Choice::Unknown,
    }
}

/// Walks the pending images one at a time, reading a choice per image.
///
/// Each line of `input` is a shortcut key, a category name, `s` to skip or
/// `q` to quit; end of input also quits. A failed sort is reported and the
/// same image is offered again.
///
/// # Errors
///
/// Fails before prompting if no categories exist or the input directory
/// cannot be listed, and on I/O errors on `input`/`output`.
pub fn run_session<R: BufRead, W: Write>(
    paths: &AppPaths,
    mut input: R,
    mut output: W,
) -> Result<SessionReport> {
    let settings = SettingsStore::new(paths);
    let categories = CategoryStore::new(paths).get_categories();
    if categories.is_empty() {
        bail!(
            "No categories defined. Add at least one category with `imgsort categories add <name>` before sorting."
        );
    }

    let images = ImageEnumerator::new(&settings).list_images()?;
    let mut report = SessionReport::default();
    if images.is_empty() {
        writeln!(
            output,
            "No images found in {}.",
            settings.get_settings().input_dir.display()
        )?;
        return Ok(report);
    }

    let sorter = Sorter::new(&settings);
    writeln!(output, "Categories:")?;
    for line in category_lines(&categories) {
        writeln!(output, "  {}", line)?;
    }
    writeln!(output, "Type a key or category name, 's' to skip, 'q' to quit.")?;

    let total = images.len();
    let mut index = 0;
    while let Some(image) = images.get(index) {
        writeln!(output, "\nImage {} of {}: {}", index + 1, total, image.name)?;
        write!(output, "> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let choice = line.trim();
        if choice.is_empty() {
            continue;
        }

        match parse_choice(choice, &categories) {
            Choice::Quit => break,
            Choice::Skip => {
                report.skipped += 1;
                index += 1;
            }
            Choice::Category(name) => match sorter.sort_image(&image.path, name) {
                Ok(sorted) => {
                    writeln!(output, "  → {}", sorted.destination.display())?;
                    *report.sorted.entry(name.to_string()).or_insert(0) += 1;
                    index += 1;
                }
                Err(e) => {
                    report.failed += 1;
                    writeln!(output, "  Failed to sort image: {}", e)?;
                }
            },
            Choice::Unknown => writeln!(output, "  Unknown choice '{}'.", choice)?,
        }
    }

    report.remaining = total - index;
    if report.remaining == 0 {
        writeln!(output, "\nDone. Every image has been handled.")?;
    }
    Ok(report)
}
