//! Output formatting and styling module.
//!
//! Centralizes user-facing terminal output: colored status lines, the
//! category listing, the batch-sort progress bar and the sorting summary.
//! Diagnostics go through the `log` facade instead.

use crate::category::{Category, shortcut_key};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;

/// Manages all CLI output with consistent styling and formatting.
///
/// Status lines use a leading symbol and color:
/// - Success: green ✓
/// - Error: red ✗ (to stderr)
/// - Warning: yellow ⚠
/// - Info: cyan text
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use imgsort::output::OutputFormatter;
    /// OutputFormatter::success("Added category 'dogs'");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark on stderr.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use imgsort::output::OutputFormatter;
    /// OutputFormatter::warning("'holiday' is not in the category list; sorting anyway");
    /// ```
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a bold section header preceded by a blank line.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints categories in display order with their shortcut keys.
    ///
    /// # Arguments
    ///
    /// * `categories` - Categories as returned by the category store
    pub fn category_list(categories: &[Category]) {
        if categories.is_empty() {
            Self::info("No categories yet. Add one with `imgsort categories add <name>`.");
            return;
        }
        for line in category_lines(categories) {
            println!("{}", line);
        }
    }

    /// Creates the progress bar shown while `sort-all` moves images.
    ///
    /// # Arguments
    ///
    /// * `total` - Number of images that will be moved
    /// * `category` - Category the images are going into, shown as the prefix
    ///
    /// # Example
    ///
    /// ```no_run
    /// use imgsort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(12, "holidays");
    /// pb.set_message("beach.jpg");
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64, category: &str) -> ProgressBar {
        let style = ProgressStyle::with_template(
            "{prefix:.bold} {bar:30.green/white} {pos}/{len} {wide_msg:.dim}",
        )
        .expect("Invalid progress bar template")
        .progress_chars("=> ");

        ProgressBar::new(total)
            .with_style(style)
            .with_prefix(format!("{}/", category))
    }

    /// Prints how many images went into each category.
    ///
    /// Rows follow the category display order, with the shortcut key in front.
    /// Categories that are not on the list come last, alphabetically.
    ///
    /// # Arguments
    ///
    /// * `categories` - The current category list, for ordering and keys
    /// * `sorted_counts` - Images sorted per category name
    ///
    /// # Example
    ///
    /// ```no_run
    /// use imgsort::category::Category;
    /// use imgsort::output::OutputFormatter;
    /// use std::collections::HashMap;
    ///
    /// let categories = vec![Category::new("dogs")?, Category::new("cats")?];
    /// let counts = HashMap::from([("cats".to_string(), 4), ("dogs".to_string(), 1)]);
    /// OutputFormatter::summary_table(&categories, &counts);
    /// # Ok::<(), imgsort::CategoryError>(())
    /// ```
    pub fn summary_table(categories: &[Category], sorted_counts: &HashMap<String, usize>) {
        Self::header("SORTED");

        let rows = summary_rows(categories, sorted_counts);
        let total: usize = rows.iter().map(|row| row.count).sum();
        let width = rows
            .iter()
            .map(|row| row.name.chars().count())
            .max()
            .unwrap_or(0)
            .max("Category".len());

        println!("    {:<width$}  {}", "Category".bold(), "Images".bold());
        for row in &rows {
            let key = row.key.map_or_else(|| "   ".to_string(), |k| format!("[{k}]"));
            println!(
                "{} {:<width$}  {:>6}",
                key.dimmed(),
                row.name,
                row.count.to_string().green()
            );
        }
        println!(
            "    {:<width$}  {:>6} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            image_word(total)
        );
    }
}

/// One line of the sorting summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub key: Option<char>,
    pub name: String,
    pub count: usize,
}

/// Summary rows for every category that received at least one image.
pub fn summary_rows(
    categories: &[Category],
    sorted_counts: &HashMap<String, usize>,
) -> Vec<SummaryRow> {
    let mut rows: Vec<SummaryRow> = categories
        .iter()
        .enumerate()
        .filter_map(|(i, category)| {
            let count = *sorted_counts.get(category.name())?;
            (count > 0).then(|| SummaryRow {
                key: shortcut_key(i),
                name: category.name().to_string(),
                count,
            })
        })
        .collect();

    let mut unlisted: Vec<_> = sorted_counts
        .iter()
        .filter(|&(name, &count)| count > 0 && !categories.iter().any(|c| c.name() == name))
        .collect();
    unlisted.sort_by_key(|&(name, _)| name);
    rows.extend(unlisted.into_iter().map(|(name, &count)| SummaryRow {
        key: None,
        name: name.clone(),
        count,
    }));

    rows
}

/// `[key]  name` lines for a category listing; categories past the tenth
/// have no key.
pub fn category_lines(categories: &[Category]) -> Vec<String> {
    categories
        .iter()
        .enumerate()
        .map(|(i, category)| match shortcut_key(i) {
            Some(key) => format!("[{}]  {}", key, category.name()),
            None => format!("     {}", category.name()),
        })
        .collect()
}

pub fn image_word(count: usize) -> &'static str {
    if count == 1 { "image" } else { "images" }
}
