use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};

use metaview::config::Config;
use metaview::metadata::label;
use metaview::tags::Section;
use metaview::view::{MetadataView, Row, RowList};

#[derive(Parser, Debug)]
#[command(
    name = "metaview-cli",
    version,
    about = "Show the EXIF, XMP and IPTC metadata of images, including named face regions"
)]
struct Cli {
    /// Image files to inspect
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Path to config file (default: metaview.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default metaview.json and exit
    #[arg(long)]
    init: bool,

    /// Output rows as JSON
    #[arg(long)]
    json: bool,

    /// Only check whether each image has recognized metadata (exit code 1 if any has none)
    #[arg(long)]
    check: bool,

    /// Save region thumbnails as PNG files into this directory
    #[arg(long, value_name = "DIR")]
    thumbnails: Option<PathBuf>,

    /// Show readable tag labels instead of tag keys
    #[arg(long)]
    labels: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// One row as written by `--json`.
#[derive(Serialize)]
struct RowSummary<'a> {
    section: String,
    key: &'a str,
    label: String,
    value: &'a str,
    thumbnail: Option<[u32; 2]>,
}

#[derive(Serialize)]
struct ImageSummary<'a> {
    path: String,
    rows: Vec<RowSummary<'a>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if cli.init {
        let config = Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files specified. Use --help for usage.");
    }

    let config = Config::load(cli.config.as_deref())?;

    if cli.check {
        let view = MetadataView::new(RowList::default(), &config);
        let mut missing = 0;
        for path in &cli.paths {
            let found = view.has_data(path);
            if !found {
                missing += 1;
            }
            println!("{}: {}", path.display(), if found { "yes" } else { "no" });
        }
        if missing > 0 {
            std::process::exit(1);
        }
        return Ok(());
    }

    if let Some(ref dir) = cli.thumbnails {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let mut views = Vec::with_capacity(cli.paths.len());
    for path in &cli.paths {
        let mut view = MetadataView::new(RowList::default(), &config);
        if let Err(e) = view.try_display_exif_tags(path) {
            log::error!("{}: {e}", path.display());
        } else if view.sink().rows().is_empty() {
            log::info!("{}: no recognized metadata", path.display());
        }

        if let Some(ref dir) = cli.thumbnails {
            save_thumbnails(path, view.sink().rows(), dir)?;
        }
        views.push((path, view));
    }

    if cli.json {
        let images: Vec<ImageSummary> = views
            .iter()
            .map(|(path, view)| ImageSummary {
                path: path.display().to_string(),
                rows: view
                    .sink()
                    .rows()
                    .iter()
                    .map(|row| RowSummary {
                        section: row.section.label(view.locale()),
                        key: &row.key,
                        label: label(&row.key),
                        value: &row.value,
                        thumbnail: row.thumbnail.as_ref().map(|t| [t.width(), t.height()]),
                    })
                    .collect(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&images)?);
        return Ok(());
    }

    for (path, view) in &views {
        print_rows(path, view, cli.labels);
    }

    Ok(())
}

/// Write each region thumbnail as `<stem>-region-<n>.png`.
fn save_thumbnails(image_path: &Path, rows: &[Row], dir: &Path) -> Result<()> {
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let thumbs = rows.iter().filter_map(|row| row.thumbnail.as_ref());
    for (i, thumb) in thumbs.enumerate() {
        let out = dir.join(format!("{stem}-region-{}.png", i + 1));
        thumb
            .save(&out)
            .with_context(|| format!("Failed to write {}", out.display()))?;
        log::info!("Thumbnail saved: {}", out.display());
    }
    Ok(())
}

// ANSI color codes
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Max width for the value column before wrapping.
const VAL_WIDTH: usize = 46;

/// Print one image's rows, grouped under their section headings.
fn print_rows(path: &Path, view: &MetadataView<RowList>, labels: bool) {
    let rows = view.sink().rows();

    println!();
    println!("{BOLD}File:{RESET} {}", path.display());
    println!("{DIM}{}{RESET}", "═".repeat(72));

    if rows.is_empty() {
        println!("  {DIM}(no metadata found){RESET}");
        println!();
        return;
    }

    let names: Vec<String> = rows
        .iter()
        .map(|row| if labels { label(&row.key) } else { row.key.clone() })
        .collect();
    let tag_width = names.iter().map(|n| n.chars().count()).max().unwrap_or(0).min(48);

    let mut current: Option<Section> = None;
    for (row, name) in rows.iter().zip(&names) {
        if current != Some(row.section) {
            if current.is_some() {
                println!();
            }
            println!("  {BOLD}{}{RESET}", row.section.label(view.locale()));
            println!("  {DIM}{}{RESET}", "─".repeat(70));
            current = Some(row.section);
        }

        let mut value = row.value.clone();
        if let Some(ref thumb) = row.thumbnail {
            value.push_str(&format!(" [{}x{}]", thumb.width(), thumb.height()));
        }
        print_row(name, &value, tag_width);
    }
    println!();
}

/// Print a single row in the metadata table.
fn print_row(tag: &str, val: &str, tag_width: usize) {
    let tag_col = format!("{tag:<tag_width$}");
    let indent = " ".repeat(tag_width + 3);
    for (i, line) in wrap_text(val, VAL_WIDTH).iter().enumerate() {
        if i == 0 {
            println!("  {tag_col} : {line}");
        } else {
            println!("  {indent}{line}");
        }
    }
}

/// Wrap text at word boundaries to fit within max_width.
fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in s.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(s.to_string());
    }

    lines
}
