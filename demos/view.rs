//! Print a window of a large file, or a page of lines matching a pattern

use std::{fs, io::BufReader, path::PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;
use windowed_file::{line::count_lines, FilteredFile, GoTo, Line, TextFile, ViewSession};

#[derive(Debug, Parser)]
#[command(about = "View a window of lines of a large text file")]
struct Args {
    /// File to view
    path: PathBuf,

    /// First line to show
    #[arg(short, long, default_value_t = 0)]
    line: usize,

    /// Amount of lines to show
    #[arg(short, long, default_value_t = 20)]
    window: usize,

    /// Only show lines containing this text
    #[arg(short, long)]
    filter: Option<String>,

    /// Count the lines of the file first
    #[arg(long)]
    count: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if args.count {
        let mut reader = BufReader::new(fs::File::open(&args.path)?);
        println!("Lines in file: {}", count_lines(&mut reader)?);
    }

    if let Some(pattern) = &args.filter {
        let mut filtered = FilteredFile::open(&args.path, args.window, |line: &Line| {
            line.contents().contains(pattern.as_str())
        })?;
        filtered.go_to(args.line)?;

        for (i, line) in filtered.matched_lines()? {
            println!("{:>8}: {}", i, line.contents());
        }
        return Ok(());
    }

    let mut view = ViewSession::new(TextFile::open(&args.path, args.window)?);
    if !view.go_to(args.line) {
        eprintln!("{}", view.status());
    }

    let top = view.top_line();
    for (i, row) in view.rows().into_iter().enumerate() {
        match top.checked_add(i) {
            Some(line) => println!("{:>8}: {}", line, row.unwrap_or("")),
            None => break,
        }
    }
    println!("{}", view.status());

    Ok(())
}
