//! unicsv CLI - inspect delimited files.
//!
//! Infers (or is told) a file's dialect, reports it as text or JSON, and
//! optionally prints the leading rows.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use unicsv::{
    Delimiter, Escape, FieldDelimiter, Header, Reader, ReaderBuilder, RowDelimiter,
    RowDelimiterSet, ScalarSource, Trim,
};

/// Inspect delimited files.
///
/// Detects the field and row delimiters by sampling the file, then reports
/// the dialect and basic shape.
#[derive(Parser, Debug)]
#[command(name = "unicsv")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file(s) to inspect
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Force a field delimiter instead of inferring one
    #[arg(short = 'd', long)]
    delimiter: Option<String>,

    /// Force a row delimiter instead of inferring one
    #[arg(short = 'r', long)]
    row_delimiter: Option<String>,

    /// Escape scalar (single character, or 'none')
    #[arg(short = 'e', long)]
    escape: Option<String>,

    /// Treat the first row as a header
    #[arg(long)]
    header: bool,

    /// Scalars to trim around unescaped fields
    #[arg(short = 't', long)]
    trim: Option<String>,

    /// Number of scalars sampled for delimiter inference
    #[arg(short = 'n', long, default_value = "500")]
    sample_scalars: usize,

    /// Print at most this many rows after the summary
    #[arg(long, default_value = "0")]
    rows: usize,

    /// Output format for the dialect summary
    #[arg(short = 'f', long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut exit_code = ExitCode::SUCCESS;
    for file in &args.files {
        if let Err(e) = inspect_file(file, &args) {
            eprintln!("Error processing {}: {e}", file.display());
            exit_code = ExitCode::FAILURE;
        }
    }

    exit_code
}

fn inspect_file(path: &PathBuf, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut builder = ReaderBuilder::new();

    match &args.delimiter {
        Some(scalars) => {
            builder.field_delimiter(FieldDelimiter::Use(Delimiter::new(scalars)?));
        }
        None => {
            builder.field_delimiter(FieldDelimiter::infer_default());
        }
    }

    match &args.row_delimiter {
        Some(scalars) => {
            builder.row_delimiter(RowDelimiter::Use(RowDelimiterSet::single(Delimiter::new(
                scalars,
            )?)));
        }
        None => {
            builder.row_delimiter(RowDelimiter::infer_default());
        }
    }

    if let Some(escape) = &args.escape {
        if escape.eq_ignore_ascii_case("none") {
            builder.escape(Escape::None);
        } else if let Some(scalar) = escape.chars().next() {
            builder.escape(Escape::Scalar(scalar));
        }
    }

    if args.header {
        builder.header(Header::FirstLine);
    }

    if let Some(trim) = &args.trim {
        builder.trim(Trim::Scalars(trim.chars().collect()));
    }

    builder.sample_scalars(args.sample_scalars);

    let mut reader = builder.from_path(path)?;

    let display_path = path.display().to_string();
    match args.format {
        OutputFormat::Text => print_text_output(&display_path, &reader),
        OutputFormat::Json => print_json_output(&display_path, &reader),
    }

    if args.rows > 0 {
        print_rows(&mut reader, args.rows)?;
    }

    Ok(())
}

fn print_text_output<S>(path: &str, reader: &Reader<S>) {
    let dialect = reader.dialect();
    println!("File: {path}");
    println!("  Field delimiter: {}", dialect.field());
    println!("  Row delimiters: {}", dialect.rows());
    println!(
        "  Escape: {}",
        match dialect.escape() {
            None => "none".to_string(),
            Some(scalar) => format!("{scalar:?}"),
        }
    );
    if !reader.headers().is_empty() {
        println!("  Headers: {}", reader.headers().join(", "));
    }
    println!();
}

fn print_json_output<S>(path: &str, reader: &Reader<S>) {
    let dialect = reader.dialect();
    let escape = match dialect.escape() {
        None => "null".to_string(),
        Some(scalar) => format!("\"{}\"", escape_json(&scalar.to_string())),
    };
    let rows: Vec<String> = dialect
        .rows()
        .delimiters()
        .iter()
        .map(|d| format!("\"{}\"", escape_json(&d.as_string())))
        .collect();

    print!(
        r#"{{"file":"{}","dialect":{{"field_delimiter":"{}","row_delimiters":[{}],"escape":{}}}"#,
        escape_json(path),
        escape_json(&dialect.field().as_string()),
        rows.join(","),
        escape,
    );

    if !reader.headers().is_empty() {
        let headers: Vec<String> = reader
            .headers()
            .iter()
            .map(|h| format!("\"{}\"", escape_json(h)))
            .collect();
        print!(r#","headers":[{}]"#, headers.join(","));
    }

    println!("}}");
}

fn print_rows<S: ScalarSource>(
    reader: &mut Reader<S>,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    for _ in 0..limit {
        let Some(row) = reader.read_row() else {
            break;
        };
        println!("{:?}", row?);
    }
    Ok(())
}

/// Escape a string for JSON output (quotes, backslashes, control characters).
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}
