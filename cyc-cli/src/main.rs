//! Command-line interface for cyc
//! This binary compiles a cyc source file, resolving @include markers
//! against the source file's directory, then rendering to the chosen format.
//!
//! Usage:
//!   cyc `<path>` [--output `<path>`] [--format `<format>`]

use clap::{Arg, Command};
use std::path::{Path, PathBuf};

mod resolver;

use resolver::FsResolver;

#[tokio::main]
async fn main() {
    let matches = Command::new("cyc")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A compiler for cyc documents")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the cyc source file (the .cyc suffix may be omitted)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output path (default: the source path with an .html suffix)"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format: html, tree, passes")
                .default_value("html"),
        )
        .get_matches();

    let path = matches
        .get_one::<String>("path")
        .expect("path is required");
    let output = matches.get_one::<String>("output").map(String::as_str);
    let format = matches
        .get_one::<String>("format")
        .expect("format has a default");

    if let Err(e) = run(path, output, format).await {
        eprintln!("cyc: {}", e);
        std::process::exit(1);
    }
}

async fn run(path: &str, output: Option<&str>, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let source = source_path(path);
    let text = tokio::fs::read_to_string(&source)
        .await
        .map_err(|e| format!("{}: {}", source.display(), e))?;

    let base = source.parent().unwrap_or(Path::new(".")).to_path_buf();
    let mut resolver = FsResolver::new(base);
    let text = cyc_include::include(text, &mut resolver).await?;

    match format {
        "html" => {
            let rules = cyc_render::html::rules();
            let artifact = cyc_render::compile(&text, &rules)?;
            let document = artifact
                .into_document()
                .ok_or("the html rule module produced no document")?;
            let destination = match output {
                Some(path) => PathBuf::from(path),
                None => source.with_extension("html"),
            };
            tokio::fs::write(&destination, document)
                .await
                .map_err(|e| format!("{}: {}", destination.display(), e))?;
        }
        "tree" => {
            let rules = cyc_render::html::rules();
            let form = cyc_parser::cyc::parsing::parse(&text, &rules)?;
            println!("{}", serde_json::to_string_pretty(&form)?);
        }
        "passes" => {
            let rules = cyc_render::html::rules();
            let form = cyc_parser::cyc::parsing::parse(&text, &rules)?;
            let product = cyc_render::engine::render(&form, &rules)?;
            println!("{}", serde_json::to_string_pretty(&product)?);
        }
        other => {
            return Err(format!(
                "unknown format '{}' (expected html, tree, or passes)",
                other
            )
            .into());
        }
    }
    Ok(())
}

/// The source path as given, with the .cyc suffix appended when missing.
fn source_path(path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("cyc")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_path_appends_suffix() {
        assert_eq!(source_path("book"), PathBuf::from("book.cyc"));
    }

    #[test]
    fn test_source_path_keeps_explicit_suffix() {
        assert_eq!(source_path("book.cyc"), PathBuf::from("book.cyc"));
        assert_eq!(source_path("notes.txt"), PathBuf::from("notes.txt"));
    }

    #[tokio::test]
    async fn test_compile_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("doc.cyc");
        std::fs::write(&source, "@chapter(One)\n\nHello, world.\n").unwrap();

        run(source.to_str().unwrap(), None, "html").await.unwrap();

        let html = std::fs::read_to_string(dir.path().join("doc.html")).unwrap();
        assert!(html.contains("<h1"));
        assert!(html.contains("Hello, world."));
    }

    #[tokio::test]
    async fn test_unknown_format_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("doc.cyc");
        std::fs::write(&source, "plain\n").unwrap();

        let err = run(source.to_str().unwrap(), None, "pdf").await.unwrap_err();
        assert!(err.to_string().contains("pdf"));
    }
}
