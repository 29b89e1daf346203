//! Command-line interface for typeahead-rs
//!
//! Usage:
//!   typeahead [OPTIONS] [QUERY]
//!   echo "search term" | typeahead
//!
//! Options:
//!   -c, --corpus <FILE>  Path to a reference corpus for spelling correction
//!   -d, --download       Fetch the default reference corpus if needed
//!   -n, --limit <N>      Maximum number of results to return
//!   -j, --json           Output as JSON
//!   -i, --interactive    Read queries line by line from stdin
//!   -h, --help           Show help

use std::env;
use std::io::{self, BufRead};
use std::path::Path;
use std::process;

use typeahead_rs::corpus;
use typeahead_rs::{CachedPipeline, MemoryCache, QueryPipeline, SpellModel};

fn print_help() {
    eprintln!(
        r#"typeahead-rs - a learning autocomplete engine

USAGE:
    typeahead [OPTIONS] [QUERY]
    echo "search term" | typeahead

OPTIONS:
    -c, --corpus <FILE>  Path to a reference corpus for spelling correction
    -d, --download       Fetch the default reference corpus if needed
    -n, --limit <N>      Maximum number of results to return
    -j, --json           Output as JSON
    -i, --interactive    Read queries line by line from stdin (:history shows recent queries)
    -h, --help           Show this help message

EXAMPLES:
    typeahead "operating system"
    typeahead -c big.txt -n 5 "democrac"
    typeahead -i -j < queries.txt
"#
    );
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut corpus_file: Option<String> = None;
    let mut download = false;
    let mut limit: Option<usize> = None;
    let mut json_output = false;
    let mut interactive = false;
    let mut query: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                return;
            }
            "-j" | "--json" => {
                json_output = true;
            }
            "-i" | "--interactive" => {
                interactive = true;
            }
            "-d" | "--download" => {
                download = true;
            }
            "-c" | "--corpus" => {
                i += 1;
                if i < args.len() {
                    corpus_file = Some(args[i].clone());
                } else {
                    eprintln!("Error: --corpus requires a file path");
                    process::exit(1);
                }
            }
            "-n" | "--limit" => {
                i += 1;
                let value = args.get(i).and_then(|s| s.parse::<usize>().ok());
                match value {
                    Some(n) => limit = Some(n),
                    None => {
                        eprintln!("Error: --limit requires a number");
                        process::exit(1);
                    }
                }
            }
            arg if !arg.starts_with('-') => {
                query = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    let model = build_spell_model(corpus_file, download);

    let mut pipeline = QueryPipeline::with_spell(model);
    if let Some(n) = limit {
        if let Err(e) = pipeline.set_result_limit(n) {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }

    if interactive {
        run_interactive(pipeline, json_output);
        return;
    }

    // Read from stdin if no query was provided
    let input = if let Some(q) = query {
        q
    } else {
        let stdin = io::stdin();
        let mut lines = Vec::new();
        for line in stdin.lock().lines() {
            match line {
                Ok(l) => lines.push(l),
                Err(e) => {
                    eprintln!("Error reading stdin: {e}");
                    process::exit(1);
                }
            }
        }
        lines.join(" ")
    };

    if input.trim().is_empty() {
        eprintln!("Error: No query provided");
        print_help();
        process::exit(1);
    }

    match pipeline.search(&input) {
        Ok(results) => print_results(&results, json_output),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn build_spell_model(corpus_file: Option<String>, download: bool) -> SpellModel {
    let path = match corpus_file {
        Some(path) => Some(path),
        None if download => match fetch_default_corpus() {
            Ok(path) => Some(path),
            Err(e) => {
                eprintln!("Error fetching the default corpus: {e}");
                process::exit(1);
            }
        },
        None => None,
    };

    match path {
        Some(path) => match corpus::load_corpus(Path::new(&path)) {
            Ok(text) => SpellModel::from_text(&text),
            Err(e) => {
                eprintln!("Error loading corpus '{path}': {e}");
                process::exit(1);
            }
        },
        // No corpus: queries are learned verbatim, without correction.
        None => SpellModel::from_text(""),
    }
}

#[cfg(feature = "download")]
fn fetch_default_corpus() -> Result<String, corpus::CorpusError> {
    corpus::get_default_corpus().map(|p| p.display().to_string())
}

#[cfg(not(feature = "download"))]
fn fetch_default_corpus() -> Result<String, corpus::CorpusError> {
    Err(corpus::CorpusError::NotFound(
        "built without the download feature".to_string(),
    ))
}

fn run_interactive(pipeline: QueryPipeline, json_output: bool) {
    let mut front = CachedPipeline::new(pipeline, Box::new(MemoryCache::new()));

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading stdin: {e}");
                process::exit(1);
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line == ":history" {
            match front.history() {
                Ok(history) => {
                    for term in history {
                        println!("{term}");
                    }
                }
                Err(e) => eprintln!("Error: {e}"),
            }
            continue;
        }

        match front.search(line) {
            Ok(results) => print_results(&results, json_output),
            Err(e) => eprintln!("Error: {e}"),
        }
    }
}

fn print_results(results: &[String], json_output: bool) {
    if json_output {
        match serde_json::to_string(&serde_json::json!({ "results": results })) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error serializing to JSON: {e}");
                process::exit(1);
            }
        }
    } else if results.is_empty() {
        println!("no results");
    } else {
        for result in results {
            println!("{result}");
        }
    }
}
