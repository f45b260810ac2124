//! CLI tool for xlgrid - groups a JSON dataset and outputs the group tree
//!
//! Usage:
//!   xlgrid_cli <dataset.json>                        # Summary JSON to stdout
//!   xlgrid_cli <dataset.json> --group status,owner   # Group by columns
//!   xlgrid_cli <dataset.json> --sort amount          # Sort rows inside groups
//!   xlgrid_cli <dataset.json> -o out.json            # Write to file
//!
//! The dataset is `{"columns": [...], "rows": [...], "config": {...}}`;
//! `config` is optional.

#![allow(clippy::exit)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::env;
use std::fs;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use xlgrid::grid::GroupSummary;
use xlgrid::{Column, Grid, GridConfig, Row};

const USAGE: &str =
    "Usage: xlgrid_cli <dataset.json> [--group a,b] [--sort c] [-o output.json]";

#[derive(Deserialize)]
struct Dataset {
    columns: Vec<Column>,
    rows: Vec<Row>,
    #[serde(default)]
    config: GridConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Output<'a> {
    row_count: usize,
    group_columns: &'a [String],
    sort_columns: &'a [String],
    /// Row ids in display order.
    order: Vec<String>,
    tree: GroupSummary,
}

fn split_ids(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("{USAGE}");
        std::process::exit(1);
    }

    let input_path = &args[1];
    let mut group = Vec::new();
    let mut sort = Vec::new();
    let mut output_path = None;
    let mut i = 2;
    while i < args.len() {
        let Some(value) = args.get(i + 1) else {
            eprintln!("Missing value for {}\n{USAGE}", args[i]);
            std::process::exit(1);
        };
        match args[i].as_str() {
            "--group" => group = split_ids(value),
            "--sort" => sort = split_ids(value),
            "-o" => output_path = Some(value.clone()),
            other => {
                eprintln!("Unknown argument {other}\n{USAGE}");
                std::process::exit(1);
            }
        }
        i += 2;
    }

    // Read input file
    let data = match fs::read_to_string(input_path) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading {}: {}", input_path, e);
            std::process::exit(1);
        }
    };

    let dataset: Dataset = match serde_json::from_str(&data) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error parsing dataset: {}", e);
            std::process::exit(1);
        }
    };

    let mut grid = match Grid::new(dataset.columns, dataset.rows, dataset.config) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error building grid: {}", e);
            std::process::exit(1);
        }
    };

    match grid.group_by_columns(&group) {
        Ok(true) => {}
        Ok(false) => eprintln!("Warning: grouping skipped, a column is not groupable"),
        Err(e) => {
            eprintln!("Error grouping: {}", e);
            std::process::exit(1);
        }
    }
    match grid.sort_by_columns(&sort) {
        Ok(true) => {}
        Ok(false) => eprintln!("Warning: sorting skipped, a column is not sortable"),
        Err(e) => {
            eprintln!("Error sorting: {}", e);
            std::process::exit(1);
        }
    }

    let output = Output {
        row_count: grid.row_count(),
        group_columns: grid.group_columns(),
        sort_columns: grid.sort_columns(),
        order: grid.root().items().to_vec(),
        tree: grid.group_summary(),
    };

    // Serialize to JSON
    let json = match serde_json::to_string_pretty(&output) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error serializing JSON: {}", e);
            std::process::exit(1);
        }
    };

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &json) {
                eprintln!("Error writing {}: {}", path, e);
                std::process::exit(1);
            }
            eprintln!("Written: {}", path);
        }
        None => {
            io::stdout().write_all(json.as_bytes()).unwrap();
            println!();
        }
    }
}
