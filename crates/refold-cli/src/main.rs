use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use refold_core::{convert_program, Conversion, Node, PassConfig};

#[derive(Parser)]
#[command(name = "refold", about = "Imperative-to-functional block converter")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a JSON-serialized imperative AST into functional source text.
    Convert {
        /// Path to the JSON AST file: one block, or an array of top-level
        /// nodes whose blocks are each converted independently.
        file: PathBuf,
        /// Render 1:1, with every simplification pass disabled.
        #[arg(long)]
        unoptimized: bool,
        /// Print both the optimized and the unoptimized rendering of each
        /// block.
        #[arg(long)]
        both: bool,
        /// Simplification passes to skip on top of the default
        /// (e.g. "dead-store-elision", "constant-inlining").
        #[arg(long = "skip-pass")]
        skip_passes: Vec<String>,
    },
    /// Parse a JSON AST file and pretty-print the node tree.
    PrintAst {
        /// Path to the JSON AST file.
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Convert {
            file,
            unoptimized,
            both,
            skip_passes,
        } => {
            let skip: Vec<&str> = skip_passes.iter().map(String::as_str).collect();
            let config = if unoptimized {
                PassConfig::disabled()
            } else {
                PassConfig::from_skip_list(&skip)
            };
            let nodes = load_nodes(&file)?;
            let conversions = convert_program(&nodes, &config)
                .with_context(|| format!("failed to convert {}", file.display()))?;
            let literal = if both {
                Some(convert_program(&nodes, &PassConfig::disabled())?)
            } else {
                None
            };
            for (index, conversion) in conversions.iter().enumerate() {
                if both {
                    println!("optimized function: ");
                }
                print_conversion(conversion);
                if let Some(literal) = &literal {
                    println!("unoptimized function: ");
                    print_conversion(&literal[index]);
                }
            }
        }
        Command::PrintAst { file } => {
            for node in load_nodes(&file)? {
                println!("{node:#?}");
            }
        }
    }
    Ok(())
}

fn print_conversion(conversion: &Conversion) {
    for diagnostic in &conversion.diagnostics {
        eprintln!("warning: {diagnostic}");
    }
    println!("{}\n", conversion.text);
}

/// Load the translation unit: a JSON array is a list of top-level nodes, a
/// single object is one block.
fn load_nodes(path: &Path) -> Result<Vec<Node>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("invalid JSON in {}", path.display()))?;
    let nodes = if value.is_array() {
        serde_json::from_value(value)
            .with_context(|| format!("invalid AST in {}", path.display()))?
    } else {
        let node: Node = serde_json::from_value(value)
            .with_context(|| format!("invalid AST in {}", path.display()))?;
        match node {
            Node::Block(_) => vec![node],
            other => vec![Node::Block(vec![other])],
        }
    };
    Ok(nodes)
}
