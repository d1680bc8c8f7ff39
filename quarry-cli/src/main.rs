//! Quarry CLI
//!
//! Runs a chain of selection steps over an HTML document and prints what
//! the final selection holds.

mod step;

use std::io::{self, Read as _};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use quarry_dom::print_tree;
use quarry_query::{QueryOptions, Selection, UnionOrder, parse_document_with};
use tracing_subscriber::EnvFilter;

use step::Step;

/// Quarry: jQuery-style selections over HTML
#[derive(Parser, Debug)]
#[command(name = "quarry")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Text of every list item
    quarry -f page.html find=li --print text

    # Third paragraph's following siblings as markup
    quarry -f page.html find=p eq=2 next-all

    # Selected option values as JSON
    quarry --html '<select multiple><option selected>a</option></select>' find=select --print val --json

    # Read markup from stdin
    curl -s https://example.com | quarry find=a --attr href
"#)]
struct Cli {
    /// HTML file to read (stdin when neither this nor --html is given)
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Parse this HTML string instead of a file
    #[arg(long, value_name = "HTML", conflicts_with = "file")]
    html: Option<String>,

    /// Steps applied in order, each `op` or `op=argument`
    #[arg(value_name = "STEP")]
    steps: Vec<Step>,

    /// What to print for the final selection
    #[arg(short, long, value_enum, default_value_t = Output::Outer)]
    print: Output,

    /// Print this attribute of every node instead
    #[arg(long, value_name = "NAME")]
    attr: Option<String>,

    /// Emit JSON instead of plain lines
    #[arg(long)]
    json: bool,

    /// How `add` orders its union: append or document
    #[arg(long, default_value_t = UnionOrder::Append)]
    union_order: UnionOrder,

    /// Log each step to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Output modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Each node's markup including its own tags
    Outer,
    /// Each node's inner markup
    Inner,
    /// Each node's text content
    Text,
    /// Each node's form value
    Val,
    /// Form fields, URL-encoded
    Serialize,
    /// The number of nodes
    Count,
    /// An indented dump of each node's subtree
    Tree,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_markup(cli: &Cli) -> Result<String> {
    if let Some(ref html) = cli.html {
        return Ok(html.clone());
    }
    if let Some(ref path) = cli.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let mut markup = String::new();
    let _ = io::stdin()
        .read_to_string(&mut markup)
        .context("failed to read stdin")?;
    Ok(markup)
}

fn run_steps(root: Selection, steps: &[Step]) -> Result<Selection> {
    let mut selection = root;
    for step in steps {
        selection = step
            .apply(&selection)
            .with_context(|| format!("step {step} failed"))?;
        tracing::debug!(%step, nodes = selection.len(), "applied");
    }
    Ok(selection)
}

/// One string per node for the per-node output modes.
fn node_values(selection: &Selection, cli: &Cli) -> Vec<serde_json::Value> {
    selection.map(|_, node| {
        if let Some(ref name) = cli.attr {
            return node.attr(name).map_or(serde_json::Value::Null, Into::into);
        }
        match cli.print {
            Output::Inner => node.html().map_or(serde_json::Value::Null, Into::into),
            Output::Text => node.text().into(),
            Output::Val => serde_json::to_value(node.val()).unwrap_or_default(),
            _ => node.outer_html().map_or(serde_json::Value::Null, Into::into),
        }
    })
}

fn print_plain(values: &[serde_json::Value]) {
    for (index, value) in values.iter().enumerate() {
        let shown = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => "(none)".dimmed().to_string(),
            other => other.to_string(),
        };
        println!("{} {shown}", format!("[{index}]").cyan());
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let markup = read_markup(&cli)?;
    let options = QueryOptions::default().with_union_order(cli.union_order);
    let root = parse_document_with(&markup, options).context("failed to parse document")?;
    let selection = run_steps(root, &cli.steps)?;

    match cli.print {
        Output::Count if cli.attr.is_none() => {
            if cli.json {
                println!("{}", serde_json::json!({ "count": selection.len() }));
            } else {
                println!("{}", selection.len());
            }
        }
        Output::Serialize if cli.attr.is_none() => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&selection.serialize_array())?);
            } else {
                println!("{}", selection.serialize());
            }
        }
        Output::Tree if cli.attr.is_none() => {
            let tree = selection.document().tree();
            for &id in selection.nodes() {
                print_tree(tree, id, 0);
            }
        }
        _ => {
            let values = node_values(&selection, &cli);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&values)?);
            } else if values.is_empty() {
                eprintln!("{}", "no matching nodes".yellow());
            } else {
                print_plain(&values);
            }
        }
    }

    Ok(())
}
