use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use serde::Serialize;

use chatmark_core::transcode::rules::{CodeBlockStyle, InlineCodeStyle, LinkStyle, OrderedStyle};
use chatmark_core::transcode::{Dialect, DialectRules};

#[derive(Debug, clap::Parser)]
#[command(name = "dialects")]
#[command(about = "Show how each dialect renders Markdown constructs")]
pub struct App {
    /// Only show this dialect (whatsapp, plaintext, telegram)
    pub name: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct DialectSummary {
    dialect: Dialect,
    rules: &'static DialectRules,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let dialects = select_dialects(app.name.as_deref())?;

    if global.verbose {
        eprintln!("Showing {} dialect(s)", dialects.len());
    }

    if app.json {
        let summaries: Vec<_> = dialects
            .iter()
            .map(|&dialect| DialectSummary {
                dialect,
                rules: dialect.rules(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        build_table(&dialects).printstd();
    }

    Ok(())
}

fn select_dialects(name: Option<&str>) -> Result<Vec<Dialect>> {
    match name {
        None => Ok(Dialect::ALL.to_vec()),
        Some(name) => {
            let dialect = name
                .parse::<Dialect>()
                .map_err(|e| Error::UnknownDialect(e.to_string()))?;
            Ok(vec![dialect])
        }
    }
}

/// Sample rendering of each construct, in rewrite order.
fn describe(rules: &DialectRules) -> Vec<(&'static str, String)> {
    vec![
        ("Bold", rules.bold.apply("text")),
        ("Italic", rules.italic.apply("text")),
        (
            "Strikethrough",
            rules
                .strikethrough
                .map(|wrap| wrap.apply("text"))
                .unwrap_or_else(|| "~~text~~".to_string()),
        ),
        ("Heading", rules.bold.apply("Title")),
        ("Blockquote", format!("{}quote", rules.quote_prefix)),
        (
            "Link",
            match rules.link {
                LinkStyle::Inline => "label (url)".to_string(),
                LinkStyle::Passthrough => "[label](url)".to_string(),
            },
        ),
        ("List item", format!("{}item", rules.bullet)),
        (
            "Numbered item",
            match rules.ordered {
                OrderedStyle::Dot => "1. item".to_string(),
                OrderedStyle::Paren => "1) item".to_string(),
            },
        ),
        ("Rule", rules.horizontal_rule.to_string()),
        ("Table row", format!("a{}b", rules.table_separator)),
        (
            "Inline code",
            match rules.inline_code {
                InlineCodeStyle::Verbatim => "`code`".to_string(),
                InlineCodeStyle::Bare => "code".to_string(),
            },
        ),
        (
            "Code block",
            match rules.code_block {
                CodeBlockStyle::Fenced {
                    keep_language: true,
                } => "```lang … ```".to_string(),
                CodeBlockStyle::Fenced {
                    keep_language: false,
                } => "``` … ```".to_string(),
                CodeBlockStyle::Bracketed => "[CODE: LANG] … [END CODE]".to_string(),
            },
        ),
    ]
}

fn build_table(dialects: &[Dialect]) -> prettytable::Table {
    let mut table = new_table();

    let mut titles = vec![prettytable::Cell::new(&"Construct".bold().cyan().to_string())];
    titles.extend(
        dialects
            .iter()
            .map(|d| prettytable::Cell::new(&d.rules().name.bold().cyan().to_string())),
    );
    table.add_row(prettytable::Row::new(titles));

    let columns: Vec<_> = dialects.iter().map(|d| describe(d.rules())).collect();
    let constructs = columns.first().map(Vec::len).unwrap_or(0);

    for i in 0..constructs {
        let label = columns[0][i].0;
        let mut cells = vec![prettytable::Cell::new(&label.green().to_string())];
        cells.extend(columns.iter().map(|column| prettytable::Cell::new(&column[i].1)));
        table.add_row(prettytable::Row::new(cells));
    }

    table
}
