use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

// Import the pure transcoder from core
use chatmark_core::transcode::{transcode, Dialect};

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum DialectArg {
    /// WhatsApp markup (*bold*, _italic_, ~strike~)
    #[value(alias = "wa")]
    Whatsapp,
    /// Plain text with all markup removed
    #[value(aliases = ["plain", "text"])]
    Plaintext,
    /// Telegram markup (**bold**, _italic_, [links](url))
    #[value(alias = "tg")]
    Telegram,
}

impl From<DialectArg> for Dialect {
    fn from(d: DialectArg) -> Self {
        match d {
            DialectArg::Whatsapp => Dialect::WhatsApp,
            DialectArg::Plaintext => Dialect::PlainText,
            DialectArg::Telegram => Dialect::Telegram,
        }
    }
}

#[derive(Debug, Clone, clap::Parser)]
#[command(name = "convert")]
#[command(about = "Convert Markdown from a file or stdin into a chat dialect")]
pub struct App {
    /// Markdown file to convert (reads stdin when omitted or "-")
    #[clap(env = "CHATMARK_INPUT")]
    pub input: Option<PathBuf>,

    /// Target dialect (default: whatsapp)
    #[arg(short, long, env = "CHATMARK_DIALECT", default_value = "whatsapp")]
    pub to: DialectArg,

    /// Convert into every dialect
    #[arg(long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ConvertOutput {
    pub dialect: Dialect,
    pub content: String,
    pub input_characters: usize,
    pub output_characters: usize,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    let markdown = read_input(app.input.as_deref())?;

    if global.verbose {
        eprintln!(
            "Read {} characters from {}",
            markdown.chars().count(),
            input_label(app.input.as_deref())
        );
    }

    let dialects = if app.all {
        Dialect::ALL.to_vec()
    } else {
        vec![app.to.clone().into()]
    };

    let outputs = convert_all(markdown, &dialects).await?;

    if app.json {
        output_json(&outputs, app.all)?;
    } else {
        output_formatted(&outputs);
    }

    Ok(())
}

/// Convert one input into each dialect concurrently.
///
/// Conversions share nothing but the immutable input, so each one runs on
/// its own blocking task. Results keep the order of `dialects`.
pub async fn convert_all(markdown: String, dialects: &[Dialect]) -> Result<Vec<ConvertOutput>> {
    let markdown = Arc::new(markdown);

    let tasks = dialects.iter().copied().map(|dialect| {
        let markdown = Arc::clone(&markdown);
        tokio::task::spawn_blocking(move || convert_data(dialect, &markdown))
    });

    futures::future::try_join_all(tasks)
        .await
        .map_err(|e| eyre!("Conversion task failed: {e}"))
}

/// Public function for reuse - convert Markdown into a single dialect
pub fn convert_data(dialect: Dialect, markdown: &str) -> ConvertOutput {
    let start = Instant::now();
    let content = transcode(dialect, markdown);

    log::debug!(
        "converted {} bytes to {dialect} in {:?}",
        markdown.len(),
        start.elapsed()
    );

    ConvertOutput {
        dialect,
        input_characters: markdown.chars().count(),
        output_characters: content.chars().count(),
        content,
    }
}

/// Read Markdown from `path`, or from stdin when `path` is `None` or `-`.
fn read_input(path: Option<&Path>) -> Result<String> {
    let bytes = match path {
        Some(path) if path != Path::new("-") => std::fs::read(path)
            .map_err(|e| Error::Io(format!("{}: {e}", path.display())))?,
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|e| Error::Io(format!("<stdin>: {e}")))?;
            buf
        }
    };

    Ok(decode_input(bytes)?)
}

fn decode_input(bytes: Vec<u8>) -> std::result::Result<String, Error> {
    String::from_utf8(bytes).map_err(|e| Error::InvalidUtf8(e.utf8_error().to_string()))
}

fn input_label(path: Option<&Path>) -> String {
    match path {
        Some(path) if path != Path::new("-") => path.display().to_string(),
        _ => "<stdin>".to_string(),
    }
}

fn output_json(outputs: &[ConvertOutput], all: bool) -> Result<()> {
    let json = match outputs {
        [single] if !all => serde_json::to_string_pretty(single)?,
        _ => serde_json::to_string_pretty(outputs)?,
    };
    println!("{}", json);
    Ok(())
}

/// Join converted outputs for piping; several dialects get a heading each.
fn format_plain(outputs: &[ConvertOutput]) -> String {
    match outputs {
        [single] => single.content.clone(),
        _ => outputs
            .iter()
            .map(|output| format!("--- {} ---\n{}", output.dialect, output.content))
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

fn output_formatted(outputs: &[ConvertOutput]) {
    // Check if stdout is a TTY (terminal) or being piped
    let is_tty = std::io::stdout().is_terminal();

    if !is_tty {
        println!("{}", format_plain(outputs));
        return;
    }

    for output in outputs {
        // Header on stderr, content on stdout
        eprintln!("\n{}", "=".repeat(80).bright_cyan());
        eprintln!(
            "{}",
            output
                .dialect
                .rules()
                .name
                .to_uppercase()
                .bright_cyan()
                .bold()
        );
        eprintln!("{}", "=".repeat(80).bright_cyan());
        eprintln!(
            "{}: {} -> {}\n",
            "Characters".green(),
            output.input_characters.to_string().bright_yellow(),
            output.output_characters.to_string().bright_yellow().bold()
        );

        println!("{}", output.content);
    }
}
