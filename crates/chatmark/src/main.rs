use crate::prelude::*;
use clap::Parser;

mod convert;
mod dialects;
mod error;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Convert Markdown into the markup dialects of WhatsApp, Telegram and plain text"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Whether to display additional information.
    #[clap(long, env = "CHATMARK_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Convert Markdown from a file or stdin into a chat dialect
    Convert(crate::convert::App),

    /// Show how each dialect renders Markdown constructs
    Dialects(crate::dialects::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Convert(sub_app) => crate::convert::run(sub_app, app.global).await,
        SubCommands::Dialects(sub_app) => crate::dialects::run(sub_app, app.global).await,
    }
}
