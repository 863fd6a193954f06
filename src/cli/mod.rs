use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod handlers;
mod types;

pub use handlers::*;
pub use types::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Config directory. Defaults to $VQ_BASE_DIR or ~/.local/share/vq
    #[clap(long, global = true)]
    pub base_dir: Option<String>,

    /// Vault root, overrides `vault.path` from the config
    #[clap(long, global = true)]
    pub vault: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Filter notes with a boolean query,
    /// e.g. `tag:work AND NOT (path:archive/ OR created<2023-01-01)`
    Query {
        /// Query expression
        query: String,

        /// Join adjacent operands with AND
        #[clap(long, default_value = "false")]
        implicit_and: bool,

        /// Print the count
        #[clap(short = 'c', long, default_value = "false")]
        count: bool,
    },
    /// List notes
    Ls {
        /// Only notes inside this folder
        #[clap(short, long)]
        folder: Option<String>,
    },
    /// List every folder in the vault
    Folders {},
    /// Suggest file paths for a partial name
    Suggest {
        #[clap(default_value = "")]
        text: String,

        /// Only paths starting with this prefix
        #[clap(short, long)]
        folder: Option<String>,

        #[clap(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Open today's daily note, creating it from the template if missing
    Daily {
        /// YYYY-MM-DD, defaults to today
        #[clap(short, long)]
        date: Option<NaiveDate>,
    },
    /// Days of the current week and whether they have a daily note
    Week {
        /// Any day of the week, defaults to today
        #[clap(short, long)]
        date: Option<NaiveDate>,
    },
    /// Print the daily quote
    Quote {},
    /// Custom widgets
    Widget {
        #[clap(subcommand)]
        action: WidgetArgs,
    },
    /// Print the effective config
    Config {},
}
