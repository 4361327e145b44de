use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tgmemo::{Action, Config, FormattedText, OffsetUnit, Update};

/// Per-sender notes endpoint, suffixed with the sender's id
const USER_ENDPOINT_VAR: &str = "MEMOS_OPENAPI_";

#[derive(Parser)]
#[command(name = "tgmemo")]
#[command(version, about = "Turn chat messages into markdown memos")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert an update payload (JSON) into memo content
    Convert {
        /// Update JSON file, stdin when omitted or "-"
        input: Option<PathBuf>,

        /// Config file (defaults to tgmemo.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Line placed before the memo body
        #[arg(long, env = "MEMO_PREFIX")]
        prefix: Option<String>,

        /// Line placed after the memo body
        #[arg(long, env = "MEMO_SUFFIX")]
        suffix: Option<String>,

        /// Print the planned action as JSON instead of the content
        #[arg(long)]
        json: bool,
    },

    /// Render text plus entities (JSON) as markdown
    Format {
        /// FormattedText JSON file, stdin when omitted or "-"
        input: Option<PathBuf>,

        /// Unit the entity offsets count in
        #[arg(short, long, value_enum, default_value_t = OffsetUnit::Utf16)]
        unit: OffsetUnit,
    },

    /// Parse markdown into text plus entities (JSON)
    Parse {
        /// Markdown file, stdin when omitted or "-"
        input: Option<PathBuf>,

        /// Unit the entity offsets count in
        #[arg(short, long, value_enum, default_value_t = OffsetUnit::Utf16)]
        unit: OffsetUnit,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> tgmemo::Result<()> {
    match command {
        Command::Convert {
            input,
            config,
            prefix,
            suffix,
            json,
        } => {
            let mut config = match config {
                Some(path) => Config::from_toml(&fs::read_to_string(path)?)?,
                None => Config::load(Path::new("tgmemo.toml")),
            };
            if prefix.is_some() {
                config.memo.prefix = prefix;
            }
            if suffix.is_some() {
                config.memo.suffix = suffix;
            }
            for (key, endpoint) in std::env::vars() {
                if let Some(user_id) = key.strip_prefix(USER_ENDPOINT_VAR) {
                    config.users.insert(user_id.to_string(), endpoint);
                }
            }

            let update: Update = serde_json::from_str(&read_input(input.as_deref())?)?;
            let Some(action) = tgmemo::plan_update_with_config(&update, &config)? else {
                tracing::info!(update_id = ?update.update_id, "update carries no message");
                return Ok(());
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&action)?);
            } else {
                match action {
                    Action::Greet => println!("Hello World!"),
                    Action::NotRegistered { user_id } => {
                        eprintln!("user {user_id} is not registered");
                        println!("You are not a user.");
                    }
                    Action::Ignore => {}
                    Action::Memo(draft) => {
                        println!("{}", draft.content);
                        if let Some(attachment) = draft.attachment {
                            eprintln!(
                                "attachment: {} ({}, {} bytes)",
                                attachment.file_name, attachment.mime_type, attachment.file_size
                            );
                        }
                    }
                }
            }
        }
        Command::Format { input, unit } => {
            let formatted: FormattedText = serde_json::from_str(&read_input(input.as_deref())?)?;
            let markdown =
                tgmemo::to_markdown_with_unit(&formatted.text, &formatted.entities, unit)?;
            println!("{markdown}");
        }
        Command::Parse { input, unit } => {
            let markdown = read_input(input.as_deref())?;
            let formatted = tgmemo::markdown_to_entities_with_unit(&markdown, unit);
            println!("{}", serde_json::to_string_pretty(&formatted)?);
        }
    }

    Ok(())
}

/// Read a file, or stdin for `None` and `-`.
fn read_input(path: Option<&Path>) -> io::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => fs::read_to_string(path),
        _ => {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}
