use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use datachat_app::{ChatSession, DataChat};
use datachat_domain::{OracleService, Speaker};
use datachat_infra::load_records;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::{Cli, Command};

const PROMPT: &str = "datachat> ";

/// Interactive front end over one chat session.
pub struct UI<S> {
    cli: Cli,
    chat: DataChat<S>,
    session: ChatSession,
}

impl<S: OracleService> UI<S> {
    pub fn new(cli: Cli, chat: DataChat<S>) -> Self {
        Self { cli, chat, session: ChatSession::new() }
    }

    /// Loads the `--data` file, then either answers `--prompt` once or reads
    /// questions until `/exit` or end of input.
    pub async fn run(&mut self) -> Result<()> {
        if let Some(path) = self.cli.data.clone() {
            let loaded = self.load(&path);
            if self.cli.prompt.is_some() {
                loaded?;
            } else if let Err(err) = loaded {
                print_error(&err);
            }
        }

        if let Some(prompt) = self.cli.prompt.clone() {
            let answer = self.session.ask(&self.chat, &prompt).await?;
            println!("{answer}");
            return Ok(());
        }

        self.run_interactive().await
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new()?;
        println!(
            "{} Ask a question about your data, or type {} for commands.",
            "datachat".bold(),
            "/help".cyan()
        );

        loop {
            let line = match editor.readline(PROMPT) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            };
            if line.trim().is_empty() {
                continue;
            }
            editor.add_history_entry(line.as_str())?;

            match Command::parse(&line) {
                Command::Exit => break,
                command => {
                    if let Err(err) = self.handle(command).await {
                        print_error(&err);
                    }
                }
            }
        }

        Ok(())
    }

    async fn handle(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Message(question) => {
                let answer = self.session.ask(&self.chat, &question).await?;
                println!("{answer}");
            }
            Command::Load(path) => self.load(&path)?,
            Command::Schema => match self.session.table() {
                Some(table) => println!("{}", table.schema()),
                None => println!("{}", "No dataset loaded. Use /load <path>.".yellow()),
            },
            Command::History => {
                for turn in self.session.history().turns() {
                    let speaker = match turn.speaker {
                        Speaker::User => turn.speaker.to_string().green().bold(),
                        Speaker::Bot => turn.speaker.to_string().blue().bold(),
                    };
                    println!("{speaker}: {}", turn.text);
                }
            }
            Command::Clear => {
                self.session.clear();
                println!("{}", "Conversation cleared.".dimmed());
            }
            Command::Help => {
                for command in Command::available_commands() {
                    println!("  {}", command.cyan());
                }
            }
            Command::Exit => {}
        }
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let records = load_records(path)?;
        debug!(path = %path.display(), "Loading dataset");
        let table = self.session.load(&self.chat, &records)?;
        println!(
            "{} {} rows, columns: {}",
            "Loaded".green().bold(),
            table.row_count(),
            table.schema().column_names().join(", ")
        );
        Ok(())
    }
}

fn print_error(err: &anyhow::Error) {
    eprintln!("{} {err:#}", "ERROR:".red().bold());
}
