use std::path::PathBuf;

/// A line of user input in the interactive session.
///
/// Lines starting with `/` are commands, everything else is a question about
/// the loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A question to answer from the loaded dataset.
    Message(String),
    /// Load (or replace) the dataset from a file: `/load <path>`.
    Load(PathBuf),
    /// Print the columns of the loaded dataset.
    Schema,
    /// Print the conversation so far.
    History,
    /// Forget the conversation so far. The dataset stays loaded.
    Clear,
    Help,
    /// Exit the application without any further action.
    Exit,
}

impl Command {
    /// Returns a list of all available command strings.
    pub fn available_commands() -> Vec<String> {
        vec![
            "/load <path>".to_string(),
            "/schema".to_string(),
            "/history".to_string(),
            "/clear".to_string(),
            "/help".to_string(),
            "/exit".to_string(),
        ]
    }

    /// Parses one line of input. Unknown commands are treated as questions.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();

        if let Some(path) = trimmed.strip_prefix("/load ") {
            let path = path.trim();
            if !path.is_empty() {
                return Command::Load(PathBuf::from(path));
            }
        }

        match trimmed {
            "/schema" => Command::Schema,
            "/history" => Command::History,
            "/clear" => Command::Clear,
            "/help" => Command::Help,
            "/exit" | "/quit" => Command::Exit,
            text => Command::Message(text.to_string()),
        }
    }
}
