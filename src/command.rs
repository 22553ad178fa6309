use crate::grade::{Grade, GradeError};
use crate::row::{Credits, RowKey, RowPatch};
use crate::store::Action;
use thiserror::Error;

/// One line typed at the terminal prompt.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Add,
    Delete(RowKey),
    Rename(RowKey, String),
    Credits(RowKey, Credits),
    Grade(RowKey, Grade),
    Clear,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid row key '{0}'")]
    BadKey(String),
    #[error(transparent)]
    Grade(#[from] GradeError),
}

pub const HELP: &str = "\
Commands:
  add                    Add a row
  del <key>              Delete a row
  name <key> <text>      Rename a course
  credits <key> <text>   Set the credits of a course
  grade <key> <grade>    Set a grade (O, A+, A, B+, B, C+, F or its points)
  clear                  Remove every row
  show                   Print the table
  help                   Show this help
  q                      Quit";

impl Command {
    /// Parse one prompt line
    ///
    /// # Arguments
    /// * `line` - Text as typed; surrounding whitespace is ignored
    ///
    /// # Returns
    /// * `Ok(Command)` for a known command with valid arguments
    /// * `Err(CommandError)` describing what was wrong otherwise
    ///
    /// # Examples
    /// ```
    /// use cgpa::command::Command;
    /// use cgpa::{Grade, RowKey};
    ///
    /// let cmd = Command::parse("grade 2 A+").unwrap();
    /// assert_eq!(cmd, Command::Grade(RowKey(2), Grade::APlus));
    /// ```
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "" => Err(CommandError::Empty),
            "add" => Ok(Command::Add),
            "clear" => Ok(Command::Clear),
            "show" => Ok(Command::Show),
            "help" => Ok(Command::Help),
            "q" | "quit" => Ok(Command::Quit),
            "del" => {
                let key = parse_key(rest, "del <key>")?;
                Ok(Command::Delete(key))
            }
            "name" => {
                let (key, text) = split_key(rest, "name <key> <text>")?;
                Ok(Command::Rename(key, text.to_string()))
            }
            "credits" => {
                let (key, text) = split_key(rest, "credits <key> <text>")?;
                Ok(Command::Credits(key, Credits::new(text)))
            }
            "grade" => {
                let (key, text) = split_key(rest, "grade <key> <grade>")?;
                Ok(Command::Grade(key, parse_grade(text)?))
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }

    /// The store mutation this command stands for, if any.
    pub fn into_action(self) -> Option<Action> {
        match self {
            Command::Add => Some(Action::AddRow),
            Command::Delete(key) => Some(Action::DeleteRow(key)),
            Command::Rename(key, course) => Some(Action::EditRow(key, RowPatch::course(course))),
            Command::Credits(key, credits) => Some(Action::EditRow(key, RowPatch::credits(credits))),
            Command::Grade(key, grade) => Some(Action::SetGrade(key, grade)),
            Command::Clear => Some(Action::ClearAll),
            Command::Show | Command::Help | Command::Quit => None,
        }
    }
}

fn parse_key(text: &str, usage: &'static str) -> Result<RowKey, CommandError> {
    if text.is_empty() {
        return Err(CommandError::Usage(usage));
    }
    text.parse::<u64>()
        .map(RowKey)
        .map_err(|_| CommandError::BadKey(text.to_string()))
}

fn split_key<'a>(rest: &'a str, usage: &'static str) -> Result<(RowKey, &'a str), CommandError> {
    let (key, text) = rest
        .split_once(char::is_whitespace)
        .ok_or(CommandError::Usage(usage))?;
    Ok((parse_key(key, usage)?, text.trim()))
}

// Grades may be typed as a label or as their point value.
fn parse_grade(text: &str) -> Result<Grade, GradeError> {
    match text.parse::<u64>() {
        Ok(points) => u8::try_from(points)
            .ok()
            .and_then(Grade::from_points)
            .ok_or(GradeError::UnknownPoints(points)),
        Err(_) => text.parse(),
    }
}
