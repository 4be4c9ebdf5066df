//! Line commands typed at the prompt.

use std::str::FromStr;

use chess::{Coord, MoveNotation, PromotionKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Click(Coord),
    /// Shorthand for two clicks; a promotion suffix answers the picker too.
    Move(MoveNotation),
    Promote(PromotionKind),
    Say(String),
    Board,
    History,
    Reload,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("unknown command: {0} (type `help`)")]
    Unknown(String),

    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),

    #[error("not a square: {0}")]
    BadSquare(String),

    #[error("not a move: {0}")]
    BadMove(String),

    #[error("promote to one of q, r, n, b (got {0})")]
    BadPromotion(String),
}

impl FromStr for InputCommand {
    type Err = InputError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let arg = |name: &'static str| {
            if rest.is_empty() {
                Err(InputError::MissingArgument(name))
            } else {
                Ok(rest)
            }
        };

        match word.to_ascii_lowercase().as_str() {
            "click" => {
                let square = arg("click")?;
                square
                    .parse()
                    .map(InputCommand::Click)
                    .map_err(|_| InputError::BadSquare(square.to_string()))
            }
            "move" => {
                let mv = arg("move")?;
                mv.parse()
                    .map(InputCommand::Move)
                    .map_err(|_| InputError::BadMove(mv.to_string()))
            }
            "promote" => {
                let kind = arg("promote")?;
                let mut chars = kind.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => PromotionKind::from_suffix(c)
                        .map(InputCommand::Promote)
                        .ok_or_else(|| InputError::BadPromotion(kind.to_string())),
                    _ => Err(InputError::BadPromotion(kind.to_string())),
                }
            }
            "say" => Ok(InputCommand::Say(arg("say")?.to_string())),
            "board" => Ok(InputCommand::Board),
            "history" => Ok(InputCommand::History),
            "reload" => Ok(InputCommand::Reload),
            "help" | "?" => Ok(InputCommand::Help),
            "quit" | "exit" => Ok(InputCommand::Quit),
            _ => Err(InputError::Unknown(word.to_string())),
        }
    }
}

pub const HELP: &str = "\
commands:
  click <square>     select a piece or a destination (e.g. click e2)
  move <uci>         two clicks at once (e.g. move e2e4, move e7e8q)
  promote q|r|n|b    answer a pending promotion
  say <text>         send a chat message
  board              show the board
  history            show the moves played
  reload             fetch the game from the server
  quit               leave";
