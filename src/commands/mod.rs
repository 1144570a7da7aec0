// Console command layer
pub mod auth;
pub mod markets;
pub mod reviews;
pub mod table;

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::core::QueryError;
use crate::models::{CommandArgs, SessionUser};
use crate::services::{AccountError, MarketCatalog, ReviewError, ReviewStore, UserStore};

/// Everything a command handler may read or change
#[derive(Debug)]
pub struct AppState {
    pub catalog: MarketCatalog,
    pub users: UserStore,
    pub reviews: ReviewStore,
    pub session: Option<SessionUser>,
    pub default_page_size: usize,
}

impl AppState {
    pub fn new(catalog: MarketCatalog, users: UserStore, reviews: ReviewStore, default_page_size: usize) -> Self {
        Self {
            catalog,
            users,
            reviews,
            session: None,
            default_page_size: default_page_size.max(1),
        }
    }
}

/// Errors reported back to the user; none of them ends the session
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Review(#[from] ReviewError),

    #[error("Ошибка: для {0} нужно войти в аккаунт.")]
    Unauthenticated(&'static str),

    #[error("Вы не авторизованы.")]
    NotLoggedIn,

    #[error("Ошибка: некорректный ввод. Проверьте кавычки.")]
    InvalidInput,

    #[error("Неизвестная команда. Введите: help")]
    UnknownCommand(String),
}

type Handler = fn(&mut AppState, &CommandArgs) -> Result<String, CommandError>;

pub const HELP: &str = r#"
Farmers Markets CLI

Формат ввода:
  команда key=value key=value
  Значения с пробелами берите в кавычки:
  review_add market=1009994 rating=5 text="Очень хороший рынок"

Общие команды:
  help                     эта справка
  exit | quit | q          выход

Аккаунт:
  register email=... login=... password=... [first=...] [last=...]
  login login=... password=...
  logout

Рынки:
  list [page=N] [size=N] [sort=name|city|state|rating|distance]
       [order=asc|desc] [center=lat,lon]
  search [city=...] [state=...] [zip=...] [name=...]
         [radius=N] [center=lat,lon] [page=N] [size=N]
         [sort=name|city|state|rating|distance] [order=asc|desc]
  show id=N

Отзывы:
  reviews market=N
  review_add market=N rating=1..5 [text="..."]   (нужен вход)
  review_delete id=N                              (только свои отзывы)

Примечания:
  - sort=distance и radius требуют center=lat,lon
  - name ищется по вхождению подстроки
  - city, state и zip сравниваются на точное совпадение
  - при sort=rating рынки без отзывов всегда в конце списка"#;

fn help(_state: &mut AppState, _args: &CommandArgs) -> Result<String, CommandError> {
    Ok(HELP.to_string())
}

fn handler(command: &str) -> Option<Handler> {
    let handler: Handler = match command {
        "help" => help,
        "register" => auth::register,
        "login" => auth::login,
        "logout" => auth::logout,
        "list" => markets::list,
        "search" => markets::search,
        "show" => markets::show,
        "reviews" => reviews::list,
        "review_add" => reviews::add,
        "review_delete" => reviews::delete,
        _ => return None,
    };
    Some(handler)
}

/// Split a console line into a lowercased command and its `key=value` arguments
///
/// Returns `Ok(None)` for a blank line. Tokens without `=` are ignored.
pub fn parse_line(line: &str) -> Result<Option<(String, CommandArgs)>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let parts = shell_words::split(line).map_err(|_| CommandError::InvalidInput)?;
    let Some((command, rest)) = parts.split_first() else {
        return Ok(None);
    };

    let args = rest
        .iter()
        .filter_map(|token| token.split_once('='))
        .map(|(key, value)| (key.trim().to_lowercase(), value.trim().to_string()))
        .collect();

    Ok(Some((command.to_lowercase(), args)))
}

/// Run one command against the application state
pub fn dispatch(state: &mut AppState, command: &str, args: &CommandArgs) -> Result<String, CommandError> {
    let handler = handler(command).ok_or_else(|| CommandError::UnknownCommand(command.to_string()))?;
    handler(state, args)
}

fn is_exit(command: &str) -> bool {
    matches!(command, "exit" | "quit" | "q")
}

/// Read-eval-print loop; returns on `exit` or end of input
pub fn run_repl<R: BufRead, W: Write>(state: &mut AppState, mut input: R, mut output: W) -> io::Result<()> {
    loop {
        write!(output, "\n> ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output, "\nВыход.")?;
            return Ok(());
        }

        let (command, args) = match parse_line(&line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => continue,
            Err(e) => {
                writeln!(output, "{e}")?;
                continue;
            }
        };

        if is_exit(&command) {
            writeln!(output, "Выход.")?;
            return Ok(());
        }

        match dispatch(state, &command, &args) {
            Ok(text) => writeln!(output, "{text}")?,
            Err(e) => {
                tracing::debug!("Command {} rejected: {:?}", command, e);
                writeln!(output, "{e}")?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_quotes_and_case() {
        let (command, args) = parse_line(r#"Review_Add Market=12 rating=5 text="Очень хороший рынок" stray"#)
            .unwrap()
            .unwrap();

        assert_eq!(command, "review_add");
        assert_eq!(args.get("market").map(String::as_str), Some("12"));
        assert_eq!(args.get("text").map(String::as_str), Some("Очень хороший рынок"));
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn test_parse_line_keeps_equals_in_value() {
        let (_, args) = parse_line("login login=ivan password=a=b").unwrap().unwrap();
        assert_eq!(args.get("password").map(String::as_str), Some("a=b"));
    }

    #[test]
    fn test_parse_line_blank_and_bad_quotes() {
        assert!(parse_line("   ").unwrap().is_none());
        assert!(matches!(parse_line(r#"search name="oak"#), Err(CommandError::InvalidInput)));
    }

    #[test]
    fn test_exit_aliases() {
        assert!(is_exit("exit") && is_exit("quit") && is_exit("q"));
        assert!(!is_exit("logout"));
    }
}
