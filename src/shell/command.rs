//! Parsing satu baris input menjadi command.
//!
//! Baris dipecah seperti shell (tanda kutip dihormati), lalu di-parse clap
//! dengan flag yang sama seperti mode CLI.

use clap::{CommandFactory, Parser};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("unterminated {0} quote")]
    UnterminatedQuote(char),

    #[error("{}", render_usage_error(.0))]
    Usage(#[from] clap::Error),

    #[error("please provide either --encode or --decode flag")]
    MissingCommand,
}

/// Flags accepted on one interactive line.
#[derive(Parser, Debug, Default, PartialEq, Eq)]
#[command(name = "UTF-8", no_binary_name = true, disable_version_flag = true)]
pub struct LineArgs {
    /// The string to be UTF-8 encoded
    #[arg(long, value_name = "TEXT")]
    pub encode: Option<String>,

    /// A comma-separated string of hexadecimal byte values to be UTF-8 decoded (e.g., F0,9F,98,8A)
    #[arg(long, value_name = "HEX")]
    pub decode: Option<String>,

    /// A comma-separated string of hexadecimal code points to encode (e.g., 41,20AC,1F600)
    #[arg(long = "codepoints", value_name = "HEX")]
    pub code_points: Option<String>,
}

/// What one line asks for. `--encode` wins over `--decode`, which wins over
/// `--codepoints`. Empty values count as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Encode(String),
    Decode(String),
    EncodeCodePoints(String),
    Help(String),
    Exit,
}

impl Command {
    pub fn parse_line(line: &str) -> Result<Self, ShellError> {
        let trimmed = line.trim();
        match trimmed {
            "exit" | "quit" => return Ok(Self::Exit),
            "help" => return Ok(Self::Help(usage())),
            _ => {}
        }

        let tokens = split_args(trimmed)?;
        let args = match LineArgs::try_parse_from(tokens) {
            Ok(args) => args,
            Err(e) if e.kind() == clap::error::ErrorKind::DisplayHelp => {
                return Ok(Self::Help(e.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
        if let Some(text) = non_empty(args.encode) {
            Ok(Self::Encode(text))
        } else if let Some(hex) = non_empty(args.decode) {
            Ok(Self::Decode(hex))
        } else if let Some(hex) = non_empty(args.code_points) {
            Ok(Self::EncodeCodePoints(hex))
        } else {
            Err(ShellError::MissingCommand)
        }
    }
}

fn render_usage_error(e: &clap::Error) -> String {
    e.to_string().trim_end().to_string()
}

pub fn usage() -> String {
    LineArgs::command().render_help().to_string()
}

/// Split a line on whitespace. Single and double quotes group, and inside
/// double quotes `\"` and `\\` are escapes.
pub fn split_args(line: &str) -> Result<Vec<String>, ShellError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            '\'' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(ShellError::UnterminatedQuote('\'')),
                    }
                }
            }
            '"' => {
                in_token = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            }
                            None => return Err(ShellError::UnterminatedQuote('"')),
                        },
                        Some(c) => current.push(c),
                        None => return Err(ShellError::UnterminatedQuote('"')),
                    }
                }
            }
            c => {
                in_token = true;
                current.push(c);
            }
        }
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_plain() {
        assert_eq!(
            split_args("--decode=48,65  --x").unwrap(),
            vec!["--decode=48,65", "--x"]
        );
        assert!(split_args("   ").unwrap().is_empty());
    }

    #[test]
    fn test_split_quotes() {
        assert_eq!(
            split_args(r#"--encode="Hello World""#).unwrap(),
            vec!["--encode=Hello World"]
        );
        assert_eq!(
            split_args(r#"--encode 'it"s' "a\"b""#).unwrap(),
            vec!["--encode", "it\"s", "a\"b"]
        );
        assert_eq!(split_args(r#"--encode="""#).unwrap(), vec!["--encode="]);
    }

    #[test]
    fn test_split_unterminated() {
        assert!(matches!(
            split_args("--encode=\"abc"),
            Err(ShellError::UnterminatedQuote('"'))
        ));
    }

    #[test]
    fn test_parse_line_commands() {
        assert_eq!(
            Command::parse_line(r#"--encode="Héllo €""#).unwrap(),
            Command::Encode("Héllo €".into())
        );
        assert_eq!(
            Command::parse_line("--decode=F0,9F,98,8A").unwrap(),
            Command::Decode("F0,9F,98,8A".into())
        );
        assert_eq!(
            Command::parse_line("--decode 48").unwrap(),
            Command::Decode("48".into())
        );
        assert_eq!(
            Command::parse_line("--codepoints=41,1F600").unwrap(),
            Command::EncodeCodePoints("41,1F600".into())
        );
        assert_eq!(Command::parse_line(" quit ").unwrap(), Command::Exit);
        assert!(matches!(
            Command::parse_line("help").unwrap(),
            Command::Help(_)
        ));
        assert!(matches!(
            Command::parse_line("--help").unwrap(),
            Command::Help(_)
        ));
    }

    #[test]
    fn test_parse_line_keeps_payload_raw() {
        // Hex dan code point divalidasi saat command dijalankan
        assert_eq!(
            Command::parse_line("--decode=zz").unwrap(),
            Command::Decode("zz".into())
        );
        assert_eq!(
            Command::parse_line("--codepoints=110000").unwrap(),
            Command::EncodeCodePoints("110000".into())
        );
    }

    #[test]
    fn test_parse_line_precedence() {
        assert_eq!(
            Command::parse_line("--decode=41 --encode=x").unwrap(),
            Command::Encode("x".into())
        );
        assert_eq!(
            Command::parse_line(r#"--encode="" --decode=41"#).unwrap(),
            Command::Decode("41".into())
        );
    }

    #[test]
    fn test_parse_line_errors() {
        assert!(matches!(
            Command::parse_line(r#"--encode="""#),
            Err(ShellError::MissingCommand)
        ));
        assert!(matches!(
            Command::parse_line("hello"),
            Err(ShellError::Usage(_))
        ));
        assert_eq!(
            ShellError::MissingCommand.to_string(),
            "please provide either --encode or --decode flag"
        );
    }
}
