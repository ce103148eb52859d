//! Interactive Shell: line-oriented encode/decode session
//!
//! Membaca command dari input baris per baris, menulis hasil ke output.
//! Generic atas `BufRead`/`Write` supaya bisa dites tanpa terminal.

mod command;

pub use command::{split_args, usage, Command, LineArgs, ShellError};

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use crate::codec::{Codec, Decoded};
use crate::service::{self, DecodeReport};

const BANNER: &str = "UTF-8 Encoder/Decoder Interactive Mode";
const HINT: &str = "Enter commands (e.g., --encode=\"Hello\" or --decode=\"48,65,6C\"). \
                    Type 'exit' or press Ctrl+D to quit.";
const PROMPT: &str = ">> ";
const INVALID_INPUT: &str = "input is not valid UTF-8";

/// Counters kept for the end-of-session log line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub commands: u64,
    pub errors: u64,
}

pub struct Session<R, W> {
    input: R,
    output: W,
    codec: Codec,
    stats: SessionStats,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, codec: Codec) -> Self {
        Self {
            input,
            output,
            codec,
            stats: SessionStats::default(),
        }
    }

    /// Main loop. Returns on EOF or `exit`; only I/O failures are errors.
    pub fn run(&mut self) -> io::Result<SessionStats> {
        writeln!(self.output, "{BANNER}")?;
        writeln!(self.output, "{HINT}")?;

        let mut raw = Vec::new();
        loop {
            write!(self.output, "{PROMPT}")?;
            self.output.flush()?;

            raw.clear();
            if self.input.read_until(b'\n', &mut raw)? == 0 {
                break;
            }
            // Baris non-UTF-8 hanya menggagalkan baris itu sendiri
            let line = match std::str::from_utf8(&raw) {
                Ok(line) => line,
                Err(e) => {
                    self.stats.commands += 1;
                    self.stats.errors += 1;
                    tracing::debug!(valid_up_to = e.valid_up_to(), "non UTF-8 shell input");
                    writeln!(self.output, "Error: {INVALID_INPUT}")?;
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            self.stats.commands += 1;
            match Command::parse_line(line) {
                Ok(Command::Exit) => break,
                Ok(cmd) => self.execute(cmd)?,
                Err(e) => {
                    self.stats.errors += 1;
                    tracing::debug!(error = %e, "rejected shell input");
                    writeln!(self.output, "Error: {e}")?;
                }
            }
        }

        tracing::info!(
            commands = self.stats.commands,
            errors = self.stats.errors,
            "interactive session ended"
        );
        Ok(self.stats)
    }

    fn execute(&mut self, cmd: Command) -> io::Result<()> {
        match cmd {
            Command::Encode(text) => {
                let bytes = service::encode_text(&text);
                writeln!(self.output, "Original string: {text}")?;
                writeln!(self.output, "Encoded byte slice: {}", format_byte_slice(&bytes))
            }
            Command::EncodeCodePoints(list) => {
                match service::encode_code_points(&self.codec.encoder, &list) {
                    Ok(bytes) => {
                        writeln!(self.output, "Code points: {list}")?;
                        writeln!(self.output, "Encoded byte slice: {}", format_byte_slice(&bytes))
                    }
                    Err(e) => self.report_error(&e),
                }
            }
            Command::Decode(list) => match service::decode_hex_list(&self.codec.decoder, &list) {
                Ok(report) => self.write_report(&report),
                Err(e) => self.report_error(&e),
            },
            Command::Help(text) => writeln!(self.output, "{}", text.trim_end()),
            Command::Exit => Ok(()),
        }
    }

    fn write_report(&mut self, report: &DecodeReport) -> io::Result<()> {
        writeln!(
            self.output,
            "Original byte slice (parsed from hex): {}",
            format_byte_slice(&report.bytes)
        )?;
        writeln!(self.output, "Decoded runes:")?;
        for decoded in &report.chars {
            writeln!(self.output, "{}", format_rune(decoded))?;
        }
        if let Some(err) = &report.error {
            self.stats.errors += 1;
            tracing::warn!(position = err.position, kind = err.source.kind(), "invalid UTF-8 input");
            writeln!(
                self.output,
                "Error: Invalid UTF-8 sequence at position {} ({})",
                err.position, err.source
            )?;
        }
        Ok(())
    }

    fn report_error(&mut self, err: &dyn std::error::Error) -> io::Result<()> {
        self.stats.errors += 1;
        writeln!(self.output, "Error: {err}")
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

/// `[72 101 108]`
pub fn format_byte_slice(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4 + 2);
    out.push('[');
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{b}");
    }
    out.push(']');
    out
}

/// ` - Rune: U+20AC, Character: €, Size: 3 bytes`
pub fn format_rune(decoded: &Decoded) -> String {
    let c = decoded.as_char().unwrap_or(char::REPLACEMENT_CHARACTER);
    format!(
        " - Rune: U+{:X}, Character: {}, Size: {} bytes",
        decoded.code_point, c, decoded.consumed
    )
}
