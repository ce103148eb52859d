//! Configuration: defaults, overlaid by `UTFPLAY_*` env vars, overlaid by
//! command-line flags (clap does the last two).

use std::net::SocketAddr;

use clap::{Parser, ValueEnum};

use crate::codec::{Codec, Conformance, EncodeMode};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Strict,
    Lenient,
}

impl From<ModeArg> for EncodeMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Strict => EncodeMode::Strict,
            ModeArg::Lenient => EncodeMode::Lenient,
        }
    }
}

impl From<ModeArg> for Conformance {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Strict => Conformance::Strict,
            ModeArg::Lenient => Conformance::Lenient,
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "utfplay", version)]
#[command(about = "UTF-8 Encoder/Decoder: interactive shell or HTTP service", long_about = None)]
pub struct Cli {
    /// Start the application in web server mode
    #[arg(long)]
    pub serve: bool,

    /// Server bind address
    #[arg(long, short = 'b', env = "UTFPLAY_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Out-of-range and surrogate policy of the encoder
    #[arg(long, env = "UTFPLAY_ENCODE_MODE", value_enum, default_value_t = ModeArg::Strict)]
    pub encode_mode: ModeArg,

    /// Overlong/surrogate/range checks of the decoder
    #[arg(long, env = "UTFPLAY_DECODE_MODE", value_enum, default_value_t = ModeArg::Strict)]
    pub decode_mode: ModeArg,

    /// Largest accepted request body in bytes
    #[arg(long, default_value_t = 64 * 1024)]
    pub max_body_bytes: usize,

    /// Open connections beyond this are dropped
    #[arg(long, default_value_t = 1024)]
    pub max_connections: usize,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "UTFPLAY_LOG", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Interactive,
    Serve,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub max_connections: usize,
    pub max_body_bytes: usize,
    pub codec: Codec,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_connections: 1024,
            max_body_bytes: 64 * 1024,
            codec: Codec::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub mode: RunMode,
    pub codec: Codec,
    pub server: ServerConfig,
    pub log: LogConfig,
}

impl From<Cli> for AppConfig {
    fn from(cli: Cli) -> Self {
        let codec = Codec::new(cli.encode_mode.into(), cli.decode_mode.into());
        Self {
            mode: if cli.serve {
                RunMode::Serve
            } else {
                RunMode::Interactive
            },
            codec,
            server: ServerConfig {
                bind_addr: cli.bind,
                max_connections: cli.max_connections,
                max_body_bytes: cli.max_body_bytes,
                codec,
            },
            log: LogConfig {
                level: cli.log_level,
                format: cli.log_format,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "utfplay",
            "--serve",
            "--bind",
            "127.0.0.1:9000",
            "--decode-mode",
            "lenient",
            "--max-body-bytes",
            "100",
            "--log-format",
            "json",
        ])
        .unwrap();
        let config = AppConfig::from(cli);
        assert_eq!(config.mode, RunMode::Serve);
        assert_eq!(config.server.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(config.server.max_body_bytes, 100);
        assert_eq!(config.codec.decoder.conformance(), Conformance::Lenient);
        assert_eq!(config.codec.encoder.mode(), EncodeMode::Strict);
        assert_eq!(config.server.codec, config.codec);
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_rejects_bad_bind() {
        assert!(Cli::try_parse_from(["utfplay", "--bind", "not-an-addr"]).is_err());
    }
}
