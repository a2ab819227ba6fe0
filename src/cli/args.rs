use crate::core::FailurePolicy;
use crate::services::config::{FarmConfig, DEFAULT_SOCKET_PATH};
use clap::Parser;
use std::num::IntErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "farm")]
#[command(about = "Compute weighted checksums of record files in parallel and forward them to a collector")]
#[command(version)]
pub struct Cli {
    /// Number of worker threads (default 4)
    #[arg(short = 'n', value_name = "THREADS", allow_hyphen_values = true)]
    pub threads: Option<String>,

    /// Job queue depth (default 8)
    #[arg(short = 'q', value_name = "QUEUE_LEN", allow_hyphen_values = true)]
    pub queue_len: Option<String>,

    /// Delay in milliseconds before each job is enqueued (default 0)
    #[arg(short = 't', value_name = "DELAY_MS", allow_hyphen_values = true)]
    pub delay_ms: Option<String>,

    /// Socket path shared with the collector
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SOCKET_PATH)]
    pub socket: PathBuf,

    /// Collector executable (defaults to `collector` next to this binary)
    #[arg(long, value_name = "PATH")]
    pub collector: Option<PathBuf>,

    /// Report unreadable files and continue instead of aborting the run
    #[arg(long)]
    pub keep_going: bool,

    /// Only print diagnostics for skipped and failed files
    #[arg(long)]
    pub quiet: bool,

    /// Files to process
    pub files: Vec<PathBuf>,
}

/// 数値オプションの解釈エラー
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("-{option}: '{value}' is not a number")]
    NotANumber { option: char, value: String },

    #[error("-{option}: '{value}' is out of range")]
    Overflow { option: char, value: String },

    #[error("-{option}: {reason}")]
    OutOfDomain { option: char, reason: &'static str },
}

impl ArgumentError {
    /// プロセスの終了コード（オーバーフローのみ2）
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Overflow { .. } => 2,
            Self::NotANumber { .. } | Self::OutOfDomain { .. } => 1,
        }
    }
}

/// 10進数の符号付き64bit整数として解釈する
pub fn parse_number(option: char, value: &str) -> Result<i64, ArgumentError> {
    value.trim().parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => ArgumentError::Overflow {
            option,
            value: value.to_string(),
        },
        _ => ArgumentError::NotANumber {
            option,
            value: value.to_string(),
        },
    })
}

fn parse_count(option: char, value: &str) -> Result<usize, ArgumentError> {
    let number = parse_number(option, value)?;
    if number < 1 {
        return Err(ArgumentError::OutOfDomain {
            option,
            reason: "must be at least 1",
        });
    }
    usize::try_from(number).map_err(|_| ArgumentError::Overflow {
        option,
        value: value.to_string(),
    })
}

fn parse_delay(option: char, value: &str) -> Result<Duration, ArgumentError> {
    let number = parse_number(option, value)?;
    let millis = u64::try_from(number).map_err(|_| ArgumentError::OutOfDomain {
        option,
        reason: "must not be negative",
    })?;
    Ok(Duration::from_millis(millis))
}

impl Cli {
    /// 引数を検証して実行設定に変換する
    pub fn into_config(self) -> Result<(FarmConfig, Vec<PathBuf>), ArgumentError> {
        let mut config = FarmConfig::new()
            .with_socket_path(self.socket)
            .with_quiet(self.quiet);

        if let Some(value) = &self.threads {
            config = config.with_workers(parse_count('n', value)?);
        }
        if let Some(value) = &self.queue_len {
            config = config.with_queue_depth(parse_count('q', value)?);
        }
        if let Some(value) = &self.delay_ms {
            config = config.with_pacing(parse_delay('t', value)?);
        }
        if let Some(program) = self.collector {
            config = config.with_collector_program(program);
        }
        if self.keep_going {
            config = config.with_failure_policy(FailurePolicy::SkipFailed);
        }

        Ok((config, self.files))
    }
}
