use clap::{CommandFactory, Parser};
use farm::cli::{init_tracing, Cli};
use farm::run_farm;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    // 引数なしは使い方を表示して正常終了
    if std::env::args_os().len() <= 1 {
        let mut command = Cli::command();
        if let Err(error) = command.print_help() {
            eprintln!("❌ エラー: {error}");
            return ExitCode::FAILURE;
        }
        println!();
        return ExitCode::SUCCESS;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            let code = if error.use_stderr() { 1 } else { 0 };
            let _ = error.print();
            return ExitCode::from(code);
        }
    };

    let (config, files) = match cli.into_config() {
        Ok(parsed) => parsed,
        Err(error) => {
            eprintln!("❌ エラー: {error}");
            return ExitCode::from(error.exit_code());
        }
    };

    match run_farm(config, &files).await {
        Ok(summary) => {
            if summary.cancelled {
                tracing::info!(dispatched = summary.dispatched, "run cancelled by signal");
            }
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("❌ エラー: {error}");
            tracing::error!(severity = error.severity().as_str(), "farm run failed");
            ExitCode::FAILURE
        }
    }
}
