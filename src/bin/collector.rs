use clap::Parser;
use farm::cli::init_tracing;
use farm::engine::TerminationSignals;
use farm::ipc::Collector;
use farm::services::config::DEFAULT_SOCKET_PATH;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "collector")]
#[command(about = "Receive checksum results from one farm run and print them")]
#[command(version)]
struct Args {
    /// Socket path to bind
    #[arg(long, value_name = "PATH", default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    // 端末からの割り込みはfarmと同じプロセスグループに届く。
    // 停止の判断はfarm側が行い、Collectorは接続が閉じるまで受信を続ける
    let mut signals = match TerminationSignals::register() {
        Ok(signals) => signals,
        Err(error) => {
            eprintln!("❌ エラー: {error}");
            return ExitCode::FAILURE;
        }
    };

    let collector = match Collector::bind(&args.socket) {
        Ok(collector) => collector,
        Err(error) => {
            eprintln!("❌ エラー: {error}");
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = tokio::io::stdout();
    let serve = collector.serve(&mut stdout);
    tokio::pin!(serve);

    let outcome = loop {
        tokio::select! {
            outcome = &mut serve => break outcome,
            Some(signal) = signals.recv() => {
                tracing::debug!(?signal, "collector keeps draining until farm disconnects");
            }
        }
    };

    match outcome {
        Ok(received) => {
            tracing::debug!(received, "collector finished");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("❌ エラー: {error}");
            ExitCode::FAILURE
        }
    }
}
