//! Momentum breakout scanner CLI.

use anyhow::Context;
use clap::{Parser, Subcommand};
use scanner_core::{init_logging, LogConfig, ScannerConfig};
use scanner_data::{InstrumentCatalog, YahooPriceProvider};
use scanner_collector::modules::{self, ScanOptions, Scanner};
use scanner_collector::{log_filter, CollectorConfig};

#[derive(Parser)]
#[command(name = "breakout-scanner")]
#[command(about = "RSI + moving average first-breakout scanner", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 종목 스캔 후 보존 테이블에 병합
    Scan {
        /// 특정 종목만 스캔 (쉼표로 구분, 예: "2330,2317.TW")
        #[arg(long)]
        symbols: Option<String>,

        /// 스캔할 최대 종목 수 (0 = 전체, 기본값은 SCAN_LIMIT)
        #[arg(long)]
        limit: Option<usize>,

        /// 저장소에 기록하지 않음
        #[arg(long)]
        dry_run: bool,
    },

    /// 스캔 대상 종목 출력
    Universe {
        /// 출력할 최대 종목 수 (0 = 전체)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// 저장된 보존 테이블 출력
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 로깅 초기화
    let mut log_config = LogConfig::from_env();
    log_config.level = log_filter(&cli.log_level);
    init_logging(log_config).map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    // 설정 로드 (실패 시 스캔 전 종료)
    let config = CollectorConfig::from_env().context("설정 로드 실패")?;
    config.scanner.validate().context("스캐너 설정 오류")?;
    tracing::debug!(backend = ?config.store.backend, limit = config.scan.limit, "설정 로드 완료");

    match cli.command {
        Commands::Scan {
            symbols,
            limit,
            dry_run,
        } => run_scan(&config, symbols.as_deref(), limit, dry_run).await?,
        Commands::Universe { limit } => {
            let catalog = modules::load_catalog().await?;
            let tickers =
                modules::select_universe(&catalog, None, limit.unwrap_or(config.scan.limit));
            for ticker in &tickers {
                println!(
                    "{}\t{}",
                    ticker,
                    catalog.display_name(ticker).unwrap_or_default()
                );
            }
        }
        Commands::Show => {
            config.store.validate()?;
            let store = modules::build_store(&config.store, false)?;
            let table = modules::load_table(store.as_ref(), &config.scanner.retention).await?;
            for row in table.to_rows() {
                println!("{}", row.join("\t"));
            }
        }
    }

    Ok(())
}

async fn run_scan(
    config: &CollectorConfig,
    symbols: Option<&str>,
    limit: Option<usize>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let ScannerConfig {
        retention, output, ..
    } = &config.scanner;

    // 저장소 설정은 스캔 전에 확인
    if !dry_run {
        config.store.validate()?;
    }
    let store = modules::build_store(&config.store, dry_run)?;
    let today = modules::run_date(output.timezone);

    let catalog = modules::load_catalog().await?;
    let tickers = modules::select_universe(&catalog, symbols, limit.unwrap_or(config.scan.limit));
    if tickers.is_empty() {
        tracing::warn!("스캔할 종목이 없습니다");
    }

    let provider = YahooPriceProvider::new(output.timezone)?;
    let scanner = Scanner::new(&provider, &catalog, &config.scanner);
    let options = ScanOptions {
        history_range: config.scan.history_range.clone(),
        request_delay: config.scan.request_delay(),
        show_progress: true,
    };

    let report = scanner.run(&tickers, &options).await;
    report.stats.log_summary("스캔");

    if report.signals.is_empty() {
        println!("{} 조건을 만족한 종목이 없습니다", today);
    } else {
        println!("{} 발견 {}건", today, report.signals.len());
        for signal in &report.signals {
            println!("  {}", signal);
        }
    }

    // 저장 실패는 기록만 하고 정상 종료
    if let Some(outcome) =
        modules::persist_or_log(store.as_ref(), &report.signals, today, retention).await
    {
        tracing::info!(
            dates = ?outcome.table.distinct_dates(),
            dry_run = dry_run,
            "보존 테이블 갱신"
        );
    }

    Ok(())
}
