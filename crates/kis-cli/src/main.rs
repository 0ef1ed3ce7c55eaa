//! 한국투자증권 Open API CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 엔드포인트 목록
//! kis endpoints --category domestic_stock
//!
//! # 삼성전자 현재가
//! kis call domestic_stock/inquire-price -p FID_INPUT_ISCD=005930
//!
//! # 잔고 조회 (계좌는 설정에서 채움), CSV로 저장
//! kis call domestic_stock/inquire-balance --format csv --output balance.csv
//!
//! # 실시간 체결가
//! kis stream domestic-trade 005930 000660
//!
//! # ELW 마스터 파일 변환
//! kis master elw elw_code.mst --format csv --output elw.csv
//! ```

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use kis_cli::commands::call::{run_call, CallConfig};
use kis_cli::commands::endpoints::list_endpoints;
use kis_cli::commands::master::{run_master, MasterConfig};
use kis_cli::commands::output::{parse_renames, OutputFormat};
use kis_cli::commands::stream::{run_stream, StreamConfig};
use kis_cli::commands::token::run_token;
use kis_cli::commands::load_config;
use kis_core::logging::{init_logging, LogConfig};
use kis_exchange::DEFAULT_MAX_DEPTH;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "kis")]
#[command(about = "KIS Open API CLI - 한국투자증권 REST/WebSocket 클라이언트", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (kis_devlp.yaml 형식, 지정하지 않으면 환경 변수/.env)
    #[arg(long, global = true)]
    config: Option<String>,

    /// 모의투자 계정 사용
    #[arg(long, global = true, default_value = "false")]
    paper: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 엔드포인트 목록 보기
    Endpoints {
        /// 카테고리 필터 (domestic_stock, overseas_stock, domestic_futureoption, domestic_bond, elw, etfetn)
        #[arg(short, long)]
        category: Option<String>,

        /// 실시간 구독 목록 보기
        #[arg(long, default_value = "false")]
        realtime: bool,

        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// REST 엔드포인트 호출
    Call {
        /// 엔드포인트 (category/name 또는 name)
        endpoint: String,

        /// 요청 파라미터 KEY=VALUE (반복 가능)
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,

        /// 연속 조회 최대 추가 페이지 수
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// 첫 요청의 tr_cont
        #[arg(long)]
        tr_cont: Option<String>,

        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 컬럼명 변경 FROM=TO (반복 가능)
        #[arg(long)]
        rename: Vec<String>,

        /// 출력 파일 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// 실시간 시세 구독
    Stream {
        /// 실시간 피드 이름 (예: domestic-trade)
        name: String,

        /// 종목 코드 등 tr_key (여러 개 가능)
        #[arg(required = true)]
        tr_keys: Vec<String>,

        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// 컬럼명 변경 FROM=TO (반복 가능)
        #[arg(long)]
        rename: Vec<String>,

        /// 수신할 메시지 수 (0 = Ctrl-C까지)
        #[arg(long, default_value = "0")]
        limit: usize,
    },

    /// 종목 마스터 파일 변환 (elw, konex)
    Master {
        /// 마스터 종류 (elw, konex)
        kind: String,

        /// 마스터 파일 경로 (*.mst)
        file: String,

        /// 출력 형식 (table, csv, json)
        #[arg(short, long, default_value = "table")]
        format: String,

        /// 최대 결과 수 (0 = 무제한)
        #[arg(long, default_value = "0")]
        limit: usize,

        /// 컬럼명 변경 FROM=TO (반복 가능)
        #[arg(long)]
        rename: Vec<String>,

        /// 출력 파일 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// 접근 토큰 발급/폐기
    Token {
        /// 캐시된 토큰 폐기
        #[arg(long, default_value = "false")]
        revoke: bool,

        /// WebSocket 접속키도 발급
        #[arg(long, default_value = "false")]
        approval: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(LogConfig::from_env()).map_err(|e| anyhow!("로깅 초기화 실패: {}", e))?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Endpoints {
            category,
            realtime,
            format,
        } => {
            let format = OutputFormat::parse(&format)?;
            let count = list_endpoints(category.as_deref(), realtime, format)?;
            info!("{} entries", count);
        }

        Commands::Call {
            endpoint,
            params,
            max_depth,
            tr_cont,
            format,
            rename,
            output,
        } => {
            let config = load_config(cli.config.as_deref(), cli.paper)?;
            let call = CallConfig {
                endpoint,
                params,
                max_depth,
                tr_cont,
                format: OutputFormat::parse(&format)?,
                renames: parse_renames(&rename)?,
                output,
            };

            match run_call(config, call).await {
                Ok(count) => info!("✅ {} rows", count),
                Err(e) => {
                    error!("Call failed: {}", e);
                    return Err(e);
                }
            }
        }

        Commands::Stream {
            name,
            tr_keys,
            format,
            rename,
            limit,
        } => {
            let config = load_config(cli.config.as_deref(), cli.paper)?;
            let stream = StreamConfig {
                name,
                tr_keys,
                format: OutputFormat::parse(&format)?,
                renames: parse_renames(&rename)?,
                limit,
            };

            match run_stream(config, stream).await {
                Ok(count) => info!("✅ {} messages received", count),
                Err(e) => {
                    error!("Stream failed: {}", e);
                    return Err(e);
                }
            }
        }

        Commands::Master {
            kind,
            file,
            format,
            limit,
            rename,
            output,
        } => {
            let config = MasterConfig {
                kind,
                file,
                format: OutputFormat::parse(&format)?,
                limit,
                renames: parse_renames(&rename)?,
                output,
            };
            let count = run_master(config)?;
            info!("✅ {} rows parsed", count);
        }

        Commands::Token { revoke, approval } => {
            let config = load_config(cli.config.as_deref(), cli.paper)?;
            run_token(config, revoke, approval).await?;
        }
    }

    Ok(())
}
