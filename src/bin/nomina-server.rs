//! CLI binary for nomina-extract.
//!
//! `serve` runs the HTTP endpoint; `extract` runs the pipeline once on a
//! local file or URL and prints the JSON report.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use nomina_extract::{
    extract_file, extract_nominas, server, AppState, ExtractRequest, ExtractionReport,
    ExtractorConfig, PdfBackend, PdfiumBackend, Region, ROUTE,
};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Serve the endpoint on port 3000
  nomina-server serve

  # Custom address and a 20 MB body limit
  nomina-server serve --bind 127.0.0.1:8080 --max-body-mb 20

  # Template with the period further down the page
  nomina-server serve --periodo-region 50,120,400,135

  # One-shot extraction, JSON report on stdout
  nomina-server extract nominas-abril.pdf
  nomina-server extract https://example.com/nominas-abril.pdf

  # Call a running server
  curl -X POST http://localhost:3000/api/extract-nomina \
       -H 'Content-Type: application/json' \
       -d '{"pdfUrl": "https://example.com/nominas-abril.pdf"}'

ENVIRONMENT VARIABLES:
  NOMINA_BIND               Listen address for `serve`
  NOMINA_MAX_BODY_MB        Request body / PDF size limit in MB
  NOMINA_DOWNLOAD_TIMEOUT   pdfUrl download timeout in seconds
  NOMINA_TRABAJADOR_REGION  Worker-name region, x1,y1,x2,y2
  NOMINA_PERIODO_REGION     Pay-period region, x1,y1,x2,y2
  PDFIUM_LIB_PATH           libpdfium file or directory
  RUST_LOG                  Overrides --verbose / --quiet
"#;

/// Extract worker name and pay period from payroll PDFs.
#[derive(Parser, Debug)]
#[command(
    name = "nomina-server",
    version,
    about = "Extract worker name and pay period from payroll PDFs",
    after_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    pipeline: PipelineArgs,

    /// Enable debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve POST /api/extract-nomina.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "NOMINA_BIND", default_value = "0.0.0.0:3000")]
        bind: SocketAddr,
    },

    /// Run one extraction and print the report as JSON.
    Extract {
        /// Local PDF file path or HTTP/HTTPS URL.
        input: String,

        /// Print compact JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
    },
}

#[derive(Args, Debug)]
struct PipelineArgs {
    /// Request body and PDF size limit in MB.
    #[arg(long, env = "NOMINA_MAX_BODY_MB", default_value_t = 10, global = true,
          value_parser = clap::value_parser!(u64).range(1..=1024))]
    max_body_mb: u64,

    /// Timeout for pdfUrl downloads in seconds.
    #[arg(long, env = "NOMINA_DOWNLOAD_TIMEOUT", default_value_t = 30, global = true)]
    download_timeout: u64,

    /// TRABAJADOR region as x1,y1,x2,y2 (points, top-left origin).
    #[arg(long, env = "NOMINA_TRABAJADOR_REGION", global = true, value_parser = parse_region)]
    trabajador_region: Option<Region>,

    /// PERIODO region as x1,y1,x2,y2 (points, top-left origin).
    #[arg(long, env = "NOMINA_PERIODO_REGION", global = true, value_parser = parse_region)]
    periodo_region: Option<Region>,

    /// libpdfium file or directory. Default: ./ then the system path.
    #[arg(long, env = "PDFIUM_LIB_PATH", global = true)]
    pdfium_lib: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli.pipeline)?;

    // ── Bind PDFium once, shared by every request ────────────────────────
    let lib = cli.pipeline.pdfium_lib.clone();
    let backend: Arc<dyn PdfBackend> = Arc::new(
        tokio::task::block_in_place(|| PdfiumBackend::bind(lib.as_deref()))
            .context("Failed to load the PDFium library (set PDFIUM_LIB_PATH)")?,
    );

    match cli.command {
        Command::Serve { bind } => {
            let listener = tokio::net::TcpListener::bind(bind)
                .await
                .with_context(|| format!("Failed to bind {bind}"))?;
            info!("Serving POST {} on {}", ROUTE, bind);

            server::serve(listener, AppState::new(backend, config))
                .await
                .context("Server error")?;
        }
        Command::Extract { input, compact } => {
            let report = run_once(&input, backend, &config).await?;
            let json = if compact {
                serde_json::to_string(&report)
            } else {
                serde_json::to_string_pretty(&report)
            }
            .context("Failed to serialise report")?;
            println!("{json}");

            if !cli.quiet && report.failed_pages() > 0 {
                eprintln!(
                    "{}/{} pages failed",
                    report.failed_pages(),
                    report.total_paginas
                );
            }
        }
    }

    Ok(())
}

/// Map CLI args to `ExtractorConfig`.
fn build_config(args: &PipelineArgs) -> Result<ExtractorConfig> {
    let max_body_bytes = usize::try_from(args.max_body_mb * 1024 * 1024)
        .context("--max-body-mb does not fit in memory on this platform")?;

    let mut builder = ExtractorConfig::builder()
        .max_body_bytes(max_body_bytes)
        .download_timeout_secs(args.download_timeout);

    if let Some(region) = args.trabajador_region {
        builder = builder.trabajador_region(region);
    }
    if let Some(region) = args.periodo_region {
        builder = builder.periodo_region(region);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `x1,y1,x2,y2`.
fn parse_region(s: &str) -> std::result::Result<Region, String> {
    let values: Vec<f32> = s
        .split(',')
        .map(|v| v.trim().parse::<f32>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| format!("invalid coordinate in '{s}': {e}"))?;

    match values.as_slice() {
        [x1, y1, x2, y2] => Ok(Region::new(*x1, *y1, *x2, *y2)),
        _ => Err(format!("expected x1,y1,x2,y2, got '{s}'")),
    }
}

async fn run_once(
    input: &str,
    backend: Arc<dyn PdfBackend>,
    config: &ExtractorConfig,
) -> Result<ExtractionReport> {
    let report = if nomina_extract::pipeline::input::is_url(input) {
        extract_nominas(&ExtractRequest::from_url(input), backend, config).await
    } else {
        extract_file(input, backend, config).await
    };
    report.with_context(|| format!("Extraction failed for {input}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_flag_parses() {
        assert_eq!(
            parse_region("29, 650, 154,658").unwrap(),
            Region::new(29.0, 650.0, 154.0, 658.0)
        );
    }

    #[test]
    fn region_flag_rejects_bad_input() {
        assert!(parse_region("1,2,3").is_err());
        assert!(parse_region("1,2,x,4").is_err());
    }

    #[test]
    fn region_flags_reach_config() {
        let cli = Cli::parse_from([
            "nomina-server",
            "--periodo-region",
            "50,120,400,135",
            "extract",
            "a.pdf",
        ]);
        let config = build_config(&cli.pipeline).unwrap();
        assert_eq!(config.regions.periodo, Region::new(50.0, 120.0, 400.0, 135.0));
        assert_eq!(config.regions.trabajador, Region::new(29.0, 650.0, 154.0, 658.0));
    }

    #[test]
    fn inverted_region_flag_is_rejected() {
        let cli = Cli::parse_from([
            "nomina-server",
            "extract",
            "a.pdf",
            "--trabajador-region",
            "154,650,29,658",
        ]);
        assert!(build_config(&cli.pipeline).is_err());
    }
}
