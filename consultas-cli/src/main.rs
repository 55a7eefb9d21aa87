use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use consultas_core::{ReportError, ReportRequest, UpstreamConfig};
use consultas_service::{error_response, RecordsClient, ReportService};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "consultas-cli",
    about = "Estadísticas y reportes PDF de consultas médicas."
)]
struct Cli {
    #[command(flatten)]
    upstream: UpstreamArgs,

    #[command(subcommand)]
    command: Command,
}

/// Overrides for the records service location (defaults come from `BACKEND_*`).
#[derive(Args, Debug)]
struct UpstreamArgs {
    #[arg(long, global = true)]
    protocol: Option<String>,
    #[arg(long, global = true)]
    host: Option<String>,
    #[arg(long, global = true)]
    port: Option<u16>,
    /// Seconds to wait for consultations and catalogs.
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

impl UpstreamArgs {
    fn into_config(self) -> UpstreamConfig {
        let mut config = UpstreamConfig::from_env();
        if let Some(protocol) = self.protocol {
            config.protocol = protocol;
        }
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        config
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estadísticas históricas en JSON.
    Estadisticas,
    /// Opciones de atletas y profesionales para los filtros.
    Filtros,
    /// Reporte PDF de consultas filtradas.
    Reporte {
        #[arg(long)]
        fecha_inicio: String,
        #[arg(long)]
        fecha_fin: String,
        #[arg(long)]
        atleta_id: Option<String>,
        #[arg(long)]
        profesional_id: Option<String>,
        /// Ruta del PDF; por defecto el nombre generado.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = ReportService::connect(cli.upstream.into_config())?;

    match run(&service, cli.command) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => match err.downcast_ref::<ReportError>() {
            Some(report_err) => {
                let (status, body) = error_response(report_err);
                tracing::debug!(status, "operation failed");
                eprintln!("{}", serde_json::to_string_pretty(&body)?);
                Ok(ExitCode::FAILURE)
            }
            None => Err(err),
        },
    }
}

fn run(service: &ReportService<RecordsClient>, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Estadisticas => {
            let stats = service.statistics(Local::now().date_naive())?;
            print_json(&stats)?;
        }
        Command::Filtros => {
            let options = service.filter_options()?;
            print_json(&options)?;
        }
        Command::Reporte {
            fecha_inicio,
            fecha_fin,
            atleta_id,
            profesional_id,
            output,
        } => {
            let request = ReportRequest {
                fecha_inicio: Some(fecha_inicio),
                fecha_fin: Some(fecha_fin),
                atleta_id,
                profesional_id,
            };
            let report = service.report(&request, Local::now().naive_local())?;
            let path = output.unwrap_or_else(|| PathBuf::from(&report.filename));
            std::fs::write(&path, &report.bytes)
                .with_context(|| format!("No se pudo escribir {:?}", path))?;
            println!("Reporte escrito en {}", path.display());
        }
    }
    Ok(())
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
