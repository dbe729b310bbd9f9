use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;

use campus_dashboard::filter::{AttendanceFacets, Facet, GradeFacets, PaymentFacets, StudentFacets};
use campus_dashboard::{export, loader, overview, report, sample, view};
use campus_dashboard::{DomainView, Query, Snapshot};

#[derive(Parser)]
#[command(name = "campus-dashboard")]
#[command(about = "Academic records dashboard views", long_about = None)]
struct Cli {
    /// CSV directory or JSON snapshot; the built-in sample is used when absent
    #[arg(long, global = true, env = "CAMPUS_DASHBOARD_DATA")]
    data: Option<PathBuf>,
    #[arg(long, global = true, value_enum, default_value_t = Format::Markdown)]
    format: Format,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Json,
    /// Visible rows with their derived score and tier
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// List students
    Students {
        #[arg(long, default_value = "")]
        search: String,
        /// Section prefix such as "10°", or "all"
        #[arg(long, default_value = "all")]
        section: String,
        #[arg(long, default_value = "all")]
        enrollment: String,
    },
    /// List grade records with derived averages
    Grades {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        subject: String,
        #[arg(long, default_value = "all")]
        section: String,
    },
    /// List the day's attendance
    Attendance {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        status: String,
    },
    /// List payments and collection totals
    Payments {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        status: String,
    },
    /// Cross-domain summary and alerts
    Overview,
    /// Write a markdown report covering every domain
    Report {
        #[arg(long, default_value = "dashboard.md")]
        out: PathBuf,
    },
}

fn load_snapshot(data: Option<&Path>) -> anyhow::Result<Snapshot> {
    match data {
        Some(path) => loader::load(path)
            .with_context(|| format!("failed to load records from {}", path.display())),
        None => {
            info!("no data source given, using the built-in sample snapshot");
            Ok(sample::snapshot())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn emit(view: &DomainView<'_>, format: Format) -> anyhow::Result<()> {
    match format {
        Format::Markdown => print!("{}", report::render_view(view)),
        Format::Json => print_json(view)?,
        Format::Csv => export::write_csv(view, io::stdout().lock())?,
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let snapshot = load_snapshot(cli.data.as_deref())?;

    match cli.command {
        Commands::Students {
            search,
            section,
            enrollment,
        } => {
            let facets = StudentFacets {
                section: Facet::parse(&section)?,
                enrollment: Facet::parse(&enrollment).context("invalid --enrollment")?,
            };
            let query = Query::search(search).with_facets(facets);
            let view = view::student_view(&snapshot.students, &query);
            emit(&DomainView::Students(view), cli.format)?;
        }
        Commands::Grades {
            search,
            subject,
            section,
        } => {
            let facets = GradeFacets {
                subject: Facet::parse(&subject)?,
                section: Facet::parse(&section)?,
            };
            let query = Query::search(search).with_facets(facets);
            let view = view::grade_view(&snapshot.grades, &query);
            emit(&DomainView::Grades(view), cli.format)?;
        }
        Commands::Attendance { search, status } => {
            let facets = AttendanceFacets {
                status: Facet::parse(&status).context("invalid --status")?,
            };
            let query = Query::search(search).with_facets(facets);
            let view = view::attendance_view(&snapshot.attendance, &query);
            emit(&DomainView::Attendance(view), cli.format)?;
        }
        Commands::Payments { search, status } => {
            let facets = PaymentFacets {
                status: Facet::parse(&status).context("invalid --status")?,
            };
            let query = Query::search(search).with_facets(facets);
            let view = view::payment_view(&snapshot.payments, &query);
            emit(&DomainView::Payments(view), cli.format)?;
        }
        Commands::Overview => {
            let summary = overview::overview(&snapshot);
            match cli.format {
                Format::Json => print_json(&summary)?,
                Format::Markdown => print!("{}", report::render_overview(&summary)),
                Format::Csv => bail!("overview has no CSV form; use markdown or json"),
            }
        }
        Commands::Report { out } => {
            let text = report::build_report(&snapshot);
            std::fs::write(&out, text)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
