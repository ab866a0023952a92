//! Wave Sport Hub booking CLI.
//!
//! Drives a prepared reservation through the booking wizard and reports how
//! it ended.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use wavehub_booking::availability::{AvailabilityChecker, CalendarBackend, GoogleCalendarBackend, InMemoryCalendar};
use wavehub_booking::gateway::{BookingBackend, HttpBookingGateway, RecordingGateway};
use wavehub_booking::wizard::{Flow, ProductionWizardEnvironment};
use wavehub_booking::{Config, Outcome, ReservationFile, book, booking_store};
use wavehub_core::environment::SystemClock;

#[derive(Parser)]
#[command(name = "wavehub-booking")]
#[command(about = "Send a reservation through the Wave Sport Hub booking flow")]
#[command(version)]
struct Cli {
    /// Reservation JSON file (sport, formule, date, fields)
    file: PathBuf,

    /// Use an in-memory calendar and gateway instead of the configured backends
    #[arg(long)]
    dry_run: bool,

    /// Attendees already booked on the requested day (dry run only)
    #[arg(long, default_value_t = 0)]
    booked: u32,

    /// End on a plain date page instead of the confirmation step
    #[arg(long)]
    date_page: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wavehub_booking=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    info!(
        endpoint = %config.booking.endpoint,
        calendar = %config.calendar.calendar_id,
        timezone = %config.booking.timezone,
        dry_run = cli.dry_run,
        "Configuration loaded"
    );

    let raw = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("reading {}", cli.file.display()))?;
    let reservation: ReservationFile =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", cli.file.display()))?;

    let (calendar, gateway): (Arc<dyn CalendarBackend>, Arc<dyn BookingBackend>) = if cli.dry_run {
        let calendar = InMemoryCalendar::new();
        if cli.booked > 0 {
            let noon = reservation
                .date
                .and_hms_opt(12, 0, 0)
                .context("building a time on the requested day")?;
            calendar.add_event(noon.and_utc(), cli.booked);
        }
        (Arc::new(calendar), Arc::new(RecordingGateway::confirming("dry-run")))
    } else {
        let calendar = GoogleCalendarBackend::new(&config.calendar.api_url, &config.calendar.calendar_id)
            .with_api_key(config.calendar.api_key.clone())
            .with_access_token(config.calendar.access_token.clone());
        let gateway = HttpBookingGateway::new(&config.booking.endpoint, config.booking.request_timeout());
        (Arc::new(calendar), Arc::new(gateway))
    };

    let availability = AvailabilityChecker::new(calendar)
        .with_ceiling(config.booking.capacity_ceiling)
        .with_timezone(config.booking.timezone())
        .with_timeout(config.booking.request_timeout());
    let environment = ProductionWizardEnvironment::new(Arc::new(SystemClock), availability, gateway)
        .with_timezone(config.booking.timezone())
        .with_horizon(config.booking.horizon_days);

    let flow = if cli.date_page {
        Flow::with_date_page()
    } else {
        Flow::standard()
    };
    let store = booking_store(flow, environment);

    let state = book(&store, &reservation).await?;

    match state.outcome() {
        Some(Outcome::Confirmed { reservation_id }) => {
            println!("Reservation confirmed: {reservation_id}");
        },
        Some(Outcome::Unconfirmed) => {
            println!("Reservation sent but not confirmed by the backend");
        },
        None => {
            println!("Reservation not sent (stopped at {:?})", state.current_stage());
            if let Some(alert) = state.alert() {
                println!("  {}", alert.message);
            }
            for field in state.field_errors().fields() {
                println!("  {field}: {}", state.field_errors().get(field).unwrap_or_default());
            }
            anyhow::bail!("reservation not sent");
        },
    }

    Ok(())
}
