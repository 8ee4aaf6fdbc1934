//! Command-line front end for passengers, companies and conductors.
//!
//! The signed-in session is kept in `ULENDO_SESSION_FILE` between runs.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use dotenv::dotenv;
use tracing::debug;
use tracing_subscriber::FmtSubscriber;
use ulendo_client::{
    ApiClient, ClientError, SessionStore,
    booking_flow,
    config::ClientConfig,
    dashboard::Dashboard,
    scanner::Scanner,
    seat_picker::SeatPicker,
    ticket::Ticket,
};
use ulendo_core::models::{
    booking::{Booking, CreateBookingRequest},
    schedule::{CreateScheduleRequest, Schedule, SearchQuery},
    scan::ScanResponse,
    user::{RegisterRequest, Role},
};
use uuid::Uuid;

const USAGE: &str = "\
Usage: ulendo-cli <command> [arguments]

  search <origin> <destination> [--date YYYY-MM-DD] [--min-price N] [--max-price N]
  seats <schedule-id>
  book <schedule-id> <seat> [--name NAME] [--phone PHONE] [--email EMAIL]
  bookings
  cancel <booking-id>
  ticket <booking-id> [--png FILE]
  scan --bus <bus-id> (<qr-text> | --image FILE)
  publish <origin> <destination> <departure> <arrival> <price> <capacity> <bus-id> <company>
  register <email> <password> <full-name> [--role passenger|company] [--phone PHONE]
  login <email> <password>
  logout
  whoami
  dashboard";

/// Positional arguments and `--flag value` pairs.
struct Args {
    positional: Vec<String>,
    flags: HashMap<String, String>,
}

impl Args {
    fn parse(raw: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut positional = Vec::new();
        let mut flags = HashMap::new();
        let mut raw = raw.into_iter();
        while let Some(arg) = raw.next() {
            match arg.strip_prefix("--") {
                Some(flag) => {
                    let value = raw
                        .next()
                        .ok_or_else(|| eyre!("--{} needs a value", flag))?;
                    flags.insert(flag.to_string(), value);
                }
                None => positional.push(arg),
            }
        }
        Ok(Self { positional, flags })
    }

    fn get(&self, index: usize, name: &str) -> Result<&str> {
        self.positional
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| eyre!("Missing <{}>\n\n{}", name, USAGE))
    }

    fn flag(&self, name: &str) -> Option<&str> {
        self.flags.get(name).map(String::as_str)
    }

    fn parsed<T>(&self, index: usize, name: &str) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.get(index, name)?;
        raw.parse()
            .map_err(|err| eyre!("Invalid <{}> '{}': {}", name, raw, err))
    }

    fn parsed_flag<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.flag(name)
            .map(|raw| {
                raw.parse()
                    .map_err(|err| eyre!("Invalid --{} '{}': {}", name, raw, err))
            })
            .transpose()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenv().ok();

    let config = ClientConfig::from_env()?;
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut raw = std::env::args().skip(1);
    let Some(command) = raw.next() else {
        println!("{}", USAGE);
        return Ok(());
    };

    // Errors are shown as the service worded them
    if let Err(err) = run(&config, &command, raw).await {
        eprintln!("{}", err);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(
    config: &ClientConfig,
    command: &str,
    raw: impl IntoIterator<Item = String>,
) -> Result<()> {
    let args = Args::parse(raw)?;
    let sessions = SessionStore::new(&config.session_file);
    let mut client = ApiClient::new(&config.api_url).with_session(sessions.load()?);
    debug!(api = %client.base_url(), command, "running");

    match command {
        "search" => {
            let query = SearchQuery {
                origin: args.get(0, "origin")?.to_string(),
                destination: args.get(1, "destination")?.to_string(),
                date: args.flag("date").map(str::to_string),
                min_price: args.parsed_flag("min-price")?,
                max_price: args.parsed_flag("max-price")?,
            };
            let schedules = client.search_schedules(&query).await?;
            if schedules.is_empty() {
                println!("No schedules found");
            }
            for schedule in &schedules {
                print_schedule(schedule);
            }
        }
        "seats" => {
            let booked = client.booked_seats(args.parsed(0, "schedule-id")?).await?;
            let picker = SeatPicker::from_response(&booked);
            print!("{}", picker.render());
            println!("{} of {} seats free", picker.map().available_count(), booked.seating_capacity);
        }
        "book" => {
            let schedule_id: Uuid = args.parsed(0, "schedule-id")?;
            let mut picker = SeatPicker::from_response(&client.booked_seats(schedule_id).await?);
            picker.select(args.parsed(1, "seat")?)?;

            let booking = client
                .book(&CreateBookingRequest {
                    schedule_id,
                    seat_number: picker.require_selection()?,
                    passenger_name: args.flag("name").map(str::to_string),
                    passenger_phone: args.flag("phone").map(str::to_string),
                    passenger_email: args.flag("email").map(str::to_string),
                })
                .await?;
            println!("Booked seat {} ({})", booking.seat_number, booking.booking_reference);
            print_ticket(&booking)?;
        }
        "bookings" => {
            let bookings = client.bookings().await?;
            if bookings.is_empty() {
                println!("No bookings yet");
            }
            for booking in &bookings {
                println!(
                    "{}  {}  seat {:<3} {:<10} {}  {}",
                    booking.id,
                    booking.booking_reference,
                    booking.seat_number,
                    booking.status,
                    booking.schedule.route_label(),
                    booking.schedule.departure_time.format("%Y-%m-%d %H:%M"),
                );
            }
        }
        "cancel" => {
            let booking = find_booking(&client, args.parsed(0, "booking-id")?).await?;
            let response = booking_flow::cancel(&client, &booking).await?;
            println!("{}", response.message);
        }
        "ticket" => {
            let booking = find_booking(&client, args.parsed(0, "booking-id")?).await?;
            match args.flag("png") {
                Some(path) => {
                    let png = client.ticket_png(booking.id).await?;
                    std::fs::write(path, png).wrap_err_with(|| format!("Writing {}", path))?;
                    println!("Saved ticket to {}", path);
                }
                None => print_ticket(&booking)?,
            }
        }
        "scan" => {
            let scanner = Scanner::new(args.flag("bus").map(str::to_string));
            let response = match args.flag("image") {
                Some(path) => {
                    let bytes = std::fs::read(Path::new(path))
                        .wrap_err_with(|| format!("Reading {}", path))?;
                    scanner.validate_image(&client, &bytes).await?
                }
                None => {
                    let input = args.positional.join(" ");
                    scanner.validate(&client, &input).await?
                }
            };
            print_scan(&response);
        }
        "publish" => {
            let schedule = client
                .create_schedule(&CreateScheduleRequest {
                    origin: args.get(0, "origin")?.to_string(),
                    destination: args.get(1, "destination")?.to_string(),
                    departure_time: args.parsed::<DateTime<Utc>>(2, "departure")?,
                    arrival_time: args.parsed::<DateTime<Utc>>(3, "arrival")?,
                    price: args.parsed(4, "price")?,
                    seating_capacity: args.parsed(5, "capacity")?,
                    bus_id: args.get(6, "bus-id")?.to_string(),
                    company_name: args.get(7, "company")?.to_string(),
                })
                .await?;
            println!("Published schedule {}", schedule.id);
            print_schedule(&schedule);
        }
        "register" => {
            let role = match args.flag("role") {
                Some(role) => role.parse::<Role>()?,
                None => Role::Passenger,
            };
            let session = client
                .register(&RegisterRequest {
                    email: args.get(0, "email")?.to_string(),
                    password: args.get(1, "password")?.to_string(),
                    full_name: args.positional.get(2..).unwrap_or_default().join(" "),
                    role,
                    phone: args.flag("phone").map(str::to_string),
                })
                .await?;
            sessions.save(&session)?;
            println!("Welcome, {}", session.user.full_name);
            print!("{}", Dashboard::for_role(session.user.role).render());
        }
        "login" => {
            let session = client
                .login(args.get(0, "email")?, args.get(1, "password")?)
                .await?;
            sessions.save(&session)?;
            println!("Signed in as {} ({})", session.user.full_name, session.user.role);
            print!("{}", Dashboard::for_role(session.user.role).render());
        }
        "logout" => {
            // The local session goes even when the server call fails
            let result = client.logout().await;
            sessions.clear()?;
            match result {
                Ok(response) => println!("{}", response.message),
                Err(ClientError::NotSignedIn) => println!("Not signed in"),
                Err(err) => return Err(err.into()),
            }
        }
        "whoami" => {
            let user = client.whoami().await?;
            println!("{} <{}>", user.full_name, user.email);
            println!("Role: {}", user.role);
            if let Some(phone) = &user.phone {
                println!("Phone: {}", phone);
            }
        }
        "dashboard" => {
            let user = client.current_user().ok_or(ClientError::NotSignedIn)?;
            print!("{}", Dashboard::for_role(user.role).render());
        }
        "help" | "--help" | "-h" => println!("{}", USAGE),
        other => bail!("Unknown command '{}'\n\n{}", other, USAGE),
    }

    Ok(())
}

async fn find_booking(client: &ApiClient, id: Uuid) -> Result<Booking> {
    client
        .bookings()
        .await?
        .into_iter()
        .find(|booking| booking.id == id)
        .ok_or_else(|| eyre!("Booking not found"))
}

fn print_schedule(schedule: &Schedule) {
    println!(
        "{}  {}  {} - {}  MWK {:.2}  {}/{} free  {} ({})",
        schedule.id,
        schedule.route_label(),
        schedule.departure_time.format("%Y-%m-%d %H:%M"),
        schedule.arrival_time.format("%H:%M"),
        schedule.price,
        schedule.available_seats,
        schedule.seating_capacity,
        schedule.bus_id,
        schedule.company_name,
    );
}

fn print_ticket(booking: &Booking) -> Result<()> {
    let ticket = Ticket::for_booking(booking)?;
    println!("{}", ticket.terminal()?);
    println!("{}", ticket.summary());
    Ok(())
}

fn print_scan(response: &ScanResponse) {
    let mark = if response.success { "VALID" } else { "REJECTED" };
    println!("{}: {}", mark, response.message);
    if let Some(name) = &response.passenger_name {
        println!("  Passenger  {}", name);
    }
    if let Some(seat) = response.seat_number {
        println!("  Seat       {}", seat);
    }
    if let Some(route) = &response.route {
        println!("  Route      {}", route);
    }
    if let Some(departure) = response.departure_time {
        println!("  Departure  {}", departure.format("%Y-%m-%d %H:%M UTC"));
    }
}
