//! Command parsing and execution.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use serde_json::json;

use casebook_core::utils::truncate_string;
use casebook_core::{
    Appointment, AppointmentRef, Case, CaseRef, CaseStatus, Casebook, RecordId,
};

/// Column width for names in table output
const NAME_WIDTH: usize = 20;

/// Column width for reasons in table output
const REASON_WIDTH: usize = 40;

pub const USAGE: &str = "\
Usage: casebook [--json] <command> [args]

Commands:
  init                                  Prepare storage (and seed demo data if enabled)
  cases [term]                          List cases, optionally filtered by name/phone
  add-case <name> <phone>               Add a pending case
  set-status <case> <status> [reason]   Set pending/approved/rejected, with optional reason
  delete-case <case>                    Delete a case and cancel its active appointment
  appointments                          List all appointments, history included
  book <name> <phone> <date> <time>     Book an appointment (date YYYY-MM-DD, time e.g. 09:00-10:00)
  cancel <appointment>                  Cancel by id or #position
  cancel <name> <phone>                 Cancel the active appointment for name and phone
  slots [date]                          Show booked slots
  stats                                 Show dashboard counters
  help                                  Show this message

<case> and <appointment> are record ids, or #N for the Nth stored record.

Environment:
  CASEBOOK_BACKEND    local | remote
  CASEBOOK_DATA_DIR   directory for local collections and logs
  CASEBOOK_API_URL    base URL of the remote API
  CASEBOOK_API_TOKEN  bearer token for the remote API
  RUST_LOG            log filter (default: warn)";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Init,
    Cases { term: Option<String> },
    AddCase { name: String, phone: String },
    SetStatus { case: CaseRef, status: CaseStatus, reason: Option<String> },
    DeleteCase { case: CaseRef },
    Appointments,
    Book { name: String, phone: String, date: NaiveDate, time: String },
    Cancel { appointment: AppointmentRef },
    Slots { date: Option<NaiveDate> },
    Stats,
    Help,
}

fn parse_record<R: From<RecordId> + From<usize>>(arg: &str) -> Result<R> {
    if let Some(pos) = arg.strip_prefix('#') {
        let pos: usize = pos
            .parse()
            .with_context(|| format!("Invalid position '{}'", arg))?;
        return Ok(R::from(pos));
    }
    let id: RecordId = arg.parse().with_context(|| format!("Invalid record id '{}'", arg))?;
    Ok(R::from(id))
}

fn parse_date(arg: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(arg, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", arg))
}

impl Command {
    pub fn parse(args: &[String]) -> Result<Self> {
        let Some((name, rest)) = args.split_first() else {
            return Ok(Command::Help);
        };
        let rest: Vec<&str> = rest.iter().map(String::as_str).collect();

        let command = match (name.as_str(), rest.as_slice()) {
            ("init", []) => Command::Init,
            ("cases", []) => Command::Cases { term: None },
            ("cases", [term]) => Command::Cases { term: Some(term.to_string()) },
            ("add-case", [name, phone]) => Command::AddCase {
                name: name.to_string(),
                phone: phone.to_string(),
            },
            ("set-status", [case, status, reason @ ..]) => Command::SetStatus {
                case: parse_record(case)?,
                status: parse_status(status)?,
                reason: (!reason.is_empty()).then(|| reason.join(" ")),
            },
            ("delete-case", [case]) => Command::DeleteCase { case: parse_record(case)? },
            ("appointments", []) => Command::Appointments,
            ("book", [name, phone, date, time]) => Command::Book {
                name: name.to_string(),
                phone: phone.to_string(),
                date: parse_date(date)?,
                time: time.to_string(),
            },
            ("cancel", [appointment]) => Command::Cancel {
                appointment: parse_record(appointment)?,
            },
            ("cancel", [name, phone]) => Command::Cancel {
                appointment: AppointmentRef::identity(*name, *phone),
            },
            ("slots", []) => Command::Slots { date: None },
            ("slots", [date]) => Command::Slots { date: Some(parse_date(date)?) },
            ("stats", []) => Command::Stats,
            ("help" | "--help" | "-h", _) => Command::Help,
            (other, _) => bail!("Unknown command or wrong arguments: '{}'\n\n{}", other, USAGE),
        };
        Ok(command)
    }
}

fn print_cases(cases: &[Case], as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(cases)?);
        return Ok(());
    }
    if cases.is_empty() {
        println!("No cases.");
        return Ok(());
    }
    println!(
        "{:<4} {:<36} {:<w$} {:<13} {:<9} Reason",
        "#", "Id", "Name", "Phone", "Status",
        w = NAME_WIDTH
    );
    for (pos, case) in cases.iter().enumerate() {
        println!(
            "{:<4} {:<36} {:<w$} {:<13} {:<9} {}",
            pos,
            case.id.to_string(),
            truncate_string(&case.name, NAME_WIDTH),
            case.phone,
            case.status.as_str(),
            truncate_string(&case.reason, REASON_WIDTH),
            w = NAME_WIDTH
        );
    }
    Ok(())
}

fn print_appointments(appointments: &[Appointment], as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(appointments)?);
        return Ok(());
    }
    if appointments.is_empty() {
        println!("No appointments.");
        return Ok(());
    }
    println!(
        "{:<4} {:<36} {:<w$} {:<13} {:<14} {:<12} Status",
        "#", "Id", "Name", "Phone", "Date", "Time",
        w = NAME_WIDTH
    );
    for (pos, appt) in appointments.iter().enumerate() {
        println!(
            "{:<4} {:<36} {:<w$} {:<13} {:<14} {:<12} {}",
            pos,
            appt.id.to_string(),
            truncate_string(&appt.name, NAME_WIDTH),
            appt.phone,
            appt.display_date,
            appt.time.as_str(),
            appt.status,
            w = NAME_WIDTH
        );
    }
    Ok(())
}

/// Run one command against an initialized casebook.
pub async fn run(casebook: &Casebook, command: Command, as_json: bool) -> Result<()> {
    match command {
        Command::Help => println!("{}", USAGE),
        Command::Init => {
            let cases = casebook.cases().get_all().await;
            let appointments = casebook.appointments().get_all().await;
            println!(
                "Storage ready: {} cases, {} appointments.",
                cases.len(),
                appointments.len()
            );
        }
        Command::Cases { term } => {
            let cases = casebook.cases().search(term.as_deref()).await;
            print_cases(&cases, as_json)?;
        }
        Command::AddCase { name, phone } => {
            let case = casebook.cases().add(Case::new(name, phone)).await?;
            print_cases(std::slice::from_ref(&case), as_json)?;
        }
        Command::SetStatus { case, status, reason } => {
            let updated = match reason {
                Some(reason) => {
                    casebook
                        .cases()
                        .update_status_with_reason(case, status, reason)
                        .await?
                }
                None => casebook.cases().update_status(case, status).await?,
            };
            print_cases(std::slice::from_ref(&updated), as_json)?;
        }
        Command::DeleteCase { case } => {
            let removed = casebook.cases().delete(case).await?;
            println!("Deleted case {} ({}).", removed.name, removed.id);
        }
        Command::Appointments => {
            let appointments = casebook.appointments().get_all().await;
            print_appointments(&appointments, as_json)?;
        }
        Command::Book { name, phone, date, time } => {
            let appointment = casebook
                .appointments()
                .add(Appointment::new(name, phone, date, time))
                .await?;
            print_appointments(std::slice::from_ref(&appointment), as_json)?;
        }
        Command::Cancel { appointment } => {
            let cancelled = casebook.appointments().cancel(appointment).await?;
            print_appointments(std::slice::from_ref(&cancelled), as_json)?;
        }
        Command::Slots { date } => {
            let slots = casebook.appointments().booked_slots().await;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&slots)?);
            } else if let Some(date) = date {
                let booked = slots.booked_on(date);
                if booked.is_empty() {
                    println!("No booked slots on {}.", date);
                }
                for time in booked {
                    println!("{} {}", date, time);
                }
            } else if slots.is_empty() {
                println!("No booked slots.");
            } else {
                for (date, times) in slots.iter() {
                    for time in times {
                        println!("{} {}", date, time);
                    }
                }
            }
        }
        Command::Stats => {
            let stats = casebook.statistics();
            let total = stats.total_appointments().await;
            let approved = stats.approved_case_count().await;
            let pending = stats.pending_case_count().await;
            if as_json {
                let value = json!({
                    "totalAppointments": total,
                    "approvedCases": approved,
                    "pendingCases": pending,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("Appointments:   {}", total);
                println!("Approved cases: {}", approved);
                println!("Pending cases:  {}", pending);
            }
        }
    }
    Ok(())
}

/// Split off the global `--json` flag.
pub fn split_json_flag(args: Vec<String>) -> (Vec<String>, bool) {
    let as_json = args.iter().any(|a| a == "--json");
    let rest = args.into_iter().filter(|a| a != "--json").collect();
    (rest, as_json)
}

/// Turn a status string into a `CaseStatus` with a friendly error.
pub fn parse_status(s: &str) -> Result<CaseStatus> {
    s.parse()
        .map_err(|_| anyhow!("Invalid status '{}', expected pending, approved or rejected", s))
}
