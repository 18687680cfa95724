//! CLI entry point for the Canvas grade calculator.
//!
//! Provides subcommands for listing courses, computing a course grade with
//! Canvas's group weighting and drop rules, projecting what-if scores,
//! grading every course at once, and serving the same features over HTTP.

use anyhow::{Context, Result, bail};
use canvas_grades::{
    canvas::{CanvasApi, CanvasSession},
    courses::{CourseSnapshot, grade_courses, load_snapshot},
    fetch::{BasicClient, HttpClient},
    grading::{Overrides, compute_breakdown},
    output::{format_percent, print_json, render_assignments, render_breakdown, render_what_if},
    server::{self, AppState, CalculateGradeRequest},
    settings::Settings,
    telemetry,
};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "canvas-grades")]
#[command(about = "Compute Canvas course grades and what-if projections", long_about = None)]
struct Cli {
    /// Canvas API token (defaults to CANVAS_API_TOKEN, otherwise prompted)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Canvas API base URL, e.g. https://school.instructure.com/api/v1
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List active courses with the grade Canvas reports
    Courses {
        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Show a course's assignments and computed grade
    Grade {
        course_id: u64,

        /// Hypothetical score for assignment N as listed (repeatable)
        #[arg(long = "set", value_name = "N=SCORE", value_parser = parse_assignment_score)]
        set: Vec<(usize, f64)>,

        /// Print the per-group calculation
        #[arg(long, default_value_t = false)]
        explain: bool,
    },
    /// Enter what-if scores interactively and see the projected grade
    WhatIf { course_id: u64 },
    /// Compute grades for every active course
    GradeAll {
        /// Maximum number of courses loaded at once
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Compute a grade from a saved calculate-grade JSON payload
    Calc {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the per-group calculation
        #[arg(long, default_value_t = false)]
        explain: bool,
    },
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,

        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let mut settings = Settings::from_env()?;
    let _log_guard = telemetry::init(&settings.log_file_path)?;

    let cli = Cli::parse();
    if let Some(base_url) = cli.base_url {
        settings.canvas_base_url = base_url;
    }

    let http: Arc<dyn HttpClient> = Arc::new(BasicClient::new(
        settings.http_timeout,
        settings.http_connect_timeout,
    )?);

    match cli.command {
        Commands::Courses { json } => {
            let api = connect(&settings, cli.token, http)?;
            let courses = api.list_courses().await?;
            if json {
                return print_json(&courses);
            }

            for course in &courses {
                println!("\nCourse ID: {}", course.id);
                println!("Name: {}", course.name);
                match (&course.current_grade, course.current_score) {
                    (grade, Some(score)) => println!(
                        "Current Grade: {} ({score}%)",
                        grade.as_deref().unwrap_or("-")
                    ),
                    _ => println!("No grade available yet."),
                }
            }
        }
        Commands::Grade { course_id, set, explain } => {
            let api = connect(&settings, cli.token, http)?;
            let snapshot = load_snapshot(api.as_ref(), course_id).await?;
            print!("{}", render_assignments(&snapshot));

            let overrides = to_overrides(&set, snapshot.submissions.len())?;
            report(&snapshot, &overrides, explain);
        }
        Commands::WhatIf { course_id } => {
            let api = connect(&settings, cli.token, http)?;
            let snapshot = load_snapshot(api.as_ref(), course_id).await?;
            print!("{}", render_assignments(&snapshot));
            println!("\nCurrent grade: {}", format_percent(snapshot.grade()));

            let overrides = read_overrides(&snapshot)?;
            if overrides.is_empty() {
                println!("No modifications entered.");
            } else {
                print!("\n{}", render_what_if(&snapshot.what_if(&overrides)));
            }
        }
        Commands::GradeAll { concurrency, json } => {
            let api = connect(&settings, cli.token, http)?;
            let courses = api.list_courses().await?;
            let concurrency = concurrency.unwrap_or(settings.fetch_concurrency);
            info!(courses = courses.len(), concurrency, "Grading all courses");

            let results = grade_courses(api, courses, concurrency).await;
            if json {
                return print_json(&results);
            }
            for result in results {
                match result.error {
                    Some(e) => println!("{} ({}): error: {e}", result.course.name, result.course.id),
                    None => println!(
                        "{} ({}): computed {} / Canvas {}",
                        result.course.name,
                        result.course.id,
                        format_percent(result.grade),
                        format_percent(result.course.current_score),
                    ),
                }
            }
        }
        Commands::Calc { input, explain } => {
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let request: CalculateGradeRequest = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse {}", input.display()))?;
            let overrides = request.overrides().map_err(anyhow::Error::msg)?;

            let breakdown =
                compute_breakdown(&request.assignments, &request.assignment_groups, Some(&overrides));
            if explain {
                print!("{}", render_breakdown(&breakdown));
            }
            println!("Grade: {}", format_percent(breakdown.grade));
        }
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                settings.server_host = host;
            }
            if let Some(port) = port {
                settings.server_port = port;
            }
            let addr = settings.server_addr();
            server::serve(AppState::new(settings, http), &addr).await?;
        }
    }

    Ok(())
}

/// Builds a Canvas client for the token from the flag, the environment, or
/// a prompt, in that order.
fn connect(
    settings: &Settings,
    token: Option<String>,
    http: Arc<dyn HttpClient>,
) -> Result<Arc<dyn CanvasApi>> {
    let token = match token.or_else(|| settings.canvas_api_token.clone()) {
        Some(token) => token,
        None => prompt_token()?,
    };
    let session = CanvasSession::new(settings, &token)?;
    info!(base_url = %session.base_url, "Using Canvas");
    Ok(Arc::new(session.client(http)?))
}

fn prompt_token() -> Result<String> {
    eprintln!("To get a Canvas API token:");
    eprintln!("1. Log into Canvas");
    eprintln!("2. Go to Account -> Settings");
    eprintln!("3. Scroll to 'Approved Integrations'");
    eprintln!("4. Click '+ New Access Token'");
    eprintln!("5. Copy the token\n");
    eprint!("Enter your Canvas API token: ");
    std::io::stderr().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let token = line.trim().to_string();
    if token.is_empty() {
        bail!("API token is required");
    }
    Ok(token)
}

fn report(snapshot: &CourseSnapshot, overrides: &Overrides, explain: bool) {
    if explain {
        print!("{}", render_breakdown(&snapshot.breakdown(None)));
    }
    println!("\nCurrent grade: {}", format_percent(snapshot.grade()));

    if !overrides.is_empty() {
        if explain {
            print!("{}", render_breakdown(&snapshot.breakdown(Some(overrides))));
        }
        print!("{}", render_what_if(&snapshot.what_if(overrides)));
    }
}

/// Converts 1-based listing numbers into overrides, checking each against
/// the number of assignments.
fn to_overrides(entries: &[(usize, f64)], count: usize) -> Result<Overrides> {
    let mut overrides = Overrides::new();
    for &(number, score) in entries {
        if number == 0 || number > count {
            bail!("Invalid assignment number {number}. Must be between 1 and {count}");
        }
        overrides.set(number - 1, score);
    }
    Ok(overrides)
}

/// Reads `N SCORE` lines from stdin until an empty line or end of input.
fn read_overrides(snapshot: &CourseSnapshot) -> Result<Overrides> {
    println!("\n=== WHAT-IF ANALYSIS ===");
    println!("Enter modifications (or press Enter to finish)");
    println!("Format: assignment_number new_score");
    println!("Example: 5 95  (changes assignment #5 to 95 points)");

    let count = snapshot.submissions.len();
    let mut overrides = Overrides::new();
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("\nModification (or Enter to calculate): ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            break;
        }

        let entry = parse_assignment_score(line)
            .map_err(anyhow::Error::msg)
            .and_then(|entry| to_overrides(&[entry], count).map(|_| entry));

        match entry {
            Ok((number, score)) => {
                overrides.set(number - 1, score);
                println!("Updated assignment #{number} to {score} points");
            }
            Err(e) => {
                warn!(input = line, "Rejected modification");
                println!("{e}");
            }
        }
    }

    Ok(overrides)
}

/// Parses `N=SCORE` or `N SCORE`.
fn parse_assignment_score(input: &str) -> Result<(usize, f64), String> {
    let (number, score) = input
        .split_once('=')
        .or_else(|| input.trim().split_once(char::is_whitespace))
        .ok_or_else(|| "Invalid format. Use: assignment_number new_score".to_string())?;

    let number = number
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("Invalid assignment number '{}'", number.trim()))?;
    let score = score
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|s| s.is_finite())
        .ok_or_else(|| format!("Invalid score '{}'", score.trim()))?;

    Ok((number, score))
}
