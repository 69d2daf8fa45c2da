mod catalog;
mod config;
mod filter;
mod models;
mod tags;
mod tui;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::catalog::{load_catalog, resolve_source};
use crate::config::{init_logger, Config};
use crate::filter::{visible_jobs, FilterState, RoleFilter, ALL_ROLES};
use crate::models::Job;

#[derive(Parser)]
#[command(name = "jobboard")]
#[command(about = "Browse a job listing catalog and narrow it down by tags")]
struct Cli {
    /// Catalog location: an http(s) URL or a path to a JSON file
    #[arg(short, long, global = true)]
    source: Option<String>,

    /// Site root to fetch /data.json from
    #[arg(long, global = true, conflicts_with = "source")]
    base_url: Option<String>,

    /// Log debug output (to stderr, or to the log file while browsing)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive board (default)
    Browse,

    /// List the jobs left after filtering
    List {
        /// Sticky tag filter; repeat to require several tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Role dropdown value
        #[arg(short, long, default_value = ALL_ROLES)]
        role: String,
    },

    /// Show the role dropdown options
    Tags,

    /// Show job details
    Show {
        /// Job ID
        id: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::new(cli.source, cli.base_url, cli.verbose);
    let command = cli.command.unwrap_or(Commands::Browse);
    let interactive = matches!(command, Commands::Browse);
    init_logger(config.log_level, &config.log_target(interactive))?;

    match command {
        Commands::Browse => {
            tui::run_browse(config.source)?;
        }

        Commands::List { tags, role } => {
            let jobs = load_jobs(&config);
            let jobs = jobs.as_slice();
            let mut filters = FilterState::new();
            for tag in &tags {
                filters.add_tag(tag);
            }
            filters.select_role(RoleFilter::from_option(&role));

            let visible = visible_jobs(jobs, &filters);
            if visible.is_empty() {
                println!("No jobs found.");
            } else {
                println!(
                    "{:<5} {:<18} {:<30} {:<10} {:<10} {:<14}",
                    "ID", "COMPANY", "POSITION", "ROLE", "LEVEL", "BADGES"
                );
                println!("{}", "-".repeat(92));
                for job in &visible {
                    println!(
                        "{:<5} {:<18} {:<30} {:<10} {:<10} {:<14}",
                        job.id,
                        truncate(&job.company, 16),
                        truncate(&job.position, 28),
                        truncate(&job.role, 10),
                        truncate(&job.level, 10),
                        job.badges().join(" ")
                    );
                }
                println!("\n{} of {} jobs", visible.len(), jobs.len());
            }
        }

        Commands::Tags => {
            for option in tags::dropdown_options(&load_jobs(&config)) {
                println!("{}", option);
            }
        }

        Commands::Show { id } => {
            let jobs = load_jobs(&config);
            match jobs.iter().find(|job| job.id == id) {
                Some(job) => print_job(job),
                None => {
                    println!("Job #{} not found.", id);
                }
            }
        }
    }

    Ok(())
}

fn load_jobs(config: &Config) -> Vec<Job> {
    load_catalog(resolve_source(&config.source).as_ref())
}

fn print_job(job: &Job) {
    println!("Job #{}", job.id);
    println!("Company: {}", job.company);
    println!("Position: {}", job.position);
    let badges = job.badges();
    if !badges.is_empty() {
        println!("Badges: {}", badges.join(", "));
    }
    println!("Posted: {}", job.posted_at);
    println!("Contract: {}", job.contract);
    println!("Location: {}", job.location);
    println!("Logo: {}", job.logo);
    let tags: Vec<&str> = job.tags().collect();
    println!("\n--- Tags ---");
    for line in textwrap::fill(&tags.join(", "), 70).lines() {
        println!("  {}", line);
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
