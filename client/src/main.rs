//! `unbind` command-line front end.
//!
//! Each invocation loads settings, wires the HTTP backend and the file mirror
//! into a session container, runs one command and prints the outcome.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use client::config::ClientSettings;
use client::domain::{
    AnalysisTotals, FREE_PLAN_ANALYSIS_LIMIT, Plan, PlanStatus, SessionContainer, SessionSource,
    SessionState, StoredAnalysis, SubscriptionService,
};
use client::outbound::http::HttpBackend;
use client::outbound::mirror::FileSessionMirror;
use color_eyre::eyre::{Context, Result, eyre};
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

type Container = SessionContainer<HttpBackend, FileSessionMirror>;

#[derive(Debug, Parser)]
#[command(name = "unbind", version, about = "UnBind session client")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Restore and show the current session.
    Status,
    /// Sign in with email and password.
    Login {
        /// Account email.
        #[arg(long, value_name = "email")]
        email: String,
        /// Account password.
        #[arg(long, value_name = "password")]
        password: String,
    },
    /// Create an account and sign in.
    Signup {
        /// Display name for the new account.
        #[arg(long, value_name = "name")]
        username: String,
        /// Account email.
        #[arg(long, value_name = "email")]
        email: String,
        /// Account password.
        #[arg(long, value_name = "password")]
        password: String,
    },
    /// Sign out and clear the local mirror.
    Logout,
    /// Change the account password.
    Password {
        /// Password in use now.
        #[arg(long, value_name = "password")]
        current: String,
        /// Replacement password.
        #[arg(long, value_name = "password")]
        new: String,
    },
    /// List stored analyses with risk summaries.
    Analyses,
    /// Show or change the subscription plan.
    Plan {
        #[command(subcommand)]
        action: PlanCommand,
    },
}

#[derive(Debug, Subcommand)]
enum PlanCommand {
    /// Show the active plan.
    Show,
    /// Activate a paid plan (Brief, Motion or Verdict).
    Activate {
        /// Plan name.
        #[arg(value_name = "plan")]
        plan: Plan,
    },
    /// Return to the free tier.
    Cancel,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    // Arguments belong to clap; settings come from files and the environment.
    let settings = ClientSettings::load_from_iter([OsString::from("unbind")])
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let backend = Arc::new(
        HttpBackend::new(settings.api_base_url()?, settings.request_timeout())
            .wrap_err("failed to build backend client")?,
    );
    let mirror = Arc::new(
        FileSessionMirror::open(settings.mirror_dir()).wrap_err("failed to open session mirror")?,
    );
    let container = SessionContainer::new(Arc::clone(&backend), mirror);
    let plans = SubscriptionService::new(backend);

    run(cli.command, &container, &plans).await
}

async fn run(
    command: Command,
    container: &Container,
    plans: &SubscriptionService<HttpBackend>,
) -> Result<()> {
    match command {
        Command::Status => {
            let state = container.restore().await;
            print_session(&state);
        }
        Command::Login { email, password } => {
            let user = container.login(&email, &password).await?;
            println!("signed in as {} <{}>", user.username(), user.email());
            print_totals(&container.analyses());
        }
        Command::Signup {
            username,
            email,
            password,
        } => {
            let user = container.signup(&username, &email, &password).await?;
            println!("account created for {} <{}>", user.username(), user.email());
        }
        Command::Logout => {
            container.restore().await;
            container.logout().await;
            println!("signed out");
        }
        Command::Password { current, new } => {
            let user = container.restore_confirmed().await?;
            container.update_password(&current, &new).await?;
            println!("password updated for {}", user.email());
        }
        Command::Analyses => {
            // `restore_confirmed` loads the list.
            container.restore_confirmed().await?;
            let analyses = container.analyses();
            for analysis in &analyses {
                println!(
                    "{}  {}  {}  ({})",
                    analysis.id,
                    analysis.analysis_date.format("%Y-%m-%d"),
                    analysis.file_name,
                    analysis.risk_summary()
                );
            }
            print_totals(&analyses);
        }
        Command::Plan { action } => {
            container.restore_confirmed().await?;
            run_plan(action, container, plans).await?;
        }
    }
    Ok(())
}

async fn run_plan(
    action: PlanCommand,
    container: &Container,
    plans: &SubscriptionService<HttpBackend>,
) -> Result<()> {
    let status = match action {
        PlanCommand::Show => {
            let status = plans.status().await?;
            if status.has_reached_analysis_limit(container.analyses().len()) {
                println!(
                    "free plan limit of {FREE_PLAN_ANALYSIS_LIMIT} analysis reached; upgrade to analyse more"
                );
            }
            status
        }
        PlanCommand::Activate { plan } => plans.activate(plan).await?,
        PlanCommand::Cancel => plans.cancel().await?,
    };
    print_plan(status);
    Ok(())
}

fn print_session(state: &SessionState) {
    let Some(user) = state.user() else {
        println!("not signed in");
        return;
    };
    let origin = match state.source() {
        Some(SessionSource::Mirror) => " (from local mirror; backend session not confirmed)",
        _ => "",
    };
    println!("signed in as {} <{}>{origin}", user.username(), user.email());
    if state.source() == Some(SessionSource::Backend) {
        print_totals(state.analyses());
    }
}

fn print_totals(analyses: &[StoredAnalysis]) {
    let totals = AnalysisTotals::from_analyses(analyses);
    println!(
        "{} stored analyses, {} clauses reviewed, {} high risk",
        totals.analyses(),
        totals.clauses(),
        totals.high_risk_clauses()
    );
}

fn print_plan(status: PlanStatus) {
    println!("plan: {status}");
    if let Some(plan) = status.plan() {
        for benefit in plan.benefits() {
            println!("  - {benefit}");
        }
    }
}
