#[cfg(target_env = "musl")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use autoassign_core::{run_with_os_rng, EventPayload, GitHubApiClient, RawInputs, RunOutcome};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "auto_assign=info,autoassign_core=info";

#[derive(Parser)]
#[command(
    name = "auto-assign",
    version,
    about = "Assign issues and pull requests to users and teams"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    assign: AssignArgs,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Assign the issue or pull request of the current event (default)
    Assign(AssignArgs),
}

/// Action inputs. Values stay raw strings; the core crate coerces them.
#[derive(clap::Args, Default)]
struct AssignArgs {
    /// Token for API access (falls back to GITHUB_TOKEN)
    #[arg(long, env = "INPUT_REPO-TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Users to assign, comma-separated `login[:weight]`
    #[arg(long, env = "INPUT_ASSIGNEES")]
    assignees: Option<String>,

    /// Teams whose members are candidates, comma-separated `slug[:weight]`
    #[arg(long, env = "INPUT_TEAMS")]
    teams: Option<String>,

    /// Pick this many candidates at random (0 = everyone)
    #[arg(long, env = "INPUT_NUMOFASSIGNEE")]
    num_of_assignee: Option<String>,

    /// Do nothing when the target already has assignees
    #[arg(long, env = "INPUT_ABORTIFPREVIOUSASSIGNEES")]
    abort_if_previous_assignees: Option<String>,

    /// Remove existing assignees (and reviewers on pull requests) first
    #[arg(long, env = "INPUT_REMOVEPREVIOUSASSIGNEES")]
    remove_previous_assignees: Option<String>,

    /// Succeed even when nobody is left to assign
    #[arg(long, env = "INPUT_ALLOWNOASSIGNEES")]
    allow_no_assignees: Option<String>,

    /// Allow assigning the author of the issue or pull request
    #[arg(long, env = "INPUT_ALLOWSELFASSIGN")]
    allow_self_assign: Option<String>,

    /// Target this issue instead of the one in the event payload
    #[arg(long, env = "INPUT_ISSUENUMBER")]
    issue_number: Option<String>,

    /// Also request configured teams as pull request reviewers
    #[arg(long, env = "INPUT_TEAMISPULLREQUESTREVIEWER")]
    team_is_pull_request_reviewer: Option<String>,

    /// Fail when any selected user cannot be assigned
    #[arg(long, env = "INPUT_FAILSIFUSERSCANNOTBEASSIGNED")]
    fails_if_users_cannot_be_assigned: Option<String>,

    /// Event payload file
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let args = match cli.command {
        Some(Commands::Assign(args)) => args,
        None => cli.assign,
    };
    std::process::exit(run_assign(args));
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Filter empty string from Option (unset action inputs arrive as "")
fn clean_opt(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.trim().is_empty())
}

/// Raw input value, empty when unset
fn raw(v: &Option<String>) -> &str {
    clean_opt(v).unwrap_or_default()
}

impl AssignArgs {
    fn raw_inputs(&self) -> RawInputs<'_> {
        RawInputs {
            assignees: raw(&self.assignees),
            teams: raw(&self.teams),
            num_of_assignee: raw(&self.num_of_assignee),
            abort_if_previous_assignees: raw(&self.abort_if_previous_assignees),
            remove_previous_assignees: raw(&self.remove_previous_assignees),
            allow_no_assignees: raw(&self.allow_no_assignees),
            allow_self_assign: raw(&self.allow_self_assign),
            issue_number: raw(&self.issue_number),
            team_is_pull_request_reviewer: raw(&self.team_is_pull_request_reviewer),
            fails_if_users_cannot_be_assigned: raw(&self.fails_if_users_cannot_be_assigned),
        }
    }
}

/// Escape workflow command data (`%`, `\r`, `\n`)
fn escape_data(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Report a failure as a workflow error annotation
fn fail(err: &dyn std::fmt::Display) -> i32 {
    tracing::error!(error = %err, "auto-assign failed");
    println!("::error::{}", escape_data(&err.to_string()));
    1
}

fn run_assign(args: AssignArgs) -> i32 {
    let config = match args.raw_inputs().into_config() {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build();
    let rt = match rt {
        Ok(rt) => rt,
        Err(e) => return fail(&format!("failed to create runtime: {e}")),
    };

    let token = clean_opt(&args.token).map(str::to_string);
    let event_path = args.event_path.clone();

    let result = rt.block_on(async {
        let payload = match event_path {
            Some(path) => EventPayload::from_path(path).await?,
            None => EventPayload::from_env().await?,
        };
        let client = GitHubApiClient::from_env(token)?;
        tracing::debug!(api = client.base_url(), "using GitHub API");
        let outcome = run_with_os_rng(&client, &payload, &config).await?;
        Ok::<_, autoassign_core::Error>(outcome)
    });

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => return fail(&e),
    };

    match &outcome {
        RunOutcome::Assigned(result) => tracing::info!(
            assignees = ?result.assignees,
            reviewers = ?result.reviewers,
            team_reviewers = ?result.team_reviewers,
            "assignment complete"
        ),
        RunOutcome::Aborted { previous_assignees } => tracing::info!(
            previous = ?previous_assignees,
            "aborted, target already has assignees"
        ),
    }

    if let Some(path) = std::env::var_os("GITHUB_OUTPUT").filter(|p| !p.is_empty()) {
        if let Err(e) = write_gha_output(Path::new(&path), &outcome) {
            tracing::warn!(error = %e, "cannot write GITHUB_OUTPUT");
        }
    }

    0
}

/// Append `assignees`, `reviewers` and `aborted` to the step output file
fn write_gha_output(path: &Path, outcome: &RunOutcome) -> std::io::Result<()> {
    let (assignees, reviewers): (&[String], &[String]) = match outcome.result() {
        Some(result) => (&result.assignees, &result.reviewers),
        None => (&[], &[]),
    };

    let mut f = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;

    writeln!(f, "assignees={}", serde_json::to_string(assignees)?)?;
    writeln!(f, "reviewers={}", serde_json::to_string(reviewers)?)?;
    writeln!(f, "aborted={}", outcome.is_aborted())?;
    Ok(())
}
