//! `studium`, the command-line client for a Studium server.
//!
//! # Usage
//!
//! ```text
//! studium --url http://localhost:3333 register student@example.com --name "Ana"
//! studium login student@example.com
//! studium dashboard
//! studium grades add calc "Midterm" 8.5 --weight 2
//! studium reminders add "Submit project" 2025-03-15 --subject "web prog"
//! ```

mod client;
mod credentials;
mod dashboard;
mod edit;
mod input;
mod render;
mod resolve;
#[cfg(test)]
mod testing;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use clap::{Parser, Subcommand};
use client::{ApiClient, LoginResponse, SessionExpired};
use credentials::Credentials;
use crossterm::style::Stylize;
use dashboard::Snapshot;
use edit::{GradeEdit, ReminderEdit, SubjectLink};
use studium_core::{
  grade::NewGrade,
  reminder::NewReminder,
  subject::NewSubject,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:3333";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "studium", about = "Track subjects, grades and reminders")]
struct Args {
  /// Base URL of the Studium server (default: the one you signed in to,
  /// else http://localhost:3333).
  #[arg(long, global = true, env = "STUDIUM_URL")]
  url: Option<String>,

  /// Where the sign-in token is cached
  /// (default: ~/.config/studium/credentials.toml).
  #[arg(long, global = true, value_name = "FILE", env = "STUDIUM_CREDENTIALS")]
  credentials: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Sign in and cache the session token.
  Login {
    email: String,
    /// Password; prompted for on stdin when omitted.
    #[arg(long, env = "STUDIUM_PASSWORD", hide_env_values = true)]
    password: Option<String>,
  },
  /// Create an account on the server and sign in with it.
  Register {
    email: String,
    #[arg(long)]
    name: String,
    /// Password; prompted for (twice) on stdin when omitted.
    #[arg(long, env = "STUDIUM_PASSWORD", hide_env_values = true)]
    password: Option<String>,
  },
  /// End the session and forget the cached token.
  Logout,
  /// Overview: counts, averages, and reminders that need attention.
  Dashboard,
  /// Strongest and weakest subjects.
  Report,
  #[command(subcommand)]
  Subjects(SubjectCommand),
  #[command(subcommand)]
  Grades(GradeCommand),
  #[command(subcommand)]
  Reminders(ReminderCommand),
}

#[derive(Subcommand, Debug)]
enum SubjectCommand {
  /// List subjects with their averages.
  List,
  Add {
    name: String,
    #[arg(long)]
    description: Option<String>,
  },
  Edit {
    /// Subject name or id.
    subject: String,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
  },
  /// Delete a subject together with its grades.
  Rm { subject: String },
}

#[derive(Subcommand, Debug)]
enum GradeCommand {
  /// List grades grouped by subject, or one subject's grades.
  List {
    #[arg(long)]
    subject: Option<String>,
  },
  Add {
    /// Subject name or id.
    subject: String,
    name: String,
    /// Score from 0 to 10.
    value: f64,
    #[arg(long, default_value_t = 1.0)]
    weight: f64,
  },
  Edit {
    /// Grade id or id prefix.
    id: String,
    /// Move the grade to this subject (name or id).
    #[arg(long)]
    subject: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    value: Option<f64>,
    #[arg(long)]
    weight: Option<f64>,
  },
  Rm { id: String },
}

#[derive(Subcommand, Debug)]
enum ReminderCommand {
  List {
    /// Only reminders not yet completed.
    #[arg(long)]
    pending: bool,
  },
  Add {
    title: String,
    /// `YYYY-MM-DD`, `YYYY-MM-DD HH:MM`, or RFC 3339.
    due: String,
    #[arg(long)]
    description: Option<String>,
    /// Subject name or id.
    #[arg(long)]
    subject: Option<String>,
  },
  Edit {
    /// Reminder id or id prefix.
    id: String,
    #[arg(long)]
    title: Option<String>,
    /// New due date, in any format `add` accepts.
    #[arg(long)]
    due: Option<String>,
    /// New description; an empty string removes it.
    #[arg(long)]
    description: Option<String>,
    /// Attach to this subject (name or id).
    #[arg(long, conflicts_with = "no_subject")]
    subject: Option<String>,
    /// Detach from its subject.
    #[arg(long)]
    no_subject: bool,
  },
  /// Mark done, or not done again.
  Toggle { id: String },
  Rm { id: String },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::ERROR.into())
        .from_env_lossy(),
    )
    .init();

  let args = Args::parse();
  let creds_path = match args.credentials.clone() {
    Some(path) => path,
    None => credentials::default_path()?,
  };

  let result = run(args, &creds_path).await;
  if let Err(e) = &result
    && credentials::forget_if_expired(e, &creds_path)?
  {
    eprintln!(
      "{} your session has expired. Sign in again with `studium login <email>`.",
      "error:".red().bold()
    );
    std::process::exit(1);
  }
  result
}

async fn run(args: Args, creds_path: &Path) -> Result<()> {
  let cached = Credentials::load(creds_path)?;
  let url = args.url.as_deref();

  match args.command {
    Command::Login { email, password } => {
      login(server_url(url, cached), &email, password, creds_path).await
    }
    Command::Register { email, name, password } => {
      register(server_url(url, cached), &name, &email, password, creds_path).await
    }
    Command::Logout => {
      let (client, _) = connect(url, cached.as_ref())?;
      client.logout().await.or_else(|e| {
        if e.is::<SessionExpired>() { Ok(()) } else { Err(e) }
      })?;
      Credentials::remove(creds_path)?;
      println!("Signed out.");
      Ok(())
    }
    Command::Dashboard => {
      let (client, creds) = connect(url, cached.as_ref())?;
      let now = Utc::now();
      let snapshot = Snapshot::fetch(&client).await?;
      let figures = snapshot.figures(now)?;
      let subjects = snapshot.subjects.as_deref().unwrap_or(&[]);
      render::dashboard(&figures, subjects, &creds.email, now);
      Ok(())
    }
    Command::Report => {
      let (client, _) = connect(url, cached.as_ref())?;
      render::report(&client.report().await?);
      Ok(())
    }
    Command::Subjects(cmd) => subjects(&connect(url, cached.as_ref())?.0, cmd).await,
    Command::Grades(cmd) => grades(&connect(url, cached.as_ref())?.0, cmd).await,
    Command::Reminders(cmd) => reminders(&connect(url, cached.as_ref())?.0, cmd).await,
  }
}

/// Where to sign in: `--url`, else the server of the previous sign-in.
fn server_url(url: Option<&str>, cached: Option<Credentials>) -> String {
  url
    .map(str::to_string)
    .or_else(|| cached.map(|c| c.url))
    .unwrap_or_else(|| DEFAULT_URL.to_string())
}

/// A client authorised by the cached sign-in.
fn connect<'a>(
  url: Option<&str>,
  cached: Option<&'a Credentials>,
) -> Result<(ApiClient, &'a Credentials)> {
  let creds =
    cached.ok_or_else(|| anyhow!("not signed in; run `studium login <email>` first"))?;
  if creds.is_expired(Utc::now()) {
    return Err(SessionExpired.into());
  }
  let url = url.map_or_else(|| creds.url.clone(), str::to_string);
  let client = ApiClient::new(url, Some(creds.token.clone()))?;
  Ok((client, creds))
}

async fn login(
  url: String,
  email: &str,
  password: Option<String>,
  creds_path: &Path,
) -> Result<()> {
  let password = match password {
    Some(p) => p,
    None => read_password("Password: ")?,
  };
  let client = ApiClient::new(url, None)?;
  let session = client.login(email, &password).await?;
  remember(&client, session, creds_path)
}

async fn register(
  url: String,
  name: &str,
  email: &str,
  password: Option<String>,
  creds_path: &Path,
) -> Result<()> {
  let password = match password {
    Some(p) => p,
    None => {
      let first = read_password("Password: ")?;
      if read_password("Confirm password: ")? != first {
        return Err(anyhow!("passwords do not match"));
      }
      first
    }
  };
  let client = ApiClient::new(url, None)?;
  let session = client.register(name, email, &password).await?;
  remember(&client, session, creds_path)
}

/// Cache a fresh session and say who is signed in.
fn remember(client: &ApiClient, session: LoginResponse, creds_path: &Path) -> Result<()> {
  Credentials {
    url:        client.base_url().to_string(),
    email:      session.email.clone(),
    token:      session.token,
    expires_at: session.expires_at,
  }
  .save(creds_path)?;

  let who = match &session.name {
    Some(name) => format!("{} <{}>", name, session.email),
    None => session.email.clone(),
  };
  println!(
    "Signed in as {} until {}.",
    who.bold(),
    session.expires_at.with_timezone(&chrono::Local).format("%a %d %b %H:%M"),
  );
  Ok(())
}

/// Read a password from stdin.
fn read_password(prompt: &str) -> Result<String> {
  use std::io::{self, BufRead, Write};
  print!("{prompt}");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin()
    .lock()
    .read_line(&mut line)
    .context("reading password")?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

// ─── Subjects ─────────────────────────────────────────────────────────────────

async fn subjects(client: &ApiClient, cmd: SubjectCommand) -> Result<()> {
  match cmd {
    SubjectCommand::List => {
      let (list, grouped) =
        tokio::join!(client.list_subjects(), client.grades_by_subject());
      let list = list?;
      let grouped = match grouped {
        Ok(g) => Some(g),
        Err(e) if e.is::<SessionExpired>() => return Err(e),
        Err(e) => {
          tracing::warn!(error = %e, "averages unavailable");
          None
        }
      };
      render::subjects(&list, grouped.as_ref());
    }
    SubjectCommand::Add { name, description } => {
      let created = client
        .create_subject(&NewSubject { name, description })
        .await?;
      println!("Added {} ({}).", created.name.bold(), resolve::short_id(created.id));
    }
    SubjectCommand::Edit { subject, name, description } => {
      let all = client.list_subjects().await?;
      let current = resolve::subject(&all, &subject)?;
      let input = NewSubject {
        name:        name.unwrap_or_else(|| current.name.clone()),
        description: description.or_else(|| current.description.clone()),
      };
      let updated = client.update_subject(current.id, &input).await?;
      println!("Updated {}.", updated.name.bold());
    }
    SubjectCommand::Rm { subject } => {
      let all = client.list_subjects().await?;
      let target = resolve::subject(&all, &subject)?;
      client.delete_subject(target.id).await?;
      println!("Deleted {} and its grades.", target.name.clone().bold());
    }
  }
  Ok(())
}

// ─── Grades ───────────────────────────────────────────────────────────────────

async fn grades(client: &ApiClient, cmd: GradeCommand) -> Result<()> {
  match cmd {
    GradeCommand::List { subject: None } => {
      render::grades(&client.grades_by_subject().await?);
    }
    GradeCommand::List { subject: Some(query) } => {
      let all = client.list_subjects().await?;
      let target = resolve::subject(&all, &query)?;
      let (list, average) = tokio::try_join!(
        client.list_grades(Some(target.id)),
        client.subject_average(target.id),
      )?;
      let category = average
        .has_grades()
        .then(|| studium_core::engine::Category::of(average.average));
      println!(
        "{}  {}",
        target.name.clone().bold(),
        render::score(average.average, category)
      );
      render::grade_rows(&list);
    }
    GradeCommand::Add { subject, name, value, weight } => {
      let all = client.list_subjects().await?;
      let target = resolve::subject(&all, &subject)?;
      let input = NewGrade::new(target.id, name, value, weight);
      input.validate()?;
      let created = client.create_grade(&input).await?;
      println!(
        "Recorded {} {} in {}.",
        render::score(created.value, Some(created.category())),
        created.name,
        target.name.clone().bold(),
      );
    }
    GradeCommand::Edit { id, subject, name, value, weight } => {
      let all = client.list_grades(None).await?;
      let current = resolve::by_id(&all, |g| g.id, &id, "grade")?;
      let subject_id = match subject {
        Some(query) => {
          let subjects = client.list_subjects().await?;
          Some(resolve::subject(&subjects, &query)?.id)
        }
        None => None,
      };
      let input = GradeEdit { subject_id, name, value, weight }.apply(current);
      input.validate()?;
      let updated = client.update_grade(current.id, &input).await?;
      println!(
        "Updated {} to {}.",
        updated.name,
        render::score(updated.value, Some(updated.category()))
      );
    }
    GradeCommand::Rm { id } => {
      let all = client.list_grades(None).await?;
      let target = resolve::by_id(&all, |g| g.id, &id, "grade")?;
      client.delete_grade(target.id).await?;
      println!("Deleted {}.", target.name);
    }
  }
  Ok(())
}

// ─── Reminders ────────────────────────────────────────────────────────────────

async fn reminders(client: &ApiClient, cmd: ReminderCommand) -> Result<()> {
  match cmd {
    ReminderCommand::List { pending } => {
      let filter = pending.then_some(false);
      let (list, subjects) =
        tokio::try_join!(client.list_reminders(filter), client.list_subjects())?;
      render::reminders(&list, &subjects, Utc::now());
    }
    ReminderCommand::Add { title, due, description, subject } => {
      let date = input::parse_due(&due)?;
      let subject_id = match subject {
        Some(query) => {
          let all = client.list_subjects().await?;
          Some(resolve::subject(&all, &query)?.id)
        }
        None => None,
      };
      let input = NewReminder {
        title,
        description,
        date,
        completed: false,
        subject_id,
      };
      input.validate()?;
      let created = client.create_reminder(&input).await?;
      println!(
        "Added {} ({}).",
        created.title.clone().bold(),
        resolve::short_id(created.id)
      );
    }
    ReminderCommand::Edit { id, title, due, description, subject, no_subject } => {
      let all = client.list_reminders(None).await?;
      let current = resolve::by_id(&all, |r| r.id, &id, "reminder")?;
      let date = due.as_deref().map(input::parse_due).transpose()?;
      let subject = match (subject, no_subject) {
        (Some(query), _) => {
          let subjects = client.list_subjects().await?;
          SubjectLink::Set(resolve::subject(&subjects, &query)?.id)
        }
        (None, true) => SubjectLink::Clear,
        (None, false) => SubjectLink::Keep,
      };
      let input = ReminderEdit { title, date, description, subject }.apply(current);
      input.validate()?;
      let updated = client.update_reminder(current.id, &input).await?;
      println!(
        "Updated {} ({}).",
        updated.title.clone().bold(),
        resolve::short_id(updated.id)
      );
    }
    ReminderCommand::Toggle { id } => {
      let all = client.list_reminders(None).await?;
      let target = resolve::by_id(&all, |r| r.id, &id, "reminder")?;
      let toggled = client.toggle_reminder(target.id).await?;
      let state = if toggled.completed { "done" } else { "not done" };
      println!("Marked {} as {state}.", toggled.title.bold());
    }
    ReminderCommand::Rm { id } => {
      let all = client.list_reminders(None).await?;
      let target = resolve::by_id(&all, |r| r.id, &id, "reminder")?;
      client.delete_reminder(target.id).await?;
      println!("Deleted {}.", target.title);
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use axum::{Json, Router, http::StatusCode, routing::get};
  use chrono::Duration;
  use serde_json::json;

  use super::*;
  use crate::testing::serve;

  fn scratch() -> PathBuf {
    std::env::temp_dir()
      .join(format!("studium-cli-{}", uuid::Uuid::new_v4()))
      .join("credentials.toml")
  }

  fn creds(url: &str, expires_in: Duration) -> Credentials {
    Credentials {
      url:        url.into(),
      email:      "student@example.com".into(),
      token:      "ab".repeat(32),
      expires_at: Utc::now() + expires_in,
    }
  }

  fn args(url: Option<&str>, command: Command) -> Args {
    Args {
      url: url.map(str::to_string),
      credentials: None,
      command,
    }
  }

  #[test]
  fn connect_requires_a_sign_in() {
    let err = connect(None, None).err().unwrap();
    assert!(!err.is::<SessionExpired>());
    assert!(err.to_string().contains("not signed in"));
  }

  #[test]
  fn connect_refuses_a_cached_token_past_expiry() {
    let stale = creds(DEFAULT_URL, -Duration::minutes(1));
    let err = connect(None, Some(&stale)).err().unwrap();
    assert!(err.is::<SessionExpired>());

    let live = creds(DEFAULT_URL, Duration::hours(1));
    let (client, _) = connect(Some("http://elsewhere:4000"), Some(&live)).unwrap();
    assert_eq!(client.base_url(), "http://elsewhere:4000");
  }

  #[test]
  fn sign_in_url_prefers_flag_then_cache() {
    let cached = creds("http://cached:1", Duration::hours(1));
    assert_eq!(server_url(Some("http://flag:2"), Some(cached.clone())), "http://flag:2");
    assert_eq!(server_url(None, Some(cached)), "http://cached:1");
    assert_eq!(server_url(None, None), DEFAULT_URL);
  }

  #[tokio::test]
  async fn expired_cache_is_forgotten_without_a_request() {
    let path = scratch();
    creds(DEFAULT_URL, -Duration::minutes(1)).save(&path).unwrap();

    let err = run(args(None, Command::Dashboard), &path).await.unwrap_err();
    assert!(credentials::forget_if_expired(&err, &path).unwrap());
    assert!(Credentials::load(&path).unwrap().is_none());

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
  }

  #[tokio::test]
  async fn server_rejection_forgets_the_cached_token() {
    let app = Router::new().route(
      "/api/subjects",
      get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" }))) }),
    );
    let base = serve(app).await;
    let path = scratch();
    creds(&base, Duration::hours(1)).save(&path).unwrap();

    let err = run(args(None, Command::Subjects(SubjectCommand::List)), &path)
      .await
      .unwrap_err();
    assert!(err.is::<SessionExpired>());
    assert!(credentials::forget_if_expired(&err, &path).unwrap());
    assert!(!path.exists());

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
  }

  #[tokio::test]
  async fn other_failures_keep_the_cached_token() {
    let app = Router::new().route(
      "/api/subjects",
      get(|| async {
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "store failure" })))
      }),
    );
    let base = serve(app).await;
    let path = scratch();
    creds(&base, Duration::hours(1)).save(&path).unwrap();

    let err = run(args(None, Command::Subjects(SubjectCommand::List)), &path)
      .await
      .unwrap_err();
    assert!(!credentials::forget_if_expired(&err, &path).unwrap());
    assert!(path.exists());

    std::fs::remove_dir_all(path.parent().unwrap()).ok();
  }

  #[test]
  fn edit_flags_parse() {
    let parsed = Args::try_parse_from([
      "studium", "reminders", "edit", "1a2b", "--title", "Final", "--due", "2025-03-20",
      "--no-subject",
    ])
    .unwrap();
    assert!(matches!(
      parsed.command,
      Command::Reminders(ReminderCommand::Edit { no_subject: true, subject: None, .. })
    ));

    assert!(
      Args::try_parse_from([
        "studium", "reminders", "edit", "1a2b", "--subject", "calc", "--no-subject",
      ])
      .is_err()
    );

    let parsed =
      Args::try_parse_from(["studium", "grades", "edit", "1a2b", "--subject", "physics"])
        .unwrap();
    assert!(matches!(
      parsed.command,
      Command::Grades(GradeCommand::Edit { subject: Some(ref s), .. }) if s == "physics"
    ));
  }
}
