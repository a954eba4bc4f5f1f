//! Terminal output.

use chrono::{DateTime, Local, Utc};
use crossterm::style::{StyledContent, Stylize};
use studium_core::{
  engine::{Category, GradesBySubject, PerformanceReport, SubjectStanding},
  grade::Grade,
  reminder::Reminder,
  subject::Subject,
};
use uuid::Uuid;

use crate::{dashboard::Figures, resolve::short_id};

// ─── Pieces ───────────────────────────────────────────────────────────────────

pub fn category(c: Category) -> StyledContent<String> {
  let label = c.to_string();
  match c {
    Category::Good => label.green(),
    Category::Warning => label.yellow(),
    Category::Critical => label.red().bold(),
  }
}

/// A score coloured by its category, or a dim dash when there is no score.
pub fn score(value: f64, c: Option<Category>) -> StyledContent<String> {
  let text = format!("{value:5.2}");
  match c {
    Some(Category::Good) => text.green(),
    Some(Category::Warning) => text.yellow(),
    Some(Category::Critical) => text.red(),
    None => "    —".to_string().dim(),
  }
}

fn id(id: Uuid) -> StyledContent<String> { short_id(id).dark_grey() }

fn when(date: DateTime<Utc>) -> String {
  date.with_timezone(&Local).format("%a %d %b %Y %H:%M").to_string()
}

fn reminder_state(r: &Reminder, now: DateTime<Utc>) -> StyledContent<String> {
  let status = r.status(now);
  let pad = |label: &str| format!("{label:<8}");
  if r.completed {
    pad("done").dark_grey()
  } else if status.is_overdue {
    pad("OVERDUE").red().bold()
  } else if status.is_upcoming {
    pad("due soon").yellow()
  } else {
    pad("pending").stylize()
  }
}

fn subject_name(subjects: &[Subject], id: Option<Uuid>) -> String {
  id.and_then(|id| subjects.iter().find(|s| s.id == id))
    .map(|s| s.name.clone())
    .unwrap_or_default()
}

fn standing_line(s: &SubjectStanding) {
  println!(
    "  {}  {}  {:<28} {:>2} grade(s)  {}",
    id(s.subject.id),
    score(s.average, Some(s.category)),
    s.subject.name,
    s.grade_count,
    category(s.category),
  );
}

// ─── Listings ─────────────────────────────────────────────────────────────────

/// Subjects with their averages, when the grouped grades are available.
pub fn subjects(list: &[Subject], grouped: Option<&GradesBySubject>) {
  if list.is_empty() {
    println!("{}", "No subjects yet. Add one with `studium subjects add`.".dim());
    return;
  }
  for subject in list {
    let average = match grouped {
      Some(g) => match g.get(subject.id) {
        Some(entry) => {
          let c = Category::of(entry.average);
          format!("{}  {:>2} grade(s)", score(entry.average, Some(c)), entry.grades.len())
        }
        None => format!("{}  no grades", score(0.0, None)),
      },
      None => String::new(),
    };
    println!("  {}  {:<28} {average}", id(subject.id), subject.name);
    if let Some(desc) = subject.description.as_deref().filter(|d| !d.is_empty()) {
      println!("            {}", desc.dim());
    }
  }
}

pub fn grades(grouped: &GradesBySubject) {
  if grouped.is_empty() {
    println!("{}", "No grades yet. Add one with `studium grades add`.".dim());
    return;
  }
  for entry in grouped {
    let c = Category::of(entry.average);
    println!(
      "{}  {}  {}",
      entry.subject.name.clone().bold(),
      score(entry.average, Some(c)),
      category(c),
    );
    grade_rows(&entry.grades);
    println!();
  }
}

pub fn grade_rows(list: &[Grade]) {
  for grade in list {
    println!(
      "  {}  {}  ×{:<4} {}",
      id(grade.id),
      score(grade.value, Some(grade.category())),
      grade.weight,
      grade.name,
    );
  }
}

pub fn reminders(list: &[Reminder], subjects: &[Subject], now: DateTime<Utc>) {
  if list.is_empty() {
    println!("{}", "No reminders.".dim());
    return;
  }
  for r in list {
    let subject = subject_name(subjects, r.subject_id);
    println!(
      "  {}  {} {}  {}{}",
      id(r.id),
      reminder_state(r, now),
      when(r.date),
      r.title,
      if subject.is_empty() { String::new() } else { format!("  [{subject}]") },
    );
  }
}

// ─── Summaries ────────────────────────────────────────────────────────────────

pub fn dashboard(
  figures: &Figures,
  subjects: &[Subject],
  email: &str,
  now: DateTime<Utc>,
) {
  println!("{}  {}", "Studium".bold(), email.dark_grey());
  println!();

  match figures.subject_count {
    Some(n) => println!("  Subjects        {n}"),
    None => println!("  Subjects        {}", "unavailable".dim()),
  }

  match &figures.grades {
    Some(g) => {
      println!("  Grades          {}", g.count);
      print!("  Average        {}", score(g.average, g.category));
      match g.category {
        Some(c) => println!("  {}", category(c)),
        None => println!(),
      }
    }
    None => {
      println!("  Grades          {}", "unavailable".dim());
      println!("  Average         {}", "unavailable".dim());
    }
  }

  match &figures.reminders {
    Some(t) => println!(
      "  Reminders       {} pending of {}, {} overdue, {} due soon",
      t.pending,
      t.total,
      if t.overdue > 0 { t.overdue.to_string().red().bold() } else { t.overdue.to_string().stylize() },
      t.upcoming,
    ),
    None => println!("  Reminders       {}", "unavailable".dim()),
  }

  if let Some(standings) = figures.standings.as_ref().filter(|s| !s.is_empty()) {
    println!();
    println!("{}", "By subject".bold());
    standings.iter().for_each(standing_line);
  }

  if !figures.attention.is_empty() {
    println!();
    println!("{}", "Needs attention".bold());
    reminders(&figures.attention, subjects, now);
  }

  for (what, reason) in &figures.unavailable {
    eprintln!("{} could not load {what}: {reason}", "warning:".yellow());
  }
}

pub fn report(report: &PerformanceReport) {
  if report.standings.is_empty() {
    println!("{}", "Nothing to report until some grades are recorded.".dim());
    return;
  }

  print!("{}  {}", "Overall".bold(), score(report.overall_average, report.overall_category));
  match report.overall_category {
    Some(c) => println!("  {}", category(c)),
    None => println!(),
  }

  if let (Some(best), Some(worst)) = (report.strongest(), report.weakest())
    && best.subject.id != worst.subject.id
  {
    println!(
      "  strongest: {} ({:.2})   weakest: {} ({:.2})",
      best.subject.name, best.average, worst.subject.name, worst.average
    );
  }

  println!();
  println!("{}", "Strengths".bold().green());
  if report.strengths.is_empty() {
    println!("  {}", "none yet".dim());
  }
  report.strengths.iter().for_each(standing_line);

  println!();
  println!("{}", "Needs attention".bold().yellow());
  if report.needs_attention.is_empty() {
    println!("  {}", "nothing, every subject is on track".dim());
  }
  report.needs_attention.iter().for_each(standing_line);
}
