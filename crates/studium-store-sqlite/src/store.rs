//! [`SqliteStore`]: the SQLite implementation of [`AcademicStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use chrono::Utc;
use studium_core::{
  account::{Account, NewAccount, normalize_email},
  grade::{Grade, NewGrade},
  reminder::{NewReminder, Reminder},
  store::{AcademicStore, AccountStore},
  subject::{NewSubject, Subject},
};

use crate::{
  Error, Result,
  encode::{
    ACCOUNT_COLUMNS, GRADE_COLUMNS, REMINDER_COLUMNS, RawAccount, RawGrade,
    RawReminder, RawSubject, SUBJECT_COLUMNS, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Studium store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Execute a single-row `DELETE` and report whether a row went away.
  async fn delete_by_id(&self, sql: &'static str, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![id_str])?))
      .await?;
    Ok(removed > 0)
  }
}

/// What a write found once it reached the connection thread.
enum Written {
  Done,
  RowMissing,
  SubjectMissing,
}

impl Written {
  /// `Some(value)` when the write landed, `None` when the target row was
  /// gone, and [`Error::SubjectNotFound`] when the referenced subject was.
  fn into_result<T>(self, subject_id: Option<Uuid>, value: T) -> Result<Option<T>> {
    match self {
      Written::Done => Ok(Some(value)),
      Written::RowMissing => Ok(None),
      Written::SubjectMissing => match subject_id {
        Some(id) => Err(Error::SubjectNotFound(id)),
        None => Ok(None),
      },
    }
  }
}

/// Foreign keys are enforced by SQLite too, but checking first gives the
/// caller a typed error instead of a constraint failure.
fn subject_present(conn: &rusqlite::Connection, id: Option<&str>) -> rusqlite::Result<bool> {
  let Some(id) = id else { return Ok(true) };
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM subjects WHERE subject_id = ?1",
        rusqlite::params![id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

// ─── AcademicStore impl ──────────────────────────────────────────────────────

impl AcademicStore for SqliteStore {
  type Error = Error;

  // ── Subjects ──────────────────────────────────────────────────────────────

  async fn add_subject(&self, input: NewSubject) -> Result<Subject> {
    input.validate()?;

    let subject = Subject {
      id:          Uuid::new_v4(),
      name:        input.name,
      description: input.description,
    };

    let id_str      = encode_uuid(subject.id);
    let name        = subject.name.clone();
    let description = subject.description.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (subject_id, name, description) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name, description],
        )?;
        Ok(())
      })
      .await?;

    Ok(subject)
  }

  async fn get_subject(&self, id: Uuid) -> Result<Option<Subject>> {
    let id_str = encode_uuid(id);
    let sql = format!("SELECT {SUBJECT_COLUMNS} FROM subjects WHERE subject_id = ?1");

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawSubject::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn list_subjects(&self) -> Result<Vec<Subject>> {
    let sql = format!("SELECT {SUBJECT_COLUMNS} FROM subjects ORDER BY rowid");

    let raws: Vec<RawSubject> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawSubject::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubject::into_subject).collect()
  }

  async fn update_subject(
    &self,
    id:    Uuid,
    input: NewSubject,
  ) -> Result<Option<Subject>> {
    input.validate()?;

    let id_str      = encode_uuid(id);
    let name        = input.name.clone();
    let description = input.description.clone();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subjects SET name = ?2, description = ?3 WHERE subject_id = ?1",
          rusqlite::params![id_str, name, description],
        )?)
      })
      .await?;

    Ok((changed > 0).then(|| Subject {
      id,
      name: input.name,
      description: input.description,
    }))
  }

  async fn delete_subject(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM subjects WHERE subject_id = ?1", id)
      .await
  }

  // ── Grades ────────────────────────────────────────────────────────────────

  async fn add_grade(&self, input: NewGrade) -> Result<Grade> {
    input.validate()?;

    let grade = Grade {
      id:         Uuid::new_v4(),
      subject_id: input.subject_id,
      name:       input.name,
      value:      input.value,
      weight:     input.weight,
    };

    let id_str         = encode_uuid(grade.id);
    let subject_id_str = encode_uuid(grade.subject_id);
    let name           = grade.name.clone();
    let (value, weight) = (grade.value, grade.weight);

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !subject_present(&tx, Some(&subject_id_str))? {
          return Ok(Written::SubjectMissing);
        }
        tx.execute(
          "INSERT INTO grades (grade_id, subject_id, name, value, weight)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, subject_id_str, name, value, weight],
        )?;
        tx.commit()?;
        Ok(Written::Done)
      })
      .await?;

    if let Written::SubjectMissing = written {
      return Err(Error::SubjectNotFound(grade.subject_id));
    }
    Ok(grade)
  }

  async fn get_grade(&self, id: Uuid) -> Result<Option<Grade>> {
    let id_str = encode_uuid(id);
    let sql = format!("SELECT {GRADE_COLUMNS} FROM grades WHERE grade_id = ?1");

    let raw: Option<RawGrade> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawGrade::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawGrade::into_grade).transpose()
  }

  async fn list_grades(&self, subject_id: Option<Uuid>) -> Result<Vec<Grade>> {
    let subject_id_str = subject_id.map(encode_uuid);

    let raws: Vec<RawGrade> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(s) = subject_id_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {GRADE_COLUMNS} FROM grades WHERE subject_id = ?1 ORDER BY rowid"
          ))?;
          stmt
            .query_map(rusqlite::params![s], RawGrade::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn
            .prepare(&format!("SELECT {GRADE_COLUMNS} FROM grades ORDER BY rowid"))?;
          stmt
            .query_map([], RawGrade::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawGrade::into_grade).collect()
  }

  async fn update_grade(&self, id: Uuid, input: NewGrade) -> Result<Option<Grade>> {
    input.validate()?;

    let id_str         = encode_uuid(id);
    let subject_id_str = encode_uuid(input.subject_id);
    let name           = input.name.clone();
    let (value, weight) = (input.value, input.weight);

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM grades WHERE grade_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(Written::RowMissing);
        }
        if !subject_present(&tx, Some(&subject_id_str))? {
          return Ok(Written::SubjectMissing);
        }
        tx.execute(
          "UPDATE grades SET subject_id = ?2, name = ?3, value = ?4, weight = ?5
           WHERE grade_id = ?1",
          rusqlite::params![id_str, subject_id_str, name, value, weight],
        )?;
        tx.commit()?;
        Ok(Written::Done)
      })
      .await?;

    written.into_result(Some(input.subject_id), Grade {
      id,
      subject_id: input.subject_id,
      name:       input.name,
      value:      input.value,
      weight:     input.weight,
    })
  }

  async fn delete_grade(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM grades WHERE grade_id = ?1", id)
      .await
  }

  // ── Reminders ─────────────────────────────────────────────────────────────

  async fn add_reminder(&self, input: NewReminder) -> Result<Reminder> {
    input.validate()?;

    let reminder = Reminder {
      id:          Uuid::new_v4(),
      title:       input.title,
      description: input.description,
      date:        input.date,
      completed:   input.completed,
      subject_id:  input.subject_id,
    };

    let id_str         = encode_uuid(reminder.id);
    let title          = reminder.title.clone();
    let description    = reminder.description.clone();
    let due_at_str     = encode_dt(reminder.date);
    let completed      = reminder.completed;
    let subject_id_str = reminder.subject_id.map(encode_uuid);

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !subject_present(&tx, subject_id_str.as_deref())? {
          return Ok(Written::SubjectMissing);
        }
        tx.execute(
          "INSERT INTO reminders (
             reminder_id, title, description, due_at, completed, subject_id
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            title,
            description,
            due_at_str,
            completed,
            subject_id_str,
          ],
        )?;
        tx.commit()?;
        Ok(Written::Done)
      })
      .await?;

    if let (Written::SubjectMissing, Some(subject_id)) = (&written, reminder.subject_id) {
      return Err(Error::SubjectNotFound(subject_id));
    }
    Ok(reminder)
  }

  async fn get_reminder(&self, id: Uuid) -> Result<Option<Reminder>> {
    let id_str = encode_uuid(id);
    let sql =
      format!("SELECT {REMINDER_COLUMNS} FROM reminders WHERE reminder_id = ?1");

    let raw: Option<RawReminder> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawReminder::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawReminder::into_reminder).transpose()
  }

  async fn list_reminders(&self) -> Result<Vec<Reminder>> {
    let sql = format!("SELECT {REMINDER_COLUMNS} FROM reminders ORDER BY rowid");

    let raws: Vec<RawReminder> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawReminder::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReminder::into_reminder).collect()
  }

  async fn update_reminder(
    &self,
    id:    Uuid,
    input: NewReminder,
  ) -> Result<Option<Reminder>> {
    input.validate()?;

    let id_str         = encode_uuid(id);
    let title          = input.title.clone();
    let description    = input.description.clone();
    let due_at_str     = encode_dt(input.date);
    let completed      = input.completed;
    let subject_id_str = input.subject_id.map(encode_uuid);

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists = tx
          .query_row(
            "SELECT 1 FROM reminders WHERE reminder_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !exists {
          return Ok(Written::RowMissing);
        }
        if !subject_present(&tx, subject_id_str.as_deref())? {
          return Ok(Written::SubjectMissing);
        }
        tx.execute(
          "UPDATE reminders
           SET title = ?2, description = ?3, due_at = ?4, completed = ?5, subject_id = ?6
           WHERE reminder_id = ?1",
          rusqlite::params![
            id_str,
            title,
            description,
            due_at_str,
            completed,
            subject_id_str,
          ],
        )?;
        tx.commit()?;
        Ok(Written::Done)
      })
      .await?;

    written.into_result(input.subject_id, Reminder {
      id,
      title:       input.title,
      description: input.description,
      date:        input.date,
      completed:   input.completed,
      subject_id:  input.subject_id,
    })
  }

  async fn delete_reminder(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM reminders WHERE reminder_id = ?1", id)
      .await
  }

  async fn toggle_reminder(&self, id: Uuid) -> Result<Option<Reminder>> {
    let id_str = encode_uuid(id);
    let sql =
      format!("SELECT {REMINDER_COLUMNS} FROM reminders WHERE reminder_id = ?1");

    let raw: Option<RawReminder> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE reminders SET completed = NOT completed WHERE reminder_id = ?1",
          rusqlite::params![id_str],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        let raw = tx.query_row(&sql, rusqlite::params![id_str], RawReminder::from_row)?;
        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawReminder::into_reminder).transpose()
  }
}

// ─── AccountStore impl ───────────────────────────────────────────────────────

impl AccountStore for SqliteStore {
  async fn add_account(&self, input: NewAccount) -> Result<Option<Account>> {
    input.validate()?;

    let account = Account {
      id:            Uuid::new_v4(),
      name:          input.name.trim().to_string(),
      email:         normalize_email(&input.email),
      password_hash: input.password_hash,
      created_at:    Utc::now(),
    };

    let id_str        = encode_uuid(account.id);
    let name          = account.name.clone();
    let email         = account.email.clone();
    let password_hash = account.password_hash.clone();
    let created_at    = encode_dt(account.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT INTO accounts (account_id, name, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)
           ON CONFLICT(email) DO NOTHING",
          rusqlite::params![id_str, name, email, password_hash, created_at],
        )?)
      })
      .await?;

    Ok((inserted > 0).then_some(account))
  }

  fn find_account(
    &self,
    email: &str,
  ) -> impl Future<Output = Result<Option<Account>>> + Send + '_ {
    let email = normalize_email(email);
    async move {
      let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = ?1");

      let raw: Option<RawAccount> = self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(&sql, rusqlite::params![email], RawAccount::from_row)
              .optional()?,
          )
        })
        .await?;

      raw.map(RawAccount::into_account).transpose()
    }
  }
}
