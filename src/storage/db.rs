use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{params, OptionalExtension, Row, ToSql};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumString};

use crate::core::error::{AppError, AppResult};
use crate::storage::migrations::run_migrations;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Approval state of a partner.
///
/// `Pending` is set on registration; `Approved` and `Rejected` are decided by
/// an admin. `Rejected` is terminal and kept for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum UserState {
    Pending,
    Approved,
    Rejected,
}

impl ToSql for UserState {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_ref()))
    }
}

impl FromSql for UserState {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        UserState::from_str(text).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Структура, представляющая партнёра в базе данных.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    /// Telegram ID пользователя
    pub telegram_id: i64,
    /// Имя, введённое при регистрации
    pub name: String,
    /// Телефон из отправленного контакта
    pub phone: String,
    /// Username в Telegram, если доступен
    pub username: Option<String>,
    pub state: UserState,
    pub created_at: String,
    /// Дата одобрения или отклонения
    pub decided_at: Option<String>,
}

impl UserRecord {
    /// Partner code used as the spreadsheet key and `ref` query parameter.
    pub fn partner_code(&self) -> String {
        self.telegram_id.to_string()
    }

    pub fn is_approved(&self) -> bool {
        self.state == UserState::Approved
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            telegram_id: row.get(0)?,
            name: row.get(1)?,
            phone: row.get(2)?,
            username: row.get(3)?,
            state: row.get(4)?,
            created_at: row.get(5)?,
            decided_at: row.get(6)?,
        })
    }
}

/// Number of users in each approval state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl StateCounts {
    pub fn total(&self) -> usize {
        self.pending + self.approved + self.rejected
    }
}

const USER_COLUMNS: &str = "telegram_id, name, phone, username, state, created_at, decided_at";

/// Create a new database connection pool
///
/// Initializes a connection pool with up to 10 connections and runs schema migrations.
///
/// # Arguments
///
/// * `database_path` - Path to SQLite database file
///
/// # Example
///
/// ```no_run
/// use partnerbot::storage::db;
///
/// let pool = db::create_pool("users.db")?;
/// # Ok::<(), partnerbot::core::error::AppError>(())
/// ```
pub fn create_pool(database_path: &str) -> AppResult<DbPool> {
    let manager = SqliteConnectionManager::file(database_path);
    let pool = Pool::builder().max_size(10).build(manager)?;

    let mut conn = pool.get()?;
    run_migrations(&mut conn).map_err(|e| AppError::Config(format!("database migration failed: {:#}", e)))?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// The connection is returned to the pool when dropped.
pub fn get_connection(pool: &DbPool) -> AppResult<DbConnection> {
    Ok(pool.get()?)
}

/// Создаёт запись в состоянии PENDING или обновляет контактные данные существующей.
///
/// The state of an existing record is never changed here, so a rejected
/// partner cannot reset themselves to pending by registering again.
///
/// # Returns
///
/// The stored record after the write.
pub fn upsert_pending(
    conn: &DbConnection,
    telegram_id: i64,
    name: &str,
    phone: &str,
    username: Option<&str>,
) -> AppResult<UserRecord> {
    conn.execute(
        "INSERT INTO users (telegram_id, name, phone, username, state) VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(telegram_id) DO UPDATE SET name = excluded.name, phone = excluded.phone, username = excluded.username",
        params![telegram_id, name, phone, username, UserState::Pending],
    )?;
    log::info!("User {} saved as pending partner", telegram_id);

    get_user(conn, telegram_id)?.ok_or(AppError::NotFound(telegram_id))
}

/// Переводит пользователя в новое состояние и фиксирует время решения.
///
/// # Errors
///
/// `AppError::NotFound` if there is no record for `telegram_id`.
pub fn set_state(conn: &DbConnection, telegram_id: i64, state: UserState) -> AppResult<UserRecord> {
    let updated = conn.execute(
        "UPDATE users SET state = ?1, decided_at = CURRENT_TIMESTAMP WHERE telegram_id = ?2",
        params![state, telegram_id],
    )?;
    if updated == 0 {
        log::warn!("User {} not found for state update to {}", telegram_id, state);
        return Err(AppError::NotFound(telegram_id));
    }
    log::info!("User {} state updated to {}", telegram_id, state);

    get_user(conn, telegram_id)?.ok_or(AppError::NotFound(telegram_id))
}

/// Получает пользователя из базы данных по Telegram ID.
///
/// Возвращает `Ok(None)` если пользователь не найден.
pub fn get_user(conn: &DbConnection, telegram_id: i64) -> AppResult<Option<UserRecord>> {
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE telegram_id = ?1", USER_COLUMNS),
            params![telegram_id],
            UserRecord::from_row,
        )
        .optional()?;
    Ok(user)
}

/// Lists users in the given state, oldest registration first.
pub fn list_by_state(conn: &DbConnection, state: UserState) -> AppResult<Vec<UserRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users WHERE state = ?1 ORDER BY created_at ASC, telegram_id ASC",
        USER_COLUMNS
    ))?;
    let users = stmt
        .query_map(params![state], UserRecord::from_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(users)
}

pub fn count_by_state(conn: &DbConnection) -> AppResult<StateCounts> {
    let mut stmt = conn.prepare("SELECT state, COUNT(*) FROM users GROUP BY state")?;
    let rows = stmt.query_map([], |row| Ok((row.get::<_, UserState>(0)?, row.get::<_, i64>(1)?)))?;

    let mut counts = StateCounts::default();
    for row in rows {
        let (state, count) = row?;
        let count = usize::try_from(count).unwrap_or(0);
        match state {
            UserState::Pending => counts.pending = count,
            UserState::Approved => counts.approved = count,
            UserState::Rejected => counts.rejected = count,
        }
    }
    Ok(counts)
}
