//! Partner registration and admin approval
//!
//! A user moves `UNSEEN -> PENDING -> APPROVED | REJECTED`. Approval is the
//! only transition with a side effect outside the database: the partner's
//! row is appended to the spreadsheet ledger.

use std::sync::Arc;

use crate::core::error::{AppError, AppResult};
use crate::core::validation::{validate_contact_owner, validate_name, validate_phone};
use crate::referral::admin_action::AdminAction;
use crate::sheets::{PartnerLedger, PartnerRow};
use crate::storage::db::{self, DbPool, UserRecord, UserState};

/// Where a user currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Unseen,
    Pending(UserRecord),
    Approved(UserRecord),
    Rejected(UserRecord),
}

/// Contact shared through the "share contact" button.
#[derive(Debug, Clone)]
pub struct SharedContact {
    /// Telegram id of the contact's owner, absent for address-book entries
    pub owner_id: Option<i64>,
    pub phone: String,
}

#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub telegram_id: i64,
    pub name: String,
    pub phone: String,
    pub username: Option<String>,
}

/// Result of an admin decision.
#[derive(Debug, Clone)]
pub struct Decision {
    pub action: AdminAction,
    pub user: UserRecord,
    /// The user was already in the target state before this call
    pub already_decided: bool,
    /// A new spreadsheet row was written
    pub sheet_appended: bool,
    /// Spreadsheet failure after a committed approval
    pub sheet_error: Option<String>,
}

pub struct Workflow {
    pool: Arc<DbPool>,
    ledger: Arc<dyn PartnerLedger>,
    admin_ids: Vec<i64>,
}

impl Workflow {
    pub fn new(pool: Arc<DbPool>, ledger: Arc<dyn PartnerLedger>, admin_ids: Vec<i64>) -> Self {
        Self {
            pool,
            ledger,
            admin_ids,
        }
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    pub fn access(&self, user_id: i64) -> AppResult<Access> {
        let conn = db::get_connection(&self.pool)?;
        let access = match db::get_user(&conn, user_id)? {
            None => Access::Unseen,
            Some(user) => match user.state {
                UserState::Pending => Access::Pending(user),
                UserState::Approved => Access::Approved(user),
                UserState::Rejected => Access::Rejected(user),
            },
        };
        Ok(access)
    }

    /// Checks the contact belongs to the requester and returns its normalized phone.
    pub fn verify_contact(&self, requester: i64, contact: &SharedContact) -> AppResult<String> {
        validate_contact_owner(requester, contact.owner_id)?;
        Ok(validate_phone(&contact.phone)?)
    }

    /// Stores a PENDING record for a validated request.
    pub fn register(&self, request: RegistrationRequest) -> AppResult<UserRecord> {
        let phone = validate_phone(&request.phone)?;
        let name = validate_name(&request.name)?;

        let conn = db::get_connection(&self.pool)?;
        if let Some(existing) = db::get_user(&conn, request.telegram_id)? {
            if existing.state != UserState::Pending {
                log::warn!(
                    "User {} tried to register again while {}",
                    request.telegram_id,
                    existing.state
                );
                return Err(AppError::Validation("Ваша заявка уже рассмотрена.".to_string()));
            }
        }

        let user = db::upsert_pending(&conn, request.telegram_id, &name, &phone, request.username.as_deref())?;
        log::info!("Registration stored for user {} ({})", user.telegram_id, user.name);
        Ok(user)
    }

    /// Applies an admin decision.
    ///
    /// An approval is committed before the spreadsheet is touched; a sheet
    /// failure is reported in [`Decision::sheet_error`] and a repeated
    /// approve retries the (idempotent) append.
    pub async fn decide(&self, admin_id: i64, action: AdminAction) -> AppResult<Decision> {
        if !self.is_admin(admin_id) {
            log::warn!("User {} tried to {} without admin rights", admin_id, action);
            return Err(AppError::Validation("❌ У вас нет прав администратора.".to_string()));
        }

        let user_id = action.user_id();
        let (user, already_decided) = {
            let conn = db::get_connection(&self.pool)?;
            let user = db::get_user(&conn, user_id)?.ok_or(AppError::NotFound(user_id))?;

            match (action, user.state) {
                (AdminAction::Approve(_), UserState::Pending) => (db::set_state(&conn, user_id, UserState::Approved)?, false),
                (AdminAction::Approve(_), UserState::Approved) => (user, true),
                (AdminAction::Reject(_), UserState::Pending) => (db::set_state(&conn, user_id, UserState::Rejected)?, false),
                (AdminAction::Reject(_), UserState::Approved) => {
                    return Err(AppError::Validation("❌ Пользователь уже одобрен.".to_string()));
                }
                (_, UserState::Rejected) => {
                    return Err(AppError::Validation("❌ Заявка пользователя уже отклонена.".to_string()));
                }
            }
        };
        log::info!("Admin {} applied {} (already decided: {})", admin_id, action, already_decided);

        let mut decision = Decision {
            action,
            user,
            already_decided,
            sheet_appended: false,
            sheet_error: None,
        };

        if let AdminAction::Approve(_) = action {
            match self.ledger.append_partner_row(&PartnerRow::from_record(&decision.user)).await {
                Ok(appended) => decision.sheet_appended = appended,
                Err(e) => {
                    log::error!("Failed to add partner {} to sheet: {}", user_id, e);
                    decision.sheet_error = Some(e.to_string());
                }
            }
        }

        Ok(decision)
    }

    /// Pending registrations, oldest first.
    pub fn pending(&self) -> AppResult<Vec<UserRecord>> {
        let conn = db::get_connection(&self.pool)?;
        db::list_by_state(&conn, UserState::Pending)
    }

    pub fn approved(&self) -> AppResult<Vec<UserRecord>> {
        let conn = db::get_connection(&self.pool)?;
        db::list_by_state(&conn, UserState::Approved)
    }

    pub fn counts(&self) -> AppResult<db::StateCounts> {
        let conn = db::get_connection(&self.pool)?;
        db::count_by_state(&conn)
    }
}
