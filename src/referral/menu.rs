//! Actions available to approved partners

use std::sync::Arc;

use crate::core::config::Config;
use crate::core::error::{AppError, AppResult};
use crate::qr::QrIssuer;
use crate::sheets::PartnerLedger;
use crate::storage::db::UserRecord;

/// Reply-keyboard entries of the partner menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ReferralLink,
    Balance,
    Support,
}

impl MenuAction {
    pub const ALL: [MenuAction; 3] = [MenuAction::ReferralLink, MenuAction::Balance, MenuAction::Support];

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::ReferralLink => "Моя реферальная ссылка",
            MenuAction::Balance => "Посмотреть баланс",
            MenuAction::Support => "Поддержка",
        }
    }

    pub fn from_text(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|action| action.label() == text)
    }
}

/// Referral link plus its QR card, if one could be rendered.
#[derive(Debug, Clone)]
pub struct ReferralCard {
    pub url: String,
    pub qr: Option<Vec<u8>>,
}

pub struct MenuDispatcher {
    config: Arc<Config>,
    ledger: Arc<dyn PartnerLedger>,
    qr: QrIssuer,
}

impl MenuDispatcher {
    pub fn new(config: Arc<Config>, ledger: Arc<dyn PartnerLedger>) -> Self {
        let qr = QrIssuer::new(&config.qr);
        Self { config, ledger, qr }
    }

    pub fn referral_url(&self, partner_code: &str) -> String {
        self.config.referral_link(partner_code)
    }

    /// Link and QR card; a failed branded render falls back to a plain code,
    /// then to the link alone.
    pub fn referral_card(&self, record: &UserRecord) -> AppResult<ReferralCard> {
        ensure_approved(record)?;
        let url = self.referral_url(&record.partner_code());

        let qr = match self.qr.generate(&url) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::error!("QR render failed for {}: {}, using plain code", record.telegram_id, e);
                QrIssuer::generate_plain(&url)
                    .map_err(|e| log::error!("Plain QR render failed for {}: {}", record.telegram_id, e))
                    .ok()
            }
        };
        Ok(ReferralCard { url, qr })
    }

    /// Current balance, fetched fresh on every call.
    pub async fn balance(&self, record: &UserRecord) -> AppResult<f64> {
        ensure_approved(record)?;
        self.ledger.get_balance(&record.partner_code()).await
    }

    pub fn support_contact(&self) -> &str {
        &self.config.referral.support_username
    }
}

fn ensure_approved(record: &UserRecord) -> AppResult<()> {
    if record.is_approved() {
        return Ok(());
    }
    Err(AppError::Validation(
        "Ожидайте подтверждения в реферальной системе.\nМы уведомим вас, как только ваша заявка будет рассмотрена."
            .to_string(),
    ))
}
