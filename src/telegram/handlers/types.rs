//! Handler types, dependencies, and dialogue state

use std::sync::Arc;

use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};
use teloxide::types::{Message, User};

use crate::core::config::Config;
use crate::referral::{MenuDispatcher, Workflow};
use crate::sheets::PartnerLedger;
use crate::storage::db::DbPool;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Registration conversation.
///
/// `AwaitingName` keeps the verified phone until the name arrives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RegistrationState {
    #[default]
    Idle,
    AwaitingContact,
    AwaitingName {
        phone: String,
    },
}

pub type RegistrationStorage = InMemStorage<RegistrationState>;
pub type RegistrationDialogue = Dialogue<RegistrationState, RegistrationStorage>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub config: Arc<Config>,
    pub db_pool: Arc<DbPool>,
    pub ledger: Arc<dyn PartnerLedger>,
    pub workflow: Arc<Workflow>,
    pub menu: Arc<MenuDispatcher>,
}

impl HandlerDeps {
    /// Wires the workflow and menu over a shared pool and ledger
    pub fn new(config: Arc<Config>, db_pool: Arc<DbPool>, ledger: Arc<dyn PartnerLedger>) -> Self {
        let workflow = Arc::new(Workflow::new(
            Arc::clone(&db_pool),
            Arc::clone(&ledger),
            config.telegram.admin_ids.clone(),
        ));
        let menu = Arc::new(MenuDispatcher::new(Arc::clone(&config), Arc::clone(&ledger)));
        Self {
            config,
            db_pool,
            ledger,
            workflow,
            menu,
        }
    }
}

/// Telegram id of a user as stored in the database
pub fn user_id_of(user: &User) -> Option<i64> {
    i64::try_from(user.id.0).ok()
}

/// Sender of a message, `None` for channel posts
pub fn sender_id(msg: &Message) -> Option<i64> {
    msg.from.as_ref().and_then(user_id_of)
}
