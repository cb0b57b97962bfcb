//! Dashboard services and the flows that span more than one of them

pub mod equipment;
pub mod notifications;
pub mod router;
pub mod session;

use std::sync::Arc;

use chrono::Duration;
use parking_lot::Mutex;

use crate::{
    api::InventoryApi,
    config::NotificationConfig,
    error::{AppError, AppResult},
    storage::KeyValueStore,
};

use self::{
    equipment::{EquipmentController, Outcome},
    notifications::{Clock, NotificationCenter},
    router::{NavEntry, View, ViewRouter},
    session::{AuthSession, LOGIN_FALLBACK},
};

/// Container for all services
pub struct Services {
    pub session: Arc<AuthSession>,
    pub notifications: Arc<NotificationCenter>,
    pub equipment: Arc<EquipmentController>,
    router: Mutex<ViewRouter>,
}

impl Services {
    /// Wire the services around one API client and one session store
    pub fn new(
        api: Arc<dyn InventoryApi>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        notification_config: &NotificationConfig,
    ) -> Self {
        let ttl = Duration::seconds(notification_config.ttl_seconds as i64);
        let notifications = Arc::new(NotificationCenter::new(clock, ttl));
        let session = Arc::new(AuthSession::new(store, api.clone()));
        let equipment = Arc::new(EquipmentController::new(
            api,
            session.clone(),
            notifications.clone(),
        ));

        Self {
            session,
            notifications,
            equipment,
            router: Mutex::new(ViewRouter::new()),
        }
    }

    /// Restore the persisted session. Returns whether the user is signed in.
    pub fn start(&self) -> bool {
        if let Err(e) = self.session.restore() {
            tracing::error!("Session restore failed: {}", e);
            self.notifications
                .error(e.user_message("Could not read the saved session."));
        }

        if !self.session.is_authenticated() {
            return false;
        }

        let session = self.session.session();
        let active = {
            let mut router = self.router.lock();
            router.reconcile(session.as_ref());
            router.active()
        };
        if active == View::Equipment {
            self.equipment.mount();
        }
        true
    }

    /// Sign in and land on the initial view
    pub async fn sign_in(&self, username: &str, password: &str) -> AppResult<()> {
        match self.session.login(username, password).await {
            Ok(()) => {
                let name = self
                    .session
                    .user()
                    .map(|u| u.full_name)
                    .unwrap_or_default();
                self.notifications
                    .success(format!("Signed in. Welcome, {}!", name));
                self.router.lock().reset();
                self.equipment.mount();
                Ok(())
            }
            Err(e) => {
                self.notifications.error(e.user_message(LOGIN_FALLBACK));
                Err(e)
            }
        }
    }

    pub fn sign_out(&self) {
        self.equipment.unmount();
        self.session.logout();
        self.router.lock().reset();
    }

    pub fn active_view(&self) -> View {
        self.router.lock().active()
    }

    pub fn nav_entries(&self) -> Vec<NavEntry> {
        let session = self.session.session();
        self.router.lock().nav_entries(session.as_ref())
    }

    /// Switch screens, mounting or unmounting the equipment controller.
    ///
    /// Requests already in flight keep running; their responses are ignored
    /// once the equipment screen is gone.
    pub fn navigate(&self, view: View) -> AppResult<View> {
        if !self.session.is_authenticated() {
            return Err(AppError::Authorization(
                "Sign in to use the dashboard.".to_string(),
            ));
        }

        let session = self.session.session();
        let previous = {
            let mut router = self.router.lock();
            router.navigate(view, session.as_ref())
        };
        let previous = match previous {
            Ok(previous) => previous,
            Err(e) => {
                self.notifications.error(e.user_message("Navigation failed."));
                return Err(e);
            }
        };

        if previous == View::Equipment && view != View::Equipment {
            self.equipment.unmount();
        } else if previous != View::Equipment && view == View::Equipment {
            self.equipment.mount();
        }
        Ok(previous)
    }

    /// Initial load of the equipment screen: catalog and collection side by side
    pub async fn load_equipment_screen(&self) -> AppResult<Outcome> {
        let (types, items) = tokio::join!(
            self.equipment.load_reference_data(),
            self.equipment.list()
        );
        if let Err(e) = types {
            tracing::debug!("Continuing without equipment types: {}", e);
        }
        items
    }
}
