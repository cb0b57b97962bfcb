//! Equipment collection controller
//!
//! List / create / edit / delete state for the Equipment screen. The API is
//! the single source of truth: every successful write re-fetches the whole
//! collection instead of patching the local copy.
//!
//! State lives behind a mutex that is never held across an `.await`, so
//! overlapping calls are possible; mutating calls are serialized by an
//! in-flight flag and late responses are dropped once the screen unmounts.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    api::InventoryApi,
    error::{AppError, AppResult},
    models::{Capability, Equipment, EquipmentDraft, EquipmentStatus, EquipmentType},
    services::{notifications::NotificationCenter, session::AuthSession},
};

pub const LIST_FALLBACK: &str = "Could not load equipment.";
pub const CREATE_FALLBACK: &str = "Could not create the equipment.";
pub const UPDATE_FALLBACK: &str = "Could not update the equipment.";
pub const DELETE_FALLBACK: &str = "Could not delete the equipment.";
pub const CREATED: &str = "Equipment created.";
pub const UPDATED: &str = "Equipment updated.";
pub const DELETED: &str = "Equipment deleted.";
pub const NOT_SIGNED_IN: &str = "You must be signed in to do that.";
pub const ADMIN_ONLY_DELETE: &str = "Only administrators can delete equipment.";
pub const ADMIN_ONLY_EDIT: &str = "Only administrators can add or edit equipment.";
pub const ASSIGNED_NOT_DELETABLE: &str =
    "Assigned equipment cannot be deleted. Return it to stock first.";
pub const OPERATION_IN_FLIGHT: &str = "Please wait for the current operation to finish.";
pub const CONFIRM_DELETE: &str =
    "Are you sure you want to delete this equipment? This cannot be undone.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

/// Create/edit form currently open on the screen
#[derive(Debug, Clone, PartialEq)]
pub struct OpenForm {
    pub mode: FormMode,
    pub draft: EquipmentDraft,
}

/// What the screen renders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionState {
    pub items: Vec<Equipment>,
    pub types: Vec<EquipmentType>,
    pub loading: bool,
    pub error: Option<String>,
    pub loaded_once: bool,
    pub form: Option<OpenForm>,
    pub in_flight: bool,
}

/// How an operation that did not fail ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    /// The user declined the confirmation prompt
    Cancelled,
    /// The response arrived after the screen was unmounted and was ignored
    Stale,
}

#[derive(Debug, Default)]
struct Inner {
    view: CollectionState,
    epoch: u64,
    mounted: bool,
}

/// Clears the in-flight flag however the operation ends
struct InFlight<'a>(&'a Mutex<Inner>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.lock().view.in_flight = false;
    }
}

pub struct EquipmentController {
    api: Arc<dyn InventoryApi>,
    session: Arc<AuthSession>,
    notifications: Arc<NotificationCenter>,
    inner: Mutex<Inner>,
}

impl EquipmentController {
    pub fn new(
        api: Arc<dyn InventoryApi>,
        session: Arc<AuthSession>,
        notifications: Arc<NotificationCenter>,
    ) -> Self {
        Self {
            api,
            session,
            notifications,
            inner: Mutex::new(Inner::default()),
        }
    }

    // ------------------------------------------------------------------
    // Screen lifecycle
    // ------------------------------------------------------------------

    /// Screen became visible: start from an empty, never-loaded state
    pub fn mount(&self) {
        let mut inner = self.inner.lock();
        inner.epoch += 1;
        inner.mounted = true;
        let in_flight = inner.view.in_flight;
        inner.view = CollectionState {
            in_flight,
            ..CollectionState::default()
        };
        tracing::debug!("Equipment screen mounted (epoch {})", inner.epoch);
    }

    /// Screen went away: drop the draft and ignore responses still on the way
    pub fn unmount(&self) {
        let mut inner = self.inner.lock();
        inner.epoch += 1;
        inner.mounted = false;
        inner.view.form = None;
        inner.view.loading = false;
        tracing::debug!("Equipment screen unmounted (epoch {})", inner.epoch);
    }

    pub fn is_mounted(&self) -> bool {
        self.inner.lock().mounted
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Fetch the whole collection and replace the cached copy.
    ///
    /// On failure the cache is kept if something was loaded before, and stays
    /// empty on a first load.
    pub async fn list(&self) -> AppResult<Outcome> {
        let token = self.require_token()?;
        let epoch = {
            let mut inner = self.inner.lock();
            inner.view.loading = true;
            inner.view.error = None;
            inner.epoch
        };

        let result = self.api.list_equipment(&token).await;

        let mut inner = self.inner.lock();
        if inner.epoch != epoch {
            tracing::debug!("Discarding equipment list response for epoch {}", epoch);
            return Ok(Outcome::Stale);
        }
        inner.view.loading = false;

        match result {
            Ok(items) => {
                tracing::info!("Loaded {} equipment records", items.len());
                inner.view.items = items;
                inner.view.loaded_once = true;
                Ok(Outcome::Done)
            }
            Err(e) => {
                let message = e.user_message(LIST_FALLBACK);
                tracing::warn!("Failed to load equipment: {}", e);
                inner.view.error = Some(message.clone());
                if !inner.view.loaded_once {
                    inner.view.items.clear();
                }
                drop(inner);
                self.notifications.error(message);
                Err(e)
            }
        }
    }

    /// Fetch the type catalog. Failures are only logged.
    pub async fn load_reference_data(&self) -> AppResult<Outcome> {
        let token = self
            .session
            .token()
            .ok_or_else(|| AppError::Authorization(NOT_SIGNED_IN.to_string()))?;
        let epoch = self.epoch();

        match self.api.list_equipment_types(&token).await {
            Ok(types) => {
                let mut inner = self.inner.lock();
                if inner.epoch != epoch {
                    return Ok(Outcome::Stale);
                }
                tracing::debug!("Loaded {} equipment types", types.len());
                inner.view.types = types;
                Ok(Outcome::Done)
            }
            Err(e) => {
                tracing::warn!("Failed to load equipment types: {}", e);
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Form
    // ------------------------------------------------------------------

    /// Open an empty create form, discarding any open draft. Admin only.
    pub fn begin_create(&self) -> AppResult<EquipmentDraft> {
        self.open_form(FormMode::Create, EquipmentDraft::default())
    }

    /// Open an edit form prefilled from `item`, discarding any open draft. Admin only.
    pub fn begin_edit(&self, item: &Equipment) -> AppResult<EquipmentDraft> {
        self.open_form(FormMode::Edit(item.id), EquipmentDraft::from(item))
    }

    fn open_form(&self, mode: FormMode, draft: EquipmentDraft) -> AppResult<EquipmentDraft> {
        self.require(Capability::EditEquipment, ADMIN_ONLY_EDIT)?;
        let previous = self.inner.lock().view.form.replace(OpenForm {
            mode,
            draft: draft.clone(),
        });
        if previous.is_some() {
            tracing::debug!("Discarding unsaved draft");
        }
        Ok(draft)
    }

    pub fn cancel(&self) {
        self.inner.lock().view.form = None;
    }

    /// Validate and send the draft, creating or updating depending on the open form
    pub async fn submit(&self, draft: EquipmentDraft) -> AppResult<Outcome> {
        self.require(Capability::EditEquipment, ADMIN_ONLY_EDIT)?;
        let draft = draft.normalized();

        let missing = draft.missing_fields();
        if !missing.is_empty() {
            let message = format!("Please complete all required fields: {}.", missing.join(", "));
            self.keep_draft(&draft);
            self.notifications.error(message.clone());
            return Err(AppError::Validation(message));
        }

        let token = self.require_token()?;
        let _in_flight = self.begin_operation()?;
        let (mode, epoch) = {
            let mut inner = self.inner.lock();
            let mode = inner.view.form.as_ref().map_or(FormMode::Create, |f| f.mode);
            inner.view.form = Some(OpenForm {
                mode,
                draft: draft.clone(),
            });
            (mode, inner.epoch)
        };

        let (result, fallback, done) = match mode {
            FormMode::Create => (
                self.api.create_equipment(&token, &draft).await,
                CREATE_FALLBACK,
                CREATED,
            ),
            FormMode::Edit(id) => (
                self.api.update_equipment(&token, id, &draft).await,
                UPDATE_FALLBACK,
                UPDATED,
            ),
        };

        if self.epoch() != epoch {
            tracing::debug!("Discarding submit response for epoch {}", epoch);
            return Ok(Outcome::Stale);
        }

        match result {
            Ok(message) => {
                tracing::info!("Saved equipment {} ({:?})", draft.inventory_code, mode);
                self.inner.lock().view.form = None;
                self.notifications.success(message.unwrap_or_else(|| done.to_string()));
                self.resync().await;
                Ok(Outcome::Done)
            }
            Err(e) => {
                tracing::warn!("Failed to save equipment {}: {}", draft.inventory_code, e);
                self.notifications.error(e.user_message(fallback));
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Delete one record. Admin only, never while assigned, and only after
    /// `confirm` agrees.
    pub async fn delete<F>(&self, id: i64, confirm: F) -> AppResult<Outcome>
    where
        F: FnOnce(&str) -> bool,
    {
        self.require(Capability::DeleteEquipment, ADMIN_ONLY_DELETE)?;

        let assigned = self
            .inner
            .lock()
            .view
            .items
            .iter()
            .any(|e| e.id == id && e.status == EquipmentStatus::Assigned);
        if assigned {
            tracing::warn!("Refusing to delete assigned equipment {}", id);
            self.notifications.error(ASSIGNED_NOT_DELETABLE);
            return Err(AppError::Validation(ASSIGNED_NOT_DELETABLE.to_string()));
        }

        let token = self.require_token()?;
        let _in_flight = self.begin_operation()?;
        if !confirm(CONFIRM_DELETE) {
            tracing::debug!("Delete of equipment {} cancelled", id);
            return Ok(Outcome::Cancelled);
        }

        let epoch = self.epoch();
        let result = self.api.delete_equipment(&token, id).await;

        if self.epoch() != epoch {
            tracing::debug!("Discarding delete response for epoch {}", epoch);
            return Ok(Outcome::Stale);
        }

        match result {
            Ok(message) => {
                tracing::info!("Deleted equipment {}", id);
                self.notifications.success(message.unwrap_or_else(|| DELETED.to_string()));
                self.resync().await;
                Ok(Outcome::Done)
            }
            Err(e) => {
                tracing::warn!("Failed to delete equipment {}: {}", id, e);
                self.notifications.error(e.user_message(DELETE_FALLBACK));
                Err(e)
            }
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn state(&self) -> CollectionState {
        self.inner.lock().view.clone()
    }

    pub fn items(&self) -> Vec<Equipment> {
        self.inner.lock().view.items.clone()
    }

    pub fn types(&self) -> Vec<EquipmentType> {
        self.inner.lock().view.types.clone()
    }

    pub fn form(&self) -> Option<OpenForm> {
        self.inner.lock().view.form.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.lock().view.error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().view.loading
    }

    pub fn is_busy(&self) -> bool {
        self.inner.lock().view.in_flight
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn epoch(&self) -> u64 {
        self.inner.lock().epoch
    }

    fn require(&self, capability: Capability, message: &str) -> AppResult<()> {
        if self.session.can(capability) {
            return Ok(());
        }
        tracing::warn!("Refusing {:?} for the current role", capability);
        self.notifications.error(message);
        Err(AppError::Authorization(message.to_string()))
    }

    fn require_token(&self) -> AppResult<String> {
        self.session.token().ok_or_else(|| {
            self.notifications.error(NOT_SIGNED_IN);
            AppError::Authorization(NOT_SIGNED_IN.to_string())
        })
    }

    fn begin_operation(&self) -> AppResult<InFlight<'_>> {
        let mut inner = self.inner.lock();
        if inner.view.in_flight {
            tracing::debug!("Rejecting re-entrant equipment operation");
            return Err(AppError::Busy(OPERATION_IN_FLIGHT.to_string()));
        }
        inner.view.in_flight = true;
        Ok(InFlight(&self.inner))
    }

    fn keep_draft(&self, draft: &EquipmentDraft) {
        if let Some(form) = self.inner.lock().view.form.as_mut() {
            form.draft = draft.clone();
        }
    }

    /// Re-read the collection after a write; `list` reports its own failure
    async fn resync(&self) {
        if let Err(e) = self.list().await {
            tracing::debug!("Refresh after write failed: {}", e);
        }
    }
}
