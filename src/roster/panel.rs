//! Team panel session.
//!
//! Owns the roster store and the pending change log for one open panel, and enforces the
//! session rules: one save at a time, confirmation before discarding staged work, and no
//! state updates from responses that belong to an earlier opening of the panel.

use std::fmt;

use uuid::Uuid;

use super::change_log::{PendingChangeLog, Review};
use super::committer::{BatchCommitter, CommitPlan, CommitReport};
use super::projector::Projection;
use super::store::Roster;
use crate::api::DepartmentApi;
use crate::errors::RosterError;
use crate::models::{ChangeKind, PendingChange};

/// Identity of one opening of a panel. Responses are matched against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PanelId(Uuid);

impl PanelId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Load state of the roster store.
#[derive(Debug, Clone, PartialEq)]
pub enum RosterState {
    Unloaded,
    Loading,
    Ready(Roster),
    /// Terminal error view; only a full reload leaves it.
    Failed(String),
}

/// A roster fetch issued on behalf of one panel opening.
#[derive(Debug)]
pub struct LoadTicket {
    panel_id: PanelId,
    department_id: String,
    team_id: String,
}

impl LoadTicket {
    pub fn panel_id(&self) -> PanelId {
        self.panel_id
    }

    pub async fn fetch<A: DepartmentApi>(&self, api: &A) -> Result<Roster, RosterError> {
        Roster::load(api, &self.department_id, &self.team_id).await
    }
}

/// The right to run one save. Only [`TeamPanel::begin_save`] creates it and only
/// [`TeamPanel::finish_save`] consumes it, so two saves can never overlap.
#[derive(Debug)]
pub struct SaveTicket {
    panel_id: PanelId,
    department_id: String,
    team_id: String,
    plan: CommitPlan,
}

impl SaveTicket {
    pub fn plan(&self) -> &CommitPlan {
        &self.plan
    }

    pub async fn execute<A: DepartmentApi>(&self, api: &A) -> Result<CommitReport, RosterError> {
        BatchCommitter::new(api, &self.department_id, &self.team_id)
            .execute(&self.plan)
            .await
    }
}

/// How a save ended, from the panel's point of view.
#[derive(Debug)]
pub enum SaveCompletion {
    /// Log cleared; refresh the roster with `refresh`.
    Committed {
        report: CommitReport,
        refresh: LoadTicket,
    },
    /// Staged changes are untouched and the save can be retried.
    Failed(RosterError),
    /// The panel was closed or reopened while the batch ran; nothing was updated.
    Stale,
}

/// One team's membership panel.
#[derive(Debug)]
pub struct TeamPanel {
    department_id: String,
    team_id: String,
    panel_id: Option<PanelId>,
    state: RosterState,
    log: PendingChangeLog,
    saving: bool,
    last_error: Option<String>,
}

impl TeamPanel {
    pub fn new(department_id: impl Into<String>, team_id: impl Into<String>) -> Self {
        Self {
            department_id: department_id.into(),
            team_id: team_id.into(),
            panel_id: None,
            state: RosterState::Unloaded,
            log: PendingChangeLog::new(),
            saving: false,
            last_error: None,
        }
    }

    pub fn department_id(&self) -> &str {
        &self.department_id
    }

    pub fn team_id(&self) -> &str {
        &self.team_id
    }

    pub fn panel_id(&self) -> Option<PanelId> {
        self.panel_id
    }

    pub fn is_open(&self) -> bool {
        self.panel_id.is_some()
    }

    pub fn state(&self) -> &RosterState {
        &self.state
    }

    pub fn roster(&self) -> Option<&Roster> {
        match &self.state {
            RosterState::Ready(roster) => Some(roster),
            _ => None,
        }
    }

    pub fn pending_changes(&self) -> &[PendingChange] {
        self.log.changes()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.log.has_unsaved_changes()
    }

    /// Busy flag: true between `begin_save` and `finish_save`, across close and reopen.
    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Message of the most recent failed save, cleared by the next attempt.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Open the panel under a fresh identity and start loading.
    ///
    /// Refused while staged work exists; close (with confirmation) first. A save still in
    /// flight from an earlier opening keeps the panel busy until its ticket is finished.
    pub fn open(&mut self) -> Result<LoadTicket, RosterError> {
        if self.log.has_unsaved_changes() {
            return Err(RosterError::Precondition(format!(
                "Close the panel before reopening it; {} change(s) are unsaved",
                self.log.len()
            )));
        }

        let panel_id = PanelId::new();
        tracing::debug!(%panel_id, team_id = %self.team_id, "Opening team panel");
        self.panel_id = Some(panel_id);
        self.last_error = None;
        self.state = RosterState::Loading;
        Ok(self.ticket(panel_id))
    }

    /// Reload the roster without touching the change log: the retry path after a failed load
    /// and the refresh after a save.
    pub fn reload(&mut self) -> Result<LoadTicket, RosterError> {
        let panel_id = self.panel_id.ok_or(RosterError::PanelClosed)?;
        if self.saving {
            return Err(RosterError::SaveInProgress);
        }
        self.state = RosterState::Loading;
        Ok(self.ticket(panel_id))
    }

    /// Apply a finished load. Returns `Ok(false)` when the ticket belongs to an earlier
    /// opening and the result was ignored.
    pub fn apply_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Roster, RosterError>,
    ) -> Result<bool, RosterError> {
        if self.panel_id != Some(ticket.panel_id) {
            tracing::debug!(panel_id = %ticket.panel_id, "Ignoring stale roster load");
            return Ok(false);
        }

        match result {
            Ok(roster) => {
                self.state = RosterState::Ready(roster);
                Ok(true)
            }
            Err(err) => {
                let message = err.message();
                self.state = RosterState::Failed(message.clone());
                Err(match err {
                    RosterError::Load(_) => err,
                    _ => RosterError::Load(message),
                })
            }
        }
    }

    /// Open the panel and load the roster in one step.
    pub async fn open_and_load<A: DepartmentApi>(&mut self, api: &A) -> Result<(), RosterError> {
        let ticket = self.open()?;
        let result = ticket.fetch(api).await;
        self.apply_load(ticket, result).map(|_| ())
    }

    pub fn projection(&self) -> Result<Projection, RosterError> {
        let roster = self.ready_roster()?;
        Ok(self.log.project(roster))
    }

    pub fn review(&self) -> Review {
        self.log.review()
    }

    pub fn stage_add(&mut self, employee_id: &str) -> Result<&PendingChange, RosterError> {
        self.ensure_editable()?;
        let RosterState::Ready(roster) = &self.state else {
            return Err(RosterError::NotLoaded);
        };
        self.log.stage_add(roster, employee_id)
    }

    pub fn stage_remove(&mut self, membership_id: &str) -> Result<&PendingChange, RosterError> {
        self.ensure_editable()?;
        let RosterState::Ready(roster) = &self.state else {
            return Err(RosterError::NotLoaded);
        };
        self.log.stage_remove(roster, membership_id)
    }

    pub fn stage_assign_leader(
        &mut self,
        membership_id: &str,
    ) -> Result<&PendingChange, RosterError> {
        self.ensure_editable()?;
        let RosterState::Ready(roster) = &self.state else {
            return Err(RosterError::NotLoaded);
        };
        self.log.stage_assign_leader(roster, membership_id)
    }

    pub fn cancel_change(
        &mut self,
        employee_id: &str,
        kind: ChangeKind,
    ) -> Result<Option<PendingChange>, RosterError> {
        self.ensure_editable()?;
        self.log.cancel_change(employee_id, kind)
    }

    /// Drop every staged change (the action bar's "Discard").
    pub fn discard_changes(&mut self) -> Result<usize, RosterError> {
        self.ensure_editable()?;
        let discarded = self.log.len();
        self.log.clear();
        Ok(discarded)
    }

    /// Snapshot the log into a plan and mark the panel busy.
    pub fn begin_save(&mut self) -> Result<SaveTicket, RosterError> {
        let panel_id = self.panel_id.ok_or(RosterError::PanelClosed)?;
        if self.saving {
            return Err(RosterError::SaveInProgress);
        }
        let roster = self.ready_roster()?;
        if self.log.is_empty() {
            return Err(RosterError::Precondition("There are no changes to save".into()));
        }

        let plan = CommitPlan::build(roster, self.log.changes())?;
        self.saving = true;
        self.last_error = None;
        Ok(SaveTicket {
            panel_id,
            department_id: self.department_id.clone(),
            team_id: self.team_id.clone(),
            plan,
        })
    }

    /// Settle a save. On success the log is cleared and a refresh ticket is returned; on
    /// failure the log is left exactly as it was.
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<CommitReport, RosterError>,
    ) -> SaveCompletion {
        self.saving = false;
        if self.panel_id != Some(ticket.panel_id) {
            tracing::debug!(panel_id = %ticket.panel_id, "Ignoring stale save completion");
            return SaveCompletion::Stale;
        }

        match result {
            Ok(report) => {
                self.log.clear();
                self.state = RosterState::Loading;
                SaveCompletion::Committed {
                    report,
                    refresh: self.ticket(ticket.panel_id),
                }
            }
            Err(err) => {
                tracing::error!("Save failed: {}", err);
                self.last_error = Some(err.message());
                SaveCompletion::Failed(err)
            }
        }
    }

    /// Run a whole save: plan, execute, settle, and refresh from the server.
    ///
    /// A failed refresh after a committed batch is returned as the error; the batch itself
    /// is not retried.
    pub async fn save<A: DepartmentApi>(&mut self, api: &A) -> Result<CommitReport, RosterError> {
        let ticket = self.begin_save()?;
        let result = ticket.execute(api).await;

        match self.finish_save(ticket, result) {
            SaveCompletion::Committed { report, refresh } => {
                tracing::info!(
                    added = report.added,
                    removed = report.removed,
                    leader_calls = report.leader_calls,
                    "Roster changes saved"
                );
                let loaded = refresh.fetch(api).await;
                self.apply_load(refresh, loaded)?;
                Ok(report)
            }
            SaveCompletion::Failed(err) => Err(err),
            SaveCompletion::Stale => Err(RosterError::PanelClosed),
        }
    }

    /// Close the panel. With unsaved changes, `confirm` decides whether they are discarded;
    /// returns `false` when the operator declined and the panel stays open. An outstanding
    /// [`SaveTicket`] still has to be passed to `finish_save`.
    pub fn close<F>(&mut self, confirm: F) -> bool
    where
        F: FnOnce(&[PendingChange]) -> bool,
    {
        if self.log.has_unsaved_changes() && !confirm(self.log.changes()) {
            return false;
        }

        if let Some(panel_id) = self.panel_id.take() {
            tracing::debug!(%panel_id, discarded = self.log.len(), "Closing team panel");
        }
        self.log.clear();
        self.state = RosterState::Unloaded;
        self.last_error = None;
        true
    }

    fn ticket(&self, panel_id: PanelId) -> LoadTicket {
        LoadTicket {
            panel_id,
            department_id: self.department_id.clone(),
            team_id: self.team_id.clone(),
        }
    }

    fn ready_roster(&self) -> Result<&Roster, RosterError> {
        match &self.state {
            RosterState::Ready(roster) => Ok(roster),
            _ => Err(RosterError::NotLoaded),
        }
    }

    fn ensure_editable(&self) -> Result<(), RosterError> {
        if self.panel_id.is_none() {
            return Err(RosterError::PanelClosed);
        }
        if self.saving {
            return Err(RosterError::SaveInProgress);
        }
        Ok(())
    }
}
