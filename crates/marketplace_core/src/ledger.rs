use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{
    domain::{Service, ServiceId, Session, SessionId, TBD},
    error::{ApiError, ErrorCode},
    protocol::BookingRequest,
};
use tracing::info;

use crate::{catalog::Catalog, seed};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerPolicy {
    /// Drop the selection once a booking succeeds. Off by default, which keeps
    /// the detail pane open for repeat bookings.
    #[serde(default)]
    pub clear_selection_after_booking: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingState {
    Idle,
    Selected(ServiceId),
}

#[derive(Debug, Default)]
pub struct SessionLedger {
    upcoming: Vec<Session>,
    past: Vec<Session>,
    selected: Option<ServiceId>,
    last_session_id: i64,
    policy: LedgerPolicy,
}

impl SessionLedger {
    pub fn new(policy: LedgerPolicy) -> Self {
        Self::with_sessions(Vec::new(), Vec::new(), policy)
    }

    pub fn seeded(policy: LedgerPolicy) -> Self {
        Self::with_sessions(seed::upcoming_sessions(), seed::past_sessions(), policy)
    }

    pub fn with_sessions(upcoming: Vec<Session>, past: Vec<Session>, policy: LedgerPolicy) -> Self {
        let last_session_id = upcoming
            .iter()
            .chain(past.iter())
            .map(|s| s.id.0)
            .max()
            .unwrap_or(0);
        Self {
            upcoming,
            past,
            selected: None,
            last_session_id,
            policy,
        }
    }

    pub fn upcoming(&self) -> &[Session] {
        &self.upcoming
    }

    pub fn past(&self) -> &[Session] {
        &self.past
    }

    pub fn policy(&self) -> LedgerPolicy {
        self.policy
    }

    pub fn state(&self) -> BookingState {
        match self.selected {
            Some(id) => BookingState::Selected(id),
            None => BookingState::Idle,
        }
    }

    pub fn selected_service<'c>(&self, catalog: &'c Catalog) -> Option<&'c Service> {
        self.selected.and_then(|id| catalog.service(id))
    }

    /// Points the cursor at `service_id`. An unknown id leaves the previous
    /// selection in place.
    pub fn select_service<'c>(
        &mut self,
        catalog: &'c Catalog,
        service_id: ServiceId,
    ) -> Result<&'c Service, ApiError> {
        let service = catalog
            .service(service_id)
            .ok_or_else(|| ApiError::not_found(format!("service {service_id} not found")))?;
        self.selected = Some(service.id);
        Ok(service)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn book_session(
        &mut self,
        catalog: &Catalog,
        request: &BookingRequest,
    ) -> Result<Session, ApiError> {
        let service = self.selected_service(catalog).ok_or_else(|| {
            ApiError::new(ErrorCode::NoSelection, "select a service before booking")
        })?;
        let date = normalize_slot(request.date.as_deref(), "date", DATE_FORMAT, |raw| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT).is_ok()
        })?;
        let time = normalize_slot(request.time.as_deref(), "time", TIME_FORMAT, |raw| {
            NaiveTime::parse_from_str(raw, TIME_FORMAT).is_ok()
        })?;

        let session = Session {
            id: self.next_session_id(),
            service_title: service.title.clone(),
            mentor: service.mentor.clone(),
            date,
            time: Some(time),
        };
        self.upcoming.push(session.clone());
        if self.policy.clear_selection_after_booking {
            self.selected = None;
        }

        info!(
            session_id = %session.id,
            service = %session.service_title,
            date = %session.date,
            "session booked"
        );
        Ok(session)
    }

    /// Unique past service titles in first-seen order.
    pub fn distinct_past_service_titles(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.past
            .iter()
            .filter(|s| seen.insert(s.service_title.as_str()))
            .map(|s| s.service_title.clone())
            .collect()
    }

    // Millisecond stamp, bumped when two bookings land in the same tick.
    fn next_session_id(&mut self) -> SessionId {
        let stamp = Utc::now().timestamp_millis();
        self.last_session_id = stamp.max(self.last_session_id + 1);
        SessionId(self.last_session_id)
    }
}

fn normalize_slot(
    raw: Option<&str>,
    field: &str,
    format: &str,
    is_valid: impl Fn(&str) -> bool,
) -> Result<String, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(TBD.to_string());
    };
    if raw != TBD && !is_valid(raw) {
        return Err(ApiError::validation(format!(
            "{field} '{raw}' does not match {format}"
        )));
    }
    Ok(raw.to_string())
}
