use serde::{Deserialize, Serialize};

use crate::{
    domain::{QueryState, Service, ServiceId, Session, SortKey, User},
    error::ApiError,
};

pub const NO_MATCHING_SERVICES: &str =
    "No services match your search yet. Try a different keyword or category.";
pub const NO_UPCOMING_SESSIONS: &str = "No upcoming sessions yet. Book a service to get started.";
pub const NO_PAST_SESSIONS: &str = "You don't have any past sessions yet.";
pub const NO_PROFILE_HISTORY: &str = "No past sessions yet.";

/// Raw post-service form input. Numeric fields stay textual so the catalog can
/// reject malformed values instead of coercing them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewServiceRequest {
    pub title: String,
    pub mentor: String,
    pub category: String,
    pub price: String,
    pub description: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
}

/// Partial query update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<SortKey>,
}

impl QueryUpdate {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search_text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn sort(sort_key: SortKey) -> Self {
        Self {
            sort_key: Some(sort_key),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub occupation: String,
    #[serde(default)]
    pub custom_occupation: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Structured profile edit; `None` keeps the current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub name: String,
    pub occupation: String,
    pub bio: String,
    pub initials: String,
    pub past_service_titles: Vec<String>,
}

impl ProfileView {
    pub fn from_user(user: &User, past_service_titles: Vec<String>) -> Self {
        Self {
            name: user.name.clone(),
            occupation: user.occupation.clone(),
            bio: user.bio.clone(),
            initials: user.initials(),
            past_service_titles,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogView {
    pub query: QueryState,
    pub featured: Vec<Service>,
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionsView {
    pub upcoming: Vec<Session>,
    pub past: Vec<Session>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum MarketplaceEvent {
    LoggedIn {
        email: String,
    },
    LoggedOut,
    ProfileUpdated {
        profile: ProfileView,
    },
    ServicePosted {
        service: Service,
    },
    QueryChanged {
        query: QueryState,
    },
    ServiceSelected {
        service: Service,
    },
    SelectionCleared,
    SessionBooked {
        session: Session,
        selection: Option<ServiceId>,
    },
    Error(ApiError),
}
