use marketplace_core::{Catalog, LedgerPolicy, SessionLedger};
use shared::{
    domain::{Service, ServiceId, User},
    error::{ApiError, ErrorCode},
    protocol::{
        BookingRequest, CatalogView, LoginRequest, MarketplaceEvent, NewServiceRequest,
        ProfileUpdate, ProfileView, QueryUpdate, RegisterRequest, SessionsView,
    },
};
use storage::AccountStore;
use tracing::{info, warn};

/// Occupation choice that defers to the free-text field.
pub const OTHER_OCCUPATION: &str = "Other";

/// Everything one signed-in browser tab would hold: the account store, the
/// catalog, the session ledger and who is currently logged in.
pub struct MarketplaceContext<S> {
    pub store: S,
    pub catalog: Catalog,
    pub ledger: SessionLedger,
    current_user: Option<User>,
}

impl<S: AccountStore> MarketplaceContext<S> {
    pub fn new(store: S, policy: LedgerPolicy) -> Self {
        Self::with_state(store, Catalog::seeded(), SessionLedger::seeded(policy))
    }

    pub fn with_state(store: S, catalog: Catalog, ledger: SessionLedger) -> Self {
        Self {
            store,
            catalog,
            ledger,
            current_user: None,
        }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }
}

/// Picks up a login that survived a restart: the stored account is active iff
/// the logged-in marker names its email.
pub async fn restore_session<S: AccountStore>(
    ctx: &mut MarketplaceContext<S>,
) -> Result<Option<User>, ApiError> {
    let stored = ctx.store.load_user().await.map_err(internal)?;
    let logged_in = ctx.store.logged_in_email().await.map_err(internal)?;

    ctx.current_user = match (stored, logged_in) {
        (Some(user), Some(email)) if user.email == email => Some(user),
        _ => None,
    };
    Ok(ctx.current_user.clone())
}

pub async fn register<S: AccountStore>(
    ctx: &mut MarketplaceContext<S>,
    request: RegisterRequest,
) -> Result<MarketplaceEvent, ApiError> {
    let name = request.name.trim().to_string();
    let email = request.email.trim().to_string();
    if name.is_empty() || email.is_empty() || request.password.is_empty() {
        return Err(ApiError::validation("name, email and password are required"));
    }
    if request.password != request.password_confirm {
        return Err(ApiError::validation("Passwords do not match."));
    }

    let existing = ctx.store.load_user().await.map_err(internal)?;
    if existing.is_some_and(|user| user.email == email) {
        return Err(ApiError::new(
            ErrorCode::Conflict,
            "An account already exists for this email. Please log in.",
        ));
    }

    let user = User {
        name,
        email: email.clone(),
        password: request.password,
        occupation: resolve_occupation(&request.occupation, &request.custom_occupation),
        bio: request.bio.trim().to_string(),
    };
    ctx.store.save_user(&user).await.map_err(internal)?;
    ctx.store
        .set_logged_in_email(Some(email.as_str()))
        .await
        .map_err(internal)?;
    ctx.current_user = Some(user);

    info!(%email, "account registered");
    Ok(MarketplaceEvent::LoggedIn { email })
}

pub async fn login<S: AccountStore>(
    ctx: &mut MarketplaceContext<S>,
    request: LoginRequest,
) -> Result<MarketplaceEvent, ApiError> {
    let email = request.email.trim();
    let stored = ctx.store.load_user().await.map_err(internal)?;
    let user = match stored {
        Some(user) if user.email == email && user.password == request.password => user,
        _ => {
            warn!(%email, "login rejected");
            return Err(ApiError::unauthorized("Email or password is incorrect."));
        }
    };

    ctx.store
        .set_logged_in_email(Some(user.email.as_str()))
        .await
        .map_err(internal)?;
    let email = user.email.clone();
    ctx.current_user = Some(user);

    info!(%email, "logged in");
    Ok(MarketplaceEvent::LoggedIn { email })
}

pub async fn logout<S: AccountStore>(
    ctx: &mut MarketplaceContext<S>,
) -> Result<MarketplaceEvent, ApiError> {
    ctx.store.set_logged_in_email(None).await.map_err(internal)?;
    if let Some(user) = ctx.current_user.take() {
        info!(email = %user.email, "logged out");
    }
    Ok(MarketplaceEvent::LoggedOut)
}

pub async fn update_profile<S: AccountStore>(
    ctx: &mut MarketplaceContext<S>,
    update: ProfileUpdate,
) -> Result<MarketplaceEvent, ApiError> {
    let mut user = ensure_authenticated(ctx)?.clone();
    if let Some(name) = update.name {
        user.name = name.trim().to_string();
    }
    if let Some(bio) = update.bio {
        user.bio = bio.trim().to_string();
    }
    if let Some(occupation) = update.occupation {
        user.occupation = occupation.trim().to_string();
    }

    ctx.store.save_user(&user).await.map_err(internal)?;
    let profile = ProfileView::from_user(&user, ctx.ledger.distinct_past_service_titles());
    ctx.current_user = Some(user);

    info!("profile updated");
    Ok(MarketplaceEvent::ProfileUpdated { profile })
}

pub fn profile<S: AccountStore>(ctx: &MarketplaceContext<S>) -> Result<ProfileView, ApiError> {
    let user = ensure_authenticated(ctx)?;
    Ok(ProfileView::from_user(
        user,
        ctx.ledger.distinct_past_service_titles(),
    ))
}

pub fn catalog_view<S: AccountStore>(ctx: &MarketplaceContext<S>) -> Result<CatalogView, ApiError> {
    ensure_authenticated(ctx)?;
    Ok(CatalogView {
        query: ctx.catalog.query().clone(),
        featured: ctx.catalog.featured_items(),
        services: ctx.catalog.visible_items(),
    })
}

pub fn set_query<S: AccountStore>(
    ctx: &mut MarketplaceContext<S>,
    update: QueryUpdate,
) -> Result<MarketplaceEvent, ApiError> {
    ensure_authenticated(ctx)?;
    let query = ctx.catalog.set_query(update).clone();
    Ok(MarketplaceEvent::QueryChanged { query })
}

pub fn post_service<S: AccountStore>(
    ctx: &mut MarketplaceContext<S>,
    request: &NewServiceRequest,
) -> Result<MarketplaceEvent, ApiError> {
    ensure_authenticated(ctx)?;
    let service = ctx.catalog.add_service(request)?;
    Ok(MarketplaceEvent::ServicePosted { service })
}

pub fn view_service<S: AccountStore>(
    ctx: &mut MarketplaceContext<S>,
    service_id: ServiceId,
) -> Result<MarketplaceEvent, ApiError> {
    ensure_authenticated(ctx)?;
    let service = ctx.ledger.select_service(&ctx.catalog, service_id)?.clone();
    Ok(MarketplaceEvent::ServiceSelected { service })
}

pub fn close_service<S: AccountStore>(
    ctx: &mut MarketplaceContext<S>,
) -> Result<MarketplaceEvent, ApiError> {
    ensure_authenticated(ctx)?;
    ctx.ledger.clear_selection();
    Ok(MarketplaceEvent::SelectionCleared)
}

pub fn selected_service<S: AccountStore>(
    ctx: &MarketplaceContext<S>,
) -> Result<Option<Service>, ApiError> {
    ensure_authenticated(ctx)?;
    Ok(ctx.ledger.selected_service(&ctx.catalog).cloned())
}

pub fn book_session<S: AccountStore>(
    ctx: &mut MarketplaceContext<S>,
    request: &BookingRequest,
) -> Result<MarketplaceEvent, ApiError> {
    ensure_authenticated(ctx)?;
    let session = ctx.ledger.book_session(&ctx.catalog, request)?;
    let selection = ctx.ledger.selected_service(&ctx.catalog).map(|s| s.id);
    Ok(MarketplaceEvent::SessionBooked { session, selection })
}

pub fn sessions_view<S: AccountStore>(
    ctx: &MarketplaceContext<S>,
) -> Result<SessionsView, ApiError> {
    ensure_authenticated(ctx)?;
    Ok(SessionsView {
        upcoming: ctx.ledger.upcoming().to_vec(),
        past: ctx.ledger.past().to_vec(),
    })
}

fn resolve_occupation(choice: &str, custom: &str) -> String {
    let choice = choice.trim();
    if choice != OTHER_OCCUPATION {
        return choice.to_string();
    }
    match custom.trim() {
        "" => OTHER_OCCUPATION.to_string(),
        custom => custom.to_string(),
    }
}

fn ensure_authenticated<S>(ctx: &MarketplaceContext<S>) -> Result<&User, ApiError> {
    ctx.current_user
        .as_ref()
        .ok_or_else(|| ApiError::unauthorized("log in to use the marketplace"))
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, err.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
