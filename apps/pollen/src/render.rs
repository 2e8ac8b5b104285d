use std::io::{self, Write};

use serde::Serialize;
use shared::{
    domain::{Service, Session},
    protocol::{
        CatalogView, MarketplaceEvent, ProfileView, SessionsView, NO_MATCHING_SERVICES,
        NO_PAST_SESSIONS, NO_PROFILE_HISTORY, NO_UPCOMING_SESSIONS,
    },
};

pub fn json<T: Serialize>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

pub fn catalog(out: &mut impl Write, view: &CatalogView) -> io::Result<()> {
    writeln!(
        out,
        "query: search=\"{}\" category={} sort={}",
        view.query.search_text, view.query.category, view.query.sort_key
    )?;
    if !view.featured.is_empty() {
        writeln!(out, "== Featured ==")?;
        for service in &view.featured {
            service_card(out, service)?;
        }
    }
    writeln!(out, "== Explore ==")?;
    if view.services.is_empty() {
        writeln!(out, "{NO_MATCHING_SERVICES}")?;
    }
    for service in &view.services {
        service_card(out, service)?;
    }
    Ok(())
}

pub fn featured(out: &mut impl Write, services: &[Service]) -> io::Result<()> {
    writeln!(out, "== Featured ==")?;
    if services.is_empty() {
        writeln!(out, "{NO_MATCHING_SERVICES}")?;
    }
    for service in services {
        service_card(out, service)?;
    }
    Ok(())
}

pub fn service_card(out: &mut impl Write, service: &Service) -> io::Result<()> {
    let rating = service
        .rating
        .map(|_| format!(" | ⭐ {}", service.rating_label()))
        .unwrap_or_default();
    writeln!(
        out,
        "[{}] {} by {}{} | {} | {}",
        service.id,
        service.title,
        service.mentor,
        rating,
        service.category,
        service.price_label()
    )
}

pub fn detail(out: &mut impl Write, service: &Service) -> io::Result<()> {
    writeln!(out, "{}", service.title)?;
    writeln!(out, "  mentor:   {}", service.mentor)?;
    writeln!(out, "  category: {}", service.category)?;
    writeln!(out, "  rating:   {}", service.rating_label())?;
    writeln!(out, "  price:    ${}", service.price)?;
    writeln!(out, "  {}", service.description)
}

pub fn sessions(out: &mut impl Write, view: &SessionsView) -> io::Result<()> {
    writeln!(out, "== Upcoming ==")?;
    if view.upcoming.is_empty() {
        writeln!(out, "{NO_UPCOMING_SESSIONS}")?;
    }
    for session in &view.upcoming {
        session_item(out, session)?;
    }
    writeln!(out, "== Past ==")?;
    if view.past.is_empty() {
        writeln!(out, "{NO_PAST_SESSIONS}")?;
    }
    for session in &view.past {
        session_item(out, session)?;
    }
    Ok(())
}

fn session_item(out: &mut impl Write, session: &Session) -> io::Result<()> {
    writeln!(
        out,
        "{} with {} · {} {}",
        session.service_title,
        session.mentor,
        session.date,
        session.time.as_deref().unwrap_or_default()
    )
}

pub fn profile(out: &mut impl Write, view: &ProfileView) -> io::Result<()> {
    writeln!(out, "({}) {}", view.initials, view.name)?;
    writeln!(out, "  {}", view.occupation)?;
    if !view.bio.is_empty() {
        writeln!(out, "  {}", view.bio)?;
    }
    writeln!(out, "Past services:")?;
    if view.past_service_titles.is_empty() {
        writeln!(out, "  {NO_PROFILE_HISTORY}")?;
    }
    for title in &view.past_service_titles {
        writeln!(out, "  - {title}")?;
    }
    Ok(())
}

pub fn event(out: &mut impl Write, event: &MarketplaceEvent) -> io::Result<()> {
    match event {
        MarketplaceEvent::LoggedIn { email } => writeln!(out, "Logged in as {email}."),
        MarketplaceEvent::LoggedOut => writeln!(out, "Logged out."),
        MarketplaceEvent::ProfileUpdated { profile: view } => profile(out, view),
        MarketplaceEvent::ServicePosted { service } => {
            writeln!(out, "Your service has been created and added to Explore!")?;
            service_card(out, service)
        }
        MarketplaceEvent::QueryChanged { .. } => Ok(()),
        MarketplaceEvent::ServiceSelected { service } => detail(out, service),
        MarketplaceEvent::SelectionCleared => writeln!(out, "Detail closed."),
        MarketplaceEvent::SessionBooked { .. } => {
            writeln!(out, "Session added to 'My Sessions'!")
        }
        MarketplaceEvent::Error(err) => writeln!(out, "error: {}", err.message),
    }
}
