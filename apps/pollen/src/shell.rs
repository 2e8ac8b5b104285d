use std::io::Write;

use anyhow::Result;
use clap::{Parser, Subcommand};
use marketplace_api::{
    book_session, catalog_view, close_service, login, logout, post_service, profile, register,
    selected_service, sessions_view, set_query, update_profile, view_service, MarketplaceContext,
};
use shared::{
    domain::{ServiceId, SortKey, ALL_CATEGORIES, KNOWN_CATEGORIES},
    error::{ApiError, ApiException},
    protocol::{
        BookingRequest, LoginRequest, MarketplaceEvent, NewServiceRequest, ProfileUpdate,
        QueryUpdate, RegisterRequest,
    },
};
use storage::AccountStore;

use crate::render;

#[derive(Parser, Debug)]
#[command(name = "pollen", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug)]
enum ShellCommand {
    /// Create the local account and log in.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        confirm: String,
        #[arg(long, default_value = "Student")]
        occupation: String,
        #[arg(long, default_value = "")]
        custom_occupation: String,
        #[arg(long, default_value = "")]
        bio: String,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    Whoami,
    Profile,
    EditProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        occupation: Option<String>,
    },
    /// Filter by text; no words clears the search.
    Search {
        words: Vec<String>,
    },
    /// Filter by exact category, or `all`.
    Category {
        words: Vec<String>,
    },
    /// featured, price-asc, price-desc or rating-desc.
    Sort {
        key: SortKey,
    },
    Services,
    Featured,
    Categories,
    /// Open the detail pane for a service.
    View {
        id: i64,
    },
    Close,
    /// Book the service open in the detail pane.
    Book {
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        time: Option<String>,
    },
    Post {
        #[arg(long)]
        title: String,
        #[arg(long)]
        mentor: String,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "")]
        price: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        featured: bool,
        #[arg(long)]
        rating: Option<String>,
    },
    Sessions,
    #[command(alias = "exit")]
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<S> {
    ctx: MarketplaceContext<S>,
    json: bool,
}

impl<S: AccountStore> Shell<S> {
    pub fn new(ctx: MarketplaceContext<S>, json: bool) -> Self {
        Self { ctx, json }
    }

    pub fn context(&self) -> &MarketplaceContext<S> {
        &self.ctx
    }

    /// Runs one input line. Marketplace errors are printed and the shell keeps
    /// going; only output failures are returned.
    pub async fn execute(&mut self, line: &str, out: &mut impl Write) -> Result<Flow> {
        let words = match split_words(line) {
            Ok(words) if words.is_empty() => return Ok(Flow::Continue),
            Ok(words) => words,
            Err(message) => {
                writeln!(out, "error: {message}")?;
                return Ok(Flow::Continue);
            }
        };
        let parsed = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed,
            Err(err) => {
                write!(out, "{err}")?;
                return Ok(Flow::Continue);
            }
        };

        match self.dispatch(parsed.command, out).await {
            Ok(flow) => Ok(flow),
            Err(err) => match err.downcast_ref::<ApiException>() {
                Some(api) => {
                    if self.json {
                        render::json(out, &MarketplaceEvent::Error(ApiError::new(api.code, api.message.clone())))?;
                    } else {
                        writeln!(out, "error: {}", api.message)?;
                    }
                    Ok(Flow::Continue)
                }
                None => Err(err),
            },
        }
    }

    async fn dispatch(&mut self, command: ShellCommand, out: &mut impl Write) -> Result<Flow> {
        let ctx = &mut self.ctx;
        match command {
            ShellCommand::Register {
                name,
                email,
                password,
                confirm,
                occupation,
                custom_occupation,
                bio,
            } => {
                let request = RegisterRequest {
                    name,
                    email,
                    password,
                    password_confirm: confirm,
                    occupation,
                    custom_occupation,
                    bio,
                };
                let event = register(ctx, request).await.map_err(ApiException::from)?;
                self.show_event(out, &event)?;
                self.show_catalog(out)?;
            }
            ShellCommand::Login { email, password } => {
                let event = login(ctx, LoginRequest { email, password })
                    .await
                    .map_err(ApiException::from)?;
                self.show_event(out, &event)?;
                self.show_catalog(out)?;
            }
            ShellCommand::Logout => {
                let event = logout(ctx).await.map_err(ApiException::from)?;
                self.show_event(out, &event)?;
            }
            ShellCommand::Whoami => match ctx.current_user() {
                Some(user) => writeln!(out, "{} <{}>", user.name, user.email)?,
                None => writeln!(out, "not logged in")?,
            },
            ShellCommand::Profile => {
                let view = profile(ctx).map_err(ApiException::from)?;
                if self.json {
                    render::json(out, &view)?;
                } else {
                    render::profile(out, &view)?;
                }
            }
            ShellCommand::EditProfile {
                name,
                bio,
                occupation,
            } => {
                let update = ProfileUpdate {
                    name,
                    bio,
                    occupation,
                };
                let event = update_profile(ctx, update)
                    .await
                    .map_err(ApiException::from)?;
                self.show_event(out, &event)?;
            }
            ShellCommand::Search { words } => {
                set_query(ctx, QueryUpdate::search(words.join(" "))).map_err(ApiException::from)?;
                self.show_catalog(out)?;
            }
            ShellCommand::Category { words } => {
                let category = match words.join(" ") {
                    joined if joined.is_empty() => ALL_CATEGORIES.to_string(),
                    joined => joined,
                };
                set_query(ctx, QueryUpdate::category(category)).map_err(ApiException::from)?;
                self.show_catalog(out)?;
            }
            ShellCommand::Sort { key } => {
                set_query(ctx, QueryUpdate::sort(key)).map_err(ApiException::from)?;
                self.show_catalog(out)?;
            }
            ShellCommand::Services => self.show_catalog(out)?,
            ShellCommand::Featured => {
                let view = catalog_view(ctx).map_err(ApiException::from)?;
                if self.json {
                    render::json(out, &view.featured)?;
                } else {
                    render::featured(out, &view.featured)?;
                }
            }
            ShellCommand::Categories => {
                writeln!(out, "{ALL_CATEGORIES}")?;
                for category in KNOWN_CATEGORIES {
                    writeln!(out, "{category}")?;
                }
            }
            ShellCommand::View { id } => {
                let event = view_service(ctx, ServiceId(id)).map_err(ApiException::from)?;
                self.show_event(out, &event)?;
            }
            ShellCommand::Close => {
                let event = close_service(ctx).map_err(ApiException::from)?;
                self.show_event(out, &event)?;
            }
            ShellCommand::Book { date, time } => {
                let event = book_session(ctx, &BookingRequest { date, time })
                    .map_err(ApiException::from)?;
                self.show_event(out, &event)?;
                self.show_sessions(out)?;
            }
            ShellCommand::Post {
                title,
                mentor,
                category,
                price,
                description,
                featured,
                rating,
            } => {
                let request = NewServiceRequest {
                    title,
                    mentor,
                    category,
                    price,
                    description,
                    featured,
                    rating,
                };
                let event = post_service(ctx, &request).map_err(ApiException::from)?;
                self.show_event(out, &event)?;
                self.show_catalog(out)?;
            }
            ShellCommand::Sessions => self.show_sessions(out)?,
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn show_event(&self, out: &mut impl Write, event: &MarketplaceEvent) -> Result<()> {
        if self.json {
            render::json(out, event)
        } else {
            render::event(out, event)?;
            Ok(())
        }
    }

    fn show_catalog(&self, out: &mut impl Write) -> Result<()> {
        let view = catalog_view(&self.ctx).map_err(ApiException::from)?;
        if self.json {
            return render::json(out, &view);
        }
        render::catalog(out, &view)?;
        if let Some(service) = selected_service(&self.ctx).map_err(ApiException::from)? {
            writeln!(out, "(viewing [{}] {})", service.id, service.title)?;
        }
        Ok(())
    }

    fn show_sessions(&self, out: &mut impl Write) -> Result<()> {
        let view = sessions_view(&self.ctx).map_err(ApiException::from)?;
        if self.json {
            render::json(out, &view)
        } else {
            render::sessions(out, &view)?;
            Ok(())
        }
    }
}

/// Splits a line on whitespace, keeping single- or double-quoted runs intact.
fn split_words(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for ch in line.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') => {
                quote = Some(ch);
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated {q} quote"));
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
