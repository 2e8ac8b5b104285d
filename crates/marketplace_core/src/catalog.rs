use std::{cell::OnceCell, cmp::Ordering};

use shared::{
    domain::{QueryState, Service, ServiceId, SortKey, ALL_CATEGORIES},
    error::ApiError,
    protocol::{NewServiceRequest, QueryUpdate},
};
use tracing::{debug, info};

use crate::seed;

/// Rating given to posted services that leave the field blank.
pub const DEFAULT_RATING: f64 = 5.0;
pub const MAX_RATING: f64 = 5.0;

/// Ordered service list plus the query state applied to it.
///
/// The visible view is derived lazily from `(services, query)` and cached as a
/// list of indices until the next mutation.
#[derive(Debug)]
pub struct Catalog {
    services: Vec<Service>,
    next_id: i64,
    query: QueryState,
    view: OnceCell<Vec<usize>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::from_services(Vec::new())
    }

    pub fn seeded() -> Self {
        Self::from_services(seed::services())
    }

    pub fn from_services(services: Vec<Service>) -> Self {
        let highest = services.iter().map(|s| s.id.0).max().unwrap_or(0);
        let next_id = (services.len() as i64).max(highest) + 1;
        Self {
            services,
            next_id,
            query: QueryState::default(),
            view: OnceCell::new(),
        }
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn service(&self, id: ServiceId) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn add_service(&mut self, request: &NewServiceRequest) -> Result<Service, ApiError> {
        let title = required("title", &request.title)?;
        let mentor = required("mentor", &request.mentor)?;
        let category = required("category", &request.category)?;
        let description = required("description", &request.description)?;
        let price = parse_price(&request.price)?;
        let rating = parse_rating(request.rating.as_deref())?;

        let service = Service {
            id: ServiceId(self.next_id),
            title,
            mentor,
            category,
            rating: Some(rating),
            price,
            description,
            featured: request.featured,
        };
        self.next_id += 1;
        self.services.push(service.clone());
        self.view.take();

        info!(service_id = %service.id, title = %service.title, "service posted");
        Ok(service)
    }

    pub fn set_query(&mut self, update: QueryUpdate) -> &QueryState {
        if let Some(search_text) = update.search_text {
            self.query.search_text = search_text.trim().to_string();
        }
        if let Some(category) = update.category {
            let category = category.trim();
            self.query.category = if category.is_empty() {
                ALL_CATEGORIES.to_string()
            } else {
                category.to_string()
            };
        }
        if let Some(sort_key) = update.sort_key {
            self.query.sort_key = sort_key;
        }
        self.view.take();

        debug!(
            search = %self.query.search_text,
            category = %self.query.category,
            sort = %self.query.sort_key,
            "catalog query updated"
        );
        &self.query
    }

    pub fn visible_items(&self) -> Vec<Service> {
        self.visible_indices()
            .iter()
            .map(|&idx| self.services[idx].clone())
            .collect()
    }

    pub fn featured_items(&self) -> Vec<Service> {
        self.visible_indices()
            .iter()
            .map(|&idx| &self.services[idx])
            .filter(|s| s.featured)
            .cloned()
            .collect()
    }

    fn visible_indices(&self) -> &[usize] {
        self.view.get_or_init(|| derive_view(&self.services, &self.query))
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

fn derive_view(services: &[Service], query: &QueryState) -> Vec<usize> {
    let needle = query.search_text.to_lowercase();
    let mut indices: Vec<usize> = services
        .iter()
        .enumerate()
        .filter(|(_, s)| matches_search(s, &needle) && matches_category(s, &query.category))
        .map(|(idx, _)| idx)
        .collect();

    // `sort_by` is stable, so ties keep insertion order.
    match query.sort_key {
        SortKey::PriceAsc => indices.sort_by_key(|&i| services[i].price),
        SortKey::PriceDesc => indices.sort_by(|&a, &b| services[b].price.cmp(&services[a].price)),
        SortKey::RatingDesc => {
            indices.sort_by(|&a, &b| rating_key(&services[b]).total_cmp(&rating_key(&services[a])))
        }
        SortKey::Featured => indices.sort_by(|&a, &b| featured_first(&services[a], &services[b])),
    }
    indices
}

fn matches_search(service: &Service, needle: &str) -> bool {
    needle.is_empty()
        || service.title.to_lowercase().contains(needle)
        || service.mentor.to_lowercase().contains(needle)
        || service.category.to_lowercase().contains(needle)
}

fn matches_category(service: &Service, category: &str) -> bool {
    category == ALL_CATEGORIES || service.category == category
}

fn rating_key(service: &Service) -> f64 {
    service.rating.unwrap_or(f64::NEG_INFINITY)
}

fn featured_first(a: &Service, b: &Service) -> Ordering {
    b.featured.cmp(&a.featured)
}

fn required(field: &str, value: &str) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn parse_price(raw: &str) -> Result<u32, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse::<u32>().map_err(|_| {
        ApiError::validation(format!(
            "price must be a whole, non-negative number of dollars (got '{raw}')"
        ))
    })
}

fn parse_rating(raw: Option<&str>) -> Result<f64, ApiError> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(DEFAULT_RATING);
    };
    match raw.parse::<f64>() {
        Ok(rating) if (0.0..=MAX_RATING).contains(&rating) => Ok(rating),
        _ => Err(ApiError::validation(format!(
            "rating must be a number between 0 and {MAX_RATING} (got '{raw}')"
        ))),
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
