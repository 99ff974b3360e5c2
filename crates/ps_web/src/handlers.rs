use axum::{extract::State, Json};
use ps_core::types::collection_for;
use ps_core::{ArticleField, StoredArticle};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use crate::error::ApiError;
use crate::AppState;

/// Genres with their own collection.
pub const KNOWN_GENRES: [&str; 6] = ["diy", "science", "technology", "health", "gear", "environment"];

/// Label for any genre outside [`KNOWN_GENRES`].
pub const OTHER_GENRE: &str = "other";

pub fn is_allowed_genre(genre: &str) -> bool {
    genre == OTHER_GENRE || KNOWN_GENRES.contains(&genre)
}

#[derive(Debug, Default, Deserialize)]
pub struct ArticlesRequest {
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArticlesResponse {
    pub articles: Vec<StoredArticle>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GenresResponse {
    pub genres: Vec<String>,
}

/// Collapses unknown genres into "other" and removes duplicates. Known
/// genres come first in canonical order.
pub fn normalize_genres<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut present = HashSet::new();
    let mut has_other = false;
    for value in values {
        let value = value.as_ref();
        match KNOWN_GENRES.iter().find(|g| **g == value) {
            Some(known) => {
                present.insert(*known);
            }
            None => has_other = true,
        }
    }

    let mut genres: Vec<String> = KNOWN_GENRES
        .iter()
        .filter(|g| present.contains(*g))
        .map(|g| g.to_string())
        .collect();
    if has_other {
        genres.push(OTHER_GENRE.to_string());
    }
    genres
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ArticlesRequest>,
) -> Result<Json<ArticlesResponse>, ApiError> {
    let invalid: Vec<String> = request
        .genres
        .iter()
        .filter(|g| !is_allowed_genre(g))
        .cloned()
        .collect();
    if !invalid.is_empty() {
        return Err(ApiError::InvalidGenres(invalid));
    }

    let collections: Vec<String> = request.genres.iter().map(|g| collection_for(g)).collect();
    let articles = state.storage.list_by_collections(&collections).await?;
    Ok(Json(ArticlesResponse { articles }))
}

pub async fn list_genres(
    State(state): State<Arc<AppState>>,
) -> Result<Json<GenresResponse>, ApiError> {
    let mut values = Vec::new();
    for collection in state.storage.list_collection_names().await? {
        values.extend(state.storage.distinct_values(ArticleField::Genre, &collection).await?);
    }
    Ok(Json(GenresResponse {
        genres: normalize_genres(values),
    }))
}
