//! HTTP request handlers for web adapter.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

use crate::domain::dto::InvestmentDto;
use crate::domain::error::TrackerError;
use crate::domain::filter::{FilterParameter, parse_date};
use crate::domain::summary::{MonthTotal, Summary};

use super::{AppState, WebError};

/// Optional `fromDate`/`toDate` query parameters (`YYYY-MM-DD` or RFC 3339).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

impl DateRangeQuery {
    fn resolve(&self) -> Result<(Option<NaiveDate>, Option<NaiveDate>), TrackerError> {
        Ok((
            optional_date("fromDate", self.from_date.as_deref())?,
            optional_date("toDate", self.to_date.as_deref())?,
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

fn optional_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, TrackerError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => parse_date(raw)
            .map(Some)
            .ok_or_else(|| TrackerError::InvalidDate {
                field: field.to_string(),
                value: raw.to_string(),
            }),
    }
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn list_investments(
    State(state): State<Arc<AppState>>,
    range: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Result<Json<Vec<InvestmentDto>>, WebError> {
    let Query(range) = range?;
    let (from, to) = range.resolve()?;
    Ok(Json(state.service.list(from, to)?))
}

pub async fn get_investment(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<InvestmentDto>, WebError> {
    let Path(id) = id?;
    state
        .service
        .get_by_id(id)?
        .map(Json)
        .ok_or_else(|| WebError::not_found(format!("investment {id} not found")))
}

pub async fn search_investments(
    State(state): State<Arc<AppState>>,
    range: Result<Query<DateRangeQuery>, QueryRejection>,
    params: Result<Json<FilterParameter>, JsonRejection>,
) -> Result<Json<Vec<InvestmentDto>>, WebError> {
    let Query(range) = range?;
    let Json(params) = params?;
    let (from, to) = range.resolve()?;
    Ok(Json(state.service.search(&params, from, to)?))
}

pub async fn add_investment(
    State(state): State<Arc<AppState>>,
    body: Result<Json<InvestmentDto>, JsonRejection>,
) -> Result<Response, WebError> {
    let Json(body) = body?;
    let created = state.service.add(body.into_draft())?;
    let location = format!("/investment/{}", created.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    )
        .into_response())
}

pub async fn update_investment(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<InvestmentDto>, JsonRejection>,
) -> Result<StatusCode, WebError> {
    let Path(id) = id?;
    let Json(body) = body?;
    if body.id != id {
        return Err(TrackerError::IdMismatch { path: id, body: body.id }.into());
    }
    state.service.update(id, body.into_draft())?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete_investment(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, WebError> {
    let Path(id) = id?;
    state.service.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn summary(
    State(state): State<Arc<AppState>>,
    range: Result<Query<DateRangeQuery>, QueryRejection>,
) -> Result<Json<Summary>, WebError> {
    let Query(range) = range?;
    let (from, to) = range.resolve()?;
    Ok(Json(state.service.summary(from, to)?))
}

pub async fn monthly_summary(
    State(state): State<Arc<AppState>>,
    query: Result<Query<YearQuery>, QueryRejection>,
) -> Result<Json<Vec<MonthTotal>>, WebError> {
    let Query(query) = query?;
    Ok(Json(state.service.monthly(query.year)?))
}

pub async fn not_found() -> WebError {
    WebError::not_found("no such route")
}
