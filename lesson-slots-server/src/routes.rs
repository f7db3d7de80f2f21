use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, SecondsFormat, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use lesson_slots::{
    parse_date, parse_time, slot_from_utc_instant, FallbackPolicy, Lesson, LocalWallClock,
    ProjectionError, Projector, Slot, Timetable,
};

pub struct Config {
    pub policy: FallbackPolicy,
}

type SharedConfig = Arc<Config>;

pub fn router(config: Config) -> Router {
    Router::new()
        .route("/slot", get(handle_slot))
        .route("/local", get(handle_local))
        .route("/display", get(handle_display))
        .route("/lesson.ics", get(handle_lesson_ics))
        .fallback(handle_fallback)
        .with_state(Arc::new(config))
}

async fn handle_fallback() -> Redirect {
    Redirect::permanent(env!("CARGO_PKG_REPOSITORY"))
}

struct ApiError(ProjectionError);

impl From<ProjectionError> for ApiError {
    fn from(err: ProjectionError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!("Rejecting request: {}", self.0);
        (StatusCode::BAD_REQUEST, self.0.to_string()).into_response()
    }
}

fn projector(config: &Config, strict: Option<bool>) -> Projector {
    match strict {
        Some(true) => Projector::strict(),
        Some(false) => Projector::new(FallbackPolicy::Utc),
        None => Projector::new(config.policy),
    }
}

#[derive(Deserialize)]
struct SlotQuery {
    time: String,
    date: String,
    tz: Option<String>,
    strict: Option<bool>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
struct SlotResponse {
    slot: Slot,
    date: String,
    utc: String,
}

fn convert_slot(projector: Projector, query: &SlotQuery) -> Result<SlotResponse, ProjectionError> {
    let instant: DateTime<Utc> = projector.local_to_utc(
        parse_time(&query.time)?,
        parse_date(&query.date)?,
        query.tz.as_deref(),
    )?;

    Ok(SlotResponse {
        slot: slot_from_utc_instant(instant),
        date: instant.date_naive().to_string(),
        utc: instant.to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}

async fn handle_slot(
    State(config): State<SharedConfig>,
    Query(query): Query<SlotQuery>,
) -> Result<Json<SlotResponse>, ApiError> {
    let projector = projector(&config, query.strict);
    Ok(Json(convert_slot(projector, &query)?))
}

#[derive(Deserialize)]
struct LocalQuery {
    slot: i32,
    date: String,
    tz: Option<String>,
    strict: Option<bool>,
}

async fn handle_local(
    State(config): State<SharedConfig>,
    Query(query): Query<LocalQuery>,
) -> Result<Json<LocalWallClock>, ApiError> {
    let local = projector(&config, query.strict).utc_slot_to_wall_clock(
        query.slot,
        &query.date,
        query.tz.as_deref(),
    )?;
    Ok(Json(local))
}

#[derive(Deserialize)]
struct DisplayQuery {
    slot: i32,
    date: String,
    tz: Option<String>,
    #[serde(default)]
    twelve_hour: bool,
    strict: Option<bool>,
}

async fn handle_display(
    State(config): State<SharedConfig>,
    Query(query): Query<DisplayQuery>,
) -> Result<String, ApiError> {
    Ok(projector(&config, query.strict).format_slot(
        query.slot,
        &query.date,
        query.tz.as_deref(),
        query.twelve_hour,
    )?)
}

#[derive(Deserialize)]
struct LessonQuery {
    date: String,
    start: String,
    end: String,
    tz: Option<String>,
    title: String,
    location: Option<String>,
    strict: Option<bool>,
}

fn lesson_timetable(projector: Projector, query: &LessonQuery) -> Result<Timetable, ProjectionError> {
    let spans = projector.project_local_range(
        &query.start,
        &query.end,
        &query.date,
        query.tz.as_deref(),
    )?;

    let mut timetable = Timetable::new(query.title.as_str());
    timetable.lessons = spans
        .into_iter()
        .map(|span| Lesson {
            location: query.location.clone(),
            ..Lesson::new(span, query.title.as_str())
        })
        .collect();

    Ok(timetable)
}

async fn handle_lesson_ics(
    State(config): State<SharedConfig>,
    Query(query): Query<LessonQuery>,
) -> Result<Response, ApiError> {
    let timetable = lesson_timetable(projector(&config, query.strict), &query)?;

    Ok((
        [("content-type", "text/calendar")],
        timetable.to_ics().to_string(),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use axum::http::header;
    use lesson_slots::{SlotError, TimezoneError};

    use super::*;

    fn shared(policy: FallbackPolicy) -> SharedConfig {
        Arc::new(Config { policy })
    }

    fn lesson_query(strict: Option<bool>) -> LessonQuery {
        LessonQuery {
            date: "2025-01-15".into(),
            start: "18:00".into(),
            end: "20:00".into(),
            tz: Some("America/New_York".into()),
            title: "Evening theory".into(),
            location: Some("Online".into()),
            strict,
        }
    }

    fn slot_query(time: &str, date: &str, tz: Option<&str>) -> SlotQuery {
        SlotQuery {
            time: time.into(),
            date: date.into(),
            tz: tz.map(Into::into),
            strict: None,
        }
    }

    #[test]
    fn slot_response_reports_the_utc_date() {
        let response = convert_slot(
            Projector::default(),
            &slot_query("21:10", "2025-01-15", Some("America/New_York")),
        )
        .unwrap();

        assert_eq!(
            response,
            SlotResponse {
                slot: Slot::try_from(8).unwrap(),
                date: "2025-01-16".into(),
                utc: "2025-01-16T02:10:00Z".into(),
            }
        );
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({ "slot": 8, "date": "2025-01-16", "utc": "2025-01-16T02:10:00Z" })
        );
    }

    #[test]
    fn per_request_strictness_overrides_config() {
        let config = Config {
            policy: FallbackPolicy::Utc,
        };
        assert_eq!(projector(&config, None), Projector::default());
        assert_eq!(projector(&config, Some(true)), Projector::strict());

        let query = slot_query("09:00", "2025-01-15", Some("Nowhere/Town"));
        assert_eq!(
            convert_slot(projector(&config, Some(true)), &query),
            Err(ProjectionError::Timezone(TimezoneError::Unknown(
                "Nowhere/Town".into()
            )))
        );
        assert_eq!(
            convert_slot(projector(&config, None), &query).unwrap().slot,
            Slot::try_from(36).unwrap()
        );
    }

    #[test]
    fn lesson_crossing_utc_midnight_becomes_two_events() {
        let timetable = lesson_timetable(Projector::default(), &lesson_query(None)).unwrap();
        assert_eq!(timetable.lessons.len(), 2);
        assert!(timetable
            .lessons
            .iter()
            .all(|lesson| lesson.location.as_deref() == Some("Online")));

        let rendered = timetable.to_ics().to_string();
        assert!(rendered.contains("DTSTART:20250115T230000Z\r\n"));
        assert!(rendered.contains("DTEND:20250116T010000Z\r\n"));
    }

    #[tokio::test]
    async fn invalid_input_is_a_bad_request() {
        let config = Arc::new(Config {
            policy: FallbackPolicy::Strict,
        });

        let response = handle_slot(
            State(Arc::clone(&config)),
            Query(slot_query("25:00", "2025-01-15", None)),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = handle_local(
            State(config),
            Query(LocalQuery {
                slot: 12,
                date: "2025-01-15".into(),
                tz: Some("Asia/Tokyo".into()),
                strict: None,
            }),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn out_of_range_slot_message() {
        let err = ApiError::from(ProjectionError::Slot(SlotError::OutOfRange(100)));
        assert_eq!(err.0.to_string(), "slot 100 is outside of 0..=95");
    }

    #[tokio::test]
    async fn display_renders_plain_text() {
        let query = DisplayQuery {
            slot: 36,
            date: "2025-01-01".into(),
            tz: None,
            twelve_hour: true,
            strict: None,
        };
        let body = handle_display(State(shared(FallbackPolicy::Utc)), Query(query)).await;
        assert_eq!(body.ok().as_deref(), Some("9:00 AM"));
    }

    #[tokio::test]
    async fn display_honours_per_request_strictness() {
        let query = |strict| DisplayQuery {
            slot: 36,
            date: "2025-01-01".into(),
            tz: Some("Nowhere/Town".into()),
            twelve_hour: false,
            strict,
        };

        let lenient = handle_display(State(shared(FallbackPolicy::Utc)), Query(query(None))).await;
        assert_eq!(lenient.ok().as_deref(), Some("09:00"));

        let response = handle_display(State(shared(FallbackPolicy::Utc)), Query(query(Some(true))))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn lesson_ics_is_served_as_calendar() {
        let response = handle_lesson_ics(State(shared(FallbackPolicy::Utc)), Query(lesson_query(None)))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/calendar"
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(body.contains("SUMMARY:Evening theory\r\n"));
    }

    #[tokio::test]
    async fn lesson_ics_honours_per_request_strictness() {
        let mut query = lesson_query(Some(true));
        query.tz = Some("Nowhere/Town".into());

        let response = handle_lesson_ics(State(shared(FallbackPolicy::Utc)), Query(query))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_paths_redirect_to_repository() {
        let response = handle_fallback().await.into_response();

        assert_eq!(response.status(), StatusCode::PERMANENT_REDIRECT);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            env!("CARGO_PKG_REPOSITORY")
        );
    }
}
