//! Single binary web server: REST API over the tournament engine.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default.
//! Override with env: HOST, PORT, DATA_FILE, SNAPSHOT_INTERVAL_SECS, LIVE_WAIT_SECS.

use actix_web::{
    delete,
    error::InternalError,
    get, post, put,
    web::{self, Data, Json, Path, Query},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tournament_engine_web::{
    parse_clock, Channel, DrawAssignment, Engine, EngineError, EventId, FinalsGenerator,
    KickoffPlan, MatchId, MatchStatus, MemoryStore, Notifier, RecordEventRequest, Repository,
    RevisionCounter, ScheduleOptions, StageId, StageKind, StageStatus, TeamId,
};

/// Shared server state: the engine plus the revision projections it invalidates.
struct AppState {
    engine: Engine<MemoryStore>,
    live_revisions: Arc<RevisionCounter>,
    standings_revisions: Arc<RevisionCounter>,
    live_wait: Duration,
}

type State = Data<AppState>;

/// Knockout bracket generation lives outside this service.
struct UnconfiguredFinals;

impl FinalsGenerator for UnconfiguredFinals {
    fn generate(&self, _stage_id: StageId, _cutoff: NaiveDate) -> Result<usize, String> {
        Err("finals generator not configured".to_string())
    }
}

/// Settings read from the environment; bad values fall back to defaults.
struct Config {
    host: String,
    port: u16,
    data_file: Option<String>,
    snapshot_interval: Duration,
    live_wait: Duration,
}

impl Config {
    fn from_env() -> Self {
        fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        }
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parsed("PORT", 8080),
            data_file: std::env::var("DATA_FILE").ok().filter(|p| !p.is_empty()),
            snapshot_interval: Duration::from_secs(parsed("SNAPSHOT_INTERVAL_SECS", 300)),
            live_wait: Duration::from_secs(parsed("LIVE_WAIT_SECS", 25)),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreateStageBody {
    #[serde(default)]
    modality: String,
    title: String,
    #[serde(default)]
    kind: StageKind,
    start_date: NaiveDate,
    #[serde(default)]
    venue: String,
}

#[derive(Deserialize)]
struct StageStatusBody {
    status: StageStatus,
}

#[derive(Deserialize)]
struct AddTeamBody {
    name: String,
    #[serde(default)]
    city: String,
}

#[derive(Deserialize)]
struct ManualDrawBody {
    assignments: Vec<DrawAssignment>,
}

#[derive(Deserialize)]
struct FinalsBody {
    cutoff_date: NaiveDate,
}

#[derive(Deserialize)]
struct ScoreBody {
    score_a: u32,
    score_b: u32,
    penalty_a: Option<u32>,
    penalty_b: Option<u32>,
}

#[derive(Deserialize)]
struct MatchStatusBody {
    status: String,
}

#[derive(Deserialize)]
struct MatchScheduleBody {
    date: Option<NaiveDate>,
    time: Option<String>,
    referee: Option<String>,
}

#[derive(Deserialize)]
struct FeedQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
struct Revisions {
    live_view: u64,
    standings: u64,
}

/// Path segment: stage id (e.g. /api/stages/{id})
#[derive(Deserialize)]
struct StagePath {
    id: StageId,
}

/// Path segments: stage id and team id
#[derive(Deserialize)]
struct StageTeamPath {
    id: StageId,
    team_id: TeamId,
}

#[derive(Deserialize)]
struct MatchPath {
    id: MatchId,
}

#[derive(Deserialize)]
struct EventPath {
    id: EventId,
}

fn error_response(e: &EngineError) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string(), "code": e.code() });
    match e {
        EngineError::Validation(_) => HttpResponse::BadRequest().json(body),
        EngineError::NotFound { .. } => HttpResponse::NotFound().json(body),
        EngineError::InsufficientTeams { .. } | EngineError::EmptyGroup(_) | EngineError::NoMatches => {
            HttpResponse::Conflict().json(body)
        }
        EngineError::StoreUnavailable(_) => HttpResponse::ServiceUnavailable().json(body),
        EngineError::DelegateFailed(_) => HttpResponse::BadGateway().json(body),
    }
}

/// Body, path, and query extraction failures answer like engine validation errors.
fn rejected<E>(err: E) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let resp = error_response(&EngineError::validation(err.to_string()));
    InternalError::from_response(err, resp).into()
}

fn respond<T: Serialize>(result: Result<T, EngineError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => error_response(&e),
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-engine-web",
    })
}

#[post("/api/stages")]
async fn api_create_stage(state: State, body: Json<CreateStageBody>) -> HttpResponse {
    respond(state.engine.create_stage(
        &body.modality,
        &body.title,
        body.kind,
        body.start_date,
        &body.venue,
    ))
}

#[get("/api/stages")]
async fn api_list_stages(state: State) -> HttpResponse {
    respond(state.engine.store().stages())
}

/// Default stage when the client has none selected (404 if no stage exists).
#[get("/api/stages/current")]
async fn api_current_stage(state: State) -> HttpResponse {
    match state.engine.current_stage() {
        Ok(Some(stage)) => HttpResponse::Ok().json(stage),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({ "error": "No stage", "code": "NOT_FOUND" })),
        Err(e) => error_response(&e),
    }
}

#[get("/api/stages/{id}")]
async fn api_get_stage(state: State, path: Path<StagePath>) -> HttpResponse {
    respond(state.engine.store().stage(path.id))
}

#[put("/api/stages/{id}/status")]
async fn api_set_stage_status(state: State, path: Path<StagePath>, body: Json<StageStatusBody>) -> HttpResponse {
    respond(state.engine.set_stage_status(path.id, body.status))
}

#[get("/api/stages/{id}/teams")]
async fn api_stage_teams(state: State, path: Path<StagePath>) -> HttpResponse {
    let teams = state.engine.stage_teams(path.id).map(|rows| {
        rows.into_iter()
            .map(|(team, link)| {
                serde_json::json!({
                    "id": team.id,
                    "name": team.name,
                    "city": team.city,
                    "group": link.group,
                    "draw_order": link.draw_order,
                })
            })
            .collect::<Vec<_>>()
    });
    respond(teams)
}

#[post("/api/stages/{id}/teams")]
async fn api_add_team(state: State, path: Path<StagePath>, body: Json<AddTeamBody>) -> HttpResponse {
    respond(state.engine.import_team(path.id, &body.name, &body.city))
}

/// Import a `name,city` CSV roster sent as the raw request body.
#[post("/api/stages/{id}/teams/csv")]
async fn api_import_roster(state: State, path: Path<StagePath>, body: String) -> HttpResponse {
    respond(state.engine.import_roster_csv(path.id, body.as_bytes()))
}

#[delete("/api/stages/{id}/teams/{team_id}")]
async fn api_remove_team(state: State, path: Path<StageTeamPath>) -> HttpResponse {
    respond(state.engine.remove_team(path.id, path.team_id))
}

#[get("/api/stages/{id}/draw")]
async fn api_groups(state: State, path: Path<StagePath>) -> HttpResponse {
    respond(state.engine.groups(path.id))
}

/// Random draw.
#[post("/api/stages/{id}/draw")]
async fn api_draw(state: State, path: Path<StagePath>) -> HttpResponse {
    respond(state.engine.draw(path.id))
}

/// Commit the result of a host-driven live draw.
#[put("/api/stages/{id}/draw")]
async fn api_manual_draw(state: State, path: Path<StagePath>, body: Json<ManualDrawBody>) -> HttpResponse {
    let result = state
        .engine
        .apply_manual_draw(path.id, &body.assignments)
        .map(|updated| serde_json::json!({ "teams_updated": updated }));
    respond(result)
}

#[post("/api/stages/{id}/schedule")]
async fn api_generate_schedule(
    state: State,
    path: Path<StagePath>,
    body: Option<Json<ScheduleOptions>>,
) -> HttpResponse {
    let options = body.map(|b| b.into_inner()).unwrap_or_default();
    respond(state.engine.generate_group_schedule(path.id, options))
}

#[post("/api/stages/{id}/kickoffs")]
async fn api_assign_kickoffs(state: State, path: Path<StagePath>, body: Json<KickoffPlan>) -> HttpResponse {
    respond(state.engine.assign_kickoffs(path.id, &body))
}

#[post("/api/stages/{id}/finals")]
async fn api_trigger_finals(state: State, path: Path<StagePath>, body: Json<FinalsBody>) -> HttpResponse {
    respond(state.engine.trigger_finals(path.id, body.cutoff_date))
}

/// Administrative clear: removes team links, matches, and events of the stage.
#[post("/api/stages/{id}/clear")]
async fn api_clear_stage(state: State, path: Path<StagePath>) -> HttpResponse {
    respond(state.engine.clear_stage(path.id))
}

#[get("/api/stages/{id}/matches")]
async fn api_list_matches(state: State, path: Path<StagePath>) -> HttpResponse {
    respond(state.engine.list_matches(path.id))
}

#[get("/api/stages/{id}/feed")]
async fn api_live_feed(state: State, path: Path<StagePath>, query: Query<FeedQuery>) -> HttpResponse {
    respond(state.engine.live_feed(path.id, query.limit.unwrap_or(50)))
}

/// Long-poll: wait for the next change in the stage (204 on timeout).
#[get("/api/stages/{id}/feed/wait")]
async fn api_live_feed_wait(state: State, path: Path<StagePath>) -> HttpResponse {
    let stage_id = path.id;
    let mut rx = state.engine.notifier().feed();
    let next = tokio::time::timeout(state.live_wait, async move {
        loop {
            match rx.recv().await {
                Ok(event) if event.stage_id() == stage_id => return Some(event),
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    })
    .await;
    match next {
        Ok(Some(event)) => HttpResponse::Ok().json(event),
        _ => HttpResponse::NoContent().finish(),
    }
}

#[get("/api/stages/{id}/revisions")]
async fn api_revisions(state: State, path: Path<StagePath>) -> HttpResponse {
    HttpResponse::Ok().json(Revisions {
        live_view: state.live_revisions.revision(path.id),
        standings: state.standings_revisions.revision(path.id),
    })
}

#[put("/api/matches/{id}/score")]
async fn api_set_score(state: State, path: Path<MatchPath>, body: Json<ScoreBody>) -> HttpResponse {
    respond(state.engine.set_match_score(
        path.id,
        body.score_a,
        body.score_b,
        body.penalty_a,
        body.penalty_b,
    ))
}

#[put("/api/matches/{id}/status")]
async fn api_set_match_status(state: State, path: Path<MatchPath>, body: Json<MatchStatusBody>) -> HttpResponse {
    let result = body
        .status
        .parse::<MatchStatus>()
        .and_then(|status| state.engine.set_match_status(path.id, status));
    respond(result)
}

#[put("/api/matches/{id}/schedule")]
async fn api_update_schedule(state: State, path: Path<MatchPath>, body: Json<MatchScheduleBody>) -> HttpResponse {
    let body = body.into_inner();
    let time: Option<NaiveTime> = match body.time.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(raw) => match parse_clock(raw) {
            Ok(t) => Some(t),
            Err(e) => return error_response(&e),
        },
        None => None,
    };
    respond(state.engine.update_match_schedule(path.id, body.date, time, body.referee))
}

#[get("/api/matches/{id}/events")]
async fn api_list_events(state: State, path: Path<MatchPath>) -> HttpResponse {
    respond(state.engine.list_events(path.id))
}

#[post("/api/matches/{id}/events")]
async fn api_record_event(state: State, path: Path<MatchPath>, body: Json<RecordEventRequest>) -> HttpResponse {
    let mut request = body.into_inner();
    request.match_id = Some(path.id);
    respond(state.engine.record_match_event(request))
}

#[delete("/api/events/{id}")]
async fn api_delete_event(state: State, path: Path<EventPath>) -> HttpResponse {
    respond(state.engine.delete_match_event(path.id))
}

fn load_store(data_file: Option<&str>) -> MemoryStore {
    let Some(path) = data_file else {
        return MemoryStore::new();
    };
    match std::fs::read_to_string(path) {
        Ok(json) => match MemoryStore::from_snapshot(&json) {
            Ok(store) => {
                log::info!("Loaded snapshot from {}", path);
                store
            }
            Err(e) => {
                log::warn!("Ignoring snapshot {}: {}", path, e);
                MemoryStore::new()
            }
        },
        Err(_) => MemoryStore::new(),
    }
}

fn save_snapshot(store: &MemoryStore, path: &str) {
    let written = store
        .snapshot()
        .map_err(|e| e.to_string())
        .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
    if let Err(e) = written {
        log::warn!("Snapshot to {} failed: {}", path, e);
    }
}

fn app_state(store: MemoryStore, live_wait: Duration) -> State {
    let live_revisions = Arc::new(RevisionCounter::new());
    let standings_revisions = Arc::new(RevisionCounter::new());
    let mut notifier = Notifier::new();
    notifier.subscribe(Channel::LiveView, live_revisions.clone());
    notifier.subscribe(Channel::Standings, standings_revisions.clone());
    Data::new(AppState {
        engine: Engine::new(store, notifier, Box::new(UnconfiguredFinals)),
        live_revisions,
        standings_revisions,
        live_wait,
    })
}

/// Extractor settings and every API route.
fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| rejected(err)))
        .app_data(web::PathConfig::default().error_handler(|err, _req| rejected(err)))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| rejected(err)))
        .service(api_health)
        .service(api_create_stage)
        .service(api_list_stages)
        .service(api_current_stage)
        .service(api_get_stage)
        .service(api_set_stage_status)
        .service(api_stage_teams)
        .service(api_add_team)
        .service(api_import_roster)
        .service(api_remove_team)
        .service(api_groups)
        .service(api_draw)
        .service(api_manual_draw)
        .service(api_generate_schedule)
        .service(api_assign_kickoffs)
        .service(api_trigger_finals)
        .service(api_clear_stage)
        .service(api_list_matches)
        .service(api_live_feed)
        .service(api_live_feed_wait)
        .service(api_revisions)
        .service(api_set_score)
        .service(api_set_match_status)
        .service(api_update_schedule)
        .service(api_list_events)
        .service(api_record_event)
        .service(api_delete_event);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    let state = app_state(load_store(config.data_file.as_deref()), config.live_wait);

    // Background task: write a snapshot periodically when DATA_FILE is set
    if let Some(path) = config.data_file.clone() {
        let state_snapshot = state.clone();
        let period = config.snapshot_interval;
        actix_web::rt::spawn(async move {
            let mut interval = actix_web::rt::time::interval(period);
            loop {
                interval.tick().await;
                save_snapshot(state_snapshot.engine.store(), &path);
            }
        });
    }

    let bind = (config.host.clone(), config.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(configure))
        .bind(bind)?
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{http::StatusCode, test};
    use serde_json::{json, Value};

    fn test_state() -> State {
        app_state(MemoryStore::new(), Duration::from_millis(10))
    }

    fn cup(state: &State) -> StageId {
        let start = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        state
            .engine
            .create_stage("futsal", "Spring Cup", StageKind::League, start, "Arena")
            .unwrap()
            .id
    }

    #[actix_web::test]
    async fn malformed_stage_body_is_a_validation_error() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri("/api/stages")
            .set_json(json!({ "title": "Spring Cup", "start_date": "2026-13-40" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "VALIDATION_FAILED");
        assert!(body["error"].as_str().unwrap().starts_with("Validation failed"));
    }

    #[actix_web::test]
    async fn out_of_range_event_minute_is_a_validation_error() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::post()
            .uri(&format!("/api/matches/{}/events", uuid::Uuid::new_v4()))
            .set_json(json!({ "team_id": uuid::Uuid::new_v4(), "type": "goal", "minute": 300 }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }

    #[actix_web::test]
    async fn bad_id_in_path_is_a_validation_error() {
        let app = test::init_service(App::new().app_data(test_state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/stages/not-a-uuid").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }

    #[actix_web::test]
    async fn clear_route_removes_links_and_delete_matches_is_gone() {
        let state = test_state();
        let stage_id = cup(&state);
        state.engine.import_team(stage_id, "Alpha", "Porto").unwrap();
        let app = test::init_service(App::new().app_data(state.clone()).configure(configure)).await;

        let req = test::TestRequest::delete()
            .uri(&format!("/api/stages/{}/matches", stage_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(!resp.status().is_success());
        assert_eq!(state.engine.store().team_links(stage_id).unwrap().len(), 1);

        let req = test::TestRequest::post()
            .uri(&format!("/api/stages/{}/clear", stage_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["links_removed"], 1);
        assert!(state.engine.store().team_links(stage_id).unwrap().is_empty());
    }
}
