//! JSON API over the progression engine, backed by the in-memory store.
//! Run with: cargo run --bin web
//! Listens on 0.0.0.0:8080 by default. Override with env: HOST, PORT.

use actix_web::{
    delete, get, post, put,
    web::{Data, Json, Path},
    App, HttpResponse, HttpServer, Responder,
};
use serde::{Deserialize, Serialize};
use tournament_progression::{
    ErrorKind, EventError, EventId, MatchId, MemoryStore, PlayerId, StageId, StageOrchestrator,
};

type AppState = Data<StageOrchestrator<MemoryStore>>;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[derive(Deserialize)]
struct CreatePlayerBody {
    name: String,
    #[serde(default)]
    rating: Option<i32>,
}

#[derive(Deserialize)]
struct CreateEventBody {
    name: String,
}

#[derive(Deserialize)]
struct RegisterBody {
    player_id: PlayerId,
}

#[derive(Deserialize)]
struct ScoresBody {
    score_1: u32,
    score_2: u32,
    /// Finish the match (and update standings) instead of only storing the scores.
    #[serde(default = "default_finish")]
    finish: bool,
}

fn default_finish() -> bool {
    true
}

/// Path segment: event id (e.g. /api/events/{id})
#[derive(Deserialize)]
struct EventPath {
    id: EventId,
}

/// Path segments: event id and stage id.
#[derive(Deserialize)]
struct EventStagePath {
    id: EventId,
    stage_id: StageId,
}

/// Path segments: event id and match id.
#[derive(Deserialize)]
struct EventMatchPath {
    id: EventId,
    match_id: MatchId,
}

/// Serialize the value, or map the error kind onto a status code.
fn respond<T: Serialize>(result: Result<T, EventError>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(e) => {
            let body = serde_json::json!({ "error": e.to_string() });
            match e.kind() {
                ErrorKind::NotFound => HttpResponse::NotFound().json(body),
                ErrorKind::InvalidState => HttpResponse::BadRequest().json(body),
                ErrorKind::Conflict => HttpResponse::Conflict().json(body),
                ErrorKind::InvariantViolation => {
                    log::error!("{}", e);
                    HttpResponse::InternalServerError().json(body)
                }
            }
        }
    }
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "tournament-progression",
    })
}

#[post("/api/players")]
async fn api_create_player(state: AppState, body: Json<CreatePlayerBody>) -> HttpResponse {
    respond(state.create_player(body.name.trim(), body.rating))
}

/// Players by durable rating.
#[get("/api/players")]
async fn api_leaderboard(state: AppState) -> HttpResponse {
    respond(state.leaderboard())
}

#[post("/api/events")]
async fn api_create_event(state: AppState, body: Json<CreateEventBody>) -> HttpResponse {
    respond(state.create_event(body.name.trim()))
}

#[get("/api/events/{id}")]
async fn api_get_event(state: AppState, path: Path<EventPath>) -> HttpResponse {
    respond(state.event(path.id))
}

#[delete("/api/events/{id}")]
async fn api_delete_event(state: AppState, path: Path<EventPath>) -> HttpResponse {
    respond(state.delete_event(path.id))
}

/// Register a player for the event (before any stage exists).
#[post("/api/events/{id}/entrants")]
async fn api_register(state: AppState, path: Path<EventPath>, body: Json<RegisterBody>) -> HttpResponse {
    respond(state.register_entrant(path.id, body.player_id))
}

#[get("/api/events/{id}/standings")]
async fn api_standings(state: AppState, path: Path<EventPath>) -> HttpResponse {
    respond(state.standings(path.id))
}

#[get("/api/events/{id}/champion")]
async fn api_champion(state: AppState, path: Path<EventPath>) -> HttpResponse {
    respond(state.champion(path.id))
}

/// Next step: group stage first, then one knockout round per call.
#[post("/api/events/{id}/advance")]
async fn api_advance(state: AppState, path: Path<EventPath>) -> HttpResponse {
    respond(state.advance(path.id))
}

#[post("/api/events/{id}/group-stage")]
async fn api_create_group_stage(state: AppState, path: Path<EventPath>) -> HttpResponse {
    respond(state.create_group_stage(path.id))
}

#[post("/api/events/{id}/knockout-stages")]
async fn api_create_knockout_stage(state: AppState, path: Path<EventPath>) -> HttpResponse {
    respond(state.create_knockout_stage(path.id))
}

#[post("/api/events/{id}/knockout-stages/{stage_id}/matches")]
async fn api_generate_knockout_matches(state: AppState, path: Path<EventStagePath>) -> HttpResponse {
    respond(state.generate_knockout_matches(path.id, path.stage_id))
}

#[delete("/api/events/{id}/knockout-stages/{stage_id}")]
async fn api_delete_knockout_stage(state: AppState, path: Path<EventStagePath>) -> HttpResponse {
    respond(state.delete_knockout_stage(path.id, path.stage_id))
}

/// Set scores for a match; finishes it unless `finish` is false.
#[put("/api/events/{id}/matches/{match_id}")]
async fn api_set_scores(state: AppState, path: Path<EventMatchPath>, body: Json<ScoresBody>) -> HttpResponse {
    if body.finish {
        respond(state.record_result(path.id, path.match_id, body.score_1, body.score_2))
    } else {
        respond(state.update_scores(path.id, path.match_id, body.score_1, body.score_2))
    }
}

/// Close the event: working ratings become durable ratings.
#[post("/api/events/{id}/ratings/apply")]
async fn api_apply_ratings(state: AppState, path: Path<EventPath>) -> HttpResponse {
    respond(state.apply_ratings(path.id))
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let host = std::env::var("HOST").unwrap_or_else(|_| default_host());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or_else(default_port);
    let bind = (host.as_str(), port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    let state: AppState = Data::new(StageOrchestrator::new(MemoryStore::new()));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(api_health)
            .service(api_create_player)
            .service(api_leaderboard)
            .service(api_create_event)
            .service(api_get_event)
            .service(api_delete_event)
            .service(api_register)
            .service(api_standings)
            .service(api_champion)
            .service(api_advance)
            .service(api_create_group_stage)
            .service(api_create_knockout_stage)
            .service(api_generate_knockout_matches)
            .service(api_delete_knockout_stage)
            .service(api_set_scores)
            .service(api_apply_ratings)
    })
    .bind(bind)?
    .run()
    .await
}
