//! Bot server: receives chat updates on /webhook and answers with display payloads.
//! Run with: cargo run --bin bot
//! Settings come from the environment (HOST, PORT, ADMIN_IDS, TEAM_CATALOG, ...).

use actix_web::{
    get, post,
    web::{Data, Json},
    App, HttpResponse, HttpServer, Responder,
};
use chrono::Utc;
use football_tournament_bot::{
    bot::{render_season, Dispatcher, Inbound},
    catalog::load_catalog,
    config::Settings,
    conversation::SessionStore,
    notify::LogNotifier,
    store::{Authorizer, MemoryStore, Store},
    ErrorKind, TournamentService,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(serde::Serialize)]
struct HealthResponse {
    ok: bool,
    service: &'static str,
}

#[get("/api/health")]
async fn api_health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        ok: true,
        service: "football-tournament-bot",
    })
}

/// One chat update in, the reply to display out.
#[post("/webhook")]
async fn webhook(dispatcher: Data<Dispatcher>, body: Json<Inbound>) -> HttpResponse {
    let reply = dispatcher.handle(body.into_inner()).await;
    HttpResponse::Ok().json(reply)
}

/// The running tournament, or 404 when none is active.
#[get("/api/tournaments/active")]
async fn api_active_tournament(service: Data<TournamentService>) -> HttpResponse {
    match service.active_tournament().await {
        Ok(Some(tournament)) => HttpResponse::Ok().json(tournament),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({ "error": "No active tournament" })),
        Err(e) => {
            log::error!("Failed to load the active tournament: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": "storage failure" }))
        }
    }
}

#[get("/api/season")]
async fn api_season(service: Data<TournamentService>) -> HttpResponse {
    match service.season_table().await {
        Ok(table) => HttpResponse::Ok().json(serde_json::json!({
            "table": table,
            "text": render_season(&table),
        })),
        Err(e) if e.kind() == ErrorKind::Storage => {
            log::error!("Failed to load the season table: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({ "error": "storage failure" }))
        }
        Err(e) => HttpResponse::BadRequest().json(serde_json::json!({ "error": e.to_string() })),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let settings = Settings::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let store = Arc::new(MemoryStore::with_admins(settings.admin_ids.iter().copied()));
    let service = Data::new(TournamentService::new(
        store.clone() as Arc<dyn Store>,
        Arc::new(LogNotifier),
        settings.clone(),
    ));

    if let Some(path) = settings.team_catalog.as_deref() {
        match load_catalog(path) {
            Ok(categories) => match service.seed_categories(categories).await {
                Ok(added) => log::info!("Seeded {} team categories", added),
                Err(e) => log::error!("Failed to seed team categories: {}", e),
            },
            Err(e) => log::warn!("Ignoring team catalog {}: {}", path.display(), e),
        }
    }

    let dispatcher = Data::new(Dispatcher::new(
        service.clone().into_inner(),
        Arc::new(SessionStore::new()),
        store as Arc<dyn Authorizer>,
    ));

    // Background task: periodically delete tournaments stuck in setup or abandoned
    let reaper = service.clone();
    let every = Duration::from_secs(settings.reap_interval_minutes.max(1) * 60);
    actix_web::rt::spawn(async move {
        let mut interval = actix_web::rt::time::interval(every);
        loop {
            interval.tick().await;
            match reaper.reap(Utc::now()).await {
                Ok(0) => {}
                Ok(removed) => log::info!("Reaped {} idle tournament(s)", removed),
                Err(e) => log::error!("Reaper run failed: {}", e),
            }
        }
    });

    let bind = (settings.host.clone(), settings.port);
    log::info!("Starting server at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(dispatcher.clone())
            .service(api_health)
            .service(webhook)
            .service(api_active_tournament)
            .service(api_season)
    })
    .bind(bind)?
    .run()
    .await
}
