pub mod api;
pub mod routes;

use tokio::net::TcpListener;

use crate::data::Roster;
use crate::server::api::AppState;
use crate::settings::Settings;

pub async fn serve(settings: &Settings) -> std::io::Result<()> {
    let roster = Roster::load_or_empty(&settings.roster_path);
    tracing::info!(
        units = roster.len(),
        roster = %settings.roster_path.display(),
        "roster loaded"
    );
    let app = routes::router(
        AppState::new(roster, settings.simulation),
        &settings.static_dir,
    );

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("skirmish server listening on http://{}", settings.bind_addr);
    axum::serve(listener, app).await
}

pub fn run_server(settings: &Settings) -> std::io::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(serve(settings))
}
