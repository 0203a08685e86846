use docquery::config::Settings;
use docquery::state::AppState;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let settings = Settings::from_env();
    init_tracing(settings.debug);

    if let Err(error) = settings.validate() {
        tracing::error!(%error, "invalid configuration");
        std::process::exit(1);
    }

    let state = match AppState::new(settings) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!(%error, "failed to initialize providers");
            std::process::exit(1);
        }
    };

    if let Err(error) = docquery::serve(state).await {
        tracing::error!(%error, "server error");
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("docquery={},tower_http=info", default_level)));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
