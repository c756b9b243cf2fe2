use devgen::{
    server::{self, AppState},
    AppConfig, CodeGenerator,
};
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

fn init_tracing() -> Result<(), BoxedError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,devgen=debug,devgen_sdk=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), BoxedError> {
    // Load environment variables
    dotenv().ok();
    init_tracing()?;

    let config = AppConfig::from_env();
    let generator = CodeGenerator::from_config(&config);
    let state = AppState::new(generator)?;

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    server::serve(listener, state).await?;

    Ok(())
}
