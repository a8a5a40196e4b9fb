use tokio::net::TcpListener;
use todo_server::{logging, AppState, Config, Database};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    logging::init_tracing(&config.log_level);

    let db = Database::open(&config.database_path)?;
    let listener = TcpListener::bind(config.bind_addr()).await?;
    todo_server::run(listener, AppState::new(db, config)).await?;
    Ok(())
}
