use dotenv::dotenv;
use log::*;

use townsquare::config::Config;
use townsquare::AppState;

fn startup_error<E>(err: E) -> std::io::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    error!("Could not start! {}", err);
    std::io::Error::new(std::io::ErrorKind::Other, err)
}

#[async_std::main]
async fn main() -> Result<(), std::io::Error> {
    dotenv().ok();
    pretty_env_logger::init();

    let config = Config::from_env().map_err(startup_error)?;
    info!(
        "Serving uploads from {} and the UI from {}",
        config.upload_dir.display(),
        config.static_dir.display()
    );

    match AppState::new(&config) {
        Ok(state) => {
            let app = townsquare::app(state).await?;
            info!("Listening on {}", config.bind_address);
            app.listen(config.bind_address.clone()).await?;
            Ok(())
        }
        Err(err) => Err(startup_error(err)),
    }
}
