use rentease::{Config, build_rocket};

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = Config::load()?;
    let rocket = build_rocket(config).map_err(|e| format!("{:?}", e))?;
    rocket.launch().await?;
    Ok(())
}
