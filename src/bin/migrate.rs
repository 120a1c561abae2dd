use axum_shop_api::{
    config::AppConfig,
    db::{connect_options, create_orm_conn, run_migrations},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(connect_options(&config)).await?;
    run_migrations(&orm).await?;
    println!("Schema up to date");
    Ok(())
}
