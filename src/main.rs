use std::{net::SocketAddr, time::Duration};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use axum_shop_api::{
    app::build_app,
    config::AppConfig,
    db::{connect_options, create_orm_conn, run_migrations},
    state::AppState,
    token::TokenService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,axum_shop_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let orm = create_orm_conn(connect_options(&config)).await?;
    run_migrations(&orm).await?;

    let tokens = TokenService::with_ttl(&config.jwt_secret, config.token_ttl());
    let state = AppState::new(orm, tokens).with_cart_merge_on_add(config.cart_merge_on_add);
    if config.cart_merge_on_add {
        tracing::info!("cart merge-on-add enabled");
    }

    let app = build_app(state, Duration::from_secs(config.request_timeout_secs));

    let addr = SocketAddr::from((config.host.parse::<std::net::IpAddr>()?, config.port));
    tracing::info!("listening on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
