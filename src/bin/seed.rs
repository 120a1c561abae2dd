use axum_shop_api::{
    config::AppConfig,
    db::{connect_options, create_orm_conn, run_migrations},
    entity::{
        products::{ActiveModel as ProductActive, Column as ProdCol, Entity as Products},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users},
    },
    services::auth_service::hash_password,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use sea_orm::ActiveValue::NotSet;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(connect_options(&config)).await?;
    // Ensure the schema exists.
    run_migrations(&orm).await?;

    let alice = ensure_user(&orm, "alice", "alice@example.com", "alice123").await?;
    let bob = ensure_user(&orm, "bob", "bob@example.com", "bob123").await?;
    seed_products(&orm, alice).await?;

    println!("Seed completed. alice={alice}, bob={bob}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    username: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<i32> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Username.eq(username))
        .one(orm)
        .await?
    {
        println!("User {username} already present");
        return Ok(existing.id);
    }

    let password_hash = hash_password(password)?;
    let user = UserActive {
        id: NotSet,
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        created_at: Set(Utc::now().into()),
    }
    .insert(orm)
    .await?;

    println!("Created user {username}");
    Ok(user.id)
}

async fn seed_products(orm: &DatabaseConnection, owner_id: i32) -> anyhow::Result<()> {
    let products = [
        ("Axum Hoodie", "Warm hoodie for Rustaceans", 5500, 50),
        ("Ferris Mug", "Coffee tastes better with Ferris", 1200, 100),
        ("Rust Sticker Pack", "Decorate your laptop", 500, 200),
        ("E-book: Async Rust", "Learn async Rust patterns", 2550, 75),
    ];

    for (name, desc, price, stock) in products {
        let exists = Products::find()
            .filter(ProdCol::Name.eq(name))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }

        ProductActive {
            id: NotSet,
            name: Set(name.to_string()),
            description: Set(desc.to_string()),
            price: Set(price),
            stock_quantity: Set(stock),
            owner_id: Set(owner_id),
            created_at: Set(Utc::now().into()),
        }
        .insert(orm)
        .await?;
    }

    println!("Seeded products");
    Ok(())
}
