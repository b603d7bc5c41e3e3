//! Seed the database with demo marketplace data.
//!
//! Creates demo accounts (admin, seller, courier, buyer), a few categories,
//! and sample listings for the seller. Safe to run more than once: existing
//! accounts and categories are reused instead of duplicated.

use rust_decimal::Decimal;

use mercado_core::Email;
use mercado_server::db::categories::{CategoryRepository, NewCategory};
use mercado_server::db::products::{NewProduct, ProductRepository};
use mercado_server::db::profiles::{ProfileRepository, RoleFlag};
use mercado_server::db::settings::{PAYMENT_QR_KEY, SettingsRepository};
use mercado_server::models::{Category, Profile, slugify};
use mercado_server::services::auth::{AuthError, AuthService};
use sqlx::PgPool;

use super::CliError;

const DEMO_PASSWORD: &str = "mercado-demo";

/// Seed demo data.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CliError> {
    let pool = super::connect().await?;

    let admin = ensure_account(&pool, "admin@mercado.test", "Demo Admin").await?;
    let seller = ensure_account(&pool, "seller@mercado.test", "Demo Seller").await?;
    let courier = ensure_account(&pool, "courier@mercado.test", "Demo Courier").await?;
    ensure_account(&pool, "buyer@mercado.test", "Demo Buyer").await?;

    let profiles = ProfileRepository::new(&pool);
    profiles
        .set_role_flag(admin.id, RoleFlag::Admin, true)
        .await?;
    profiles
        .set_role_flag(seller.id, RoleFlag::Seller, true)
        .await?;
    profiles
        .set_role_flag(courier.id, RoleFlag::Delivery, true)
        .await?;

    let produce = ensure_category(&pool, "Fresh Produce", "Fruit and vegetables").await?;
    let pantry = ensure_category(&pool, "Pantry", "Dry goods and staples").await?;
    ensure_category(&pool, "Household", "Cleaning and home supplies").await?;

    let products = ProductRepository::new(&pool);
    let listings = [
        NewProduct {
            category_id: Some(produce.id),
            name: "Bananas".to_owned(),
            description: Some("Sweet and ripe, sold by the kilo.".to_owned()),
            price: Decimal::new(1250, 2),
            original_price: None,
            stock: 40,
            images: vec![],
            unit: Some("kg".to_owned()),
            is_active: true,
            tags: vec!["fruit".to_owned()],
        },
        NewProduct {
            category_id: Some(produce.id),
            name: "Tomatoes".to_owned(),
            description: Some("Vine-ripened, sold by the kilo.".to_owned()),
            price: Decimal::new(1800, 2),
            original_price: Some(Decimal::new(2200, 2)),
            stock: 25,
            images: vec![],
            unit: Some("kg".to_owned()),
            is_active: true,
            tags: vec!["vegetable".to_owned()],
        },
        NewProduct {
            category_id: Some(pantry.id),
            name: "Rice 5kg".to_owned(),
            description: Some("Long grain white rice.".to_owned()),
            price: Decimal::new(6500, 2),
            original_price: None,
            stock: 12,
            images: vec![],
            unit: Some("bag".to_owned()),
            is_active: true,
            tags: vec!["staple".to_owned()],
        },
    ];
    for listing in &listings {
        products.create(seller.id, listing).await?;
    }

    SettingsRepository::new(&pool)
        .upsert(PAYMENT_QR_KEY, "https://mercado.test/demo-payment-qr.png")
        .await?;

    tracing::info!("Seeding complete!");
    tracing::info!("  Demo accounts use the password: {DEMO_PASSWORD}");
    Ok(())
}

/// Register an account, or fetch it if the email is already taken.
async fn ensure_account(pool: &PgPool, email: &str, name: &str) -> Result<Profile, CliError> {
    let auth = AuthService::new(pool);
    match auth.register(email, name, DEMO_PASSWORD).await {
        Ok(profile) => {
            tracing::info!("Created account: {email}");
            Ok(profile)
        }
        Err(AuthError::UserAlreadyExists) => {
            let parsed =
                Email::parse(email).map_err(|e| CliError::InvalidEmail(e.to_string()))?;
            ProfileRepository::new(pool)
                .get_by_email(&parsed)
                .await?
                .ok_or_else(|| CliError::NoSuchAccount(email.to_owned()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Create a category, or fetch it if the slug already exists.
async fn ensure_category(
    pool: &PgPool,
    name: &str,
    description: &str,
) -> Result<Category, CliError> {
    let repo = CategoryRepository::new(pool);
    let slug = slugify(name);

    if let Some(existing) = repo.get_by_slug(&slug).await? {
        return Ok(existing);
    }

    let category = repo
        .create(&NewCategory {
            name: name.to_owned(),
            slug,
            description: Some(description.to_owned()),
            icon: None,
            image_url: None,
            parent_id: None,
        })
        .await?;
    tracing::info!("Created category: {name}");
    Ok(category)
}
