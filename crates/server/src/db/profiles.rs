//! Profile repository.
//!
//! Accounts, password hashes, and role flags. Role flags are plain booleans
//! on the row and not mutually exclusive.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use mercado_core::{Email, ProfileId, RoleSet};

use super::RepositoryError;
use crate::models::Profile;

/// A profile row as stored.
#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    email: String,
    full_name: String,
    phone: Option<String>,
    address: Option<String>,
    address_code: Option<String>,
    avatar_url: Option<String>,
    is_seller: bool,
    is_admin: bool,
    is_delivery: bool,
    shop_name: Option<String>,
    shop_description: Option<String>,
    shop_logo_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

const PROFILE_COLUMNS: &str = "id, email, full_name, phone, address, address_code, avatar_url, \
     is_seller, is_admin, is_delivery, shop_name, shop_description, shop_logo_url, \
     created_at, updated_at";

impl TryFrom<ProfileRow> for Profile {
    type Error = RepositoryError;

    fn try_from(r: ProfileRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&r.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: ProfileId::new(r.id),
            email,
            full_name: r.full_name,
            phone: r.phone,
            address: r.address,
            address_code: r.address_code,
            avatar_url: r.avatar_url,
            roles: RoleSet::from_flags(r.is_seller, r.is_admin, r.is_delivery),
            shop_name: r.shop_name,
            shop_description: r.shop_description,
            shop_logo_url: r.shop_logo_url,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Role flag columns an admin (or the CLI) can toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleFlag {
    Seller,
    Admin,
    Delivery,
}

impl RoleFlag {
    const fn column(self) -> &'static str {
        match self {
            Self::Seller => "is_seller",
            Self::Admin => "is_admin",
            Self::Delivery => "is_delivery",
        }
    }
}

/// Fields a user may edit on their own profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub address_code: Option<String>,
    pub avatar_url: Option<String>,
    pub shop_name: Option<String>,
    pub shop_description: Option<String>,
    pub shop_logo_url: Option<String>,
}

/// Repository for profile database operations.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a profile by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: ProfileId) -> Result<Option<Profile>, RepositoryError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1");
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(self.pool)
            .await?;

        row.map(Profile::try_from).transpose()
    }

    /// Get a profile by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Profile>, RepositoryError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = $1");
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(Profile::try_from).transpose()
    }

    /// Create a new profile with an argon2 password hash.
    ///
    /// Both rows go in one transaction so a profile can never exist without
    /// its credential.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    pub async fn create_with_password(
        &self,
        email: &Email,
        full_name: &str,
        password_hash: &str,
    ) -> Result<Profile, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO profiles (id, email, full_name) VALUES ($1, $2, $3) \
             RETURNING {PROFILE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(ProfileId::generate().as_uuid())
            .bind(email.as_str())
            .bind(full_name)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("email already exists".to_owned());
                }
                RepositoryError::Database(e)
            })?;

        sqlx::query("INSERT INTO profile_passwords (profile_id, password_hash) VALUES ($1, $2)")
            .bind(row.id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Profile::try_from(row)
    }

    /// Get a profile and its password hash by email.
    ///
    /// Returns `None` if the profile doesn't exist or has no password set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Profile, String)>, RepositoryError> {
        let sql = format!(
            "SELECT p.{}, pw.password_hash FROM profiles p \
             JOIN profile_passwords pw ON pw.profile_id = p.id \
             WHERE p.email = $1",
            PROFILE_COLUMNS.replace(", ", ", p.")
        );
        let row = sqlx::query_as::<_, PasswordRow>(&sql)
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        let Some(r) = row else {
            return Ok(None);
        };

        let hash = r.password_hash.clone();
        Ok(Some((Profile::try_from(r.profile)?, hash)))
    }

    /// Update a profile's own editable fields. `None` fields keep their
    /// current value.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile doesn't exist.
    pub async fn update(
        &self,
        id: ProfileId,
        update: &ProfileUpdate,
    ) -> Result<Profile, RepositoryError> {
        let sql = format!(
            "UPDATE profiles SET \
                full_name = COALESCE($2, full_name), \
                phone = COALESCE($3, phone), \
                address = COALESCE($4, address), \
                address_code = COALESCE($5, address_code), \
                avatar_url = COALESCE($6, avatar_url), \
                shop_name = COALESCE($7, shop_name), \
                shop_description = COALESCE($8, shop_description), \
                shop_logo_url = COALESCE($9, shop_logo_url), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PROFILE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(id.as_uuid())
            .bind(update.full_name.as_deref())
            .bind(update.phone.as_deref())
            .bind(update.address.as_deref())
            .bind(update.address_code.as_deref())
            .bind(update.avatar_url.as_deref())
            .bind(update.shop_name.as_deref())
            .bind(update.shop_description.as_deref())
            .bind(update.shop_logo_url.as_deref())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Profile::try_from(row)
    }

    /// Update contact fields captured at checkout (name, phone, address).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_contact(
        &self,
        id: ProfileId,
        full_name: &str,
        phone: &str,
        address: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE profiles SET full_name = $2, phone = $3, address = $4, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(full_name)
        .bind(phone)
        .bind(address)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Set or clear a role flag on a profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the profile doesn't exist.
    pub async fn set_role_flag(
        &self,
        id: ProfileId,
        flag: RoleFlag,
        value: bool,
    ) -> Result<(), RepositoryError> {
        // Column name comes from a closed enum, never from user input.
        let sql = format!(
            "UPDATE profiles SET {} = $2, updated_at = NOW() WHERE id = $1",
            flag.column()
        );
        let result = sqlx::query(&sql)
            .bind(id.as_uuid())
            .bind(value)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// List all profiles, newest first (admin users page).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Profile>, RepositoryError> {
        let sql = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter().map(Profile::try_from).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PasswordRow {
    #[sqlx(flatten)]
    profile: ProfileRow,
    password_hash: String,
}
