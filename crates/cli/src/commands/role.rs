//! Role flag management.
//!
//! Grants and revokes the seller, admin, and delivery flags. This is the
//! only way to grant the admin flag; the admin web surface can toggle
//! seller and delivery on non-admin accounts but never touches admin.

use mercado_core::Email;
use mercado_server::db::profiles::{ProfileRepository, RoleFlag};

use super::CliError;

/// Set or clear a role flag on the account with the given email.
///
/// # Errors
///
/// Returns `CliError::NoSuchAccount` if the email isn't registered, or
/// `InvalidRole` for an unknown flag name.
pub async fn set(email: &str, role: &str, enabled: bool) -> Result<(), CliError> {
    let flag = parse_role(role)?;
    let email = Email::parse(email).map_err(|e| CliError::InvalidEmail(e.to_string()))?;

    let pool = super::connect().await?;
    let repo = ProfileRepository::new(&pool);

    let profile = repo
        .get_by_email(&email)
        .await?
        .ok_or_else(|| CliError::NoSuchAccount(email.as_str().to_owned()))?;

    repo.set_role_flag(profile.id, flag, enabled).await?;

    tracing::info!(
        "Role '{}' {} for {} ({})",
        role,
        if enabled { "granted" } else { "revoked" },
        profile.full_name,
        email.as_str()
    );
    Ok(())
}

fn parse_role(role: &str) -> Result<RoleFlag, CliError> {
    match role {
        "seller" => Ok(RoleFlag::Seller),
        "admin" => Ok(RoleFlag::Admin),
        "delivery" => Ok(RoleFlag::Delivery),
        other => Err(CliError::InvalidRole(other.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role() {
        assert!(matches!(parse_role("seller"), Ok(RoleFlag::Seller)));
        assert!(matches!(parse_role("admin"), Ok(RoleFlag::Admin)));
        assert!(matches!(parse_role("delivery"), Ok(RoleFlag::Delivery)));
        assert!(matches!(parse_role("buyer"), Err(CliError::InvalidRole(_))));
    }
}
