//! Promote an existing user to admin from the command line.
//!
//! Usage: `create-admin <email>`
//!
//! This is the sanctioned promotion path; it operates on the store
//! directly, so it works before the server has any admin at all.

use anyhow::{bail, Context};

use jobhub_api::ApiConfig;
use jobhub_models::Role;
use jobhub_store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let email = std::env::args()
        .nth(1)
        .context("Usage: create-admin <email>")?;

    let config = ApiConfig::from_env();
    let store = Store::open(&config.data_dir)?;

    let Some(mut user) = store.user_by_email(&email).await else {
        bail!("No user with email {email}");
    };

    if user.role == Role::Admin {
        println!("{email} is already an admin");
        return Ok(());
    }

    user.role = Role::Admin;
    store.users.put(user).await?;
    println!("{email} has been updated to the admin role");

    Ok(())
}
