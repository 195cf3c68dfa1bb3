//! Creates an administrator account, or promotes an existing one.
//!
//! Usage: `DATABASE_URL=postgres://... create-admin <name> <email>`; the
//! password is read from stdin.

use std::io::{self, Write};

use acquisitions_core::store::postgres::DEFAULT_MAX_CONNECTIONS;
use acquisitions_core::{password, NewUser, PgUserStore, Role, SignUpRequest, UserChanges, UserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(name), Some(email)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: create-admin <name> <email>");
    };
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| anyhow::anyhow!("DATABASE_URL is missing"))?;

    eprint!("Enter password: ");
    io::stderr().flush()?;
    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    let password = password.trim_end_matches(['\r', '\n']).to_string();

    let input = SignUpRequest {
        name: Some(name),
        email: Some(email),
        password: Some(password),
        role: Some(Role::Admin.to_string()),
    }
    .validate()
    .map_err(|e| anyhow::anyhow!("Validation failed: {e}"))?;

    let store = PgUserStore::connect(&database_url, DEFAULT_MAX_CONNECTIONS).await?;
    store.migrate().await?;

    let password_hash = password::hash_password(&input.password)?;

    match store.find_by_email(&input.email).await? {
        Some(existing) => {
            store
                .update(
                    existing.id,
                    UserChanges {
                        role: Some(Role::Admin),
                        password_hash: Some(password_hash),
                        ..Default::default()
                    },
                )
                .await?;
            println!("Promoted {} (id {}) to admin", existing.email, existing.id);
        }
        None => {
            let user = store
                .create(NewUser {
                    name: input.name,
                    email: input.email,
                    password_hash,
                    role: input.role,
                })
                .await?;
            println!("Created admin {} (id {})", user.email, user.id);
        }
    }

    Ok(())
}
