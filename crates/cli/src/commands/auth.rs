//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! qkart register -n crio.do -e crio.do@example.com -p learnbydoing -c learnbydoing
//! qkart login -e crio.do@example.com -p learnbydoing
//! qkart whoami
//! qkart logout
//! ```

use qkart_core::{RegisterForm, format_price};
use qkart_storefront::Storefront;
use qkart_storefront::error::Result;

use crate::console;

pub async fn login(storefront: &mut Storefront, email: &str, password: &str) -> Result<()> {
    storefront.login(email, password).await?;
    whoami(storefront);
    Ok(())
}

pub async fn register(
    storefront: &mut Storefront,
    name: String,
    email: String,
    password: String,
    confirm_password: String,
) -> Result<()> {
    let form = RegisterForm {
        name,
        email,
        password,
        confirm_password,
    };
    storefront.register(&form).await
}

pub fn logout(storefront: &mut Storefront) -> Result<()> {
    let username = storefront.session().username().map(ToOwned::to_owned);
    storefront.logout()?;
    if let Some(username) = username {
        console::show(&format!("Logged out {username}\n"));
    }
    Ok(())
}

/// Print who is logged in and their wallet balance.
pub fn whoami(storefront: &Storefront) {
    console::show(&describe_session(storefront));
}

fn describe_session(storefront: &Storefront) -> String {
    let session = storefront.session();
    match (session.is_logged_in(), session.username()) {
        (true, Some(username)) => {
            let balance = session
                .balance()
                .map_or_else(|| "unknown".to_string(), format_price);
            format!("{username} (wallet: {balance})\n")
        }
        _ => "Not logged in\n".to_string(),
    }
}
