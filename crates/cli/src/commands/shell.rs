//! Interactive storefront.
//!
//! Every plain input line is treated as the new content of the search box:
//! lookups are debounced, so only the last line typed within the debounce
//! window is searched. Lines starting with `/` are commands.

use qkart_core::Intent;
use qkart_storefront::Storefront;
use qkart_storefront::search::SearchDispatcher;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

use crate::console;

const HELP: &str = "\
Type to search products. Commands:
  /products             show all products
  /refresh              reload the catalog from the server
  /cart                 show the cart
  /add <id> [qty]       add a product to the cart
  /inc <id>             increase quantity
  /dec <id>             decrease quantity
  /login <email> <pw>   log in
  /logout               log out
  /whoami               show the logged-in user
  /help                 show this help
  /quit                 leave
";

/// A parsed `/`-command.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Products,
    Refresh,
    Cart,
    Add { product_id: String, qty: u32 },
    Step { product_id: String, intent: Intent },
    Login { email: String, password: String },
    Logout,
    Whoami,
    Help,
    Quit,
}

/// One line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Search(String),
    Command(ShellCommand),
    Invalid(String),
}

fn parse_line(line: &str) -> Input {
    let Some(command) = line.trim().strip_prefix('/') else {
        return Input::Search(line.trim().to_string());
    };

    let mut words = command.split_whitespace();
    let name = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    let parsed = match (name, args.as_slice()) {
        ("products", []) => ShellCommand::Products,
        ("refresh", []) => ShellCommand::Refresh,
        ("cart", []) => ShellCommand::Cart,
        ("add", [id]) => ShellCommand::Add {
            product_id: (*id).to_string(),
            qty: 1,
        },
        ("add", [id, qty]) => match qty.parse() {
            Ok(qty) => ShellCommand::Add {
                product_id: (*id).to_string(),
                qty,
            },
            Err(_) => return Input::Invalid(format!("Not a quantity: {qty}")),
        },
        ("inc", [id]) => ShellCommand::Step {
            product_id: (*id).to_string(),
            intent: Intent::Add,
        },
        ("dec", [id]) => ShellCommand::Step {
            product_id: (*id).to_string(),
            intent: Intent::Remove,
        },
        ("login", [email, password]) => ShellCommand::Login {
            email: (*email).to_string(),
            password: (*password).to_string(),
        },
        ("logout", []) => ShellCommand::Logout,
        ("whoami", []) => ShellCommand::Whoami,
        ("help", _) => ShellCommand::Help,
        ("quit" | "exit", _) => ShellCommand::Quit,
        _ => return Input::Invalid(format!("Unknown command: /{command}")),
    };
    Input::Command(parsed)
}

/// Run the shell until `/quit` or end of input.
///
/// # Errors
///
/// Returns an error only if stdin can't be read; storefront failures are
/// shown as notifications and the shell carries on.
pub async fn run(storefront: &mut Storefront) -> std::io::Result<()> {
    let (tx, mut results) = mpsc::unbounded_channel();
    let mut search = storefront.search_dispatcher(tx);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if storefront.load_catalog().await.is_ok() && storefront.load_cart().await.is_ok() {
        console::show(&console::listing(storefront.listing(), storefront.cart()));
    }
    console::show(HELP);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if !handle_line(storefront, &mut search, &line).await {
                    break;
                }
            }
            Some(result) = results.recv() => {
                if !search.is_current(&result) {
                    debug!(query = %result.query, "Dropping superseded search result");
                    continue;
                }
                if storefront.apply_search_result(result).is_ok() {
                    console::show(&console::listing(storefront.listing(), storefront.cart()));
                }
            }
        }
    }

    search.cancel();
    Ok(())
}

/// Handle one input line. Returns `false` when the shell should exit.
async fn handle_line(storefront: &mut Storefront, search: &mut SearchDispatcher, line: &str) -> bool {
    let command = match parse_line(line) {
        Input::Search(text) => {
            search.on_input(text);
            return true;
        }
        Input::Invalid(message) => {
            console::show(&format!("{message}\n"));
            return true;
        }
        Input::Command(command) => command,
    };

    // Failures were already shown as notifications
    let outcome = match command {
        ShellCommand::Quit => return false,
        ShellCommand::Help => {
            console::show(HELP);
            Ok(())
        }
        ShellCommand::Products => super::catalog::products(storefront).await,
        ShellCommand::Refresh => super::catalog::refresh(storefront).await,
        ShellCommand::Cart => super::cart::show(storefront).await,
        ShellCommand::Add { product_id, qty } => super::cart::add(storefront, &product_id, qty).await,
        ShellCommand::Step { product_id, intent } => {
            super::cart::step(storefront, &product_id, intent).await
        }
        ShellCommand::Login { email, password } => {
            super::auth::login(storefront, &email, &password).await
        }
        ShellCommand::Logout => super::auth::logout(storefront),
        ShellCommand::Whoami => {
            super::auth::whoami(storefront);
            Ok(())
        }
    };

    if let Err(e) = outcome {
        debug!(error = %e, "Shell command failed");
    }
    true
}
