//! Token command - manage the stored GitHub access token

use super::TokenAction;
use crate::config::mask_secret;
use crate::session::Session;
use crate::state::FileStateStore;
use anyhow::{bail, Context, Result};
use console::style;

pub fn run(action: TokenAction) -> Result<()> {
    let store = FileStateStore::open_default().context("Failed to open state directory")?;
    let session = Session::open(store);

    match action {
        TokenAction::Set { token } => {
            if token.trim().is_empty() {
                bail!("Token is empty");
            }
            session.set_token(&token)?;
            println!("{} Token stored", style("[OK]").green());
        }
        TokenAction::Clear => {
            session.clear_token()?;
            println!("{} Token removed", style("[OK]").green());
        }
        TokenAction::Show => match session.token()? {
            Some(token) => println!("Token: {}", style(mask_secret(&token)).cyan()),
            None => println!("{} No token stored", style("[--]").dim()),
        },
    }
    Ok(())
}
