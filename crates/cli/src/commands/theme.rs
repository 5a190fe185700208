//! Theme commands.

use clap::Subcommand;

use mirrorcraft_storefront::Storefront;

use super::{CliError, Output};

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Show the current theme
    Show,
    /// Switch between light and dark
    Toggle,
}

#[allow(clippy::unnecessary_wraps)]
pub fn run(storefront: &Storefront, out: &Output, action: ThemeAction) -> Result<(), CliError> {
    let theme = match action {
        ThemeAction::Show => storefront.theme().current(),
        ThemeAction::Toggle => storefront.theme().toggle(),
    };
    out.emit(&theme, || theme.to_string());
    Ok(())
}
