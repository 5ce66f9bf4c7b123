use clap::Subcommand;
use habitual_core::storage::Database;
use habitual_core::Theme;

use super::CliResult;

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the current theme
    Get,
    /// Switch between light and dark
    Toggle,
    /// Set the theme explicitly
    Set {
        /// "light" or "dark"
        theme: Theme,
    },
}

pub fn run(action: ThemeAction) -> CliResult {
    let mut db = Database::open()?;
    let theme = match action {
        ThemeAction::Get => Theme::load(&db),
        ThemeAction::Toggle => Theme::toggle(&mut db)?,
        ThemeAction::Set { theme } => {
            theme.save(&mut db)?;
            theme
        }
    };
    println!("{theme}");
    Ok(())
}
