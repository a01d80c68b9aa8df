use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::state::State;
use crate::store::preferences::{Preferences, Theme};
use crate::store::Store;

#[derive(Debug, Parser)]
#[clap(about = "Print the current theme")]
pub struct GetOptions {}

#[derive(Debug, Parser)]
#[clap(about = "Set the theme")]
pub struct SetOptions {
    #[clap(name = "theme", value_enum, help = "Theme to use")]
    pub theme: Theme,
}

#[derive(Debug, Parser)]
#[clap(about = "Switch between the light and dark theme")]
pub struct ToggleOptions {}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Get(GetOptions),
    Set(SetOptions),
    Toggle(ToggleOptions),
}

#[derive(Debug, Parser)]
#[clap(about = "Manage the theme preference")]
pub struct Options {
    #[clap(subcommand)]
    pub commands: Commands,
}

/// Applies the command to `prefs`, returning the resulting theme.
pub fn apply(commands: &Commands, prefs: &mut Preferences) -> Theme {
    match commands {
        Commands::Get(_) => {}
        Commands::Set(options) => prefs.theme = options.theme,
        Commands::Toggle(_) => prefs.theme = prefs.theme.toggled(),
    }

    prefs.theme
}

pub async fn handle(options: Options, state: &mut State) -> Result<()> {
    let theme = apply(&options.commands, &mut state.prefs);

    if let Commands::Get(_) = options.commands {
        println!("{theme}");
        return Ok(());
    }

    state.prefs.save().await?;

    log::info!("Theme set to `{theme}`");

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_apply() {
        let mut prefs = Preferences::default();

        let get = Commands::Get(GetOptions {});
        let toggle = Commands::Toggle(ToggleOptions {});

        assert_eq!(apply(&get, &mut prefs), Theme::System);
        assert_eq!(apply(&toggle, &mut prefs), Theme::Dark);
        assert_eq!(apply(&toggle, &mut prefs), Theme::Light);
        assert_eq!(
            apply(
                &Commands::Set(SetOptions {
                    theme: Theme::System
                }),
                &mut prefs
            ),
            Theme::System
        );
    }
}
