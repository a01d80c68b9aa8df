use anyhow::{ensure, Context, Result};
use chrono::{DateTime, Utc};
use console::style;
use fern::colors::{Color, ColoredLevelConfig};
use log::{Level, LevelFilter};
use ms::{__to_string__, ms};

pub fn set_hook() {
    // setup a panic hook to easily exit the program on panic
    std::panic::set_hook(Box::new(|panic_info| {
        // print the panic message
        let message = if let Some(message) = panic_info.payload().downcast_ref::<String>() {
            message.clone()
        } else if let Some(message) = panic_info.payload().downcast_ref::<&str>() {
            (*message).to_string()
        } else {
            format!("{panic_info:?}")
        };

        // add some color
        log::error!("{message}");

        #[cfg(debug_assertions)]
        log::debug!("{panic_info}");

        std::process::exit(1);
    }));

    ctrlc::set_handler(|| {
        // dialoguer hides the cursor while prompting
        clean_term();
        std::process::exit(0);
    })
    .ok();
}

pub fn clean_term() {
    let term = console::Term::stdout();

    // if the terminal is a tty, clear the screen and reset the cursor
    if term.is_term() {
        term.show_cursor().ok();
    }
}

pub fn logs(verbose: bool) {
    let colors = ColoredLevelConfig::new()
        .info(Color::BrightCyan)
        .error(Color::BrightRed)
        .warn(Color::BrightYellow)
        .debug(Color::BrightWhite);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let level = record.level();

            match level {
                Level::Debug => out.finish(format_args!(
                    "{} [{}]: {}",
                    colors.color(Level::Debug).to_string().to_lowercase(),
                    record.target(),
                    message
                )),

                level => out.finish(format_args!(
                    "{}: {}",
                    colors.color(level).to_string().to_lowercase(),
                    message
                )),
            }
        })
        .level(if verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        // keep http internals out of verbose output
        .level_for("hyper", LevelFilter::Info)
        .level_for("reqwest", LevelFilter::Info)
        .chain(
            fern::Dispatch::new()
                .filter(|metadata| !matches!(metadata.level(), Level::Error | Level::Warn))
                .chain(std::io::stdout()),
        )
        .chain(
            fern::Dispatch::new()
                .level(log::LevelFilter::Warn)
                .chain(std::io::stderr()),
        )
        .apply()
        .ok();
}

pub fn relative_time(date: DateTime<Utc>) -> String {
    let milis = Utc::now().timestamp_millis() - date.timestamp_millis();

    ms!(milis.unsigned_abs(), true)
}

pub fn urlify(s: &str) -> String {
    style(s).bold().underlined().to_string()
}

/// Shows only the last 4 characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    let chars = secret.chars().collect::<Vec<_>>();

    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }

    let visible = chars[chars.len() - 4..].iter().collect::<String>();

    format!("{}{visible}", "*".repeat(chars.len() - 4))
}

/// Cuts `s` to at most `max` characters, adding an ellipsis when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }

    let mut cut = s.chars().take(max.saturating_sub(1)).collect::<String>();
    cut.push('…');
    cut
}

/// Returns `value` when given, otherwise asks for it. Required answers must not be blank.
pub fn ask(
    prompt: &str,
    value: Option<String>,
    initial: Option<&str>,
    required: bool,
) -> Result<String> {
    if let Some(value) = value {
        ensure!(
            !required || !value.trim().is_empty(),
            "{prompt} must not be empty"
        );

        return Ok(value.trim().to_string());
    }

    let mut input = dialoguer::Input::<String>::new();
    input.with_prompt(prompt).allow_empty(!required);

    if let Some(initial) = initial {
        input.with_initial_text(initial);
    }

    let answer = input
        .validate_with(|answer: &String| {
            if required && answer.trim().is_empty() {
                Err("This field is required")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .with_context(|| format!("Failed to read {prompt}"))?;

    Ok(answer.trim().to_string())
}

/// `None` for a blank answer.
pub fn non_empty(value: String) -> Option<String> {
    Some(value).filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("sk-1234567890"), "*********7890");
        assert_eq!(mask_secret("abc"), "***");
        assert_eq!(mask_secret(""), "");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Weather App", 32), "Weather App");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }

    #[test]
    fn test_given_values_skip_the_prompt() {
        let name = ask("Name", Some(" Todo ".into()), None, true);
        assert_eq!(name.unwrap(), "Todo");
        assert!(ask("Name", Some("  ".into()), None, true).is_err());

        let description = ask("Description", Some(String::new()), None, false);
        assert_eq!(description.unwrap(), "");
        assert_eq!(non_empty(" ".to_string()), None);
    }
}
