//! Static pages.

use console::style;

use super::heading;
use crate::config::EXEC_NAME;
use crate::routes::Route;

pub fn community() -> String {
    let featured = [
        ("Weatherly", "Sarah J.", "React Native", 128),
        ("FinanceFlow", "Mike R.", "Flutter", 94),
        ("SoundWave", "Chloe B.", "SwiftUI", 215),
    ];

    let discussions = [
        (
            "How do you handle state management in large apps?",
            "Alex M.",
            15,
        ),
        (
            "Showcase: My new AI-generated portfolio website",
            "Emily K.",
            8,
        ),
        (
            "Best practices for securing API keys on the client-side?",
            "David L.",
            22,
        ),
    ];

    let mut lines = vec![
        heading(
            "Community Hub",
            "Connect with other builders and share your creations.",
        ),
        String::new(),
        style("Featured Projects").bold().to_string(),
    ];

    for (name, author, framework, likes) in featured {
        lines.push(format!("  {name} by {author} [{framework}] {likes} likes"));
    }

    lines.push(String::new());
    lines.push(style("Latest Discussions").bold().to_string());

    for (title, author, replies) in discussions {
        lines.push(format!("  {title} by {author}, {replies} replies"));
    }

    lines.join("\n")
}

pub fn support() -> String {
    [
        heading(
            "Help & Support",
            "Find answers, guides, and tutorials to get the most out of the platform.",
        ),
        String::new(),
        style("How to connect your OpenAI API key")
            .bold()
            .to_string(),
        "  1. Create a secret key at https://platform.openai.com/api-keys".to_string(),
        format!(
            "  2. Save it with `{EXEC_NAME} settings set --api-key <KEY>`"
        ),
        String::new(),
        style("Frequently Asked Questions").bold().to_string(),
        "  Can I customize the generated code?".to_string(),
        "    Yes. Once you download the project you have full control over it.".to_string(),
    ]
    .join("\n")
}

pub fn login() -> String {
    format!("Sign in with `{EXEC_NAME} auth login`")
}

pub fn not_found(path: &str) -> String {
    format!(
        "{}\nNothing lives at `{path}`. Go back to the dashboard with `{EXEC_NAME} open {}`",
        style("404").bold(),
        Route::Dashboard
    )
}
