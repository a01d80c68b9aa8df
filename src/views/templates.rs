use std::io::Write;

use anyhow::{anyhow, Result};
use tabwriter::TabWriter;

use super::heading;
use crate::commands::templates::types::Template;
use crate::config::EXEC_NAME;
use crate::utils::truncate;

const SUBTITLE: &str = "Start your next project with a pre-built template.";

pub fn render(templates: &[Template]) -> Result<String> {
    let mut tw = TabWriter::new(vec![]);

    writeln!(&mut tw, "TITLE\tTAGS\tDESCRIPTION")?;

    for template in templates {
        writeln!(
            &mut tw,
            "{}\t{}\t{}",
            template.title,
            template.tags.join(", "),
            truncate(template.description, 60)
        )?;
    }

    let table = tw
        .into_inner()
        .map_err(|_| anyhow!("Failed to render the template table"))?;

    Ok(format!(
        "{}\n\n{}\n\nStart from one with `{EXEC_NAME} templates use <title>`",
        heading("Templates", SUBTITLE),
        String::from_utf8(table)?.trim_end()
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::commands::templates::types::TEMPLATES;

    #[test]
    fn test_every_template_is_listed() {
        let rendered = render(&TEMPLATES).unwrap();

        for template in TEMPLATES {
            assert!(rendered.contains(template.title));
        }
    }
}
