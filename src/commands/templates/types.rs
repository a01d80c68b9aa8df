#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub title: &'static str,
    pub description: &'static str,
    pub tags: &'static [&'static str],
}

pub const TEMPLATES: [Template; 6] = [
    Template {
        title: "Task Manager",
        description: "A robust to-do list app with categories, priorities, and deadlines.",
        tags: &["Productivity", "Utility"],
    },
    Template {
        title: "Social Feed",
        description: "A basic social media feed with posts, likes, and comments.",
        tags: &["Social", "Content"],
    },
    Template {
        title: "E-commerce Storefront",
        description: "A clean storefront for selling products with a cart and checkout flow.",
        tags: &["Business", "E-commerce"],
    },
    Template {
        title: "Workout Logger",
        description: "Track your exercises, sets, reps, and progress over time.",
        tags: &["Health", "Fitness"],
    },
    Template {
        title: "Recipe Book",
        description: "Save and organize your favorite recipes with ingredients and instructions.",
        tags: &["Food", "Lifestyle"],
    },
    Template {
        title: "Real-time Chat",
        description: "A messaging application with private and group chat functionality.",
        tags: &["Communication", "Social"],
    },
];

/// Case-insensitive lookup by title.
pub fn find_template(title: &str) -> Option<&'static Template> {
    TEMPLATES
        .iter()
        .find(|template| template.title.eq_ignore_ascii_case(title.trim()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_find_template() {
        assert_eq!(find_template("recipe book").unwrap().title, "Recipe Book");
        assert!(find_template("Spaceship").is_none());
    }
}
