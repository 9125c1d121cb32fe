//! Launch-impact heuristic: how much a story advances a project toward a
//! shippable product.

use crate::db::{DbError, StackDb};

/// Terms whose presence in a story's title/description signals progress
/// toward launch. Matched as case-insensitive substrings.
pub const LAUNCH_KEYWORDS: &[&str] = &[
    "deploy",
    "deployment",
    "domain",
    "ssl",
    "authentication",
    "login",
    "signup",
    "security",
    "performance",
    "seo",
    "analytics",
    "payment",
    "billing",
    "monitoring",
    "onboarding",
    "launch",
    "go-live",
    "production",
];

/// Launch-impact ranking factor on a 0-100 scale.
///
/// An explicit advances flag dominates; otherwise a launch-critical
/// keyword in the story text earns a partial boost, and everything else
/// sits at the neutral midpoint.
pub fn launch_impact(advances_flag: bool, text: &str) -> i64 {
    if advances_flag {
        return 100;
    }
    if contains_launch_keyword(text) {
        80
    } else {
        50
    }
}

/// Derive the advances-launch-stage flag from a story's title and
/// description.
pub fn advances_launch_stage(title: &str, description: Option<&str>) -> bool {
    let text = match description {
        Some(desc) => format!("{title} {desc}"),
        None => title.to_string(),
    };
    contains_launch_keyword(&text)
}

fn contains_launch_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    LAUNCH_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Re-derive the advances flag for every open story in a project.
/// Returns how many stories changed.
pub fn refresh_launch_flags(
    db: &StackDb,
    workspace_id: &str,
    project_id: &str,
) -> Result<usize, DbError> {
    let stories = db.list_open_stories(workspace_id, project_id)?;
    db.with_transaction(|db| {
        let mut changed = 0;
        for story in &stories {
            let advances = advances_launch_stage(&story.title, story.description.as_deref());
            if advances != story.advances_launch_stage {
                db.set_advances_launch_stage(&story.id, advances)?;
                changed += 1;
            }
        }
        Ok(changed)
    })
}
