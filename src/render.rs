// Plain-text rendering for the CLI
use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::catalog::{PageMarker, PageSnapshot};
use crate::engagement::reactions::ReactionSet;
use crate::engagement::tree::EngagementTree;
use crate::models::Outfit;
use crate::session::{ActingUser, Session};

pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    format_relative_time_at(dt, &Utc::now())
}

pub fn format_relative_time_at(dt: &DateTime<Utc>, now: &DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(*dt);

    let seconds = diff.num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let minutes = diff.num_minutes();
    if minutes < 60 {
        return format!("{}m ago", minutes);
    }

    let hours = diff.num_hours();
    if hours < 24 {
        return format!("{}h ago", hours);
    }

    let days = diff.num_days();
    if days < 7 {
        return format!("{}d ago", days);
    }

    dt.format("%b %-d, %Y").to_string()
}

/// "1 … 4 [5] 6 … 12"
pub fn page_window(page: &PageSnapshot) -> String {
    page.window
        .iter()
        .map(|marker| match marker {
            PageMarker::Page(n) if *n == page.page_number => format!("[{n}]"),
            PageMarker::Page(n) => n.to_string(),
            PageMarker::Ellipsis => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn outfit_table(page: &PageSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<38} {:<10} {:<8} {:<8} {:>6} {:>5} {:>8}",
        "ID", "CATEGORY", "SECTION", "STATUS", "RATING", "LIKES", "COMMENTS"
    );
    for outfit in &page.items {
        let _ = writeln!(
            out,
            "{:<38} {:<10} {:<8} {:<8} {:>6.1} {:>5} {:>8}",
            outfit.id,
            outfit.category,
            outfit.section,
            if outfit.active { "active" } else { "inactive" },
            outfit.rating,
            outfit.number_of_likes,
            outfit.number_of_comments,
        );
    }

    if page.total_matches == 0 {
        let _ = writeln!(out, "No outfits match.");
    } else {
        let _ = writeln!(
            out,
            "Showing {}-{} of {}   {}",
            page.first_index + 1,
            page.last_index,
            page.total_matches,
            page_window(page)
        );
    }
    out
}

fn reactions(likes: &ReactionSet, dislikes: &ReactionSet) -> String {
    format!("+{} -{}", likes.len(), dislikes.len())
}

/// Outfit header followed by its comment/reply tree.
pub fn outfit_detail(outfit: &Outfit, tree: &EngagementTree, session: &Session) -> String {
    let viewer: Option<&ActingUser> = session.user.as_ref();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} / {} / {} ({})",
        outfit.category,
        outfit.section,
        outfit.kind,
        if outfit.active { "active" } else { "inactive" }
    );
    if let Some(ref description) = outfit.description {
        let _ = writeln!(out, "{description}");
    }
    for item in &outfit.items {
        let _ = writeln!(
            out,
            "  * {} from {} ({:.2}) {}",
            item.item_name, item.source_name, item.item_price, item.item_link
        );
    }
    let _ = writeln!(
        out,
        "{}  likes {}  comments {}",
        reactions(&outfit.likes, &outfit.dislikes),
        outfit.number_of_likes,
        outfit.number_of_comments
    );

    for comment in tree.comments() {
        let removable = viewer.is_some_and(|u| tree.can_remove_comment(u, &comment.id));
        let _ = writeln!(
            out,
            "- [{}] {} ({}) {}{}\n    {}",
            comment.id,
            comment.author_name,
            format_relative_time(&comment.created_at),
            reactions(&comment.likes, &comment.dislikes),
            if removable { " [x]" } else { "" },
            comment.text
        );
        for reply in &comment.replies {
            let removable =
                viewer.is_some_and(|u| tree.can_remove_reply(u, &comment.id, &reply.id));
            let _ = writeln!(
                out,
                "    > [{}] {} ({}) {}{}\n        {}",
                reply.id,
                reply.author_name,
                format_relative_time(&reply.created_at),
                reactions(&reply.likes, &reply.dislikes),
                if removable { " [x]" } else { "" },
                reply.text
            );
        }
    }
    out
}
