//! Terminal output formatting.

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use cinegraph_core::{EntityKey, PairKey, RankedGroup, SignatureCount};

/// Clip a string to a display width, appending `...` when truncated.
pub fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for c in s.chars() {
        if out.width() + 3 >= max {
            break;
        }
        out.push(c);
    }
    out.push_str("...");
    out
}

fn roles_column(roles: &std::collections::BTreeSet<String>) -> String {
    roles.iter().cloned().collect::<Vec<_>>().join(", ")
}

/// Entities with multiple roles across their whole history.
pub fn print_entity_groups(groups: &[RankedGroup<EntityKey>], limit: usize) {
    if groups.is_empty() {
        println!("{}", "No entities with multiple roles.".dimmed());
        return;
    }

    println!("{:<40} {:>6}  {}", "Artist", "Roles", "Role set");
    println!("{}", "-".repeat(90));
    for group in groups.iter().take(limit) {
        println!(
            "{:<40} {:>6}  {}",
            truncate(&group.key.name, 40),
            group.count,
            roles_column(&group.roles)
        );
    }
    if groups.len() > limit {
        println!("{}", format!("... and {} more", groups.len() - limit).dimmed());
    }
}

/// Entity/film pairs with multiple roles on the same film.
pub fn print_pair_groups(groups: &[RankedGroup<PairKey>], limit: usize) {
    if groups.is_empty() {
        println!("{}", "No artist/film pairs with multiple roles.".dimmed());
        return;
    }

    println!("{:<40} {:<50} {}", "Artist", "Film", "Role set");
    println!("{}", "-".repeat(110));
    for group in groups.iter().take(limit) {
        println!(
            "{:<40} {:<50} {}",
            truncate(&group.key.entity_name, 40),
            truncate(&group.key.counterpart_name, 50),
            roles_column(&group.roles)
        );
    }
    if groups.len() > limit {
        println!("{}", format!("... and {} more", groups.len() - limit).dimmed());
    }
}

/// Ranked combination signatures.
pub fn print_signatures(signatures: &[SignatureCount]) {
    if signatures.is_empty() {
        println!("{}", "No role combinations found.".dimmed());
        return;
    }

    println!("{:<60} {:>9}", "Combination", "Frequency");
    println!("{}", "-".repeat(70));
    for entry in signatures {
        println!("{:<60} {:>9}", truncate(entry.signature.as_str(), 60), entry.frequency);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        let clipped = truncate("a very long film title indeed", 12);
        assert!(clipped.ends_with("..."));
        assert!(clipped.width() <= 12);
    }
}
