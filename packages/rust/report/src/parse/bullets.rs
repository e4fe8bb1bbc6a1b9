//! Flat bullet list parser.

use super::has_bullet_mark;

/// Which lines of a section count as list entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulletRule {
    /// Only lines starting with `•` or `-`.
    Marked,
    /// Every non-empty line, for entries that span unbulleted detail lines.
    AnyLine,
}

/// Collect the trimmed lines of `body` accepted by `rule`.
///
/// Bullet markers are kept; entries are returned exactly as the trimmed line.
pub fn parse_bullets(body: &str, rule: BulletRule) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| match rule {
            BulletRule::Marked => has_bullet_mark(line),
            BulletRule::AnyLine => true,
        })
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "\
Here is what stands out:

• Hiring data scientists
  - Building an ML platform
Mostly cloud-first.
";

    #[test]
    fn marked_keeps_only_bullets() {
        assert_eq!(
            parse_bullets(BODY, BulletRule::Marked),
            vec!["• Hiring data scientists", "- Building an ML platform"]
        );
    }

    #[test]
    fn any_line_keeps_every_non_empty_line() {
        assert_eq!(
            parse_bullets(BODY, BulletRule::AnyLine),
            vec![
                "Here is what stands out:",
                "• Hiring data scientists",
                "- Building an ML platform",
                "Mostly cloud-first.",
            ]
        );
    }

    #[test]
    fn empty_body() {
        assert!(parse_bullets("", BulletRule::Marked).is_empty());
        assert!(parse_bullets("\n  \n", BulletRule::AnyLine).is_empty());
    }
}
