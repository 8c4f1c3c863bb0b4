//! Wikipedia edit friction.
//!
//! An edit undone by the next revision counts as an error. Friction is
//! read from the editor's experience on the article and the time since
//! their previous edit there.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::share;

const REVERT_TAGS: [&str; 3] = ["mw-rollback", "mw-undo", "mw-manual-revert"];
const REVERT_WORDS: [&str; 4] = ["revert", "undo", "rv ", "rvv"];
const MIN_ARTICLE_REVISIONS: usize = 10;
const MIN_BUCKET: usize = 3;
const TOP_EDITORS: usize = 10;

/// One revision as listed by the MediaWiki revisions API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Revision {
    /// Article title; exports of a single article may leave it out.
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub revid: Option<u64>,
    /// RFC 3339, e.g. `2024-03-01T12:00:00Z`.
    pub timestamp: String,
    /// Hidden or suppressed users have no name.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Revision {
    pub fn is_revert(&self) -> bool {
        if self.tags.iter().any(|t| REVERT_TAGS.contains(&t.as_str())) {
            return true;
        }
        let comment = self.comment.to_lowercase();
        REVERT_WORDS.iter().any(|w| comment.contains(w))
    }
}

/// A revision placed in its article's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edit {
    pub user: String,
    pub timestamp: DateTime<Utc>,
    /// Undone by the next revision.
    pub reverted: bool,
    pub is_revert: bool,
    /// Seconds since this user's previous edit on the article.
    pub seconds_since_last: Option<i64>,
    /// The user's earlier edits on the article.
    pub article_experience: usize,
}

/// Order revisions oldest first and derive per-edit friction. Revisions
/// with unparseable timestamps are dropped and counted.
pub fn edit_history(revisions: &[&Revision]) -> (Vec<Edit>, usize) {
    let mut dated: Vec<(DateTime<Utc>, &Revision)> = Vec::with_capacity(revisions.len());
    let mut bad_timestamps = 0;
    for &rev in revisions {
        match DateTime::parse_from_rfc3339(&rev.timestamp) {
            Ok(ts) => dated.push((ts.with_timezone(&Utc), rev)),
            Err(e) => {
                bad_timestamps += 1;
                tracing::warn!(timestamp = %rev.timestamp, error = %e, "skipping revision");
            }
        }
    }
    dated.sort_by_key(|(ts, _)| *ts);

    let mut last_edit: FxHashMap<&str, (DateTime<Utc>, usize)> = FxHashMap::default();
    let edits = dated
        .iter()
        .enumerate()
        .map(|(i, (timestamp, rev))| {
            let user = rev.user.as_deref().unwrap_or("Anonymous");
            let previous = last_edit.get(user).copied();
            last_edit.insert(user, (*timestamp, previous.map_or(1, |(_, n)| n + 1)));
            Edit {
                user: user.to_string(),
                timestamp: *timestamp,
                reverted: dated.get(i + 1).is_some_and(|(_, next)| next.is_revert()),
                is_revert: rev.is_revert(),
                seconds_since_last: previous.map(|(at, _)| (*timestamp - at).num_seconds()),
                article_experience: previous.map_or(0, |(_, n)| n),
            }
        })
        .collect();
    (edits, bad_timestamps)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevertBucket {
    pub label: &'static str,
    pub edits: usize,
    pub revert_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditorSummary {
    pub user: String,
    pub content_edits: usize,
    pub revert_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleFriction {
    pub title: String,
    pub revisions: usize,
    pub bad_timestamps: usize,
    /// Edits that are not themselves reverts.
    pub content_edits: usize,
    pub reverted: usize,
    pub revert_rate: f64,
    pub by_experience: Vec<RevertBucket>,
    /// Returning editors only; buckets under three edits are left out.
    pub by_time_since_last: Vec<RevertBucket>,
    pub top_editors: Vec<EditorSummary>,
}

fn bucketed(edits: &[&Edit], labels: &[&'static str], bucket_of: impl Fn(&Edit) -> usize, min: usize) -> Vec<RevertBucket> {
    let mut buckets: Vec<Vec<&Edit>> = vec![Vec::new(); labels.len()];
    for &e in edits {
        buckets[bucket_of(e)].push(e);
    }
    labels
        .iter()
        .copied()
        .zip(buckets)
        .filter(|(_, b)| !b.is_empty() && b.len() >= min)
        .map(|(label, b)| RevertBucket {
            label,
            edits: b.len(),
            revert_rate: share(&b, |e| e.reverted).unwrap_or(0.0),
        })
        .collect()
}

/// `None` below ten revisions.
pub fn article_friction(title: &str, revisions: &[&Revision]) -> Option<ArticleFriction> {
    if revisions.len() < MIN_ARTICLE_REVISIONS {
        return None;
    }
    let (edits, bad_timestamps) = edit_history(revisions);
    let content: Vec<&Edit> = edits.iter().filter(|e| !e.is_revert).collect();
    let reverted = content.iter().filter(|e| e.reverted).count();

    let by_experience = bucketed(
        &content,
        &["0 (first edit)", "1-5", "6-20", "21+"],
        |e| match e.article_experience {
            0 => 0,
            1..=5 => 1,
            6..=20 => 2,
            _ => 3,
        },
        1,
    );

    let returning: Vec<&Edit> = content.iter().copied().filter(|e| e.seconds_since_last.is_some()).collect();
    let by_time_since_last = bucketed(
        &returning,
        &["<1 min", "1-10 min", "10-60 min", "1-24 hr", ">24 hr"],
        |e| match e.seconds_since_last.unwrap_or_default() {
            s if s < 60 => 0,
            s if s < 600 => 1,
            s if s < 3_600 => 2,
            s if s < 86_400 => 3,
            _ => 4,
        },
        MIN_BUCKET,
    );

    let mut total_edits: BTreeMap<&str, usize> = BTreeMap::new();
    for e in &edits {
        *total_edits.entry(e.user.as_str()).or_default() += 1;
    }
    let mut most_active: Vec<(&str, usize)> = total_edits.into_iter().collect();
    most_active.sort_by(|a, b| b.1.cmp(&a.1));
    let top_editors = most_active
        .into_iter()
        .take(TOP_EDITORS)
        .filter_map(|(user, _)| {
            let own: Vec<&Edit> = content.iter().copied().filter(|e| e.user == user).collect();
            (own.len() >= MIN_BUCKET).then(|| EditorSummary {
                user: user.to_string(),
                content_edits: own.len(),
                revert_rate: share(&own, |e| e.reverted).unwrap_or(0.0),
            })
        })
        .collect();

    Some(ArticleFriction {
        title: title.to_string(),
        revisions: revisions.len(),
        bad_timestamps,
        content_edits: content.len(),
        reverted,
        revert_rate: if content.is_empty() { 0.0 } else { reverted as f64 / content.len() as f64 },
        by_experience,
        by_time_since_last,
        top_editors,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WikiReport {
    pub revisions: usize,
    pub articles: Vec<ArticleFriction>,
    /// Titles with fewer than ten revisions.
    pub skipped_articles: Vec<String>,
}

/// Group revisions by title and analyze each article.
pub fn analyze(revisions: &[Revision]) -> WikiReport {
    let mut by_title: BTreeMap<&str, Vec<&Revision>> = BTreeMap::new();
    for rev in revisions {
        by_title.entry(rev.title.as_deref().unwrap_or("(untitled)")).or_default().push(rev);
    }
    let mut report = WikiReport {
        revisions: revisions.len(),
        articles: Vec::new(),
        skipped_articles: Vec::new(),
    };
    for (title, revs) in by_title {
        match article_friction(title, &revs) {
            Some(article) => report.articles.push(article),
            None => report.skipped_articles.push(title.to_string()),
        }
    }
    report
}

impl WikiReport {
    pub fn to_text(&self) -> String {
        let mut out = String::from("Wikipedia edit friction (reverts by editor experience)\n");
        for a in &self.articles {
            out.push_str(&format!("\n  {}\n", a.title));
            out.push_str(&format!(
                "    Content edits:  {} of {} revisions, {} reverted ({:.1}%)\n",
                a.content_edits,
                a.revisions,
                a.reverted,
                100.0 * a.revert_rate
            ));
            out.push_str("    By article experience:\n");
            for b in &a.by_experience {
                out.push_str(&format!("      {}: {:.1}% reverted (n = {})\n", b.label, 100.0 * b.revert_rate, b.edits));
            }
            if !a.by_time_since_last.is_empty() {
                out.push_str("    By time since the editor's last edit:\n");
                for b in &a.by_time_since_last {
                    out.push_str(&format!("      {}: {:.1}% reverted (n = {})\n", b.label, 100.0 * b.revert_rate, b.edits));
                }
            }
            if !a.top_editors.is_empty() {
                out.push_str("    Most active editors:\n");
                for e in &a.top_editors {
                    out.push_str(&format!(
                        "      {:<20} {:>3} edits, {:.0}% reverted\n",
                        e.user,
                        e.content_edits,
                        100.0 * e.revert_rate
                    ));
                }
            }
        }
        if !self.skipped_articles.is_empty() {
            out.push_str(&format!(
                "\n  Skipped (under {MIN_ARTICLE_REVISIONS} revisions): {}\n",
                self.skipped_articles.join(", ")
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rev(minute: u32, user: &str, comment: &str) -> Revision {
        Revision {
            title: Some("Zugzwang".to_string()),
            revid: None,
            timestamp: format!("2024-03-01T{:02}:{:02}:00Z", minute / 60, minute % 60),
            user: Some(user.to_string()),
            size: None,
            comment: comment.to_string(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn revert_detection_uses_tags_and_comments() {
        assert!(rev(0, "a", "Reverted edits by X").is_revert());
        assert!(rev(0, "a", "rv vandalism").is_revert());
        assert!(!rev(0, "a", "copyedit").is_revert());
        let tagged = Revision {
            tags: vec!["mw-undo".to_string()],
            ..rev(0, "a", "")
        };
        assert!(tagged.is_revert());
    }

    #[test]
    fn history_is_ordered_before_marking_reverts() {
        // Newest first, as the API lists them.
        let revs = [
            rev(30, "patrol", "Undo revision"),
            rev(20, "newbie", "add trivia"),
            rev(5, "regular", "expand"),
            rev(0, "regular", "create"),
        ];
        let refs: Vec<&Revision> = revs.iter().collect();
        let (edits, bad) = edit_history(&refs);
        assert_eq!(bad, 0);
        let users: Vec<&str> = edits.iter().map(|e| e.user.as_str()).collect();
        assert_eq!(users, ["regular", "regular", "newbie", "patrol"]);
        assert_eq!(edits[1].article_experience, 1);
        assert_eq!(edits[1].seconds_since_last, Some(300));
        assert!(edits[2].reverted);
        assert!(!edits[1].reverted);
        assert!(edits[3].is_revert);
    }

    #[test]
    fn first_edits_get_reverted_more() {
        let mut revs = Vec::new();
        // A regular makes eight edits a day apart, none reverted.
        for day in 0..8 {
            revs.push(rev(day * 100, "regular", "expand"));
        }
        // Two newcomers, each reverted by a patroller.
        revs.push(rev(1_000, "newbie1", "add trivia"));
        revs.push(rev(1_001, "patrol", "revert"));
        revs.push(rev(1_100, "newbie2", "add trivia"));
        revs.push(rev(1_101, "patrol", "revert"));

        let report = analyze(&revs);
        let article = &report.articles[0];
        assert_eq!(article.title, "Zugzwang");
        assert_eq!(article.content_edits, 10);
        assert_eq!(article.reverted, 2);
        let first = &article.by_experience[0];
        assert_eq!(first.label, "0 (first edit)");
        assert_eq!(first.edits, 3);
        assert!((first.revert_rate - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(article.by_experience[1].revert_rate, 0.0);
        assert_eq!(article.top_editors[0].user, "regular");
        assert_eq!(article.top_editors[0].content_edits, 8);
    }

    #[test]
    fn short_articles_and_bad_timestamps() {
        let revs: Vec<Revision> = (0..4).map(|m| rev(m, "a", "edit")).collect();
        let report = analyze(&revs);
        assert!(report.articles.is_empty());
        assert_eq!(report.skipped_articles, vec!["Zugzwang".to_string()]);

        let broken = Revision {
            timestamp: "yesterday".to_string(),
            ..rev(0, "a", "")
        };
        let (edits, bad) = edit_history(&[&broken]);
        assert!(edits.is_empty());
        assert_eq!(bad, 1);
    }
}
