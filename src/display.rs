use crate::{
    github::responses::{Comment, Repository},
    types::{Discussion, Issue, IssueStatus, RepoStats, WikiPage},
};
use anyhow::{anyhow, Result};
use chrono::{DateTime, TimeZone, Utc};
use console::style;
use std::{borrow::Cow, fmt, io::Write};
use tabwriter::TabWriter;

const TITLE_LEN: u8 = 48;

pub fn ellipsize(text: &str, threshold: usize) -> Cow<'_, str> {
    debug_assert!(threshold > 2);
    if text.len() <= threshold {
        text.into()
    } else {
        let text: String =
            text.chars().map(|c| if c == '\n' { ' ' } else { c }).take(threshold - 2).collect();
        let text: String = text.trim().chars().chain("..".chars()).collect();
        text.into()
    }
}

/// Relative time from now.
pub trait RelativeFromNow {
    fn relative_from_now(&self) -> Since;
}

impl<T> RelativeFromNow for DateTime<T>
where
    T: TimeZone,
{
    fn relative_from_now(&self) -> Since {
        let duration = Utc::now().signed_duration_since(self.clone());
        Since(duration)
    }
}

#[derive(PartialEq, Copy, Clone, Debug)]
pub struct Since(chrono::Duration);

impl fmt::Display for Since {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days = self.0.num_days();
        match days {
            _ if days < 1 => {
                let hours = self.0.num_hours();
                if hours < 1 {
                    let minutes = self.0.num_minutes();
                    if minutes < 1 {
                        write!(f, "just now")
                    } else {
                        write!(f, "{minutes} minutes ago")
                    }
                } else {
                    write!(f, "{hours} hours ago")
                }
            }
            _ if days < 7 => {
                write!(f, "this week")
            }
            _ if days < 30 => {
                write!(f, "this month")
            }
            _ if days < 365 => {
                write!(f, "this year")
            }
            _ => {
                let years = days / 365;
                if years == 1 {
                    write!(f, "{years} year ago")
                } else {
                    write!(f, "{years} years ago")
                }
            }
        }
    }
}

/// Status cell colored per the triage scheme: resolved green, active yellow,
/// new red.
fn styled_status(status: IssueStatus) -> String {
    let styled = match status {
        IssueStatus::New => style("new").red(),
        IssueStatus::Active => style("active").yellow(),
        IssueStatus::Resolved => style("resolved").green(),
    };
    styled.to_string()
}

fn finish(tw: TabWriter<Vec<u8>>) -> Result<String> {
    let buf = tw.into_inner().map_err(|_| anyhow!("failed to flush table"))?;
    Ok(String::from_utf8(buf)?)
}

pub fn repositories_table(repos: &[Repository]) -> Result<String> {
    let mut tw = TabWriter::new(vec![]);
    writeln!(tw, "NAME\tLANGUAGE\tSTARS\tFORKS\tOPEN ISSUES\tWIKI")?;
    for r in repos {
        writeln!(
            tw,
            "{}\t{}\t{}\t{}\t{}\t{}",
            r.name,
            r.language.as_deref().unwrap_or("-"),
            r.stargazers_count,
            r.forks_count,
            r.open_issues_count.map(|x| x.to_string()).unwrap_or_else(|| "-".to_owned()),
            if r.has_wiki.unwrap_or(false) { "yes" } else { "no" },
        )?;
    }
    tw.flush()?;
    finish(tw)
}

pub fn issues_table(issues: &[Issue]) -> Result<String> {
    let mut tw = TabWriter::new(vec![]);
    writeln!(tw, "REPOSITORY\t#\tSTATUS\tTITLE\tCOMMENTS\tUPDATED")?;
    for issue in issues {
        writeln!(
            tw,
            "{}\t{}\t{}\t{}\t{}\t{}",
            issue.repository_name,
            issue.number,
            styled_status(issue.status()),
            ellipsize(&issue.title, TITLE_LEN as _),
            issue.comments,
            issue.updated_at.relative_from_now(),
        )?;
    }
    tw.flush()?;
    finish(tw)
}

pub fn comments_list(comments: &[Comment]) -> String {
    let mut out = String::new();
    for comment in comments {
        out.push_str(&format!(
            "{} ({})\n{}\n\n",
            style(&comment.user.login).bold(),
            comment.created_at.relative_from_now(),
            comment.body.trim_end(),
        ));
    }
    out
}

pub fn discussions_table(discussions: &[Discussion]) -> Result<String> {
    let mut tw = TabWriter::new(vec![]);
    writeln!(tw, "#\tCATEGORY\tTITLE\tAUTHOR\tANSWERED\tCOMMENTS\tUPVOTES")?;
    for d in discussions {
        writeln!(
            tw,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            d.number,
            d.category,
            ellipsize(&d.title, TITLE_LEN as _),
            d.author,
            if d.is_answered { "yes" } else { "no" },
            d.comment_count,
            d.upvote_count,
        )?;
    }
    tw.flush()?;
    finish(tw)
}

pub fn stats_summary(stats: &RepoStats) -> String {
    let mut out = String::new();
    match &stats.traffic {
        Some(traffic) => {
            out.push_str(&format!(
                "Views (14d): {} total, {} unique\n",
                traffic.count, traffic.uniques
            ));
        }
        None => out.push_str("Views (14d): unavailable\n"),
    }
    if stats.contributors.is_empty() {
        out.push_str("Contributors: unavailable\n");
    } else {
        out.push_str("Contributors:\n");
        for c in &stats.contributors {
            out.push_str(&format!("  {}\t{} commits\n", c.author.login, c.total));
        }
    }
    let commits: i64 = stats.commit_activity.iter().map(|x| x.total).sum();
    out.push_str(&format!(
        "Commits (52w): {}\n",
        if stats.commit_activity.is_empty() { "unavailable".to_owned() } else { commits.to_string() }
    ));
    let (additions, deletions) = stats
        .code_frequency
        .iter()
        .fold((0, 0), |(a, d), x| (a + x.additions, d + x.deletions));
    if stats.code_frequency.is_empty() {
        out.push_str("Code frequency: unavailable\n");
    } else {
        out.push_str(&format!("Code frequency: +{additions} / -{deletions}\n"));
    }
    out
}

pub fn wiki_pages_table(pages: &[WikiPage]) -> Result<String> {
    let mut tw = TabWriter::new(vec![]);
    writeln!(tw, "TITLE\tSIZE\tSHA")?;
    for page in pages {
        writeln!(
            tw,
            "{}\t{}\t{}",
            page.title,
            page.content.len(),
            page.sha.as_deref().map(|x| &x[..x.len().min(7)]).unwrap_or("-"),
        )?;
    }
    tw.flush()?;
    finish(tw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::responses::IssueState;
    use quickcheck::{quickcheck, TestResult};

    #[test]
    fn test_ellipsize() {
        fn has_max_length_threshold(text: String, threshold: usize) -> TestResult {
            if threshold < 3 {
                return TestResult::discard();
            }
            TestResult::from_bool(ellipsize(&text, threshold).chars().count() <= threshold)
        }
        quickcheck(has_max_length_threshold as fn(_, _) -> TestResult);

        assert_eq!(ellipsize("short", 10), "short");
        assert_eq!(ellipsize("a rather longish title", 10), "a rather..");
    }

    #[test]
    fn test_issues_table_rows() {
        let issue = Issue {
            id: 10,
            number: 4,
            title: "Crash on launch".to_owned(),
            body: None,
            state: IssueState::Closed,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            closed_at: Some(Utc::now()),
            comments: 2,
            repository_name: "tracker".to_owned(),
        };
        let table = issues_table(&[issue]).unwrap();
        let row = table.lines().nth(1).unwrap();
        assert!(row.contains("tracker"));
        assert!(row.contains("resolved"));
        assert!(row.contains("Crash on launch"));
    }

    #[test]
    fn test_stats_summary_marks_missing_traffic() {
        let stats = RepoStats::default();
        let summary = stats_summary(&stats);
        assert!(summary.contains("Views (14d): unavailable"));
    }
}
