use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::problem::ProblemDraft;

/// 定时提交任务
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
    pub id: String,
    /// 本地时间，格式同浏览器 `datetime-local`，如 `2025-07-01T09:30`
    pub commit_at: String,
    pub belt: String,
    pub title: String,
    pub readme: String,
    pub solution: String,
    #[serde(default)]
    pub topic: String,
}

impl ScheduledJob {
    pub fn new(commit_at: &str, belt: &str, draft: &ProblemDraft) -> Self {
        Self {
            id: Local::now().format("%Y%m%d%H%M%S%6f").to_string(),
            commit_at: commit_at.to_string(),
            belt: belt.to_string(),
            title: draft.title.clone(),
            readme: draft.readme.clone(),
            solution: draft.solution.clone(),
            topic: draft.topic.clone(),
        }
    }

    pub fn draft(&self) -> ProblemDraft {
        ProblemDraft {
            title: self.title.clone(),
            topic: self.topic.clone(),
            readme: self.readme.clone(),
            solution: self.solution.clone(),
        }
    }

    /// 是否已到执行时间；时间无法解析的任务视为已到期，交给执行方报告错误
    pub fn is_due(&self, now: NaiveDateTime) -> bool {
        parse_schedule_time(&self.commit_at).map_or(true, |at| at <= now)
    }
}

/// 解析 `datetime-local` 风格的时间（可带秒、可带小数秒）
pub fn parse_schedule_time(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 5] = [
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%d %H:%M:%S",
    ];
    let value = value.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_browser_datetime() {
        let at = parse_schedule_time("2025-07-01T09:30").unwrap();
        assert_eq!(at.format("%H:%M").to_string(), "09:30");
        assert!(parse_schedule_time("2025-07-01T09:30:15").is_some());
        assert!(parse_schedule_time("2025-07-01T09:30:15.123").is_some());
        assert!(parse_schedule_time("tomorrow").is_none());
    }

    #[test]
    fn parses_space_separated_minutes() {
        let at = parse_schedule_time("2030-01-01 10:00").unwrap();
        assert_eq!(at.format("%Y-%m-%dT%H:%M").to_string(), "2030-01-01T10:00");
        assert!(parse_schedule_time(" 2030-01-01 10:00:30 ").is_some());
    }

    #[test]
    fn due_check() {
        let draft = ProblemDraft {
            title: "T".into(),
            ..Default::default()
        };
        let job = ScheduledJob::new("2025-07-01T09:30", "White Belt", &draft);
        let before = parse_schedule_time("2025-07-01T09:29").unwrap();
        let after = parse_schedule_time("2025-07-01T09:31").unwrap();
        assert!(!job.is_due(before));
        assert!(job.is_due(after));
        assert_eq!(job.draft().title, "T");
    }
}
