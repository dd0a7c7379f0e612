//! 工作台界面状态
//!
//! 只描述"界面现在是什么样"，不包含任何 IO。所有修改都经由
//! [`Controller`](super::Controller) 完成。

use phf::phf_map;

use crate::models::ProblemDraft;

/// 请求编号，用于识别过期响应
pub type RequestId = u64;

/// 面板
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Generate,
    Commit,
    Delete,
}

static PANEL_TARGETS: phf::Map<&'static str, Panel> = phf_map! {
    "generate" => Panel::Generate,
    "commit" => Panel::Commit,
    "delete" => Panel::Delete,
};

impl Panel {
    pub const ALL: [Panel; 3] = [Panel::Generate, Panel::Commit, Panel::Delete];

    /// 按标签声明的目标标识查找面板
    pub fn from_target(target: &str) -> Option<Panel> {
        PANEL_TARGETS.get(target.trim()).copied()
    }

    pub fn target(self) -> &'static str {
        match self {
            Panel::Generate => "generate",
            Panel::Commit => "commit",
            Panel::Delete => "delete",
        }
    }
}

/// 标签栏：同一时刻只有一个激活标签，对应唯一可见面板
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabBar {
    active: Panel,
}

impl Default for TabBar {
    fn default() -> Self {
        Self {
            active: Panel::Generate,
        }
    }
}

impl TabBar {
    pub fn active(&self) -> Panel {
        self.active
    }

    pub fn activate(&mut self, panel: Panel) {
        self.active = panel;
    }

    pub fn is_link_active(&self, panel: Panel) -> bool {
        self.active == panel
    }

    pub fn is_panel_visible(&self, panel: Panel) -> bool {
        self.active == panel
    }
}

/// 提示消息类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub id: u64,
    pub text: String,
    pub kind: StatusKind,
}

/// 共享提示区，按插入顺序保存，各条消息独立过期
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBoard {
    next_id: u64,
    messages: Vec<StatusMessage>,
}

impl StatusBoard {
    pub fn push(&mut self, text: impl Into<String>, kind: StatusKind) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.messages.push(StatusMessage {
            id,
            text: text.into(),
            kind,
        });
        id
    }

    pub fn expire(&mut self, id: u64) {
        self.messages.retain(|m| m.id != id);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn messages(&self) -> &[StatusMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// 审核表单中可编辑的字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewField {
    Title,
    Topic,
    Belt,
    Readme,
    Solution,
    CommitAction,
    ScheduleTime,
}

impl ReviewField {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "title" => Some(ReviewField::Title),
            "topic" => Some(ReviewField::Topic),
            "belt" => Some(ReviewField::Belt),
            "readme" => Some(ReviewField::Readme),
            "solution" => Some(ReviewField::Solution),
            "commit_action" => Some(ReviewField::CommitAction),
            "schedule_time" => Some(ReviewField::ScheduleTime),
            _ => None,
        }
    }
}

/// 审核表单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewForm {
    pub title: String,
    pub topic: String,
    pub belt: String,
    pub readme: String,
    pub solution: String,
    pub commit_action: String,
    pub schedule_time: String,
}

impl Default for ReviewForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            topic: String::new(),
            belt: String::new(),
            readme: String::new(),
            solution: String::new(),
            commit_action: "now".to_string(),
            schedule_time: String::new(),
        }
    }
}

impl ReviewForm {
    /// 用草稿覆盖题目字段（段位和提交方式保持不变）
    pub fn fill_from(&mut self, draft: &ProblemDraft) {
        self.title = draft.title.clone();
        self.topic = draft.topic.clone();
        self.readme = draft.readme.clone();
        self.solution = draft.solution.clone();
    }

    pub fn set(&mut self, field: ReviewField, value: String) {
        match field {
            ReviewField::Title => self.title = value,
            ReviewField::Topic => self.topic = value,
            ReviewField::Belt => self.belt = value,
            ReviewField::Readme => self.readme = value,
            ReviewField::Solution => self.solution = value,
            ReviewField::CommitAction => self.commit_action = value,
            ReviewField::ScheduleTime => self.schedule_time = value,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 当前字段值，按提交顺序
    pub fn to_fields(&self) -> Vec<(String, String)> {
        [
            ("title", &self.title),
            ("topic", &self.topic),
            ("belt", &self.belt),
            ("readme", &self.readme),
            ("solution", &self.solution),
            ("commit_action", &self.commit_action),
            ("schedule_time", &self.schedule_time),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
    }
}

/// 出题面板
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationView {
    pub loading: bool,
    pub busy: bool,
    pub selector_visible: bool,
    pub review_visible: bool,
    /// 最近一次成功生成的题目
    pub batch: Vec<ProblemDraft>,
    pub selected: Option<usize>,
    pub(crate) pending: Option<RequestId>,
    pub(crate) pending_belt: String,
    /// 最近一次出题提交的请求编号
    pub(crate) round: RequestId,
}

impl GenerationView {
    /// 题目选择框的选项文字
    pub fn selector_options(&self) -> Vec<String> {
        self.batch
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if p.title.trim().is_empty() {
                    format!("Problem {}", i + 1)
                } else {
                    p.title.clone()
                }
            })
            .collect()
    }
}

/// 提交按钮状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitView {
    pub busy: bool,
    pub(crate) pending: Option<RequestId>,
    /// 提交时所在的出题轮次
    pub(crate) round: RequestId,
}

/// 删除面板中题目列表的加载状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProblemLookup {
    /// 尚未选择段位
    #[default]
    Idle,
    Loading,
    Loaded(Vec<String>),
    Empty,
    Failed,
}

/// 下拉选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    fn placeholder(label: &str) -> Self {
        Self {
            value: String::new(),
            label: label.to_string(),
        }
    }
}

/// 删除面板
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteView {
    pub belt: String,
    pub lookup: ProblemLookup,
    pub selected: String,
    pub busy: bool,
    pub(crate) awaiting_confirmation: Option<(String, String)>,
    pub(crate) pending_lookup: Option<RequestId>,
    pub(crate) pending_delete: Option<RequestId>,
}

impl DeleteView {
    /// 题目下拉框选项，首项总是占位符
    pub fn options(&self) -> Vec<SelectOption> {
        match &self.lookup {
            ProblemLookup::Idle => vec![SelectOption::placeholder("-- Select a belt first --")],
            ProblemLookup::Loading => vec![SelectOption::placeholder("Loading...")],
            ProblemLookup::Empty => vec![SelectOption::placeholder("No problems found")],
            ProblemLookup::Failed => vec![SelectOption::placeholder("Error loading problems")],
            ProblemLookup::Loaded(names) => {
                let mut options = vec![SelectOption::placeholder("-- Select a problem --")];
                options.extend(names.iter().map(|n| SelectOption {
                    value: n.clone(),
                    label: n.clone(),
                }));
                options
            }
        }
    }

    pub fn selector_enabled(&self) -> bool {
        matches!(&self.lookup, ProblemLookup::Loaded(names) if !names.is_empty())
    }

    pub fn delete_enabled(&self) -> bool {
        self.selector_enabled()
    }
}

/// 整个工作台的状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub tabs: TabBar,
    pub status: StatusBoard,
    pub generation: GenerationView,
    pub review: ReviewForm,
    pub commit: CommitView,
    pub delete: DeleteView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_targets_round_trip() {
        for panel in Panel::ALL {
            assert_eq!(Panel::from_target(panel.target()), Some(panel));
        }
        assert_eq!(Panel::from_target("settings"), None);
    }

    #[test]
    fn status_messages_expire_independently() {
        let mut board = StatusBoard::default();
        let a = board.push("a", StatusKind::Success);
        let b = board.push("b", StatusKind::Error);
        board.expire(a);
        assert_eq!(board.messages().len(), 1);
        assert_eq!(board.messages()[0].id, b);
        board.expire(a);
        assert_eq!(board.messages().len(), 1);
    }

    #[test]
    fn selector_labels_fall_back_to_position() {
        let view = GenerationView {
            batch: vec![
                ProblemDraft {
                    title: "Two Pointers".into(),
                    ..Default::default()
                },
                ProblemDraft::default(),
            ],
            ..Default::default()
        };
        assert_eq!(view.selector_options(), vec!["Two Pointers", "Problem 2"]);
    }

    #[test]
    fn delete_options_per_lookup_state() {
        let mut view = DeleteView::default();
        assert!(!view.selector_enabled());
        assert_eq!(view.options().len(), 1);

        view.lookup = ProblemLookup::Loaded(vec!["p1".into(), "p2".into()]);
        let options = view.options();
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].value, "");
        assert_eq!(options[2].value, "p2");
        assert!(view.delete_enabled());

        view.lookup = ProblemLookup::Empty;
        assert_eq!(view.options()[0].label, "No problems found");
        assert!(!view.delete_enabled());
    }

    #[test]
    fn review_form_reset_restores_defaults() {
        let mut form = ReviewForm::default();
        form.set(ReviewField::Title, "x".into());
        form.set(ReviewField::CommitAction, "schedule".into());
        form.reset();
        assert_eq!(form, ReviewForm::default());
        assert_eq!(form.to_fields()[5], ("commit_action".to_string(), "now".to_string()));
    }
}
