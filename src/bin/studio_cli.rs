//! 终端版出题工作台
//!
//! 通过 HTTP 连接 `dsa-problem-studio` 服务（`STUDIO_SERVER_URL`，默认
//! `http://127.0.0.1:5000`），在终端里完成 出题 → 审核 → 提交 和删除流程。

use std::env;
use std::io::{self, Write};

use anyhow::Result;
use dsa_problem_studio::logger;
use dsa_problem_studio::workflow::{
    Event, HttpBackend, Panel, ProblemLookup, ReviewField, Session, StatusKind, UiState,
};

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// 在终端询问 y/N
fn ask_yes_no(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn print_help() {
    println!("Commands:");
    println!("  q: Quit");
    println!("  tab <generate|commit|delete>: Switch panel");
    println!("  belts: List belts known to the server");
    println!("  generate [count] <belt>: Generate problems for a belt");
    println!("  select <n>: Load problem n (1-based) into the review form");
    println!("  set <field> <value>: Edit a review field (title, topic, belt, readme, solution, commit_action, schedule_time)");
    println!("  load <field> <path>: Read a review field from a file");
    println!("  commit: Commit the reviewed problem now");
    println!("  schedule <YYYY-MM-DD HH:MM>: Schedule the reviewed problem");
    println!("  belt <belt>: Choose the belt to delete from");
    println!("  pick <folder>: Choose the problem to delete");
    println!("  delete: Delete the chosen problem (asks for confirmation)");
    println!("  show: Print the current state");
}

fn render(state: &UiState) {
    let tabs: Vec<String> = Panel::ALL
        .iter()
        .map(|p| {
            if state.tabs.is_link_active(*p) {
                format!("[{}]", p.target())
            } else {
                p.target().to_string()
            }
        })
        .collect();
    println!("{}", tabs.join(" | "));

    match state.tabs.active() {
        Panel::Generate | Panel::Commit => render_review(state),
        Panel::Delete => render_delete(state),
    }

    for message in state.status.messages() {
        let tag = match message.kind {
            StatusKind::Success => "✓",
            StatusKind::Error => "✗",
        };
        println!("{} {}", tag, message.text);
    }
}

fn render_review(state: &UiState) {
    let generation = &state.generation;
    if generation.loading {
        println!("Generating...");
    }
    if generation.selector_visible {
        for (i, label) in generation.selector_options().iter().enumerate() {
            let marker = if generation.selected == Some(i) { ">" } else { " " };
            println!("{} {}. {}", marker, i + 1, label);
        }
    }
    if generation.review_visible {
        let review = &state.review;
        println!("  belt:     {}", review.belt);
        println!("  title:    {}", review.title);
        println!("  topic:    {}", review.topic);
        println!("  readme:   {} chars", review.readme.chars().count());
        println!("  solution: {} chars", review.solution.chars().count());
        println!("  action:   {} {}", review.commit_action, review.schedule_time);
    }
}

fn render_delete(state: &UiState) {
    let delete = &state.delete;
    println!("  belt: {}", delete.belt);
    for option in delete.options() {
        let marker = if !option.value.is_empty() && option.value == delete.selected {
            ">"
        } else {
            " "
        };
        println!("{} {}", marker, option.label);
    }
    if delete.busy {
        println!("Deleting...");
    }
    if matches!(delete.lookup, ProblemLookup::Loaded(_)) && !delete.delete_enabled() {
        println!("  (delete disabled)");
    }
}

/// 把一行命令翻译成事件
fn parse_command(command: &str) -> std::result::Result<Vec<Event>, String> {
    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(n, r)| (n, r.trim()))
        .unwrap_or((command, ""));

    match name {
        "tab" => Ok(vec![Event::TabActivated(rest.to_string())]),
        "generate" => {
            let (count, belt) = match rest.split_once(char::is_whitespace) {
                Some((n, belt)) if n.parse::<usize>().is_ok() => (n.to_string(), belt.trim()),
                _ => ("1".to_string(), rest),
            };
            if belt.is_empty() {
                return Err("usage: generate [count] <belt>".into());
            }
            Ok(vec![Event::GenerateSubmitted(vec![
                ("belt".to_string(), belt.to_string()),
                ("num_problems".to_string(), count),
            ])])
        }
        "select" => match rest.parse::<usize>() {
            Ok(n) if n > 0 => Ok(vec![Event::ProblemSelected(n - 1)]),
            _ => Err("usage: select <n>".into()),
        },
        "set" => {
            let (field, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let field = ReviewField::parse(field).ok_or_else(|| format!("unknown field '{}'", field))?;
            Ok(vec![Event::ReviewEdited {
                field,
                value: value.trim().to_string(),
            }])
        }
        "load" => {
            let (field, path) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: load <field> <path>".to_string())?;
            let field = ReviewField::parse(field).ok_or_else(|| format!("unknown field '{}'", field))?;
            let value = std::fs::read_to_string(path.trim())
                .map_err(|e| format!("cannot read {}: {}", path.trim(), e))?;
            Ok(vec![Event::ReviewEdited { field, value }])
        }
        "commit" => Ok(vec![
            Event::ReviewEdited {
                field: ReviewField::CommitAction,
                value: "now".to_string(),
            },
            Event::CommitSubmitted,
        ]),
        "schedule" => {
            if rest.is_empty() {
                return Err("usage: schedule <YYYY-MM-DD HH:MM>".into());
            }
            Ok(vec![
                Event::ReviewEdited {
                    field: ReviewField::CommitAction,
                    value: "schedule".to_string(),
                },
                Event::ReviewEdited {
                    field: ReviewField::ScheduleTime,
                    value: rest.to_string(),
                },
                Event::CommitSubmitted,
            ])
        }
        "belt" => Ok(vec![Event::DeleteBeltChanged(rest.to_string())]),
        "pick" => Ok(vec![Event::DeleteProblemChosen(rest.to_string())]),
        "delete" => Ok(vec![Event::DeleteSubmitted]),
        _ => Err(format!("unknown command '{}', try 'help'", name)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init();

    let server_url = env::var("STUDIO_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
    let backend = HttpBackend::new(&server_url)?;
    let mut session = Session::new(backend, ask_yes_no);

    println!("DSA Problem Studio @ {} (type 'help')", server_url);

    loop {
        session.drain();
        print!("studio> ");
        io::stdout().flush()?;

        let mut command = String::new();
        if io::stdin().read_line(&mut command)? == 0 {
            break;
        }
        let command = command.trim();

        match command {
            "" => continue,
            "q" | "quit" => break,
            "help" => print_help(),
            "show" => render(session.state()),
            "belts" => match session.backend().belts().await {
                Ok(belts) => belts.iter().for_each(|b| println!("  {}", b)),
                Err(e) => println!("✗ Error loading belts: {}", e),
            },
            _ => match parse_command(command) {
                Ok(events) => {
                    for event in events {
                        session.dispatch(event);
                    }
                    session.settle().await;
                    render(session.state());
                }
                Err(message) => println!("{}", message),
            },
        }
    }

    Ok(())
}
