use std::str::FromStr;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

use super::debounce::Debouncer;
use super::{Render, Session, ViewMode};
use crate::query::Filter;
use crate::record::Field;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageMove {
    First,
    Prev,
    Next,
    Last,
}

/// One user-initiated state transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Query(String),
    Filter(Filter),
    Sort(Field),
    Page(usize),
    Move(PageMove),
    PageSize(usize),
    View(ViewMode),
}

impl FromStr for SessionEvent {
    type Err = String;

    /// Parses the interactive command syntax, e.g. `/robo`, `filter Norte`, `sort date`.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
        if let Some(text) = line.strip_prefix('/') {
            return Ok(SessionEvent::Query(text.to_string()));
        }
        let trimmed = line.trim();
        let (command, arg) = match trimmed.split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (trimmed, ""),
        };
        match command.to_lowercase().as_str() {
            "search" | "q" => Ok(SessionEvent::Query(arg.to_string())),
            "filter" | "f" => Ok(SessionEvent::Filter(Filter::parse(arg))),
            "sort" | "s" => arg.parse::<Field>().map(SessionEvent::Sort),
            "page" | "p" => arg
                .parse::<usize>()
                .map(SessionEvent::Page)
                .map_err(|e| format!("invalid page '{arg}': {e}")),
            "size" | "n" => match arg.parse::<usize>() {
                Ok(0) => Err("page size must be at least 1".to_string()),
                Ok(size) => Ok(SessionEvent::PageSize(size)),
                Err(e) => Err(format!("invalid page size '{arg}': {e}")),
            },
            "view" | "v" => arg.parse::<ViewMode>().map(SessionEvent::View),
            "first" => Ok(SessionEvent::Move(PageMove::First)),
            "prev" | "previous" => Ok(SessionEvent::Move(PageMove::Prev)),
            "next" => Ok(SessionEvent::Move(PageMove::Next)),
            "last" => Ok(SessionEvent::Move(PageMove::Last)),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command '{other}'")),
        }
    }
}

/// Applies events to `session` until the channel closes.
///
/// Query events are debounced by `delay`; any other event first flushes a
/// pending query so the final state always reflects the latest query text.
pub async fn drive<R: Render>(
    session: &mut Session<R>,
    mut events: mpsc::Receiver<SessionEvent>,
    delay: Duration,
) {
    let mut pending: Debouncer<String> = Debouncer::new(delay);
    loop {
        let next = match pending.deadline() {
            Some(deadline) => match tokio::time::timeout_at(deadline, events.recv()).await {
                Ok(next) => next,
                Err(_) => {
                    if let Some(text) = pending.ready(Instant::now()) {
                        debug!(query = %text, "debounced query applied");
                        session.set_query(text);
                    }
                    continue;
                }
            },
            None => events.recv().await,
        };
        let Some(event) = next else {
            break;
        };
        match event {
            SessionEvent::Query(text) => pending.push(text),
            other => {
                if let Some(text) = pending.take() {
                    session.set_query(text);
                }
                session.apply(other);
            }
        }
    }
    if let Some(text) = pending.take() {
        session.set_query(text);
    }
}
