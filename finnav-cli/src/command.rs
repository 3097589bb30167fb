use std::fmt;

use finnav_core::{app::Event, search::Key};

pub const HELP: &str = "\
commands:
  /<text>            type into the search box (`/` alone clears it)
  focus              focus the search box
  up | down | enter  move through the dropdown
  esc                close the dropdown or overlay
  open <id>          click a search result
  all                follow \"View all\"
  click              click outside the search area
  recent <id>        click a sidebar entry
  nav <id>           open the section overlay
  tag <term>         follow a quick-link tag
  section <label>    pick a section in the overlay
  close              close the overlay
  back | forward     step through history
  quit";

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("empty command"),
            Self::Unknown(word) => write!(f, "unknown command {word:?}, try `help`"),
            Self::MissingArgument(what) => write!(f, "missing {what}"),
        }
    }
}

pub fn parse(line: &str) -> Result<Event, ParseError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(query) = line.strip_prefix('/') {
        return Ok(Event::SearchInput(query.to_owned()));
    }
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let arg = |what: &'static str| {
        if rest.is_empty() {
            Err(ParseError::MissingArgument(what))
        } else {
            Ok(rest.to_owned())
        }
    };
    let event = match word {
        "" => return Err(ParseError::Empty),
        "focus" => Event::SearchFocused,
        "up" => Event::Key(Key::ArrowUp),
        "down" => Event::Key(Key::ArrowDown),
        "enter" => Event::Key(Key::Enter),
        "esc" => Event::Key(Key::Escape),
        "open" => Event::ResultActivated(arg("instrument id")?),
        "all" => Event::ViewAllActivated,
        "click" => Event::OutsideClick,
        "recent" => Event::SidebarActivated(arg("instrument id")?),
        "nav" => Event::OverlayRequested(arg("instrument id")?),
        "tag" => Event::QuickLink(arg("search term")?),
        "section" => Event::SectionActivated(arg("section label")?),
        "close" => Event::OverlayClosed,
        "back" => Event::Back,
        "forward" => Event::Forward,
        "quit" | "exit" => Event::Shutdown,
        other => return Err(ParseError::Unknown(other.to_owned())),
    };
    Ok(event)
}
