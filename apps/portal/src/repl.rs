use client_core::{
    Assignment, Destination, FacultyForm, PortalCommand, TicketForm, TicketUpdateForm, View,
};
use shared::domain::{Category, Priority, TicketId, TicketStatus, UserId};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  login <username> <password>
  logout
  go <dashboard|faculty|create|reports>
  open <ticket id>
  submit <category> <priority> <subject> | <message>
  comment <text>
  update <status> [<priority>] [<assignee>|-]   (dean: omitted fields are kept, - unassigns)
  add-faculty <username> <password> <email> <phone> <full name>
  delete-faculty <user id> <name>
  whoami
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Help,
    Quit,
    WhoAmI,
    Command(PortalCommand),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command '{0}' (type 'help')")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0}")]
    Invalid(String),
}

pub fn parse_command(line: &str) -> Result<Input, ParseError> {
    let (word, rest) = split_word(line);
    let input = match word.to_ascii_lowercase().as_str() {
        "" => Input::Empty,
        "help" | "?" => Input::Help,
        "quit" | "exit" => Input::Quit,
        "whoami" => Input::WhoAmI,
        "login" => parse_login(rest)?,
        "logout" => Input::Command(PortalCommand::Logout),
        "go" => parse_go(rest)?,
        "open" => Input::Command(PortalCommand::ViewDetail(TicketId(parse_id(
            rest,
            "open <ticket id>",
        )?))),
        "submit" => parse_submit(rest)?,
        "comment" => Input::Command(PortalCommand::PostComment {
            text: rest.to_string(),
        }),
        "update" => parse_update(rest)?,
        "add-faculty" => parse_add_faculty(rest)?,
        "delete-faculty" => parse_delete_faculty(rest)?,
        other => return Err(ParseError::Unknown(other.to_string())),
    };
    Ok(input)
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}

fn parse_id(raw: &str, usage: &'static str) -> Result<i64, ParseError> {
    let (id, _) = split_word(raw);
    if id.is_empty() {
        return Err(ParseError::Usage(usage));
    }
    id.parse::<i64>()
        .map_err(|_| ParseError::Invalid(format!("'{id}' is not a valid id")))
}

fn parse_login(rest: &str) -> Result<Input, ParseError> {
    const USAGE: &str = "login <username> <password>";
    let (username, rest) = split_word(rest);
    let (password, extra) = split_word(rest);
    if username.is_empty() || password.is_empty() || !extra.is_empty() {
        return Err(ParseError::Usage(USAGE));
    }
    Ok(Input::Command(PortalCommand::Login {
        username: username.to_string(),
        password: password.to_string(),
    }))
}

fn parse_go(rest: &str) -> Result<Input, ParseError> {
    const USAGE: &str = "go <dashboard|faculty|create|reports>";
    let view = match rest.trim().to_ascii_lowercase().as_str() {
        "" => return Err(ParseError::Usage(USAGE)),
        "dashboard" => View::Dashboard,
        "faculty" | "faculty_management" => View::FacultyManagement,
        "create" | "new" => View::Create,
        "reports" | "my_reports" => View::MyReports,
        "detail" => return Err(ParseError::Usage("open <ticket id>")),
        other => return Err(ParseError::Invalid(format!("unknown view '{other}'"))),
    };
    Destination::for_view(view)
        .map(|destination| Input::Command(PortalCommand::Navigate(destination)))
        .ok_or(ParseError::Usage(USAGE))
}

fn parse_submit(rest: &str) -> Result<Input, ParseError> {
    const USAGE: &str = "submit <category> <priority> <subject> | <message>";
    let (category, rest) = split_word(rest);
    let (priority, rest) = split_word(rest);
    let Some((subject, message)) = rest.split_once('|') else {
        return Err(ParseError::Usage(USAGE));
    };
    Ok(Input::Command(PortalCommand::SubmitTicket(TicketForm {
        category: category.parse::<Category>().map_err(ParseError::Invalid)?,
        priority: priority.parse::<Priority>().map_err(ParseError::Invalid)?,
        subject: subject.trim().to_string(),
        message: message.trim().to_string(),
    })))
}

fn parse_update(rest: &str) -> Result<Input, ParseError> {
    const USAGE: &str = "update <status> [<priority>] [<assignee>|-]";
    let (status, rest) = split_word(rest);
    if status.is_empty() {
        return Err(ParseError::Usage(USAGE));
    }
    let status = status.parse::<TicketStatus>().map_err(ParseError::Invalid)?;

    let (maybe_priority, after_priority) = split_word(rest);
    let (priority, assignee) = match maybe_priority.parse::<Priority>() {
        Ok(priority) => (Some(priority), after_priority),
        Err(_) => (None, rest.trim()),
    };
    Ok(Input::Command(PortalCommand::UpdateTicket(TicketUpdateForm {
        status,
        priority,
        assignee: match assignee {
            "" => Assignment::Keep,
            "-" => Assignment::Unassign,
            name => Assignment::Assign(name.to_string()),
        },
    })))
}

fn parse_add_faculty(rest: &str) -> Result<Input, ParseError> {
    const USAGE: &str = "add-faculty <username> <password> <email> <phone> <full name>";
    let (username, rest) = split_word(rest);
    let (password, rest) = split_word(rest);
    let (email, rest) = split_word(rest);
    let (phone, full_name) = split_word(rest);
    if full_name.is_empty() {
        return Err(ParseError::Usage(USAGE));
    }
    Ok(Input::Command(PortalCommand::AddFaculty(FacultyForm {
        full_name: full_name.to_string(),
        username: username.to_string(),
        email: email.to_string(),
        phone: phone.to_string(),
        password: password.to_string(),
    })))
}

fn parse_delete_faculty(rest: &str) -> Result<Input, ParseError> {
    const USAGE: &str = "delete-faculty <user id> <name>";
    let user_id = parse_id(rest, USAGE)?;
    let (_, name) = split_word(rest);
    if name.is_empty() {
        return Err(ParseError::Usage(USAGE));
    }
    Ok(Input::Command(PortalCommand::DeleteFaculty {
        user_id: UserId(user_id),
        name: name.to_string(),
    }))
}

#[cfg(test)]
#[path = "tests/repl_tests.rs"]
mod tests;
