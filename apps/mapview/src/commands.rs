//! Console commands standing in for the page's selection controls.

use shared::domain::{MapMode, Selection, UnknownMapMode};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  mode <population|hotels>   choose what the map shows
  year <YYYY>                choose the population year
  district <id|all>          filter by district, or show all districts
  update                     refresh the map with the current selection
  layers                     list layers currently on the map
  districts                  list known districts
  help                       show this text
  quit                       exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCommand {
    SetMode(MapMode),
    SetYear(u16),
    SetDistrict(String),
    Update,
    ShowLayers,
    ShowDistricts,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (try 'help')")]
    Unknown(String),
    #[error("'{0}' needs a value")]
    MissingArgument(&'static str),
    #[error(transparent)]
    Mode(#[from] UnknownMapMode),
    #[error("invalid year '{0}'")]
    Year(String),
}

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ViewCommand>, CommandError> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();

    let command = match verb.to_ascii_lowercase().as_str() {
        "mode" => ViewCommand::SetMode(arg.ok_or(CommandError::MissingArgument("mode"))?.parse()?),
        "year" => {
            let raw = arg.ok_or(CommandError::MissingArgument("year"))?;
            ViewCommand::SetYear(raw.parse().map_err(|_| CommandError::Year(raw.to_string()))?)
        }
        // a bare `district` means "all districts", like the empty option in the selector
        "district" => ViewCommand::SetDistrict(arg.unwrap_or_default().to_string()),
        "update" | "refresh" => ViewCommand::Update,
        "layers" => ViewCommand::ShowLayers,
        "districts" => ViewCommand::ShowDistricts,
        "help" | "?" => ViewCommand::Help,
        "quit" | "exit" => ViewCommand::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// Applies a control change to `selection`. Returns `false` for commands that
/// do not touch the selection.
pub fn apply_to_selection(selection: &mut Selection, command: &ViewCommand) -> bool {
    match command {
        ViewCommand::SetMode(mode) => selection.mode = *mode,
        ViewCommand::SetYear(year) => selection.year = *year,
        ViewCommand::SetDistrict(raw) => selection.set_district_filter(raw),
        _ => return false,
    }
    true
}

pub fn describe_selection(selection: &Selection) -> String {
    format!(
        "mode={} year={} district={}",
        selection.mode,
        selection.year,
        selection
            .district
            .as_ref()
            .map_or("all", |district| district.as_str())
    )
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
