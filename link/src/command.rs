/// What a line from the link asks the control loop to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Anything else; handed to the navigator, which ignores non-reports.
    Report(String),
    /// Operator reset, the only way out of Docked.
    Reset,
}

impl Command {
    pub fn classify(line: String) -> Command {
        if line.trim().eq_ignore_ascii_case("RESET") {
            Command::Reset
        } else {
            Command::Report(line)
        }
    }
}
