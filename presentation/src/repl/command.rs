//! Slash commands of the manual-mode prompt

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Continue,
    Stop,
    End,
    Status,
    Turns(i64),
    Help,
    Quit,
}

impl ReplCommand {
    /// Parse one input line. An empty line means `/continue`.
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Ok(ReplCommand::Continue);
        };
        let command = match head {
            "/continue" | "/c" | "/next" => ReplCommand::Continue,
            "/stop" => ReplCommand::Stop,
            "/end" => ReplCommand::End,
            "/status" | "/s" => ReplCommand::Status,
            "/turns" => {
                let value = parts
                    .next()
                    .ok_or_else(|| "usage: /turns N (0 = unlimited)".to_string())?;
                let limit = value
                    .parse()
                    .map_err(|_| format!("'{}' is not a number", value))?;
                ReplCommand::Turns(limit)
            }
            "/help" | "/h" | "/?" => ReplCommand::Help,
            "/quit" | "/exit" | "/q" => ReplCommand::Quit,
            other => return Err(format!("Unknown command: {}", other)),
        };
        if let Some(extra) = parts.next() {
            return Err(format!("unexpected argument '{}'", extra));
        }
        Ok(command)
    }

    pub fn help() -> &'static str {
        "Commands:
  /continue, /c  (or Enter) - Let the next participant speak
  /stop                     - Halt the conversation
  /end                      - End the conversation and exit
  /status                   - Show status and turn count
  /turns N                  - Change the turn limit (0 = unlimited)
  /help, /h, /?             - Show this help
  /quit, /exit, /q          - End the conversation and exit"
    }
}
