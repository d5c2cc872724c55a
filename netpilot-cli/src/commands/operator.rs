//! Dot commands typed during a session.
//!
//! ```text
//! hello                  radio message on the transmitting frequency
//! .chat DLH123 hi        private message
//! .x 7000                transponder code
//! .com1 122.8            tune a radio
//! .tx com2               select the transmitting radio
//! .ptt on|off            push-to-talk
//! .rx on|off             receive-only
//! .quit                  disconnect
//! ```

use netpilot::aircraft::Radio;
use netpilot::frequency::parse_mhz;

#[derive(Debug, Clone, PartialEq)]
pub enum OperatorCommand {
    RadioMessage(String),
    PrivateMessage { to: String, text: String },
    Squawk(String),
    Tune { radio: Radio, frequency_hz: u32 },
    Transmit(Radio),
    PushToTalk(bool),
    ReceiveOnly(bool),
    Quit,
    Help,
}

pub const HELP: &str = "\
Commands:
  <text>              send a radio message
  .chat <CALLSIGN> <text>
  .x <code>           set transponder code
  .com1 <MHz>, .com2 <MHz>
  .tx com1|com2       select transmitting radio
  .ptt on|off
  .rx on|off          receive-only
  .quit";

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<OperatorCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('.') else {
        return Ok(Some(OperatorCommand::RadioMessage(line.to_string())));
    };

    let (name, args) = rest.split_once(' ').unwrap_or((rest, ""));
    let args = args.trim();
    let command = match name.to_ascii_lowercase().as_str() {
        "chat" | "msg" => {
            let (to, text) = args
                .split_once(' ')
                .map(|(to, text)| (to, text.trim()))
                .filter(|(_, text)| !text.is_empty())
                .ok_or("usage: .chat <CALLSIGN> <text>")?;
            OperatorCommand::PrivateMessage {
                to: to.to_ascii_uppercase(),
                text: text.to_string(),
            }
        }
        "x" | "squawk" => {
            if args.is_empty() {
                return Err("usage: .x <code>".into());
            }
            OperatorCommand::Squawk(args.to_string())
        }
        "com1" | "com2" => {
            let radio = if name.eq_ignore_ascii_case("com1") {
                Radio::Com1
            } else {
                Radio::Com2
            };
            let frequency_hz =
                parse_mhz(args).ok_or_else(|| format!("'{args}' is not an airband frequency"))?;
            OperatorCommand::Tune {
                radio,
                frequency_hz,
            }
        }
        "tx" => OperatorCommand::Transmit(parse_radio(args)?),
        "ptt" => OperatorCommand::PushToTalk(parse_switch(args)?),
        "rx" => OperatorCommand::ReceiveOnly(parse_switch(args)?),
        "quit" | "q" | "disconnect" => OperatorCommand::Quit,
        "help" | "?" => OperatorCommand::Help,
        other => return Err(format!("unknown command '.{other}', try .help")),
    };
    Ok(Some(command))
}

fn parse_radio(text: &str) -> Result<Radio, String> {
    match text.to_ascii_lowercase().as_str() {
        "com1" | "1" => Ok(Radio::Com1),
        "com2" | "2" => Ok(Radio::Com2),
        _ => Err(format!("expected com1 or com2, got '{text}'")),
    }
}

fn parse_switch(text: &str) -> Result<bool, String> {
    match text.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(format!("expected on or off, got '{text}'")),
    }
}
