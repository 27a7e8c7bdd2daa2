//! Wire command parsing for the bridge line protocol.
//!
//! Every inbound line has the shape `"<name> <callbackId> <argument...>"`,
//! split on the first two spaces; the argument keeps any embedded spaces.
//! Parsing never fails: lines with fewer delimiters degrade field-by-field
//! so the dispatcher can fall back to the compatibility echo instead of
//! dropping the line.

/// Raw fields of one wire command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub callback_id: String,
    pub argument: String,
}

/// Split a raw line into name / callback id / argument.
///
/// With no delimiter the whole line serves as all three fields; with a single
/// delimiter the name and callback id split normally but the argument degrades
/// to the whole line. Callers that cannot route the name echo
/// `name + ";" + line` back, so the degenerate fields are part of the wire
/// contract, not an error path.
pub fn parse_command(line: &str) -> Command {
    let Some(first) = line.find(' ') else {
        return Command {
            name: line.to_string(),
            callback_id: line.to_string(),
            argument: line.to_string(),
        };
    };

    let name = line[..first].to_string();
    let rest = &line[first + 1..];
    match rest.find(' ') {
        None => Command {
            name,
            callback_id: rest.to_string(),
            argument: line.to_string(),
        },
        Some(rel) => Command {
            name,
            callback_id: rest[..rel].to_string(),
            argument: rest[rel + 1..].to_string(),
        },
    }
}

/// Commands the dispatcher understands, classified by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeCommand {
    IsAvailable,
    Open { callback_id: String, argument: String },
    StartThread { callback_id: String },
    StopThread,
    Echo { argument: String },
    EchoAsync { callback_id: String, argument: String },
    Property { argument: String },
    Unrecognized { name: String },
}

/// Map a parsed command onto the dispatch table by name.
pub fn classify(command: Command) -> BridgeCommand {
    let Command {
        name,
        callback_id,
        argument,
    } = command;

    match name.as_str() {
        "isAvailable" => BridgeCommand::IsAvailable,
        "open" => BridgeCommand::Open {
            callback_id,
            argument,
        },
        "startThread" => BridgeCommand::StartThread { callback_id },
        "stopThread" => BridgeCommand::StopThread,
        "echo" => BridgeCommand::Echo { argument },
        "echoAsync" => BridgeCommand::EchoAsync {
            callback_id,
            argument,
        },
        "property" => BridgeCommand::Property { argument },
        _ => BridgeCommand::Unrecognized { name },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_first_two_spaces_only() {
        let command = parse_command("open cb42 {\"to\":[\"a@x.com\"],\"subject\":\"Hi there\"}");
        assert_eq!(command.name, "open");
        assert_eq!(command.callback_id, "cb42");
        assert_eq!(command.argument, "{\"to\":[\"a@x.com\"],\"subject\":\"Hi there\"}");
    }

    #[test]
    fn argument_keeps_embedded_spaces() {
        let command = parse_command("echo cb1 one two three");
        assert_eq!(command.argument, "one two three");
    }

    #[test]
    fn single_delimiter_degrades_argument_to_whole_line() {
        let command = parse_command("startThread cb7");
        assert_eq!(command.name, "startThread");
        assert_eq!(command.callback_id, "cb7");
        assert_eq!(command.argument, "startThread cb7");
    }

    #[test]
    fn no_delimiter_uses_whole_line_for_every_field() {
        let command = parse_command("stopThread");
        assert_eq!(command.name, "stopThread");
        assert_eq!(command.callback_id, "stopThread");
        assert_eq!(command.argument, "stopThread");
    }

    #[test]
    fn empty_line_parses_to_empty_fields() {
        let command = parse_command("");
        assert_eq!(command.name, "");
        assert_eq!(command.callback_id, "");
        assert_eq!(command.argument, "");
    }

    #[test]
    fn classifies_known_names() {
        assert_eq!(
            classify(parse_command("isAvailable cb1")),
            BridgeCommand::IsAvailable
        );
        assert_eq!(
            classify(parse_command("open cb2 {}")),
            BridgeCommand::Open {
                callback_id: "cb2".into(),
                argument: "{}".into(),
            }
        );
        assert_eq!(
            classify(parse_command("startThread cb3")),
            BridgeCommand::StartThread {
                callback_id: "cb3".into(),
            }
        );
        assert_eq!(classify(parse_command("stopThread")), BridgeCommand::StopThread);
        assert_eq!(
            classify(parse_command("echo cb4 hello")),
            BridgeCommand::Echo {
                argument: "hello".into(),
            }
        );
        assert_eq!(
            classify(parse_command("echoAsync cb5 ping")),
            BridgeCommand::EchoAsync {
                callback_id: "cb5".into(),
                argument: "ping".into(),
            }
        );
        assert_eq!(
            classify(parse_command("property cb6 42")),
            BridgeCommand::Property {
                argument: "42".into(),
            }
        );
    }

    #[test]
    fn unknown_names_classify_as_unrecognized() {
        match classify(parse_command("frobnicate cb9 data")) {
            BridgeCommand::Unrecognized { name } => assert_eq!(name, "frobnicate"),
            other => panic!("expected unrecognized, got {other:?}"),
        }
    }

    #[test]
    fn routing_is_case_sensitive() {
        match classify(parse_command("Open cb1 {}")) {
            BridgeCommand::Unrecognized { name } => assert_eq!(name, "Open"),
            other => panic!("expected unrecognized, got {other:?}"),
        }
    }
}
