//! Command parsing for the composer.
//!
//! This module parses composer text into structured [`Command`] values.

use murmur_proto::Id;

/// Parsed command from composer input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a room to the local list and switch to it.
    CreateRoom {
        /// Room name.
        room: String,
    },

    /// Ask the server to join a room and switch to it.
    JoinRoom {
        /// Room name.
        room: String,
    },

    /// Upload a file to the active room.
    SendFile {
        /// Local path.
        path: String,
    },

    /// React to a message.
    React {
        /// Target message id.
        message_id: Id,
        /// Reaction text.
        reaction: String,
    },

    /// Mark a message in the active room as read.
    Read {
        /// Target message id.
        message_id: Id,
    },

    /// Close the private pane.
    Back,

    /// Disconnect and return to the join screen.
    Leave,

    /// Quit the application.
    Quit,

    /// Send a message.
    Message {
        /// Message content.
        content: String,
    },

    /// Unknown command.
    Unknown {
        /// The original input.
        input: String,
    },

    /// Command with missing or invalid arguments.
    InvalidArgs {
        /// Command name.
        command: String,
        /// Error message.
        error: String,
    },
}

/// Parse composer text into a command.
///
/// Commands start with `/`; `//` escapes a leading slash. Anything else is
/// a message, sent exactly as typed.
pub fn parse(raw: &str) -> Command {
    let input = raw.trim();

    let Some(cmd_str) = input.strip_prefix('/') else {
        return Command::Message { content: raw.to_string() };
    };
    if cmd_str.starts_with('/') {
        return Command::Message { content: raw.replacen('/', "", 1) };
    }

    let (command, rest) = cmd_str.split_once(char::is_whitespace).unwrap_or((cmd_str, ""));
    let rest = rest.trim();

    match command {
        "room" | "create" => match rest {
            "" => usage("room", "/room <name>"),
            room => Command::CreateRoom { room: room.to_string() },
        },

        "join" => match rest {
            "" => usage("join", "/join <name>"),
            room => Command::JoinRoom { room: room.to_string() },
        },

        "file" => match rest {
            "" => usage("file", "/file <path>"),
            path => Command::SendFile { path: path.to_string() },
        },

        "react" => match rest.split_once(char::is_whitespace) {
            Some((id, reaction)) if !reaction.trim().is_empty() => Command::React {
                message_id: Id::parse_loose(id),
                reaction: reaction.trim().to_string(),
            },
            _ => usage("react", "/react <message_id> <reaction>"),
        },

        "read" => match rest {
            "" => usage("read", "/read <message_id>"),
            id => Command::Read { message_id: Id::parse_loose(id) },
        },

        "back" => Command::Back,

        "leave" => Command::Leave,

        "quit" | "q" => Command::Quit,

        _ => Command::Unknown { input: input.to_string() },
    }
}

fn usage(command: &str, usage: &str) -> Command {
    Command::InvalidArgs { command: command.into(), error: format!("Usage: {usage}") }
}
