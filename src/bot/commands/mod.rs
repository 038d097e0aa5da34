pub mod flyver;

/// Prefix that marks a chat message as a bot command.
pub const COMMAND_PREFIX: &str = "!";

/// Chat commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Post the slot picker into the current channel.
    Flyver,
    /// Show the command list.
    Help,
}

impl Command {
    /// Parses a message body into a command. `None` for ordinary chatter
    /// and unknown commands; anything after the command word is ignored.
    pub fn parse(text: &str) -> Option<Command> {
        let body = text.trim().strip_prefix(COMMAND_PREFIX)?;
        match body.split_whitespace().next()? {
            "flyver" => Some(Command::Flyver),
            "help" => Some(Command::Help),
            _ => None,
        }
    }

    /// Help text listing every command.
    pub fn descriptions() -> String {
        [
            "Commandes Flyver :",
            "!flyver : ouvrir le menu de réservation d'un créneau",
            "!help : afficher ce message",
        ]
        .join("\n")
    }
}
