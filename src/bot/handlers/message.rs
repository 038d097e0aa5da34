use anyhow::Result;
use serenity::all::{Context, Message};

use crate::bot::commands::{flyver, Command};

/// Dispatches a chat message to the command it names, if any.
pub async fn command_handler(ctx: &Context, msg: &Message) -> Result<()> {
    let Some(command) = Command::parse(&msg.content) else {
        return Ok(());
    };

    match command {
        Command::Flyver => {
            flyver::handle_flyver(ctx, msg).await?;
        }
        Command::Help => {
            msg.channel_id.say(&ctx.http, Command::descriptions()).await?;
        }
    }
    Ok(())
}
