use anyhow::Result;
use serenity::all::{Context, CreateMessage, Message};

use crate::bot::picker::{picker_components, PickerState};

/// Greeting posted above the picker menus.
pub const WELCOME_MESSAGE: &str =
    "🛫 Bienvenue chez **Flyver** ! Choisissez un jour puis une heure :";

/// Posts a fresh slot picker into the invoking channel, hour menu
/// unmarked until a day is picked.
pub async fn handle_flyver(ctx: &Context, msg: &Message) -> Result<()> {
    tracing::info!(
        "Flyver command initiated by user {} ({}) in channel {}",
        msg.author.name,
        msg.author.id,
        msg.channel_id
    );

    let picker = CreateMessage::new()
        .content(WELCOME_MESSAGE)
        .components(picker_components(&PickerState::Idle, &[]));
    msg.channel_id.send_message(&ctx.http, picker).await?;

    Ok(())
}
