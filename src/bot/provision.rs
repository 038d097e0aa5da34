use anyhow::{anyhow, Result};
use serenity::all::{
    ChannelId, ChannelType, ComponentInteraction, Context, CreateActionRow, CreateChannel,
    CreateInteractionResponseFollowup, CreateMessage, EditMessage, GuildId, Mentionable,
    PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId, UserId,
};

use crate::bot::picker::{cancel_button, picker_components, PickerState, SlotRejection};
use crate::store::reservations::{Reservation, ReservationStore};
use crate::utils::naming::reservation_base_name;
use crate::utils::slots::slot_label;

/// Text channel where staff get booking and cancellation notices.
pub const STAFF_CHANNEL: &str = "vols-confirmés";

/// Provisions a confirmed slot end to end: private category and channel,
/// store record, confirmation with the cancel button, ephemeral receipt,
/// staff notice, picker reset.
///
/// The record is inserted only after its channel exists, so it never
/// points at a channel that was never created. When channel creation
/// fails halfway, or the insert loses the race to a concurrent booking,
/// the fresh channels are deleted again before the user hears the
/// outcome.
pub async fn provision_reservation(
    ctx: &Context,
    interaction: &ComponentInteraction,
    store: &ReservationStore,
    guild_id: GuildId,
    day: &str,
    hour: u32,
) -> Result<()> {
    let user = &interaction.user;
    let label = slot_label(day, hour);
    let base_name = reservation_base_name(&user.name, day, hour);

    // Channel creation takes a moment; acknowledge now, follow up later.
    interaction.defer_ephemeral(&ctx.http).await?;

    // The @everyone role id equals the guild id.
    let everyone = RoleId::new(guild_id.get());
    let bot_id = ctx.cache.current_user().id;

    let category = guild_id
        .create_channel(
            &ctx.http,
            CreateChannel::new(&base_name)
                .kind(ChannelType::Category)
                .permissions(private_overwrites(
                    everyone,
                    user.id,
                    bot_id,
                    Permissions::VIEW_CHANNEL,
                )),
        )
        .await?;

    let channel = match guild_id
        .create_channel(
            &ctx.http,
            CreateChannel::new(&base_name)
                .kind(ChannelType::Text)
                .category(category.id)
                .permissions(private_overwrites(
                    everyone,
                    user.id,
                    bot_id,
                    Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES,
                )),
        )
        .await
    {
        Ok(channel) => channel,
        Err(e) => {
            // Without its channel the category would sit empty forever.
            if let Err(cleanup) = category.id.delete(&ctx.http).await {
                tracing::warn!(
                    "Failed to remove category {} after channel creation failed: {}",
                    category.id,
                    cleanup
                );
            }
            return Err(anyhow!("Failed to create reservation channel: {}", e));
        }
    };

    let reservation = Reservation::new(label.clone(), channel.id, category.id);
    if let Err(refused) = store.try_reserve(user.id, reservation).await {
        tracing::info!(
            "Reservation race lost by {} ({}) for '{}': {:?}",
            user.name,
            user.id,
            label,
            refused
        );
        rollback_channels(ctx, channel.id, category.id).await;
        followup_notice(ctx, interaction, SlotRejection::from(refused).notice()).await?;
        return Ok(());
    }

    let confirmation = CreateMessage::new()
        .content(format!(
            "✅ Bonjour {}, votre réservation pour le créneau **{}** est confirmée.",
            user.mention(),
            label
        ))
        .components(vec![CreateActionRow::Buttons(vec![cancel_button(user.id)])]);
    channel.id.send_message(&ctx.http, confirmation).await?;

    followup_notice(
        ctx,
        interaction,
        &format!(
            "✅ Réservation confirmée pour **{}**. Salon privé créé : {}",
            label,
            channel.id.mention()
        ),
    )
    .await?;

    notify_staff(
        ctx,
        guild_id,
        format!(
            "📅 **Nouvelle réservation** : {} a réservé **{}**. Salon privé : {}",
            user.mention(),
            label,
            channel.id.mention()
        ),
    )
    .await;

    tracing::info!(
        "Reserved '{}' for user {} ({}): channel {} in category {}",
        label,
        user.name,
        user.id,
        channel.id,
        category.id
    );

    // Put the picker back to its idle state for the next user.
    let mut picker_message = (*interaction.message).clone();
    if let Err(e) = picker_message
        .edit(
            &ctx.http,
            EditMessage::new().components(picker_components(&PickerState::Idle, &[])),
        )
        .await
    {
        tracing::debug!("Could not reset picker message {}: {}", picker_message.id, e);
    }

    Ok(())
}

/// Overwrites hiding a channel from everyone except the member and the
/// bot itself, who get `granted`.
fn private_overwrites(
    everyone: RoleId,
    member: UserId,
    bot: UserId,
    granted: Permissions,
) -> Vec<PermissionOverwrite> {
    vec![
        PermissionOverwrite {
            allow: Permissions::empty(),
            deny: Permissions::VIEW_CHANNEL,
            kind: PermissionOverwriteType::Role(everyone),
        },
        PermissionOverwrite {
            allow: granted,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Member(member),
        },
        PermissionOverwrite {
            allow: granted,
            deny: Permissions::empty(),
            kind: PermissionOverwriteType::Member(bot),
        },
    ]
}

/// Deletes a half-provisioned channel pair, logging instead of failing;
/// at worst an empty category is left behind for moderators.
async fn rollback_channels(ctx: &Context, channel_id: ChannelId, category_id: ChannelId) {
    if let Err(e) = channel_id.delete(&ctx.http).await {
        tracing::warn!("Failed to roll back channel {}: {}", channel_id, e);
    }
    if let Err(e) = category_id.delete(&ctx.http).await {
        tracing::warn!("Failed to roll back category {}: {}", category_id, e);
    }
}

async fn followup_notice(
    ctx: &Context,
    interaction: &ComponentInteraction,
    text: &str,
) -> Result<()> {
    interaction
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new()
                .content(text)
                .ephemeral(true),
        )
        .await?;
    Ok(())
}

/// Posts `text` into the staff channel when the guild has one; a missing
/// channel or a failed send is logged and otherwise ignored.
pub async fn notify_staff(ctx: &Context, guild_id: GuildId, text: String) {
    let staff = match find_text_channel(ctx, guild_id, STAFF_CHANNEL).await {
        Some(id) => id,
        None => {
            tracing::debug!(
                "No #{} channel in guild {}; skipping staff notice",
                STAFF_CHANNEL,
                guild_id
            );
            return;
        }
    };
    if let Err(e) = staff
        .send_message(&ctx.http, CreateMessage::new().content(text))
        .await
    {
        tracing::warn!("Failed to notify #{} in guild {}: {}", STAFF_CHANNEL, guild_id, e);
    }
}

async fn find_text_channel(ctx: &Context, guild_id: GuildId, name: &str) -> Option<ChannelId> {
    let channels = match guild_id.channels(&ctx.http).await {
        Ok(channels) => channels,
        Err(e) => {
            tracing::warn!("Failed to list channels for guild {}: {}", guild_id, e);
            return None;
        }
    };
    channels
        .values()
        .find(|c| c.kind == ChannelType::Text && c.name == name)
        .map(|c| c.id)
}
