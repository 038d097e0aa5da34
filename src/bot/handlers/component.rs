use anyhow::Result;
use serenity::all::{
    ComponentInteraction, ComponentInteractionDataKind, Context, CreateInteractionResponse,
    CreateInteractionResponseMessage, Mentionable, UserId,
};

use crate::bot::picker::{
    evaluate_hour_pick, parse_cancel_button_id, picker_components, taken_hours_for_day,
    PickerState, SlotRejection, DAY_SELECT_ID,
};
use crate::bot::provision::{notify_staff, provision_reservation};
use crate::services::archive::{
    archive_channel, delete_category_if_empty, find_or_create_archive_category,
};
use crate::store::reservations::ReservationStore;
use crate::utils::slots::is_known_day;

/// Routes a component interaction to the picker menus or the cancel
/// button by its custom id. Unknown ids are logged and left unanswered.
pub async fn component_handler(
    ctx: &Context,
    interaction: &ComponentInteraction,
    store: &ReservationStore,
) -> Result<()> {
    let custom_id = interaction.data.custom_id.clone();
    tracing::info!(
        "Component received: '{}' from user {} ({}) in channel {}",
        custom_id,
        interaction.user.name,
        interaction.user.id,
        interaction.channel_id
    );

    if custom_id == DAY_SELECT_ID {
        return handle_day_selected(ctx, interaction, store).await;
    }
    if let Some(state) = PickerState::from_hour_select_id(&custom_id) {
        return handle_hour_selected(ctx, interaction, store, state).await;
    }
    if let Some(owner) = parse_cancel_button_id(&custom_id) {
        return handle_cancel(ctx, interaction, store, owner).await;
    }

    tracing::debug!("Ignoring unknown component id '{}'", custom_id);
    Ok(())
}

/// A day was picked: re-render the picker with the hour menu bound to
/// that day and its labels snapshotting current availability.
async fn handle_day_selected(
    ctx: &Context,
    interaction: &ComponentInteraction,
    store: &ReservationStore,
) -> Result<()> {
    let Some(day) = selected_value(interaction) else {
        return ephemeral_notice(ctx, interaction, SlotRejection::InvalidSelection.notice()).await;
    };
    if !is_known_day(&day) {
        return ephemeral_notice(ctx, interaction, SlotRejection::InvalidSelection.notice()).await;
    }

    let taken = taken_hours_for_day(store, &day).await;
    let state = PickerState::DaySelected { day };
    let rerender = CreateInteractionResponseMessage::new()
        .components(picker_components(&state, &taken));
    interaction
        .create_response(&ctx.http, CreateInteractionResponse::UpdateMessage(rerender))
        .await?;
    Ok(())
}

/// An hour was picked: run the guards, then hand over to the channel
/// provisioner.
async fn handle_hour_selected(
    ctx: &Context,
    interaction: &ComponentInteraction,
    store: &ReservationStore,
    state: PickerState,
) -> Result<()> {
    let value = selected_value(interaction).unwrap_or_default();

    match evaluate_hour_pick(store, &state, interaction.user.id, &value).await {
        Ok((day, hour)) => {
            let Some(guild_id) = interaction.guild_id else {
                return ephemeral_notice(
                    ctx,
                    interaction,
                    "❌ Cette action ne fonctionne que sur un serveur.",
                )
                .await;
            };
            provision_reservation(ctx, interaction, store, guild_id, &day, hour).await
        }
        Err(rejection) => {
            tracing::debug!(
                "Hour pick rejected for user {} ({}): {:?}",
                interaction.user.name,
                interaction.user.id,
                rejection
            );
            ephemeral_notice(ctx, interaction, rejection.notice()).await
        }
    }
}

/// The cancel button: guards first, then the store removal decides who
/// actually cancels, then best-effort archival of the channel pair.
async fn handle_cancel(
    ctx: &Context,
    interaction: &ComponentInteraction,
    store: &ReservationStore,
    owner: UserId,
) -> Result<()> {
    if interaction.user.id != owner {
        return ephemeral_notice(
            ctx,
            interaction,
            "❌ Vous ne pouvez pas annuler la réservation d'un autre utilisateur.",
        )
        .await;
    }

    let Some(reservation) = store.get(owner).await else {
        return ephemeral_notice(
            ctx,
            interaction,
            "ℹ️ Vous n'avez aucune réservation enregistrée.",
        )
        .await;
    };

    if interaction.channel_id != reservation.channel_id {
        return ephemeral_notice(
            ctx,
            interaction,
            "❌ Ce bouton doit être utilisé dans votre salon privé de réservation.",
        )
        .await;
    }

    let Some(guild_id) = interaction.guild_id else {
        return ephemeral_notice(
            ctx,
            interaction,
            "❌ Cette action ne fonctionne que sur un serveur.",
        )
        .await;
    };

    // The removal is the authoritative step; the sweep may have claimed
    // the record since the lookup above.
    let Some(reservation) = store.remove(owner).await else {
        return ephemeral_notice(
            ctx,
            interaction,
            "ℹ️ Vous n'avez aucune réservation enregistrée.",
        )
        .await;
    };

    // Channel work is best effort from here: the reservation itself is
    // already gone.
    let notice = format!(
        "❌ Cette réservation a été annulée par {} et archivée.",
        interaction.user.mention()
    );
    match find_or_create_archive_category(&ctx.http, guild_id).await {
        Ok(archive) => {
            if let Err(e) =
                archive_channel(&ctx.http, reservation.channel_id, &archive, &notice).await
            {
                tracing::warn!(
                    "Failed to archive channel {} during cancellation: {}",
                    reservation.channel_id,
                    e
                );
            }
        }
        Err(e) => tracing::warn!("Could not resolve the archive category: {}", e),
    }
    if let Err(e) = delete_category_if_empty(&ctx.http, guild_id, reservation.category_id).await {
        tracing::warn!(
            "Failed to delete category {} during cancellation: {}",
            reservation.category_id,
            e
        );
    }

    ephemeral_notice(
        ctx,
        interaction,
        &format!(
            "❌ Votre réservation pour **{}** a été annulée et archivée.",
            reservation.slot_label
        ),
    )
    .await?;

    notify_staff(
        ctx,
        guild_id,
        format!(
            "❌ **Annulation** : {} a annulé sa réservation ({})",
            interaction.user.mention(),
            reservation.slot_label
        ),
    )
    .await;

    tracing::info!(
        "Cancelled reservation '{}' of user {} ({})",
        reservation.slot_label,
        interaction.user.name,
        owner
    );
    Ok(())
}

/// First submitted value of a string select, `None` for anything else.
fn selected_value(interaction: &ComponentInteraction) -> Option<String> {
    match &interaction.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => values.first().cloned(),
        _ => None,
    }
}

async fn ephemeral_notice(
    ctx: &Context,
    interaction: &ComponentInteraction,
    text: &str,
) -> Result<()> {
    let message = CreateInteractionResponseMessage::new()
        .content(text)
        .ephemeral(true);
    interaction
        .create_response(&ctx.http, CreateInteractionResponse::Message(message))
        .await?;
    Ok(())
}
