use tokio_cron_scheduler::{JobScheduler, Job};
use chrono::Duration;
use serenity::builder::{CreateChannel, CreateMessage, EditChannel};
use serenity::cache::Cache;
use serenity::http::Http;
use serenity::model::channel::{ChannelType, PermissionOverwrite};
use serenity::model::id::{ChannelId, GuildId};
use crate::store::reservations::ReservationStore;
use std::sync::Arc;

/// Category name archived reservation channels are moved into.
pub const ARCHIVE_CATEGORY: &str = "archives";

/// How long a reservation lives before the sweep retires it.
pub const RETENTION_HOURS: i64 = 24;

const SWEEP_SCHEDULE: &str = "0 */10 * * * *";

pub struct ArchiveService {
    http: Arc<Http>,
    cache: Arc<Cache>,
    store: ReservationStore,
    scheduler: JobScheduler,
}

impl ArchiveService {
    pub async fn new(
        http: Arc<Http>,
        cache: Arc<Cache>,
        store: ReservationStore,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            http,
            cache,
            store,
            scheduler,
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Sweep every 10 minutes; each pass retires reservations past the
        // retention window.
        let http = self.http.clone();
        let cache = self.cache.clone();
        let store = self.store.clone();

        let sweep_job = Job::new_async(SWEEP_SCHEDULE, move |_uuid, _l| {
            let http = http.clone();
            let cache = cache.clone();
            let store = store.clone();
            Box::pin(async move {
                if let Err(e) = sweep_expired_reservations(http, cache, store).await {
                    tracing::error!("Archive sweep failed: {}", e);
                }
            })
        })?;

        self.scheduler.add(sweep_job).await?;
        self.scheduler.start().await?;

        tracing::info!(
            "Archive service started - sweeping every 10 minutes, retention {}h",
            RETENTION_HOURS
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    // Manual trigger for testing
    pub async fn sweep_now(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sweep_expired_reservations(self.http.clone(), self.cache.clone(), self.store.clone()).await
    }
}

async fn sweep_expired_reservations(
    http: Arc<Http>,
    cache: Arc<Cache>,
    store: ReservationStore,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // The bot serves a single guild; first cached guild is it.
    let Some(guild_id) = cache.guilds().first().copied() else {
        tracing::debug!("No guild in cache yet; skipping archive sweep");
        return Ok(());
    };

    // Records leave the store before any channel work starts, so a
    // concurrent cancellation cannot double-handle them.
    let expired = store.pop_expired(Duration::hours(RETENTION_HOURS)).await;
    if expired.is_empty() {
        return Ok(());
    }

    tracing::info!(
        "Archiving {} reservation(s) past the {}h retention",
        expired.len(),
        RETENTION_HOURS
    );

    let archive = find_or_create_archive_category(&http, guild_id).await?;

    for (user_id, reservation) in expired {
        // A member who left keeps nothing; their record is already gone.
        if guild_id.member(&http, user_id).await.is_err() {
            tracing::debug!(
                "Member {} no longer reachable in guild {}; skipping channel archival",
                user_id,
                guild_id
            );
            continue;
        }

        let notice = format!(
            "📦 **Votre réservation a été archivée automatiquement après 24h**.\n\n\
             **Créneau réservé** : {}\nMerci d'avoir volé avec Flyver ✈️ !",
            reservation.slot_label
        );
        if let Err(e) = archive_channel(&http, reservation.channel_id, &archive, &notice).await {
            tracing::warn!(
                "Failed to archive channel {} for user {}: {}",
                reservation.channel_id,
                user_id,
                e
            );
        }

        // Unconditional, unlike manual cancellation: the sweep owns the
        // whole category.
        if let Err(e) = reservation.category_id.delete(&http).await {
            tracing::warn!(
                "Failed to delete category {} for user {}: {}",
                reservation.category_id,
                user_id,
                e
            );
        }

        tracing::info!(
            "Archived expired reservation '{}' of user {}",
            reservation.slot_label,
            user_id
        );
    }

    Ok(())
}

/// Handle on the archive category, carried so moved channels can take
/// over its permission overwrites.
pub struct ArchiveCategory {
    pub id: ChannelId,
    pub overwrites: Vec<PermissionOverwrite>,
}

/// Finds the archive category, creating it on first use.
pub async fn find_or_create_archive_category(
    http: &Arc<Http>,
    guild_id: GuildId,
) -> anyhow::Result<ArchiveCategory> {
    let channels = guild_id.channels(http).await?;
    if let Some(existing) = channels
        .values()
        .find(|c| c.kind == ChannelType::Category && c.name == ARCHIVE_CATEGORY)
    {
        return Ok(ArchiveCategory {
            id: existing.id,
            overwrites: existing.permission_overwrites.clone(),
        });
    }

    let created = guild_id
        .create_channel(
            http,
            CreateChannel::new(ARCHIVE_CATEGORY).kind(ChannelType::Category),
        )
        .await?;
    tracing::info!("Created #{} category in guild {}", ARCHIVE_CATEGORY, guild_id);
    Ok(ArchiveCategory {
        id: created.id,
        overwrites: created.permission_overwrites,
    })
}

/// Moves a reservation channel under the archive category and posts
/// `notice` into it. The channel takes the category's overwrites, so it
/// stops being private.
pub async fn archive_channel(
    http: &Arc<Http>,
    channel_id: ChannelId,
    archive: &ArchiveCategory,
    notice: &str,
) -> anyhow::Result<()> {
    channel_id
        .edit(
            http,
            EditChannel::new()
                .category(Some(archive.id))
                .permissions(archive.overwrites.clone()),
        )
        .await?;
    channel_id
        .send_message(http, CreateMessage::new().content(notice))
        .await?;
    Ok(())
}

/// Deletes a reservation's category unless something else still lives in
/// it. Manual cancellation uses this; the periodic sweep does not.
pub async fn delete_category_if_empty(
    http: &Arc<Http>,
    guild_id: GuildId,
    category_id: ChannelId,
) -> anyhow::Result<()> {
    let channels = guild_id.channels(http).await?;
    let children = channels
        .values()
        .filter(|c| c.parent_id == Some(category_id))
        .count();
    if children <= 1 {
        category_id.delete(http).await?;
    }
    Ok(())
}
