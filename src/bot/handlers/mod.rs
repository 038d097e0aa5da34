pub mod component;
pub mod message;

use serenity::all::{Context, EventHandler, Interaction, Message, Ready};
use serenity::async_trait;

use crate::store::reservations::ReservationStore;

/// Gateway event handler carrying the shared reservation store.
pub struct Handler {
    store: ReservationStore,
}

impl Handler {
    pub fn new(store: ReservationStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!("Connecté en tant que {}", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        if let Err(e) = message::command_handler(&ctx, &msg).await {
            tracing::error!("Command handling failed in channel {}: {}", msg.channel_id, e);
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::Component(component) = interaction {
            if let Err(e) = component::component_handler(&ctx, &component, &self.store).await {
                tracing::error!(
                    "Component '{}' handling failed: {}",
                    component.data.custom_id,
                    e
                );
            }
        }
    }
}
