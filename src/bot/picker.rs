use serenity::builder::{
    CreateActionRow, CreateButton, CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption,
};
use serenity::model::application::ButtonStyle;
use serenity::model::id::UserId;

use crate::store::reservations::{ReservationStore, ReserveError};
use crate::utils::slots::{
    booking_hours, hour_option_label, is_known_day, parse_hour, slot_label, WEEKDAYS,
};

/// Custom id of the day select menu.
pub const DAY_SELECT_ID: &str = "flyver:day";

/// Custom id prefix of the hour select menu; the chosen day is appended
/// once there is one.
pub const HOUR_SELECT_ID: &str = "flyver:hour";

/// Custom id prefix of the cancel button; the owner's user id is appended.
pub const CANCEL_BUTTON_ID: &str = "flyver:cancel";

/// Wizard state of a posted picker message.
///
/// The state is not kept server side. It rides in the hour menu's custom
/// id, so every interaction arrives carrying the day it was rendered
/// against. Confirming a slot re-renders the picker back to `Idle`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PickerState {
    /// No day chosen yet; hour labels are unmarked.
    #[default]
    Idle,
    /// A day is chosen; hour labels snapshot which slots were taken at
    /// render time.
    DaySelected {
        /// The chosen weekday label, e.g. "Mercredi".
        day: String,
    },
}

impl PickerState {
    /// Custom id the hour menu carries in this state.
    pub fn hour_select_id(&self) -> String {
        match self {
            PickerState::Idle => HOUR_SELECT_ID.to_string(),
            PickerState::DaySelected { day } => format!("{}:{}", HOUR_SELECT_ID, day),
        }
    }

    /// Decodes an hour-menu custom id back into the state it was rendered
    /// for. `None` for ids that do not belong to the hour menu.
    pub fn from_hour_select_id(custom_id: &str) -> Option<PickerState> {
        let rest = custom_id.strip_prefix(HOUR_SELECT_ID)?;
        if rest.is_empty() {
            return Some(PickerState::Idle);
        }
        let day = rest.strip_prefix(':')?;
        Some(PickerState::DaySelected {
            day: day.to_string(),
        })
    }
}

/// Why an hour pick was refused. Guards are evaluated in this order: day
/// first, then the value itself, then slot availability, then the
/// one-reservation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotRejection {
    /// The hour menu was used while the picker had no day selected.
    NoDaySelected,
    /// The submitted value was not one of the rendered options.
    InvalidSelection,
    /// Someone else holds the slot.
    SlotTaken,
    /// The user already holds a reservation.
    AlreadyReserved,
}

impl SlotRejection {
    /// User-facing notice for this rejection, sent ephemerally.
    pub fn notice(&self) -> &'static str {
        match self {
            SlotRejection::NoDaySelected => "⚠️ Veuillez d'abord choisir un jour.",
            SlotRejection::InvalidSelection => "❌ Sélection invalide, veuillez réessayer.",
            SlotRejection::SlotTaken => {
                "❌ Ce créneau est déjà réservé, veuillez en choisir un autre."
            }
            SlotRejection::AlreadyReserved => {
                "❌ Vous avez déjà une réservation. Annulez-la avant d'en prendre une autre."
            }
        }
    }
}

impl From<ReserveError> for SlotRejection {
    fn from(err: ReserveError) -> Self {
        match err {
            ReserveError::SlotTaken => SlotRejection::SlotTaken,
            ReserveError::AlreadyReserved => SlotRejection::AlreadyReserved,
        }
    }
}

/// Validates an hour pick against the wizard state and the current book,
/// returning the chosen `(day, hour)` when every guard passes.
///
/// This is the fast pre-check behind the ephemeral notices. The store runs
/// the availability and duplicate guards once more, atomically, when the
/// record is actually inserted.
pub async fn evaluate_hour_pick(
    store: &ReservationStore,
    state: &PickerState,
    user: UserId,
    hour_value: &str,
) -> Result<(String, u32), SlotRejection> {
    let PickerState::DaySelected { day } = state else {
        return Err(SlotRejection::NoDaySelected);
    };
    if !is_known_day(day) {
        return Err(SlotRejection::InvalidSelection);
    }
    let Ok(hour) = parse_hour(hour_value) else {
        return Err(SlotRejection::InvalidSelection);
    };
    if store.is_slot_taken(&slot_label(day, hour)).await {
        return Err(SlotRejection::SlotTaken);
    }
    if store.get(user).await.is_some() {
        return Err(SlotRejection::AlreadyReserved);
    }
    Ok((day.clone(), hour))
}

/// Hours already reserved on `day`, in menu order.
pub async fn taken_hours_for_day(store: &ReservationStore, day: &str) -> Vec<u32> {
    let mut taken = Vec::new();
    for hour in booking_hours() {
        if store.is_slot_taken(&slot_label(day, hour)).await {
            taken.push(hour);
        }
    }
    taken
}

/// Builds the two select-menu rows of the picker for `state`.
///
/// `taken_hours` is the availability snapshot for the selected day; it is
/// ignored while no day is chosen. Labels are not refreshed afterwards,
/// the insert-time check decides.
pub fn picker_components(state: &PickerState, taken_hours: &[u32]) -> Vec<CreateActionRow> {
    vec![
        CreateActionRow::SelectMenu(day_menu()),
        CreateActionRow::SelectMenu(hour_menu(state, taken_hours)),
    ]
}

fn day_menu() -> CreateSelectMenu {
    let options = WEEKDAYS
        .iter()
        .map(|day| CreateSelectMenuOption::new(*day, *day))
        .collect();
    CreateSelectMenu::new(DAY_SELECT_ID, CreateSelectMenuKind::String { options })
        .placeholder("Choisissez un jour")
}

fn hour_menu(state: &PickerState, taken_hours: &[u32]) -> CreateSelectMenu {
    let mark_taken = matches!(state, PickerState::DaySelected { .. });
    let options = booking_hours()
        .map(|hour| {
            let taken = mark_taken && taken_hours.contains(&hour);
            CreateSelectMenuOption::new(hour_option_label(hour, taken), hour.to_string())
        })
        .collect();
    CreateSelectMenu::new(state.hour_select_id(), CreateSelectMenuKind::String { options })
        .placeholder("Choisissez une heure")
}

/// The cancel button posted with each confirmation, bound to its owner.
pub fn cancel_button(user: UserId) -> CreateButton {
    CreateButton::new(cancel_button_id(user))
        .label("Annuler la réservation")
        .style(ButtonStyle::Danger)
}

pub fn cancel_button_id(user: UserId) -> String {
    format!("{}:{}", CANCEL_BUTTON_ID, user)
}

/// Extracts the bound owner from a cancel-button custom id. `None` for
/// ids that do not belong to the cancel button or carry a broken owner.
pub fn parse_cancel_button_id(custom_id: &str) -> Option<UserId> {
    let raw = custom_id
        .strip_prefix(CANCEL_BUTTON_ID)?
        .strip_prefix(':')?;
    let id = raw.parse::<u64>().ok()?;
    (id != 0).then(|| UserId::new(id))
}
