/// Lowercases a display name and swaps spaces for hyphens, the shape
/// Discord expects for channel names.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace(' ', "-")
}

/// Base name shared by a reservation's category and text channel,
/// `<pseudo>-<jour>-<heure>h`.
pub fn reservation_base_name(user_name: &str, day: &str, hour: u32) -> String {
    format!(
        "{}-{}-{}h",
        normalize_name(user_name),
        normalize_name(day),
        hour
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Jean Dupont"), "jean-dupont");
        assert_eq!(normalize_name("ALICE"), "alice");
        assert_eq!(normalize_name("bob"), "bob");
        assert_eq!(normalize_name("Two  Spaces"), "two--spaces");
    }

    #[test]
    fn test_reservation_base_name() {
        assert_eq!(reservation_base_name("Jean", "Lundi", 9), "jean-lundi-9h");
        assert_eq!(
            reservation_base_name("Air Crew", "Mercredi", 14),
            "air-crew-mercredi-14h"
        );
    }
}
