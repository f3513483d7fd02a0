//! Display names for the achievements the backend hands out.

/// Granted for completing step 1.
pub const FIRST_VICTORY: &str = "primeira_vitoria";
/// Granted for completing step 3.
pub const THREE_DAY_WARRIOR: &str = "guerreiro_3_dias";

/// Human label and emoji for a badge id. Unknown ids are shown as-is.
pub fn badge_label(id: &str) -> (&str, &'static str) {
    match id {
        FIRST_VICTORY => ("Primeira Vitória", "🏆"),
        THREE_DAY_WARRIOR => ("Guerreiro 3 Dias", "💪"),
        other => (other, "🎖"),
    }
}
