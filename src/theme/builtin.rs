use super::{hex_to_color, ThemeColors};

pub fn light() -> ThemeColors {
    ThemeColors {
        primary: hex_to_color("#0e7490"),
        primary_dim: hex_to_color("#155e75"),
        accent: hex_to_color("#15803d"),
        warning: hex_to_color("#a16207"),
        error: hex_to_color("#b91c1c"),
        text: hex_to_color("#111827"),
        text_muted: hex_to_color("#4b5563"),
        text_dim: hex_to_color("#9ca3af"),
        surface: hex_to_color("#f9fafb"),
    }
}

pub fn dark() -> ThemeColors {
    ThemeColors {
        primary: hex_to_color("#06b6d4"),
        primary_dim: hex_to_color("#0891b2"),
        accent: hex_to_color("#22c55e"),
        warning: hex_to_color("#eab308"),
        error: hex_to_color("#ef4444"),
        text: hex_to_color("#f9fafb"),
        text_muted: hex_to_color("#9ca3af"),
        text_dim: hex_to_color("#4b5563"),
        surface: hex_to_color("#111827"),
    }
}
