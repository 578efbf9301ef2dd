// =============================================================================
// Retronova Backend Constants
// =============================================================================
// This file contains all constants used throughout the backend to enable
// easy tuning and configuration from a single location.

// =============================================================================
// ARCADE TERMINALS
// =============================================================================

/// Lowest game slot on a terminal
pub const SLOT_MIN: i32 = 1;

/// Highest game slot on a terminal (terminals carry two cabinets)
pub const SLOT_MAX: i32 = 2;

/// Prefix for generated terminal API keys
pub const ARCADE_API_KEY_PREFIX: &str = "arcade_key_";

/// Random suffix length of generated terminal API keys
pub const ARCADE_API_KEY_SUFFIX_LEN: usize = 24;

/// Header carrying the shared terminal credential
pub const ARCADE_API_KEY_HEADER: &str = "x-api-key";

// =============================================================================
// RESERVATIONS
// =============================================================================

/// Lowest unlock code digit shown on a terminal keypad
pub const UNLOCK_CODE_MIN: u32 = 1;

/// Highest unlock code digit shown on a terminal keypad
pub const UNLOCK_CODE_MAX: u32 = 8;

// =============================================================================
// GAMES
// =============================================================================

/// Minimum configurable player count for a game
pub const PLAYER_COUNT_MIN: i32 = 1;

/// Maximum configurable player count for a game
pub const PLAYER_COUNT_MAX: i32 = 8;

/// Upper bound on a game's ticket cost
pub const TICKET_COST_MAX: i32 = 100;

/// Minimum length of a game name after trimming
pub const GAME_NAME_MIN_LEN: usize = 2;

// =============================================================================
// QUERY LIMITS
// =============================================================================

/// Minimum length of a user search term
pub const USER_SEARCH_MIN_QUERY_LEN: usize = 2;

/// Default page size for user search
pub const USER_SEARCH_DEFAULT_LIMIT: i64 = 10;

/// Maximum page size for user search
pub const USER_SEARCH_MAX_LIMIT: i64 = 50;

/// Default page size for score listings
pub const SCORES_DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for score listings
pub const SCORES_MAX_LIMIT: i64 = 100;

/// Default look-ahead window for expiring promo codes (days)
pub const PROMO_EXPIRY_DEFAULT_DAYS: i64 = 7;

/// Maximum look-ahead window for expiring promo codes (days)
pub const PROMO_EXPIRY_MAX_DAYS: i64 = 365;

// =============================================================================
// IDENTITY VERIFICATION
// =============================================================================

/// Google secure-token JWK endpoint used to verify Firebase ID tokens
pub const SECURETOKEN_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Issuer prefix of Firebase ID tokens; the project id is appended
pub const SECURETOKEN_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

/// Default server port if not specified in environment
pub const DEFAULT_SERVER_PORT: u16 = 8000;

// =============================================================================
// HELPER FUNCTIONS FOR VALIDATION
// =============================================================================

/// Validates that a slot number addresses one of the terminal's cabinets
pub fn is_valid_slot_number(slot: i32) -> bool {
    (SLOT_MIN..=SLOT_MAX).contains(&slot)
}

/// Validates that an unlock code is a single keypad digit in range
pub fn is_valid_unlock_code(code: &str) -> bool {
    let mut chars = code.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => c
            .to_digit(10)
            .is_some_and(|d| (UNLOCK_CODE_MIN..=UNLOCK_CODE_MAX).contains(&d)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_numbers_are_one_or_two() {
        assert!(is_valid_slot_number(1));
        assert!(is_valid_slot_number(2));
        assert!(!is_valid_slot_number(0));
        assert!(!is_valid_slot_number(3));
    }

    #[test]
    fn unlock_codes_are_single_keypad_digits() {
        for d in 1..=8 {
            assert!(is_valid_unlock_code(&d.to_string()));
        }
        assert!(!is_valid_unlock_code("0"));
        assert!(!is_valid_unlock_code("9"));
        assert!(!is_valid_unlock_code("12"));
        assert!(!is_valid_unlock_code("a"));
    }
}
