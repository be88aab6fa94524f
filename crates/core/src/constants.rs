//! Constants used throughout the apiai2text core crate.

/// Archive directory holding one JSON document per intent.
pub const INTENTS_PREFIX: &str = "intents/";

/// Display width, in pixels, of answers rendered as inline images.
pub const IMAGE_DISPLAY_WIDTH: u32 = 200;

/// Raw message tag for plain text responses.
pub const TEXT_RESPONSE_TAG: u64 = 0;

/// Raw message tag for card responses.
pub const CARD_RESPONSE_TAG: u64 = 1;

/// Raw message tag for quick reply responses.
pub const QUICK_REPLY_TAG: u64 = 2;

/// Raw message tag for image responses.
pub const IMAGE_RESPONSE_TAG: u64 = 3;
