mod magic_code;

pub use magic_code::{user_id_for, CodeDelivery, MagicCodeAuth, CODE_TTL, MAX_ATTEMPTS};
