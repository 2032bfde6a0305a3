use rand::Rng;

/// Password-reset codes live this long in the store.
pub const OTP_TTL_SECS: u64 = 3600;

/// Six-digit, zero-padded code from the thread-local CSPRNG.
pub fn generate_otp() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{n:06}")
}
