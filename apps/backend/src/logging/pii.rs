use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Patterns for secrets that can end up in identity log lines.
pub struct PiiRegexRegistry;

impl PiiRegexRegistry {
    /// Signed tokens: three base64url segments, header starting with `eyJ`.
    pub fn jwt() -> &'static Regex {
        static JWT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(r"eyJ[A-Za-z0-9_-]*\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+").unwrap()
        });
        &JWT_REGEX
    }

    /// bcrypt hashes (`$2a$`, `$2b$`, `$2y$`).
    pub fn bcrypt_hash() -> &'static Regex {
        static BCRYPT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(r"\$2[aby]?\$\d{2}\$[./A-Za-z0-9]{53}").unwrap()
        });
        &BCRYPT_REGEX
    }

    pub fn email() -> &'static Regex {
        static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").unwrap()
        });
        &EMAIL_REGEX
    }

    /// Opaque base64 or hex runs of 16+ characters.
    pub fn opaque_token() -> &'static Regex {
        static OPAQUE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
            #[allow(clippy::unwrap_used)]
            Regex::new(r"\b[A-Za-z0-9+/]{16,}={0,2}").unwrap()
        });
        &OPAQUE_REGEX
    }
}

/// Masks secrets in free text before it reaches a log sink.
///
/// Signed tokens and password hashes are replaced wholesale; emails keep the
/// first character of the local part and the full domain; remaining opaque
/// runs of 16+ characters become `[REDACTED_TOKEN]`.
pub fn redact(input: &str) -> String {
    let out = PiiRegexRegistry::jwt().replace_all(input, "[REDACTED_JWT]");
    let out = PiiRegexRegistry::bcrypt_hash().replace_all(&out, "[REDACTED_HASH]");

    let out = PiiRegexRegistry::email().replace_all(&out, |caps: &regex::Captures| {
        let full = &caps[0];
        match full.split_once('@') {
            Some((local, domain)) => match local.chars().next() {
                Some(first) => format!("{first}***@{domain}"),
                None => format!("@{domain}"),
            },
            None => full.to_string(),
        }
    });

    PiiRegexRegistry::opaque_token()
        .replace_all(&out, "[REDACTED_TOKEN]")
        .into_owned()
}

/// Display wrapper that redacts on format; use it for every email or token
/// passed to a `tracing` macro.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&redact(self.0))
    }
}
