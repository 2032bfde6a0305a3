//! HTML email templates, embedded at compile time.
//!
//! Placeholders are `{{name}}`; every substituted value is HTML-escaped.

use thiserror::Error;

const ACCOUNT_CONFIRMATION: &str = include_str!("templates/account_confirmation.html");
const FORGOT_PASSWORD: &str = include_str!("templates/forgot_password.html");

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template {template} left placeholder {placeholder} unresolved")]
    Unresolved {
        template: &'static str,
        placeholder: String,
    },
}

#[derive(Debug, Clone)]
pub enum Template<'a> {
    AccountConfirmation {
        app_name: &'a str,
        confirmation_url: &'a str,
    },
    ForgotPassword {
        app_name: &'a str,
        code: &'a str,
    },
}

impl Template<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Template::AccountConfirmation { .. } => "account_confirmation",
            Template::ForgotPassword { .. } => "forgot_password",
        }
    }

    fn source(&self) -> &'static str {
        match self {
            Template::AccountConfirmation { .. } => ACCOUNT_CONFIRMATION,
            Template::ForgotPassword { .. } => FORGOT_PASSWORD,
        }
    }

    fn bindings(&self) -> Vec<(&'static str, &str)> {
        match self {
            Template::AccountConfirmation {
                app_name,
                confirmation_url,
            } => vec![("app_name", *app_name), ("confirmation_url", *confirmation_url)],
            Template::ForgotPassword { app_name, code } => {
                vec![("app_name", *app_name), ("code", *code)]
            }
        }
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render(template: &Template<'_>) -> Result<String, TemplateError> {
    let mut html = template.source().to_string();
    for (key, value) in template.bindings() {
        html = html.replace(&format!("{{{{{key}}}}}"), &escape_html(value));
    }

    if let Some(start) = html.find("{{") {
        let placeholder = html[start..]
            .split("}}")
            .next()
            .map(|p| format!("{p}}}}}"))
            .unwrap_or_default();
        return Err(TemplateError::Unresolved {
            template: template.name(),
            placeholder,
        });
    }

    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_embeds_link_and_app_name() {
        let html = render(&Template::AccountConfirmation {
            app_name: "Acme",
            confirmation_url: "https://app.test/account/verify-account?token=abc.def.ghi",
        })
        .unwrap();

        assert!(html.contains("Welcome to Acme"));
        assert!(html.contains("href=\"https://app.test/account/verify-account?token=abc.def.ghi\""));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn forgot_password_embeds_code() {
        let html = render(&Template::ForgotPassword {
            app_name: "Acme",
            code: "004217",
        })
        .unwrap();
        assert!(html.contains(">004217<"));
    }

    #[test]
    fn values_are_html_escaped() {
        let html = render(&Template::ForgotPassword {
            app_name: "<script>alert('x')</script>",
            code: "123456",
        })
        .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    }

    #[test]
    fn escape_covers_attribute_breakers() {
        assert_eq!(escape_html(r#"a&b"c'd"#), "a&amp;b&quot;c&#39;d");
    }
}
