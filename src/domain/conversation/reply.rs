//! Outbound chat replies.
//!
//! Handlers return a [`Reply`] value; the transport renders it with
//! `to_string()` and delivers it. Texts use Telegram's legacy Markdown.

use chrono::{DateTime, Utc};
use std::fmt;

/// Characters of the original URL shown per entry in the link list.
const LIST_URL_PREVIEW: usize = 60;

/// One line of the "my links" listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEntry {
    pub code: String,
    pub short_url: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub original_url: String,
}

/// Everything the bot can say.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Welcome {
        first_name: Option<String>,
    },
    Help,
    Cancelled,
    NoActiveSession,
    TextOnly,
    InvalidUrlFormat,
    UrlRejected,
    ChooseCode {
        url: String,
    },
    InvalidCode,
    CodeTaken {
        code: String,
    },
    Created {
        short_url: String,
        code: String,
        original_url: String,
    },
    AllocationExhausted,
    TransientFailure,
    Links {
        entries: Vec<LinkEntry>,
    },
    NoLinks,
}

const CANCEL_HINT: &str = "💡 Type \"cancel\" to stop.";

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Welcome { first_name } => {
                let name = first_name.as_deref().unwrap_or("there");
                write!(
                    f,
                    "👋 *Hello {name}! Welcome to ShortLink Bot!*\n\n\
                     I turn long URLs into short, shareable links.\n\n\
                     🔗 *What I can do:*\n\
                     • Shorten long URLs\n\
                     • Let you pick a custom short code\n\
                     • Count clicks on your links\n\n\
                     📎 *Please send me the URL you want to shorten.*\n\n\
                     {CANCEL_HINT}"
                )
            }
            Reply::Help => write!(
                f,
                "🆘 *Help - ShortLink Bot*\n\n\
                 *Commands:*\n\
                 • /start - Create a new short link\n\
                 • /mylinks - Show your recent links\n\
                 • /help - Show this message\n\n\
                 *How it works:*\n\
                 1️⃣ Use /start\n\
                 2️⃣ Send the long URL (http:// or https://)\n\
                 3️⃣ Type a custom code or \"random\"\n\
                 4️⃣ Share your short link!\n\n\
                 *Custom codes:* 3-20 characters, letters, numbers, hyphens and underscores, unique.\n\n\
                 Type \"cancel\" at any point to stop."
            ),
            Reply::Cancelled => write!(
                f,
                "❌ *Process cancelled.*\n\nUse /start to create a new short link."
            ),
            Reply::NoActiveSession => write!(
                f,
                "👋 Hi! Use /start to begin creating a short link, or /help for more information."
            ),
            Reply::TextOnly => write!(f, "❌ Please send me a text message."),
            Reply::InvalidUrlFormat => write!(
                f,
                "❌ *Invalid URL format*\n\n\
                 Please send a valid URL starting with http:// or https://\n\n\
                 Example: `https://example.com`\n\n\
                 {CANCEL_HINT}"
            ),
            Reply::UrlRejected => write!(
                f,
                "❌ *URL not accepted*\n\n\
                 The link is malformed or points to a private or local address. \
                 Please send a public http(s) URL.\n\n\
                 {CANCEL_HINT}"
            ),
            Reply::ChooseCode { url } => write!(
                f,
                "✅ *Great! URL received:*\n🔗 {url}\n\n\
                 Now choose a short code:\n\
                 • Type your custom code (3-20 characters)\n\
                 • Type \"random\" for an auto-generated one\n\n\
                 *Custom code rules:* letters, numbers, hyphens, underscores; must be unique.\n\n\
                 {CANCEL_HINT}"
            ),
            Reply::InvalidCode => write!(
                f,
                "❌ *Invalid custom code*\n\n\
                 Custom codes must be 3-20 characters long and contain only letters, \
                 numbers, hyphens, and underscores.\n\n\
                 Try again or type \"random\" for an auto-generated code.\n\n\
                 {CANCEL_HINT}"
            ),
            Reply::CodeTaken { code } => write!(
                f,
                "❌ *Code already taken!*\n\n\
                 The code `{code}` is already in use.\n\n\
                 🔄 *Please choose a different code:*\n\
                 • Try a variation like `{code}1` or `{code}2`\n\
                 • Type \"random\" for an auto-generated code\n\n\
                 {CANCEL_HINT}"
            ),
            Reply::Created {
                short_url,
                code,
                original_url,
            } => write!(
                f,
                "🎉 *Short link created!*\n\n\
                 🔗 *Your short link:*\n{short_url}\n\n\
                 • *Code:* `{code}`\n\
                 • *Original URL:* {original_url}\n\
                 • *Clicks:* 0\n\n\
                 🔄 Create another: /start\n\
                 📊 All your links: /mylinks"
            ),
            Reply::AllocationExhausted => write!(
                f,
                "❌ *Unable to generate a unique code*\n\n\
                 Please try again later or use /start and choose a custom code."
            ),
            Reply::TransientFailure => write!(
                f,
                "❌ Something went wrong on our side. Please try again in a moment.\n\n\
                 {CANCEL_HINT}"
            ),
            Reply::Links { entries } => {
                writeln!(f, "🔗 *Your Recent Links:*\n")?;
                for (index, entry) in entries.iter().enumerate() {
                    let clicks = if entry.clicks == 1 { "click" } else { "clicks" };
                    writeln!(f, "*{}. {}*", index + 1, entry.code)?;
                    writeln!(f, "🔗 {}", entry.short_url)?;
                    writeln!(f, "📊 {} {}", entry.clicks, clicks)?;
                    writeln!(f, "📅 {}", entry.created_at.format("%Y-%m-%d"))?;
                    writeln!(f, "🎯 {}\n", preview(&entry.original_url))?;
                }
                write!(f, "🚀 Want to create another? Use /start")
            }
            Reply::NoLinks => write!(
                f,
                "📭 *No links found*\n\n\
                 You haven't created any short links yet.\n\n\
                 🚀 Use /start to create your first one!"
            ),
        }
    }
}

/// Truncates long URLs for the listing, on a char boundary.
fn preview(url: &str) -> String {
    if url.chars().count() <= LIST_URL_PREVIEW {
        return url.to_string();
    }

    let head: String = url.chars().take(LIST_URL_PREVIEW).collect();
    format!("{head}...")
}
