use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use crate::random::{self, Persona};
use crate::rich::{RichText, Segment};

/// Avatar used for anyone without a persona image, and for completion entries.
pub const AVATAR_URL: &str = "https://static.mockchat.dev/avatars/default.png";

/// Parse a caller-facing decimal message id.
pub fn parse_id(id: &str) -> Result<u32, std::num::ParseIntError> {
    id.trim().parse::<u32>()
}

/// Someone who writes messages.
///
/// Two authors are the same iff their display names have the same content;
/// colours and persona are ignored.
#[derive(Debug, Clone, Serialize)]
pub struct Author {
    pub name: RichText,
    #[serde(skip)]
    pub persona: Option<&'static Persona>,
}

impl Author {
    /// The local user, or anyone else without a persona.
    pub fn new(name: RichText) -> Self {
        Self {
            name,
            persona: None,
        }
    }

    pub fn from_persona(persona: &'static Persona) -> Self {
        let mut name = RichText::plain(persona.name);
        name.segments.push(Segment::colored(persona.name, persona.color));
        Self {
            name,
            persona: Some(persona),
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::from_persona(random::persona(rng))
    }

    pub fn id(&self) -> &str {
        &self.name.content
    }

    pub fn avatar(&self) -> &str {
        match self.persona {
            Some(p) if !p.image_url.is_empty() => p.image_url,
            _ => AVATAR_URL,
        }
    }

    /// Fresh content in this author's voice.
    pub fn speak<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self.persona {
            Some(p) => random::quote(rng, p),
            None => random::paragraph(rng),
        }
    }
}

impl PartialEq for Author {
    fn eq(&self, other: &Self) -> bool {
        self.name.content == other.name.content
    }
}

impl Eq for Author {}

/// Identity of a message: its id and when it was created or last edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    pub id: u32,
    pub time: DateTime<Utc>,
}

impl Header {
    pub fn new(id: u32, time: DateTime<Utc>) -> Self {
        Self { id, time }
    }

    pub fn now(id: u32) -> Self {
        Self::new(id, Utc::now())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    #[serde(flatten)]
    pub header: Header,
    pub author: Author,
    pub content: String,
    /// Echo token supplied by the local sender; `None` for synthetic messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

impl Message {
    /// A locally sent message.
    pub fn echo(id: u32, author: Author, content: impl Into<String>, nonce: Option<String>) -> Self {
        Self {
            header: Header::now(id),
            author,
            content: content.into(),
            nonce,
        }
    }

    /// A message from a brand-new random author.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, id: u32) -> Self {
        let author = Author::random(rng);
        Self::random_with_author(rng, id, author)
    }

    pub fn random_with_author<R: Rng + ?Sized>(rng: &mut R, id: u32, author: Author) -> Self {
        let content = author.speak(rng);
        Self {
            header: Header::now(id),
            author,
            content,
            nonce: None,
        }
    }

    /// Same id and author, new content and timestamp.
    pub fn regenerate<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        Self::random_with_author(rng, self.header.id, self.author.clone())
    }

    pub fn id(&self) -> u32 {
        self.header.id
    }

    pub fn author_name(&self) -> &str {
        &self.author.name.content
    }

    /// Edit the content; the timestamp becomes the edit time.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.header.time = Utc::now();
    }

    /// True when the content mentions the author's own name.
    pub fn mentioned(&self) -> bool {
        self.content.contains(self.author_name())
    }
}

/// Display lifetime of a typer, counted from its timestamp.
pub const TYPING_TIMEOUT: Duration = Duration::from_secs(5);

/// "This author appears to be typing", as of `time`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Typer {
    pub author: Author,
    pub time: DateTime<Utc>,
}

impl Typer {
    pub fn new(author: Author) -> Self {
        Self {
            author,
            time: Utc::now(),
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(Author::random(rng))
    }

    /// Listeners call this to drop stale typers; nothing expires them for you.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        (now - self.time)
            .to_std()
            .is_ok_and(|age| age >= TYPING_TIMEOUT)
    }

    pub fn is_stale(&self) -> bool {
        self.is_expired(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn author_equality_is_by_name_only() {
        let plain = Author::new(RichText::plain("Astolfo"));
        let styled = Author::from_persona(&random::PERSONAS[0]);
        assert_eq!(plain, styled);
        assert_ne!(plain.avatar(), styled.avatar());
    }

    #[test]
    fn regenerate_keeps_identity() {
        let mut rng = StdRng::seed_from_u64(11);
        let msg = Message::random(&mut rng, 42);
        let again = msg.regenerate(&mut rng);
        assert_eq!(again.id(), 42);
        assert_eq!(again.author, msg.author);
        assert!(again.nonce.is_none());
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert_eq!(parse_id("17").unwrap(), 17);
        assert!(parse_id("seventeen").is_err());
        assert!(parse_id("-1").is_err());
    }

    #[test]
    fn typer_expires_after_timeout() {
        let typer = Typer::new(Author::new("bob".into()));
        assert!(!typer.is_expired(typer.time + TimeDelta::seconds(4)));
        assert!(typer.is_expired(typer.time + TimeDelta::seconds(5)));
    }

    #[test]
    fn mentioned_checks_own_name() {
        let author = Author::new("bob".into());
        let msg = Message::echo(1, author, "hi i'm bob", None);
        assert!(msg.mentioned());
    }
}
