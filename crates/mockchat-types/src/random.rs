//! Random content the synthetic participants are made of.
//!
//! All generators take the RNG explicitly so callers can seed them in tests;
//! production code passes `rand::rng()`.

use rand::Rng;
use rand::seq::IndexedRandom;

/// A fictional participant with a fixed look and a stock of lines.
#[derive(Debug, PartialEq, Eq)]
pub struct Persona {
    pub name: &'static str,
    /// 24-bit RGB name colour.
    pub color: u32,
    pub image_url: &'static str,
    pub quotes: &'static [&'static str],
}

pub static PERSONAS: &[Persona] = &[
    Persona {
        name: "Astolfo",
        color: 0xF5ABBA,
        image_url: "https://static.mockchat.dev/avatars/astolfo.png",
        quotes: &[
            "I'm going on an adventure! Anyone want to come along?",
            "Don't worry about it, I'll figure it out as I go.",
            "Ehehe, did I break something again?",
        ],
    },
    Persona {
        name: "Hackadoll No. 3",
        color: 0x5ACFFA,
        image_url: "https://static.mockchat.dev/avatars/hackadoll3.png",
        quotes: &[
            "Have you tried turning it off and on again?",
            "Your request has been queued. Probably.",
            "I rewrote it over the weekend, it's faster now.",
        ],
    },
    Persona {
        name: "Totsuka",
        color: 0xB5E8A0,
        image_url: "https://static.mockchat.dev/avatars/totsuka.png",
        quotes: &[
            "Tennis practice ran late again today.",
            "Thank you for helping me out earlier!",
            "I think we should all go together next time.",
        ],
    },
    Persona {
        name: "Felix Argyle",
        color: 0xF8D66D,
        image_url: "https://static.mockchat.dev/avatars/felix.png",
        quotes: &[
            "Leave the healing to me, nya~",
            "Crusch-sama would never allow that.",
            "You look terrible. Sit still.",
        ],
    },
    Persona {
        name: "Kaoru",
        color: 0xC39BFF,
        image_url: "https://static.mockchat.dev/avatars/kaoru.png",
        quotes: &[
            "Ah, how fleeting. How utterly fleeting.",
            "The stage awaits, my little kittens.",
        ],
    },
    Persona {
        name: "Nagisa",
        color: 0x7FD7C4,
        image_url: "https://static.mockchat.dev/avatars/nagisa.png",
        quotes: &[
            "I took notes on everyone's weak points. For research.",
            "Is the quiz tomorrow or the day after?",
            "Let's meet at the station at noon.",
        ],
    },
    Persona {
        name: "Ruka",
        color: 0xFF9EC4,
        image_url: "https://static.mockchat.dev/avatars/ruka.png",
        quotes: &[
            "The shrine grounds are quiet this morning.",
            "Okabe-san, please don't call me that.",
        ],
    },
    Persona {
        name: "Hideyoshi",
        color: 0xFFC48A,
        image_url: "https://static.mockchat.dev/avatars/hideyoshi.png",
        quotes: &[
            "I am neither! I am Hideyoshi!",
            "Drama club rehearsal starts at four.",
            "Someone left the projector running all night.",
        ],
    },
];

const NOUNS: &[&str] = &[
    "harbor", "lantern", "orchard", "compass", "meadow", "signal", "furnace", "ledger",
    "kettle", "glacier", "pillar", "archive", "canyon", "beacon", "thimble", "quarry",
    "satchel", "tundra", "monsoon", "parlor", "trellis", "falcon", "cobble", "spindle",
];

const ADJECTIVES: &[&str] = &[
    "fuzzy", "brave", "sleepy", "crunchy", "wobbly", "sparkly", "grumpy", "nimble",
    "zesty", "clumsy", "giddy", "quirky", "soggy", "plucky", "dizzy", "mellow",
];

const ANIMALS: &[&str] = &[
    "otter", "badger", "lynx", "penguin", "gecko", "walrus", "ferret", "heron",
    "marmot", "narwhal", "ocelot", "tapir", "wombat", "yak",
];

const WORDS: &[&str] = &[
    "the", "a", "quietly", "over", "under", "bright", "river", "stone", "window", "morning",
    "forgot", "built", "carried", "every", "never", "small", "letter", "garden", "through",
    "after", "warm", "cold", "bridge", "road", "again", "slowly", "rain", "lamp", "found",
    "kept", "paper", "clock", "wind", "soft", "loud", "market", "sang", "walked", "door",
];

/// Pick a persona from the fixed roster.
pub fn persona<R: Rng + ?Sized>(rng: &mut R) -> &'static Persona {
    // The roster is a non-empty static.
    PERSONAS.choose(rng).unwrap_or(&PERSONAS[0])
}

/// One of the persona's stock lines.
pub fn quote<R: Rng + ?Sized>(rng: &mut R, persona: &Persona) -> String {
    persona
        .quotes
        .choose(rng)
        .map(|q| (*q).to_string())
        .unwrap_or_else(|| paragraph(rng))
}

pub fn noun<R: Rng + ?Sized>(rng: &mut R) -> String {
    pick(rng, NOUNS).to_string()
}

/// Something like "SleepyOtter".
pub fn silly_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut name = String::new();
    for part in [pick(rng, ADJECTIVES), pick(rng, ANIMALS)] {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    name
}

/// A few sentences of filler text.
pub fn paragraph<R: Rng + ?Sized>(rng: &mut R) -> String {
    let sentences = rng.random_range(2..5);
    let mut out = Vec::with_capacity(sentences);

    for _ in 0..sentences {
        let len = rng.random_range(4..11);
        let mut words: Vec<&str> = (0..len).map(|_| pick(rng, WORDS)).collect();
        let mut sentence = String::new();
        if let Some(first) = words.first_mut() {
            let mut chars = first.chars();
            if let Some(c) = chars.next() {
                sentence.extend(c.to_uppercase());
                sentence.push_str(chars.as_str());
            }
        }
        for w in words.iter().skip(1) {
            sentence.push(' ');
            sentence.push_str(w);
        }
        sentence.push('.');
        out.push(sentence);
    }

    out.join(" ")
}

fn pick<R: Rng + ?Sized>(rng: &mut R, words: &[&'static str]) -> &'static str {
    words.choose(rng).copied().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn quote_comes_from_persona() {
        let mut rng = StdRng::seed_from_u64(7);
        let p = persona(&mut rng);
        let q = quote(&mut rng, p);
        assert!(p.quotes.contains(&q.as_str()));
    }

    #[test]
    fn paragraph_is_sentences() {
        let mut rng = StdRng::seed_from_u64(1);
        let text = paragraph(&mut rng);
        assert!(text.ends_with('.'));
        assert!(text.chars().next().is_some_and(|c| c.is_uppercase()));
    }

    #[test]
    fn silly_name_is_two_capitalised_words() {
        let mut rng = StdRng::seed_from_u64(3);
        let name = silly_name(&mut rng);
        assert_eq!(name.chars().filter(|c| c.is_uppercase()).count(), 2);
    }
}
