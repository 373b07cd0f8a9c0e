use rand::Rng;

use mockchat_types::{Author, Message};

/// Default upper bound for [`AuthorStreak`].
pub const SAME_AUTHOR_LIMIT: u8 = 6;

/// Decides who writes the next synthetic message.
///
/// Every decision adds a random `0..limit` to a running counter. While the
/// counter stays under the limit, and the previous message wasn't the local
/// user's, the previous author keeps talking. Otherwise a new random author
/// takes over and the counter starts again from zero. Runs end after a few
/// messages on average but have no hard cap.
#[derive(Debug, Clone)]
pub struct AuthorStreak {
    counter: u8,
    limit: u8,
}

impl Default for AuthorStreak {
    fn default() -> Self {
        Self::new(SAME_AUTHOR_LIMIT)
    }
}

impl AuthorStreak {
    pub fn new(limit: u8) -> Self {
        Self {
            counter: 0,
            limit: limit.max(1),
        }
    }

    pub fn counter(&self) -> u8 {
        self.counter
    }

    /// The author to reuse, or `None` when a fresh one should be minted.
    pub fn next_author<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        previous: &Author,
        local: &Author,
    ) -> Option<Author> {
        self.counter = self.counter.saturating_add(rng.random_range(0..self.limit));

        if previous != local && self.counter < self.limit {
            Some(previous.clone())
        } else {
            self.counter = 0;
            None
        }
    }

    /// Build the next synthetic message following `previous`, if any.
    pub fn message<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        id: u32,
        previous: Option<&Message>,
        local: &Author,
    ) -> Message {
        let Some(previous) = previous else {
            return Message::random(rng, id);
        };

        match self.next_author(rng, &previous.author, local) {
            Some(author) => Message::random_with_author(rng, id, author),
            None => Message::random(rng, id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockchat_types::RichText;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn local() -> Author {
        Author::new(RichText::plain("alice"))
    }

    #[test]
    fn local_user_is_never_continued() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut streak = AuthorStreak::default();
        let me = local();
        for _ in 0..200 {
            assert!(streak.next_author(&mut rng, &me, &me).is_none());
            assert_eq!(streak.counter(), 0);
        }
    }

    #[test]
    fn new_author_resets_counter() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut streak = AuthorStreak::default();
        let other = Author::random(&mut rng);
        let me = local();
        for _ in 0..200 {
            match streak.next_author(&mut rng, &other, &me) {
                Some(a) => {
                    assert_eq!(a, other);
                    assert!(streak.counter() < SAME_AUTHOR_LIMIT);
                }
                None => assert_eq!(streak.counter(), 0),
            }
        }
    }

    #[test]
    fn streaks_are_short() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut streak = AuthorStreak::default();
        let me = local();
        let other = Author::random(&mut rng);

        let mut longest = 0;
        let mut run = 1;
        let mut reused_any = false;
        for _ in 0..1000 {
            match streak.next_author(&mut rng, &other, &me) {
                Some(_) => {
                    run += 1;
                    reused_any = true;
                }
                None => run = 1,
            }
            longest = longest.max(run);
        }

        assert!(reused_any);
        assert!(
            longest < 2 * SAME_AUTHOR_LIMIT as usize,
            "longest streak {longest}"
        );
    }

    #[test]
    fn first_message_gets_a_fresh_author() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut streak = AuthorStreak::default();
        let msg = streak.message(&mut rng, 1, None, &local());
        assert_eq!(msg.id(), 1);
        assert!(msg.author.persona.is_some());
        assert_eq!(streak.counter(), 0);
    }
}
