//! The session's command prompt.
//!
//! `ls` lists the commands. `random <paragraph|noun|silly_name> [repeat]`
//! prints that many generated lines, each behind its own simulated call; a
//! failed call prints an `Error:` line instead and the rest still run.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;

use mockchat_channel::CompletionEntry;
use mockchat_channel::completer::{entries, lookback};
use mockchat_net::Network;
use mockchat_types::random;

use crate::error::ServiceError;

const RANDOM_USAGE: &str = "random <paragraph|noun|silly_name> [repeat]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Generate {
    Paragraph,
    Noun,
    SillyName,
}

impl Generate {
    const ALL: [Generate; 3] = [Generate::Paragraph, Generate::Noun, Generate::SillyName];

    fn keyword(self) -> &'static str {
        match self {
            Generate::Paragraph => "paragraph",
            Generate::Noun => "noun",
            Generate::SillyName => "silly_name",
        }
    }

    fn parse(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.keyword() == word)
    }

    fn line(self) -> String {
        let mut rng = rand::rng();
        match self {
            Generate::Paragraph => random::paragraph(&mut rng),
            Generate::Noun => random::noun(&mut rng),
            Generate::SillyName => random::silly_name(&mut rng),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Commander {
    network: Network,
}

impl Commander {
    pub fn new(network: Network) -> Self {
        Self { network }
    }

    /// Run one command line, streaming its output into `out`.
    pub async fn run<W>(&self, args: &[&str], out: &mut W) -> Result<(), ServiceError>
    where
        W: AsyncWrite + Unpin,
    {
        let cmd = args.first().copied().unwrap_or_default();
        debug!(command = cmd, "running command");

        match cmd {
            "ls" => out.write_all(b"Commands: ls, random\n").await?,
            "random" => {
                let generate = args
                    .get(1)
                    .and_then(|word| Generate::parse(word))
                    .ok_or_else(|| ServiceError::Usage(RANDOM_USAGE.to_string()))?;

                let times = match args.get(2) {
                    Some(n) => n.parse::<usize>().map_err(|e| {
                        ServiceError::InvalidInput(format!("failed to parse repeat number: {e}"))
                    })?,
                    None => 1,
                };

                for _ in 0..times {
                    let line = match self.network.simulate().await {
                        Ok(_) => generate.line(),
                        Err(err) => format!("Error: {err}"),
                    };
                    out.write_all(line.as_bytes()).await?;
                    out.write_all(b"\n").await?;
                }
            }
            other => return Err(ServiceError::UnknownCommand(other.to_string())),
        }

        out.flush().await?;
        Ok(())
    }

    pub fn complete(&self, words: &[&str], index: usize) -> Vec<CompletionEntry> {
        let Some(word) = words.get(index) else {
            return Vec::new();
        };

        if "ls".starts_with(word) {
            return entries(&["ls"]);
        }
        if "random".starts_with(word) {
            return entries(&["random paragraph", "random noun", "random silly_name"]);
        }

        Generate::ALL
            .into_iter()
            .map(Generate::keyword)
            .find(|kw| lookback(words, index, "random", kw))
            .map(|kw| entries(&[kw]))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run(commander: &Commander, args: &[&str]) -> Result<String, ServiceError> {
        let mut out = Vec::new();
        commander.run(args, &mut out).await?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn raws(found: &[CompletionEntry]) -> Vec<&str> {
        found.iter().map(|e| e.raw.as_str()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn ls_lists_commands() {
        let out = run(&Commander::new(Network::instant()), &["ls"]).await.unwrap();
        assert_eq!(out, "Commands: ls, random\n");
    }

    #[tokio::test(start_paused = true)]
    async fn random_repeats() {
        let out = run(&Commander::new(Network::instant()), &["random", "noun", "3"])
            .await
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| !l.is_empty() && !l.starts_with("Error:")));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_calls_print_errors_and_continue() {
        let network = Network::default();
        network.config().set_min_latency_ms(0);
        network.config().set_max_latency_ms(0);

        let out = run(&Commander::new(network), &["random", "silly_name", "200"])
            .await
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 200);
        assert!(lines.iter().any(|l| *l == "Error: network unavailable"));
        assert!(lines.iter().any(|l| !l.starts_with("Error:")));
    }

    #[tokio::test(start_paused = true)]
    async fn bad_arguments() {
        let commander = Commander::new(Network::instant());
        let err = run(&commander, &["random", "poem"]).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Usage: random <paragraph|noun|silly_name> [repeat]"
        );
        assert!(matches!(
            run(&commander, &["random"]).await,
            Err(ServiceError::Usage(_))
        ));
        assert!(matches!(
            run(&commander, &["random", "noun", "many"]).await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            run(&commander, &["dance"]).await,
            Err(ServiceError::UnknownCommand(ref c)) if c == "dance"
        ));
        assert!(matches!(
            run(&commander, &[]).await,
            Err(ServiceError::UnknownCommand(_))
        ));
    }

    #[test]
    fn completion() {
        let commander = Commander::new(Network::instant());
        assert_eq!(raws(&commander.complete(&["l"], 0)), vec!["ls"]);
        assert_eq!(commander.complete(&["ran"], 0).len(), 3);
        assert_eq!(raws(&commander.complete(&["random", "si"], 1)), vec!["silly_name"]);
        assert!(commander.complete(&["random", "x"], 1).is_empty());
        assert!(commander.complete(&["ls"], 4).is_empty());
    }
}
