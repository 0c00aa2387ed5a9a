//! Terminal presentation and keyboard input.
//!
//! [`ConsoleRenderer`] turns [`RoundEvent`]s into coloured lines on stdout;
//! [`ConsoleInput`] reads the round count and hit/stand answers from a line
//! reader (stdin in the binary, a byte slice in tests).
//!
//! Hearts and diamonds print in bright red, clubs and spades in bright green.

use std::io::Write;

use async_trait::async_trait;
use blackjack_core::protocol::messages::Decision;
use blackjack_core::{Card, Hand, Party, RoundResult};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Stdin};

use crate::application::play_rounds::{ClientError, DecisionMaker, RoundEvent, RoundObserver};

const RED: &str = "\x1b[91m";
const GREEN: &str = "\x1b[92m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

pub const ROUNDS_PROMPT: &str = "How many rounds would you like to play? ";
pub const DECISION_PROMPT: &str = "(H)it or (S)tand? ";

/// `card` with its suit colour, e.g. `"\x1b[91mQ♥\x1b[0m"`.
pub fn render_card(card: Card) -> String {
    let colour = if card.suit().is_red() { RED } else { GREEN };
    format!("{colour}{card}{RESET}")
}

/// The line printed for `event`, if any.
pub fn format_event(event: &RoundEvent) -> Option<String> {
    match event {
        RoundEvent::RoundStarted { round, of } => {
            Some(format!("\n{BOLD}===== ROUND {round} of {of} ====={RESET}"))
        }
        RoundEvent::CardReceived {
            to,
            card,
            nth,
            total,
        } => {
            let (who, what) = match (to, nth) {
                (Party::Player, 1 | 2) => ("[YOU]", "Drawn:"),
                (Party::Player, _) => ("[YOU]", "Hit card:"),
                (Party::Dealer, 1) => ("[DEALER]", "Visible card:"),
                (Party::Dealer, 2) => ("[DEALER]", "Card revealed:"),
                (Party::Dealer, _) => ("[DEALER]", "Draws:"),
            };
            Some(format!("{who} {what} {} | Total: {total}", render_card(*card)))
        }
        RoundEvent::DecisionSent(_) => None,
        RoundEvent::RoundFinished {
            result,
            player_total,
            dealer_total,
            ..
        } => {
            let banner = match result {
                RoundResult::PlayerWin => format!("{GREEN}{BOLD}WINNER!{RESET}"),
                RoundResult::PlayerLoss => format!("{RED}{BOLD}LOSER{RESET}"),
                RoundResult::Tie => format!("{BOLD}TIE{RESET}"),
                RoundResult::Active => return None,
            };
            Some(format!(
                "{banner}  (you {player_total}, dealer {dealer_total})"
            ))
        }
    }
}

/// Prints round progress to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleRenderer;

impl RoundObserver for ConsoleRenderer {
    fn on_event(&self, event: &RoundEvent) {
        if let Some(line) = format_event(event) {
            println!("{line}");
        }
    }
}

fn prompt(text: &str) {
    print!("{text}");
    // A failed flush only delays the prompt.
    let _ = std::io::stdout().flush();
}

/// Line-oriented player input.
pub struct ConsoleInput<R> {
    reader: R,
}

impl ConsoleInput<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

impl<R> ConsoleInput<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Next line without its terminator, `None` at end of input.
    async fn next_line(&mut self) -> Result<Option<String>, ClientError> {
        let mut line = String::new();
        let n = self
            .reader
            .read_line(&mut line)
            .await
            .map_err(ClientError::Input)?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Asks until the player enters a round count in `1..=255`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Input`] if input fails or ends.
    pub async fn prompt_rounds(&mut self) -> Result<u8, ClientError> {
        loop {
            prompt(ROUNDS_PROMPT);
            let Some(line) = self.next_line().await? else {
                return Err(end_of_input());
            };
            match line.parse::<u8>() {
                Ok(n) if n > 0 => return Ok(n),
                _ => println!("Please enter a number between 1 and 255."),
            }
        }
    }
}

fn end_of_input() -> ClientError {
    ClientError::Input(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        "input closed",
    ))
}

/// Parses a hit/stand answer; accepts `h`, `hit`, `s`, `stand` in any case.
pub fn parse_decision(answer: &str) -> Option<Decision> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "h" | "hit" => Some(Decision::Hit),
        "s" | "stand" => Some(Decision::Stand),
        _ => None,
    }
}

#[async_trait]
impl<R> DecisionMaker for ConsoleInput<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn decide(&mut self, _player: &Hand, _dealer_up: Card) -> Result<Decision, ClientError> {
        loop {
            prompt(DECISION_PROMPT);
            let Some(line) = self.next_line().await? else {
                return Err(end_of_input());
            };
            match parse_decision(&line) {
                Some(decision) => return Ok(decision),
                None => println!("Please answer H or S."),
            }
        }
    }
}
