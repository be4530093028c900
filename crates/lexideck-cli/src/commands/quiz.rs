//! The `lexideck quiz` command.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use lexideck_core::model::DeckId;
use lexideck_core::quiz::QuizSession;
use lexideck_core::state::SessionPhase;

use super::study::next_line;

pub async fn execute(deck: i64, config_path: Option<PathBuf>) -> Result<()> {
    let (config, store) = super::open(config_path)?;
    let mut rng = super::session_rng(&config);

    let mut session = QuizSession::open(DeckId(deck), store.as_ref(), store.as_ref(), &mut rng).await;

    let state = session.state();
    if state.phase == SessionPhase::Unavailable {
        tracing::warn!(deck, error = ?state.error, "quiz unavailable");
        anyhow::bail!(
            "{}",
            state.error.as_deref().unwrap_or("quiz unavailable")
        );
    }

    let input = BufReader::new(tokio::io::stdin());
    run(&mut session, input, &mut std::io::stdout()).await
}

/// Ask every question in turn, reading the chosen option number per line.
pub(crate) async fn run<R, W>(session: &mut QuizSession, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let total = session.state().questions.len();

    'questions: while let Some(question) = session.current_question() {
        let position = session.state().cursor + 1;
        writeln!(out, "[{position}/{total}] {}", question.card.word)?;
        for (i, option) in question.options.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, option)?;
        }

        let choice = loop {
            let Some(line) = next_line(&mut lines).await? else {
                break 'questions;
            };
            if line == "q" {
                break 'questions;
            }
            match line.parse::<usize>() {
                Ok(n) if (1..=question.options.len()).contains(&n) => break n - 1,
                _ => writeln!(
                    out,
                    "  Enter a number between 1 and {}, or q to quit",
                    question.options.len()
                )?,
            }
        };

        session.select_answer(&question.options[choice]);
        match session.state().selection_correct() {
            Some(true) => writeln!(out, "  Correct!")?,
            _ => writeln!(out, "  Wrong, the answer was: {}", question.card.translation)?,
        }
        session.next();
    }

    let state = session.state();
    writeln!(
        out,
        "Score: {}/{} ({:.0}%)",
        state.correct_count,
        state.answered_count,
        state.score() * 100.0
    )?;
    Ok(())
}
