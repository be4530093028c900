//! The `lexideck study` command.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use lexideck_core::model::DeckId;
use lexideck_core::study::StudySession;

pub async fn execute(deck: i64, config_path: Option<PathBuf>) -> Result<()> {
    let (config, store) = super::open(config_path)?;
    let mut rng = super::session_rng(&config);

    let mut session = StudySession::open(DeckId(deck), store.as_ref(), store.clone(), &mut rng).await;

    let state = session.state();
    if let (Some(error), true) = (&state.error, state.working_set.is_empty()) {
        anyhow::bail!("{error}");
    }
    tracing::info!(deck, cards = state.working_set.len(), "study session started");

    let input = BufReader::new(tokio::io::stdin());
    run(&mut session, input, &mut std::io::stdout()).await
}

enum Verdict {
    Known,
    Unknown,
    Quit,
}

/// Drive a study session from line-oriented input until the deck is done
/// or the user quits.
pub(crate) async fn run<R, W>(session: &mut StudySession, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        let state = session.state();
        if let Some(error) = &state.error {
            writeln!(out, "! {error}")?;
            session.clear_error();
        }
        let Some(card) = state.current_card().cloned() else {
            break;
        };

        writeln!(
            out,
            "[{}/{}] {}",
            state.cursor + 1,
            state.working_set.len(),
            card.word
        )?;
        writeln!(out, "  (Enter to reveal, q to quit)")?;
        match next_line(&mut lines).await? {
            Some(line) if line != "q" => {}
            _ => break,
        }

        session.reveal();
        writeln!(out, "  = {}", card.translation)?;

        match ask_verdict(&mut lines, out).await? {
            Verdict::Known => session.mark(true),
            Verdict::Unknown => session.mark(false),
            Verdict::Quit => break,
        }
    }

    session.flush().await;

    let state = session.state();
    if let Some(error) = &state.error {
        writeln!(out, "! {error}")?;
    }
    if state.working_set.is_empty() {
        writeln!(out, "This deck has no cards.")?;
    }
    writeln!(
        out,
        "Studied {} card(s): {} known, {:.0}% accuracy",
        state.studied_count,
        state.known_count,
        state.accuracy() * 100.0
    )?;
    Ok(())
}

async fn ask_verdict<R, W>(lines: &mut Lines<R>, out: &mut W) -> Result<Verdict>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    loop {
        writeln!(out, "  Known? [y/n/q]")?;
        let Some(answer) = next_line(lines).await? else {
            return Ok(Verdict::Quit);
        };
        match answer.to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(Verdict::Known),
            "n" | "no" => return Ok(Verdict::Unknown),
            "q" => return Ok(Verdict::Quit),
            _ => {}
        }
    }
}

pub(crate) async fn next_line<R>(lines: &mut Lines<R>) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    Ok(lines.next_line().await?.map(|l| l.trim().to_string()))
}
