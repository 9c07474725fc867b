use std::sync::Arc;

use chrono::Local;

use crate::app::{AppContext, Result};
use crate::session::ExtractRequest;

fn extract_request(ctx: &AppContext) -> ExtractRequest {
    ExtractRequest {
        budget: ctx.config.expansion.budget(),
        voice_locale: Some(ctx.config.speech.locale.clone()),
        selected_voices: ctx.config.speech.voices.clone(),
    }
}

/// Open the thread, start extracting in the background and hand the
/// session to the TUI player.
pub async fn read(ctx: &AppContext, url: &str, headful: bool) -> Result<()> {
    println!("Opening {}...", url);
    let (session, speech_events) = ctx.open_session(url, headful).await?;

    let request = extract_request(ctx);
    let extracting = session.clone();
    tokio::spawn(async move {
        extracting.extract_comments(request).await;
    });

    crate::tui::run(session, speech_events, Arc::new(ctx.config.colors.clone())).await
}

/// One-shot extraction: expand, extract, print, exit.
pub async fn extract(ctx: &AppContext, url: &str, json: bool, headful: bool) -> Result<()> {
    let (session, _speech_events) = ctx.open_session(url, headful).await?;
    let response = session.extract_comments(extract_request(ctx)).await;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response)
                .map_err(|e| crate::app::MurmurError::Other(e.to_string()))?
        );
        return Ok(());
    }

    if !response.success {
        println!(
            "Extraction failed: {}",
            response.error.as_deref().unwrap_or("unknown error")
        );
        return Ok(());
    }

    if let Some(ref title) = response.title {
        println!("{}\n", title);
    }

    if response.comments.is_empty() {
        println!("No comments found");
        return Ok(());
    }

    for comment in &response.comments {
        let indent = "  ".repeat(comment.depth as usize);
        println!("{}{}: {}", indent, comment.display_author(), comment.text);
    }

    if let Some(ref run) = response.expansion {
        println!(
            "\n{} comments ({} revealed, {:?}) at {}",
            response.count,
            run.revealed(),
            run.outcome,
            Local::now().format("%Y-%m-%d %H:%M:%S"),
        );
    }

    Ok(())
}

/// List the voices the engine offers.
pub async fn voices(ctx: &AppContext, locale: Option<&str>) -> Result<()> {
    use crate::speech::SpeechEngine;

    let (engine, _events) = ctx.speech_engine();
    let voices = engine.available_voices(locale).await?;

    if voices.is_empty() {
        println!("No voices found");
        return Ok(());
    }

    for voice in voices {
        println!("{:24} {}", voice.id, voice.locale);
    }

    Ok(())
}
