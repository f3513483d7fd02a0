//! Dashboard rendering.

use protocolo7d_core::badges::badge_label;
use protocolo7d_core::steps::STEP_COUNT;
use protocolo7d_core::{clean_time, CleanTimeTicker, Dashboard};

use super::open_program;

const BAR_WIDTH: usize = 21;

pub async fn run(as_json: bool, watch: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut program = open_program()?;
    let dashboard = program.load_dashboard().await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
        return Ok(());
    }
    print!("{}", render(&dashboard));

    if watch {
        watch_clean_time(&dashboard).await?;
    }
    Ok(())
}

async fn watch_clean_time(dashboard: &Dashboard) -> Result<(), Box<dyn std::error::Error>> {
    let Some(start) = dashboard
        .progress
        .clean_streak_start
        .as_deref()
        .and_then(clean_time::parse_start)
    else {
        println!("clean time has not started yet");
        return Ok(());
    };

    let ticker = CleanTimeTicker::spawn(start);
    let mut updates = ticker.subscribe();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                println!("Limpo: {}", updates.borrow_and_update().as_str());
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

fn progress_bar(done: usize) -> String {
    let filled = done.min(STEP_COUNT as usize) * BAR_WIDTH / STEP_COUNT as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

pub fn render(dashboard: &Dashboard) -> String {
    let progress = &dashboard.progress;
    let done = progress.completed_steps.len();

    let mut out = String::from("Olá, Guerreiro!\n");
    if let Some(target) = &dashboard.profile.target_behavior {
        out.push_str(&format!("Alvo: {target}\n"));
    }
    out.push_str(&format!(
        "\nPontos: {}   Dias: {done}/{STEP_COUNT}   Limpo: {}\n",
        progress.total_points,
        dashboard.clean_time.as_deref().unwrap_or("0m")
    ));

    if !progress.badges.is_empty() {
        out.push_str("\nMedalhas:\n");
        for id in &progress.badges {
            let (label, emoji) = badge_label(id);
            out.push_str(&format!("  {emoji} {label}\n"));
        }
    }

    out.push_str(&format!("\nSEU PROGRESSO {}\n", progress_bar(done)));
    out.push_str(&format!("{done} de {STEP_COUNT} dias completados\n\n"));

    for card in &dashboard.steps {
        let marker = if card.locked {
            "🔒"
        } else if card.completed {
            "✅"
        } else {
            "  "
        };
        if card.locked {
            out.push_str(&format!("{marker} Dia {} - {}\n", card.index, card.title));
        } else {
            out.push_str(&format!(
                "{marker} Dia {} - {} (+{}pts)\n",
                card.index, card.title, card.points
            ));
        }
    }
    out
}
