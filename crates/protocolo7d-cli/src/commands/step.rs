use clap::Subcommand;
use protocolo7d_core::badges::badge_label;
use protocolo7d_core::steps::{self, PAYWALL_NOTICE};
use protocolo7d_core::{StepCompletion, StepView, ToolAnswers, EBOOK_URL};

use super::open_program;

#[derive(Subcommand)]
pub enum StepAction {
    /// Show a step's text, its tool fields and any saved answers
    Show {
        /// Step number (1-7)
        step: u32,
        #[arg(long)]
        json: bool,
    },
    /// Save the tool answers and mark the step complete
    Complete {
        /// Step number (1-7)
        step: u32,
        /// Tool answer as key=value; repeat for every field
        #[arg(short, long = "answer", value_parser = parse_answer)]
        answers: Vec<(String, String)>,
    },
}

fn parse_answer(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

pub async fn run(action: StepAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut program = open_program()?;
    match action {
        StepAction::Show { step, json } => {
            let view = program.open_step(step).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", render_view(&view));
            }
        }
        StepAction::Complete { step, answers } => {
            let answers: ToolAnswers = answers.into_iter().collect();
            let done = program.complete_step(step, answers).await?;
            print!("{}", render_completion(&done));
        }
    }
    Ok(())
}

pub fn unlock() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = steps::open_ebook() {
        tracing::warn!(error = %e, "could not launch a browser");
        println!("Abra no navegador: {EBOOK_URL}");
    }
    Ok(())
}

fn render_view(view: &StepView) -> String {
    let def = view.definition;
    let mut out = format!("Dia {} - {} (+{}pts)", def.index, def.title, def.points);
    if view.completed {
        out.push_str(" ✅");
    }
    out.push('\n');

    let Some(content) = def.content else {
        return out;
    };
    out.push_str(&format!(
        "\n{}\n\n⚠ {}\n\n{}\n{}\n",
        content.teaser, content.risk, content.tool_title, content.tool_description
    ));
    for field in content.fields {
        let saved = view
            .answers
            .get(field.key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty());
        out.push_str(&format!(
            "  {} [{}]: {}\n",
            field.label,
            field.key,
            saved.unwrap_or(field.placeholder)
        ));
    }
    out
}

fn render_completion(done: &StepCompletion) -> String {
    let mut out = format!("✅ Dia Completo! Parabéns! Você ganhou {} pontos!\n", done.points);
    if done.already_completed {
        out.push_str("(este dia já estava completo)\n");
    }
    if !done.new_badges.is_empty() {
        let labels: Vec<&str> = done.new_badges.iter().map(|b| badge_label(b).0).collect();
        out.push_str(&format!("🏆 Nova(s) medalha(s): {}\n", labels.join(", ")));
    }
    if done.shows_paywall {
        out.push_str(&format!(
            "\n🔒 Seu Progresso Está BLOQUEADO\n{PAYWALL_NOTICE}\n\nDesbloqueie com `protocolo7d unlock`.\n"
        ));
    }
    out
}
