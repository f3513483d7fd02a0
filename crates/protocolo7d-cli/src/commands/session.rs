//! Login, onboarding and logout.

use protocolo7d_core::Route;
use serde_json::json;

use super::open_program;

fn next_hint(route: Route) -> &'static str {
    match route {
        Route::Login => "run `protocolo7d login <email>` to start",
        Route::Onboarding => "next: `protocolo7d onboard <habit you want to break>`",
        Route::Dashboard => "next: `protocolo7d dashboard`",
    }
}

pub async fn login(email: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut program = open_program()?;
    let route = program.login(email).await?;
    println!(
        "signed in as {}",
        program.auth().email().unwrap_or_default()
    );
    println!("{}", next_hint(route));
    Ok(())
}

pub async fn onboard(target: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut program = open_program()?;
    program.complete_onboarding(target).await?;
    println!("Onboarding completo! Seu desafio começou.");
    println!("{}", next_hint(program.route()));
    Ok(())
}

pub fn logout() -> Result<(), Box<dyn std::error::Error>> {
    let mut program = open_program()?;
    program.logout()?;
    println!("signed out");
    Ok(())
}

pub fn status(as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let program = open_program()?;
    let session = program.auth().session();
    let route = program.route();

    if as_json {
        let out = json!({
            "email": session.email,
            "is_onboarded": session.is_onboarded,
            "route": route,
            "backend": program.api().base_url(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    match &session.email {
        Some(email) => println!(
            "signed in as {email} ({})",
            if session.is_onboarded {
                "onboarded"
            } else {
                "onboarding pending"
            }
        ),
        None => println!("not signed in"),
    }
    println!("backend: {}", program.api().base_url());
    println!("{}", next_hint(route));
    Ok(())
}
