use acara_core::auth::AuthService;
use anyhow::Result;
use dialoguer::Input;
use owo_colors::OwoColorize;

use crate::render::render_instant;
use crate::utils::tui;

pub async fn run(auth: &AuthService, resend: bool) -> Result<()> {
    if auth.is_authenticated() && !resend {
        println!(
            "Already logged in ({} minute(s) remaining).",
            auth.session_minutes_remaining()
        );
        return Ok(());
    }

    if resend {
        auth.reset_otp();
    }

    let spinner = tui::spinner("Sending OTP to the admin number");
    let outcome = auth.request_otp().await;
    spinner.finish_and_clear();

    if !outcome.success {
        anyhow::bail!("{}", outcome.message);
    }
    println!("{}", outcome.message);

    loop {
        let code: String = Input::new().with_prompt("  Code").interact_text()?;
        let outcome = auth.verify_otp(code.trim());
        if outcome.success {
            println!("{}", outcome.message.green());
            if let Some(expiry) = auth.session_expiry() {
                println!("Session expires at {}", render_instant(expiry));
            }
            return Ok(());
        }
        eprintln!("  {}", outcome.message.red());
    }
}
