use acara_core::auth::AuthService;
use anyhow::Result;

pub fn run(auth: &AuthService) -> Result<()> {
    auth.logout();
    println!("Logged out.");
    Ok(())
}
