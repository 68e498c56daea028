use crate::auth::IdentityVerifier;
use crate::config;

pub fn handle(sub: &str, email: Option<String>, hours: i64) -> anyhow::Result<()> {
    if crate::is_production!() {
        anyhow::bail!("token issuing is disabled in production");
    }
    let verifier = IdentityVerifier::new(config::config().security.identity_jwt_secret.clone());
    println!("{}", verifier.issue(sub, email, hours)?);
    Ok(())
}
