use async_trait::async_trait;

/// Outbound mail collaborator. The reset-token lifecycle calls this after
/// issuing a token but does not depend on delivery for correctness.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Returns false when the message could not be handed off.
    async fn send_reset_email(&self, to: &str, token: &str, name: &str) -> bool;
}

/// Log-only sender. Real delivery is out of scope; this logs enough to follow
/// the flow in development.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_reset_email(&self, to: &str, token: &str, name: &str) -> bool {
        tracing::info!(email = %to, name = %name, token = %token, "password reset email (log only)");
        true
    }
}
