use crate::model;

/// Out-of-band delivery of signing codes. The messaging gateway owns the
/// actual channel (email or SMS); the core only hands over the code and
/// treats delivery as fire-and-forget.
pub trait OtpNotifier: Send + Sync {
    fn send_otp(
        &self,
        contract_id: i32,
        role: model::SignerRole,
        code: &str,
    ) -> anyhow::Result<()>;
}

/// Default dispatcher used until the gateway is wired in: records the
/// dispatch in the log stream without the code itself.
pub struct LogNotifier;

impl OtpNotifier for LogNotifier {
    fn send_otp(
        &self,
        contract_id: i32,
        role: model::SignerRole,
        _code: &str,
    ) -> anyhow::Result<()> {
        tracing::info!(contract_id, ?role, "signing code dispatched");
        Ok(())
    }
}
